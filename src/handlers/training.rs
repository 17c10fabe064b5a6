// src/handlers/training.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{AdminOnly, RequireRole},
    },
    models::training::{
        ApplicationFilter, ApplyTrainingPayload, CertificateFilter, CompletionFilter,
        CreateCompletionPayload, CreateFeedbackPayload, CreateTrainingPayload, FeedbackSummary,
        IssueCertificatePayload, ReviewApplicationPayload, Training, TrainingApplication,
        TrainingCertificate, TrainingCompletion, TrainingFeedback, TrainingFilter,
        UpdateTrainingPayload,
    },
};

// =============================================================================
//  ÁREA 1: TREINAMENTOS
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/hr2/training",
    tag = "Training",
    params(TrainingFilter),
    responses((status = 200, description = "Treinamentos com vagas ocupadas", body = Vec<Training>)),
    security(("bearer_auth" = []))
)]
pub async fn list_trainings(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<TrainingFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let trainings = app_state
        .training_service
        .list(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(trainings)))
}

#[utoipa::path(
    get,
    path = "/api/hr2/training/{id}",
    tag = "Training",
    params(("id" = i64, Path, description = "ID do treinamento")),
    responses(
        (status = 200, description = "Treinamento", body = Training),
        (status = 404, description = "Não encontrado")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_training(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let training = app_state
        .training_service
        .get(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(training)))
}

#[utoipa::path(
    post,
    path = "/api/hr2/training",
    tag = "Training",
    request_body = CreateTrainingPayload,
    responses(
        (status = 201, description = "Treinamento criado", body = Training),
        (status = 422, description = "Dados inválidos")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_training(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Json(payload): Json<CreateTrainingPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let training = app_state
        .training_service
        .create(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(training)))
}

#[utoipa::path(
    put,
    path = "/api/hr2/training/{id}",
    tag = "Training",
    request_body = UpdateTrainingPayload,
    params(("id" = i64, Path, description = "ID do treinamento")),
    responses(
        (status = 200, description = "Treinamento atualizado", body = Training),
        (status = 404, description = "Não encontrado")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_training(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateTrainingPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let training = app_state
        .training_service
        .update(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(training)))
}

#[utoipa::path(
    delete,
    path = "/api/hr2/training/{id}",
    tag = "Training",
    params(("id" = i64, Path, description = "ID do treinamento")),
    responses(
        (status = 204, description = "Treinamento excluído"),
        (status = 404, description = "Não encontrado")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_training(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .training_service
        .delete(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  ÁREA 2: INSCRIÇÕES
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/hr2/training-applications",
    tag = "Training",
    params(ApplicationFilter),
    responses((status = 200, description = "Inscrições", body = Vec<TrainingApplication>)),
    security(("bearer_auth" = []))
)]
pub async fn list_applications(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(filter): Query<ApplicationFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let applications = app_state
        .training_service
        .list_applications(&user, filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(applications)))
}

#[utoipa::path(
    post,
    path = "/api/hr2/training-applications",
    tag = "Training",
    request_body = ApplyTrainingPayload,
    responses(
        (status = 201, description = "Inscrição registrada", body = TrainingApplication),
        (status = 409, description = "Já inscrito"),
        (status = 422, description = "Treinamento encerrado")
    ),
    security(("bearer_auth" = []))
)]
pub async fn apply(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<ApplyTrainingPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let application = app_state
        .training_service
        .apply(&user, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(application)))
}

#[utoipa::path(
    put,
    path = "/api/hr2/training-applications/{id}/review",
    tag = "Training",
    request_body = ReviewApplicationPayload,
    params(("id" = i64, Path, description = "ID da inscrição")),
    responses(
        (status = 200, description = "Inscrição revisada", body = TrainingApplication),
        (status = 409, description = "Já revisada ou sem vagas"),
        (status = 422, description = "Status de revisão inválido")
    ),
    security(("bearer_auth" = []))
)]
pub async fn review_application(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<i64>,
    Json(payload): Json<ReviewApplicationPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let application = app_state
        .training_service
        .review(&user, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(application)))
}

#[utoipa::path(
    put,
    path = "/api/hr2/training-applications/{id}/cancel",
    tag = "Training",
    params(("id" = i64, Path, description = "ID da inscrição")),
    responses(
        (status = 200, description = "Inscrição cancelada", body = TrainingApplication),
        (status = 409, description = "Não pode mais ser cancelada")
    ),
    security(("bearer_auth" = []))
)]
pub async fn cancel_application(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let application = app_state
        .training_service
        .cancel(&user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(application)))
}

// =============================================================================
//  ÁREA 3: CONCLUSÕES E CERTIFICADOS
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/hr2/training-completions",
    tag = "Training",
    params(CompletionFilter),
    responses((status = 200, description = "Conclusões", body = Vec<TrainingCompletion>)),
    security(("bearer_auth" = []))
)]
pub async fn list_completions(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(filter): Query<CompletionFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let completions = app_state
        .training_service
        .list_completions(&user, filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(completions)))
}

#[utoipa::path(
    post,
    path = "/api/hr2/training-completions",
    tag = "Training",
    request_body = CreateCompletionPayload,
    responses(
        (status = 201, description = "Conclusão registrada", body = TrainingCompletion),
        (status = 409, description = "Inscrição não aprovada ou já concluída")
    ),
    security(("bearer_auth" = []))
)]
pub async fn record_completion(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireRole<AdminOnly>,
    Json(payload): Json<CreateCompletionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let completion = app_state
        .training_service
        .record_completion(&user, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(completion)))
}

#[utoipa::path(
    get,
    path = "/api/hr2/training-certificates",
    tag = "Training",
    params(CertificateFilter),
    responses((status = 200, description = "Certificados emitidos", body = Vec<TrainingCertificate>)),
    security(("bearer_auth" = []))
)]
pub async fn list_certificates(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(filter): Query<CertificateFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let certificates = app_state
        .training_service
        .list_certificates(&user, filter.employee_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(certificates)))
}

#[utoipa::path(
    post,
    path = "/api/hr2/training-certificates",
    tag = "Training",
    request_body = IssueCertificatePayload,
    responses(
        (status = 201, description = "Certificado emitido", body = TrainingCertificate),
        (status = 409, description = "Certificado já emitido"),
        (status = 422, description = "Conclusão sem aprovação")
    ),
    security(("bearer_auth" = []))
)]
pub async fn issue_certificate(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireRole<AdminOnly>,
    Json(payload): Json<IssueCertificatePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let certificate = app_state
        .training_service
        .issue_certificate(&user, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(certificate)))
}

// =============================================================================
//  ÁREA 4: AVALIAÇÕES
// =============================================================================

#[utoipa::path(
    post,
    path = "/api/hr2/training-feedback",
    tag = "Training",
    request_body = CreateFeedbackPayload,
    responses(
        (status = 201, description = "Avaliação registrada", body = TrainingFeedback),
        (status = 409, description = "Já avaliado"),
        (status = 422, description = "Nota fora de 1..5")
    ),
    security(("bearer_auth" = []))
)]
pub async fn submit_feedback(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateFeedbackPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let feedback = app_state
        .training_service
        .submit_feedback(&user, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(feedback)))
}

#[utoipa::path(
    get,
    path = "/api/hr2/training/{id}/feedback",
    tag = "Training",
    params(("id" = i64, Path, description = "ID do treinamento")),
    responses((status = 200, description = "Avaliações do treinamento", body = Vec<TrainingFeedback>)),
    security(("bearer_auth" = []))
)]
pub async fn list_feedback(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let feedback = app_state
        .training_service
        .list_feedback(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(feedback)))
}

#[utoipa::path(
    get,
    path = "/api/hr2/training/{id}/feedback/summary",
    tag = "Training",
    params(("id" = i64, Path, description = "ID do treinamento")),
    responses((status = 200, description = "Média e distribuição das notas", body = FeedbackSummary)),
    security(("bearer_auth" = []))
)]
pub async fn feedback_summary(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = app_state
        .training_service
        .feedback_summary(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(summary)))
}
