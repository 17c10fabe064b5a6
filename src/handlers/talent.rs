// src/handlers/talent.rs

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
    models::talent::{
        Competency, CompetencyFilter, CreateCompetencyPayload, CreateSuccessionPlanPayload,
        SuccessionFilter, SuccessionPlan, UpdateCompetencyPayload, UpdateSuccessionPlanPayload,
    },
};

// --- Competências ---

#[utoipa::path(
    get,
    path = "/api/hr2/competencies",
    tag = "Talent",
    params(CompetencyFilter),
    responses((status = 200, description = "Competências", body = Vec<Competency>)),
    security(("bearer_auth" = []))
)]
pub async fn list_competencies(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(filter): Query<CompetencyFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = app_state
        .talent_service
        .list_competencies(&user, filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(rows)))
}

#[utoipa::path(
    get,
    path = "/api/hr2/competencies/{id}",
    tag = "Talent",
    params(("id" = i64, Path, description = "ID da competência")),
    responses(
        (status = 200, description = "Competência", body = Competency),
        (status = 404, description = "Não encontrada")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_competency(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let competency = app_state
        .talent_service
        .get_competency(&user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(competency)))
}

#[utoipa::path(
    post,
    path = "/api/hr2/competencies",
    tag = "Talent",
    request_body = CreateCompetencyPayload,
    responses(
        (status = 201, description = "Competência registrada", body = Competency),
        (status = 422, description = "Funcionário ou conclusão inexistente")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_competency(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Json(payload): Json<CreateCompetencyPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let competency = app_state
        .talent_service
        .create_competency(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(competency)))
}

#[utoipa::path(
    put,
    path = "/api/hr2/competencies/{id}",
    tag = "Talent",
    request_body = UpdateCompetencyPayload,
    params(("id" = i64, Path, description = "ID da competência")),
    responses(
        (status = 200, description = "Competência atualizada", body = Competency),
        (status = 404, description = "Não encontrada")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_competency(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCompetencyPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let competency = app_state
        .talent_service
        .update_competency(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(competency)))
}

#[utoipa::path(
    delete,
    path = "/api/hr2/competencies/{id}",
    tag = "Talent",
    params(("id" = i64, Path, description = "ID da competência")),
    responses(
        (status = 204, description = "Competência excluída"),
        (status = 404, description = "Não encontrada")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_competency(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .talent_service
        .delete_competency(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// --- Planos de sucessão (somente administradores) ---

#[utoipa::path(
    get,
    path = "/api/hr2/succession-plans",
    tag = "Talent",
    params(SuccessionFilter),
    responses((status = 200, description = "Planos de sucessão", body = Vec<SuccessionPlan>)),
    security(("bearer_auth" = []))
)]
pub async fn list_succession_plans(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Query(filter): Query<SuccessionFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let plans = app_state
        .talent_service
        .list_succession_plans(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(plans)))
}

#[utoipa::path(
    get,
    path = "/api/hr2/succession-plans/{id}",
    tag = "Talent",
    params(("id" = i64, Path, description = "ID do plano")),
    responses(
        (status = 200, description = "Plano de sucessão", body = SuccessionPlan),
        (status = 404, description = "Não encontrado")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_succession_plan(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let plan = app_state
        .talent_service
        .get_succession_plan(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(plan)))
}

#[utoipa::path(
    post,
    path = "/api/hr2/succession-plans",
    tag = "Talent",
    request_body = CreateSuccessionPlanPayload,
    responses(
        (status = 201, description = "Plano criado", body = SuccessionPlan),
        (status = 422, description = "Dados inválidos")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_succession_plan(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Json(payload): Json<CreateSuccessionPlanPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let plan = app_state
        .talent_service
        .create_succession_plan(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(plan)))
}

#[utoipa::path(
    put,
    path = "/api/hr2/succession-plans/{id}",
    tag = "Talent",
    request_body = UpdateSuccessionPlanPayload,
    params(("id" = i64, Path, description = "ID do plano")),
    responses(
        (status = 200, description = "Plano atualizado", body = SuccessionPlan),
        (status = 404, description = "Não encontrado")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_succession_plan(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateSuccessionPlanPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let plan = app_state
        .talent_service
        .update_succession_plan(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(plan)))
}

#[utoipa::path(
    delete,
    path = "/api/hr2/succession-plans/{id}",
    tag = "Talent",
    params(("id" = i64, Path, description = "ID do plano")),
    responses(
        (status = 204, description = "Plano excluído"),
        (status = 404, description = "Não encontrado")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_succession_plan(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .talent_service
        .delete_succession_plan(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
