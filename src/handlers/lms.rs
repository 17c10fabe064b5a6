// src/handlers/lms.rs

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
    models::lms::{
        BulkEnrollPayload, Course, CourseFilter, CreateCoursePayload, CreateLearningPlanPayload,
        Eligibility, EnrollPayload, EnrollmentOutcome, LearningPlan, LearningProgress,
        PlanEnrollPayload, PlanEnrollmentResult, PlanProgress, ProgressFilter,
        UpdateCoursePayload, UpdateLearningPlanPayload, UpdateProgressPayload,
        UserLearningOverview, UserQuery,
    },
};

// =============================================================================
//  ÁREA 1: CURSOS
// =============================================================================

// GET /api/hr2/lms/courses
#[utoipa::path(
    get,
    path = "/api/hr2/lms/courses",
    tag = "LMS",
    params(CourseFilter),
    responses((status = 200, description = "Cursos com contagem de matrículas", body = Vec<Course>)),
    security(("bearer_auth" = []))
)]
pub async fn list_courses(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<CourseFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let courses = app_state
        .lms_service
        .list_courses(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(courses)))
}

// GET /api/hr2/lms/courses/{id}
#[utoipa::path(
    get,
    path = "/api/hr2/lms/courses/{id}",
    tag = "LMS",
    params(("id" = i64, Path, description = "ID do curso")),
    responses(
        (status = 200, description = "Curso", body = Course),
        (status = 404, description = "Não encontrado")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_course(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let course = app_state
        .lms_service
        .get_course(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(course)))
}

// POST /api/hr2/lms/courses
#[utoipa::path(
    post,
    path = "/api/hr2/lms/courses",
    tag = "LMS",
    request_body = CreateCoursePayload,
    responses(
        (status = 201, description = "Curso criado", body = Course),
        (status = 422, description = "Dados inválidos ou pré-requisito desconhecido")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_course(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireRole<AdminOnly>,
    Json(payload): Json<CreateCoursePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let course = app_state
        .lms_service
        .create_course(&user, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(course)))
}

// PUT /api/hr2/lms/courses/{id}
#[utoipa::path(
    put,
    path = "/api/hr2/lms/courses/{id}",
    tag = "LMS",
    request_body = UpdateCoursePayload,
    params(("id" = i64, Path, description = "ID do curso")),
    responses(
        (status = 200, description = "Curso atualizado", body = Course),
        (status = 404, description = "Não encontrado"),
        (status = 422, description = "Pré-requisito desconhecido ou ciclo")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_course(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCoursePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let course = app_state
        .lms_service
        .update_course(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(course)))
}

// DELETE /api/hr2/lms/courses/{id}
#[utoipa::path(
    delete,
    path = "/api/hr2/lms/courses/{id}",
    tag = "LMS",
    params(("id" = i64, Path, description = "ID do curso")),
    responses(
        (status = 204, description = "Curso excluído"),
        (status = 404, description = "Não encontrado")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_course(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .lms_service
        .delete_course(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// GET /api/hr2/lms/courses/{id}/eligibility?user_id=
#[utoipa::path(
    get,
    path = "/api/hr2/lms/courses/{id}/eligibility",
    tag = "LMS",
    params(("id" = i64, Path, description = "ID do curso"), UserQuery),
    responses((status = 200, description = "Pode ou não se matricular, e por quê", body = Eligibility)),
    security(("bearer_auth" = []))
)]
pub async fn course_eligibility(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i64>,
    Query(query): Query<UserQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let eligibility = app_state
        .lms_service
        .eligibility(&user, id, query.user_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(eligibility)))
}

// =============================================================================
//  ÁREA 2: PLANOS DE APRENDIZAGEM
// =============================================================================

// GET /api/hr2/lms/learning-plans
#[utoipa::path(
    get,
    path = "/api/hr2/lms/learning-plans",
    tag = "LMS",
    responses((status = 200, description = "Planos de aprendizagem", body = Vec<LearningPlan>)),
    security(("bearer_auth" = []))
)]
pub async fn list_plans(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let plans = app_state
        .lms_service
        .list_plans()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(plans)))
}

// GET /api/hr2/lms/learning-plans/{id}
#[utoipa::path(
    get,
    path = "/api/hr2/lms/learning-plans/{id}",
    tag = "LMS",
    params(("id" = i64, Path, description = "ID do plano")),
    responses(
        (status = 200, description = "Plano", body = LearningPlan),
        (status = 404, description = "Não encontrado")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_plan(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let plan = app_state
        .lms_service
        .get_plan(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(plan)))
}

// POST /api/hr2/lms/learning-plans
#[utoipa::path(
    post,
    path = "/api/hr2/lms/learning-plans",
    tag = "LMS",
    request_body = CreateLearningPlanPayload,
    responses(
        (status = 201, description = "Plano criado", body = LearningPlan),
        (status = 422, description = "Curso desconhecido")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_plan(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireRole<AdminOnly>,
    Json(payload): Json<CreateLearningPlanPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let plan = app_state
        .lms_service
        .create_plan(&user, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(plan)))
}

// PUT /api/hr2/lms/learning-plans/{id}
#[utoipa::path(
    put,
    path = "/api/hr2/lms/learning-plans/{id}",
    tag = "LMS",
    request_body = UpdateLearningPlanPayload,
    params(("id" = i64, Path, description = "ID do plano")),
    responses(
        (status = 200, description = "Plano atualizado", body = LearningPlan),
        (status = 404, description = "Não encontrado")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_plan(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateLearningPlanPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let plan = app_state
        .lms_service
        .update_plan(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(plan)))
}

// DELETE /api/hr2/lms/learning-plans/{id}
#[utoipa::path(
    delete,
    path = "/api/hr2/lms/learning-plans/{id}",
    tag = "LMS",
    params(("id" = i64, Path, description = "ID do plano")),
    responses(
        (status = 204, description = "Plano excluído"),
        (status = 404, description = "Não encontrado")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_plan(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .lms_service
        .delete_plan(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/hr2/lms/learning-plans/{id}/enroll
#[utoipa::path(
    post,
    path = "/api/hr2/lms/learning-plans/{id}/enroll",
    tag = "LMS",
    request_body = PlanEnrollPayload,
    params(("id" = i64, Path, description = "ID do plano")),
    responses(
        (status = 200, description = "Usuários atribuídos e progresso criado", body = PlanEnrollmentResult),
        (status = 404, description = "Plano não encontrado"),
        (status = 422, description = "Funcionário inexistente")
    ),
    security(("bearer_auth" = []))
)]
pub async fn enroll_in_plan(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<i64>,
    Json(payload): Json<PlanEnrollPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let result = app_state
        .lms_service
        .enroll_in_plan(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(result)))
}

// GET /api/hr2/lms/learning-plans/{id}/progress?user_id=
#[utoipa::path(
    get,
    path = "/api/hr2/lms/learning-plans/{id}/progress",
    tag = "LMS",
    params(("id" = i64, Path, description = "ID do plano"), UserQuery),
    responses((status = 200, description = "Cursos do plano concluídos", body = PlanProgress)),
    security(("bearer_auth" = []))
)]
pub async fn plan_progress(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i64>,
    Query(query): Query<UserQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let progress = app_state
        .lms_service
        .plan_progress(&user, id, query.user_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(progress)))
}

// =============================================================================
//  ÁREA 3: PROGRESSO E MATRÍCULAS
// =============================================================================

// GET /api/hr2/lms/progress
#[utoipa::path(
    get,
    path = "/api/hr2/lms/progress",
    tag = "LMS",
    params(ProgressFilter),
    responses((status = 200, description = "Registros de progresso", body = Vec<LearningProgress>)),
    security(("bearer_auth" = []))
)]
pub async fn list_progress(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(filter): Query<ProgressFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = app_state
        .lms_service
        .list_progress(&user, filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(rows)))
}

// PUT /api/hr2/lms/progress/{id}
#[utoipa::path(
    put,
    path = "/api/hr2/lms/progress/{id}",
    tag = "LMS",
    request_body = UpdateProgressPayload,
    params(("id" = i64, Path, description = "ID do registro de progresso")),
    responses(
        (status = 200, description = "Progresso atualizado; status recalculado", body = LearningProgress),
        (status = 404, description = "Não encontrado"),
        (status = 422, description = "Percentual fora de 0..100")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_progress(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateProgressPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let record = app_state
        .lms_service
        .update_progress(&user, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(record)))
}

// POST /api/hr2/lms/enroll
#[utoipa::path(
    post,
    path = "/api/hr2/lms/enroll",
    tag = "LMS",
    request_body = EnrollPayload,
    responses(
        (status = 201, description = "Matrícula criada", body = LearningProgress),
        (status = 409, description = "Já matriculado"),
        (status = 422, description = "Pré-requisitos não concluídos")
    ),
    security(("bearer_auth" = []))
)]
pub async fn enroll(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<EnrollPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let record = app_state
        .lms_service
        .enroll(&user, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(record)))
}

// POST /api/hr2/lms/enroll/bulk
#[utoipa::path(
    post,
    path = "/api/hr2/lms/enroll/bulk",
    tag = "LMS",
    request_body = BulkEnrollPayload,
    responses(
        (status = 200, description = "Resultado por usuário", body = Vec<EnrollmentOutcome>),
        (status = 404, description = "Curso não encontrado")
    ),
    security(("bearer_auth" = []))
)]
pub async fn bulk_enroll(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Json(payload): Json<BulkEnrollPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let outcomes = app_state
        .lms_service
        .bulk_enroll(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(outcomes)))
}

// GET /api/hr2/lms/users/{id}/overview
#[utoipa::path(
    get,
    path = "/api/hr2/lms/users/{id}/overview",
    tag = "LMS",
    params(("id" = i64, Path, description = "ID do funcionário")),
    responses(
        (status = 200, description = "Visão geral do aprendizado", body = UserLearningOverview),
        (status = 403, description = "Outro funcionário")
    ),
    security(("bearer_auth" = []))
)]
pub async fn user_overview(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let overview = app_state
        .lms_service
        .user_overview(&user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(overview)))
}
