// src/handlers/ess.rs
//
// Autoatendimento: o funcionário vinculado ao usuário autenticado.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{
        dashboard::EssSummary,
        employee::{Employee, UpdateProfilePayload},
    },
};

// GET /api/hr2/ess/profile
#[utoipa::path(
    get,
    path = "/api/hr2/ess/profile",
    tag = "ESS",
    responses(
        (status = 200, description = "Cadastro do funcionário logado", body = Employee),
        (status = 403, description = "Usuário sem funcionário vinculado")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_profile(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let employee = app_state
        .employee_service
        .profile(&user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(employee)))
}

// PUT /api/hr2/ess/profile
#[utoipa::path(
    put,
    path = "/api/hr2/ess/profile",
    tag = "ESS",
    request_body = UpdateProfilePayload,
    responses(
        (status = 200, description = "Contatos atualizados", body = Employee),
        (status = 403, description = "Usuário sem funcionário vinculado"),
        (status = 422, description = "Dados inválidos")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_profile(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let employee = app_state
        .employee_service
        .update_profile(&user, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(employee)))
}

// GET /api/hr2/ess/summary
#[utoipa::path(
    get,
    path = "/api/hr2/ess/summary",
    tag = "ESS",
    responses(
        (status = 200, description = "Contagem das próprias solicitações por status", body = EssSummary)
    ),
    security(("bearer_auth" = []))
)]
pub async fn summary(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let summary = app_state
        .dashboard_service
        .ess_summary(&user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(summary)))
}
