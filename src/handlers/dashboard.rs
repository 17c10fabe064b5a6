// src/handlers/dashboard.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{AdminOnly, RequireRole},
    },
    models::dashboard::DashboardSummary,
};

// GET /api/hr2/dashboard/summary
#[utoipa::path(
    get,
    path = "/api/hr2/dashboard/summary",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Pendências e indicadores gerais", body = DashboardSummary),
        (status = 401, description = "Não autorizado"),
        (status = 403, description = "Apenas administradores")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = app_state
        .dashboard_service
        .get_summary()
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(summary)))
}
