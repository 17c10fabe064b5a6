// src/handlers/requests.rs
//
// Rotas das três solicitações do ESS. O contrato é o mesmo para todas
// (listar, pendentes, detalhar, decidir, excluir); só criação muda.

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
    models::requests::{
        CreateLeavePayload, CreateReimbursementPayload, CreateTimesheetPayload, DecisionPayload,
        HistoryFilter, LeaveRequest, Reimbursement, RequestDecision, RequestFilter,
        TimesheetAdjustment,
    },
};

// Gera list / pending / get / decide / delete para um tipo de solicitação.
macro_rules! request_lifecycle_handlers {
    (
        $module:ident,
        record = $record:ident,
        tag = $tag:tt,
        collection = $collection:tt,
        pending = $pending:tt,
        item = $item:tt $(,)?
    ) => {
        pub mod $module {
            use super::*;

            #[utoipa::path(
                get,
                path = $collection,
                tag = $tag,
                params(RequestFilter),
                responses(
                    (status = 200, description = "Solicitações, mais recentes primeiro", body = Vec<$record>),
                    (status = 403, description = "Filtro por outro funcionário")
                ),
                security(("bearer_auth" = []))
            )]
            pub async fn list(
                State(app_state): State<AppState>,
                locale: Locale,
                AuthenticatedUser(user): AuthenticatedUser,
                Query(filter): Query<RequestFilter>,
            ) -> Result<impl IntoResponse, ApiError> {
                let rows = app_state
                    .request_service
                    .list::<$record>(&user, filter)
                    .await
                    .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

                Ok((StatusCode::OK, Json(rows)))
            }

            #[utoipa::path(
                get,
                path = $pending,
                tag = $tag,
                responses(
                    (status = 200, description = "Fila de aprovação (apenas Pending)", body = Vec<$record>),
                    (status = 403, description = "Apenas administradores")
                ),
                security(("bearer_auth" = []))
            )]
            pub async fn pending(
                State(app_state): State<AppState>,
                locale: Locale,
                AuthenticatedUser(user): AuthenticatedUser,
                _guard: RequireRole<AdminOnly>,
            ) -> Result<impl IntoResponse, ApiError> {
                let rows = app_state
                    .request_service
                    .pending::<$record>(&user)
                    .await
                    .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

                Ok((StatusCode::OK, Json(rows)))
            }

            #[utoipa::path(
                get,
                path = $item,
                tag = $tag,
                params(("id" = i64, Path, description = "ID da solicitação")),
                responses(
                    (status = 200, description = "Solicitação", body = $record),
                    (status = 404, description = "Não encontrada")
                ),
                security(("bearer_auth" = []))
            )]
            pub async fn get(
                State(app_state): State<AppState>,
                locale: Locale,
                AuthenticatedUser(user): AuthenticatedUser,
                Path(id): Path<i64>,
            ) -> Result<impl IntoResponse, ApiError> {
                let row = app_state
                    .request_service
                    .get::<$record>(&user, id)
                    .await
                    .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

                Ok((StatusCode::OK, Json(row)))
            }

            #[utoipa::path(
                put,
                path = $item,
                tag = $tag,
                request_body = DecisionPayload,
                params(("id" = i64, Path, description = "ID da solicitação")),
                responses(
                    (status = 200, description = "Decisão registrada", body = $record),
                    (status = 403, description = "Apenas administradores"),
                    (status = 404, description = "Não encontrada"),
                    (status = 409, description = "Solicitação já decidida"),
                    (status = 422, description = "Decisão inválida")
                ),
                security(("bearer_auth" = []))
            )]
            pub async fn decide(
                State(app_state): State<AppState>,
                locale: Locale,
                AuthenticatedUser(user): AuthenticatedUser,
                _guard: RequireRole<AdminOnly>,
                Path(id): Path<i64>,
                Json(payload): Json<DecisionPayload>,
            ) -> Result<impl IntoResponse, ApiError> {
                payload
                    .validate()
                    .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

                let row = app_state
                    .request_service
                    .decide::<$record>(&user, id, &payload)
                    .await
                    .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

                Ok((StatusCode::OK, Json(row)))
            }

            #[utoipa::path(
                delete,
                path = $item,
                tag = $tag,
                params(("id" = i64, Path, description = "ID da solicitação")),
                responses(
                    (status = 204, description = "Excluída"),
                    (status = 404, description = "Não encontrada"),
                    (status = 409, description = "Já decidida, não pode ser excluída")
                ),
                security(("bearer_auth" = []))
            )]
            pub async fn delete(
                State(app_state): State<AppState>,
                locale: Locale,
                AuthenticatedUser(user): AuthenticatedUser,
                Path(id): Path<i64>,
            ) -> Result<impl IntoResponse, ApiError> {
                app_state
                    .request_service
                    .delete::<$record>(&user, id)
                    .await
                    .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

                Ok(StatusCode::NO_CONTENT)
            }
        }
    };
}

request_lifecycle_handlers!(
    leave,
    record = LeaveRequest,
    tag = "Leave Requests",
    collection = "/api/hr2/leave-requests",
    pending = "/api/hr2/leave-requests/pending",
    item = "/api/hr2/leave-requests/{id}",
);

request_lifecycle_handlers!(
    timesheet,
    record = TimesheetAdjustment,
    tag = "Timesheet Adjustments",
    collection = "/api/hr2/timesheet-adjustments",
    pending = "/api/hr2/timesheet-adjustments/pending",
    item = "/api/hr2/timesheet-adjustments/{id}",
);

request_lifecycle_handlers!(
    reimbursement,
    record = Reimbursement,
    tag = "Reimbursements",
    collection = "/api/hr2/reimbursements",
    pending = "/api/hr2/reimbursements/pending",
    item = "/api/hr2/reimbursements/{id}",
);

// =============================================================================
//  CRIAÇÃO (regras específicas de cada tipo)
// =============================================================================

// POST /api/hr2/leave-requests
#[utoipa::path(
    post,
    path = "/api/hr2/leave-requests",
    tag = "Leave Requests",
    request_body = CreateLeavePayload,
    responses(
        (status = 201, description = "Solicitação criada como Pending", body = LeaveRequest),
        (status = 422, description = "Dados inválidos (ex.: término antes do início)")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_leave(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateLeavePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let request = app_state
        .request_service
        .create_leave(&user, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(request)))
}

// POST /api/hr2/timesheet-adjustments
#[utoipa::path(
    post,
    path = "/api/hr2/timesheet-adjustments",
    tag = "Timesheet Adjustments",
    request_body = CreateTimesheetPayload,
    responses(
        (status = 201, description = "Ajuste criado como Pending", body = TimesheetAdjustment),
        (status = 422, description = "Horário fora do formato HH:MM ou entrada depois da saída")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_timesheet(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateTimesheetPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let request = app_state
        .request_service
        .create_timesheet(&user, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(request)))
}

// POST /api/hr2/reimbursements
#[utoipa::path(
    post,
    path = "/api/hr2/reimbursements",
    tag = "Reimbursements",
    request_body = CreateReimbursementPayload,
    responses(
        (status = 201, description = "Reembolso criado como Pending", body = Reimbursement),
        (status = 422, description = "Valor deve ser positivo")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_reimbursement(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateReimbursementPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let request = app_state
        .request_service
        .create_reimbursement(&user, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(request)))
}

// GET /api/hr2/requests/history
#[utoipa::path(
    get,
    path = "/api/hr2/requests/history",
    tag = "Requests",
    params(HistoryFilter),
    responses(
        (status = 200, description = "Histórico de decisões", body = Vec<RequestDecision>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn history(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(filter): Query<HistoryFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let decisions = app_state
        .request_service
        .history(&user, filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(decisions)))
}
