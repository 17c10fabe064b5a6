// src/handlers/employees.rs

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
        i18n::Locale,
        rbac::{AdminOnly, RequireRole},
    },
    models::employee::{CreateEmployeePayload, Employee, EmployeeFilter, UpdateEmployeePayload},
};

// GET /api/hr2/employees
#[utoipa::path(
    get,
    path = "/api/hr2/employees",
    tag = "Employees",
    params(EmployeeFilter),
    responses(
        (status = 200, description = "Funcionários (padrão: apenas ativos)", body = Vec<Employee>),
        (status = 403, description = "Apenas administradores")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_employees(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Query(filter): Query<EmployeeFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let employees = app_state
        .employee_service
        .list(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(employees)))
}

// GET /api/hr2/employees/{id}
#[utoipa::path(
    get,
    path = "/api/hr2/employees/{id}",
    tag = "Employees",
    params(("id" = i64, Path, description = "ID do funcionário")),
    responses(
        (status = 200, description = "Funcionário", body = Employee),
        (status = 404, description = "Não encontrado")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_employee(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let employee = app_state
        .employee_service
        .get(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(employee)))
}

// POST /api/hr2/employees
#[utoipa::path(
    post,
    path = "/api/hr2/employees",
    tag = "Employees",
    request_body = CreateEmployeePayload,
    responses(
        (status = 201, description = "Funcionário cadastrado", body = Employee),
        (status = 409, description = "E-mail ou usuário externo já vinculado"),
        (status = 422, description = "Dados inválidos")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_employee(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Json(payload): Json<CreateEmployeePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let employee = app_state
        .employee_service
        .create(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(employee)))
}

// PUT /api/hr2/employees/{id}
#[utoipa::path(
    put,
    path = "/api/hr2/employees/{id}",
    tag = "Employees",
    request_body = UpdateEmployeePayload,
    params(("id" = i64, Path, description = "ID do funcionário")),
    responses(
        (status = 200, description = "Funcionário atualizado", body = Employee),
        (status = 404, description = "Não encontrado")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_employee(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateEmployeePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let employee = app_state
        .employee_service
        .update(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(employee)))
}

// DELETE /api/hr2/employees/{id}
#[utoipa::path(
    delete,
    path = "/api/hr2/employees/{id}",
    tag = "Employees",
    params(("id" = i64, Path, description = "ID do funcionário")),
    responses(
        (status = 204, description = "Excluído junto com tudo o que o referencia"),
        (status = 404, description = "Não encontrado")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_employee(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .employee_service
        .delete(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
