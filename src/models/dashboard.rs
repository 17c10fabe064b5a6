// src/models/dashboard.rs

use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

// 1. Painel do administrador (os cards do topo)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub pending_leave_requests: i64,
    pub pending_timesheet_adjustments: i64,
    pub pending_reimbursements: i64,
    pub active_employees: i64,
    pub active_courses: i64,
    pub trainings_in_progress: i64,
    pub certificates_issued: i64,
}

// 2. Contagem por status de um tipo de solicitação
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
}

// 3. Resumo do autoatendimento do funcionário logado
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EssSummary {
    pub employee_id: i64,
    pub leave_requests: StatusCounts,
    pub timesheet_adjustments: StatusCounts,
    pub reimbursements: StatusCounts,
}
