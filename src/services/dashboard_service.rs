// src/services/dashboard_service.rs

use crate::{
    common::error::AppError,
    db::DashboardRepository,
    models::{
        auth::AuthUser,
        dashboard::{DashboardSummary, EssSummary},
        requests::{LeaveRequest, Reimbursement, TimesheetAdjustment},
    },
    services::employee_service::EmployeeService,
};

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
    employees: EmployeeService,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository, employees: EmployeeService) -> Self {
        Self { repo, employees }
    }

    pub async fn get_summary(&self) -> Result<DashboardSummary, AppError> {
        self.repo.get_summary().await
    }

    pub async fn ess_summary(&self, actor: &AuthUser) -> Result<EssSummary, AppError> {
        let employee_id = self.employees.profile(actor).await?.id;

        let (leave_requests, timesheet_adjustments, reimbursements) = tokio::try_join!(
            self.repo.request_counts::<LeaveRequest>(employee_id),
            self.repo.request_counts::<TimesheetAdjustment>(employee_id),
            self.repo.request_counts::<Reimbursement>(employee_id),
        )?;

        Ok(EssSummary {
            employee_id,
            leave_requests,
            timesheet_adjustments,
            reimbursements,
        })
    }
}
