// src/db/dashboard_repo.rs

use sqlx::{PgConnection, PgPool};

use crate::{
    common::error::AppError,
    models::{
        dashboard::{DashboardSummary, StatusCounts},
        requests::{LeaveRequest, Reimbursement, RequestRecord, TimesheetAdjustment},
    },
};

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

async fn count(conn: &mut PgConnection, sql: &str) -> Result<i64, AppError> {
    let total = sqlx::query_scalar::<_, i64>(sql).fetch_one(conn).await?;
    Ok(total)
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // 1. Resumo geral
    pub async fn get_summary(&self) -> Result<DashboardSummary, AppError> {
        // Transação só de leitura: todos os números do mesmo snapshot
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let pending = |table: &str| format!("SELECT COUNT(*) FROM {} WHERE status = 'Pending'", table);

        let summary = DashboardSummary {
            pending_leave_requests: count(&mut tx, &pending(LeaveRequest::TABLE)).await?,
            pending_timesheet_adjustments: count(&mut tx, &pending(TimesheetAdjustment::TABLE)).await?,
            pending_reimbursements: count(&mut tx, &pending(Reimbursement::TABLE)).await?,
            active_employees: count(&mut tx, "SELECT COUNT(*) FROM employees WHERE status = 'Active'").await?,
            active_courses: count(&mut tx, "SELECT COUNT(*) FROM courses WHERE status = 'active'").await?,
            trainings_in_progress: count(&mut tx, "SELECT COUNT(*) FROM trainings WHERE status = 'ongoing'").await?,
            certificates_issued: count(&mut tx, "SELECT COUNT(*) FROM training_certificates").await?,
        };

        tx.commit().await?;
        Ok(summary)
    }

    // 2. Contagem por status das solicitações de um funcionário
    pub async fn request_counts<T: RequestRecord>(&self, employee_id: i64) -> Result<StatusCounts, AppError> {
        let sql = format!(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE status = 'Pending') AS pending,
                COUNT(*) FILTER (WHERE status = 'Approved') AS approved,
                COUNT(*) FILTER (WHERE status = 'Rejected') AS rejected
            FROM {}
            WHERE employee_id = $1
            "#,
            T::TABLE
        );

        let counts = sqlx::query_as::<_, StatusCounts>(&sql)
            .bind(employee_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(counts)
    }
}
