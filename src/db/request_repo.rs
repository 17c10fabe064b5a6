// src/db/request_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::{db_utils::map_constraint_error, error::AppError},
    models::requests::{
        CreateLeavePayload, CreateReimbursementPayload, CreateTimesheetPayload, HistoryFilter,
        LeaveRequest, Reimbursement, RequestDecision, RequestFilter, RequestKind, RequestRecord,
        RequestStatus, TimesheetAdjustment, TimesheetTimes,
    },
};

// Um único repositório para as três solicitações. O INSERT é específico
// de cada tabela; listagem, decisão e exclusão são genéricas (RequestRecord).
#[derive(Clone)]
pub struct RequestRepository {
    pool: PgPool,
}

impl RequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CRIAÇÃO (sempre Pending)
    // =========================================================================

    pub async fn insert_leave<'e, E>(
        &self,
        executor: E,
        employee_id: i64,
        input: &CreateLeavePayload,
    ) -> Result<LeaveRequest, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, LeaveRequest>(
            r#"
            INSERT INTO leave_requests (employee_id, leave_type, start_date, end_date, reason)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(employee_id)
        .bind(input.leave_type.trim())
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(input.reason.trim())
        .fetch_one(executor)
        .await
        .map_err(|e| map_constraint_error(e, "employee"))
    }

    pub async fn insert_timesheet<'e, E>(
        &self,
        executor: E,
        employee_id: i64,
        input: &CreateTimesheetPayload,
        times: TimesheetTimes,
    ) -> Result<TimesheetAdjustment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, TimesheetAdjustment>(
            r#"
            INSERT INTO timesheet_adjustments (
                employee_id, work_date, original_time_in, original_time_out,
                new_time_in, new_time_out, reason
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(employee_id)
        .bind(input.work_date)
        .bind(times.original_time_in)
        .bind(times.original_time_out)
        .bind(times.new_time_in)
        .bind(times.new_time_out)
        .bind(input.reason.trim())
        .fetch_one(executor)
        .await
        .map_err(|e| map_constraint_error(e, "employee"))
    }

    pub async fn insert_reimbursement<'e, E>(
        &self,
        executor: E,
        employee_id: i64,
        input: &CreateReimbursementPayload,
    ) -> Result<Reimbursement, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Reimbursement>(
            r#"
            INSERT INTO reimbursements (
                employee_id, reimbursement_type, amount, expense_date, description, receipt_reference
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(employee_id)
        .bind(input.reimbursement_type.trim())
        .bind(input.amount)
        .bind(input.expense_date)
        .bind(input.description.trim())
        .bind(input.receipt_reference.as_deref())
        .fetch_one(executor)
        .await
        .map_err(|e| map_constraint_error(e, "employee"))
    }

    // =========================================================================
    //  OPERAÇÕES GENÉRICAS
    // =========================================================================

    pub async fn list<T: RequestRecord>(&self, filter: &RequestFilter) -> Result<Vec<T>, AppError> {
        let sql = format!(
            r#"
            SELECT * FROM {}
            WHERE ($1::BIGINT IS NULL OR employee_id = $1)
              AND ($2::request_status IS NULL OR status = $2)
            ORDER BY submitted_at DESC, id DESC
            "#,
            T::TABLE
        );

        let rows = sqlx::query_as::<_, T>(&sql)
            .bind(filter.employee_id)
            .bind(filter.status)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn find<'e, E, T>(&self, executor: E, id: i64) -> Result<Option<T>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
        T: RequestRecord,
    {
        let sql = format!("SELECT * FROM {} WHERE id = $1", T::TABLE);
        let row = sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    /// Só altera linhas ainda Pending: quem chegar depois recebe `None`.
    pub async fn apply_decision<'e, E, T>(
        &self,
        executor: E,
        id: i64,
        status: RequestStatus,
        admin_notes: Option<&str>,
        approver_id: i64,
    ) -> Result<Option<T>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
        T: RequestRecord,
    {
        let sql = format!(
            r#"
            UPDATE {} SET
                status = $1,
                admin_notes = $2,
                approved_by = $3,
                approved_at = NOW(),
                updated_at = NOW()
            WHERE id = $4 AND status = 'Pending'
            RETURNING *
            "#,
            T::TABLE
        );

        let row = sqlx::query_as::<_, T>(&sql)
            .bind(status)
            .bind(admin_notes)
            .bind(approver_id)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    pub async fn delete_pending<'e, E, T>(&self, executor: E, id: i64) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
        T: RequestRecord,
    {
        let sql = format!("DELETE FROM {} WHERE id = $1 AND status = 'Pending'", T::TABLE);
        let result = sqlx::query(&sql).bind(id).execute(executor).await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  HISTÓRICO DE DECISÕES
    // =========================================================================

    #[allow(clippy::too_many_arguments)]
    pub async fn record_decision<'e, E>(
        &self,
        executor: E,
        kind: RequestKind,
        request_id: i64,
        employee_id: i64,
        from_status: RequestStatus,
        to_status: RequestStatus,
        decided_by: i64,
        notes: Option<&str>,
    ) -> Result<RequestDecision, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let decision = sqlx::query_as::<_, RequestDecision>(
            r#"
            INSERT INTO request_decisions (
                request_kind, request_id, employee_id, from_status, to_status, decided_by, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(kind)
        .bind(request_id)
        .bind(employee_id)
        .bind(from_status)
        .bind(to_status)
        .bind(decided_by)
        .bind(notes)
        .fetch_one(executor)
        .await?;
        Ok(decision)
    }

    pub async fn list_decisions(&self, filter: &HistoryFilter) -> Result<Vec<RequestDecision>, AppError> {
        let rows = sqlx::query_as::<_, RequestDecision>(
            r#"
            SELECT * FROM request_decisions
            WHERE ($1::request_kind IS NULL OR request_kind = $1)
              AND ($2::BIGINT IS NULL OR employee_id = $2)
            ORDER BY decided_at DESC, id DESC
            "#,
        )
        .bind(filter.kind)
        .bind(filter.employee_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
