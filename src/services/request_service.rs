// src/services/request_service.rs
//
// Ciclo de vida das solicitações do ESS: criar (Pending), listar,
// decidir (Approved/Rejected, terminal) e excluir enquanto Pending.

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::RequestRepository,
    models::{
        auth::AuthUser,
        requests::{
            CreateLeavePayload, CreateReimbursementPayload, CreateTimesheetPayload,
            DecisionPayload, HistoryFilter, LeaveRequest, Reimbursement, RequestDecision,
            RequestFilter, RequestRecord, RequestStatus, TimesheetAdjustment,
        },
    },
    services::employee_service::EmployeeService,
};

/// Só Pending -> terminal é permitido.
pub fn check_transition(current: RequestStatus, target: RequestStatus) -> Result<(), AppError> {
    if current.is_terminal() {
        return Err(AppError::RequestAlreadyProcessed);
    }
    if !target.is_terminal() {
        return Err(AppError::InvalidTransition {
            from: current.to_string(),
            to: target.to_string(),
        });
    }
    Ok(())
}

/// Exclusão só enquanto ninguém decidiu.
pub fn check_deletable(current: RequestStatus) -> Result<(), AppError> {
    if current.is_terminal() {
        return Err(AppError::RequestAlreadyProcessed);
    }
    Ok(())
}

#[derive(Clone)]
pub struct RequestService {
    repo: RequestRepository,
    employees: EmployeeService,
    pool: PgPool,
}

impl RequestService {
    pub fn new(repo: RequestRepository, employees: EmployeeService, pool: PgPool) -> Self {
        Self { repo, employees, pool }
    }

    // =========================================================================
    //  CRIAÇÃO
    // =========================================================================

    pub async fn create_leave(
        &self,
        actor: &AuthUser,
        input: &CreateLeavePayload,
    ) -> Result<LeaveRequest, AppError> {
        input.validate_consistency()?;
        let employee_id = self.employees.acting_employee_id(actor, input.employee_id).await?;

        let request = self.repo.insert_leave(&self.pool, employee_id, input).await?;
        tracing::info!(request_id = request.id, employee_id, "Solicitação de férias/licença criada");
        Ok(request)
    }

    pub async fn create_timesheet(
        &self,
        actor: &AuthUser,
        input: &CreateTimesheetPayload,
    ) -> Result<TimesheetAdjustment, AppError> {
        let times = input.parse_times()?;
        let employee_id = self.employees.acting_employee_id(actor, input.employee_id).await?;

        let request = self
            .repo
            .insert_timesheet(&self.pool, employee_id, input, times)
            .await?;
        tracing::info!(request_id = request.id, employee_id, "Ajuste de ponto criado");
        Ok(request)
    }

    pub async fn create_reimbursement(
        &self,
        actor: &AuthUser,
        input: &CreateReimbursementPayload,
    ) -> Result<Reimbursement, AppError> {
        let employee_id = self.employees.acting_employee_id(actor, input.employee_id).await?;

        let request = self
            .repo
            .insert_reimbursement(&self.pool, employee_id, input)
            .await?;
        tracing::info!(request_id = request.id, employee_id, "Reembolso criado");
        Ok(request)
    }

    // =========================================================================
    //  CONSULTA
    // =========================================================================

    pub async fn list<T: RequestRecord>(
        &self,
        actor: &AuthUser,
        filter: RequestFilter,
    ) -> Result<Vec<T>, AppError> {
        let employee_id = self.employees.scope_filter(actor, filter.employee_id).await?;
        self.repo
            .list::<T>(&RequestFilter { employee_id, status: filter.status })
            .await
    }

    /// Fila de trabalho do administrador: apenas o que ainda pode ser decidido.
    pub async fn pending<T: RequestRecord>(&self, actor: &AuthUser) -> Result<Vec<T>, AppError> {
        self.list::<T>(actor, RequestFilter { employee_id: None, status: Some(RequestStatus::Pending) })
            .await
    }

    pub async fn get<T: RequestRecord>(&self, actor: &AuthUser, id: i64) -> Result<T, AppError> {
        let request = self
            .repo
            .find::<_, T>(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("{} {}", T::KIND.label(), id)))?;

        self.employees.ensure_can_access(actor, request.employee_id()).await?;
        Ok(request)
    }

    pub async fn history(
        &self,
        actor: &AuthUser,
        filter: HistoryFilter,
    ) -> Result<Vec<RequestDecision>, AppError> {
        let employee_id = self.employees.scope_filter(actor, filter.employee_id).await?;
        self.repo
            .list_decisions(&HistoryFilter { kind: filter.kind, employee_id })
            .await
    }

    // =========================================================================
    //  DECISÃO (A TRANSIÇÃO)
    // =========================================================================

    pub async fn decide<T: RequestRecord>(
        &self,
        approver: &AuthUser,
        id: i64,
        input: &DecisionPayload,
    ) -> Result<T, AppError> {
        let target = input.decision()?.target_status();

        let mut tx = self.pool.begin().await?;

        let current = self
            .repo
            .find::<_, T>(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("{} {}", T::KIND.label(), id)))?;

        check_transition(current.status(), target)?;

        // UPDATE condicional: se outro admin decidiu no meio tempo, volta None
        let updated = self
            .repo
            .apply_decision::<_, T>(&mut *tx, id, target, input.admin_notes.as_deref(), approver.id)
            .await?
            .ok_or(AppError::RequestAlreadyProcessed)?;

        self.repo
            .record_decision(
                &mut *tx,
                T::KIND,
                id,
                updated.employee_id(),
                current.status(),
                target,
                approver.id,
                input.admin_notes.as_deref(),
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            kind = ?T::KIND,
            request_id = id,
            approver_id = approver.id,
            status = %target,
            "Solicitação decidida"
        );
        Ok(updated)
    }

    // =========================================================================
    //  EXCLUSÃO
    // =========================================================================

    pub async fn delete<T: RequestRecord>(&self, actor: &AuthUser, id: i64) -> Result<(), AppError> {
        let current: T = self.get(actor, id).await?;
        check_deletable(current.status())?;

        // Revalida no SQL: a decisão pode ter chegado entre o SELECT e o DELETE
        if !self.repo.delete_pending::<_, T>(&self.pool, id).await? {
            return Err(AppError::RequestAlreadyProcessed);
        }

        tracing::info!(kind = ?T::KIND, request_id = id, "Solicitação excluída");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_moves_to_terminal_states_only() {
        assert!(check_transition(RequestStatus::Pending, RequestStatus::Approved).is_ok());
        assert!(check_transition(RequestStatus::Pending, RequestStatus::Rejected).is_ok());
        assert!(matches!(
            check_transition(RequestStatus::Pending, RequestStatus::Pending),
            Err(AppError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn terminal_requests_cannot_be_decided_again() {
        for status in [RequestStatus::Approved, RequestStatus::Rejected] {
            for target in [RequestStatus::Approved, RequestStatus::Rejected] {
                assert!(matches!(
                    check_transition(status, target),
                    Err(AppError::RequestAlreadyProcessed)
                ));
            }
        }
    }

    #[test]
    fn only_pending_requests_are_deletable() {
        assert!(check_deletable(RequestStatus::Pending).is_ok());
        assert!(check_deletable(RequestStatus::Approved).is_err());
        assert!(check_deletable(RequestStatus::Rejected).is_err());
    }

    // --- Contra o banco (sqlx::test cria um banco novo com as migrações) ---

    use chrono::NaiveDate;
    use sqlx::PgPool;

    use crate::{
        db::{EmployeeRepository, RequestRepository},
        models::auth::UserRole,
    };

    fn admin() -> AuthUser {
        AuthUser { id: 900, name: None, email: None, role: UserRole::Admin }
    }

    fn services(pool: &PgPool) -> (RequestService, EmployeeService) {
        let employees = EmployeeService::new(EmployeeRepository::new(pool.clone()), pool.clone());
        let requests = RequestService::new(RequestRepository::new(pool.clone()), employees.clone(), pool.clone());
        (requests, employees)
    }

    async fn seed_employee(pool: &PgPool) -> i64 {
        sqlx::query_scalar("INSERT INTO employees (first_name, last_name) VALUES ('Ana', 'Lima') RETURNING id")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    async fn new_leave(service: &RequestService, employee_id: i64) -> LeaveRequest {
        let payload = CreateLeavePayload {
            employee_id: Some(employee_id),
            leave_type: "Vacation".into(),
            start_date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 7, 10).unwrap(),
            reason: "Férias".into(),
        };
        service.create_leave(&admin(), &payload).await.unwrap()
    }

    fn decision(status: &str) -> DecisionPayload {
        DecisionPayload { status: status.into(), admin_notes: Some("ok".into()) }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn new_requests_start_pending_and_queue_for_admin(pool: PgPool) {
        let (service, _) = services(&pool);
        let employee_id = seed_employee(&pool).await;

        let created = new_leave(&service, employee_id).await;
        assert_eq!(created.status, RequestStatus::Pending);

        let queue: Vec<LeaveRequest> = service.pending(&admin()).await.unwrap();
        assert_eq!(queue.iter().map(|r| r.id).collect::<Vec<_>>(), vec![created.id]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn decision_is_final_and_recorded(pool: PgPool) {
        let (service, _) = services(&pool);
        let employee_id = seed_employee(&pool).await;
        let created = new_leave(&service, employee_id).await;

        let approved: LeaveRequest = service.decide(&admin(), created.id, &decision("Approved")).await.unwrap();
        assert_eq!(approved.status, RequestStatus::Approved);
        assert_eq!(approved.approved_by, Some(900));

        let again = service.decide::<LeaveRequest>(&admin(), created.id, &decision("Rejected")).await;
        assert!(matches!(again, Err(AppError::RequestAlreadyProcessed)));

        let queue: Vec<LeaveRequest> = service.pending(&admin()).await.unwrap();
        assert!(queue.is_empty());

        let decisions: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM request_decisions WHERE request_kind = 'leave' AND request_id = $1 AND to_status = 'Approved'",
        )
        .bind(created.id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(decisions, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn decided_requests_cannot_be_deleted(pool: PgPool) {
        let (service, _) = services(&pool);
        let employee_id = seed_employee(&pool).await;

        let pending = new_leave(&service, employee_id).await;
        service.delete::<LeaveRequest>(&admin(), pending.id).await.unwrap();

        let decided = new_leave(&service, employee_id).await;
        service
            .decide::<LeaveRequest>(&admin(), decided.id, &decision("Denied"))
            .await
            .unwrap();
        let result = service.delete::<LeaveRequest>(&admin(), decided.id).await;
        assert!(matches!(result, Err(AppError::RequestAlreadyProcessed)));

        // O DELETE condicional também recusa sem passar pela checagem do serviço
        let repo = RequestRepository::new(pool.clone());
        assert!(!repo.delete_pending::<_, LeaveRequest>(&pool, decided.id).await.unwrap());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn deleting_an_employee_removes_their_requests(pool: PgPool) {
        let (service, employees) = services(&pool);
        let employee_id = seed_employee(&pool).await;
        new_leave(&service, employee_id).await;

        employees.delete(employee_id).await.unwrap();

        let left: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM leave_requests WHERE employee_id = $1")
            .bind(employee_id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(left, 0);
    }
}
