// src/services/employee_service.rs

use sqlx::PgPool;

use crate::{
    common::{
        db_utils::{field_error, found},
        error::AppError,
    },
    db::EmployeeRepository,
    models::{
        auth::AuthUser,
        employee::{
            CreateEmployeePayload, Employee, EmployeeFilter, UpdateEmployeePayload,
            UpdateProfilePayload,
        },
    },
};

#[derive(Clone)]
pub struct EmployeeService {
    repo: EmployeeRepository,
    pool: PgPool,
}

impl EmployeeService {
    pub fn new(repo: EmployeeRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    // --- CADASTRO ---

    pub async fn list(&self, filter: &EmployeeFilter) -> Result<Vec<Employee>, AppError> {
        self.repo.list(filter).await
    }

    pub async fn get(&self, id: i64) -> Result<Employee, AppError> {
        let employee = self.repo.find_by_id(&self.pool, id).await?;
        found(employee, format!("Employee {}", id))
    }

    pub async fn create(&self, input: &CreateEmployeePayload) -> Result<Employee, AppError> {
        let employee = self.repo.create(&self.pool, input).await?;
        tracing::info!(employee_id = employee.id, "Funcionário cadastrado");
        Ok(employee)
    }

    pub async fn update(&self, id: i64, input: &UpdateEmployeePayload) -> Result<Employee, AppError> {
        let employee = self.repo.update(&self.pool, id, input).await?;
        found(employee, format!("Employee {}", id))
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if !self.repo.delete(&self.pool, id).await? {
            return Err(AppError::ResourceNotFound(format!("Employee {}", id)));
        }
        tracing::info!(employee_id = id, "Funcionário excluído (cascata nas solicitações)");
        Ok(())
    }

    // --- PERFIL (ESS) ---

    pub async fn profile(&self, actor: &AuthUser) -> Result<Employee, AppError> {
        self.repo
            .find_by_external_user(&self.pool, actor.id)
            .await?
            .ok_or(AppError::EmployeeNotLinked)
    }

    pub async fn update_profile(
        &self,
        actor: &AuthUser,
        input: &UpdateProfilePayload,
    ) -> Result<Employee, AppError> {
        let me = self.profile(actor).await?;
        let updated = self.repo.update_profile(&self.pool, me.id, input).await?;
        found(updated, format!("Employee {}", me.id))
    }

    // --- QUEM ESTÁ AGINDO POR QUEM ---

    /// Funcionário em nome de quem o usuário age. Admin pode escolher
    /// qualquer um; os demais só a si mesmos.
    pub async fn acting_employee_id(
        &self,
        actor: &AuthUser,
        requested: Option<i64>,
    ) -> Result<i64, AppError> {
        if actor.role.is_admin() && requested.is_some() {
            return resolve_target(true, None, requested);
        }
        let own = self
            .repo
            .find_by_external_user(&self.pool, actor.id)
            .await?
            .map(|e| e.id);
        resolve_target(actor.role.is_admin(), own, requested)
    }

    /// Filtro de listagem: admin vê o que pediu; funcionário, só o que é seu.
    pub async fn scope_filter(
        &self,
        actor: &AuthUser,
        requested: Option<i64>,
    ) -> Result<Option<i64>, AppError> {
        if actor.role.is_admin() {
            return Ok(requested);
        }
        self.acting_employee_id(actor, requested).await.map(Some)
    }

    pub async fn ensure_can_access(&self, actor: &AuthUser, owner_id: i64) -> Result<(), AppError> {
        if actor.role.is_admin() {
            return Ok(());
        }
        let own = self.acting_employee_id(actor, None).await?;
        if own != owner_id {
            return Err(AppError::Forbidden);
        }
        Ok(())
    }
}

pub(crate) fn resolve_target(
    is_admin: bool,
    own: Option<i64>,
    requested: Option<i64>,
) -> Result<i64, AppError> {
    if is_admin {
        return requested
            .or(own)
            .ok_or_else(|| field_error("employeeId", "required"));
    }

    let own = own.ok_or(AppError::EmployeeNotLinked)?;
    match requested {
        Some(other) if other != own => Err(AppError::Forbidden),
        _ => Ok(own),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_may_act_for_anyone() {
        assert_eq!(resolve_target(true, None, Some(5)).unwrap(), 5);
        assert_eq!(resolve_target(true, Some(1), None).unwrap(), 1);
        assert!(matches!(resolve_target(true, None, None), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn employee_is_limited_to_own_record() {
        assert_eq!(resolve_target(false, Some(3), None).unwrap(), 3);
        assert_eq!(resolve_target(false, Some(3), Some(3)).unwrap(), 3);
        assert!(matches!(resolve_target(false, Some(3), Some(4)), Err(AppError::Forbidden)));
        assert!(matches!(resolve_target(false, None, None), Err(AppError::EmployeeNotLinked)));
    }
}
