// src/services/talent_service.rs

use sqlx::PgPool;

use crate::{
    common::{db_utils::found, error::AppError},
    db::TalentRepository,
    models::{
        auth::AuthUser,
        talent::{
            Competency, CompetencyFilter, CreateCompetencyPayload, CreateSuccessionPlanPayload,
            SuccessionFilter, SuccessionPlan, UpdateCompetencyPayload, UpdateSuccessionPlanPayload,
        },
    },
    services::employee_service::EmployeeService,
};

#[derive(Clone)]
pub struct TalentService {
    repo: TalentRepository,
    employees: EmployeeService,
    pool: PgPool,
}

impl TalentService {
    pub fn new(repo: TalentRepository, employees: EmployeeService, pool: PgPool) -> Self {
        Self { repo, employees, pool }
    }

    // --- Competências: funcionário consulta as suas, admin gerencia ---

    pub async fn list_competencies(
        &self,
        actor: &AuthUser,
        filter: CompetencyFilter,
    ) -> Result<Vec<Competency>, AppError> {
        let employee_id = self.employees.scope_filter(actor, filter.employee_id).await?;
        self.repo
            .list_competencies(&CompetencyFilter { employee_id, ..filter })
            .await
    }

    pub async fn get_competency(&self, actor: &AuthUser, id: i64) -> Result<Competency, AppError> {
        let competency = self.repo.find_competency(&self.pool, id).await?;
        let competency = found(competency, format!("Competency {}", id))?;
        self.employees.ensure_can_access(actor, competency.employee_id).await?;
        Ok(competency)
    }

    pub async fn create_competency(&self, input: &CreateCompetencyPayload) -> Result<Competency, AppError> {
        let competency = self.repo.create_competency(&self.pool, input).await?;
        tracing::info!(competency_id = competency.id, employee_id = competency.employee_id, "Competência registrada");
        Ok(competency)
    }

    pub async fn update_competency(&self, id: i64, input: &UpdateCompetencyPayload) -> Result<Competency, AppError> {
        let competency = self.repo.update_competency(&self.pool, id, input).await?;
        found(competency, format!("Competency {}", id))
    }

    pub async fn delete_competency(&self, id: i64) -> Result<(), AppError> {
        if !self.repo.delete_competency(&self.pool, id).await? {
            return Err(AppError::ResourceNotFound(format!("Competency {}", id)));
        }
        Ok(())
    }

    // --- Sucessão: só administradores ---

    pub async fn list_succession_plans(&self, filter: &SuccessionFilter) -> Result<Vec<SuccessionPlan>, AppError> {
        self.repo.list_succession_plans(filter).await
    }

    pub async fn get_succession_plan(&self, id: i64) -> Result<SuccessionPlan, AppError> {
        let plan = self.repo.find_succession_plan(&self.pool, id).await?;
        found(plan, format!("Succession plan {}", id))
    }

    pub async fn create_succession_plan(&self, input: &CreateSuccessionPlanPayload) -> Result<SuccessionPlan, AppError> {
        let plan = self.repo.create_succession_plan(&self.pool, input).await?;
        tracing::info!(plan_id = plan.id, employee_id = plan.employee_id, "Plano de sucessão criado");
        Ok(plan)
    }

    pub async fn update_succession_plan(
        &self,
        id: i64,
        input: &UpdateSuccessionPlanPayload,
    ) -> Result<SuccessionPlan, AppError> {
        let plan = self.repo.update_succession_plan(&self.pool, id, input).await?;
        found(plan, format!("Succession plan {}", id))
    }

    pub async fn delete_succession_plan(&self, id: i64) -> Result<(), AppError> {
        if !self.repo.delete_succession_plan(&self.pool, id).await? {
            return Err(AppError::ResourceNotFound(format!("Succession plan {}", id)));
        }
        Ok(())
    }
}
