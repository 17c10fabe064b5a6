// src/db/talent_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::{db_utils::map_constraint_error, error::AppError},
    models::talent::{
        Competency, CompetencyFilter, CreateCompetencyPayload, CreateSuccessionPlanPayload,
        ProficiencyLevel, ReadinessLevel, SuccessionFilter, SuccessionPlan,
        UpdateCompetencyPayload, UpdateSuccessionPlanPayload,
    },
};

#[derive(Clone)]
pub struct TalentRepository {
    pool: PgPool,
}

impl TalentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // --- Competências ---

    pub async fn list_competencies(&self, filter: &CompetencyFilter) -> Result<Vec<Competency>, AppError> {
        let rows = sqlx::query_as::<_, Competency>(
            r#"
            SELECT * FROM competencies
            WHERE ($1::BIGINT IS NULL OR employee_id = $1)
              AND ($2::TEXT IS NULL OR category = $2)
            ORDER BY employee_id, competency_name
            "#,
        )
        .bind(filter.employee_id)
        .bind(filter.category.as_deref())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn find_competency<'e, E>(&self, executor: E, id: i64) -> Result<Option<Competency>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, Competency>("SELECT * FROM competencies WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    pub async fn create_competency<'e, E>(
        &self,
        executor: E,
        input: &CreateCompetencyPayload,
    ) -> Result<Competency, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Competency>(
            r#"
            INSERT INTO competencies (
                employee_id, competency_name, category, proficiency_level,
                score, assessed_at, acquired_from_completion_id, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(input.employee_id)
        .bind(input.competency_name.trim())
        .bind(input.category.as_deref())
        .bind(input.proficiency_level.unwrap_or(ProficiencyLevel::Beginner))
        .bind(input.score)
        .bind(input.assessed_at)
        .bind(input.acquired_from_completion_id)
        .bind(input.notes.as_deref())
        .fetch_one(executor)
        .await
        .map_err(|e| map_constraint_error(e, "employee or training completion"))
    }

    pub async fn update_competency<'e, E>(
        &self,
        executor: E,
        id: i64,
        input: &UpdateCompetencyPayload,
    ) -> Result<Option<Competency>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Competency>(
            r#"
            UPDATE competencies SET
                competency_name = COALESCE($2, competency_name),
                category = COALESCE($3, category),
                proficiency_level = COALESCE($4, proficiency_level),
                score = COALESCE($5, score),
                assessed_at = COALESCE($6, assessed_at),
                notes = COALESCE($7, notes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.competency_name.as_deref())
        .bind(input.category.as_deref())
        .bind(input.proficiency_level)
        .bind(input.score)
        .bind(input.assessed_at)
        .bind(input.notes.as_deref())
        .fetch_optional(executor)
        .await
        .map_err(|e| map_constraint_error(e, "competency"))
    }

    pub async fn delete_competency<'e, E>(&self, executor: E, id: i64) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM competencies WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- Sucessão ---

    pub async fn list_succession_plans(&self, filter: &SuccessionFilter) -> Result<Vec<SuccessionPlan>, AppError> {
        let rows = sqlx::query_as::<_, SuccessionPlan>(
            r#"
            SELECT * FROM succession_plans
            WHERE ($1::BIGINT IS NULL OR employee_id = $1)
              AND ($2::readiness_level IS NULL OR readiness_level = $2)
            ORDER BY position_title, id
            "#,
        )
        .bind(filter.employee_id)
        .bind(filter.readiness_level)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn find_succession_plan<'e, E>(&self, executor: E, id: i64) -> Result<Option<SuccessionPlan>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, SuccessionPlan>("SELECT * FROM succession_plans WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    pub async fn create_succession_plan<'e, E>(
        &self,
        executor: E,
        input: &CreateSuccessionPlanPayload,
    ) -> Result<SuccessionPlan, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, SuccessionPlan>(
            r#"
            INSERT INTO succession_plans (
                role_id, position_title, employee_id, readiness_level, development_plan, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(input.role_id)
        .bind(input.position_title.trim())
        .bind(input.employee_id)
        .bind(input.readiness_level.unwrap_or(ReadinessLevel::NotReady))
        .bind(input.development_plan.as_deref())
        .bind(input.notes.as_deref())
        .fetch_one(executor)
        .await
        .map_err(|e| map_constraint_error(e, "employee"))
    }

    pub async fn update_succession_plan<'e, E>(
        &self,
        executor: E,
        id: i64,
        input: &UpdateSuccessionPlanPayload,
    ) -> Result<Option<SuccessionPlan>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, SuccessionPlan>(
            r#"
            UPDATE succession_plans SET
                role_id = COALESCE($2, role_id),
                position_title = COALESCE($3, position_title),
                readiness_level = COALESCE($4, readiness_level),
                development_plan = COALESCE($5, development_plan),
                notes = COALESCE($6, notes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.role_id)
        .bind(input.position_title.as_deref())
        .bind(input.readiness_level)
        .bind(input.development_plan.as_deref())
        .bind(input.notes.as_deref())
        .fetch_optional(executor)
        .await?;
        Ok(row)
    }

    pub async fn delete_succession_plan<'e, E>(&self, executor: E, id: i64) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM succession_plans WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
