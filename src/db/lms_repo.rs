// src/db/lms_repo.rs

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::{db_utils::map_constraint_error, error::AppError},
    models::lms::{
        Course, CourseFilter, CourseLevel, CreateCoursePayload, CreateLearningPlanPayload,
        LearningPlan, LearningProgress, ProgressFilter, ProgressSource, ProgressStatus,
        PublishStatus, UpdateCoursePayload, UpdateLearningPlanPayload,
    },
};

// enrolled_count não é coluna: sai sempre de learning_progress
const COURSE_COLUMNS: &str = r#"
    c.*,
    (SELECT COUNT(*) FROM learning_progress lp WHERE lp.course_id = c.id) AS enrolled_count
"#;

#[derive(Clone)]
pub struct LmsRepository {
    pool: PgPool,
}

impl LmsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CURSOS
    // =========================================================================

    pub async fn list_courses(&self, filter: &CourseFilter) -> Result<Vec<Course>, AppError> {
        let search = filter.search.as_deref().map(|s| format!("%{}%", s.trim()));
        let sql = format!(
            r#"
            SELECT {COURSE_COLUMNS} FROM courses c
            WHERE ($1::publish_status IS NULL OR c.status = $1)
              AND ($2::TEXT IS NULL OR c.category = $2)
              AND ($3::TEXT IS NULL OR c.title ILIKE $3 OR c.description ILIKE $3)
            ORDER BY c.title
            "#
        );

        let courses = sqlx::query_as::<_, Course>(&sql)
            .bind(filter.status)
            .bind(filter.category.as_deref())
            .bind(search)
            .fetch_all(&self.pool)
            .await?;
        Ok(courses)
    }

    pub async fn find_course<'e, E>(&self, executor: E, id: i64) -> Result<Option<Course>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {COURSE_COLUMNS} FROM courses c WHERE c.id = $1");
        let course = sqlx::query_as::<_, Course>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(course)
    }

    /// Dos IDs informados, quais existem.
    pub async fn existing_course_ids<'e, E>(&self, executor: E, ids: &[i64]) -> Result<Vec<i64>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_scalar::<_, i64>("SELECT id FROM courses WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(executor)
            .await?;
        Ok(rows)
    }

    pub async fn existing_employee_ids<'e, E>(&self, executor: E, ids: &[i64]) -> Result<Vec<i64>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_scalar::<_, i64>("SELECT id FROM employees WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(executor)
            .await?;
        Ok(rows)
    }

    /// Grafo completo curso -> pré-requisitos.
    pub async fn prerequisite_graph<'e, E>(&self, executor: E) -> Result<HashMap<i64, Vec<i64>>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, (i64, Vec<i64>)>("SELECT id, prerequisites FROM courses")
            .fetch_all(executor)
            .await?;
        Ok(rows.into_iter().collect())
    }

    pub async fn create_course<'e, E>(
        &self,
        executor: E,
        input: &CreateCoursePayload,
        created_by: i64,
    ) -> Result<Course, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Course>(
            r#"
            WITH inserted AS (
                INSERT INTO courses (
                    title, description, category, level, duration_hours,
                    instructor, tags, prerequisites, status, created_by
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                RETURNING *
            )
            SELECT inserted.*, 0::BIGINT AS enrolled_count FROM inserted
            "#,
        )
        .bind(input.title.trim())
        .bind(input.description.as_deref())
        .bind(input.category.trim())
        .bind(input.level.unwrap_or(CourseLevel::Beginner))
        .bind(input.duration_hours)
        .bind(input.instructor.as_deref())
        .bind(&input.tags)
        .bind(&input.prerequisites)
        .bind(input.status.unwrap_or(PublishStatus::Draft))
        .bind(created_by)
        .fetch_one(executor)
        .await
        .map_err(|e| map_constraint_error(e, "course"))
    }

    pub async fn update_course<'e, E>(
        &self,
        executor: E,
        id: i64,
        input: &UpdateCoursePayload,
    ) -> Result<Option<Course>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Course>(
            r#"
            WITH updated AS (
                UPDATE courses SET
                    title = COALESCE($2, title),
                    description = COALESCE($3, description),
                    category = COALESCE($4, category),
                    level = COALESCE($5, level),
                    duration_hours = COALESCE($6, duration_hours),
                    instructor = COALESCE($7, instructor),
                    tags = COALESCE($8, tags),
                    prerequisites = COALESCE($9, prerequisites),
                    status = COALESCE($10, status),
                    updated_at = NOW()
                WHERE id = $1
                RETURNING *
            )
            SELECT u.*,
                   (SELECT COUNT(*) FROM learning_progress lp WHERE lp.course_id = u.id) AS enrolled_count
            FROM updated u
            "#,
        )
        .bind(id)
        .bind(input.title.as_deref())
        .bind(input.description.as_deref())
        .bind(input.category.as_deref())
        .bind(input.level)
        .bind(input.duration_hours)
        .bind(input.instructor.as_deref())
        .bind(input.tags.as_ref())
        .bind(input.prerequisites.as_ref())
        .bind(input.status)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_constraint_error(e, "course"))
    }

    pub async fn delete_course<'e, E>(&self, executor: E, id: i64) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Tira o curso das listas de pré-requisitos de outros cursos e dos planos.
    /// Arrays não têm FK, então a limpeza é explícita.
    pub async fn detach_course<'e, E>(&self, executor: E, id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            WITH prereqs AS (
                UPDATE courses SET prerequisites = array_remove(prerequisites, $1), updated_at = NOW()
                WHERE $1 = ANY(prerequisites)
            )
            UPDATE learning_plans SET courses = array_remove(courses, $1), updated_at = NOW()
            WHERE $1 = ANY(courses)
            "#,
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(())
    }

    // =========================================================================
    //  PLANOS DE APRENDIZAGEM
    // =========================================================================

    pub async fn list_plans(&self) -> Result<Vec<LearningPlan>, AppError> {
        let plans = sqlx::query_as::<_, LearningPlan>("SELECT * FROM learning_plans ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(plans)
    }

    pub async fn find_plan<'e, E>(&self, executor: E, id: i64) -> Result<Option<LearningPlan>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let plan = sqlx::query_as::<_, LearningPlan>("SELECT * FROM learning_plans WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(plan)
    }

    pub async fn create_plan<'e, E>(
        &self,
        executor: E,
        input: &CreateLearningPlanPayload,
        created_by: i64,
    ) -> Result<LearningPlan, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let plan = sqlx::query_as::<_, LearningPlan>(
            r#"
            INSERT INTO learning_plans (title, description, courses, status, due_date, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(input.title.trim())
        .bind(input.description.as_deref())
        .bind(&input.courses)
        .bind(input.status.unwrap_or(PublishStatus::Draft))
        .bind(input.due_date)
        .bind(created_by)
        .fetch_one(executor)
        .await?;
        Ok(plan)
    }

    pub async fn update_plan<'e, E>(
        &self,
        executor: E,
        id: i64,
        input: &UpdateLearningPlanPayload,
    ) -> Result<Option<LearningPlan>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let plan = sqlx::query_as::<_, LearningPlan>(
            r#"
            UPDATE learning_plans SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                courses = COALESCE($4, courses),
                status = COALESCE($5, status),
                due_date = COALESCE($6, due_date),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.title.as_deref())
        .bind(input.description.as_deref())
        .bind(input.courses.as_ref())
        .bind(input.status)
        .bind(input.due_date)
        .fetch_optional(executor)
        .await?;
        Ok(plan)
    }

    pub async fn delete_plan<'e, E>(&self, executor: E, id: i64) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM learning_plans WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Acrescenta usuários ao plano preservando a ordem e sem repetir.
    pub async fn assign_users<'e, E>(
        &self,
        executor: E,
        plan_id: i64,
        user_ids: &[i64],
    ) -> Result<Option<LearningPlan>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let plan = sqlx::query_as::<_, LearningPlan>(
            r#"
            UPDATE learning_plans SET
                assigned_users = assigned_users || ARRAY(
                    SELECT u FROM unnest($2::BIGINT[]) AS u
                    WHERE u <> ALL(assigned_users)
                ),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(plan_id)
        .bind(user_ids)
        .fetch_optional(executor)
        .await?;
        Ok(plan)
    }

    // =========================================================================
    //  PROGRESSO
    // =========================================================================

    pub async fn list_progress(&self, filter: &ProgressFilter) -> Result<Vec<LearningProgress>, AppError> {
        let rows = sqlx::query_as::<_, LearningProgress>(
            r#"
            SELECT * FROM learning_progress
            WHERE ($1::BIGINT IS NULL OR user_id = $1)
              AND ($2::BIGINT IS NULL OR course_id = $2)
              AND ($3::progress_status IS NULL OR status = $3)
            ORDER BY updated_at DESC, id DESC
            "#,
        )
        .bind(filter.user_id)
        .bind(filter.course_id)
        .bind(filter.status)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn progress_for_user<'e, E>(&self, executor: E, user_id: i64) -> Result<Vec<LearningProgress>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, LearningProgress>(
            "SELECT * FROM learning_progress WHERE user_id = $1 ORDER BY course_id",
        )
        .bind(user_id)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    pub async fn find_progress<'e, E>(&self, executor: E, id: i64) -> Result<Option<LearningProgress>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, LearningProgress>("SELECT * FROM learning_progress WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    /// Cria a matrícula. `None` quando o usuário já tinha registro no curso.
    pub async fn insert_progress<'e, E>(
        &self,
        executor: E,
        user_id: i64,
        course_id: i64,
        source: ProgressSource,
        source_id: Option<i64>,
        due_date: Option<NaiveDate>,
    ) -> Result<Option<LearningProgress>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, LearningProgress>(
            r#"
            INSERT INTO learning_progress (user_id, course_id, source, source_id, due_date)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, course_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .bind(source)
        .bind(source_id)
        .bind(due_date)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_constraint_error(e, "employee or course"))
    }

    pub async fn update_progress<'e, E>(
        &self,
        executor: E,
        id: i64,
        progress: i32,
        status: ProgressStatus,
        score: Option<Decimal>,
        due_date: Option<NaiveDate>,
    ) -> Result<Option<LearningProgress>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, LearningProgress>(
            r#"
            UPDATE learning_progress SET
                progress = $2,
                status = $3,
                score = COALESCE($4, score),
                due_date = COALESCE($5, due_date),
                started_at = CASE
                    WHEN started_at IS NULL AND $2 > 0 THEN NOW()
                    ELSE started_at
                END,
                completed_at = CASE
                    WHEN $3 = 'completed'::progress_status THEN COALESCE(completed_at, NOW())
                    ELSE NULL
                END,
                last_accessed_at = NOW(),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(progress)
        .bind(status)
        .bind(score)
        .bind(due_date)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_constraint_error(e, "learning progress"))
    }
}
