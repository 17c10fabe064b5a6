// src/db/training_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::{db_utils::map_constraint_error, error::AppError},
    models::training::{
        ApplicationFilter, ApplicationStatus, CertificateDetails, CompletionFilter,
        CreateCompletionPayload, CreateFeedbackPayload, CreateTrainingPayload, Training,
        TrainingApplication, TrainingCertificate, TrainingCompletion, TrainingFeedback,
        TrainingFilter, TrainingStatus, UpdateTrainingPayload,
    },
};

const TRAINING_COLUMNS: &str = r#"
    t.*,
    (SELECT COUNT(*) FROM training_applications a
      WHERE a.training_id = t.id AND a.status = 'approved') AS approved_count
"#;

#[derive(Clone)]
pub struct TrainingRepository {
    pool: PgPool,
}

impl TrainingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  TREINAMENTOS
    // =========================================================================

    pub async fn list_trainings(&self, filter: &TrainingFilter) -> Result<Vec<Training>, AppError> {
        let sql = format!(
            r#"
            SELECT {TRAINING_COLUMNS} FROM trainings t
            WHERE ($1::training_status IS NULL OR t.status = $1)
              AND ($2::TEXT IS NULL OR t.training_type = $2)
            ORDER BY t.start_date DESC NULLS LAST, t.id DESC
            "#
        );
        let rows = sqlx::query_as::<_, Training>(&sql)
            .bind(filter.status)
            .bind(filter.training_type.as_deref())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn find_training<'e, E>(&self, executor: E, id: i64) -> Result<Option<Training>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {TRAINING_COLUMNS} FROM trainings t WHERE t.id = $1");
        let row = sqlx::query_as::<_, Training>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    /// Trava a linha do treinamento até o fim da transação. Não lê nada além
    /// do id: contagens devem ser feitas em um comando posterior, que enxerga
    /// as aprovações confirmadas enquanto esperávamos a trava.
    pub async fn lock_training<'e, E>(&self, executor: E, id: i64) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM trainings WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(row.is_some())
    }

    pub async fn count_approved<'e, E>(&self, executor: E, training_id: i64) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM training_applications WHERE training_id = $1 AND status = 'approved'",
        )
        .bind(training_id)
        .fetch_one(executor)
        .await?;
        Ok(count)
    }

    pub async fn create_training<'e, E>(
        &self,
        executor: E,
        input: &CreateTrainingPayload,
    ) -> Result<Training, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Training>(
            r#"
            WITH inserted AS (
                INSERT INTO trainings (
                    title, description, provider, training_type, location,
                    start_date, end_date, capacity, status
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                RETURNING *
            )
            SELECT inserted.*, 0::BIGINT AS approved_count FROM inserted
            "#,
        )
        .bind(input.title.trim())
        .bind(input.description.as_deref())
        .bind(input.provider.as_deref())
        .bind(input.training_type.trim())
        .bind(input.location.as_deref())
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(input.capacity)
        .bind(input.status.unwrap_or(TrainingStatus::Planned))
        .fetch_one(executor)
        .await
        .map_err(|e| map_constraint_error(e, "training"))
    }

    pub async fn update_training<'e, E>(
        &self,
        executor: E,
        id: i64,
        input: &UpdateTrainingPayload,
    ) -> Result<Option<Training>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Training>(
            r#"
            WITH updated AS (
                UPDATE trainings SET
                    title = COALESCE($2, title),
                    description = COALESCE($3, description),
                    provider = COALESCE($4, provider),
                    training_type = COALESCE($5, training_type),
                    location = COALESCE($6, location),
                    start_date = COALESCE($7, start_date),
                    end_date = COALESCE($8, end_date),
                    capacity = COALESCE($9, capacity),
                    status = COALESCE($10, status),
                    updated_at = NOW()
                WHERE id = $1
                RETURNING *
            )
            SELECT u.*,
                   (SELECT COUNT(*) FROM training_applications a
                     WHERE a.training_id = u.id AND a.status = 'approved') AS approved_count
            FROM updated u
            "#,
        )
        .bind(id)
        .bind(input.title.as_deref())
        .bind(input.description.as_deref())
        .bind(input.provider.as_deref())
        .bind(input.training_type.as_deref())
        .bind(input.location.as_deref())
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(input.capacity)
        .bind(input.status)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_constraint_error(e, "training"))
    }

    pub async fn delete_training<'e, E>(&self, executor: E, id: i64) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM trainings WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  INSCRIÇÕES
    // =========================================================================

    pub async fn list_applications(&self, filter: &ApplicationFilter) -> Result<Vec<TrainingApplication>, AppError> {
        let rows = sqlx::query_as::<_, TrainingApplication>(
            r#"
            SELECT * FROM training_applications
            WHERE ($1::BIGINT IS NULL OR training_id = $1)
              AND ($2::BIGINT IS NULL OR employee_id = $2)
              AND ($3::application_status IS NULL OR status = $3)
            ORDER BY applied_at DESC, id DESC
            "#,
        )
        .bind(filter.training_id)
        .bind(filter.employee_id)
        .bind(filter.status)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn find_application<'e, E>(&self, executor: E, id: i64) -> Result<Option<TrainingApplication>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, TrainingApplication>("SELECT * FROM training_applications WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    pub async fn insert_application<'e, E>(
        &self,
        executor: E,
        training_id: i64,
        employee_id: i64,
        motivation: Option<&str>,
    ) -> Result<TrainingApplication, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, TrainingApplication>(
            r#"
            INSERT INTO training_applications (training_id, employee_id, motivation)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(training_id)
        .bind(employee_id)
        .bind(motivation)
        .fetch_one(executor)
        .await
        .map_err(|e| map_constraint_error(e, "training application"))
    }

    /// Troca de status condicionada ao status lido antes (`from`).
    pub async fn transition_application<'e, E>(
        &self,
        executor: E,
        id: i64,
        from: ApplicationStatus,
        to: ApplicationStatus,
        review_notes: Option<&str>,
        reviewed_by: i64,
    ) -> Result<Option<TrainingApplication>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, TrainingApplication>(
            r#"
            UPDATE training_applications SET
                status = $3,
                review_notes = COALESCE($4, review_notes),
                reviewed_by = $5,
                reviewed_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .bind(review_notes)
        .bind(reviewed_by)
        .fetch_optional(executor)
        .await?;
        Ok(row)
    }

    // =========================================================================
    //  CONCLUSÕES
    // =========================================================================

    pub async fn list_completions(&self, filter: &CompletionFilter) -> Result<Vec<TrainingCompletion>, AppError> {
        let rows = sqlx::query_as::<_, TrainingCompletion>(
            r#"
            SELECT c.* FROM training_completions c
            JOIN training_applications a ON a.id = c.application_id
            WHERE ($1::BIGINT IS NULL OR a.training_id = $1)
              AND ($2::BIGINT IS NULL OR a.employee_id = $2)
            ORDER BY c.completion_date DESC, c.id DESC
            "#,
        )
        .bind(filter.training_id)
        .bind(filter.employee_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn find_completion<'e, E>(&self, executor: E, id: i64) -> Result<Option<TrainingCompletion>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, TrainingCompletion>("SELECT * FROM training_completions WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    pub async fn insert_completion<'e, E>(
        &self,
        executor: E,
        input: &CreateCompletionPayload,
        recorded_by: i64,
    ) -> Result<TrainingCompletion, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, TrainingCompletion>(
            r#"
            INSERT INTO training_completions (application_id, completion_date, score, passed, remarks, recorded_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(input.application_id)
        .bind(input.completion_date)
        .bind(input.score)
        .bind(input.passed)
        .bind(input.remarks.as_deref())
        .bind(recorded_by)
        .fetch_one(executor)
        .await
        .map_err(|e| map_constraint_error(e, "training completion"))
    }

    // =========================================================================
    //  CERTIFICADOS
    // =========================================================================

    pub async fn list_certificates(&self, employee_id: Option<i64>) -> Result<Vec<TrainingCertificate>, AppError> {
        let rows = sqlx::query_as::<_, TrainingCertificate>(
            r#"
            SELECT cert.* FROM training_certificates cert
            JOIN training_completions c ON c.id = cert.completion_id
            JOIN training_applications a ON a.id = c.application_id
            WHERE ($1::BIGINT IS NULL OR a.employee_id = $1)
            ORDER BY cert.issued_at DESC, cert.id DESC
            "#,
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn insert_certificate<'e, E>(
        &self,
        executor: E,
        completion_id: i64,
        certificate_number: &str,
        expires_at: Option<chrono::NaiveDate>,
        issued_by: i64,
    ) -> Result<TrainingCertificate, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, TrainingCertificate>(
            r#"
            INSERT INTO training_certificates (completion_id, certificate_number, expires_at, issued_by)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(completion_id)
        .bind(certificate_number)
        .bind(expires_at)
        .bind(issued_by)
        .fetch_one(executor)
        .await
        .map_err(|e| map_constraint_error(e, "training certificate"))
    }

    /// Dados do certificado + dono (employee_id) para controle de acesso.
    pub async fn certificate_details<'e, E>(
        &self,
        executor: E,
        id: i64,
    ) -> Result<Option<(i64, CertificateDetails)>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        #[derive(sqlx::FromRow)]
        struct Row {
            employee_id: i64,
            #[sqlx(flatten)]
            details: CertificateDetails,
        }

        let row = sqlx::query_as::<_, Row>(
            r#"
            SELECT
                a.employee_id,
                cert.certificate_number,
                cert.issued_at,
                cert.expires_at,
                concat_ws(' ', e.first_name, NULLIF(e.middle_name, ''), e.last_name) AS employee_name,
                t.title AS training_title,
                t.provider,
                c.completion_date,
                c.score
            FROM training_certificates cert
            JOIN training_completions c ON c.id = cert.completion_id
            JOIN training_applications a ON a.id = c.application_id
            JOIN trainings t ON t.id = a.training_id
            JOIN employees e ON e.id = a.employee_id
            WHERE cert.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(row.map(|r| (r.employee_id, r.details)))
    }

    // =========================================================================
    //  AVALIAÇÕES
    // =========================================================================

    pub async fn insert_feedback<'e, E>(
        &self,
        executor: E,
        employee_id: i64,
        input: &CreateFeedbackPayload,
    ) -> Result<TrainingFeedback, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, TrainingFeedback>(
            r#"
            INSERT INTO training_feedback (training_id, employee_id, rating, comments)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(input.training_id)
        .bind(employee_id)
        .bind(input.rating)
        .bind(input.comments.as_deref())
        .fetch_one(executor)
        .await
        .map_err(|e| map_constraint_error(e, "training feedback"))
    }

    pub async fn list_feedback(&self, training_id: i64) -> Result<Vec<TrainingFeedback>, AppError> {
        let rows = sqlx::query_as::<_, TrainingFeedback>(
            "SELECT * FROM training_feedback WHERE training_id = $1 ORDER BY submitted_at DESC",
        )
        .bind(training_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
