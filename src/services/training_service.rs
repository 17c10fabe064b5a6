// src/services/training_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{db_utils::found, error::AppError},
    db::TrainingRepository,
    models::{
        auth::AuthUser,
        training::{
            check_training_dates, ApplicationFilter, ApplicationStatus, ApplyTrainingPayload,
            CertificateDetails, CompletionFilter, CreateCompletionPayload, CreateFeedbackPayload,
            CreateTrainingPayload, FeedbackSummary, IssueCertificatePayload,
            ReviewApplicationPayload, Training, TrainingApplication, TrainingCertificate,
            TrainingCompletion, TrainingFeedback, TrainingFilter, UpdateTrainingPayload,
        },
    },
    services::employee_service::EmployeeService,
};

/// Capacidade `None` é ilimitada.
pub fn check_capacity(capacity: Option<i32>, approved_count: i64) -> Result<(), AppError> {
    match capacity {
        Some(cap) if approved_count >= i64::from(cap) => Err(AppError::TrainingFull),
        _ => Ok(()),
    }
}

/// "CERT-" + 8 primeiros dígitos hex de um UUID v4, em maiúsculas.
pub fn new_certificate_number() -> String {
    let id = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("CERT-{}", &id[..8])
}

pub fn summarize_feedback(training_id: i64, feedback: &[TrainingFeedback]) -> FeedbackSummary {
    let mut distribution = [0usize; 5];
    let mut sum = 0i64;
    for f in feedback {
        if (1..=5).contains(&f.rating) {
            distribution[(f.rating - 1) as usize] += 1;
        }
        sum += i64::from(f.rating);
    }

    let count = feedback.len();
    let average_rating = if count == 0 {
        0.0
    } else {
        ((sum as f64 / count as f64) * 100.0).round() / 100.0
    };

    FeedbackSummary { training_id, count, average_rating, distribution }
}

fn transition_error(from: ApplicationStatus, to: ApplicationStatus) -> AppError {
    AppError::InvalidTransition { from: from.as_str().to_string(), to: to.as_str().to_string() }
}

#[derive(Clone)]
pub struct TrainingService {
    repo: TrainingRepository,
    employees: EmployeeService,
    pool: PgPool,
}

impl TrainingService {
    pub fn new(repo: TrainingRepository, employees: EmployeeService, pool: PgPool) -> Self {
        Self { repo, employees, pool }
    }

    // =========================================================================
    //  TREINAMENTOS
    // =========================================================================

    pub async fn list(&self, filter: &TrainingFilter) -> Result<Vec<Training>, AppError> {
        self.repo.list_trainings(filter).await
    }

    pub async fn get(&self, id: i64) -> Result<Training, AppError> {
        let training = self.repo.find_training(&self.pool, id).await?;
        found(training, format!("Training {}", id))
    }

    pub async fn create(&self, input: &CreateTrainingPayload) -> Result<Training, AppError> {
        check_training_dates(input.start_date, input.end_date)?;
        let training = self.repo.create_training(&self.pool, input).await?;
        tracing::info!(training_id = training.id, "Treinamento criado");
        Ok(training)
    }

    pub async fn update(&self, id: i64, input: &UpdateTrainingPayload) -> Result<Training, AppError> {
        let current = self.get(id).await?;
        check_training_dates(
            input.start_date.or(current.start_date),
            input.end_date.or(current.end_date),
        )?;

        let training = self.repo.update_training(&self.pool, id, input).await?;
        found(training, format!("Training {}", id))
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if !self.repo.delete_training(&self.pool, id).await? {
            return Err(AppError::ResourceNotFound(format!("Training {}", id)));
        }
        tracing::info!(training_id = id, "Treinamento excluído");
        Ok(())
    }

    // =========================================================================
    //  INSCRIÇÕES
    // =========================================================================

    pub async fn apply(&self, actor: &AuthUser, input: &ApplyTrainingPayload) -> Result<TrainingApplication, AppError> {
        let employee_id = self.employees.acting_employee_id(actor, input.employee_id).await?;

        let training = self.get(input.training_id).await?;
        if !training.status.is_open() {
            return Err(AppError::TrainingClosed);
        }

        let application = self
            .repo
            .insert_application(&self.pool, training.id, employee_id, input.motivation.as_deref())
            .await?;
        tracing::info!(application_id = application.id, training_id = training.id, employee_id, "Inscrição em treinamento");
        Ok(application)
    }

    pub async fn list_applications(
        &self,
        actor: &AuthUser,
        filter: ApplicationFilter,
    ) -> Result<Vec<TrainingApplication>, AppError> {
        let employee_id = self.employees.scope_filter(actor, filter.employee_id).await?;
        self.repo
            .list_applications(&ApplicationFilter { employee_id, ..filter })
            .await
    }

    pub async fn review(
        &self,
        reviewer: &AuthUser,
        id: i64,
        input: &ReviewApplicationPayload,
    ) -> Result<TrainingApplication, AppError> {
        let target = input.target()?;

        let mut tx = self.pool.begin().await?;

        let current = self.repo.find_application(&mut *tx, id).await?;
        let current = found(current, format!("Training application {}", id))?;
        if !current.status.can_transition_to(target) {
            return Err(transition_error(current.status, target));
        }

        if target == ApplicationStatus::Approved {
            if !self.repo.lock_training(&mut *tx, current.training_id).await? {
                return Err(AppError::ResourceNotFound(format!("Training {}", current.training_id)));
            }
            // Leituras depois da trava: snapshot novo a cada comando
            let training = self.repo.find_training(&mut *tx, current.training_id).await?;
            let training = found(training, format!("Training {}", current.training_id))?;
            if !training.status.is_open() {
                return Err(AppError::TrainingClosed);
            }
            let approved = self.repo.count_approved(&mut *tx, training.id).await?;
            check_capacity(training.capacity, approved)?;
        }

        let updated = self
            .repo
            .transition_application(&mut *tx, id, current.status, target, input.review_notes.as_deref(), reviewer.id)
            .await?
            .ok_or_else(|| transition_error(current.status, target))?;

        tx.commit().await?;

        tracing::info!(application_id = id, reviewer_id = reviewer.id, status = target.as_str(), "Inscrição revisada");
        Ok(updated)
    }

    pub async fn cancel(&self, actor: &AuthUser, id: i64) -> Result<TrainingApplication, AppError> {
        let target = ApplicationStatus::Cancelled;

        let current = self.repo.find_application(&self.pool, id).await?;
        let current = found(current, format!("Training application {}", id))?;
        self.employees.ensure_can_access(actor, current.employee_id).await?;

        if !current.status.can_transition_to(target) {
            return Err(transition_error(current.status, target));
        }

        let updated = self
            .repo
            .transition_application(&self.pool, id, current.status, target, None, actor.id)
            .await?
            .ok_or_else(|| transition_error(current.status, target))?;

        tracing::info!(application_id = id, "Inscrição cancelada");
        Ok(updated)
    }

    // =========================================================================
    //  CONCLUSÕES E CERTIFICADOS
    // =========================================================================

    pub async fn record_completion(
        &self,
        actor: &AuthUser,
        input: &CreateCompletionPayload,
    ) -> Result<TrainingCompletion, AppError> {
        let mut tx = self.pool.begin().await?;

        let application = self.repo.find_application(&mut *tx, input.application_id).await?;
        let application = found(application, format!("Training application {}", input.application_id))?;
        if application.status != ApplicationStatus::Approved {
            return Err(AppError::InvalidTransition {
                from: application.status.as_str().to_string(),
                to: "completed".to_string(),
            });
        }

        let completion = self.repo.insert_completion(&mut *tx, input, actor.id).await?;
        tx.commit().await?;

        tracing::info!(completion_id = completion.id, application_id = application.id, passed = completion.passed, "Conclusão registrada");
        Ok(completion)
    }

    pub async fn list_completions(
        &self,
        actor: &AuthUser,
        filter: CompletionFilter,
    ) -> Result<Vec<TrainingCompletion>, AppError> {
        let employee_id = self.employees.scope_filter(actor, filter.employee_id).await?;
        self.repo
            .list_completions(&CompletionFilter { employee_id, ..filter })
            .await
    }

    pub async fn issue_certificate(
        &self,
        actor: &AuthUser,
        input: &IssueCertificatePayload,
    ) -> Result<TrainingCertificate, AppError> {
        let completion = self.repo.find_completion(&self.pool, input.completion_id).await?;
        let completion = found(completion, format!("Training completion {}", input.completion_id))?;
        if !completion.passed {
            return Err(AppError::CompletionNotPassed);
        }
        let application = self.repo.find_application(&self.pool, completion.application_id).await?;
        let application = found(application, format!("Training application {}", completion.application_id))?;
        if application.status != ApplicationStatus::Approved {
            return Err(AppError::InvalidTransition {
                from: application.status.as_str().to_string(),
                to: "certified".to_string(),
            });
        }

        let number = new_certificate_number();
        let certificate = self
            .repo
            .insert_certificate(&self.pool, completion.id, &number, input.expires_at, actor.id)
            .await?;

        tracing::info!(certificate_id = certificate.id, number = %certificate.certificate_number, "Certificado emitido");
        Ok(certificate)
    }

    pub async fn list_certificates(
        &self,
        actor: &AuthUser,
        employee_id: Option<i64>,
    ) -> Result<Vec<TrainingCertificate>, AppError> {
        let employee_id = self.employees.scope_filter(actor, employee_id).await?;
        self.repo.list_certificates(employee_id).await
    }

    pub async fn certificate_details(&self, actor: &AuthUser, id: i64) -> Result<CertificateDetails, AppError> {
        let row = self.repo.certificate_details(&self.pool, id).await?;
        let (owner_id, details) = found(row, format!("Training certificate {}", id))?;
        self.employees.ensure_can_access(actor, owner_id).await?;
        Ok(details)
    }

    // =========================================================================
    //  AVALIAÇÕES
    // =========================================================================

    pub async fn submit_feedback(
        &self,
        actor: &AuthUser,
        input: &CreateFeedbackPayload,
    ) -> Result<TrainingFeedback, AppError> {
        let employee_id = self.employees.acting_employee_id(actor, None).await?;
        self.get(input.training_id).await?;

        let feedback = self.repo.insert_feedback(&self.pool, employee_id, input).await?;
        tracing::info!(training_id = input.training_id, employee_id, rating = feedback.rating, "Avaliação registrada");
        Ok(feedback)
    }

    pub async fn list_feedback(&self, training_id: i64) -> Result<Vec<TrainingFeedback>, AppError> {
        self.get(training_id).await?;
        self.repo.list_feedback(training_id).await
    }

    pub async fn feedback_summary(&self, training_id: i64) -> Result<FeedbackSummary, AppError> {
        let feedback = self.list_feedback(training_id).await?;
        Ok(summarize_feedback(training_id, &feedback))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn feedback(rating: i16) -> TrainingFeedback {
        TrainingFeedback {
            id: rating as i64,
            training_id: 1,
            employee_id: rating as i64,
            rating,
            comments: None,
            submitted_at: Utc::now(),
        }
    }

    #[test]
    fn capacity_counts_approved_applications() {
        assert!(check_capacity(None, 1_000).is_ok());
        assert!(check_capacity(Some(2), 1).is_ok());
        assert!(matches!(check_capacity(Some(2), 2), Err(AppError::TrainingFull)));
    }

    #[test]
    fn certificate_numbers_are_prefixed_and_unique() {
        let a = new_certificate_number();
        let b = new_certificate_number();
        assert!(a.starts_with("CERT-"));
        assert_eq!(a.len(), 13);
        assert_ne!(a, b);
    }

    #[test]
    fn feedback_summary_averages_and_distributes() {
        let items = vec![feedback(5), feedback(4), feedback(4), feedback(1)];
        let summary = summarize_feedback(1, &items);
        assert_eq!(summary.count, 4);
        assert_eq!(summary.average_rating, 3.5);
        assert_eq!(summary.distribution, [1, 0, 0, 2, 1]);
    }

    #[test]
    fn empty_feedback_summary() {
        let summary = summarize_feedback(7, &[]);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.average_rating, 0.0);
        assert_eq!(summary.distribution, [0; 5]);
    }

    // --- Contra o banco ---

    use std::time::Duration;

    use chrono::NaiveDate;
    use sqlx::PgPool;

    use crate::{
        db::EmployeeRepository,
        models::auth::{AuthUser, UserRole},
    };

    fn admin() -> AuthUser {
        AuthUser { id: 900, name: None, email: None, role: UserRole::Admin }
    }

    fn service(pool: &PgPool) -> TrainingService {
        let employees = EmployeeService::new(EmployeeRepository::new(pool.clone()), pool.clone());
        TrainingService::new(TrainingRepository::new(pool.clone()), employees, pool.clone())
    }

    fn approve() -> ReviewApplicationPayload {
        ReviewApplicationPayload { status: ApplicationStatus::Approved, review_notes: None }
    }

    /// Treinamento com uma vaga e uma inscrição por funcionário criado.
    async fn seed_training(pool: &PgPool, applicants: usize) -> (i64, Vec<i64>) {
        let training_id: i64 = sqlx::query_scalar(
            "INSERT INTO trainings (title, training_type, capacity) VALUES ('Liderança', 'workshop', 1) RETURNING id",
        )
        .fetch_one(pool)
        .await
        .unwrap();

        let mut applications = Vec::new();
        for i in 0..applicants {
            let employee_id: i64 = sqlx::query_scalar(
                "INSERT INTO employees (first_name, last_name) VALUES ($1, 'Teste') RETURNING id",
            )
            .bind(format!("Pessoa {i}"))
            .fetch_one(pool)
            .await
            .unwrap();
            let application_id: i64 = sqlx::query_scalar(
                "INSERT INTO training_applications (training_id, employee_id) VALUES ($1, $2) RETURNING id",
            )
            .bind(training_id)
            .bind(employee_id)
            .fetch_one(pool)
            .await
            .unwrap();
            applications.push(application_id);
        }
        (training_id, applications)
    }

    async fn approved_count(pool: &PgPool, training_id: i64) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM training_applications WHERE training_id = $1 AND status = 'approved'")
            .bind(training_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn approval_waiting_on_the_lock_sees_the_committed_seat(pool: PgPool) {
        let service = service(&pool);
        let (training_id, apps) = seed_training(&pool, 2).await;

        // Outro aprovador segura a trava e ocupa a única vaga
        let mut tx = pool.begin().await.unwrap();
        sqlx::query("SELECT id FROM trainings WHERE id = $1 FOR UPDATE")
            .bind(training_id)
            .execute(&mut *tx)
            .await
            .unwrap();
        sqlx::query("UPDATE training_applications SET status = 'approved' WHERE id = $1")
            .bind(apps[0])
            .execute(&mut *tx)
            .await
            .unwrap();

        let waiting = {
            let service = service.clone();
            let second = apps[1];
            tokio::spawn(async move { service.review(&admin(), second, &approve()).await })
        };
        tokio::time::sleep(Duration::from_millis(300)).await;
        tx.commit().await.unwrap();

        let result = waiting.await.unwrap();
        assert!(matches!(result, Err(AppError::TrainingFull)), "{result:?}");
        assert_eq!(approved_count(&pool, training_id).await, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn concurrent_approvals_respect_capacity(pool: PgPool) {
        let service = service(&pool);
        let (training_id, apps) = seed_training(&pool, 2).await;

        let admin = admin();
        let payload = approve();
        let (first, second) = tokio::join!(
            service.review(&admin, apps[0], &payload),
            service.review(&admin, apps[1], &payload),
        );

        assert_eq!([first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count(), 1);
        assert_eq!(approved_count(&pool, training_id).await, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn cancelled_application_gets_no_certificate(pool: PgPool) {
        let service = service(&pool);
        let (_, apps) = seed_training(&pool, 1).await;

        service.review(&admin(), apps[0], &approve()).await.unwrap();
        let completion = service
            .record_completion(
                &admin(),
                &CreateCompletionPayload {
                    application_id: apps[0],
                    completion_date: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
                    score: None,
                    passed: true,
                    remarks: None,
                },
            )
            .await
            .unwrap();
        service.cancel(&admin(), apps[0]).await.unwrap();

        let result = service
            .issue_certificate(&admin(), &IssueCertificatePayload { completion_id: completion.id, expires_at: None })
            .await;
        assert!(matches!(result, Err(AppError::InvalidTransition { .. })), "{result:?}");
    }
}
