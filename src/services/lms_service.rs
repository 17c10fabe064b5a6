// src/services/lms_service.rs

use std::collections::HashSet;

use chrono::Utc;
use sqlx::PgPool;

use crate::{
    common::{
        db_utils::{field_error, found},
        error::AppError,
    },
    db::LmsRepository,
    models::{
        auth::AuthUser,
        lms::{
            BulkEnrollPayload, Course, CourseFilter, CreateCoursePayload,
            CreateLearningPlanPayload, Eligibility, EnrollPayload, EnrollmentOutcome,
            Ineligibility, LearningPlan, LearningProgress, PlanEnrollPayload,
            PlanEnrollmentResult, PlanProgress, ProgressFilter, ProgressSource,
            UpdateCoursePayload, UpdateLearningPlanPayload, UpdateProgressPayload,
            UserLearningOverview,
        },
    },
    services::{employee_service::EmployeeService, progress},
};

fn dedup(ids: &[i64]) -> Vec<i64> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

fn blocker_error(blocker: Ineligibility) -> AppError {
    match blocker {
        Ineligibility::AlreadyEnrolled => AppError::AlreadyEnrolled,
        Ineligibility::MissingPrerequisites { missing } => AppError::PrerequisitesNotMet(missing),
    }
}

#[derive(Clone)]
pub struct LmsService {
    repo: LmsRepository,
    employees: EmployeeService,
    pool: PgPool,
}

impl LmsService {
    pub fn new(repo: LmsRepository, employees: EmployeeService, pool: PgPool) -> Self {
        Self { repo, employees, pool }
    }

    // =========================================================================
    //  CURSOS
    // =========================================================================

    pub async fn list_courses(&self, filter: &CourseFilter) -> Result<Vec<Course>, AppError> {
        self.repo.list_courses(filter).await
    }

    pub async fn get_course(&self, id: i64) -> Result<Course, AppError> {
        let course = self.repo.find_course(&self.pool, id).await?;
        found(course, format!("Course {}", id))
    }

    /// IDs desconhecidos viram 422; ciclos (inclusive auto-referência) também.
    async fn check_prerequisites(&self, course_id: Option<i64>, prerequisites: &[i64]) -> Result<(), AppError> {
        if prerequisites.is_empty() {
            return Ok(());
        }

        if let Some(id) = course_id {
            if prerequisites.contains(&id) {
                return Err(AppError::PrerequisiteCycle(vec![id, id]));
            }
        }

        let existing: HashSet<i64> = self
            .repo
            .existing_course_ids(&self.pool, prerequisites)
            .await?
            .into_iter()
            .collect();
        if prerequisites.iter().any(|id| !existing.contains(id)) {
            return Err(field_error("prerequisites", "unknown_courses"));
        }

        // Curso novo ainda não é pré-requisito de ninguém: só existe ciclo na edição
        if let Some(id) = course_id {
            let mut graph = self.repo.prerequisite_graph(&self.pool).await?;
            graph.remove(&id);
            if let Some(cycle) = progress::find_prerequisite_cycle(id, prerequisites, &graph) {
                return Err(AppError::PrerequisiteCycle(cycle));
            }
        }
        Ok(())
    }

    pub async fn create_course(&self, actor: &AuthUser, input: &CreateCoursePayload) -> Result<Course, AppError> {
        let prerequisites = dedup(&input.prerequisites);
        self.check_prerequisites(None, &prerequisites).await?;

        let input = CreateCoursePayload { prerequisites, ..input.clone() };
        let course = self.repo.create_course(&self.pool, &input, actor.id).await?;
        tracing::info!(course_id = course.id, "Curso criado");
        Ok(course)
    }

    pub async fn update_course(&self, id: i64, input: &UpdateCoursePayload) -> Result<Course, AppError> {
        let prerequisites = input.prerequisites.as_deref().map(dedup);
        if let Some(prereqs) = &prerequisites {
            // 404 antes de validar o grafo
            self.get_course(id).await?;
            self.check_prerequisites(Some(id), prereqs).await?;
        }

        let input = UpdateCoursePayload { prerequisites, ..input.clone() };
        let course = self.repo.update_course(&self.pool, id, &input).await?;
        found(course, format!("Course {}", id))
    }

    pub async fn delete_course(&self, id: i64) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        if !self.repo.delete_course(&mut *tx, id).await? {
            return Err(AppError::ResourceNotFound(format!("Course {}", id)));
        }
        self.repo.detach_course(&mut *tx, id).await?;
        tx.commit().await?;
        tracing::info!(course_id = id, "Curso excluído");
        Ok(())
    }

    pub async fn eligibility(
        &self,
        actor: &AuthUser,
        course_id: i64,
        user_id: Option<i64>,
    ) -> Result<Eligibility, AppError> {
        let user_id = self.employees.acting_employee_id(actor, user_id).await?;
        let course = self.get_course(course_id).await?;
        let records = self.repo.progress_for_user(&self.pool, user_id).await?;

        let blocked_by = progress::enrollment_blocker(&course, &records);
        Ok(Eligibility {
            course_id,
            user_id,
            eligible: blocked_by.is_none(),
            blocked_by,
        })
    }

    // =========================================================================
    //  PLANOS
    // =========================================================================

    pub async fn list_plans(&self) -> Result<Vec<LearningPlan>, AppError> {
        self.repo.list_plans().await
    }

    pub async fn get_plan(&self, id: i64) -> Result<LearningPlan, AppError> {
        let plan = self.repo.find_plan(&self.pool, id).await?;
        found(plan, format!("Learning plan {}", id))
    }

    async fn check_courses_exist(&self, courses: &[i64]) -> Result<(), AppError> {
        if courses.is_empty() {
            return Ok(());
        }
        let existing: HashSet<i64> = self
            .repo
            .existing_course_ids(&self.pool, courses)
            .await?
            .into_iter()
            .collect();
        if courses.iter().any(|id| !existing.contains(id)) {
            return Err(field_error("courses", "unknown_courses"));
        }
        Ok(())
    }

    async fn check_users_exist(&self, user_ids: &[i64]) -> Result<(), AppError> {
        if user_ids.is_empty() {
            return Ok(());
        }
        let existing: HashSet<i64> = self
            .repo
            .existing_employee_ids(&self.pool, user_ids)
            .await?
            .into_iter()
            .collect();
        if user_ids.iter().any(|id| !existing.contains(id)) {
            return Err(field_error("userIds", "unknown_users"));
        }
        Ok(())
    }

    pub async fn create_plan(
        &self,
        actor: &AuthUser,
        input: &CreateLearningPlanPayload,
    ) -> Result<LearningPlan, AppError> {
        let courses = dedup(&input.courses);
        self.check_courses_exist(&courses).await?;

        let input = CreateLearningPlanPayload { courses, ..input.clone() };
        let plan = self.repo.create_plan(&self.pool, &input, actor.id).await?;
        tracing::info!(plan_id = plan.id, "Plano de aprendizagem criado");
        Ok(plan)
    }

    pub async fn update_plan(&self, id: i64, input: &UpdateLearningPlanPayload) -> Result<LearningPlan, AppError> {
        let courses = input.courses.as_deref().map(dedup);
        if let Some(courses) = &courses {
            self.check_courses_exist(courses).await?;
        }

        let input = UpdateLearningPlanPayload { courses, ..input.clone() };
        let plan = self.repo.update_plan(&self.pool, id, &input).await?;
        found(plan, format!("Learning plan {}", id))
    }

    pub async fn delete_plan(&self, id: i64) -> Result<(), AppError> {
        if !self.repo.delete_plan(&self.pool, id).await? {
            return Err(AppError::ResourceNotFound(format!("Learning plan {}", id)));
        }
        Ok(())
    }

    /// Atribui o plano e cria o progresso de cada curso. A ordem do plano
    /// é confiável, então pré-requisitos não são conferidos aqui.
    pub async fn enroll_in_plan(
        &self,
        plan_id: i64,
        input: &PlanEnrollPayload,
    ) -> Result<PlanEnrollmentResult, AppError> {
        let user_ids = dedup(&input.user_ids);
        self.check_users_exist(&user_ids).await?;

        let mut tx = self.pool.begin().await?;

        let plan = self
            .repo
            .assign_users(&mut *tx, plan_id, &user_ids)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Learning plan {}", plan_id)))?;

        let mut created = 0;
        let mut skipped = 0;
        for &user_id in &user_ids {
            for &course_id in &plan.courses {
                let inserted = self
                    .repo
                    .insert_progress(
                        &mut *tx,
                        user_id,
                        course_id,
                        ProgressSource::LearningPlan,
                        Some(plan.id),
                        plan.due_date,
                    )
                    .await?;
                match inserted {
                    Some(_) => created += 1,
                    None => skipped += 1,
                }
            }
        }

        tx.commit().await?;

        tracing::info!(plan_id, users = user_ids.len(), created, skipped, "Usuários matriculados no plano");
        Ok(PlanEnrollmentResult { plan, created, skipped })
    }

    pub async fn plan_progress(
        &self,
        actor: &AuthUser,
        plan_id: i64,
        user_id: Option<i64>,
    ) -> Result<PlanProgress, AppError> {
        let user_id = self.employees.acting_employee_id(actor, user_id).await?;
        let plan = self.get_plan(plan_id).await?;
        let records = self.repo.progress_for_user(&self.pool, user_id).await?;
        Ok(progress::calculate_plan_progress(&plan.courses, &records))
    }

    // =========================================================================
    //  PROGRESSO E MATRÍCULAS
    // =========================================================================

    pub async fn list_progress(&self, actor: &AuthUser, filter: ProgressFilter) -> Result<Vec<LearningProgress>, AppError> {
        let user_id = self.employees.scope_filter(actor, filter.user_id).await?;
        self.repo
            .list_progress(&ProgressFilter { user_id, ..filter })
            .await
    }

    pub async fn update_progress(
        &self,
        actor: &AuthUser,
        id: i64,
        input: &UpdateProgressPayload,
    ) -> Result<LearningProgress, AppError> {
        let current = self.repo.find_progress(&self.pool, id).await?;
        let current = found(current, format!("Learning progress {}", id))?;
        self.employees.ensure_can_access(actor, current.user_id).await?;

        let due_date = input.due_date.or(current.due_date);
        let status = progress::derive_status(input.progress, due_date, Utc::now().date_naive());

        let updated = self
            .repo
            .update_progress(&self.pool, id, input.progress, status, input.score, input.due_date)
            .await?;
        let updated = found(updated, format!("Learning progress {}", id))?;

        tracing::info!(progress_id = id, progress = updated.progress, status = ?updated.status, "Progresso atualizado");
        Ok(updated)
    }

    pub async fn enroll(&self, actor: &AuthUser, input: &EnrollPayload) -> Result<LearningProgress, AppError> {
        let user_id = self.employees.acting_employee_id(actor, Some(input.user_id)).await?;

        let mut tx = self.pool.begin().await?;

        let course = self
            .repo
            .find_course(&mut *tx, input.course_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Course {}", input.course_id)))?;
        let records = self.repo.progress_for_user(&mut *tx, user_id).await?;

        if let Some(blocker) = progress::enrollment_blocker(&course, &records) {
            return Err(blocker_error(blocker));
        }

        let record = self
            .repo
            .insert_progress(&mut *tx, user_id, course.id, ProgressSource::Direct, None, input.due_date)
            .await?
            .ok_or(AppError::AlreadyEnrolled)?;

        tx.commit().await?;

        tracing::info!(user_id, course_id = course.id, "Matrícula realizada");
        Ok(record)
    }

    /// Matrícula em lote: quem não puder é pulado com o motivo.
    pub async fn bulk_enroll(&self, input: &BulkEnrollPayload) -> Result<Vec<EnrollmentOutcome>, AppError> {
        let mut tx = self.pool.begin().await?;

        let course = self
            .repo
            .find_course(&mut *tx, input.course_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Course {}", input.course_id)))?;

        let mut outcomes = Vec::with_capacity(input.user_ids.len());
        for user_id in dedup(&input.user_ids) {
            let records = self.repo.progress_for_user(&mut *tx, user_id).await?;

            if let Some(blocker) = progress::enrollment_blocker(&course, &records) {
                outcomes.push(EnrollmentOutcome {
                    user_id,
                    enrolled: false,
                    progress_id: None,
                    skipped_because: Some(blocker),
                });
                continue;
            }

            let inserted = self
                .repo
                .insert_progress(&mut *tx, user_id, course.id, ProgressSource::Direct, None, input.due_date)
                .await?;
            outcomes.push(EnrollmentOutcome {
                user_id,
                enrolled: inserted.is_some(),
                progress_id: inserted.as_ref().map(|r| r.id),
                skipped_because: inserted.is_none().then_some(Ineligibility::AlreadyEnrolled),
            });
        }

        tx.commit().await?;

        let enrolled = outcomes.iter().filter(|o| o.enrolled).count();
        tracing::info!(course_id = course.id, enrolled, skipped = outcomes.len() - enrolled, "Matrícula em lote");
        Ok(outcomes)
    }

    pub async fn user_overview(&self, actor: &AuthUser, user_id: i64) -> Result<UserLearningOverview, AppError> {
        self.employees.ensure_can_access(actor, user_id).await?;
        let records = self.repo.progress_for_user(&self.pool, user_id).await?;
        Ok(UserLearningOverview {
            user_id,
            overview: progress::overall_progress(&records),
            records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_keeps_first_occurrence_order() {
        assert_eq!(dedup(&[3, 1, 3, 2, 1]), vec![3, 1, 2]);
        assert!(dedup(&[]).is_empty());
    }

    #[test]
    fn blockers_map_to_conflict_and_unprocessable() {
        assert!(matches!(blocker_error(Ineligibility::AlreadyEnrolled), AppError::AlreadyEnrolled));
        assert!(matches!(
            blocker_error(Ineligibility::MissingPrerequisites { missing: vec![4] }),
            AppError::PrerequisitesNotMet(ref m) if m == &vec![4]
        ));
    }

    // --- Contra o banco ---

    use crate::{db::EmployeeRepository, models::auth::UserRole};

    fn admin() -> AuthUser {
        AuthUser { id: 900, name: None, email: None, role: UserRole::Admin }
    }

    fn service(pool: &PgPool) -> LmsService {
        let employees = EmployeeService::new(EmployeeRepository::new(pool.clone()), pool.clone());
        LmsService::new(LmsRepository::new(pool.clone()), employees, pool.clone())
    }

    async fn seed_course(pool: &PgPool, title: &str, prerequisites: &[i64]) -> i64 {
        sqlx::query_scalar(
            "INSERT INTO courses (title, category, prerequisites, status) VALUES ($1, 'Gestão', $2, 'active') RETURNING id",
        )
        .bind(title)
        .bind(prerequisites)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    async fn seed_plan(pool: &PgPool, courses: &[i64]) -> i64 {
        sqlx::query_scalar("INSERT INTO learning_plans (title, courses) VALUES ('Trilha', $1) RETURNING id")
            .bind(courses)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn deleted_course_leaves_prerequisites_and_plans(pool: PgPool) {
        let service = service(&pool);
        let basics = seed_course(&pool, "Fundamentos", &[]).await;
        let advanced = seed_course(&pool, "Avançado", &[basics]).await;
        let plan_id = seed_plan(&pool, &[basics, advanced]).await;
        let employee_id: i64 =
            sqlx::query_scalar("INSERT INTO employees (first_name, last_name) VALUES ('Rui', 'Costa') RETURNING id")
                .fetch_one(&pool)
                .await
                .unwrap();

        service.delete_course(basics).await.unwrap();

        assert!(service.get_course(advanced).await.unwrap().prerequisites.is_empty());
        assert_eq!(service.get_plan(plan_id).await.unwrap().courses, vec![advanced]);

        // Sem o pré-requisito fantasma o curso volta a aceitar matrícula
        let eligibility = service.eligibility(&admin(), advanced, Some(employee_id)).await.unwrap();
        assert!(eligibility.eligible);

        assert!(matches!(service.delete_course(basics).await, Err(AppError::ResourceNotFound(_))));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn plan_enrollment_rejects_unknown_users(pool: PgPool) {
        let service = service(&pool);
        let plan_id = seed_plan(&pool, &[]).await;

        let result = service
            .enroll_in_plan(plan_id, &PlanEnrollPayload { user_ids: vec![424_242] })
            .await;
        assert!(matches!(result, Err(AppError::ValidationError(_))), "{result:?}");
        assert!(service.get_plan(plan_id).await.unwrap().assigned_users.is_empty());
    }
}
