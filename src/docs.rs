// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Employees / ESS ---
        handlers::employees::list_employees,
        handlers::employees::get_employee,
        handlers::employees::create_employee,
        handlers::employees::update_employee,
        handlers::employees::delete_employee,
        handlers::ess::get_profile,
        handlers::ess::update_profile,
        handlers::ess::summary,

        // --- Solicitações ---
        handlers::requests::leave::list,
        handlers::requests::leave::pending,
        handlers::requests::leave::get,
        handlers::requests::leave::decide,
        handlers::requests::leave::delete,
        handlers::requests::create_leave,
        handlers::requests::timesheet::list,
        handlers::requests::timesheet::pending,
        handlers::requests::timesheet::get,
        handlers::requests::timesheet::decide,
        handlers::requests::timesheet::delete,
        handlers::requests::create_timesheet,
        handlers::requests::reimbursement::list,
        handlers::requests::reimbursement::pending,
        handlers::requests::reimbursement::get,
        handlers::requests::reimbursement::decide,
        handlers::requests::reimbursement::delete,
        handlers::requests::create_reimbursement,
        handlers::requests::history,

        // --- LMS ---
        handlers::lms::list_courses,
        handlers::lms::get_course,
        handlers::lms::create_course,
        handlers::lms::update_course,
        handlers::lms::delete_course,
        handlers::lms::course_eligibility,
        handlers::lms::list_plans,
        handlers::lms::get_plan,
        handlers::lms::create_plan,
        handlers::lms::update_plan,
        handlers::lms::delete_plan,
        handlers::lms::enroll_in_plan,
        handlers::lms::plan_progress,
        handlers::lms::list_progress,
        handlers::lms::update_progress,
        handlers::lms::enroll,
        handlers::lms::bulk_enroll,
        handlers::lms::user_overview,

        // --- Training ---
        handlers::training::list_trainings,
        handlers::training::get_training,
        handlers::training::create_training,
        handlers::training::update_training,
        handlers::training::delete_training,
        handlers::training::list_applications,
        handlers::training::apply,
        handlers::training::review_application,
        handlers::training::cancel_application,
        handlers::training::list_completions,
        handlers::training::record_completion,
        handlers::training::list_certificates,
        handlers::training::issue_certificate,
        handlers::training::submit_feedback,
        handlers::training::list_feedback,
        handlers::training::feedback_summary,
        handlers::documents::download_certificate,

        // --- Talent ---
        handlers::talent::list_competencies,
        handlers::talent::get_competency,
        handlers::talent::create_competency,
        handlers::talent::update_competency,
        handlers::talent::delete_competency,
        handlers::talent::list_succession_plans,
        handlers::talent::get_succession_plan,
        handlers::talent::create_succession_plan,
        handlers::talent::update_succession_plan,
        handlers::talent::delete_succession_plan,

        // --- Dashboard ---
        handlers::dashboard::get_summary,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::AuthUser,

            // --- Employees ---
            models::employee::EmployeeStatus,
            models::employee::Employee,
            models::employee::CreateEmployeePayload,
            models::employee::UpdateEmployeePayload,
            models::employee::UpdateProfilePayload,

            // --- Requests ---
            models::requests::RequestStatus,
            models::requests::RequestKind,
            models::requests::LeaveRequest,
            models::requests::TimesheetAdjustment,
            models::requests::Reimbursement,
            models::requests::RequestDecision,
            models::requests::CreateLeavePayload,
            models::requests::CreateTimesheetPayload,
            models::requests::CreateReimbursementPayload,
            models::requests::DecisionPayload,

            // --- LMS ---
            models::lms::CourseLevel,
            models::lms::PublishStatus,
            models::lms::ProgressSource,
            models::lms::ProgressStatus,
            models::lms::Course,
            models::lms::LearningPlan,
            models::lms::LearningProgress,
            models::lms::CreateCoursePayload,
            models::lms::UpdateCoursePayload,
            models::lms::CreateLearningPlanPayload,
            models::lms::UpdateLearningPlanPayload,
            models::lms::UpdateProgressPayload,
            models::lms::EnrollPayload,
            models::lms::BulkEnrollPayload,
            models::lms::PlanEnrollPayload,
            models::lms::PlanProgress,
            models::lms::LearningOverview,
            models::lms::Ineligibility,
            models::lms::Eligibility,
            models::lms::EnrollmentOutcome,
            models::lms::PlanEnrollmentResult,
            models::lms::UserLearningOverview,

            // --- Training ---
            models::training::TrainingStatus,
            models::training::ApplicationStatus,
            models::training::Training,
            models::training::TrainingApplication,
            models::training::TrainingCompletion,
            models::training::TrainingCertificate,
            models::training::TrainingFeedback,
            models::training::FeedbackSummary,
            models::training::CreateTrainingPayload,
            models::training::UpdateTrainingPayload,
            models::training::ApplyTrainingPayload,
            models::training::ReviewApplicationPayload,
            models::training::CreateCompletionPayload,
            models::training::IssueCertificatePayload,
            models::training::CreateFeedbackPayload,

            // --- Talent ---
            models::talent::ProficiencyLevel,
            models::talent::ReadinessLevel,
            models::talent::Competency,
            models::talent::SuccessionPlan,
            models::talent::CreateCompetencyPayload,
            models::talent::UpdateCompetencyPayload,
            models::talent::CreateSuccessionPlanPayload,
            models::talent::UpdateSuccessionPlanPayload,

            // --- Dashboard ---
            models::dashboard::DashboardSummary,
            models::dashboard::StatusCounts,
            models::dashboard::EssSummary,
        )
    ),
    tags(
        (name = "Employees", description = "Cadastro de Funcionários"),
        (name = "ESS", description = "Autoatendimento do Funcionário"),
        (name = "Leave Requests", description = "Solicitações de Ausência"),
        (name = "Timesheet Adjustments", description = "Ajustes de Ponto"),
        (name = "Reimbursements", description = "Reembolsos"),
        (name = "Requests", description = "Histórico de Decisões"),
        (name = "LMS", description = "Cursos, Planos e Progresso"),
        (name = "Training", description = "Treinamentos, Inscrições e Certificados"),
        (name = "Talent", description = "Competências e Sucessão"),
        (name = "Dashboard", description = "Indicadores Gerenciais")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
