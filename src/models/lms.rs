// src/models/lms.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::common::db_utils::not_blank;

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "course_level", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CourseLevel {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "publish_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
    Active,
    Inactive,
    Draft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "progress_source", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProgressSource {
    Direct,
    LearningPlan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "progress_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    NotStarted,
    InProgress,
    Completed,
    Overdue,
}

// --- Registros ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: i64,
    #[schema(example = "Segurança da Informação")]
    pub title: String,
    pub description: Option<String>,
    #[schema(example = "Compliance")]
    pub category: String,
    pub level: CourseLevel,
    pub duration_hours: Option<i32>,
    pub instructor: Option<String>,
    pub tags: Vec<String>,
    /// IDs de cursos que precisam estar concluídos antes da matrícula
    pub prerequisites: Vec<i64>,
    pub status: PublishStatus,
    pub created_by: Option<i64>,
    /// Calculado a partir de learning_progress
    #[schema(example = 7)]
    pub enrolled_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LearningPlan {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    /// Ordem sugerida de estudo
    pub courses: Vec<i64>,
    pub assigned_users: Vec<i64>,
    pub status: PublishStatus,
    pub due_date: Option<NaiveDate>,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LearningProgress {
    pub id: i64,
    pub user_id: i64,
    pub course_id: i64,
    pub source: ProgressSource,
    /// ID do plano quando `source = learning_plan`
    pub source_id: Option<i64>,
    #[schema(example = 40)]
    pub progress: i32,
    pub status: ProgressStatus,
    pub score: Option<Decimal>,
    pub due_date: Option<NaiveDate>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub last_accessed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Payloads ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCoursePayload {
    #[validate(custom(function = "not_blank"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub category: String,
    pub level: Option<CourseLevel>,
    #[validate(range(min = 0, message = "range"))]
    pub duration_hours: Option<i32>,
    pub instructor: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub prerequisites: Vec<i64>,
    pub status: Option<PublishStatus>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCoursePayload {
    #[validate(custom(function = "not_blank"))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub category: Option<String>,
    pub level: Option<CourseLevel>,
    #[validate(range(min = 0, message = "range"))]
    pub duration_hours: Option<i32>,
    pub instructor: Option<String>,
    pub tags: Option<Vec<String>>,
    pub prerequisites: Option<Vec<i64>>,
    pub status: Option<PublishStatus>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLearningPlanPayload {
    #[validate(custom(function = "not_blank"))]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub courses: Vec<i64>,
    pub status: Option<PublishStatus>,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLearningPlanPayload {
    #[validate(custom(function = "not_blank"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub courses: Option<Vec<i64>>,
    pub status: Option<PublishStatus>,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProgressPayload {
    #[validate(range(min = 0, max = 100, message = "range"))]
    #[schema(example = 60)]
    pub progress: i32,
    pub score: Option<Decimal>,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrollPayload {
    pub user_id: i64,
    pub course_id: i64,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkEnrollPayload {
    pub course_id: i64,
    #[validate(length(min = 1, message = "required"))]
    pub user_ids: Vec<i64>,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanEnrollPayload {
    #[validate(length(min = 1, message = "required"))]
    pub user_ids: Vec<i64>,
}

// --- Filtros ---

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CourseFilter {
    pub status: Option<PublishStatus>,
    pub category: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProgressFilter {
    pub user_id: Option<i64>,
    pub course_id: Option<i64>,
    pub status: Option<ProgressStatus>,
}

// `?user_id=` nas rotas de elegibilidade e progresso do plano
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserQuery {
    pub user_id: Option<i64>,
}

// --- Respostas calculadas ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PlanProgress {
    pub completed: usize,
    pub total: usize,
    /// 0..=100, arredondado
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LearningOverview {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub not_started: usize,
    pub overdue: usize,
    pub average_progress: u32,
    pub completion_percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Ineligibility {
    AlreadyEnrolled,
    MissingPrerequisites { missing: Vec<i64> },
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Eligibility {
    pub course_id: i64,
    pub user_id: i64,
    pub eligible: bool,
    pub blocked_by: Option<Ineligibility>,
}

/// Resultado por usuário da matrícula em lote.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentOutcome {
    pub user_id: i64,
    pub enrolled: bool,
    pub progress_id: Option<i64>,
    pub skipped_because: Option<Ineligibility>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanEnrollmentResult {
    pub plan: LearningPlan,
    /// Linhas de progresso criadas agora (as existentes são mantidas)
    pub created: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserLearningOverview {
    pub user_id: i64,
    pub overview: LearningOverview,
    pub records: Vec<LearningProgress>,
}
