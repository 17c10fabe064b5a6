// src/models/training.rs
//
// TMS: treinamentos presenciais/externos, inscrições, conclusões,
// certificados e avaliações.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::common::{
    db_utils::{field_error, not_blank},
    error::AppError,
};

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "training_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TrainingStatus {
    Planned,
    Ongoing,
    Completed,
    Cancelled,
}

impl TrainingStatus {
    /// Ainda aceita inscrições e aprovações.
    pub fn is_open(self) -> bool {
        matches!(self, TrainingStatus::Planned | TrainingStatus::Ongoing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "application_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Applied,
    Approved,
    Rejected,
    Cancelled,
}

impl ApplicationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Cancelled => "cancelled",
        }
    }

    pub fn can_transition_to(self, next: ApplicationStatus) -> bool {
        use ApplicationStatus::*;
        matches!(
            (self, next),
            (Applied, Approved) | (Applied, Rejected) | (Applied, Cancelled) | (Approved, Cancelled)
        )
    }
}

// --- Registros ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Training {
    pub id: i64,
    #[schema(example = "Liderança Situacional")]
    pub title: String,
    pub description: Option<String>,
    pub provider: Option<String>,
    #[schema(example = "workshop")]
    pub training_type: String,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Sem capacidade = vagas ilimitadas
    pub capacity: Option<i32>,
    pub status: TrainingStatus,
    /// Inscrições aprovadas (calculado)
    pub approved_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrainingApplication {
    pub id: i64,
    pub training_id: i64,
    pub employee_id: i64,
    pub motivation: Option<String>,
    pub status: ApplicationStatus,
    pub review_notes: Option<String>,
    pub reviewed_by: Option<i64>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub applied_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrainingCompletion {
    pub id: i64,
    pub application_id: i64,
    pub completion_date: NaiveDate,
    pub score: Option<Decimal>,
    pub passed: bool,
    pub remarks: Option<String>,
    pub recorded_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrainingCertificate {
    pub id: i64,
    pub completion_id: i64,
    #[schema(example = "CERT-1A2B3C4D")]
    pub certificate_number: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: Option<NaiveDate>,
    pub issued_by: Option<i64>,
}

/// Tudo o que o PDF do certificado precisa, numa consulta só.
#[derive(Debug, Clone, FromRow)]
pub struct CertificateDetails {
    pub certificate_number: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: Option<NaiveDate>,
    pub employee_name: String,
    pub training_title: String,
    pub provider: Option<String>,
    pub completion_date: NaiveDate,
    pub score: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrainingFeedback {
    pub id: i64,
    pub training_id: i64,
    pub employee_id: i64,
    #[schema(example = 5)]
    pub rating: i16,
    pub comments: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackSummary {
    pub training_id: i64,
    pub count: usize,
    /// Média com duas casas; 0 sem avaliações
    pub average_rating: f64,
    /// Quantidade de notas 1..=5 (índice 0 = nota 1)
    pub distribution: [usize; 5],
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTrainingPayload {
    #[validate(custom(function = "not_blank"))]
    pub title: String,
    pub description: Option<String>,
    pub provider: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub training_type: String,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[validate(range(min = 1, message = "range"))]
    pub capacity: Option<i32>,
    pub status: Option<TrainingStatus>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTrainingPayload {
    #[validate(custom(function = "not_blank"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub provider: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub training_type: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[validate(range(min = 1, message = "range"))]
    pub capacity: Option<i32>,
    pub status: Option<TrainingStatus>,
}

/// Datas do treinamento coerentes quando ambas estão presentes.
pub fn check_training_dates(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<(), AppError> {
    match (start, end) {
        (Some(s), Some(e)) if e < s => Err(field_error("endDate", "date_order")),
        _ => Ok(()),
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyTrainingPayload {
    pub training_id: i64,
    /// Administradores podem inscrever outro funcionário
    pub employee_id: Option<i64>,
    pub motivation: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewApplicationPayload {
    #[schema(example = "approved")]
    pub status: ApplicationStatus,
    pub review_notes: Option<String>,
}

impl ReviewApplicationPayload {
    /// Revisão só aprova ou rejeita; cancelar tem rota própria.
    pub fn target(&self) -> Result<ApplicationStatus, AppError> {
        match self.status {
            ApplicationStatus::Approved | ApplicationStatus::Rejected => Ok(self.status),
            _ => Err(field_error("status", "review")),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompletionPayload {
    pub application_id: i64,
    pub completion_date: NaiveDate,
    pub score: Option<Decimal>,
    #[serde(default = "default_passed")]
    pub passed: bool,
    pub remarks: Option<String>,
}

fn default_passed() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueCertificatePayload {
    pub completion_id: i64,
    pub expires_at: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFeedbackPayload {
    pub training_id: i64,
    #[validate(range(min = 1, max = 5, message = "range"))]
    pub rating: i16,
    pub comments: Option<String>,
}

// --- Filtros ---

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TrainingFilter {
    pub status: Option<TrainingStatus>,
    pub training_type: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ApplicationFilter {
    pub training_id: Option<i64>,
    pub employee_id: Option<i64>,
    pub status: Option<ApplicationStatus>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CompletionFilter {
    pub training_id: Option<i64>,
    pub employee_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CertificateFilter {
    pub employee_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_transitions() {
        use ApplicationStatus::*;
        assert!(Applied.can_transition_to(Approved));
        assert!(Applied.can_transition_to(Rejected));
        assert!(Applied.can_transition_to(Cancelled));
        assert!(Approved.can_transition_to(Cancelled));

        assert!(!Approved.can_transition_to(Rejected));
        assert!(!Rejected.can_transition_to(Approved));
        assert!(!Cancelled.can_transition_to(Applied));
        assert!(!Applied.can_transition_to(Applied));
    }

    #[test]
    fn review_accepts_only_decisions() {
        let review = |status| ReviewApplicationPayload { status, review_notes: None };
        assert_eq!(review(ApplicationStatus::Approved).target().unwrap(), ApplicationStatus::Approved);
        assert!(review(ApplicationStatus::Cancelled).target().is_err());
        assert!(review(ApplicationStatus::Applied).target().is_err());
    }

    #[test]
    fn closed_trainings_do_not_accept_applications() {
        assert!(TrainingStatus::Planned.is_open());
        assert!(TrainingStatus::Ongoing.is_open());
        assert!(!TrainingStatus::Completed.is_open());
        assert!(!TrainingStatus::Cancelled.is_open());
    }

    #[test]
    fn training_dates_must_be_ordered() {
        let d = |day| NaiveDate::from_ymd_opt(2025, 5, day);
        assert!(check_training_dates(d(10), d(12)).is_ok());
        assert!(check_training_dates(d(10), None).is_ok());
        assert!(check_training_dates(d(12), d(10)).is_err());
    }
}
