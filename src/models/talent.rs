// src/models/talent.rs
//
// Competências (CMS) e planos de sucessão (SPS).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::common::db_utils::not_blank;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "proficiency_level", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProficiencyLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "readiness_level")]
pub enum ReadinessLevel {
    #[sqlx(rename = "ready_now")]
    #[serde(rename = "ready_now")]
    ReadyNow,
    #[sqlx(rename = "ready_1_2_years")]
    #[serde(rename = "ready_1_2_years")]
    ReadyIn1To2Years,
    #[sqlx(rename = "ready_3_plus_years")]
    #[serde(rename = "ready_3_plus_years")]
    ReadyIn3PlusYears,
    #[sqlx(rename = "not_ready")]
    #[serde(rename = "not_ready")]
    NotReady,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Competency {
    pub id: i64,
    pub employee_id: i64,
    #[schema(example = "Negociação")]
    pub competency_name: String,
    pub category: Option<String>,
    pub proficiency_level: ProficiencyLevel,
    #[schema(example = 80)]
    pub score: Option<i32>,
    pub assessed_at: Option<NaiveDate>,
    /// Conclusão de treinamento que originou a competência, se houver
    pub acquired_from_completion_id: Option<i64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessionPlan {
    pub id: i64,
    pub role_id: Option<i64>,
    #[schema(example = "Gerente de RH")]
    pub position_title: String,
    pub employee_id: i64,
    pub readiness_level: ReadinessLevel,
    pub development_plan: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompetencyPayload {
    pub employee_id: i64,
    #[validate(custom(function = "not_blank"))]
    pub competency_name: String,
    pub category: Option<String>,
    pub proficiency_level: Option<ProficiencyLevel>,
    #[validate(range(min = 0, max = 100, message = "range"))]
    pub score: Option<i32>,
    pub assessed_at: Option<NaiveDate>,
    pub acquired_from_completion_id: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCompetencyPayload {
    #[validate(custom(function = "not_blank"))]
    pub competency_name: Option<String>,
    pub category: Option<String>,
    pub proficiency_level: Option<ProficiencyLevel>,
    #[validate(range(min = 0, max = 100, message = "range"))]
    pub score: Option<i32>,
    pub assessed_at: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSuccessionPlanPayload {
    pub role_id: Option<i64>,
    #[validate(custom(function = "not_blank"))]
    pub position_title: String,
    pub employee_id: i64,
    pub readiness_level: Option<ReadinessLevel>,
    pub development_plan: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSuccessionPlanPayload {
    pub role_id: Option<i64>,
    #[validate(custom(function = "not_blank"))]
    pub position_title: Option<String>,
    pub readiness_level: Option<ReadinessLevel>,
    pub development_plan: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CompetencyFilter {
    pub employee_id: Option<i64>,
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SuccessionFilter {
    pub employee_id: Option<i64>,
    pub readiness_level: Option<ReadinessLevel>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readiness_uses_storage_names_on_the_wire() {
        let json = serde_json::to_string(&ReadinessLevel::ReadyIn1To2Years).unwrap();
        assert_eq!(json, "\"ready_1_2_years\"");
        let parsed: ReadinessLevel = serde_json::from_str("\"ready_now\"").unwrap();
        assert_eq!(parsed, ReadinessLevel::ReadyNow);
    }
}
