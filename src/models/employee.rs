// src/models/employee.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::common::db_utils::not_blank;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "employee_status")]
pub enum EmployeeStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    #[schema(example = 12)]
    pub id: i64,
    // ID do usuário no serviço de autenticação
    #[schema(example = 42)]
    pub external_user_id: Option<i64>,
    #[schema(example = "Maria")]
    pub first_name: String,
    pub middle_name: Option<String>,
    #[schema(example = "Souza")]
    pub last_name: String,
    #[schema(example = "maria@empresa.com")]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[schema(example = "Recursos Humanos")]
    pub department: Option<String>,
    #[schema(example = "Analista")]
    pub position: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub status: EmployeeStatus,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        match &self.middle_name {
            Some(middle) if !middle.trim().is_empty() => {
                format!("{} {} {}", self.first_name, middle, self.last_name)
            }
            _ => format!("{} {}", self.first_name, self.last_name),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployeePayload {
    pub external_user_id: Option<i64>,

    #[validate(custom(function = "not_blank"))]
    #[schema(example = "Maria")]
    pub first_name: String,

    pub middle_name: Option<String>,

    #[validate(custom(function = "not_blank"))]
    #[schema(example = "Souza")]
    pub last_name: String,

    #[validate(email(message = "email"))]
    pub email: Option<String>,

    pub phone: Option<String>,
    pub address: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub status: Option<EmployeeStatus>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
}

// PUT /employees/{id}: campos ausentes ficam como estão
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployeePayload {
    pub external_user_id: Option<i64>,
    #[validate(custom(function = "not_blank"))]
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub last_name: Option<String>,
    #[validate(email(message = "email"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub status: Option<EmployeeStatus>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
}

// PUT /ess/profile: o próprio funcionário só altera dados de contato
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfilePayload {
    #[validate(email(message = "email"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct EmployeeFilter {
    /// Padrão: apenas Active
    pub status: Option<EmployeeStatus>,
    pub department: Option<String>,
    /// Busca por nome ou e-mail
    pub search: Option<String>,
}
