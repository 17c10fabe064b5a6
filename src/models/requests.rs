// src/models/requests.rs
//
// Solicitações do autoatendimento (férias, ajuste de ponto, reembolso).
// As três seguem o mesmo ciclo de vida: nascem Pending e terminam
// Approved ou Rejected, sem volta.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::common::{
    db_utils::{field_error, not_blank},
    error::AppError,
};

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "request_status")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestStatus::Pending => write!(f, "Pending"),
            RequestStatus::Approved => write!(f, "Approved"),
            RequestStatus::Rejected => write!(f, "Rejected"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "request_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Leave,
    Timesheet,
    Reimbursement,
}

impl RequestKind {
    pub fn label(self) -> &'static str {
        match self {
            RequestKind::Leave => "Leave request",
            RequestKind::Timesheet => "Timesheet adjustment",
            RequestKind::Reimbursement => "Reimbursement",
        }
    }
}

/// Decisão do administrador. Aceita os dois vocabulários usados pelo
/// frontend: Approved/Accepted e Rejected/Denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "approved" | "accepted" | "approve" | "accept" => Some(Decision::Approve),
            "rejected" | "denied" | "reject" | "deny" => Some(Decision::Reject),
            _ => None,
        }
    }

    pub fn target_status(self) -> RequestStatus {
        match self {
            Decision::Approve => RequestStatus::Approved,
            Decision::Reject => RequestStatus::Rejected,
        }
    }
}

// --- Mapeamento tabela <-> ciclo de vida ---

/// O que o repositório genérico precisa saber de cada tipo de solicitação.
pub trait RequestRecord: for<'r> FromRow<'r, PgRow> + Serialize + Send + Unpin {
    const KIND: RequestKind;
    const TABLE: &'static str;

    fn id(&self) -> i64;
    fn employee_id(&self) -> i64;
    fn status(&self) -> RequestStatus;
}

macro_rules! request_record {
    ($ty:ty, $kind:expr, $table:literal) => {
        impl RequestRecord for $ty {
            const KIND: RequestKind = $kind;
            const TABLE: &'static str = $table;

            fn id(&self) -> i64 { self.id }
            fn employee_id(&self) -> i64 { self.employee_id }
            fn status(&self) -> RequestStatus { self.status }
        }
    };
}

// --- Registros ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub id: i64,
    pub employee_id: i64,
    #[schema(example = "Vacation")]
    pub leave_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub status: RequestStatus,
    pub admin_notes: Option<String>,
    pub approved_by: Option<i64>,
    pub approved_at: Option<DateTime<Utc>>,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetAdjustment {
    pub id: i64,
    pub employee_id: i64,
    pub work_date: NaiveDate,
    #[schema(value_type = Option<String>, example = "08:00:00")]
    pub original_time_in: Option<NaiveTime>,
    #[schema(value_type = Option<String>, example = "17:00:00")]
    pub original_time_out: Option<NaiveTime>,
    #[schema(value_type = String, example = "09:00:00")]
    pub new_time_in: NaiveTime,
    #[schema(value_type = String, example = "18:00:00")]
    pub new_time_out: NaiveTime,
    pub reason: String,
    pub status: RequestStatus,
    pub admin_notes: Option<String>,
    pub approved_by: Option<i64>,
    pub approved_at: Option<DateTime<Utc>>,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reimbursement {
    pub id: i64,
    pub employee_id: i64,
    #[schema(example = "Travel")]
    pub reimbursement_type: String,
    #[schema(example = "150.75")]
    pub amount: Decimal,
    pub expense_date: NaiveDate,
    pub description: String,
    pub receipt_reference: Option<String>,
    pub status: RequestStatus,
    pub admin_notes: Option<String>,
    pub approved_by: Option<i64>,
    pub approved_at: Option<DateTime<Utc>>,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

request_record!(LeaveRequest, RequestKind::Leave, "leave_requests");
request_record!(TimesheetAdjustment, RequestKind::Timesheet, "timesheet_adjustments");
request_record!(Reimbursement, RequestKind::Reimbursement, "reimbursements");

// Histórico persistido de decisões
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestDecision {
    pub id: i64,
    pub request_kind: RequestKind,
    pub request_id: i64,
    pub employee_id: i64,
    pub from_status: RequestStatus,
    pub to_status: RequestStatus,
    pub decided_by: i64,
    pub notes: Option<String>,
    pub decided_at: DateTime<Utc>,
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeavePayload {
    /// Obrigatório só para administradores agindo por outro funcionário
    pub employee_id: Option<i64>,

    #[validate(custom(function = "not_blank"))]
    #[schema(example = "Vacation")]
    pub leave_type: String,

    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    #[validate(custom(function = "not_blank"))]
    #[schema(example = "Viagem em família")]
    pub reason: String,
}

impl CreateLeavePayload {
    pub fn validate_consistency(&self) -> Result<(), AppError> {
        if self.end_date < self.start_date {
            return Err(field_error("endDate", "date_order"));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTimesheetPayload {
    pub employee_id: Option<i64>,

    pub work_date: NaiveDate,

    #[schema(example = "08:00")]
    pub original_time_in: Option<String>,
    #[schema(example = "17:00")]
    pub original_time_out: Option<String>,

    #[validate(custom(function = "not_blank"))]
    #[schema(example = "09:00")]
    pub new_time_in: String,

    #[validate(custom(function = "not_blank"))]
    #[schema(example = "18:00")]
    pub new_time_out: String,

    #[validate(custom(function = "not_blank"))]
    pub reason: String,
}

/// Horários já convertidos e conferidos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimesheetTimes {
    pub original_time_in: Option<NaiveTime>,
    pub original_time_out: Option<NaiveTime>,
    pub new_time_in: NaiveTime,
    pub new_time_out: NaiveTime,
}

/// Aceita apenas "HH:MM" em 24h.
pub fn parse_hhmm(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    let bytes = raw.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return None;
    }
    NaiveTime::parse_from_str(raw, "%H:%M").ok()
}

impl CreateTimesheetPayload {
    pub fn parse_times(&self) -> Result<TimesheetTimes, AppError> {
        let new_time_in = parse_hhmm(&self.new_time_in)
            .ok_or_else(|| field_error("newTimeIn", "time_format"))?;
        let new_time_out = parse_hhmm(&self.new_time_out)
            .ok_or_else(|| field_error("newTimeOut", "time_format"))?;

        if new_time_in >= new_time_out {
            return Err(field_error("newTimeOut", "time_order"));
        }

        let original_time_in = match self.original_time_in.as_deref() {
            Some(raw) => Some(parse_hhmm(raw).ok_or_else(|| field_error("originalTimeIn", "time_format"))?),
            None => None,
        };
        let original_time_out = match self.original_time_out.as_deref() {
            Some(raw) => Some(parse_hhmm(raw).ok_or_else(|| field_error("originalTimeOut", "time_format"))?),
            None => None,
        };

        Ok(TimesheetTimes {
            original_time_in,
            original_time_out,
            new_time_in,
            new_time_out,
        })
    }
}

fn validate_positive(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.message = Some("amount_positive".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReimbursementPayload {
    pub employee_id: Option<i64>,

    #[validate(custom(function = "not_blank"))]
    #[schema(example = "Travel")]
    pub reimbursement_type: String,

    #[validate(custom(function = "validate_positive"))]
    #[schema(example = "150.75")]
    pub amount: Decimal,

    pub expense_date: NaiveDate,

    #[validate(custom(function = "not_blank"))]
    pub description: String,

    /// Referência opaca ao comprovante (o arquivo fica fora deste serviço)
    pub receipt_reference: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DecisionPayload {
    #[validate(custom(function = "not_blank"))]
    #[schema(example = "Approved")]
    pub status: String,

    #[schema(example = "Aprovado conforme escala")]
    pub admin_notes: Option<String>,
}

impl DecisionPayload {
    pub fn decision(&self) -> Result<Decision, AppError> {
        Decision::parse(&self.status).ok_or_else(|| field_error("status", "decision"))
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct RequestFilter {
    pub employee_id: Option<i64>,
    pub status: Option<RequestStatus>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct HistoryFilter {
    pub kind: Option<RequestKind>,
    pub employee_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timesheet(time_in: &str, time_out: &str) -> CreateTimesheetPayload {
        CreateTimesheetPayload {
            employee_id: None,
            work_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            original_time_in: None,
            original_time_out: None,
            new_time_in: time_in.to_string(),
            new_time_out: time_out.to_string(),
            reason: "Esqueci de bater o ponto".to_string(),
        }
    }

    #[test]
    fn timesheet_rejects_end_before_start() {
        let err = timesheet("09:00", "08:00").parse_times().unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        // Horários iguais também não fazem sentido
        assert!(timesheet("09:00", "09:00").parse_times().is_err());
    }

    #[test]
    fn timesheet_accepts_ordered_times() {
        let times = timesheet("08:30", "17:45").parse_times().unwrap();
        assert_eq!(times.new_time_in, NaiveTime::from_hms_opt(8, 30, 0).unwrap());
        assert_eq!(times.new_time_out, NaiveTime::from_hms_opt(17, 45, 0).unwrap());
    }

    #[test]
    fn hhmm_is_strict() {
        assert!(parse_hhmm("23:59").is_some());
        assert!(parse_hhmm("9:00").is_none());
        assert!(parse_hhmm("24:00").is_none());
        assert!(parse_hhmm("12:60").is_none());
        assert!(parse_hhmm("12:00:00").is_none());
    }

    #[test]
    fn decision_accepts_both_vocabularies() {
        assert_eq!(Decision::parse("Approved"), Some(Decision::Approve));
        assert_eq!(Decision::parse("accepted"), Some(Decision::Approve));
        assert_eq!(Decision::parse("Denied"), Some(Decision::Reject));
        assert_eq!(Decision::parse("Rejected").map(Decision::target_status), Some(RequestStatus::Rejected));
        assert_eq!(Decision::parse("Pending"), None);
    }

    #[test]
    fn leave_end_date_must_not_precede_start() {
        let payload = CreateLeavePayload {
            employee_id: None,
            leave_type: "Sick".into(),
            start_date: NaiveDate::from_ymd_opt(2025, 5, 10).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 5, 9).unwrap(),
            reason: "Gripe".into(),
        };
        assert!(payload.validate_consistency().is_err());
    }

    #[test]
    fn non_positive_amount_fails_validation() {
        let payload = CreateReimbursementPayload {
            employee_id: None,
            reimbursement_type: "Travel".into(),
            amount: Decimal::ZERO,
            expense_date: NaiveDate::from_ymd_opt(2025, 5, 9).unwrap(),
            description: "Táxi".into(),
            receipt_reference: None,
        };
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("amount"));
    }

    #[test]
    fn blank_text_fields_fail_validation() {
        let payload = CreateLeavePayload {
            employee_id: None,
            leave_type: "   ".into(),
            start_date: NaiveDate::from_ymd_opt(2025, 5, 9).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 5, 10).unwrap(),
            reason: " \t".into(),
        };
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("leave_type"));
        assert!(fields.contains_key("reason"));

        let filled = CreateLeavePayload { leave_type: "Vacation".into(), reason: "Viagem".into(), ..payload };
        assert!(filled.validate().is_ok());
    }
}
