// src/common/error.rs

use std::collections::HashMap;
use std::sync::LazyLock;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;

// Catálogo usado quando não há AppState à mão (ex: rejeição de extratores)
static FALLBACK_STORE: LazyLock<I18nStore> = LazyLock::new(I18nStore::new);

// Erros de domínio e infraestrutura. Nunca chegam crus ao cliente:
// passam sempre por `to_api_error`, que traduz e escolhe o status HTTP.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado")]
    Forbidden,

    #[error("Serviço de autenticação indisponível: {0}")]
    AuthServiceUnavailable(String),

    #[error("Recurso não encontrado: {0}")]
    ResourceNotFound(String),

    #[error("Funcionário não vinculado ao usuário autenticado")]
    EmployeeNotLinked,

    #[error("Transição inválida de {from} para {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Solicitação já processada")]
    RequestAlreadyProcessed,

    #[error("Usuário já matriculado no curso")]
    AlreadyEnrolled,

    #[error("Pré-requisitos não concluídos: {0:?}")]
    PrerequisitesNotMet(Vec<i64>),

    #[error("Pré-requisitos formam um ciclo: {0:?}")]
    PrerequisiteCycle(Vec<i64>),

    #[error("Treinamento sem vagas")]
    TrainingFull,

    #[error("Treinamento não aceita inscrições")]
    TrainingClosed,

    #[error("Conclusão não aprovada, certificado indisponível")]
    CompletionNotPassed,

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    #[error("Referência inválida: {0}")]
    InvalidReference(String),

    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

// O que realmente vai para o cliente.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl AppError {
    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let lang = locale.0.as_str();

        let simple = |status: StatusCode, key: &str, args: &[&str]| ApiError {
            status,
            error: store.translate(lang, key, args),
            details: None,
        };

        match self {
            AppError::ValidationError(errors) => ApiError {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                error: store.translate(lang, "validation.failed", &[]),
                details: Some(validation_details(errors, lang, store)),
            },
            AppError::InvalidToken => simple(StatusCode::UNAUTHORIZED, "auth.invalid_token", &[]),
            AppError::Forbidden => simple(StatusCode::FORBIDDEN, "auth.forbidden", &[]),
            AppError::EmployeeNotLinked => simple(StatusCode::FORBIDDEN, "employee.not_linked", &[]),
            AppError::ResourceNotFound(what) => simple(StatusCode::NOT_FOUND, "resource.not_found", &[what.as_str()]),
            AppError::InvalidTransition { from, to } => {
                simple(StatusCode::CONFLICT, "request.invalid_transition", &[from.as_str(), to.as_str()])
            }
            AppError::RequestAlreadyProcessed => simple(StatusCode::CONFLICT, "request.already_processed", &[]),
            AppError::AlreadyEnrolled => simple(StatusCode::CONFLICT, "lms.already_enrolled", &[]),
            AppError::PrerequisitesNotMet(missing) => ApiError {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                error: store.translate(lang, "lms.prerequisites_not_met", &[]),
                details: Some(json!({ "missingPrerequisites": missing })),
            },
            AppError::PrerequisiteCycle(path) => ApiError {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                error: store.translate(lang, "lms.prerequisite_cycle", &[]),
                details: Some(json!({ "cycle": path })),
            },
            AppError::TrainingFull => simple(StatusCode::CONFLICT, "tms.training_full", &[]),
            AppError::TrainingClosed => simple(StatusCode::CONFLICT, "tms.training_closed", &[]),
            AppError::CompletionNotPassed => simple(StatusCode::UNPROCESSABLE_ENTITY, "tms.completion_not_passed", &[]),
            AppError::UniqueConstraintViolation(what) => simple(StatusCode::CONFLICT, "db.unique_violation", &[what.as_str()]),
            AppError::InvalidReference(what) => simple(StatusCode::UNPROCESSABLE_ENTITY, "db.invalid_reference", &[what.as_str()]),

            // Todos os outros erros viram 500. O detalhe fica só no log.
            e => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                simple(StatusCode::INTERNAL_SERVER_ERROR, "internal.unexpected", &[])
            }
        }
    }
}

fn validation_details(
    errors: &validator::ValidationErrors,
    lang: &str,
    store: &I18nStore,
) -> Value {
    let mut details: HashMap<String, Vec<String>> = HashMap::new();
    for (field, field_errors) in errors.field_errors() {
        let messages = field_errors
            .iter()
            .map(|e| {
                // A mensagem declarada no #[validate] é uma chave do catálogo ("required", "range"...)
                let code = e.message.as_deref().unwrap_or(e.code.as_ref());
                store.translate(lang, &format!("validation.{}", code), &[])
            })
            .collect();
        details.insert(field.to_string(), messages);
    }
    json!(details)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

// Usado pelos extratores, que rejeitam antes de termos o Locale negociado.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default(), &FALLBACK_STORE).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{ValidationError, ValidationErrors};

    fn en() -> Locale {
        Locale("en".to_string())
    }

    #[test]
    fn status_codes_follow_the_taxonomy() {
        let store = I18nStore::new();
        let cases = [
            (AppError::InvalidToken, StatusCode::UNAUTHORIZED),
            (AppError::Forbidden, StatusCode::FORBIDDEN),
            (AppError::ResourceNotFound("Leave request 1".into()), StatusCode::NOT_FOUND),
            (AppError::RequestAlreadyProcessed, StatusCode::CONFLICT),
            (AppError::AuthServiceUnavailable("timeout".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::PrerequisitesNotMet(vec![3]), StatusCode::UNPROCESSABLE_ENTITY),
        ];

        for (err, expected) in cases {
            assert_eq!(err.to_api_error(&en(), &store).status, expected, "{:?}", err);
        }
    }

    #[test]
    fn validation_errors_carry_field_details() {
        let store = I18nStore::new();
        let mut errors = ValidationErrors::new();
        let mut err = ValidationError::new("length");
        err.message = Some("required".into());
        errors.add("reason", err);

        let api = AppError::ValidationError(errors).to_api_error(&en(), &store);

        assert_eq!(api.status, StatusCode::UNPROCESSABLE_ENTITY);
        let details = api.details.expect("details");
        assert_eq!(details["reason"][0], "This field is required.");
    }

    #[test]
    fn not_found_message_is_translated() {
        let store = I18nStore::new();
        let pt = Locale("pt".to_string());

        let api = AppError::ResourceNotFound("Curso 9".into()).to_api_error(&pt, &store);

        assert_eq!(api.error, "Recurso não encontrado: Curso 9");
    }
}
