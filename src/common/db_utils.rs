use crate::common::error::AppError;

// ---
// Helper: traduz violações de constraint do Postgres em erros de negócio
// ---
/// Converte erros de unicidade/FK/check em `AppError` amigável. `what` descreve o registro.
pub(crate) fn map_constraint_error(e: sqlx::Error, what: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::UniqueConstraintViolation(what.to_string());
        }
        if db_err.is_foreign_key_violation() {
            let target = db_err.constraint().unwrap_or(what);
            return AppError::InvalidReference(target.to_string());
        }
        if db_err.is_check_violation() {
            let mut errors = validator::ValidationErrors::new();
            let mut err = validator::ValidationError::new("check");
            err.message = Some("range".into());
            errors.add("payload", err);
            return AppError::ValidationError(errors);
        }
    }
    e.into()
}

/// `fetch_optional` + 404 num único lugar.
pub(crate) fn found<T>(row: Option<T>, what: impl Into<String>) -> Result<T, AppError> {
    row.ok_or_else(|| AppError::ResourceNotFound(what.into()))
}

/// Monta um `ValidationErrors` com um único campo, no mesmo formato do `validator`.
pub(crate) fn field_error(field: &'static str, message: &'static str) -> AppError {
    let mut errors = validator::ValidationErrors::new();
    let mut err = validator::ValidationError::new("invalid");
    err.message = Some(message.into());
    errors.add(field, err);
    AppError::ValidationError(errors)
}

/// Obrigatório e com conteúdo: só espaços conta como vazio.
pub(crate) fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        let mut err = validator::ValidationError::new("length");
        err.message = Some("required".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_only_is_blank() {
        assert!(not_blank("").is_err());
        assert!(not_blank("  \n\t").is_err());
        assert!(not_blank(" x ").is_ok());
    }
}
