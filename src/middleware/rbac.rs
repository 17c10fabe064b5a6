// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use std::marker::PhantomData;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::auth::UserRole,
};

/// 1. O Trait que define quem passa pelo guardião
pub trait RoleRequirement: Send + Sync + 'static {
    fn allows(role: UserRole) -> bool;
    fn label() -> &'static str;
}

/// 2. O Extractor (Guardião)
pub struct RequireRole<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleRequirement,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let locale = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok())
            .map(Locale::from_header)
            .unwrap_or_default();

        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::InvalidToken.to_api_error(&locale, &app_state.i18n_store))?;

        if !T::allows(user.0.role) {
            tracing::warn!(
                user_id = user.0.id,
                required = T::label(),
                "Acesso negado por papel insuficiente"
            );
            return Err(AppError::Forbidden.to_api_error(&locale, &app_state.i18n_store));
        }

        Ok(RequireRole(PhantomData))
    }
}

// ---
// DEFINIÇÃO DOS PAPÉIS (TIPOS)
// ---

pub struct AdminOnly;
impl RoleRequirement for AdminOnly {
    fn allows(role: UserRole) -> bool { role.is_admin() }
    fn label() -> &'static str { "admin" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_only_accepts_admins_and_managers() {
        assert!(AdminOnly::allows(UserRole::Admin));
        assert!(AdminOnly::allows(UserRole::Manager));
        assert!(!AdminOnly::allows(UserRole::Employee));
    }
}
