// src/services/auth.rs

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde_json::Value;

use crate::{common::error::AppError, models::auth::AuthUser};

/// Quem sabe transformar um token em usuário. Em produção é o serviço
/// externo de autenticação; nos testes, um fake em memória.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn resolve_user(&self, token: &str) -> Result<AuthUser, AppError>;
}

#[derive(Clone)]
pub struct RemoteAuthService {
    client: reqwest::Client,
    user_url: String,
}

impl RemoteAuthService {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::InternalServerError(e.into()))?;

        Ok(Self {
            client,
            user_url: format!("{}/api/user", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl AuthProvider for RemoteAuthService {
    async fn resolve_user(&self, token: &str) -> Result<AuthUser, AppError> {
        let response = self
            .client
            .get(&self.user_url)
            .bearer_auth(token)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                tracing::error!("🔥 Falha ao contatar o serviço de autenticação: {}", e);
                AppError::AuthServiceUnavailable(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("Serviço de autenticação recusou o token ({})", status);
            return Err(AppError::InvalidToken);
        }

        let body: Value = response.json().await.map_err(|e| {
            tracing::error!("🔥 Resposta inválida do serviço de autenticação: {}", e);
            AppError::AuthServiceUnavailable(e.to_string())
        })?;

        parse_user_payload(body)
    }
}

/// Aceita tanto `{ id, ... }` quanto `{ user: { id, ... } }`.
pub fn parse_user_payload(body: Value) -> Result<AuthUser, AppError> {
    let user = match body {
        Value::Object(mut map) if map.contains_key("user") => map.remove("user").unwrap_or(Value::Null),
        other => other,
    };

    serde_json::from_value(user)
        .map_err(|e| AppError::AuthServiceUnavailable(format!("payload de usuário inválido: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::UserRole;
    use serde_json::json;

    #[test]
    fn parses_flat_and_wrapped_payloads() {
        let flat = parse_user_payload(json!({ "id": 7, "name": "Ana", "role": "admin" })).unwrap();
        assert_eq!(flat.id, 7);
        assert_eq!(flat.role, UserRole::Admin);

        let wrapped = parse_user_payload(json!({ "user": { "id": 8, "role": "hr_manager" } })).unwrap();
        assert_eq!(wrapped.id, 8);
        assert_eq!(wrapped.role, UserRole::Manager);
    }

    #[test]
    fn unknown_or_missing_role_is_employee() {
        let user = parse_user_payload(json!({ "id": 1, "role": "intern" })).unwrap();
        assert_eq!(user.role, UserRole::Employee);

        let user = parse_user_payload(json!({ "id": 2 })).unwrap();
        assert_eq!(user.role, UserRole::Employee);
        assert!(!user.role.is_admin());

        let user = parse_user_payload(json!({ "id": 3, "role": null })).unwrap();
        assert_eq!(user.role, UserRole::Employee);

        let user = parse_user_payload(json!({ "id": 4, "role": "Admin" })).unwrap();
        assert_eq!(user.role, UserRole::Admin);
    }

    #[test]
    fn payload_without_id_is_a_server_error() {
        let err = parse_user_payload(json!({ "name": "sem id" })).unwrap_err();
        assert!(matches!(err, AppError::AuthServiceUnavailable(_)));
    }

    #[tokio::test]
    async fn unreachable_service_is_reported_as_unavailable() {
        // Porta 9 (discard) em loopback: conexão recusada
        let service = RemoteAuthService::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let err = service.resolve_user("token").await.unwrap_err();
        assert!(matches!(err, AppError::AuthServiceUnavailable(_)));
    }
}
