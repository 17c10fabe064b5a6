// src/models/auth.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Papel do usuário, como informado pelo serviço de autenticação.
// Papéis desconhecidos, ausentes ou nulos viram Employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case", from = "Option<String>")]
pub enum UserRole {
    Admin,
    Manager,
    Employee,
}

impl From<String> for UserRole {
    fn from(value: String) -> Self {
        match value.to_lowercase().as_str() {
            "admin" | "super_admin" | "administrator" => UserRole::Admin,
            "manager" | "hr" | "hr_manager" | "supervisor" => UserRole::Manager,
            _ => UserRole::Employee,
        }
    }
}

impl From<Option<String>> for UserRole {
    fn from(value: Option<String>) -> Self {
        value.map(UserRole::from).unwrap_or_default()
    }
}

impl UserRole {
    /// Pode decidir solicitações e manter cadastros de RH.
    pub fn is_admin(self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Manager)
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Employee
    }
}

// Usuário resolvido pelo serviço externo (/api/user)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    #[schema(example = 42)]
    pub id: i64,

    #[serde(default)]
    #[schema(example = "Maria Souza")]
    pub name: Option<String>,

    #[serde(default)]
    #[schema(example = "maria@empresa.com")]
    pub email: Option<String>,

    #[serde(default)]
    pub role: UserRole,
}
