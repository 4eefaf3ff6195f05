// src/models/auth.rs

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::tenancy::Plan;

/// E-mails são comparados e gravados sem espaços e em minúsculas.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// --- Enums ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Hr,
    Admin,
    Manager,
    Employee,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Hr => "hr",
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Employee => "employee",
        }
    }

    /// Cargos com acesso às telas de gestão (RH) e à emissão de convites.
    pub fn is_hr_capable(self) -> bool {
        matches!(self, Role::Hr | Role::Admin | Role::Manager)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: String,

    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Dados de um usuário ainda não persistido (senha já com hash).
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

// ---
// Sessão
// ---
/// Identidade resolvida a partir da credencial assinada. É a única base
/// para decisões de autorização.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub role: Role,
    pub name: String,
}

impl SessionUser {
    pub fn is_hr_capable(&self) -> bool {
        self.role.is_hr_capable()
    }

    /// Escopo de dados desta sessão: RH enxerga o tenant inteiro,
    /// colaboradores apenas o próprio onboarding.
    pub fn data_scope(&self) -> DataScope {
        DataScope {
            tenant_id: self.tenant_id,
            owner_id: (!self.is_hr_capable()).then_some(self.user_id),
        }
    }
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            tenant_id: user.tenant_id,
            role: user.role,
            name: user.name.clone(),
        }
    }
}

/// Filtro aplicado a toda consulta de onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataScope {
    pub tenant_id: Uuid,
    pub owner_id: Option<Uuid>,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub tid: Uuid,  // Tenant do usuário
    pub role: Role,
    pub name: String,
    pub exp: usize, // Expiration time
    pub iat: usize, // Issued At
}

// ---
// Payloads
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterTenantPayload {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    #[schema(example = "Alice")]
    pub name: String,

    #[validate(email(message = "Invalid email address"))]
    #[schema(example = "alice@acme.com")]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "longenough")]
    pub password: String,

    #[validate(length(min = 2, message = "Company name must be at least 2 characters"))]
    #[schema(example = "Acme")]
    pub company_name: String,

    pub plan: Plan,
}

impl RegisterTenantPayload {
    /// Remove espaços das bordas antes da validação, para que `"   "` não
    /// passe pelo limite mínimo de caracteres.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: normalize_email(&self.email),
            company_name: self.company_name.trim().to_string(),
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    pub tenant_id: Uuid,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(email(message = "Invalid email address"))]
    #[schema(example = "alice@acme.com")]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl LoginPayload {
    pub fn normalized(self) -> Self {
        Self {
            email: normalize_email(&self.email),
            ..self
        }
    }
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: SessionUser,
}
