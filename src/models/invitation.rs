// src/models/invitation.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::auth::{Role, normalize_email};

// O que sai do banco (Tabela invitations). O `id` é o próprio token.
#[derive(Debug, Clone, FromRow)]
pub struct Invitation {
    pub id: String,
    pub tenant_id: Uuid,
    pub email: String,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Invitation {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Convite junto com o nome da empresa que o emitiu.
#[derive(Debug, Clone, FromRow)]
pub struct InvitationWithCompany {
    #[sqlx(flatten)]
    pub invitation: Invitation,
    pub company_name: String,
}

#[derive(Debug, Clone)]
pub struct NewInvitation {
    pub token: String,
    pub tenant_id: Uuid,
    pub email: String,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
}

// ---
// Payloads
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateInvitationPayload {
    #[validate(email(message = "Invalid email address"))]
    #[schema(example = "bob@acme.com")]
    pub email: String,
    pub role: Role,
}

impl CreateInvitationPayload {
    pub fn normalized(self) -> Self {
        Self {
            email: normalize_email(&self.email),
            ..self
        }
    }
}

// Sem campo `role`: o cargo vem sempre do convite.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AcceptInvitationPayload {
    pub token: String,

    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    #[schema(example = "Bob")]
    pub name: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "longenough")]
    pub password: String,
}

impl AcceptInvitationPayload {
    pub fn normalized(self) -> Self {
        Self {
            token: self.token.trim().to_string(),
            name: self.name.trim().to_string(),
            ..self
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InvitationDetailsQuery {
    pub token: Option<String>,
}

// ---
// Respostas
// ---
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct InvitationDetails {
    #[schema(example = "bob@acme.com")]
    pub email: String,
    #[schema(example = "Acme")]
    pub company: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvitationSummary {
    pub token: String,
    pub email: String,
    pub role: Role,
    pub tenant_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub invite_link: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvitationListItem {
    pub token: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub expired: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AcceptInvitationResponse {
    pub success: bool,
    pub message: String,
}
