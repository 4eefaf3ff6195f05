// src/middleware/tenancy.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::{common::error::AppError, models::auth::SessionUser};

// Cabeçalho que clientes antigos ainda enviam
const TENANT_ID_HEADER: &str = "x-tenant-id";

/// Tenant da requisição. Vem SEMPRE da sessão; o cabeçalho `x-tenant-id`
/// só é aceito quando coincide com ela.
#[derive(Debug, Clone, Copy)]
pub struct TenantContext(pub Uuid);

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<SessionUser>()
            .ok_or(AppError::Unauthenticated)?;

        if let Some(value) = parts.headers.get(TENANT_ID_HEADER) {
            let requested = value
                .to_str()
                .ok()
                .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
                .ok_or_else(|| AppError::BadRequest("Invalid x-tenant-id header.".into()))?;

            if requested != session.tenant_id {
                tracing::warn!(user_id = %session.user_id, "Tentativa de acesso a outro tenant");
                return Err(AppError::Forbidden("You do not have access to this company.".into()));
            }
        }

        Ok(TenantContext(session.tenant_id))
    }
}
