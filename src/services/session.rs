// src/services/session.rs

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::{
    common::error::AppError,
    models::auth::{Claims, Role, SessionUser},
};

/// Predicado central de acesso às telas de gestão.
pub fn is_hr_capable(role: Role) -> bool {
    role.is_hr_capable()
}

// Instantes anteriores a 1970 não cabem nas claims.
fn unix_seconds(at: chrono::DateTime<Utc>) -> Result<usize, AppError> {
    usize::try_from(at.timestamp())
        .map_err(|_| anyhow::anyhow!("session timestamp {at} is before the Unix epoch").into())
}

/// Emite e valida a credencial de sessão (JWT HS256).
#[derive(Clone)]
pub struct SessionService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: chrono::Duration,
}

impl SessionService {
    pub fn new(secret: &str, ttl: chrono::Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, session: &SessionUser) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + self.ttl;

        let claims = Claims {
            sub: session.user_id,
            tid: session.tenant_id,
            role: session.role,
            name: session.name.clone(),
            exp: unix_seconds(expires_at)?,
            iat: unix_seconds(now)?,
        };

        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    /// Assinatura inválida, token expirado ou malformado: tudo vira `Unauthenticated`.
    pub fn resolve(&self, token: &str) -> Result<SessionUser, AppError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|_| AppError::Unauthenticated)?;

        let claims = token_data.claims;
        Ok(SessionUser {
            user_id: claims.sub,
            tenant_id: claims.tid,
            role: claims.role,
            name: claims.name,
        })
    }
}
