// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{
    common::error::AppError,
    models::auth::{Role, SessionUser},
    services::session::is_hr_capable,
};

/// 1. O Trait que define uma política de acesso por cargo
pub trait AccessPolicy: Send + Sync + 'static {
    fn allows(role: Role) -> bool;

    fn denial() -> &'static str;
}

/// 2. O Extractor (Guardião)
pub struct Require<P>(pub SessionUser, PhantomData<P>);

impl<P, S> FromRequestParts<S> for Require<P>
where
    P: AccessPolicy,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<SessionUser>()
            .cloned()
            .ok_or(AppError::Unauthenticated)?;

        if !P::allows(session.role) {
            return Err(AppError::Forbidden(P::denial().into()));
        }

        Ok(Require(session, PhantomData))
    }
}

// ---
// POLÍTICAS
// ---

pub struct HrCapable;
impl AccessPolicy for HrCapable {
    fn allows(role: Role) -> bool {
        is_hr_capable(role)
    }

    fn denial() -> &'static str {
        "This action requires an HR, admin or manager role."
    }
}
