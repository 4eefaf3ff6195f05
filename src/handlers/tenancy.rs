// src/handlers/tenancy.rs

use axum::{Json, extract::State};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        rbac::{HrCapable, Require},
        tenancy::TenantContext,
    },
    models::tenancy::MemberSummary,
};

// GET /api/users
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Tenancy",
    responses(
        (status = 200, description = "Usuários da empresa", body = Vec<MemberSummary>),
        (status = 401, description = "Não autenticado"),
        (status = 403, description = "Sem permissão")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn list_members(
    State(app_state): State<AppState>,
    _guard: Require<HrCapable>,
    tenant: TenantContext,
) -> Result<Json<Vec<MemberSummary>>, AppError> {
    let members = app_state.accounts.list_members(tenant.0).await?;
    Ok(Json(members))
}
