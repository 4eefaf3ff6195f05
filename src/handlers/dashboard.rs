// src/handlers/dashboard.rs

use axum::{Json, extract::State};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{HrCapable, Require},
        tenancy::TenantContext,
    },
    models::dashboard::{EmployeeDashboard, HrDashboard},
};

// GET /api/dashboard/hr
#[utoipa::path(
    get,
    path = "/api/dashboard/hr",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Indicadores de onboarding da empresa", body = HrDashboard),
        (status = 401, description = "Não autenticado"),
        (status = 403, description = "Sem permissão")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn get_hr_dashboard(
    State(app_state): State<AppState>,
    _guard: Require<HrCapable>,
    tenant: TenantContext,
) -> Result<Json<HrDashboard>, AppError> {
    let summary = app_state.dashboards.hr(tenant.0).await?;
    Ok(Json(summary))
}

// GET /api/dashboard/me
#[utoipa::path(
    get,
    path = "/api/dashboard/me",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Resumo do onboarding do colaborador", body = EmployeeDashboard),
        (status = 401, description = "Não autenticado")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn get_my_dashboard(
    State(app_state): State<AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
    _tenant: TenantContext,
) -> Result<Json<EmployeeDashboard>, AppError> {
    let summary = app_state.dashboards.me(&session).await?;
    Ok(Json(summary))
}
