// src/services/dashboard.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::DashboardRepository,
    models::{
        auth::SessionUser,
        dashboard::{EmployeeDashboard, HrDashboard},
    },
};

#[derive(Clone)]
pub struct DashboardService {
    repo: Arc<dyn DashboardRepository>,
}

impl DashboardService {
    pub fn new(repo: Arc<dyn DashboardRepository>) -> Self {
        Self { repo }
    }

    pub async fn hr(&self, tenant_id: Uuid) -> Result<HrDashboard, AppError> {
        self.repo
            .hr_summary(tenant_id)
            .await?
            .ok_or_else(|| AppError::not_found("Company"))
    }

    pub async fn me(&self, session: &SessionUser) -> Result<EmployeeDashboard, AppError> {
        self.repo
            .employee_summary(session.tenant_id, session.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))
    }
}
