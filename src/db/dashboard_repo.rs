// src/db/dashboard_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::dashboard::{EmployeeDashboard, HrDashboard},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DashboardRepository: Send + Sync {
    async fn hr_summary(&self, tenant_id: Uuid) -> Result<Option<HrDashboard>, AppError>;

    async fn employee_summary(&self, tenant_id: Uuid, user_id: Uuid) -> Result<Option<EmployeeDashboard>, AppError>;
}

#[derive(Clone)]
pub struct PgDashboardRepository {
    pool: PgPool,
}

impl PgDashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DashboardRepository for PgDashboardRepository {
    // 1. Resumo do RH
    async fn hr_summary(&self, tenant_id: Uuid) -> Result<Option<HrDashboard>, AppError> {
        let summary = sqlx::query_as::<_, HrDashboard>(
            r#"
            SELECT
                t.name AS company_name,
                (SELECT COUNT(*) FROM onboardings o
                  WHERE o.tenant_id = t.id AND o.status = 'ACTIVE') AS active_onboardings,
                (SELECT COUNT(*) FROM onboardings o
                  WHERE o.tenant_id = t.id AND o.status = 'COMPLETED'
                    AND o.end_date >= CURRENT_DATE - 30) AS completed_last_30_days,
                (SELECT COALESCE(AVG(o.end_date - o.start_date), 0)::float8 FROM onboardings o
                  WHERE o.tenant_id = t.id AND o.status = 'COMPLETED'
                    AND o.end_date IS NOT NULL) AS average_completion_days,
                (SELECT COALESCE(AVG(c.progress), 0)::float8 FROM compliance_items c
                  JOIN onboardings o ON o.id = c.onboarding_id
                  WHERE o.tenant_id = t.id AND o.status = 'ACTIVE') AS compliance_rate
            FROM tenants t
            WHERE t.id = $1
            "#,
        )
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(summary)
    }

    // 2. Resumo do colaborador (zeros quando ainda não há onboarding)
    async fn employee_summary(&self, tenant_id: Uuid, user_id: Uuid) -> Result<Option<EmployeeDashboard>, AppError> {
        let summary = sqlx::query_as::<_, EmployeeDashboard>(
            r#"
            SELECT
                u.name,
                u.role,
                o.start_date,
                COALESCE(o.progress, 0) AS onboarding_progress,
                (SELECT COUNT(*) FROM tasks t
                  WHERE t.onboarding_id = o.id AND t.completed) AS tasks_completed,
                (SELECT COUNT(*) FROM tasks t
                  WHERE t.onboarding_id = o.id) AS tasks_total,
                (SELECT COUNT(*) FROM documents d
                  WHERE d.onboarding_id = o.id AND d.status = 'signed') AS documents_signed,
                (SELECT COUNT(*) FROM documents d
                  WHERE d.onboarding_id = o.id) AS documents_total
            FROM users u
            LEFT JOIN onboardings o ON o.user_id = u.id
            WHERE u.id = $1 AND u.tenant_id = $2
            "#,
        )
        .bind(user_id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(summary)
    }
}
