pub mod dashboard_repo;
pub mod invitation_repo;
pub mod onboarding_repo;
pub mod tenancy_repo;
pub mod user_repo;

pub use dashboard_repo::{DashboardRepository, PgDashboardRepository};
pub use invitation_repo::{InvitationRepository, PgInvitationRepository, Redemption};
pub use onboarding_repo::{OnboardingRepository, PgOnboardingRepository};
pub use tenancy_repo::{PgTenantRepository, TenantRepository};
pub use user_repo::{PgUserRepository, UserRepository};

use std::sync::Arc;

use sqlx::PgPool;

use crate::common::error::AppError;

/// Handles de persistência entregues explicitamente aos serviços.
#[derive(Clone)]
pub struct Repositories {
    pub tenants: Arc<dyn TenantRepository>,
    pub users: Arc<dyn UserRepository>,
    pub invitations: Arc<dyn InvitationRepository>,
    pub onboardings: Arc<dyn OnboardingRepository>,
    pub dashboards: Arc<dyn DashboardRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            tenants: Arc::new(PgTenantRepository::new(pool.clone())),
            users: Arc::new(PgUserRepository::new(pool.clone())),
            invitations: Arc::new(PgInvitationRepository::new(pool.clone())),
            onboardings: Arc::new(PgOnboardingRepository::new(pool.clone())),
            dashboards: Arc::new(PgDashboardRepository::new(pool)),
        }
    }
}

/// Converte violação de chave única em um erro de conflito legível,
/// usando o nome da constraint/índice definido nas migrations.
pub(crate) fn map_unique_violation(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return match db_err.constraint() {
                Some("users_email_key") => AppError::Conflict("This email is already in use.".into()),
                Some("tenants_name_lower_key") => {
                    AppError::Conflict("A company with this name already exists.".into())
                }
                Some("onboardings_user_key") => {
                    AppError::Conflict("This employee already has an onboarding.".into())
                }
                Some(other) => AppError::Conflict(format!("Duplicate value violates {other}.")),
                None => AppError::Conflict("Duplicate value.".into()),
            };
        }
    }
    e.into()
}
