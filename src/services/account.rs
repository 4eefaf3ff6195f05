// src/services/account.rs

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        password::{dummy_hash, hash_password, verify_password},
    },
    db::{TenantRepository, UserRepository},
    models::{
        auth::{LoginPayload, LoginResponse, NewUser, RegisterResponse, RegisterTenantPayload, Role, SessionUser},
        tenancy::{MemberSummary, NewTenant},
    },
    services::session::SessionService,
};

#[derive(Clone)]
pub struct AccountService {
    tenants: Arc<dyn TenantRepository>,
    users: Arc<dyn UserRepository>,
    sessions: SessionService,
    bcrypt_cost: u32,
    dummy_hash: Arc<str>,
}

impl AccountService {
    pub fn new(
        tenants: Arc<dyn TenantRepository>,
        users: Arc<dyn UserRepository>,
        sessions: SessionService,
        bcrypt_cost: u32,
    ) -> Result<Self, AppError> {
        Ok(Self {
            tenants,
            users,
            sessions,
            bcrypt_cost,
            dummy_hash: dummy_hash(bcrypt_cost)?.into(),
        })
    }

    /// LÓGICA DE NEGÓCIO: cria a empresa e, atomicamente, o seu primeiro
    /// usuário com cargo de RH.
    pub async fn register_tenant(&self, payload: RegisterTenantPayload) -> Result<RegisterResponse, AppError> {
        let payload = payload.normalized();
        payload.validate()?;

        // Checagem amigável; o índice único resolve a corrida.
        if self.tenants.name_taken(&payload.company_name).await? {
            return Err(AppError::Conflict("A company with this name already exists.".into()));
        }

        // 1. Hashing (fora da transação, não toca no banco)
        let password_hash = hash_password(&payload.password, self.bcrypt_cost).await?;

        // 2. Tenant + usuário na mesma transação
        let (tenant, user) = self
            .tenants
            .create_with_owner(
                NewTenant {
                    name: payload.company_name,
                    plan: payload.plan,
                },
                NewUser {
                    name: payload.name,
                    email: payload.email,
                    password_hash,
                    role: Role::Hr,
                },
            )
            .await?;

        tracing::info!(tenant_id = %tenant.id, user_id = %user.id, "🏢 Nova empresa registrada");

        Ok(RegisterResponse {
            user_id: user.id,
            email: user.email,
            role: user.role,
            tenant_id: tenant.id,
        })
    }

    pub async fn login(&self, payload: LoginPayload) -> Result<LoginResponse, AppError> {
        let payload = payload.normalized();
        payload.validate()?;

        let user = self.users.find_by_email(&payload.email).await?;

        let Some(user) = user else {
            // Mesmo custo de uma verificação real
            verify_password(&payload.password, &self.dummy_hash).await?;
            return Err(AppError::InvalidCredentials);
        };

        if !verify_password(&payload.password, &user.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        let session = SessionUser::from(&user);
        let token = self.sessions.issue(&session)?;

        Ok(LoginResponse { token, user: session })
    }

    pub async fn list_members(&self, tenant_id: Uuid) -> Result<Vec<MemberSummary>, AppError> {
        self.users.list_by_tenant(tenant_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{tenancy_repo::MockTenantRepository, user_repo::MockUserRepository},
        models::{auth::User, tenancy::{Plan, Tenant}},
    };
    use chrono::Utc;
    use rstest::rstest;

    const SECRET: &str = "test-secret-that-is-long-enough-for-hs256";

    fn service(tenants: MockTenantRepository, users: MockUserRepository) -> AccountService {
        AccountService::new(
            Arc::new(tenants),
            Arc::new(users),
            SessionService::new(SECRET, chrono::Duration::hours(1)),
            4,
        )
        .unwrap()
    }

    fn payload() -> RegisterTenantPayload {
        RegisterTenantPayload {
            name: "Alice".into(),
            email: "Alice@Acme.com".into(),
            password: "longenough".into(),
            company_name: "Acme".into(),
            plan: Plan::Pro,
        }
    }

    #[tokio::test]
    async fn registration_creates_hr_owner_in_new_tenant() {
        let mut tenants = MockTenantRepository::new();
        tenants.expect_name_taken().returning(|_| Ok(false));
        tenants
            .expect_create_with_owner()
            .times(1)
            .returning(|tenant, owner| {
                assert_eq!(owner.role, Role::Hr);
                assert_eq!(owner.email, "alice@acme.com");
                assert_ne!(owner.password_hash, "longenough");
                let tenant = Tenant {
                    id: Uuid::new_v4(),
                    name: tenant.name,
                    plan: tenant.plan,
                    created_at: Utc::now(),
                };
                let user = User {
                    id: Uuid::new_v4(),
                    tenant_id: tenant.id,
                    name: owner.name,
                    email: owner.email,
                    password_hash: owner.password_hash,
                    role: owner.role,
                    created_at: Utc::now(),
                };
                Ok((tenant, user))
            });

        let response = service(tenants, MockUserRepository::new())
            .register_tenant(payload())
            .await
            .unwrap();

        assert_eq!(response.role, Role::Hr);
        assert_eq!(response.email, "alice@acme.com");
    }

    #[tokio::test]
    async fn duplicate_company_name_is_a_conflict_and_creates_nothing() {
        let mut tenants = MockTenantRepository::new();
        tenants.expect_name_taken().returning(|_| Ok(true));
        tenants.expect_create_with_owner().never();

        let err = service(tenants, MockUserRepository::new())
            .register_tenant(payload())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn failed_owner_creation_surfaces_as_error() {
        let mut tenants = MockTenantRepository::new();
        tenants.expect_name_taken().returning(|_| Ok(false));
        tenants
            .expect_create_with_owner()
            .returning(|_, _| Err(AppError::Conflict("This email is already in use.".into())));

        let err = service(tenants, MockUserRepository::new())
            .register_tenant(payload())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[rstest]
    #[case::bad_email(RegisterTenantPayload { email: "not-an-email".into(), ..payload() })]
    #[case::short_password(RegisterTenantPayload { password: "short".into(), ..payload() })]
    #[case::short_company(RegisterTenantPayload { company_name: "A".into(), ..payload() })]
    #[case::short_name(RegisterTenantPayload { name: "A".into(), ..payload() })]
    #[case::blank_company(RegisterTenantPayload { company_name: "   ".into(), ..payload() })]
    #[case::blank_name(RegisterTenantPayload { name: "   ".into(), ..payload() })]
    #[case::padded_short_company(RegisterTenantPayload { company_name: " A ".into(), ..payload() })]
    #[tokio::test]
    async fn invalid_registration_is_rejected_before_storage(#[case] input: RegisterTenantPayload) {
        let mut tenants = MockTenantRepository::new();
        tenants.expect_name_taken().never();
        tenants.expect_create_with_owner().never();

        let err = service(tenants, MockUserRepository::new())
            .register_tenant(input)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn unknown_email_and_wrong_password_fail_the_same_way() {
        let hash = hash_password("longenough", 4).await.unwrap();
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(move |email| {
            if email == "alice@acme.com" {
                Ok(Some(User {
                    id: Uuid::new_v4(),
                    tenant_id: Uuid::new_v4(),
                    name: "Alice".into(),
                    email: email.to_string(),
                    password_hash: hash.clone(),
                    role: Role::Hr,
                    created_at: Utc::now(),
                }))
            } else {
                Ok(None)
            }
        });
        let service = service(MockTenantRepository::new(), users);

        let wrong = service
            .login(LoginPayload { email: "alice@acme.com".into(), password: "wrong-password".into() })
            .await
            .unwrap_err();
        let unknown = service
            .login(LoginPayload { email: "nobody@acme.com".into(), password: "longenough".into() })
            .await
            .unwrap_err();
        assert!(matches!(wrong, AppError::InvalidCredentials));
        assert!(matches!(unknown, AppError::InvalidCredentials));

        let ok = service
            .login(LoginPayload { email: "ALICE@acme.com".into(), password: "longenough".into() })
            .await
            .unwrap();
        assert_eq!(ok.user.role, Role::Hr);
        assert!(!ok.token.is_empty());
    }
}
