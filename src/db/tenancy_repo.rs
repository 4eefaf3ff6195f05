// src/db/tenancy_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use crate::{
    common::error::AppError,
    db::{map_unique_violation, user_repo::insert_user},
    models::{
        auth::{NewUser, User},
        tenancy::{NewTenant, Tenant},
    },
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TenantRepository: Send + Sync {
    /// Nome de empresa já usado (comparação sem diferenciar maiúsculas)
    async fn name_taken(&self, name: &str) -> Result<bool, AppError>;

    /// Cria o tenant e o seu primeiro usuário na mesma transação.
    async fn create_with_owner(&self, tenant: NewTenant, owner: NewUser) -> Result<(Tenant, User), AppError>;
}

#[derive(Clone)]
pub struct PgTenantRepository {
    pool: PgPool,
}

impl PgTenantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantRepository for PgTenantRepository {
    async fn name_taken(&self, name: &str) -> Result<bool, AppError> {
        // SELECT EXISTS apenas retorna 'true' ou 'false'.
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM tenants WHERE lower(name) = lower($1))",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn create_with_owner(&self, tenant: NewTenant, owner: NewUser) -> Result<(Tenant, User), AppError> {
        // 1. Inicia a transação
        let mut tx = self.pool.begin().await?;

        // 2. Cria o tenant. O índice único em lower(name) é a garantia final
        // contra duas empresas com o mesmo nome registradas ao mesmo tempo.
        let new_tenant = sqlx::query_as::<_, Tenant>(
            r#"
            INSERT INTO tenants (name, plan)
            VALUES ($1, $2)
            RETURNING id, name, plan, created_at
            "#,
        )
        .bind(&tenant.name)
        .bind(tenant.plan)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_unique_violation)?;

        // 3. Cria o usuário dono. Se falhar, o drop do `tx` desfaz o tenant.
        let user = insert_user(&mut *tx, new_tenant.id, &owner).await?;

        // 4. Commit
        tx.commit().await?;

        Ok((new_tenant, user))
    }
}
