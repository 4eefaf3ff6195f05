// src/db/user_repo.rs

use async_trait::async_trait;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::map_unique_violation,
    models::{
        auth::{NewUser, User},
        tenancy::MemberSummary,
    },
};

const USER_COLUMNS: &str = "id, tenant_id, name, email, password_hash, role, created_at";

// Responsável por todas as interações com a tabela 'users'
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Busca um usuário pelo seu e-mail (login)
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn list_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<MemberSummary>, AppError>;
}

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn list_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<MemberSummary>, AppError> {
        let members = sqlx::query_as::<_, MemberSummary>(
            r#"
            SELECT id, name, email, role
            FROM users
            WHERE tenant_id = $1
            ORDER BY name
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(members)
    }
}

/// Cria um usuário usando o executor recebido (pool ou transação).
/// E-mail duplicado vira `AppError::Conflict`.
pub(crate) async fn insert_user<'e, E>(
    executor: E,
    tenant_id: Uuid,
    new_user: &NewUser,
) -> Result<User, AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (tenant_id, name, email, password_hash, role)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(tenant_id)
    .bind(&new_user.name)
    .bind(&new_user.email)
    .bind(&new_user.password_hash)
    .bind(new_user.role)
    .fetch_one(executor)
    .await
    .map_err(map_unique_violation)
}
