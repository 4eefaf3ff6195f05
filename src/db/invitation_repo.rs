// src/db/invitation_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::user_repo::insert_user,
    models::{
        auth::{NewUser, User},
        invitation::{Invitation, InvitationWithCompany, NewInvitation},
    },
};

/// Dados fornecidos pelo convidado no resgate. E-mail, cargo e tenant
/// vêm sempre do convite.
#[derive(Debug, Clone)]
pub struct Redemption {
    pub name: String,
    pub password_hash: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InvitationRepository: Send + Sync {
    /// Grava o convite. `None` quando o token já existe (colisão de chave).
    async fn insert(&self, invitation: NewInvitation) -> Result<Option<Invitation>, AppError>;

    async fn find_with_company(&self, token: &str) -> Result<Option<InvitationWithCompany>, AppError>;

    /// Resgate atômico: apaga o convite ainda válido e cria o usuário na mesma
    /// transação. `None` quando nenhum convite válido foi apagado (já resgatado,
    /// inexistente ou expirado) e nada foi criado.
    async fn redeem(&self, token: &str, now: DateTime<Utc>, redemption: Redemption) -> Result<Option<User>, AppError>;

    async fn list_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<Invitation>, AppError>;

    /// Remove o convite apenas se pertencer ao tenant. Retorna se apagou.
    async fn delete_in_tenant(&self, tenant_id: Uuid, token: &str) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct PgInvitationRepository {
    pool: PgPool,
}

impl PgInvitationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvitationRepository for PgInvitationRepository {
    async fn insert(&self, invitation: NewInvitation) -> Result<Option<Invitation>, AppError> {
        let created = sqlx::query_as::<_, Invitation>(
            r#"
            INSERT INTO invitations (id, tenant_id, email, role, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO NOTHING
            RETURNING id, tenant_id, email, role, expires_at, created_at
            "#,
        )
        .bind(&invitation.token)
        .bind(invitation.tenant_id)
        .bind(&invitation.email)
        .bind(invitation.role)
        .bind(invitation.expires_at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(created)
    }

    async fn find_with_company(&self, token: &str) -> Result<Option<InvitationWithCompany>, AppError> {
        let found = sqlx::query_as::<_, InvitationWithCompany>(
            r#"
            SELECT i.id, i.tenant_id, i.email, i.role, i.expires_at, i.created_at,
                   t.name AS company_name
            FROM invitations i
            JOIN tenants t ON t.id = i.tenant_id
            WHERE i.id = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(found)
    }

    async fn redeem(&self, token: &str, now: DateTime<Utc>, redemption: Redemption) -> Result<Option<User>, AppError> {
        let mut tx = self.pool.begin().await?;

        // 1. DELETE condicional: duas tentativas concorrentes disputam o lock
        // da linha; a perdedora encontra zero linhas.
        let claimed = sqlx::query_as::<_, Invitation>(
            r#"
            DELETE FROM invitations
            WHERE id = $1 AND expires_at > $2
            RETURNING id, tenant_id, email, role, expires_at, created_at
            "#,
        )
        .bind(token)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(invitation) = claimed else {
            return Ok(None);
        };

        // 2. Cria o usuário com os dados do convite. Erro aqui (ex.: e-mail
        // já cadastrado) sofre rollback e o convite volta a existir.
        let new_user = NewUser {
            name: redemption.name,
            email: invitation.email,
            password_hash: redemption.password_hash,
            role: invitation.role,
        };
        let user = insert_user(&mut *tx, invitation.tenant_id, &new_user).await?;

        // 3. Commit
        tx.commit().await?;

        Ok(Some(user))
    }

    async fn list_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<Invitation>, AppError> {
        let invitations = sqlx::query_as::<_, Invitation>(
            r#"
            SELECT id, tenant_id, email, role, expires_at, created_at
            FROM invitations
            WHERE tenant_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(invitations)
    }

    async fn delete_in_tenant(&self, tenant_id: Uuid, token: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM invitations WHERE id = $1 AND tenant_id = $2")
            .bind(token)
            .bind(tenant_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
