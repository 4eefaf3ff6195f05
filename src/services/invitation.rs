// src/services/invitation.rs

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, password::hash_password, token::generate_invitation_token},
    db::{InvitationRepository, Redemption},
    models::{
        auth::User,
        invitation::{
            AcceptInvitationPayload, CreateInvitationPayload, InvitationDetails, InvitationListItem,
            InvitationSummary, InvitationWithCompany, NewInvitation,
        },
    },
};

// Com 256 bits, uma colisão é praticamente impossível; o limite só evita laço infinito.
const MAX_TOKEN_ATTEMPTS: usize = 3;

#[derive(Clone)]
pub struct InvitationService {
    repo: Arc<dyn InvitationRepository>,
    ttl: chrono::Duration,
    public_base_url: String,
    bcrypt_cost: u32,
}

impl InvitationService {
    pub fn new(
        repo: Arc<dyn InvitationRepository>,
        ttl: chrono::Duration,
        public_base_url: String,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            repo,
            ttl,
            public_base_url,
            bcrypt_cost,
        }
    }

    /// Emite um convite para o tenant. O chamador já foi autorizado como RH
    /// para esse tenant (o `tenant_id` vem da sessão).
    pub async fn create(&self, tenant_id: Uuid, payload: CreateInvitationPayload) -> Result<InvitationSummary, AppError> {
        let payload = payload.normalized();
        payload.validate()?;

        let expires_at = Utc::now() + self.ttl;

        for _ in 0..MAX_TOKEN_ATTEMPTS {
            let new_invitation = NewInvitation {
                token: generate_invitation_token(),
                tenant_id,
                email: payload.email.clone(),
                role: payload.role,
                expires_at,
            };

            if let Some(invitation) = self.repo.insert(new_invitation).await? {
                tracing::info!(%tenant_id, role = %invitation.role, "✉️ Convite criado");
                return Ok(InvitationSummary {
                    invite_link: format!("{}/login?token={}", self.public_base_url, invitation.id),
                    token: invitation.id,
                    email: invitation.email,
                    role: invitation.role,
                    tenant_id: invitation.tenant_id,
                    expires_at: invitation.expires_at,
                });
            }

            tracing::warn!("Colisão de token de convite, gerando outro");
        }

        Err(anyhow::anyhow!("Não foi possível gerar um token de convite único").into())
    }

    /// Convite existente e ainda válido, ou `NotFound` / `Expired`.
    async fn find_valid(&self, token: &str) -> Result<InvitationWithCompany, AppError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::BadRequest("No token provided.".into()));
        }

        let found = self
            .repo
            .find_with_company(token)
            .await?
            .ok_or_else(|| AppError::not_found("Invitation"))?;

        if found.invitation.is_expired_at(Utc::now()) {
            return Err(AppError::Expired);
        }
        Ok(found)
    }

    pub async fn details(&self, token: &str) -> Result<InvitationDetails, AppError> {
        let found = self.find_valid(token).await?;
        Ok(InvitationDetails {
            email: found.invitation.email,
            company: found.company_name,
            role: found.invitation.role,
        })
    }

    /// Resgata o convite: cria o usuário com e-mail, cargo e tenant do convite
    /// e invalida o token, tudo numa única operação atômica do repositório.
    pub async fn accept(&self, payload: AcceptInvitationPayload) -> Result<User, AppError> {
        let payload = payload.normalized();
        payload.validate()?;

        // 1. Revalida no servidor (nunca confiar na consulta feita pelo cliente)
        let found = self.find_valid(&payload.token).await?;
        let token = found.invitation.id;

        // 2. Hashing fora da transação
        let password_hash = hash_password(&payload.password, self.bcrypt_cost).await?;

        // 3. DELETE condicional + INSERT do usuário
        let now = Utc::now();
        let redemption = Redemption {
            name: payload.name,
            password_hash,
        };

        match self.repo.redeem(&token, now, redemption).await? {
            Some(user) => {
                tracing::info!(tenant_id = %user.tenant_id, user_id = %user.id, "✅ Convite resgatado");
                Ok(user)
            }
            // Alguém resgatou (ou o prazo venceu) entre a checagem e o DELETE.
            None => match self.repo.find_with_company(&token).await? {
                Some(_) => Err(AppError::Expired),
                None => Err(AppError::AlreadyRedeemed),
            },
        }
    }

    pub async fn list(&self, tenant_id: Uuid) -> Result<Vec<InvitationListItem>, AppError> {
        let now = Utc::now();
        let invitations = self.repo.list_by_tenant(tenant_id).await?;

        Ok(invitations
            .into_iter()
            .map(|inv| InvitationListItem {
                expired: inv.is_expired_at(now),
                token: inv.id,
                email: inv.email,
                role: inv.role,
                created_at: inv.created_at,
                expires_at: inv.expires_at,
            })
            .collect())
    }

    pub async fn revoke(&self, tenant_id: Uuid, token: &str) -> Result<(), AppError> {
        if !self.repo.delete_in_tenant(tenant_id, token).await? {
            return Err(AppError::not_found("Invitation"));
        }
        tracing::info!(%tenant_id, "Convite revogado");
        Ok(())
    }
}
