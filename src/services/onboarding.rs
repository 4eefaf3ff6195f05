// src/services/onboarding.rs

use std::sync::Arc;

use chrono::{Days, NaiveDate};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::OnboardingRepository,
    models::{
        auth::SessionUser,
        onboarding::{
            ComplianceItem, CreateOnboardingPayload, CreateTemplatePayload, Document, NewOnboarding, Onboarding,
            OnboardingDetail, OnboardingTemplate, Priority, Task, UpdateCompliancePayload, UpdateDocumentPayload,
            UpdateTaskPayload, UpdateTemplatePayload,
        },
    },
};

// Itens padrão de todo onboarding novo
const DEFAULT_TASKS: [(&str, Priority); 5] = [
    ("Complete personal information form", Priority::High),
    ("Sign employee handbook", Priority::Medium),
    ("Set up direct deposit", Priority::High),
    ("Complete I-9 form", Priority::Medium),
    ("Attend orientation session", Priority::Low),
];

// (título, dias após o início)
const DEFAULT_DOCUMENTS: [(&str, u64); 4] = [
    ("Employee Handbook", 5),
    ("Non-Disclosure Agreement", 10),
    ("Benefits Enrollment Form", 15),
    ("Emergency Contact Information", 3),
];

const DEFAULT_COMPLIANCE: [&str; 4] = [
    "Personal Information",
    "Legal Documents",
    "Training Modules",
    "Policy Acknowledgements",
];

/// Monta os itens iniciais a partir da data de início.
fn seed_onboarding(user_id: Uuid, start_date: NaiveDate) -> Result<NewOnboarding, AppError> {
    let documents = DEFAULT_DOCUMENTS
        .iter()
        .map(|(title, offset)| {
            start_date
                .checked_add_days(Days::new(*offset))
                .map(|due| (title.to_string(), due))
                .ok_or_else(|| AppError::BadRequest("Start date is out of range.".into()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(NewOnboarding {
        user_id,
        start_date,
        tasks: DEFAULT_TASKS.iter().map(|(title, p)| (title.to_string(), *p)).collect(),
        documents,
        compliance_items: DEFAULT_COMPLIANCE.iter().map(|name| name.to_string()).collect(),
    })
}

#[derive(Clone)]
pub struct OnboardingService {
    repo: Arc<dyn OnboardingRepository>,
}

impl OnboardingService {
    pub fn new(repo: Arc<dyn OnboardingRepository>) -> Self {
        Self { repo }
    }

    // --- Templates (apenas RH) ---

    pub async fn create_template(
        &self,
        tenant_id: Uuid,
        payload: CreateTemplatePayload,
    ) -> Result<OnboardingTemplate, AppError> {
        payload.validate()?;
        let template = self.repo.create_template(tenant_id, &payload).await?;
        tracing::info!(%tenant_id, template_id = %template.id, "📋 Template criado");
        Ok(template)
    }

    pub async fn list_templates(&self, tenant_id: Uuid) -> Result<Vec<OnboardingTemplate>, AppError> {
        self.repo.list_templates(tenant_id).await
    }

    pub async fn get_template(&self, tenant_id: Uuid, id: Uuid) -> Result<OnboardingTemplate, AppError> {
        self.repo
            .find_template(tenant_id, id)
            .await?
            .ok_or_else(|| AppError::not_found("Template"))
    }

    pub async fn update_template(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        payload: UpdateTemplatePayload,
    ) -> Result<OnboardingTemplate, AppError> {
        payload.validate()?;
        self.repo
            .update_template(tenant_id, id, payload.name, payload.description)
            .await?
            .ok_or_else(|| AppError::not_found("Template"))
    }

    // --- Onboardings ---

    pub async fn create_onboarding(
        &self,
        tenant_id: Uuid,
        payload: CreateOnboardingPayload,
    ) -> Result<OnboardingDetail, AppError> {
        let new = seed_onboarding(payload.user_id, payload.start_date)?;
        let detail = self.repo.create_onboarding(tenant_id, new).await?;
        tracing::info!(%tenant_id, onboarding_id = %detail.onboarding.id, "🚀 Onboarding iniciado");
        Ok(detail)
    }

    pub async fn list_onboardings(&self, tenant_id: Uuid) -> Result<Vec<Onboarding>, AppError> {
        self.repo.list_onboardings(tenant_id).await
    }

    /// RH enxerga qualquer onboarding do tenant; o colaborador só o próprio.
    pub async fn get_onboarding(&self, session: &SessionUser, id: Uuid) -> Result<OnboardingDetail, AppError> {
        self.repo
            .find_onboarding(session.data_scope(), id)
            .await?
            .ok_or_else(|| AppError::not_found("Onboarding"))
    }

    pub async fn my_onboarding(&self, session: &SessionUser) -> Result<OnboardingDetail, AppError> {
        self.repo
            .find_onboarding_for_user(session.tenant_id, session.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Onboarding"))
    }

    // --- Acompanhamento ---

    pub async fn update_task(
        &self,
        session: &SessionUser,
        task_id: Uuid,
        payload: UpdateTaskPayload,
    ) -> Result<Task, AppError> {
        if payload.completed.is_none() && payload.priority.is_none() {
            return Err(AppError::BadRequest("Nothing to update.".into()));
        }
        if payload.priority.is_some() && !session.is_hr_capable() {
            return Err(AppError::Forbidden("Only HR can change task priority.".into()));
        }

        self.repo
            .update_task(session.data_scope(), task_id, payload.completed, payload.priority)
            .await?
            .ok_or_else(|| AppError::not_found("Task"))
    }

    pub async fn update_document(
        &self,
        session: &SessionUser,
        document_id: Uuid,
        payload: UpdateDocumentPayload,
    ) -> Result<Document, AppError> {
        self.repo
            .update_document(session.data_scope(), document_id, payload.status)
            .await?
            .ok_or_else(|| AppError::not_found("Document"))
    }

    pub async fn update_compliance(
        &self,
        session: &SessionUser,
        item_id: Uuid,
        payload: UpdateCompliancePayload,
    ) -> Result<ComplianceItem, AppError> {
        payload.validate()?;
        self.repo
            .update_compliance(session.data_scope(), item_id, payload.progress)
            .await?
            .ok_or_else(|| AppError::not_found("Compliance item"))
    }
}
