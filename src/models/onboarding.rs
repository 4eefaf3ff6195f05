// src/models/onboarding.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- Enums ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "document_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Pending,
    Signed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "onboarding_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum OnboardingStatus {
    Active,
    Completed,
}

// =============================================================================
//  MODELOS (TEMPLATES)
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TemplateTask {
    pub id: Uuid,
    #[schema(example = "Set up laptop")]
    pub title: String,
    #[schema(example = "IT")]
    pub category: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDocument {
    pub id: Uuid,
    #[schema(example = "Employee Handbook")]
    pub title: String,
    pub required: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TemplateComplianceItem {
    pub id: Uuid,
    #[schema(example = "Security Training")]
    pub name: String,
    #[serde(rename = "type")]
    #[schema(example = "training")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingTemplate {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    #[schema(example = "Engineering onboarding")]
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[sqlx(skip)]
    pub tasks: Vec<TemplateTask>,
    #[sqlx(skip)]
    pub documents: Vec<TemplateDocument>,
    #[sqlx(skip)]
    pub compliance_items: Vec<TemplateComplianceItem>,
}

// =============================================================================
//  ONBOARDINGS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Onboarding {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub status: OnboardingStatus,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[schema(example = 40)]
    pub progress: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub onboarding_id: Uuid,
    pub title: String,
    pub priority: Priority,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: Uuid,
    pub onboarding_id: Uuid,
    pub title: String,
    pub status: DocumentStatus,
    pub due_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceItem {
    pub id: Uuid,
    pub onboarding_id: Uuid,
    pub name: String,
    pub progress: i32,
}

// Resposta completa (Onboarding + itens)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingDetail {
    #[serde(flatten)]
    pub onboarding: Onboarding,
    pub tasks: Vec<Task>,
    pub documents: Vec<Document>,
    pub compliance_items: Vec<ComplianceItem>,
}

/// Itens iniciais de um onboarding recém-criado.
#[derive(Debug, Clone)]
pub struct NewOnboarding {
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub tasks: Vec<(String, Priority)>,
    pub documents: Vec<(String, NaiveDate)>,
    pub compliance_items: Vec<String>,
}

/// Progresso derivado dos itens de um onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub progress: i32,
    pub status: OnboardingStatus,
}

impl ProgressSnapshot {
    /// Percentual de tarefas concluídas; o onboarding só fecha quando
    /// tarefas, documentos e conformidade estão todos completos.
    pub fn evaluate(tasks: &[Task], documents: &[Document], compliance: &[ComplianceItem]) -> Self {
        let done = tasks.iter().filter(|t| t.completed).count();
        let progress = if tasks.is_empty() {
            0
        } else {
            ((done as f64 * 100.0) / tasks.len() as f64).round() as i32
        };

        let finished = done == tasks.len()
            && documents.iter().all(|d| d.status == DocumentStatus::Signed)
            && compliance.iter().all(|c| c.progress >= 100);

        let status = if finished {
            OnboardingStatus::Completed
        } else {
            OnboardingStatus::Active
        };

        Self { progress, status }
    }
}

// ---
// Payloads
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TemplateTaskInput {
    #[validate(length(min = 1, message = "Task title is required"))]
    pub title: String,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TemplateDocumentInput {
    #[validate(length(min = 1, message = "Document title is required"))]
    pub title: String,
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TemplateComplianceInput {
    #[validate(length(min = 1, message = "Compliance item title is required"))]
    pub title: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplatePayload {
    #[validate(length(min = 1, message = "Template name is required"))]
    #[schema(example = "Engineering onboarding")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    #[validate(nested)]
    pub tasks: Vec<TemplateTaskInput>,
    #[serde(default)]
    #[validate(nested)]
    pub documents: Vec<TemplateDocumentInput>,
    #[serde(default)]
    #[validate(nested)]
    pub compliance_items: Vec<TemplateComplianceInput>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateTemplatePayload {
    #[validate(length(min = 1, message = "Template name is required"))]
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOnboardingPayload {
    pub user_id: Uuid,
    #[schema(example = "2026-11-02")]
    pub start_date: NaiveDate,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTaskPayload {
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateDocumentPayload {
    pub status: DocumentStatus,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCompliancePayload {
    #[validate(range(min = 0, max = 100, message = "Progress must be between 0 and 100"))]
    #[schema(example = 75)]
    pub progress: i32,
}
