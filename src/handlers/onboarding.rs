// src/handlers/onboarding.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{HrCapable, Require},
        tenancy::TenantContext,
    },
    models::onboarding::{
        ComplianceItem, CreateOnboardingPayload, CreateTemplatePayload, Document, Onboarding, OnboardingDetail,
        OnboardingTemplate, Task, UpdateCompliancePayload, UpdateDocumentPayload, UpdateTaskPayload,
        UpdateTemplatePayload,
    },
};

// =============================================================================
//  TEMPLATES
// =============================================================================

#[utoipa::path(
    post,
    path = "/api/templates",
    tag = "Templates",
    request_body = CreateTemplatePayload,
    responses(
        (status = 201, description = "Template criado", body = OnboardingTemplate),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_template(
    State(app_state): State<AppState>,
    _guard: Require<HrCapable>,
    tenant: TenantContext,
    Json(payload): Json<CreateTemplatePayload>,
) -> Result<impl IntoResponse, AppError> {
    let template = app_state.onboardings.create_template(tenant.0, payload).await?;
    Ok((StatusCode::CREATED, Json(template)))
}

#[utoipa::path(
    get,
    path = "/api/templates",
    tag = "Templates",
    responses(
        (status = 200, description = "Templates da empresa", body = Vec<OnboardingTemplate>),
        (status = 403, description = "Sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_templates(
    State(app_state): State<AppState>,
    _guard: Require<HrCapable>,
    tenant: TenantContext,
) -> Result<Json<Vec<OnboardingTemplate>>, AppError> {
    Ok(Json(app_state.onboardings.list_templates(tenant.0).await?))
}

#[utoipa::path(
    get,
    path = "/api/templates/{id}",
    tag = "Templates",
    params(("id" = Uuid, Path, description = "ID do template")),
    responses(
        (status = 200, description = "Template", body = OnboardingTemplate),
        (status = 404, description = "Template não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_template(
    State(app_state): State<AppState>,
    _guard: Require<HrCapable>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<Json<OnboardingTemplate>, AppError> {
    Ok(Json(app_state.onboardings.get_template(tenant.0, id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/templates/{id}",
    tag = "Templates",
    params(("id" = Uuid, Path, description = "ID do template")),
    request_body = UpdateTemplatePayload,
    responses(
        (status = 200, description = "Template atualizado", body = OnboardingTemplate),
        (status = 404, description = "Template não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_template(
    State(app_state): State<AppState>,
    _guard: Require<HrCapable>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTemplatePayload>,
) -> Result<Json<OnboardingTemplate>, AppError> {
    Ok(Json(app_state.onboardings.update_template(tenant.0, id, payload).await?))
}

// =============================================================================
//  ONBOARDINGS
// =============================================================================

#[utoipa::path(
    post,
    path = "/api/onboardings",
    tag = "Onboardings",
    request_body = CreateOnboardingPayload,
    responses(
        (status = 201, description = "Onboarding iniciado com itens padrão", body = OnboardingDetail),
        (status = 404, description = "Usuário não encontrado na empresa"),
        (status = 409, description = "Usuário já possui onboarding")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_onboarding(
    State(app_state): State<AppState>,
    _guard: Require<HrCapable>,
    tenant: TenantContext,
    Json(payload): Json<CreateOnboardingPayload>,
) -> Result<impl IntoResponse, AppError> {
    let detail = app_state.onboardings.create_onboarding(tenant.0, payload).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

#[utoipa::path(
    get,
    path = "/api/onboardings",
    tag = "Onboardings",
    responses(
        (status = 200, description = "Onboardings da empresa", body = Vec<Onboarding>),
        (status = 403, description = "Sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_onboardings(
    State(app_state): State<AppState>,
    _guard: Require<HrCapable>,
    tenant: TenantContext,
) -> Result<Json<Vec<Onboarding>>, AppError> {
    Ok(Json(app_state.onboardings.list_onboardings(tenant.0).await?))
}

#[utoipa::path(
    get,
    path = "/api/onboardings/{id}",
    tag = "Onboardings",
    params(("id" = Uuid, Path, description = "ID do onboarding")),
    responses(
        (status = 200, description = "Onboarding com tarefas, documentos e conformidade", body = OnboardingDetail),
        (status = 404, description = "Onboarding não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_onboarding(
    State(app_state): State<AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
    _tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<Json<OnboardingDetail>, AppError> {
    Ok(Json(app_state.onboardings.get_onboarding(&session, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/me/onboarding",
    tag = "Onboardings",
    responses(
        (status = 200, description = "Onboarding do próprio usuário", body = OnboardingDetail),
        (status = 404, description = "Nenhum onboarding iniciado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_my_onboarding(
    State(app_state): State<AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
    _tenant: TenantContext,
) -> Result<Json<OnboardingDetail>, AppError> {
    Ok(Json(app_state.onboardings.my_onboarding(&session).await?))
}

// =============================================================================
//  ACOMPANHAMENTO
// =============================================================================

#[utoipa::path(
    patch,
    path = "/api/tasks/{id}",
    tag = "Onboardings",
    params(("id" = Uuid, Path, description = "ID da tarefa")),
    request_body = UpdateTaskPayload,
    responses(
        (status = 200, description = "Tarefa atualizada", body = Task),
        (status = 403, description = "Colaborador não pode alterar prioridade"),
        (status = 404, description = "Tarefa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_task(
    State(app_state): State<AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
    _tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTaskPayload>,
) -> Result<Json<Task>, AppError> {
    Ok(Json(app_state.onboardings.update_task(&session, id, payload).await?))
}

#[utoipa::path(
    patch,
    path = "/api/documents/{id}",
    tag = "Onboardings",
    params(("id" = Uuid, Path, description = "ID do documento")),
    request_body = UpdateDocumentPayload,
    responses(
        (status = 200, description = "Documento atualizado", body = Document),
        (status = 404, description = "Documento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_document(
    State(app_state): State<AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
    _tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDocumentPayload>,
) -> Result<Json<Document>, AppError> {
    Ok(Json(app_state.onboardings.update_document(&session, id, payload).await?))
}

#[utoipa::path(
    patch,
    path = "/api/compliance-items/{id}",
    tag = "Onboardings",
    params(("id" = Uuid, Path, description = "ID do item de conformidade")),
    request_body = UpdateCompliancePayload,
    responses(
        (status = 200, description = "Item atualizado", body = ComplianceItem),
        (status = 400, description = "Progresso fora de 0..=100"),
        (status = 404, description = "Item não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_compliance_item(
    State(app_state): State<AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
    _tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCompliancePayload>,
) -> Result<Json<ComplianceItem>, AppError> {
    Ok(Json(app_state.onboardings.update_compliance(&session, id, payload).await?))
}
