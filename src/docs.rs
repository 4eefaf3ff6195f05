// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,

        // --- Invitations ---
        handlers::invitation::create_invitation,
        handlers::invitation::list_invitations,
        handlers::invitation::revoke_invitation,
        handlers::invitation::get_invitation_details,
        handlers::invitation::accept_invitation,

        // --- Tenancy ---
        handlers::tenancy::list_members,

        // --- Templates ---
        handlers::onboarding::create_template,
        handlers::onboarding::list_templates,
        handlers::onboarding::get_template,
        handlers::onboarding::update_template,

        // --- Onboardings ---
        handlers::onboarding::create_onboarding,
        handlers::onboarding::list_onboardings,
        handlers::onboarding::get_onboarding,
        handlers::onboarding::get_my_onboarding,
        handlers::onboarding::update_task,
        handlers::onboarding::update_document,
        handlers::onboarding::update_compliance_item,

        // --- Dashboard ---
        handlers::dashboard::get_hr_dashboard,
        handlers::dashboard::get_my_dashboard,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::User,
            models::auth::SessionUser,
            models::auth::RegisterTenantPayload,
            models::auth::RegisterResponse,
            models::auth::LoginPayload,
            models::auth::LoginResponse,

            // --- Tenancy ---
            models::tenancy::Plan,
            models::tenancy::Tenant,
            models::tenancy::MemberSummary,

            // --- Invitations ---
            models::invitation::CreateInvitationPayload,
            models::invitation::AcceptInvitationPayload,
            models::invitation::InvitationDetails,
            models::invitation::InvitationSummary,
            models::invitation::InvitationListItem,
            models::invitation::AcceptInvitationResponse,

            // --- Onboarding ---
            models::onboarding::Priority,
            models::onboarding::DocumentStatus,
            models::onboarding::OnboardingStatus,
            models::onboarding::TemplateTask,
            models::onboarding::TemplateDocument,
            models::onboarding::TemplateComplianceItem,
            models::onboarding::OnboardingTemplate,
            models::onboarding::Onboarding,
            models::onboarding::Task,
            models::onboarding::Document,
            models::onboarding::ComplianceItem,
            models::onboarding::OnboardingDetail,
            models::onboarding::TemplateTaskInput,
            models::onboarding::TemplateDocumentInput,
            models::onboarding::TemplateComplianceInput,
            models::onboarding::CreateTemplatePayload,
            models::onboarding::UpdateTemplatePayload,
            models::onboarding::CreateOnboardingPayload,
            models::onboarding::UpdateTaskPayload,
            models::onboarding::UpdateDocumentPayload,
            models::onboarding::UpdateCompliancePayload,

            // --- Dashboard ---
            models::dashboard::HrDashboard,
            models::dashboard::EmployeeDashboard,
        )
    ),
    tags(
        (name = "Auth", description = "Registro de empresas e login"),
        (name = "Users", description = "Dados da sessão"),
        (name = "Invitations", description = "Convites de novos colaboradores"),
        (name = "Tenancy", description = "Usuários da empresa"),
        (name = "Templates", description = "Modelos de onboarding"),
        (name = "Onboardings", description = "Onboardings e acompanhamento"),
        (name = "Dashboard", description = "Indicadores do RH e do colaborador")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme("api_jwt", SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)));
    }
}
