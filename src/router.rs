// src/router.rs

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, patch, post},
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::AppState,
    docs::ApiDoc,
    handlers,
    middleware::{auth::session_guard, trace::RedactedMakeSpan},
};

/// Monta todas as rotas da API sobre um `AppState` já construído.
pub fn build_router(app_state: AppState) -> Router {
    // Rotas públicas (cadastro, login e fluxo de convite)
    let public_routes = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/invitation-details", get(handlers::invitation::get_invitation_details))
        .route("/accept-invitation", post(handlers::invitation::accept_invitation));

    // Rotas protegidas pela sessão
    let session_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .route("/me/onboarding", get(handlers::onboarding::get_my_onboarding))
        .route("/users", get(handlers::tenancy::list_members))
        // Convites
        .route("/invite", post(handlers::invitation::create_invitation))
        .route("/invitations", get(handlers::invitation::list_invitations))
        .route("/invitations/{token}", delete(handlers::invitation::revoke_invitation))
        // Templates
        .route(
            "/templates",
            post(handlers::onboarding::create_template).get(handlers::onboarding::list_templates),
        )
        .route(
            "/templates/{id}",
            get(handlers::onboarding::get_template).patch(handlers::onboarding::update_template),
        )
        // Onboardings
        .route(
            "/onboardings",
            post(handlers::onboarding::create_onboarding).get(handlers::onboarding::list_onboardings),
        )
        .route("/onboardings/{id}", get(handlers::onboarding::get_onboarding))
        .route("/tasks/{id}", patch(handlers::onboarding::update_task))
        .route("/documents/{id}", patch(handlers::onboarding::update_document))
        .route("/compliance-items/{id}", patch(handlers::onboarding::update_compliance_item))
        // Dashboards
        .route("/dashboard/hr", get(handlers::dashboard::get_hr_dashboard))
        .route("/dashboard/me", get(handlers::dashboard::get_my_dashboard))
        .route_layer(axum_middleware::from_fn_with_state(app_state.clone(), session_guard));

    // Combina tudo no router principal
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", public_routes.merge(session_routes))
        .layer(TraceLayer::new_for_http().make_span_with(RedactedMakeSpan))
        .with_state(app_state)
}
