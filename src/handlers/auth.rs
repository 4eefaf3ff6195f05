// src/handlers/auth.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::auth::{LoginPayload, LoginResponse, RegisterResponse, RegisterTenantPayload, SessionUser},
};

// Handler de registro da empresa
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterTenantPayload,
    responses(
        (status = 201, description = "Empresa e usuário de RH criados", body = RegisterResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Empresa ou e-mail já cadastrados")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterTenantPayload>,
) -> Result<impl IntoResponse, AppError> {
    let response = app_state.accounts.register_tenant(payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

// Handler de login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Sessão emitida", body = LoginResponse),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = app_state.accounts.login(payload).await?;
    Ok(Json(response))
}

// Handler da rota protegida /me
#[utoipa::path(
    get,
    path = "/api/me",
    tag = "Users",
    responses(
        (status = 200, description = "Identidade da sessão", body = SessionUser),
        (status = 401, description = "Não autenticado")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn get_me(AuthenticatedUser(session): AuthenticatedUser) -> Json<SessionUser> {
    Json(session)
}
