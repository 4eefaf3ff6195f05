// src/handlers/invitation.rs

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        rbac::{HrCapable, Require},
        tenancy::TenantContext,
    },
    models::invitation::{
        AcceptInvitationPayload, AcceptInvitationResponse, CreateInvitationPayload, InvitationDetails,
        InvitationDetailsQuery, InvitationListItem, InvitationSummary,
    },
};

// POST /api/invite
#[utoipa::path(
    post,
    path = "/api/invite",
    tag = "Invitations",
    request_body = CreateInvitationPayload,
    responses(
        (status = 201, description = "Convite criado", body = InvitationSummary),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Sem permissão")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn create_invitation(
    State(app_state): State<AppState>,
    _guard: Require<HrCapable>,
    tenant: TenantContext,
    Json(payload): Json<CreateInvitationPayload>,
) -> Result<impl IntoResponse, AppError> {
    let summary = app_state.invitations.create(tenant.0, payload).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

// GET /api/invitations
#[utoipa::path(
    get,
    path = "/api/invitations",
    tag = "Invitations",
    responses(
        (status = 200, description = "Convites pendentes da empresa", body = Vec<InvitationListItem>),
        (status = 403, description = "Sem permissão")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn list_invitations(
    State(app_state): State<AppState>,
    _guard: Require<HrCapable>,
    tenant: TenantContext,
) -> Result<Json<Vec<InvitationListItem>>, AppError> {
    let invitations = app_state.invitations.list(tenant.0).await?;
    Ok(Json(invitations))
}

// DELETE /api/invitations/{token}
#[utoipa::path(
    delete,
    path = "/api/invitations/{token}",
    tag = "Invitations",
    params(
        ("token" = String, Path, description = "Token do convite")
    ),
    responses(
        (status = 204, description = "Convite revogado"),
        (status = 404, description = "Convite não encontrado nesta empresa")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn revoke_invitation(
    State(app_state): State<AppState>,
    _guard: Require<HrCapable>,
    tenant: TenantContext,
    Path(token): Path<String>,
) -> Result<StatusCode, AppError> {
    app_state.invitations.revoke(tenant.0, &token).await?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/invitation-details?token=
#[utoipa::path(
    get,
    path = "/api/invitation-details",
    tag = "Invitations",
    params(InvitationDetailsQuery),
    responses(
        (status = 200, description = "Convite válido", body = InvitationDetails),
        (status = 400, description = "Token ausente"),
        (status = 404, description = "Convite inexistente"),
        (status = 410, description = "Convite expirado")
    )
)]
pub async fn get_invitation_details(
    State(app_state): State<AppState>,
    Query(query): Query<InvitationDetailsQuery>,
) -> Result<Json<InvitationDetails>, AppError> {
    let token = query.token.unwrap_or_default();
    let details = app_state.invitations.details(&token).await?;
    Ok(Json(details))
}

// POST /api/accept-invitation
// O front espera sempre `{success, message}`, inclusive nos erros.
#[utoipa::path(
    post,
    path = "/api/accept-invitation",
    tag = "Invitations",
    request_body = AcceptInvitationPayload,
    responses(
        (status = 200, description = "Conta criada", body = AcceptInvitationResponse),
        (status = 400, description = "Dados inválidos", body = AcceptInvitationResponse),
        (status = 404, description = "Convite inexistente", body = AcceptInvitationResponse),
        (status = 409, description = "Convite já utilizado", body = AcceptInvitationResponse),
        (status = 410, description = "Convite expirado", body = AcceptInvitationResponse)
    )
)]
pub async fn accept_invitation(
    State(app_state): State<AppState>,
    payload: Result<Json<AcceptInvitationPayload>, JsonRejection>,
) -> Response {
    // Corpo malformado também responde no envelope `{success, message}`.
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            let body = AcceptInvitationResponse {
                success: false,
                message: rejection.body_text(),
            };
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }
    };

    match app_state.invitations.accept(payload).await {
        Ok(_user) => Json(AcceptInvitationResponse {
            success: true,
            message: "Account created successfully. You can now log in.".into(),
        })
        .into_response(),
        Err(err) => {
            err.log_if_internal();
            let body = AcceptInvitationResponse {
                success: false,
                message: err.public_message(),
            };
            (err.status(), Json(body)).into_response()
        }
    }
}
