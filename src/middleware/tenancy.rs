// src/middleware/tenancy.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use uuid::Uuid;

use crate::{common::error::AppError, config::AppState, tenancy::TenantContext};

// O cabeçalho que diz em qual empresa o usuário está operando nesta
// requisição (um usuário pode pertencer a várias).
const COMPANY_ID_HEADER: &str = "x-company-id";

/// Guarda de tenant: autentica o usuário E resolve a empresa ativa.
///
/// Monta o `TenantContext` só depois de confirmar que o usuário é membro
/// da empresa pedida. Cabeçalho ausente, UUID malformado e usuário que
/// não é membro caem todos em `InvalidTenant` — nenhuma variação de erro
/// entrega se a empresa existe.
pub async fn tenant_guard(
    State(app_state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(AppError::InvalidToken)?;
    let user = app_state.auth_service.validate_token(bearer.token()).await?;

    let company_id = request
        .headers()
        .get(COMPANY_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value).ok());

    let role = match company_id {
        Some(id) => app_state.company_repo.member_role(user.id, id).await?,
        None => None,
    };

    let context = match role {
        Some(role) => TenantContext::new(company_id, vec![role])?,
        None => return Err(AppError::InvalidTenant),
    };

    request.extensions_mut().insert(user);
    request.extensions_mut().insert(context);

    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TenantContext>()
            .cloned()
            .ok_or(AppError::InvalidTenant)
    }
}
