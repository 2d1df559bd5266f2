// src/handlers/companies.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::company::CreateCompanyPayload,
};

// POST /api/companies
// Onboarding: cria a empresa e torna quem chamou o dono, numa transação.
pub async fn create_company(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateCompanyPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let region = payload.normalized_region()?;

    let company = app_state
        .company_service
        .onboard_company(&payload.name, &region, user.0.id)
        .await?;

    Ok((StatusCode::CREATED, Json(company)))
}

// GET /api/companies
pub async fn list_my_companies(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let companies = app_state.company_service.list_for_user(user.0.id).await?;
    Ok(Json(companies))
}

// DELETE /api/companies/{id}
// "Apagar" empresa é sempre desativar; o cadastro permanece.
pub async fn deactivate_company(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(company_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    // A verificação de papel usa o vínculo real, não um cabeçalho.
    let role = app_state
        .company_repo
        .member_role(user.0.id, company_id)
        .await?
        .ok_or(AppError::InvalidTenant)?;

    app_state
        .company_service
        .deactivate_company(company_id, &role)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
