// src/handlers/trades.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::trading::{QuoteDraft, TradeDraft},
    tenancy::TenantContext,
};

// Todos os handlers daqui rodam atrás do `tenant_guard`: o `TenantContext`
// chega pronto e validado, e o serviço abre uma sessão cercada por ele.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeListQuery {
    pub instrument: Option<String>,
}

// POST /api/trades
pub async fn create_trade(
    State(app_state): State<AppState>,
    context: TenantContext,
    Json(draft): Json<TradeDraft>,
) -> Result<impl IntoResponse, AppError> {
    draft.validate()?;

    let trade = app_state.trading_service.create_trade(context, &draft).await?;
    Ok((StatusCode::CREATED, Json(trade)))
}

// GET /api/trades?instrument=...
pub async fn list_trades(
    State(app_state): State<AppState>,
    context: TenantContext,
    Query(query): Query<TradeListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let trades = app_state
        .trading_service
        .list_trades(context, query.instrument)
        .await?;
    Ok(Json(trades))
}

// GET /api/trades/{id}
pub async fn get_trade(
    State(app_state): State<AppState>,
    context: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let trade = app_state.trading_service.get_trade(context, id).await?;
    Ok(Json(trade))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepriceTradePayload {
    pub price: Decimal,
}

// PATCH /api/trades/{id}/price
pub async fn reprice_trade(
    State(app_state): State<AppState>,
    context: TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<RepriceTradePayload>,
) -> Result<impl IntoResponse, AppError> {
    let trade = app_state
        .trading_service
        .reprice_trade(context, id, payload.price)
        .await?;
    Ok(Json(trade))
}

// POST /api/trades/{id}/execute
pub async fn execute_trade(
    State(app_state): State<AppState>,
    context: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let trade = app_state.trading_service.execute_trade(context, id).await?;
    Ok(Json(trade))
}

// DELETE /api/trades/{id}
pub async fn cancel_trade(
    State(app_state): State<AppState>,
    context: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.trading_service.cancel_trade(context, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Cotações
// ---

// POST /api/quotes
pub async fn create_quote(
    State(app_state): State<AppState>,
    context: TenantContext,
    Json(draft): Json<QuoteDraft>,
) -> Result<impl IntoResponse, AppError> {
    draft.validate()?;

    let quote = app_state.trading_service.create_quote(context, &draft).await?;
    Ok((StatusCode::CREATED, Json(quote)))
}

// GET /api/quotes
pub async fn list_quotes(
    State(app_state): State<AppState>,
    context: TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let quotes = app_state.trading_service.list_quotes(context).await?;
    Ok(Json(quotes))
}

// DELETE /api/quotes/{id}
pub async fn drop_quote(
    State(app_state): State<AppState>,
    context: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.trading_service.drop_quote(context, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
