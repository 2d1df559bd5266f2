// src/services/trading_service.rs

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::trading::{Quote, QuoteDraft, Trade, TradeDraft, TradeStatus},
    tenancy::{Changes, Filter, SessionFactory, TenantContext},
};

// A camada de negócio do trading. Repare que NENHUM método recebe ou
// monta um `WHERE company_id` — todo acesso a dados passa pela sessão
// cercada, que é quem carrega o predicado de tenant.
#[derive(Clone)]
pub struct TradingService {
    factory: SessionFactory,
}

impl TradingService {
    pub fn new(factory: SessionFactory) -> Self {
        Self { factory }
    }

    pub async fn create_trade(
        &self,
        context: TenantContext,
        draft: &TradeDraft,
    ) -> Result<Trade, AppError> {
        if draft.quantity <= Decimal::ZERO {
            return Err(AppError::InvalidInput(
                "A quantidade deve ser maior que zero.".to_string(),
            ));
        }
        if draft.price <= Decimal::ZERO {
            return Err(AppError::InvalidInput(
                "O preço deve ser maior que zero.".to_string(),
            ));
        }

        let mut session = self.factory.open(context).await?;
        session.create::<Trade>(draft).await
    }

    pub async fn list_trades(
        &self,
        context: TenantContext,
        instrument: Option<String>,
    ) -> Result<Vec<Trade>, AppError> {
        let mut filter = Filter::new();
        if let Some(instrument) = instrument {
            filter = filter.eq("instrument", instrument);
        }

        let mut session = self.factory.open(context).await?;
        session.find::<Trade>(&filter).await
    }

    pub async fn get_trade(&self, context: TenantContext, id: Uuid) -> Result<Trade, AppError> {
        let mut session = self.factory.open(context).await?;
        session.find_by_id::<Trade>(id).await
    }

    /// Reapreça um trade ainda pendente. O `company_id` não é atualizável
    /// por aqui (nem por lugar nenhum): a sessão rejeita a coluna.
    pub async fn reprice_trade(
        &self,
        context: TenantContext,
        id: Uuid,
        price: Decimal,
    ) -> Result<Trade, AppError> {
        if price <= Decimal::ZERO {
            return Err(AppError::InvalidInput(
                "O preço deve ser maior que zero.".to_string(),
            ));
        }

        let mut session = self.factory.open(context).await?;
        let trade = session.find_by_id::<Trade>(id).await?;
        if trade.status != TradeStatus::Pending {
            return Err(AppError::InvalidInput(
                "Só trades pendentes podem ser reapreçados.".to_string(),
            ));
        }

        let changes = Changes::new().set("price", price);
        session.update::<Trade>(id, &changes).await
    }

    pub async fn execute_trade(&self, context: TenantContext, id: Uuid) -> Result<Trade, AppError> {
        let mut session = self.factory.open(context).await?;
        let changes = Changes::new().set("status", TradeStatus::Executed.as_str());
        session.update::<Trade>(id, &changes).await
    }

    /// Cancela (soft-delete) um trade. O registro continua no banco para
    /// auditoria, mas some de todas as buscas.
    pub async fn cancel_trade(&self, context: TenantContext, id: Uuid) -> Result<(), AppError> {
        let mut session = self.factory.open(context).await?;
        session.delete::<Trade>(id).await
    }

    // ---
    // Cotações
    // ---

    pub async fn create_quote(
        &self,
        context: TenantContext,
        draft: &QuoteDraft,
    ) -> Result<Quote, AppError> {
        if draft.price <= Decimal::ZERO {
            return Err(AppError::InvalidInput(
                "O preço deve ser maior que zero.".to_string(),
            ));
        }

        let mut session = self.factory.open(context).await?;
        session.create::<Quote>(draft).await
    }

    pub async fn list_quotes(&self, context: TenantContext) -> Result<Vec<Quote>, AppError> {
        let mut session = self.factory.open(context).await?;
        session.find::<Quote>(&Filter::new()).await
    }

    pub async fn drop_quote(&self, context: TenantContext, id: Uuid) -> Result<(), AppError> {
        let mut session = self.factory.open(context).await?;
        session.delete::<Quote>(id).await
    }
}
