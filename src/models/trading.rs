// src/models/trading.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::tenancy::entity::{CompanyScoped, SqlValue};

// ---
// 1. Trade (O Negócio Fechado)
// ---
// Registro financeiro com trilha de auditoria: remoção é soft-delete.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: Uuid,
    pub company_id: Uuid,
    pub instrument: String,

    #[sqlx(try_from = "String")]
    pub side: TradeSide,

    pub quantity: Decimal,
    pub price: Decimal,
    pub currency: String,
    pub trade_date: NaiveDate,

    #[sqlx(try_from = "String")]
    pub status: TradeStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeSide::Buy => "buy",
            TradeSide::Sell => "sell",
        }
    }
}

impl TryFrom<String> for TradeSide {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "buy" => Ok(TradeSide::Buy),
            "sell" => Ok(TradeSide::Sell),
            other => Err(format!("lado de trade desconhecido: '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Pending,
    Executed,
    Cancelled,
}

impl TradeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeStatus::Pending => "pending",
            TradeStatus::Executed => "executed",
            TradeStatus::Cancelled => "cancelled",
        }
    }
}

impl TryFrom<String> for TradeStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "pending" => Ok(TradeStatus::Pending),
            "executed" => Ok(TradeStatus::Executed),
            "cancelled" => Ok(TradeStatus::Cancelled),
            other => Err(format!("status de trade desconhecido: '{}'", other)),
        }
    }
}

// O payload de criação. O `company_id` é opcional de propósito: se vier
// preenchido com outra empresa, a sessão rejeita com `ImmutableField`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TradeDraft {
    pub company_id: Option<Uuid>,

    #[validate(length(min = 1, message = "O instrumento é obrigatório."))]
    pub instrument: String,

    pub side: TradeSide,
    pub quantity: Decimal,
    pub price: Decimal,

    #[validate(length(equal = 3, message = "A moeda deve ser um código ISO de 3 letras."))]
    pub currency: String,

    pub trade_date: NaiveDate,
}

impl CompanyScoped for Trade {
    type Draft = TradeDraft;

    const TABLE: &'static str = "trades";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "company_id",
        "instrument",
        "side",
        "quantity",
        "price",
        "currency",
        "trade_date",
        "status",
        "created_at",
        "updated_at",
        "deleted_at",
    ];

    fn draft_company_id(draft: &Self::Draft) -> Option<Uuid> {
        draft.company_id
    }

    fn insert_values(draft: &Self::Draft) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("instrument", SqlValue::from(draft.instrument.as_str())),
            ("side", SqlValue::from(draft.side.as_str())),
            ("quantity", SqlValue::from(draft.quantity)),
            ("price", SqlValue::from(draft.price)),
            ("currency", SqlValue::from(draft.currency.as_str())),
            ("trade_date", SqlValue::from(draft.trade_date)),
            ("status", SqlValue::from(TradeStatus::Pending.as_str())),
        ]
    }
}

// ---
// 2. Quote (A Cotação)
// ---
// Efêmera: expira sozinha e não carrega obrigação de auditoria,
// então a remoção é DELETE físico.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: Uuid,
    pub company_id: Uuid,
    pub instrument: String,

    #[sqlx(try_from = "String")]
    pub side: TradeSide,

    pub price: Decimal,
    pub valid_until: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuoteDraft {
    pub company_id: Option<Uuid>,

    #[validate(length(min = 1, message = "O instrumento é obrigatório."))]
    pub instrument: String,

    pub side: TradeSide,
    pub price: Decimal,
    pub valid_until: DateTime<Utc>,
}

impl CompanyScoped for Quote {
    type Draft = QuoteDraft;

    const TABLE: &'static str = "quotes";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "company_id",
        "instrument",
        "side",
        "price",
        "valid_until",
        "created_at",
        "updated_at",
    ];
    const SOFT_DELETE: bool = false;

    fn draft_company_id(draft: &Self::Draft) -> Option<Uuid> {
        draft.company_id
    }

    fn insert_values(draft: &Self::Draft) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("instrument", SqlValue::from(draft.instrument.as_str())),
            ("side", SqlValue::from(draft.side.as_str())),
            ("price", SqlValue::from(draft.price)),
            ("valid_until", SqlValue::from(draft.valid_until)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lado_e_status_fazem_ida_e_volta_pelo_texto() {
        assert_eq!(TradeSide::try_from("buy".to_string()).unwrap(), TradeSide::Buy);
        assert_eq!(
            TradeStatus::try_from("cancelled".to_string()).unwrap(),
            TradeStatus::Cancelled
        );
        assert!(TradeSide::try_from("hold".to_string()).is_err());
    }

    #[test]
    fn insert_de_trade_nunca_inclui_company_id() {
        let draft = TradeDraft {
            company_id: Some(Uuid::new_v4()),
            instrument: "PWR-BASE-2027".to_string(),
            side: TradeSide::Buy,
            quantity: Decimal::new(500, 0),
            price: Decimal::new(7345, 2),
            currency: "EUR".to_string(),
            trade_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
        };
        let values = Trade::insert_values(&draft);
        assert!(values.iter().all(|(col, _)| *col != "company_id"));
    }

    #[test]
    fn trade_nasce_pendente() {
        let draft = TradeDraft {
            company_id: None,
            instrument: "GAS-TTF-M1".to_string(),
            side: TradeSide::Sell,
            quantity: Decimal::new(100, 0),
            price: Decimal::new(3120, 2),
            currency: "EUR".to_string(),
            trade_date: NaiveDate::from_ymd_opt(2026, 8, 30).unwrap(),
        };
        let status = Trade::insert_values(&draft)
            .into_iter()
            .find(|(col, _)| *col == "status")
            .map(|(_, v)| v);
        assert_eq!(status, Some(SqlValue::Text("pending".to_string())));
    }
}
