// src/models/company.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::common::error::AppError;

// ---
// 1. Company (O Tenant)
// ---
// A organização dona dos dados. Empresas nunca são apagadas fisicamente:
// desligamento é `status = inactive`, preservando o histórico de auditoria.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub region_code: String,

    // Guardado como TEXT no banco; ver `CompanyStatus`.
    #[sqlx(try_from = "String")]
    pub status: CompanyStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompanyStatus {
    Active,
    Inactive,
}

impl CompanyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompanyStatus::Active => "active",
            CompanyStatus::Inactive => "inactive",
        }
    }
}

impl std::fmt::Display for CompanyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for CompanyStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "active" => Ok(CompanyStatus::Active),
            "inactive" => Ok(CompanyStatus::Inactive),
            other => Err(format!("status de empresa desconhecido: '{}'", other)),
        }
    }
}

// ---
// 2. Payloads
// ---
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCompanyPayload {
    #[validate(length(min = 1, message = "O nome da empresa é obrigatório."))]
    pub name: String,

    // ISO 3166-1 alfa-2 ("BR", "AE", "GB"...)
    #[validate(length(equal = 2, message = "O código de região deve ter 2 letras."))]
    pub region_code: String,
}

impl CreateCompanyPayload {
    /// Normaliza a região para caixa alta e valida o formato.
    pub fn normalized_region(&self) -> Result<String, AppError> {
        let region = self.region_code.to_uppercase();
        if !region.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(AppError::InvalidInput(
                "O código de região deve conter apenas letras.".to_string(),
            ));
        }
        Ok(region)
    }
}
