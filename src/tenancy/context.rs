// src/tenancy/context.rs

use uuid::Uuid;

use crate::common::error::AppError;

// ---
// TenantContext (A "Identidade" da Requisição)
// ---
// Carrega a empresa autenticada e os papéis do utilizador durante UMA
// requisição. É construído no início, descartado no fim, e nunca persiste.
// Os campos são privados: depois de construído, ninguém altera a empresa.
#[derive(Debug, Clone)]
pub struct TenantContext {
    company_id: Uuid,
    roles: Vec<String>,
}

impl TenantContext {
    /// Constrói o contexto a partir de um identificador já autenticado.
    /// Rejeita `None` e o UUID nulo — sem empresa válida, não há sessão.
    pub fn new(company_id: Option<Uuid>, roles: Vec<String>) -> Result<Self, AppError> {
        match company_id {
            Some(id) if !id.is_nil() => Ok(Self { company_id: id, roles }),
            _ => Err(AppError::InvalidTenant),
        }
    }

    pub fn company_id(&self) -> Uuid {
        self.company_id
    }

    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}
