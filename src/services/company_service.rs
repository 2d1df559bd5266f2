// src/services/company_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CompanyRepository,
    models::company::Company,
};

pub const ROLE_OWNER: &str = "owner";

#[derive(Clone)]
pub struct CompanyService {
    company_repo: CompanyRepository,
    pool: PgPool, // Usamos a pool para iniciar transações
}

impl CompanyService {
    pub fn new(company_repo: CompanyRepository, pool: PgPool) -> Self {
        Self { company_repo, pool }
    }

    /// LÓGICA DE NEGÓCIO: cria a empresa e, atomicamente, torna o usuário
    /// que a criou o seu primeiro membro (dono). Se qualquer passo falhar,
    /// a transação desfaz tudo — não existe empresa sem dono.
    pub async fn onboard_company(
        &self,
        name: &str,
        region_code: &str,
        owner_id: Uuid,
    ) -> Result<Company, AppError> {
        let mut tx = self.pool.begin().await?;

        let company = self
            .company_repo
            .create_company(&mut *tx, name, region_code)
            .await?;

        self.company_repo
            .add_member(&mut *tx, owner_id, company.id, ROLE_OWNER)
            .await?;

        tx.commit().await?;

        tracing::info!(company_id = %company.id, "empresa criada no onboarding");
        Ok(company)
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Company>, AppError> {
        self.company_repo.list_for_user(user_id).await
    }

    /// Só o dono desliga a empresa; e desligar é sempre soft.
    pub async fn deactivate_company(
        &self,
        company_id: Uuid,
        caller_role: &str,
    ) -> Result<(), AppError> {
        if caller_role != ROLE_OWNER {
            return Err(AppError::InvalidTenant);
        }
        self.company_repo.deactivate(company_id).await
    }
}
