// src/db/company_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{auth::UserCompany, company::Company},
};

// Repositório do cadastro de empresas (os tenants em si). Onboarding e
// administração não são dados "de" um tenant, então ficam fora da sessão
// cercada — mas TODO o resto do domínio passa por ela.
#[derive(Clone)]
pub struct CompanyRepository {
    pool: PgPool,
}

impl CompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Cria uma empresa nova, já ativa. Aceita um executor para poder
    /// participar da transação de onboarding.
    pub async fn create_company<'e, E>(
        &self,
        executor: E,
        name: &str,
        region_code: &str,
    ) -> Result<Company, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (name, region_code, status)
            VALUES ($1, $2, 'active')
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(region_code)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::CompanyNameAlreadyExists(name.to_string());
                }
            }
            e.into()
        })
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Company>, AppError> {
        let company = sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(company)
    }

    /// Liga um usuário a uma empresa com um papel. Participa da transação
    /// de onboarding junto com `create_company`.
    pub async fn add_member<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        company_id: Uuid,
        role: &str,
    ) -> Result<UserCompany, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let membership = sqlx::query_as::<_, UserCompany>(
            r#"
            INSERT INTO user_companies (user_id, company_id, role)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(company_id)
        .bind(role)
        .fetch_one(executor)
        .await?;
        Ok(membership)
    }

    /// A verificação de autorização mais importante do sistema: o usuário
    /// pertence a esta empresa? Retorna o papel dele, ou `None`.
    pub async fn member_role(
        &self,
        user_id: Uuid,
        company_id: Uuid,
    ) -> Result<Option<String>, AppError> {
        let role: Option<(String,)> = sqlx::query_as(
            "SELECT role FROM user_companies WHERE user_id = $1 AND company_id = $2",
        )
        .bind(user_id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(role.map(|(r,)| r))
    }

    /// Todas as empresas das quais o usuário é membro.
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Company>, AppError> {
        let companies = sqlx::query_as::<_, Company>(
            r#"
            SELECT c.* FROM companies c
            JOIN user_companies uc ON uc.company_id = c.id
            WHERE uc.user_id = $1
            ORDER BY c.created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(companies)
    }

    /// Desligamento de empresa é sempre soft: o cadastro e o histórico
    /// permanecem, mas nenhuma sessão nova pode ser aberta para ela.
    pub async fn deactivate(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE companies SET status = 'inactive', updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
