// src/config.rs

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::{CompanyRepository, UserRepository},
    services::{AuthService, CompanyService, TradingService},
    tenancy::SessionFactory,
};

// O estado compartilhado que será acessível em toda a aplicação.
// A pool é o ÚNICO estado global do processo: nasce aqui, é injetada em
// tudo que precisa dela, e morre junto com o processo.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub session_factory: SessionFactory,
    pub company_repo: CompanyRepository,
    pub auth_service: AuthService,
    pub company_service: CompanyService,
    pub trading_service: TradingService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")?;

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let company_repo = CompanyRepository::new(db_pool.clone());
        let session_factory = SessionFactory::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo, jwt_secret);
        let company_service = CompanyService::new(company_repo.clone(), db_pool.clone());
        let trading_service = TradingService::new(session_factory.clone());

        Ok(Self {
            db_pool,
            session_factory,
            company_repo,
            auth_service,
            company_service,
            trading_service,
        })
    }
}
