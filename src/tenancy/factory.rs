// src/tenancy/factory.rs

use sqlx::PgPool;

use crate::common::error::AppError;
use crate::tenancy::context::TenantContext;
use crate::tenancy::session::TenantScopedSession;

// ---
// SessionFactory (A "Fábrica" de sessões cercadas)
// ---
// Recebe a pool por injeção no `AppState` — nunca por lookup global — e
// produz uma `TenantScopedSession` por requisição. A pool é o único estado
// compartilhado do subsistema: nasce no start do processo e morre com ele.
#[derive(Clone)]
pub struct SessionFactory {
    pool: PgPool,
}

impl SessionFactory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Abre uma sessão presa ao contexto informado.
    ///
    /// Antes de emprestar a conexão, confirma que a empresa existe e está
    /// ativa. Empresa desconhecida e empresa desativada caem no mesmo
    /// `InvalidTenant` — sem distinção que entregue existência.
    pub async fn open(&self, context: TenantContext) -> Result<TenantScopedSession, AppError> {
        let status: Option<(String,)> =
            sqlx::query_as("SELECT status FROM companies WHERE id = $1")
                .bind(context.company_id())
                .fetch_optional(&self.pool)
                .await?;

        match status.as_ref().map(|(s,)| s.as_str()) {
            Some("active") => {}
            _ => return Err(AppError::InvalidTenant),
        }

        let conn = self.pool.acquire().await?;
        tracing::debug!(company_id = %context.company_id(), "sessão de tenant aberta");
        Ok(TenantScopedSession::new(conn, context))
    }

    /// Acesso direto à pool para os colaboradores NÃO cercados por tenant
    /// (onboarding de empresas, autenticação de utilizadores).
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
