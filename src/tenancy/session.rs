// src/tenancy/session.rs

use sqlx::{pool::PoolConnection, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::tenancy::context::TenantContext;
use crate::tenancy::entity::{Changes, CompanyScoped, Filter};

// ---
// TenantScopedSession (A "Sessão Cercada")
// ---
// Uma sessão de acesso a dados presa a UMA empresa. Todo SELECT, INSERT,
// UPDATE e DELETE que passa por aqui carrega o predicado
// `company_id = <empresa da sessão>` montado pela própria sessão — o
// chamador não tem como esquecer (nem como remover) o filtro de tenant.
//
// Em vez de confiar que cada repositório lembre do `WHERE company_id = $1`,
// centralizamos os três verbos de acesso num único ponto. Esquecer o filtro
// passa a ser estruturalmente impossível, não uma questão de code review.
//
// Ciclo de vida: uma sessão por requisição, criada pela `SessionFactory`.
// A conexão emprestada da pool volta sozinha no `Drop` — em sucesso, em
// erro de negócio e em cancelamento da task.
#[derive(Debug)]
pub struct TenantScopedSession {
    conn: PoolConnection<Postgres>,
    context: TenantContext,
}

impl TenantScopedSession {
    pub(crate) fn new(conn: PoolConnection<Postgres>, context: TenantContext) -> Self {
        Self { conn, context }
    }

    pub fn context(&self) -> &TenantContext {
        &self.context
    }

    pub fn company_id(&self) -> Uuid {
        self.context.company_id()
    }

    /// Persiste uma nova entidade para a empresa da sessão.
    ///
    /// O `company_id` do registro é SEMPRE o da sessão. Um payload que
    /// traga outra empresa é rejeitado com `ImmutableField` antes de
    /// qualquer I/O; um payload sem empresa (o caso normal) é preenchido.
    pub async fn create<T: CompanyScoped>(&mut self, draft: &T::Draft) -> Result<T, AppError> {
        if let Some(given) = T::draft_company_id(draft) {
            if given != self.company_id() {
                return Err(AppError::ImmutableField);
            }
        }

        let mut qb = insert_builder::<T>(self.company_id(), draft);
        let row = qb
            .build_query_as::<T>()
            .fetch_one(&mut *self.conn)
            .await?;

        tracing::debug!(
            table = T::TABLE,
            company_id = %self.company_id(),
            "registro criado"
        );
        Ok(row)
    }

    /// Busca registros da empresa da sessão que satisfaçam o filtro.
    /// Linhas de outras empresas nunca aparecem, nem são contadas.
    pub async fn find<T: CompanyScoped>(&mut self, filter: &Filter) -> Result<Vec<T>, AppError> {
        filter.check_columns::<T>()?;

        let mut qb = select_builder::<T>(self.company_id(), filter);
        let rows = qb
            .build_query_as::<T>()
            .fetch_all(&mut *self.conn)
            .await?;
        Ok(rows)
    }

    /// Busca um registro pelo id, dentro da empresa da sessão.
    ///
    /// "Não existe" e "existe mas é de outra empresa" retornam o MESMO
    /// `NotFound` — a resolução já acontece com o predicado de tenant,
    /// então a query nem distingue os dois casos.
    pub async fn find_by_id<T: CompanyScoped>(&mut self, id: Uuid) -> Result<T, AppError> {
        let mut qb = select_by_id_builder::<T>(self.company_id(), id);
        qb.build_query_as::<T>()
            .fetch_optional(&mut *self.conn)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Atualiza um registro da empresa da sessão.
    ///
    /// `company_id` em `changes` é `ImmutableField` para QUALQUER id,
    /// existente ou não (verificado antes de tocar o banco). A resolução
    /// usa o mesmo predicado de tenant do `find_by_id`: alvo inexistente
    /// ou de outra empresa é o mesmo `NotFound`.
    pub async fn update<T: CompanyScoped>(
        &mut self,
        id: Uuid,
        changes: &Changes,
    ) -> Result<T, AppError> {
        changes.check_columns::<T>()?;
        if changes.is_empty() {
            return Err(AppError::InvalidInput(
                "Nenhuma alteração foi informada.".to_string(),
            ));
        }

        let mut qb = update_builder::<T>(self.company_id(), id, changes);
        qb.build_query_as::<T>()
            .fetch_optional(&mut *self.conn)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Remove um registro da empresa da sessão.
    ///
    /// Soft-delete (marca `deleted_at`) ou DELETE físico conforme a
    /// entidade declara. Zero linhas afetadas — inexistente OU de outra
    /// empresa — é o mesmo `NotFound`.
    pub async fn delete<T: CompanyScoped>(&mut self, id: Uuid) -> Result<(), AppError> {
        let mut qb = delete_builder::<T>(self.company_id(), id);
        let result = qb.build().execute(&mut *self.conn).await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        tracing::debug!(
            table = T::TABLE,
            company_id = %self.company_id(),
            "registro removido"
        );
        Ok(())
    }
}

// ---
// Montagem de SQL
// ---
// Funções livres para que a forma das queries seja testável sem banco.
// Todos os valores entram como bind parametrizado; os nomes de coluna já
// foram validados contra `T::COLUMNS` por quem chama.

fn columns_sql<T: CompanyScoped>() -> String {
    T::COLUMNS.join(", ")
}

fn select_builder<T: CompanyScoped>(
    company_id: Uuid,
    filter: &Filter,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!(
        "SELECT {} FROM {} WHERE company_id = ",
        columns_sql::<T>(),
        T::TABLE
    ));
    qb.push_bind(company_id);
    if T::SOFT_DELETE {
        qb.push(" AND deleted_at IS NULL");
    }
    for (col, op, value) in filter.clauses() {
        qb.push(format!(" AND {} {} ", col, op.as_sql()));
        value.push_to(&mut qb);
    }
    qb
}

fn select_by_id_builder<T: CompanyScoped>(
    company_id: Uuid,
    id: Uuid,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = select_builder::<T>(company_id, &Filter::new());
    qb.push(" AND id = ");
    qb.push_bind(id);
    qb
}

fn insert_builder<T: CompanyScoped>(
    company_id: Uuid,
    draft: &T::Draft,
) -> QueryBuilder<'static, Postgres> {
    let values = T::insert_values(draft);

    let mut qb = QueryBuilder::new(format!("INSERT INTO {} (company_id", T::TABLE));
    for (col, _) in &values {
        qb.push(format!(", {}", col));
    }
    qb.push(") VALUES (");
    qb.push_bind(company_id);
    for (_, value) in &values {
        qb.push(", ");
        value.push_to(&mut qb);
    }
    qb.push(format!(") RETURNING {}", columns_sql::<T>()));
    qb
}

fn update_builder<T: CompanyScoped>(
    company_id: Uuid,
    id: Uuid,
    changes: &Changes,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("UPDATE {} SET ", T::TABLE));
    for (i, (col, value)) in changes.sets().iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        qb.push(format!("{} = ", col));
        value.push_to(&mut qb);
    }
    qb.push(", updated_at = now() WHERE company_id = ");
    qb.push_bind(company_id);
    qb.push(" AND id = ");
    qb.push_bind(id);
    if T::SOFT_DELETE {
        qb.push(" AND deleted_at IS NULL");
    }
    qb.push(format!(" RETURNING {}", columns_sql::<T>()));
    qb
}

fn delete_builder<T: CompanyScoped>(company_id: Uuid, id: Uuid) -> QueryBuilder<'static, Postgres> {
    let mut qb = if T::SOFT_DELETE {
        QueryBuilder::new(format!(
            "UPDATE {} SET deleted_at = now(), updated_at = now() WHERE company_id = ",
            T::TABLE
        ))
    } else {
        QueryBuilder::new(format!("DELETE FROM {} WHERE company_id = ", T::TABLE))
    };
    qb.push_bind(company_id);
    qb.push(" AND id = ");
    qb.push_bind(id);
    if T::SOFT_DELETE {
        qb.push(" AND deleted_at IS NULL");
    }
    qb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tenancy::entity::SqlValue;

    // Entidade com trilha de auditoria (soft-delete).
    #[derive(Debug, sqlx::FromRow)]
    struct Ledger {
        #[allow(dead_code)]
        id: Uuid,
        #[allow(dead_code)]
        company_id: Uuid,
        #[allow(dead_code)]
        label: String,
    }

    impl CompanyScoped for Ledger {
        type Draft = String;
        const TABLE: &'static str = "ledgers";
        const COLUMNS: &'static [&'static str] = &["id", "company_id", "label"];

        fn draft_company_id(_: &Self::Draft) -> Option<Uuid> {
            None
        }
        fn insert_values(draft: &Self::Draft) -> Vec<(&'static str, SqlValue)> {
            vec![("label", SqlValue::from(draft.as_str()))]
        }
    }

    // Entidade efêmera (DELETE físico).
    #[derive(Debug, sqlx::FromRow)]
    struct Tick {
        #[allow(dead_code)]
        id: Uuid,
        #[allow(dead_code)]
        company_id: Uuid,
    }

    impl CompanyScoped for Tick {
        type Draft = ();
        const TABLE: &'static str = "ticks";
        const COLUMNS: &'static [&'static str] = &["id", "company_id"];
        const SOFT_DELETE: bool = false;

        fn draft_company_id(_: &Self::Draft) -> Option<Uuid> {
            None
        }
        fn insert_values(_: &Self::Draft) -> Vec<(&'static str, SqlValue)> {
            vec![]
        }
    }

    #[test]
    fn select_carrega_o_predicado_de_tenant() {
        let qb = select_builder::<Ledger>(Uuid::new_v4(), &Filter::new());
        assert_eq!(
            qb.sql(),
            "SELECT id, company_id, label FROM ledgers \
             WHERE company_id = $1 AND deleted_at IS NULL"
        );
    }

    #[test]
    fn filtro_do_chamador_e_conjugado_ao_tenant() {
        let filter = Filter::new().eq("label", "hedge");
        let qb = select_builder::<Ledger>(Uuid::new_v4(), &filter);
        assert_eq!(
            qb.sql(),
            "SELECT id, company_id, label FROM ledgers \
             WHERE company_id = $1 AND deleted_at IS NULL AND label = $2"
        );
    }

    #[test]
    fn busca_por_id_tambem_filtra_por_tenant() {
        let qb = select_by_id_builder::<Ledger>(Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(
            qb.sql(),
            "SELECT id, company_id, label FROM ledgers \
             WHERE company_id = $1 AND deleted_at IS NULL AND id = $2"
        );
    }

    #[test]
    fn insert_injeta_company_id_como_primeira_coluna() {
        let qb = insert_builder::<Ledger>(Uuid::new_v4(), &"x".to_string());
        assert_eq!(
            qb.sql(),
            "INSERT INTO ledgers (company_id, label) VALUES ($1, $2) \
             RETURNING id, company_id, label"
        );
    }

    #[test]
    fn update_resolve_o_alvo_com_predicado_de_tenant() {
        let changes = Changes::new().set("label", "novo");
        let qb = update_builder::<Ledger>(Uuid::new_v4(), Uuid::new_v4(), &changes);
        assert_eq!(
            qb.sql(),
            "UPDATE ledgers SET label = $1, updated_at = now() \
             WHERE company_id = $2 AND id = $3 AND deleted_at IS NULL \
             RETURNING id, company_id, label"
        );
    }

    #[test]
    fn delete_soft_marca_deleted_at() {
        let qb = delete_builder::<Ledger>(Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(
            qb.sql(),
            "UPDATE ledgers SET deleted_at = now(), updated_at = now() \
             WHERE company_id = $1 AND id = $2 AND deleted_at IS NULL"
        );
    }

    #[test]
    fn delete_fisico_para_entidade_efemera() {
        let qb = delete_builder::<Tick>(Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(
            qb.sql(),
            "DELETE FROM ticks WHERE company_id = $1 AND id = $2"
        );
    }

    #[test]
    fn select_sem_soft_delete_nao_filtra_deleted_at() {
        let qb = select_builder::<Tick>(Uuid::new_v4(), &Filter::new());
        assert_eq!(
            qb.sql(),
            "SELECT id, company_id FROM ticks WHERE company_id = $1"
        );
    }
}
