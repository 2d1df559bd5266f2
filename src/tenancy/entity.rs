// src/tenancy/entity.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{postgres::PgRow, FromRow, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::common::error::AppError;

// A coluna que delimita o tenant em TODAS as tabelas de negócio.
pub const COMPANY_COLUMN: &str = "company_id";

// ---
// 1. CompanyScoped (O "Contrato" de toda entidade de negócio)
// ---
// Qualquer registro que pertence a uma empresa (contrato, trade, posição,
// métrica de risco...) implementa este trait. Ele declara a forma da tabela
// e como montar um INSERT a partir do payload de criação. A entidade NÃO
// decide o `company_id` — isso é sempre da sessão.
pub trait CompanyScoped: for<'r> FromRow<'r, PgRow> + Send + Unpin {
    /// O payload aceito por `create` (sem `id`, sem timestamps).
    type Draft: Send + Sync;

    /// Nome da tabela no Postgres.
    const TABLE: &'static str;

    /// Colunas retornadas por SELECT/RETURNING, na ordem do `FromRow`.
    const COLUMNS: &'static [&'static str];

    /// `true` = remoção marca `deleted_at`; `false` = DELETE físico.
    /// Registros com trilha de auditoria (trades, contratos) usam soft-delete.
    const SOFT_DELETE: bool = true;

    /// O `company_id` que o chamador eventualmente colocou no payload.
    /// `Some(outro)` diferente da sessão é erro; a sessão sobrescreve sempre.
    fn draft_company_id(draft: &Self::Draft) -> Option<Uuid>;

    /// Pares (coluna, valor) do INSERT, SEM `company_id` — a sessão o injeta.
    fn insert_values(draft: &Self::Draft) -> Vec<(&'static str, SqlValue)>;
}

// ---
// 2. SqlValue (Valor "bindável")
// ---
// O subconjunto de tipos Postgres que o domínio usa. Ter um enum fechado
// permite montar filtros e updates dinâmicos sem abrir mão do bind
// parametrizado (nada de interpolar valor em SQL).
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Uuid(Uuid),
    Text(String),
    Int(i64),
    Bool(bool),
    Decimal(Decimal),
    Timestamp(DateTime<Utc>),
    Date(NaiveDate),
}

impl SqlValue {
    /// Empurra o valor como bind parametrizado no builder.
    pub fn push_to<'args>(&self, qb: &mut QueryBuilder<'args, Postgres>) {
        match self {
            SqlValue::Uuid(v) => {
                qb.push_bind(*v);
            }
            SqlValue::Text(v) => {
                qb.push_bind(v.clone());
            }
            SqlValue::Int(v) => {
                qb.push_bind(*v);
            }
            SqlValue::Bool(v) => {
                qb.push_bind(*v);
            }
            SqlValue::Decimal(v) => {
                qb.push_bind(*v);
            }
            SqlValue::Timestamp(v) => {
                qb.push_bind(*v);
            }
            SqlValue::Date(v) => {
                qb.push_bind(*v);
            }
        }
    }
}

impl From<Uuid> for SqlValue {
    fn from(v: Uuid) -> Self {
        SqlValue::Uuid(v)
    }
}
impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}
impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}
impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}
impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}
impl From<Decimal> for SqlValue {
    fn from(v: Decimal) -> Self {
        SqlValue::Decimal(v)
    }
}
impl From<DateTime<Utc>> for SqlValue {
    fn from(v: DateTime<Utc>) -> Self {
        SqlValue::Timestamp(v)
    }
}
impl From<NaiveDate> for SqlValue {
    fn from(v: NaiveDate) -> Self {
        SqlValue::Date(v)
    }
}

// ---
// 3. Filter (Critérios de busca do chamador)
// ---
// Conjunção de cláusulas `coluna <op> valor`. O filtro do chamador é sempre
// ADICIONADO ao predicado de tenant — nunca o substitui.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Op {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "<>",
            Op::Gt => ">",
            Op::Gte => ">=",
            Op::Lt => "<",
            Op::Lte => "<=",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Filter {
    clauses: Vec<(String, Op, SqlValue)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn and(mut self, column: &str, op: Op, value: impl Into<SqlValue>) -> Self {
        self.clauses.push((column.to_string(), op, value.into()));
        self
    }

    pub fn eq(self, column: &str, value: impl Into<SqlValue>) -> Self {
        self.and(column, Op::Eq, value)
    }

    pub fn clauses(&self) -> &[(String, Op, SqlValue)] {
        &self.clauses
    }

    /// Os nomes de coluna vão direto para o SQL, então só aceitamos colunas
    /// declaradas pela entidade. Qualquer outra coisa é rejeitada antes
    /// de tocar o banco.
    pub fn check_columns<T: CompanyScoped>(&self) -> Result<(), AppError> {
        for (col, _, _) in &self.clauses {
            if !T::COLUMNS.contains(&col.as_str()) {
                return Err(AppError::InvalidFilter(col.clone()));
            }
        }
        Ok(())
    }
}

// ---
// 4. Changes (O "SET" de um update)
// ---
#[derive(Debug, Clone, Default)]
pub struct Changes {
    sets: Vec<(String, SqlValue)>,
}

impl Changes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, column: &str, value: impl Into<SqlValue>) -> Self {
        self.sets.push((column.to_string(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn sets(&self) -> &[(String, SqlValue)] {
        &self.sets
    }

    /// Mesma verificação de colunas do `Filter`, mais a regra dura:
    /// `company_id` num update é SEMPRE `ImmutableField`, exista o registro
    /// ou não. A verificação acontece antes de qualquer I/O. As colunas de
    /// sistema (id e timestamps) também não são atualizáveis pelo chamador.
    pub fn check_columns<T: CompanyScoped>(&self) -> Result<(), AppError> {
        const SYSTEM_COLUMNS: &[&str] = &["id", "created_at", "updated_at", "deleted_at"];

        for (col, _) in &self.sets {
            if col == COMPANY_COLUMN {
                return Err(AppError::ImmutableField);
            }
            if SYSTEM_COLUMNS.contains(&col.as_str()) || !T::COLUMNS.contains(&col.as_str()) {
                return Err(AppError::InvalidFilter(col.clone()));
            }
        }
        Ok(())
    }
}
