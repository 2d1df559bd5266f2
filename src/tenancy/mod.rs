// src/tenancy/mod.rs
//
// O coração do multi-tenancy: contexto por requisição, sessão de dados
// cercada por empresa e a fábrica que liga os dois à pool.

pub mod context;
pub mod entity;
pub mod factory;
pub mod session;

pub use context::TenantContext;
pub use entity::{Changes, CompanyScoped, Filter, Op, SqlValue};
pub use factory::SessionFactory;
pub use session::TenantScopedSession;
