// src/lib.rs
//
// Backend multi-tenant de ETRM: todo dado de negócio pertence a UMA
// empresa, e todo acesso a dado de negócio passa por uma sessão cercada
// que injeta o predicado de tenant sozinha.

pub mod common;
pub mod config;
pub mod db;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod tenancy;
