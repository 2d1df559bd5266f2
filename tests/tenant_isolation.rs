// tests/tenant_isolation.rs
//
// Cenários de isolamento entre empresas, contra um Postgres real.
// Rodam com `cargo test -- --ignored` e precisam de DATABASE_URL apontando
// para um banco de testes (as migrações rodam sozinhas).

use std::time::Duration;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use etrm_backend::common::error::AppError;
use etrm_backend::db::{CompanyRepository, UserRepository};
use etrm_backend::models::trading::{Trade, TradeDraft, TradeSide};
use etrm_backend::tenancy::{Changes, Filter, SessionFactory, TenantContext};

async fn test_pool(max_connections: u32) -> PgPool {
    dotenvy::dotenv().ok();
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL deve apontar para o banco de testes");
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(3))
        .connect(&url)
        .await
        .expect("Falha ao conectar no banco de testes");

    sqlx::migrate!().run(&pool).await.expect("Falha nas migrações");
    pool
}

/// Cria uma empresa nova com um dono novo e devolve o contexto dela.
async fn new_company(pool: &PgPool) -> TenantContext {
    let users = UserRepository::new(pool.clone());
    let companies = CompanyRepository::new(pool.clone());

    let suffix = Uuid::new_v4();
    let owner = users
        .create_user(&format!("owner-{}@example.com", suffix), "hash-de-teste")
        .await
        .unwrap();
    let company = companies
        .create_company(pool, &format!("Empresa {}", suffix), "BR")
        .await
        .unwrap();
    companies
        .add_member(pool, owner.id, company.id, "owner")
        .await
        .unwrap();

    TenantContext::new(Some(company.id), vec!["owner".to_string()]).unwrap()
}

fn draft(instrument: &str, company_id: Option<Uuid>) -> TradeDraft {
    TradeDraft {
        company_id,
        instrument: instrument.to_string(),
        side: TradeSide::Buy,
        quantity: Decimal::new(100, 0),
        price: Decimal::new(5000, 2),
        currency: "EUR".to_string(),
        trade_date: NaiveDate::from_ymd_opt(2026, 8, 30).unwrap(),
    }
}

// Cenário 1: o trade criado pertence à empresa da sessão, mesmo com o
// payload omitindo a empresa.
#[tokio::test]
#[ignore = "precisa de um Postgres acessível via DATABASE_URL"]
async fn create_atribui_a_empresa_da_sessao() {
    let pool = test_pool(5).await;
    let factory = SessionFactory::new(pool.clone());
    let ctx_a = new_company(&pool).await;

    let mut session = factory.open(ctx_a.clone()).await.unwrap();
    let trade: Trade = session.create(&draft("PWR-BASE-2027", None)).await.unwrap();

    assert_eq!(trade.company_id, ctx_a.company_id());
}

// Cenários 2 e 4: a sessão de B não enxerga, não altera e não remove o
// trade de A — e o erro é sempre o mesmo NotFound.
#[tokio::test]
#[ignore = "precisa de um Postgres acessível via DATABASE_URL"]
async fn sessao_de_outra_empresa_recebe_not_found_uniforme() {
    let pool = test_pool(5).await;
    let factory = SessionFactory::new(pool.clone());
    let ctx_a = new_company(&pool).await;
    let ctx_b = new_company(&pool).await;

    let mut session_a = factory.open(ctx_a.clone()).await.unwrap();
    let trade: Trade = session_a.create(&draft("GAS-TTF-M1", None)).await.unwrap();

    let mut session_b = factory.open(ctx_b).await.unwrap();

    // findById de um id de outra empresa
    let err = session_b.find_by_id::<Trade>(trade.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    // e de um id que não existe em lugar nenhum: MESMO erro, MESMA mensagem
    let ghost = Uuid::new_v4();
    let err_ghost = session_b.find_by_id::<Trade>(ghost).await.unwrap_err();
    assert!(matches!(err_ghost, AppError::NotFound));
    assert_eq!(err.to_string(), err_ghost.to_string());

    // update e delete cross-tenant: idem
    let changes = Changes::new().set("instrument", "OUTRO");
    assert!(matches!(
        session_b.update::<Trade>(trade.id, &changes).await.unwrap_err(),
        AppError::NotFound
    ));
    assert!(matches!(
        session_b.delete::<Trade>(trade.id).await.unwrap_err(),
        AppError::NotFound
    ));

    // O trade de A continua lá, intacto.
    let mut session_a = factory.open(ctx_a).await.unwrap();
    let found = session_a.find_by_id::<Trade>(trade.id).await.unwrap();
    assert_eq!(found.instrument, "GAS-TTF-M1");
}

// Cenário 3: company_id é imutável — no create (valor divergente) e no
// update (para qualquer id).
#[tokio::test]
#[ignore = "precisa de um Postgres acessível via DATABASE_URL"]
async fn company_id_e_imutavel() {
    let pool = test_pool(5).await;
    let factory = SessionFactory::new(pool.clone());
    let ctx_a = new_company(&pool).await;
    let ctx_b = new_company(&pool).await;

    let mut session_a = open_session(&factory, &ctx_a).await;
    let trade: Trade = session_a.create(&draft("CO2-EUA-DEC26", None)).await.unwrap();

    // create apontando outra empresa
    let err = session_a
        .create::<Trade>(&draft("CO2-EUA-DEC26", Some(ctx_b.company_id())))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ImmutableField));

    // update tentando mover o trade de empresa
    let changes = Changes::new().set("company_id", ctx_b.company_id());
    let err = session_a.update::<Trade>(trade.id, &changes).await.unwrap_err();
    assert!(matches!(err, AppError::ImmutableField));

    // e nada mudou
    let found = session_a.find_by_id::<Trade>(trade.id).await.unwrap();
    assert_eq!(found.company_id, ctx_a.company_id());
}

// Cenário 6: zero vazamento em listas, mesmo sem nenhum filtro.
#[tokio::test]
#[ignore = "precisa de um Postgres acessível via DATABASE_URL"]
async fn find_sem_filtro_nao_vaza_nada() {
    let pool = test_pool(5).await;
    let factory = SessionFactory::new(pool.clone());
    let ctx_a = new_company(&pool).await;
    let ctx_b = new_company(&pool).await;

    let instrument = format!("ISOL-{}", Uuid::new_v4());
    let mut session_a = open_session(&factory, &ctx_a).await;
    for _ in 0..100 {
        session_a.create::<Trade>(&draft(&instrument, None)).await.unwrap();
    }

    let mut session_b = open_session(&factory, &ctx_b).await;
    let leaked: Vec<Trade> = session_b.find(&Filter::new()).await.unwrap();
    assert!(leaked.is_empty());

    let filter = Filter::new().eq("instrument", instrument.as_str());
    let mine: Vec<Trade> = session_a.find(&filter).await.unwrap();
    assert_eq!(mine.len(), 100);
}

// Propriedade de liberação de recurso: a conexão volta para a pool em
// conclusão normal, em erro de negócio e em cancelamento da task.
#[tokio::test]
#[ignore = "precisa de um Postgres acessível via DATABASE_URL"]
async fn conexao_volta_para_a_pool_em_todos_os_caminhos() {
    let pool = test_pool(5).await;
    let ctx = new_company(&pool).await;

    // Pool de UMA conexão: se a sessão não devolver, o segundo open trava.
    let url = std::env::var("DATABASE_URL").unwrap();
    let tiny = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(3))
        .connect(&url)
        .await
        .unwrap();
    let factory = SessionFactory::new(tiny.clone());

    // (a) conclusão normal
    {
        let mut session = factory.open(ctx.clone()).await.unwrap();
        let _: Vec<Trade> = session.find(&Filter::new()).await.unwrap();
    }

    // (b) erro de negócio no meio da sessão
    {
        let mut session = factory.open(ctx.clone()).await.unwrap();
        let err = session.find_by_id::<Trade>(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    // (c) cancelamento da task dona da sessão
    let factory_clone = factory.clone();
    let ctx_clone = ctx.clone();
    let task = tokio::spawn(async move {
        let _session = factory_clone.open(ctx_clone).await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
    });
    tokio::time::sleep(Duration::from_millis(200)).await;
    task.abort();
    let _ = task.await;

    // Se qualquer caminho tivesse vazado a conexão, este open estouraria
    // o acquire_timeout.
    let mut session = factory.open(ctx).await.unwrap();
    let _: Vec<Trade> = session.find(&Filter::new()).await.unwrap();
}

async fn open_session(
    factory: &SessionFactory,
    ctx: &TenantContext,
) -> etrm_backend::tenancy::TenantScopedSession {
    factory.open(ctx.clone()).await.unwrap()
}

// Cenário 5 não precisa de banco: contexto sem empresa é rejeitado na
// construção.
#[test]
fn contexto_sem_empresa_e_invalido() {
    let err = TenantContext::new(None, vec![]).unwrap_err();
    assert!(matches!(err, AppError::InvalidTenant));
}

// Empresa desativada não abre sessão nova, com o mesmo InvalidTenant de
// empresa inexistente.
#[tokio::test]
#[ignore = "precisa de um Postgres acessível via DATABASE_URL"]
async fn empresa_inativa_nao_abre_sessao() {
    let pool = test_pool(5).await;
    let factory = SessionFactory::new(pool.clone());
    let companies = CompanyRepository::new(pool.clone());
    let ctx = new_company(&pool).await;

    companies.deactivate(ctx.company_id()).await.unwrap();

    let err = factory.open(ctx).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidTenant));

    // empresa que nunca existiu: mesmo erro
    let ghost = TenantContext::new(Some(Uuid::new_v4()), vec![]).unwrap();
    let err_ghost = factory.open(ghost).await.unwrap_err();
    assert!(matches!(err_ghost, AppError::InvalidTenant));
}
