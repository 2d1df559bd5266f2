// src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
    Router,
};
use tokio::net::TcpListener;

use etrm_backend::config::AppState;
use etrm_backend::handlers;
use etrm_backend::middleware::{auth::auth_guard, tenancy::tenant_guard};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .compact()
        .init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas públicas de autenticação
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Rotas que só precisam de usuário autenticado (ainda sem empresa)
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let company_routes = Router::new()
        .route(
            "/",
            post(handlers::companies::create_company).get(handlers::companies::list_my_companies),
        )
        .route("/{id}", delete(handlers::companies::deactivate_company))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Rotas de negócio: tudo aqui roda atrás do tenant_guard, então todo
    // handler recebe um TenantContext validado e opera via sessão cercada.
    let trading_routes = Router::new()
        .route(
            "/trades",
            post(handlers::trades::create_trade).get(handlers::trades::list_trades),
        )
        .route(
            "/trades/{id}",
            get(handlers::trades::get_trade).delete(handlers::trades::cancel_trade),
        )
        .route("/trades/{id}/price", patch(handlers::trades::reprice_trade))
        .route("/trades/{id}/execute", post(handlers::trades::execute_trade))
        .route(
            "/quotes",
            post(handlers::trades::create_quote).get(handlers::trades::list_quotes),
        )
        .route("/quotes/{id}", delete(handlers::trades::drop_quote))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            tenant_guard,
        ));

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/companies", company_routes)
        .nest("/api", trading_routes)
        .with_state(app_state);

    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
