//src/main.rs

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod autorizacao;
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;
mod validacao;

use crate::common::upload;
use crate::config::AppState;
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    // Inicializa o logger.
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Garante que o diretório de uploads existe antes de aceitar requisições
    upload::garantir_diretorios()
        .await
        .expect("Falha ao criar diretórios de upload.");

    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Rotas de solicitações (todas protegidas pelo middleware de auth)
    let solicitacao_routes = Router::new()
        .route(
            "/",
            post(handlers::solicitacoes::criar).get(handlers::solicitacoes::listar),
        )
        .route(
            "/relatorio-geral-pdf",
            get(handlers::documentos::gerar_planilha_geral),
        )
        .route(
            "/{id}",
            get(handlers::solicitacoes::buscar)
                .put(handlers::solicitacoes::atualizar)
                .delete(handlers::solicitacoes::excluir),
        )
        .route(
            "/{id}/anexar-relatorio",
            put(handlers::solicitacoes::anexar_relatorio),
        )
        .route("/{id}/relatorio-pdf", get(handlers::documentos::gerar_recibo))
        // Limite acima dos 5MB do upload: assim o arquivo grande chega ao
        // handler e recebe o 400 correto em vez de um 413 genérico.
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Rotas de dados de referência
    let usuario_routes = Router::new()
        .route("/", get(handlers::dados::listar_usuarios))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/setores", get(handlers::dados::listar_setores))
        .nest("/api/auth", auth_routes)
        .nest("/api/solicitacoes", solicitacao_routes)
        .nest("/api/usuarios", usuario_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest_service("/uploads", ServeDir::new(upload::UPLOADS_ROOT))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    // Inicia o servidor
    let porta = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{}", porta);
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
