// src/config.rs

use anyhow::Context;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};
use std::{env, time::Duration};

use crate::{
    db::{SetorRepository, SolicitacaoRepository, UsuarioRepository},
    services::{
        auth::AuthService, documento_service::DocumentoService,
        solicitacao_service::SolicitacaoService,
    },
};

// Retry de conexão na inicialização: tentativas fixas com intervalo fixo.
// Se esgotar, o processo encerra em vez de servir com a pool indisponível.
const MAX_TENTATIVAS: u32 = 10;
const INTERVALO_RETRY: Duration = Duration::from_secs(5);

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_secret: String,
    pub auth_service: AuthService,
    pub solicitacao_service: SolicitacaoService,
    pub documento_service: DocumentoService,
    pub setor_repo: SetorRepository,
    pub usuario_repo: UsuarioRepository,
}

fn opcoes_do_ambiente() -> anyhow::Result<PgConnectOptions> {
    let host = env::var("DATABASE_HOST").unwrap_or_else(|_| "localhost".to_string());
    let user = env::var("DATABASE_USER").unwrap_or_else(|_| "postgres".to_string());
    let password = env::var("DATABASE_PASSWORD").context("DATABASE_PASSWORD deve ser definida")?;
    let database = env::var("DATABASE_NAME").unwrap_or_else(|_| "arquivos_db".to_string());
    let port: u16 = env::var("DATABASE_PORT")
        .unwrap_or_else(|_| "5432".to_string())
        .parse()
        .context("DATABASE_PORT deve ser um número de porta válido")?;

    Ok(PgConnectOptions::new()
        .host(&host)
        .username(&user)
        .password(&password)
        .database(&database)
        .port(port))
}

async fn conectar_com_retry(opcoes: PgConnectOptions) -> anyhow::Result<PgPool> {
    for tentativa in 1..=MAX_TENTATIVAS {
        tracing::info!("Tentando conectar ao Postgres... Tentativa {}", tentativa);

        match PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(3))
            .connect_with(opcoes.clone())
            .await
        {
            Ok(pool) => {
                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
                return Ok(pool);
            }
            Err(e) => {
                tracing::error!("🔥 Falha ao conectar ao banco de dados: {:?}", e);
                if tentativa < MAX_TENTATIVAS {
                    tracing::info!("Nova tentativa em {} segundos...", INTERVALO_RETRY.as_secs());
                    tokio::time::sleep(INTERVALO_RETRY).await;
                }
            }
        }
    }

    anyhow::bail!("Número máximo de tentativas de conexão excedido.")
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let db_pool = conectar_com_retry(opcoes_do_ambiente()?).await?;

        // --- Monta o gráfico de dependências ---
        let usuario_repo = UsuarioRepository::new(db_pool.clone());
        let setor_repo = SetorRepository::new(db_pool.clone());
        let solicitacao_repo = SolicitacaoRepository::new(db_pool.clone());

        let auth_service =
            AuthService::new(usuario_repo.clone(), jwt_secret.clone(), db_pool.clone());
        let solicitacao_service = SolicitacaoService::new(
            solicitacao_repo.clone(),
            setor_repo.clone(),
            usuario_repo.clone(),
        );
        let documento_service = DocumentoService::new(solicitacao_repo);

        Ok(Self {
            db_pool,
            jwt_secret,
            auth_service,
            solicitacao_service,
            documento_service,
            setor_repo,
            usuario_repo,
        })
    }
}
