use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    // Erros de payload das rotas de auth (validator derive)
    #[error("Erro de validação")]
    PayloadInvalido(#[from] validator::ValidationErrors),

    // Erros da engine de validação da solicitação: lista de mensagens
    #[error("Campos inválidos")]
    Validacao(Vec<String>),

    // Referências (setor/usuário) que não existem no banco
    #[error("Referência inexistente")]
    ReferenciaInvalida(Vec<String>),

    #[error("Nome de usuário já em uso")]
    UsuarioJaExiste,

    #[error("Credenciais inválidas")]
    CredenciaisInvalidas,

    #[error("Token inválido")]
    TokenInvalido,

    #[error("Token expirado")]
    TokenExpirado,

    #[error("Acesso negado: {0}")]
    AcessoNegado(&'static str),

    #[error("{0}")]
    NaoEncontrado(&'static str),

    #[error("Apenas arquivos PDF são permitidos")]
    ArquivoNaoSuportado,

    #[error("Arquivo excede o tamanho máximo de 5MB")]
    ArquivoMuitoGrande,

    #[error("Fonte não encontrada: {0}")]
    FonteNaoEncontrada(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação do `validator`.
            AppError::PayloadInvalido(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "erro": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            // A engine de validação e o check de referências devolvem a lista completa.
            AppError::Validacao(erros) | AppError::ReferenciaInvalida(erros) => {
                let body = Json(json!({ "erros": erros }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            AppError::UsuarioJaExiste => {
                (StatusCode::CONFLICT, "Nome de usuário já está em uso.".to_string())
            }
            AppError::CredenciaisInvalidas => {
                (StatusCode::UNAUTHORIZED, "Usuário ou senha inválidos.".to_string())
            }
            AppError::TokenInvalido => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticação inválido ou ausente.".to_string(),
            ),
            AppError::TokenExpirado => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticação expirado. Por favor, faça login novamente.".to_string(),
            ),
            AppError::AcessoNegado(motivo) => {
                (StatusCode::FORBIDDEN, format!("Acesso negado. {}", motivo))
            }
            AppError::NaoEncontrado(msg) => (StatusCode::NOT_FOUND, msg.to_string()),
            AppError::ArquivoNaoSuportado => (
                StatusCode::BAD_REQUEST,
                "Apenas arquivos PDF são permitidos para upload.".to_string(),
            ),
            AppError::ArquivoMuitoGrande => (
                StatusCode::BAD_REQUEST,
                "O arquivo excede o tamanho máximo de 5MB.".to_string(),
            ),

            // Todos os outros erros (DatabaseError, InternalServerError, ...) viram 500.
            // O detalhe fica apenas no log do servidor, nunca na resposta.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "erro": error_message }));
        (status, body).into_response()
    }
}
