// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Usuario {
    pub id: i32,
    pub usuario: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    pub senha: String,

    pub nome: String,
    pub setor_id: Option<i32>,
    pub criado_em: DateTime<Utc>,
}

// Linha enxuta para o GET /api/usuarios (sem senha e sem datas)
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct UsuarioResumo {
    pub id: i32,
    pub usuario: String,
    pub nome: String,
}

// Dados para registro de um novo usuário
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterPayload {
    #[validate(length(min = 3, message = "Nome de usuário precisa ter pelo menos 3 caracteres."))]
    #[schema(example = "joao.silva")]
    pub usuario: String,

    #[validate(length(min = 6, max = 50, message = "A senha precisa ter entre 6 e 50 caracteres."))]
    pub password: String,

    #[validate(length(min = 2, message = "Nome completo é obrigatório e deve ter pelo menos 2 caracteres."))]
    #[schema(example = "João da Silva")]
    pub nome: String,

    #[validate(range(min = 1, message = "Setor é obrigatório para registro."))]
    #[schema(example = 1)]
    pub setor_id: i32,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(length(min = 3, message = "Nome de usuário precisa ter pelo menos 3 caracteres."))]
    pub usuario: String,

    #[validate(length(min = 6, max = 50, message = "A senha precisa ter entre 6 e 50 caracteres."))]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub mensagem: String,
    pub token: String,
}

// Resposta do registro (sem token; o fluxo do cliente segue para o login)
#[derive(Debug, Serialize, ToSchema)]
pub struct RegistroResponse {
    pub mensagem: String,
    pub usuario: UsuarioComRoles,
}

// Usuário com a lista de papéis carregada da tabela de junção
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UsuarioComRoles {
    pub id: i32,
    pub usuario: String,
    pub nome: String,
    pub setor_id: Option<i32>,
    pub roles: Vec<String>,
}

// Estrutura de dados ("claims") dentro do JWT.
// Carrega identidade + papéis para que a autorização não dependa de novas idas ao banco.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,            // ID do usuário
    pub usuario: String,     // Identificador de login
    pub nome: String,        // Nome de exibição
    pub setor_id: Option<i32>,
    pub roles: Vec<String>,
    pub exp: usize,          // Expiration time
    pub iat: usize,          // Issued At
}

// Identidade do chamador corrente, extraída do token pelo middleware.
#[derive(Debug, Clone)]
pub struct UsuarioAtual {
    pub id: i32,
    pub usuario: String,
    pub nome: String,
    pub setor_id: Option<i32>,
    pub roles: Vec<String>,
}

impl From<Claims> for UsuarioAtual {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            usuario: claims.usuario,
            nome: claims.nome,
            setor_id: claims.setor_id,
            roles: claims.roles,
        }
    }
}

impl UsuarioAtual {
    pub fn tem_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}
