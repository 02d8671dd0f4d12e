use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::auth::{Usuario, UsuarioResumo},
};

// O repositório de usuários, responsável por todas as interações com a tabela 'usuarios'
#[derive(Clone)]
pub struct UsuarioRepository {
    pool: PgPool,
}

impl UsuarioRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um usuário pelo seu identificador de login
    pub async fn buscar_por_login(&self, usuario: &str) -> Result<Option<Usuario>, AppError> {
        let linha = sqlx::query_as::<_, Usuario>("SELECT * FROM usuarios WHERE usuario = $1")
            .bind(usuario)
            .fetch_optional(&self.pool)
            .await?;
        Ok(linha)
    }

    pub async fn existe(&self, id: i32) -> Result<bool, AppError> {
        let linha: Option<(i32,)> = sqlx::query_as("SELECT id FROM usuarios WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(linha.is_some())
    }

    // Cria um novo usuário dentro da transação do registro
    pub async fn criar_usuario<'e, E>(
        &self,
        executor: E,
        usuario: &str,
        senha_hash: &str,
        nome: &str,
        setor_id: i32,
    ) -> Result<Usuario, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Usuario>(
            "INSERT INTO usuarios (usuario, senha, nome, setor_id) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(usuario)
        .bind(senha_hash)
        .bind(nome)
        .bind(setor_id)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            // Converte violações de constraint em erros mais amigáveis
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::UsuarioJaExiste;
                }
                if db_err.is_foreign_key_violation() {
                    return AppError::ReferenciaInvalida(vec![
                        "ID do setor inválido. Selecione um setor existente.".to_string(),
                    ]);
                }
            }
            AppError::DatabaseError(e)
        })
    }

    // Atribui um papel pelo nome (papel padrão no registro)
    pub async fn atribuir_role<'e, E>(
        &self,
        executor: E,
        usuario_id: i32,
        role_nome: &str,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let resultado = sqlx::query(
            "INSERT INTO usuario_roles (usuario_id, role_id)
             SELECT $1, id FROM roles WHERE nome = $2",
        )
        .bind(usuario_id)
        .bind(role_nome)
        .execute(executor)
        .await?;

        if resultado.rows_affected() == 0 {
            tracing::warn!(
                "Papel '{}' não encontrado na tabela 'roles'. Usuário {} ficou sem papel.",
                role_nome,
                usuario_id
            );
        }
        Ok(())
    }

    pub async fn roles_do_usuario(&self, usuario_id: i32) -> Result<Vec<String>, AppError> {
        let linhas: Vec<(String,)> = sqlx::query_as(
            "SELECT r.nome
             FROM roles r
             JOIN usuario_roles ur ON r.id = ur.role_id
             WHERE ur.usuario_id = $1",
        )
        .bind(usuario_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(linhas.into_iter().map(|(nome,)| nome).collect())
    }

    pub async fn listar(&self) -> Result<Vec<UsuarioResumo>, AppError> {
        let linhas = sqlx::query_as::<_, UsuarioResumo>(
            "SELECT id, usuario, nome FROM usuarios ORDER BY nome",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(linhas)
    }
}
