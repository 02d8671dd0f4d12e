use sqlx::PgPool;

use crate::{common::error::AppError, models::solicitacao::Setor};

// Setores são dados de referência estáticos; só há leitura.
#[derive(Clone)]
pub struct SetorRepository {
    pool: PgPool,
}

impl SetorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn listar(&self) -> Result<Vec<Setor>, AppError> {
        let setores = sqlx::query_as::<_, Setor>("SELECT id, nome FROM setores ORDER BY nome")
            .fetch_all(&self.pool)
            .await?;
        Ok(setores)
    }

    pub async fn existe(&self, id: i32) -> Result<bool, AppError> {
        let linha: Option<(i32,)> = sqlx::query_as("SELECT id FROM setores WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(linha.is_some())
    }
}
