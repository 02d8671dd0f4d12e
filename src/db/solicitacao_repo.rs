use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    common::error::AppError,
    models::solicitacao::{DadosSolicitacao, Solicitacao, SolicitacaoDetalhe, StatusSolicitacao},
};

const SELECT_DETALHE: &str = "
    SELECT
        s.*,
        sr.nome AS setor_remetente_nome,
        sd.nome AS setor_destinatario_nome,
        u_req.nome AS requerente_nome,
        u_resp.nome AS responsavel_setor_nome,
        u_req.setor_id AS requerente_setor_id
    FROM solicitacoes s
    JOIN setores sr ON s.setor_remetente_id = sr.id
    JOIN setores sd ON s.setor_destinatario_id = sd.id
    JOIN usuarios u_req ON s.requerente_id = u_req.id
    JOIN usuarios u_resp ON s.responsavel_setor_id = u_resp.id
";

// Remapeia violação de FK que sobreviveu ao pré-check (corrida) para a forma descritiva.
fn mapear_erro_escrita(e: sqlx::Error) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_foreign_key_violation() {
            return AppError::ReferenciaInvalida(vec![
                "Uma das referências informadas (setor ou usuário) não existe mais.".to_string(),
            ]);
        }
    }
    AppError::DatabaseError(e)
}

#[derive(Clone)]
pub struct SolicitacaoRepository {
    pool: PgPool,
}

impl SolicitacaoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insere uma solicitação completa e retorna o id gerado.
    pub async fn inserir(&self, dados: &DadosSolicitacao) -> Result<i32, AppError> {
        let faltando = || anyhow::anyhow!("Campo obrigatório ausente após validação");

        let (id,): (i32,) = sqlx::query_as(
            "INSERT INTO solicitacoes
                (nome_documento, descricao, quantidade, setor_remetente_id,
                 setor_destinatario_id, requerente_id, responsavel_setor_id,
                 data_transferencia, observacoes, status, data_recebimento,
                 caminho_arquivo_assinado)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING id",
        )
        .bind(dados.nome_documento.as_deref().ok_or_else(faltando)?)
        .bind(dados.descricao.as_deref())
        .bind(dados.quantidade)
        .bind(dados.setor_remetente_id.ok_or_else(faltando)?)
        .bind(dados.setor_destinatario_id.ok_or_else(faltando)?)
        .bind(dados.requerente_id.ok_or_else(faltando)?)
        .bind(dados.responsavel_setor_id.ok_or_else(faltando)?)
        .bind(dados.data_transferencia.ok_or_else(faltando)?)
        .bind(dados.observacoes.as_deref())
        .bind(dados.status)
        .bind(dados.data_recebimento)
        .bind(dados.caminho_arquivo_assinado.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(mapear_erro_escrita)?;

        Ok(id)
    }

    pub async fn buscar_por_id(&self, id: i32) -> Result<Option<SolicitacaoDetalhe>, AppError> {
        let sql = format!("{} WHERE s.id = $1", SELECT_DETALHE);
        let linha = sqlx::query_as::<_, SolicitacaoDetalhe>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(linha)
    }

    pub async fn listar_todas(&self) -> Result<Vec<SolicitacaoDetalhe>, AppError> {
        let sql = format!("{} ORDER BY s.criado_em DESC", SELECT_DETALHE);
        let linhas = sqlx::query_as::<_, SolicitacaoDetalhe>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(linhas)
    }

    /// Solicitações em que o setor aparece como remetente OU destinatário.
    pub async fn listar_por_setor(&self, setor_id: i32) -> Result<Vec<SolicitacaoDetalhe>, AppError> {
        let sql = format!(
            "{} WHERE s.setor_remetente_id = $1 OR s.setor_destinatario_id = $1
             ORDER BY s.criado_em DESC",
            SELECT_DETALHE
        );
        let linhas = sqlx::query_as::<_, SolicitacaoDetalhe>(&sql)
            .bind(setor_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(linhas)
    }

    /// Atualização parcial: escreve apenas os campos listados em `campos`.
    /// Campos desconhecidos ou imutáveis já foram filtrados pelo serviço.
    pub async fn atualizar(
        &self,
        id: i32,
        dados: &DadosSolicitacao,
        campos: &[String],
    ) -> Result<(), AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE solicitacoes SET ");
        let mut algum = false;

        {
            let mut sep = qb.separated(", ");
            for campo in campos {
                match campo.as_str() {
                    "nome_documento" => {
                        sep.push("nome_documento = ");
                        sep.push_bind_unseparated(dados.nome_documento.clone());
                    }
                    "descricao" => {
                        sep.push("descricao = ");
                        sep.push_bind_unseparated(dados.descricao.clone());
                    }
                    "quantidade" => {
                        sep.push("quantidade = ");
                        sep.push_bind_unseparated(dados.quantidade);
                    }
                    "setor_remetente_id" => {
                        sep.push("setor_remetente_id = ");
                        sep.push_bind_unseparated(dados.setor_remetente_id);
                    }
                    "setor_destinatario_id" => {
                        sep.push("setor_destinatario_id = ");
                        sep.push_bind_unseparated(dados.setor_destinatario_id);
                    }
                    "responsavel_setor_id" => {
                        sep.push("responsavel_setor_id = ");
                        sep.push_bind_unseparated(dados.responsavel_setor_id);
                    }
                    "data_transferencia" => {
                        sep.push("data_transferencia = ");
                        sep.push_bind_unseparated(dados.data_transferencia);
                    }
                    "observacoes" => {
                        sep.push("observacoes = ");
                        sep.push_bind_unseparated(dados.observacoes.clone());
                    }
                    "status" => {
                        sep.push("status = ");
                        sep.push_bind_unseparated(dados.status);
                    }
                    "data_recebimento" => {
                        sep.push("data_recebimento = ");
                        sep.push_bind_unseparated(dados.data_recebimento);
                    }
                    "caminho_arquivo_assinado" => {
                        sep.push("caminho_arquivo_assinado = ");
                        sep.push_bind_unseparated(dados.caminho_arquivo_assinado.clone());
                    }
                    _ => continue,
                }
                algum = true;
            }
        }

        if !algum {
            return Ok(());
        }

        qb.push(" WHERE id = ");
        qb.push_bind(id);

        qb.build()
            .execute(&self.pool)
            .await
            .map_err(mapear_erro_escrita)?;
        Ok(())
    }

    /// Transição dirigida pelo sistema: anexa o arquivo assinado, carimba a data
    /// de recebimento e força o status para 'assinado' num único UPDATE.
    pub async fn anexar_assinado(
        &self,
        id: i32,
        caminho: &str,
        recebido_em: DateTime<Utc>,
    ) -> Result<Solicitacao, AppError> {
        let registro = sqlx::query_as::<_, Solicitacao>(
            "UPDATE solicitacoes
             SET status = $2, data_recebimento = $3, caminho_arquivo_assinado = $4
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(StatusSolicitacao::Assinado)
        .bind(recebido_em)
        .bind(caminho)
        .fetch_one(&self.pool)
        .await?;
        Ok(registro)
    }

    /// Exclusão física; retorna quantas linhas foram removidas.
    pub async fn excluir(&self, id: i32) -> Result<u64, AppError> {
        let resultado = sqlx::query("DELETE FROM solicitacoes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(resultado.rows_affected())
    }
}
