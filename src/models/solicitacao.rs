// src/models/solicitacao.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::common::error::AppError;
use crate::validacao;

// --- Enums ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "status_solicitacao", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StatusSolicitacao {
    #[default]
    Pendente,
    Recebido,
    Assinado,
    Recusado,
}

impl StatusSolicitacao {
    pub const VALORES: [&'static str; 4] = ["pendente", "recebido", "assinado", "recusado"];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusSolicitacao::Pendente => "pendente",
            StatusSolicitacao::Recebido => "recebido",
            StatusSolicitacao::Assinado => "assinado",
            StatusSolicitacao::Recusado => "recusado",
        }
    }

    pub fn parse(valor: &str) -> Option<Self> {
        match valor {
            "pendente" => Some(StatusSolicitacao::Pendente),
            "recebido" => Some(StatusSolicitacao::Recebido),
            "assinado" => Some(StatusSolicitacao::Assinado),
            "recusado" => Some(StatusSolicitacao::Recusado),
            _ => None,
        }
    }
}

// --- Entidade ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Solicitacao {
    pub id: i32,
    #[schema(example = "Prontuário 2024/331")]
    pub nome_documento: String,
    pub descricao: Option<String>,
    #[schema(example = 3)]
    pub quantidade: i32,
    pub setor_remetente_id: i32,
    pub setor_destinatario_id: i32,
    pub requerente_id: i32,
    pub responsavel_setor_id: i32,
    #[schema(example = "2025-03-14")]
    pub data_transferencia: NaiveDate,
    pub observacoes: Option<String>,
    pub status: StatusSolicitacao,
    pub data_recebimento: Option<DateTime<Utc>>,
    pub caminho_arquivo_assinado: Option<String>,
    pub criado_em: DateTime<Utc>,
}

// Linha da listagem/consulta: a solicitação junto com os nomes de exibição
// dos setores e usuários envolvidos.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct SolicitacaoDetalhe {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub solicitacao: Solicitacao,
    pub setor_remetente_nome: String,
    pub setor_destinatario_nome: String,
    pub requerente_nome: String,
    pub responsavel_setor_nome: String,
    pub requerente_setor_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Setor {
    pub id: i32,
    #[schema(example = "Arquivo Central")]
    pub nome: String,
}

// --- Payload normalizado ---

// Campos que o cliente nunca atualiza diretamente.
pub const CAMPOS_IMUTAVEIS: [&str; 3] = ["id", "criado_em", "requerente_id"];

/// Forma tipada do payload depois da normalização + validação.
/// A conversão só roda com a validação aprovada; qualquer resíduo de tipo
/// inesperado aqui é um bug interno, não um erro do cliente.
#[derive(Debug, Clone, Default)]
pub struct DadosSolicitacao {
    pub nome_documento: Option<String>,
    pub descricao: Option<String>,
    pub quantidade: i32,
    pub setor_remetente_id: Option<i32>,
    pub setor_destinatario_id: Option<i32>,
    pub requerente_id: Option<i32>,
    pub responsavel_setor_id: Option<i32>,
    pub data_transferencia: Option<NaiveDate>,
    pub observacoes: Option<String>,
    pub status: StatusSolicitacao,
    pub data_recebimento: Option<DateTime<Utc>>,
    pub caminho_arquivo_assinado: Option<String>,
}

fn como_string(corpo: &Map<String, Value>, campo: &str) -> Option<String> {
    corpo.get(campo).and_then(Value::as_str).map(str::to_owned)
}

fn como_i32(corpo: &Map<String, Value>, campo: &str) -> Option<i32> {
    corpo
        .get(campo)
        .and_then(Value::as_i64)
        .and_then(|n| i32::try_from(n).ok())
}

impl DadosSolicitacao {
    /// Constrói a forma tipada a partir de um corpo já normalizado e validado.
    pub fn do_corpo(corpo: &Map<String, Value>) -> Result<Self, AppError> {
        let data_transferencia = match como_string(corpo, "data_transferencia") {
            Some(s) => Some(
                NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                    .map_err(|e| anyhow::anyhow!("Data de transferência fora do formato após validação: {}", e))?,
            ),
            None => None,
        };

        let data_recebimento = match como_string(corpo, "data_recebimento") {
            Some(s) => Some(
                validacao::parse_data_hora(&s)
                    .ok_or_else(|| anyhow::anyhow!("Data de recebimento inválida após validação"))?,
            ),
            None => None,
        };

        let status_texto = como_string(corpo, "status").unwrap_or_else(|| "pendente".to_string());
        let status = StatusSolicitacao::parse(&status_texto)
            .ok_or_else(|| anyhow::anyhow!("Status inválido após validação: {}", status_texto))?;

        Ok(Self {
            nome_documento: como_string(corpo, "nome_documento"),
            descricao: como_string(corpo, "descricao"),
            quantidade: como_i32(corpo, "quantidade").unwrap_or(0),
            setor_remetente_id: como_i32(corpo, "setor_remetente_id"),
            setor_destinatario_id: como_i32(corpo, "setor_destinatario_id"),
            requerente_id: como_i32(corpo, "requerente_id"),
            responsavel_setor_id: como_i32(corpo, "responsavel_setor_id"),
            data_transferencia,
            observacoes: como_string(corpo, "observacoes"),
            status,
            data_recebimento,
            caminho_arquivo_assinado: como_string(corpo, "caminho_arquivo_assinado"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn corpo_valido() -> Map<String, Value> {
        json!({
            "nome_documento": "Prontuário 104",
            "descricao": "Transferência anual",
            "quantidade": 2,
            "setor_remetente_id": 1,
            "setor_destinatario_id": 2,
            "requerente_id": 7,
            "responsavel_setor_id": 9,
            "data_transferencia": "2025-03-14",
            "observacoes": null,
            "status": "pendente",
            "data_recebimento": null,
            "caminho_arquivo_assinado": null
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[test]
    fn converte_corpo_normalizado_em_dados_tipados() {
        let dados = DadosSolicitacao::do_corpo(&corpo_valido()).unwrap();
        assert_eq!(dados.nome_documento.as_deref(), Some("Prontuário 104"));
        assert_eq!(dados.quantidade, 2);
        assert_eq!(dados.setor_remetente_id, Some(1));
        assert_eq!(dados.requerente_id, Some(7));
        assert_eq!(
            dados.data_transferencia,
            Some(NaiveDate::from_ymd_opt(2025, 3, 14).unwrap())
        );
        assert_eq!(dados.status, StatusSolicitacao::Pendente);
        assert!(dados.data_recebimento.is_none());
        assert!(dados.caminho_arquivo_assinado.is_none());
    }

    #[test]
    fn status_ausente_vira_pendente() {
        let mut corpo = corpo_valido();
        corpo.remove("status");
        let dados = DadosSolicitacao::do_corpo(&corpo).unwrap();
        assert_eq!(dados.status, StatusSolicitacao::Pendente);
    }

    #[test]
    fn parse_de_status_cobre_os_quatro_valores() {
        for valor in StatusSolicitacao::VALORES {
            assert!(StatusSolicitacao::parse(valor).is_some());
        }
        assert!(StatusSolicitacao::parse("arquivado").is_none());
    }
}
