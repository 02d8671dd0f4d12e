use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::common::error::AppError;

// Diretório onde os arquivos assinados são armazenados, servido como /uploads
pub const UPLOADS_ROOT: &str = "uploads";
pub const DIR_DOCUMENTOS_ASSINADOS: &str = "uploads/documentos_assinados";

// Limite de 5MB por arquivo
pub const TAMANHO_MAXIMO: usize = 5 * 1024 * 1024;

pub const MIME_PDF: &str = "application/pdf";

/// Garante que o diretório de uploads exista antes do servidor aceitar requisições.
pub async fn garantir_diretorios() -> Result<(), AppError> {
    tokio::fs::create_dir_all(DIR_DOCUMENTOS_ASSINADOS)
        .await
        .map_err(|e| anyhow::anyhow!("Falha ao criar diretório de uploads: {}", e))?;
    tracing::info!("Diretório de uploads garantido: {}", DIR_DOCUMENTOS_ASSINADOS);
    Ok(())
}

/// Gera um nome de arquivo único para o documento assinado de uma solicitação.
/// Ex: documento_assinado_12_550e8400-....pdf
pub fn nome_arquivo_assinado(solicitacao_id: i32) -> String {
    format!("documento_assinado_{}_{}.pdf", solicitacao_id, Uuid::new_v4())
}

/// Valida as restrições do upload (apenas PDF, até 5MB) antes de qualquer gravação.
pub fn validar_arquivo(content_type: Option<&str>, tamanho: usize) -> Result<(), AppError> {
    if content_type != Some(MIME_PDF) {
        return Err(AppError::ArquivoNaoSuportado);
    }
    if tamanho > TAMANHO_MAXIMO {
        return Err(AppError::ArquivoMuitoGrande);
    }
    Ok(())
}

/// Grava o arquivo no disco e retorna o caminho público (servido pelo ServeDir).
pub async fn salvar_arquivo_assinado(
    solicitacao_id: i32,
    dados: &[u8],
) -> Result<String, AppError> {
    let nome = nome_arquivo_assinado(solicitacao_id);
    let destino: PathBuf = Path::new(DIR_DOCUMENTOS_ASSINADOS).join(&nome);

    tokio::fs::write(&destino, dados)
        .await
        .map_err(|e| anyhow::anyhow!("Falha ao gravar arquivo assinado: {}", e))?;

    Ok(format!("/uploads/documentos_assinados/{}", nome))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nome_do_arquivo_leva_o_id_da_solicitacao() {
        let nome = nome_arquivo_assinado(42);
        assert!(nome.starts_with("documento_assinado_42_"));
        assert!(nome.ends_with(".pdf"));
    }

    #[test]
    fn nomes_gerados_nao_colidem() {
        assert_ne!(nome_arquivo_assinado(1), nome_arquivo_assinado(1));
    }

    #[test]
    fn rejeita_mime_que_nao_e_pdf() {
        let err = validar_arquivo(Some("image/png"), 100).unwrap_err();
        assert!(matches!(err, AppError::ArquivoNaoSuportado));

        let err = validar_arquivo(None, 100).unwrap_err();
        assert!(matches!(err, AppError::ArquivoNaoSuportado));
    }

    #[test]
    fn rejeita_arquivo_acima_de_5mb() {
        let err = validar_arquivo(Some(MIME_PDF), TAMANHO_MAXIMO + 1).unwrap_err();
        assert!(matches!(err, AppError::ArquivoMuitoGrande));
    }

    #[test]
    fn aceita_pdf_dentro_do_limite() {
        assert!(validar_arquivo(Some(MIME_PDF), TAMANHO_MAXIMO).is_ok());
    }
}
