// src/services/solicitacao_service.rs
//
// Orquestra o fluxo de cada operação sobre solicitações:
// autorização -> normalização/validação -> checagem de referências -> persistência.

use chrono::Utc;
use serde_json::{Map, Value};

use crate::{
    autorizacao::{self, Operacao},
    common::{error::AppError, upload},
    db::{SetorRepository, SolicitacaoRepository, UsuarioRepository},
    models::{
        auth::UsuarioAtual,
        solicitacao::{DadosSolicitacao, Solicitacao, SolicitacaoDetalhe, CAMPOS_IMUTAVEIS},
    },
    validacao,
};

async fn setor_existe(repo: &SetorRepository, id: Option<i32>) -> Result<bool, AppError> {
    match id {
        Some(id) => repo.existe(id).await,
        None => Ok(true),
    }
}

async fn usuario_existe(repo: &UsuarioRepository, id: Option<i32>) -> Result<bool, AppError> {
    match id {
        Some(id) => repo.existe(id).await,
        None => Ok(true),
    }
}

/// Converte o resultado das quatro consultas de existência na lista de
/// mensagens de referência faltante, na ordem dos campos do payload.
/// Lista vazia = todas as referências existem.
fn faltas_de_referencia(
    remetente_ok: bool,
    destinatario_ok: bool,
    requerente_ok: bool,
    responsavel_ok: bool,
) -> Vec<String> {
    let mut erros = Vec::new();
    if !remetente_ok {
        erros.push("Setor remetente não encontrado.".to_string());
    }
    if !destinatario_ok {
        erros.push("Setor destinatário não encontrado.".to_string());
    }
    if !requerente_ok {
        erros.push("Requerente (usuário) não encontrado.".to_string());
    }
    if !responsavel_ok {
        erros.push("Responsável pelo setor (usuário) não encontrado.".to_string());
    }
    erros
}

#[derive(Clone)]
pub struct SolicitacaoService {
    solicitacao_repo: SolicitacaoRepository,
    setor_repo: SetorRepository,
    usuario_repo: UsuarioRepository,
}

impl SolicitacaoService {
    pub fn new(
        solicitacao_repo: SolicitacaoRepository,
        setor_repo: SetorRepository,
        usuario_repo: UsuarioRepository,
    ) -> Self {
        Self { solicitacao_repo, setor_repo, usuario_repo }
    }

    /// Confirma que todas as referências não-nulas existem. As quatro consultas
    /// são independentes e rodam concorrentemente; todas terminam antes do
    /// veredito, e as faltas são agregadas (sem fail-fast).
    async fn verificar_referencias(
        &self,
        dados: &DadosSolicitacao,
        incluir_requerente: bool,
    ) -> Result<(), AppError> {
        let requerente = if incluir_requerente { dados.requerente_id } else { None };

        let (remetente_ok, destinatario_ok, requerente_ok, responsavel_ok) = tokio::join!(
            setor_existe(&self.setor_repo, dados.setor_remetente_id),
            setor_existe(&self.setor_repo, dados.setor_destinatario_id),
            usuario_existe(&self.usuario_repo, requerente),
            usuario_existe(&self.usuario_repo, dados.responsavel_setor_id),
        );

        let erros = faltas_de_referencia(
            remetente_ok?,
            destinatario_ok?,
            requerente_ok?,
            responsavel_ok?,
        );

        if erros.is_empty() {
            Ok(())
        } else {
            Err(AppError::ReferenciaInvalida(erros))
        }
    }

    /// Cria uma solicitação. O requerente é sempre o chamador autenticado;
    /// qualquer requerente_id vindo do cliente é descartado.
    pub async fn criar(
        &self,
        mut corpo: Map<String, Value>,
        usuario: &UsuarioAtual,
    ) -> Result<i32, AppError> {
        autorizacao::decidir(Operacao::Criar, usuario, None).exigir()?;

        corpo.insert("requerente_id".to_string(), Value::from(usuario.id));

        let erros = validacao::normalizar_e_validar(&mut corpo, None);
        if !erros.is_empty() {
            return Err(AppError::Validacao(erros));
        }

        let dados = DadosSolicitacao::do_corpo(&corpo)?;
        self.verificar_referencias(&dados, true).await?;

        let id = self.solicitacao_repo.inserir(&dados).await?;
        tracing::info!("Solicitação {} criada pelo usuário {}.", id, usuario.id);
        Ok(id)
    }

    pub async fn listar(
        &self,
        usuario: &UsuarioAtual,
        filtro_setor: Option<i32>,
    ) -> Result<Vec<SolicitacaoDetalhe>, AppError> {
        match autorizacao::escopo_listagem(usuario, filtro_setor)? {
            autorizacao::EscopoListagem::Todas => self.solicitacao_repo.listar_todas().await,
            autorizacao::EscopoListagem::PorSetor(setor) => {
                self.solicitacao_repo.listar_por_setor(setor).await
            }
        }
    }

    pub async fn buscar(
        &self,
        id: i32,
        usuario: &UsuarioAtual,
    ) -> Result<SolicitacaoDetalhe, AppError> {
        let detalhe = self
            .solicitacao_repo
            .buscar_por_id(id)
            .await?
            .ok_or(AppError::NaoEncontrado("Solicitação não encontrada"))?;

        autorizacao::decidir(Operacao::Ver, usuario, Some(&detalhe.solicitacao)).exigir()?;
        Ok(detalhe)
    }

    /// Atualização parcial: valida e escreve apenas os campos enviados pelo
    /// cliente. requerente_id, id e criado_em são imutáveis e descartados.
    pub async fn atualizar(
        &self,
        id: i32,
        mut corpo: Map<String, Value>,
        usuario: &UsuarioAtual,
    ) -> Result<(), AppError> {
        let existente = self
            .solicitacao_repo
            .buscar_por_id(id)
            .await?
            .ok_or(AppError::NaoEncontrado("Solicitação não encontrada para atualização"))?;

        autorizacao::decidir(Operacao::Atualizar, usuario, Some(&existente.solicitacao))
            .exigir()?;

        for campo in CAMPOS_IMUTAVEIS {
            corpo.remove(campo);
        }

        // Os campos a validar/escrever são os que o cliente realmente enviou,
        // capturados antes da normalização preencher os defaults.
        let campos: Vec<String> = corpo.keys().cloned().collect();

        let erros = validacao::normalizar_e_validar(&mut corpo, Some(&campos));
        if !erros.is_empty() {
            return Err(AppError::Validacao(erros));
        }

        let dados = DadosSolicitacao::do_corpo(&corpo)?;
        self.verificar_referencias(&dados, false).await?;

        self.solicitacao_repo.atualizar(id, &dados, &campos).await?;
        tracing::info!("Solicitação {} atualizada pelo usuário {}.", id, usuario.id);
        Ok(())
    }

    pub async fn excluir(&self, id: i32, usuario: &UsuarioAtual) -> Result<(), AppError> {
        let existente = self
            .solicitacao_repo
            .buscar_por_id(id)
            .await?
            .ok_or(AppError::NaoEncontrado("Solicitação não encontrada para exclusão"))?;

        autorizacao::decidir(Operacao::Excluir, usuario, Some(&existente.solicitacao)).exigir()?;

        self.solicitacao_repo.excluir(id).await?;
        tracing::info!("Solicitação {} excluída pelo administrador {}.", id, usuario.id);
        Ok(())
    }

    /// Anexa o PDF assinado: valida o arquivo antes de qualquer mutação, grava
    /// em disco e aplica a transição atômica para 'assinado'.
    pub async fn anexar_assinado(
        &self,
        id: i32,
        usuario: &UsuarioAtual,
        content_type: Option<&str>,
        arquivo: &[u8],
    ) -> Result<Solicitacao, AppError> {
        let existente = self
            .solicitacao_repo
            .buscar_por_id(id)
            .await?
            .ok_or(AppError::NaoEncontrado("Solicitação não encontrada"))?;

        autorizacao::decidir(Operacao::AnexarAssinado, usuario, Some(&existente.solicitacao))
            .exigir()?;

        upload::validar_arquivo(content_type, arquivo.len())?;

        let caminho = upload::salvar_arquivo_assinado(id, arquivo).await?;
        let atualizada = self
            .solicitacao_repo
            .anexar_assinado(id, &caminho, Utc::now())
            .await?;

        tracing::info!(
            "Documento assinado anexado à solicitação {} por {} ({}).",
            id,
            usuario.id,
            caminho
        );
        Ok(atualizada)
    }
}

// A metade persistida da garantia (referência faltante => nada inserido) vale
// pelo contrato do fluxo: `inserir` só roda depois de `verificar_referencias`
// devolver Ok, e uma corrida que sobreviva ao pré-check é remapeada pela
// violação de FK no repositório, nunca commitada.
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setor_remetente_inexistente_gera_a_mensagem_do_campo() {
        let erros = faltas_de_referencia(false, true, true, true);
        assert_eq!(erros, vec!["Setor remetente não encontrado.".to_string()]);
    }

    #[test]
    fn todas_as_referencias_faltando_agrega_as_quatro_mensagens() {
        let erros = faltas_de_referencia(false, false, false, false);
        assert_eq!(
            erros,
            vec![
                "Setor remetente não encontrado.".to_string(),
                "Setor destinatário não encontrado.".to_string(),
                "Requerente (usuário) não encontrado.".to_string(),
                "Responsável pelo setor (usuário) não encontrado.".to_string(),
            ]
        );
    }

    #[test]
    fn todas_as_referencias_existentes_nao_gera_erro() {
        assert!(faltas_de_referencia(true, true, true, true).is_empty());
    }

    #[test]
    fn qualquer_referencia_faltante_impede_o_veredito_limpo() {
        for i in 0..4 {
            let mut oks = [true; 4];
            oks[i] = false;
            let erros = faltas_de_referencia(oks[0], oks[1], oks[2], oks[3]);
            assert_eq!(erros.len(), 1, "posição {} deveria gerar uma falta", i);
        }
    }
}
