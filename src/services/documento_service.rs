// src/services/documento_service.rs
//
// Renderização dos relatórios em PDF: o recibo individual de uma solicitação
// e a planilha geral. Gera tudo em memória com genpdf; a fonte precisa estar
// disponível na pasta ./fonts.

use genpdf::{elements, style, Element};

use crate::{
    autorizacao::{self, Operacao},
    common::error::AppError,
    db::SolicitacaoRepository,
    models::auth::UsuarioAtual,
};

const PASTA_FONTES: &str = "./fonts";
const FAMILIA_FONTE: &str = "Roboto";

fn novo_documento(titulo: &str) -> Result<genpdf::Document, AppError> {
    let familia = genpdf::fonts::from_files(PASTA_FONTES, FAMILIA_FONTE, None)
        .map_err(|_| AppError::FonteNaoEncontrada(format!("Fonte não encontrada na pasta {}", PASTA_FONTES)))?;

    let mut doc = genpdf::Document::new(familia);
    doc.set_title(titulo);
    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(10);
    doc.set_page_decorator(decorator);
    Ok(doc)
}

fn renderizar(doc: genpdf::Document) -> Result<Vec<u8>, AppError> {
    let mut buffer = Vec::new();
    doc.render(&mut buffer)
        .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;
    Ok(buffer)
}

fn linha_campo(doc: &mut genpdf::Document, rotulo: &str, valor: &str) {
    doc.push(elements::Paragraph::new(format!("{}: {}", rotulo, valor)));
}

#[derive(Clone)]
pub struct DocumentoService {
    solicitacao_repo: SolicitacaoRepository,
}

impl DocumentoService {
    pub fn new(solicitacao_repo: SolicitacaoRepository) -> Self {
        Self { solicitacao_repo }
    }

    /// Recibo em PDF de uma solicitação. Administradores geram de qualquer uma;
    /// demais usuários apenas das próprias.
    pub async fn gerar_recibo(
        &self,
        id: i32,
        usuario: &UsuarioAtual,
    ) -> Result<Vec<u8>, AppError> {
        let detalhe = self
            .solicitacao_repo
            .buscar_por_id(id)
            .await?
            .ok_or(AppError::NaoEncontrado("Solicitação não encontrada"))?;

        autorizacao::decidir(Operacao::GerarRecibo, usuario, Some(&detalhe.solicitacao))
            .exigir()?;

        let mut doc = novo_documento(&format!("Recibo Solicitação #{}", id))?;

        doc.push(
            elements::Paragraph::new("RECIBO DE SOLICITAÇÃO DE TRANSFERÊNCIA")
                .styled(style::Style::new().bold().with_font_size(16)),
        );
        doc.push(elements::Break::new(1.5));

        let s = &detalhe.solicitacao;
        linha_campo(&mut doc, "Solicitação", &format!("#{}", s.id));
        linha_campo(&mut doc, "Documento", &s.nome_documento);
        if let Some(descricao) = &s.descricao {
            linha_campo(&mut doc, "Descrição", descricao);
        }
        linha_campo(&mut doc, "Quantidade", &s.quantidade.to_string());
        linha_campo(&mut doc, "Setor remetente", &detalhe.setor_remetente_nome);
        linha_campo(&mut doc, "Setor destinatário", &detalhe.setor_destinatario_nome);
        linha_campo(&mut doc, "Requerente", &detalhe.requerente_nome);
        linha_campo(&mut doc, "Responsável do setor", &detalhe.responsavel_setor_nome);
        linha_campo(&mut doc, "Data da transferência", &s.data_transferencia.format("%d/%m/%Y").to_string());
        linha_campo(&mut doc, "Status", s.status.as_str());
        if let Some(recebido) = s.data_recebimento {
            linha_campo(&mut doc, "Recebido em", &recebido.format("%d/%m/%Y %H:%M").to_string());
        }
        if let Some(observacoes) = &s.observacoes {
            doc.push(elements::Break::new(1));
            linha_campo(&mut doc, "Observações", observacoes);
        }

        doc.push(elements::Break::new(2));
        doc.push(
            elements::Paragraph::new(format!("Emitido em {}", s.criado_em.format("%d/%m/%Y")))
                .styled(style::Style::new().italic().with_font_size(8)),
        );

        renderizar(doc)
    }

    /// Planilha geral: tabela com todas as solicitações. Apenas administradores.
    pub async fn gerar_planilha_geral(
        &self,
        usuario: &UsuarioAtual,
    ) -> Result<Vec<u8>, AppError> {
        autorizacao::decidir(Operacao::GerarPlanilhaGeral, usuario, None).exigir()?;

        let solicitacoes = self.solicitacao_repo.listar_todas().await?;

        let mut doc = novo_documento("Planilha Geral de Solicitações")?;

        doc.push(
            elements::Paragraph::new("PLANILHA GERAL DE SOLICITAÇÕES")
                .styled(style::Style::new().bold().with_font_size(16)),
        );
        doc.push(elements::Break::new(1.5));

        // Pesos das colunas: Documento (4), Remetente (3), Destinatário (3), Data (2), Status (2)
        let mut tabela = elements::TableLayout::new(vec![4, 3, 3, 2, 2]);
        tabela.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

        let negrito = style::Style::new().bold();
        tabela
            .row()
            .element(elements::Paragraph::new("Documento").styled(negrito))
            .element(elements::Paragraph::new("Remetente").styled(negrito))
            .element(elements::Paragraph::new("Destinatário").styled(negrito))
            .element(elements::Paragraph::new("Data").styled(negrito))
            .element(elements::Paragraph::new("Status").styled(negrito))
            .push()
            .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;

        for detalhe in &solicitacoes {
            let s = &detalhe.solicitacao;
            tabela
                .row()
                .element(elements::Paragraph::new(s.nome_documento.clone()))
                .element(elements::Paragraph::new(detalhe.setor_remetente_nome.clone()))
                .element(elements::Paragraph::new(detalhe.setor_destinatario_nome.clone()))
                .element(elements::Paragraph::new(s.data_transferencia.format("%d/%m/%Y").to_string()))
                .element(elements::Paragraph::new(s.status.as_str()))
                .push()
                .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;
        }

        doc.push(tabela);
        doc.push(elements::Break::new(2));
        doc.push(
            elements::Paragraph::new(format!("Total de solicitações: {}", solicitacoes.len()))
                .styled(style::Style::new().bold()),
        );

        renderizar(doc)
    }
}
