// src/handlers/documentos.rs

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
};

fn resposta_pdf(nome_arquivo: String, pdf_bytes: Vec<u8>) -> Response {
    // Configura os headers para o navegador baixar o PDF
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", nome_arquivo),
        ),
    ];
    (headers, pdf_bytes).into_response()
}

// GET /api/solicitacoes/{id}/relatorio-pdf
#[utoipa::path(
    get,
    path = "/api/solicitacoes/{id}/relatorio-pdf",
    tag = "Relatórios",
    params(("id" = i32, Path, description = "ID da solicitação")),
    responses(
        (status = 200, description = "Recibo em PDF", content_type = "application/pdf"),
        (status = 403, description = "Sem permissão para gerar este recibo"),
        (status = 404, description = "Solicitação não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn gerar_recibo(
    State(app_state): State<AppState>,
    AuthenticatedUser(usuario): AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let pdf_bytes = app_state.documento_service.gerar_recibo(id, &usuario).await?;
    Ok(resposta_pdf(format!("recibo_solicitacao_{}.pdf", id), pdf_bytes))
}

// GET /api/solicitacoes/relatorio-geral-pdf
#[utoipa::path(
    get,
    path = "/api/solicitacoes/relatorio-geral-pdf",
    tag = "Relatórios",
    responses(
        (status = 200, description = "Planilha geral em PDF", content_type = "application/pdf"),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn gerar_planilha_geral(
    State(app_state): State<AppState>,
    AuthenticatedUser(usuario): AuthenticatedUser,
) -> Result<Response, AppError> {
    let pdf_bytes = app_state.documento_service.gerar_planilha_geral(&usuario).await?;
    Ok(resposta_pdf("planilha_geral_solicitacoes.pdf".to_string(), pdf_bytes))
}
