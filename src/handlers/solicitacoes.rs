use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use utoipa::IntoParams;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::solicitacao::SolicitacaoDetalhe,
};

// POST /api/solicitacoes
//
// O corpo chega como JSON cru e passa pela engine de normalização + validação;
// o requerente é sempre o usuário autenticado.
#[utoipa::path(
    post,
    path = "/api/solicitacoes",
    tag = "Solicitações",
    responses(
        (status = 201, description = "Solicitação criada; retorna o id gerado"),
        (status = 400, description = "Lista de erros de validação ou de referências"),
        (status = 403, description = "Papel insuficiente")
    ),
    security(("api_jwt" = []))
)]
pub async fn criar(
    State(app_state): State<AppState>,
    AuthenticatedUser(usuario): AuthenticatedUser,
    Json(corpo): Json<Map<String, Value>>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let id = app_state.solicitacao_service.criar(corpo, &usuario).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "mensagem": "Solicitação criada com sucesso", "id": id })),
    ))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListarParams {
    /// Filtro por setor; só tem efeito para administradores.
    #[serde(rename = "setorId")]
    pub setor_id: Option<i32>,
}

// GET /api/solicitacoes
#[utoipa::path(
    get,
    path = "/api/solicitacoes",
    tag = "Solicitações",
    params(ListarParams),
    responses(
        (status = 200, description = "Listagem no escopo do chamador", body = [SolicitacaoDetalhe]),
        (status = 403, description = "Papel insuficiente")
    ),
    security(("api_jwt" = []))
)]
pub async fn listar(
    State(app_state): State<AppState>,
    AuthenticatedUser(usuario): AuthenticatedUser,
    Query(params): Query<ListarParams>,
) -> Result<Json<Vec<SolicitacaoDetalhe>>, AppError> {
    let dados = app_state
        .solicitacao_service
        .listar(&usuario, params.setor_id)
        .await?;
    Ok(Json(dados))
}

// GET /api/solicitacoes/{id}
#[utoipa::path(
    get,
    path = "/api/solicitacoes/{id}",
    tag = "Solicitações",
    params(("id" = i32, Path, description = "ID da solicitação")),
    responses(
        (status = 200, body = SolicitacaoDetalhe),
        (status = 403, description = "Sem permissão para ver este registro"),
        (status = 404, description = "Solicitação não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn buscar(
    State(app_state): State<AppState>,
    AuthenticatedUser(usuario): AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<SolicitacaoDetalhe>, AppError> {
    let detalhe = app_state.solicitacao_service.buscar(id, &usuario).await?;
    Ok(Json(detalhe))
}

// PUT /api/solicitacoes/{id}
#[utoipa::path(
    put,
    path = "/api/solicitacoes/{id}",
    tag = "Solicitações",
    params(("id" = i32, Path, description = "ID da solicitação")),
    responses(
        (status = 200, description = "Atualização parcial aplicada"),
        (status = 400, description = "Lista de erros de validação ou de referências"),
        (status = 403, description = "Papel insuficiente"),
        (status = 404, description = "Solicitação não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn atualizar(
    State(app_state): State<AppState>,
    AuthenticatedUser(usuario): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(corpo): Json<Map<String, Value>>,
) -> Result<Json<Value>, AppError> {
    app_state
        .solicitacao_service
        .atualizar(id, corpo, &usuario)
        .await?;
    Ok(Json(json!({ "mensagem": "Solicitação atualizada com sucesso" })))
}

// DELETE /api/solicitacoes/{id}
#[utoipa::path(
    delete,
    path = "/api/solicitacoes/{id}",
    tag = "Solicitações",
    params(("id" = i32, Path, description = "ID da solicitação")),
    responses(
        (status = 200, description = "Solicitação excluída"),
        (status = 403, description = "Apenas administradores excluem"),
        (status = 404, description = "Solicitação não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn excluir(
    State(app_state): State<AppState>,
    AuthenticatedUser(usuario): AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    app_state.solicitacao_service.excluir(id, &usuario).await?;
    Ok(Json(json!({ "mensagem": "Solicitação excluída com sucesso" })))
}

// PUT /api/solicitacoes/{id}/anexar-relatorio
//
// Upload multipart (campo 'file', apenas PDF, até 5MB). A transição para
// 'assinado' com carimbo de recebimento acontece num único UPDATE.
#[utoipa::path(
    put,
    path = "/api/solicitacoes/{id}/anexar-relatorio",
    tag = "Solicitações",
    params(("id" = i32, Path, description = "ID da solicitação")),
    responses(
        (status = 200, description = "Arquivo anexado; status força 'assinado'"),
        (status = 400, description = "Arquivo ausente, não-PDF ou acima de 5MB"),
        (status = 403, description = "Sem permissão para anexar neste registro"),
        (status = 404, description = "Solicitação não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn anexar_relatorio(
    State(app_state): State<AppState>,
    AuthenticatedUser(usuario): AuthenticatedUser,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let mut arquivo: Option<(Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| anyhow::anyhow!("Falha ao ler multipart: {}", e))?
    {
        if field.name() == Some("file") {
            let content_type = field.content_type().map(str::to_owned);
            let dados = field
                .bytes()
                .await
                .map_err(|e| anyhow::anyhow!("Falha ao ler o arquivo enviado: {}", e))?;
            arquivo = Some((content_type, dados.to_vec()));
            break;
        }
    }

    let (content_type, dados) = arquivo.ok_or_else(|| {
        AppError::Validacao(vec!["Nenhum arquivo enviado (campo 'file' esperado).".to_string()])
    })?;

    let atualizada = app_state
        .solicitacao_service
        .anexar_assinado(id, &usuario, content_type.as_deref(), &dados)
        .await?;

    Ok(Json(json!({
        "mensagem": "Relatório assinado anexado com sucesso",
        "solicitacao": atualizada
    })))
}
