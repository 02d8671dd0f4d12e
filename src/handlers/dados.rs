// src/handlers/dados.rs
//
// Listagens de dados de referência: setores (aberto, o cadastro depende dele)
// e usuários (restrito a administradores e funcionários).

use axum::{extract::State, Json};

use crate::{
    autorizacao::{ROLE_ADMINISTRADOR, ROLE_FUNCIONARIO},
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{auth::UsuarioResumo, solicitacao::Setor},
};

// GET /api/setores
#[utoipa::path(
    get,
    path = "/api/setores",
    tag = "Dados",
    responses(
        (status = 200, description = "Lista de setores", body = [Setor])
    )
)]
pub async fn listar_setores(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<Setor>>, AppError> {
    let setores = app_state.setor_repo.listar().await?;
    Ok(Json(setores))
}

// GET /api/usuarios
#[utoipa::path(
    get,
    path = "/api/usuarios",
    tag = "Dados",
    responses(
        (status = 200, description = "Lista de usuários", body = [UsuarioResumo]),
        (status = 403, description = "Papel insuficiente")
    ),
    security(("api_jwt" = []))
)]
pub async fn listar_usuarios(
    State(app_state): State<AppState>,
    AuthenticatedUser(usuario): AuthenticatedUser,
) -> Result<Json<Vec<UsuarioResumo>>, AppError> {
    if !usuario.tem_role(ROLE_ADMINISTRADOR) && !usuario.tem_role(ROLE_FUNCIONARIO) {
        return Err(AppError::AcessoNegado("Permissão insuficiente para esta ação."));
    }

    let usuarios = app_state.usuario_repo.listar().await?;
    Ok(Json(usuarios))
}
