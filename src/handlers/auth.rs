use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::auth::{AuthResponse, LoginPayload, RegisterPayload, RegistroResponse},
};

// POST /api/auth/register
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterPayload,
    responses(
        (status = 201, description = "Usuário criado com papel padrão 'funcionario'", body = RegistroResponse),
        (status = 400, description = "Payload inválido"),
        (status = 409, description = "Nome de usuário já em uso")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<(StatusCode, Json<RegistroResponse>), AppError> {
    payload.validate().map_err(AppError::PayloadInvalido)?;

    let usuario = app_state
        .auth_service
        .registrar(&payload.usuario, &payload.password, &payload.nome, payload.setor_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegistroResponse {
            mensagem: "Usuário criado com sucesso!".to_string(),
            usuario,
        }),
    ))
}

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Token emitido (validade de 1 hora)", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate().map_err(AppError::PayloadInvalido)?;

    let token = app_state
        .auth_service
        .login(&payload.usuario, &payload.password)
        .await?;

    Ok(Json(AuthResponse {
        mensagem: "Login bem-sucedido!".to_string(),
        token,
    }))
}
