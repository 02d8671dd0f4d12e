// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Solicitações ---
        handlers::solicitacoes::criar,
        handlers::solicitacoes::listar,
        handlers::solicitacoes::buscar,
        handlers::solicitacoes::atualizar,
        handlers::solicitacoes::excluir,
        handlers::solicitacoes::anexar_relatorio,

        // --- Dados de referência ---
        handlers::dados::listar_setores,
        handlers::dados::listar_usuarios,

        // --- Relatórios ---
        handlers::documentos::gerar_recibo,
        handlers::documentos::gerar_planilha_geral,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Usuario,
            models::auth::UsuarioResumo,
            models::auth::UsuarioComRoles,
            models::auth::RegisterPayload,
            models::auth::LoginPayload,
            models::auth::AuthResponse,
            models::auth::RegistroResponse,

            // --- Solicitações ---
            models::solicitacao::StatusSolicitacao,
            models::solicitacao::Solicitacao,
            models::solicitacao::SolicitacaoDetalhe,
            models::solicitacao::Setor,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Solicitações", description = "Solicitações de transferência de documentos"),
        (name = "Dados", description = "Dados de referência (setores e usuários)"),
        (name = "Relatórios", description = "Recibos e planilha geral em PDF")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
