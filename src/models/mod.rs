pub mod auth;
pub mod solicitacao;
