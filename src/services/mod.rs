pub mod auth;
pub mod documento_service;
pub mod solicitacao_service;
