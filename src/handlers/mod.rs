pub mod auth;
pub mod dados;
pub mod documentos;
pub mod solicitacoes;
