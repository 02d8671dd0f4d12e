pub mod setor_repo;
pub mod solicitacao_repo;
pub mod usuario_repo;

pub use setor_repo::SetorRepository;
pub use solicitacao_repo::SolicitacaoRepository;
pub use usuario_repo::UsuarioRepository;
