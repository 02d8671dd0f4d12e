// src/autorizacao.rs
//
// Política de autorização como função pura de (papéis, identidade, operação,
// registro alvo). Nenhuma dependência do framework HTTP: a matriz inteira é
// testável isoladamente. O handler já deve ter confirmado a existência do
// registro (404 antes de 403).

use crate::common::error::AppError;
use crate::models::auth::UsuarioAtual;
use crate::models::solicitacao::Solicitacao;

pub const ROLE_ADMINISTRADOR: &str = "administrador";
pub const ROLE_FUNCIONARIO: &str = "funcionario";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operacao {
    Criar,
    Listar,
    Ver,
    Atualizar,
    Excluir,
    AnexarAssinado,
    GerarRecibo,
    GerarPlanilhaGeral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decisao {
    Permitido,
    Negado(&'static str),
}

impl Decisao {
    /// Converte a decisão em `Result`, para uso direto com `?` nos serviços.
    pub fn exigir(self) -> Result<(), AppError> {
        match self {
            Decisao::Permitido => Ok(()),
            Decisao::Negado(motivo) => Err(AppError::AcessoNegado(motivo)),
        }
    }
}

/// Escopo efetivo da listagem para o chamador.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscopoListagem {
    Todas,
    PorSetor(i32),
}

fn e_admin(usuario: &UsuarioAtual) -> bool {
    usuario.tem_role(ROLE_ADMINISTRADOR)
}

fn e_funcionario(usuario: &UsuarioAtual) -> bool {
    usuario.tem_role(ROLE_FUNCIONARIO)
}

fn setor_do_registro(usuario: &UsuarioAtual, registro: &Solicitacao) -> bool {
    usuario.setor_id == Some(registro.setor_remetente_id)
        || usuario.setor_id == Some(registro.setor_destinatario_id)
}

/// Decide se `usuario` pode executar `operacao` sobre `registro`.
///
/// `registro` é exigido nas operações dirigidas a um registro específico
/// (Ver, Atualizar, Excluir, AnexarAssinado); para as demais é ignorado.
pub fn decidir(
    operacao: Operacao,
    usuario: &UsuarioAtual,
    registro: Option<&Solicitacao>,
) -> Decisao {
    match operacao {
        Operacao::Criar | Operacao::Atualizar => {
            if e_admin(usuario) || e_funcionario(usuario) {
                Decisao::Permitido
            } else {
                Decisao::Negado("Permissão insuficiente para esta ação.")
            }
        }

        Operacao::Listar => {
            if e_admin(usuario) {
                Decisao::Permitido
            } else if e_funcionario(usuario) && usuario.setor_id.is_some() {
                Decisao::Permitido
            } else {
                Decisao::Negado("Permissão insuficiente para listar solicitações.")
            }
        }

        Operacao::Ver => {
            let Some(registro) = registro else {
                return Decisao::Negado("Registro não informado.");
            };
            if e_admin(usuario)
                || registro.requerente_id == usuario.id
                || setor_do_registro(usuario, registro)
            {
                Decisao::Permitido
            } else {
                Decisao::Negado("Você não tem permissão para ver esta solicitação.")
            }
        }

        Operacao::Excluir => {
            if e_admin(usuario) {
                Decisao::Permitido
            } else {
                Decisao::Negado("Apenas administradores podem excluir solicitações.")
            }
        }

        Operacao::AnexarAssinado => {
            let Some(registro) = registro else {
                return Decisao::Negado("Registro não informado.");
            };
            if e_admin(usuario)
                || usuario.setor_id == Some(registro.setor_destinatario_id)
                || registro.responsavel_setor_id == usuario.id
            {
                Decisao::Permitido
            } else {
                Decisao::Negado("Você não tem permissão para anexar o documento assinado.")
            }
        }

        Operacao::GerarRecibo => {
            let Some(registro) = registro else {
                return Decisao::Negado("Registro não informado.");
            };
            if e_admin(usuario) || registro.requerente_id == usuario.id {
                Decisao::Permitido
            } else {
                Decisao::Negado("Você não tem permissão para gerar este relatório.")
            }
        }

        Operacao::GerarPlanilhaGeral => {
            if e_admin(usuario) {
                Decisao::Permitido
            } else {
                Decisao::Negado("Apenas administradores podem gerar a planilha geral.")
            }
        }
    }
}

/// Resolve o escopo da listagem: administradores veem tudo (com filtro opcional
/// por setor); funcionários ficam restritos ao próprio setor.
pub fn escopo_listagem(
    usuario: &UsuarioAtual,
    filtro_setor: Option<i32>,
) -> Result<EscopoListagem, AppError> {
    if e_admin(usuario) {
        return Ok(match filtro_setor {
            Some(setor) => EscopoListagem::PorSetor(setor),
            None => EscopoListagem::Todas,
        });
    }

    if e_funcionario(usuario) {
        if let Some(setor) = usuario.setor_id {
            return Ok(EscopoListagem::PorSetor(setor));
        }
        return Err(AppError::AcessoNegado("Usuário sem setor atribuído."));
    }

    Err(AppError::AcessoNegado("Permissão insuficiente para listar solicitações."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use crate::models::solicitacao::StatusSolicitacao;

    fn usuario(id: i32, setor: Option<i32>, roles: &[&str]) -> UsuarioAtual {
        UsuarioAtual {
            id,
            usuario: format!("user{}", id),
            nome: format!("Usuário {}", id),
            setor_id: setor,
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    fn registro(requerente: i32, remetente: i32, destinatario: i32, responsavel: i32) -> Solicitacao {
        Solicitacao {
            id: 1,
            nome_documento: "Prontuário 104".into(),
            descricao: None,
            quantidade: 1,
            setor_remetente_id: remetente,
            setor_destinatario_id: destinatario,
            requerente_id: requerente,
            responsavel_setor_id: responsavel,
            data_transferencia: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            observacoes: None,
            status: StatusSolicitacao::Pendente,
            data_recebimento: None,
            caminho_arquivo_assinado: None,
            criado_em: Utc::now(),
        }
    }

    #[test]
    fn funcionario_ve_registro_do_proprio_setor() {
        let u = usuario(10, Some(5), &[ROLE_FUNCIONARIO]);
        let r = registro(99, 5, 9, 20);
        assert_eq!(decidir(Operacao::Ver, &u, Some(&r)), Decisao::Permitido);
    }

    #[test]
    fn funcionario_nao_ve_registro_de_outro_setor() {
        let u = usuario(10, Some(5), &[ROLE_FUNCIONARIO]);
        let r = registro(99, 3, 9, 20);
        assert!(matches!(decidir(Operacao::Ver, &u, Some(&r)), Decisao::Negado(_)));
    }

    #[test]
    fn requerente_ve_a_propria_solicitacao_mesmo_de_outro_setor() {
        let u = usuario(10, Some(5), &[ROLE_FUNCIONARIO]);
        let r = registro(10, 3, 9, 20);
        assert_eq!(decidir(Operacao::Ver, &u, Some(&r)), Decisao::Permitido);
    }

    #[test]
    fn admin_ve_qualquer_registro() {
        let u = usuario(1, None, &[ROLE_ADMINISTRADOR]);
        let r = registro(99, 3, 9, 20);
        assert_eq!(decidir(Operacao::Ver, &u, Some(&r)), Decisao::Permitido);
    }

    #[test]
    fn criar_exige_admin_ou_funcionario() {
        let func = usuario(2, Some(1), &[ROLE_FUNCIONARIO]);
        let admin = usuario(3, None, &[ROLE_ADMINISTRADOR]);
        let sem_papel = usuario(4, Some(1), &[]);

        assert_eq!(decidir(Operacao::Criar, &func, None), Decisao::Permitido);
        assert_eq!(decidir(Operacao::Criar, &admin, None), Decisao::Permitido);
        assert!(matches!(decidir(Operacao::Criar, &sem_papel, None), Decisao::Negado(_)));
    }

    #[test]
    fn excluir_e_exclusivo_de_admin() {
        let func = usuario(2, Some(1), &[ROLE_FUNCIONARIO]);
        let admin = usuario(3, None, &[ROLE_ADMINISTRADOR]);
        let r = registro(2, 1, 2, 5);

        assert!(matches!(decidir(Operacao::Excluir, &func, Some(&r)), Decisao::Negado(_)));
        assert_eq!(decidir(Operacao::Excluir, &admin, Some(&r)), Decisao::Permitido);
    }

    #[test]
    fn anexar_permite_admin_setor_destinatario_e_responsavel() {
        let r = registro(50, 3, 9, 77);

        let admin = usuario(1, None, &[ROLE_ADMINISTRADOR]);
        assert_eq!(decidir(Operacao::AnexarAssinado, &admin, Some(&r)), Decisao::Permitido);

        let do_destino = usuario(2, Some(9), &[ROLE_FUNCIONARIO]);
        assert_eq!(decidir(Operacao::AnexarAssinado, &do_destino, Some(&r)), Decisao::Permitido);

        let responsavel = usuario(77, Some(4), &[ROLE_FUNCIONARIO]);
        assert_eq!(decidir(Operacao::AnexarAssinado, &responsavel, Some(&r)), Decisao::Permitido);

        let alheio = usuario(3, Some(2), &[ROLE_FUNCIONARIO]);
        assert!(matches!(decidir(Operacao::AnexarAssinado, &alheio, Some(&r)), Decisao::Negado(_)));
    }

    #[test]
    fn escopo_de_listagem_por_papel() {
        let admin = usuario(1, None, &[ROLE_ADMINISTRADOR]);
        assert_eq!(escopo_listagem(&admin, None).unwrap(), EscopoListagem::Todas);
        assert_eq!(escopo_listagem(&admin, Some(4)).unwrap(), EscopoListagem::PorSetor(4));

        let func = usuario(2, Some(5), &[ROLE_FUNCIONARIO]);
        assert_eq!(escopo_listagem(&func, None).unwrap(), EscopoListagem::PorSetor(5));
        // o filtro explícito não deixa o funcionário sair do próprio setor
        assert_eq!(escopo_listagem(&func, Some(9)).unwrap(), EscopoListagem::PorSetor(5));

        let sem_papel = usuario(3, Some(1), &[]);
        assert!(escopo_listagem(&sem_papel, None).is_err());

        let func_sem_setor = usuario(4, None, &[ROLE_FUNCIONARIO]);
        assert!(escopo_listagem(&func_sem_setor, None).is_err());
    }

    #[test]
    fn recibo_e_para_admin_ou_requerente_e_planilha_so_para_admin() {
        let r = registro(10, 1, 2, 5);

        let requerente = usuario(10, Some(1), &[ROLE_FUNCIONARIO]);
        assert_eq!(decidir(Operacao::GerarRecibo, &requerente, Some(&r)), Decisao::Permitido);

        let outro = usuario(11, Some(1), &[ROLE_FUNCIONARIO]);
        assert!(matches!(decidir(Operacao::GerarRecibo, &outro, Some(&r)), Decisao::Negado(_)));
        assert!(matches!(decidir(Operacao::GerarPlanilhaGeral, &outro, None), Decisao::Negado(_)));

        let admin = usuario(1, None, &[ROLE_ADMINISTRADOR]);
        assert_eq!(decidir(Operacao::GerarRecibo, &admin, Some(&r)), Decisao::Permitido);
        assert_eq!(decidir(Operacao::GerarPlanilhaGeral, &admin, None), Decisao::Permitido);
    }

    #[test]
    fn atualizar_segue_a_mesma_regra_de_criar() {
        let func = usuario(2, Some(1), &[ROLE_FUNCIONARIO]);
        let sem_papel = usuario(4, Some(1), &[]);
        let r = registro(99, 1, 2, 5);

        assert_eq!(decidir(Operacao::Atualizar, &func, Some(&r)), Decisao::Permitido);
        assert!(matches!(decidir(Operacao::Atualizar, &sem_papel, Some(&r)), Decisao::Negado(_)));
    }
}
