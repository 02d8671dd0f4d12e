// src/validacao.rs
//
// Engine de validação do payload de solicitações. O corpo chega como JSON cru
// (strings e números arbitrários vindos do cliente); a normalização roda sempre
// primeiro e é idempotente, e as regras são uma tabela fixa avaliada por um
// runner genérico: todas as violações são coletadas, nunca há curto-circuito.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};

use crate::models::solicitacao::StatusSolicitacao;

lazy_static! {
    static ref PADRAO_DATA: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
}

/// Classificação de cada regra, enumerável e testável isoladamente.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TipoErro {
    VazioOuTipoErrado,
    QuantidadeInvalida,
    Obrigatorio,
    FormatoInvalido,
    StatusInvalido,
    TipoErrado,
}

/// Uma regra: (campo, tipo, mensagem, predicado-de-violação sobre o corpo normalizado).
pub struct Regra {
    pub campo: &'static str,
    pub tipo: TipoErro,
    pub mensagem: &'static str,
    pub viola: fn(&Map<String, Value>) -> bool,
}

// Falsy no sentido do JSON recebido: ausente, null, false, 0 ou string vazia.
fn falso(corpo: &Map<String, Value>, campo: &str) -> bool {
    match corpo.get(campo) {
        None | Some(Value::Null) => true,
        Some(Value::Bool(b)) => !b,
        Some(Value::Number(n)) => n.as_i64() == Some(0),
        Some(Value::String(s)) => s.is_empty(),
        _ => false,
    }
}

pub const REGRAS: &[Regra] = &[
    Regra {
        campo: "nome_documento",
        tipo: TipoErro::VazioOuTipoErrado,
        mensagem: "Nome do documento é obrigatório.",
        viola: |corpo| match corpo.get("nome_documento") {
            Some(Value::String(s)) => s.is_empty(),
            _ => true,
        },
    },
    Regra {
        campo: "quantidade",
        tipo: TipoErro::QuantidadeInvalida,
        mensagem: "Quantidade é obrigatória e deve ser um número inteiro positivo.",
        viola: |corpo| !matches!(
            corpo.get("quantidade").and_then(Value::as_i64),
            Some(n) if n > 0
        ),
    },
    Regra {
        campo: "setor_remetente_id",
        tipo: TipoErro::Obrigatorio,
        mensagem: "ID do setor remetente é obrigatório.",
        viola: |corpo| falso(corpo, "setor_remetente_id"),
    },
    Regra {
        campo: "setor_destinatario_id",
        tipo: TipoErro::Obrigatorio,
        mensagem: "ID do setor destinatário é obrigatório.",
        viola: |corpo| falso(corpo, "setor_destinatario_id"),
    },
    Regra {
        campo: "requerente_id",
        tipo: TipoErro::Obrigatorio,
        mensagem: "ID do requerente é obrigatório.",
        viola: |corpo| falso(corpo, "requerente_id"),
    },
    Regra {
        campo: "responsavel_setor_id",
        tipo: TipoErro::Obrigatorio,
        mensagem: "ID do responsável do setor é obrigatório.",
        viola: |corpo| falso(corpo, "responsavel_setor_id"),
    },
    Regra {
        campo: "data_transferencia",
        tipo: TipoErro::Obrigatorio,
        mensagem: "Data da transferência é obrigatória.",
        viola: |corpo| falso(corpo, "data_transferencia"),
    },
    Regra {
        campo: "data_transferencia",
        tipo: TipoErro::FormatoInvalido,
        mensagem: "Formato de data da transferência inválido (YYYY-MM-DD esperado).",
        viola: |corpo| match corpo.get("data_transferencia") {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.is_empty() && !data_calendario_valida(s),
            // número, bool, array etc. nunca são uma data válida
            _ => true,
        },
    },
    Regra {
        campo: "status",
        tipo: TipoErro::StatusInvalido,
        mensagem: "Status inválido. Valores permitidos: pendente, recebido, assinado, recusado.",
        viola: |corpo| match corpo.get("status") {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => {
                !s.is_empty() && !StatusSolicitacao::VALORES.contains(&s.as_str())
            }
            _ => true,
        },
    },
    Regra {
        campo: "data_recebimento",
        tipo: TipoErro::FormatoInvalido,
        mensagem: "Formato de data de recebimento inválido.",
        viola: |corpo| match corpo.get("data_recebimento") {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.is_empty() && parse_data_hora(s).is_none(),
            _ => true,
        },
    },
    Regra {
        campo: "caminho_arquivo_assinado",
        tipo: TipoErro::TipoErrado,
        mensagem: "Caminho do arquivo assinado inválido.",
        viola: |corpo| match corpo.get("caminho_arquivo_assinado") {
            None | Some(Value::Null) | Some(Value::String(_)) => false,
            _ => true,
        },
    },
    Regra {
        campo: "observacoes",
        tipo: TipoErro::TipoErrado,
        mensagem: "Observações inválidas.",
        viola: |corpo| match corpo.get("observacoes") {
            None | Some(Value::Null) | Some(Value::String(_)) => false,
            _ => true,
        },
    },
];

/// Normaliza o corpo no lugar. Idempotente: rodar duas vezes produz o mesmo corpo.
///
/// - strings são trimadas;
/// - campos `*_id` vindos como string são coagidos a inteiro; coerção que falha
///   ou valor que não cabe em i32 => null;
/// - `quantidade` vira inteiro (ausente/imparseável => 0);
/// - `descricao`, `observacoes`, `data_recebimento` e `caminho_arquivo_assinado`
///   ausentes/vazios viram null;
/// - `status` ausente/vazio vira "pendente".
pub fn normalizar(corpo: &mut Map<String, Value>) {
    let chaves: Vec<String> = corpo.keys().cloned().collect();
    for chave in chaves {
        if let Some(Value::String(s)) = corpo.get(&chave) {
            let aparado = s.trim().to_string();
            if chave.ends_with("_id") {
                match aparado.parse::<i64>() {
                    Ok(n) => corpo.insert(chave, Value::from(n)),
                    Err(_) => corpo.insert(chave, Value::Null),
                };
            } else {
                corpo.insert(chave, Value::String(aparado));
            }
        }
    }

    // Um id que não é um inteiro representável em i32 (fracionário, fora do
    // alcance, bool, array...) vira null e cai na regra de obrigatório.
    let chaves_id: Vec<String> = corpo
        .keys()
        .filter(|c| c.ends_with("_id"))
        .cloned()
        .collect();
    for chave in chaves_id {
        let cabe = match corpo.get(&chave) {
            None | Some(Value::Null) => true,
            Some(valor) => valor
                .as_i64()
                .and_then(|n| i32::try_from(n).ok())
                .is_some(),
        };
        if !cabe {
            corpo.insert(chave, Value::Null);
        }
    }

    let quantidade = match corpo.get("quantidade") {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    corpo.insert("quantidade".to_string(), Value::from(quantidade.unwrap_or(0)));

    for campo in ["descricao", "observacoes", "data_recebimento", "caminho_arquivo_assinado"] {
        let vazio = falso(corpo, campo);
        if vazio {
            corpo.insert(campo.to_string(), Value::Null);
        }
    }

    if falso(corpo, "status") {
        corpo.insert("status".to_string(), Value::from("pendente"));
    }
}

/// Avalia a tabela de regras sobre um corpo já normalizado.
///
/// `campos = None` valida tudo (criação); `Some(campos)` restringe às regras
/// cujos campos aparecem na lista (atualização parcial). Retorna a lista
/// completa de mensagens; vazia = válido.
pub fn validar(corpo: &Map<String, Value>, campos: Option<&[String]>) -> Vec<String> {
    REGRAS
        .iter()
        .filter(|regra| match campos {
            None => true,
            Some(lista) => lista.iter().any(|c| c == regra.campo),
        })
        .filter(|regra| (regra.viola)(corpo))
        .map(|regra| regra.mensagem.to_string())
        .collect()
}

/// Normaliza e valida num passo só; é o caminho usado pelos serviços.
pub fn normalizar_e_validar(
    corpo: &mut Map<String, Value>,
    campos: Option<&[String]>,
) -> Vec<String> {
    normalizar(corpo);
    validar(corpo, campos)
}

/// Data de calendário real no formato exato YYYY-MM-DD.
pub fn data_calendario_valida(valor: &str) -> bool {
    PADRAO_DATA.is_match(valor) && NaiveDate::parse_from_str(valor, "%Y-%m-%d").is_ok()
}

/// Aceita RFC 3339, "YYYY-MM-DD HH:MM:SS" ou data pura.
pub fn parse_data_hora(valor: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(valor) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(valor, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    if let Ok(data) = NaiveDate::parse_from_str(valor, "%Y-%m-%d") {
        return data.and_hms_opt(0, 0, 0).map(|n| Utc.from_utc_datetime(&n));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn corpo(v: serde_json::Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    fn corpo_criacao_valido() -> Map<String, Value> {
        corpo(json!({
            "nome_documento": "Prontuário 104",
            "quantidade": 2,
            "setor_remetente_id": 1,
            "setor_destinatario_id": 2,
            "requerente_id": 7,
            "responsavel_setor_id": 9,
            "data_transferencia": "2025-03-14"
        }))
    }

    #[test]
    fn corpo_completo_passa_sem_erros() {
        let mut c = corpo_criacao_valido();
        assert!(normalizar_e_validar(&mut c, None).is_empty());
    }

    #[test]
    fn criacao_reporta_uma_mensagem_por_campo_ausente() {
        let mut c = corpo(json!({}));
        let erros = normalizar_e_validar(&mut c, None);

        assert!(erros.contains(&"Nome do documento é obrigatório.".to_string()));
        assert!(erros.contains(&"Quantidade é obrigatória e deve ser um número inteiro positivo.".to_string()));
        assert!(erros.contains(&"ID do setor remetente é obrigatório.".to_string()));
        assert!(erros.contains(&"ID do setor destinatário é obrigatório.".to_string()));
        assert!(erros.contains(&"ID do requerente é obrigatório.".to_string()));
        assert!(erros.contains(&"ID do responsável do setor é obrigatório.".to_string()));
        assert!(erros.contains(&"Data da transferência é obrigatória.".to_string()));
        assert_eq!(erros.len(), 7);
    }

    #[test]
    fn coleta_todas_as_violacoes_sem_curto_circuito() {
        let mut c = corpo(json!({
            "quantidade": -3,
            "data_transferencia": "14/03/2025",
            "status": "arquivado"
        }));
        let erros = normalizar_e_validar(&mut c, None);
        assert!(erros.len() >= 3);
        assert!(erros.contains(&"Formato de data da transferência inválido (YYYY-MM-DD esperado).".to_string()));
        assert!(erros.contains(&"Status inválido. Valores permitidos: pendente, recebido, assinado, recusado.".to_string()));
    }

    #[test]
    fn data_fora_do_padrao_falha_mesmo_com_o_resto_valido() {
        for invalida in ["2025/03/14", "14-03-2025", "2025-3-4", "hoje", "2025-13-40"] {
            let mut c = corpo_criacao_valido();
            c.insert("data_transferencia".into(), json!(invalida));
            let erros = normalizar_e_validar(&mut c, None);
            assert!(
                erros.contains(&"Formato de data da transferência inválido (YYYY-MM-DD esperado).".to_string()),
                "data {:?} deveria falhar",
                invalida
            );
        }
    }

    #[test]
    fn status_fora_do_enum_e_rejeitado() {
        let mut c = corpo_criacao_valido();
        c.insert("status".into(), json!("cancelado"));
        let erros = normalizar_e_validar(&mut c, None);
        assert!(erros.contains(&"Status inválido. Valores permitidos: pendente, recebido, assinado, recusado.".to_string()));
    }

    #[test]
    fn os_quatro_status_validos_passam() {
        for status in StatusSolicitacao::VALORES {
            let mut c = corpo_criacao_valido();
            c.insert("status".into(), json!(status));
            assert!(normalizar_e_validar(&mut c, None).is_empty(), "status {:?}", status);
        }
    }

    #[test]
    fn normalizacao_e_idempotente() {
        let mut c = corpo(json!({
            "nome_documento": "  Ofício 12  ",
            "quantidade": "4",
            "setor_remetente_id": " 3 ",
            "setor_destinatario_id": "abc",
            "data_transferencia": "2025-01-02",
            "descricao": ""
        }));
        normalizar(&mut c);
        let primeira = c.clone();
        normalizar(&mut c);
        assert_eq!(primeira, c);

        assert_eq!(c.get("nome_documento"), Some(&json!("Ofício 12")));
        assert_eq!(c.get("quantidade"), Some(&json!(4)));
        assert_eq!(c.get("setor_remetente_id"), Some(&json!(3)));
        // coerção inválida vira null e aparece depois como "obrigatório"
        assert_eq!(c.get("setor_destinatario_id"), Some(&Value::Null));
        assert_eq!(c.get("descricao"), Some(&Value::Null));
        assert_eq!(c.get("status"), Some(&json!("pendente")));
    }

    #[test]
    fn data_de_transferencia_numerica_e_erro_de_formato() {
        // 20250314 como número nunca é uma data; tem que ser barrado aqui,
        // antes de qualquer checagem de referência ou escrita no banco
        for invalida in [json!(20250314), json!(true), json!(["2025-03-14"])] {
            let mut c = corpo_criacao_valido();
            c.insert("data_transferencia".into(), invalida.clone());
            let erros = normalizar_e_validar(&mut c, None);
            assert!(
                erros.contains(&"Formato de data da transferência inválido (YYYY-MM-DD esperado).".to_string()),
                "data {:?} deveria falhar",
                invalida
            );
        }
    }

    #[test]
    fn id_que_nao_cabe_em_i32_vira_erro_de_obrigatorio() {
        for invalido in [json!(9_999_999_999_i64), json!(1.5), json!(true)] {
            let mut c = corpo_criacao_valido();
            c.insert("setor_remetente_id".into(), invalido.clone());
            let erros = normalizar_e_validar(&mut c, None);
            assert_eq!(
                erros,
                vec!["ID do setor remetente é obrigatório.".to_string()],
                "id {:?} deveria falhar",
                invalido
            );
            // e o corpo normalizado não carrega o valor inválido adiante
            assert_eq!(c.get("setor_remetente_id"), Some(&Value::Null));
        }
    }

    #[test]
    fn id_coagido_para_null_vira_erro_de_obrigatorio() {
        let mut c = corpo_criacao_valido();
        c.insert("setor_remetente_id".into(), json!("xyz"));
        let erros = normalizar_e_validar(&mut c, None);
        assert_eq!(erros, vec!["ID do setor remetente é obrigatório.".to_string()]);
    }

    #[test]
    fn quantidade_negativa_zero_ou_nao_numerica_e_rejeitada() {
        for invalida in [json!(0), json!(-1), json!("muitos"), Value::Null] {
            let mut c = corpo_criacao_valido();
            c.insert("quantidade".into(), invalida.clone());
            let erros = normalizar_e_validar(&mut c, None);
            assert!(
                erros.contains(&"Quantidade é obrigatória e deve ser um número inteiro positivo.".to_string()),
                "quantidade {:?} deveria falhar",
                invalida
            );
        }
    }

    #[test]
    fn atualizacao_parcial_so_valida_os_campos_presentes() {
        // apenas a quantidade está sendo atualizada; os obrigatórios ausentes não reclamam
        let mut c = corpo(json!({ "quantidade": 5 }));
        let campos = vec!["quantidade".to_string()];
        let erros = normalizar_e_validar(&mut c, Some(&campos));
        assert!(erros.is_empty());
    }

    #[test]
    fn atualizacao_parcial_ainda_checa_formato_da_data_presente() {
        let mut c = corpo(json!({ "data_transferencia": "31/12/2025" }));
        let campos = vec!["data_transferencia".to_string()];
        let erros = normalizar_e_validar(&mut c, Some(&campos));
        assert_eq!(
            erros,
            vec!["Formato de data da transferência inválido (YYYY-MM-DD esperado).".to_string()]
        );
    }

    #[test]
    fn data_recebimento_imparseavel_e_rejeitada() {
        let mut c = corpo_criacao_valido();
        c.insert("data_recebimento".into(), json!("sem data"));
        let erros = normalizar_e_validar(&mut c, None);
        assert!(erros.contains(&"Formato de data de recebimento inválido.".to_string()));
    }

    #[test]
    fn data_recebimento_em_formatos_aceitos_passa() {
        for valida in ["2025-03-14T10:30:00Z", "2025-03-14 10:30:00", "2025-03-14"] {
            let mut c = corpo_criacao_valido();
            c.insert("data_recebimento".into(), json!(valida));
            assert!(
                normalizar_e_validar(&mut c, None).is_empty(),
                "data_recebimento {:?} deveria passar",
                valida
            );
        }
    }

    #[test]
    fn observacoes_nao_string_e_rejeitada() {
        let mut c = corpo_criacao_valido();
        c.insert("observacoes".into(), json!(["a", "b"]));
        let erros = normalizar_e_validar(&mut c, None);
        assert!(erros.contains(&"Observações inválidas.".to_string()));
    }

    #[test]
    fn caminho_do_arquivo_nao_string_e_rejeitado() {
        let mut c = corpo_criacao_valido();
        c.insert("caminho_arquivo_assinado".into(), json!(123));
        normalizar(&mut c);
        let erros = validar(&c, None);
        assert!(erros.contains(&"Caminho do arquivo assinado inválido.".to_string()));
    }

    #[test]
    fn tabela_de_regras_cobre_todos_os_tipos_de_erro() {
        use TipoErro::*;
        for tipo in [VazioOuTipoErrado, QuantidadeInvalida, Obrigatorio, FormatoInvalido, StatusInvalido, TipoErrado] {
            assert!(
                REGRAS.iter().any(|r| r.tipo == tipo),
                "nenhuma regra com tipo {:?}",
                tipo
            );
        }
    }
}
