//! Reshaping of upstream payloads into the shapes clients consume.
//!
//! Every function here is pure and total: an unexpected shape yields empty
//! fields, never an error.

use serde_json::{json, Map, Value};

use crate::upstream::payload::{is_truthy, objects};
use crate::upstream::PayloadExt;

/// Deputy search results, from `{"dados": [...]}` or a bare list.
pub fn deputados_list(raw: &Value) -> Vec<Value> {
    let list = match raw {
        Value::Object(_) => raw.cloned_or_null("dados"),
        Value::Array(_) => raw.clone(),
        _ => return Vec::new(),
    };

    objects(&list)
        .map(|d| {
            let d = Value::Object(d.clone());
            json!({
                "nome": d.cloned_or_null("nome"),
                "email": d.first_truthy(&["email"]),
                "id": d.cloned_or_null("id"),
                "siglaPartido": d.cloned_or_null("siglaPartido"),
                "siglaUf": d.cloned_or_null("siglaUf"),
                "urlFoto": d.cloned_or_null("urlFoto"),
            })
        })
        .collect()
}

/// Deputy profile, from the Câmara `dados` object.
pub fn deputado_details(dados: &Value) -> Value {
    let status = dados.field("ultimoStatus").cloned().unwrap_or(Value::Null);
    let gabinete = status.field("gabinete").cloned().unwrap_or(Value::Null);

    let email = match status.first_truthy(&["email"]) {
        Value::String(s) if s.is_empty() => gabinete.first_truthy(&["email"]),
        other => other,
    };

    let redes: Vec<Value> = dados
        .items("redeSocial")
        .iter()
        .filter(|v| is_truthy(v))
        .cloned()
        .collect();

    json!({
        "id": dados.cloned_or_null("id"),
        "nomeCivil": dados.first_truthy(&["nomeCivil"]),
        "nome": status.first_truthy(&["nome", "nomeEleitoral"]),
        "partido": status.first_truthy(&["siglaPartido"]),
        "uf": status.first_truthy(&["siglaUf"]),
        "email": email,
        "urlFoto": status.first_truthy(&["urlFoto"]),
        "situacao": status.first_truthy(&["situacao"]),
        "condicaoEleitoral": status.first_truthy(&["condicaoEleitoral"]),
        "sexo": dados.first_truthy(&["sexo"]),
        "dataNascimento": dados.first_truthy(&["dataNascimento"]),
        "municipioNascimento": dados.first_truthy(&["municipioNascimento"]),
        "ufNascimento": dados.first_truthy(&["ufNascimento"]),
        "escolaridade": dados.first_truthy(&["escolaridade"]),
        "gabinete": {
            "nome": gabinete.first_truthy(&["nome"]),
            "predio": gabinete.first_truthy(&["predio"]),
            "sala": gabinete.first_truthy(&["sala"]),
            "andar": gabinete.first_truthy(&["andar"]),
            "telefone": gabinete.first_truthy(&["telefone"]),
            "email": gabinete.first_truthy(&["email"]),
        },
        "redeSocial": redes,
    })
}

/// BrasilAPI company record, flattened. `digits` is the queried CNPJ.
pub fn cnpj(dados: &Value, digits: &str) -> Value {
    let empty = Value::Object(Map::new());
    let dados = if dados.is_object() { dados } else { &empty };

    let principal_code = dados.cloned_or_null("cnae_fiscal");
    let principal_text = dados.text_of(&["cnae_fiscal_descricao"]);
    let mut atividade_principal = Vec::new();
    if is_truthy(&principal_code) || !principal_text.is_empty() {
        atividade_principal.push(json!({
            "code": scalar_text(&principal_code),
            "text": principal_text,
        }));
    }

    let atividades_secundarias: Vec<Value> = objects(&dados.cloned_or_null("cnaes_secundarios"))
        .map(|item| {
            let item = Value::Object(item.clone());
            json!({
                "code": item.text_of(&["codigo"]),
                "text": item.text_of(&["descricao"]),
            })
        })
        .collect();

    let qsa: Vec<Value> = objects(&dados.cloned_or_null("qsa"))
        .map(|socio| {
            let socio = Value::Object(socio.clone());
            json!({
                "qual": socio.first_truthy(&["qualificacao_socio", "qualificacao"]),
                "nome": socio.first_truthy(&["nome_socio", "nome"]),
            })
        })
        .collect();

    json!({
        "cnpj": digits,
        "nome": dados.first_truthy(&["razao_social", "nome"]),
        "fantasia": dados.first_truthy(&["nome_fantasia", "fantasia"]),
        "natureza_juridica": dados.first_truthy(&["natureza_juridica"]),
        "porte": dados.first_truthy(&["descricao_porte", "porte"]),
        "abertura": dados.first_truthy(&["data_inicio_atividade", "abertura"]),
        "atividade_principal": atividade_principal,
        "atividades_secundarias": atividades_secundarias,
        "logradouro": dados.first_truthy(&["logradouro"]),
        "numero": dados.first_truthy(&["numero"]),
        "complemento": dados.first_truthy(&["complemento"]),
        "bairro": dados.first_truthy(&["bairro"]),
        "municipio": dados.first_truthy(&["municipio"]),
        "uf": dados.first_truthy(&["uf"]),
        "cep": dados.first_truthy(&["cep"]),
        "situacao": dados.first_truthy(&["descricao_situacao_cadastral", "situacao"]),
        "data_situacao": dados.first_truthy(&["data_situacao_cadastral", "data_situacao"]),
        "capital_social": dados.first_truthy(&["capital_social"]),
        "motivo_situacao": dados.first_truthy(&["descricao_motivo_situacao_cadastral", "motivo_situacao"]),
        "situacao_especial": dados.first_truthy(&["situacao_especial"]),
        "data_situacao_especial": dados.first_truthy(&["data_situacao_especial"]),
        "qsa": qsa,
    })
}

/// Records whose `vinculo` mentions "servidor", in any case.
pub fn servidores(pessoas: &Value) -> Vec<Value> {
    objects(pessoas)
        .filter(|p| {
            p.get("vinculo")
                .and_then(Value::as_str)
                .is_some_and(|v| v.to_lowercase().contains("servidor"))
        })
        .map(|p| Value::Object(p.clone()))
        .collect()
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
