use std::fs::File;
use std::path::Path;

use anyhow::{bail, Context};
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Deserialize;
use tracing::{debug, info};

use crate::clientes::cliente::save_cliente_to_db;
use crate::clientes::cliente_model::{ClienteDto, StatusCliente};
use crate::utils::status::FORMATO_ISO;
use crate::utils::validators::{validar_cpf_cnpj, validar_email};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ResumoImportacao {
    pub importados: usize,
    pub falhas: usize,
}

// Colunas nomeadas do cabeçalho, todas opcionais menos o nome
#[derive(Debug, Deserialize)]
struct LinhaCsv {
    #[serde(default)]
    nome: String,
    #[serde(default)]
    telefone: String,
    #[serde(default)]
    cpf_cnpj: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    periodo_assinatura: Option<i64>,
    #[serde(default)]
    ultimo_pagamento: String,
    #[serde(default)]
    vencimento: String,
    #[serde(default)]
    data_aviso: String,
    #[serde(default)]
    avisado: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    estado: String,
    #[serde(default)]
    cidade: String,
    #[serde(default)]
    observacao: String,
    #[serde(default)]
    comprovante: String,
}

/// Importa clientes de um CSV com cabeçalho. Cada linha é validada e
/// salva individualmente: linha ruim conta como falha e a importação
/// segue para a próxima. Só a falha em abrir o arquivo aborta tudo.
pub fn importar_csv(conn: &Connection, caminho: &Path) -> anyhow::Result<ResumoImportacao> {
    let arquivo = File::open(caminho)
        .with_context(|| format!("Erro ao abrir arquivo de importação: {}", caminho.display()))?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(arquivo);

    let mut resumo = ResumoImportacao::default();
    for linha in reader.deserialize::<LinhaCsv>() {
        let dto = match linha.map_err(anyhow::Error::from).and_then(converter_linha) {
            Ok(dto) => dto,
            Err(e) => {
                debug!("Linha ignorada na importação: {:#}", e);
                resumo.falhas += 1;
                continue;
            }
        };

        match save_cliente_to_db(conn, &dto) {
            Ok(_) => resumo.importados += 1,
            Err(e) => {
                debug!("Falha ao salvar linha importada: {:?}", e);
                resumo.falhas += 1;
            }
        }
    }

    info!(
        "Importação concluída: {} importados, {} falhas",
        resumo.importados, resumo.falhas
    );
    Ok(resumo)
}

fn converter_linha(linha: LinhaCsv) -> anyhow::Result<ClienteDto> {
    if linha.nome.trim().is_empty() {
        bail!("nome é obrigatório");
    }
    if !linha.cpf_cnpj.is_empty() && !validar_cpf_cnpj(&linha.cpf_cnpj) {
        bail!("CPF/CNPJ inválido: {}", linha.cpf_cnpj);
    }
    if !linha.email.is_empty() && !validar_email(&linha.email) {
        bail!("e-mail inválido: {}", linha.email);
    }

    let ultimo_pagamento = parse_data(&linha.ultimo_pagamento)
        .with_context(|| format!("último pagamento inválido: {}", linha.ultimo_pagamento))?;
    let vencimento = parse_data(&linha.vencimento)
        .with_context(|| format!("vencimento inválido: {}", linha.vencimento))?;

    let data_aviso = if linha.data_aviso.is_empty() {
        None
    } else {
        Some(
            parse_data(&linha.data_aviso)
                .with_context(|| format!("data de aviso inválida: {}", linha.data_aviso))?,
        )
    };

    let avisado = match linha.avisado.trim() {
        "" | "0" => false,
        "1" => true,
        outro => bail!("valor de avisado inválido: {}", outro),
    };

    // "Ativo" é o rótulo legado das planilhas antigas, vira "Em dia"
    let status = StatusCliente::from_rotulo(&linha.status)
        .with_context(|| format!("status desconhecido: {}", linha.status))?;

    let comprovante = if linha.comprovante.is_empty() {
        None
    } else {
        Some(linha.comprovante)
    };

    Ok(ClienteDto {
        nome: linha.nome,
        telefone: linha.telefone,
        cpf_cnpj: linha.cpf_cnpj,
        email: linha.email,
        periodo_assinatura: linha.periodo_assinatura.unwrap_or(1),
        ultimo_pagamento,
        vencimento,
        data_aviso,
        avisado,
        status,
        estado: linha.estado,
        cidade: linha.cidade,
        observacao: linha.observacao,
        comprovante,
    })
}

fn parse_data(texto: &str) -> anyhow::Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(texto, FORMATO_ISO)?)
}
