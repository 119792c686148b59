use chrono::NaiveDate;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use tracing::{error, info, warn};

use crate::clientes::cliente_model::{Cliente, ClienteDto, CriterioPesquisa, StatusCliente};
use crate::db::{DbError, Result};
use crate::utils::status::{calcular_status, FORMATO_BR};

// Ordem fixa das colunas em todo SELECT deste módulo; cliente_from_row
// depende dela.
const COLUNAS_CLIENTE: &str = "id, nome, telefone, cpf_cnpj, email, periodo_assinatura, \
     ultimo_pagamento, vencimento, data_aviso, avisado, status, estado, cidade, \
     observacao, comprovante";

fn cliente_from_row(row: &Row<'_>) -> rusqlite::Result<Cliente> {
    Ok(Cliente {
        id: row.get(0)?,
        nome: row.get(1)?,
        telefone: row.get(2)?,
        cpf_cnpj: row.get(3)?,
        email: row.get(4)?,
        periodo_assinatura: row.get(5)?,
        ultimo_pagamento: row.get(6)?,
        vencimento: row.get(7)?,
        data_aviso: row.get(8)?,
        avisado: row.get(9)?,
        status: row.get(10)?,
        estado: row.get(11)?,
        cidade: row.get(12)?,
        observacao: row.get(13)?,
        comprovante: row.get(14)?,
    })
}

/// Insere um cliente novo e devolve o id atribuído pelo banco.
pub fn save_cliente_to_db(conn: &Connection, cliente: &ClienteDto) -> Result<i64> {
    if cliente.nome.trim().is_empty() {
        return Err(DbError::NomeObrigatorio);
    }

    conn.execute(
        "INSERT INTO clientes (nome, telefone, cpf_cnpj, email, periodo_assinatura, \
         ultimo_pagamento, vencimento, data_aviso, avisado, status, estado, cidade, \
         observacao, comprovante) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            cliente.nome,
            cliente.telefone,
            cliente.cpf_cnpj,
            cliente.email,
            cliente.periodo_assinatura,
            cliente.ultimo_pagamento,
            cliente.vencimento,
            cliente.data_aviso,
            cliente.avisado,
            cliente.status,
            cliente.estado,
            cliente.cidade,
            cliente.observacao,
            cliente.comprovante,
        ],
    )?;

    Ok(conn.last_insert_rowid())
}

/// Todos os clientes na ordem física da tabela.
pub fn find_all_clientes(conn: &Connection) -> Result<Vec<Cliente>> {
    let mut stmt = conn.prepare(&format!("SELECT {COLUNAS_CLIENTE} FROM clientes"))?;
    let clientes = stmt
        .query_map([], cliente_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(clientes)
}

/// `None` tanto quando o id não existe quanto quando a consulta falha.
/// Falhas vão para o log e são engolidas de propósito; é o contrato deste
/// caminho de leitura.
pub fn find_cliente_by_id(conn: &Connection, id: i64) -> Option<Cliente> {
    let resultado = conn
        .query_row(
            &format!("SELECT {COLUNAS_CLIENTE} FROM clientes WHERE id = ?1"),
            params![id],
            cliente_from_row,
        )
        .optional();

    match resultado {
        Ok(cliente) => cliente,
        Err(e) => {
            error!("Falha ao buscar cliente {} por id: {:?}", id, e);
            None
        }
    }
}

/// Sobrescreve a linha inteira (os 14 campos) pelo id, dentro de uma
/// transação: ou aplica tudo, ou nada.
pub fn update_cliente_in_db(conn: &mut Connection, cliente: &Cliente) -> Result<()> {
    if cliente.nome.trim().is_empty() {
        return Err(DbError::NomeObrigatorio);
    }

    let tx = conn.transaction()?;
    tx.execute(
        "UPDATE clientes SET \
            nome = ?1, \
            telefone = ?2, \
            cpf_cnpj = ?3, \
            email = ?4, \
            periodo_assinatura = ?5, \
            ultimo_pagamento = ?6, \
            vencimento = ?7, \
            data_aviso = ?8, \
            avisado = ?9, \
            status = ?10, \
            estado = ?11, \
            cidade = ?12, \
            observacao = ?13, \
            comprovante = ?14 \
         WHERE id = ?15",
        params![
            cliente.nome,
            cliente.telefone,
            cliente.cpf_cnpj,
            cliente.email,
            cliente.periodo_assinatura,
            cliente.ultimo_pagamento,
            cliente.vencimento,
            cliente.data_aviso,
            cliente.avisado,
            cliente.status,
            cliente.estado,
            cliente.cidade,
            cliente.observacao,
            cliente.comprovante,
            cliente.id,
        ],
    )?;
    tx.commit()?;

    Ok(())
}

/// Sobrescreve só a coluna de status. Quem chama é responsável por ter
/// calculado o valor a partir do vencimento.
pub fn update_status_cliente(conn: &Connection, id: i64, status: StatusCliente) -> Result<()> {
    conn.execute(
        "UPDATE clientes SET status = ?1 WHERE id = ?2",
        params![status, id],
    )?;
    Ok(())
}

/// Sobrescreve as duas colunas de aviso; serve tanto para registrar quanto
/// para limpar (ambos nulos/falso juntos).
pub fn update_aviso_cliente(
    conn: &Connection,
    id: i64,
    data_aviso: Option<NaiveDate>,
    avisado: bool,
) -> Result<()> {
    conn.execute(
        "UPDATE clientes SET data_aviso = ?1, avisado = ?2 WHERE id = ?3",
        params![data_aviso, avisado, id],
    )?;
    Ok(())
}

pub fn registrar_aviso(conn: &Connection, id: i64, data: NaiveDate) -> Result<()> {
    update_aviso_cliente(conn, id, Some(data), true)
}

pub fn limpar_aviso(conn: &Connection, id: i64) -> Result<()> {
    update_aviso_cliente(conn, id, None, false)
}

/// Remove a linha. O arquivo de comprovante referenciado, se houver, fica
/// para trás no disco.
pub fn remove_cliente_from_db(conn: &Connection, id: i64) -> Result<()> {
    conn.execute("DELETE FROM clientes WHERE id = ?1", params![id])?;
    Ok(())
}

/// Pesquisa pelo critério fixo. Nome, telefone, CPF/CNPJ e e-mail fazem
/// busca parcial sobre o primeiro valor; vencimento espera DD/MM/AAAA e
/// compara exato com a forma armazenada; status e estado aceitam vários
/// valores (IN). Lista vazia de valores, data que não parseia ou falha na
/// consulta viram resultado vazio, registrado no log, nunca erro.
pub fn pesquisar_clientes(
    conn: &Connection,
    criterio: CriterioPesquisa,
    valores: &[String],
) -> Vec<Cliente> {
    if valores.is_empty() {
        return Vec::new();
    }

    match executar_pesquisa(conn, criterio, valores) {
        Ok(clientes) => clientes,
        Err(e) => {
            error!("Erro na pesquisa por {:?}: {:?}", criterio, e);
            Vec::new()
        }
    }
}

fn executar_pesquisa(
    conn: &Connection,
    criterio: CriterioPesquisa,
    valores: &[String],
) -> anyhow::Result<Vec<Cliente>> {
    let coluna = criterio.coluna();

    let clientes = match criterio {
        CriterioPesquisa::Nome
        | CriterioPesquisa::Telefone
        | CriterioPesquisa::CpfCnpj
        | CriterioPesquisa::Email => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUNAS_CLIENTE} FROM clientes WHERE {coluna} LIKE ?1"
            ))?;
            let padrao = format!("%{}%", valores[0]);
            let resultado = stmt
                .query_map(params![padrao], cliente_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            resultado
        }

        CriterioPesquisa::Vencimento => {
            // Entrada em DD/MM/AAAA, armazenado em ISO
            let data = NaiveDate::parse_from_str(&valores[0], FORMATO_BR)?;
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUNAS_CLIENTE} FROM clientes WHERE {coluna} = ?1"
            ))?;
            let resultado = stmt
                .query_map(params![data], cliente_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            resultado
        }

        CriterioPesquisa::Status | CriterioPesquisa::Estado => {
            let placeholders = vec!["?"; valores.len()].join(",");
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUNAS_CLIENTE} FROM clientes WHERE {coluna} IN ({placeholders})"
            ))?;
            let resultado = stmt
                .query_map(params_from_iter(valores.iter()), cliente_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            resultado
        }
    };

    Ok(clientes)
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ResumoRecalculo {
    pub atualizados: usize,
    pub datas_invalidas: usize,
}

/// Recalcula o status de todos os clientes a partir do vencimento
/// armazenado. Cada linha é gravada individualmente, sem transação
/// englobando o passo todo; uma falha no meio deixa as linhas anteriores
/// já atualizadas. Vencimento que não parseia é pulado e contado.
pub fn recalcular_status_global(conn: &Connection, hoje: NaiveDate) -> Result<ResumoRecalculo> {
    let mut stmt = conn.prepare("SELECT id, vencimento FROM clientes")?;
    let linhas = stmt
        .query_map([], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, Option<String>>(1)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut resumo = ResumoRecalculo::default();
    for (id, vencimento) in linhas {
        match vencimento.as_deref().and_then(|v| calcular_status(v, hoje)) {
            Some(status) => {
                update_status_cliente(conn, id, status)?;
                resumo.atualizados += 1;
            }
            None => {
                warn!("Cliente {} com vencimento inválido: {:?}", id, vencimento);
                resumo.datas_invalidas += 1;
            }
        }
    }

    info!(
        "Recálculo de status: {} atualizados, {} com data inválida",
        resumo.atualizados, resumo.datas_invalidas
    );
    Ok(resumo)
}
