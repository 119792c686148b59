use std::path::Path;

use anyhow::{anyhow, Context};
use chrono::NaiveDate;
use rusqlite::Connection;
use tracing::info;

use crate::clientes::cliente::{find_cliente_by_id, update_cliente_in_db};
use crate::clientes::cliente_model::Cliente;
use crate::config::Config;
use crate::utils::comprovantes::{anexar_comprovante, remover_comprovante};
use crate::utils::status::{calcular_status_em, calcular_vencimento};

/// Renova a assinatura de um cliente: novo período e novo pagamento,
/// vencimento e status derivados deles, comprovante trocado se veio um
/// novo. Grava tudo como uma sobrescrita de linha inteira e devolve o
/// cadastro atualizado.
pub fn renovar_assinatura(
    conn: &mut Connection,
    config: &Config,
    id: i64,
    novo_periodo: i64,
    novo_pagamento: NaiveDate,
    hoje: NaiveDate,
    comprovante: Option<&Path>,
) -> anyhow::Result<Cliente> {
    let mut cliente =
        find_cliente_by_id(conn, id).ok_or_else(|| anyhow!("Cliente {} não encontrado", id))?;

    if let Some(origem) = comprovante {
        // O comprovante antigo é substituído, não acumulado
        if let Some(antigo) = cliente.comprovante.take() {
            remover_comprovante(config, &antigo);
        }
        let nome_arquivo = anexar_comprovante(config, &id.to_string(), origem)
            .context("Erro ao anexar comprovante da renovação")?;
        cliente.comprovante = Some(nome_arquivo);
    }

    let novo_vencimento = calcular_vencimento(novo_pagamento, novo_periodo);
    cliente.periodo_assinatura = novo_periodo;
    cliente.ultimo_pagamento = novo_pagamento;
    cliente.vencimento = novo_vencimento;
    cliente.status = calcular_status_em(novo_vencimento, hoje);

    update_cliente_in_db(conn, &cliente).context("Erro ao salvar renovação")?;
    info!(
        "Assinatura do cliente {} renovada até {}",
        id, novo_vencimento
    );

    Ok(cliente)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clientes::cliente::save_cliente_to_db;
    use crate::clientes::cliente_model::{ClienteDto, StatusCliente};
    use crate::db::criar_tabela;
    use std::fs::File;
    use std::io::Write;

    fn dia(ano: i32, mes: u32, dia: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(ano, mes, dia).unwrap()
    }

    fn dto_vencido() -> ClienteDto {
        ClienteDto {
            nome: "Maria Souza".to_string(),
            telefone: "31988887777".to_string(),
            cpf_cnpj: "529.982.247-25".to_string(),
            email: "maria@provedor.com.br".to_string(),
            periodo_assinatura: 1,
            ultimo_pagamento: dia(2023, 12, 1),
            vencimento: dia(2023, 12, 31),
            data_aviso: None,
            avisado: false,
            status: StatusCliente::Inadimplente,
            estado: "MG".to_string(),
            cidade: "Belo Horizonte".to_string(),
            observacao: String::new(),
            comprovante: None,
        }
    }

    #[test]
    fn renovar_deriva_vencimento_e_status_novos() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::new(tmp.path().join("clientes.db"), tmp.path().join("comprovantes"));
        let mut conn = Connection::open_in_memory().unwrap();
        criar_tabela(&conn).unwrap();

        let id = save_cliente_to_db(&conn, &dto_vencido()).unwrap();

        let hoje = dia(2024, 2, 1);
        let renovado =
            renovar_assinatura(&mut conn, &config, id, 2, dia(2024, 2, 1), hoje, None).unwrap();

        assert_eq!(renovado.periodo_assinatura, 2);
        assert_eq!(renovado.ultimo_pagamento, dia(2024, 2, 1));
        assert_eq!(renovado.vencimento, dia(2024, 4, 1)); // 60 dias depois
        assert_eq!(renovado.status, StatusCliente::EmDia);

        // E de fato persistiu
        let relido = find_cliente_by_id(&conn, id).unwrap();
        assert_eq!(relido, renovado);
    }

    #[test]
    fn renovar_troca_o_comprovante_e_remove_o_antigo() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::new(tmp.path().join("clientes.db"), tmp.path().join("comprovantes"));
        let mut conn = Connection::open_in_memory().unwrap();
        criar_tabela(&conn).unwrap();

        let id = save_cliente_to_db(&conn, &dto_vencido()).unwrap();

        let recibo1 = tmp.path().join("recibo1.png");
        File::create(&recibo1).unwrap().write_all(b"um").unwrap();
        let hoje = dia(2024, 2, 1);
        let primeiro =
            renovar_assinatura(&mut conn, &config, id, 1, dia(2024, 2, 1), hoje, Some(&recibo1))
                .unwrap();
        let nome_antigo = primeiro.comprovante.clone().unwrap();
        assert!(config.caminho_comprovante(&nome_antigo).exists());

        let recibo2 = tmp.path().join("recibo2.png");
        File::create(&recibo2).unwrap().write_all(b"dois").unwrap();
        let segundo =
            renovar_assinatura(&mut conn, &config, id, 1, dia(2024, 3, 1), hoje, Some(&recibo2))
                .unwrap();
        let nome_novo = segundo.comprovante.clone().unwrap();

        assert_ne!(nome_antigo, nome_novo);
        assert!(!config.caminho_comprovante(&nome_antigo).exists());
        assert!(config.caminho_comprovante(&nome_novo).exists());
    }

    #[test]
    fn renovar_cliente_inexistente_e_erro() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::new(tmp.path().join("clientes.db"), tmp.path().join("comprovantes"));
        let mut conn = Connection::open_in_memory().unwrap();
        criar_tabela(&conn).unwrap();

        let hoje = dia(2024, 2, 1);
        assert!(
            renovar_assinatura(&mut conn, &config, 99, 1, dia(2024, 2, 1), hoje, None).is_err()
        );
    }
}
