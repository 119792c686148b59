use rusqlite::Connection;

use crate::db::Result;

/// Contagens agregadas que alimentam os relatórios; a renderização em
/// gráfico fica fora daqui.
pub fn contar_por_estado(conn: &Connection) -> Result<Vec<(String, i64)>> {
    contar_por_coluna(conn, "estado")
}

pub fn contar_por_cidade(conn: &Connection) -> Result<Vec<(String, i64)>> {
    contar_por_coluna(conn, "cidade")
}

pub fn contar_por_status(conn: &Connection) -> Result<Vec<(String, i64)>> {
    contar_por_coluna(conn, "status")
}

fn contar_por_coluna(conn: &Connection, coluna: &str) -> Result<Vec<(String, i64)>> {
    let sql = format!(
        "SELECT {coluna}, COUNT(*) FROM clientes \
         WHERE {coluna} IS NOT NULL AND {coluna} != '' \
         GROUP BY {coluna} \
         ORDER BY COUNT(*) DESC, {coluna}"
    );
    let mut stmt = conn.prepare(&sql)?;
    let contagens = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(contagens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clientes::cliente::save_cliente_to_db;
    use crate::clientes::cliente_model::{ClienteDto, StatusCliente};
    use crate::db::criar_tabela;
    use chrono::NaiveDate;

    fn dto(nome: &str, estado: &str, cidade: &str, status: StatusCliente) -> ClienteDto {
        let data = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        ClienteDto {
            nome: nome.to_string(),
            telefone: String::new(),
            cpf_cnpj: String::new(),
            email: String::new(),
            periodo_assinatura: 1,
            ultimo_pagamento: data,
            vencimento: data,
            data_aviso: None,
            avisado: false,
            status,
            estado: estado.to_string(),
            cidade: cidade.to_string(),
            observacao: String::new(),
            comprovante: None,
        }
    }

    #[test]
    fn contagens_agrupam_e_ordenam_por_tamanho() {
        let conn = Connection::open_in_memory().unwrap();
        criar_tabela(&conn).unwrap();

        save_cliente_to_db(&conn, &dto("Ana", "MG", "Belo Horizonte", StatusCliente::EmDia))
            .unwrap();
        save_cliente_to_db(&conn, &dto("Bruno", "MG", "Uberlândia", StatusCliente::EmDia))
            .unwrap();
        save_cliente_to_db(&conn, &dto("Carla", "SP", "Campinas", StatusCliente::Inadimplente))
            .unwrap();
        // Estado vazio fica de fora da contagem
        save_cliente_to_db(&conn, &dto("Davi", "", "", StatusCliente::EmDia)).unwrap();

        assert_eq!(
            contar_por_estado(&conn).unwrap(),
            vec![("MG".to_string(), 2), ("SP".to_string(), 1)]
        );
        assert_eq!(
            contar_por_status(&conn).unwrap(),
            vec![("Em dia".to_string(), 3), ("Inadimplente".to_string(), 1)]
        );
        assert_eq!(contar_por_cidade(&conn).unwrap().len(), 3);
    }
}
