use std::path::Path;

use rusqlite::Connection;
use thiserror::Error;
use tracing::info;

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error")]
    DatabaseError(#[from] rusqlite::Error),
    #[error("Nome é obrigatório")]
    NomeObrigatorio,
}

const CRIAR_TABELA_CLIENTES: &str = "
CREATE TABLE IF NOT EXISTS clientes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    nome TEXT NOT NULL,
    telefone TEXT,
    cpf_cnpj TEXT,
    email TEXT,
    periodo_assinatura INTEGER,
    ultimo_pagamento DATE,
    vencimento DATE,
    data_aviso DATE,
    avisado BOOLEAN,
    status TEXT,
    estado TEXT,
    cidade TEXT,
    observacao TEXT,
    comprovante TEXT
)";

/// Abre a conexão única da aplicação e garante o esquema.
pub fn abrir_conexao(caminho: &Path) -> Result<Connection> {
    let conn = Connection::open(caminho)?;
    criar_tabela(&conn)?;
    Ok(conn)
}

/// Cria a tabela de clientes se não existir e aplica a única migração do
/// esquema: bases antigas não têm a coluna comprovante. Idempotente, é
/// chamada em toda inicialização.
pub fn criar_tabela(conn: &Connection) -> Result<()> {
    conn.execute_batch(CRIAR_TABELA_CLIENTES)?;

    let colunas = colunas_da_tabela(conn)?;
    if !colunas.iter().any(|c| c == "comprovante") {
        conn.execute("ALTER TABLE clientes ADD COLUMN comprovante TEXT", [])?;
        info!("Coluna comprovante adicionada a uma base antiga");
    }

    Ok(())
}

fn colunas_da_tabela(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("PRAGMA table_info(clientes)")?;
    let colunas = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(colunas)
}
