use std::fmt;

use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::ToSql;
use serde::{Deserialize, Serialize};

/// Cadastro completo de um cliente, como sai do banco.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cliente {
    pub id: i64,
    pub nome: String,
    pub telefone: String,
    pub cpf_cnpj: String,
    pub email: String,
    pub periodo_assinatura: i64,
    pub ultimo_pagamento: NaiveDate,
    pub vencimento: NaiveDate,
    pub data_aviso: Option<NaiveDate>,
    pub avisado: bool,
    pub status: StatusCliente,
    pub estado: String,
    pub cidade: String,
    pub observacao: String,
    pub comprovante: Option<String>,
}

/// Os mesmos campos sem o id, para cadastro e importação.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClienteDto {
    pub nome: String,
    pub telefone: String,
    pub cpf_cnpj: String,
    pub email: String,
    pub periodo_assinatura: i64,
    pub ultimo_pagamento: NaiveDate,
    pub vencimento: NaiveDate,
    pub data_aviso: Option<NaiveDate>,
    pub avisado: bool,
    pub status: StatusCliente,
    pub estado: String,
    pub cidade: String,
    pub observacao: String,
    pub comprovante: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusCliente {
    #[serde(rename = "Em dia")]
    EmDia,
    #[serde(rename = "Expirando")]
    Expirando,
    #[serde(rename = "Inadimplente")]
    Inadimplente,
}

impl StatusCliente {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusCliente::EmDia => "Em dia",
            StatusCliente::Expirando => "Expirando",
            StatusCliente::Inadimplente => "Inadimplente",
        }
    }

    /// Aceita os três rótulos canônicos e o rótulo legado "Ativo", que
    /// planilhas antigas usavam no lugar de "Em dia".
    pub fn from_rotulo(rotulo: &str) -> Option<Self> {
        match rotulo.trim() {
            "Em dia" => Some(StatusCliente::EmDia),
            "Expirando" => Some(StatusCliente::Expirando),
            "Inadimplente" => Some(StatusCliente::Inadimplente),
            "Ativo" => Some(StatusCliente::EmDia),
            _ => None,
        }
    }
}

impl fmt::Display for StatusCliente {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for StatusCliente {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for StatusCliente {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let texto = value.as_str()?;
        StatusCliente::from_rotulo(texto).ok_or(FromSqlError::InvalidType)
    }
}

/// Critérios de pesquisa suportados, cada um amarrado a uma coluna fixa.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CriterioPesquisa {
    Nome,
    Telefone,
    CpfCnpj,
    Email,
    Vencimento,
    Status,
    Estado,
}

impl CriterioPesquisa {
    /// Rótulo desconhecido vira `None`; quem chama trata como resultado
    /// vazio, nunca como erro.
    pub fn parse(rotulo: &str) -> Option<Self> {
        let rotulo = rotulo.trim();
        if rotulo.eq_ignore_ascii_case("Nome") {
            Some(CriterioPesquisa::Nome)
        } else if rotulo.eq_ignore_ascii_case("Telefone") {
            Some(CriterioPesquisa::Telefone)
        } else if rotulo.eq_ignore_ascii_case("CPF/CNPJ") {
            Some(CriterioPesquisa::CpfCnpj)
        } else if rotulo.eq_ignore_ascii_case("E-mail") {
            Some(CriterioPesquisa::Email)
        } else if rotulo.eq_ignore_ascii_case("Vencimento") {
            Some(CriterioPesquisa::Vencimento)
        } else if rotulo.eq_ignore_ascii_case("Status") {
            Some(CriterioPesquisa::Status)
        } else if rotulo.eq_ignore_ascii_case("Estado") {
            Some(CriterioPesquisa::Estado)
        } else {
            None
        }
    }

    pub fn coluna(&self) -> &'static str {
        match self {
            CriterioPesquisa::Nome => "nome",
            CriterioPesquisa::Telefone => "telefone",
            CriterioPesquisa::CpfCnpj => "cpf_cnpj",
            CriterioPesquisa::Email => "email",
            CriterioPesquisa::Vencimento => "vencimento",
            CriterioPesquisa::Status => "status",
            CriterioPesquisa::Estado => "estado",
        }
    }
}
