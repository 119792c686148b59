use chrono::{Duration, NaiveDate};

use crate::clientes::cliente_model::StatusCliente;

pub const FORMATO_ISO: &str = "%Y-%m-%d";
pub const FORMATO_BR: &str = "%d/%m/%Y";

/// Quantos dias antes do vencimento o cliente passa a contar como
/// "Expirando". O limite é inclusivo: faltando exatamente 5 dias ainda é
/// Expirando, 6 é Em dia.
pub const DIAS_AVISO: i64 = 5;

/// Regra dos três estados a partir de datas já resolvidas.
pub fn calcular_status_em(vencimento: NaiveDate, hoje: NaiveDate) -> StatusCliente {
    let dias_restantes = (vencimento - hoje).num_days();

    if dias_restantes < 0 {
        StatusCliente::Inadimplente
    } else if dias_restantes <= DIAS_AVISO {
        StatusCliente::Expirando
    } else {
        StatusCliente::EmDia
    }
}

/// Versão tolerante para datas vindas do banco ou de planilhas: tenta
/// AAAA-MM-DD e depois DD/MM/AAAA. `None` é o desfecho explícito de data
/// inválida, não é um dos três status e quem chama decide o que fazer.
pub fn calcular_status(vencimento: &str, hoje: NaiveDate) -> Option<StatusCliente> {
    let data = NaiveDate::parse_from_str(vencimento, FORMATO_ISO)
        .or_else(|_| NaiveDate::parse_from_str(vencimento, FORMATO_BR))
        .ok()?;
    Some(calcular_status_em(data, hoje))
}

/// Vencimento derivado: último pagamento + período × 30 dias. A conta usa
/// 30 dias fixos por período, não meses de calendário.
pub fn calcular_vencimento(ultimo_pagamento: NaiveDate, periodo_assinatura: i64) -> NaiveDate {
    ultimo_pagamento + Duration::days(periodo_assinatura * 30)
}
