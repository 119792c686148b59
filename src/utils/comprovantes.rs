use std::fs;
use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::config::Config;

/// Copia o arquivo de comprovante para o diretório configurado e devolve o
/// nome gerado. O nome é sha256 da referência (nome ou id do cliente) mais
/// o timestamp, truncado a 16 hexas, preservando a extensão original.
pub fn anexar_comprovante(config: &Config, referencia: &str, origem: &Path) -> anyhow::Result<String> {
    fs::create_dir_all(&config.comprovantes_dir)
        .context("Erro ao criar diretório de comprovantes")?;

    let nome_arquivo = nome_comprovante(referencia, origem);
    let destino = config.comprovantes_dir.join(&nome_arquivo);

    fs::copy(origem, &destino)
        .with_context(|| format!("Erro ao copiar comprovante de {}", origem.display()))?;
    debug!("Comprovante salvo em {}", destino.display());

    Ok(nome_arquivo)
}

fn nome_comprovante(referencia: &str, origem: &Path) -> String {
    let carimbo = Utc::now().timestamp_micros();
    let hash = Sha256::digest(format!("{referencia}{carimbo}").as_bytes());
    let hash = &hex::encode(hash)[..16];

    match origem.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => format!("{hash}.{ext}"),
        None => hash.to_string(),
    }
}

/// Remoção de melhor esforço, usada quando a renovação troca o
/// comprovante. Referência órfã não é erro.
pub fn remover_comprovante(config: &Config, nome: &str) {
    let caminho = config.comprovantes_dir.join(nome);
    if caminho.exists() {
        if let Err(e) = fs::remove_file(&caminho) {
            warn!(
                "Erro ao remover comprovante antigo {}: {:?}",
                caminho.display(),
                e
            );
        }
    }
}
