use std::env;
use std::path::{Path, PathBuf};

/// Caminhos usados pela aplicação: o arquivo do banco e o diretório de
/// comprovantes. Construído uma vez na inicialização e passado
/// explicitamente para quem precisa, nada de estado global.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub comprovantes_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        let db_path = env::var("GEST_DB").unwrap_or_else(|_| "clientes.db".to_string());
        let comprovantes_dir =
            env::var("GEST_COMPROVANTES").unwrap_or_else(|_| "comprovantes".to_string());

        Config {
            db_path: PathBuf::from(db_path),
            comprovantes_dir: PathBuf::from(comprovantes_dir),
        }
    }

    pub fn new(db_path: impl Into<PathBuf>, comprovantes_dir: impl Into<PathBuf>) -> Self {
        Config {
            db_path: db_path.into(),
            comprovantes_dir: comprovantes_dir.into(),
        }
    }

    /// Caminho completo de um comprovante dentro do diretório configurado.
    pub fn caminho_comprovante(&self, nome: &str) -> PathBuf {
        self.comprovantes_dir.join(nome)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}
