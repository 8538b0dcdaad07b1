//! # Configuração
//!
//! Lida de `data/config.json` quando o arquivo existe; caso contrário
//! todos os campos assumem o default. Duas variáveis de ambiente
//! sobrescrevem o arquivo:
//!
//! | Variável | Campo |
//! |----------|-------|
//! | `CF_BIND_ADDR` | `bind_addr` |
//! | `CF_RULES_PATH` | `rules_path` |
//!
//! ```json
//! {
//!   "bind_addr": "0.0.0.0:3000",
//!   "engine": { "screening_threshold": 0.05, "input_policy": "clamp" }
//! }
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::InputPolicy;
use crate::inference::screening::DEFAULT_SCREENING_THRESHOLD;

/// Caminho padrão do arquivo de configuração.
pub const CONFIG_PATH: &str = "data/config.json";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("screening_threshold precisa ser finito, recebido {0}")]
    NonFiniteThreshold(f64),

    #[error("image_prefix não pode ser vazio")]
    EmptyImagePrefix,

    #[error("consultation_ttl_minutes precisa ser maior que zero")]
    ZeroTtl,

    #[error("consultation_ttl_minutes fora da faixa suportada: {0}")]
    TtlOutOfRange(i64),
}

/// Parâmetros do motor de inferência.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// CF mínimo (inclusivo) para uma regra virar candidata na triagem.
    pub screening_threshold: f64,
    pub input_policy: InputPolicy,
    /// Prefixo das entradas derivadas da imagem (`pred_smut`, ...).
    pub image_prefix: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            screening_threshold: DEFAULT_SCREENING_THRESHOLD,
            input_policy: InputPolicy::default(),
            image_prefix: "pred_".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.screening_threshold.is_finite() {
            return Err(ConfigError::NonFiniteThreshold(self.screening_threshold));
        }
        if self.image_prefix.is_empty() {
            return Err(ConfigError::EmptyImagePrefix);
        }
        Ok(())
    }
}

/// Configuração da aplicação.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub rules_path: PathBuf,
    /// Diretório do log de diagnósticos (`diagnoses.jsonl`).
    pub log_dir: PathBuf,
    /// Consultas mais antigas que isto são descartadas.
    pub consultation_ttl_minutes: i64,
    pub engine: EngineConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            rules_path: PathBuf::from("data/rules.json"),
            log_dir: PathBuf::from("data/logs"),
            consultation_ttl_minutes: 60,
            engine: EngineConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.consultation_ttl()?;
        self.engine.validate()
    }

    /// TTL das consultas como `Duration`.
    pub fn consultation_ttl(&self) -> Result<Duration, ConfigError> {
        if self.consultation_ttl_minutes <= 0 {
            return Err(ConfigError::ZeroTtl);
        }
        Duration::try_minutes(self.consultation_ttl_minutes)
            .ok_or(ConfigError::TtlOutOfRange(self.consultation_ttl_minutes))
    }

    /// Aplica `CF_BIND_ADDR` / `CF_RULES_PATH` quando definidas.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(addr) = std::env::var("CF_BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Ok(path) = std::env::var("CF_RULES_PATH") {
            self.rules_path = PathBuf::from(path);
        }
    }
}

/// Carrega a configuração de `path`, ou os defaults se o arquivo não existir.
///
/// # Erros
///
/// Retorna erro se o arquivo existir mas não for JSON válido, ou se
/// algum valor for rejeitado por [`AppConfig::validate`].
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let mut config = if path.exists() {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Falha ao ler {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Falha ao desserializar {}", path.display()))?
    } else {
        tracing::info!("Nenhum {} encontrado, usando configuração padrão", path.display());
        AppConfig::default()
    };
    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}
