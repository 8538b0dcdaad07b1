//! # Persistência — Repositório de Regras e Log de Diagnósticos
//!
//! - O [`RuleRepository`] vive em `data/rules.json` (JSON pretty-printed,
//!   editável à mão). Se o arquivo não existir, um repositório vazio é
//!   gravado e devolvido.
//! - Cada diagnóstico concluído gera uma linha JSON em
//!   `data/logs/diagnoses.jsonl`.
//!
//! ## ⚠️ Atomicidade
//!
//! A escrita do repositório **não é atômica**: crash durante escrita pode
//! corromper o arquivo.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::rule::RuleId;
use crate::core::{InputVector, RuleRepository};
use crate::orchestrator::{ConsultationId, Diagnosis};

/// Nome do arquivo de log dentro do diretório configurado.
const DIAGNOSIS_LOG_FILE: &str = "diagnoses.jsonl";

/// Carrega o repositório de `path`, criando um vazio se não existir.
///
/// # Erros
///
/// Retorna erro se o arquivo existir mas estiver corrompido ou se a
/// validação estrutural falhar (veja [`RuleRepository::validate`]).
pub fn load_repository(path: &Path) -> Result<RuleRepository> {
    if !path.exists() {
        tracing::info!("Nenhum {} encontrado, criando repositório vazio", path.display());
        let repo = RuleRepository::new();
        save_repository(path, &repo)?;
        return Ok(repo);
    }
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Falha ao ler {}", path.display()))?;
    let repo: RuleRepository = serde_json::from_str(&json)
        .with_context(|| format!("Falha ao desserializar {}", path.display()))?;
    repo.validate()
        .with_context(|| format!("Repositório inválido em {}", path.display()))?;
    Ok(repo)
}

/// Salva o repositório como JSON pretty-printed, criando o diretório pai.
pub fn save_repository(path: &Path, repo: &RuleRepository) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Falha ao criar diretório {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(repo).context("Falha ao serializar RuleRepository")?;
    std::fs::write(path, json).with_context(|| format!("Falha ao escrever {}", path.display()))?;
    Ok(())
}

/// Uma linha do log de diagnósticos.
///
/// Dono dos dados para poder ser gravado fora da task do handler.
#[derive(Debug, Serialize)]
pub struct DiagnosisLogRecord {
    pub timestamp: DateTime<Utc>,
    pub consultation: Option<ConsultationId>,
    pub inputs: InputVector,
    pub best: Option<RuleId>,
    pub best_cf: Option<f64>,
    pub results: usize,
}

impl DiagnosisLogRecord {
    pub fn new(consultation: Option<ConsultationId>, diagnosis: &Diagnosis) -> Self {
        Self {
            timestamp: Utc::now(),
            consultation,
            inputs: diagnosis.inputs.clone(),
            best: diagnosis.best.as_ref().map(|b| b.id.clone()),
            best_cf: diagnosis.best.as_ref().map(|b| b.cf),
            results: diagnosis.results.len(),
        }
    }
}

/// Acrescenta um registro ao `diagnoses.jsonl` de `dir`.
pub fn append_diagnosis_log(dir: &Path, record: &DiagnosisLogRecord) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Falha ao criar diretório {}", dir.display()))?;
    let path = dir.join(DIAGNOSIS_LOG_FILE);
    let line = serde_json::to_string(record).context("Falha ao serializar registro de diagnóstico")?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Falha ao abrir {}", path.display()))?;
    writeln!(file, "{line}").with_context(|| format!("Falha ao escrever {}", path.display()))?;
    Ok(())
}
