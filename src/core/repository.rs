//! # RuleRepository — Regras + Catálogo de Sintomas
//!
//! O [`RuleRepository`] é o contêiner que a camada externa carrega do
//! disco (`data/rules.json`) e entrega ao motor. O motor **nunca** guarda
//! uma referência global a ele: cada chamada recebe as regras e o
//! catálogo explicitamente.
//!
//! ## Formato
//!
//! ```json
//! {
//!   "rules": [ { "id": "R1", "name": "...", "conditions": [ ... ] } ],
//!   "symptoms": { "galls_on_ear": "Galls on the ear", ... }
//! }
//! ```
//!
//! ## Validação
//!
//! [`validate()`](RuleRepository::validate) roda após a desserialização e
//! rejeita problemas estruturais (ids vazios ou duplicados, números não
//! finitos). Sintomas usados por regras mas ausentes do catálogo **não**
//! são erro: são apenas reportados por [`uncatalogued_symptoms()`](RuleRepository::uncatalogued_symptoms).

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use super::rule::Rule;
use super::symptom::SymptomCatalog;
use crate::error::RepositoryError;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleRepository {
    #[serde(default)]
    pub rules: Vec<Rule>,
    #[serde(default)]
    pub symptoms: SymptomCatalog,
}

impl RuleRepository {
    /// Repositório vazio, o conteúdo gravado quando o arquivo ainda não existe.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn symptom_count(&self) -> usize {
        self.symptoms.len()
    }

    pub fn find_rule(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Verifica a consistência estrutural das regras.
    ///
    /// Retorna o primeiro problema encontrado, percorrendo as regras em
    /// ordem declarada.
    pub fn validate(&self) -> Result<(), RepositoryError> {
        let mut seen: HashSet<&str> = HashSet::new();

        for (index, rule) in self.rules.iter().enumerate() {
            if rule.id.trim().is_empty() {
                return Err(RepositoryError::MissingId { index });
            }
            if rule.name.trim().is_empty() {
                return Err(RepositoryError::MissingName {
                    id: rule.id.clone(),
                });
            }
            if !seen.insert(rule.id.as_str()) {
                return Err(RepositoryError::DuplicateId(rule.id.clone()));
            }
            if !rule.rule_cf.is_finite() {
                return Err(RepositoryError::NonFiniteRuleCf {
                    id: rule.id.clone(),
                });
            }
            for (ci, cond) in rule.conditions.iter().enumerate() {
                if cond.symptom.trim().is_empty() {
                    return Err(RepositoryError::EmptySymptom {
                        id: rule.id.clone(),
                        index: ci,
                    });
                }
                if !cond.weight.is_finite() {
                    return Err(RepositoryError::NonFiniteWeight {
                        id: rule.id.clone(),
                        symptom: cond.symptom.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Sintomas citados por regras mas ausentes do catálogo, em ordem.
    ///
    /// Chaves com `image_prefix` são entradas derivadas da imagem e
    /// nunca fazem parte do catálogo, então ficam de fora.
    pub fn uncatalogued_symptoms(&self, image_prefix: &str) -> BTreeSet<&str> {
        self.rules
            .iter()
            .flat_map(|r| r.symptom_keys())
            .filter(|k| !self.symptoms.contains(k))
            .filter(|k| image_prefix.is_empty() || !k.starts_with(image_prefix))
            .collect()
    }
}
