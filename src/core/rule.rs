//! # Rule — Produção do Sistema Especialista
//!
//! Uma [`Rule`] associa um conjunto de [`Condition`]s (sintoma + peso)
//! a uma hipótese de diagnóstico (uma doença da planta).
//!
//! ## Formato JSON
//!
//! ```json
//! {
//!   "id": "R1",
//!   "name": "Corn smut",
//!   "name_id": "Gosong jagung",
//!   "description": "Ustilago maydis",
//!   "rule_cf": 0.9,
//!   "conditions": [
//!     { "symptom": "galls_on_ear", "weight": 0.8 },
//!     { "symptom": "black_spores" }
//!   ]
//! }
//! ```
//!
//! Campos opcionais recebem o default **na desserialização**, nunca
//! dentro do motor de inferência:
//!
//! | Campo | Default |
//! |-------|---------|
//! | `name_id` | ausente |
//! | `description` | `""` |
//! | `rule_cf` | `1.0` |
//! | `weight` | `1.0` |
//!
//! `id`, `name` e `conditions` são obrigatórios; um registro sem eles
//! falha ao desserializar.

use serde::{Deserialize, Serialize};

/// Identificador de uma regra (ex: `"R1"`).
pub type RuleId = String;

fn default_weight() -> f64 {
    1.0
}

fn default_rule_cf() -> f64 {
    1.0
}

/// Uma condição da regra: o sintoma observado e sua força diagnóstica.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Chave do sintoma no catálogo (ou entrada derivada de imagem, ex: `pred_smut`).
    pub symptom: String,
    /// Peso da condição, tipicamente em `[0, 1]`, sem validação de faixa.
    #[serde(default = "default_weight")]
    pub weight: f64,
}

#[cfg(test)]
impl Condition {
    pub fn new(symptom: impl Into<String>, weight: f64) -> Self {
        Self {
            symptom: symptom.into(),
            weight,
        }
    }
}

/// Regra de diagnóstico, somente leitura para o motor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Identificador único dentro do repositório.
    pub id: RuleId,
    /// Nome da doença.
    pub name: String,
    /// Nome localizado (opcional).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_id: Option<String>,
    #[serde(default)]
    pub description: String,
    /// Multiplicador do CF combinado. Convencionalmente em `[-1, 1]`.
    #[serde(default = "default_rule_cf")]
    pub rule_cf: f64,
    /// Condições em ordem declarada. A redução de CF segue esta ordem.
    pub conditions: Vec<Condition>,
}

impl Rule {
    /// Itera as chaves de sintoma referenciadas pelas condições.
    pub fn symptom_keys(&self) -> impl Iterator<Item = &str> {
        self.conditions.iter().map(|c| c.symptom.as_str())
    }
}

/// Construtores para montar regras em testes; em produção elas vêm do JSON.
#[cfg(test)]
impl Rule {
    /// Cria uma regra com `rule_cf = 1.0` e sem condições.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            name_id: None,
            description: String::new(),
            rule_cf: default_rule_cf(),
            conditions: Vec::new(),
        }
    }

    /// Builder: adiciona uma condição ao final da lista.
    pub fn with_condition(mut self, symptom: impl Into<String>, weight: f64) -> Self {
        self.conditions.push(Condition::new(symptom, weight));
        self
    }

    /// Builder: define o multiplicador da regra.
    pub fn with_rule_cf(mut self, rule_cf: f64) -> Self {
        self.rule_cf = rule_cf;
        self
    }
}
