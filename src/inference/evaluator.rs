//! # Avaliação de uma Regra
//!
//! Para cada condição da regra:
//!
//! ```text
//! evidência = entrada(sintoma, default 0.0) × peso
//! ```
//!
//! As evidências são reduzidas com [`combine`] na ordem declarada,
//! partindo de "nenhum valor anterior". O CF combinado é multiplicado
//! pelo `rule_cf`, limitado a `[-1, 1]` e arredondado para 4 casas.
//!
//! ```text
//! Regra R1: fever×1.0, cough×0.5   rule_cf = 0.9
//! Entradas: fever=0.8, cough=0.4
//! ─────────────────────────────────────────────
//! evidências: 0.8, 0.2
//! combinado:  0.8 + 0.2×(1−0.8) = 0.84
//! final:      0.84 × 0.9 = 0.756
//! ```

use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::certainty::{clamp_cf, combine, round4};
use crate::core::{InputVector, Rule};

/// Resultado da avaliação de uma única regra.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RuleEvaluation {
    /// CF final em `[-1, 1]`, arredondado para 4 casas.
    pub cf: f64,
    /// Evidência por sintoma (arredondada para 4 casas).
    pub evidence: BTreeMap<String, f64>,
}

/// Avalia `rule` contra `inputs`. Pura e determinística.
pub fn evaluate(rule: &Rule, inputs: &InputVector) -> RuleEvaluation {
    let mut evidence = BTreeMap::new();
    let mut combined: Option<f64> = None;

    for cond in &rule.conditions {
        let value = inputs.value(&cond.symptom) * cond.weight;
        evidence.insert(cond.symptom.clone(), round4(value));
        combined = combine(combined, Some(value));
    }

    // Regra sem condições → 0.0
    let final_cf = combined.unwrap_or(0.0) * rule.rule_cf;

    RuleEvaluation {
        cf: round4(clamp_cf(final_cf)),
        evidence,
    }
}
