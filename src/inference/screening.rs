//! # Triagem — Primeira Etapa
//!
//! Avalia **todas** as regras contra as entradas iniciais e devolve os
//! ids das regras cujo CF final é `>= threshold` (limite inclusivo), na
//! ordem em que as regras foram declaradas.

use crate::core::rule::RuleId;
use crate::core::{InputVector, Rule};

use super::evaluator::evaluate;

/// Limiar padrão da triagem.
pub const DEFAULT_SCREENING_THRESHOLD: f64 = 0.05;

/// Retorna os ids candidatos. Vazio quando nenhuma regra atinge o limiar.
pub fn screen(rules: &[Rule], inputs: &InputVector, threshold: f64) -> Vec<RuleId> {
    rules
        .iter()
        .filter_map(|rule| {
            let cf = evaluate(rule, inputs).cf;
            tracing::trace!(rule_id = %rule.id, cf, "triagem: regra avaliada");
            (cf >= threshold).then(|| rule.id.clone())
        })
        .collect()
}
