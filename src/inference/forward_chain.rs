//! # Encadeamento Progressivo — Diagnóstico Final
//!
//! Avalia todas as regras contra as entradas mescladas (triagem +
//! confirmação, com a confirmação vencendo em colisão), descarta os
//! resultados com `cf <= 0` e ordena por CF decrescente.
//!
//! A ordenação é **estável**: em empate, a regra declarada primeiro vem
//! antes. O melhor diagnóstico é simplesmente o primeiro elemento.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::rule::RuleId;
use crate::core::{InputVector, Rule};

use super::evaluator::evaluate;

/// Resultado de diagnóstico para uma regra.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DiagnosisResult {
    pub id: RuleId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_id: Option<String>,
    pub description: String,
    /// CF final, sempre `> 0` na saída de [`diagnose`].
    pub cf: f64,
    /// Evidência por sintoma, para exibição.
    pub conditions_evidence: BTreeMap<String, f64>,
    pub rule_cf: f64,
}

/// Ranking completo de diagnósticos com CF positivo.
pub fn diagnose(rules: &[Rule], inputs: &InputVector) -> Vec<DiagnosisResult> {
    let mut results: Vec<DiagnosisResult> = rules
        .iter()
        .map(|rule| {
            let eval = evaluate(rule, inputs);
            DiagnosisResult {
                id: rule.id.clone(),
                name: rule.name.clone(),
                name_id: rule.name_id.clone(),
                description: rule.description.clone(),
                cf: eval.cf,
                conditions_evidence: eval.evidence,
                rule_cf: rule.rule_cf,
            }
        })
        .filter(|r| r.cf > 0.0)
        .collect();

    // sort_by é estável: empates mantêm a ordem declarada
    results.sort_by(|a, b| b.cf.total_cmp(&a.cf));
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_rule_ranked() {
        let rules = vec![Rule::new("R1", "Fever").with_condition("fever", 1.0)];
        let results = diagnose(&rules, &InputVector::from([("fever", 0.8)]));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "R1");
        assert_eq!(results[0].cf, 0.8);
        assert_eq!(results[0].conditions_evidence.get("fever"), Some(&0.8));
    }

    #[test]
    fn test_higher_cf_first() {
        let rules = vec![
            Rule::new("R1", "Blight").with_condition("a", 0.6),
            Rule::new("R2", "Smut").with_condition("b", 0.9),
        ];
        let inputs = InputVector::from([("a", 1.0), ("b", 1.0)]);
        let results = diagnose(&rules, &inputs);
        let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["R2", "R1"]);
        assert_eq!(results[0].cf, 0.9);
    }

    /// Regras com cf <= 0 não aparecem, inclusive regras sem condições
    #[test]
    fn test_non_positive_filtered() {
        let rules = vec![
            Rule::new("R0", "Empty"),
            Rule::new("R1", "Negative")
                .with_condition("a", 1.0)
                .with_rule_cf(-1.0),
            Rule::new("R2", "Zero").with_condition("missing", 1.0),
            Rule::new("R3", "Positive").with_condition("a", 0.4),
        ];
        let results = diagnose(&rules, &InputVector::from([("a", 1.0)]));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "R3");
        assert!(results.iter().all(|r| r.cf > 0.0));
    }

    /// Empate: a primeira regra declarada vence
    #[test]
    fn test_ties_keep_declaration_order() {
        let rules = vec![
            Rule::new("R1", "First").with_condition("a", 0.5),
            Rule::new("R2", "Top").with_condition("a", 0.7),
            Rule::new("R3", "Second").with_condition("a", 0.5),
        ];
        let results = diagnose(&rules, &InputVector::from([("a", 1.0)]));
        let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["R2", "R1", "R3"]);
    }

    #[test]
    fn test_sorted_non_increasing() {
        let rules: Vec<Rule> = (0..12)
            .map(|i| {
                Rule::new(format!("R{i}"), "Mixed")
                    .with_condition("a", (i as f64 * 0.37) % 1.0)
                    .with_condition("b", 0.5 - (i as f64 * 0.11) % 1.0)
            })
            .collect();
        let inputs = InputVector::from([("a", 0.9), ("b", 0.6)]);
        let results = diagnose(&rules, &inputs);
        assert!(results.windows(2).all(|w| w[0].cf >= w[1].cf));
        assert!(results.iter().all(|r| r.cf > 0.0 && r.cf <= 1.0));
    }

    #[test]
    fn test_carries_rule_metadata() {
        let mut rule = Rule::new("R1", "Corn smut").with_condition("galls", 1.0);
        rule.name_id = Some("Gosong".into());
        rule.description = "Ustilago maydis".into();
        let results = diagnose(&[rule], &InputVector::from([("galls", 1.0)]));
        assert_eq!(results[0].name_id.as_deref(), Some("Gosong"));
        assert_eq!(results[0].description, "Ustilago maydis");
        assert_eq!(results[0].rule_cf, 1.0);
    }
}
