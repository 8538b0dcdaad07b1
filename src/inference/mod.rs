//! # Módulo Inference — Motor de Fatores de Certeza
//!
//! Motor de inferência baseado em regras com **fatores de certeza** (CF),
//! usado para estimar doenças da planta a partir das severidades de
//! sintomas informadas pelo usuário.
//!
//! ## Fluxo em Duas Etapas
//!
//! ```text
//! entradas iniciais (+ predição de imagem)
//!   │
//!   ├── 1. screen()                        → ids candidatos (cf >= limiar)
//!   ├── 2. select_confirmation_symptoms()  → sintomas a perguntar
//!   │        (usuário informa severidades de confirmação)
//!   ├── 3. merge                           → confirmação vence em colisão
//!   └── 4. diagnose()                      → ranking por CF decrescente
//! ```
//!
//! | Sub-módulo | Responsabilidade |
//! |------------|------------------|
//! | [`evaluator`] | CF final + evidências de uma regra |
//! | [`screening`] | Triagem por limiar |
//! | [`confirmation`] | União dos sintomas das candidatas ∩ catálogo |
//! | [`forward_chain`] | Ranking final |
//!
//! Todas as funções são puras: leem apenas os argumentos, não guardam
//! estado entre chamadas e podem rodar em paralelo sem sincronização.

pub mod confirmation;
pub mod evaluator;
pub mod forward_chain;
pub mod screening;

use std::collections::BTreeMap;

pub use confirmation::select_confirmation_symptoms;
pub use forward_chain::{diagnose, DiagnosisResult};
pub use screening::screen;

use crate::config::EngineConfig;
use crate::core::rule::RuleId;
use crate::core::{InputVector, Rule, SymptomCatalog};

/// Fachada sem estado sobre as funções do motor.
///
/// Guarda apenas a [`EngineConfig`]: aplica a política de entrada e o
/// limiar configurado antes de delegar. Regras e catálogo chegam como
/// argumento a cada chamada.
#[derive(Clone, Debug, Default)]
pub struct CfEngine {
    config: EngineConfig,
}

impl CfEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Triagem com o limiar configurado.
    pub fn screen(&self, rules: &[Rule], inputs: &InputVector) -> Vec<RuleId> {
        let inputs = inputs.with_policy(self.config.input_policy);
        let candidates = screen(rules, &inputs, self.config.screening_threshold);
        tracing::debug!(
            rules = rules.len(),
            candidates = candidates.len(),
            threshold = self.config.screening_threshold,
            "triagem concluída"
        );
        candidates
    }

    pub fn confirmation_symptoms(
        &self,
        candidate_ids: &[RuleId],
        catalog: &SymptomCatalog,
        rules: &[Rule],
    ) -> BTreeMap<String, String> {
        select_confirmation_symptoms(candidate_ids, catalog, rules)
    }

    /// Ranking final sobre as entradas já mescladas.
    pub fn diagnose(&self, rules: &[Rule], inputs: &InputVector) -> Vec<DiagnosisResult> {
        let inputs = inputs.with_policy(self.config.input_policy);
        let results = diagnose(rules, &inputs);
        if let Some(best) = results.first() {
            tracing::debug!(rule_id = %best.id, cf = best.cf, total = results.len(), "diagnóstico concluído");
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::InputPolicy;
    use super::evaluator::evaluate;

    fn rules() -> Vec<Rule> {
        vec![
            Rule::new("R1", "Smut").with_condition("galls", 1.0),
            Rule::new("R2", "Blight")
                .with_condition("lesions", 0.6)
                .with_condition("galls", 0.5),
        ]
    }

    /// Cenário ponta a ponta com uma regra e um sintoma
    #[test]
    fn test_end_to_end_single_rule() {
        let rule = Rule::new("R1", "Fever").with_condition("fever", 1.0);
        let inputs = InputVector::from([("fever", 0.8)]);
        let engine = CfEngine::default();

        let eval = evaluate(&rule, &inputs);
        assert_eq!(eval.cf, 0.8);
        assert_eq!(eval.evidence.get("fever"), Some(&0.8));

        let rules = vec![rule];
        assert_eq!(engine.screen(&rules, &inputs), vec!["R1"]);

        let ranked = engine.diagnose(&rules, &inputs);
        assert_eq!(ranked[0].id, "R1");
        assert_eq!(ranked[0].cf, 0.8);
    }

    #[test]
    fn test_two_stage_flow() {
        let engine = CfEngine::default();
        let catalog = SymptomCatalog::from([("galls", "Galls"), ("lesions", "Lesions")]);
        let rules = rules();

        let screening = InputVector::from([("galls", 0.4)]);
        let candidates = engine.screen(&rules, &screening);
        assert_eq!(candidates, vec!["R1", "R2"]);

        let asked = engine.confirmation_symptoms(&candidates, &catalog, &rules);
        assert_eq!(asked.len(), 2);

        let confirmation = InputVector::from([("lesions", 1.0), ("galls", 0.1)]);
        let ranked = engine.diagnose(&rules, &screening.merged(&confirmation));
        // R2: 0.6 + 0.05×0.4 = 0.62 ; R1: 0.1
        assert_eq!(ranked[0].id, "R2");
        assert_eq!(ranked[0].cf, 0.62);
        assert_eq!(ranked[1].cf, 0.1);
    }

    #[test]
    fn test_configured_threshold() {
        let engine = CfEngine::new(EngineConfig {
            screening_threshold: 0.5,
            ..EngineConfig::default()
        });
        let inputs = InputVector::from([("galls", 0.4)]);
        assert!(engine.screen(&rules(), &inputs).is_empty());
    }

    #[test]
    fn test_clamp_policy_limits_inputs() {
        let rule = Rule::new("R1", "Smut")
            .with_condition("galls", 0.5)
            .with_condition("spores", 0.5);
        let inputs = InputVector::from([("galls", 4.0), ("spores", 4.0)]);

        // Permissivo: 2 + 2×(1−2) = 0 → nada
        let permissive = CfEngine::default();
        assert!(permissive.diagnose(std::slice::from_ref(&rule), &inputs).is_empty());

        let clamped = CfEngine::new(EngineConfig {
            input_policy: InputPolicy::Clamp,
            ..EngineConfig::default()
        });
        assert_eq!(clamped.diagnose(&[rule], &inputs)[0].cf, 0.75);
    }
}
