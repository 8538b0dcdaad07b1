//! # Orquestrador — O Fluxo da Consulta
//!
//! O [`Orchestrator`] conduz uma **consulta** de diagnóstico pelas duas
//! etapas do motor, guardando entre elas o que o usuário já informou.
//!
//! ```text
//! POST /consultations            POST /consultations/{id}/confirm
//!   │                              │
//!   ├── filtra chaves do catálogo  ├── filtra sintomas de confirmação
//!   ├── + predições de imagem      ├── mescla sobre a triagem
//!   ├── screen()                   ├── diagnose()
//!   ├── sintomas de confirmação    └── guarda o diagnóstico
//!   └── guarda Consultation
//! ```
//!
//! ## Estado Interno
//!
//! - `consultations` — consultas abertas, por UUID v4
//! - `ttl` — consultas mais antigas são descartadas ao abrir uma nova
//!
//! O repositório de regras é lido do `Arc<RwLock<_>>` compartilhado no
//! momento de cada chamada e passado explicitamente ao motor.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::core::rule::RuleId;
use crate::core::{InputVector, RuleRepository};
use crate::image::{check_predictions, ImageError};
use crate::inference::{CfEngine, DiagnosisResult};

/// Identificador de uma consulta.
pub type ConsultationId = Uuid;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConsultationError {
    #[error("consulta não encontrada: {0}")]
    NotFound(ConsultationId),

    #[error("valor não finito para '{0}'")]
    NonFiniteInput(String),

    #[error(transparent)]
    Image(#[from] ImageError),
}

/// Resumo de uma regra candidata, para mostrar ao usuário.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CandidateSummary {
    pub id: RuleId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_id: Option<String>,
}

/// Saída da triagem.
///
/// `consultation_id` é `None` quando nenhuma regra passou do limiar:
/// nada é guardado e o chamador informa "sem correspondência".
#[derive(Clone, Debug, Serialize)]
pub struct ScreeningOutcome {
    pub consultation_id: Option<ConsultationId>,
    pub candidates: Vec<CandidateSummary>,
    pub confirmation_symptoms: BTreeMap<String, String>,
}

/// Diagnóstico final de uma consulta.
#[derive(Clone, Debug, Serialize)]
pub struct Diagnosis {
    /// Primeiro do ranking, se houver.
    pub best: Option<DiagnosisResult>,
    pub results: Vec<DiagnosisResult>,
    /// Entradas mescladas usadas no cálculo.
    pub inputs: InputVector,
}

impl Diagnosis {
    fn from_results(results: Vec<DiagnosisResult>, inputs: InputVector) -> Self {
        Self {
            best: results.first().cloned(),
            results,
            inputs,
        }
    }
}

/// Uma consulta aberta.
#[derive(Clone, Debug, Serialize)]
pub struct Consultation {
    pub id: ConsultationId,
    pub created_at: DateTime<Utc>,
    pub screening_inputs: InputVector,
    pub candidates: Vec<RuleId>,
    pub confirmation_symptoms: BTreeMap<String, String>,
    /// Preenchido após a confirmação.
    pub diagnosis: Option<Diagnosis>,
}

impl Consultation {
    fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.created_at > ttl
    }
}

pub struct Orchestrator {
    engine: CfEngine,
    repository: Arc<RwLock<RuleRepository>>,
    consultations: HashMap<ConsultationId, Consultation>,
    ttl: Duration,
}

impl Orchestrator {
    pub fn new(engine: CfEngine, repository: Arc<RwLock<RuleRepository>>, ttl: Duration) -> Self {
        Self {
            engine,
            repository,
            consultations: HashMap::new(),
            ttl,
        }
    }

    pub fn consultation_count(&self) -> usize {
        self.consultations.len()
    }

    /// Consulta aberta e ainda dentro do TTL.
    pub fn consultation(&self, id: ConsultationId) -> Option<&Consultation> {
        let now = Utc::now();
        self.consultations
            .get(&id)
            .filter(|c| !c.is_expired(now, self.ttl))
    }

    /// Etapa 1: triagem.
    ///
    /// Só as chaves presentes no catálogo são aproveitadas das entradas
    /// brutas; as predições de imagem (se houver) entram com o prefixo
    /// configurado.
    pub fn start(
        &mut self,
        raw_inputs: &InputVector,
        image_probs: Option<&BTreeMap<String, f64>>,
    ) -> Result<ScreeningOutcome, ConsultationError> {
        ensure_finite(raw_inputs)?;
        if let Some(probs) = image_probs {
            check_predictions(probs)?;
        }

        self.evict_expired(Utc::now());

        let repository = Arc::clone(&self.repository);
        let repo = repository.read();

        let mut inputs = raw_inputs.clone();
        inputs.retain(|k| {
            let known = repo.symptoms.contains(k);
            if !known {
                tracing::debug!(symptom = %k, "entrada fora do catálogo ignorada");
            }
            known
        });
        if let Some(probs) = image_probs {
            inputs.insert_image_predictions(&self.engine.config().image_prefix, probs);
        }

        let candidates = self.engine.screen(&repo.rules, &inputs);
        if candidates.is_empty() {
            tracing::info!(inputs = inputs.len(), "triagem sem candidatos");
            return Ok(ScreeningOutcome {
                consultation_id: None,
                candidates: Vec::new(),
                confirmation_symptoms: BTreeMap::new(),
            });
        }

        let confirmation_symptoms =
            self.engine
                .confirmation_symptoms(&candidates, &repo.symptoms, &repo.rules);

        let summaries = candidates
            .iter()
            .filter_map(|id| repo.find_rule(id))
            .map(|r| CandidateSummary {
                id: r.id.clone(),
                name: r.name.clone(),
                name_id: r.name_id.clone(),
            })
            .collect();

        let id = Uuid::new_v4();
        tracing::info!(
            consultation = %id,
            candidates = candidates.len(),
            to_confirm = confirmation_symptoms.len(),
            "consulta aberta"
        );
        self.consultations.insert(
            id,
            Consultation {
                id,
                created_at: Utc::now(),
                screening_inputs: inputs,
                candidates,
                confirmation_symptoms: confirmation_symptoms.clone(),
                diagnosis: None,
            },
        );

        Ok(ScreeningOutcome {
            consultation_id: Some(id),
            candidates: summaries,
            confirmation_symptoms,
        })
    }

    /// Etapa 2: confirmação e diagnóstico final.
    ///
    /// Só os sintomas pedidos na confirmação são aceitos; sintomas não
    /// enviados mantêm o valor da triagem.
    pub fn confirm(
        &mut self,
        id: ConsultationId,
        raw_inputs: &InputVector,
    ) -> Result<Diagnosis, ConsultationError> {
        ensure_finite(raw_inputs)?;
        // Expirada conta como inexistente
        self.evict_expired(Utc::now());

        let repository = Arc::clone(&self.repository);
        let repo = repository.read();

        let consultation = self
            .consultations
            .get_mut(&id)
            .ok_or(ConsultationError::NotFound(id))?;

        let mut confirmation = raw_inputs.clone();
        confirmation.retain(|k| consultation.confirmation_symptoms.contains_key(k));

        let merged = consultation.screening_inputs.merged(&confirmation);
        let results = self.engine.diagnose(&repo.rules, &merged);
        let diagnosis = Diagnosis::from_results(results, merged);

        match &diagnosis.best {
            Some(best) => tracing::info!(
                consultation = %id,
                rule_id = %best.id,
                cf = best.cf,
                "diagnóstico final"
            ),
            None => tracing::info!(consultation = %id, "diagnóstico final sem resultado positivo"),
        }

        consultation.diagnosis = Some(diagnosis.clone());
        Ok(diagnosis)
    }

    /// Diagnóstico direto, sem consulta: roda o encadeamento sobre `inputs`.
    pub fn diagnose_once(&self, inputs: &InputVector) -> Result<Diagnosis, ConsultationError> {
        ensure_finite(inputs)?;
        let repo = self.repository.read();
        let results = self.engine.diagnose(&repo.rules, inputs);
        Ok(Diagnosis::from_results(results, inputs.clone()))
    }

    /// Remove consultas criadas há mais de `ttl`.
    pub fn evict_expired(&mut self, now: DateTime<Utc>) {
        let ttl = self.ttl;
        let before = self.consultations.len();
        self.consultations.retain(|_, c| !c.is_expired(now, ttl));
        let evicted = before - self.consultations.len();
        if evicted > 0 {
            tracing::debug!(evicted, "consultas expiradas removidas");
        }
    }
}

fn ensure_finite(inputs: &InputVector) -> Result<(), ConsultationError> {
    match inputs.first_non_finite() {
        Some(key) => Err(ConsultationError::NonFiniteInput(key.to_string())),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::core::{Rule, SymptomCatalog};
    use crate::image::{ImagePredictor, StubPredictor};

    fn repository() -> Arc<RwLock<RuleRepository>> {
        Arc::new(RwLock::new(RuleRepository {
            rules: vec![
                Rule::new("R1", "Corn smut")
                    .with_condition("galls", 0.9)
                    .with_condition("black_spores", 0.8),
                Rule::new("R2", "Turcicum leaf blight")
                    .with_condition("long_lesions", 0.8)
                    .with_condition("pred_tlb", 0.6),
                Rule::new("R3", "Ear rot").with_condition("pink_mold", 0.9),
            ],
            symptoms: SymptomCatalog::from([
                ("galls", "Galls on ear"),
                ("black_spores", "Black spores"),
                ("long_lesions", "Long grey lesions"),
                ("pink_mold", "Pink mold"),
            ]),
        }))
    }

    fn orchestrator() -> Orchestrator {
        Orchestrator::new(CfEngine::default(), repository(), Duration::minutes(60))
    }

    #[test]
    fn test_full_consultation() {
        let mut orch = orchestrator();
        let outcome = orch
            .start(&InputVector::from([("galls", 0.5)]), None)
            .unwrap();
        let id = outcome.consultation_id.expect("consulta aberta");
        assert_eq!(outcome.candidates.len(), 1);
        assert_eq!(outcome.candidates[0].id, "R1");
        let asked: Vec<&str> = outcome.confirmation_symptoms.keys().map(String::as_str).collect();
        assert_eq!(asked, vec!["black_spores", "galls"]);

        let diagnosis = orch
            .confirm(id, &InputVector::from([("black_spores", 1.0)]))
            .unwrap();
        // galls 0.45 (da triagem), depois spores 0.8: 0.45 + 0.8 × 0.55 = 0.89
        let best = diagnosis.best.expect("melhor diagnóstico");
        assert_eq!(best.id, "R1");
        assert_eq!(best.cf, 0.89);
        assert_eq!(diagnosis.inputs.value("galls"), 0.5);
        assert!(orch.consultation(id).unwrap().diagnosis.is_some());
    }

    #[test]
    fn test_no_candidates_opens_nothing() {
        let mut orch = orchestrator();
        let outcome = orch.start(&InputVector::new(), None).unwrap();
        assert!(outcome.consultation_id.is_none());
        assert!(outcome.candidates.is_empty());
        assert_eq!(orch.consultation_count(), 0);
    }

    /// Chaves fora do catálogo não participam da triagem
    #[test]
    fn test_unknown_screening_keys_dropped() {
        let mut orch = orchestrator();
        let outcome = orch
            .start(&InputVector::from([("pred_tlb", 1.0)]), None)
            .unwrap();
        assert!(outcome.consultation_id.is_none());
    }

    #[test]
    fn test_image_predictions_feed_screening() {
        let mut orch = orchestrator();
        let probs = StubPredictor.predict(b"leaf.jpg").unwrap();
        let outcome = orch.start(&InputVector::new(), Some(&probs)).unwrap();
        // pred_tlb = 0.1 × 0.6 = 0.06 >= 0.05
        let id = outcome.consultation_id.unwrap();
        assert_eq!(outcome.candidates[0].id, "R2");
        // pred_tlb não é sintoma do catálogo, então não é perguntado
        assert!(!outcome.confirmation_symptoms.contains_key("pred_tlb"));
        assert_eq!(
            orch.consultation(id).unwrap().screening_inputs.value("pred_tlb"),
            0.1
        );
    }

    /// Só sintomas de confirmação são aceitos na etapa 2
    #[test]
    fn test_confirm_ignores_unrequested_symptoms() {
        let mut orch = orchestrator();
        let id = orch
            .start(&InputVector::from([("galls", 0.5)]), None)
            .unwrap()
            .consultation_id
            .unwrap();
        let diagnosis = orch
            .confirm(id, &InputVector::from([("pink_mold", 1.0)]))
            .unwrap();
        assert!(!diagnosis.inputs.contains("pink_mold"));
        assert!(diagnosis.results.iter().all(|r| r.id != "R3"));
    }

    #[test]
    fn test_confirmation_overrides_screening() {
        let mut orch = orchestrator();
        let id = orch
            .start(&InputVector::from([("galls", 0.5)]), None)
            .unwrap()
            .consultation_id
            .unwrap();
        let diagnosis = orch
            .confirm(id, &InputVector::from([("galls", 1.0)]))
            .unwrap();
        assert_eq!(diagnosis.inputs.value("galls"), 1.0);
        assert_eq!(diagnosis.best.unwrap().cf, 0.9);
    }

    #[test]
    fn test_unknown_consultation() {
        let mut orch = orchestrator();
        let id = Uuid::new_v4();
        assert_eq!(
            orch.confirm(id, &InputVector::new()).unwrap_err(),
            ConsultationError::NotFound(id)
        );
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut orch = orchestrator();
        let mut inputs = InputVector::new();
        inputs.insert("galls", f64::INFINITY);
        assert_eq!(
            orch.start(&inputs, None).unwrap_err(),
            ConsultationError::NonFiniteInput("galls".into())
        );
    }

    #[test]
    fn test_expired_consultations_evicted() {
        let mut orch = orchestrator();
        let id = orch
            .start(&InputVector::from([("galls", 0.5)]), None)
            .unwrap()
            .consultation_id
            .unwrap();
        orch.evict_expired(Utc::now() + Duration::minutes(30));
        assert!(orch.consultation(id).is_some());
        orch.evict_expired(Utc::now() + Duration::minutes(61));
        assert!(orch.consultation(id).is_none());
    }

    /// Sem nova triagem para disparar a limpeza, a consulta vencida
    /// ainda precisa sumir da consulta e da confirmação.
    #[test]
    fn test_expired_consultation_cannot_be_confirmed() {
        let mut orch = orchestrator();
        let id = orch
            .start(&InputVector::from([("galls", 0.5)]), None)
            .unwrap()
            .consultation_id
            .unwrap();
        orch.consultations.get_mut(&id).unwrap().created_at = Utc::now() - Duration::minutes(120);

        assert!(orch.consultation(id).is_none());
        assert_eq!(
            orch.confirm(id, &InputVector::from([("black_spores", 1.0)]))
                .unwrap_err(),
            ConsultationError::NotFound(id)
        );
        assert_eq!(orch.consultation_count(), 0);
    }

    #[test]
    fn test_diagnose_once_and_threshold_config() {
        let orch = Orchestrator::new(
            CfEngine::new(EngineConfig {
                screening_threshold: 0.9,
                ..EngineConfig::default()
            }),
            repository(),
            Duration::minutes(1),
        );
        let diagnosis = orch
            .diagnose_once(&InputVector::from([("pink_mold", 0.5), ("galls", 1.0)]))
            .unwrap();
        let ids: Vec<&str> = diagnosis.results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["R1", "R3"]);
    }
}
