//! # Módulo Core — Tipos Fundamentais do Domínio
//!
//! Os registros tipados que o motor de inferência lê:
//!
//! - [`Rule`] / [`Condition`](rule::Condition) — regras de diagnóstico com condições ponderadas
//! - [`SymptomCatalog`] — catálogo estático `chave → rótulo`
//! - [`InputVector`] — severidades informadas pelo usuário numa consulta
//! - [`RuleRepository`] — regras + catálogo, como carregados do disco
//! - [`certainty`] — combinação de fatores de certeza (Shortliffe-Buchanan)
//!
//! Defaults (`weight = 1.0`, `rule_cf = 1.0`, ...) são aplicados na
//! desserialização; o motor só enxerga registros completos.

pub mod certainty;

pub mod inputs;

pub mod repository;

pub mod rule;

pub mod symptom;

pub use inputs::{InputPolicy, InputVector};
pub use repository::RuleRepository;
pub use rule::Rule;
pub use symptom::SymptomCatalog;
