//! Erros de domínio compartilhados entre as camadas.

use thiserror::Error;

use crate::core::rule::RuleId;

/// Falha estrutural em um [`RuleRepository`](crate::core::RuleRepository).
///
/// Detectada pela camada de carga, antes de qualquer chamada ao motor.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RepositoryError {
    #[error("regra na posição {index} sem id")]
    MissingId { index: usize },

    #[error("regra '{id}' sem nome")]
    MissingName { id: RuleId },

    #[error("id de regra duplicado: '{0}'")]
    DuplicateId(RuleId),

    #[error("regra '{id}': condição {index} sem sintoma")]
    EmptySymptom { id: RuleId, index: usize },

    #[error("regra '{id}': peso não finito no sintoma '{symptom}'")]
    NonFiniteWeight { id: RuleId, symptom: String },

    #[error("regra '{id}': rule_cf não finito")]
    NonFiniteRuleCf { id: RuleId },
}
