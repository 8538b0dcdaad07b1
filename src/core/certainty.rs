//! # Certainty Factor — Combinação de Evidências
//!
//! Implementação da **regra de combinação de Shortliffe-Buchanan** (MYCIN)
//! para fatores de certeza (CF). Um CF é um número real em `[-1, 1]`:
//!
//! - `cf > 0` — crença na hipótese
//! - `cf < 0` — descrença na hipótese
//! - `cf = 0` — nenhuma evidência
//!
//! ## Regra de Combinação
//!
//! | Caso | Fórmula |
//! |------|---------|
//! | ambos ≥ 0 | `cf1 + cf2 × (1 − cf1)` |
//! | ambos ≤ 0 | `cf1 + cf2 × (1 + cf1)` |
//! | sinais opostos | `(cf1 + cf2) / (1 − min(|cf1|, |cf2|))` |
//!
//! No caso de sinais opostos com magnitudes iguais a 1 o denominador
//! zera; o resultado definido é `0.0`.
//!
//! ## Exemplo
//!
//! ```rust
//! use crate::core::certainty::combine;
//!
//! assert_eq!(combine(Some(0.5), Some(0.5)), Some(0.75));
//! assert_eq!(combine(None, Some(0.3)), Some(0.3));
//! ```
//!
//! A combinação não é estritamente associativa em ponto flutuante,
//! então quem reduz uma sequência deve sempre aplicar da esquerda
//! para a direita, na ordem declarada das condições.

/// Casas decimais usadas para estabilizar a apresentação de CFs e evidências.
const PRESENTATION_SCALE: f64 = 10_000.0;

/// Combina dois fatores de certeza vindos de evidências independentes.
///
/// `None` representa "ainda não há evidência"; o outro lado é
/// devolvido inalterado. É o caso semente da redução.
pub fn combine(cf1: Option<f64>, cf2: Option<f64>) -> Option<f64> {
    match (cf1, cf2) {
        (None, other) | (other, None) => other,
        (Some(a), Some(b)) => Some(combine_pair(a, b)),
    }
}

/// Combina dois CFs presentes. Veja [`combine`].
pub fn combine_pair(cf1: f64, cf2: f64) -> f64 {
    if cf1 >= 0.0 && cf2 >= 0.0 {
        return cf1 + cf2 * (1.0 - cf1);
    }
    if cf1 <= 0.0 && cf2 <= 0.0 {
        return cf1 + cf2 * (1.0 + cf1);
    }
    // Evidências conflitantes
    let denom = 1.0 - cf1.abs().min(cf2.abs());
    if denom == 0.0 {
        return 0.0;
    }
    (cf1 + cf2) / denom
}

/// Limita um CF ao intervalo fechado `[-1, 1]`.
pub fn clamp_cf(cf: f64) -> f64 {
    cf.clamp(-1.0, 1.0)
}

/// Arredonda para 4 casas decimais.
pub fn round4(value: f64) -> f64 {
    (value * PRESENTATION_SCALE).round() / PRESENTATION_SCALE
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `None` é o elemento neutro dos dois lados
    #[test]
    fn test_absent_side_is_identity() {
        for cf in [-1.0, -0.4, 0.0, 0.25, 1.0] {
            assert_eq!(combine(None, Some(cf)), Some(cf));
            assert_eq!(combine(Some(cf), None), Some(cf));
        }
        assert_eq!(combine(None, None), None);
    }

    #[test]
    fn test_positive_reinforcement() {
        assert_eq!(combine(Some(0.5), Some(0.5)), Some(0.75));
    }

    #[test]
    fn test_negative_reinforcement() {
        assert_eq!(combine(Some(-0.5), Some(-0.5)), Some(-0.75));
    }

    #[test]
    fn test_equal_magnitude_conflict_cancels() {
        assert_eq!(combine(Some(0.5), Some(-0.5)), Some(0.0));
    }

    /// Conflito total: denominador zero → 0.0 em vez de divisão por zero
    #[test]
    fn test_full_conflict_zero_denominator() {
        assert_eq!(combine_pair(1.0, -1.0), 0.0);
        assert_eq!(combine_pair(-1.0, 1.0), 0.0);
    }

    #[test]
    fn test_conflict_favours_stronger_side() {
        // (0.8 - 0.2) / (1 - 0.2) = 0.75
        assert!((combine_pair(0.8, -0.2) - 0.75).abs() < 1e-12);
        assert!((combine_pair(-0.8, 0.2) + 0.75).abs() < 1e-12);
    }

    /// Zero conta como não-negativo e não-positivo ao mesmo tempo
    #[test]
    fn test_zero_with_negative_uses_negative_branch() {
        assert_eq!(combine_pair(0.0, -0.5), -0.5);
        assert_eq!(combine_pair(0.0, 0.5), 0.5);
    }

    #[test]
    fn test_positive_saturates_below_one() {
        let mut acc = None;
        for _ in 0..50 {
            acc = combine(acc, Some(0.9));
        }
        let cf = acc.unwrap();
        assert!(cf <= 1.0);
        assert!(cf > 0.999);
    }

    #[test]
    fn test_round4_and_clamp() {
        assert_eq!(round4(0.123_456), 0.1235);
        assert_eq!(round4(0.8), 0.8);
        assert_eq!(clamp_cf(3.2), 1.0);
        assert_eq!(clamp_cf(-7.0), -1.0);
        assert_eq!(clamp_cf(0.42), 0.42);
    }
}
