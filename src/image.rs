//! # Predição por Imagem — Contrato do Classificador Externo
//!
//! Um classificador de imagem devolve `doença → probabilidade`. O motor
//! não conhece o modelo: as probabilidades entram no vetor de entrada
//! com o prefixo configurado (`pred_smut`, `pred_healthy`, ...) e são
//! lidas pelas regras como qualquer outro sintoma.
//!
//! Enquanto não há modelo treinado, [`StubPredictor`] devolve um vetor
//! constante.

use std::collections::BTreeMap;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ImageError {
    #[error("imagem vazia")]
    EmptyImage,

    #[error("predição inválida para '{0}': probabilidade não finita")]
    NonFiniteProbability(String),
}

/// Classificador de imagem plugável.
pub trait ImagePredictor: Send + Sync {
    /// Recebe os bytes da imagem enviada e devolve `doença → probabilidade`.
    fn predict(&self, image: &[u8]) -> Result<BTreeMap<String, f64>, ImageError>;
}

/// Placeholder de saída constante.
#[derive(Clone, Copy, Debug, Default)]
pub struct StubPredictor;

const STUB_OUTPUT: [(&str, f64); 6] = [
    ("smut", 0.1),
    ("msv", 0.1),
    ("gray_leaf_spot", 0.1),
    ("tlb", 0.1),
    ("ear_rot", 0.1),
    ("healthy", 0.5),
];

impl ImagePredictor for StubPredictor {
    fn predict(&self, image: &[u8]) -> Result<BTreeMap<String, f64>, ImageError> {
        if image.is_empty() {
            return Err(ImageError::EmptyImage);
        }
        tracing::debug!(size_bytes = image.len(), "predição de imagem (stub)");
        Ok(STUB_OUTPUT
            .iter()
            .map(|(k, p)| (k.to_string(), *p))
            .collect())
    }
}

/// Rejeita probabilidades NaN/infinitas vindas de um classificador.
pub fn check_predictions(probs: &BTreeMap<String, f64>) -> Result<(), ImageError> {
    match probs.iter().find(|(_, p)| !p.is_finite()) {
        Some((k, _)) => Err(ImageError::NonFiniteProbability(k.clone())),
        None => Ok(()),
    }
}
