//! # InputVector — Severidades Informadas pelo Usuário
//!
//! Mapa `chave de sintoma → severidade`, construído pelo chamador a cada
//! consulta e nunca mutado pelo motor. A faixa esperada é `[0, 1]`, mas
//! o motor aceita qualquer valor finito (veja [`InputPolicy`]).
//!
//! Predições de imagem entram no mesmo vetor sob um prefixo
//! (`pred_smut`, `pred_healthy`, ...) para não colidir com sintomas.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Política aplicada às entradas antes da avaliação.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputPolicy {
    /// Valores usados como vieram. Evidências fora de `[-1, 1]` só são
    /// limitadas no CF final da regra.
    #[default]
    Permissive,
    /// Cada severidade é limitada a `[0, 1]` antes da avaliação.
    Clamp,
}

/// Vetor de entrada de uma sessão de diagnóstico.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputVector(BTreeMap<String, f64>);

impl InputVector {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Severidade do sintoma, `0.0` quando ausente (sem evidência).
    pub fn value(&self, key: &str) -> f64 {
        self.0.get(key).copied().unwrap_or(0.0)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        self.0.insert(key.into(), value);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Mescla `other` sobre `self`. Em colisão de chave, `other` vence.
    pub fn merge(&mut self, other: &InputVector) {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), *value);
        }
    }

    /// Retorna um novo vetor: `self` sobrescrito por `other`.
    pub fn merged(&self, other: &InputVector) -> InputVector {
        let mut out = self.clone();
        out.merge(other);
        out
    }

    /// Adiciona predições de imagem como entradas `prefix + doença`.
    pub fn insert_image_predictions(&mut self, prefix: &str, probs: &BTreeMap<String, f64>) {
        for (disease, p) in probs {
            self.0.insert(format!("{prefix}{disease}"), *p);
        }
    }

    /// Mantém apenas as chaves aceitas por `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.0.retain(|k, _| keep(k.as_str()));
    }

    /// Primeira chave com valor não finito (NaN ou infinito), se houver.
    pub fn first_non_finite(&self) -> Option<&str> {
        self.0
            .iter()
            .find(|(_, v)| !v.is_finite())
            .map(|(k, _)| k.as_str())
    }

    /// Aplica a [`InputPolicy`], devolvendo o vetor que o motor vai ler.
    pub fn with_policy(&self, policy: InputPolicy) -> InputVector {
        match policy {
            InputPolicy::Permissive => self.clone(),
            InputPolicy::Clamp => InputVector(
                self.0
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clamp(0.0, 1.0)))
                    .collect(),
            ),
        }
    }
}

impl FromIterator<(String, f64)> for InputVector {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[(&str, f64); N]> for InputVector {
    fn from(pairs: [(&str, f64); N]) -> Self {
        pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }
}
