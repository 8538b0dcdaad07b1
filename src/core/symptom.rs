//! # SymptomCatalog — Catálogo Estático de Sintomas
//!
//! Mapa `chave → rótulo legível`, somente leitura para o motor.
//! Iterado sempre em ordem de chave (BTreeMap), o que mantém a saída
//! de confirmação determinística.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymptomCatalog(BTreeMap<String, String>);

impl SymptomCatalog {
    /// Rótulo do sintoma, se catalogado.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<const N: usize> From<[(&str, &str); N]> for SymptomCatalog {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}
