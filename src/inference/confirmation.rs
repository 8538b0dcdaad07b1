//! # Sintomas de Confirmação — Segunda Etapa
//!
//! Dado o conjunto de regras candidatas da triagem, coleta a união dos
//! sintomas citados por suas condições e mantém apenas os que existem no
//! [`SymptomCatalog`]. São estes os sintomas perguntados ao usuário antes
//! do diagnóstico final.
//!
//! Sintomas citados mas fora do catálogo (incluindo entradas derivadas
//! da imagem, como `pred_smut`) são descartados em silêncio. É uma lacuna
//! de dados, não um erro.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::{Rule, SymptomCatalog};

/// Retorna `chave → rótulo` para os sintomas de confirmação, em ordem de chave.
pub fn select_confirmation_symptoms<S: AsRef<str>>(
    candidate_ids: &[S],
    catalog: &SymptomCatalog,
    rules: &[Rule],
) -> BTreeMap<String, String> {
    let candidates: BTreeSet<&str> = candidate_ids.iter().map(|id| id.as_ref()).collect();

    let referenced: BTreeSet<&str> = rules
        .iter()
        .filter(|r| candidates.contains(r.id.as_str()))
        .flat_map(|r| r.symptom_keys())
        .collect();

    referenced
        .into_iter()
        .filter_map(|key| match catalog.label(key) {
            Some(label) => Some((key.to_string(), label.to_string())),
            None => {
                tracing::debug!(symptom = %key, "sintoma fora do catálogo ignorado na confirmação");
                None
            }
        })
        .collect()
}
