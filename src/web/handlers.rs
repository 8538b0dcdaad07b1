//! # Handlers HTTP
//!
//! Cada função pública é um handler Axum mapeado em
//! [`super::create_router()`]. Todas respondem JSON.
//!
//! | Handler | Método | Rota |
//! |---------|--------|------|
//! | `status` | GET | `/status` |
//! | `list_symptoms` | GET | `/symptoms` |
//! | `get_rules` | GET | `/rules` |
//! | `replace_rules` | PUT | `/rules` |
//! | `start_consultation` | POST | `/consultations` |
//! | `upload_consultation` | POST | `/consultations/upload` |
//! | `get_consultation` | GET | `/consultations/{id}` |
//! | `confirm_consultation` | POST | `/consultations/{id}/confirm` |
//! | `diagnose` | POST | `/diagnose` |
//!
//! O lock do orquestrador (`parking_lot::Mutex`) nunca atravessa um
//! `.await`.

use std::collections::BTreeMap;

use axum::extract::{Multipart, Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{ApiError, ApiResult};
use super::state::AppState;
use crate::core::{InputVector, RuleRepository, SymptomCatalog};
use crate::image::check_predictions;
use crate::orchestrator::{Consultation, Diagnosis, ScreeningOutcome};
use crate::persistence::{self, DiagnosisLogRecord};

/// Resposta do endpoint `/status`.
#[derive(Serialize)]
pub struct StatusResponse {
    pub rules: usize,
    pub symptoms: usize,
    pub open_consultations: usize,
    pub screening_threshold: f64,
}

/// Corpo de `POST /consultations`.
#[derive(Deserialize)]
pub struct ScreeningRequest {
    #[serde(default)]
    pub inputs: InputVector,
    /// Predições já calculadas por um classificador externo.
    #[serde(default)]
    pub image_predictions: Option<BTreeMap<String, f64>>,
}

/// Corpo de `POST /consultations/{id}/confirm` e `POST /diagnose`.
#[derive(Deserialize)]
pub struct InputsRequest {
    #[serde(default)]
    pub inputs: InputVector,
}

/// GET `/status`
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let (rules, symptoms) = {
        let repo = state.repository.read();
        (repo.rule_count(), repo.symptom_count())
    };
    Json(StatusResponse {
        rules,
        symptoms,
        open_consultations: state.orchestrator.lock().consultation_count(),
        screening_threshold: state.config.engine.screening_threshold,
    })
}

/// GET `/symptoms` — catálogo completo, para montar o formulário de triagem.
pub async fn list_symptoms(State(state): State<AppState>) -> Json<SymptomCatalog> {
    Json(state.repository.read().symptoms.clone())
}

/// GET `/rules`
pub async fn get_rules(State(state): State<AppState>) -> Json<RuleRepository> {
    Json(state.repository.read().clone())
}

/// PUT `/rules` — substitui regras e catálogo.
///
/// Valida, grava em disco e só então troca o repositório em memória.
pub async fn replace_rules(
    State(state): State<AppState>,
    Json(repo): Json<RuleRepository>,
) -> ApiResult<Json<RuleRepository>> {
    repo.validate()?;

    {
        let missing = repo.uncatalogued_symptoms(&state.config.engine.image_prefix);
        if !missing.is_empty() {
            tracing::warn!(symptoms = ?missing, "regras citam sintomas fora do catálogo");
        }
    }

    persistence::save_repository(&state.config.rules_path, &repo)
        .map_err(|e| ApiError::Internal(format!("{e:#}")))?;

    tracing::info!(
        rules = repo.rule_count(),
        symptoms = repo.symptom_count(),
        "repositório de regras substituído"
    );
    *state.repository.write() = repo.clone();
    Ok(Json(repo))
}

/// POST `/consultations` — triagem a partir de JSON.
pub async fn start_consultation(
    State(state): State<AppState>,
    Json(req): Json<ScreeningRequest>,
) -> ApiResult<Json<ScreeningOutcome>> {
    let outcome = state
        .orchestrator
        .lock()
        .start(&req.inputs, req.image_predictions.as_ref())?;
    Ok(Json(outcome))
}

/// POST `/consultations/upload` — triagem a partir de formulário multipart.
///
/// ## Campos
///
/// - `image` (opcional) — arquivo passado ao [`ImagePredictor`](crate::image::ImagePredictor)
/// - qualquer outro campo — chave de sintoma com valor numérico em texto
///
/// Campos vazios são ignorados (sem evidência). Se o classificador
/// falhar, a triagem segue só com os campos de sintoma.
pub async fn upload_consultation(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<ScreeningOutcome>> {
    let mut inputs = InputVector::new();
    let mut image_probs = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Multipart(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name == "image" {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::Multipart(e.to_string()))?;
            // Nenhum arquivo selecionado no formulário
            if bytes.is_empty() {
                continue;
            }
            tracing::info!(size_bytes = bytes.len(), "imagem recebida para predição");
            image_probs = match state
                .predictor
                .predict(&bytes)
                .and_then(|probs| check_predictions(&probs).map(|()| probs))
            {
                Ok(probs) => Some(probs),
                Err(e) => {
                    tracing::warn!(error = %e, "predição de imagem falhou, seguindo sem ela");
                    None
                }
            };
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| ApiError::Multipart(e.to_string()))?;
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        let value: f64 = text.parse().map_err(|_| ApiError::InvalidField {
            field: name.clone(),
            reason: format!("'{text}' não é um número"),
        })?;
        if inputs.contains(&name) {
            tracing::warn!(field = %name, "campo repetido no formulário, último valor vence");
        }
        inputs.insert(name, value);
    }

    let outcome = state
        .orchestrator
        .lock()
        .start(&inputs, image_probs.as_ref())?;
    Ok(Json(outcome))
}

/// GET `/consultations/{id}`
pub async fn get_consultation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Consultation>> {
    let orchestrator = state.orchestrator.lock();
    let consultation = orchestrator
        .consultation(id)
        .cloned()
        .ok_or(crate::orchestrator::ConsultationError::NotFound(id))?;
    Ok(Json(consultation))
}

/// POST `/consultations/{id}/confirm` — diagnóstico final da consulta.
pub async fn confirm_consultation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<InputsRequest>,
) -> ApiResult<Json<Diagnosis>> {
    let diagnosis = state.orchestrator.lock().confirm(id, &req.inputs)?;
    log_diagnosis(&state, Some(id), &diagnosis).await;
    Ok(Json(diagnosis))
}

/// POST `/diagnose` — encadeamento direto, sem consulta.
pub async fn diagnose(
    State(state): State<AppState>,
    Json(req): Json<InputsRequest>,
) -> ApiResult<Json<Diagnosis>> {
    let diagnosis = state.orchestrator.lock().diagnose_once(&req.inputs)?;
    log_diagnosis(&state, None, &diagnosis).await;
    Ok(Json(diagnosis))
}

/// Grava o registro numa thread de bloqueio. Falha no log não derruba a resposta.
async fn log_diagnosis(state: &AppState, consultation: Option<Uuid>, diagnosis: &Diagnosis) {
    let record = DiagnosisLogRecord::new(consultation, diagnosis);
    let dir = state.config.log_dir.clone();
    let written = tokio::task::spawn_blocking(move || {
        persistence::append_diagnosis_log(&dir, &record)
    })
    .await;
    match written {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!(error = %e, "Falha ao gravar log de diagnóstico"),
        Err(e) => tracing::error!(error = %e, "Task de log de diagnóstico abortada"),
    }
}
