//! # Módulo Web — API JSON do Motor de Diagnóstico
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │ Axum Router (este módulo)                                   │
//! │  ├── GET  /status                      → contagens          │
//! │  ├── GET  /symptoms                    → catálogo           │
//! │  ├── GET  /rules                       → repositório        │
//! │  ├── PUT  /rules                       → substitui regras   │
//! │  ├── POST /consultations               → triagem (JSON)     │
//! │  ├── POST /consultations/upload        → triagem (multipart)│
//! │  ├── GET  /consultations/{id}          → estado da consulta │
//! │  ├── POST /consultations/{id}/confirm  → diagnóstico final  │
//! │  └── POST /diagnose                    → diagnóstico direto │
//! ├─────────────────────────────────────────────────────────────┤
//! │ TraceLayer + CorsLayer                                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! | Módulo | Responsabilidade |
//! |--------|------------------|
//! | [`state`] | Estado compartilhado (`AppState`) |
//! | [`handlers`] | Handlers Axum |
//! | [`error`] | `ApiError` → resposta JSON |

pub mod error;
pub mod handlers;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use state::AppState;

/// Limite de tamanho do upload multipart (imagem + campos).
const UPLOAD_LIMIT_BYTES: usize = 10 * 1024 * 1024;

/// Cria o router Axum com todas as rotas da aplicação.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/status", get(handlers::status))
        .route("/symptoms", get(handlers::list_symptoms))
        .route("/rules", get(handlers::get_rules).put(handlers::replace_rules))
        .route("/consultations", post(handlers::start_consultation))
        .route(
            "/consultations/upload",
            post(handlers::upload_consultation).layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES)),
        )
        .route("/consultations/{id}", get(handlers::get_consultation))
        .route(
            "/consultations/{id}/confirm",
            post(handlers::confirm_consultation),
        )
        .route("/diagnose", post(handlers::diagnose))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
