//! # CF Diagnosa — Diagnóstico de Doenças do Milho por Fatores de Certeza
//!
//! **Ponto de entrada principal** da aplicação.
//!
//! Um motor de regras com fatores de certeza (Shortliffe-Buchanan) estima
//! as doenças mais prováveis a partir das severidades de sintomas
//! informadas pelo usuário, opcionalmente combinadas com as
//! probabilidades de um classificador de imagem.
//!
//! ## Fluxo de Inicialização
//!
//! ```text
//! main()
//!   ├── Configura tracing/logging
//!   ├── Carrega configuração (data/config.json ou defaults)
//!   ├── Carrega regras + catálogo (data/rules.json, criado vazio se faltar)
//!   ├── Monta AppState e Router
//!   └── Inicia servidor TCP (bind_addr, padrão 0.0.0.0:3000)
//! ```
//!
//! ## Exemplo de Uso
//!
//! ```bash
//! # Executar com logs padrão (info)
//! cargo run
//!
//! # Executar com logs detalhados e outra porta
//! RUST_LOG=debug CF_BIND_ADDR=127.0.0.1:8080 cargo run
//! ```

/// Módulo `core` — tipos fundamentais: Rule, Condition, SymptomCatalog, InputVector.
mod core;

/// Módulo `config` — configuração da aplicação e do motor.
mod config;

/// Módulo `error` — erros de domínio compartilhados.
mod error;

/// Módulo `image` — contrato do classificador de imagem (stub).
mod image;

/// Módulo `inference` — motor de fatores de certeza (triagem, confirmação, ranking).
mod inference;

/// Módulo `orchestrator` — conduz consultas pelas duas etapas do motor.
mod orchestrator;

/// Módulo `persistence` — repositório de regras em JSON e log de diagnósticos.
mod persistence;

/// Módulo `web` — servidor web axum e handlers JSON.
mod web;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::image::StubPredictor;
use crate::web::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Aceita RUST_LOG para configurar o nível. Exemplo: RUST_LOG=debug cargo run
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("🌽 CF Diagnosa — Starting...");

    let config = config::load_config(Path::new(config::CONFIG_PATH))?;

    // Regras inválidas impedem a subida: o motor só recebe registros completos.
    let repository = persistence::load_repository(&config.rules_path)?;
    tracing::info!(
        rules = repository.rule_count(),
        symptoms = repository.symptom_count(),
        path = %config.rules_path.display(),
        "Repositório de regras carregado"
    );
    {
        let missing = repository.uncatalogued_symptoms(&config.engine.image_prefix);
        if !missing.is_empty() {
            tracing::warn!(symptoms = ?missing, "Regras citam sintomas fora do catálogo");
        }
    }

    let addr = config.bind_addr.clone();
    let state = AppState::new(config, repository, Arc::new(StubPredictor))?;
    let app = web::create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Falha ao fazer bind em {addr}"))?;
    tracing::info!("🚀 Server running at http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
