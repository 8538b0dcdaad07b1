//! # Estado da Aplicação Web
//!
//! ```text
//! AppState
//!  ├── repository   Arc<RwLock<RuleRepository>>  (regras + catálogo)
//!  ├── orchestrator Arc<Mutex<Orchestrator>>     (consultas abertas)
//!  ├── predictor    Arc<dyn ImagePredictor>      (stub por enquanto)
//!  └── config       Arc<AppConfig>
//! ```
//!
//! O orquestrador guarda o mesmo `Arc` do repositório: substituir as
//! regras via `PUT /rules` vale para a próxima chamada ao motor.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::config::{AppConfig, ConfigError};
use crate::core::RuleRepository;
use crate::image::ImagePredictor;
use crate::inference::CfEngine;
use crate::orchestrator::Orchestrator;

/// Estado compartilhado da aplicação Axum.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<RwLock<RuleRepository>>,
    pub orchestrator: Arc<Mutex<Orchestrator>>,
    pub predictor: Arc<dyn ImagePredictor>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Falha apenas se o TTL configurado não couber em um `Duration`.
    pub fn new(
        config: AppConfig,
        repository: RuleRepository,
        predictor: Arc<dyn ImagePredictor>,
    ) -> Result<Self, ConfigError> {
        let repository = Arc::new(RwLock::new(repository));
        let orchestrator = Orchestrator::new(
            CfEngine::new(config.engine.clone()),
            repository.clone(),
            config.consultation_ttl()?,
        );
        Ok(Self {
            repository,
            orchestrator: Arc::new(Mutex::new(orchestrator)),
            predictor,
            config: Arc::new(config),
        })
    }
}
