//! services/web/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use crate::web::token::TokenSigner;
use std::sync::Arc;
use summarizer_core::dispatch::ModelRegistry;
use summarizer_core::ports::{DatabaseService, MailService};

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub config: Arc<Config>,
    pub models: ModelRegistry,
    pub mailer: Arc<dyn MailService>,
    pub signer: TokenSigner,
}

impl AppState {
    pub fn new(
        db: Arc<dyn DatabaseService>,
        config: Arc<Config>,
        models: ModelRegistry,
        mailer: Arc<dyn MailService>,
    ) -> Self {
        let signer = TokenSigner::new(&config.secret_key, config.confirmation_max_age_secs);
        Self {
            db,
            config,
            models,
            mailer,
            signer,
        }
    }
}
