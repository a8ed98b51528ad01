//! Application state management
//!
//! This module provides the shared application state that is passed
//! to all request handlers via Axum's state extraction.
//!
//! # Design Principles
//!
//! 1. **Build collaborators once**: the HTTP client and fallback store are created at startup
//! 2. **Cheap cloning**: All fields use Arc or are already Clone-cheap
//! 3. **Isolated sessions**: each respondent's flow lives under its own id

use crate::config::AppConfig;
use crate::services::{DeliveryError, LeadSubmitter, SessionStore};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Per-respondent assessment sessions
    pub sessions: SessionStore,
    /// Lead delivery with local fallback
    pub leads: Arc<LeadSubmitter>,
}

impl AppState {
    /// Create state with a lead submitter built from the config
    pub async fn new(config: AppConfig) -> Result<Self, DeliveryError> {
        let leads = LeadSubmitter::from_config(&config.lead).await?;
        Ok(Self::with_submitter(config, leads))
    }

    pub fn with_submitter(config: AppConfig, leads: LeadSubmitter) -> Self {
        let sessions = SessionStore::with_timeouts(
            config.session.idle_timeout(),
            config.session.cleanup_interval(),
        );
        Self {
            config: Arc::new(config),
            sessions,
            leads: Arc::new(leads),
        }
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[inline]
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    #[inline]
    pub fn leads(&self) -> &LeadSubmitter {
        &self.leads
    }
}
