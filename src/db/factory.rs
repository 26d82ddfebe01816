//! Repository factory for dependency injection.
//!
//! Creates repository instances from runtime configuration. The production
//! deployment selects its backend here; tests and local development use the
//! in-memory store.

use std::sync::Arc;

use super::repositories::LocalRepository;
use super::repository::{FullRepository, RepositoryError, RepositoryResult};
use crate::config::EngineConfig;

/// Repository factory for creating repository instances.
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create an in-memory local repository.
    pub fn create_local() -> Arc<dyn FullRepository> {
        Arc::new(LocalRepository::new())
    }

    /// Create a repository from engine configuration.
    ///
    /// # Returns
    /// * `Ok(Arc<dyn FullRepository>)` - Repository instance
    /// * `Err(RepositoryError)` - If the configured backend is unknown
    pub fn from_config(config: &EngineConfig) -> RepositoryResult<Arc<dyn FullRepository>> {
        match config.repository.backend.to_lowercase().as_str() {
            "local" | "memory" => Ok(Self::create_local()),
            other => Err(RepositoryError::configuration(format!(
                "Unknown repository backend: {}",
                other
            ))),
        }
    }

    /// Create a repository from environment configuration.
    ///
    /// Reads `MEETX_REPOSITORY` (defaults to `local`).
    pub fn from_env() -> RepositoryResult<Arc<dyn FullRepository>> {
        let backend = std::env::var("MEETX_REPOSITORY").unwrap_or_else(|_| "local".to_string());
        match backend.to_lowercase().as_str() {
            "local" | "memory" => Ok(Self::create_local()),
            other => Err(RepositoryError::configuration(format!(
                "Unknown repository backend: {}",
                other
            ))),
        }
    }
}
