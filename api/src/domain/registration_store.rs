use crate::domain::new_registration::{NewRegistration, RegistrationId};
use crate::utils::error_chain_fmt;
use async_trait::async_trait;
use std::time::Duration;

/// The only failure that aborts a registration.
#[derive(thiserror::Error)]
pub enum PersistenceError {
    #[error("The registration store did not answer within {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

#[async_trait]
pub trait RegistrationStore {
    /// Persist a new, immutable registration record and return its generated id.
    ///
    /// Every call writes a new record; duplicates are never merged.
    async fn create(
        &self,
        registration: &NewRegistration,
    ) -> Result<RegistrationId, PersistenceError>;
}
