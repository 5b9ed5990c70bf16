//! Server-side actions for users and patients.
//!
//! All actions are methods on [`ActionContext`], which holds the backend
//! handles they call. Every action returns an [`ActionResult`](crate::ActionResult)
//! except [`ActionContext::verify_patient_read_permission`], which keeps a
//! plain boolean contract.

mod patients;
mod users;

use std::sync::Arc;

use crate::backend::{AppwriteClient, BackendError, CollectionRef, Directory, DocumentStore};
use crate::config::BackendSettings;
use crate::retry::RetryPolicy;

#[derive(Clone)]
pub struct ActionContext {
    directory: Arc<dyn Directory>,
    documents: Arc<dyn DocumentStore>,
    patients: CollectionRef,
    retry: RetryPolicy,
}

impl ActionContext {
    pub fn new(
        directory: Arc<dyn Directory>,
        documents: Arc<dyn DocumentStore>,
        patients: CollectionRef,
    ) -> Self {
        Self {
            directory,
            documents,
            patients,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Builds a context backed by a single HTTP client.
    pub fn from_settings(settings: &BackendSettings) -> Result<Self, BackendError> {
        let client = Arc::new(AppwriteClient::new(
            settings.endpoint.clone(),
            settings.project_id.clone(),
            settings.api_key.clone(),
            settings.timeout,
        )?);

        Ok(Self::new(client.clone(), client, settings.patients.clone()).with_retry(settings.retry))
    }

    /// Returns the patient collection this context writes to.
    pub fn patients(&self) -> &CollectionRef {
        &self.patients
    }
}
