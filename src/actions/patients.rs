use serde_json::Value;
use uuid::Uuid;

use super::ActionContext;
use crate::backend::{Permission, Query, Role};
use crate::error::{ActionError, ActionResult};
use crate::models::{Patient, RegisterPatientParams};
use crate::retry::{retry_query, RetryExhausted};

impl ActionContext {
    /// Stores a new patient document owned by `params.details.user_id`.
    ///
    /// Always creates a fresh document; nothing stops a second registration
    /// for the same user. The identification document fields are stored as
    /// null whatever the caller passed, and read access is granted to the
    /// owning user.
    pub async fn register_patient(&self, params: &RegisterPatientParams) -> ActionResult<Patient> {
        let user_id = &params.details.user_id;
        tracing::info!("Registering patient for user {}", user_id);
        tracing::debug!("Registration payload: {:?}", params.details);

        let value = serde_json::to_value(&params.details)
            .map_err(|e| ActionError::InvalidInput(e.to_string()))?;
        let Value::Object(mut data) = value else {
            return Err(ActionError::InvalidInput(
                "patient details must serialize to an object".to_string(),
            ));
        };
        data.insert("identificationDocumentId".to_string(), Value::Null);
        data.insert("identificationDocumentUrl".to_string(), Value::Null);

        let document_id = Uuid::new_v4().simple().to_string();
        let permissions = [Permission::read(Role::user(user_id.as_str()))];

        let document = self
            .documents
            .create_document(&self.patients, &document_id, data, &permissions)
            .await
            .map_err(|e| {
                tracing::error!("An error occurred while creating a new patient: {}", e);
                ActionError::from_backend(
                    format!(
                        "collection {}/{}",
                        self.patients.database_id, self.patients.collection_id
                    ),
                    e,
                )
            })?;

        let patient: Patient = document.decode().map_err(ActionError::Fatal)?;
        tracing::info!("New patient registered: {}", patient.id);
        Ok(patient)
    }

    /// Checks whether `user_id` can read at least one patient document
    /// that belongs to them.
    pub async fn check_patient_read_permission(&self, user_id: &str) -> ActionResult<bool> {
        let scope = Permission::read(Role::user(user_id));
        let result = self
            .documents
            .list_documents(
                &self.patients,
                &[Query::equal("userId", [user_id]), Query::limit(1)],
                Some(&scope),
            )
            .await
            .map_err(|e| ActionError::from_backend(format!("patient of user {}", user_id), e))?;

        tracing::debug!("Permission check result: {} document(s)", result.total);
        Ok(result.total > 0)
    }

    /// Like [`check_patient_read_permission`](Self::check_patient_read_permission),
    /// but any failure reads as "no permission".
    pub async fn verify_patient_read_permission(&self, user_id: &str) -> bool {
        match self.check_patient_read_permission(user_id).await {
            Ok(allowed) => allowed,
            Err(e) => {
                tracing::error!("Error checking permissions: {}", e);
                false
            }
        }
    }

    /// Fetches the patient record of `user_id`.
    ///
    /// The lookup is retried while it fails or matches nothing (see
    /// [`crate::retry`]). Returns `Ok(None)` when no document shows up
    /// within the attempt budget.
    pub async fn get_patient(&self, user_id: &str) -> ActionResult<Option<Patient>> {
        tracing::info!("Fetching patient for user {}", user_id);

        let queries = [Query::equal("userId", [user_id])];
        let documents = &self.documents;
        let patients = &self.patients;
        let queries = &queries;

        let result = retry_query(&self.retry, move || {
            documents.list_documents(patients, queries, None)
        })
        .await;

        match result {
            Ok(list) => {
                tracing::debug!("Patients found: {}", list.documents.len());
                match list.documents.first() {
                    Some(document) => {
                        let patient: Patient = document.decode().map_err(|e| {
                            tracing::error!("Stored patient document is malformed: {}", e);
                            ActionError::Fatal(e)
                        })?;
                        Ok(Some(patient))
                    }
                    None => {
                        tracing::warn!("No patient found for user {}", user_id);
                        Ok(None)
                    }
                }
            }
            Err(RetryExhausted {
                attempts,
                last_error: None,
            }) => {
                tracing::warn!(
                    "No patient found for user {} after {} attempt(s)",
                    user_id,
                    attempts
                );
                Ok(None)
            }
            Err(RetryExhausted {
                attempts,
                last_error: Some(e),
            }) => {
                tracing::error!(
                    "An error occurred while retrieving the patient details: {}",
                    e
                );
                Err(ActionError::RetriesExhausted {
                    attempts,
                    last_error: Some(e),
                })
            }
        }
    }
}
