//! CarePulse patient actions
//!
//! Creates and looks up users and patient records held by an Appwrite
//! backend (user directory + document database).

pub mod actions;
pub mod backend;
pub mod config;
pub mod error;
pub mod models;
pub mod retry;

pub use actions::ActionContext;
pub use backend::{
    AppwriteClient, BackendError, CollectionRef, Directory, Document, DocumentList,
    DocumentStore, Permission, Query, Role,
};
pub use config::{BackendSettings, Config, ConfigError, ConfigSource, ConfigValue};
pub use error::{ActionError, ActionResult, ErrorKind};
pub use models::{CreateUserParams, Gender, Patient, PatientDetails, RegisterPatientParams, User};
pub use retry::{retry_query, retry_until, RetryExhausted, RetryPolicy};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
