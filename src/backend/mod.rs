//! Ports to the backend-as-a-service platform.
//!
//! The actions talk to two external services:
//! - the user [`Directory`] (create, list and fetch users)
//! - the [`DocumentStore`] holding patient documents
//!
//! Both are traits so the actions can be handed a real HTTP client
//! ([`AppwriteClient`]) or a fake in tests.

pub mod appwrite;
pub mod error;
#[cfg(test)]
pub(crate) mod memory;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::models::User;

pub use appwrite::{AppwriteClient, DEFAULT_TIMEOUT};
pub use error::BackendError;

/// A single filter or modifier applied to a list request.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Attribute equals any of the given values.
    Equal {
        attribute: String,
        values: Vec<String>,
    },
    /// At most this many results.
    Limit(u32),
}

impl Query {
    pub fn equal<I, S>(attribute: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Query::Equal {
            attribute: attribute.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn limit(limit: u32) -> Self {
        Query::Limit(limit)
    }

    /// JSON form sent in `queries[]` parameters.
    pub fn to_wire(&self) -> String {
        match self {
            Query::Equal { attribute, values } => json!({
                "method": "equal",
                "attribute": attribute,
                "values": values,
            }),
            Query::Limit(limit) => json!({
                "method": "limit",
                "values": [limit],
            }),
        }
        .to_string()
    }
}

/// Identity a permission is granted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    User(String),
}

impl Role {
    pub fn user(user_id: impl Into<String>) -> Self {
        Role::User(user_id.into())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User(id) => write!(f, "user:{}", id),
        }
    }
}

/// Access-control grant attached to a document or used to scope a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Permission {
    Read(Role),
}

impl Permission {
    pub fn read(role: Role) -> Self {
        Permission::Read(role)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Permission::Read(role) => write!(f, "read(\"{}\")", role),
        }
    }
}

/// Addresses a collection inside a database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionRef {
    pub database_id: String,
    pub collection_id: String,
}

impl CollectionRef {
    pub fn new(database_id: impl Into<String>, collection_id: impl Into<String>) -> Self {
        Self {
            database_id: database_id.into(),
            collection_id: collection_id.into(),
        }
    }
}

/// Body of a create-user request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDirectoryUser {
    pub user_id: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Page of users returned by a list request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserList {
    pub total: u64,
    pub users: Vec<User>,
}

/// A stored document: system attributes plus the caller's fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "$updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(rename = "$permissions", default)]
    pub permissions: Vec<String>,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl Document {
    /// Decodes the document (system attributes included) into a typed record.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, BackendError> {
        let value = serde_json::to_value(self).map_err(|e| BackendError::Decode(e.to_string()))?;
        serde_json::from_value(value).map_err(|e| BackendError::Decode(e.to_string()))
    }

    /// True if `permission` was granted on this document.
    pub fn grants(&self, permission: &Permission) -> bool {
        let wanted = permission.to_string();
        self.permissions.iter().any(|p| *p == wanted)
    }
}

/// Result of a list request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DocumentList {
    pub total: u64,
    pub documents: Vec<Document>,
}

impl DocumentList {
    pub fn empty() -> Self {
        Self {
            total: 0,
            documents: Vec::new(),
        }
    }
}

/// User directory operations.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Creates a user. Fails with status 409 when the email is taken.
    async fn create_user(&self, user: &NewDirectoryUser) -> Result<User, BackendError>;

    async fn list_users(&self, queries: &[Query]) -> Result<UserList, BackendError>;

    /// Fetches a user by id. Fails with status 404 when unknown.
    async fn get_user(&self, user_id: &str) -> Result<User, BackendError>;
}

/// Document database operations.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn create_document(
        &self,
        collection: &CollectionRef,
        document_id: &str,
        data: Map<String, Value>,
        permissions: &[Permission],
    ) -> Result<Document, BackendError>;

    /// Lists documents matching `queries`. With a `scope`, only documents
    /// granting that permission are returned.
    async fn list_documents(
        &self,
        collection: &CollectionRef,
        queries: &[Query],
        scope: Option<&Permission>,
    ) -> Result<DocumentList, BackendError>;
}
