//! HTTP client for the Appwrite REST API.
//!
//! Every request carries the project id and server API key headers;
//! bodies and responses are JSON.

use std::borrow::Cow;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

use super::error::ErrorBody;
use super::{
    BackendError, CollectionRef, Directory, Document, DocumentList, DocumentStore,
    NewDirectoryUser, Permission, Query, UserList,
};
use crate::models::User;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct AppwriteClient {
    http: reqwest::Client,
    endpoint: String,
    project_id: String,
    api_key: String,
}

impl AppwriteClient {
    /// Creates a client for `endpoint` (e.g. `https://cloud.appwrite.io/v1`).
    pub fn new(
        endpoint: impl Into<String>,
        project_id: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
            project_id: project_id.into(),
            api_key: api_key.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.endpoint.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn documents_path(collection: &CollectionRef) -> Result<String, BackendError> {
        Ok(format!(
            "databases/{}/collections/{}/documents",
            segment(&collection.database_id)?,
            segment(&collection.collection_id)?
        ))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .header("X-Appwrite-Project", &self.project_id)
            .header("X-Appwrite-Key", &self.api_key)
    }

    fn query_params<'a>(queries: impl IntoIterator<Item = &'a Query>) -> Vec<(&'static str, String)> {
        queries.into_iter().map(|q| ("queries[]", q.to_wire())).collect()
    }

    /// Sends the request and decodes a JSON response, mapping error bodies
    /// to [`BackendError::Status`].
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, BackendError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let (kind, message) = match serde_json::from_str::<ErrorBody>(&text) {
                Ok(body) => (body.kind, body.message),
                Err(_) => (None, text),
            };
            tracing::debug!("{} {:?}: {}", status, kind, message);
            return Err(BackendError::Status {
                status: status.as_u16(),
                kind,
                message,
            });
        }

        Ok(response.json().await?)
    }
}

/// Percent-encodes an identifier for use as a single path segment.
fn segment(id: &str) -> Result<Cow<'_, str>, BackendError> {
    if id.is_empty() || id == "." || id == ".." {
        return Err(BackendError::InvalidId(id.to_string()));
    }
    Ok(urlencoding::encode(id))
}

#[async_trait]
impl Directory for AppwriteClient {
    async fn create_user(&self, user: &NewDirectoryUser) -> Result<User, BackendError> {
        self.send(self.request(Method::POST, "users").json(user))
            .await
    }

    async fn list_users(&self, queries: &[Query]) -> Result<UserList, BackendError> {
        self.send(
            self.request(Method::GET, "users")
                .query(&Self::query_params(queries)),
        )
        .await
    }

    async fn get_user(&self, user_id: &str) -> Result<User, BackendError> {
        let path = format!("users/{}", segment(user_id)?);
        self.send(self.request(Method::GET, &path)).await
    }
}

#[async_trait]
impl DocumentStore for AppwriteClient {
    async fn create_document(
        &self,
        collection: &CollectionRef,
        document_id: &str,
        data: Map<String, Value>,
        permissions: &[Permission],
    ) -> Result<Document, BackendError> {
        let permissions: Vec<String> = permissions.iter().map(ToString::to_string).collect();
        let body = json!({
            "documentId": document_id,
            "data": data,
            "permissions": permissions,
        });

        self.send(
            self.request(Method::POST, &Self::documents_path(collection)?)
                .json(&body),
        )
        .await
    }

    async fn list_documents(
        &self,
        collection: &CollectionRef,
        queries: &[Query],
        scope: Option<&Permission>,
    ) -> Result<DocumentList, BackendError> {
        let path = Self::documents_path(collection)?;

        // A server key reads every document, so the scope is applied here.
        // The limit must then be applied after filtering, not by the server.
        let Some(permission) = scope else {
            return self
                .send(
                    self.request(Method::GET, &path)
                        .query(&Self::query_params(queries)),
                )
                .await;
        };

        let limit = queries.iter().find_map(|q| match q {
            Query::Limit(limit) => Some(*limit as usize),
            _ => None,
        });
        let unlimited = queries.iter().filter(|q| !matches!(q, Query::Limit(_)));

        let mut list: DocumentList = self
            .send(
                self.request(Method::GET, &path)
                    .query(&Self::query_params(unlimited)),
            )
            .await?;

        list.documents.retain(|d| d.grants(permission));
        list.total = list.documents.len() as u64;
        if let Some(limit) = limit {
            list.documents.truncate(limit);
        }

        Ok(list)
    }
}
