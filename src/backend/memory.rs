//! In-memory directory and document store for tests.
//!
//! Failures can be queued per operation to script flaky backends.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};

use super::{
    BackendError, CollectionRef, Directory, Document, DocumentList, DocumentStore,
    NewDirectoryUser, Permission, Query, UserList,
};
use crate::models::User;

/// Scripted outcome for the next `list_documents` call.
#[derive(Debug, Clone)]
pub(crate) enum ListOutcome {
    Fail(BackendError),
    Empty,
}

#[derive(Default)]
pub(crate) struct MemoryBackend {
    users: Mutex<Vec<User>>,
    documents: Mutex<Vec<(CollectionRef, Document)>>,
    create_user_failures: Mutex<VecDeque<BackendError>>,
    get_user_failures: Mutex<VecDeque<BackendError>>,
    create_document_failures: Mutex<VecDeque<BackendError>>,
    list_outcomes: Mutex<VecDeque<ListOutcome>>,
    list_document_calls: AtomicU32,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&self, id: &str, email: &str) -> User {
        let user = User {
            id: id.to_string(),
            created_at: Some(Utc::now()),
            name: String::new(),
            email: email.to_string(),
            phone: String::new(),
            status: true,
            email_verification: false,
            phone_verification: false,
            labels: Vec::new(),
        };
        self.users.lock().unwrap().push(user.clone());
        user
    }

    pub fn insert_document(&self, collection: &CollectionRef, document: Document) {
        self.documents
            .lock()
            .unwrap()
            .push((collection.clone(), document));
    }

    pub fn fail_create_user(&self, err: BackendError) {
        self.create_user_failures.lock().unwrap().push_back(err);
    }

    pub fn fail_get_user(&self, err: BackendError) {
        self.get_user_failures.lock().unwrap().push_back(err);
    }

    pub fn fail_create_document(&self, err: BackendError) {
        self.create_document_failures.lock().unwrap().push_back(err);
    }

    pub fn push_list_outcome(&self, outcome: ListOutcome) {
        self.list_outcomes.lock().unwrap().push_back(outcome);
    }

    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    pub fn document_count(&self) -> usize {
        self.documents.lock().unwrap().len()
    }

    pub fn list_document_calls(&self) -> u32 {
        self.list_document_calls.load(Ordering::SeqCst)
    }
}

fn attribute_value(fields: &Map<String, Value>, attribute: &str) -> Option<String> {
    match fields.get(attribute)? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Applies equality filters, then the permission scope, then the limit.
/// Returns the match count before the limit.
fn apply_queries<T, F, S>(items: Vec<T>, queries: &[Query], in_scope: S, fields: F) -> (u64, Vec<T>)
where
    F: Fn(&T) -> Map<String, Value>,
    S: Fn(&T) -> bool,
{
    let mut matched: Vec<T> = items
        .into_iter()
        .filter(|item| {
            let fields = fields(item);
            queries.iter().all(|q| match q {
                Query::Equal { attribute, values } => attribute_value(&fields, attribute)
                    .map(|v| values.contains(&v))
                    .unwrap_or(false),
                Query::Limit(_) => true,
            })
        })
        .filter(|item| in_scope(item))
        .collect();

    let total = matched.len() as u64;
    for query in queries {
        if let Query::Limit(limit) = query {
            matched.truncate(*limit as usize);
        }
    }
    (total, matched)
}

fn user_fields(user: &User) -> Map<String, Value> {
    match serde_json::to_value(user) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

fn document_fields(document: &Document) -> Map<String, Value> {
    let mut fields = document.data.clone();
    fields.insert("$id".to_string(), Value::String(document.id.clone()));
    fields
}

#[async_trait]
impl Directory for MemoryBackend {
    async fn create_user(&self, request: &NewDirectoryUser) -> Result<User, BackendError> {
        if let Some(err) = self.create_user_failures.lock().unwrap().pop_front() {
            return Err(err);
        }

        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == request.email) {
            return Err(BackendError::Status {
                status: 409,
                kind: Some("user_already_exists".to_string()),
                message: "A user with the same id, email, or phone already exists".to_string(),
            });
        }

        let user = User {
            id: request.user_id.clone(),
            created_at: Some(Utc::now()),
            name: request.name.clone().unwrap_or_default(),
            email: request.email.clone(),
            phone: request.phone.clone(),
            status: true,
            email_verification: false,
            phone_verification: false,
            labels: Vec::new(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn list_users(&self, queries: &[Query]) -> Result<UserList, BackendError> {
        let users = self.users.lock().unwrap().clone();
        let (total, users) = apply_queries(users, queries, |_| true, user_fields);
        Ok(UserList { total, users })
    }

    async fn get_user(&self, user_id: &str) -> Result<User, BackendError> {
        if let Some(err) = self.get_user_failures.lock().unwrap().pop_front() {
            return Err(err);
        }

        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or_else(|| BackendError::status(404, "User with the requested ID could not be found."))
    }
}

#[async_trait]
impl DocumentStore for MemoryBackend {
    async fn create_document(
        &self,
        collection: &CollectionRef,
        document_id: &str,
        data: Map<String, Value>,
        permissions: &[Permission],
    ) -> Result<Document, BackendError> {
        if let Some(err) = self.create_document_failures.lock().unwrap().pop_front() {
            return Err(err);
        }

        let now = Utc::now();
        let document = Document {
            id: document_id.to_string(),
            created_at: Some(now),
            updated_at: Some(now),
            permissions: permissions.iter().map(ToString::to_string).collect(),
            data,
        };
        self.insert_document(collection, document.clone());
        Ok(document)
    }

    async fn list_documents(
        &self,
        collection: &CollectionRef,
        queries: &[Query],
        scope: Option<&Permission>,
    ) -> Result<DocumentList, BackendError> {
        self.list_document_calls.fetch_add(1, Ordering::SeqCst);

        match self.list_outcomes.lock().unwrap().pop_front() {
            Some(ListOutcome::Fail(err)) => return Err(err),
            Some(ListOutcome::Empty) => return Ok(DocumentList::empty()),
            None => {}
        }

        let documents: Vec<Document> = self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| c == collection)
            .map(|(_, d)| d.clone())
            .collect();

        // Same order as the HTTP client: filters, then scope, then limit.
        let (total, documents) = apply_queries(
            documents,
            queries,
            |d: &Document| scope.map(|p| d.grants(p)).unwrap_or(true),
            document_fields,
        );
        Ok(DocumentList { total, documents })
    }
}
