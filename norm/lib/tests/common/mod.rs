//! In-memory `NotionApi` for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use norm_lib::client::{DatabaseDescriptor, NotionApi, Page, QueryResponse};
use norm_lib::error::RemoteError;
use serde_json::{Value, json};

/// Serves canned databases, pages and query results, counting every call.
#[derive(Default)]
pub struct MockNotion {
    databases: HashMap<String, DatabaseDescriptor>,
    pages: HashMap<String, Page>,
    results: Vec<Page>,
    next_cursor: Option<String>,
    /// Database ids that fail with the given HTTP status.
    failing_databases: HashMap<String, u16>,
    /// `(code, message)` returned for every query.
    query_error: Option<(String, String)>,
    unauthorized: bool,
    pub database_calls: AtomicUsize,
    pub query_calls: AtomicUsize,
    pub page_calls: AtomicUsize,
    queries: Mutex<Vec<Value>>,
    database_requests: Mutex<Vec<String>>,
}

impl MockNotion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a database with `(name, type)` properties.
    pub fn with_database(mut self, id: &str, properties: &[(&str, &str)]) -> Self {
        let properties: serde_json::Map<String, Value> = properties
            .iter()
            .map(|(name, kind)| {
                let mut property = json!({ "id": name, "name": name, "type": kind });
                property[*kind] = json!({});
                (name.to_string(), property)
            })
            .collect();
        let descriptor = serde_json::from_value(json!({
            "object": "database",
            "id": id,
            "title": [{ "plain_text": format!("{id} title") }],
            "properties": properties,
        }))
        .unwrap();
        self.databases.insert(id.to_string(), descriptor);
        self
    }

    pub fn with_failing_database(mut self, id: &str, status: u16) -> Self {
        self.failing_databases.insert(id.to_string(), status);
        self
    }

    pub fn unauthorized(mut self) -> Self {
        self.unauthorized = true;
        self
    }

    /// Registers a page retrievable by id.
    pub fn with_page(mut self, page: Value) -> Self {
        let page: Page = serde_json::from_value(page).unwrap();
        self.pages.insert(page.id.clone(), page);
        self
    }

    /// Sets the results every query returns.
    pub fn with_results(mut self, results: Vec<Value>) -> Self {
        self.results = results
            .into_iter()
            .map(|p| serde_json::from_value(p).unwrap())
            .collect();
        self
    }

    pub fn with_next_cursor(mut self, cursor: &str) -> Self {
        self.next_cursor = Some(cursor.to_string());
        self
    }

    pub fn rejecting_queries(mut self, code: &str, message: &str) -> Self {
        self.query_error = Some((code.to_string(), message.to_string()));
        self
    }

    /// Query bodies received, in order.
    pub fn queries(&self) -> Vec<Value> {
        self.queries.lock().unwrap().clone()
    }

    /// Database ids requested, in order.
    pub fn database_requests(&self) -> Vec<String> {
        self.database_requests.lock().unwrap().clone()
    }

    pub fn total_calls(&self) -> usize {
        self.database_calls.load(Ordering::SeqCst)
            + self.query_calls.load(Ordering::SeqCst)
            + self.page_calls.load(Ordering::SeqCst)
    }
}

impl NotionApi for MockNotion {
    async fn retrieve_database(&self, database_id: &str) -> Result<DatabaseDescriptor, RemoteError> {
        self.database_calls.fetch_add(1, Ordering::SeqCst);
        self.database_requests
            .lock()
            .unwrap()
            .push(database_id.to_string());

        if self.unauthorized {
            return Err(RemoteError::Unauthorized {
                message: "API token is invalid.".to_string(),
            });
        }
        if let Some(status) = self.failing_databases.get(database_id) {
            return Err(RemoteError::HttpStatus {
                status: *status,
                code: "internal_server_error".to_string(),
                message: "boom".to_string(),
            });
        }
        self.databases
            .get(database_id)
            .cloned()
            .ok_or_else(|| RemoteError::NotFound {
                object: "database",
                id: database_id.to_string(),
            })
    }

    async fn query_database(&self, query: &Value) -> Result<QueryResponse, RemoteError> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.clone());

        if let Some((code, message)) = &self.query_error {
            return Err(RemoteError::Validation {
                code: code.clone(),
                message: message.clone(),
            });
        }
        Ok(QueryResponse {
            results: self.results.clone(),
            next_cursor: self.next_cursor.clone(),
            has_more: self.next_cursor.is_some(),
        })
    }

    async fn retrieve_page(&self, page_id: &str) -> Result<Page, RemoteError> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        self.pages.get(page_id).cloned().ok_or_else(|| RemoteError::NotFound {
            object: "page",
            id: page_id.to_string(),
        })
    }
}

/// A page with the given raw properties.
pub fn page(id: &str, properties: Value) -> Value {
    json!({
        "object": "page",
        "id": id,
        "created_time": "2024-05-01T10:00:00.000Z",
        "last_edited_time": "2024-05-02T10:00:00.000Z",
        "properties": properties,
    })
}

pub fn title(text: &str) -> Value {
    json!({ "type": "title", "title": [{ "plain_text": text }] })
}

pub fn checkbox(value: bool) -> Value {
    json!({ "type": "checkbox", "checkbox": value })
}

pub fn relation(ids: &[&str]) -> Value {
    let refs: Vec<Value> = ids.iter().map(|id| json!({ "id": id })).collect();
    json!({ "type": "relation", "relation": refs })
}

pub fn rich_text(text: &str) -> Value {
    json!({ "type": "rich_text", "rich_text": [{ "plain_text": text }] })
}
