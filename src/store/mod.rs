// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Document store abstraction
//!
//! All persisted state lives in a schemaless document database addressed by
//! collection name and document id. The coordinator only needs a handful of
//! operations, captured by [`DocumentStore`]:
//!
//! - create a document with a store-assigned or caller-chosen id
//! - fetch a document by id
//! - merge fields into an existing document (fails if it does not exist)
//! - equality queries on a single field
//! - list a whole collection
//! - atomic integer increment of one field
//!
//! Two backends are provided: [`InMemoryStore`] for local development and
//! tests, and [`FirestoreStore`] which talks to Cloud Firestore over REST.
//! Writes are atomic per document only; nothing spans documents.

pub mod firestore;
pub mod memory;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub use firestore::{FirestoreConfig, FirestoreStore};
pub use memory::InMemoryStore;

/// Field map of a single document.
pub type Fields = serde_json::Map<String, Value>;

/// Collection names used by the coordinator.
pub mod collections {
    pub const VOLUNTEERS: &str = "volunteers";
    pub const TRAINING_JOBS: &str = "trainingJobs";
    pub const LOGIN_RECORDS: &str = "loginRecords";
    pub const COMPLETED_JOBS: &str = "completedJobs";
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("Document {collection}/{id} not found")]
    NotFound { collection: String, id: String },

    #[error("Document {collection}/{id} already exists")]
    AlreadyExists { collection: String, id: String },

    #[error("Failed to decode document {id}: {reason}")]
    Decode { id: String, reason: String },

    #[error("Store authentication failed: {0}")]
    Auth(String),

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// A stored document and its id.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Deserialize the document fields into a typed record.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        serde_json::from_value(Value::Object(self.fields.clone())).map_err(|e| StoreError::Decode {
            id: self.id.clone(),
            reason: e.to_string(),
        })
    }
}

/// Serialize a record into a field map. The record must serialize to a JSON object.
pub fn to_fields<T: Serialize>(record: &T) -> Result<Fields, StoreError> {
    match serde_json::to_value(record) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(other) => Err(StoreError::Decode {
            id: String::new(),
            reason: format!("expected an object, got {}", other),
        }),
        Err(e) => Err(StoreError::Decode {
            id: String::new(),
            reason: e.to_string(),
        }),
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a document and return the id the store assigned to it.
    async fn create(&self, collection: &str, fields: Fields) -> Result<String, StoreError>;

    /// Create a document under `id`.
    ///
    /// Returns [`StoreError::AlreadyExists`] when the id is taken.
    async fn insert(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Merge `fields` into an existing document.
    ///
    /// Returns [`StoreError::NotFound`] when the document does not exist.
    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError>;

    /// Documents whose `field` equals `value`, in store order.
    async fn find_equal(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
        limit: Option<usize>,
    ) -> Result<Vec<Document>, StoreError>;

    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    /// Atomically add `delta` to an integer field of an existing document.
    async fn increment(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        delta: i64,
    ) -> Result<(), StoreError>;
}
