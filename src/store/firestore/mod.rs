// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Cloud Firestore backend (REST v1)
//!
//! Mirrors the Firebase Admin SDK calls the coordinator relies on:
//! `collection.add`, `doc.get`, `doc.update`, `where(field, '==', value)` and
//! `FieldValue.increment`. When `emulator_host` is set, requests go to the
//! local emulator without OAuth.

pub mod auth;
pub mod value;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing::debug;

use self::auth::{ServiceAccount, TokenSource};
use self::value::{decode_document, encode_fields, encode_value};
use super::{Document, DocumentStore, Fields, StoreError};

const FIRESTORE_HOST: &str = "https://firestore.googleapis.com";

#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    pub project_id: String,
    pub database: String,
    pub service_account: Option<ServiceAccount>,
    /// `host:port` of a Firestore emulator.
    pub emulator_host: Option<String>,
}

impl FirestoreConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            database: "(default)".to_string(),
            service_account: None,
            emulator_host: None,
        }
    }

    /// Resource name of the documents root, e.g. `projects/p/databases/(default)/documents`.
    pub fn documents_root(&self) -> String {
        format!(
            "projects/{}/databases/{}/documents",
            self.project_id, self.database
        )
    }

    pub fn base_url(&self) -> String {
        match &self.emulator_host {
            Some(host) => format!("http://{}/v1/{}", host, self.documents_root()),
            None => format!("{}/v1/{}", FIRESTORE_HOST, self.documents_root()),
        }
    }
}

pub struct FirestoreStore {
    config: FirestoreConfig,
    base_url: String,
    http: reqwest::Client,
    tokens: Option<TokenSource>,
}

impl FirestoreStore {
    pub fn new(config: FirestoreConfig) -> Result<Self, StoreError> {
        let http = reqwest::Client::new();
        let tokens = match (&config.emulator_host, &config.service_account) {
            (Some(_), _) => None,
            (None, Some(account)) => Some(TokenSource::new(account.clone(), http.clone())?),
            (None, None) => {
                return Err(StoreError::Auth(
                    "Firestore requires a service account unless an emulator host is set"
                        .to_string(),
                ))
            }
        };

        Ok(Self {
            base_url: config.base_url(),
            config,
            http,
            tokens,
        })
    }

    async fn authorize(&self, request: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder, StoreError> {
        match &self.tokens {
            Some(tokens) => Ok(request.bearer_auth(tokens.access_token().await?)),
            // The emulator accepts the literal "owner" token as an admin credential.
            None => Ok(request.bearer_auth("owner")),
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, StoreError> {
        self.authorize(request)
            .await?
            .send()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    /// REST url of one document, with `id` percent-encoded as a path segment.
    fn document_url(&self, collection: &str, id: &str) -> Result<url::Url, StoreError> {
        let mut url = url::Url::parse(&self.base_url)
            .map_err(|e| StoreError::Backend(format!("invalid Firestore url: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| StoreError::Backend("Firestore url cannot have a path".to_string()))?
            .push(collection)
            .push(id);
        Ok(url)
    }

    fn document_name(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.config.documents_root(), collection, id)
    }

    async fn run_query(&self, structured_query: Value) -> Result<Vec<Document>, StoreError> {
        let url = format!("{}:runQuery", self.base_url);
        let body = json!({ "structuredQuery": structured_query });
        let response = self.send(self.http.post(&url).json(&body)).await?;
        let rows: Vec<Value> = parse_json(check_status(response).await?).await?;

        rows.iter()
            .filter_map(|row| row.get("document"))
            .map(decode_document)
            .collect()
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(StoreError::Auth(format!("{}: {}", status, body)))
        }
        _ => Err(StoreError::Backend(format!("{}: {}", status, body))),
    }
}

async fn parse_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T, StoreError> {
    response
        .json()
        .await
        .map_err(|e| StoreError::Backend(format!("invalid response body: {}", e)))
}

/// Structured query selecting documents of `collection` where `field == value`.
pub fn equality_query(collection: &str, field: &str, value: &Value, limit: Option<usize>) -> Value {
    let mut query = json!({
        "from": [{ "collectionId": collection }],
        "where": {
            "fieldFilter": {
                "field": { "fieldPath": field },
                "op": "EQUAL",
                "value": encode_value(value),
            }
        }
    });
    if let Some(limit) = limit {
        query["limit"] = json!(limit);
    }
    query
}

/// Query params for a merge-update of exactly `fields` that fails when the document is missing.
pub fn update_params(fields: &Fields) -> Vec<(&'static str, String)> {
    let mut params: Vec<(&'static str, String)> = fields
        .keys()
        .map(|k| ("updateMask.fieldPaths", k.clone()))
        .collect();
    params.push(("currentDocument.exists", "true".to_string()));
    params
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn create(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        let url = format!("{}/{}", self.base_url, collection);
        let body = json!({ "fields": encode_fields(&fields) });
        let response = self.send(self.http.post(&url).json(&body)).await?;
        let resource: Value = parse_json(check_status(response).await?).await?;
        let doc = decode_document(&resource)?;
        debug!(collection, id = %doc.id, "Created Firestore document");
        Ok(doc.id)
    }

    async fn insert(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        let url = format!("{}/{}", self.base_url, collection);
        let body = json!({ "fields": encode_fields(&fields) });
        let request = self
            .http
            .post(&url)
            .query(&[("documentId", id)])
            .json(&body);
        let response = self.send(request).await?;
        if response.status() == StatusCode::CONFLICT {
            return Err(StoreError::AlreadyExists {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        check_status(response).await?;
        debug!(collection, id, "Created Firestore document");
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let url = self.document_url(collection, id)?;
        let response = self.send(self.http.get(url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resource: Value = parse_json(check_status(response).await?).await?;
        decode_document(&resource).map(Some)
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        let url = self.document_url(collection, id)?;
        let body = json!({ "fields": encode_fields(&fields) });
        let request = self
            .http
            .patch(url)
            .query(&update_params(&fields))
            .json(&body);
        let response = self.send(request).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        check_status(response).await?;
        Ok(())
    }

    async fn find_equal(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
        limit: Option<usize>,
    ) -> Result<Vec<Document>, StoreError> {
        self.run_query(equality_query(collection, field, value, limit))
            .await
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        self.run_query(json!({ "from": [{ "collectionId": collection }] }))
            .await
    }

    async fn increment(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        delta: i64,
    ) -> Result<(), StoreError> {
        let url = format!("{}:commit", self.base_url);
        let body = json!({
            "writes": [{
                "transform": {
                    "document": self.document_name(collection, id),
                    "fieldTransforms": [{
                        "fieldPath": field,
                        "increment": { "integerValue": delta.to_string() }
                    }]
                },
                "currentDocument": { "exists": true }
            }]
        });
        let response = self.send(self.http.post(&url).json(&body)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        check_status(response).await?;
        Ok(())
    }
}
