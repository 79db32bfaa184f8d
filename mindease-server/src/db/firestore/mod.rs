//! Cloud Firestore implementation of [`DocumentStore`] over the REST v1 API.
//!
//! Documents are created with auto-generated ids
//! (`POST …/documents/{collection}`) and read with structured queries
//! (`POST …/documents:runQuery`). When `FIRESTORE_EMULATOR_HOST` is set the
//! client talks plain HTTP to the emulator and skips credential loading.

mod auth;
mod codec;

use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::Config;
use crate::db::document::{Document, Query, StoredDocument};
use crate::db::{DocumentStore, StoreError};

use auth::{ServiceAccountKey, TokenSource};

const PRODUCTION_BASE_URL: &str = "https://firestore.googleapis.com/v1";
const EMULATOR_PROJECT: &str = "demo-mindease";

/// HTTP client bound to one Firestore database.
#[derive(Debug)]
pub struct FirestoreStore {
    http: reqwest::Client,
    base_url: String,
    /// `projects/{project}/databases/{database}`
    database_path: String,
    tokens: TokenSource,
}

/// Google API error envelope: `{"error": {"code", "message", "status"}}`.
#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

impl FirestoreStore {
    pub fn new(
        base_url: impl Into<String>,
        project: &str,
        database: &str,
        tokens: TokenSource,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            database_path: format!("projects/{project}/databases/{database}"),
            tokens,
        }
    }

    /// Build the client described by `cfg`: emulator when configured,
    /// otherwise the production endpoint authenticated with the
    /// service-account key at `cfg.credentials_path`.
    pub async fn from_config(cfg: &Config) -> Result<Self, StoreError> {
        if let Some(host) = &cfg.firestore_emulator_host {
            let project = cfg.firestore_project.as_deref().unwrap_or(EMULATOR_PROJECT);
            return Ok(Self::new(
                format!("http://{host}/v1"),
                project,
                &cfg.firestore_database,
                TokenSource::Emulator,
            ));
        }

        let key = ServiceAccountKey::from_file(&cfg.credentials_path).await?;
        let project = cfg
            .firestore_project
            .clone()
            .unwrap_or_else(|| key.project_id.clone());
        let tokens = TokenSource::service_account(key)?;
        Ok(Self::new(
            PRODUCTION_BASE_URL,
            &project,
            &cfg.firestore_database,
            tokens,
        ))
    }

    fn documents_url(&self) -> String {
        format!("{}/{}/documents", self.base_url, self.database_path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value, StoreError> {
        let token = self.tokens.bearer(&self.http).await?;
        let response = request.bearer_auth(token).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        let body = response.text().await.unwrap_or_default();
        Err(backend_error(status, &body))
    }
}

fn backend_error(status: reqwest::StatusCode, body: &str) -> StoreError {
    let message = match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(ApiErrorBody { error }) if !error.status.is_empty() => {
            format!("{} {}", error.status, error.message)
        }
        Ok(ApiErrorBody { error }) if !error.message.is_empty() => error.message,
        _ if !body.trim().is_empty() => body.trim().to_owned(),
        _ => status.canonical_reason().unwrap_or("unknown error").to_owned(),
    };
    StoreError::Backend {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    fn backend(&self) -> &'static str {
        "firestore"
    }

    async fn create(&self, collection: &str, document: Document) -> Result<String, StoreError> {
        let url = format!("{}/{collection}", self.documents_url());
        let body = json!({ "fields": codec::encode_fields(&document) });
        let created = self.send(self.http.post(url).json(&body)).await?;

        let id = created
            .get("name")
            .and_then(Value::as_str)
            .and_then(codec::document_id)
            .ok_or_else(|| StoreError::Decode("create response carries no document name".into()))?;
        debug!(collection, id, "firestore document created");
        Ok(id.to_owned())
    }

    async fn query(&self, query: &Query) -> Result<Vec<StoredDocument>, StoreError> {
        let url = format!("{}:runQuery", self.documents_url());
        let response = self
            .send(self.http.post(url).json(&codec::run_query_body(query)))
            .await?;

        let Some(items) = response.as_array() else {
            return Err(StoreError::Decode("runQuery response is not an array".into()));
        };

        // Entries without a `document` only report read progress.
        items
            .iter()
            .filter_map(|item| item.get("document"))
            .map(|doc| {
                let id = doc
                    .get("name")
                    .and_then(Value::as_str)
                    .and_then(codec::document_id)
                    .unwrap_or_default()
                    .to_owned();
                let fields = codec::decode_fields(doc.get("fields"))?;
                Ok(StoredDocument { id, fields })
            })
            .collect()
    }
}
