//! SQLite implementation of [`DocumentStore`].
//!
//! Every collection lives in one `documents` table; the document body is
//! stored as JSON text and queried with SQLite's JSON functions. Migrations
//! are embedded at compile time from `./migrations` and run by
//! [`SqliteStore::connect`].
//!
//! The `sqlx::query` (runtime-verified) form is used so that no
//! `DATABASE_URL` environment variable is needed at compile time.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use uuid::Uuid;

use super::document::{format_timestamp, Direction, Document, FieldValue, Query, StoredDocument};
use super::{DocumentStore, StoreError};

#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

/// A positional bind argument.
enum SqlArg {
    Text(String),
    Integer(i64),
    Real(f64),
}

impl SqliteStore {
    /// Open (or create) the SQLite database at `url` and run pending migrations.
    ///
    /// `url` should be a sqlx-compatible SQLite URL, e.g. `"sqlite://mindease.db"`.
    /// `sqlite::memory:` gives a private database that lives as long as the store.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        if url.ends_with(":memory:") {
            return Self::in_memory().await;
        }
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        Self::migrate(pool).await
    }

    /// Private in-memory database on a single long-lived connection.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Self::migrate(pool).await
    }

    async fn migrate(pool: SqlitePool) -> Result<Self, StoreError> {
        // Path is resolved relative to CARGO_MANIFEST_DIR at compile time.
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}

/// JSON path addressing a top-level field.
fn json_path(field: &str) -> Result<String, StoreError> {
    if field.is_empty() || field.contains('"') {
        return Err(StoreError::InvalidQuery(format!(
            "unsupported field name '{field}'"
        )));
    }
    Ok(format!("$.\"{field}\""))
}

/// Bind argument for an equality filter; `None` means "is null".
fn filter_arg(value: &FieldValue) -> Result<Option<SqlArg>, StoreError> {
    Ok(match value {
        FieldValue::Null => None,
        FieldValue::Boolean(b) => Some(SqlArg::Integer(i64::from(*b))),
        FieldValue::Integer(i) => Some(SqlArg::Integer(*i)),
        FieldValue::Double(d) => Some(SqlArg::Real(*d)),
        FieldValue::String(s) => Some(SqlArg::Text(s.clone())),
        FieldValue::Timestamp(ts) => Some(SqlArg::Text(format_timestamp(ts))),
        FieldValue::Array(_) | FieldValue::Map(_) => {
            return Err(StoreError::InvalidQuery(
                "array and map values cannot be used in equality filters".to_owned(),
            ));
        }
    })
}

fn decode_body(id: String, body: &str) -> Result<StoredDocument, StoreError> {
    let raw: serde_json::Map<String, serde_json::Value> = serde_json::from_str(body)
        .map_err(|e| StoreError::Decode(format!("document {id}: {e}")))?;
    let fields = raw
        .into_iter()
        .map(|(k, v)| (k, FieldValue::from_json(v)))
        .collect();
    Ok(StoredDocument { id, fields })
}

#[async_trait]
impl DocumentStore for SqliteStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn create(&self, collection: &str, document: Document) -> Result<String, StoreError> {
        let id = Uuid::new_v4().simple().to_string();
        let body = serde_json::to_string(&document)
            .map_err(|e| StoreError::Decode(format!("cannot serialise document: {e}")))?;
        sqlx::query(
            "INSERT INTO documents (collection, id, body, created_at) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(collection)
        .bind(&id)
        .bind(&body)
        .bind(format_timestamp(&Utc::now()))
        .execute(&self.pool)
        .await?;
        Ok(id)
    }

    async fn query(&self, query: &Query) -> Result<Vec<StoredDocument>, StoreError> {
        let mut sql = String::from("SELECT id, body FROM documents WHERE collection = ?");
        let mut args = vec![SqlArg::Text(query.collection.clone())];

        for filter in &query.filters {
            let path = json_path(&filter.field)?;
            match filter_arg(&filter.value)? {
                None => {
                    sql.push_str(" AND json_type(body, ?) = 'null'");
                    args.push(SqlArg::Text(path));
                }
                Some(arg) => {
                    sql.push_str(" AND json_extract(body, ?) = ?");
                    args.push(SqlArg::Text(path));
                    args.push(arg);
                }
            }
        }

        if let Some(order) = &query.order_by {
            let path = json_path(&order.field)?;
            let direction = match order.direction {
                Direction::Ascending => "ASC",
                Direction::Descending => "DESC",
            };
            sql.push_str(" AND json_type(body, ?) IS NOT NULL");
            sql.push_str(&format!(
                " ORDER BY json_extract(body, ?) {direction}, rowid {direction}"
            ));
            args.push(SqlArg::Text(path.clone()));
            args.push(SqlArg::Text(path));
        }

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            args.push(SqlArg::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
        }

        let mut statement = sqlx::query_as::<_, (String, String)>(&sql);
        for arg in args {
            statement = match arg {
                SqlArg::Text(s) => statement.bind(s),
                SqlArg::Integer(i) => statement.bind(i),
                SqlArg::Real(f) => statement.bind(f),
            };
        }

        let rows = statement.fetch_all(&self.pool).await?;
        rows.into_iter()
            .map(|(id, body)| decode_body(id, &body))
            .collect()
    }
}
