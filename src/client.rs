//! The database collaborator: a thin client for the graph database's HTTP
//! query endpoint.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::frame::Row;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("send query: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("query failed: {0}")]
    Query(String),

    #[error("decode result: {0}")]
    DecodeResult(String),
}

/// Executes queries against the graph database.
///
/// Implementations must be safe for concurrent use; connection pooling and
/// retries are the driver's concern, not the caller's.
#[async_trait]
pub trait GraphClient: Send + Sync {
    /// Runs a query and returns the decoded result rows.
    async fn query(&self, query: &str) -> Result<Vec<Row>, Error>;

    /// Runs a query expected to return a single integer scalar.
    async fn query_single_i64(&self, query: &str) -> Result<i64, Error>;
}

/// [`GraphClient`] speaking to the database's HTTP query endpoint.
///
/// The endpoint answers `{"query": ...}` posts with either
/// `{"data": [...]}` or `{"error": {"message": ...}}`.
#[derive(Clone, Debug)]
pub struct HttpGraphClient {
    http: reqwest::Client,
    endpoint: String,
}

#[derive(Deserialize)]
struct QueryEnvelope<T> {
    #[serde(default)]
    data: Vec<T>,
    error: Option<WireError>,
}

#[derive(Deserialize)]
struct WireError {
    message: String,
}

impl HttpGraphClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    async fn post<T: serde::de::DeserializeOwned + Default>(&self, query: &str) -> Result<Vec<T>, Error> {
        let envelope: QueryEnvelope<T> = self
            .http
            .post(&self.endpoint)
            .json(&json!({ "query": query }))
            .send()
            .await?
            .json()
            .await?;

        match envelope.error {
            Some(error) => Err(Error::Query(error.message)),
            None => Ok(envelope.data),
        }
    }
}

#[async_trait]
impl GraphClient for HttpGraphClient {
    async fn query(&self, query: &str) -> Result<Vec<Row>, Error> {
        self.post(query).await
    }

    async fn query_single_i64(&self, query: &str) -> Result<i64, Error> {
        let values: Vec<Value> = self.post(query).await?;
        values
            .first()
            .and_then(Value::as_i64)
            .ok_or_else(|| Error::DecodeResult("expected a single integer result".to_string()))
    }
}

#[cfg(test)]
pub mod mock {
    use std::sync::Mutex;

    use super::*;

    /// A scripted [`GraphClient`]: returns canned results and records every
    /// query text it receives.
    pub struct MockClient {
        rows: Result<Vec<Row>, String>,
        single: Result<i64, String>,
        seen: Mutex<Vec<String>>,
    }

    impl Default for MockClient {
        fn default() -> Self {
            Self {
                rows: Ok(Vec::new()),
                single: Ok(0),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl MockClient {
        pub fn rows(mut self, rows: Vec<Row>) -> Self {
            self.rows = Ok(rows);
            self
        }

        pub fn single(mut self, value: i64) -> Self {
            self.single = Ok(value);
            self
        }

        pub fn failing(mut self, message: &str) -> Self {
            self.rows = Err(message.to_string());
            self.single = Err(message.to_string());
            self
        }

        /// Query texts received so far, in order.
        pub fn seen(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GraphClient for MockClient {
        async fn query(&self, query: &str) -> Result<Vec<Row>, Error> {
            self.seen.lock().unwrap().push(query.to_string());
            self.rows.clone().map_err(Error::Query)
        }

        async fn query_single_i64(&self, query: &str) -> Result<i64, Error> {
            self.seen.lock().unwrap().push(query.to_string());
            self.single.clone().map_err(Error::Query)
        }
    }
}
