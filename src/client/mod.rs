pub mod http;
pub mod local;

use crate::catalog::MetaResponse;
use crate::query::{LoadResponse, Query};
use async_trait::async_trait;
use log::warn;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

pub use http::HttpCubeApi;
pub use local::LocalCubeApi;

/// Access to a Cube REST API.
///
/// The controller only talks to the backend through this trait, so an
/// in-memory implementation can stand in for the HTTP one.
#[async_trait]
pub trait CubeApi: Send + Sync {
    /// `GET /meta`
    async fn meta(&self) -> Result<MetaResponse, ClientError>;
    /// `POST /sql`, returning the first generated statement if there is one.
    ///
    /// A query the backend answers with an `{"error": ...}` body yields
    /// `Ok(None)`; only transport and decoding failures are errors.
    async fn sql(&self, query: &Query) -> Result<Option<String>, ClientError>;
    /// `POST /load`
    async fn load(&self, query: &Query) -> Result<LoadResponse, ClientError>;
}

#[async_trait]
impl<T: CubeApi + ?Sized> CubeApi for Arc<T> {
    async fn meta(&self) -> Result<MetaResponse, ClientError> {
        (**self).meta().await
    }

    async fn sql(&self, query: &Query) -> Result<Option<String>, ClientError> {
        (**self).sql(query).await
    }

    async fn load(&self, query: &Query) -> Result<LoadResponse, ClientError> {
        (**self).load(query).await
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid JSON response: {0}")]
    Json(String),

    #[error("{0}")]
    Api(String),

    #[error("Query still pending after {0} attempts")]
    ContinueWaitExhausted(u32),
}

/// Body of `POST /sql`.
#[derive(Debug, Deserialize, Default)]
pub struct SqlResponse {
    #[serde(default)]
    pub sql: Option<SqlBody>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `sql.sql` is `[statement, params]`.
#[derive(Debug, Deserialize, Default)]
pub struct SqlBody {
    #[serde(default)]
    pub sql: Vec<Value>,
}

impl SqlResponse {
    pub fn into_statement(self) -> Option<String> {
        if let Some(error) = self.error {
            warn!("Backend did not generate SQL: {}", error);
            return None;
        }
        self.sql
            .and_then(|body| body.sql.into_iter().next())
            .and_then(|first| first.as_str().map(String::from))
    }
}
