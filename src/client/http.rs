use super::{ClientError, CubeApi, SqlResponse};
use crate::catalog::MetaResponse;
use crate::config::ApiConfig;
use crate::query::{LoadResponse, Query, QueryRequest};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Answer `/load` gives while the backend is still computing the result.
const CONTINUE_WAIT: &str = "Continue wait";

/// [`CubeApi`] over the Cube REST API.
pub struct HttpCubeApi {
    config: ApiConfig,
    client: Client,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpCubeApi {
    pub fn new(config: ApiConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Ok(HttpCubeApi { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_url.trim_end_matches('/'), path)
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("Authorization", &self.config.api_secret)
    }

    async fn fetch(&self, req: RequestBuilder) -> Result<(StatusCode, String), ClientError> {
        let response = self
            .authorize(req)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Ok((status, body))
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
        let (status, body) = self.fetch(req).await?;
        Self::decode(status, body)
    }

    fn decode<T: DeserializeOwned>(status: StatusCode, body: String) -> Result<T, ClientError> {
        if !status.is_success() {
            // Cube reports query errors as `{"error": "..."}` with a 4xx status
            return Err(match serde_json::from_str::<ErrorBody>(&body) {
                Ok(err) => ClientError::Api(err.error),
                Err(_) => ClientError::Status {
                    status: status.as_u16(),
                    body,
                },
            });
        }

        serde_json::from_str(&body).map_err(|e| ClientError::Json(e.to_string()))
    }
}

#[async_trait]
impl CubeApi for HttpCubeApi {
    async fn meta(&self) -> Result<MetaResponse, ClientError> {
        let url = self.url("meta");
        debug!("GET {}", url);
        self.send(self.client.get(url)).await
    }

    async fn sql(&self, query: &Query) -> Result<Option<String>, ClientError> {
        let url = self.url("sql");
        debug!("POST {} measures={:?} dimensions={:?}", url, query.measures, query.dimensions);
        let (status, body) = self
            .fetch(self.client.post(url).json(&QueryRequest { query }))
            .await?;

        // a rejected query still answers with an error body, which means no SQL
        if !status.is_success() {
            if let Ok(err) = serde_json::from_str::<ErrorBody>(&body) {
                warn!("Backend did not generate SQL: {}", err.error);
                return Ok(None);
            }
        }
        let response: SqlResponse = Self::decode(status, body)?;
        Ok(response.into_statement())
    }

    async fn load(&self, query: &Query) -> Result<LoadResponse, ClientError> {
        let url = self.url("load");
        let attempts = self.config.continue_wait_retries + 1;

        for attempt in 1..=attempts {
            debug!("POST {} attempt {}/{}", url, attempt, attempts);
            let response: LoadResponse = self
                .send(self.client.post(&url).json(&QueryRequest { query }))
                .await?;

            match response.error {
                Some(ref error) if error == CONTINUE_WAIT => {
                    if attempt < attempts {
                        tokio::time::sleep(self.config.continue_wait_interval()).await;
                    }
                }
                Some(error) => return Err(ClientError::Api(error)),
                None => return Ok(response),
            }
        }

        warn!("Query still pending after {} attempts", attempts);
        Err(ClientError::ContinueWaitExhausted(attempts))
    }
}
