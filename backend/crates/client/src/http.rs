//! API Client
//!
//! Thin wrapper over `reqwest` that adds the bearer token, retries GETs that
//! got no response, caches GET bodies and turns error envelopes into
//! [`ClientError::Api`].

use std::sync::Arc;

use kernel::clock::Clock;
use kernel::error::field::FieldError;
use kernel::response::ApiResponse;
use reqwest::header::CACHE_CONTROL;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::response_cache::ResponseCache;

#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    message: Option<String>,
    #[serde(default)]
    errors: Vec<FieldError>,
}

/// Payload of a success envelope; an envelope without `data` is an error here
pub fn into_data<T>(response: ApiResponse<T>) -> ClientResult<T> {
    response
        .data
        .ok_or_else(|| ClientError::Decode("response carried no data".to_string()))
}

pub struct ApiClient {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
    cache: ResponseCache,
    token: RwLock<Option<String>>,
}

impl ApiClient {
    pub fn new(config: ClientConfig, clock: Arc<dyn Clock>) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            cache: ResponseCache::new(config.response_cache_ttl, clock),
            config: Arc::new(config),
            token: RwLock::new(None),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }

    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    /// GET served from the response cache when possible
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<ApiResponse<T>> {
        if let Some(body) = self.cache.get(path).await {
            tracing::trace!(path, "Serving cached response");
            return decode(body);
        }

        let body = self.fetch(path).await.inspect_err(ClientError::log)?;
        self.cache.put(path, body.clone()).await;
        decode(body)
    }

    /// GET that bypasses the response cache and leaves it untouched
    pub async fn get_fresh<T: DeserializeOwned>(&self, path: &str) -> ClientResult<ApiResponse<T>> {
        let body = self.fetch(path).await.inspect_err(ClientError::log)?;
        decode(body)
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> ClientResult<ApiResponse<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.mutate(Method::POST, path, Some(body)).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> ClientResult<ApiResponse<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.mutate(Method::PUT, path, Some(body)).await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> ClientResult<ApiResponse<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.mutate(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<ApiResponse<T>> {
        self.mutate::<Value, T>(Method::DELETE, path, None).await
    }

    pub async fn clear_cache(&self, path: &str) {
        self.cache.remove(path).await;
    }

    pub async fn clear_all_cache(&self) {
        self.cache.clear().await;
    }

    pub async fn cached_responses(&self) -> usize {
        self.cache.len().await
    }

    async fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token.read().await.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn fetch(&self, path: &str) -> ClientResult<Value> {
        let url = self.config.url(path);
        let mut attempt = 0;

        loop {
            let request = self
                .authorized(self.http.get(&url))
                .await
                .header(CACHE_CONTROL, "public, max-age=300");

            match request.send().await {
                Ok(response) => return read_body(response).await,
                Err(e) if attempt < self.config.get_retries => {
                    attempt += 1;
                    let delay = self.config.retry_backoff * attempt;
                    tracing::warn!(
                        url = %url,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "GET failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(ClientError::Network(e)),
            }
        }
    }

    /// Never retried; any mutation invalidates every cached GET
    async fn mutate<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ClientResult<ApiResponse<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self
            .authorized(self.http.request(method, self.config.url(path)))
            .await
            .header(CACHE_CONTROL, "no-cache, no-store");
        if let Some(body) = body {
            request = request.json(body);
        }

        let result = request.send().await;
        self.cache.clear().await;

        let response = result
            .map_err(ClientError::Network)
            .inspect_err(ClientError::log)?;
        let body = read_body(response).await.inspect_err(ClientError::log)?;
        decode(body)
    }
}

async fn read_body(response: Response) -> ClientResult<Value> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if status.is_success() {
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        return serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()));
    }

    let envelope: ErrorEnvelope = serde_json::from_slice(&bytes).unwrap_or_default();
    Err(ClientError::Api {
        status: status.as_u16(),
        message: envelope.message.unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        }),
        errors: envelope.errors,
    })
}

fn decode<T: DeserializeOwned>(body: Value) -> ClientResult<ApiResponse<T>> {
    serde_json::from_value(body).map_err(|e| ClientError::Decode(e.to_string()))
}
