//! Backend abstraction for the two remote endpoints.
//!
//! The [`Backend`] trait decouples the session from HTTP. Tests use scripted
//! backends that release responses in a chosen order.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::core::types::{ExampleEntry, RequestFailure};
use crate::io::config::PlaygroundConfig;

/// Remote evaluator and example catalog.
#[async_trait]
pub trait Backend: Send + Sync + 'static {
    /// Submit raw source text; the response body is any JSON value.
    async fn evaluate(&self, text: String) -> Result<Value, RequestFailure>;

    /// Fetch the example catalog in server order.
    async fn fetch_examples(&self) -> Result<Vec<ExampleEntry>, RequestFailure>;
}

/// Backend that talks to the playground server over HTTP.
pub struct HttpBackend {
    client: reqwest::Client,
    eval_url: String,
    examples_url: String,
}

impl HttpBackend {
    pub fn new(cfg: &PlaygroundConfig) -> Result<Self> {
        cfg.validate()?;
        let client = reqwest::Client::builder()
            .timeout(cfg.request_timeout())
            .build()
            .context("build http client")?;
        Ok(Self {
            client,
            eval_url: cfg.eval_url.clone(),
            examples_url: cfg.examples_url.clone(),
        })
    }
}

#[async_trait]
impl Backend for HttpBackend {
    #[instrument(skip_all, fields(url = %self.eval_url, bytes = text.len()))]
    async fn evaluate(&self, text: String) -> Result<Value, RequestFailure> {
        let request = self
            .client
            .post(&self.eval_url)
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(text);
        read_json(request).await
    }

    #[instrument(skip_all, fields(url = %self.examples_url))]
    async fn fetch_examples(&self) -> Result<Vec<ExampleEntry>, RequestFailure> {
        read_json(self.client.get(&self.examples_url)).await
    }
}

/// Send a request and decode a JSON body, classifying every failure.
async fn read_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> Result<T, RequestFailure> {
    let response = request
        .send()
        .await
        .map_err(|err| RequestFailure::Transport(err.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(RequestFailure::Status(status.as_u16()));
    }
    let body = response
        .bytes()
        .await
        .map_err(|err| RequestFailure::Transport(err.to_string()))?;
    debug!(status = status.as_u16(), bytes = body.len(), "response received");
    serde_json::from_slice(&body).map_err(|err| RequestFailure::Decode(err.to_string()))
}
