use crate::domain::model::{PredictionReply, PredictionRequest};
use crate::domain::ports::PredictionClient;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

pub const DEFAULT_ENDPOINT: &str = "https://usual-kathie-respro-c027f147.koyeb.app/predict";

/// POSTs the payload as JSON. No timeout and no retries.
#[derive(Debug, Clone)]
pub struct HttpPredictionClient {
    client: Client,
    endpoint: String,
}

impl HttpPredictionClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for HttpPredictionClient {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

#[async_trait]
impl PredictionClient for HttpPredictionClient {
    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionReply> {
        let body = serde_json::to_vec(request)?;

        tracing::debug!("POST {} ({} bytes)", self.endpoint, body.len());
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        tracing::debug!("Prediction response status: {}", status);

        let body = response.text().await?;
        Ok(PredictionReply { status, body })
    }
}
