//! HTTP client for the worker control plane

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use shared::{process_debug, ClearResponse, FailureKind, HealthReport, InjectRequest, InjectResponse, ProcessId};

use crate::error::{OrchestratorError, OrchestratorResult};
use crate::traits::WorkerClient;
use crate::types::{ClientConfig, WorkerInfo};

pub struct RealWorkerClient {
    client: Client,
    config: ClientConfig,
}

impl RealWorkerClient {
    pub fn new(config: ClientConfig) -> OrchestratorResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| OrchestratorError::config(format!("HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn url(&self, worker: &WorkerInfo, path: &str) -> String {
        format!("http://{}:{}{}", self.config.host, worker.port, path)
    }

    async fn decode<T: DeserializeOwned>(worker: &WorkerInfo, sent: Result<Response, reqwest::Error>) -> OrchestratorResult<T> {
        let response = sent.map_err(|e| OrchestratorError::WorkerUnreachable {
            name: worker.name.clone(),
            reason: describe_transport_error(&e),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(OrchestratorError::WorkerRejected {
                name: worker.name.clone(),
                status: status.as_u16(),
            });
        }

        response.json::<T>().await.map_err(|e| {
            if e.is_timeout() {
                OrchestratorError::WorkerUnreachable {
                    name: worker.name.clone(),
                    reason: describe_transport_error(&e),
                }
            } else {
                OrchestratorError::InvalidResponse {
                    name: worker.name.clone(),
                    reason: e.to_string(),
                }
            }
        })
    }
}

fn describe_transport_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "timed out".to_string()
    } else if error.is_connect() {
        "connection refused".to_string()
    } else {
        error.to_string()
    }
}

#[async_trait]
impl WorkerClient for RealWorkerClient {
    async fn health(&self, worker: &WorkerInfo) -> OrchestratorResult<HealthReport> {
        let sent = self.client.get(self.url(worker, "/health")).send().await;
        Self::decode(worker, sent).await
    }

    async fn inject_failure(&self, worker: &WorkerInfo, kind: FailureKind) -> OrchestratorResult<InjectResponse> {
        process_debug!(ProcessId::current(), "💉 POST /inject-failure {} -> {}", kind, worker.name);
        let sent = self
            .client
            .post(self.url(worker, "/inject-failure"))
            .json(&InjectRequest::new(kind))
            .send()
            .await;
        Self::decode(worker, sent).await
    }

    async fn clear_failures(&self, worker: &WorkerInfo) -> OrchestratorResult<ClearResponse> {
        process_debug!(ProcessId::current(), "🧹 POST /clear-failures -> {}", worker.name);
        let sent = self.client.post(self.url(worker, "/clear-failures")).send().await;
        Self::decode(worker, sent).await
    }
}
