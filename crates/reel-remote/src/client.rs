//! Remote compute service HTTP client.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::error::{RemoteError, RemoteResult};
use crate::types::{Capability, ProgressMode};

/// Configuration for one capability's client.
#[derive(Debug, Clone)]
pub struct RemoteClientConfig {
    /// Base URL of the remote service
    pub base_url: String,
    /// Bound on the call that starts a polled job
    pub trigger_timeout: Duration,
    /// Bound on one progress poll
    pub poll_timeout: Duration,
    /// Bound on a whole inline job
    pub job_timeout: Duration,
}

impl RemoteClientConfig {
    pub fn for_capability(capability: Capability) -> Self {
        Self {
            base_url: capability.default_base_url().to_string(),
            trigger_timeout: Duration::from_secs(10),
            poll_timeout: Duration::from_secs(10),
            job_timeout: Duration::from_secs(1800),
        }
    }

    /// Create config from environment variables.
    pub fn from_env(capability: Capability) -> Self {
        let defaults = Self::for_capability(capability);
        Self {
            base_url: std::env::var(capability.url_env())
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            trigger_timeout: env_secs("REMOTE_TRIGGER_TIMEOUT_SECS")
                .unwrap_or(defaults.trigger_timeout),
            poll_timeout: env_secs("REMOTE_POLL_TIMEOUT_SECS").unwrap_or(defaults.poll_timeout),
            job_timeout: env_secs("REMOTE_JOB_TIMEOUT_SECS").unwrap_or(defaults.job_timeout),
        }
    }
}

fn env_secs(key: &str) -> Option<Duration> {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .map(Duration::from_secs)
}

/// Client for one remote capability.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    http: Client,
    capability: Capability,
    config: RemoteClientConfig,
}

impl RemoteClient {
    pub fn new(capability: Capability, config: RemoteClientConfig) -> RemoteResult<Self> {
        // Timeouts are per request; trigger, poll and inline jobs have different bounds.
        let http = Client::builder().build().map_err(RemoteError::Network)?;

        Ok(Self {
            http,
            capability,
            config,
        })
    }

    /// Create from environment variables.
    pub fn from_env(capability: Capability) -> RemoteResult<Self> {
        Self::new(capability, RemoteClientConfig::from_env(capability))
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    pub fn config(&self) -> &RemoteClientConfig {
        &self.config
    }

    /// Bound applied to the trigger call for this capability.
    pub fn trigger_timeout(&self) -> Duration {
        match self.capability.progress_mode() {
            ProgressMode::Polled => self.config.trigger_timeout,
            ProgressMode::Inline => self.config.job_timeout,
        }
    }

    /// Start remote work.
    ///
    /// For polled capabilities the response is the accepted `{jobId, status}`
    /// record; for inline capabilities it is the final result payload.
    pub async fn trigger(&self, body: &Value) -> RemoteResult<Value> {
        let url = format!("{}{}", self.config.base_url, self.capability.trigger_path());
        let limit = self.trigger_timeout();

        debug!(capability = %self.capability, "Triggering remote job at {}", url);

        let response = self
            .http
            .post(&url)
            .timeout(limit)
            .json(body)
            .send()
            .await
            .map_err(|e| RemoteError::from_transport(e, limit))?;

        let response = check_status(response, limit).await?;
        read_json(response, limit).await
    }

    /// Fetch the remote progress record of a polled job.
    pub async fn progress(&self, job_id: &str) -> RemoteResult<Value> {
        let path = self.capability.progress_path(job_id).ok_or_else(|| {
            RemoteError::InvalidResponse(format!(
                "{} does not expose a progress endpoint",
                self.capability
            ))
        })?;
        let url = format!("{}{}", self.config.base_url, path);
        let limit = self.config.poll_timeout;

        let response = self
            .http
            .get(&url)
            .timeout(limit)
            .send()
            .await
            .map_err(|e| RemoteError::from_transport(e, limit))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(RemoteError::NotFound(job_id.to_string()));
        }

        let response = check_status(response, limit).await?;
        read_json(response, limit).await
    }
}

async fn check_status(response: Response, limit: Duration) -> RemoteResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .map_err(|e| RemoteError::from_transport(e, limit))?;
    Err(RemoteError::ServiceError {
        status: status.as_u16(),
        body,
    })
}

async fn read_json(response: Response, limit: Duration) -> RemoteResult<Value> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| RemoteError::from_transport(e, limit))?;
    let value: Value = serde_json::from_slice(&bytes)?;
    if !value.is_object() {
        return Err(RemoteError::InvalidResponse(format!(
            "expected a JSON object, got {}",
            value
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(capability: Capability, server: &MockServer) -> RemoteClient {
        let config = RemoteClientConfig {
            base_url: server.uri(),
            trigger_timeout: Duration::from_millis(200),
            poll_timeout: Duration::from_millis(200),
            job_timeout: Duration::from_secs(5),
        };
        RemoteClient::new(capability, config).unwrap()
    }

    #[test]
    fn test_config_defaults() {
        let config = RemoteClientConfig::for_capability(Capability::Enhance);
        assert_eq!(config.base_url, "http://localhost:8002");
        assert_eq!(config.trigger_timeout, Duration::from_secs(10));
        assert_eq!(config.job_timeout, Duration::from_secs(1800));
    }

    #[tokio::test]
    async fn test_trigger_returns_accepted_record() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/enhance"))
            .and(body_json(json!({"video_path": "/v/a.mp4", "job_id": "j1"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"jobId": "j1", "status": "queued"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(Capability::Enhance, &server);
        let accepted = client
            .trigger(&json!({"video_path": "/v/a.mp4", "job_id": "j1"}))
            .await
            .unwrap();
        assert_eq!(accepted["status"], "queued");
    }

    #[tokio::test]
    async fn test_trigger_timeout_is_distinct() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"jobId": "j1", "status": "queued"}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let client = client_for(Capability::Generate, &server);
        let err = client.trigger(&json!({"prompt": "x"})).await.unwrap_err();
        assert!(err.is_timeout(), "expected timeout, got {err:?}");
    }

    #[tokio::test]
    async fn test_inline_trigger_uses_job_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/swap"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"output_path": "/remote/out.mp4"}))
                    .set_delay(Duration::from_millis(400)),
            )
            .mount(&server)
            .await;

        let client = client_for(Capability::Swap, &server);
        let result = client.trigger(&json!({"video_path": "/v/a.mp4"})).await.unwrap();
        assert_eq!(result["output_path"], "/remote/out.mp4");
    }

    #[tokio::test]
    async fn test_service_error_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/enhance"))
            .respond_with(ResponseTemplate::new(503).set_body_string("model loading"))
            .mount(&server)
            .await;

        let client = client_for(Capability::Enhance, &server);
        match client.trigger(&json!({})).await {
            Err(RemoteError::ServiceError { status, body }) => {
                assert_eq!(status, 503);
                assert_eq!(body, "model loading");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_progress_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/progress/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Job not found"})))
            .mount(&server)
            .await;

        let client = client_for(Capability::Enhance, &server);
        let err = client.progress("missing").await.unwrap_err();
        assert!(matches!(err, RemoteError::NotFound(id) if id == "missing"));
    }

    #[tokio::test]
    async fn test_progress_on_inline_capability() {
        let server = MockServer::start().await;
        let client = client_for(Capability::Track, &server);
        assert!(matches!(
            client.progress("j1").await,
            Err(RemoteError::InvalidResponse(_))
        ));
    }
}
