//! External job proxy and ingestion cache.
//!
//! One [`ExternalJobProxy`] fronts one remote capability. It forwards
//! submissions, relays progress polls and, the first time a poll observes a
//! completed job with a result file, copies that file into managed storage
//! and caches the enriched payload. Later polls for the job are answered from
//! the cache without touching the remote service.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use metrics::counter;
use reel_media::{copy_file_atomic, MediaError, MediaTool};
use reel_models::{media_type_for_extension, ExternalComputeJob, IngestedAsset, RemoteJobStatus};
use reel_remote::{Capability, ProgressMode, RemoteClient};
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::assets::AssetRegistry;
use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::JobLog;
use crate::single_flight::SingleFlight;
use crate::store::JobStore;

/// Result of a successful submission.
#[derive(Debug, Clone)]
pub struct SubmittedJob {
    pub job_id: String,
    pub status: RemoteJobStatus,
    /// Remote acceptance record, or the final payload for inline capabilities
    pub payload: Value,
}

/// Copies completed remote output into storage and caches the result.
struct Ingestor {
    capability: Capability,
    media: Arc<dyn MediaTool>,
    assets: Arc<AssetRegistry>,
    cache: Arc<dyn JobStore<Value>>,
    uploads_dir: PathBuf,
    cleanup_remote_output: bool,
}

pub struct ExternalJobProxy {
    client: RemoteClient,
    jobs: Arc<dyn JobStore<ExternalComputeJob>>,
    ingestor: Arc<Ingestor>,
    flights: SingleFlight<Value, Arc<WorkerError>>,
}

impl ExternalJobProxy {
    pub fn new(
        client: RemoteClient,
        jobs: Arc<dyn JobStore<ExternalComputeJob>>,
        cache: Arc<dyn JobStore<Value>>,
        assets: Arc<AssetRegistry>,
        media: Arc<dyn MediaTool>,
        config: &WorkerConfig,
    ) -> Self {
        let capability = client.capability();
        Self {
            client,
            jobs,
            ingestor: Arc::new(Ingestor {
                capability,
                media,
                assets,
                cache,
                uploads_dir: config.uploads_dir(),
                cleanup_remote_output: config.remote_output_cleanup,
            }),
            flights: SingleFlight::new("ingest"),
        }
    }

    pub fn capability(&self) -> Capability {
        self.client.capability()
    }

    /// Store key; namespaced so stores can be shared across capabilities.
    fn key(&self, job_id: &str) -> String {
        format!("{}:{}", self.capability(), job_id)
    }

    /// Last recorded state of a job.
    pub fn record(&self, job_id: &str) -> Option<ExternalComputeJob> {
        self.jobs.get(&self.key(job_id))
    }

    /// Forward a request to the remote service.
    ///
    /// Uses the caller's `jobId` when present. A `videoId` is resolved to the
    /// asset's storage path and sent as `video_path`. The id is reserved
    /// before the remote call; a trigger error or timeout (returned as
    /// [`WorkerError::ServiceTimeout`]) releases it and records nothing.
    pub async fn submit(&self, request: Value) -> WorkerResult<SubmittedJob> {
        let capability = self.capability();
        let Value::Object(mut body) = request else {
            return Err(WorkerError::validation("request body must be a JSON object"));
        };

        let job_id = take_job_id(&mut body)?.unwrap_or_else(|| Uuid::new_v4().to_string());

        if let Some(video_id) = body.remove("videoId") {
            let video_id = video_id
                .as_str()
                .ok_or_else(|| WorkerError::validation("videoId must be a string"))?;
            let path = self.ingestor.assets.resolve_path(video_id)?;
            body.insert(
                "video_path".to_string(),
                Value::String(path.to_string_lossy().to_string()),
            );
        }
        if capability.sends_job_id() {
            body.insert("job_id".to_string(), Value::String(job_id.clone()));
        }

        // Claim the id before the trigger round-trip; a concurrent submit with
        // the same id loses here instead of reaching the remote service.
        let key = self.key(&job_id);
        let reservation =
            ExternalComputeJob::new(&job_id, capability.as_str(), RemoteJobStatus::Queued);
        if !self.jobs.insert_if_absent(&key, reservation) {
            return Err(WorkerError::validation(format!("jobId {} is already in use", job_id)));
        }

        let logger = JobLog::new(job_id.as_str(), capability.as_str());
        logger.started("forwarding to remote service");

        let response = match self.client.trigger(&Value::Object(body)).await {
            Ok(response) => response,
            Err(e) => {
                self.jobs.remove(&key);
                logger.warn(&format!("trigger failed: {}", e));
                return Err(WorkerError::from(e));
            }
        };

        let (status, payload) = match capability.progress_mode() {
            ProgressMode::Polled => {
                let status = response
                    .get("status")
                    .and_then(Value::as_str)
                    .map(RemoteJobStatus::from_label)
                    .unwrap_or(RemoteJobStatus::Queued);
                (status, response)
            }
            ProgressMode::Inline => (
                RemoteJobStatus::Completed,
                json!({
                    "jobId": job_id,
                    "status": "completed",
                    "progress": 100,
                    "result": response,
                }),
            ),
        };

        // A poll may already have recorded a newer observation.
        self.jobs.update(&key, &mut |record: &mut ExternalComputeJob| {
            if record.raw_result.is_none() {
                record.observe(status, payload.clone());
            }
        });

        logger.progress(0, &format!("remote accepted job ({})", status));

        Ok(SubmittedJob {
            job_id,
            status,
            payload,
        })
    }

    /// Current status of a job, ingesting its output on first completion.
    pub async fn poll(&self, job_id: &str) -> WorkerResult<Value> {
        let key = self.key(job_id);

        if let Some(cached) = self.ingestor.cache.get(&key) {
            return Ok(cached);
        }

        let payload = match self.capability().progress_mode() {
            ProgressMode::Polled => self.client.progress(job_id).await?,
            ProgressMode::Inline => self
                .jobs
                .get(&key)
                .and_then(|record| record.raw_result)
                .ok_or_else(|| WorkerError::not_found("Remote job not found"))?,
        };

        let status = RemoteJobStatus::from_label(
            payload.get("status").and_then(Value::as_str).unwrap_or_default(),
        );
        self.observe(job_id, &key, status, &payload);

        if status != RemoteJobStatus::Completed {
            return Ok(payload);
        }
        let Some(result_path) = result_path(&payload) else {
            return Ok(payload);
        };

        match self.ingest_once(job_id, payload.clone(), result_path).await {
            Ok(enriched) => Ok(enriched),
            Err(e) => {
                let mut annotated = payload;
                if let Some(fields) = annotated.as_object_mut() {
                    fields.insert("ingestError".to_string(), Value::String(e.to_string()));
                }
                Ok(annotated)
            }
        }
    }

    fn observe(&self, job_id: &str, key: &str, status: RemoteJobStatus, payload: &Value) {
        let updated = self.jobs.update(key, &mut |record: &mut ExternalComputeJob| {
            record.observe(status, payload.clone());
        });
        if !updated {
            let mut record = ExternalComputeJob::new(job_id, self.capability().as_str(), status);
            record.raw_result = Some(payload.clone());
            self.jobs.put(key, record);
        }
    }

    async fn ingest_once(
        &self,
        job_id: &str,
        payload: Value,
        result_path: String,
    ) -> WorkerResult<Value> {
        let ingestor = Arc::clone(&self.ingestor);
        let cache_key = self.key(job_id);
        let logger = JobLog::new(job_id, "ingest");

        self.flights
            .run_exclusive(&format!("ingest:{}", job_id), move || async move {
                // Another poll may have finished ingesting while we queued.
                if let Some(cached) = ingestor.cache.get(&cache_key) {
                    return Ok(cached);
                }
                ingestor
                    .ingest(&cache_key, payload, &result_path, &logger)
                    .await
                    .map_err(Arc::new)
            })
            .await
            .map_err(WorkerError::from)
    }
}

impl Ingestor {
    async fn ingest(
        &self,
        cache_key: &str,
        payload: Value,
        result_path: &str,
        logger: &JobLog,
    ) -> WorkerResult<Value> {
        logger.started(&format!("ingesting {}", result_path));

        let asset = match self.materialize(result_path).await {
            Ok(asset) => asset,
            Err(e) => {
                counter!("reel_ingestions_total", "capability" => self.capability.as_str(), "outcome" => "failed")
                    .increment(1);
                logger.failed(&e.to_string());
                return Err(e);
            }
        };

        let enriched = merge_asset(payload, &asset)?;
        self.cache.put(cache_key, enriched.clone());
        self.assets.register(asset.clone());
        counter!("reel_ingestions_total", "capability" => self.capability.as_str(), "outcome" => "ingested")
            .increment(1);
        logger.finished(&format!("asset {} at {}", asset.id, asset.storage_path));

        if self.cleanup_remote_output {
            if let Err(e) = tokio::fs::remove_file(result_path).await {
                logger.warn(&format!("could not remove remote output {}: {}", result_path, e));
            }
        }

        Ok(enriched)
    }

    /// Copy the remote output into `uploads/` and describe it.
    async fn materialize(&self, result_path: &str) -> WorkerResult<IngestedAsset> {
        let source = PathBuf::from(result_path);
        let extension = source
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty())
            .unwrap_or("mp4")
            .to_ascii_lowercase();

        let id = Uuid::new_v4().to_string();
        let filename = format!("{}.{}", id, extension);
        let destination = self.uploads_dir.join(&filename);

        let size = copy_file_atomic(&source, &destination)
            .await
            .map_err(|e| match e {
                MediaError::FileNotFound(path) => {
                    WorkerError::ingestion(format!("remote output not found: {}", path.display()))
                }
                other => WorkerError::ingestion(format!("copy failed: {}", other)),
            })?;

        let info = match self.media.probe(&destination).await {
            Ok(info) => info,
            Err(e) => {
                let _ = tokio::fs::remove_file(&destination).await;
                return Err(WorkerError::ingestion(format!("probe failed: {}", e)));
            }
        };

        let storage_path = tokio::fs::canonicalize(&destination)
            .await
            .unwrap_or(destination);

        Ok(IngestedAsset {
            id,
            filename,
            storage_path: storage_path.to_string_lossy().to_string(),
            size,
            media_type: media_type_for_extension(&extension).to_string(),
            duration: info.duration,
            resolution: info.resolution(),
            codec: info.codec,
            uploaded_at: Utc::now(),
        })
    }
}

/// Caller-supplied job id from `jobId` or `job_id`.
fn take_job_id(body: &mut Map<String, Value>) -> WorkerResult<Option<String>> {
    let supplied = body.remove("jobId").or_else(|| body.remove("job_id"));
    match supplied {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(id)) if !id.trim().is_empty() => Ok(Some(id)),
        Some(_) => Err(WorkerError::validation("jobId must be a non-empty string")),
    }
}

/// Output file reported by a completed remote job.
fn result_path(payload: &Value) -> Option<String> {
    let result = payload.get("result")?;
    result
        .get("output_path")
        .or_else(|| result.get("outputPath"))
        .and_then(Value::as_str)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
}

fn merge_asset(payload: Value, asset: &IngestedAsset) -> WorkerResult<Value> {
    let asset_value = serde_json::to_value(asset)
        .map_err(|e| WorkerError::ingestion(format!("could not encode asset: {}", e)))?;

    let mut fields = match payload {
        Value::Object(fields) => fields,
        other => {
            let mut fields = Map::new();
            fields.insert("result".to_string(), other);
            fields
        }
    };
    fields.insert("assetId".to_string(), Value::String(asset.id.clone()));
    fields.insert("asset".to_string(), asset_value);
    Ok(Value::Object(fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryJobStore;
    use crate::testing::FakeMediaTool;
    use reel_remote::RemoteClientConfig;
    use std::time::Duration;
    use tempfile::TempDir;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct Fixture {
        dir: TempDir,
        config: WorkerConfig,
        media: Arc<FakeMediaTool>,
        assets: Arc<AssetRegistry>,
        proxy: ExternalJobProxy,
    }

    async fn fixture(capability: Capability, server: &MockServer, cleanup: bool) -> Fixture {
        let dir = TempDir::new().unwrap();
        let mut config = WorkerConfig::with_root(dir.path().join("storage"));
        config.remote_output_cleanup = cleanup;
        config.ensure_dirs().await.unwrap();

        let client = RemoteClient::new(
            capability,
            RemoteClientConfig {
                base_url: server.uri(),
                trigger_timeout: Duration::from_millis(200),
                poll_timeout: Duration::from_millis(500),
                job_timeout: Duration::from_secs(5),
            },
        )
        .unwrap();

        let media = Arc::new(FakeMediaTool::new());
        let assets = Arc::new(AssetRegistry::new());
        let proxy = ExternalJobProxy::new(
            client,
            Arc::new(MemoryJobStore::new()),
            Arc::new(MemoryJobStore::new()),
            assets.clone(),
            media.clone(),
            &config,
        );
        Fixture {
            dir,
            config,
            media,
            assets,
            proxy,
        }
    }

    impl Fixture {
        fn remote_output(&self, name: &str) -> String {
            let path = self.dir.path().join(name);
            std::fs::write(&path, b"remote video").unwrap();
            path.to_string_lossy().to_string()
        }

        fn uploads(&self) -> usize {
            std::fs::read_dir(self.config.uploads_dir()).unwrap().count()
        }
    }

    async fn mount_progress(server: &MockServer, job_id: &str, body: Value, calls: u64) {
        Mock::given(method("GET"))
            .and(path(format!("/progress/{}", job_id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(calls)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_submit_uses_caller_job_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/enhance"))
            .and(body_partial_json(json!({"job_id": "mine", "video_path": "/v.mp4"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"jobId": "mine", "status": "queued"})))
            .expect(1)
            .mount(&server)
            .await;
        let f = fixture(Capability::Enhance, &server, false).await;

        let submitted = f
            .proxy
            .submit(json!({"jobId": "mine", "video_path": "/v.mp4"}))
            .await
            .unwrap();

        assert_eq!(submitted.job_id, "mine");
        assert_eq!(submitted.status, RemoteJobStatus::Queued);
        assert_eq!(
            f.proxy.record("mine").unwrap().last_known_status,
            RemoteJobStatus::Queued
        );
    }

    #[tokio::test]
    async fn test_submit_generates_job_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "queued"})))
            .mount(&server)
            .await;
        let f = fixture(Capability::Generate, &server, false).await;

        let submitted = f.proxy.submit(json!({"prompt": "a fox"})).await.unwrap();
        assert!(Uuid::parse_str(&submitted.job_id).is_ok());
    }

    #[tokio::test]
    async fn test_trigger_timeout_records_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/enhance"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": "queued"}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;
        let f = fixture(Capability::Enhance, &server, false).await;

        let err = f
            .proxy
            .submit(json!({"jobId": "slow", "video_path": "/v.mp4"}))
            .await
            .unwrap_err();

        assert!(err.is_timeout());
        assert!(f.proxy.record("slow").is_none());
    }

    #[tokio::test]
    async fn test_submit_resolves_video_id() {
        let server = MockServer::start().await;
        let f = fixture(Capability::Enhance, &server, false).await;

        let err = f
            .proxy
            .submit(json!({"videoId": "unknown"}))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_remote_error_surfaces_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/enhance"))
            .respond_with(ResponseTemplate::new(500).set_body_string("CUDA out of memory"))
            .mount(&server)
            .await;
        let f = fixture(Capability::Enhance, &server, false).await;

        let err = f.proxy.submit(json!({"video_path": "/v.mp4"})).await.unwrap_err();
        match err {
            WorkerError::RemoteService { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "CUDA out of memory");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_in_flight_status_passes_through() {
        let server = MockServer::start().await;
        let body = json!({"status": "processing_frames", "progress": 42.5, "result": null});
        mount_progress(&server, "j1", body.clone(), 2).await;
        let f = fixture(Capability::Enhance, &server, false).await;

        assert_eq!(f.proxy.poll("j1").await.unwrap(), body);
        assert_eq!(f.proxy.poll("j1").await.unwrap(), body);
        assert_eq!(
            f.proxy.record("j1").unwrap().last_known_status,
            RemoteJobStatus::Processing
        );
        assert_eq!(f.uploads(), 0);
    }

    #[tokio::test]
    async fn test_completed_job_ingested_once() {
        let server = MockServer::start().await;
        let f = fixture(Capability::Enhance, &server, false).await;
        let output = f.remote_output("enhanced_output.mp4");
        mount_progress(
            &server,
            "j1",
            json!({"status": "completed", "progress": 100, "result": {"output_path": &output}}),
            1,
        )
        .await;

        let first = f.proxy.poll("j1").await.unwrap();
        let second = f.proxy.poll("j1").await.unwrap();
        let third = f.proxy.poll("j1").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(second, third);
        assert_eq!(first["status"], "completed");
        let asset_id = first["assetId"].as_str().unwrap();
        assert_eq!(first["asset"]["id"], asset_id);
        assert_eq!(first["asset"]["mediaType"], "video/mp4");
        assert_eq!(first["asset"]["resolution"], "1280x720");
        assert_eq!(f.uploads(), 1);
        assert_eq!(f.media.probe_calls(), 1);
        assert!(f.assets.get(asset_id).is_some());
        assert!(std::path::Path::new(&output).exists());
    }

    #[tokio::test]
    async fn test_concurrent_polls_ingest_once() {
        let server = MockServer::start().await;
        let f = fixture(Capability::Generate, &server, false).await;
        let output = f.remote_output("output.mp4");
        Mock::given(method("GET"))
            .and(path("/progress/j2"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": "completed", "result": {"outputPath": &output}})),
            )
            .mount(&server)
            .await;

        let (a, b, c) = tokio::join!(f.proxy.poll("j2"), f.proxy.poll("j2"), f.proxy.poll("j2"));
        let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());

        assert_eq!(a["assetId"], b["assetId"]);
        assert_eq!(b["assetId"], c["assetId"]);
        assert_eq!(f.uploads(), 1);
        assert_eq!(f.media.probe_calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_ingestion_not_cached() {
        let server = MockServer::start().await;
        let f = fixture(Capability::Enhance, &server, false).await;
        let output = f.remote_output("enhanced_output.mp4");
        mount_progress(
            &server,
            "j3",
            json!({"status": "completed", "result": {"output_path": &output}}),
            2,
        )
        .await;

        f.media.set_fail_probe(true);
        let failed = f.proxy.poll("j3").await.unwrap();
        assert!(failed["ingestError"].as_str().unwrap().contains("probe failed"));
        assert!(failed.get("asset").is_none());
        assert_eq!(f.uploads(), 0);

        f.media.set_fail_probe(false);
        let retried = f.proxy.poll("j3").await.unwrap();
        assert!(retried.get("ingestError").is_none());
        assert!(retried["assetId"].is_string());
        assert_eq!(f.uploads(), 1);
    }

    #[tokio::test]
    async fn test_missing_remote_output_reports_ingest_error() {
        let server = MockServer::start().await;
        mount_progress(
            &server,
            "j4",
            json!({"status": "completed", "result": {"output_path": "/gone/out.mp4"}}),
            1,
        )
        .await;
        let f = fixture(Capability::Enhance, &server, false).await;

        let response = f.proxy.poll("j4").await.unwrap();
        assert!(response["ingestError"]
            .as_str()
            .unwrap()
            .contains("remote output not found"));
    }

    #[tokio::test]
    async fn test_remote_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/progress/ghost"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Job not found"})))
            .mount(&server)
            .await;
        let f = fixture(Capability::Enhance, &server, false).await;

        let err = f.proxy.poll("ghost").await.unwrap_err();
        assert_eq!(err.to_string(), "Remote job not found");
    }

    #[tokio::test]
    async fn test_inline_capability_ingests_from_trigger_result() {
        let server = MockServer::start().await;
        let f = fixture(Capability::Swap, &server, true).await;
        let output = f.remote_output("swapped.mp4");
        Mock::given(method("POST"))
            .and(path("/swap"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"output_path": &output})))
            .expect(1)
            .mount(&server)
            .await;

        let submitted = f
            .proxy
            .submit(json!({"jobId": "s1", "source_image_path": "/face.png", "video_path": "/v.mp4"}))
            .await
            .unwrap();
        assert_eq!(submitted.status, RemoteJobStatus::Completed);
        assert_eq!(submitted.payload["progress"], 100);

        let first = f.proxy.poll("s1").await.unwrap();
        let second = f.proxy.poll("s1").await.unwrap();
        assert_eq!(first["assetId"], second["assetId"]);
        assert_eq!(f.uploads(), 1);
        assert!(!std::path::Path::new(&output).exists());
    }

    #[tokio::test]
    async fn test_duplicate_job_id_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/enhance"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "queued"})))
            .expect(1)
            .mount(&server)
            .await;
        let f = fixture(Capability::Enhance, &server, false).await;

        f.proxy.submit(json!({"jobId": "dup"})).await.unwrap();
        let err = f.proxy.submit(json!({"jobId": "dup"})).await.unwrap_err();
        assert!(matches!(err, WorkerError::Validation(_)));
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_submit_triggers_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/enhance"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": "queued"}))
                    .set_delay(Duration::from_millis(50)),
            )
            .expect(1)
            .mount(&server)
            .await;
        let f = fixture(Capability::Enhance, &server, false).await;

        let (a, b) = tokio::join!(
            f.proxy.submit(json!({"jobId": "dup"})),
            f.proxy.submit(json!({"jobId": "dup"})),
        );

        let rejected = [&a, &b]
            .iter()
            .filter(|r| matches!(r, Err(WorkerError::Validation(_))))
            .count();
        assert_eq!(rejected, 1);
        assert!(a.is_ok() || b.is_ok());
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_trigger_releases_job_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/enhance"))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/enhance"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "queued"})))
            .mount(&server)
            .await;
        let f = fixture(Capability::Enhance, &server, false).await;

        assert!(f.proxy.submit(json!({"jobId": "retry"})).await.is_err());
        assert!(f.proxy.record("retry").is_none());

        let submitted = f.proxy.submit(json!({"jobId": "retry"})).await.unwrap();
        assert_eq!(submitted.job_id, "retry");
        assert!(f.proxy.record("retry").is_some());
    }

    #[test]
    fn test_result_path_variants() {
        assert_eq!(
            result_path(&json!({"result": {"output_path": "/a.mp4"}})).as_deref(),
            Some("/a.mp4")
        );
        assert_eq!(
            result_path(&json!({"result": {"outputPath": "/b.mp4"}})).as_deref(),
            Some("/b.mp4")
        );
        assert!(result_path(&json!({"result": null})).is_none());
        assert!(result_path(&json!({"status": "completed"})).is_none());
    }
}
