//! Application state.

use std::collections::HashMap;
use std::sync::Arc;

use reel_media::{FfmpegTool, MediaTool};
use reel_models::{EncodingConfig, ExportJob, ExternalComputeJob};
use reel_remote::{Capability, RemoteClient};
use reel_worker::{
    AssetRegistry, ClipTransformStage, ConcatenationStage, DerivedArtifacts, ExportOrchestrator,
    ExternalJobProxy, JobStore, MemoryJobStore, WorkerConfig, WorkspaceManager,
};
use serde_json::Value;
use tracing::info;

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub worker_config: Arc<WorkerConfig>,
    pub exports: Arc<ExportOrchestrator>,
    pub proxies: Arc<HashMap<Capability, Arc<ExternalJobProxy>>>,
    pub artifacts: Arc<DerivedArtifacts>,
    pub assets: Arc<AssetRegistry>,
}

impl AppState {
    /// Create state backed by FFmpeg and the remote services named in the environment.
    pub async fn new(
        config: ApiConfig,
        worker_config: WorkerConfig,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        worker_config.ensure_dirs().await?;

        let mut tool = FfmpegTool::new(EncodingConfig::default());
        if let Some(timeout) = worker_config.ffmpeg_timeout {
            tool = tool.with_timeout(timeout);
        }

        let mut clients = Vec::with_capacity(Capability::ALL.len());
        for capability in Capability::ALL {
            let client = RemoteClient::from_env(capability)?;
            info!(
                capability = %capability,
                base_url = %client.config().base_url,
                "Remote capability configured"
            );
            clients.push(client);
        }

        Ok(Self::with_components(
            config,
            worker_config,
            Arc::new(tool),
            clients,
        ))
    }

    /// Wire the worker components around an arbitrary media tool and remote clients.
    pub fn with_components(
        config: ApiConfig,
        worker_config: WorkerConfig,
        media: Arc<dyn MediaTool>,
        clients: Vec<RemoteClient>,
    ) -> Self {
        let assets = Arc::new(AssetRegistry::new());

        let export_jobs: Arc<dyn JobStore<ExportJob>> = Arc::new(MemoryJobStore::new());
        let exports = Arc::new(ExportOrchestrator::new(
            export_jobs,
            WorkspaceManager::new(worker_config.work_dir.clone()),
            ClipTransformStage::new(Arc::clone(&media)),
            ConcatenationStage::new(Arc::clone(&media)),
            worker_config.exports_dir(),
        ));

        // Proxies namespace their keys by capability, so one store of each kind is shared.
        let remote_jobs: Arc<dyn JobStore<ExternalComputeJob>> = Arc::new(MemoryJobStore::new());
        let ingestion_cache: Arc<dyn JobStore<Value>> = Arc::new(MemoryJobStore::new());
        let proxies = clients
            .into_iter()
            .map(|client| {
                let capability = client.capability();
                let proxy = ExternalJobProxy::new(
                    client,
                    Arc::clone(&remote_jobs),
                    Arc::clone(&ingestion_cache),
                    Arc::clone(&assets),
                    Arc::clone(&media),
                    &worker_config,
                );
                (capability, Arc::new(proxy))
            })
            .collect();

        let artifacts = Arc::new(DerivedArtifacts::new(
            Arc::clone(&media),
            Arc::clone(&assets),
            &worker_config,
        ));

        Self {
            config,
            worker_config: Arc::new(worker_config),
            exports,
            proxies: Arc::new(proxies),
            artifacts,
            assets,
        }
    }

    /// Proxy for `capability`, if one is configured.
    pub fn proxy(&self, capability: Capability) -> Option<Arc<ExternalJobProxy>> {
        self.proxies.get(&capability).cloned()
    }
}
