//! The cache coordinator: lifecycle and fetch routing.
//!
//! One coordinator instance serves a single deployment version. `install`
//! precaches the manifests, `activate` sweeps partitions from older
//! versions, and `handle_fetch` routes each intercepted request to a
//! strategy. Background cache writes are registered with a task tracker so
//! the host can drain them before teardown.

mod strategies;

use std::collections::HashSet;
use std::sync::Arc;

use tokio_util::task::TaskTracker;

use crate::cache::{CacheDb, StoredResponse};
use crate::config::CoordinatorConfig;
use crate::error::Error;
use crate::request::{Network, RequestMode, ResourceRequest, ResourceResponse};
use crate::routes::{PartitionKind, RouteTable, Strategy, normalize_manifest_path};

/// Cache coordinator for one deployment version.
pub struct Coordinator {
    config: CoordinatorConfig,
    routes: RouteTable,
    navigation_paths: HashSet<String>,
    db: CacheDb,
    network: Arc<dyn Network>,
    tasks: TaskTracker,
}

impl Coordinator {
    pub fn new(config: CoordinatorConfig, db: CacheDb, network: Arc<dyn Network>) -> Self {
        let routes = RouteTable::from_config(&config);
        let navigation_paths = config
            .navigation_paths
            .iter()
            .map(|p| normalize_manifest_path(p))
            .collect();

        Self { config, routes, navigation_paths, db, network, tasks: TaskTracker::new() }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Precache every manifest URL into its partition.
    ///
    /// All-or-nothing: the first URL that fails to fetch with an ok status
    /// aborts the step with `Error::Precache` and nothing is written. Safe
    /// to run repeatedly for the same version tag (upserts).
    pub async fn install(&self) -> Result<(), Error> {
        let manifests = [
            (PartitionKind::Shell, &self.config.shell_manifest),
            (PartitionKind::Asset, &self.config.asset_manifest),
            (PartitionKind::Data, &self.config.data_manifest),
        ];

        let mut batch = Vec::new();
        for (kind, manifest) in manifests {
            let partition = self.config.partition_name(kind);
            for path in manifest {
                let request = ResourceRequest::get(self.config.resolve(path));
                let response = self
                    .network
                    .fetch(&request)
                    .await
                    .map_err(|e| Error::Precache { url: path.clone(), detail: e.to_string() })?;
                if !response.is_ok() {
                    return Err(Error::Precache { url: path.clone(), detail: format!("status {}", response.status) });
                }
                batch.push((partition.clone(), normalize_manifest_path(path), StoredResponse::capture(&response)));
            }
        }

        let precached = batch.len();
        self.db.put_entries(batch).await?;
        tracing::info!(version = %self.config.version_tag, precached, "install complete");
        Ok(())
    }

    /// Delete every stored partition not belonging to the current version.
    pub async fn activate(&self) -> Result<(), Error> {
        let keep = self.config.allowed_partitions();
        for name in self.db.list_partitions().await? {
            if !keep.contains(&name) {
                let deleted = self.db.delete_partition(&name).await?;
                tracing::info!(partition = %name, deleted, "dropped stale partition");
            }
        }
        tracing::info!(version = %self.config.version_tag, "activate complete");
        Ok(())
    }

    /// The routing entry point for every intercepted request.
    pub async fn handle_fetch(&self, request: &ResourceRequest) -> Result<ResourceResponse, Error> {
        if !request.is_get() {
            return self.network.fetch(request).await;
        }

        if request.mode == RequestMode::Navigate {
            return self.handle_navigation(request).await;
        }

        let Some(path) = self.config.normalize_path(&request.url) else {
            return self.pass_through(request).await;
        };

        match self.routes.classify(&path, request.destination) {
            Some((kind, Strategy::CacheFirst)) => self.cache_first(request, &path, kind).await,
            Some((kind, Strategy::StaleWhileRevalidate)) => self.stale_while_revalidate(request, &path, kind).await,
            None => self.pass_through(request).await,
        }
    }

    /// Network pass-through with a best-effort cache match on failure.
    async fn pass_through(&self, request: &ResourceRequest) -> Result<ResourceResponse, Error> {
        match self.network.fetch(request).await {
            Ok(response) => Ok(response),
            Err(err) => {
                let key = self
                    .config
                    .normalize_path(&request.url)
                    .unwrap_or_else(|| request.url.to_string());
                if let Some(hit) = self.db.match_any(&key).await? {
                    tracing::debug!(%key, "pass-through network failure served from cache");
                    return Ok(hit.into_response());
                }
                Err(err)
            }
        }
    }

    /// Write an entry without blocking response delivery. The write is
    /// tracked so `wait_background` can drain it.
    pub(crate) fn spawn_write(&self, partition: String, path: String, entry: StoredResponse) {
        let db = self.db.clone();
        self.tasks.spawn(async move {
            if let Err(err) = db.put_entry(&partition, &path, entry).await {
                tracing::warn!(%partition, %path, error = %err, "background cache write failed");
            }
        });
    }

    /// Wait for all in-flight background cache writes to settle.
    ///
    /// The waitUntil analogue: hosts call this before teardown so detached
    /// writes are not torn down mid-flight; tests call it to observe
    /// revalidation results deterministically.
    pub async fn wait_background(&self) {
        self.tasks.close();
        self.tasks.wait().await;
        self.tasks.reopen();
    }

    pub(crate) fn shell_partition(&self) -> String {
        self.config.partition_name(PartitionKind::Shell)
    }

    pub(crate) fn is_cacheable_navigation(&self, path: &str) -> bool {
        self.navigation_paths.contains(path) || path == crate::routes::ROOT_DOCUMENT_KEY
    }

    pub(crate) fn db(&self) -> &CacheDb {
        &self.db
    }

    pub(crate) fn network(&self) -> &Arc<dyn Network> {
        &self.network
    }
}
