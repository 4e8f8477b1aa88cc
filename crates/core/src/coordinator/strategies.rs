//! The three fetch strategies: navigation, cache-first, and
//! stale-while-revalidate.
//!
//! Failure policy, per strategy:
//! - navigation degrades through shell cache -> offline document ->
//!   synthetic 503, never an error
//! - cache-first propagates a double miss (no cache entry, network down)
//! - stale-while-revalidate degrades to the offline JSON envelope

use crate::cache::StoredResponse;
use crate::error::Error;
use crate::fallback;
use crate::request::{ResourceRequest, ResourceResponse};
use crate::routes::{PartitionKind, ROOT_DOCUMENT_KEY};

use super::Coordinator;

impl Coordinator {
    /// Navigation strategy: network first, shell cache on failure.
    ///
    /// Successful documents for allow-listed paths (and the site root) are
    /// written into the shell partition in the background, keyed by
    /// normalized pathname; the query string never reaches the key.
    pub(crate) async fn handle_navigation(&self, request: &ResourceRequest) -> Result<ResourceResponse, Error> {
        let normalized = self.config().normalize_path(&request.url);

        match self.network().fetch(request).await {
            Ok(response) => {
                if response.is_ok()
                    && let Some(path) = &normalized
                    && self.is_cacheable_navigation(path)
                {
                    self.spawn_write(self.shell_partition(), path.clone(), StoredResponse::capture(&response));
                }
                Ok(response)
            }
            Err(err) => {
                tracing::debug!(url = %request.url, error = %err, "navigation fell back to shell cache");
                let shell = self.shell_partition();

                if let Some(path) = &normalized {
                    if path == ROOT_DOCUMENT_KEY
                        && let Some(home) = self.db().match_entry(&shell, ROOT_DOCUMENT_KEY).await?
                    {
                        return Ok(home.into_response());
                    }
                    if let Some(page) = self.db().match_entry(&shell, path).await? {
                        return Ok(page.into_response());
                    }
                }

                if let Some(doc) = self.db().match_entry(&shell, &self.config().offline_document_path).await? {
                    return Ok(doc.into_response());
                }

                tracing::warn!(url = %request.url, "offline navigation with no precached fallback");
                Ok(fallback::offline_document_missing())
            }
        }
    }

    /// Cache-first: serve the partition entry if present, else fetch and
    /// populate. A miss with the network down propagates the failure; the
    /// caller surfaces its own network-error signal.
    pub(crate) async fn cache_first(
        &self,
        request: &ResourceRequest,
        path: &str,
        kind: PartitionKind,
    ) -> Result<ResourceResponse, Error> {
        let partition = self.config().partition_name(kind);

        if let Some(hit) = self.db().match_entry(&partition, path).await? {
            return Ok(hit.into_response());
        }

        let response = self.network().fetch(request).await?;
        if response.is_ok() {
            self.db().put_entry(&partition, path, StoredResponse::capture(&response)).await?;
        }
        Ok(response)
    }

    /// Stale-while-revalidate: a cached entry is served immediately,
    /// staleness deliberate, while a background fetch refreshes the
    /// partition. A miss awaits the network; with the network down, the
    /// offline JSON envelope is the answer.
    pub(crate) async fn stale_while_revalidate(
        &self,
        request: &ResourceRequest,
        path: &str,
        kind: PartitionKind,
    ) -> Result<ResourceResponse, Error> {
        let partition = self.config().partition_name(kind);

        if let Some(hit) = self.db().match_entry(&partition, path).await? {
            self.spawn_revalidate(request.clone(), partition, path.to_string());
            return Ok(hit.into_response());
        }

        match self.network().fetch(request).await {
            Ok(response) => {
                if response.is_ok() {
                    self.db().put_entry(&partition, path, StoredResponse::capture(&response)).await?;
                }
                Ok(response)
            }
            Err(err) => {
                tracing::debug!(url = %request.url, error = %err, "data request offline with empty cache");
                Ok(fallback::offline_data_envelope())
            }
        }
    }

    /// Fire-and-forget refresh of a partition entry. Errors and non-ok
    /// responses leave the existing entry untouched.
    fn spawn_revalidate(&self, request: ResourceRequest, partition: String, path: String) {
        let network = self.network().clone();
        let db = self.db().clone();
        self.tasks.spawn(async move {
            match network.fetch(&request).await {
                Ok(fresh) if fresh.is_ok() => {
                    if let Err(err) = db.put_entry(&partition, &path, StoredResponse::capture(&fresh)).await {
                        tracing::warn!(%partition, %path, error = %err, "revalidation write failed");
                    }
                }
                Ok(fresh) => {
                    tracing::debug!(%path, status = fresh.status, "revalidation returned non-ok; keeping entry");
                }
                Err(err) => {
                    tracing::debug!(%path, error = %err, "revalidation fetch failed; keeping entry");
                }
            }
        });
    }
}
