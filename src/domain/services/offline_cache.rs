#[cfg(test)]
#[path = "offline_cache_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;
use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::domain::models::CacheManifest;
use crate::domain::models::FetchRequest;
use crate::domain::models::FetchResponse;
use crate::domain::models::FetchSource;
use crate::domain::models::WorkerLifecycle;
use crate::infrastructure::cache_storage::CacheStorage;

/// Client side of the worker's request/response protocol. Cloneable, shares
/// nothing with the worker but the channel.
#[derive(Clone)]
pub struct OfflineCacheHandle {
    tx: mpsc::UnboundedSender<FetchRequest>,
}

impl OfflineCacheHandle {
    pub async fn fetch(&self, url: &str) -> Result<FetchResponse> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx.send(FetchRequest {
            url: url.to_string(),
            reply: reply_tx,
        })?;

        return reply_rx.await?;
    }
}

pub struct OfflineCacheWorker {
    client: reqwest::Client,
    storage: CacheStorage,
    manifest: CacheManifest,
    gateway_marker: String,
    lifecycle: WorkerLifecycle,
}

impl OfflineCacheWorker {
    pub fn new(
        storage: CacheStorage,
        manifest: CacheManifest,
        gateway_marker: &str,
    ) -> OfflineCacheWorker {
        return OfflineCacheWorker {
            client: reqwest::Client::new(),
            storage,
            manifest,
            gateway_marker: gateway_marker.to_string(),
            lifecycle: WorkerLifecycle::Installing,
        };
    }

    pub fn lifecycle(&self) -> WorkerLifecycle {
        return self.lifecycle;
    }

    pub fn version(&self) -> &str {
        return &self.manifest.version;
    }

    async fn fetch_network(&self, url: &str) -> Result<FetchResponse> {
        let res = self.client.get(url).send().await?;
        let status = res.status().as_u16();
        let body = res.bytes().await?.to_vec();

        return Ok(FetchResponse {
            url: url.to_string(),
            status,
            body,
            source: FetchSource::Network,
        });
    }

    /// Downloads every manifest asset and stores them under the manifest
    /// version. Nothing is stored unless all assets arrive with a success
    /// status; a failed install leaves the worker redundant.
    pub async fn install(&mut self) -> Result<()> {
        self.lifecycle = WorkerLifecycle::Installing;

        let mut entries: Vec<(String, Vec<u8>)> = vec![];
        for url in self.manifest.assets.iter() {
            let res = match self.fetch_network(url).await {
                Ok(res) => res,
                Err(err) => {
                    self.lifecycle = WorkerLifecycle::Redundant;
                    return Err(err.context(format!("Failed to fetch offline asset {url}")));
                }
            };

            if !(200..300).contains(&res.status) {
                self.lifecycle = WorkerLifecycle::Redundant;
                bail!(format!(
                    "Failed to fetch offline asset {url}, status {}",
                    res.status
                ));
            }

            entries.push((res.url, res.body));
        }

        if let Err(err) = self.storage.put_all(&self.manifest.version, entries).await {
            self.lifecycle = WorkerLifecycle::Redundant;
            return Err(err);
        }

        tracing::info!(
            version = self.manifest.version,
            assets = self.manifest.assets.len(),
            "offline cache installed"
        );
        self.lifecycle = WorkerLifecycle::Waiting;

        return Ok(());
    }

    /// Deletes every cache store other than the current version and starts
    /// intercepting fetches. Returns the names of the deleted stores.
    pub async fn activate(&mut self) -> Result<Vec<String>> {
        if self.lifecycle != WorkerLifecycle::Waiting {
            bail!(format!(
                "Offline cache worker can't activate while {}",
                self.lifecycle
            ));
        }

        let mut deleted: Vec<String> = vec![];
        for name in self.storage.keys().await? {
            if name == self.manifest.version {
                continue;
            }

            self.storage.delete(&name).await?;
            deleted.push(name);
        }

        tracing::info!(
            version = self.manifest.version,
            deleted = ?deleted,
            "offline cache activated"
        );
        self.lifecycle = WorkerLifecycle::Active;

        return Ok(deleted);
    }

    fn cached(url: &str, body: Vec<u8>) -> FetchResponse {
        return FetchResponse {
            url: url.to_string(),
            status: 200,
            body,
            source: FetchSource::Cache,
        };
    }

    /// Answers an intercepted request. Gateway calls always go to the network.
    /// An active worker reads only its own version's store; before activation,
    /// or after a failed upgrade, any surviving store is searched, newest name
    /// first. Network results are never written back.
    pub async fn handle_fetch(&self, url: &str) -> Result<FetchResponse> {
        if url.contains(&self.gateway_marker) {
            return self.fetch_network(url).await;
        }

        if self.lifecycle == WorkerLifecycle::Active {
            if let Some(body) = self.storage.get(&self.manifest.version, url).await? {
                tracing::debug!(url = url, "offline cache hit");
                return Ok(OfflineCacheWorker::cached(url, body));
            }

            return self.fetch_network(url).await;
        }

        for name in self.storage.keys().await?.iter().rev() {
            if let Ok(Some(body)) = self.storage.get(name, url).await {
                tracing::debug!(url = url, store = name, lifecycle = %self.lifecycle, "offline cache hit");
                return Ok(OfflineCacheWorker::cached(url, body));
            }
        }

        return self.fetch_network(url).await;
    }

    /// Registers the worker on its own task: install, activate right away, then
    /// serve fetch requests until every handle is dropped. A failed install or
    /// activation is logged and the worker keeps serving from whatever stores
    /// survived.
    pub fn spawn(mut self) -> (OfflineCacheHandle, JoinHandle<Result<()>>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<FetchRequest>();

        let worker = tokio::spawn(async move {
            match self.install().await {
                Ok(()) => {
                    if let Err(err) = self.activate().await {
                        tracing::warn!(error = ?err, version = self.manifest.version, "offline cache activation failed");
                    }
                }
                Err(err) => {
                    tracing::warn!(error = ?err, version = self.manifest.version, "offline cache install failed");
                }
            }

            while let Some(req) = rx.recv().await {
                let res = self.handle_fetch(&req.url).await;
                if req.reply.send(res).is_err() {
                    tracing::debug!(url = req.url, "fetch requester went away");
                }
            }

            return Ok(());
        });

        return (OfflineCacheHandle { tx }, worker);
    }
}
