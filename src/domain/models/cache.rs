#[cfg(test)]
#[path = "cache_test.rs"]
mod tests;

use anyhow::Result;
use tokio::sync::oneshot;

/// Paths of the assets the offline cache guarantees.
pub const DEFAULT_ASSETS: [&str; 4] = ["/", "/index.html", "/manifest.json", "/index.tsx"];

/// Named, versioned set of asset URLs available offline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheManifest {
    pub version: String,
    pub assets: Vec<String>,
}

impl CacheManifest {
    pub fn new(version: &str, origin: &str, paths: &[&str]) -> CacheManifest {
        let origin = origin.trim_end_matches('/');
        let assets = paths
            .iter()
            .map(|path| {
                if path.starts_with('/') {
                    return format!("{origin}{path}");
                }
                return format!("{origin}/{path}");
            })
            .collect();

        return CacheManifest {
            version: version.to_string(),
            assets,
        };
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum WorkerLifecycle {
    Installing,
    Waiting,
    Active,
    Redundant,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum FetchSource {
    Cache,
    Network,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchResponse {
    pub url: String,
    pub status: u16,
    pub body: Vec<u8>,
    pub source: FetchSource,
}

/// A request intercepted by the offline cache worker. The answer is delivered
/// once through `reply`.
#[derive(Debug)]
pub struct FetchRequest {
    pub url: String,
    pub reply: oneshot::Sender<Result<FetchResponse>>,
}
