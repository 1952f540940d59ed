//! Warming adjacent playlist items

use crate::content::ItemId;
use crate::utils::error::{Result, ShowreelError};
use log::{debug, warn};
use reqwest::header::RANGE;
use std::collections::{BTreeSet, HashMap};
use std::time::Duration;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use url::Url;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrefetchError {
    #[error("cannot prefetch {0}: not an absolute http(s) URL")]
    UnsupportedUrl(String),

    #[error("prefetch rejected: {0}")]
    Rejected(String),
}

/// Something that can warm a media URL ahead of playback
pub trait Prefetcher: Send {
    /// Start warming `url`. Calling again for an item already in flight is a no-op.
    fn prefetch(&mut self, item: &ItemId, url: &str) -> std::result::Result<(), PrefetchError>;

    /// Abandon a hint
    fn cancel(&mut self, item: &ItemId);
}

/// Keeps at most one hint per adjacent item
#[derive(Default)]
pub struct PrefetchTracker {
    prefetcher: Option<Box<dyn Prefetcher>>,
    outstanding: BTreeSet<ItemId>,
}

impl PrefetchTracker {
    /// Tracker that never issues hints
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn new(prefetcher: Box<dyn Prefetcher>) -> Self {
        Self {
            prefetcher: Some(prefetcher),
            outstanding: BTreeSet::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.prefetcher.is_some()
    }

    pub fn is_outstanding(&self, item: &ItemId) -> bool {
        self.outstanding.contains(item)
    }

    pub fn outstanding(&self) -> impl Iterator<Item = &ItemId> {
        self.outstanding.iter()
    }

    /// Make `wanted` the outstanding set
    ///
    /// Hints not in `wanted` are retracted. Returns the items newly hinted.
    pub fn update(&mut self, wanted: &[(ItemId, String)]) -> Vec<ItemId> {
        let keep: Vec<ItemId> = wanted.iter().map(|(id, _)| id.clone()).collect();
        self.retain(&keep);

        let Some(prefetcher) = self.prefetcher.as_mut() else {
            return Vec::new();
        };

        let mut issued = Vec::new();
        for (id, url) in wanted {
            if self.outstanding.contains(id) {
                continue;
            }

            match prefetcher.prefetch(id, url) {
                Ok(()) => {
                    debug!("Prefetching {} from {}", id, url);
                    self.outstanding.insert(id.clone());
                    issued.push(id.clone());
                }
                Err(e) => warn!("Skipping prefetch of {}: {}", id, e),
            }
        }

        issued
    }

    /// Retract every hint whose item is not in `keep`
    pub fn retain(&mut self, keep: &[ItemId]) {
        let stale: Vec<ItemId> = self
            .outstanding
            .iter()
            .filter(|id| !keep.contains(id))
            .cloned()
            .collect();

        for id in stale {
            if let Some(prefetcher) = self.prefetcher.as_mut() {
                prefetcher.cancel(&id);
            }
            debug!("Retracted prefetch of {}", id);
            self.outstanding.remove(&id);
        }
    }

    pub fn clear(&mut self) {
        self.retain(&[]);
    }
}

/// Warms media by fetching its first bytes with a ranged GET
pub struct HttpPrefetcher {
    client: reqwest::Client,
    runtime: Handle,
    bytes: u64,
    tasks: HashMap<ItemId, JoinHandle<()>>,
}

impl HttpPrefetcher {
    /// Must be created inside a tokio runtime
    pub fn new(bytes: u64) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| {
            ShowreelError::Configuration("prefetching requires a tokio runtime".to_string())
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            runtime,
            bytes: bytes.max(1),
            tasks: HashMap::new(),
        })
    }

    pub fn in_flight(&self) -> usize {
        self.tasks.values().filter(|task| !task.is_finished()).count()
    }
}

impl Prefetcher for HttpPrefetcher {
    fn prefetch(&mut self, item: &ItemId, url: &str) -> std::result::Result<(), PrefetchError> {
        let parsed = Url::parse(url).map_err(|_| PrefetchError::UnsupportedUrl(url.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(PrefetchError::UnsupportedUrl(url.to_string()));
        }

        if self.tasks.get(item).map_or(false, |task| !task.is_finished()) {
            return Ok(());
        }

        let client = self.client.clone();
        let range = format!("bytes=0-{}", self.bytes - 1);
        let id = item.clone();

        let task = self.runtime.spawn(async move {
            let response = match client.get(parsed).header(RANGE, range).send().await {
                Ok(response) => response,
                Err(e) => {
                    debug!("Prefetch of {} failed: {}", id, e);
                    return;
                }
            };

            match response.bytes().await {
                Ok(body) => debug!("Prefetched {} bytes of {}", body.len(), id),
                Err(e) => debug!("Prefetch of {} failed: {}", id, e),
            }
        });

        self.tasks.insert(item.clone(), task);
        Ok(())
    }

    fn cancel(&mut self, item: &ItemId) {
        if let Some(task) = self.tasks.remove(item) {
            task.abort();
        }
    }
}

impl Drop for HttpPrefetcher {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}
