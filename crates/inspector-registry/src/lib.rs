//! Session registry (C5): merges filesystem trace files, the live
//! in-memory registry, and an optional external workflow service into one
//! sorted session listing.

pub mod error;
pub mod external;
pub mod live;
pub mod metadata;

pub use error::{Error, Result};
pub use external::{fetch_with_timeout, ExternalSessionSource, DEFAULT_TIMEOUT};
pub use live::LiveRegistry;
pub use metadata::MetadataCache;

use inspector_types::SessionMeta;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use walkdir::WalkDir;

/// The full result of [`Registry::list`]: the merged, sorted sessions plus
/// an optional note about a degraded external query (§4.5 graceful
/// degradation / §7 `Degraded`).
#[derive(Debug, Clone, Default)]
pub struct SessionList {
    pub sessions: Vec<SessionMeta>,
    pub temporal_error: Option<String>,
}

pub struct Registry {
    traces_dir: PathBuf,
    cache: MetadataCache,
    live: std::sync::Arc<LiveRegistry>,
    external: Option<std::sync::Arc<dyn ExternalSessionSource>>,
    external_timeout: Duration,
}

impl Registry {
    pub fn new(traces_dir: impl Into<PathBuf>, live: std::sync::Arc<LiveRegistry>) -> Self {
        Self {
            traces_dir: traces_dir.into(),
            cache: MetadataCache::new(),
            live,
            external: None,
            external_timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_external_source(mut self, source: std::sync::Arc<dyn ExternalSessionSource>) -> Self {
        self.external = Some(source);
        self
    }

    pub fn with_external_timeout(mut self, timeout: Duration) -> Self {
        self.external_timeout = timeout;
        self
    }

    /// Enumerate `*.jsonl.gz` trace files (including rotated chunks),
    /// merge with live sessions and an optional external source, and
    /// return the sorted listing (§4.5).
    pub async fn list(&self) -> SessionList {
        let mut by_id = self.list_from_files();

        // Live sessions take precedence for status (§4.5 step 2): either
        // overriding a file-derived entry's status, or, for a session
        // with no trace file yet, contributing a fresh entry.
        for live_session in self.live.snapshot() {
            by_id
                .entry(live_session.meta.id.clone())
                .and_modify(|meta| {
                    meta.status = live_session.meta.status;
                    if live_session.meta.ended_at.is_some() {
                        meta.ended_at = live_session.meta.ended_at;
                    }
                })
                .or_insert(live_session.meta);
        }

        let mut temporal_error = None;
        if let Some(source) = &self.external {
            match fetch_with_timeout(source.as_ref(), self.external_timeout).await {
                Ok(external_sessions) => {
                    for session in external_sessions {
                        by_id.entry(session.id.clone()).or_insert(session);
                    }
                }
                Err(err) => temporal_error = Some(err),
            }
        }

        let mut sessions: Vec<SessionMeta> = by_id.into_values().collect();
        sessions.sort_by(|a, b| b.started_at.cmp(&a.started_at));

        SessionList { sessions, temporal_error }
    }

    fn list_from_files(&self) -> HashMap<String, SessionMeta> {
        let mut by_id: HashMap<String, SessionMeta> = HashMap::new();
        if !self.traces_dir.exists() {
            return by_id;
        }
        for entry in WalkDir::new(&self.traces_dir).max_depth(1).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy();
            if !file_name.ends_with(".jsonl.gz") {
                continue;
            }
            match self.cache.extract(entry.path()) {
                Some(meta) => {
                    merge_chunk(&mut by_id, meta);
                }
                None => {
                    tracing::warn!(path = %entry.path().display(), "skipping unreadable/corrupt trace file");
                }
            }
        }
        by_id
    }

    pub fn traces_dir(&self) -> &Path {
        &self.traces_dir
    }
}

/// When a session has multiple chunk files, keep the entry with the
/// earliest `started_at` (the base chunk) but prefer a later `ended_at`
/// (the most recently written chunk holds the freshest tail).
fn merge_chunk(by_id: &mut HashMap<String, SessionMeta>, meta: SessionMeta) {
    by_id
        .entry(meta.id.clone())
        .and_modify(|existing| {
            if meta.started_at < existing.started_at {
                existing.started_at = meta.started_at;
            }
            match (existing.ended_at, meta.ended_at) {
                (Some(a), Some(b)) if b > a => existing.ended_at = meta.ended_at,
                (None, Some(_)) => existing.ended_at = meta.ended_at,
                _ => {}
            }
            if meta.ended_at.is_some() {
                existing.status = meta.status;
            }
        })
        .or_insert(meta);
}
