//! File span exporter (C4): persists finished spans into per-session
//! gzipped JSONL files, with LRU writer caching, size-based rotation, a
//! single-writer advisory lock, and graceful degradation on disk-full or
//! permission-denied conditions.

pub mod error;
pub mod lock;
pub mod writer;

pub use error::{Error, Result};

use inspector_types::Span;
use lock::{AdvisoryLock, LockOutcome};
use lru::LruCache;
use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use writer::SessionWriter;

/// Maximum number of concurrently open gzip writers (§4.4).
pub const MAX_OPEN_WRITERS: usize = 50;

const UNKNOWN_SESSION: &str = "unknown";

/// Notable events the exporter wants surfaced on the event bus (C6), kept
/// as a minimal enum here so this crate doesn't need to depend on
/// `inspector-events`; the caller wires these into `EventPayload` at the
/// process level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExporterNotice {
    /// The exporter transitioned into no-op mode because disk writes are
    /// failing (§7 `StorageFull`). Emitted once per transition.
    DiskSpaceLow { traces_dir: PathBuf },
    /// A peer process holds the advisory lock; this exporter will drop
    /// spans for its whole lifetime (§7 `LockHeld`). Emitted once.
    ExporterDisabled { reason: String },
}

/// Receives [`ExporterNotice`]s as they occur. Implemented by the process
/// wiring that also owns the event bus; the default no-op sink is used in
/// tests that don't care about notices.
pub trait NoticeSink: Send + Sync {
    fn notify(&self, notice: ExporterNotice);
}

impl NoticeSink for () {
    fn notify(&self, _notice: ExporterNotice) {}
}

impl NoticeSink for Box<dyn NoticeSink> {
    fn notify(&self, notice: ExporterNotice) {
        (**self).notify(notice)
    }
}

/// Outcome of one `export` call: how many spans were written, and whether
/// any were dropped (no-op mode, or a per-span quarantine).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportOutcome {
    pub written: usize,
    pub dropped: usize,
}

enum Mode {
    Active { writers: LruCache<String, SessionWriter> },
    NoOp,
}

/// The file span exporter itself. One instance owns the traces directory
/// for the process lifetime; `export` may be called from any task.
pub struct FileSpanExporter<N: NoticeSink = Box<dyn NoticeSink>> {
    traces_dir: PathBuf,
    state: Mutex<Mode>,
    _lock: Option<AdvisoryLock>,
    notices: N,
    notified_disk_space_low: Mutex<bool>,
}

impl FileSpanExporter<Box<dyn NoticeSink>> {
    /// Resolve `preferred_dir`, acquire the advisory lock, and fall back to
    /// a writable temp directory on permission failure (§4.4).
    pub fn new(preferred_dir: &Path, notices: Box<dyn NoticeSink>) -> Self {
        let traces_dir = resolve_traces_dir(preferred_dir);
        let (lock, notices) = match std::fs::create_dir_all(&traces_dir).and_then(|_| lock::acquire(&traces_dir)) {
            Ok(LockOutcome::Acquired(lock)) => (Some(lock), notices),
            Ok(LockOutcome::HeldByPeer { pid }) => {
                notices.notify(ExporterNotice::ExporterDisabled {
                    reason: format!("advisory lock held by pid {pid}"),
                });
                (None, notices)
            }
            Err(err) => {
                tracing::warn!(error = %err, dir = %traces_dir.display(), "failed to acquire exporter lock; disabling exporter");
                notices.notify(ExporterNotice::ExporterDisabled {
                    reason: format!("failed to acquire lock: {err}"),
                });
                (None, notices)
            }
        };
        let mode = if lock.is_some() {
            Mode::Active {
                writers: LruCache::new(NonZeroUsize::new(MAX_OPEN_WRITERS).unwrap()),
            }
        } else {
            Mode::NoOp
        };
        Self {
            traces_dir,
            state: Mutex::new(mode),
            _lock: lock,
            notices,
            notified_disk_space_low: Mutex::new(false),
        }
    }
}

impl<N: NoticeSink> FileSpanExporter<N> {
    pub fn traces_dir(&self) -> &Path {
        &self.traces_dir
    }

    pub fn is_active(&self) -> bool {
        matches!(*self.state.lock().expect("exporter lock poisoned"), Mode::Active { .. })
    }

    /// Append `spans`, grouped by their `session.id` attribute (falling
    /// back to `"unknown"`), one JSON line per span. A per-session write
    /// failure quarantines that session's file and continues with the
    /// rest of the batch rather than dropping the whole batch (§4.4).
    pub fn export(&self, spans: &[Span]) -> ExportOutcome {
        let mut outcome = ExportOutcome::default();
        let mut grouped: std::collections::BTreeMap<&str, Vec<&Span>> = std::collections::BTreeMap::new();
        for span in spans {
            let session_id = span.session_id();
            let key = if session_id.is_empty() { UNKNOWN_SESSION } else { session_id };
            grouped.entry(key).or_default().push(span);
        }

        let mut failed_sessions = HashSet::new();
        for (session_id, session_spans) in grouped {
            match self.export_session(session_id, &session_spans) {
                Ok(written) => {
                    outcome.written += written;
                    self.clear_disk_space_low();
                }
                Err(err) => {
                    outcome.dropped += session_spans.len();
                    failed_sessions.insert(session_id.to_string());
                    tracing::warn!(session_id, error = %err, "span export failed; quarantining session file");
                }
            }
        }
        if !failed_sessions.is_empty() {
            self.raise_disk_space_low();
        }
        outcome
    }

    fn export_session(&self, session_id: &str, spans: &[&Span]) -> Result<usize> {
        let mut state = self.state.lock().expect("exporter lock poisoned");
        let writers = match &mut *state {
            Mode::NoOp => return Ok(0),
            Mode::Active { writers } => writers,
        };

        if !writers.contains(session_id) {
            if writers.len() >= MAX_OPEN_WRITERS {
                if let Some((_, evicted)) = writers.pop_lru() {
                    let _ = evicted.close();
                }
            }
            let writer = SessionWriter::open(&self.traces_dir, session_id)?;
            writers.put(session_id.to_string(), writer);
        }

        let writer = writers.get_mut(session_id).expect("just inserted");
        let mut written = 0;
        for span in spans {
            match serde_json::to_vec(span) {
                Ok(mut line) => {
                    line.push(b'\n');
                    if let Err(err) = writer.append_line(&line) {
                        tracing::warn!(session_id, error = %err, "gzip append failed; quarantining file");
                        if let Some(bad_writer) = writers.pop(session_id) {
                            let _ = bad_writer.quarantine();
                        }
                        let fresh = SessionWriter::open(&self.traces_dir, session_id)?;
                        writers.put(session_id.to_string(), fresh);
                        return Err(err);
                    }
                    written += 1;
                }
                Err(err) => {
                    tracing::warn!(session_id, error = %err, "span serialization failed; skipping span");
                }
            }
        }
        writers.get_mut(session_id).expect("just written").flush()?;
        Ok(written)
    }

    fn raise_disk_space_low(&self) {
        let mut notified = self.notified_disk_space_low.lock().expect("poisoned");
        if !*notified {
            *notified = true;
            self.notices.notify(ExporterNotice::DiskSpaceLow {
                traces_dir: self.traces_dir.clone(),
            });
        }
    }

    fn clear_disk_space_low(&self) {
        let mut notified = self.notified_disk_space_low.lock().expect("poisoned");
        *notified = false;
    }

    /// Flush and close every open writer. Called on process shutdown.
    pub fn shutdown(self) -> Result<()> {
        let mut state = self.state.lock().expect("exporter lock poisoned");
        if let Mode::Active { writers } = &mut *state {
            while let Some((_, writer)) = writers.pop_lru() {
                writer.close()?;
            }
        }
        Ok(())
    }
}

/// Resolve the traces directory: `preferred_dir` if it (or its parent) is
/// writable, else fall back to a process-scoped temp directory (§4.4
/// "permission denied on default dir").
fn resolve_traces_dir(preferred_dir: &Path) -> PathBuf {
    if std::fs::create_dir_all(preferred_dir).is_ok() && probe_writable(preferred_dir) {
        return preferred_dir.to_path_buf();
    }
    tracing::warn!(dir = %preferred_dir.display(), "traces dir not writable; falling back to temp dir");
    std::env::temp_dir().join("mcp_traces_fallback")
}

fn probe_writable(dir: &Path) -> bool {
    let probe = dir.join(".write-probe");
    match std::fs::File::create(&probe) {
        Ok(_) => {
            let _ = std::fs::remove_file(&probe);
            true
        }
        Err(_) => false,
    }
}

/// Default per-user traces directory: `~/.mcp_traces`, before `TRACES_DIR`
/// environment/config overrides are applied by the caller.
pub fn default_traces_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".mcp_traces")
}

#[cfg(test)]
mod tests {
    use super::*;
    use inspector_types::{AttributeMap, AttributeValue, Span, SpanKind, SpanStatus};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    fn span_for(session_id: &str, name: &str) -> Span {
        let mut attrs = AttributeMap::new();
        attrs.insert("session.id".to_string(), AttributeValue::Str(session_id.to_string()));
        Span {
            trace_id: "a".repeat(32),
            span_id: "b".repeat(16),
            parent_span_id: None,
            name: name.to_string(),
            kind: SpanKind::Internal,
            start_time: chrono::Utc::now(),
            end_time: Some(chrono::Utc::now()),
            status: SpanStatus::default(),
            attributes: attrs,
            events: Vec::new(),
            links: Vec::new(),
        }
    }

    #[derive(Default)]
    struct CountingSink {
        count: AtomicUsize,
    }
    impl NoticeSink for CountingSink {
        fn notify(&self, _notice: ExporterNotice) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn exports_spans_grouped_by_session() {
        let dir = tempdir().unwrap();
        let exporter = FileSpanExporter::new(dir.path(), Box::new(()));
        let spans = vec![span_for("abcdef", "one"), span_for("ghijkl", "two")];
        let outcome = exporter.export(&spans);
        assert_eq!(outcome, ExportOutcome { written: 2, dropped: 0 });
        assert!(dir.path().join("abcdef.jsonl.gz").exists());
        assert!(dir.path().join("ghijkl.jsonl.gz").exists());
    }

    #[test]
    fn falls_back_to_unknown_session_bucket() {
        let dir = tempdir().unwrap();
        let exporter = FileSpanExporter::new(dir.path(), Box::new(()));
        let mut span = span_for("abcdef", "one");
        span.attributes.clear();
        exporter.export(&[span]);
        assert!(dir.path().join("unknown.jsonl.gz").exists());
    }

    #[test]
    fn second_process_lock_holder_drops_spans() {
        let dir = tempdir().unwrap();
        let _first = FileSpanExporter::new(dir.path(), Box::new(()));
        let second = FileSpanExporter::new(dir.path(), Box::new(()));
        assert!(!second.is_active());
        let outcome = second.export(&[span_for("abcdef", "one")]);
        assert_eq!(outcome, ExportOutcome { written: 0, dropped: 0 });
    }

    #[test]
    fn shutdown_closes_all_writers() {
        let dir = tempdir().unwrap();
        let exporter = FileSpanExporter::new(dir.path(), Box::new(()));
        exporter.export(&[span_for("abcdef", "one")]);
        exporter.shutdown().unwrap();
    }
}
