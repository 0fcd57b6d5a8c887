//! Extract [`SessionMeta`] from a trace file's first and last JSONL lines,
//! with a bounded (path, mtime)-keyed cache (§4.5 Caching).

use chrono::{DateTime, Utc};
use flate2::read::MultiGzDecoder;
use inspector_types::{Engine, Span, SessionMeta, SessionStatus};
use lru::LruCache;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;

/// Bound on the number of cached extraction results (§4.5).
pub const CACHE_CAPACITY: usize = 1000;

/// Cache key: path plus the file's modification time, so a rewritten file
/// (same path, new mtime) invalidates automatically.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    path: String,
    mtime_nanos: i128,
}

/// Thread-safe LRU cache of extraction results.
pub struct MetadataCache {
    inner: Mutex<LruCache<CacheKey, SessionMeta>>,
}

impl Default for MetadataCache {
    fn default() -> Self {
        Self {
            inner: Mutex::new(LruCache::new(NonZeroUsize::new(CACHE_CAPACITY).unwrap())),
        }
    }
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract metadata for `path`, consulting (and populating) the cache.
    /// Returns `None` if the file is unreadable or has no valid first
    /// line — callers should log and skip, not fail the whole listing.
    pub fn extract(&self, path: &Path) -> Option<SessionMeta> {
        let mtime_nanos = mtime_nanos(path)?;
        let key = CacheKey {
            path: path.to_string_lossy().into_owned(),
            mtime_nanos,
        };
        if let Some(hit) = self.inner.lock().expect("metadata cache poisoned").get(&key).cloned() {
            return Some(hit);
        }
        let meta = extract_uncached(path)?;
        self.inner
            .lock()
            .expect("metadata cache poisoned")
            .put(key, meta.clone());
        Some(meta)
    }
}

fn mtime_nanos(path: &Path) -> Option<i128> {
    let meta = std::fs::metadata(path).ok()?;
    let modified = meta.modified().ok()?;
    let duration = modified.duration_since(SystemTime::UNIX_EPOCH).ok()?;
    Some(duration.as_nanos() as i128)
}

/// Session-id parsed out of a trace file's name, stripping the optional
/// `_chunk_{n}` suffix so rotated chunks group under their session.
pub fn session_id_from_filename(file_name: &str) -> Option<&str> {
    let base = file_name.strip_suffix(".jsonl.gz")?;
    Some(match base.find("_chunk_") {
        Some(idx) => &base[..idx],
        None => base,
    })
}

/// `MultiGzDecoder` rather than a single-member `GzDecoder`: the exporter
/// appends a new gzip member each time a writer is reopened after LRU
/// eviction or a process restart (§4.4), so a trace file is in general a
/// concatenation of gzip streams. A single-member decoder would silently
/// stop at the first member and miss the session's actual last line.
fn open_lines(path: &Path) -> Option<BufReader<MultiGzDecoder<File>>> {
    let file = File::open(path).ok()?;
    Some(BufReader::new(MultiGzDecoder::new(file)))
}

fn extract_uncached(path: &Path) -> Option<SessionMeta> {
    let reader = open_lines(path)?;
    let mut lines = reader.lines();
    let first_line = lines.next()?.ok()?;
    let first_span: Span = serde_json::from_str(&first_line).ok()?;

    let mut last_span: Option<Span> = None;
    for line in lines {
        let Ok(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Span>(&line) {
            Ok(span) => last_span = Some(span),
            Err(_) => break,
        }
    }

    let session_id = first_span.session_id().to_string();
    let engine = engine_attr(&first_span).unwrap_or(Engine::Local);
    let title = title_attr(&first_span).unwrap_or_else(|| first_span.name.clone());
    let tags = tags_attr(&first_span);
    let started_at = first_span.start_time;

    let ended_span = last_span.as_ref().filter(|s| s.end_time.is_some());
    let ended_at: Option<DateTime<Utc>> = ended_span.and_then(|s| s.end_time);
    let status = ended_span.map(|_| SessionStatus::Completed).unwrap_or(SessionStatus::Running);

    Some(SessionMeta {
        id: session_id,
        status,
        engine,
        started_at,
        ended_at,
        title,
        tags,
        span_count: None,
    })
}

fn engine_attr(span: &Span) -> Option<Engine> {
    match span.attributes.get("mcp.session.engine") {
        Some(inspector_types::AttributeValue::Str(s)) => match s.as_str() {
            "external-workflow" => Some(Engine::ExternalWorkflow),
            "inbound-request" => Some(Engine::InboundRequest),
            "local" => Some(Engine::Local),
            _ => None,
        },
        _ => None,
    }
}

fn title_attr(span: &Span) -> Option<String> {
    match span.attributes.get("mcp.session.title") {
        Some(inspector_types::AttributeValue::Str(s)) => Some(s.clone()),
        _ => None,
    }
}

fn tags_attr(span: &Span) -> Option<Vec<String>> {
    match span.attributes.get("mcp.session.tags_json") {
        Some(inspector_types::AttributeValue::Str(s)) => serde_json::from_str(s).ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use inspector_types::{AttributeMap, SpanKind, SpanStatus};
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn strips_chunk_suffix_from_session_id() {
        assert_eq!(session_id_from_filename("abcdef.jsonl.gz"), Some("abcdef"));
        assert_eq!(session_id_from_filename("abcdef_chunk_3.jsonl.gz"), Some("abcdef"));
        assert_eq!(session_id_from_filename("abcdef.bad"), None);
    }

    fn span_line(name: &str, ended: bool) -> String {
        let span = Span {
            trace_id: "a".repeat(32),
            span_id: "b".repeat(16),
            parent_span_id: None,
            name: name.to_string(),
            kind: SpanKind::Internal,
            start_time: chrono::Utc::now(),
            end_time: ended.then(chrono::Utc::now),
            status: SpanStatus::default(),
            attributes: AttributeMap::new(),
            events: Vec::new(),
            links: Vec::new(),
        };
        let mut line = serde_json::to_string(&span).unwrap();
        line.push('\n');
        line
    }

    /// Metadata extraction reads the first line from an initial write and
    /// must also see the last line even when it landed in a second gzip
    /// member appended after a writer reopen (§4.4 quarantine/rotation).
    #[test]
    fn extracts_last_line_across_a_second_gzip_member() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("abcdef.jsonl.gz");
        {
            let file = File::create(&path).unwrap();
            let mut encoder = GzEncoder::new(file, Compression::default());
            encoder.write_all(span_line("first", false).as_bytes()).unwrap();
            encoder.finish().unwrap();
        }
        {
            let file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
            let mut encoder = GzEncoder::new(file, Compression::default());
            encoder.write_all(span_line("last", true).as_bytes()).unwrap();
            encoder.finish().unwrap();
        }

        let meta = extract_uncached(&path).expect("metadata extracted");
        assert_eq!(meta.status, SessionStatus::Completed);
        assert!(meta.ended_at.is_some());
    }
}
