//! Trace stream service (C8): serve `/trace/{id}` either as the raw gzip
//! file or, for a byte-range request, a decompressed slice.

use crate::error::InspectorError;
use flate2::read::MultiGzDecoder;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

/// A parsed `Range: bytes=a-b` header (inclusive on both ends).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

/// Parse a `Range` header value. Only the single-range `bytes=a-b` form is
/// supported (the only form the spec's gateway contract documents);
/// anything else is treated as absent rather than rejected, so an
/// unfamiliar header degrades to a full-file response instead of an error.
pub fn parse_range(header_value: &str) -> Option<ByteRange> {
    let rest = header_value.strip_prefix("bytes=")?;
    let (start_str, end_str) = rest.split_once('-')?;
    let start: u64 = start_str.trim().parse().ok()?;
    let end: u64 = end_str.trim().parse().ok()?;
    if end < start {
        return None;
    }
    Some(ByteRange { start, end })
}

/// Canonicalize `{traces_dir}/{session_id}.jsonl.gz` and reject any result
/// that resolves outside `traces_dir` (§4.8 step 1). Returns `None` for
/// anything that doesn't exist or escapes the directory — both cases are
/// reported as 404 by the caller to avoid enumeration (§4.8 security note).
pub fn resolve_trace_path(traces_dir: &Path, session_id: &str) -> Option<PathBuf> {
    let candidate = traces_dir.join(format!("{session_id}.jsonl.gz"));
    let canonical_dir = std::fs::canonicalize(traces_dir).ok()?;
    let canonical_file = std::fs::canonicalize(&candidate).ok()?;
    if canonical_file.starts_with(&canonical_dir) {
        Some(canonical_file)
    } else {
        None
    }
}

/// `ETag = "<size>-<mtime-ns>"` (§4.8 step 2).
pub fn compute_etag(path: &Path) -> std::io::Result<String> {
    let meta = std::fs::metadata(path)?;
    let mtime_nanos = meta
        .modified()?
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    Ok(format!("\"{}-{}\"", meta.len(), mtime_nanos))
}

/// Decompress `path` fully, then slice out `range` (§4.8 step 4). This
/// crate bounds trace chunk files at 100 MiB uncompressed (§3), so reading
/// the whole chunk to satisfy a range request is a deliberate simplicity
/// trade-off rather than a true streaming skip-and-emit; callers run this
/// inside `spawn_blocking` since it's synchronous IO.
///
/// Uses `MultiGzDecoder` rather than a single-member `GzDecoder`: a
/// writer reopened after LRU eviction or a process restart appends a new
/// gzip member rather than rewriting the file (§4.4), so a trace file is
/// in general a concatenation of gzip streams, not a single one.
pub fn read_range(path: &Path, range: ByteRange) -> Result<(Vec<u8>, u64), InspectorError> {
    let file = std::fs::File::open(path).map_err(|_| InspectorError::NotFound("trace not found".to_string()))?;
    let mut decoder = MultiGzDecoder::new(file);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|err| InspectorError::Validation(format!("failed to decompress trace: {err}")))?;
    let total = decompressed.len() as u64;

    if range.start >= total {
        return Err(InspectorError::RangeNotSatisfiable(format!(
            "range start {} beyond file size {}",
            range.start, total
        )));
    }
    let end = range.end.min(total.saturating_sub(1));
    let start = range.start as usize;
    let end_inclusive = end as usize;
    Ok((decompressed[start..=end_inclusive].to_vec(), total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_gz(path: &Path, contents: &[u8]) {
        let file = std::fs::File::create(path).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(contents).unwrap();
        encoder.finish().unwrap();
    }

    /// Append a second gzip member to an existing file, the way a reopened
    /// `SessionWriter` does after LRU eviction or a process restart.
    fn append_gz_member(path: &Path, contents: &[u8]) {
        let file = std::fs::OpenOptions::new().append(true).open(path).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(contents).unwrap();
        encoder.finish().unwrap();
    }

    #[test]
    fn parses_simple_byte_range() {
        assert_eq!(parse_range("bytes=200-399"), Some(ByteRange { start: 200, end: 399 }));
        assert_eq!(parse_range("bytes=0-0"), Some(ByteRange { start: 0, end: 0 }));
        assert_eq!(parse_range("bytes=400-200"), None);
        assert_eq!(parse_range("garbage"), None);
    }

    #[test]
    fn resolve_trace_path_rejects_traversal() {
        let dir = tempdir().unwrap();
        write_gz(&dir.path().join("abcdef.jsonl.gz"), b"line\n");
        assert!(resolve_trace_path(dir.path(), "abcdef").is_some());
        assert!(resolve_trace_path(dir.path(), "../etc").is_none());
        assert!(resolve_trace_path(dir.path(), "missing").is_none());
    }

    #[test]
    fn range_slice_matches_original_bytes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("abcdef.jsonl.gz");
        let line = "x".repeat(100) + "\n";
        let contents = line.repeat(10);
        write_gz(&path, contents.as_bytes());

        let (slice, total) = read_range(&path, ByteRange { start: 200, end: 399 }).unwrap();
        assert_eq!(total, 1010);
        assert_eq!(slice, contents.as_bytes()[200..400]);
    }

    #[test]
    fn range_one_byte_at_end_of_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("abcdef.jsonl.gz");
        let contents = "a".repeat(1010);
        write_gz(&path, contents.as_bytes());

        let (slice, total) = read_range(&path, ByteRange { start: 1009, end: 1009 }).unwrap();
        assert_eq!(total, 1010);
        assert_eq!(slice.len(), 1);
    }

    #[test]
    fn range_past_end_of_file_is_416() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("abcdef.jsonl.gz");
        write_gz(&path, b"short\n");

        let err = read_range(&path, ByteRange { start: 1000, end: 1001 }).unwrap_err();
        assert!(matches!(err, InspectorError::RangeNotSatisfiable(_)));
    }

    #[test]
    fn reads_across_a_reopened_writer_s_second_gzip_member() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("abcdef.jsonl.gz");
        write_gz(&path, b"first\n");
        append_gz_member(&path, b"second\n");

        let (slice, total) = read_range(&path, ByteRange { start: 0, end: 12 }).unwrap();
        assert_eq!(total, 13);
        assert_eq!(slice, b"first\nsecond\n");
    }
}
