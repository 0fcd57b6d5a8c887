//! Per-session gzip JSONL writer with size-based rotation (§3 Trace File).

use crate::error::Result;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Uncompressed ingest bytes after which a session's writer rotates to a
/// new chunk file.
pub const ROTATE_AT_BYTES: u64 = 100 * 1024 * 1024;

#[cfg(unix)]
fn set_file_mode(path: &Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;
    if let Ok(meta) = fs::metadata(path) {
        let mut perms = meta.permissions();
        perms.set_mode(mode);
        let _ = fs::set_permissions(path, perms);
    }
}

#[cfg(not(unix))]
fn set_file_mode(_path: &Path, _mode: u32) {}

/// An open gzip-JSONL writer for one session, tracking enough state to
/// decide when to rotate to the next chunk file.
pub struct SessionWriter {
    traces_dir: PathBuf,
    session_id: String,
    chunk: u32,
    current_path: PathBuf,
    encoder: GzEncoder<File>,
    uncompressed_bytes: u64,
}

impl SessionWriter {
    /// Open (creating if needed) the base file `{session-id}.jsonl.gz`.
    pub fn open(traces_dir: &Path, session_id: &str) -> Result<Self> {
        fs::create_dir_all(traces_dir)?;
        let path = chunk_path(traces_dir, session_id, 0);
        let encoder = open_append_encoder(&path)?;
        Ok(Self {
            traces_dir: traces_dir.to_path_buf(),
            session_id: session_id.to_string(),
            chunk: 0,
            current_path: path,
            encoder,
            uncompressed_bytes: 0,
        })
    }

    pub fn current_path(&self) -> &Path {
        &self.current_path
    }

    /// Append one span (already serialized as a JSON line, newline
    /// included) and rotate if this write crosses the size threshold.
    pub fn append_line(&mut self, line: &[u8]) -> Result<()> {
        self.encoder.write_all(line)?;
        self.uncompressed_bytes += line.len() as u64;
        if self.uncompressed_bytes > ROTATE_AT_BYTES {
            self.rotate()?;
        }
        Ok(())
    }

    fn rotate(&mut self) -> Result<()> {
        self.flush()?;
        self.chunk += 1;
        let path = chunk_path(&self.traces_dir, &self.session_id, self.chunk);
        self.encoder = open_append_encoder(&path)?;
        self.current_path = path;
        self.uncompressed_bytes = 0;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.encoder.flush()?;
        Ok(())
    }

    /// Close the underlying gzip stream, finalizing the trailer.
    pub fn close(mut self) -> Result<()> {
        self.flush()?;
        self.encoder.try_finish()?;
        Ok(())
    }

    /// Close the writer and rename the backing file to `{name}.bad` after
    /// a gzip/IO error on append (§4.4 failure semantics). Returns the
    /// quarantine path.
    pub fn quarantine(self) -> Result<PathBuf> {
        let bad_path = {
            let mut p = self.current_path.clone();
            let file_name = format!("{}.bad", p.file_name().unwrap().to_string_lossy());
            p.set_file_name(file_name);
            p
        };
        let path = self.current_path.clone();
        drop(self.encoder);
        fs::rename(&path, &bad_path)?;
        Ok(bad_path)
    }
}

/// `{traces-dir}/{session-id}.jsonl.gz` for chunk 0, or
/// `{traces-dir}/{session-id}_chunk_{n}.jsonl.gz` for chunk n > 0.
pub fn chunk_path(traces_dir: &Path, session_id: &str, chunk: u32) -> PathBuf {
    let file_name = if chunk == 0 {
        format!("{session_id}.jsonl.gz")
    } else {
        format!("{session_id}_chunk_{chunk}.jsonl.gz")
    };
    traces_dir.join(file_name)
}

fn open_append_encoder(path: &Path) -> Result<GzEncoder<File>> {
    let is_new = !path.exists();
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    if is_new {
        set_file_mode(path, 0o644);
    }
    Ok(GzEncoder::new(file, Compression::default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn open_creates_base_chunk_file() {
        let dir = tempdir().unwrap();
        let writer = SessionWriter::open(dir.path(), "abcdef").unwrap();
        assert_eq!(writer.current_path(), dir.path().join("abcdef.jsonl.gz"));
    }

    #[test]
    fn rotates_when_crossing_the_size_threshold() {
        let dir = tempdir().unwrap();
        let mut writer = SessionWriter::open(dir.path(), "abcdef").unwrap();
        let line = vec![b'x'; 1024];
        writer.uncompressed_bytes = ROTATE_AT_BYTES - 512;
        writer.append_line(&line).unwrap();
        assert_eq!(writer.current_path(), dir.path().join("abcdef_chunk_1.jsonl.gz"));
    }

    #[test]
    fn quarantine_renames_with_bad_suffix() {
        let dir = tempdir().unwrap();
        let writer = SessionWriter::open(dir.path(), "abcdef").unwrap();
        let original = writer.current_path().to_path_buf();
        let bad = writer.quarantine().unwrap();
        assert_eq!(bad, dir.path().join("abcdef.jsonl.gz.bad"));
        assert!(!original.exists());
        assert!(bad.exists());
    }
}
