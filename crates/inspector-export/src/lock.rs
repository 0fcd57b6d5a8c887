//! Process-scoped advisory lock (§4.4): `{traces-dir}/.inspector.lock`.
//!
//! Only one exporter process writes to a given traces directory at a time.
//! The lock file holds the owning PID. A peer that finds the file already
//! present but whose PID is no longer alive reclaims it rather than
//! permanently wedging the traces directory after an unclean shutdown.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const LOCK_FILE_NAME: &str = ".inspector.lock";

/// Whether acquiring the lock succeeded (this process now owns it) or a
/// live peer already holds it (the exporter must run in no-op mode).
#[derive(Debug)]
pub enum LockOutcome {
    Acquired(AdvisoryLock),
    HeldByPeer { pid: u32 },
}

/// An acquired advisory lock. Dropping it (or calling [`release`]) removes
/// the lock file so a future process can acquire it cleanly.
#[derive(Debug)]
pub struct AdvisoryLock {
    path: PathBuf,
}

impl AdvisoryLock {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn release(self) {
        drop(self);
    }
}

impl Drop for AdvisoryLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// Try to acquire the advisory lock in `traces_dir`.
pub fn acquire(traces_dir: &Path) -> io::Result<LockOutcome> {
    let path = traces_dir.join(LOCK_FILE_NAME);
    match write_pid_exclusive(&path) {
        Ok(()) => Ok(LockOutcome::Acquired(AdvisoryLock { path })),
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
            match fs::read_to_string(&path).ok().and_then(|s| s.trim().parse::<u32>().ok()) {
                Some(pid) if pid_is_alive(pid) => Ok(LockOutcome::HeldByPeer { pid }),
                _ => {
                    // Stale lock: owning process is gone (or the PID was
                    // unreadable). Reclaim it for this process.
                    fs::remove_file(&path)?;
                    write_pid_exclusive(&path)?;
                    Ok(LockOutcome::Acquired(AdvisoryLock { path }))
                }
            }
        }
        Err(err) => Err(err),
    }
}

fn write_pid_exclusive(path: &Path) -> io::Result<()> {
    use std::io::Write;
    let mut file = fs::OpenOptions::new().write(true).create_new(true).open(path)?;
    write!(file, "{}", std::process::id())
}

#[cfg(unix)]
fn pid_is_alive(pid: u32) -> bool {
    // Signal 0 performs no-op existence/permission checks without
    // actually delivering a signal.
    unsafe { libc::kill(pid as libc::pid_t, 0) == 0 }
}

#[cfg(not(unix))]
fn pid_is_alive(_pid: u32) -> bool {
    // No portable liveness check off Unix; assume the lock is still live
    // rather than risk two writers racing on the same files.
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn first_acquirer_gets_the_lock() {
        let dir = tempdir().unwrap();
        match acquire(dir.path()).unwrap() {
            LockOutcome::Acquired(lock) => assert!(lock.path().exists()),
            LockOutcome::HeldByPeer { .. } => panic!("expected to acquire"),
        }
    }

    #[test]
    fn second_process_sees_it_held_while_first_lives() {
        let dir = tempdir().unwrap();
        let _lock = acquire(dir.path()).unwrap();
        match acquire(dir.path()).unwrap() {
            LockOutcome::HeldByPeer { pid } => assert_eq!(pid, std::process::id()),
            LockOutcome::Acquired(_) => panic!("expected peer-held"),
        }
    }

    #[test]
    fn dropping_the_lock_releases_the_file() {
        let dir = tempdir().unwrap();
        let lock_path = dir.path().join(LOCK_FILE_NAME);
        {
            let _lock = acquire(dir.path()).unwrap();
            assert!(lock_path.exists());
        }
        assert!(!lock_path.exists());
    }

    #[test]
    fn stale_lock_from_a_dead_pid_is_reclaimed() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(LOCK_FILE_NAME), "999999999").unwrap();
        match acquire(dir.path()).unwrap() {
            LockOutcome::Acquired(_) => {}
            LockOutcome::HeldByPeer { .. } => panic!("stale lock should have been reclaimed"),
        }
    }
}
