//! Background persistence writer for store snapshots.
//!
//! # Responsibility
//! - Accept whole-slice snapshots from stores without blocking commands.
//! - Apply them to a `StateRepository` on a dedicated writer thread.
//! - Surface write failures through `flush()` and `stats()`.
//!
//! # Invariants
//! - Scheduling never blocks on storage I/O.
//! - Writes queued before a flush are applied before that flush returns.
//! - Queued writes for the same key coalesce; only the latest snapshot is stored.
//! - Failures are logged and retained; they are never retried.

use crate::repo::state_repo::{StateRepository, StorageKey};
use log::{debug, error, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

const WRITER_THREAD_NAME: &str = "taskdeck-persist";

/// Persistence failure reported by `flush()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistError {
    /// Snapshot could not be encoded to JSON.
    Encode { key: StorageKey, message: String },
    /// Repository rejected the write.
    Write { key: StorageKey, message: String },
    /// Writer thread is gone; the snapshot was dropped.
    WriterStopped,
    /// Writer thread could not be started.
    Spawn(String),
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode { key, message } => write!(f, "failed to encode `{key}`: {message}"),
            Self::Write { key, message } => write!(f, "failed to write `{key}`: {message}"),
            Self::WriterStopped => write!(f, "persistence writer is not running"),
            Self::Spawn(message) => write!(f, "failed to start persistence writer: {message}"),
        }
    }
}

impl Error for PersistError {}

/// Counters describing writer activity since startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistStats {
    /// Snapshots successfully written to the repository.
    pub writes_applied: u64,
    /// Snapshots superseded by a newer snapshot of the same key before writing.
    pub writes_coalesced: u64,
    /// Encode, write and send failures.
    pub failures: u64,
    /// Message of the most recent failure, if any.
    pub last_error: Option<String>,
}

#[derive(Debug, Default)]
struct PersistStatus {
    stats: PersistStats,
    unreported: Option<PersistError>,
}

impl PersistStatus {
    fn record_failure(&mut self, err: PersistError) {
        self.stats.failures += 1;
        self.stats.last_error = Some(err.to_string());
        if self.unreported.is_none() {
            self.unreported = Some(err);
        }
    }
}

enum WriteJob {
    Write { key: StorageKey, value: String },
    Flush(Sender<()>),
    Shutdown,
}

/// Cloneable handle stores use to schedule snapshot writes.
#[derive(Clone)]
pub struct PersistHandle {
    tx: Sender<WriteJob>,
    status: Arc<Mutex<PersistStatus>>,
}

impl PersistHandle {
    /// Encodes `value` and queues it as the new record for `key`.
    ///
    /// Returns immediately; failures are recorded for the next `flush()`.
    pub fn schedule<T: Serialize + ?Sized>(&self, key: StorageKey, value: &T) {
        let encoded = match serde_json::to_string(value) {
            Ok(encoded) => encoded,
            Err(err) => {
                error!(
                    "event=persist_schedule module=persist status=error key={} error_code=encode_failed error={}",
                    key, err
                );
                lock_status(&self.status).record_failure(PersistError::Encode {
                    key,
                    message: err.to_string(),
                });
                return;
            }
        };

        debug!(
            "event=persist_schedule module=persist status=queued key={} bytes={}",
            key,
            encoded.len()
        );
        if self
            .tx
            .send(WriteJob::Write {
                key,
                value: encoded,
            })
            .is_err()
        {
            warn!(
                "event=persist_schedule module=persist status=dropped key={} error_code=writer_stopped",
                key
            );
            lock_status(&self.status).record_failure(PersistError::WriterStopped);
        }
    }

    /// Blocks until every previously scheduled write has been applied.
    ///
    /// Returns the first failure recorded since the previous flush.
    pub fn flush(&self) -> Result<(), PersistError> {
        let (ack_tx, ack_rx) = mpsc::channel();
        if self.tx.send(WriteJob::Flush(ack_tx)).is_err() || ack_rx.recv().is_err() {
            return Err(PersistError::WriterStopped);
        }

        match lock_status(&self.status).unreported.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Returns writer counters.
    pub fn stats(&self) -> PersistStats {
        lock_status(&self.status).stats.clone()
    }
}

/// Owner of the writer thread.
///
/// Dropping the persister drains queued writes and joins the thread.
pub struct Persister {
    handle: PersistHandle,
    worker: Option<JoinHandle<()>>,
}

impl Persister {
    /// Moves `repo` onto a new writer thread.
    pub fn spawn(repo: Box<dyn StateRepository>) -> Result<Self, PersistError> {
        let (tx, rx) = mpsc::channel();
        let status = Arc::new(Mutex::new(PersistStatus::default()));
        let worker_status = Arc::clone(&status);

        let worker = std::thread::Builder::new()
            .name(WRITER_THREAD_NAME.to_string())
            .spawn(move || run_writer(repo, rx, worker_status))
            .map_err(|err| PersistError::Spawn(err.to_string()))?;

        Ok(Self {
            handle: PersistHandle { tx, status },
            worker: Some(worker),
        })
    }

    /// Returns a handle for stores to schedule writes through.
    pub fn handle(&self) -> PersistHandle {
        self.handle.clone()
    }

    pub fn flush(&self) -> Result<(), PersistError> {
        self.handle.flush()
    }

    pub fn stats(&self) -> PersistStats {
        self.handle.stats()
    }
}

impl Drop for Persister {
    fn drop(&mut self) {
        let _ = self.handle.tx.send(WriteJob::Shutdown);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("event=persist_shutdown module=persist status=error error_code=writer_panicked");
            }
        }
    }
}

fn run_writer(
    mut repo: Box<dyn StateRepository>,
    rx: Receiver<WriteJob>,
    status: Arc<Mutex<PersistStatus>>,
) {
    while let Ok(first) = rx.recv() {
        let mut pending: BTreeMap<StorageKey, String> = BTreeMap::new();
        let mut acks = Vec::new();
        let mut coalesced = 0_u64;
        let mut stop = false;

        // Drain whatever is already queued so bursts collapse into one write per key.
        let mut next = Some(first);
        while let Some(job) = next {
            match job {
                WriteJob::Write { key, value } => {
                    if pending.insert(key, value).is_some() {
                        coalesced += 1;
                    }
                }
                WriteJob::Flush(ack) => acks.push(ack),
                WriteJob::Shutdown => stop = true,
            }
            next = if stop { None } else { rx.try_recv().ok() };
        }

        for (key, value) in pending {
            let result = repo.save_record(key, value.as_str());
            let mut guard = lock_status(&status);
            match result {
                Ok(()) => {
                    guard.stats.writes_applied += 1;
                    debug!(
                        "event=persist_write module=persist status=ok key={} bytes={}",
                        key,
                        value.len()
                    );
                }
                Err(err) => {
                    error!(
                        "event=persist_write module=persist status=error key={} error_code=write_failed error={}",
                        key, err
                    );
                    guard.record_failure(PersistError::Write {
                        key,
                        message: err.to_string(),
                    });
                }
            }
        }
        lock_status(&status).stats.writes_coalesced += coalesced;

        for ack in acks {
            let _ = ack.send(());
        }

        if stop {
            break;
        }
    }
}

fn lock_status(status: &Mutex<PersistStatus>) -> MutexGuard<'_, PersistStatus> {
    status.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::{PersistError, Persister};
    use crate::repo::memory_repo::MemoryStateRepository;
    use crate::repo::state_repo::{RepoError, RepoResult, StateRepository, StorageKey};

    struct FailingRepository;

    impl StateRepository for FailingRepository {
        fn load_record(&self, _key: StorageKey) -> RepoResult<Option<String>> {
            Ok(None)
        }

        fn save_record(&mut self, _key: StorageKey, _value: &str) -> RepoResult<()> {
            Err(RepoError::Unavailable("disk full"))
        }
    }

    #[test]
    fn flush_waits_for_queued_writes() {
        let repo = MemoryStateRepository::new();
        let persister = Persister::spawn(Box::new(repo.clone())).unwrap();
        let handle = persister.handle();

        handle.schedule(StorageKey::Auth, &true);
        handle.schedule(StorageKey::Theme, &false);
        persister.flush().unwrap();

        assert_eq!(repo.snapshot(StorageKey::Auth).as_deref(), Some("true"));
        assert_eq!(repo.snapshot(StorageKey::Theme).as_deref(), Some("false"));
    }

    #[test]
    fn latest_snapshot_wins_for_same_key() {
        let repo = MemoryStateRepository::new();
        let persister = Persister::spawn(Box::new(repo.clone())).unwrap();
        let handle = persister.handle();

        for value in 0..20 {
            handle.schedule(StorageKey::Profile, &value);
        }
        persister.flush().unwrap();

        assert_eq!(repo.snapshot(StorageKey::Profile).as_deref(), Some("19"));
        let stats = persister.stats();
        assert_eq!(stats.writes_applied + stats.writes_coalesced, 20);
        assert_eq!(stats.failures, 0);
    }

    #[test]
    fn write_failures_surface_once_through_flush() {
        let persister = Persister::spawn(Box::new(FailingRepository)).unwrap();
        persister.handle().schedule(StorageKey::Todos, &Vec::<u8>::new());

        let err = persister.flush().unwrap_err();
        assert!(matches!(err, PersistError::Write { key: StorageKey::Todos, .. }));
        assert!(err.to_string().contains("disk full"));

        persister.flush().expect("failure is reported only once");
        assert_eq!(persister.stats().failures, 1);
        assert!(persister.stats().last_error.is_some());
    }

    #[test]
    fn drop_drains_pending_writes() {
        let repo = MemoryStateRepository::new();
        {
            let persister = Persister::spawn(Box::new(repo.clone())).unwrap();
            persister.handle().schedule(StorageKey::Categories, &["a", "b"]);
        }
        assert_eq!(
            repo.snapshot(StorageKey::Categories).as_deref(),
            Some(r#"["a","b"]"#)
        );
    }

    #[test]
    fn schedule_after_shutdown_is_reported() {
        let repo = MemoryStateRepository::new();
        let persister = Persister::spawn(Box::new(repo)).unwrap();
        let handle = persister.handle();
        drop(persister);

        handle.schedule(StorageKey::Auth, &true);
        assert_eq!(handle.flush(), Err(PersistError::WriterStopped));
        assert_eq!(handle.stats().failures, 1);
    }
}
