//! Durable delivery log: the audit trail and dedup source of truth.
//!
//! Every dispatch outcome is appended here before it is returned to the
//! caller. The backing store is a single JSON file replaced atomically on
//! every write: the full snapshot goes to a `.tmp` sibling first, then a
//! rename swings it into place, so a reader never observes a partially
//! written log and a crash mid-write leaves the previous committed state
//! intact.
//!
//! Writers are serialized by an internal lock; there is exactly one record
//! vector and one file, so single-writer discipline falls out of the type.
//!
//! # Usage
//!
//! ```rust,no_run
//! use posse_core::DispatchTarget;
//! use posse_deliverylog::{DeliveryLog, DeliveryRecord, DeliveryStatus};
//!
//! # fn example() -> Result<(), posse_deliverylog::DeliveryLogError> {
//! let log = DeliveryLog::open("delivery_log.json")?;
//! log.record(
//!     DeliveryRecord::new("essay-001", DispatchTarget::Mastodon, DeliveryStatus::Succeeded)
//!         .with_attempts(1)
//!         .with_external_id("109372"),
//! )?;
//! assert!(log.has_succeeded("essay-001", DispatchTarget::Mastodon));
//! # Ok(())
//! # }
//! ```

use posse_core::DispatchTarget;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

mod error;
mod record;

pub use error::DeliveryLogError;
pub use record::{DeliveryRecord, DeliveryStatus};

/// On-disk shape of the log.
#[derive(Debug, Default, Serialize, Deserialize)]
struct LogFile {
    records: Vec<DeliveryRecord>,
}

struct LogInner {
    path: Option<PathBuf>,
    records: Vec<DeliveryRecord>,
}

/// Append-only, crash-safe record of every dispatch attempt.
pub struct DeliveryLog {
    inner: Mutex<LogInner>,
}

impl DeliveryLog {
    /// Opens (or creates on first write) a file-backed log, loading the
    /// committed snapshot if one exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, DeliveryLogError> {
        let path = path.into();
        let records = match fs::read(&path) {
            Ok(bytes) => {
                let file: LogFile = serde_json::from_slice(&bytes)
                    .map_err(|source| DeliveryLogError::Corrupt {
                        path: path.clone(),
                        source,
                    })?;
                file.records
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(err.into()),
        };

        Ok(Self {
            inner: Mutex::new(LogInner {
                path: Some(path),
                records,
            }),
        })
    }

    /// An unpersisted log, for tests and dry runs.
    pub fn in_memory() -> Self {
        Self {
            inner: Mutex::new(LogInner {
                path: None,
                records: Vec::new(),
            }),
        }
    }

    /// Appends a record and commits the new snapshot atomically.
    pub fn record(&self, record: DeliveryRecord) -> Result<(), DeliveryLogError> {
        let mut inner = self.inner.lock().expect("delivery log lock poisoned");
        inner.records.push(record);

        if let Some(path) = inner.path.clone() {
            if let Err(err) = persist(&path, &inner.records) {
                // Keep the in-memory state consistent with disk.
                inner.records.pop();
                return Err(err);
            }
        }
        Ok(())
    }

    /// Whether a successful delivery already exists for this pair. Queried
    /// before every dispatch; `true` short-circuits the attempt entirely.
    pub fn has_succeeded(&self, post_id: &str, target: DispatchTarget) -> bool {
        let inner = self.inner.lock().expect("delivery log lock poisoned");
        inner
            .records
            .iter()
            .any(|r| r.post_id == post_id && r.target == target && r.status.is_success())
    }

    /// All records for one post, in append order.
    pub fn all_for(&self, post_id: &str) -> Vec<DeliveryRecord> {
        let inner = self.inner.lock().expect("delivery log lock poisoned");
        inner
            .records
            .iter()
            .filter(|r| r.post_id == post_id)
            .cloned()
            .collect()
    }

    /// All records for one target, in append order.
    pub fn for_target(&self, target: DispatchTarget) -> Vec<DeliveryRecord> {
        let inner = self.inner.lock().expect("delivery log lock poisoned");
        inner
            .records
            .iter()
            .filter(|r| r.target == target)
            .cloned()
            .collect()
    }

    /// Every record with a failure status.
    pub fn failures(&self) -> Vec<DeliveryRecord> {
        let inner = self.inner.lock().expect("delivery log lock poisoned");
        inner
            .records
            .iter()
            .filter(|r| r.status.is_failure())
            .cloned()
            .collect()
    }

    /// Full snapshot of the log, in append order.
    pub fn records(&self) -> Vec<DeliveryRecord> {
        let inner = self.inner.lock().expect("delivery log lock poisoned");
        inner.records.clone()
    }

    pub fn len(&self) -> usize {
        let inner = self.inner.lock().expect("delivery log lock poisoned");
        inner.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Writes the full snapshot to a temp sibling, then atomically replaces
/// the committed file. The temp file is removed on every failure path.
fn persist(path: &Path, records: &[DeliveryRecord]) -> Result<(), DeliveryLogError> {
    let file = LogFile {
        records: records.to_vec(),
    };
    let json = serde_json::to_vec_pretty(&file).map_err(DeliveryLogError::Serialize)?;

    let tmp = tmp_path(path);
    fs::write(&tmp, &json).map_err(|err| {
        let _ = fs::remove_file(&tmp);
        DeliveryLogError::Io(err)
    })?;

    fs::rename(&tmp, path).map_err(|err| {
        let _ = fs::remove_file(&tmp);
        DeliveryLogError::Io(err)
    })
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut os: OsString = path.as_os_str().to_owned();
    os.push(".tmp");
    PathBuf::from(os)
}
