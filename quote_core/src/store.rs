//! # Document Store
//!
//! Directory-backed key-value persistence for estimates and invoices:
//!
//! - One pretty-JSON file per document, named by its assigned number
//!   (`EST-0001.json`)
//! - **Atomic writes**: write to .tmp, fsync, rename to prevent corruption
//! - **Store locking**: a single `store.lock` guards the directory during
//!   mutations (the counter increment and the document write must be
//!   covered together), with stale-lock takeover
//! - **Version validation**: schema compatibility checked on load
//!
//! Number sequences live in `counters.json` beside the documents, one
//! counter per document kind.
//!
//! ## Example
//!
//! ```rust,no_run
//! use quote_core::document::{CustomerInfo, Document, ServiceLine};
//! use quote_core::pipeline::SavePipeline;
//! use quote_core::store::DocumentStore;
//!
//! let store = DocumentStore::open("quotes")?;
//! let mut doc = Document::new_estimate(CustomerInfo::named("Pat Mason"));
//! doc.add_line(ServiceLine::new("Lift garage slab", 1.0, "job", 463.0));
//!
//! SavePipeline::standard().run(&mut doc, &store)?;
//! println!("Saved as {}", doc.number_or_draft());
//! # Ok::<(), quote_core::errors::QuoteError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::document::{Document, DocumentKind, DocumentStatus, SCHEMA_VERSION};
use crate::errors::{QuoteError, QuoteResult};

const COUNTERS_FILE: &str = "counters.json";
const LOCK_FILE: &str = "store.lock";

/// Lock file metadata stored in store.lock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// User identifier (email or username)
    pub user_id: String,
    /// Machine name where lock was acquired
    pub machine: String,
    /// Process ID that holds the lock
    pub pid: u32,
    /// When the lock was acquired
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    /// Create new lock info for the current process
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }
}

/// Get the hostname of the current machine
fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME")
            .ok()
            .or_else(|| std::env::var("HOST").ok())
    }
}

/// Store lock guard that releases the lock when dropped.
///
/// Uses both:
/// 1. OS-level file locking (via fs2) for process safety
/// 2. A lock file with metadata for user visibility
#[derive(Debug)]
pub struct StoreLock {
    /// Path to the lock file
    lock_path: PathBuf,
    /// The underlying file handle (keeps OS lock)
    _lock_file: File,
    /// Lock metadata
    pub info: LockInfo,
}

impl StoreLock {
    /// Acquire an exclusive lock on a store directory.
    ///
    /// Returns `Err(QuoteError::StoreLocked)` when another live process
    /// holds the lock; stale locks (dead PID on the same machine, or
    /// older than 24 hours) are taken over.
    pub fn acquire(store_dir: &Path, user_id: impl Into<String>) -> QuoteResult<Self> {
        let lock_path = store_dir.join(LOCK_FILE);
        let info = LockInfo::new(user_id);

        if lock_path.exists() {
            if let Ok(existing) = read_lock_info(&lock_path) {
                if !is_lock_stale(&existing) {
                    return Err(QuoteError::store_locked(
                        store_dir.display().to_string(),
                        format!("{} ({})", existing.user_id, existing.machine),
                        existing.locked_at.to_rfc3339(),
                    ));
                }
                warn!(
                    path = %lock_path.display(),
                    holder = %existing.user_id,
                    "taking over stale store lock"
                );
            }
        }

        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| {
                QuoteError::file_error("create lock", lock_path.display().to_string(), e.to_string())
            })?;

        // Non-blocking exclusive OS lock
        lock_file.try_lock_exclusive().map_err(|_| {
            QuoteError::store_locked(
                store_dir.display().to_string(),
                "another process".to_string(),
                "unknown".to_string(),
            )
        })?;

        let lock_json =
            serde_json::to_string_pretty(&info).map_err(|e| QuoteError::SerializationError {
                reason: e.to_string(),
            })?;

        lock_file.write_all(lock_json.as_bytes()).map_err(|e| {
            QuoteError::file_error("write lock", lock_path.display().to_string(), e.to_string())
        })?;

        lock_file.sync_all().map_err(|e| {
            QuoteError::file_error("sync lock", lock_path.display().to_string(), e.to_string())
        })?;

        Ok(StoreLock {
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Check if a store is locked without acquiring the lock.
    ///
    /// Returns `Some(LockInfo)` if locked, `None` if available.
    pub fn check(store_dir: &Path) -> Option<LockInfo> {
        let lock_path = store_dir.join(LOCK_FILE);
        if lock_path.exists() {
            if let Ok(info) = read_lock_info(&lock_path) {
                if !is_lock_stale(&info) {
                    return Some(info);
                }
            }
        }
        None
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        // Remove the lock file; the OS lock is released with _lock_file
        let _ = fs::remove_file(&self.lock_path);
    }
}

/// Read lock info from a lock file
fn read_lock_info(lock_path: &Path) -> QuoteResult<LockInfo> {
    let contents = fs::read_to_string(lock_path).map_err(|e| {
        QuoteError::file_error("read lock", lock_path.display().to_string(), e.to_string())
    })?;

    serde_json::from_str(&contents).map_err(|e| QuoteError::SerializationError {
        reason: e.to_string(),
    })
}

/// Check if a lock is stale (the process that created it is no longer running)
fn is_lock_stale(info: &LockInfo) -> bool {
    if let Some(our_machine) = hostname() {
        if info.machine == our_machine {
            #[cfg(windows)]
            {
                use std::process::Command;
                let output = Command::new("tasklist")
                    .args(["/FI", &format!("PID eq {}", info.pid), "/NH"])
                    .output();
                if let Ok(output) = output {
                    let stdout = String::from_utf8_lossy(&output.stdout);
                    if stdout.contains("No tasks") || !stdout.contains(&info.pid.to_string()) {
                        return true;
                    }
                }
            }
            #[cfg(unix)]
            {
                if fs::metadata(format!("/proc/{}", info.pid)).is_err() {
                    return true;
                }
            }
        }
    }

    // Locks older than 24 hours are considered abandoned
    let age = Utc::now() - info.locked_at;
    age.num_hours() > 24
}

/// Per-kind number sequences, persisted as counters.json
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Counters {
    #[serde(default)]
    estimate: u32,
    #[serde(default)]
    invoice: u32,
}

impl Counters {
    fn bump(&mut self, kind: DocumentKind) -> u32 {
        let slot = match kind {
            DocumentKind::Estimate => &mut self.estimate,
            DocumentKind::Invoice => &mut self.invoice,
        };
        *slot += 1;
        *slot
    }
}

/// Lightweight listing entry for a stored document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub number: String,
    pub kind: DocumentKind,
    pub customer_name: String,
    pub status: DocumentStatus,
    pub subtotal: f64,
    pub modified: DateTime<Utc>,
}

/// Directory-backed document store.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    /// Open (creating if needed) a store at the given directory.
    pub fn open(dir: impl Into<PathBuf>) -> QuoteResult<Self> {
        let root = dir.into();
        fs::create_dir_all(&root).map_err(|e| {
            QuoteError::file_error("create store dir", root.display().to_string(), e.to_string())
        })?;
        Ok(DocumentStore { root })
    }

    /// The store's directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Acquire the store lock for a mutation.
    pub fn lock(&self, user_id: impl Into<String>) -> QuoteResult<StoreLock> {
        StoreLock::acquire(&self.root, user_id)
    }

    /// Path of the file backing a document number.
    pub fn document_path(&self, number: &str) -> PathBuf {
        self.root.join(format!("{}.json", number))
    }

    fn counters_path(&self) -> PathBuf {
        self.root.join(COUNTERS_FILE)
    }

    fn load_counters(&self) -> QuoteResult<Counters> {
        let path = self.counters_path();
        if !path.exists() {
            return Ok(Counters::default());
        }
        let contents = fs::read_to_string(&path).map_err(|e| {
            QuoteError::file_error("read counters", path.display().to_string(), e.to_string())
        })?;
        serde_json::from_str(&contents).map_err(|e| QuoteError::SerializationError {
            reason: format!("Invalid JSON in {}: {}", path.display(), e),
        })
    }

    /// Allocate the next human-readable number for a kind (`EST-0001`, ...).
    /// The counter file is persisted atomically before the number is handed out.
    pub fn next_number(&self, kind: DocumentKind) -> QuoteResult<String> {
        let mut counters = self.load_counters()?;
        let seq = counters.bump(kind);
        atomic_write_json(&self.counters_path(), &counters)?;
        Ok(format!("{}-{:04}", kind.prefix(), seq))
    }

    /// Persist a document under its assigned number with an atomic write.
    ///
    /// Documents without a number cannot be persisted directly; the save
    /// pipeline assigns one first (see [`crate::pipeline`]).
    pub fn save_document(&self, doc: &Document) -> QuoteResult<()> {
        let number = doc.meta.number.as_deref().ok_or_else(|| {
            QuoteError::document_invalid("Document has no number; save through the pipeline")
        })?;
        let path = self.document_path(number);
        atomic_write_json(&path, doc)?;
        info!(number = %number, kind = %doc.meta.kind, path = %path.display(), "document saved");
        Ok(())
    }

    /// Load a document by number.
    pub fn load(&self, number: &str) -> QuoteResult<Document> {
        let path = self.document_path(number);
        if !path.exists() {
            return Err(QuoteError::document_not_found(number));
        }

        let mut file = File::open(&path).map_err(|e| {
            QuoteError::file_error("open", path.display().to_string(), e.to_string())
        })?;

        let mut contents = String::new();
        file.read_to_string(&mut contents).map_err(|e| {
            QuoteError::file_error("read", path.display().to_string(), e.to_string())
        })?;

        let doc: Document =
            serde_json::from_str(&contents).map_err(|e| QuoteError::SerializationError {
                reason: format!("Invalid JSON in {}: {}", path.display(), e),
            })?;

        validate_version(&doc.meta.version)?;

        Ok(doc)
    }

    /// List all stored documents as summaries, sorted by number.
    pub fn list(&self) -> QuoteResult<Vec<DocumentSummary>> {
        let entries = fs::read_dir(&self.root).map_err(|e| {
            QuoteError::file_error("read dir", self.root.display().to_string(), e.to_string())
        })?;

        let mut summaries = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !name.ends_with(".json") || name == COUNTERS_FILE {
                continue;
            }
            let number = name.trim_end_matches(".json");
            match self.load(number) {
                Ok(doc) => summaries.push(DocumentSummary {
                    number: number.to_string(),
                    kind: doc.meta.kind,
                    customer_name: doc.customer.name.clone(),
                    status: doc.status,
                    subtotal: doc.subtotal(),
                    modified: doc.meta.modified,
                }),
                Err(e) => {
                    // One unreadable file should not hide the rest of the store
                    warn!(file = %path.display(), error = %e, "skipping unreadable document");
                }
            }
        }

        summaries.sort_by(|a, b| a.number.cmp(&b.number));
        Ok(summaries)
    }

    /// Delete a document by number. Takes the store lock for the duration
    /// of the removal, like every other store mutation.
    pub fn delete(&self, number: &str) -> QuoteResult<()> {
        let _lock = self.lock("local")?;
        let path = self.document_path(number);
        if !path.exists() {
            return Err(QuoteError::document_not_found(number));
        }
        fs::remove_file(&path).map_err(|e| {
            QuoteError::file_error("delete", path.display().to_string(), e.to_string())
        })?;
        info!(number = %number, "document deleted");
        Ok(())
    }
}

/// Write a value as pretty JSON with atomic semantics:
/// serialize, write to .tmp, fsync, rename over the target.
fn atomic_write_json<T: Serialize>(path: &Path, value: &T) -> QuoteResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| QuoteError::SerializationError {
        reason: e.to_string(),
    })?;

    let tmp_path = path.with_extension("json.tmp");

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        QuoteError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(json.as_bytes()).map_err(|e| {
        QuoteError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        QuoteError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        QuoteError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    Ok(())
}

/// Validate that a file version is compatible with the current schema.
pub(crate) fn validate_version(file_version: &str) -> QuoteResult<()> {
    let file_parts: Vec<u32> = file_version
        .split('.')
        .filter_map(|p| p.parse().ok())
        .collect();
    let current_parts: Vec<u32> = SCHEMA_VERSION
        .split('.')
        .filter_map(|p| p.parse().ok())
        .collect();

    if file_parts.is_empty() || current_parts.is_empty() {
        return Err(QuoteError::VersionMismatch {
            file_version: file_version.to_string(),
            expected_version: SCHEMA_VERSION.to_string(),
        });
    }

    // Major version must match
    if file_parts[0] != current_parts[0] {
        return Err(QuoteError::VersionMismatch {
            file_version: file_version.to_string(),
            expected_version: SCHEMA_VERSION.to_string(),
        });
    }

    // For 0.x versions, a newer minor is a breaking change we can't read
    if current_parts[0] == 0 && file_parts.len() > 1 && current_parts.len() > 1 {
        if file_parts[1] > current_parts[1] {
            return Err(QuoteError::VersionMismatch {
                file_version: file_version.to_string(),
                expected_version: SCHEMA_VERSION.to_string(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{CustomerInfo, ServiceLine};
    use std::env::temp_dir;

    fn temp_store(name: &str) -> DocumentStore {
        let dir = temp_dir().join(format!("quote_store_test_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        DocumentStore::open(&dir).unwrap()
    }

    fn numbered_document(store: &DocumentStore) -> Document {
        let mut doc = Document::new_estimate(CustomerInfo::named("Pat Mason"));
        doc.add_line(ServiceLine::new("Lift garage slab", 1.0, "job", 463.0));
        doc.meta.number = Some(store.next_number(DocumentKind::Estimate).unwrap());
        doc
    }

    #[test]
    fn test_number_sequences_per_kind() {
        let store = temp_store("numbers");
        assert_eq!(store.next_number(DocumentKind::Estimate).unwrap(), "EST-0001");
        assert_eq!(store.next_number(DocumentKind::Estimate).unwrap(), "EST-0002");
        assert_eq!(store.next_number(DocumentKind::Invoice).unwrap(), "INV-0001");
        assert_eq!(store.next_number(DocumentKind::Estimate).unwrap(), "EST-0003");

        let _ = fs::remove_dir_all(store.root());
    }

    #[test]
    fn test_counters_survive_reopen() {
        let store = temp_store("reopen");
        store.next_number(DocumentKind::Invoice).unwrap();
        store.next_number(DocumentKind::Invoice).unwrap();

        let reopened = DocumentStore::open(store.root()).unwrap();
        assert_eq!(reopened.next_number(DocumentKind::Invoice).unwrap(), "INV-0003");

        let _ = fs::remove_dir_all(store.root());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let store = temp_store("roundtrip");
        let doc = numbered_document(&store);
        store.save_document(&doc).unwrap();

        let loaded = store.load(doc.meta.number.as_deref().unwrap()).unwrap();
        assert_eq!(loaded, doc);

        let _ = fs::remove_dir_all(store.root());
    }

    #[test]
    fn test_save_without_number_rejected() {
        let store = temp_store("no_number");
        let doc = Document::new_estimate(CustomerInfo::named("Pat"));
        let err = store.save_document(&doc).unwrap_err();
        assert_eq!(err.error_code(), "DOCUMENT_INVALID");

        let _ = fs::remove_dir_all(store.root());
    }

    #[test]
    fn test_atomic_save_leaves_no_tmp_file() {
        let store = temp_store("atomic");
        let doc = numbered_document(&store);
        store.save_document(&doc).unwrap();

        let path = store.document_path(doc.meta.number.as_deref().unwrap());
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());

        let _ = fs::remove_dir_all(store.root());
    }

    #[test]
    fn test_load_missing_document() {
        let store = temp_store("missing");
        let err = store.load("EST-9999").unwrap_err();
        assert_eq!(err.error_code(), "DOCUMENT_NOT_FOUND");

        let _ = fs::remove_dir_all(store.root());
    }

    #[test]
    fn test_list_sorted_and_skips_counters() {
        let store = temp_store("list");
        for _ in 0..3 {
            let doc = numbered_document(&store);
            store.save_document(&doc).unwrap();
        }

        let summaries = store.list().unwrap();
        assert_eq!(summaries.len(), 3);
        assert_eq!(summaries[0].number, "EST-0001");
        assert_eq!(summaries[2].number, "EST-0003");
        assert_eq!(summaries[0].customer_name, "Pat Mason");
        assert!((summaries[0].subtotal - 463.0).abs() < 1e-9);

        let _ = fs::remove_dir_all(store.root());
    }

    #[test]
    fn test_delete() {
        let store = temp_store("delete");
        let doc = numbered_document(&store);
        store.save_document(&doc).unwrap();

        let number = doc.meta.number.as_deref().unwrap();
        store.delete(number).unwrap();
        assert!(store.load(number).is_err());
        assert_eq!(store.delete(number).unwrap_err().error_code(), "DOCUMENT_NOT_FOUND");

        let _ = fs::remove_dir_all(store.root());
    }

    #[test]
    fn test_store_lock_acquire_and_release() {
        let store = temp_store("lock");

        let lock = store.lock("test@example.com").unwrap();
        assert_eq!(lock.info.user_id, "test@example.com");
        assert!(store.root().join(LOCK_FILE).exists());
        assert!(StoreLock::check(store.root()).is_some());

        drop(lock);
        assert!(!store.root().join(LOCK_FILE).exists());
        assert!(StoreLock::check(store.root()).is_none());

        let _ = fs::remove_dir_all(store.root());
    }

    #[test]
    fn test_second_acquire_while_held_is_store_locked() {
        let store = temp_store("contention");

        let held = store.lock("amy@shop.example").unwrap();
        let err = store.lock("bob@shop.example").unwrap_err();
        assert_eq!(err.error_code(), "STORE_LOCKED");
        assert!(err.is_recoverable());

        drop(held);
        assert!(store.lock("bob@shop.example").is_ok());

        let _ = fs::remove_dir_all(store.root());
    }

    #[test]
    fn test_stale_lock_dead_pid_taken_over() {
        let store = temp_store("stale_pid");
        // Requires a known hostname to fake a same-machine lock
        let Some(machine) = hostname() else { return };

        let forged = LockInfo {
            user_id: "ghost@shop.example".to_string(),
            machine,
            pid: u32::MAX, // no live process has this pid
            locked_at: Utc::now(),
        };
        fs::write(
            store.root().join(LOCK_FILE),
            serde_json::to_string_pretty(&forged).unwrap(),
        )
        .unwrap();

        let lock = store.lock("live@shop.example").unwrap();
        assert_eq!(lock.info.user_id, "live@shop.example");

        drop(lock);
        let _ = fs::remove_dir_all(store.root());
    }

    #[test]
    fn test_abandoned_lock_taken_over_after_24_hours() {
        let store = temp_store("stale_age");

        let forged = LockInfo {
            user_id: "ghost@shop.example".to_string(),
            machine: "some-other-machine".to_string(),
            pid: std::process::id(),
            locked_at: Utc::now() - chrono::Duration::hours(25),
        };
        fs::write(
            store.root().join(LOCK_FILE),
            serde_json::to_string_pretty(&forged).unwrap(),
        )
        .unwrap();

        assert!(StoreLock::check(store.root()).is_none());
        assert!(store.lock("live@shop.example").is_ok());

        let _ = fs::remove_dir_all(store.root());
    }

    #[test]
    fn test_delete_blocked_while_store_locked() {
        let store = temp_store("delete_locked");
        let doc = numbered_document(&store);
        store.save_document(&doc).unwrap();
        let number = doc.meta.number.clone().unwrap();

        let held = store.lock("amy@shop.example").unwrap();
        let err = store.delete(&number).unwrap_err();
        assert_eq!(err.error_code(), "STORE_LOCKED");
        drop(held);

        store.delete(&number).unwrap();
        // The delete released its lock too
        assert!(!store.root().join(LOCK_FILE).exists());

        let _ = fs::remove_dir_all(store.root());
    }

    #[test]
    fn test_lock_info_creation() {
        let info = LockInfo::new("amy@shop.example");
        assert_eq!(info.user_id, "amy@shop.example");
        assert!(info.pid > 0);
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.5").is_ok());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("garbage").is_err());
    }
}
