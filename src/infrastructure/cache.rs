//! Content-addressed result cache
//!
//! Memoizes a file's finding list keyed by (file identity, content hash)
//! with a per-instance TTL. A hit requires both hash equality and the
//! entry's age to be within the TTL; anything else is treated as a cold
//! cache. Eviction is lazy: stale entries are overwritten on the next
//! write, never swept. Process-lifetime only, no on-disk persistence.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};
use tracing::trace;

use crate::domain::finding::Finding;

/// Interactive per-keystroke scans tolerate only short staleness
pub const INTERACTIVE_TTL: Duration = Duration::from_secs(5 * 60);
/// Workspace-level results are stable for much longer
pub const WORKSPACE_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone)]
struct CacheEntry {
    content_hash: String,
    stored_at: Instant,
    findings: Vec<Finding>,
}

/// Memoized per-file finding lists, safe for concurrent use.
///
/// Entries are independent; one lock around the whole map is sufficient
/// at the expected scale (tens to low thousands of files).
#[derive(Debug)]
pub struct ResultCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResultCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Cache tuned for interactive single-file rescans
    pub fn interactive() -> Self {
        Self::new(INTERACTIVE_TTL)
    }

    /// Cache tuned for workspace-level results
    pub fn workspace() -> Self {
        Self::new(WORKSPACE_TTL)
    }

    /// SHA-256 hex digest of file content
    pub fn hash_content(content: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Returns the cached findings only when the stored hash matches the
    /// current content and the entry is within the TTL.
    pub fn get(&self, file_key: &str, content: &str) -> Option<Vec<Finding>> {
        let entries = self.entries.lock().ok()?;
        let entry = entries.get(file_key)?;

        if entry.content_hash != Self::hash_content(content) {
            trace!(file_key, "Cache miss: content hash changed");
            return None;
        }
        if entry.stored_at.elapsed() > self.ttl {
            trace!(file_key, "Cache miss: entry past TTL");
            return None;
        }

        trace!(file_key, "Cache hit");
        Some(entry.findings.clone())
    }

    /// Stores findings for a file, overwriting any previous entry.
    pub fn put(&self, file_key: &str, content: &str, findings: Vec<Finding>) {
        let entry = CacheEntry {
            content_hash: Self::hash_content(content),
            stored_at: Instant::now(),
            findings,
        };
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(file_key.to_string(), entry);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
