//! Name to identifier cache persisted as JSON.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use tempfile::NamedTempFile;
use tracing::{debug, error, info, warn};

use drugmatch_model::DrugRecord;
use drugmatch_text::normalize;

use crate::client::IdentifierLookup;
use crate::error::{LookupError, Result};

/// Pause after each remote call.
pub const REQUEST_DELAY: Duration = Duration::from_millis(100);

/// Wraps a lookup with a cache keyed by normalized name.
///
/// A `null` value in the cache file records that the name is known to have
/// no identifier. Permanent lookup failures are logged and cached the same
/// way. Retryable failures such as timeouts are not cached, so the name is
/// looked up again on the next call.
pub struct CachedLookup<L> {
    inner: L,
    path: PathBuf,
    entries: BTreeMap<String, Option<String>>,
    delay: Duration,
    dirty: bool,
}

impl<L: IdentifierLookup> CachedLookup<L> {
    /// Opens the cache at `path`.
    ///
    /// A missing file starts an empty cache. An unreadable or malformed
    /// file is logged and also starts empty; it is overwritten on save.
    pub fn open(inner: L, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = read_entries(&path);
        debug!(path = %path.display(), entries = entries.len(), "opened lookup cache");
        Self {
            inner,
            path,
            entries,
            delay: REQUEST_DELAY,
            dirty: false,
        }
    }

    /// Overrides the pause after remote calls.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Identifier for a name, from the cache when present.
    pub fn lookup(&mut self, name: &str) -> Option<String> {
        let key = normalize(name);
        if key.is_empty() {
            return None;
        }
        if let Some(cached) = self.entries.get(&key) {
            return cached.clone();
        }

        let resolved = match self.inner.lookup(&key) {
            Ok(Some(id)) => {
                info!(name = %key, identifier = %id, "resolved identifier");
                Some(id)
            }
            Ok(None) => {
                debug!(name = %key, "no identifier found");
                None
            }
            Err(err) if err.is_retryable() => {
                warn!(name = %key, error = %err, "identifier lookup failed, not caching");
                self.pause();
                return None;
            }
            Err(err) => {
                error!(name = %key, error = %err, "identifier lookup failed");
                None
            }
        };
        self.entries.insert(key, resolved.clone());
        self.dirty = true;
        self.pause();
        resolved
    }

    fn pause(&self) {
        if self.inner.is_remote() && !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
    }

    /// Returns a copy of `record` carrying an identifier. Records that
    /// already have one are returned unchanged.
    pub fn assign(&mut self, record: &DrugRecord) -> DrugRecord {
        if record.identifier.is_some() {
            return record.clone();
        }
        let identifier = self.lookup(&record.name);
        record.clone().with_identifier(identifier)
    }

    /// Writes the cache file if anything changed since it was opened. The
    /// file is replaced through a temporary file in the same directory.
    pub fn save(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        let write_err = |message: String| LookupError::CacheWrite {
            path: self.path.clone(),
            message,
        };
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| write_err(e.to_string()))?;
        let json =
            serde_json::to_string_pretty(&self.entries).map_err(|e| write_err(e.to_string()))?;
        let mut temp = NamedTempFile::new_in(dir).map_err(|e| write_err(e.to_string()))?;
        temp.write_all(json.as_bytes())
            .map_err(|e| write_err(e.to_string()))?;
        temp.persist(&self.path)
            .map_err(|e| write_err(e.error.to_string()))?;
        info!(path = %self.path.display(), entries = self.entries.len(), "saved lookup cache");
        self.dirty = false;
        Ok(())
    }
}

fn read_entries(path: &Path) -> BTreeMap<String, Option<String>> {
    if !path.exists() {
        return BTreeMap::new();
    }
    let parsed = fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|text| serde_json::from_str(&text).map_err(|e| e.to_string()));
    match parsed {
        Ok(entries) => entries,
        Err(message) => {
            warn!(path = %path.display(), error = %message, "ignoring unreadable lookup cache");
            BTreeMap::new()
        }
    }
}

/// Attaches identifiers to every record lacking one.
pub fn assign_identifiers<L: IdentifierLookup>(
    records: &[DrugRecord],
    lookup: &mut CachedLookup<L>,
) -> Vec<DrugRecord> {
    let assigned: Vec<DrugRecord> = records.iter().map(|r| lookup.assign(r)).collect();
    let found = assigned.iter().filter(|r| r.identifier.is_some()).count();
    info!(records = assigned.len(), with_identifier = found, "assigned identifiers");
    assigned
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    struct FailingLookup;

    impl IdentifierLookup for FailingLookup {
        fn lookup(&self, name: &str) -> Result<Option<String>> {
            Err(LookupError::Status {
                status: 404,
                name: name.to_string(),
            })
        }
    }

    /// Times out on the first call, then answers.
    struct Flaky(RefCell<usize>);

    impl IdentifierLookup for Flaky {
        fn lookup(&self, _name: &str) -> Result<Option<String>> {
            let mut calls = self.0.borrow_mut();
            *calls += 1;
            if *calls == 1 {
                Err(LookupError::Network("operation timed out".into()))
            } else {
                Ok(Some("1191".to_string()))
            }
        }
    }

    struct Recording(RefCell<Vec<String>>);

    impl IdentifierLookup for Recording {
        fn lookup(&self, name: &str) -> Result<Option<String>> {
            self.0.borrow_mut().push(name.to_string());
            Ok(Some("1".to_string()))
        }
    }

    #[test]
    fn test_failure_is_cached_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = CachedLookup::open(FailingLookup, dir.path().join("cache.json"));
        assert_eq!(cache.lookup("Aspirin"), None);
        assert_eq!(cache.len(), 1);
        cache.save().unwrap();

        let text = fs::read_to_string(dir.path().join("cache.json")).unwrap();
        assert!(text.contains("\"aspirin\": null"));
    }

    #[test]
    fn test_timeout_is_retried_on_next_call() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = CachedLookup::open(Flaky(RefCell::new(0)), dir.path().join("cache.json"));
        assert_eq!(cache.lookup("Aspirin"), None);
        assert!(cache.is_empty());
        assert_eq!(cache.lookup("Aspirin").as_deref(), Some("1191"));
        assert_eq!(cache.lookup("Aspirin").as_deref(), Some("1191"));
        assert_eq!(*cache.inner.0.borrow(), 2);
    }

    #[test]
    fn test_save_replaces_file_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, "{\"ibuprofen\": \"5640\"}").unwrap();
        let mut cache = CachedLookup::open(FailingLookup, &path);
        cache.lookup("Aspirin");
        cache.save().unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"ibuprofen\": \"5640\""));
        assert!(text.contains("\"aspirin\": null"));
    }

    #[test]
    fn test_keys_are_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = CachedLookup::open(
            Recording(RefCell::new(Vec::new())),
            dir.path().join("cache.json"),
        );
        cache.lookup("ASPIRIN");
        cache.lookup(" aspirin ");
        cache.lookup("");
        assert_eq!(*cache.inner.0.borrow(), ["aspirin"]);
    }

    #[test]
    fn test_malformed_cache_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, "[1, 2").unwrap();
        let cache = CachedLookup::open(FailingLookup, &path);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_unchanged_cache_is_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cache.json");
        let mut cache = CachedLookup::open(FailingLookup, &path);
        cache.save().unwrap();
        assert!(!path.exists());
    }
}
