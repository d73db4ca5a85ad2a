// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! In-memory config store fake for testing without filesystem I/O.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use wire_app_core::config::{ConfigError, ConfigStore};
use wire_app_core::prefs::{WirePrefs, PREFS_KEY};

/// In-memory [`ConfigStore`] with call counters and failure injection.
///
/// Clones share one backing map, so a test can hand a clone to a
/// `ConfigService` and inspect what was written through the original.
///
/// # Example
///
/// ```
/// use wire_dry_tests::InMemoryConfigStore;
/// use wire_app_core::config::ConfigService;
/// use wire_app_core::prefs::{save_prefs, WirePrefs};
///
/// let store = InMemoryConfigStore::new();
/// let service = ConfigService::new(store.clone());
///
/// save_prefs(&service, &WirePrefs::default()).unwrap();
/// assert_eq!(store.saves(), 1);
/// assert_eq!(store.saved_prefs(), Some(WirePrefs::default()));
/// ```
#[derive(Clone, Default)]
pub struct InMemoryConfigStore {
    inner: Arc<Mutex<Blobs>>,
}

#[derive(Default)]
struct Blobs {
    data: BTreeMap<String, Vec<u8>>,
    loads: usize,
    saves: usize,
    fail_loads: bool,
    fail_saves: bool,
}

impl InMemoryConfigStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding `blob` under `key`.
    pub fn with_raw(key: &str, blob: impl Into<Vec<u8>>) -> Self {
        let store = Self::new();
        store.with_blobs(|b| b.data.insert(key.to_owned(), blob.into()));
        store
    }

    /// Store holding `prefs` under [`PREFS_KEY`], encoded as the service
    /// would encode them.
    pub fn with_prefs(prefs: &WirePrefs) -> Self {
        let blob = serde_json::to_vec_pretty(prefs).unwrap_or_default();
        Self::with_raw(PREFS_KEY, blob)
    }

    fn with_blobs<R>(&self, f: impl FnOnce(&mut Blobs) -> R) -> R {
        let mut blobs = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut blobs)
    }

    /// Makes every following `load_raw` fail (or succeed again).
    pub fn fail_loads(&self, fail: bool) {
        self.with_blobs(|b| b.fail_loads = fail);
    }

    /// Makes every following `save_raw` fail (or succeed again).
    pub fn fail_saves(&self, fail: bool) {
        self.with_blobs(|b| b.fail_saves = fail);
    }

    /// `load_raw` attempts so far, failed ones included.
    pub fn loads(&self) -> usize {
        self.with_blobs(|b| b.loads)
    }

    /// `save_raw` attempts so far, failed ones included.
    pub fn saves(&self) -> usize {
        self.with_blobs(|b| b.saves)
    }

    /// Raw blob under `key`, bypassing the counters.
    pub fn peek(&self, key: &str) -> Option<Vec<u8>> {
        self.with_blobs(|b| b.data.get(key).cloned())
    }

    /// Prefs currently stored under [`PREFS_KEY`], if they decode.
    pub fn saved_prefs(&self) -> Option<WirePrefs> {
        self.peek(PREFS_KEY).and_then(|blob| serde_json::from_slice(&blob).ok())
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
        self.with_blobs(|b| {
            b.loads += 1;
            if b.fail_loads {
                return Err(ConfigError::Other(format!("injected load failure for {key}")));
            }
            b.data.get(key).cloned().ok_or(ConfigError::NotFound)
        })
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        self.with_blobs(|b| {
            b.saves += 1;
            if b.fail_saves {
                return Err(ConfigError::Other(format!("injected save failure for {key}")));
            }
            b.data.insert(key.to_owned(), data.to_vec());
            Ok(())
        })
    }
}
