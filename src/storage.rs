// Low-level file primitives shared by namespace commits and the config file.
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

// --- Android Specific Imports ---
#[cfg(target_os = "android")]
use std::collections::HashMap;
#[cfg(target_os = "android")]
use std::sync::{Arc, Mutex, OnceLock};

// --- Desktop Specific Imports ---
#[cfg(not(target_os = "android"))]
use fs2::FileExt;

// --- Android Global Lock Map ---
#[cfg(target_os = "android")]
static ANDROID_FILE_LOCKS: OnceLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> = OnceLock::new();

pub struct LocalStorage;

impl LocalStorage {
    /// Helper to get a sidecar lock file path (Desktop only)
    #[cfg(not(target_os = "android"))]
    fn get_lock_path(file_path: &Path) -> PathBuf {
        let mut lock_path = file_path.to_path_buf();
        if let Some(ext) = lock_path.extension() {
            let mut new_ext = ext.to_os_string();
            new_ext.push(".lock");
            lock_path.set_extension(new_ext);
        } else {
            lock_path.set_extension("lock");
        }
        lock_path
    }

    // --- DESKTOP IMPLEMENTATION (fs2) ---
    /// Run `f` while holding an exclusive lock for `file_path`.
    ///
    /// The lock is advisory and held on a sidecar `.lock` file, so it
    /// serializes other threads and other processes using this crate.
    #[cfg(not(target_os = "android"))]
    pub fn with_lock<F, T>(file_path: &Path, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let lock_path = Self::get_lock_path(file_path);
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .with_context(|| format!("Failed to open lock file '{}'", lock_path.display()))?;

        file.lock_exclusive()?;
        let result = f();
        file.unlock()?;
        result
    }

    // --- ANDROID IMPLEMENTATION (In-Memory Mutex) ---
    #[cfg(target_os = "android")]
    pub fn with_lock<F, T>(file_path: &Path, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let map_mutex = ANDROID_FILE_LOCKS.get_or_init(|| Mutex::new(HashMap::new()));

        // Canonicalize to avoid race conditions via symlinks or relative paths
        let key = file_path.canonicalize().unwrap_or(file_path.to_path_buf());

        let file_mutex = {
            let mut map = map_mutex
                .lock()
                .map_err(|_| anyhow::anyhow!("File lock map poisoned"))?;
            map.entry(key)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };

        let _guard = file_mutex
            .lock()
            .map_err(|_| anyhow::anyhow!("File lock poisoned"))?;

        f()
    }

    /// Atomic write: write to a `.tmp` sibling, flush it to disk, then rename.
    ///
    /// Readers see either the previous contents or the new contents, never
    /// a partial file. When this returns `Ok` the data has been synced.
    pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<()> {
        let path = path.as_ref();
        let tmp_path = path.with_extension("tmp");
        {
            let mut file = fs::File::create(&tmp_path)
                .with_context(|| format!("Failed to create '{}'", tmp_path.display()))?;
            file.write_all(contents.as_ref())?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to move '{}' into place at '{}'",
                tmp_path.display(),
                path.display()
            )
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{AppContext, TestContext};

    #[test]
    fn test_atomic_write_replaces_contents() {
        let ctx = TestContext::new();
        let path = ctx.get_data_dir().unwrap().join("doc.json");

        LocalStorage::atomic_write(&path, "first").unwrap();
        LocalStorage::atomic_write(&path, "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_with_lock_returns_closure_result() {
        let ctx = TestContext::new();
        let path = ctx.get_data_dir().unwrap().join("doc.json");

        let value = LocalStorage::with_lock(&path, || Ok(42)).unwrap();
        assert_eq!(value, 42);

        let err = LocalStorage::with_lock::<_, ()>(&path, || Err(anyhow::anyhow!("boom")));
        assert!(err.is_err());

        // The lock is released after an error, so it can be taken again.
        assert!(LocalStorage::with_lock(&path, || Ok(())).is_ok());
    }

    #[cfg(not(target_os = "android"))]
    #[test]
    fn test_lock_path_is_sidecar() {
        let p = Path::new("/tmp/main.json");
        assert_eq!(
            LocalStorage::get_lock_path(p),
            PathBuf::from("/tmp/main.json.lock")
        );
    }
}
