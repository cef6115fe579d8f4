// File: ./src/context.rs
/*! Execution context abstraction for filesystem paths.

An `AppContext` tells the rest of the crate where preference namespaces and
the configuration file live. Two concrete implementations are provided:

- `StandardContext`: Uses `directories::ProjectDirs`, or an override root
  (the Android files dir, or `--root` on the command line).
- `TestContext`: Creates a temporary directory for isolated tests and
  cleans it up when dropped.

Nothing here reads environment variables or global state. Callers pass a
`&dyn AppContext` to every operation that touches the disk, so two contexts
in the same process never see each other's namespaces.
*/

use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

/// Package name used when a context does not provide its own.
pub const DEFAULT_PACKAGE_NAME: &str = "droidutils";

/// Subdirectory of the data dir holding one document per namespace.
pub const PREFS_DIR_NAME: &str = "shared_prefs";

/// Defines the file system context for the application.
///
/// The trait is object-safe so callers can hold `Arc<dyn AppContext>`.
pub trait AppContext: Send + Sync + std::fmt::Debug {
    fn get_data_dir(&self) -> Result<PathBuf>;
    fn get_config_dir(&self) -> Result<PathBuf>;

    fn get_config_file_path(&self) -> Result<PathBuf> {
        Ok(self.get_config_dir()?.join("config.toml"))
    }

    fn get_prefs_dir(&self) -> Result<PathBuf> {
        let dir = self.get_data_dir()?.join(PREFS_DIR_NAME);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory: {:?}", dir))?;
        Ok(dir)
    }

    fn package_name(&self) -> &str {
        DEFAULT_PACKAGE_NAME
    }

    /// Name of the ambient namespace shared by the whole application,
    /// `<package>_preferences`.
    fn default_namespace_name(&self) -> String {
        format!("{}_preferences", self.package_name())
    }
}

// --- Production Implementation ---

#[derive(Clone, Debug)]
pub struct StandardContext {
    override_root: Option<PathBuf>,
}

impl StandardContext {
    /// Create a new StandardContext.
    ///
    /// When `override_root` is `Some(path)`, directories are created under
    /// that root as `data` and `config`.
    pub fn new(override_root: Option<PathBuf>) -> Self {
        Self { override_root }
    }

    fn ensure_exists(path: PathBuf) -> Result<PathBuf> {
        if !path.exists() {
            std::fs::create_dir_all(&path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(path)
    }

    fn get_proj_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("com", "selesca", DEFAULT_PACKAGE_NAME)
    }
}

impl AppContext for StandardContext {
    fn get_data_dir(&self) -> Result<PathBuf> {
        if let Some(root) = &self.override_root {
            return Self::ensure_exists(root.join("data"));
        }
        let proj = Self::get_proj_dirs().ok_or_else(|| anyhow::anyhow!("No home directory"))?;
        Self::ensure_exists(proj.data_dir().to_path_buf())
    }

    fn get_config_dir(&self) -> Result<PathBuf> {
        if let Some(root) = &self.override_root {
            return Self::ensure_exists(root.join("config"));
        }
        let proj = Self::get_proj_dirs().ok_or_else(|| anyhow::anyhow!("No home directory"))?;
        Self::ensure_exists(proj.config_dir().to_path_buf())
    }
}

// --- Test Implementation ---

#[derive(Clone, Debug)]
pub struct TestContext {
    pub root: PathBuf,
}

impl TestContext {
    /// Creates a new TestContext backed by a unique temporary directory.
    ///
    /// The directory is created immediately and removed when the `TestContext`
    /// is dropped.
    pub fn new() -> Self {
        let uuid = uuid::Uuid::new_v4();
        let root = std::env::temp_dir().join(format!("droidutils_test_{}", uuid));
        // Best-effort create; tests will panic if this fails.
        std::fs::create_dir_all(&root).expect("failed to create TestContext temp dir");
        Self { root }
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl AppContext for TestContext {
    fn get_data_dir(&self) -> Result<PathBuf> {
        let p = self.root.join("data");
        std::fs::create_dir_all(&p)?;
        Ok(p)
    }

    fn get_config_dir(&self) -> Result<PathBuf> {
        let p = self.root.join("config");
        std::fs::create_dir_all(&p)?;
        Ok(p)
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        // Best-effort cleanup; ignore errors.
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_root_layout() {
        let tmp = TestContext::new();
        let ctx = StandardContext::new(Some(tmp.root.clone()));

        let data = ctx.get_data_dir().unwrap();
        let prefs = ctx.get_prefs_dir().unwrap();
        let config = ctx.get_config_file_path().unwrap();

        assert_eq!(data, tmp.root.join("data"));
        assert_eq!(prefs, tmp.root.join("data").join(PREFS_DIR_NAME));
        assert!(prefs.is_dir());
        assert_eq!(config, tmp.root.join("config").join("config.toml"));
    }

    #[test]
    fn test_default_namespace_name_uses_package() {
        let ctx = TestContext::new();
        assert_eq!(ctx.default_namespace_name(), "droidutils_preferences");
    }

    #[test]
    fn test_context_dir_removed_on_drop() {
        let root = {
            let ctx = TestContext::new();
            ctx.get_prefs_dir().unwrap();
            ctx.root.clone()
        };
        assert!(!root.exists());
    }
}
