/*
 * droidutils/src/namespace.rs
 *
 * Named, private key-value namespaces persisted under the context's data dir.
 *
 * Each namespace is a single JSON document. Reads are served from an
 * in-memory view loaded at open time; writes go through an `Editor` whose
 * `commit` re-reads the document under the file lock, applies the batched
 * edits and atomically replaces the file before returning.
 *
 * ⚠️ VERSION BUMP REQUIRED:
 * Changes to `PrefValue` serialization require incrementing
 * NAMESPACE_FORMAT_VERSION below.
 */

use crate::context::AppContext;
use crate::storage::LocalStorage;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

// Version history:
// - v1: tagged PrefValue entries keyed by preference name
const NAMESPACE_FORMAT_VERSION: u32 = 1;

/// A single stored preference.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PrefValue {
    Int(i32),
    String(String),
    Bool(bool),
    Long(i64),
    StringSet(BTreeSet<String>),
}

impl PrefValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            PrefValue::Int(_) => "int",
            PrefValue::String(_) => "string",
            PrefValue::Bool(_) => "bool",
            PrefValue::Long(_) => "long",
            PrefValue::StringSet(_) => "string_set",
        }
    }
}

impl fmt::Display for PrefValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefValue::Int(v) => write!(f, "{}", v),
            PrefValue::String(v) => write!(f, "{}", v),
            PrefValue::Bool(v) => write!(f, "{}", v),
            PrefValue::Long(v) => write!(f, "{}", v),
            PrefValue::StringSet(v) => {
                let items: Vec<&str> = v.iter().map(String::as_str).collect();
                write!(f, "[{}]", items.join(", "))
            }
        }
    }
}

/// On-disk document wrapper.
#[derive(Serialize, Deserialize, Default)]
struct NamespaceData {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    entries: BTreeMap<String, PrefValue>,
}

/// Reject names that would escape the prefs directory.
fn validate_name(name: &str) -> Result<()> {
    if name.is_empty()
        || name == "."
        || name.contains("..")
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0')
    {
        return Err(anyhow::anyhow!("Invalid preferences namespace name: '{}'", name));
    }
    Ok(())
}

/// Read the document at `path` without taking the lock.
///
/// A missing file is an empty namespace. Unparseable content or a document
/// written by a newer version is an error so it is never overwritten.
fn read_entries(path: &Path) -> Result<BTreeMap<String, PrefValue>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read namespace '{}'", path.display()))?;
    if json.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    let data: NamespaceData = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse namespace '{}'", path.display()))?;
    if data.version > NAMESPACE_FORMAT_VERSION {
        return Err(anyhow::anyhow!(
            "Namespace '{}' has format v{} but this build only understands up to v{}",
            path.display(),
            data.version,
            NAMESPACE_FORMAT_VERSION
        ));
    }
    Ok(data.entries)
}

/// Handle on one named namespace.
#[derive(Debug)]
pub struct Namespace {
    name: String,
    path: PathBuf,
    entries: Mutex<BTreeMap<String, PrefValue>>,
}

impl Namespace {
    /// Open (or lazily create) the namespace `name` under `ctx`.
    pub fn open(ctx: &dyn AppContext, name: &str) -> Result<Self> {
        validate_name(name)?;
        let path = ctx.get_prefs_dir()?.join(format!("{}.json", name));
        let entries = if path.exists() {
            LocalStorage::with_lock(&path, || read_entries(&path))?
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            name: name.to_string(),
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn view(&self) -> MutexGuard<'_, BTreeMap<String, PrefValue>> {
        // The map is only ever replaced wholesale, so a poisoned guard still
        // holds a consistent snapshot.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Re-read the document from disk, picking up commits made through
    /// other handles or other processes.
    pub fn reload(&self) -> Result<()> {
        let fresh = if self.path.exists() {
            LocalStorage::with_lock(&self.path, || read_entries(&self.path))?
        } else {
            BTreeMap::new()
        };
        *self.view() = fresh;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<PrefValue> {
        self.view().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.view().contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.view().keys().cloned().collect()
    }

    pub fn entries(&self) -> BTreeMap<String, PrefValue> {
        self.view().clone()
    }

    pub fn len(&self) -> usize {
        self.view().len()
    }

    pub fn is_empty(&self) -> bool {
        self.view().is_empty()
    }

    fn mismatch(&self, key: &str, wanted: &str, found: &PrefValue) {
        log::warn!(
            "Preference '{}' in '{}' is a {}, not a {}; using default",
            key,
            self.name,
            found.type_name(),
            wanted
        );
    }

    pub fn get_int(&self, key: &str, default: i32) -> i32 {
        match self.view().get(key) {
            Some(PrefValue::Int(v)) => *v,
            Some(other) => {
                self.mismatch(key, "int", other);
                default
            }
            None => default,
        }
    }

    pub fn get_string(&self, key: &str, default: &str) -> String {
        match self.view().get(key) {
            Some(PrefValue::String(v)) => v.clone(),
            Some(other) => {
                self.mismatch(key, "string", other);
                default.to_string()
            }
            None => default.to_string(),
        }
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.view().get(key) {
            Some(PrefValue::Bool(v)) => *v,
            Some(other) => {
                self.mismatch(key, "bool", other);
                default
            }
            None => default,
        }
    }

    pub fn get_long(&self, key: &str, default: i64) -> i64 {
        match self.view().get(key) {
            Some(PrefValue::Long(v)) => *v,
            Some(other) => {
                self.mismatch(key, "long", other);
                default
            }
            None => default,
        }
    }

    pub fn get_string_set(&self, key: &str, default: &BTreeSet<String>) -> BTreeSet<String> {
        match self.view().get(key) {
            Some(PrefValue::StringSet(v)) => v.clone(),
            Some(other) => {
                self.mismatch(key, "string_set", other);
                default.clone()
            }
            None => default.clone(),
        }
    }

    /// Start a batch of edits. Nothing is written until `Editor::commit`.
    pub fn edit(&self) -> Editor<'_> {
        Editor {
            namespace: self,
            clear: false,
            ops: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
enum EditOp {
    Put(String, PrefValue),
    Remove(String),
}

/// Pending edits against a `Namespace`.
#[derive(Debug)]
#[must_use = "edits are discarded unless `commit` is called"]
pub struct Editor<'a> {
    namespace: &'a Namespace,
    clear: bool,
    ops: Vec<EditOp>,
}

impl Editor<'_> {
    pub fn put(mut self, key: &str, value: PrefValue) -> Self {
        self.ops.push(EditOp::Put(key.to_string(), value));
        self
    }

    pub fn put_int(self, key: &str, value: i32) -> Self {
        self.put(key, PrefValue::Int(value))
    }

    pub fn put_string(self, key: &str, value: &str) -> Self {
        self.put(key, PrefValue::String(value.to_string()))
    }

    pub fn put_bool(self, key: &str, value: bool) -> Self {
        self.put(key, PrefValue::Bool(value))
    }

    pub fn put_long(self, key: &str, value: i64) -> Self {
        self.put(key, PrefValue::Long(value))
    }

    pub fn put_string_set<I, S>(self, key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set = values.into_iter().map(Into::into).collect();
        self.put(key, PrefValue::StringSet(set))
    }

    pub fn remove(mut self, key: &str) -> Self {
        self.ops.push(EditOp::Remove(key.to_string()));
        self
    }

    /// Drop every existing entry. Applied before any put or remove in the
    /// same batch, whatever the call order.
    pub fn clear(mut self) -> Self {
        self.clear = true;
        self
    }

    /// Apply the batch and durably persist it before returning.
    ///
    /// On error the document on disk is unchanged and the namespace view is
    /// left as it was.
    pub fn commit(self) -> Result<()> {
        let ns = self.namespace;
        let path = ns.path.as_path();
        let merged = LocalStorage::with_lock(path, || {
            let mut entries = if self.clear {
                BTreeMap::new()
            } else {
                read_entries(path)?
            };
            for op in &self.ops {
                match op {
                    EditOp::Put(k, v) => {
                        entries.insert(k.clone(), v.clone());
                    }
                    EditOp::Remove(k) => {
                        entries.remove(k);
                    }
                }
            }
            let data = NamespaceData {
                version: NAMESPACE_FORMAT_VERSION,
                entries,
            };
            let json = serde_json::to_string_pretty(&data)?;
            LocalStorage::atomic_write(path, json)?;
            Ok(data.entries)
        })
        .with_context(|| format!("Failed to commit preferences namespace '{}'", ns.name))?;

        log::debug!(
            "Committed {} edit(s){} to '{}'",
            self.ops.len(),
            if self.clear { " after clear" } else { "" },
            ns.name
        );
        *ns.view() = merged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TestContext;

    #[test]
    fn test_missing_namespace_is_empty() {
        let ctx = TestContext::new();
        let ns = Namespace::open(&ctx, "main").unwrap();
        assert!(ns.is_empty());
        assert_eq!(ns.get_int("nope", 7), 7);
        assert!(!ns.path().exists());
    }

    #[test]
    fn test_invalid_names_rejected() {
        let ctx = TestContext::new();
        for name in ["", "..", "../escape", "a/b", "a\\b"] {
            assert!(Namespace::open(&ctx, name).is_err(), "accepted '{}'", name);
        }
    }

    #[test]
    fn test_type_mismatch_returns_default() {
        let ctx = TestContext::new();
        let ns = Namespace::open(&ctx, "main").unwrap();
        ns.edit().put_long("when", 5).commit().unwrap();

        assert_eq!(ns.get_int("when", -1), -1);
        assert_eq!(ns.get_long("when", -1), 5);
        assert_eq!(ns.get_string("when", "x"), "x");
    }

    #[test]
    fn test_clear_applies_before_puts() {
        let ctx = TestContext::new();
        let ns = Namespace::open(&ctx, "main").unwrap();
        ns.edit().put_int("a", 1).put_int("b", 2).commit().unwrap();

        ns.edit().put_int("c", 3).clear().commit().unwrap();

        assert_eq!(ns.keys(), vec!["c".to_string()]);
    }

    #[test]
    fn test_remove_and_put_follow_call_order() {
        let ctx = TestContext::new();
        let ns = Namespace::open(&ctx, "main").unwrap();
        ns.edit().put_string("k", "v1").commit().unwrap();

        ns.edit().remove("k").put_string("k", "v2").commit().unwrap();
        assert_eq!(ns.get_string("k", ""), "v2");

        ns.edit().put_string("k", "v3").remove("k").commit().unwrap();
        assert!(!ns.contains("k"));
    }

    #[test]
    fn test_document_format_is_tagged() {
        let ctx = TestContext::new();
        let ns = Namespace::open(&ctx, "main").unwrap();
        ns.edit().put_bool("flag", true).commit().unwrap();

        let raw = fs::read_to_string(ns.path()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["version"], 1);
        assert_eq!(json["entries"]["flag"]["type"], "bool");
        assert_eq!(json["entries"]["flag"]["value"], true);
    }

    #[test]
    fn test_future_version_rejected() {
        let ctx = TestContext::new();
        let path = ctx.get_prefs_dir().unwrap().join("main.json");
        fs::write(&path, r#"{"version": 99, "entries": {}}"#).unwrap();

        assert!(Namespace::open(&ctx, "main").is_err());
    }

    #[test]
    fn test_display_values() {
        let set: BTreeSet<String> = ["b", "a"].iter().map(|s| s.to_string()).collect();
        assert_eq!(PrefValue::StringSet(set).to_string(), "[a, b]");
        assert_eq!(PrefValue::Long(-3).to_string(), "-3");
    }
}
