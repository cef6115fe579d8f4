/*
 * droidutils/src/preferences.rs
 *
 * Typed, default-aware facade over a named preferences namespace.
 *
 * The namespace is resolved from the context passed to each call; the
 * handle itself only remembers the namespace name. A process-wide shared
 * handle is available through `Preferences::get_instance`, and independent
 * handles can be built with `Preferences::new` for injection and tests.
 */

use crate::config::Config;
use crate::context::AppContext;
use crate::namespace::Namespace;
use anyhow::Result;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Namespace used when nothing else is configured.
pub const DEFAULT_PREFERENCES: &str = "main";

static INSTANCE: OnceLock<Preferences> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    name: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self::new(DEFAULT_PREFERENCES)
    }
}

impl Preferences {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Returns the process-wide handle, creating it on first use.
    ///
    /// The first caller's context decides the namespace name (from its
    /// `config.toml`, default `"main"`). Later calls return the same handle
    /// whatever context they pass. Concurrent first calls construct exactly
    /// one instance.
    pub fn get_instance(ctx: &dyn AppContext) -> &'static Preferences {
        INSTANCE.get_or_init(|| {
            let config = Config::load_or_default(ctx);
            log::debug!(
                "Initializing shared preferences on namespace '{}'",
                config.preferences_name
            );
            Preferences::new(config.preferences_name)
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Open this handle's namespace under `ctx`. Resolved on every call.
    pub fn shared_preferences(&self, ctx: &dyn AppContext) -> Result<Namespace> {
        Namespace::open(ctx, &self.name)
    }

    /// Run a read against the namespace, or return `default` when the
    /// namespace cannot be opened.
    fn read<T>(
        &self,
        ctx: &dyn AppContext,
        default: T,
        f: impl FnOnce(&Namespace, T) -> T,
    ) -> T {
        match self.shared_preferences(ctx) {
            Ok(ns) => f(&ns, default),
            Err(e) => {
                log::warn!(
                    "Cannot read preferences '{}', using default: {:#}",
                    self.name,
                    e
                );
                default
            }
        }
    }

    pub fn get_int(&self, key: &str, default: i32, ctx: &dyn AppContext) -> i32 {
        self.read(ctx, default, |ns, d| ns.get_int(key, d))
    }

    pub fn get_string(&self, key: &str, default: &str, ctx: &dyn AppContext) -> String {
        self.read(ctx, default.to_string(), |ns, d| ns.get_string(key, &d))
    }

    pub fn get_bool(&self, key: &str, default: bool, ctx: &dyn AppContext) -> bool {
        self.read(ctx, default, |ns, d| ns.get_bool(key, d))
    }

    pub fn get_long(&self, key: &str, default: i64, ctx: &dyn AppContext) -> i64 {
        self.read(ctx, default, |ns, d| ns.get_long(key, d))
    }

    pub fn get_string_set(
        &self,
        key: &str,
        default: BTreeSet<String>,
        ctx: &dyn AppContext,
    ) -> BTreeSet<String> {
        self.read(ctx, default, |ns, d| ns.get_string_set(key, &d))
    }

    pub fn contains(&self, key: &str, ctx: &dyn AppContext) -> bool {
        self.read(ctx, false, |ns, _| ns.contains(key))
    }

    // Setters commit before returning and hand back `self` so calls chain
    // with `?`: `prefs.set_int("a", 1, ctx)?.set_bool("b", true, ctx)?`.

    pub fn set_int(&self, key: &str, value: i32, ctx: &dyn AppContext) -> Result<&Self> {
        self.shared_preferences(ctx)?
            .edit()
            .put_int(key, value)
            .commit()?;
        Ok(self)
    }

    pub fn set_string(&self, key: &str, value: &str, ctx: &dyn AppContext) -> Result<&Self> {
        self.shared_preferences(ctx)?
            .edit()
            .put_string(key, value)
            .commit()?;
        Ok(self)
    }

    pub fn set_bool(&self, key: &str, value: bool, ctx: &dyn AppContext) -> Result<&Self> {
        self.shared_preferences(ctx)?
            .edit()
            .put_bool(key, value)
            .commit()?;
        Ok(self)
    }

    pub fn set_long(&self, key: &str, value: i64, ctx: &dyn AppContext) -> Result<&Self> {
        self.shared_preferences(ctx)?
            .edit()
            .put_long(key, value)
            .commit()?;
        Ok(self)
    }

    pub fn set_string_set<I, S>(&self, key: &str, values: I, ctx: &dyn AppContext) -> Result<&Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.shared_preferences(ctx)?
            .edit()
            .put_string_set(key, values)
            .commit()?;
        Ok(self)
    }

    pub fn remove(&self, key: &str, ctx: &dyn AppContext) -> Result<&Self> {
        self.shared_preferences(ctx)?.edit().remove(key).commit()?;
        Ok(self)
    }

    /// Remove every key in this handle's namespace.
    pub fn clear(&self, ctx: &dyn AppContext) -> Result<&Self> {
        self.shared_preferences(ctx)?.edit().clear().commit()?;
        Ok(self)
    }
}
