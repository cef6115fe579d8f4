/* droidutils/src/mobile.rs
 *
 * UniFFI interface exposing the preferences store to mobile platforms (Android).
 */

use crate::clock;
use crate::config::Config;
use crate::context::StandardContext;
use crate::notifications;
use crate::preferences::Preferences;
use std::path::PathBuf;

#[derive(Debug, uniffi::Error)]
#[uniffi(flat_error)]
pub enum MobileError {
    Generic(String),
}
impl From<anyhow::Error> for MobileError {
    fn from(e: anyhow::Error) -> Self {
        Self::Generic(format!("{:#}", e))
    }
}
impl std::fmt::Display for MobileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                MobileError::Generic(s) => s,
            }
        )
    }
}
impl std::error::Error for MobileError {}

/// Preferences bound to the app's files dir.
///
/// Kotlin keeps one of these per process; all of them share the same
/// underlying `Preferences` handle.
#[derive(uniffi::Object)]
pub struct MobilePreferences {
    ctx: StandardContext,
    prefs: &'static Preferences,
    debug: bool,
}

#[uniffi::export]
impl MobilePreferences {
    #[uniffi::constructor]
    pub fn new(android_files_dir: String) -> Self {
        let ctx = StandardContext::new(Some(PathBuf::from(android_files_dir)));
        let config = Config::load_or_default(&ctx);
        crate::logging::init(config.log_level_filter());
        // Pin the mock clock's reference point to library load.
        clock::app_load_time();
        Self {
            prefs: Preferences::get_instance(&ctx),
            debug: config.debug,
            ctx,
        }
    }

    pub fn namespace_name(&self) -> String {
        self.prefs.name().to_string()
    }

    pub fn get_int(&self, key: String, default_value: i32) -> i32 {
        self.prefs.get_int(&key, default_value, &self.ctx)
    }

    pub fn get_string(&self, key: String, default_value: String) -> String {
        self.prefs.get_string(&key, &default_value, &self.ctx)
    }

    pub fn get_boolean(&self, key: String, default_value: bool) -> bool {
        self.prefs.get_bool(&key, default_value, &self.ctx)
    }

    pub fn get_long(&self, key: String, default_value: i64) -> i64 {
        self.prefs.get_long(&key, default_value, &self.ctx)
    }

    // UniFFI has no set type; sets cross the boundary as sorted lists.
    pub fn get_string_set(&self, key: String, default_value: Vec<String>) -> Vec<String> {
        self.prefs
            .get_string_set(&key, default_value.into_iter().collect(), &self.ctx)
            .into_iter()
            .collect()
    }

    pub fn set_int(&self, key: String, value: i32) -> Result<(), MobileError> {
        self.prefs.set_int(&key, value, &self.ctx)?;
        Ok(())
    }

    pub fn set_string(&self, key: String, value: String) -> Result<(), MobileError> {
        self.prefs.set_string(&key, &value, &self.ctx)?;
        Ok(())
    }

    pub fn set_boolean(&self, key: String, value: bool) -> Result<(), MobileError> {
        self.prefs.set_bool(&key, value, &self.ctx)?;
        Ok(())
    }

    pub fn set_long(&self, key: String, value: i64) -> Result<(), MobileError> {
        self.prefs.set_long(&key, value, &self.ctx)?;
        Ok(())
    }

    pub fn set_string_set(&self, key: String, value: Vec<String>) -> Result<(), MobileError> {
        self.prefs.set_string_set(&key, value, &self.ctx)?;
        Ok(())
    }

    pub fn remove(&self, key: String) -> Result<(), MobileError> {
        self.prefs.remove(&key, &self.ctx)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<(), MobileError> {
        self.prefs.clear(&self.ctx)?;
        Ok(())
    }

    pub fn is_notification_fired_for_block(&self, block_id: String) -> Result<bool, MobileError> {
        Ok(notifications::is_notification_fired_for_block(
            &self.ctx, &block_id,
        )?)
    }

    pub fn current_time_millis(&self) -> i64 {
        clock::current_time_millis(&self.ctx, self.debug)
    }

    pub fn set_mock_current_time(&self, millis: i64) -> Result<(), MobileError> {
        clock::set_mock_current_time(&self.ctx, millis)?;
        Ok(())
    }
}
