// Crate root library declaration and module exports.
pub mod cli;
pub mod clock;
pub mod config;
pub mod context;
pub mod logging;
pub mod namespace;
pub mod notifications;
pub mod preferences;
pub mod storage;

pub use context::{AppContext, StandardContext, TestContext};
pub use namespace::{Editor, Namespace, PrefValue};
pub use preferences::{DEFAULT_PREFERENCES, Preferences};

// --- ANDROID SUPPORT ---
#[cfg(feature = "mobile")]
pub mod mobile;

#[cfg(feature = "mobile")]
uniffi::setup_scaffolding!();
