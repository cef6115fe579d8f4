// File: ./src/clock.rs
//! Wall clock with an optional mock offset for debug builds.
//!
//! In debug mode the current time is read from the `mock_data` namespace
//! (`mock_current_time`, epoch millis) and advanced by however long the
//! process has been running, so a tester can pin the app to a specific
//! moment and still watch time pass.

use crate::context::AppContext;
use crate::namespace::Namespace;
use anyhow::Result;
use chrono::Utc;
use once_cell::sync::Lazy;

pub const MOCK_DATA_PREFERENCES: &str = "mock_data";
pub const MOCK_CURRENT_TIME_KEY: &str = "mock_current_time";

static APP_LOAD_TIME: Lazy<i64> = Lazy::new(now_millis);

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Epoch millis captured the first time anything asks for the clock.
pub fn app_load_time() -> i64 {
    *APP_LOAD_TIME
}

pub fn current_time_millis(ctx: &dyn AppContext, debug: bool) -> i64 {
    if !debug {
        return now_millis();
    }
    let load_time = app_load_time();
    let now = now_millis();
    let base = match Namespace::open(ctx, MOCK_DATA_PREFERENCES) {
        Ok(ns) => ns.get_long(MOCK_CURRENT_TIME_KEY, now),
        Err(e) => {
            log::warn!("Mock clock unavailable, using real time: {:#}", e);
            now
        }
    };
    // Stored mock times are arbitrary i64 values
    base.saturating_add(now.saturating_sub(load_time))
}

pub fn set_mock_current_time(ctx: &dyn AppContext, millis: i64) -> Result<()> {
    Namespace::open(ctx, MOCK_DATA_PREFERENCES)?
        .edit()
        .put_long(MOCK_CURRENT_TIME_KEY, millis)
        .commit()
}

pub fn clear_mock_current_time(ctx: &dyn AppContext) -> Result<()> {
    Namespace::open(ctx, MOCK_DATA_PREFERENCES)?
        .edit()
        .remove(MOCK_CURRENT_TIME_KEY)
        .commit()
}
