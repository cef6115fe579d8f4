// Once-per-block notification bookkeeping on the app's default namespace.
use crate::context::AppContext;
use crate::namespace::Namespace;
use anyhow::Result;

pub const NOTIFICATION_FIRED_KEY_PREFIX: &str = "notification_fired_";

pub fn notification_fired_key(block_id: &str) -> String {
    format!("{}{}", NOTIFICATION_FIRED_KEY_PREFIX, block_id)
}

/// Whether a notification was already fired for the time block `block_id`.
///
/// Returns the stored flag (false if never set) and marks the block as
/// fired, so the first call for a block returns `false` and every later
/// call returns `true`.
pub fn is_notification_fired_for_block(ctx: &dyn AppContext, block_id: &str) -> Result<bool> {
    let ns = Namespace::open(ctx, &ctx.default_namespace_name())?;
    let key = notification_fired_key(block_id);
    let fired = ns.get_bool(&key, false);
    if !fired {
        ns.edit().put_bool(&key, true).commit()?;
        log::debug!("Marked notification block '{}' as fired", block_id);
    }
    Ok(fired)
}
