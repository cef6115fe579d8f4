// Shared Preferences handle built from a context's config.toml.
// Kept in its own test binary so the process-wide handle starts uninitialized.
use droidutils::config::Config;
use droidutils::{Preferences, TestContext};
use serial_test::serial;

#[test]
#[serial]
fn test_shared_instance_uses_configured_namespace_name() {
    let ctx = TestContext::new();
    Config {
        preferences_name: "settings".to_string(),
        ..Config::default()
    }
    .save(&ctx)
    .unwrap();

    let prefs = Preferences::get_instance(&ctx);
    assert_eq!(prefs.name(), "settings");

    prefs.set_int("volume", 4, &ctx).unwrap();
    let ns = prefs.shared_preferences(&ctx).unwrap();
    assert_eq!(ns.name(), "settings");
    assert_eq!(ns.get_int("volume", 0), 4);

    // Later callers get the same handle even without a config of their own
    let other = TestContext::new();
    assert!(std::ptr::eq(prefs, Preferences::get_instance(&other)));
    assert_eq!(Preferences::get_instance(&other).name(), "settings");
}
