// Logger installation for the desktop CLI and the Android library.
use log::LevelFilter;

/// Install the process logger. Safe to call more than once; only the first
/// call takes effect.
#[cfg(not(target_os = "android"))]
pub fn init(level: LevelFilter) {
    use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

    let config = ConfigBuilder::new()
        .set_target_level(LevelFilter::Error)
        .set_time_level(LevelFilter::Off)
        .build();
    // An error here only means a logger is already installed.
    let _ = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto);
}

#[cfg(target_os = "android")]
pub fn init(level: LevelFilter) {
    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(level)
            .with_tag("DroidUtils"),
    );
}
