use std::process::ExitCode;

use dermis_core::config::{AppConfig, LoadOptions};

/// Logs go to stderr so stdout stays a single JSON envelope.
fn init_logging(config: &AppConfig) {
    use dermis_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    match config.logging.format {
        Compact => builder.compact().init(),
        Pretty => builder.pretty().init(),
        Json => builder.json().init(),
    }
}

fn main() -> ExitCode {
    // An invalid config still gets logging; the command itself reports the config error.
    let config = AppConfig::load(LoadOptions::default()).unwrap_or_default();
    init_logging(&config);

    dermis_cli::run()
}
