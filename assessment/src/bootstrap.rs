//! One-time setup for a host process embedding the engine.

use common::config::Config;
use common::logger::init_logger;
use log::info;

/// Loads configuration from `env_path` and the environment, then installs the logger.
///
/// Call once at startup. The returned config carries the timezone offset and pass mark that
/// callers pass into the pure engine functions.
pub fn init(env_path: &str) -> Result<&'static Config, fern::InitError> {
    let config = Config::init(env_path);
    init_logger(&config.log_level, &config.log_file)?;

    info!(
        "{} ready: tz offset {} min, countdown refresh {} ms, pass mark {}%",
        config.project_name,
        config.tz_offset_minutes(),
        config.countdown_refresh_ms,
        config.pass_mark
    );

    Ok(config)
}
