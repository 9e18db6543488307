//! Process-wide engine configuration.
//!
//! Values come from an optional env file (loaded with `dotenvy`) and then the
//! process environment. Nothing here is mandatory: every key has a default, so
//! a host that never calls [`Config::init`] still gets a usable [`Config::get`].

use once_cell::sync::OnceCell;
use std::env;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub project_name: String,
    pub log_level: String,
    pub log_file: String,
    /// Caller timezone offset in minutes, positive west of UTC.
    /// `None` means "ask the host" (see [`Config::tz_offset_minutes`]).
    pub tz_offset_minutes: Option<i32>,
    pub countdown_refresh_ms: u64,
    /// Minimum percentage required to pass (0-100).
    pub pass_mark: u32,
}

static CONFIG: OnceCell<Config> = OnceCell::new();

impl Default for Config {
    fn default() -> Self {
        Self {
            project_name: "assessment-engine".into(),
            log_level: "info".into(),
            log_file: "logs/assessment.log".into(),
            tz_offset_minutes: None,
            countdown_refresh_ms: 1000,
            pass_mark: 50,
        }
    }
}

impl Config {
    /// Loads `env_path` (if present) into the environment and caches the result.
    ///
    /// Only the first call reads the environment; later calls return the cached value.
    pub fn init(env_path: &str) -> &'static Self {
        dotenvy::from_filename(env_path).ok();
        CONFIG.get_or_init(Self::from_env)
    }

    pub fn get() -> &'static Self {
        CONFIG.get_or_init(Self::from_env)
    }

    /// Reads the current process environment without touching the cache.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            project_name: env::var("PROJECT_NAME").unwrap_or(defaults.project_name),
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_file: env::var("LOG_FILE").unwrap_or(defaults.log_file),
            tz_offset_minutes: env::var("TZ_OFFSET_MINUTES")
                .ok()
                .and_then(|v| v.trim().parse().ok()),
            countdown_refresh_ms: env::var("COUNTDOWN_REFRESH_MS")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .filter(|ms| *ms > 0)
                .unwrap_or(defaults.countdown_refresh_ms),
            pass_mark: env::var("PASS_MARK")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .filter(|p| *p <= 100)
                .unwrap_or(defaults.pass_mark),
        }
    }

    /// Configured offset, or the host's current offset when none is set.
    pub fn tz_offset_minutes(&self) -> i32 {
        self.tz_offset_minutes.unwrap_or_else(host_offset_minutes)
    }
}

/// Host offset in the positive-west convention (UTC+2 -> -120).
pub fn host_offset_minutes() -> i32 {
    -chrono::Local::now().offset().local_minus_utc() / 60
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const KEYS: [&str; 6] = [
        "PROJECT_NAME",
        "LOG_LEVEL",
        "LOG_FILE",
        "TZ_OFFSET_MINUTES",
        "COUNTDOWN_REFRESH_MS",
        "PASS_MARK",
    ];

    fn clear_env() {
        for key in KEYS {
            unsafe { env::remove_var(key) };
        }
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        assert_eq!(Config::from_env(), Config::default());
    }

    #[test]
    #[serial]
    fn test_from_env_reads_overrides() {
        clear_env();
        unsafe {
            env::set_var("PROJECT_NAME", "course-engine");
            env::set_var("TZ_OFFSET_MINUTES", "-120");
            env::set_var("COUNTDOWN_REFRESH_MS", "250");
            env::set_var("PASS_MARK", "40");
        }

        let cfg = Config::from_env();
        assert_eq!(cfg.project_name, "course-engine");
        assert_eq!(cfg.tz_offset_minutes, Some(-120));
        assert_eq!(cfg.tz_offset_minutes(), -120);
        assert_eq!(cfg.countdown_refresh_ms, 250);
        assert_eq!(cfg.pass_mark, 40);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_ignores_garbage_numbers() {
        clear_env();
        unsafe {
            env::set_var("COUNTDOWN_REFRESH_MS", "0");
            env::set_var("PASS_MARK", "250");
            env::set_var("TZ_OFFSET_MINUTES", "east");
        }

        let cfg = Config::from_env();
        assert_eq!(cfg.countdown_refresh_ms, 1000);
        assert_eq!(cfg.pass_mark, 50);
        assert_eq!(cfg.tz_offset_minutes, None);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_env_file_values_reach_from_env() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "PASS_MARK=65\n").unwrap();

        dotenvy::from_filename(&path).unwrap();
        assert_eq!(Config::from_env().pass_mark, 65);
        clear_env();
    }
}
