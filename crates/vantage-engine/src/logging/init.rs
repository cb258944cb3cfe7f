use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};

use log::LevelFilter;

/// Logger configuration.
///
/// Filter precedence: `env_filter`, then `RUST_LOG`, then `default_level`.
/// Filters use the `env_logger` syntax, e.g.
/// "vantage_views=debug,vantage_engine=warn".
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub default_level: LevelFilter,
    pub write_style: env_logger::WriteStyle,
    /// Route output through the test harness capture.
    pub is_test: bool,
}

impl LoggingConfig {
    pub fn with_filter(filter: impl Into<String>) -> Self {
        Self { env_filter: Some(filter.into()), ..Self::default() }
    }

    /// Debug-level scene-view tracing, captured by `cargo test`.
    pub fn for_tests() -> Self {
        Self {
            default_level: LevelFilter::Debug,
            write_style: env_logger::WriteStyle::Never,
            is_test: true,
            ..Self::default()
        }
    }

    fn filter(&self) -> Option<String> {
        self.env_filter.clone().or_else(|| std::env::var("RUST_LOG").ok())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_level: LevelFilter::Info,
            write_style: env_logger::WriteStyle::Auto,
            is_test: false,
        }
    }
}

static INIT: Once = Once::new();
static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Installs the global logger on first call; later calls change nothing.
///
/// Returns `true` once a logger from this module is in place. `false` means
/// another logger was installed first and keeps receiving the records.
pub fn init_logging(config: LoggingConfig) -> bool {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        match config.filter() {
            Some(filter) => builder.parse_filters(&filter),
            None => builder.filter_level(config.default_level),
        };
        builder.write_style(config.write_style).is_test(config.is_test);

        if builder.try_init().is_ok() {
            INSTALLED.store(true, Ordering::Release);
            log::debug!("logging initialized");
        }
    });
    INSTALLED.load(Ordering::Acquire)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_wins() {
        let config = LoggingConfig::with_filter("vantage_views=debug");
        assert_eq!(config.filter().as_deref(), Some("vantage_views=debug"));
    }

    #[test]
    fn test_preset_logs_debug() {
        let config = LoggingConfig::for_tests();
        assert!(config.is_test);
        assert_eq!(config.default_level, LevelFilter::Debug);
    }

    #[test]
    fn second_init_reports_the_same_outcome() {
        let first = init_logging(LoggingConfig::for_tests());
        let second = init_logging(LoggingConfig::with_filter("warn"));
        assert_eq!(first, second);
    }
}
