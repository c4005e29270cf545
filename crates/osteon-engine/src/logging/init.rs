use std::sync::Once;

use log::LevelFilter;

/// Logger setup for hosts that do not bring their own.
///
/// `env_filter` uses the `env_logger` syntax (e.g. "osteon_engine=debug,wgpu=warn") and
/// wins over `RUST_LOG`. Without either, `default_level` applies and the wgpu internals
/// are held at warn.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub default_level: LevelFilter,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_level: LevelFilter::Info,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }
}

const NOISY_MODULES: [&str; 3] = ["wgpu_core", "wgpu_hal", "naga"];

static INIT: Once = Once::new();

/// Installs the global logger once; later calls are no-ops.
///
/// A logger installed elsewhere is left in place.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        match config.env_filter.or_else(|| std::env::var("RUST_LOG").ok()) {
            Some(filter) => {
                builder.parse_filters(&filter);
            }
            None => {
                builder.filter_level(config.default_level);
                for module in NOISY_MODULES {
                    builder.filter_module(module, LevelFilter::Warn);
                }
            }
        }
        builder.write_style(config.write_style);

        if builder.try_init().is_ok() {
            log::debug!("logging initialized");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_is_kept() {
        let cfg = LoggingConfig::default().with_filter("osteon_engine=trace");
        assert_eq!(cfg.env_filter.as_deref(), Some("osteon_engine=trace"));
        assert_eq!(cfg.default_level, LevelFilter::Info);
    }

    #[test]
    fn repeated_init_is_harmless() {
        init_logging(LoggingConfig::default());
        init_logging(LoggingConfig::default().with_filter("off"));
    }
}
