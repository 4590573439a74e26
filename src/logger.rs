/// Logging setup.
///
/// The crate logs through the `log` facade. In the browser records go to the
/// devtools console; native builds (tests, tools) print to stdout.

pub use log::LevelFilter;

/// Logger configuration object.
#[derive(Clone, Copy, Debug)]
pub struct LoggerConfig {
    /// Sets the overarching level filter for the logger.
    pub level_filter: LevelFilter,
}

impl Default for LoggerConfig {
    fn default() -> LoggerConfig {
        let level_filter = if cfg!(debug_assertions) {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        };
        LoggerConfig { level_filter }
    }
}

/// Install the global logger. Does nothing if a logger is already set.
#[cfg(target_arch = "wasm32")]
pub fn start_logger(config: LoggerConfig) {
    let Some(level) = config.level_filter.to_level() else {
        return;
    };
    if console_log::init_with_level(level).is_err() {
        web_sys::console::warn_1(&"global logger already set".into());
    }
}

/// Install the global logger. Does nothing if a logger is already set.
#[cfg(not(target_arch = "wasm32"))]
pub fn start_logger(config: LoggerConfig) {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("[{}][{}] {}", record.level(), record.target(), message))
        })
        .level(config.level_filter)
        .chain(std::io::stdout())
        .apply()
        .unwrap_or_else(|_| log::debug!("global logger already set, relight logger not installed"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_logger_twice_is_harmless() {
        start_logger(LoggerConfig::default());
        start_logger(LoggerConfig { level_filter: LevelFilter::Warn });
        log::info!("logger test");
    }
}
