use log::LevelFilter;
use simplelog::*;
use std::fs::File;
use std::path::PathBuf;

/// Logging configuration for the tagview client
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Master switch to enable/disable all logging
    pub enabled: bool,
    /// Path to the log file
    pub log_file: PathBuf,
    /// Whether to clear the log file on startup
    pub clear_on_startup: bool,
    /// Feature flags for specific logging categories
    pub features: LogFeatures,
    /// Overall log level
    pub level: LevelFilter,
}

/// Feature flags for specific logging categories
#[derive(Debug, Clone)]
pub struct LogFeatures {
    /// Window inserts, trims and anchor saves
    pub window: bool,
    /// Page loads and the loading latch
    pub loader: bool,
    /// Favorite requests
    pub favorites: bool,
    /// Fullscreen navigation steps
    pub navigation: bool,
    /// HTTP requests to the board
    pub api_calls: bool,
    /// Settings and config file changes
    pub settings: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_file: PathBuf::from("tagview_debug.log"),
            clear_on_startup: true,
            features: LogFeatures::default(),
            level: LevelFilter::Debug,
        }
    }
}

impl Default for LogFeatures {
    fn default() -> Self {
        Self::all(true)
    }
}

impl LogFeatures {
    fn all(on: bool) -> Self {
        Self {
            window: on,
            loader: on,
            favorites: on,
            navigation: on,
            api_calls: on,
            settings: on,
        }
    }

    /// Log targets (module paths) of the categories switched off
    pub fn disabled_targets(&self) -> Vec<&'static str> {
        [
            (self.window, "tagview::window"),
            (self.window, "tagview::anchor"),
            (self.loader, "tagview::loader"),
            (self.favorites, "tagview::favorites"),
            (self.navigation, "tagview::navigator"),
            (self.api_calls, "tagview::api"),
            (self.settings, "tagview::config"),
        ]
        .into_iter()
        .filter(|(on, _)| !on)
        .map(|(_, target)| target)
        .collect()
    }
}

impl LogConfig {
    /// Create a new log configuration with all features disabled
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Create a minimal log configuration (only errors and warnings)
    pub fn minimal() -> Self {
        Self {
            enabled: true,
            level: LevelFilter::Warn,
            features: LogFeatures::all(false),
            ..Default::default()
        }
    }

    /// Create a verbose log configuration (all features enabled)
    pub fn verbose() -> Self {
        Self {
            enabled: true,
            level: LevelFilter::Trace,
            features: LogFeatures::all(true),
            ..Default::default()
        }
    }
}

/// Initialize the logging system with the given configuration
pub fn init_logging(config: &LogConfig) -> anyhow::Result<()> {
    if !config.enabled {
        // Initialize with no-op logger
        let _ = WriteLogger::init(LevelFilter::Off, Config::default(), std::io::sink());
        return Ok(());
    }

    // Clear log file if requested
    if config.clear_on_startup {
        let _ = File::create(&config.log_file)?;
    }

    // Open log file
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)?;

    // Configure log format and silence disabled categories
    let mut builder = ConfigBuilder::new();
    builder.set_time_format_rfc3339();
    for target in config.features.disabled_targets() {
        builder.add_filter_ignore_str(target);
    }
    let log_config = builder
        .set_time_offset_to_local()
        .unwrap_or_else(|builder| builder)
        .build();

    // Initialize logger
    WriteLogger::init(config.level, log_config, log_file)?;

    log::info!(
        "Logging initialized: file={}, level={:?}",
        config.log_file.display(),
        config.level
    );
    log::debug!("Log features: {:?}", config.features);

    Ok(())
}
