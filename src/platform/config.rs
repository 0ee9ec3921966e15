// CrashMinder - platform/config.rs
//
// Platform directory resolution and config.toml loading with startup
// validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for CrashMinder data and configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (config.toml, preferences.json).
    pub config_dir: PathBuf,

    /// Data directory (session.json, running marker).
    pub data_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to the current directory if platform dirs cannot be
    /// determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            let data_dir = proj_dirs.data_dir().to_path_buf();

            tracing::debug!(
                config = %config_dir.display(),
                data = %data_dir.display(),
                "Platform paths resolved"
            );

            Self {
                config_dir,
                data_dir,
            }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            let fallback = PathBuf::from(".");
            Self {
                config_dir: fallback.clone(),
                data_dir: fallback,
            }
        }
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility -- a newer
/// config file can be used with an older binary without crashing.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[discovery]` section.
    pub discovery: DiscoverySection,
    /// `[notifier]` section.
    pub notifier: NotifierSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[discovery]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct DiscoverySection {
    /// Mobile-domain crash log directory.
    pub mobile_dir: Option<String>,
    /// Root-domain crash log directory.
    pub root_dir: Option<String>,
    /// Maximum directory recursion depth.
    pub max_depth: Option<usize>,
    /// Maximum crash logs to ingest per domain.
    pub max_files: Option<usize>,
}

/// `[notifier]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct NotifierSection {
    /// External symbolicator command.
    pub symbolicator_command: Option<String>,
    /// Recent journal lines scanned for system-log capture.
    pub syslog_line_budget: Option<usize>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// All values are validated against named constants at load time. Invalid
/// values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // -- Discovery --
    /// Mobile-domain crash log directory.
    pub mobile_dir: PathBuf,
    /// Root-domain crash log directory.
    pub root_dir: PathBuf,
    /// Maximum directory recursion depth.
    pub max_depth: usize,
    /// Maximum crash logs to ingest per domain.
    pub max_files: usize,

    // -- Notifier --
    /// External symbolicator command.
    pub symbolicator_command: String,
    /// Recent journal lines scanned for system-log capture.
    pub syslog_line_budget: usize,

    // -- Logging --
    /// Logging level string (consumed before tracing is initialised).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mobile_dir: PathBuf::from(constants::DEFAULT_MOBILE_CRASH_DIR),
            root_dir: PathBuf::from(constants::DEFAULT_ROOT_CRASH_DIR),
            max_depth: constants::DEFAULT_MAX_DEPTH,
            max_files: constants::DEFAULT_MAX_FILES,
            symbolicator_command: constants::DEFAULT_SYMBOLICATOR_COMMAND.to_string(),
            syslog_line_budget: constants::DEFAULT_SYSLOG_LINE_BUDGET,
            log_level: None,
        }
    }
}

impl AppConfig {
    /// Discovery configuration derived from the validated values.
    pub fn discovery(&self) -> crate::core::discovery::DiscoveryConfig {
        crate::core::discovery::DiscoveryConfig {
            max_depth: self.max_depth,
            max_files: self.max_files,
            ..Default::default()
        }
    }
}

/// Load and validate `config.toml` from the given config directory.
///
/// Returns `AppConfig` with validated values and a list of non-fatal
/// warnings. If the file does not exist, returns defaults with no warnings
/// (first-run). If the file is unparseable, returns defaults with an error
/// warning -- the application still starts but the user is informed.
pub fn load_config(config_dir: &Path) -> (AppConfig, Vec<String>) {
    let config_path = config_dir.join(constants::CONFIG_FILE_NAME);

    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(&config_path) {
        Ok(c) => c,
        Err(e) => {
            let msg = format!(
                "Could not read config file '{}': {e}. Using defaults.",
                config_path.display()
            );
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(e) => {
            let msg = format!(
                "Failed to parse config file '{}': {e}. Using defaults.",
                config_path.display()
            );
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    tracing::info!(path = %config_path.display(), "Loaded config.toml");

    // Validate each field against named constants, accumulating all warnings.
    let mut config = AppConfig::default();

    if let Some(ref dir) = raw.discovery.mobile_dir {
        if dir.is_empty() {
            warnings.push("[discovery] mobile_dir is empty. Using default.".to_string());
        } else {
            config.mobile_dir = PathBuf::from(dir);
        }
    }

    if let Some(ref dir) = raw.discovery.root_dir {
        if dir.is_empty() {
            warnings.push("[discovery] root_dir is empty. Using default.".to_string());
        } else {
            config.root_dir = PathBuf::from(dir);
        }
    }

    if let Some(depth) = raw.discovery.max_depth {
        if (1..=constants::ABSOLUTE_MAX_DEPTH).contains(&depth) {
            config.max_depth = depth;
        } else {
            warnings.push(format!(
                "[discovery] max_depth = {depth} is out of range (1-{}). Using default ({}).",
                constants::ABSOLUTE_MAX_DEPTH,
                constants::DEFAULT_MAX_DEPTH,
            ));
        }
    }

    if let Some(files) = raw.discovery.max_files {
        if (1..=constants::ABSOLUTE_MAX_FILES).contains(&files) {
            config.max_files = files;
        } else {
            warnings.push(format!(
                "[discovery] max_files = {files} is out of range (1-{}). Using default ({}).",
                constants::ABSOLUTE_MAX_FILES,
                constants::DEFAULT_MAX_FILES,
            ));
        }
    }

    if let Some(ref command) = raw.notifier.symbolicator_command {
        if command.is_empty() {
            warnings.push("[notifier] symbolicator_command is empty. Using default.".to_string());
        } else {
            config.symbolicator_command = command.clone();
        }
    }

    if let Some(budget) = raw.notifier.syslog_line_budget {
        if (constants::MIN_SYSLOG_LINE_BUDGET..=constants::MAX_SYSLOG_LINE_BUDGET)
            .contains(&budget)
        {
            config.syslog_line_budget = budget;
        } else {
            warnings.push(format!(
                "[notifier] syslog_line_budget = {budget} is out of range ({}-{}). Using default ({}).",
                constants::MIN_SYSLOG_LINE_BUDGET,
                constants::MAX_SYSLOG_LINE_BUDGET,
                constants::DEFAULT_SYSLOG_LINE_BUDGET,
            ));
        }
    }

    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.clone());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    if !warnings.is_empty() {
        tracing::warn!(count = warnings.len(), "Config validation produced warnings");
    }

    (config, warnings)
}

// =============================================================================
// Tests
// =============================================================================
