// CrashMinder - main.rs
//
// Browser entry point. Handles:
// 1. CLI argument parsing
// 2. Logging initialisation (debug mode support)
// 3. Config loading and platform path resolution
// 4. Safe-mode (unclean shutdown) detection and marker setup
// 5. eframe GUI launch

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod gui;

// Re-export modules from the library crate so that `gui.rs` and other
// binary-side code can still use `crate::app::...`, `crate::core::...` etc.
pub use crashminder::app;
pub use crashminder::core;
pub use crashminder::platform;
pub use crashminder::ui;
pub use crashminder::util;

use clap::Parser;
use std::path::PathBuf;

/// CrashMinder - crash log browser.
///
/// Lists crash log groups from the mobile and root domains, with per-group
/// drill-down, viewing, and deletion. The companion `crash-notifier` binary
/// posts notifications as new crashes arrive.
#[derive(Parser, Debug)]
#[command(name = "CrashMinder", version, about)]
struct Cli {
    /// Override the mobile-domain crash log directory.
    #[arg(short = 'm', long = "mobile-dir")]
    mobile_dir: Option<PathBuf>,

    /// Override the root-domain crash log directory.
    #[arg(short = 'r', long = "root-dir")]
    root_dir: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    // Resolve platform paths and load config before logging init so the
    // configured log level can apply.
    let platform_paths = platform::config::PlatformPaths::resolve();
    let (config, config_warnings) = platform::config::load_config(&platform_paths.config_dir);

    util::logging::init(cli.debug, config.log_level.as_deref());

    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        "CrashMinder starting"
    );

    // CLI overrides win over config.toml.
    let mobile_dir = cli.mobile_dir.unwrap_or_else(|| config.mobile_dir.clone());
    let root_dir = cli.root_dir.unwrap_or_else(|| config.root_dir.clone());

    // Safe-mode detection: a marker left behind means the previous run
    // never reached its exit path.
    let marker = app::safe_mode::marker_path(&platform_paths.data_dir);
    let safe_mode_notice = app::safe_mode::previous_run_crashed(&marker);
    if safe_mode_notice {
        tracing::warn!("Previous run exited uncleanly");
    }
    app::safe_mode::write_marker(&marker);

    // Session and preferences.
    let session_path = app::session::session_path(&platform_paths.data_dir);
    let session = app::session::load(&session_path).unwrap_or_else(app::session::SessionData::new);
    let prefs_path = app::prefs::prefs_path(&platform_paths.config_dir);
    let prefs = app::prefs::load(&prefs_path);

    let cache = app::cache::GroupCache::new(mobile_dir, root_dir, config.discovery());

    let state = app::state::AppState::new(
        cache,
        session,
        session_path,
        prefs,
        prefs_path,
        marker.clone(),
        safe_mode_notice,
        cli.debug,
    );

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!(
                "{} v{}",
                util::constants::APP_NAME,
                util::constants::APP_VERSION
            ))
            .with_inner_size([900.0, 600.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    let result = eframe::run_native(
        util::constants::APP_NAME,
        native_options,
        Box::new(move |_cc| Ok(Box::new(gui::CrashMinderApp::new(state)))),
    );

    if let Err(e) = result {
        tracing::error!(error = %e, "Failed to launch GUI");
        eprintln!("Error: Failed to launch CrashMinder GUI: {e}");
        // The marker would otherwise report this failed launch as a crash.
        app::safe_mode::clear_marker(&marker);
        std::process::exit(1);
    }
}
