// CrashMinder - notifier.rs
//
// crash-notifier entry point: announce a freshly-written crash log as a
// local notification naming the likely culprit.
//
// Invoked by the crash reporter's hook with the crash log path as its one
// argument. The heavy lifting lives in crashminder::app::notify so the
// pipeline is testable; this binary maps outcomes to exit codes:
//
//   0  notification posted, suppressed by preference, or skipped because
//      this host has no notification transport
//   1  load/parse failure, stale or already-symbolicated report,
//      symbolication failure, readiness timeout, dispatch failure

use clap::Parser;
use crashminder::app::notify::{self, NotifyOutcome};
use crashminder::app::prefs;
use crashminder::core::symbolicate::CommandSymbolicator;
use crashminder::platform::config::{load_config, PlatformPaths};
use crashminder::util;
use std::path::PathBuf;
use std::process::ExitCode;

/// crash-notifier - announce a new crash log via local notification.
#[derive(Parser, Debug)]
#[command(name = "crash-notifier", version, about)]
struct Cli {
    /// Crash log file to announce.
    log_path: PathBuf,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let platform_paths = PlatformPaths::resolve();
    let (config, config_warnings) = load_config(&platform_paths.config_dir);

    util::logging::init(cli.debug, config.log_level.as_deref());
    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    tracing::info!(
        version = util::constants::APP_VERSION,
        log = %cli.log_path.display(),
        "crash-notifier starting"
    );

    let prefs = prefs::load(&prefs::prefs_path(&platform_paths.config_dir));
    let symbolicator = CommandSymbolicator::new(config.symbolicator_command.clone());
    let sink = notify::NotifySendSink;

    match notify::run_pipeline(
        &cli.log_path,
        &prefs,
        &symbolicator,
        &sink,
        config.syslog_line_budget,
        std::thread::sleep,
    ) {
        Ok(NotifyOutcome::Posted(note)) => {
            tracing::info!(title = %note.title, "Done");
            ExitCode::SUCCESS
        }
        Ok(NotifyOutcome::Suppressed(class)) => {
            tracing::info!(class, "Notification suppressed by preference");
            ExitCode::SUCCESS
        }
        Ok(NotifyOutcome::SkippedNoTransport) => {
            tracing::info!("No notification transport on this host; nothing to do");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("crash-notifier: {e}");
            ExitCode::FAILURE
        }
    }
}
