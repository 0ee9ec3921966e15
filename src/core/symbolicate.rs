// CrashMinder - core/symbolicate.rs
//
// Seam to the external symbolication tool.
//
// Symbolication (resolving binary addresses to symbol names and deciding
// blame) is not implemented here. This module defines the contract and a
// command-backed implementation that shells out to the configured tool and
// reads its JSON verdict from stdout.

use crate::core::report::CrashReport;
use crate::util::error::NotifyError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Result of a symbolication run.
#[derive(Debug, Clone, Deserialize)]
pub struct SymbolicationOutcome {
    /// Suspects in descending blame order; the first entry is the likely
    /// culprit. Empty when the analyzer found nothing to blame.
    #[serde(default)]
    pub suspects: Vec<String>,

    /// Path of the symbolicated report the tool wrote, if any.
    #[serde(default)]
    pub output: Option<PathBuf>,
}

impl SymbolicationOutcome {
    /// The top suspect, if the analyzer named one.
    pub fn top_suspect(&self) -> Option<&str> {
        self.suspects.first().map(String::as_str)
    }
}

/// The symbolication contract. The notifier depends on this trait, not on
/// any concrete tool, so the pipeline is testable without one installed.
pub trait Symbolicator {
    fn symbolicate(
        &self,
        report: &CrashReport,
        log_path: &Path,
    ) -> Result<SymbolicationOutcome, NotifyError>;
}

/// Symbolicator backed by an external command.
///
/// The command is invoked with the crash log path as its single argument and
/// must print a JSON object (`{"suspects": [...], "output": "..."}`) on
/// stdout. A non-zero exit is a failure.
#[derive(Debug, Clone)]
pub struct CommandSymbolicator {
    command: String,
}

impl CommandSymbolicator {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Symbolicator for CommandSymbolicator {
    fn symbolicate(
        &self,
        report: &CrashReport,
        log_path: &Path,
    ) -> Result<SymbolicationOutcome, NotifyError> {
        tracing::info!(
            command = %self.command,
            log = %log_path.display(),
            process = %report.process_name,
            "Invoking symbolicator"
        );

        let output = Command::new(&self.command)
            .arg(log_path)
            .output()
            .map_err(|source| NotifyError::SymbolicatorLaunch {
                command: self.command.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(NotifyError::SymbolicatorFailed {
                command: self.command.clone(),
                status: format!("{} ({})", output.status, stderr.trim()),
            });
        }

        let outcome: SymbolicationOutcome = serde_json::from_slice(&output.stdout)
            .map_err(|source| NotifyError::SymbolicatorOutput {
                command: self.command.clone(),
                source,
            })?;

        tracing::info!(
            suspects = outcome.suspects.len(),
            top = outcome.top_suspect().unwrap_or("<none>"),
            "Symbolication complete"
        );
        Ok(outcome)
    }
}

// =============================================================================
// Tests
// =============================================================================
