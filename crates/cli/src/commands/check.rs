use std::path::Path;

use pressquote_core::config::{AppConfig, LoadOptions};
use pressquote_core::{validate_snapshot, ApplicationError, DomainError};
use tracing::info;

use crate::commands::{input, CommandResult};

/// Runs strict validation regardless of the configured input policy.
/// Cards are checked as written, before any renumbering.
pub fn run(path: &Path) -> CommandResult {
    let correlation_id = path.display().to_string();
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            let error = ApplicationError::Configuration(error.to_string());
            return CommandResult::failure("check", error, &correlation_id);
        }
    };

    let snapshot = match input::load_snapshot_as_written(path, &config) {
        Ok(snapshot) => snapshot,
        Err(error) => {
            let error = ApplicationError::Input(format!("{error:#}"));
            return CommandResult::failure("check", error, &correlation_id);
        }
    };

    let result = validate_snapshot(&snapshot);
    info!(
        event_name = "cli.check.completed",
        correlation_id = %correlation_id,
        valid = result.valid,
        violation_count = result.violations.len(),
        "snapshot validation completed"
    );

    if result.valid {
        return CommandResult::success(
            "check",
            format!("snapshot is valid ({} process card(s))", snapshot.processes.len()),
        );
    }

    let error = ApplicationError::from(DomainError::InvalidInput(result.violations));
    CommandResult::failure("check", error, &correlation_id)
}
