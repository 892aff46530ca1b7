// One handler module per command group. Handlers report expected API
// failures on stderr and return Ok so the process keeps a clean exit;
// only setup problems (unreadable input, bad config values) propagate
// as errors.

pub mod batch;
pub mod config;
pub mod generate;
pub mod status;
pub mod usage;

use crate::api::ApiFailure;
use crate::outcome::{classify_failure, OutcomeKind};

/// Print one request failure, giving content-policy violations their
/// own shape (severity + backend message).
pub(crate) fn report_failure(failure: &ApiFailure) {
    match classify_failure(failure) {
        OutcomeKind::ContentFiltered { severity, .. } => {
            eprintln!("Content Policy Violation");
            eprintln!("Severity: {}", severity.as_deref().unwrap_or("Unknown"));
            if let ApiFailure::Api {
                message: Some(message),
                ..
            } = failure
            {
                eprintln!("Message: {message}");
            } else {
                eprintln!("Message: No additional details");
            }
        }
        _ => {
            eprintln!("Error: {failure}");
            if let ApiFailure::Api {
                message: Some(message),
                ..
            } = failure
            {
                eprintln!("{message}");
            }
        }
    }
}
