// Per-prompt outcome records and the batch summary. The classification
// of transport failures lives here too: it is the only branching logic
// with domain meaning in the whole pipeline, so it is kept as a pure
// function over `ApiFailure`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::api::ApiFailure;

/// Exact `details.reason` string the backend uses for filtered prompts.
pub const CONTENT_POLICY_REASON: &str = "Content policy violation";

/// Prompts are truncated to this many characters in outcome records so
/// the summary file stays readable for large prompts.
const PROMPT_PREVIEW_CHARS: usize = 100;

/// What happened to one prompt. Exactly one variant per prompt, never a
/// partial mix of success and error fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeKind {
    Success {
        output_file: String,
        #[serde(default)]
        metadata: Map<String, Value>,
    },
    Failure {
        error: String,
        status_code: u16,
    },
    ContentFiltered {
        error: String,
        severity: Option<String>,
    },
}

impl OutcomeKind {
    pub fn is_success(&self) -> bool {
        matches!(self, OutcomeKind::Success { .. })
    }

    /// Content-filtered is a refinement of failure, not a third
    /// top-level category: `is_failed` is true for it as well.
    pub fn is_failed(&self) -> bool {
        !self.is_success()
    }

    pub fn is_content_filtered(&self) -> bool {
        matches!(self, OutcomeKind::ContentFiltered { .. })
    }
}

/// One prompt's outcome, tagged with its zero-based position in the
/// input sequence and the wall time the request took.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptOutcome {
    pub index: usize,
    pub prompt: String,
    pub processing_time: f64,
    #[serde(flatten)]
    pub kind: OutcomeKind,
}

/// Aggregate over a finished batch, persisted as `batch_summary.json`.
/// Built once after all outcomes are collected and ordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub input_file: String,
    pub total_prompts: usize,
    pub successful: usize,
    pub failed: usize,
    pub content_filtered: usize,
    pub output_directory: String,
    pub processing_time: f64,
    pub results: Vec<PromptOutcome>,
}

impl BatchSummary {
    /// Derive the aggregate counts from an ordered outcome list. Counts
    /// always reconcile with the list: successful + failed == total and
    /// content_filtered <= failed.
    pub fn from_outcomes(
        input_file: String,
        output_directory: String,
        outcomes: Vec<PromptOutcome>,
    ) -> Self {
        let successful = outcomes.iter().filter(|o| o.kind.is_success()).count();
        let content_filtered = outcomes
            .iter()
            .filter(|o| o.kind.is_content_filtered())
            .count();
        let processing_time = outcomes.iter().map(|o| o.processing_time).sum();
        BatchSummary {
            input_file,
            total_prompts: outcomes.len(),
            successful,
            failed: outcomes.len() - successful,
            content_filtered,
            output_directory,
            processing_time,
            results: outcomes,
        }
    }
}

/// Classify one transport failure. A 400 whose structured reason is the
/// content-policy marker becomes `ContentFiltered`; everything else is a
/// generic `Failure` carrying the status surrogate and message.
pub fn classify_failure(failure: &ApiFailure) -> OutcomeKind {
    if let ApiFailure::Api {
        status: 400,
        details: Some(details),
        ..
    } = failure
    {
        if details.reason.as_deref() == Some(CONTENT_POLICY_REASON) {
            return OutcomeKind::ContentFiltered {
                error: failure.to_string(),
                severity: details.severity.clone(),
            };
        }
    }
    OutcomeKind::Failure {
        error: failure.to_string(),
        status_code: failure.status_code(),
    }
}

/// Shorten a prompt for the outcome record.
pub fn prompt_preview(prompt: &str) -> String {
    if prompt.chars().count() > PROMPT_PREVIEW_CHARS {
        let cut: String = prompt.chars().take(PROMPT_PREVIEW_CHARS).collect();
        format!("{cut}...")
    } else {
        prompt.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ErrorDetails;

    fn policy_violation(severity: Option<&str>) -> ApiFailure {
        ApiFailure::Api {
            status: 400,
            error: "Content rejected".to_string(),
            message: Some("Please rephrase".to_string()),
            details: Some(ErrorDetails {
                reason: Some(CONTENT_POLICY_REASON.to_string()),
                severity: severity.map(str::to_string),
            }),
        }
    }

    #[test]
    fn policy_violation_classifies_as_content_filtered() {
        let kind = classify_failure(&policy_violation(Some("HIGH")));
        match kind {
            OutcomeKind::ContentFiltered { severity, .. } => {
                assert_eq!(severity.as_deref(), Some("HIGH"));
            }
            other => panic!("expected ContentFiltered, got {other:?}"),
        }
    }

    #[test]
    fn bad_request_without_policy_reason_is_generic_failure() {
        let failure = ApiFailure::Api {
            status: 400,
            error: "Missing prompt".to_string(),
            message: None,
            details: Some(ErrorDetails {
                reason: Some("Validation error".to_string()),
                severity: None,
            }),
        };
        let kind = classify_failure(&failure);
        assert!(matches!(
            kind,
            OutcomeKind::Failure {
                status_code: 400,
                ..
            }
        ));
    }

    #[test]
    fn policy_reason_on_other_status_is_generic_failure() {
        let failure = ApiFailure::Api {
            status: 500,
            error: "oops".to_string(),
            message: None,
            details: Some(ErrorDetails {
                reason: Some(CONTENT_POLICY_REASON.to_string()),
                severity: Some("LOW".to_string()),
            }),
        };
        assert!(matches!(
            classify_failure(&failure),
            OutcomeKind::Failure { .. }
        ));
    }

    #[test]
    fn timeout_keeps_its_surrogate_status() {
        let kind = classify_failure(&ApiFailure::Timeout);
        match kind {
            OutcomeKind::Failure { error, status_code } => {
                assert_eq!(status_code, 408);
                assert!(error.contains("timeout"));
            }
            other => panic!("expected Failure, got {other:?}"),
        }
    }

    #[test]
    fn summary_counts_reconcile() {
        let outcomes = vec![
            PromptOutcome {
                index: 0,
                prompt: "a".to_string(),
                processing_time: 0.5,
                kind: OutcomeKind::Success {
                    output_file: "result_0001.txt".to_string(),
                    metadata: Map::new(),
                },
            },
            PromptOutcome {
                index: 1,
                prompt: "b".to_string(),
                processing_time: 0.25,
                kind: OutcomeKind::ContentFiltered {
                    error: "Content rejected".to_string(),
                    severity: Some("HIGH".to_string()),
                },
            },
            PromptOutcome {
                index: 2,
                prompt: "c".to_string(),
                processing_time: 0.25,
                kind: OutcomeKind::Failure {
                    error: "boom".to_string(),
                    status_code: 500,
                },
            },
        ];
        let summary =
            BatchSummary::from_outcomes("in.txt".to_string(), "out".to_string(), outcomes);
        assert_eq!(summary.total_prompts, 3);
        assert_eq!(summary.successful + summary.failed, summary.total_prompts);
        assert_eq!(summary.successful, 1);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.content_filtered, 1);
        assert!(summary.content_filtered <= summary.failed);
        assert!((summary.processing_time - 1.0).abs() < 1e-9);
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let outcome = PromptOutcome {
            index: 4,
            prompt: "write a haiku".to_string(),
            processing_time: 1.25,
            kind: OutcomeKind::ContentFiltered {
                error: "Content rejected".to_string(),
                severity: Some("MEDIUM".to_string()),
            },
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "content_filtered");
        assert_eq!(json["index"], 4);
        assert_eq!(json["severity"], "MEDIUM");

        let back: PromptOutcome = serde_json::from_value(json).unwrap();
        assert_eq!(back, outcome);
    }

    #[test]
    fn long_prompts_are_truncated_in_records() {
        let long = "x".repeat(250);
        let preview = prompt_preview(&long);
        assert_eq!(preview.chars().count(), 103);
        assert!(preview.ends_with("..."));
        assert_eq!(prompt_preview("short"), "short");
    }
}
