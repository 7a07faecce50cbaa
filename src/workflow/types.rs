//! Request, result and attempt records for one workflow run

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::FailureClassification;
use crate::schema::StructuralSchema;

/// Default per-attempt time limit
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Default number of retries after the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 2;

// ─────────────────────────────────────────────────────────────────
// Workflow Request
// ─────────────────────────────────────────────────────────────────

/// One call's worth of work: which workflow, what input, which shape.
#[derive(Debug, Clone)]
pub struct WorkflowRequest<T> {
    pub workflow_id: String,
    pub input: String,
    pub schema: Arc<StructuralSchema<T>>,
    pub timeout_ms: u64,
    pub max_retries: u32,
}

impl<T> WorkflowRequest<T> {
    pub fn new(
        workflow_id: impl Into<String>,
        input: impl Into<String>,
        schema: Arc<StructuralSchema<T>>,
    ) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            input: input.into(),
            schema,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Upper bound on attempts this request may consume
    pub fn attempt_budget(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

// ─────────────────────────────────────────────────────────────────
// Workflow Result
// ─────────────────────────────────────────────────────────────────

/// A validated model response.
///
/// `raw` is the canonical serialization of `parsed`, so re-validating it
/// against the same schema yields an equal value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowResult<T> {
    pub parsed: T,
    pub raw: String,
    pub attempts: u32,
}

// ─────────────────────────────────────────────────────────────────
// Attempt Records
// ─────────────────────────────────────────────────────────────────

/// How one attempt ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    Failure {
        kind: FailureClassification,
        message: String,
    },
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptOutcome::Success => f.write_str("success"),
            AttemptOutcome::Failure { kind, .. } => write!(f, "{}", kind),
        }
    }
}

/// Diagnostic record of a single attempt. Logged, never returned.
#[derive(Debug, Clone)]
pub struct InvocationAttempt {
    /// Zero-based: the first attempt is 0, the last at most `max_retries`
    pub attempt_number: u32,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub outcome: AttemptOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DocumentContract;

    #[test]
    fn test_request_defaults() {
        let schema = Arc::new(StructuralSchema::<DocumentContract>::compile().unwrap());
        let request = WorkflowRequest::new("doc-manager", "Draft a policy", schema);

        assert_eq!(request.timeout_ms, 30_000);
        assert_eq!(request.max_retries, 2);
        assert_eq!(request.attempt_budget(), 3);
    }

    #[test]
    fn test_request_builders() {
        let schema = Arc::new(StructuralSchema::<DocumentContract>::compile().unwrap());
        let request = WorkflowRequest::new("doc-manager", "x", schema)
            .with_timeout_ms(5_000)
            .with_max_retries(0);

        assert_eq!(request.timeout_ms, 5_000);
        assert_eq!(request.attempt_budget(), 1);
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(AttemptOutcome::Success.to_string(), "success");
        let failure = AttemptOutcome::Failure {
            kind: FailureClassification::Timeout,
            message: "slow".to_string(),
        };
        assert_eq!(failure.to_string(), "timeout");
    }
}
