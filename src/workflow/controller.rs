//! Retry controller
//!
//! Drives a workflow request through bounded attempts. Each attempt is one
//! invoker call raced against the request's time limit. Retryable failures
//! back off exponentially before the next attempt; everything else ends the
//! run immediately. Callers only ever see the final outcome.

use std::sync::Arc;
use std::time::Duration;

use backoff::{backoff::Backoff, ExponentialBackoff};
use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::RetrySettings;
use crate::error::{Error, Result};
use crate::persona::PersonaRegistry;
use crate::schema::SchemaContract;

use super::invoker::AgentInvoker;
use super::timeout::race_with_timeout;
use super::types::{AttemptOutcome, InvocationAttempt, WorkflowRequest, WorkflowResult};

// ─────────────────────────────────────────────────────────────────
// Retry Policy
// ─────────────────────────────────────────────────────────────────

/// Backoff schedule between attempts: `base_delay * 2^n`, capped at `max_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn new(base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            base_delay,
            max_delay,
        }
    }

    pub fn from_settings(settings: &RetrySettings) -> Self {
        Self::new(
            Duration::from_millis(settings.base_delay_ms),
            Duration::from_millis(settings.max_delay_ms),
        )
    }

    /// A fresh, deterministic backoff for one run
    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            current_interval: self.base_delay,
            initial_interval: self.base_delay,
            randomization_factor: 0.0,
            multiplier: 2.0,
            max_interval: self.max_delay,
            max_elapsed_time: None,
            ..Default::default()
        }
    }

    /// The first `count` delays this policy produces
    pub fn delays(&self, count: usize) -> Vec<Duration> {
        let mut backoff = self.backoff();
        (0..count)
            .map(|_| backoff.next_backoff().unwrap_or(self.max_delay))
            .collect()
    }
}

// ─────────────────────────────────────────────────────────────────
// Workflow Controller
// ─────────────────────────────────────────────────────────────────

/// Runs workflow requests against a persona registry and an invoker
#[derive(Debug, Clone)]
pub struct WorkflowController {
    personas: Arc<PersonaRegistry>,
    invoker: AgentInvoker,
    policy: RetryPolicy,
}

impl WorkflowController {
    pub fn new(personas: Arc<PersonaRegistry>, invoker: AgentInvoker, policy: RetryPolicy) -> Self {
        Self {
            personas,
            invoker,
            policy,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run a request to completion
    pub async fn run<T: SchemaContract>(&self, request: WorkflowRequest<T>) -> Result<WorkflowResult<T>> {
        self.run_with_cancel(request, &CancellationToken::new()).await
    }

    /// Run a request, ending early with `Error::Cancelled` if `cancel` fires
    /// during an attempt or a backoff wait.
    pub async fn run_with_cancel<T: SchemaContract>(
        &self,
        request: WorkflowRequest<T>,
        cancel: &CancellationToken,
    ) -> Result<WorkflowResult<T>> {
        let run_id = Uuid::new_v4();
        let persona = self.personas.resolve(&request.workflow_id);
        let budget = request.attempt_budget();
        let mut backoff = self.policy.backoff();

        info!(
            run_id = %run_id,
            workflow_id = %request.workflow_id,
            persona = %persona,
            schema = request.schema.name(),
            timeout_ms = request.timeout_ms,
            max_retries = request.max_retries,
            "Starting workflow run"
        );

        let mut attempts: u32 = 0;
        loop {
            let attempt_number = attempts;
            attempts += 1;
            let started_at = Utc::now();
            let clock = tokio::time::Instant::now();

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(Error::Cancelled),
                result = race_with_timeout(
                    self.invoker.invoke(persona, &request.schema, &request.input),
                    request.timeout_ms,
                ) => result,
            };

            let attempt = InvocationAttempt {
                attempt_number,
                started_at,
                elapsed: clock.elapsed(),
                outcome: match &result {
                    Ok(_) => AttemptOutcome::Success,
                    Err(e) => AttemptOutcome::Failure {
                        kind: e.classification(),
                        message: e.to_string(),
                    },
                },
            };
            record_attempt(&run_id, &request.workflow_id, &attempt);

            let err = match result {
                Ok(invocation) => {
                    info!(
                        run_id = %run_id,
                        workflow_id = %request.workflow_id,
                        attempts,
                        "Workflow run succeeded"
                    );
                    return Ok(WorkflowResult {
                        parsed: invocation.parsed,
                        raw: invocation.raw,
                        attempts,
                    });
                }
                Err(e) => e,
            };

            if !err.is_retryable() || attempts >= budget {
                warn!(
                    run_id = %run_id,
                    workflow_id = %request.workflow_id,
                    attempts,
                    classification = %err.classification(),
                    error = %err.format_for_log(),
                    "Workflow run failed"
                );
                return Err(err);
            }

            let delay = backoff.next_backoff().unwrap_or(self.policy.max_delay);
            warn!(
                run_id = %run_id,
                workflow_id = %request.workflow_id,
                attempt = attempt_number,
                classification = %err.classification(),
                delay_ms = delay.as_millis() as u64,
                "Attempt failed, retrying"
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!(run_id = %run_id, "Workflow run cancelled during backoff");
                    return Err(Error::Cancelled);
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}

fn record_attempt(run_id: &Uuid, workflow_id: &str, attempt: &InvocationAttempt) {
    match &attempt.outcome {
        AttemptOutcome::Success => debug!(
            run_id = %run_id,
            workflow_id,
            attempt = attempt.attempt_number,
            started_at = %attempt.started_at.to_rfc3339(),
            elapsed_ms = attempt.elapsed.as_millis() as u64,
            "Attempt succeeded"
        ),
        AttemptOutcome::Failure { kind, message } => debug!(
            run_id = %run_id,
            workflow_id,
            attempt = attempt.attempt_number,
            started_at = %attempt.started_at.to_rfc3339(),
            elapsed_ms = attempt.elapsed.as_millis() as u64,
            classification = %kind,
            message = %message,
            "Attempt failed"
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use parking_lot::Mutex;

    use super::*;
    use crate::backend::{MockBackend, MockResponse};
    use crate::schema::{DocumentContract, StructuralSchema};
    use crate::workflow::InvokerSettings;

    /// Log sink shared between the subscriber and the test
    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLog {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.base_delay, Duration::from_millis(500));
        assert_eq!(policy.max_delay, Duration::from_secs(30));
    }

    #[test]
    fn test_delays_double() {
        let delays: Vec<u128> = RetryPolicy::default()
            .delays(4)
            .iter()
            .map(|d| d.as_millis())
            .collect();
        assert_eq!(delays, vec![500, 1000, 2000, 4000]);
    }

    #[test]
    fn test_delays_are_capped() {
        let policy = RetryPolicy::new(Duration::from_secs(1), Duration::from_secs(3));
        let delays: Vec<u128> = policy.delays(4).iter().map(|d| d.as_millis()).collect();
        assert_eq!(delays, vec![1000, 2000, 3000, 3000]);
    }

    #[test]
    fn test_from_settings() {
        let settings = RetrySettings {
            base_delay_ms: 100,
            max_delay_ms: 800,
            ..Default::default()
        };
        let policy = RetryPolicy::from_settings(&settings);
        assert_eq!(policy.base_delay, Duration::from_millis(100));
        assert_eq!(policy.max_delay, Duration::from_millis(800));
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempts_are_numbered_from_zero() {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let backend = Arc::new(MockBackend::with_default(MockResponse::Transient(
            "503 overloaded".to_string(),
        )));
        let invoker = AgentInvoker::new(
            backend.clone(),
            InvokerSettings::new(Some("test-key".to_string()), "test-model"),
        );
        let controller = WorkflowController::new(
            Arc::new(PersonaRegistry::builtin()),
            invoker,
            RetryPolicy::default(),
        );
        let schema = Arc::new(StructuralSchema::<DocumentContract>::compile().unwrap());
        let request = crate::workflow::WorkflowRequest::new("doc-manager", "x", schema)
            .with_max_retries(2);

        controller.run(request).await.unwrap_err();
        assert_eq!(backend.call_count(), 3);

        let output = log.contents();
        assert!(output.contains("attempt=0"), "{}", output);
        assert!(output.contains("attempt=2"), "{}", output);
        assert!(!output.contains("attempt=3"), "{}", output);
        assert!(output.contains("attempts=3"), "{}", output);
    }
}
