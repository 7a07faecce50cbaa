//! Workflow execution tests
//!
//! Drives the controller end to end against the scripted mock backend.
//! Timing tests run on a paused tokio clock, so sleeps and deadlines
//! advance instantly and deterministically.

mod common;

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use ai_workflow::backend::{MockBackend, MockResponse};
use ai_workflow::error::{Error, FailureClassification};
use ai_workflow::persona::{Persona, PersonaRegistry, DOC_MANAGER};
use ai_workflow::schema::{DocumentStatus, DocumentType};
use ai_workflow::workflow::WorkflowRequest;

use common::{controller, controller_with, document_response, document_schema};

fn doc_request() -> WorkflowRequest<ai_workflow::schema::DocumentContract> {
    WorkflowRequest::new(DOC_MANAGER, "Draft a glass handling work instruction", document_schema())
}

fn gaps(times: &[Instant]) -> Vec<Duration> {
    times.windows(2).map(|w| w[1] - w[0]).collect()
}

// ─────────────────────────────────────────────────────────────────
// Persona Resolution
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_every_workflow_id_resolves() {
    let registry = PersonaRegistry::builtin();
    for id in ["doc-manager", "audit", "knowledge", "community", "", "unknown", "DOC-MANAGER"] {
        assert!(!registry.resolve(id).display_name.is_empty(), "no persona for '{}'", id);
    }
    assert_eq!(registry.resolve("unknown"), registry.fallback());
    assert_ne!(registry.resolve(DOC_MANAGER), registry.fallback());
}

#[tokio::test]
async fn test_run_presents_resolved_persona() {
    let backend = Arc::new(MockBackend::with_default(MockResponse::content(document_response())));
    let personas = PersonaRegistry::new(Persona::new("Office Helper", "Help."))
        .with_binding("crm-followup", Persona::new("Customer Liaison", "Follow up."));
    let controller = controller_with(backend.clone(), Some("key"), personas);

    let bound = WorkflowRequest::new("crm-followup", "x", document_schema());
    controller.run(bound).await.unwrap();
    let unbound = WorkflowRequest::new("payroll", "x", document_schema());
    controller.run(unbound).await.unwrap();

    let requests = backend.requests();
    assert_eq!(requests[0].persona.display_name, "Customer Liaison");
    assert_eq!(requests[1].persona.display_name, "Office Helper");
}

// ─────────────────────────────────────────────────────────────────
// Success Path
// ─────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_doc_manager_recovers_from_one_timeout() {
    let backend = Arc::new(
        MockBackend::with_default(MockResponse::content(document_response()))
            .push(MockResponse::Hang),
    );
    let controller = controller(backend.clone());

    let request = doc_request().with_timeout_ms(5_000).with_max_retries(1);
    let result = controller.run(request).await.unwrap();

    assert_eq!(result.attempts, 2);
    assert_eq!(backend.call_count(), 2);
    assert_eq!(result.parsed.metadata.status, DocumentStatus::Draft);
    assert_eq!(result.parsed.metadata.document_type, DocumentType::WorkInstruction);

    let reparsed = document_schema().validate(&result.raw).unwrap();
    assert_eq!(reparsed, result.parsed);
}

#[tokio::test(start_paused = true)]
async fn test_success_short_circuits() {
    let backend = Arc::new(MockBackend::with_default(MockResponse::content(document_response())));
    let controller = controller(backend.clone());

    let start = Instant::now();
    let result = controller.run(doc_request()).await.unwrap();

    assert_eq!(result.attempts, 1);
    assert_eq!(backend.call_count(), 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_slow_answer_within_deadline_succeeds() {
    let backend = Arc::new(MockBackend::with_default(MockResponse::Delayed(
        Duration::from_secs(2),
        document_response(),
    )));
    let controller = controller(backend.clone());

    let result = controller.run(doc_request().with_timeout_ms(5_000)).await.unwrap();
    assert_eq!(result.attempts, 1);
}

#[tokio::test(start_paused = true)]
async fn test_empty_answer_is_retried() {
    let backend = Arc::new(
        MockBackend::with_default(MockResponse::content(document_response()))
            .push(MockResponse::Empty),
    );
    let controller = controller(backend.clone());

    let result = controller.run(doc_request()).await.unwrap();
    assert_eq!(result.attempts, 2);
}

#[tokio::test(start_paused = true)]
async fn test_transient_failure_is_retried() {
    let backend = Arc::new(
        MockBackend::with_default(MockResponse::content(document_response()))
            .push(MockResponse::Transient("429 rate limited".to_string()))
            .push(MockResponse::Transient("503 overloaded".to_string())),
    );
    let controller = controller(backend.clone());

    let result = controller.run(doc_request()).await.unwrap();
    assert_eq!(result.attempts, 3);
}

// ─────────────────────────────────────────────────────────────────
// Retry Budget
// ─────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_always_timing_out_uses_full_budget() {
    let backend = Arc::new(MockBackend::with_default(MockResponse::Hang));
    let controller = controller(backend.clone());

    let err = controller
        .run(doc_request().with_timeout_ms(1_000).with_max_retries(2))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Timeout { timeout_ms: 1_000 }));
    assert_eq!(backend.call_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_zero_retries_means_one_attempt() {
    let backend = Arc::new(MockBackend::with_default(MockResponse::Empty));
    let controller = controller(backend.clone());

    let err = controller.run(doc_request().with_max_retries(0)).await.unwrap_err();
    assert_eq!(err.classification(), FailureClassification::NoOutput);
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_rejection_is_not_retried() {
    let backend = Arc::new(MockBackend::with_default(MockResponse::Rejected(
        "400 invalid schema".to_string(),
    )));
    let controller = controller(backend.clone());

    let err = controller.run(doc_request()).await.unwrap_err();
    assert_eq!(err.classification(), FailureClassification::NonRetryableFailure);
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_schema_violation_is_not_retried() {
    let backend = Arc::new(MockBackend::with_default(MockResponse::content(
        "{\"title\":\"Glass handling\"}",
    )));
    let controller = controller(backend.clone());

    let err = controller.run(doc_request()).await.unwrap_err();
    assert!(matches!(err, Error::SchemaViolation { .. }));
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_extra_field_in_answer_is_schema_violation() {
    let mut payload: serde_json::Value = serde_json::from_str(&document_response()).unwrap();
    payload["confidence"] = serde_json::json!("high");
    let backend = Arc::new(MockBackend::with_default(MockResponse::content(payload.to_string())));

    let err = controller(backend).run(doc_request()).await.unwrap_err();
    assert!(matches!(err, Error::SchemaViolation { .. }));
}

// ─────────────────────────────────────────────────────────────────
// Configuration Failures
// ─────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_missing_credential_fails_without_calling_backend() {
    let backend = Arc::new(MockBackend::with_default(MockResponse::content(document_response())));
    let controller = controller_with(backend.clone(), None, PersonaRegistry::builtin());

    let start = Instant::now();
    let err = controller.run(doc_request()).await.unwrap_err();

    assert!(matches!(err, Error::MissingCredential));
    assert_eq!(err.classification(), FailureClassification::ConfigurationError);
    assert_eq!(backend.call_count(), 0);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_zero_timeout_fails_without_calling_backend() {
    let backend = Arc::new(MockBackend::with_default(MockResponse::content(document_response())));
    let controller = controller(backend.clone());

    let err = controller.run(doc_request().with_timeout_ms(0)).await.unwrap_err();
    assert!(matches!(err, Error::InvalidTimeout { .. }));
    assert_eq!(backend.call_count(), 0);
}

// ─────────────────────────────────────────────────────────────────
// Backoff
// ─────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_backoff_doubles_between_attempts() {
    let backend = Arc::new(MockBackend::with_default(MockResponse::Transient(
        "503 overloaded".to_string(),
    )));
    let controller = controller(backend.clone());

    let err = controller.run(doc_request().with_max_retries(2)).await.unwrap_err();
    assert_eq!(err.classification(), FailureClassification::RetryableTransient);

    let gaps = gaps(&backend.call_times());
    assert_eq!(gaps.len(), 2);
    assert!(gaps[0] >= Duration::from_millis(500) && gaps[0] < Duration::from_millis(510));
    assert!(gaps[1] >= Duration::from_millis(1000) && gaps[1] < Duration::from_millis(1010));
}

#[tokio::test(start_paused = true)]
async fn test_no_sleep_after_final_attempt() {
    let backend = Arc::new(MockBackend::with_default(MockResponse::Transient(
        "503 overloaded".to_string(),
    )));
    let controller = controller(backend.clone());

    let start = Instant::now();
    controller.run(doc_request().with_max_retries(1)).await.unwrap_err();

    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(500) && elapsed < Duration::from_millis(510));
}

// ─────────────────────────────────────────────────────────────────
// Cancellation and Concurrency
// ─────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_cancel_during_attempt() {
    let backend = Arc::new(MockBackend::with_default(MockResponse::Hang));
    let controller = controller(backend.clone());
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        trigger.cancel();
    });

    let err = controller
        .run_with_cancel(doc_request().with_timeout_ms(30_000), &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Cancelled));
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_backoff() {
    let backend = Arc::new(MockBackend::with_default(MockResponse::Transient(
        "503 overloaded".to_string(),
    )));
    let controller = controller(backend.clone());
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let err = controller.run_with_cancel(doc_request(), &cancel).await.unwrap_err();

    assert!(matches!(err, Error::Cancelled));
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_already_cancelled_token_makes_no_call() {
    let backend = Arc::new(MockBackend::with_default(MockResponse::content(document_response())));
    let controller = controller(backend.clone());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = controller.run_with_cancel(doc_request(), &cancel).await.unwrap_err();
    assert!(matches!(err, Error::Cancelled));
}

#[tokio::test]
async fn test_concurrent_runs_are_independent() {
    let backend = Arc::new(MockBackend::with_default(MockResponse::content(document_response())));
    let controller = Arc::new(controller(backend.clone()));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let controller = controller.clone();
            tokio::spawn(async move {
                let request =
                    WorkflowRequest::new(DOC_MANAGER, format!("request {}", i), document_schema());
                controller.run(request).await
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap().attempts, 1);
    }
    assert_eq!(backend.call_count(), 4);
}
