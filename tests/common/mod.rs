//! Common test utilities and fixtures
//!
//! This module provides shared test infrastructure

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use ai_workflow::backend::MockBackend;
use ai_workflow::persona::PersonaRegistry;
use ai_workflow::schema::{DocumentContract, StructuralSchema};
use ai_workflow::workflow::{AgentInvoker, InvokerSettings, RetryPolicy, WorkflowController};

/// Get the path to the test fixtures directory
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Get a path to a specific fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

/// Get the valid config fixture path
pub fn valid_config_fixture() -> PathBuf {
    fixture_path("valid_config.toml")
}

/// Get the invalid config fixture path
pub fn invalid_config_fixture() -> PathBuf {
    fixture_path("invalid_config.toml")
}

/// Get the conforming document response fixture path
pub fn document_response_fixture() -> PathBuf {
    fixture_path("document_response.json")
}

/// Raw text of the conforming document response
pub fn document_response() -> String {
    std::fs::read_to_string(document_response_fixture()).unwrap()
}

pub fn document_schema() -> Arc<StructuralSchema<DocumentContract>> {
    Arc::new(StructuralSchema::compile().unwrap())
}

/// Controller over `backend` with a credential, bundled personas and the
/// default backoff policy
pub fn controller(backend: Arc<MockBackend>) -> WorkflowController {
    controller_with(backend, Some("test-key"), PersonaRegistry::builtin())
}

pub fn controller_with(
    backend: Arc<MockBackend>,
    credential: Option<&str>,
    personas: PersonaRegistry,
) -> WorkflowController {
    let invoker = AgentInvoker::new(
        backend,
        InvokerSettings::new(credential.map(String::from), "test-model"),
    );
    WorkflowController::new(Arc::new(personas), invoker, RetryPolicy::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_dir_exists() {
        assert!(fixtures_dir().exists(), "Fixtures directory should exist");
    }

    #[test]
    fn test_valid_config_exists() {
        assert!(
            valid_config_fixture().exists(),
            "Valid config fixture should exist"
        );
    }

    #[test]
    fn test_invalid_config_exists() {
        assert!(
            invalid_config_fixture().exists(),
            "Invalid config fixture should exist"
        );
    }
}
