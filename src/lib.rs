//! ai-workflow - structured AI workflow execution core
//!
//! Maps a workflow id to a persona, sends a single-turn request to a model
//! service constrained by a strict schema, validates the answer, and retries
//! transient failures under a per-attempt time limit.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use ai_workflow::backend::{MockBackend, MockResponse};
//! use ai_workflow::persona::PersonaRegistry;
//! use ai_workflow::schema::{DocumentContract, StructuralSchema};
//! use ai_workflow::workflow::{
//!     AgentInvoker, InvokerSettings, RetryPolicy, WorkflowController, WorkflowRequest,
//! };
//!
//! # async fn example() -> ai_workflow::error::Result<()> {
//! let backend = Arc::new(MockBackend::with_default(MockResponse::content("{}")));
//! let invoker = AgentInvoker::new(backend, InvokerSettings::new(Some("key".into()), "gpt-4o-mini"));
//! let controller = WorkflowController::new(
//!     Arc::new(PersonaRegistry::builtin()),
//!     invoker,
//!     RetryPolicy::default(),
//! );
//!
//! let schema = Arc::new(StructuralSchema::<DocumentContract>::compile()?);
//! let result = controller
//!     .run(WorkflowRequest::new("doc-manager", "Draft a glass handling procedure", schema))
//!     .await?;
//! println!("{}", result.raw);
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod logging;
pub mod persona;
pub mod schema;
pub mod workflow;

pub use error::{Error, FailureClassification, Result};
