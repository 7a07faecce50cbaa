//! Workflow execution
//!
//! A workflow run resolves the persona for its workflow id, then makes
//! bounded attempts, each one a single model call under a time limit, until
//! it gets a schema-conforming answer or runs out of retries.

pub mod controller;
pub mod invoker;
pub mod timeout;
pub mod types;

pub use controller::{RetryPolicy, WorkflowController};
pub use invoker::{AgentInvoker, Invocation, InvokerSettings};
pub use timeout::race_with_timeout;
pub use types::{
    AttemptOutcome, InvocationAttempt, WorkflowRequest, WorkflowResult, DEFAULT_MAX_RETRIES,
    DEFAULT_TIMEOUT_MS,
};
