//! Backend module for model services
//!
//! This module provides the abstraction over the remote generative model
//! and the implementations the invoker can be handed.

mod mock;
mod openai;
mod traits;

pub use mock::{MockBackend, MockResponse};
pub use openai::{OpenAiBackend, OpenAiConfig};
pub use traits::*;
