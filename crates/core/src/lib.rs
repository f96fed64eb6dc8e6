//! Core logic of the two-phase memory-estimation conversation.
//!
//! The entry point is [`Estimator`], which owns a model provider and a
//! tool session and runs one query at a time: fetch the target script
//! through the content tool, ask the model to enumerate referenced
//! files, size every file through the size tool, then ask the model for
//! the final peak-memory estimate.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

pub mod conversation;
mod estimator;
mod model_client;
pub mod paths;
mod prompts;
pub mod tool;

pub use estimator::{Estimator, QueryError};
pub use model_client::StreamEvent;
