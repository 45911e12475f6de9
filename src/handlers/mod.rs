//! # Handler abstractions.
//!
//! This module provides the operation-side types:
//! - [`Handler`] - trait for implementing an operation
//! - [`HandlerFn`] - closure-backed handler implementation

mod handler;
mod handler_fn;

pub use handler::Handler;
pub use handler_fn::HandlerFn;
