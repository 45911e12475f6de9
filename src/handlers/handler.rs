//! # Handler abstraction.
//!
//! A [`Handler`] is the implementation of one named operation. It is built by a
//! factory from the [`ExecutionContext`](crate::ExecutionContext) of the current
//! invocation, receives the raw argument list, and returns an exit code.
//!
//! The runner never reinterprets the returned code; it is propagated to the caller
//! unchanged.

use async_trait::async_trait;

/// # Named operation implementation.
///
/// Handlers should report through the context's [`Ui`](crate::Ui) and may watch
/// [`ShutdownEvents`](crate::ShutdownEvents) to stop early. Shutdown is advisory:
/// the runner waits for `run` to return on its own.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use cmdvisor::{ExecutionContext, Handler};
///
/// struct Greet {
///     ctx: ExecutionContext,
/// }
///
/// #[async_trait]
/// impl Handler for Greet {
///     async fn run(&self, args: Vec<String>) -> i32 {
///         let who = args.first().map(String::as_str).unwrap_or("world");
///         self.ctx.ui().output(&format!("hello, {who}"));
///         0
///     }
/// }
/// ```
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    /// Runs the operation with the raw arguments and returns its exit code.
    async fn run(&self, args: Vec<String>) -> i32;
}
