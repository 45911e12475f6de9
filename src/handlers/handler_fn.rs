//! # Function-backed handler (`HandlerFn`)
//!
//! [`HandlerFn`] wraps a closure `F: Fn(Vec<String>) -> Fut`, producing a fresh
//! future per run. Factories usually capture what they need from the
//! [`ExecutionContext`](crate::ExecutionContext) and move it into the closure.
//!
//! ## Example
//! ```rust
//! use cmdvisor::{CommandRegistry, ExecutionContext, HandlerFn};
//!
//! let registry = CommandRegistry::builder()
//!     .register("echo", |ctx: ExecutionContext| {
//!         HandlerFn::new(move |args: Vec<String>| {
//!             let ui = ctx.ui().clone();
//!             async move {
//!                 ui.output(&args.join(" "));
//!                 0
//!             }
//!         })
//!     })
//!     .build()
//!     .unwrap();
//!
//! assert!(registry.contains("echo"));
//! ```

use std::future::Future;

use async_trait::async_trait;

use crate::handlers::Handler;

/// Function-backed handler implementation.
#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

impl<F> HandlerFn<F> {
    /// Creates a new function-backed handler.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(Vec<String>) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = i32> + Send + 'static,
{
    async fn run(&self, args: Vec<String>) -> i32 {
        (self.f)(args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_each_run_gets_fresh_future() {
        let h = HandlerFn::new(|args: Vec<String>| async move { args.len() as i32 });

        assert_eq!(h.run(vec![]).await, 0);
        assert_eq!(h.run(vec!["a".into(), "b".into()]).await, 2);
    }
}
