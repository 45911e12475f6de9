//! # Command registry - immutable name to handler-factory table.
//!
//! [`CommandRegistry`] maps operation names to factories that build a [`Handler`]
//! from the invocation's [`ExecutionContext`]. It is assembled once through
//! [`RegistryBuilder`] and then only read.
//!
//! ## Architecture
//! ```text
//! RegistryBuilder ──register(name, factory)──► build() ──► CommandRegistry (Arc, read-only)
//!                                                                │
//! Runner::invoke(name) ──► resolve(name) ──► factory(ctx) ──► Box<dyn Handler>
//! ```
//!
//! ## Rules
//! - Names are unique; a repeated name fails [`RegistryBuilder::build`].
//! - A missing name is a [`DispatchError::NotFound`], never a panic.
//! - Cloning a registry shares the table.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{DispatchError, RegistryError};
use crate::handlers::Handler;
use crate::runtime::ExecutionContext;

/// Builds the handler for one invocation.
pub type HandlerFactory = Arc<dyn Fn(ExecutionContext) -> Box<dyn Handler> + Send + Sync>;

/// Read-only table of registered operations.
#[derive(Clone, Default)]
pub struct CommandRegistry {
    commands: Arc<HashMap<String, HandlerFactory>>,
}

impl CommandRegistry {
    /// Starts an empty builder.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Looks up the factory registered under `name`.
    pub fn resolve(&self, name: &str) -> Result<&HandlerFactory, DispatchError> {
        self.commands
            .get(name)
            .ok_or_else(|| DispatchError::NotFound {
                name: name.to_string(),
            })
    }

    /// Returns `true` if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered operations.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.names())
            .finish()
    }
}

/// Collects registrations for a [`CommandRegistry`].
#[derive(Default)]
pub struct RegistryBuilder {
    commands: HashMap<String, HandlerFactory>,
    duplicate: Option<String>,
}

impl RegistryBuilder {
    /// Registers `factory` under `name`.
    ///
    /// The factory is called once per invocation of `name`, after the shutdown bridge
    /// has started.
    pub fn register<F, H>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(ExecutionContext) -> H + Send + Sync + 'static,
        H: Handler,
    {
        let name = name.into();
        let factory: HandlerFactory =
            Arc::new(move |ctx: ExecutionContext| -> Box<dyn Handler> { Box::new(factory(ctx)) });
        if self.commands.insert(name.clone(), factory).is_some() && self.duplicate.is_none() {
            self.duplicate = Some(name);
        }
        self
    }

    /// Finishes the table.
    ///
    /// Fails with [`RegistryError::Duplicate`] naming the first repeated registration.
    pub fn build(self) -> Result<CommandRegistry, RegistryError> {
        if let Some(name) = self.duplicate {
            return Err(RegistryError::Duplicate { name });
        }
        Ok(CommandRegistry {
            commands: Arc::new(self.commands),
        })
    }
}
