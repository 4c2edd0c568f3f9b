//! Alteration callbacks invoked while duplicating.
//!
//! Two extension points exist: after each translation of the root has been
//! duplicated, and after each nested entity has been duplicated. Callbacks run
//! synchronously in registration order and may mutate the clone in place.

use std::fmt;

use crate::domain::entities::{Entity, FieldDefinition};

/// Context passed to root callbacks.
#[derive(Debug, Clone, Copy)]
pub struct RootAlterContext<'a> {
    /// The entity being duplicated.
    pub source: &'a Entity,
    /// Translation that was just processed.
    pub langcode: &'a str,
    pub operation: &'a str,
}

/// Context passed to nested entity callbacks.
#[derive(Debug, Clone, Copy)]
pub struct NestedAlterContext<'a> {
    /// The nested entity the clone was made from.
    pub source: &'a Entity,
    /// Field of the holder that references the nested entity.
    pub parent_field: &'a str,
    /// Set when the callback is invoked for one field of the nested entity.
    pub field: Option<&'a FieldDefinition>,
    /// 1 for entities held by the root, 2 for their children, and so on.
    pub depth: usize,
    /// Translation of the holder being processed.
    pub langcode: &'a str,
    pub operation: &'a str,
}

pub type RootAlterHook = Box<dyn Fn(&mut Entity, &RootAlterContext<'_>) + Send + Sync>;
pub type NestedAlterHook = Box<dyn Fn(&mut Entity, &NestedAlterContext<'_>) + Send + Sync>;

/// Registered callbacks per extension point.
#[derive(Default)]
pub struct AlterHooks {
    root: Vec<RootAlterHook>,
    nested: Vec<NestedAlterHook>,
}

impl AlterHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback run after each translation of the root is duplicated.
    pub fn on_root_duplicated<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&mut Entity, &RootAlterContext<'_>) + Send + Sync + 'static,
    {
        self.root.push(Box::new(hook));
        self
    }

    /// Registers a callback run after each nested entity is duplicated.
    pub fn on_nested_duplicated<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&mut Entity, &NestedAlterContext<'_>) + Send + Sync + 'static,
    {
        self.nested.push(Box::new(hook));
        self
    }

    pub fn invoke_root(&self, clone: &mut Entity, ctx: &RootAlterContext<'_>) {
        for hook in &self.root {
            hook(clone, ctx);
        }
    }

    pub fn invoke_nested(&self, clone: &mut Entity, ctx: &NestedAlterContext<'_>) {
        for hook in &self.nested {
            hook(clone, ctx);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty() && self.nested.is_empty()
    }
}

impl fmt::Debug for AlterHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlterHooks")
            .field("root", &self.root.len())
            .field("nested", &self.nested.len())
            .finish()
    }
}
