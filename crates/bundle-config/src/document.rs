/*
 * document.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The current configuration tree of a bundle.

use bundle_dyn::Value;
use std::future::Future;

/// Owns the current document tree.
///
/// Changes go through [`mutate`](Document::mutate): the new tree is
/// computed from the current one and installed only if that succeeds, so a
/// failed change leaves the document as it was.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    value: Value,
}

impl Document {
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    pub fn mutate<E>(&mut self, f: impl FnOnce(&Value) -> Result<Value, E>) -> Result<(), E> {
        let next = f(&self.value)?;
        self.value = next;
        Ok(())
    }

    /// [`mutate`](Document::mutate) for computations that await, such as a
    /// call to an external process. `f` receives a snapshot of the tree.
    pub async fn mutate_async<F, Fut, E>(&mut self, f: F) -> Result<(), E>
    where
        F: FnOnce(Value) -> Fut,
        Fut: Future<Output = Result<Value, E>>,
    {
        let next = f(self.value.clone()).await?;
        self.value = next;
        Ok(())
    }
}

impl From<Value> for Document {
    fn from(value: Value) -> Self {
        Document::new(value)
    }
}
