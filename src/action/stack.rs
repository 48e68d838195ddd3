//! Scoped stack used to accumulate the operands of variable-length rules
//!
//! A [`ScopedStack`] is a stack of scopes, each an ordered run of values.
//! `push`, `pop` and `peek` only ever touch the top scope. An open-scope
//! reduction marks where a list starts; the reduction that ends the list
//! takes the whole scope back with [`ScopedStack::close_scope`], in the order
//! the values were pushed.
//!
//! The outermost scope is always present and can never be closed.

use super::errors::ScopeError;

#[derive(Debug, Clone)]
pub struct ScopedStack<T> {
    // Never empty: index 0 is the outermost scope
    scopes: Vec<Vec<T>>,
}

/// Saved shape of a [`ScopedStack`], used to undo a failed speculative parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackCheckpoint {
    depth: usize,
    len: usize,
}

impl<T> Default for ScopedStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ScopedStack<T> {
    pub fn new() -> Self {
        Self {
            scopes: vec![Vec::new()],
        }
    }

    pub fn open_scope(&mut self) {
        self.scopes.push(Vec::new());
    }

    /// Opens a scope that already holds `items`.
    pub fn open_scope_with(&mut self, items: impl IntoIterator<Item = T>) {
        self.scopes.push(items.into_iter().collect());
    }

    /// Removes the top scope and returns its values in push order.
    pub fn close_scope(&mut self) -> Result<Vec<T>, ScopeError> {
        if self.scopes.len() <= 1 {
            return Err(ScopeError::OutermostScope);
        }
        self.scopes.pop().ok_or(ScopeError::OutermostScope)
    }

    pub fn push(&mut self, value: T) {
        self.top_mut().push(value);
    }

    pub fn pop(&mut self) -> Result<T, ScopeError> {
        self.top_mut().pop().ok_or(ScopeError::EmptyScope)
    }

    pub fn peek(&self) -> Result<&T, ScopeError> {
        self.top().last().ok_or(ScopeError::EmptyScope)
    }

    pub fn peek_mut(&mut self) -> Result<&mut T, ScopeError> {
        self.top_mut().last_mut().ok_or(ScopeError::EmptyScope)
    }

    /// Whether the top scope holds no values.
    pub fn is_empty(&self) -> bool {
        self.top().is_empty()
    }

    /// Number of open scopes, counting the outermost one.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn top_scope(&self) -> &[T] {
        self.top()
    }

    /// Takes every value out of the top scope, leaving the scope open.
    pub fn drain_top_scope(&mut self) -> Vec<T> {
        std::mem::take(self.top_mut())
    }

    pub fn checkpoint(&self) -> StackCheckpoint {
        StackCheckpoint {
            depth: self.scopes.len(),
            len: self.top().len(),
        }
    }

    /// Discards every scope and value added since `checkpoint`.
    ///
    /// Only valid when no scope that existed at the checkpoint has been
    /// closed in the meantime.
    pub fn rollback(&mut self, checkpoint: StackCheckpoint) {
        self.scopes.truncate(checkpoint.depth.max(1));
        self.top_mut().truncate(checkpoint.len);
    }

    fn top(&self) -> &Vec<T> {
        // The outermost scope is never removed
        &self.scopes[self.scopes.len() - 1]
    }

    fn top_mut(&mut self) -> &mut Vec<T> {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_scope_returns_push_order() {
        let mut stack = ScopedStack::new();
        stack.push(0);
        stack.open_scope();
        stack.push(1);
        stack.push(2);
        stack.push(3);

        assert_eq!(stack.close_scope(), Ok(vec![1, 2, 3]));
        assert_eq!(stack.pop(), Ok(0));
    }

    #[test]
    fn test_outermost_scope_cannot_close() {
        let mut stack: ScopedStack<u8> = ScopedStack::new();
        assert_eq!(stack.close_scope(), Err(ScopeError::OutermostScope));

        stack.open_scope();
        assert!(stack.close_scope().is_ok());
        assert_eq!(stack.close_scope(), Err(ScopeError::OutermostScope));
    }

    #[test]
    fn test_pop_and_peek_only_see_top_scope() {
        let mut stack = ScopedStack::new();
        stack.push("outer");
        stack.open_scope();

        assert!(stack.is_empty());
        assert_eq!(stack.pop(), Err(ScopeError::EmptyScope));
        assert_eq!(stack.peek(), Err(ScopeError::EmptyScope));

        stack.push("inner");
        assert_eq!(stack.peek(), Ok(&"inner"));
    }

    #[test]
    fn test_open_scope_with_items() {
        let mut stack = ScopedStack::new();
        stack.open_scope_with(vec!['a', 'b']);
        stack.push('c');
        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.close_scope(), Ok(vec!['a', 'b', 'c']));
    }

    #[test]
    fn test_rollback_restores_shape() {
        let mut stack = ScopedStack::new();
        stack.push(1);
        let checkpoint = stack.checkpoint();

        stack.push(2);
        stack.open_scope();
        stack.push(3);
        stack.open_scope();
        stack.rollback(checkpoint);

        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.top_scope(), &[1]);
    }
}
