//! Error types for the reduction actions
//!
//! These are contract violations between the driving parser and the action
//! core: an action asked to pop more operands than were pushed, an operand of
//! the wrong category, or a root that was not fresh. Malformed source never
//! produces one of these; it produces problem nodes instead.

use thiserror::Error;

/// Misuse of a [`super::ScopedStack`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    #[error("the outermost scope cannot be closed")]
    OutermostScope,

    #[error("the top scope is empty")]
    EmptyScope,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error(transparent)]
    Scope(#[from] ScopeError),

    #[error("expected {expected} on the AST stack, found {found}")]
    UnexpectedValue {
        expected: &'static str,
        found: &'static str,
    },

    #[error("token index {index} is outside the token stream ({len} tokens)")]
    TokenOutOfRange { index: usize, len: usize },

    #[error("the translation unit is frozen")]
    FrozenUnit,

    #[error("a parse must start from an empty, unfrozen translation unit ({declarations} declarations, frozen: {frozen})")]
    UnitNotFresh { declarations: usize, frozen: bool },

    #[error("{open} scopes are still open when the translation unit closes")]
    UnbalancedScopes { open: usize },
}
