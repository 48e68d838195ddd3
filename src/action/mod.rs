//! Semantic actions
//!
//! This module turns grammar reductions into AST nodes:
//! - [`stack`]: scoped stack holding operands of rules in progress
//! - [`dispatch`]: the reduction dispatcher and its shared helpers
//! - [`ambiguity`]: secondary parses and tie-break policies
//! - [`completion`]: code-completion results collected at the caret
//! - [`context`]: state shared between a parse and its secondary parses
//! - [`factory`]: per-dialect node construction
//!
//! # Reduction protocol
//!
//! The driver reports every reduction as a [`Production`] plus the token
//! range the rule covered. Operands are already on the stack, rightmost on
//! top. Variable-length rules open a scope first; the closing reduction
//! collects the whole scope in source order.

pub mod ambiguity;
pub mod completion;
pub mod context;
pub mod dispatch;
mod declarations;
pub mod errors;
mod expressions;
pub mod factory;
pub mod names;
pub mod span;
pub mod stack;
mod statements;
pub mod value;

pub use ambiguity::{Resolution, SecondaryGrammar, SecondaryParser, SecondaryParserFactory};
pub use completion::{CompletionContext, CompletionEntry, CompletionNode};
pub use context::{ParseContext, ParseOutcome};
pub use dispatch::{ActionCore, ActionEnv, CoreCheckpoint, Production};
pub use errors::{ActionError, ScopeError};
pub use factory::{node_factory, CNodeFactory, CppNodeFactory, NodeFactory};
pub use names::{DeclaredNames, NameInfo};
pub use span::RuleSpan;
pub use stack::ScopedStack;
pub use value::StackValue;
