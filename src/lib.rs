//! # Introduction
//!
//! lrdom builds a C or C++ abstract syntax tree from the reductions of a
//! bottom-up parse. Every grammar rule the parser recognizes is handed to
//! the [`action`] core as a production plus the token range it covered; the
//! core keeps the partially built tree on a scoped stack and assembles nodes
//! as rules complete.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → Driver → Reductions → Action core → TranslationUnit
//!                                 ↘ secondary parses (ambiguities)
//! ```
//!
//! 1. [`parser`]: lexes the source and drives the grammar, reporting each
//!    reduction in postorder.
//! 2. [`action`]: the scoped stack, node factories, the ambiguity
//!    resolver, the completion accumulator and the declared-name table.
//! 3. [`visit`]: traversal over the finished tree and the deferred-pass
//!    hook.
//! 4. [`options`]: dialect, GNU keywords, completion caret.
//!
//! ## Ambiguities
//!
//! Casts, `sizeof`/`typeid` operands and declaration statements that also
//! read as expressions are re-parsed under a restricted grammar. Depending
//! on the outcome the primary node is kept, replaced, or wrapped together
//! with the alternate in an ambiguity node.
//!
//! ## Code completion
//!
//! With a completion offset set, lexing stops at the caret. Names built from
//! the caret token are collected in a [`action::CompletionNode`] together
//! with the syntactic context that consumed them.

pub mod action;
pub mod options;
pub mod parser;
pub mod visit;

pub use options::{Dialect, ParserOptions};
pub use parser::parse::{ExpressionOutcome, ParseError, Parser};
