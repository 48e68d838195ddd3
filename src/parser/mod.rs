//! C and C++ source code parser
//!
//! This module transforms source text into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`symbols`]: keyword tables per dialect and the token kind map
//! - [`parse`]: the public [`parse::Parser`] and the recursive descent driver
//! - [`secondary`]: restricted grammars for ambiguity checks
//! - [`ast`]: AST node definitions
//!
//! # Supported Language
//!
//! - Declarations: storage classes, qualifiers, typedef names, `struct`,
//!   `union`, `enum`, pointers, arrays, function declarators, bit-fields,
//!   initializer lists, function definitions
//! - Statements: everything in C except the preprocessor
//! - Expressions: the full C operator set plus `typeid`, `this` and boolean
//!   literals in C++
//! - GNU keyword spellings (`__const__`, `__inline__`, ...) when enabled
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser with precedence climbing for binary
//! operators. Node construction is delegated to [`crate::action`].

pub mod ast;
mod declarations;
mod expressions;
pub mod lexer;
pub mod parse;
pub mod secondary;
mod statements;
pub mod symbols;
