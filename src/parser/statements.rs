//! Statement parsing implementation
//!
//! This module handles the top-level declaration loop and all C statements:
//!
//! - Declarations, including ones that could also read as expressions
//! - Control flow: `if`, `while`, `for`, `do-while`, `switch`
//! - Labels: `case`, `default`, `name:`
//! - Jump statements: `return`, `break`, `continue`, `goto`
//! - Compound statements: `{ ... }`
//! - Expression statements
//!
//! # Grammar
//!
//! ```text
//! translation_unit ::= external_declaration*
//! statement ::= compound | if_stmt | switch_stmt | while_stmt | do_stmt
//!             | for_stmt | jump_stmt | labeled_stmt | declaration
//!             | expr_stmt | ';'
//! ```
//!
//! A statement that fails to parse becomes a problem statement covering the
//! tokens skipped during recovery.

use crate::action::dispatch::Production;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{Driver, ParseError};

impl Driver<'_, '_> {
    /// Parse the entire token stream (top-level declarations)
    pub(crate) fn translation_unit(&mut self) -> Result<(), ParseError> {
        while !self.at_end() {
            if self.eat(TokenKind::Semicolon) {
                continue;
            }

            let start = self.position;
            if self.speculate(Self::external_declaration)?.is_none() {
                self.synchronize(false);
                self.reduce(Production::DeclarationProblem, start)?;
            }
        }

        self.reduce(Production::TranslationUnit, 0)
    }

    /// Compound statement including its braces
    pub(crate) fn compound_statement(&mut self) -> Result<(), ParseError> {
        let start = self.position;
        self.expect(TokenKind::LBrace, "to open a block")?;
        self.mark(Production::OpenSymbolScope)?;

        let has_body = !self.at_closer(TokenKind::RBrace);
        if has_body {
            self.mark(Production::OpenScope)?;
            while !self.at_closer(TokenKind::RBrace) && !self.at_end() {
                self.block_item()?;
            }
        }

        self.expect_closer(TokenKind::RBrace, "to close a block")?;
        self.mark(Production::CloseSymbolScope)?;
        self.reduce(Production::StatementCompound { has_body }, start)
    }

    /// One statement of a block, with recovery.
    fn block_item(&mut self) -> Result<(), ParseError> {
        let start = self.position;
        if self.speculate(Self::statement)?.is_none() {
            self.synchronize(true);
            self.reduce(Production::StatementProblem, start)?;
        }
        Ok(())
    }

    /// Parse a statement
    pub(crate) fn statement(&mut self) -> Result<(), ParseError> {
        let start = self.position;

        match self.kind() {
            TokenKind::LBrace => self.compound_statement(),
            TokenKind::If => self.if_statement(),
            TokenKind::Switch => self.switch_statement(),
            TokenKind::While => self.while_statement(),
            TokenKind::Do => self.do_while_statement(),
            TokenKind::For => self.for_statement(),
            TokenKind::Case => self.case_statement(),
            TokenKind::Default => self.default_statement(),
            TokenKind::Goto => {
                self.advance();
                self.expect_identifier("after 'goto'")?;
                self.expect_closer(TokenKind::Semicolon, "after 'goto'")?;
                self.reduce(Production::StatementGoto, start)
            }
            TokenKind::Break => {
                self.advance();
                self.expect_closer(TokenKind::Semicolon, "after 'break'")?;
                self.reduce(Production::StatementBreak, start)
            }
            TokenKind::Continue => {
                self.advance();
                self.expect_closer(TokenKind::Semicolon, "after 'continue'")?;
                self.reduce(Production::StatementContinue, start)
            }
            TokenKind::Return => self.return_statement(),
            TokenKind::Semicolon => {
                self.advance();
                self.reduce(Production::StatementNull, start)
            }
            TokenKind::Identifier if self.peek_kind(1) == TokenKind::Colon => {
                self.advance();
                self.advance();
                self.statement()?;
                self.reduce(Production::StatementLabeled, start)
            }
            _ if self.starts_declaration_keyword() => {
                self.declaration(true)?;
                self.reduce(Production::StatementDeclaration, start)
            }
            _ if self.could_start_declaration() => {
                if self.speculate(|p| p.declaration(false))?.is_some() {
                    self.reduce(Production::StatementDeclarationWithDisambiguation, start)
                } else {
                    self.expression_statement()
                }
            }
            _ => self.expression_statement(),
        }
    }

    /// An identifier-led statement that may be a declaration: a typedef
    /// name, the completion token, or in C an implicit-int declarator.
    fn could_start_declaration(&self) -> bool {
        match self.kind() {
            TokenKind::Completion => true,
            TokenKind::Identifier if self.is_type_name_at(self.position) => true,
            TokenKind::Identifier => {
                self.env.options.dialect.allows_implicit_int()
                    && matches!(
                        self.peek_kind(1),
                        TokenKind::LParen | TokenKind::Eq | TokenKind::LBracket | TokenKind::Comma
                    )
            }
            _ => false,
        }
    }

    fn expression_statement(&mut self) -> Result<(), ParseError> {
        let start = self.position;
        self.expression()?;
        self.expect_closer(TokenKind::Semicolon, "after expression")?;
        self.reduce(Production::StatementExpression, start)
    }

    /// `( expression )` as used by `if`, `while` and `switch`
    fn parenthesized_condition(&mut self, context: &str) -> Result<(), ParseError> {
        self.expect(TokenKind::LParen, context)?;
        self.expression()?;
        self.expect_closer(TokenKind::RParen, context)
    }

    fn if_statement(&mut self) -> Result<(), ParseError> {
        let start = self.position;
        self.advance();
        self.parenthesized_condition("around 'if' condition")?;
        self.statement()?;

        let has_else = self.eat(TokenKind::Else);
        if has_else {
            self.statement()?;
        }
        self.reduce(Production::StatementIf { has_else }, start)
    }

    fn switch_statement(&mut self) -> Result<(), ParseError> {
        let start = self.position;
        self.advance();
        self.parenthesized_condition("around 'switch' value")?;
        self.statement()?;
        self.reduce(Production::StatementSwitch, start)
    }

    fn while_statement(&mut self) -> Result<(), ParseError> {
        let start = self.position;
        self.advance();
        self.parenthesized_condition("around 'while' condition")?;
        self.statement()?;
        self.reduce(Production::StatementWhileLoop, start)
    }

    fn do_while_statement(&mut self) -> Result<(), ParseError> {
        let start = self.position;
        self.advance();
        self.statement()?;
        self.expect(TokenKind::While, "after 'do' body")?;
        self.parenthesized_condition("around 'do-while' condition")?;
        self.expect_closer(TokenKind::Semicolon, "after 'do-while'")?;
        self.reduce(Production::StatementDoLoop, start)
    }

    /// `for (init; condition; iteration) body`; declarations in the
    /// initializer are scoped to the loop.
    fn for_statement(&mut self) -> Result<(), ParseError> {
        let start = self.position;
        self.advance();
        self.expect(TokenKind::LParen, "after 'for'")?;
        self.mark(Production::OpenSymbolScope)?;

        let init_start = self.position;
        if self.eat(TokenKind::Semicolon) {
            self.reduce(Production::Empty, init_start)?;
        } else if self.starts_declaration_keyword() || self.is_type_name_at(self.position) {
            self.declaration(true)?;
            self.reduce(Production::StatementDeclaration, init_start)?;
        } else {
            self.expression()?;
            self.expect(TokenKind::Semicolon, "after 'for' initializer")?;
        }

        if self.check(TokenKind::Semicolon) {
            self.mark(Production::Empty)?;
        } else {
            self.expression()?;
        }
        self.expect(TokenKind::Semicolon, "after 'for' condition")?;

        if self.at_closer(TokenKind::RParen) {
            self.mark(Production::Empty)?;
        } else {
            self.expression()?;
        }
        self.expect_closer(TokenKind::RParen, "after 'for' clauses")?;

        self.statement()?;
        self.mark(Production::CloseSymbolScope)?;
        self.reduce(Production::StatementForLoop, start)
    }

    fn case_statement(&mut self) -> Result<(), ParseError> {
        let start = self.position;
        self.advance();
        self.conditional_expression()?;
        self.expect(TokenKind::Colon, "after 'case' value")?;
        self.statement()?;
        self.reduce(Production::StatementCase, start)
    }

    fn default_statement(&mut self) -> Result<(), ParseError> {
        let start = self.position;
        self.advance();
        self.expect(TokenKind::Colon, "after 'default'")?;
        self.statement()?;
        self.reduce(Production::StatementDefault, start)
    }

    fn return_statement(&mut self) -> Result<(), ParseError> {
        let start = self.position;
        self.advance();

        let has_value = !self.at_closer(TokenKind::Semicolon);
        if has_value {
            self.expression()?;
        }
        self.expect_closer(TokenKind::Semicolon, "after 'return'")?;
        self.reduce(Production::StatementReturn { has_value }, start)
    }
}
