//! Expression parsing implementation
//!
//! This module handles parsing of C expressions using precedence climbing
//! for binary operators and recursive descent for other expression forms.
//!
//! # Supported Expressions
//!
//! - Literals: integers, floats, characters, strings, `true`/`false`/`this`
//! - Identifiers and the completion token
//! - Binary operators: arithmetic, comparison, logical, bitwise
//! - Unary operators: `-`, `+`, `!`, `~`, `&`, `*`, `++`, `--`
//! - Postfix: `[]`, `.`, `->`, `()`, `++`, `--`
//! - Ternary: `? :`
//! - Type casts: `(type)expr`
//! - `sizeof` and `typeid`, with an expression or a type-id
//!
//! # Precedence
//!
//! Binary operators follow C precedence rules using a precedence climbing
//! algorithm. Assignment and the conditional operator are right-associative
//! and handled above the climb.
//!
//! Casts and type-id operands need a type name after `(`; those readings
//! are tried speculatively and only when the active grammar allows them.

use crate::action::dispatch::Production;
use crate::parser::ast::{BinaryOp, LiteralKind, TypeIdOp, UnaryOp};
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{Driver, ParseError};

/// Binary operator and its precedence (higher binds tighter)
fn binary_operator(kind: TokenKind) -> Option<(BinaryOp, u8)> {
    let entry = match kind {
        TokenKind::OrOr => (BinaryOp::LogicalOr, 1),
        TokenKind::AndAnd => (BinaryOp::LogicalAnd, 2),
        TokenKind::Pipe => (BinaryOp::BinaryOr, 3),
        TokenKind::Caret => (BinaryOp::BinaryXor, 4),
        TokenKind::Amp => (BinaryOp::BinaryAnd, 5),
        TokenKind::EqEq => (BinaryOp::Equals, 6),
        TokenKind::NotEq => (BinaryOp::NotEquals, 6),
        TokenKind::Lt => (BinaryOp::Less, 7),
        TokenKind::Gt => (BinaryOp::Greater, 7),
        TokenKind::Le => (BinaryOp::LessEqual, 7),
        TokenKind::Ge => (BinaryOp::GreaterEqual, 7),
        TokenKind::LtLt => (BinaryOp::ShiftLeft, 8),
        TokenKind::GtGt => (BinaryOp::ShiftRight, 8),
        TokenKind::Plus => (BinaryOp::Plus, 9),
        TokenKind::Minus => (BinaryOp::Minus, 9),
        TokenKind::Star => (BinaryOp::Multiply, 10),
        TokenKind::Slash => (BinaryOp::Divide, 10),
        TokenKind::Percent => (BinaryOp::Modulo, 10),
        _ => return None,
    };
    Some(entry)
}

fn assignment_operator(kind: TokenKind) -> Option<BinaryOp> {
    let op = match kind {
        TokenKind::Eq => BinaryOp::Assign,
        TokenKind::PlusEq => BinaryOp::PlusAssign,
        TokenKind::MinusEq => BinaryOp::MinusAssign,
        TokenKind::StarEq => BinaryOp::MultiplyAssign,
        TokenKind::SlashEq => BinaryOp::DivideAssign,
        TokenKind::PercentEq => BinaryOp::ModuloAssign,
        TokenKind::LtLtEq => BinaryOp::ShiftLeftAssign,
        TokenKind::GtGtEq => BinaryOp::ShiftRightAssign,
        TokenKind::AmpEq => BinaryOp::BinaryAndAssign,
        TokenKind::PipeEq => BinaryOp::BinaryOrAssign,
        TokenKind::CaretEq => BinaryOp::BinaryXorAssign,
        _ => return None,
    };
    Some(op)
}

fn prefix_operator(kind: TokenKind) -> Option<UnaryOp> {
    let op = match kind {
        TokenKind::PlusPlus => UnaryOp::PrefixIncr,
        TokenKind::MinusMinus => UnaryOp::PrefixDecr,
        TokenKind::Plus => UnaryOp::Plus,
        TokenKind::Minus => UnaryOp::Minus,
        TokenKind::Star => UnaryOp::Star,
        TokenKind::Amp => UnaryOp::Amper,
        TokenKind::Tilde => UnaryOp::Tilde,
        TokenKind::Bang => UnaryOp::Not,
        _ => return None,
    };
    Some(op)
}

impl Driver<'_, '_> {
    /// Parse expression (top-level entry point, including the comma operator)
    pub(crate) fn expression(&mut self) -> Result<(), ParseError> {
        let start = self.position;
        self.mark(Production::OpenScope)?;
        self.assignment_expression()?;
        while self.eat(TokenKind::Comma) {
            self.assignment_expression()?;
        }
        self.reduce(Production::ExpressionList, start)
    }

    /// Parse assignment or ternary (right-associative)
    pub(crate) fn assignment_expression(&mut self) -> Result<(), ParseError> {
        let start = self.position;
        self.conditional_expression()?;

        if let Some(op) = assignment_operator(self.kind()) {
            self.advance();
            self.assignment_expression()?;
            self.reduce(Production::ExpressionBinary(op), start)?;
        }
        Ok(())
    }

    /// Parse ternary: condition ? positive : negative
    pub(crate) fn conditional_expression(&mut self) -> Result<(), ParseError> {
        let start = self.position;
        self.binary_expression(1)?;

        if self.eat(TokenKind::Question) {
            self.expression()?;
            self.expect(TokenKind::Colon, "in conditional expression")?;
            self.conditional_expression()?;
            self.reduce(Production::ExpressionConditional, start)?;
        }
        Ok(())
    }

    /// Precedence climbing over the binary operators
    fn binary_expression(&mut self, min_precedence: u8) -> Result<(), ParseError> {
        let start = self.position;
        self.cast_expression()?;

        while let Some((op, precedence)) = binary_operator(self.kind()) {
            if precedence < min_precedence {
                break;
            }
            self.advance();
            self.binary_expression(precedence + 1)?;
            self.reduce(Production::ExpressionBinary(op), start)?;
        }
        Ok(())
    }

    /// `( type-id ) cast-expression`, or a unary expression
    fn cast_expression(&mut self) -> Result<(), ParseError> {
        if self.grammar.recognizes_casts()
            && self.check(TokenKind::LParen)
            && self.starts_type_id_at(self.position + 1)
            && self.speculate(Self::cast)?.is_some()
        {
            return Ok(());
        }
        self.unary_expression()
    }

    fn cast(&mut self) -> Result<(), ParseError> {
        let start = self.position;
        self.advance();
        self.type_id()?;
        self.expect(TokenKind::RParen, "after cast type")?;
        self.cast_expression()?;
        self.reduce(Production::ExpressionCast, start)
    }

    /// Parse unary (! ~ - + & * ++ -- sizeof typeid)
    fn unary_expression(&mut self) -> Result<(), ParseError> {
        let start = self.position;

        if let Some(op) = prefix_operator(self.kind()) {
            self.advance();
            if matches!(op, UnaryOp::PrefixIncr | UnaryOp::PrefixDecr) {
                self.unary_expression()?;
            } else {
                self.cast_expression()?;
            }
            return self.reduce(Production::ExpressionUnary(op), start);
        }

        match self.kind() {
            TokenKind::Sizeof => self.type_id_operator(TypeIdOp::Sizeof, UnaryOp::Sizeof),
            TokenKind::Typeid => self.type_id_operator(TypeIdOp::Typeid, UnaryOp::Typeid),
            _ => self.postfix_expression(),
        }
    }

    /// `sizeof`/`typeid` applied to `( type-id )` or to an expression.
    fn type_id_operator(&mut self, op: TypeIdOp, unary: UnaryOp) -> Result<(), ParseError> {
        let start = self.position;
        self.advance();

        if self.grammar.recognizes_type_id_operands()
            && self.check(TokenKind::LParen)
            && self.starts_type_id_at(self.position + 1)
        {
            let parsed = self.speculate(|p| {
                p.advance();
                p.type_id()?;
                p.expect_closer(TokenKind::RParen, "after type name")
            })?;
            if parsed.is_some() {
                return self.reduce(Production::ExpressionTypeId(op), start);
            }
        }

        if unary == UnaryOp::Typeid {
            self.expect(TokenKind::LParen, "after 'typeid'")?;
            self.expression()?;
            self.expect_closer(TokenKind::RParen, "after 'typeid' operand")?;
        } else {
            self.unary_expression()?;
        }
        self.reduce(Production::ExpressionUnary(unary), start)
    }

    /// Parse postfix (++ -- [] . -> ())
    fn postfix_expression(&mut self) -> Result<(), ParseError> {
        let start = self.position;
        self.primary_expression()?;

        loop {
            match self.kind() {
                TokenKind::LBracket => {
                    self.advance();
                    self.expression()?;
                    self.expect_closer(TokenKind::RBracket, "after array index")?;
                    self.reduce(Production::ExpressionArraySubscript, start)?;
                }
                TokenKind::LParen => {
                    self.advance();
                    if self.at_closer(TokenKind::RParen) {
                        self.mark(Production::Empty)?;
                    } else {
                        self.expression()?;
                    }
                    self.expect_closer(TokenKind::RParen, "after function arguments")?;
                    self.reduce(Production::ExpressionFunctionCall, start)?;
                }
                kind @ (TokenKind::Dot | TokenKind::Arrow) => {
                    self.advance();
                    self.expect_identifier("after member access")?;
                    self.reduce(
                        Production::ExpressionFieldReference {
                            is_pointer: kind == TokenKind::Arrow,
                        },
                        start,
                    )?;
                }
                TokenKind::PlusPlus => {
                    self.advance();
                    self.reduce(Production::ExpressionUnary(UnaryOp::PostfixIncr), start)?;
                }
                TokenKind::MinusMinus => {
                    self.advance();
                    self.reduce(Production::ExpressionUnary(UnaryOp::PostfixDecr), start)?;
                }
                _ => return Ok(()),
            }
        }
    }

    /// Parse primary (literals, identifiers, parenthesized expressions)
    fn primary_expression(&mut self) -> Result<(), ParseError> {
        let start = self.position;

        let literal = match self.kind() {
            TokenKind::IntegerLiteral => LiteralKind::Integer,
            TokenKind::FloatLiteral => LiteralKind::Float,
            TokenKind::CharLiteral => LiteralKind::Char,
            TokenKind::True => LiteralKind::True,
            TokenKind::False => LiteralKind::False,
            TokenKind::This => LiteralKind::This,
            TokenKind::StringLiteral => {
                // Adjacent string literals form one literal
                while self.eat(TokenKind::StringLiteral) {}
                return self.reduce(Production::ExpressionLiteral(LiteralKind::String), start);
            }
            TokenKind::Identifier | TokenKind::Completion => {
                return self.reduce_token(Production::ExpressionId);
            }
            TokenKind::LParen => {
                self.advance();
                self.expression()?;
                self.expect_closer(TokenKind::RParen, "after expression")?;
                return self.reduce(Production::ExpressionBracketed, start);
            }
            _ => return Err(self.syntax_error("expression")),
        };

        self.reduce_token(Production::ExpressionLiteral(literal))
    }
}
