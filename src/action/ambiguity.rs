//! Ambiguity resolution
//!
//! Three constructs cannot be told apart by the grammar alone:
//!
//! - `(T) operand`, a cast or a parenthesized expression followed by more
//!   expression;
//! - `sizeof(T)` / `typeid(T)`, a type-id or an expression operand;
//! - a statement that reads both as a declaration and as an expression
//!   (`T * x;`).
//!
//! In each case the primary interpretation is built first, then the same
//! tokens are handed to a [`SecondaryParser`] restricted to the other
//! reading. The policy functions below decide whether to keep the primary
//! node, replace it with the alternate, or wrap both in an ambiguity node for
//! a later semantic pass.
//!
//! Secondary parsers never modify tokens; they see token kinds through the
//! same [`crate::parser::symbols::TokenKindMap`] as the primary parse, so
//! nothing has to be restored after they return.

use super::context::ParseContext;
use super::dispatch::{ActionCore, ActionEnv};
use super::errors::ActionError;
use super::span::{self, RuleSpan};
use super::statements::without_terminator;
use crate::parser::ast::*;
use crate::parser::lexer::{Token, TokenKind};
use tracing::{debug, debug_span};

/// A parser for a restricted grammar, run over an already lexed token range.
pub trait SecondaryParser {
    /// Parses all of `tokens` as one expression. `None` means the tokens have
    /// no reading under this grammar.
    fn parse_secondary(
        &self,
        tokens: &[Token],
        env: ActionEnv<'_>,
        ctx: &mut ParseContext,
    ) -> Option<Expression>;
}

/// Supplies the restricted-grammar parsers the resolver needs.
pub trait SecondaryParserFactory {
    /// Expressions only; used for the statement ambiguity.
    fn expression_parser(&self) -> &dyn SecondaryParser;

    /// Expressions without cast productions.
    fn no_cast_expression_parser(&self) -> &dyn SecondaryParser;

    /// Expressions where `sizeof` and `typeid` only take expression operands.
    fn sizeof_expression_parser(&self) -> &dyn SecondaryParser;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecondaryGrammar {
    Expression,
    NoCast,
    Sizeof,
}

/// Outcome of a tie-break policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    KeepPrimary,
    PreferAlternate,
    Ambiguous,
}

/// Cast and type-id operand policy.
pub fn resolve_type_id_ambiguity(has_alternate: bool, function_type: bool) -> Resolution {
    match (has_alternate, function_type) {
        (false, _) => Resolution::KeepPrimary,
        (true, true) => Resolution::PreferAlternate,
        (true, false) => Resolution::Ambiguous,
    }
}

/// Declaration versus expression statement policy, checked in order.
pub fn resolve_statement_ambiguity(
    alternate: Option<&Expression>,
    lone_identifier: bool,
    implicit_int: bool,
) -> Resolution {
    match alternate {
        None => Resolution::KeepPrimary,
        Some(expression) if expression.is_function_call() => Resolution::PreferAlternate,
        Some(_) if lone_identifier => Resolution::PreferAlternate,
        Some(_) if implicit_int => Resolution::PreferAlternate,
        Some(_) => Resolution::Ambiguous,
    }
}

impl ActionCore<'_, '_> {
    /// `( type-id ) operand`
    pub(super) fn consume_expression_cast(&mut self, rule: RuleSpan) -> Result<(), ActionError> {
        let operand = self.pop_expression()?;
        let type_id = self.pop_type_id()?;
        let function_type = self.denotes_function_type(&type_id);

        let mut cast = self.env.factory.new_cast_expression(type_id, operand);
        cast.span = self.rule_span(rule);

        let alternate = self.run_secondary_parser(SecondaryGrammar::NoCast, rule);
        let expression = self.resolve_expression(cast, alternate, function_type);
        self.push(expression);
        Ok(())
    }

    /// `sizeof ( type-id )` or `typeid ( type-id )`
    pub(super) fn consume_expression_type_id(&mut self, op: TypeIdOp, rule: RuleSpan) -> Result<(), ActionError> {
        let type_id = self.pop_type_id()?;
        let function_type = self.denotes_function_type(&type_id);

        let mut expression = self.env.factory.new_type_id_expression(op, type_id);
        expression.span = self.rule_span(rule);

        let alternate = self.run_secondary_parser(SecondaryGrammar::Sizeof, rule);
        let expression = self.resolve_expression(expression, alternate, function_type);
        self.push(expression);
        Ok(())
    }

    /// A declaration statement whose specifier could also be an identifier.
    pub(super) fn consume_statement_declaration_with_disambiguation(
        &mut self,
        rule: RuleSpan,
    ) -> Result<(), ActionError> {
        let declaration = self.pop_declaration()?;
        let implicit_int = declaration.is_implicit_int();

        let alternate = match declaration.kind {
            DeclarationKind::Simple { .. } => {
                let last = self
                    .rule_tokens(rule)
                    .last()
                    .map_or(TokenKind::Eof, |token| self.kind_of(token));
                self.run_secondary_parser(SecondaryGrammar::Expression, without_terminator(rule, last))
            }
            _ => None,
        };
        let lone_identifier = self.is_lone_identifier(rule);
        let resolution = resolve_statement_ambiguity(alternate.as_ref(), lone_identifier, implicit_int);
        debug!(?resolution, start = rule.start, "statement ambiguity");

        let statement = match (resolution, alternate) {
            (Resolution::PreferAlternate, Some(expression)) => {
                let mut statement = self.env.factory.new_expression_statement(expression);
                statement.span = self.rule_span(rule);
                statement
            }
            (Resolution::Ambiguous, Some(expression)) => {
                self.register_names(&declaration);
                let declaration = self.declaration_statement(declaration, rule);
                let mut expression = self.env.factory.new_expression_statement(expression);
                expression.span = self.rule_span(rule);

                let mut statement = self
                    .env
                    .factory
                    .new_ambiguous_statement(vec![declaration, expression]);
                statement.span = self.rule_span(rule);
                statement
            }
            _ => {
                self.register_names(&declaration);
                self.declaration_statement(declaration, rule)
            }
        };
        self.push(statement);
        Ok(())
    }

    fn resolve_expression(
        &self,
        primary: Expression,
        alternate: Option<Expression>,
        function_type: bool,
    ) -> Expression {
        let resolution = resolve_type_id_ambiguity(alternate.is_some(), function_type);
        debug!(?resolution, "expression ambiguity");

        match (resolution, alternate) {
            (Resolution::PreferAlternate, Some(alternate)) => alternate,
            (Resolution::Ambiguous, Some(alternate)) => {
                let covered = span::covering([primary.span, alternate.span]).unwrap_or(primary.span);
                let mut ambiguous = self
                    .env
                    .factory
                    .new_ambiguous_expression(vec![primary, alternate]);
                ambiguous.span = covered;
                ambiguous
            }
            _ => primary,
        }
    }

    /// True when the type-id names a function type, either through its own
    /// declarator or through a typedef name declared as one.
    fn denotes_function_type(&self, type_id: &TypeId) -> bool {
        if type_id.declarator.is_function_type() {
            return true;
        }
        match &type_id.specifier.kind {
            DeclSpecifierKind::Named(name) if type_id.declarator.is_plain() => {
                self.ctx.names.is_function(&name.text)
            }
            _ => false,
        }
    }

    /// `identifier ;`, with the completion token standing in for either.
    fn is_lone_identifier(&self, rule: RuleSpan) -> bool {
        match self.rule_tokens(rule) {
            [first, second] => {
                matches!(
                    self.kind_of(first),
                    TokenKind::Identifier | TokenKind::Completion
                ) && matches!(
                    self.kind_of(second),
                    TokenKind::Semicolon | TokenKind::EndOfCompletion
                )
            }
            _ => false,
        }
    }

    /// Re-parses the rule's tokens under `grammar`. Problem results count as
    /// no alternate.
    pub(super) fn run_secondary_parser(&mut self, grammar: SecondaryGrammar, rule: RuleSpan) -> Option<Expression> {
        let tokens = self.rule_tokens(rule);
        if tokens.is_empty() {
            return None;
        }

        let env = self.env;
        let parser = match grammar {
            SecondaryGrammar::Expression => env.secondary.expression_parser(),
            SecondaryGrammar::NoCast => env.secondary.no_cast_expression_parser(),
            SecondaryGrammar::Sizeof => env.secondary.sizeof_expression_parser(),
        };

        let _span = debug_span!("secondary_parse", ?grammar, tokens = tokens.len()).entered();
        let result = parser
            .parse_secondary(tokens, env, &mut *self.ctx)
            .filter(|expression| !expression.is_problem());
        debug!(found = result.is_some(), "secondary parse finished");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call() -> Expression {
        Expression::new(ExpressionKind::FunctionCall {
            function: Box::new(Expression::new(ExpressionKind::Id(Name::new("f")))),
            argument: None,
        })
    }

    fn id() -> Expression {
        Expression::new(ExpressionKind::Id(Name::new("x")))
    }

    #[test]
    fn test_type_id_policy() {
        assert_eq!(resolve_type_id_ambiguity(false, true), Resolution::KeepPrimary);
        assert_eq!(resolve_type_id_ambiguity(false, false), Resolution::KeepPrimary);
        assert_eq!(resolve_type_id_ambiguity(true, true), Resolution::PreferAlternate);
        assert_eq!(resolve_type_id_ambiguity(true, false), Resolution::Ambiguous);
    }

    #[test]
    fn test_statement_policy_order() {
        assert_eq!(resolve_statement_ambiguity(None, true, true), Resolution::KeepPrimary);
        assert_eq!(
            resolve_statement_ambiguity(Some(&call()), false, false),
            Resolution::PreferAlternate
        );
        assert_eq!(
            resolve_statement_ambiguity(Some(&id()), true, false),
            Resolution::PreferAlternate
        );
        assert_eq!(
            resolve_statement_ambiguity(Some(&id()), false, true),
            Resolution::PreferAlternate
        );
        assert_eq!(
            resolve_statement_ambiguity(Some(&id()), false, false),
            Resolution::Ambiguous
        );
    }
}
