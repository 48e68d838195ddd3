//! Main parser coordinator
//!
//! This module provides the public [`Parser`] and the [`Driver`] that walks
//! the token stream and reports every grammar reduction to the action core.
//!
//! # Parser Architecture
//!
//! The driver uses recursive descent with precedence climbing. It never
//! builds nodes itself; it only decides which rule applies and hands the
//! rule's [`Production`] and token range to [`ActionCore::reduce`].
//! - This module: error type, driver state, helpers, speculation, recovery
//! - `declarations`: specifiers, declarators, initializers
//! - `statements`: statements and the top-level loop
//! - `expressions`: expressions with precedence climbing
//!
//! # Speculation
//!
//! Where C needs unbounded lookahead (a cast, a declaration statement, a
//! `sizeof` operand), the driver tries one reading and rolls back the token
//! position, the AST stack, the completion entries and the declared-name
//! table if it hits a syntax error.
//!
//! # Implementation
//!
//! Driver methods are split across multiple files using `impl Driver` blocks,
//! allowing each module to extend the driver with related rules while
//! keeping access to the shared state.

use crate::action::ambiguity::SecondaryParserFactory;
use crate::action::context::{ParseContext, ParseOutcome};
use crate::action::dispatch::{ActionCore, ActionEnv, Production};
use crate::action::errors::ActionError;
use crate::action::factory::{node_factory, NodeFactory};
use crate::action::span::RuleSpan;
use crate::action::CompletionNode;
use crate::options::ParserOptions;
use crate::parser::ast::Expression;
use crate::parser::lexer::{LexError, Lexer, Token, TokenKind};
use crate::parser::secondary::RestrictedGrammars;
use crate::parser::symbols::TokenKindMap;
use crate::visit::DeferredPass;
use thiserror::Error;
use tracing::{debug, info_span};

/// Parser error type
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("syntax error at offset {offset}: {message}")]
    Syntax { message: String, offset: usize },

    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Action(#[from] ActionError),

    #[error("invalid parser options: {0}")]
    InvalidOptions(String),
}

impl ParseError {
    pub fn is_syntax(&self) -> bool {
        matches!(self, ParseError::Syntax { .. })
    }
}

/// Grammar variant a driver recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    TranslationUnit,
    Expression,
    /// Expressions without cast productions.
    NoCastExpression,
    /// Expressions where `sizeof` and `typeid` never take a type-id.
    SizeofExpression,
}

impl Grammar {
    pub fn recognizes_casts(self) -> bool {
        !matches!(self, Grammar::NoCastExpression)
    }

    pub fn recognizes_type_id_operands(self) -> bool {
        !matches!(self, Grammar::SizeofExpression)
    }
}

/// Result of parsing the whole input as one expression.
#[derive(Debug, Clone)]
pub struct ExpressionOutcome {
    pub expression: Expression,
    pub completion: Option<CompletionNode>,
}

/// Front end for one source text.
///
/// The source is lexed once; every parse call builds a fresh tree over the
/// same tokens.
pub struct Parser {
    tokens: Vec<Token>,
    options: ParserOptions,
    kinds: TokenKindMap,
    factory: Box<dyn NodeFactory>,
    secondary: Box<dyn SecondaryParserFactory>,
    deferred: Option<Box<dyn DeferredPass>>,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, ParseError> {
        Self::with_options(source, ParserOptions::default())
    }

    pub fn with_options(source: &str, options: ParserOptions) -> Result<Self, ParseError> {
        options.validate(source.len())?;

        let symbols = options.symbol_table();
        let tokens = Lexer::new(source, symbols)
            .with_completion_offset(options.completion_offset)
            .tokenize()?;
        let kinds = TokenKindMap::new(symbols, options.base_symbol_table());
        debug!(
            tokens = tokens.len(),
            symbols = symbols.name(),
            identity_kinds = kinds.is_identity(),
            "lexed source"
        );

        Ok(Self {
            tokens,
            factory: node_factory(options.dialect),
            secondary: Box::new(RestrictedGrammars::default()),
            deferred: None,
            kinds,
            options,
        })
    }

    /// Replaces the restricted-grammar parsers used for ambiguity checks.
    pub fn with_secondary_parsers(mut self, secondary: Box<dyn SecondaryParserFactory>) -> Self {
        self.secondary = secondary;
        self
    }

    /// Installs the pass run over the finished unit before it is frozen.
    pub fn with_deferred_pass(mut self, pass: Box<dyn DeferredPass>) -> Self {
        self.deferred = Some(pass);
        self
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    fn env(&self) -> ActionEnv<'_> {
        ActionEnv {
            factory: self.factory.as_ref(),
            secondary: self.secondary.as_ref(),
            options: &self.options,
            kinds: &self.kinds,
            deferred: self.deferred.as_deref(),
        }
    }

    /// Parse the entire input as a translation unit.
    pub fn parse_translation_unit(&self) -> Result<ParseOutcome, ParseError> {
        let _span = info_span!("parse", dialect = self.options.dialect.name()).entered();
        let mut ctx = ParseContext::new(self.factory.new_translation_unit())?;
        Driver::new(&self.tokens, Grammar::TranslationUnit, self.env(), &mut ctx).translation_unit()?;
        Ok(ctx.finish())
    }

    /// Parse the entire input as one expression. Input that is not an
    /// expression yields a problem expression.
    pub fn parse_expression(&self) -> Result<ExpressionOutcome, ParseError> {
        let _span = info_span!("parse_expression", dialect = self.options.dialect.name()).entered();
        let mut ctx = ParseContext::new(self.factory.new_translation_unit())?;
        let expression =
            Driver::new(&self.tokens, Grammar::Expression, self.env(), &mut ctx).expression_or_problem()?;
        let outcome = ctx.finish();
        Ok(ExpressionOutcome {
            expression,
            completion: outcome.completion,
        })
    }
}

/// Recursive descent driver over one token range
pub(crate) struct Driver<'t, 'c> {
    pub(crate) tokens: &'t [Token],
    pub(crate) position: usize,
    pub(crate) grammar: Grammar,
    pub(crate) env: ActionEnv<'c>,
    pub(crate) core: ActionCore<'t, 'c>,
}

impl<'t, 'c> Driver<'t, 'c> {
    pub(crate) fn new(
        tokens: &'t [Token],
        grammar: Grammar,
        env: ActionEnv<'c>,
        ctx: &'c mut ParseContext,
    ) -> Self {
        Self {
            tokens,
            position: 0,
            grammar,
            env,
            core: ActionCore::new(tokens, ctx, env),
        }
    }

    /// Parse the tokens as exactly one expression.
    pub(crate) fn expression_root(&mut self) -> Result<Expression, ParseError> {
        self.expression()?;
        if !self.at_end() {
            return Err(self.syntax_error("end of expression"));
        }
        Ok(self.core.take_expression()?)
    }

    pub(crate) fn expression_or_problem(&mut self) -> Result<Expression, ParseError> {
        if let Some(expression) = self.speculate(Self::expression_root)? {
            return Ok(expression);
        }
        let end = self
            .tokens
            .iter()
            .rposition(|token| token.kind != TokenKind::Eof)
            .map_or(0, |index| index + 1);
        self.core
            .reduce(Production::ExpressionProblem, RuleSpan::new(0, end))?;
        Ok(self.core.take_expression()?)
    }

    // ===== Reductions =====

    /// Reduce a rule that started at token `start` and ends here.
    pub(crate) fn reduce(&mut self, production: Production, start: usize) -> Result<(), ParseError> {
        self.core
            .reduce(production, RuleSpan::new(start, self.position))?;
        Ok(())
    }

    /// Reduce a marker rule that covers no tokens.
    pub(crate) fn mark(&mut self, production: Production) -> Result<(), ParseError> {
        self.reduce(production, self.position)
    }

    /// Consume the current token and reduce a rule covering only it.
    pub(crate) fn reduce_token(&mut self, production: Production) -> Result<(), ParseError> {
        let start = self.position;
        self.advance();
        self.reduce(production, start)
    }

    /// Run `rule`, undoing everything it did if it hits a syntax error.
    pub(crate) fn speculate<T>(
        &mut self,
        rule: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<Option<T>, ParseError> {
        let position = self.position;
        let checkpoint = self.core.checkpoint();
        match rule(self) {
            Ok(value) => Ok(Some(value)),
            Err(ParseError::Syntax { .. }) => {
                self.position = position;
                self.core.rollback(checkpoint);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    // ===== Helper methods =====

    pub(crate) fn kind_at(&self, index: usize) -> TokenKind {
        self.tokens
            .get(index)
            .map_or(TokenKind::Eof, |token| self.env.kinds.map(token.kind))
    }

    pub(crate) fn kind(&self) -> TokenKind {
        self.kind_at(self.position)
    }

    pub(crate) fn peek_kind(&self, n: usize) -> TokenKind {
        self.kind_at(self.position + n)
    }

    pub(crate) fn current(&self) -> Option<&'t Token> {
        self.tokens.get(self.position)
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    /// No more input: end of file, or the completion caret.
    pub(crate) fn at_end(&self) -> bool {
        matches!(self.kind(), TokenKind::Eof | TokenKind::EndOfCompletion)
    }

    /// Everything after the completion caret counts as closed.
    fn past_completion(&self) -> bool {
        self.kind() == TokenKind::EndOfCompletion
            || (self.position > 0 && self.kind_at(self.position - 1) == TokenKind::EndOfCompletion)
    }

    /// Whether a closing `kind` is next, or implied by the completion caret.
    pub(crate) fn at_closer(&self, kind: TokenKind) -> bool {
        self.check(kind) || self.past_completion()
    }

    pub(crate) fn expect(&mut self, kind: TokenKind, context: &str) -> Result<(), ParseError> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.syntax_error(&format!("'{kind}' {context}")))
        }
    }

    /// Like [`Driver::expect`], but the end-of-completion token closes any
    /// number of open constructs.
    pub(crate) fn expect_closer(&mut self, kind: TokenKind, context: &str) -> Result<(), ParseError> {
        if self.eat(kind) || self.eat(TokenKind::EndOfCompletion) || self.past_completion() {
            Ok(())
        } else {
            Err(self.syntax_error(&format!("'{kind}' {context}")))
        }
    }

    pub(crate) fn check_identifier(&self) -> bool {
        matches!(self.kind(), TokenKind::Identifier | TokenKind::Completion)
    }

    pub(crate) fn expect_identifier(&mut self, context: &str) -> Result<(), ParseError> {
        if self.check_identifier() {
            self.advance();
            Ok(())
        } else {
            Err(self.syntax_error(&format!("identifier {context}")))
        }
    }

    /// Whether the token at `index` is an identifier currently naming a type.
    pub(crate) fn is_type_name_at(&self, index: usize) -> bool {
        self.kind_at(index) == TokenKind::Identifier
            && self
                .tokens
                .get(index)
                .is_some_and(|token| self.core.is_type_name(&token.text))
    }

    pub(crate) fn syntax_error(&self, expected: &str) -> ParseError {
        let (found, offset) = match self.current() {
            Some(token) => (token.kind.to_string(), token.offset),
            None => (
                TokenKind::Eof.to_string(),
                self.tokens.last().map_or(0, |token| token.end),
            ),
        };
        ParseError::Syntax {
            message: format!("expected {expected}, found {found}"),
            offset,
        }
    }

    // ===== Recovery =====

    /// Skip to a point where parsing can resume: past the next `;` at brace
    /// depth zero, or past the block that closes. Inside a block, a `}` at
    /// depth zero is left for the block to consume.
    pub(crate) fn synchronize(&mut self, in_block: bool) {
        let start = self.position;
        let mut depth = 0usize;

        while !self.at_end() {
            match self.kind() {
                TokenKind::Semicolon if depth == 0 => {
                    self.advance();
                    return;
                }
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace if depth == 0 => {
                    if !in_block || self.position == start {
                        self.advance();
                    }
                    return;
                }
                TokenKind::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        self.advance();
                        return;
                    }
                }
                _ => {}
            }
            self.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Dialect;
    use crate::parser::ast::*;

    fn parse(source: &str) -> ParseOutcome {
        Parser::new(source).unwrap().parse_translation_unit().unwrap()
    }

    #[test]
    fn test_simple_declarations() {
        let outcome = parse("int x, *y; char c = 'a';");
        let unit = &outcome.unit;

        assert_eq!(unit.declarations().len(), 2);
        assert!(unit.is_frozen());
        match &unit.declarations()[0].kind {
            DeclarationKind::Simple { declarators, .. } => {
                assert_eq!(declarators.len(), 2);
                assert_eq!(declarators[1].name.text, "y");
                assert_eq!(declarators[1].pointers.len(), 1);
            }
            other => panic!("expected simple declaration, got {other:?}"),
        }
    }

    #[test]
    fn test_translation_unit_span() {
        let outcome = parse("int x;  ");
        assert_eq!(outcome.unit.span, Span::new(0, 6));

        let empty = parse("   ");
        assert_eq!(empty.unit.span, Span::new(0, 0));
    }

    #[test]
    fn test_function_definition() {
        let outcome = parse("int main(void) { return 0; }");
        match &outcome.unit.declarations()[0].kind {
            DeclarationKind::FunctionDefinition { declarator, body, .. } => {
                assert_eq!(declarator.name.text, "main");
                assert!(declarator.is_function_type());
                assert!(matches!(&body.kind, StatementKind::Compound(statements) if statements.len() == 1));
            }
            other => panic!("expected function definition, got {other:?}"),
        }
    }

    #[test]
    fn test_implicit_int_only_in_c() {
        let c = parse("main() { }");
        assert!(matches!(
            c.unit.declarations()[0].kind,
            DeclarationKind::FunctionDefinition { .. }
        ));
        assert!(c.unit.declarations()[0].is_implicit_int());

        let options = ParserOptions::new(Dialect::Cpp);
        let cpp = Parser::with_options("main() { }", options)
            .unwrap()
            .parse_translation_unit()
            .unwrap();
        assert!(matches!(
            cpp.unit.declarations()[0].kind,
            DeclarationKind::Problem(_)
        ));
    }

    #[test]
    fn test_recovery_produces_problem_declaration() {
        let outcome = parse("int x = ; int y;");
        let declarations = outcome.unit.declarations();

        assert_eq!(declarations.len(), 2);
        match &declarations[0].kind {
            DeclarationKind::Problem(problem) => {
                assert_eq!(problem.id, ProblemId::SyntaxError);
                assert!(problem.text.is_empty());
                assert_eq!(problem.span, Span::new(0, 9));
            }
            other => panic!("expected problem, got {other:?}"),
        }
        assert!(matches!(declarations[1].kind, DeclarationKind::Simple { .. }));
    }

    #[test]
    fn test_parse_expression_problem() {
        let parser = Parser::new("1 + ").unwrap();
        let outcome = parser.parse_expression().unwrap();
        assert!(outcome.expression.is_problem());
        assert_eq!(outcome.expression.span, Span::new(0, 3));
    }

    #[test]
    fn test_invalid_completion_offset() {
        let options = ParserOptions::default().with_completion_offset(99);
        assert!(matches!(
            Parser::with_options("x", options),
            Err(ParseError::InvalidOptions(_))
        ));
    }
}
