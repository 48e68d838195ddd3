//! Reduction dispatcher
//!
//! The driving parser calls [`ActionCore::reduce`] once per grammar
//! reduction with a [`Production`] tag and the range of tokens the rule
//! covered. The operands of the rule are already on the AST stack, rightmost
//! symbol on top. Each action pops exactly its rule's operands, builds the
//! node through the [`NodeFactory`], stamps its span and pushes the result.
//!
//! The actions themselves are split across `impl ActionCore` blocks in the
//! sibling `expressions`, `statements`, `declarations` and `ambiguity`
//! modules.

use super::ambiguity::SecondaryParserFactory;
use super::completion::CompletionContext;
use super::context::ParseContext;
use super::errors::ActionError;
use super::factory::NodeFactory;
use super::names::NamesMark;
use super::span::{self, RuleSpan};
use super::stack::{ScopedStack, StackCheckpoint};
use super::value::StackValue;
use crate::options::ParserOptions;
use crate::parser::ast::*;
use crate::parser::lexer::{Token, TokenKind};
use crate::parser::symbols::TokenKindMap;
use crate::visit::{self, DeferredPass};
use tracing::{debug, trace};

/// Grammar rules the action core knows how to reduce.
///
/// Flags on a variant say which optional operands the rule had, so every
/// action knows its arity without inspecting the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Production {
    // Markers
    OpenScope,
    Empty,
    DeclSpecToken,
    IdentifierName,
    OpenSymbolScope,
    CloseSymbolScope,
    InitializerListStart,
    InitializerListEnd,
    TranslationUnit,

    // Expressions
    ExpressionLiteral(LiteralKind),
    ExpressionId,
    ExpressionBracketed,
    ExpressionList,
    ExpressionArraySubscript,
    ExpressionFunctionCall,
    ExpressionFieldReference { is_pointer: bool },
    ExpressionCast,
    ExpressionUnary(UnaryOp),
    ExpressionTypeId(TypeIdOp),
    ExpressionBinary(BinaryOp),
    ExpressionConditional,
    ExpressionProblem,

    // Statements
    StatementLabeled,
    StatementCase,
    StatementDefault,
    StatementNull,
    StatementExpression,
    StatementCompound { has_body: bool },
    StatementDoLoop,
    StatementWhileLoop,
    StatementForLoop,
    StatementIf { has_else: bool },
    StatementSwitch,
    StatementGoto,
    StatementContinue,
    StatementBreak,
    StatementReturn { has_value: bool },
    StatementDeclaration,
    StatementDeclarationWithDisambiguation,
    StatementProblem,

    // Declarations
    DeclarationSpecifiers,
    TypeSpecifierComposite { has_name: bool },
    TypeSpecifierElaborated,
    TypeSpecifierEnumeration { has_name: bool },
    Enumerator { has_value: bool },
    DeclarationSimple { has_declarators: bool, register_names: bool },
    DeclaratorListStart,
    DirectDeclaratorIdentifier,
    DirectDeclaratorBracketed,
    DirectDeclaratorArrayModifier { has_size: bool },
    DirectDeclaratorArrayDeclarator { has_declarator: bool },
    DirectDeclaratorFunction { has_declarator: bool, takes_varargs: bool },
    Pointer,
    DeclaratorWithPointer { has_declarator: bool },
    DeclaratorWithInitializer { has_declarator: bool },
    Initializer,
    InitializerList,
    BitField { has_declarator: bool },
    ParameterDeclaration,
    ParameterDeclarationWithoutDeclarator,
    TypeId { has_declarator: bool },
    FunctionDefinition,
    DeclarationProblem,
}

/// Collaborators shared by every parse invocation of one [`crate::Parser`].
#[derive(Clone, Copy)]
pub struct ActionEnv<'a> {
    pub factory: &'a dyn NodeFactory,
    pub secondary: &'a dyn SecondaryParserFactory,
    pub options: &'a ParserOptions,
    pub kinds: &'a TokenKindMap,
    pub deferred: Option<&'a dyn DeferredPass>,
}

/// Saved action state for undoing a failed speculative parse.
#[derive(Debug, Clone, Copy)]
pub struct CoreCheckpoint {
    stack: StackCheckpoint,
    completion_entries: Option<usize>,
    names: NamesMark,
    initializer_depth: usize,
}

pub struct ActionCore<'t, 'c> {
    pub(super) tokens: &'t [Token],
    pub(super) ctx: &'c mut ParseContext,
    pub(super) env: ActionEnv<'c>,
    pub(super) stack: ScopedStack<StackValue>,
    pub(super) initializer_depth: usize,
}

impl<'t, 'c> ActionCore<'t, 'c> {
    pub fn new(tokens: &'t [Token], ctx: &'c mut ParseContext, env: ActionEnv<'c>) -> Self {
        Self {
            tokens,
            ctx,
            env,
            stack: ScopedStack::new(),
            initializer_depth: 0,
        }
    }

    /// Runs the action for `production` over the tokens in `rule`.
    pub fn reduce(&mut self, production: Production, rule: RuleSpan) -> Result<(), ActionError> {
        trace!(?production, start = rule.start, end = rule.end, "reduce");

        match production {
            Production::OpenScope => self.stack.open_scope(),
            Production::Empty => self.stack.push(StackValue::Empty),
            Production::DeclSpecToken => self.consume_decl_spec_token(rule)?,
            Production::IdentifierName => self.consume_identifier_name(rule)?,
            Production::OpenSymbolScope => self.ctx.names.push_scope(),
            Production::CloseSymbolScope => self.ctx.names.pop_scope(),
            Production::InitializerListStart => self.initializer_depth += 1,
            Production::InitializerListEnd => {
                self.initializer_depth = self.initializer_depth.saturating_sub(1)
            }
            Production::TranslationUnit => self.consume_translation_unit()?,

            Production::ExpressionLiteral(kind) => self.consume_expression_literal(kind, rule)?,
            Production::ExpressionId => self.consume_expression_id(rule)?,
            Production::ExpressionBracketed => self.consume_expression_bracketed(rule)?,
            Production::ExpressionList => self.consume_expression_list(rule)?,
            Production::ExpressionArraySubscript => self.consume_expression_array_subscript(rule)?,
            Production::ExpressionFunctionCall => self.consume_expression_function_call(rule)?,
            Production::ExpressionFieldReference { is_pointer } => {
                self.consume_expression_field_reference(is_pointer, rule)?
            }
            Production::ExpressionCast => self.consume_expression_cast(rule)?,
            Production::ExpressionUnary(op) => self.consume_expression_unary(op, rule)?,
            Production::ExpressionTypeId(op) => self.consume_expression_type_id(op, rule)?,
            Production::ExpressionBinary(op) => self.consume_expression_binary(op, rule)?,
            Production::ExpressionConditional => self.consume_expression_conditional(rule)?,
            Production::ExpressionProblem => self.consume_expression_problem(rule),

            Production::StatementLabeled => self.consume_statement_labeled(rule)?,
            Production::StatementCase => self.consume_statement_case(rule)?,
            Production::StatementDefault => self.consume_statement_default(rule)?,
            Production::StatementNull => self.consume_statement_null(rule),
            Production::StatementExpression => self.consume_statement_expression(rule)?,
            Production::StatementCompound { has_body } => {
                self.consume_statement_compound(has_body, rule)?
            }
            Production::StatementDoLoop => self.consume_statement_do_loop(rule)?,
            Production::StatementWhileLoop => self.consume_statement_while_loop(rule)?,
            Production::StatementForLoop => self.consume_statement_for_loop(rule)?,
            Production::StatementIf { has_else } => self.consume_statement_if(has_else, rule)?,
            Production::StatementSwitch => self.consume_statement_switch(rule)?,
            Production::StatementGoto => self.consume_statement_goto(rule)?,
            Production::StatementContinue => self.consume_statement_continue(rule),
            Production::StatementBreak => self.consume_statement_break(rule),
            Production::StatementReturn { has_value } => {
                self.consume_statement_return(has_value, rule)?
            }
            Production::StatementDeclaration => self.consume_statement_declaration(rule)?,
            Production::StatementDeclarationWithDisambiguation => {
                self.consume_statement_declaration_with_disambiguation(rule)?
            }
            Production::StatementProblem => self.consume_statement_problem(rule),

            Production::DeclarationSpecifiers => self.consume_declaration_specifiers(rule)?,
            Production::TypeSpecifierComposite { has_name } => {
                self.consume_type_specifier_composite(has_name, rule)?
            }
            Production::TypeSpecifierElaborated => self.consume_type_specifier_elaborated(rule)?,
            Production::TypeSpecifierEnumeration { has_name } => {
                self.consume_type_specifier_enumeration(has_name, rule)?
            }
            Production::Enumerator { has_value } => self.consume_enumerator(has_value, rule)?,
            Production::DeclarationSimple {
                has_declarators,
                register_names,
            } => self.consume_declaration_simple(has_declarators, register_names, rule)?,
            Production::DeclaratorListStart => self.consume_declarator_list_start()?,
            Production::DirectDeclaratorIdentifier => {
                self.consume_direct_declarator_identifier(rule)?
            }
            Production::DirectDeclaratorBracketed => self.consume_direct_declarator_bracketed(rule)?,
            Production::DirectDeclaratorArrayModifier { has_size } => {
                self.consume_direct_declarator_array_modifier(has_size, rule)?
            }
            Production::DirectDeclaratorArrayDeclarator { has_declarator } => {
                self.consume_direct_declarator_array_declarator(has_declarator, rule)?
            }
            Production::DirectDeclaratorFunction {
                has_declarator,
                takes_varargs,
            } => self.consume_direct_declarator_function(has_declarator, takes_varargs, rule)?,
            Production::Pointer => self.consume_pointer(rule)?,
            Production::DeclaratorWithPointer { has_declarator } => {
                self.consume_declarator_with_pointer(has_declarator, rule)?
            }
            Production::DeclaratorWithInitializer { has_declarator } => {
                self.consume_declarator_with_initializer(has_declarator, rule)?
            }
            Production::Initializer => self.consume_initializer(rule)?,
            Production::InitializerList => self.consume_initializer_list(rule)?,
            Production::BitField { has_declarator } => self.consume_bit_field(has_declarator, rule)?,
            Production::ParameterDeclaration => self.consume_parameter_declaration(rule)?,
            Production::ParameterDeclarationWithoutDeclarator => {
                self.consume_parameter_declaration_without_declarator(rule)?
            }
            Production::TypeId { has_declarator } => self.consume_type_id(has_declarator, rule)?,
            Production::FunctionDefinition => self.consume_function_definition(rule)?,
            Production::DeclarationProblem => self.consume_declaration_problem(rule),
        }

        Ok(())
    }

    // ===== Shared state =====

    pub fn is_type_name(&self, text: &str) -> bool {
        self.ctx.names.is_type_name(text)
    }

    pub fn checkpoint(&self) -> CoreCheckpoint {
        CoreCheckpoint {
            stack: self.stack.checkpoint(),
            completion_entries: self.ctx.completion.as_ref().map(|c| c.len()),
            names: self.ctx.names.mark(),
            initializer_depth: self.initializer_depth,
        }
    }

    pub fn rollback(&mut self, checkpoint: CoreCheckpoint) {
        self.stack.rollback(checkpoint.stack);
        match checkpoint.completion_entries {
            Some(len) => {
                if let Some(completion) = self.ctx.completion.as_mut() {
                    completion.truncate(len);
                }
            }
            None => self.ctx.completion = None,
        }
        self.ctx.names.rewind(checkpoint.names);
        self.initializer_depth = checkpoint.initializer_depth;
    }

    /// Pops the expression a restricted-grammar parse left behind.
    pub fn take_expression(&mut self) -> Result<Expression, ActionError> {
        self.pop_expression()
    }

    // ===== Tokens and spans =====

    pub(super) fn rule_tokens(&self, rule: RuleSpan) -> &'t [Token] {
        rule.tokens(self.tokens)
    }

    pub(super) fn rule_span(&self, rule: RuleSpan) -> Span {
        span::rule_span(self.tokens, rule)
    }

    pub(super) fn token(&self, index: usize) -> Result<&'t Token, ActionError> {
        self.tokens.get(index).ok_or(ActionError::TokenOutOfRange {
            index,
            len: self.tokens.len(),
        })
    }

    pub(super) fn left_token(&self, rule: RuleSpan) -> Result<&'t Token, ActionError> {
        self.token(rule.start)
    }

    pub(super) fn right_token(&self, rule: RuleSpan) -> Result<&'t Token, ActionError> {
        let tokens = self.rule_tokens(rule);
        tokens.last().ok_or(ActionError::TokenOutOfRange {
            index: rule.end.saturating_sub(1),
            len: self.tokens.len(),
        })
    }

    pub(super) fn kind_of(&self, token: &Token) -> TokenKind {
        self.env.kinds.map(token.kind)
    }

    // ===== Names =====

    /// Builds a name from `token`, registering it for completion when the
    /// token is the completion token.
    pub(super) fn create_name(&mut self, token: &Token) -> Name {
        let mut name = self.env.factory.new_name(&token.text);
        name.span = span::token_span(token);
        if self.kind_of(token) == TokenKind::Completion {
            self.ctx.add_completion_name(&name, &token.text);
        }
        name
    }

    /// Records that a parent node consumed `name` in the given role.
    pub(super) fn claim_name(&mut self, name: &Name, context: CompletionContext) {
        self.ctx.claim_completion_name(name, context);
    }

    fn consume_identifier_name(&mut self, rule: RuleSpan) -> Result<(), ActionError> {
        let token = self.right_token(rule)?;
        let name = self.create_name(token);
        self.push(name);
        Ok(())
    }

    fn consume_decl_spec_token(&mut self, rule: RuleSpan) -> Result<(), ActionError> {
        let index = rule.end.saturating_sub(1);
        self.token(index)?;
        self.stack.push(StackValue::Token(index));
        Ok(())
    }

    // ===== Stack access =====

    pub(super) fn push(&mut self, value: impl Into<StackValue>) {
        self.stack.push(value.into());
    }

    pub(super) fn pop(&mut self) -> Result<StackValue, ActionError> {
        Ok(self.stack.pop()?)
    }

    pub(super) fn pop_expression(&mut self) -> Result<Expression, ActionError> {
        self.pop()?.into_expression()
    }

    /// Pops an expression, or the empty marker standing in for a missing one.
    pub(super) fn pop_optional_expression(&mut self) -> Result<Option<Expression>, ActionError> {
        match self.pop()? {
            StackValue::Empty => Ok(None),
            value => value.into_expression().map(Some),
        }
    }

    pub(super) fn pop_statement(&mut self) -> Result<Statement, ActionError> {
        self.pop()?.into_statement()
    }

    pub(super) fn pop_declaration(&mut self) -> Result<Declaration, ActionError> {
        self.pop()?.into_declaration()
    }

    pub(super) fn pop_name(&mut self) -> Result<Name, ActionError> {
        self.pop()?.into_name()
    }

    pub(super) fn pop_declarator(&mut self) -> Result<Declarator, ActionError> {
        self.pop()?.into_declarator()
    }

    pub(super) fn pop_type_id(&mut self) -> Result<TypeId, ActionError> {
        self.pop()?.into_type_id()
    }

    pub(super) fn pop_decl_specifier(&mut self) -> Result<DeclSpecifier, ActionError> {
        self.pop()?.into_decl_specifier()
    }

    pub(super) fn close_scope(&mut self) -> Result<Vec<StackValue>, ActionError> {
        Ok(self.stack.close_scope()?)
    }

    // ===== Problems =====

    pub(super) fn new_problem(&self, rule: RuleSpan) -> Problem {
        let mut problem = self.env.factory.new_problem(ProblemId::SyntaxError);
        problem.span = self.rule_span(rule);
        problem
    }

    // ===== Finalization =====

    /// Moves the outermost scope into the translation unit, runs the
    /// deferred pass and freezes the unit.
    fn consume_translation_unit(&mut self) -> Result<(), ActionError> {
        if self.ctx.unit.is_frozen() {
            return Err(ActionError::FrozenUnit);
        }
        if self.stack.depth() != 1 {
            return Err(ActionError::UnbalancedScopes {
                open: self.stack.depth() - 1,
            });
        }

        for value in self.stack.drain_top_scope() {
            let declaration = value.into_declaration()?;
            self.ctx.unit.push_declaration(declaration);
        }

        let end = self
            .ctx
            .unit
            .declarations()
            .last()
            .map_or(0, |declaration| declaration.span.end());
        self.ctx.unit.span = Span::between(0, end);

        if let Some(pass) = self.env.deferred {
            pass.resolve(&mut self.ctx.unit);
        }

        debug!(
            declarations = self.ctx.unit.declarations().len(),
            ambiguities = visit::count_ambiguities(&self.ctx.unit),
            problems = visit::count_problems(&self.ctx.unit),
            "translation unit finalized"
        );

        self.ctx.unit.freeze();
        Ok(())
    }
}
