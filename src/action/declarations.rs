//! Declaration reductions
//!
//! Declarators are assembled inside out. A direct declarator starts as a
//! plain identifier (or an anonymous wrapper around a bracketed one), array
//! and function suffixes are folded onto it, and the pointer operators in
//! front of it are attached last.

use super::completion::CompletionContext;
use super::dispatch::ActionCore;
use super::errors::ActionError;
use super::expressions::is_name_free;
use super::names::NameInfo;
use super::span::RuleSpan;
use super::value::StackValue;
use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;

impl ActionCore<'_, '_> {
    /// Folds the keyword tokens, type name or tag specifier collected in the
    /// current scope into one specifier.
    pub(super) fn consume_declaration_specifiers(&mut self, rule: RuleSpan) -> Result<(), ActionError> {
        let items = self.close_scope()?;

        let mut simple = SimpleType::default();
        let mut kind = None;
        let mut storage = StorageClass::None;
        let (mut is_const, mut is_volatile, mut is_restrict, mut is_inline) = (false, false, false, false);

        for item in items {
            match item {
                StackValue::Token(index) => {
                    let token = self.token(index)?;
                    match self.kind_of(token) {
                        TokenKind::Typedef => storage = StorageClass::Typedef,
                        TokenKind::Extern => storage = StorageClass::Extern,
                        TokenKind::Static => storage = StorageClass::Static,
                        TokenKind::Auto => storage = StorageClass::Auto,
                        TokenKind::Register => storage = StorageClass::Register,
                        TokenKind::Const => is_const = true,
                        TokenKind::Volatile => is_volatile = true,
                        TokenKind::Restrict => is_restrict = true,
                        TokenKind::Inline => is_inline = true,
                        TokenKind::Void => simple.base = BaseType::Void,
                        TokenKind::Char => simple.base = BaseType::Char,
                        TokenKind::Int => simple.base = BaseType::Int,
                        TokenKind::Float => simple.base = BaseType::Float,
                        TokenKind::Double => simple.base = BaseType::Double,
                        TokenKind::Bool => simple.base = BaseType::Bool,
                        TokenKind::Short => simple.is_short = true,
                        TokenKind::Long => simple.long_count = simple.long_count.saturating_add(1),
                        TokenKind::Signed => simple.is_signed = true,
                        TokenKind::Unsigned => simple.is_unsigned = true,
                        _ => {}
                    }
                }
                StackValue::Name(name) => {
                    self.claim_name(&name, CompletionContext::TypeName);
                    kind = Some(DeclSpecifierKind::Named(name));
                }
                StackValue::DeclSpecifier(specifier) => kind = Some(specifier.kind),
                other => return Err(StackValue::unexpected("declaration specifier", &other)),
            }
        }

        let kind = kind.unwrap_or(DeclSpecifierKind::Simple(simple));
        let mut specifier = self.env.factory.new_decl_specifier(kind);
        specifier.storage = storage;
        specifier.is_const = is_const;
        specifier.is_volatile = is_volatile;
        specifier.is_restrict = is_restrict;
        specifier.is_inline = is_inline;
        specifier.span = self.rule_span(rule);
        self.push(specifier);
        Ok(())
    }

    /// `struct|union [name] { members }`; the members are in the current scope.
    pub(super) fn consume_type_specifier_composite(
        &mut self,
        has_name: bool,
        rule: RuleSpan,
    ) -> Result<(), ActionError> {
        let members = self
            .close_scope()?
            .into_iter()
            .map(StackValue::into_declaration)
            .collect::<Result<Vec<_>, _>>()?;
        let name = self.pop_tag_name(has_name)?;
        let key = match self.kind_of(self.left_token(rule)?) {
            TokenKind::Union => CompositeKey::Union,
            _ => CompositeKey::Struct,
        };

        let mut specifier = self
            .env
            .factory
            .new_decl_specifier(DeclSpecifierKind::Composite { key, name, members });
        specifier.span = self.rule_span(rule);
        self.push(specifier);
        Ok(())
    }

    pub(super) fn consume_type_specifier_elaborated(&mut self, rule: RuleSpan) -> Result<(), ActionError> {
        let name = self.pop_tag_name(true)?;
        let key = match self.kind_of(self.left_token(rule)?) {
            TokenKind::Union => ElaboratedKey::Union,
            TokenKind::Enum => ElaboratedKey::Enum,
            _ => ElaboratedKey::Struct,
        };

        let mut specifier = self
            .env
            .factory
            .new_decl_specifier(DeclSpecifierKind::Elaborated { key, name });
        specifier.span = self.rule_span(rule);
        self.push(specifier);
        Ok(())
    }

    pub(super) fn consume_type_specifier_enumeration(
        &mut self,
        has_name: bool,
        rule: RuleSpan,
    ) -> Result<(), ActionError> {
        let enumerators = self
            .close_scope()?
            .into_iter()
            .map(StackValue::into_enumerator)
            .collect::<Result<Vec<_>, _>>()?;
        let name = self.pop_tag_name(has_name)?;

        let mut specifier = self
            .env
            .factory
            .new_decl_specifier(DeclSpecifierKind::Enumeration { name, enumerators });
        specifier.span = self.rule_span(rule);
        self.push(specifier);
        Ok(())
    }

    fn pop_tag_name(&mut self, has_name: bool) -> Result<Name, ActionError> {
        if !has_name {
            return Ok(self.env.factory.new_anonymous_name());
        }
        let name = self.pop_name()?;
        self.claim_name(&name, CompletionContext::Tag);
        Ok(name)
    }

    pub(super) fn consume_enumerator(&mut self, has_value: bool, rule: RuleSpan) -> Result<(), ActionError> {
        let value = if has_value {
            Some(self.pop_expression()?)
        } else {
            None
        };
        let token = self.left_token(rule)?;
        let name = self.create_name(token);
        self.claim_name(&name, CompletionContext::Enumerator);

        let mut enumerator = self.env.factory.new_enumerator(name, value);
        enumerator.span = self.rule_span(rule);
        self.push(enumerator);
        Ok(())
    }

    /// `specifier [declarators] ;`. An empty marker in place of the
    /// specifier means the declaration had none (implicit int).
    pub(super) fn consume_declaration_simple(
        &mut self,
        has_declarators: bool,
        register_names: bool,
        rule: RuleSpan,
    ) -> Result<(), ActionError> {
        let declarators = if has_declarators {
            self.close_scope()?
                .into_iter()
                .map(StackValue::into_declarator)
                .collect::<Result<Vec<_>, _>>()?
        } else {
            Vec::new()
        };
        let specifier = self.pop_specifier_or_implicit_int(rule)?;

        let mut declaration = self
            .env
            .factory
            .new_simple_declaration(specifier, declarators);
        declaration.span = self.rule_span(rule);
        if register_names {
            self.register_names(&declaration);
        }
        self.push(declaration);
        Ok(())
    }

    fn pop_specifier_or_implicit_int(&mut self, rule: RuleSpan) -> Result<DeclSpecifier, ActionError> {
        match self.pop()? {
            StackValue::Empty => {
                let mut specifier = self
                    .env
                    .factory
                    .new_decl_specifier(DeclSpecifierKind::Simple(SimpleType::default()));
                specifier.span = self.rule_span(RuleSpan::new(rule.start, rule.start));
                Ok(specifier)
            }
            other => other.into_decl_specifier(),
        }
    }

    /// Moves the first declarator into a fresh scope that collects the rest
    /// of the list.
    pub(super) fn consume_declarator_list_start(&mut self) -> Result<(), ActionError> {
        let declarator = self.pop_declarator()?;
        self.stack.open_scope_with([StackValue::Declarator(declarator)]);
        Ok(())
    }

    pub(super) fn consume_direct_declarator_identifier(&mut self, rule: RuleSpan) -> Result<(), ActionError> {
        let token = self.left_token(rule)?;
        let name = self.create_name(token);
        self.claim_name(&name, CompletionContext::Declarator);
        let mut declarator = self.env.factory.new_declarator(name);
        declarator.span = self.rule_span(rule);
        self.push(declarator);
        Ok(())
    }

    pub(super) fn consume_direct_declarator_bracketed(&mut self, rule: RuleSpan) -> Result<(), ActionError> {
        let inner = self.pop_declarator()?;
        let mut declarator = self.anonymous_declarator(rule);
        declarator.nested = Some(Box::new(inner));
        self.push(declarator);
        Ok(())
    }

    pub(super) fn consume_direct_declarator_array_modifier(
        &mut self,
        has_size: bool,
        rule: RuleSpan,
    ) -> Result<(), ActionError> {
        let size = if has_size {
            Some(self.pop_expression()?)
        } else {
            None
        };
        let mut modifier = self.env.factory.new_array_modifier(size);
        modifier.span = self.rule_span(rule);
        self.push(modifier);
        Ok(())
    }

    pub(super) fn consume_direct_declarator_array_declarator(
        &mut self,
        has_declarator: bool,
        rule: RuleSpan,
    ) -> Result<(), ActionError> {
        let modifier = self.pop()?.into_array_modifier()?;
        let declarator = self.pop_declarator_or_anonymous(has_declarator, rule)?;

        let has_pointers = !declarator.pointers.is_empty();
        let mut declarator = match declarator.kind {
            DeclaratorKind::Array(mut modifiers) if !has_pointers => {
                modifiers.push(modifier);
                Declarator {
                    kind: DeclaratorKind::Array(modifiers),
                    ..declarator
                }
            }
            DeclaratorKind::Plain if !has_pointers => Declarator {
                kind: DeclaratorKind::Array(vec![modifier]),
                ..declarator
            },
            _ => self.wrap_declarator(declarator, DeclaratorKind::Array(vec![modifier]), rule),
        };
        declarator.span = self.rule_span(rule);
        self.push(declarator);
        Ok(())
    }

    /// The current scope holds parameter declarations, or bare identifiers
    /// for an old-style parameter list.
    pub(super) fn consume_direct_declarator_function(
        &mut self,
        has_declarator: bool,
        takes_varargs: bool,
        rule: RuleSpan,
    ) -> Result<(), ActionError> {
        let mut parameters = Vec::new();
        let mut identifiers = Vec::new();
        for item in self.close_scope()? {
            match item {
                StackValue::Parameter(parameter) => parameters.push(parameter),
                StackValue::Name(name) => identifiers.push(name),
                other => return Err(StackValue::unexpected("parameter", &other)),
            }
        }
        let function = DeclaratorKind::Function {
            parameters,
            identifiers,
            takes_varargs,
        };
        let declarator = self.pop_declarator_or_anonymous(has_declarator, rule)?;

        let mut declarator = match declarator.kind {
            // A plain identifier, or a bracketed declarator such as `(*fp)`
            // whose nested part stays where it is
            DeclaratorKind::Plain if declarator.pointers.is_empty() => Declarator {
                kind: function,
                ..declarator
            },
            _ => self.wrap_declarator(declarator, function, rule),
        };
        declarator.span = self.rule_span(rule);
        self.push(declarator);
        Ok(())
    }

    fn wrap_declarator(&self, inner: Declarator, kind: DeclaratorKind, rule: RuleSpan) -> Declarator {
        let mut declarator = self.anonymous_declarator(rule);
        declarator.nested = Some(Box::new(inner));
        declarator.kind = kind;
        declarator
    }

    fn anonymous_declarator(&self, rule: RuleSpan) -> Declarator {
        let mut declarator = self
            .env
            .factory
            .new_declarator(self.env.factory.new_anonymous_name());
        declarator.span = self.rule_span(rule);
        declarator
    }

    /// An abstract declarator is a zero-length name at the end of the rule.
    fn abstract_declarator(&self, rule: RuleSpan) -> Declarator {
        let offset = self.right_token(rule).map_or_else(
            |_| self.rule_span(rule).offset,
            |token| token.end,
        );
        let mut name = self.env.factory.new_anonymous_name();
        name.span = Span::new(offset, 0);
        let mut declarator = self.env.factory.new_declarator(name);
        declarator.span = Span::new(offset, 0);
        declarator
    }

    fn pop_declarator_or_anonymous(
        &mut self,
        has_declarator: bool,
        rule: RuleSpan,
    ) -> Result<Declarator, ActionError> {
        if has_declarator {
            self.pop_declarator()
        } else {
            Ok(self.anonymous_declarator(RuleSpan::new(rule.start, rule.start)))
        }
    }

    /// One `*` with its qualifiers; the qualifier tokens are in the current
    /// scope.
    pub(super) fn consume_pointer(&mut self, rule: RuleSpan) -> Result<(), ActionError> {
        let mut pointer = self.env.factory.new_pointer();
        for item in self.close_scope()? {
            let index = match item {
                StackValue::Token(index) => index,
                other => return Err(StackValue::unexpected("pointer qualifier", &other)),
            };
            match self.kind_of(self.token(index)?) {
                TokenKind::Const => pointer.is_const = true,
                TokenKind::Volatile => pointer.is_volatile = true,
                TokenKind::Restrict => pointer.is_restrict = true,
                _ => {}
            }
        }
        pointer.span = self.rule_span(rule);
        self.push(pointer);
        Ok(())
    }

    /// The pointers were collected in a scope opened before the declarator.
    pub(super) fn consume_declarator_with_pointer(
        &mut self,
        has_declarator: bool,
        rule: RuleSpan,
    ) -> Result<(), ActionError> {
        let mut declarator = if has_declarator {
            self.pop_declarator()?
        } else {
            self.abstract_declarator(rule)
        };
        let pointers = self
            .close_scope()?
            .into_iter()
            .map(StackValue::into_pointer)
            .collect::<Result<Vec<_>, _>>()?;

        declarator.pointers = pointers;
        declarator.span = self.rule_span(rule);
        self.push(declarator);
        Ok(())
    }

    pub(super) fn consume_declarator_with_initializer(
        &mut self,
        has_declarator: bool,
        rule: RuleSpan,
    ) -> Result<(), ActionError> {
        let initializer = match self.pop()? {
            StackValue::Empty => None,
            other => Some(other.into_initializer()?),
        };
        if !has_declarator {
            let mut declarator = self.abstract_declarator(RuleSpan::new(rule.start, rule.start));
            declarator.initializer = initializer;
            declarator.span = self.rule_span(rule);
            self.push(declarator);
            return Ok(());
        }

        let span = self.rule_span(rule);
        match self.stack.peek_mut()? {
            StackValue::Declarator(declarator) => {
                declarator.initializer = initializer;
                declarator.span = span;
                Ok(())
            }
            other => Err(StackValue::unexpected("declarator", other)),
        }
    }

    /// Inside an initializer list, literal-only expressions are dropped when
    /// trivial initializers are skipped.
    pub(super) fn consume_initializer(&mut self, rule: RuleSpan) -> Result<(), ActionError> {
        let expression = self.pop_expression()?;
        if self.env.options.skip_trivial_initializers
            && self.initializer_depth > 0
            && is_name_free(&expression)
        {
            self.push(StackValue::Empty);
            return Ok(());
        }

        let mut initializer = self.env.factory.new_initializer(expression);
        initializer.span = self.rule_span(rule);
        self.push(initializer);
        Ok(())
    }

    pub(super) fn consume_initializer_list(&mut self, rule: RuleSpan) -> Result<(), ActionError> {
        let initializers = self
            .close_scope()?
            .into_iter()
            .filter(|value| !value.is_empty_marker())
            .map(StackValue::into_initializer)
            .collect::<Result<Vec<_>, _>>()?;

        let mut initializer = self.env.factory.new_initializer_list(initializers);
        initializer.span = self.rule_span(rule);
        self.push(initializer);
        Ok(())
    }

    pub(super) fn consume_bit_field(&mut self, has_declarator: bool, rule: RuleSpan) -> Result<(), ActionError> {
        let bit_width = self.pop_expression()?;
        let mut declarator = if has_declarator {
            self.pop_declarator()?
        } else {
            self.abstract_declarator(RuleSpan::new(rule.start, rule.start))
        };
        declarator.kind = DeclaratorKind::Field { bit_width };
        declarator.span = self.rule_span(rule);
        self.push(declarator);
        Ok(())
    }

    pub(super) fn consume_parameter_declaration(&mut self, rule: RuleSpan) -> Result<(), ActionError> {
        let declarator = self.pop_declarator()?;
        let specifier = self.pop_decl_specifier()?;
        let mut parameter = self
            .env
            .factory
            .new_parameter_declaration(specifier, declarator);
        parameter.span = self.rule_span(rule);
        self.push(parameter);
        Ok(())
    }

    pub(super) fn consume_parameter_declaration_without_declarator(
        &mut self,
        rule: RuleSpan,
    ) -> Result<(), ActionError> {
        let specifier = self.pop_decl_specifier()?;
        let declarator = self.abstract_declarator(rule);
        let mut parameter = self
            .env
            .factory
            .new_parameter_declaration(specifier, declarator);
        parameter.span = self.rule_span(rule);
        self.push(parameter);
        Ok(())
    }

    pub(super) fn consume_type_id(&mut self, has_declarator: bool, rule: RuleSpan) -> Result<(), ActionError> {
        let declarator = if has_declarator {
            self.pop_declarator()?
        } else {
            self.abstract_declarator(rule)
        };
        let specifier = self.pop_decl_specifier()?;
        let mut type_id = self.env.factory.new_type_id(specifier, declarator);
        type_id.span = self.rule_span(rule);
        self.push(type_id);
        Ok(())
    }

    pub(super) fn consume_function_definition(&mut self, rule: RuleSpan) -> Result<(), ActionError> {
        let body = self.pop_statement()?;
        let declarator = self.pop_declarator()?;
        let specifier = self.pop_specifier_or_implicit_int(rule)?;

        let mut declaration = self
            .env
            .factory
            .new_function_definition(specifier, declarator, body);
        declaration.span = self.rule_span(rule);
        self.register_names(&declaration);
        self.push(declaration);
        Ok(())
    }

    pub(super) fn consume_declaration_problem(&mut self, rule: RuleSpan) {
        let problem = self.new_problem(rule);
        let mut declaration = self.env.factory.new_problem_declaration(problem);
        declaration.span = self.rule_span(rule);
        self.push(declaration);
    }

    /// Records the names a declaration introduces in the declared-name table.
    pub(super) fn register_names(&mut self, declaration: &Declaration) {
        match &declaration.kind {
            DeclarationKind::Simple {
                specifier,
                declarators,
            } => {
                for declarator in declarators {
                    let info = NameInfo {
                        is_typedef: specifier.is_typedef(),
                        is_function: declarator.is_function_type(),
                    };
                    self.ctx.names.declare(&declarator.innermost_name().text, info);
                }
            }
            DeclarationKind::FunctionDefinition { declarator, .. } => {
                let info = NameInfo {
                    is_typedef: false,
                    is_function: true,
                };
                self.ctx.names.declare(&declarator.innermost_name().text, info);
            }
            DeclarationKind::Problem(_) => {}
        }
    }
}
