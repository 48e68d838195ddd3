//! Declaration parsing implementation
//!
//! This module handles declarations in all their positions:
//!
//! - Top-level declarations and function definitions
//! - Declaration statements and struct members
//! - Declaration specifiers: keywords, typedef names, `struct`/`union`/`enum`
//! - Declarators: pointers, nested declarators, array and function suffixes
//! - Parameters, type-ids and initializers
//!
//! # Grammar
//!
//! ```text
//! declaration ::= specifiers [init_declarator ("," init_declarator)*] ";"
//! function_def ::= specifiers declarator compound
//! declarator  ::= pointer* direct_declarator
//! direct_declarator ::= (identifier | "(" declarator ")") suffix*
//! suffix      ::= "[" [expression] "]" | "(" parameters ")"
//! ```
//!
//! Abstract declarators (in type-ids and parameters) use the same rules with
//! the identifier optional.

use crate::action::dispatch::Production;
use crate::options::Dialect;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{Driver, ParseError};

/// Keywords that may appear in declaration specifiers.
fn is_specifier_keyword(kind: TokenKind) -> bool {
    is_storage_class(kind) || is_qualifier(kind) || is_type_keyword(kind) || kind == TokenKind::Inline
}

fn is_storage_class(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Typedef | TokenKind::Extern | TokenKind::Static | TokenKind::Auto | TokenKind::Register
    )
}

fn is_qualifier(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::Const | TokenKind::Volatile | TokenKind::Restrict)
}

fn is_type_keyword(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Void
            | TokenKind::Char
            | TokenKind::Short
            | TokenKind::Int
            | TokenKind::Long
            | TokenKind::Float
            | TokenKind::Double
            | TokenKind::Signed
            | TokenKind::Unsigned
            | TokenKind::Bool
    )
}

fn is_tag_keyword(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::Struct | TokenKind::Union | TokenKind::Enum)
}

impl Driver<'_, '_> {
    // ===== Lookahead =====

    pub(crate) fn starts_declaration_keyword(&self) -> bool {
        let kind = self.kind();
        is_specifier_keyword(kind) || is_tag_keyword(kind)
    }

    fn starts_declaration_specifier(&self) -> bool {
        self.starts_declaration_keyword()
            || self.check(TokenKind::Completion)
            || self.is_type_name_at(self.position)
    }

    /// Whether a type-id can start at `index`. The completion token never
    /// starts one.
    pub(crate) fn starts_type_id_at(&self, index: usize) -> bool {
        let kind = self.kind_at(index);
        is_type_keyword(kind) || is_qualifier(kind) || is_tag_keyword(kind) || self.is_type_name_at(index)
    }

    // ===== Declarations =====

    /// Top-level declaration or function definition
    pub(crate) fn external_declaration(&mut self) -> Result<(), ParseError> {
        let start = self.position;
        let has_specifier = self.specifiers_or_implicit_int()?;
        if has_specifier && self.at_closer(TokenKind::Semicolon) {
            self.expect_closer(TokenKind::Semicolon, "after declaration")?;
            return self.reduce(
                Production::DeclarationSimple {
                    has_declarators: false,
                    register_names: true,
                },
                start,
            );
        }

        let declarator_start = self.position;
        self.declarator()?;
        if self.check(TokenKind::LBrace) {
            self.compound_statement()?;
            return self.reduce(Production::FunctionDefinition, start);
        }

        self.initializer_clause(declarator_start)?;
        self.declarator_list_rest()?;
        self.reduce(
            Production::DeclarationSimple {
                has_declarators: true,
                register_names: true,
            },
            start,
        )
    }

    /// Declaration inside a block. Speculative declarations do not register
    /// their names; the disambiguation step does once the declaration wins.
    pub(crate) fn declaration(&mut self, register_names: bool) -> Result<(), ParseError> {
        let start = self.position;
        let has_specifier = self.specifiers_or_implicit_int()?;
        if has_specifier && self.at_closer(TokenKind::Semicolon) {
            self.expect_closer(TokenKind::Semicolon, "after declaration")?;
            return self.reduce(
                Production::DeclarationSimple {
                    has_declarators: false,
                    register_names,
                },
                start,
            );
        }

        self.init_declarator()?;
        self.declarator_list_rest()?;
        self.reduce(
            Production::DeclarationSimple {
                has_declarators: true,
                register_names,
            },
            start,
        )
    }

    fn specifiers_or_implicit_int(&mut self) -> Result<bool, ParseError> {
        let has_specifier = self.declaration_specifiers()?;
        if !has_specifier && !self.env.options.dialect.allows_implicit_int() {
            return Err(self.syntax_error("declaration specifier"));
        }
        Ok(has_specifier)
    }

    /// The first declarator is on the stack; collect the rest and the `;`.
    fn declarator_list_rest(&mut self) -> Result<(), ParseError> {
        self.mark(Production::DeclaratorListStart)?;
        while self.eat(TokenKind::Comma) {
            self.init_declarator()?;
        }
        self.expect_closer(TokenKind::Semicolon, "after declaration")
    }

    fn init_declarator(&mut self) -> Result<(), ParseError> {
        let start = self.position;
        self.declarator()?;
        self.initializer_clause(start)
    }

    fn initializer_clause(&mut self, declarator_start: usize) -> Result<(), ParseError> {
        if self.eat(TokenKind::Eq) {
            self.initializer()?;
            self.reduce(
                Production::DeclaratorWithInitializer { has_declarator: true },
                declarator_start,
            )?;
        }
        Ok(())
    }

    /// Parse declaration specifiers. Returns `false`, leaving the empty
    /// marker, when there are none.
    pub(crate) fn declaration_specifiers(&mut self) -> Result<bool, ParseError> {
        let start = self.position;
        if !self.starts_declaration_specifier() {
            self.mark(Production::Empty)?;
            return Ok(false);
        }

        self.mark(Production::OpenScope)?;
        let mut seen_type = false;
        loop {
            let kind = self.kind();
            if is_specifier_keyword(kind) {
                seen_type |= is_type_keyword(kind);
                self.reduce_token(Production::DeclSpecToken)?;
            } else if is_tag_keyword(kind) && !seen_type {
                if kind == TokenKind::Enum {
                    self.enum_specifier()?;
                } else {
                    self.composite_specifier()?;
                }
                seen_type = true;
            } else if !seen_type
                && (kind == TokenKind::Completion || self.is_type_name_at(self.position))
            {
                self.reduce_token(Production::IdentifierName)?;
                seen_type = true;
            } else {
                break;
            }
        }

        self.reduce(Production::DeclarationSpecifiers, start)?;
        Ok(true)
    }

    /// Reduce an optional tag name; returns whether there was one.
    fn tag_name(&mut self) -> Result<bool, ParseError> {
        if self.check_identifier() {
            self.reduce_token(Production::IdentifierName)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// `struct`/`union`, with or without a member list
    fn composite_specifier(&mut self) -> Result<(), ParseError> {
        let start = self.position;
        self.advance();
        let has_name = self.tag_name()?;

        if !self.eat(TokenKind::LBrace) {
            if !has_name {
                return Err(self.syntax_error("tag name or '{'"));
            }
            return self.reduce(Production::TypeSpecifierElaborated, start);
        }

        self.mark(Production::OpenScope)?;
        while !self.at_closer(TokenKind::RBrace) && !self.at_end() {
            self.member_declaration()?;
        }
        self.expect_closer(TokenKind::RBrace, "to close member list")?;
        self.reduce(Production::TypeSpecifierComposite { has_name }, start)
    }

    fn member_declaration(&mut self) -> Result<(), ParseError> {
        let start = self.position;
        if !self.declaration_specifiers()? {
            return Err(self.syntax_error("member type"));
        }
        if self.at_closer(TokenKind::Semicolon) {
            self.expect_closer(TokenKind::Semicolon, "after member")?;
            return self.reduce(
                Production::DeclarationSimple {
                    has_declarators: false,
                    register_names: false,
                },
                start,
            );
        }

        self.member_declarator()?;
        self.mark(Production::DeclaratorListStart)?;
        while self.eat(TokenKind::Comma) {
            self.member_declarator()?;
        }
        self.expect_closer(TokenKind::Semicolon, "after member")?;
        self.reduce(
            Production::DeclarationSimple {
                has_declarators: true,
                register_names: false,
            },
            start,
        )
    }

    /// Declarator with an optional bit-field width
    fn member_declarator(&mut self) -> Result<(), ParseError> {
        let start = self.position;
        let has_declarator = !self.check(TokenKind::Colon);
        if has_declarator {
            self.declarator()?;
        }

        if self.eat(TokenKind::Colon) {
            self.conditional_expression()?;
            self.reduce(Production::BitField { has_declarator }, start)?;
        }
        Ok(())
    }

    fn enum_specifier(&mut self) -> Result<(), ParseError> {
        let start = self.position;
        self.advance();
        let has_name = self.tag_name()?;

        if !self.eat(TokenKind::LBrace) {
            if !has_name {
                return Err(self.syntax_error("enum name or '{'"));
            }
            return self.reduce(Production::TypeSpecifierElaborated, start);
        }

        self.mark(Production::OpenScope)?;
        while !self.at_closer(TokenKind::RBrace) {
            let enumerator_start = self.position;
            self.expect_identifier("in enumerator list")?;
            let has_value = self.eat(TokenKind::Eq);
            if has_value {
                self.conditional_expression()?;
            }
            self.reduce(Production::Enumerator { has_value }, enumerator_start)?;

            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect_closer(TokenKind::RBrace, "to close enumerator list")?;
        self.reduce(Production::TypeSpecifierEnumeration { has_name }, start)
    }

    // ===== Declarators =====

    /// Concrete declarator: the identifier is required.
    pub(crate) fn declarator(&mut self) -> Result<(), ParseError> {
        let start = self.position;
        if !self.check(TokenKind::Star) {
            return self.direct_declarator();
        }

        self.mark(Production::OpenScope)?;
        self.pointers()?;
        self.direct_declarator()?;
        self.reduce(Production::DeclaratorWithPointer { has_declarator: true }, start)
    }

    /// Each `*` and its qualifiers become one pointer operator in the
    /// current scope.
    fn pointers(&mut self) -> Result<(), ParseError> {
        while self.check(TokenKind::Star) {
            let start = self.position;
            self.advance();
            self.mark(Production::OpenScope)?;
            while is_qualifier(self.kind()) {
                self.reduce_token(Production::DeclSpecToken)?;
            }
            self.reduce(Production::Pointer, start)?;
        }
        Ok(())
    }

    fn direct_declarator(&mut self) -> Result<(), ParseError> {
        let start = self.position;
        if self.check_identifier() {
            self.reduce_token(Production::DirectDeclaratorIdentifier)?;
        } else if self.eat(TokenKind::LParen) {
            self.declarator()?;
            self.expect_closer(TokenKind::RParen, "after nested declarator")?;
            self.reduce(Production::DirectDeclaratorBracketed, start)?;
        } else {
            return Err(self.syntax_error("declarator"));
        }

        self.declarator_suffixes(start, true)?;
        Ok(())
    }

    /// Declarator whose identifier is optional. Names are only accepted when
    /// `allow_names` is set (parameters, not type-ids). Returns whether
    /// anything was parsed.
    fn maybe_abstract_declarator(&mut self, allow_names: bool) -> Result<bool, ParseError> {
        let start = self.position;
        if !self.check(TokenKind::Star) {
            return self.direct_maybe_abstract_declarator(allow_names);
        }

        self.mark(Production::OpenScope)?;
        self.pointers()?;
        let has_declarator = self.direct_maybe_abstract_declarator(allow_names)?;
        self.reduce(Production::DeclaratorWithPointer { has_declarator }, start)?;
        Ok(true)
    }

    fn direct_maybe_abstract_declarator(&mut self, allow_names: bool) -> Result<bool, ParseError> {
        let start = self.position;
        let has_declarator = if allow_names && self.check_identifier() {
            self.reduce_token(Production::DirectDeclaratorIdentifier)?;
            true
        } else if self.check(TokenKind::LParen) && self.opens_nested_declarator(allow_names) {
            self.advance();
            if !self.maybe_abstract_declarator(allow_names)? {
                return Err(self.syntax_error("declarator"));
            }
            self.expect_closer(TokenKind::RParen, "after nested declarator")?;
            self.reduce(Production::DirectDeclaratorBracketed, start)?;
            true
        } else {
            false
        };

        self.declarator_suffixes(start, has_declarator)
    }

    /// `(` starts a nested declarator rather than a parameter list.
    fn opens_nested_declarator(&self, allow_names: bool) -> bool {
        match self.peek_kind(1) {
            TokenKind::Star | TokenKind::LParen | TokenKind::LBracket => true,
            TokenKind::Identifier => allow_names && !self.is_type_name_at(self.position + 1),
            TokenKind::Completion => allow_names,
            _ => false,
        }
    }

    /// Array and function suffixes. Returns whether the declarator exists
    /// after them.
    fn declarator_suffixes(&mut self, start: usize, has_declarator: bool) -> Result<bool, ParseError> {
        let mut has_declarator = has_declarator;
        loop {
            if self.check(TokenKind::LBracket) {
                let modifier_start = self.position;
                self.advance();
                let has_size = !self.at_closer(TokenKind::RBracket);
                if has_size {
                    self.assignment_expression()?;
                }
                self.expect_closer(TokenKind::RBracket, "after array size")?;
                self.reduce(
                    Production::DirectDeclaratorArrayModifier { has_size },
                    modifier_start,
                )?;
                self.reduce(
                    Production::DirectDeclaratorArrayDeclarator { has_declarator },
                    start,
                )?;
            } else if self.check(TokenKind::LParen) {
                self.advance();
                let takes_varargs = self.parameter_list()?;
                self.expect_closer(TokenKind::RParen, "after parameters")?;
                self.reduce(
                    Production::DirectDeclaratorFunction {
                        has_declarator,
                        takes_varargs,
                    },
                    start,
                )?;
            } else {
                return Ok(has_declarator);
            }
            has_declarator = true;
        }
    }

    /// Parameters up to the closing `)`, collected in a new scope. Returns
    /// whether the list ends in `...`.
    fn parameter_list(&mut self) -> Result<bool, ParseError> {
        self.mark(Production::OpenScope)?;
        if self.at_closer(TokenKind::RParen) {
            return Ok(false);
        }
        if self.check(TokenKind::Void) && self.peek_kind(1) == TokenKind::RParen {
            self.advance();
            return Ok(false);
        }

        if self.starts_identifier_list() {
            loop {
                self.expect_identifier("in parameter list")?;
                self.reduce(Production::IdentifierName, self.position - 1)?;
                if !self.eat(TokenKind::Comma) {
                    return Ok(false);
                }
            }
        }

        loop {
            if self.eat(TokenKind::Ellipsis) {
                return Ok(true);
            }
            self.parameter_declaration()?;
            if !self.eat(TokenKind::Comma) {
                return Ok(false);
            }
        }
    }

    /// Old-style `f(a, b)` parameter names, C only.
    fn starts_identifier_list(&self) -> bool {
        self.env.options.dialect == Dialect::C
            && self.check(TokenKind::Identifier)
            && !self.is_type_name_at(self.position)
            && matches!(self.peek_kind(1), TokenKind::Comma | TokenKind::RParen)
    }

    fn parameter_declaration(&mut self) -> Result<(), ParseError> {
        let start = self.position;
        if !self.declaration_specifiers()? {
            return Err(self.syntax_error("parameter type"));
        }

        if self.maybe_abstract_declarator(true)? {
            self.reduce(Production::ParameterDeclaration, start)
        } else {
            self.reduce(Production::ParameterDeclarationWithoutDeclarator, start)
        }
    }

    /// Type name as used by casts, `sizeof` and `typeid`
    pub(crate) fn type_id(&mut self) -> Result<(), ParseError> {
        let start = self.position;
        if !self.declaration_specifiers()? {
            return Err(self.syntax_error("type name"));
        }

        let has_declarator = self.maybe_abstract_declarator(false)?;
        self.reduce(Production::TypeId { has_declarator }, start)
    }

    // ===== Initializers =====

    pub(crate) fn initializer(&mut self) -> Result<(), ParseError> {
        let start = self.position;
        if !self.eat(TokenKind::LBrace) {
            self.assignment_expression()?;
            return self.reduce(Production::Initializer, start);
        }

        self.mark(Production::InitializerListStart)?;
        self.mark(Production::OpenScope)?;
        while !self.at_closer(TokenKind::RBrace) {
            self.initializer()?;
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect_closer(TokenKind::RBrace, "to close initializer list")?;
        self.mark(Production::InitializerListEnd)?;
        self.reduce(Production::InitializerList, start)
    }
}
