//! Node construction
//!
//! [`NodeFactory`] is the one place AST nodes are created. Every method
//! returns a node with an empty span; the reduction that asked for it stamps
//! the span once the covered tokens or children are known. The C and C++
//! front ends share the default constructors and differ in the dialect they
//! stamp on the translation unit and in the literals they accept.

use crate::options::Dialect;
use crate::parser::ast::*;

pub trait NodeFactory {
    fn dialect(&self) -> Dialect;

    fn new_translation_unit(&self) -> TranslationUnit {
        TranslationUnit::new(self.dialect())
    }

    fn new_name(&self, text: &str) -> Name {
        Name::new(text)
    }

    fn new_anonymous_name(&self) -> Name {
        Name::default()
    }

    fn new_problem(&self, id: ProblemId) -> Problem {
        Problem {
            id,
            text: String::new(),
            span: Span::default(),
        }
    }

    // ===== Expressions =====

    fn new_id_expression(&self, name: Name) -> Expression {
        Expression::new(ExpressionKind::Id(name))
    }

    fn new_literal_expression(&self, kind: LiteralKind, text: &str) -> Expression {
        Expression::new(ExpressionKind::Literal {
            kind,
            text: text.to_string(),
        })
    }

    fn new_unary_expression(&self, op: UnaryOp, operand: Expression) -> Expression {
        Expression::new(ExpressionKind::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn new_binary_expression(&self, op: BinaryOp, left: Expression, right: Expression) -> Expression {
        Expression::new(ExpressionKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn new_conditional_expression(
        &self,
        condition: Expression,
        positive: Expression,
        negative: Expression,
    ) -> Expression {
        Expression::new(ExpressionKind::Conditional {
            condition: Box::new(condition),
            positive: Box::new(positive),
            negative: Box::new(negative),
        })
    }

    fn new_cast_expression(&self, type_id: TypeId, operand: Expression) -> Expression {
        Expression::new(ExpressionKind::Cast {
            type_id: Box::new(type_id),
            operand: Box::new(operand),
        })
    }

    fn new_type_id_expression(&self, op: TypeIdOp, type_id: TypeId) -> Expression {
        Expression::new(ExpressionKind::TypeIdExpression {
            op,
            type_id: Box::new(type_id),
        })
    }

    fn new_function_call_expression(&self, function: Expression, argument: Option<Expression>) -> Expression {
        Expression::new(ExpressionKind::FunctionCall {
            function: Box::new(function),
            argument: argument.map(Box::new),
        })
    }

    fn new_array_subscript_expression(&self, array: Expression, subscript: Expression) -> Expression {
        Expression::new(ExpressionKind::ArraySubscript {
            array: Box::new(array),
            subscript: Box::new(subscript),
        })
    }

    fn new_field_reference(&self, owner: Expression, field: Name, is_pointer: bool) -> Expression {
        Expression::new(ExpressionKind::FieldReference {
            owner: Box::new(owner),
            field,
            is_pointer,
        })
    }

    fn new_expression_list(&self, expressions: Vec<Expression>) -> Expression {
        Expression::new(ExpressionKind::List(expressions))
    }

    fn new_ambiguous_expression(&self, alternatives: Vec<Expression>) -> Expression {
        Expression::new(ExpressionKind::Ambiguous(alternatives))
    }

    fn new_problem_expression(&self, problem: Problem) -> Expression {
        Expression::new(ExpressionKind::Problem(problem))
    }

    // ===== Statements =====

    fn new_expression_statement(&self, expression: Expression) -> Statement {
        Statement::new(StatementKind::Expression(expression))
    }

    fn new_declaration_statement(&self, declaration: Declaration) -> Statement {
        Statement::new(StatementKind::Declaration(declaration))
    }

    fn new_compound_statement(&self, statements: Vec<Statement>) -> Statement {
        Statement::new(StatementKind::Compound(statements))
    }

    fn new_null_statement(&self) -> Statement {
        Statement::new(StatementKind::Null)
    }

    fn new_if_statement(
        &self,
        condition: Expression,
        then_clause: Statement,
        else_clause: Option<Statement>,
    ) -> Statement {
        Statement::new(StatementKind::If {
            condition,
            then_clause: Box::new(then_clause),
            else_clause: else_clause.map(Box::new),
        })
    }

    fn new_switch_statement(&self, controller: Expression, body: Statement) -> Statement {
        Statement::new(StatementKind::Switch {
            controller,
            body: Box::new(body),
        })
    }

    fn new_while_statement(&self, condition: Expression, body: Statement) -> Statement {
        Statement::new(StatementKind::While {
            condition,
            body: Box::new(body),
        })
    }

    fn new_do_statement(&self, body: Statement, condition: Expression) -> Statement {
        Statement::new(StatementKind::DoWhile {
            body: Box::new(body),
            condition,
        })
    }

    fn new_for_statement(
        &self,
        init: Option<Statement>,
        condition: Option<Expression>,
        iteration: Option<Expression>,
        body: Statement,
    ) -> Statement {
        Statement::new(StatementKind::For {
            init: init.map(Box::new),
            condition,
            iteration,
            body: Box::new(body),
        })
    }

    fn new_case_statement(&self, expression: Expression) -> Statement {
        Statement::new(StatementKind::Case(expression))
    }

    fn new_default_statement(&self) -> Statement {
        Statement::new(StatementKind::Default)
    }

    fn new_label_statement(&self, name: Name, body: Statement) -> Statement {
        Statement::new(StatementKind::Label {
            name,
            body: Box::new(body),
        })
    }

    fn new_goto_statement(&self, name: Name) -> Statement {
        Statement::new(StatementKind::Goto(name))
    }

    fn new_break_statement(&self) -> Statement {
        Statement::new(StatementKind::Break)
    }

    fn new_continue_statement(&self) -> Statement {
        Statement::new(StatementKind::Continue)
    }

    fn new_return_statement(&self, value: Option<Expression>) -> Statement {
        Statement::new(StatementKind::Return(value))
    }

    fn new_ambiguous_statement(&self, alternatives: Vec<Statement>) -> Statement {
        Statement::new(StatementKind::Ambiguous(alternatives))
    }

    fn new_problem_statement(&self, problem: Problem) -> Statement {
        Statement::new(StatementKind::Problem(problem))
    }

    // ===== Declarations =====

    fn new_simple_declaration(&self, specifier: DeclSpecifier, declarators: Vec<Declarator>) -> Declaration {
        Declaration::new(DeclarationKind::Simple {
            specifier,
            declarators,
        })
    }

    fn new_function_definition(
        &self,
        specifier: DeclSpecifier,
        declarator: Declarator,
        body: Statement,
    ) -> Declaration {
        Declaration::new(DeclarationKind::FunctionDefinition {
            specifier,
            declarator,
            body: Box::new(body),
        })
    }

    fn new_problem_declaration(&self, problem: Problem) -> Declaration {
        Declaration::new(DeclarationKind::Problem(problem))
    }

    fn new_decl_specifier(&self, kind: DeclSpecifierKind) -> DeclSpecifier {
        DeclSpecifier {
            kind,
            storage: StorageClass::None,
            is_const: false,
            is_volatile: false,
            is_restrict: false,
            is_inline: false,
            span: Span::default(),
        }
    }

    fn new_declarator(&self, name: Name) -> Declarator {
        Declarator::new(name)
    }

    fn new_pointer(&self) -> PointerOperator {
        PointerOperator::default()
    }

    fn new_array_modifier(&self, size: Option<Expression>) -> ArrayModifier {
        ArrayModifier {
            size,
            span: Span::default(),
        }
    }

    fn new_parameter_declaration(&self, specifier: DeclSpecifier, declarator: Declarator) -> ParameterDeclaration {
        ParameterDeclaration {
            specifier,
            declarator,
            span: Span::default(),
        }
    }

    fn new_initializer(&self, expression: Expression) -> Initializer {
        Initializer {
            kind: InitializerKind::Expression(expression),
            span: Span::default(),
        }
    }

    fn new_initializer_list(&self, initializers: Vec<Initializer>) -> Initializer {
        Initializer {
            kind: InitializerKind::List(initializers),
            span: Span::default(),
        }
    }

    fn new_enumerator(&self, name: Name, value: Option<Expression>) -> Enumerator {
        Enumerator {
            name,
            value,
            span: Span::default(),
        }
    }

    fn new_type_id(&self, specifier: DeclSpecifier, declarator: Declarator) -> TypeId {
        TypeId {
            specifier,
            declarator,
            span: Span::default(),
        }
    }
}

/// Node factory for C99 and its GNU extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct CNodeFactory;

impl NodeFactory for CNodeFactory {
    fn dialect(&self) -> Dialect {
        Dialect::C
    }

    // C has no boolean or `this` literals; a C lexer never produces them,
    // so anything that gets here is an integer constant.
    fn new_literal_expression(&self, kind: LiteralKind, text: &str) -> Expression {
        let kind = match kind {
            LiteralKind::True | LiteralKind::False | LiteralKind::This => LiteralKind::Integer,
            other => other,
        };
        Expression::new(ExpressionKind::Literal {
            kind,
            text: text.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CppNodeFactory;

impl NodeFactory for CppNodeFactory {
    fn dialect(&self) -> Dialect {
        Dialect::Cpp
    }
}

/// Factory for the given dialect.
pub fn node_factory(dialect: Dialect) -> Box<dyn NodeFactory> {
    match dialect {
        Dialect::C => Box::new(CNodeFactory),
        Dialect::Cpp => Box::new(CppNodeFactory),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factories_stamp_dialect() {
        assert_eq!(node_factory(Dialect::C).new_translation_unit().dialect, Dialect::C);
        assert_eq!(
            node_factory(Dialect::Cpp).new_translation_unit().dialect,
            Dialect::Cpp
        );
    }

    #[test]
    fn test_nodes_start_without_span() {
        let factory = CppNodeFactory;
        let name = factory.new_name("x");
        let expression = factory.new_id_expression(name);
        assert_eq!(expression.span, Span::default());
        assert!(matches!(expression.kind, ExpressionKind::Id(ref name) if name.text == "x"));
    }
}
