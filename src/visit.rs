//! Tree traversal
//!
//! [`Visitor`] walks a finished translation unit. Every `visit_*` method is
//! called before the node's children; returning `false` skips them. The
//! default implementations visit everything, so a visitor only overrides the
//! nodes it cares about.
//!
//! [`DeferredPass`] is the hook run over the unit after the last reduction
//! and before the unit is frozen, e.g. to resolve ambiguity nodes once all
//! declarations are known.
//!
//! # Example
//!
//! ```
//! use lrdom::parser::ast::Expression;
//! use lrdom::visit::{walk_translation_unit, Visitor};
//! use lrdom::Parser;
//!
//! #[derive(Default)]
//! struct CountExpressions(usize);
//!
//! impl Visitor for CountExpressions {
//!     fn visit_expression(&mut self, _expression: &Expression) -> bool {
//!         self.0 += 1;
//!         true
//!     }
//! }
//!
//! let outcome = Parser::new("int x = 1 + 2;").unwrap().parse_translation_unit().unwrap();
//! let mut counter = CountExpressions::default();
//! walk_translation_unit(&mut counter, &outcome.unit);
//! assert_eq!(counter.0, 3);
//! ```

use crate::parser::ast::*;

pub trait Visitor {
    fn visit_declaration(&mut self, _declaration: &Declaration) -> bool {
        true
    }

    fn visit_statement(&mut self, _statement: &Statement) -> bool {
        true
    }

    fn visit_expression(&mut self, _expression: &Expression) -> bool {
        true
    }

    fn visit_decl_specifier(&mut self, _specifier: &DeclSpecifier) -> bool {
        true
    }

    fn visit_declarator(&mut self, _declarator: &Declarator) -> bool {
        true
    }

    fn visit_initializer(&mut self, _initializer: &Initializer) -> bool {
        true
    }

    fn visit_type_id(&mut self, _type_id: &TypeId) -> bool {
        true
    }

    /// Names in declarators, id-expressions, labels, fields and tags.
    fn visit_name(&mut self, _name: &Name) {}

    fn visit_problem(&mut self, _problem: &Problem) {}
}

/// Runs over the finished unit before it is frozen.
pub trait DeferredPass {
    fn resolve(&self, unit: &mut TranslationUnit);
}

pub fn walk_translation_unit<V: Visitor + ?Sized>(visitor: &mut V, unit: &TranslationUnit) {
    for declaration in unit.declarations() {
        walk_declaration(visitor, declaration);
    }
}

pub fn walk_declaration<V: Visitor + ?Sized>(visitor: &mut V, declaration: &Declaration) {
    if !visitor.visit_declaration(declaration) {
        return;
    }
    match &declaration.kind {
        DeclarationKind::Simple {
            specifier,
            declarators,
        } => {
            walk_decl_specifier(visitor, specifier);
            for declarator in declarators {
                walk_declarator(visitor, declarator);
            }
        }
        DeclarationKind::FunctionDefinition {
            specifier,
            declarator,
            body,
        } => {
            walk_decl_specifier(visitor, specifier);
            walk_declarator(visitor, declarator);
            walk_statement(visitor, body);
        }
        DeclarationKind::Problem(problem) => visitor.visit_problem(problem),
    }
}

pub fn walk_statement<V: Visitor + ?Sized>(visitor: &mut V, statement: &Statement) {
    if !visitor.visit_statement(statement) {
        return;
    }
    match &statement.kind {
        StatementKind::Expression(expression) | StatementKind::Case(expression) => {
            walk_expression(visitor, expression)
        }
        StatementKind::Declaration(declaration) => walk_declaration(visitor, declaration),
        StatementKind::Compound(statements) | StatementKind::Ambiguous(statements) => {
            for statement in statements {
                walk_statement(visitor, statement);
            }
        }
        StatementKind::If {
            condition,
            then_clause,
            else_clause,
        } => {
            walk_expression(visitor, condition);
            walk_statement(visitor, then_clause);
            if let Some(else_clause) = else_clause {
                walk_statement(visitor, else_clause);
            }
        }
        StatementKind::Switch { controller, body } => {
            walk_expression(visitor, controller);
            walk_statement(visitor, body);
        }
        StatementKind::While { condition, body } => {
            walk_expression(visitor, condition);
            walk_statement(visitor, body);
        }
        StatementKind::DoWhile { body, condition } => {
            walk_statement(visitor, body);
            walk_expression(visitor, condition);
        }
        StatementKind::For {
            init,
            condition,
            iteration,
            body,
        } => {
            if let Some(init) = init {
                walk_statement(visitor, init);
            }
            if let Some(condition) = condition {
                walk_expression(visitor, condition);
            }
            if let Some(iteration) = iteration {
                walk_expression(visitor, iteration);
            }
            walk_statement(visitor, body);
        }
        StatementKind::Label { name, body } => {
            visitor.visit_name(name);
            walk_statement(visitor, body);
        }
        StatementKind::Goto(name) => visitor.visit_name(name),
        StatementKind::Return(value) => {
            if let Some(value) = value {
                walk_expression(visitor, value);
            }
        }
        StatementKind::Problem(problem) => visitor.visit_problem(problem),
        StatementKind::Null | StatementKind::Default | StatementKind::Break | StatementKind::Continue => {}
    }
}

pub fn walk_expression<V: Visitor + ?Sized>(visitor: &mut V, expression: &Expression) {
    if !visitor.visit_expression(expression) {
        return;
    }
    match &expression.kind {
        ExpressionKind::Id(name) => visitor.visit_name(name),
        ExpressionKind::Literal { .. } => {}
        ExpressionKind::Unary { operand, .. } => walk_expression(visitor, operand),
        ExpressionKind::Binary { left, right, .. } => {
            walk_expression(visitor, left);
            walk_expression(visitor, right);
        }
        ExpressionKind::Conditional {
            condition,
            positive,
            negative,
        } => {
            walk_expression(visitor, condition);
            walk_expression(visitor, positive);
            walk_expression(visitor, negative);
        }
        ExpressionKind::Cast { type_id, operand } => {
            walk_type_id(visitor, type_id);
            walk_expression(visitor, operand);
        }
        ExpressionKind::TypeIdExpression { type_id, .. } => walk_type_id(visitor, type_id),
        ExpressionKind::FunctionCall { function, argument } => {
            walk_expression(visitor, function);
            if let Some(argument) = argument {
                walk_expression(visitor, argument);
            }
        }
        ExpressionKind::ArraySubscript { array, subscript } => {
            walk_expression(visitor, array);
            walk_expression(visitor, subscript);
        }
        ExpressionKind::FieldReference { owner, field, .. } => {
            walk_expression(visitor, owner);
            visitor.visit_name(field);
        }
        ExpressionKind::List(items) | ExpressionKind::Ambiguous(items) => {
            for item in items {
                walk_expression(visitor, item);
            }
        }
        ExpressionKind::Problem(problem) => visitor.visit_problem(problem),
    }
}

pub fn walk_decl_specifier<V: Visitor + ?Sized>(visitor: &mut V, specifier: &DeclSpecifier) {
    if !visitor.visit_decl_specifier(specifier) {
        return;
    }
    match &specifier.kind {
        DeclSpecifierKind::Simple(_) => {}
        DeclSpecifierKind::Named(name) | DeclSpecifierKind::Elaborated { name, .. } => {
            visitor.visit_name(name)
        }
        DeclSpecifierKind::Composite { name, members, .. } => {
            visitor.visit_name(name);
            for member in members {
                walk_declaration(visitor, member);
            }
        }
        DeclSpecifierKind::Enumeration { name, enumerators } => {
            visitor.visit_name(name);
            for enumerator in enumerators {
                visitor.visit_name(&enumerator.name);
                if let Some(value) = &enumerator.value {
                    walk_expression(visitor, value);
                }
            }
        }
    }
}

pub fn walk_declarator<V: Visitor + ?Sized>(visitor: &mut V, declarator: &Declarator) {
    if !visitor.visit_declarator(declarator) {
        return;
    }
    visitor.visit_name(&declarator.name);
    if let Some(nested) = &declarator.nested {
        walk_declarator(visitor, nested);
    }
    match &declarator.kind {
        DeclaratorKind::Plain => {}
        DeclaratorKind::Array(modifiers) => {
            for size in modifiers.iter().filter_map(|modifier| modifier.size.as_ref()) {
                walk_expression(visitor, size);
            }
        }
        DeclaratorKind::Function {
            parameters,
            identifiers,
            ..
        } => {
            for parameter in parameters {
                walk_decl_specifier(visitor, &parameter.specifier);
                walk_declarator(visitor, &parameter.declarator);
            }
            for identifier in identifiers {
                visitor.visit_name(identifier);
            }
        }
        DeclaratorKind::Field { bit_width } => walk_expression(visitor, bit_width),
    }
    if let Some(initializer) = &declarator.initializer {
        walk_initializer(visitor, initializer);
    }
}

pub fn walk_initializer<V: Visitor + ?Sized>(visitor: &mut V, initializer: &Initializer) {
    if !visitor.visit_initializer(initializer) {
        return;
    }
    match &initializer.kind {
        InitializerKind::Expression(expression) => walk_expression(visitor, expression),
        InitializerKind::List(items) => {
            for item in items {
                walk_initializer(visitor, item);
            }
        }
    }
}

pub fn walk_type_id<V: Visitor + ?Sized>(visitor: &mut V, type_id: &TypeId) {
    if !visitor.visit_type_id(type_id) {
        return;
    }
    walk_decl_specifier(visitor, &type_id.specifier);
    walk_declarator(visitor, &type_id.declarator);
}

#[derive(Default)]
struct NodeCounter {
    ambiguities: usize,
    problems: usize,
}

impl Visitor for NodeCounter {
    fn visit_statement(&mut self, statement: &Statement) -> bool {
        if statement.is_ambiguous() {
            self.ambiguities += 1;
        }
        true
    }

    fn visit_expression(&mut self, expression: &Expression) -> bool {
        if expression.is_ambiguous() {
            self.ambiguities += 1;
        }
        true
    }

    fn visit_problem(&mut self, _problem: &Problem) {
        self.problems += 1;
    }
}

fn count(unit: &TranslationUnit) -> NodeCounter {
    let mut counter = NodeCounter::default();
    walk_translation_unit(&mut counter, unit);
    counter
}

/// Number of statement and expression ambiguity nodes in `unit`.
pub fn count_ambiguities(unit: &TranslationUnit) -> usize {
    count(unit).ambiguities
}

/// Number of problem nodes in `unit`.
pub fn count_problems(unit: &TranslationUnit) -> usize {
    count(unit).problems
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Parser;

    #[derive(Default)]
    struct NameCollector(Vec<String>);

    impl Visitor for NameCollector {
        fn visit_name(&mut self, name: &Name) {
            if !name.is_empty() {
                self.0.push(name.text.clone());
            }
        }
    }

    #[test]
    fn test_walk_visits_names_in_order() {
        let outcome = Parser::new("int f(int a) { return a + b; }")
            .unwrap()
            .parse_translation_unit()
            .unwrap();
        let mut collector = NameCollector::default();
        walk_translation_unit(&mut collector, &outcome.unit);
        assert_eq!(collector.0, vec!["f", "a", "a", "b"]);
    }

    #[test]
    fn test_count_problems() {
        let outcome = Parser::new("int x = ; void f(void) { return; ) }")
            .unwrap()
            .parse_translation_unit()
            .unwrap();
        assert_eq!(count_problems(&outcome.unit), 2);
        assert_eq!(count_ambiguities(&outcome.unit), 0);
    }

    struct SkipFunctionBodies(usize);

    impl Visitor for SkipFunctionBodies {
        fn visit_statement(&mut self, _statement: &Statement) -> bool {
            self.0 += 1;
            false
        }
    }

    #[test]
    fn test_returning_false_skips_children() {
        let outcome = Parser::new("void f(void) { ; ; }")
            .unwrap()
            .parse_translation_unit()
            .unwrap();
        let mut visitor = SkipFunctionBodies(0);
        walk_translation_unit(&mut visitor, &outcome.unit);
        assert_eq!(visitor.0, 1);
    }
}
