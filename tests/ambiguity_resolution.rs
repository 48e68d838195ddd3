// Ambiguity resolution through secondary parses

use lrdom::action::{ActionEnv, ParseContext, SecondaryParser, SecondaryParserFactory};
use lrdom::parser::ast::*;
use lrdom::parser::lexer::{Token, TokenKind};
use lrdom::visit::count_ambiguities;
use lrdom::{Dialect, Parser, ParserOptions};

fn parse(source: &str) -> lrdom::action::ParseOutcome {
    Parser::new(source).unwrap().parse_translation_unit().unwrap()
}

fn body(unit: &TranslationUnit, index: usize) -> &[Statement] {
    match &unit.declarations()[index].kind {
        DeclarationKind::FunctionDefinition { body, .. } => match &body.kind {
            StatementKind::Compound(statements) => statements,
            other => panic!("expected compound body, got {other:?}"),
        },
        other => panic!("expected function definition, got {other:?}"),
    }
}

fn returned(statement: &Statement) -> &Expression {
    match &statement.kind {
        StatementKind::Return(Some(value)) => value,
        other => panic!("expected return with value, got {other:?}"),
    }
}

fn expression_of(statement: &Statement) -> &Expression {
    match &statement.kind {
        StatementKind::Expression(expression) => expression,
        other => panic!("expected expression statement, got {other:?}"),
    }
}

#[test]
fn test_cast_or_bracketed_operand_is_ambiguous() {
    let outcome = parse("typedef int T; int f(int x, int y) { return (T)-x + y; }");
    let value = returned(&body(&outcome.unit, 1)[0]);

    match &value.kind {
        ExpressionKind::Binary {
            op: BinaryOp::Plus,
            left,
            ..
        } => match &left.kind {
            ExpressionKind::Ambiguous(readings) => {
                assert_eq!(readings.len(), 2);
                assert!(matches!(readings[0].kind, ExpressionKind::Cast { .. }));
                assert!(matches!(
                    readings[1].kind,
                    ExpressionKind::Binary {
                        op: BinaryOp::Minus,
                        ..
                    }
                ));
                assert_eq!(left.span, readings[0].span);
            }
            other => panic!("expected ambiguity node, got {other:?}"),
        },
        other => panic!("expected addition, got {other:?}"),
    }
    assert_eq!(count_ambiguities(&outcome.unit), 1);
}

#[test]
fn test_function_typedef_prefers_call() {
    let outcome = parse("typedef int T(int); void g(int x) { (T)(x); }");
    let expression = expression_of(&body(&outcome.unit, 1)[0]);

    assert!(expression.is_function_call());
    assert_eq!(count_ambiguities(&outcome.unit), 0);
}

#[test]
fn test_cast_to_keyword_type_is_plain() {
    let outcome = parse("void g(double d) { int i = (int)d; }");
    assert_eq!(count_ambiguities(&outcome.unit), 0);

    match &body(&outcome.unit, 0)[0].kind {
        StatementKind::Declaration(declaration) => match &declaration.kind {
            DeclarationKind::Simple { declarators, .. } => {
                assert!(matches!(
                    &declarators[0].initializer,
                    Some(Initializer {
                        kind: InitializerKind::Expression(Expression {
                            kind: ExpressionKind::Cast { .. },
                            ..
                        }),
                        ..
                    })
                ));
            }
            other => panic!("expected simple declaration, got {other:?}"),
        },
        other => panic!("expected declaration statement, got {other:?}"),
    }
}

#[test]
fn test_lone_typedef_name_is_expression() {
    let outcome = parse("typedef int T; void g(void) { T; }");
    let expression = expression_of(&body(&outcome.unit, 1)[0]);
    assert!(matches!(&expression.kind, ExpressionKind::Id(name) if name.text == "T"));
}

#[test]
fn test_pointer_declaration_or_multiplication() {
    let outcome = parse("typedef int T; void g(int x) { T * x; }");

    match &body(&outcome.unit, 1)[0].kind {
        StatementKind::Ambiguous(readings) => {
            assert!(matches!(readings[0].kind, StatementKind::Declaration(_)));
            assert!(matches!(
                &readings[1].kind,
                StatementKind::Expression(Expression {
                    kind: ExpressionKind::Binary {
                        op: BinaryOp::Multiply,
                        ..
                    },
                    ..
                })
            ));
        }
        other => panic!("expected statement ambiguity, got {other:?}"),
    }
}

#[test]
fn test_declared_typedef_is_not_ambiguous() {
    let outcome = parse("typedef int T; void g(void) { T value; }");
    assert_eq!(count_ambiguities(&outcome.unit), 0);
    assert!(matches!(
        body(&outcome.unit, 1)[0].kind,
        StatementKind::Declaration(_)
    ));
}

#[test]
fn test_block_scope_variable_shadows_typedef() {
    let outcome = parse(
        "typedef int T; \
         void g(int x) { int T; T * x; } \
         void h(int y) { T * y; }",
    );

    let shadowed = expression_of(&body(&outcome.unit, 1)[1]);
    assert!(matches!(
        shadowed.kind,
        ExpressionKind::Binary {
            op: BinaryOp::Multiply,
            ..
        }
    ));
    assert!(body(&outcome.unit, 2)[0].is_ambiguous());
}

#[test]
fn test_implicit_int_prefers_expression() {
    let outcome = parse("void g(int x) { f(x); a = b; }");
    let statements = body(&outcome.unit, 0);

    assert!(expression_of(&statements[0]).is_function_call());
    assert!(matches!(
        expression_of(&statements[1]).kind,
        ExpressionKind::Binary {
            op: BinaryOp::Assign,
            ..
        }
    ));
    assert_eq!(count_ambiguities(&outcome.unit), 0);
}

#[test]
fn test_sizeof_variable_is_unary() {
    let outcome = Parser::new("sizeof(x)").unwrap().parse_expression().unwrap();
    let expression = outcome.expression;

    assert_eq!(expression.span, Span::new(0, 9));
    match &expression.kind {
        ExpressionKind::Unary {
            op: UnaryOp::Sizeof,
            operand,
        } => assert!(matches!(
            operand.kind,
            ExpressionKind::Unary {
                op: UnaryOp::Bracketed,
                ..
            }
        )),
        other => panic!("expected sizeof expression, got {other:?}"),
    }
}

#[test]
fn test_sizeof_type_operands() {
    let keyword = Parser::new("sizeof(int)").unwrap().parse_expression().unwrap();
    assert!(matches!(
        keyword.expression.kind,
        ExpressionKind::TypeIdExpression {
            op: TypeIdOp::Sizeof,
            ..
        }
    ));

    let outcome = parse("typedef int T; int n = sizeof(T);");
    assert_eq!(count_ambiguities(&outcome.unit), 1);
}

#[test]
fn test_cpp_typeid() {
    let parser = Parser::with_options("typeid(int)", ParserOptions::new(Dialect::Cpp)).unwrap();
    let outcome = parser.parse_expression().unwrap();
    assert!(matches!(
        outcome.expression.kind,
        ExpressionKind::TypeIdExpression {
            op: TypeIdOp::Typeid,
            ..
        }
    ));
}

#[test]
fn test_token_kinds_survive_secondary_parses() {
    let parser = Parser::new("typedef int T; int f(int x) { T * x; return (T)-x + sizeof(T); }").unwrap();
    let before: Vec<TokenKind> = parser.tokens().iter().map(|token| token.kind).collect();

    let first = parser.parse_translation_unit().unwrap();
    let second = parser.parse_translation_unit().unwrap();
    let after: Vec<TokenKind> = parser.tokens().iter().map(|token| token.kind).collect();

    assert_eq!(before, after);
    assert_eq!(first.unit, second.unit);
    assert_eq!(count_ambiguities(&first.unit), 3);
}

struct NoReading;

impl SecondaryParser for NoReading {
    fn parse_secondary(
        &self,
        _tokens: &[Token],
        _env: ActionEnv<'_>,
        _ctx: &mut ParseContext,
    ) -> Option<Expression> {
        None
    }
}

struct FailingFactory;

impl SecondaryParserFactory for FailingFactory {
    fn expression_parser(&self) -> &dyn SecondaryParser {
        &NoReading
    }

    fn no_cast_expression_parser(&self) -> &dyn SecondaryParser {
        &NoReading
    }

    fn sizeof_expression_parser(&self) -> &dyn SecondaryParser {
        &NoReading
    }
}

#[test]
fn test_failing_secondary_parsers_keep_casts() {
    let outcome = Parser::new("typedef int T; int f(int x, int y) { return (T)-x + y; }")
        .unwrap()
        .with_secondary_parsers(Box::new(FailingFactory))
        .parse_translation_unit()
        .unwrap();

    assert_eq!(count_ambiguities(&outcome.unit), 0);
    match &returned(&body(&outcome.unit, 1)[0]).kind {
        ExpressionKind::Binary { left, .. } => {
            assert!(matches!(left.kind, ExpressionKind::Cast { .. }))
        }
        other => panic!("expected addition, got {other:?}"),
    }
}

#[test]
fn test_sizeof_function_typedef_prefers_expression() {
    let outcome = parse("typedef int F(int); int n = sizeof(F);");
    assert_eq!(count_ambiguities(&outcome.unit), 0);

    match &outcome.unit.declarations()[1].kind {
        DeclarationKind::Simple { declarators, .. } => match &declarators[0].initializer {
            Some(Initializer {
                kind: InitializerKind::Expression(expression),
                ..
            }) => match &expression.kind {
                ExpressionKind::Unary {
                    op: UnaryOp::Sizeof,
                    operand,
                } => assert!(matches!(
                    &operand.kind,
                    ExpressionKind::Unary {
                        op: UnaryOp::Bracketed,
                        operand,
                    } if matches!(&operand.kind, ExpressionKind::Id(name) if name.text == "F")
                )),
                other => panic!("expected sizeof expression, got {other:?}"),
            },
            other => panic!("expected expression initializer, got {other:?}"),
        },
        other => panic!("expected simple declaration, got {other:?}"),
    }
}
