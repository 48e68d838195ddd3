// Integration tests for the reduction-driven tree builder

use std::cell::Cell;
use std::rc::Rc;

use lrdom::parser::ast::*;
use lrdom::visit::{count_ambiguities, count_problems, DeferredPass};
use lrdom::{Dialect, Parser, ParserOptions};

fn parse(source: &str) -> lrdom::action::ParseOutcome {
    Parser::new(source)
        .expect("lexing failed")
        .parse_translation_unit()
        .expect("parsing failed")
}

fn parse_with(source: &str, options: ParserOptions) -> lrdom::action::ParseOutcome {
    Parser::with_options(source, options)
        .expect("lexing failed")
        .parse_translation_unit()
        .expect("parsing failed")
}

fn function_body(unit: &TranslationUnit, index: usize) -> &[Statement] {
    match &unit.declarations()[index].kind {
        DeclarationKind::FunctionDefinition { body, .. } => match &body.kind {
            StatementKind::Compound(statements) => statements,
            other => panic!("expected compound body, got {other:?}"),
        },
        other => panic!("expected function definition, got {other:?}"),
    }
}

#[test]
fn test_complete_program() {
    let source = r#"
        typedef struct point { int x, y; } Point;
        enum color { RED, GREEN = 2, BLUE };
        static const char *names[3] = { "red", "green", "blue" };

        int distance(Point *a, Point *b) {
            int dx = a->x - b->x;
            int dy = a->y - b->y;
            return dx * dx + dy * dy;
        }

        int main(void) {
            Point p = { 1, 2 };
            Point q;
            q.x = 4;
            q.y = 6;
            for (int i = 0; i < 3; i++) {
                if (i == 1) continue;
                else if (i > 2) break;
            }
            switch (distance(&p, &q)) {
            case 25: return 0;
            default: return 1;
            }
        }
    "#;

    let outcome = parse(source);
    let unit = &outcome.unit;

    assert_eq!(unit.declarations().len(), 5);
    assert_eq!(count_problems(unit), 0);
    assert_eq!(count_ambiguities(unit), 0);
    assert!(unit.is_frozen());
    assert!(outcome.completion.is_none());

    match &unit.declarations()[0].kind {
        DeclarationKind::Simple {
            specifier,
            declarators,
        } => {
            assert!(specifier.is_typedef());
            assert_eq!(declarators[0].name.text, "Point");
            match &specifier.kind {
                DeclSpecifierKind::Composite { name, members, .. } => {
                    assert_eq!(name.text, "point");
                    assert_eq!(members.len(), 1);
                }
                other => panic!("expected struct, got {other:?}"),
            }
        }
        other => panic!("expected typedef, got {other:?}"),
    }

    match &unit.declarations()[2].kind {
        DeclarationKind::Simple { declarators, .. } => {
            let names = &declarators[0];
            assert_eq!(names.pointers.len(), 1);
            assert!(matches!(&names.kind, DeclaratorKind::Array(modifiers) if modifiers.len() == 1));
            assert!(matches!(
                &names.initializer,
                Some(Initializer { kind: InitializerKind::List(items), .. }) if items.len() == 3
            ));
        }
        other => panic!("expected simple declaration, got {other:?}"),
    }

    let main_body = function_body(unit, 4);
    assert_eq!(main_body.len(), 6);
    assert!(matches!(main_body[4].kind, StatementKind::For { .. }));
    assert!(matches!(main_body[5].kind, StatementKind::Switch { .. }));
}

#[test]
fn test_declaration_spans() {
    let outcome = parse("int x = 1;\nint y;");
    let declarations = outcome.unit.declarations();

    assert_eq!(declarations[0].span, Span::new(0, 10));
    assert_eq!(declarations[1].span, Span::new(11, 6));
    assert_eq!(outcome.unit.span, Span::new(0, 17));
}

#[test]
fn test_statement_recovery_inside_function() {
    let outcome = parse("void f(void) { int x = ; x = 1; }");
    let body = function_body(&outcome.unit, 0);

    assert_eq!(body.len(), 2);
    match &body[0].kind {
        StatementKind::Problem(problem) => {
            assert_eq!(problem.id, ProblemId::SyntaxError);
            assert_eq!(problem.span, Span::new(15, 9));
        }
        other => panic!("expected problem statement, got {other:?}"),
    }
    assert!(matches!(body[1].kind, StatementKind::Expression(_)));
}

#[test]
fn test_malformed_input_never_aborts() {
    let outcome = parse("int ;; }} {{ x y z");

    assert_eq!(outcome.unit.declarations().len(), 4);
    assert_eq!(count_problems(&outcome.unit), 3);
    assert!(outcome.unit.is_frozen());
}

#[test]
fn test_deeply_nested_casts() {
    let source = format!("{}x", "(int)".repeat(64));
    let outcome = Parser::new(&source).unwrap().parse_expression().unwrap();

    let mut depth = 0;
    let mut expression = &outcome.expression;
    while let ExpressionKind::Cast { operand, .. } = &expression.kind {
        depth += 1;
        expression = operand;
    }
    assert_eq!(depth, 64);
    assert!(matches!(&expression.kind, ExpressionKind::Id(name) if name.text == "x"));
}

#[test]
fn test_deeply_nested_parentheses() {
    let source = format!("{}x{}", "(".repeat(64), ")".repeat(64));
    let outcome = Parser::new(&source).unwrap().parse_expression().unwrap();

    assert_eq!(outcome.expression.span, Span::new(0, 129));
    let mut depth = 0;
    let mut expression = &outcome.expression;
    while let ExpressionKind::Unary {
        op: UnaryOp::Bracketed,
        operand,
    } = &expression.kind
    {
        depth += 1;
        expression = operand;
    }
    assert_eq!(depth, 64);
}

#[test]
fn test_cpp_unit_is_stamped() {
    let outcome = parse_with(
        "bool ready = true;",
        ParserOptions::new(Dialect::Cpp),
    );
    assert_eq!(outcome.unit.dialect, Dialect::Cpp);
    assert_eq!(count_problems(&outcome.unit), 0);
}

#[test]
fn test_gnu_keywords_fold_to_base_kinds() {
    let source = "__const__ int x; __inline__ int f(void) { return 0; }";

    let gnu = parse_with(source, ParserOptions::default().with_gnu_extensions(true));
    assert_eq!(count_problems(&gnu.unit), 0);
    let declarations = gnu.unit.declarations();
    assert!(declarations[0].specifier().is_some_and(|spec| spec.is_const));
    assert!(declarations[1].specifier().is_some_and(|spec| spec.is_inline));

    let plain = parse(source);
    assert!(count_problems(&plain.unit) > 0);
}

#[test]
fn test_skip_trivial_initializers() {
    let source = "int a[3] = { 1, 2 + 3, x };";
    let list_len = |outcome: &lrdom::action::ParseOutcome| match &outcome.unit.declarations()[0].kind {
        DeclarationKind::Simple { declarators, .. } => match &declarators[0].initializer {
            Some(Initializer {
                kind: InitializerKind::List(items),
                ..
            }) => items.len(),
            other => panic!("expected initializer list, got {other:?}"),
        },
        other => panic!("expected simple declaration, got {other:?}"),
    };

    assert_eq!(list_len(&parse(source)), 3);
    let skipping = parse_with(
        source,
        ParserOptions::default().with_skip_trivial_initializers(true),
    );
    assert_eq!(list_len(&skipping), 1);
}

struct CountingPass {
    declarations: Rc<Cell<usize>>,
    saw_frozen: Rc<Cell<bool>>,
}

impl DeferredPass for CountingPass {
    fn resolve(&self, unit: &mut TranslationUnit) {
        self.declarations.set(unit.declarations().len());
        self.saw_frozen.set(unit.is_frozen());
    }
}

#[test]
fn test_deferred_pass_runs_before_freeze() {
    let declarations = Rc::new(Cell::new(0));
    let saw_frozen = Rc::new(Cell::new(true));
    let pass = CountingPass {
        declarations: Rc::clone(&declarations),
        saw_frozen: Rc::clone(&saw_frozen),
    };

    let outcome = Parser::new("int a; int b; int c;")
        .unwrap()
        .with_deferred_pass(Box::new(pass))
        .parse_translation_unit()
        .unwrap();

    assert_eq!(declarations.get(), 3);
    assert!(!saw_frozen.get());
    assert!(outcome.unit.is_frozen());
}

#[test]
fn test_function_pointer_declarator() {
    let outcome = parse("int (*fp)(int); int *g(void);");
    match &outcome.unit.declarations()[0].kind {
        DeclarationKind::Simple { declarators, .. } => {
            let fp = &declarators[0];
            assert!(!fp.is_function_type());
            assert_eq!(fp.innermost_name().text, "fp");
        }
        other => panic!("expected simple declaration, got {other:?}"),
    }
    match &outcome.unit.declarations()[1].kind {
        DeclarationKind::Simple { declarators, .. } => {
            assert!(declarators[0].is_function_type());
            assert_eq!(declarators[0].pointers.len(), 1);
        }
        other => panic!("expected simple declaration, got {other:?}"),
    }
}

#[test]
fn test_bit_fields_and_labels() {
    let source = r#"
        struct flags { unsigned ready : 1; unsigned : 3; };
        void f(int n) {
        again:
            if (n) goto again;
        }
    "#;
    let outcome = parse(source);
    assert_eq!(count_problems(&outcome.unit), 0);

    let body = function_body(&outcome.unit, 1);
    match &body[0].kind {
        StatementKind::Label { name, body } => {
            assert_eq!(name.text, "again");
            assert!(matches!(body.kind, StatementKind::If { .. }));
        }
        other => panic!("expected labeled statement, got {other:?}"),
    }
}

/// `(T)-sizeof(T[...])` nests a cast ambiguity around a sizeof ambiguity.
/// Every reading re-parses the inner levels, so the node count multiplies
/// with each level.
fn mixed_nest(levels: usize) -> String {
    let mut expression = String::from("x");
    for _ in 0..levels {
        expression = format!("(T)-sizeof(T[{expression}])");
    }
    format!("typedef int T; int x; int n = {expression};")
}

#[test]
fn test_mixed_nesting_grows_per_level() {
    let mut previous = 0;
    for levels in 1..=6 {
        let outcome = parse(&mixed_nest(levels));
        assert_eq!(count_problems(&outcome.unit), 0);
        assert_eq!(outcome.unit.declarations().len(), 3);

        let ambiguities = count_ambiguities(&outcome.unit);
        assert!(
            ambiguities >= 2 * previous.max(1),
            "{levels} levels: {ambiguities} ambiguities after {previous}"
        );
        previous = ambiguities;
    }
}
