// Code-completion parses

use lrdom::action::{CompletionContext, CompletionNode, ParseOutcome};
use lrdom::parser::ast::{DeclarationKind, StatementKind};
use lrdom::visit::{count_ambiguities, count_problems};
use lrdom::{Parser, ParserOptions};

fn complete(source: &str) -> ParseOutcome {
    complete_at(source, source.len())
}

fn complete_at(source: &str, caret: usize) -> ParseOutcome {
    let options = ParserOptions::default().with_completion_offset(caret);
    Parser::with_options(source, options)
        .unwrap()
        .parse_translation_unit()
        .unwrap()
}

fn contexts(completion: &CompletionNode) -> Vec<Option<CompletionContext>> {
    completion.entries().iter().map(|entry| entry.context).collect()
}

#[test]
fn test_field_reference_completion() {
    let outcome = complete("struct S { int abc; }; void f(struct S *p) { p->ab");
    let completion = outcome.completion.as_ref().expect("completion node");

    assert_eq!(completion.prefix(), Some("ab"));
    assert_eq!(contexts(completion), vec![Some(CompletionContext::FieldReference)]);
    assert_eq!(outcome.unit.declarations().len(), 2);
}

#[test]
fn test_id_expression_completion() {
    let outcome = complete("int value; int main(void) { return va");
    let completion = outcome.completion.as_ref().expect("completion node");

    assert_eq!(completion.prefix(), Some("va"));
    assert_eq!(contexts(completion), vec![Some(CompletionContext::IdExpression)]);
}

#[test]
fn test_statement_start_collects_both_readings() {
    let outcome = complete("void f(void) { ab");
    let completion = outcome.completion.as_ref().expect("completion node");

    let found = contexts(completion);
    assert_eq!(found.len(), 2);
    assert!(found.contains(&Some(CompletionContext::TypeName)));
    assert!(found.contains(&Some(CompletionContext::IdExpression)));
    assert!(completion.names().all(|name| name.text == "ab"));
}

#[test]
fn test_declarator_completion() {
    let outcome = complete("void f(void) { unsigned co");
    let completion = outcome.completion.as_ref().expect("completion node");
    assert_eq!(contexts(completion), vec![Some(CompletionContext::Declarator)]);
}

#[test]
fn test_goto_completion() {
    let outcome = complete("void f(void) { goto ou");
    let completion = outcome.completion.as_ref().expect("completion node");
    assert_eq!(contexts(completion), vec![Some(CompletionContext::Goto)]);
}

#[test]
fn test_input_after_caret_is_ignored() {
    let outcome = complete_at("int x = ab; int y;", 10);
    let completion = outcome.completion.as_ref().expect("completion node");

    assert_eq!(completion.prefix(), Some("ab"));
    assert_eq!(outcome.unit.declarations().len(), 1);
    assert_eq!(contexts(completion), vec![Some(CompletionContext::IdExpression)]);
}

#[test]
fn test_empty_prefix_in_whitespace() {
    let outcome = complete("int x = 1; ");
    let completion = outcome.completion.as_ref().expect("completion node");

    assert_eq!(completion.prefix(), None);
    assert_eq!(completion.len(), 1);
    assert_eq!(outcome.unit.declarations().len(), 2);
}

#[test]
fn test_completion_refers_to_finished_unit() {
    let outcome = complete("int value; int main(void) { return va");
    let completion = outcome.completion.as_ref().expect("completion node");

    let unit = completion.translation_unit().expect("back-reference");
    assert!(std::ptr::eq(unit, &*outcome.unit));
    assert!(unit.is_frozen());
}

#[test]
fn test_expression_completion() {
    let options = ParserOptions::default().with_completion_offset(5);
    let outcome = Parser::with_options("a + b", options)
        .unwrap()
        .parse_expression()
        .unwrap();

    let completion = outcome.completion.expect("completion node");
    assert_eq!(completion.prefix(), Some("b"));
    assert_eq!(contexts(&completion), vec![Some(CompletionContext::IdExpression)]);
    assert!(!outcome.expression.is_problem());
}

#[test]
fn test_no_completion_without_caret() {
    let outcome = Parser::new("int main(void) { return 0; }")
        .unwrap()
        .parse_translation_unit()
        .unwrap();
    assert!(outcome.completion.is_none());
}

#[test]
fn test_caret_closed_call_keeps_statement_ambiguity() {
    let source = "typedef int T; void g(int x) { T * x = f(ab";
    let outcome = complete(source);

    assert_eq!(count_ambiguities(&outcome.unit), 1);
    match &outcome.unit.declarations()[1].kind {
        DeclarationKind::FunctionDefinition { body, .. } => match &body.kind {
            StatementKind::Compound(statements) => {
                assert!(statements[0].is_ambiguous());
            }
            other => panic!("expected compound body, got {other:?}"),
        },
        other => panic!("expected function definition, got {other:?}"),
    }
    let completion = outcome.completion.as_ref().expect("completion node");
    assert_eq!(completion.prefix(), Some("ab"));

    let plain = complete("typedef int T; void g(int x) { T * x = ab");
    assert_eq!(count_ambiguities(&plain.unit), 1);
}

#[test]
fn test_completion_independent_of_sibling_ambiguity() {
    let plain = complete("typedef int T; int f(int x) { x * x; return va");
    let ambiguous = complete("typedef int T; int f(int x) { T * x; return va");
    assert_eq!(count_ambiguities(&plain.unit), 0);
    assert_eq!(count_ambiguities(&ambiguous.unit), 1);

    let plain = plain.completion.expect("completion node");
    let ambiguous = ambiguous.completion.expect("completion node");
    assert_eq!(plain.prefix(), Some("va"));
    assert_eq!(plain.prefix(), ambiguous.prefix());
    assert_eq!(plain.len(), ambiguous.len());
    assert_eq!(contexts(&plain), contexts(&ambiguous));
}

#[test]
fn test_caret_in_comment_or_string_has_no_completion() {
    let comment = complete_at("int x; /* com */", 12);
    assert!(comment.completion.is_none());
    assert_eq!(comment.unit.declarations().len(), 1);
    assert_eq!(count_problems(&comment.unit), 0);

    let string = complete_at(r#"char *s = "abc";"#, 12);
    assert!(string.completion.is_none());
}
