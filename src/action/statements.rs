//! Statement reductions

use super::completion::CompletionContext;
use super::dispatch::ActionCore;
use super::errors::ActionError;
use super::span::RuleSpan;
use super::value::StackValue;
use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;

impl ActionCore<'_, '_> {
    pub(super) fn consume_statement_labeled(&mut self, rule: RuleSpan) -> Result<(), ActionError> {
        let body = self.pop_statement()?;
        let token = self.left_token(rule)?;
        let name = self.create_name(token);
        self.claim_name(&name, CompletionContext::Label);
        let mut statement = self.env.factory.new_label_statement(name, body);
        statement.span = self.rule_span(rule);
        self.push(statement);
        Ok(())
    }

    /// `case expr: body` becomes a compound of the case label and its body.
    pub(super) fn consume_statement_case(&mut self, rule: RuleSpan) -> Result<(), ActionError> {
        let body = self.pop_statement()?;
        let expression = self.pop_expression()?;

        // The label ends at the last colon in front of the body
        let colon = self
            .rule_tokens(rule)
            .iter()
            .rev()
            .find(|token| self.kind_of(token) == TokenKind::Colon && token.offset < body.span.offset);
        let label_span = match colon {
            Some(colon) => Span::between(self.rule_span(rule).offset, colon.end),
            None => expression.span,
        };

        let mut label = self.env.factory.new_case_statement(expression);
        label.span = label_span;
        self.push_labeled_compound(label, body, rule);
        Ok(())
    }

    pub(super) fn consume_statement_default(&mut self, rule: RuleSpan) -> Result<(), ActionError> {
        let body = self.pop_statement()?;
        let label_end = (rule.start + 2).min(rule.end);
        let mut label = self.env.factory.new_default_statement();
        label.span = self.rule_span(RuleSpan::new(rule.start, label_end));
        self.push_labeled_compound(label, body, rule);
        Ok(())
    }

    fn push_labeled_compound(&mut self, label: Statement, body: Statement, rule: RuleSpan) {
        let mut statement = self.env.factory.new_compound_statement(vec![label, body]);
        statement.span = self.rule_span(rule);
        self.push(statement);
    }

    pub(super) fn consume_statement_null(&mut self, rule: RuleSpan) {
        let mut statement = self.env.factory.new_null_statement();
        statement.span = self.rule_span(rule);
        self.push(statement);
    }

    pub(super) fn consume_statement_expression(&mut self, rule: RuleSpan) -> Result<(), ActionError> {
        let expression = self.pop_expression()?;
        let mut statement = self.env.factory.new_expression_statement(expression);
        statement.span = self.rule_span(rule);
        self.push(statement);
        Ok(())
    }

    pub(super) fn consume_statement_compound(&mut self, has_body: bool, rule: RuleSpan) -> Result<(), ActionError> {
        let statements = if has_body {
            self.close_scope()?
                .into_iter()
                .map(StackValue::into_statement)
                .collect::<Result<Vec<_>, _>>()?
        } else {
            Vec::new()
        };

        let mut statement = self.env.factory.new_compound_statement(statements);
        statement.span = self.rule_span(rule);
        self.push(statement);
        Ok(())
    }

    pub(super) fn consume_statement_do_loop(&mut self, rule: RuleSpan) -> Result<(), ActionError> {
        let condition = self.pop_expression()?;
        let body = self.pop_statement()?;
        let mut statement = self.env.factory.new_do_statement(body, condition);
        statement.span = self.rule_span(rule);
        self.push(statement);
        Ok(())
    }

    pub(super) fn consume_statement_while_loop(&mut self, rule: RuleSpan) -> Result<(), ActionError> {
        let body = self.pop_statement()?;
        let condition = self.pop_expression()?;
        let mut statement = self.env.factory.new_while_statement(condition, body);
        statement.span = self.rule_span(rule);
        self.push(statement);
        Ok(())
    }

    /// The initializer is the empty marker, an expression or a declaration
    /// statement.
    pub(super) fn consume_statement_for_loop(&mut self, rule: RuleSpan) -> Result<(), ActionError> {
        let body = self.pop_statement()?;
        let iteration = self.pop_optional_expression()?;
        let condition = self.pop_optional_expression()?;
        let init = match self.pop()? {
            StackValue::Empty => None,
            StackValue::Statement(statement) => Some(statement),
            StackValue::Expression(expression) => {
                let span = expression.span;
                let mut statement = self.env.factory.new_expression_statement(expression);
                statement.span = span;
                Some(statement)
            }
            other => return Err(StackValue::unexpected("for-loop initializer", &other)),
        };

        let mut statement = self
            .env
            .factory
            .new_for_statement(init, condition, iteration, body);
        statement.span = self.rule_span(rule);
        self.push(statement);
        Ok(())
    }

    pub(super) fn consume_statement_if(&mut self, has_else: bool, rule: RuleSpan) -> Result<(), ActionError> {
        let else_clause = if has_else {
            Some(self.pop_statement()?)
        } else {
            None
        };
        let then_clause = self.pop_statement()?;
        let condition = self.pop_expression()?;
        let mut statement = self
            .env
            .factory
            .new_if_statement(condition, then_clause, else_clause);
        statement.span = self.rule_span(rule);
        self.push(statement);
        Ok(())
    }

    pub(super) fn consume_statement_switch(&mut self, rule: RuleSpan) -> Result<(), ActionError> {
        let body = self.pop_statement()?;
        let controller = self.pop_expression()?;
        let mut statement = self.env.factory.new_switch_statement(controller, body);
        statement.span = self.rule_span(rule);
        self.push(statement);
        Ok(())
    }

    /// `goto label;` where the label is the second token of the rule.
    pub(super) fn consume_statement_goto(&mut self, rule: RuleSpan) -> Result<(), ActionError> {
        let token = self.token(rule.start + 1)?;
        let name = self.create_name(token);
        self.claim_name(&name, CompletionContext::Goto);
        let mut statement = self.env.factory.new_goto_statement(name);
        statement.span = self.rule_span(rule);
        self.push(statement);
        Ok(())
    }

    pub(super) fn consume_statement_continue(&mut self, rule: RuleSpan) {
        let mut statement = self.env.factory.new_continue_statement();
        statement.span = self.rule_span(rule);
        self.push(statement);
    }

    pub(super) fn consume_statement_break(&mut self, rule: RuleSpan) {
        let mut statement = self.env.factory.new_break_statement();
        statement.span = self.rule_span(rule);
        self.push(statement);
    }

    pub(super) fn consume_statement_return(&mut self, has_value: bool, rule: RuleSpan) -> Result<(), ActionError> {
        let value = if has_value {
            Some(self.pop_expression()?)
        } else {
            None
        };
        let mut statement = self.env.factory.new_return_statement(value);
        statement.span = self.rule_span(rule);
        self.push(statement);
        Ok(())
    }

    pub(super) fn consume_statement_declaration(&mut self, rule: RuleSpan) -> Result<(), ActionError> {
        let declaration = self.pop_declaration()?;
        let statement = self.declaration_statement(declaration, rule);
        self.push(statement);
        Ok(())
    }

    pub(super) fn declaration_statement(&self, declaration: Declaration, rule: RuleSpan) -> Statement {
        let mut statement = self.env.factory.new_declaration_statement(declaration);
        statement.span = self.rule_span(rule);
        statement
    }

    pub(super) fn consume_statement_problem(&mut self, rule: RuleSpan) {
        let problem = self.new_problem(rule);
        let mut statement = self.env.factory.new_problem_statement(problem);
        statement.span = self.rule_span(rule);
        self.push(statement);
    }
}

/// Span of the statement tokens with a trailing `;` dropped. A statement
/// closed by the completion caret keeps its last token, which may be the
/// end-of-completion token an inner construct consumed.
pub(super) fn without_terminator(rule: RuleSpan, last: TokenKind) -> RuleSpan {
    if last == TokenKind::Semicolon {
        RuleSpan::new(rule.start, rule.end.saturating_sub(1))
    } else {
        rule
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::span::rule_span;
    use crate::parser::lexer::Token;

    #[test]
    fn test_without_terminator() {
        assert_eq!(
            without_terminator(RuleSpan::new(2, 5), TokenKind::Semicolon),
            RuleSpan::new(2, 4)
        );
        assert_eq!(
            without_terminator(RuleSpan::new(0, 0), TokenKind::Semicolon),
            RuleSpan::new(0, 0)
        );
    }

    #[test]
    fn test_completion_closed_statement_keeps_last_token() {
        assert_eq!(
            without_terminator(RuleSpan::new(3, 9), TokenKind::EndOfCompletion),
            RuleSpan::new(3, 9)
        );
    }

    #[test]
    fn test_rule_span_of_shortened_rule() {
        let tokens = vec![
            Token::new(TokenKind::Identifier, 0, 1, "f"),
            Token::new(TokenKind::LParen, 1, 2, "("),
            Token::new(TokenKind::RParen, 2, 3, ")"),
            Token::new(TokenKind::Semicolon, 3, 4, ";"),
        ];
        let rule = without_terminator(RuleSpan::new(0, 4), TokenKind::Semicolon);
        assert_eq!(rule_span(&tokens, rule), Span::new(0, 3));
    }
}
