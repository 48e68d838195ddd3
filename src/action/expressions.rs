//! Expression reductions

use super::completion::CompletionContext;
use super::dispatch::ActionCore;
use super::errors::ActionError;
use super::span::RuleSpan;
use super::value::StackValue;
use crate::parser::ast::*;

impl ActionCore<'_, '_> {
    pub(super) fn consume_expression_literal(
        &mut self,
        kind: LiteralKind,
        rule: RuleSpan,
    ) -> Result<(), ActionError> {
        let token = self.left_token(rule)?;
        let mut expression = self.env.factory.new_literal_expression(kind, &token.text);
        expression.span = self.rule_span(rule);
        self.push(expression);
        Ok(())
    }

    pub(super) fn consume_expression_id(&mut self, rule: RuleSpan) -> Result<(), ActionError> {
        let token = self.left_token(rule)?;
        let name = self.create_name(token);
        self.claim_name(&name, CompletionContext::IdExpression);
        let mut expression = self.env.factory.new_id_expression(name);
        expression.span = self.rule_span(rule);
        self.push(expression);
        Ok(())
    }

    pub(super) fn consume_expression_bracketed(&mut self, rule: RuleSpan) -> Result<(), ActionError> {
        let operand = self.pop_expression()?;
        let mut expression = self
            .env
            .factory
            .new_unary_expression(UnaryOp::Bracketed, operand);
        expression.span = self.rule_span(rule);
        self.push(expression);
        Ok(())
    }

    /// Comma-separated expressions. A single expression is not wrapped.
    pub(super) fn consume_expression_list(&mut self, rule: RuleSpan) -> Result<(), ActionError> {
        let mut items = self
            .close_scope()?
            .into_iter()
            .map(StackValue::into_expression)
            .collect::<Result<Vec<_>, _>>()?;

        if items.len() == 1 {
            if let Some(single) = items.pop() {
                self.push(single);
                return Ok(());
            }
        }

        let mut expression = self.env.factory.new_expression_list(items);
        expression.span = self.rule_span(rule);
        self.push(expression);
        Ok(())
    }

    pub(super) fn consume_expression_array_subscript(&mut self, rule: RuleSpan) -> Result<(), ActionError> {
        let subscript = self.pop_expression()?;
        let array = self.pop_expression()?;
        let mut expression = self
            .env
            .factory
            .new_array_subscript_expression(array, subscript);
        expression.span = self.rule_span(rule);
        self.push(expression);
        Ok(())
    }

    pub(super) fn consume_expression_function_call(&mut self, rule: RuleSpan) -> Result<(), ActionError> {
        let argument = self.pop_optional_expression()?;
        let function = self.pop_expression()?;
        let mut expression = self
            .env
            .factory
            .new_function_call_expression(function, argument);
        expression.span = self.rule_span(rule);
        self.push(expression);
        Ok(())
    }

    /// `owner.field` or `owner->field`; the field is the rule's right token.
    pub(super) fn consume_expression_field_reference(
        &mut self,
        is_pointer: bool,
        rule: RuleSpan,
    ) -> Result<(), ActionError> {
        let token = self.right_token(rule)?;
        let field = self.create_name(token);
        self.claim_name(&field, CompletionContext::FieldReference);
        let owner = self.pop_expression()?;
        let mut expression = self.env.factory.new_field_reference(owner, field, is_pointer);
        expression.span = self.rule_span(rule);
        self.push(expression);
        Ok(())
    }

    pub(super) fn consume_expression_unary(&mut self, op: UnaryOp, rule: RuleSpan) -> Result<(), ActionError> {
        let operand = self.pop_expression()?;
        let mut expression = self.env.factory.new_unary_expression(op, operand);
        expression.span = self.rule_span(rule);
        self.push(expression);
        Ok(())
    }

    pub(super) fn consume_expression_binary(&mut self, op: BinaryOp, rule: RuleSpan) -> Result<(), ActionError> {
        let right = self.pop_expression()?;
        let left = self.pop_expression()?;
        let mut expression = self.env.factory.new_binary_expression(op, left, right);
        expression.span = self.rule_span(rule);
        self.push(expression);
        Ok(())
    }

    pub(super) fn consume_expression_conditional(&mut self, rule: RuleSpan) -> Result<(), ActionError> {
        let negative = self.pop_expression()?;
        let positive = self.pop_expression()?;
        let condition = self.pop_expression()?;
        let mut expression = self
            .env
            .factory
            .new_conditional_expression(condition, positive, negative);
        expression.span = self.rule_span(rule);
        self.push(expression);
        Ok(())
    }

    pub(super) fn consume_expression_problem(&mut self, rule: RuleSpan) {
        let problem = self.new_problem(rule);
        let mut expression = self.env.factory.new_problem_expression(problem);
        expression.span = self.rule_span(rule);
        self.push(expression);
    }
}

/// True when `expression` is built only from literals, so discarding it
/// cannot lose a name reference.
pub(super) fn is_name_free(expression: &Expression) -> bool {
    match &expression.kind {
        ExpressionKind::Literal { .. } => true,
        ExpressionKind::Unary { op, operand } => *op != UnaryOp::Sizeof && is_name_free(operand),
        ExpressionKind::Binary { left, right, .. } => is_name_free(left) && is_name_free(right),
        ExpressionKind::Conditional {
            condition,
            positive,
            negative,
        } => is_name_free(condition) && is_name_free(positive) && is_name_free(negative),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(text: &str) -> Expression {
        Expression::new(ExpressionKind::Literal {
            kind: LiteralKind::Integer,
            text: text.to_string(),
        })
    }

    #[test]
    fn test_name_free_expressions() {
        let sum = Expression::new(ExpressionKind::Binary {
            op: BinaryOp::Plus,
            left: Box::new(literal("1")),
            right: Box::new(literal("2")),
        });
        assert!(is_name_free(&sum));

        let with_name = Expression::new(ExpressionKind::Binary {
            op: BinaryOp::Plus,
            left: Box::new(literal("1")),
            right: Box::new(Expression::new(ExpressionKind::Id(Name::new("x")))),
        });
        assert!(!is_name_free(&with_name));
    }
}
