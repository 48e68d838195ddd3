//! Source spans for reduced rules
//!
//! A rule covers a half-open range of token indices. Its span starts at the
//! first covered token and ends where the last covered token ends. Rules that
//! cover no tokens get a zero-length span at the next token.

use crate::parser::ast::Span;
use crate::parser::lexer::Token;

/// Half-open range `start..end` of token indices consumed by one reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleSpan {
    pub start: usize,
    pub end: usize,
}

impl RuleSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The covered tokens. Indices past the stream are clamped, since the
    /// parser may read past a trailing end-of-completion token.
    pub fn tokens<'t>(&self, tokens: &'t [Token]) -> &'t [Token] {
        let end = self.end.min(tokens.len());
        let start = self.start.min(end);
        &tokens[start..end]
    }
}

pub fn token_span(token: &Token) -> Span {
    Span::between(token.offset, token.end)
}

pub fn rule_span(tokens: &[Token], rule: RuleSpan) -> Span {
    let covered = rule.tokens(tokens);
    match (covered.first(), covered.last()) {
        (Some(first), Some(last)) => Span::between(first.offset, last.end),
        _ => {
            let offset = tokens
                .get(rule.start)
                .or_else(|| tokens.last())
                .map_or(0, |token| token.offset);
            Span::new(offset, 0)
        }
    }
}

/// Span covering all of `spans`, or `None` when there are none.
pub fn covering(spans: impl IntoIterator<Item = Span>) -> Option<Span> {
    spans.into_iter().reduce(Span::union)
}
