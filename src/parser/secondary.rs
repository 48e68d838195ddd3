//! Restricted-grammar parsers used by the ambiguity resolver
//!
//! Each parser runs a fresh [`Driver`] over a token range the primary parse
//! already consumed. They share the primary parse's context, so typedef
//! names and completion claims behave the same in both readings.

use crate::action::ambiguity::{SecondaryParser, SecondaryParserFactory};
use crate::action::context::ParseContext;
use crate::action::dispatch::ActionEnv;
use crate::parser::ast::Expression;
use crate::parser::lexer::Token;
use crate::parser::parse::{Driver, Grammar};
use tracing::{trace, warn};

/// Parses a token range as exactly one expression of `grammar`.
#[derive(Debug, Clone, Copy)]
pub struct GrammarParser {
    grammar: Grammar,
}

impl GrammarParser {
    pub fn new(grammar: Grammar) -> Self {
        Self { grammar }
    }

    pub fn grammar(&self) -> Grammar {
        self.grammar
    }
}

impl SecondaryParser for GrammarParser {
    fn parse_secondary(
        &self,
        tokens: &[Token],
        env: ActionEnv<'_>,
        ctx: &mut ParseContext,
    ) -> Option<Expression> {
        match Driver::new(tokens, self.grammar, env, ctx).expression_root() {
            Ok(expression) => Some(expression),
            Err(err) if err.is_syntax() => {
                trace!(grammar = ?self.grammar, %err, "no secondary reading");
                None
            }
            Err(err) => {
                warn!(grammar = ?self.grammar, %err, "secondary parse failed");
                None
            }
        }
    }
}

/// The three restricted grammars the resolver asks for.
#[derive(Debug, Clone, Copy)]
pub struct RestrictedGrammars {
    expression: GrammarParser,
    no_cast: GrammarParser,
    sizeof: GrammarParser,
}

impl Default for RestrictedGrammars {
    fn default() -> Self {
        Self {
            expression: GrammarParser::new(Grammar::Expression),
            no_cast: GrammarParser::new(Grammar::NoCastExpression),
            sizeof: GrammarParser::new(Grammar::SizeofExpression),
        }
    }
}

impl SecondaryParserFactory for RestrictedGrammars {
    fn expression_parser(&self) -> &dyn SecondaryParser {
        &self.expression
    }

    fn no_cast_expression_parser(&self) -> &dyn SecondaryParser {
        &self.no_cast
    }

    fn sizeof_expression_parser(&self) -> &dyn SecondaryParser {
        &self.sizeof
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restricted_grammars() {
        let grammars = RestrictedGrammars::default();
        assert_eq!(grammars.expression.grammar(), Grammar::Expression);
        assert!(!grammars.no_cast.grammar().recognizes_casts());
        assert!(grammars.no_cast.grammar().recognizes_type_id_operands());
        assert!(!grammars.sizeof.grammar().recognizes_type_id_operands());
    }
}
