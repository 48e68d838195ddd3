//! State shared by a primary parse and its secondary parses
//!
//! Each parse invocation owns its own AST stack, but the translation-unit
//! root, the completion node and the declared-name table belong to the
//! [`ParseContext`]. Secondary parses borrow the same context mutably for
//! the duration of the call, so identifiers they build at the caret land in
//! the same completion node.

use super::completion::{CompletionContext, CompletionNode};
use super::errors::ActionError;
use super::names::DeclaredNames;
use crate::parser::ast::{Name, TranslationUnit};
use std::rc::Rc;

#[derive(Debug)]
pub struct ParseContext {
    pub(crate) unit: TranslationUnit,
    pub(crate) completion: Option<CompletionNode>,
    pub(crate) names: DeclaredNames,
}

/// Result of parsing a translation unit.
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub unit: Rc<TranslationUnit>,
    pub completion: Option<CompletionNode>,
}

impl ParseContext {
    /// Fails if `unit` already has declarations or is frozen.
    pub fn new(unit: TranslationUnit) -> Result<Self, ActionError> {
        if unit.is_frozen() || !unit.declarations().is_empty() {
            return Err(ActionError::UnitNotFresh {
                declarations: unit.declarations().len(),
                frozen: unit.is_frozen(),
            });
        }
        Ok(Self {
            unit,
            completion: None,
            names: DeclaredNames::new(),
        })
    }

    pub fn unit(&self) -> &TranslationUnit {
        &self.unit
    }

    pub fn completion(&self) -> Option<&CompletionNode> {
        self.completion.as_ref()
    }

    pub fn names(&self) -> &DeclaredNames {
        &self.names
    }

    pub(crate) fn add_completion_name(&mut self, name: &Name, prefix: &str) {
        self.completion
            .get_or_insert_with(|| CompletionNode::new(prefix))
            .add_name(name.clone());
    }

    pub(crate) fn claim_completion_name(&mut self, name: &Name, context: CompletionContext) {
        if let Some(completion) = self.completion.as_mut() {
            completion.claim(name, context);
        }
    }

    /// Wraps up the parse: the unit becomes shared and the completion node
    /// gets its back-reference to it.
    pub fn finish(self) -> ParseOutcome {
        let unit = Rc::new(self.unit);
        let completion = self.completion.map(|mut completion| {
            completion.attach_unit(Rc::clone(&unit));
            completion
        });
        ParseOutcome { unit, completion }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Dialect;
    use crate::parser::ast::{Declaration, DeclarationKind, Problem, ProblemId, Span};

    #[test]
    fn test_rejects_populated_unit() {
        let mut unit = TranslationUnit::new(Dialect::C);
        unit.push_declaration(Declaration::new(DeclarationKind::Problem(Problem {
            id: ProblemId::SyntaxError,
            text: String::new(),
            span: Span::default(),
        })));

        assert!(matches!(
            ParseContext::new(unit),
            Err(ActionError::UnitNotFresh { declarations: 1, .. })
        ));
    }

    #[test]
    fn test_finish_links_completion_to_unit() {
        let mut context = ParseContext::new(TranslationUnit::new(Dialect::C)).unwrap();
        context.add_completion_name(&Name::new("ab"), "ab");

        let outcome = context.finish();
        let completion = outcome.completion.unwrap();
        assert!(completion.translation_unit().is_some());
        assert_eq!(completion.len(), 1);
    }
}
