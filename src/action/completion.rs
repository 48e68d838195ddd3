//! Code-completion results
//!
//! A [`CompletionNode`] is created the first time an identifier is built from
//! the completion token. It records every such identifier together with the
//! construct that consumed it, whichever parser (primary or secondary) built
//! it. Tooling reads the prefix and entries after the parse finishes.

use crate::parser::ast::{Name, TranslationUnit};
use std::rc::Rc;

/// The construct an identifier at the caret was parsed as part of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionContext {
    IdExpression,
    FieldReference,
    TypeName,
    Declarator,
    Label,
    Goto,
    Enumerator,
    Tag,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionEntry {
    pub name: Name,
    /// `None` until a parent node consumes the name.
    pub context: Option<CompletionContext>,
}

#[derive(Debug, Clone, Default)]
pub struct CompletionNode {
    prefix: Option<String>,
    entries: Vec<CompletionEntry>,
    unit: Option<Rc<TranslationUnit>>,
}

impl CompletionNode {
    /// An empty prefix is stored as no prefix.
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: (!prefix.is_empty()).then(|| prefix.to_string()),
            entries: Vec::new(),
            unit: None,
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn entries(&self) -> &[CompletionEntry] {
        &self.entries
    }

    pub fn names(&self) -> impl Iterator<Item = &Name> {
        self.entries.iter().map(|entry| &entry.name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The finished translation unit the completion was requested in.
    pub fn translation_unit(&self) -> Option<&TranslationUnit> {
        self.unit.as_deref()
    }

    pub(crate) fn add_name(&mut self, name: Name) {
        self.entries.push(CompletionEntry {
            name,
            context: None,
        });
    }

    /// Attaches `context` to the most recent unclaimed entry for `name`.
    pub(crate) fn claim(&mut self, name: &Name, context: CompletionContext) {
        if let Some(entry) = self
            .entries
            .iter_mut()
            .rev()
            .find(|entry| entry.context.is_none() && entry.name == *name)
        {
            entry.context = Some(context);
        }
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
    }

    pub(crate) fn attach_unit(&mut self, unit: Rc<TranslationUnit>) {
        self.unit = Some(unit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_prefix_is_none() {
        assert_eq!(CompletionNode::new("").prefix(), None);
        assert_eq!(CompletionNode::new("ab").prefix(), Some("ab"));
    }

    #[test]
    fn test_claim_sets_context_once() {
        let mut node = CompletionNode::new("ab");
        node.add_name(Name::new("ab"));
        node.add_name(Name::new("ab"));

        node.claim(&Name::new("ab"), CompletionContext::TypeName);
        node.claim(&Name::new("ab"), CompletionContext::IdExpression);

        let contexts: Vec<_> = node.entries().iter().map(|entry| entry.context).collect();
        assert_eq!(
            contexts,
            vec![
                Some(CompletionContext::IdExpression),
                Some(CompletionContext::TypeName)
            ]
        );
    }
}
