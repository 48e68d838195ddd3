//! Declared-name table
//!
//! Tracks which identifiers currently name types, so the parser can tell a
//! typedef name from an ordinary identifier, and which names denote
//! functions, so the ambiguity resolver can apply its function-type rule.
//!
//! # Scoping
//!
//! Compound statements open a scope. A declaration in an inner scope shadows
//! the outer meaning of its name until the scope closes, at which point the
//! shadowed entry is restored. File scope is the bottom entry and never
//! closes.

use rustc_hash::FxHashMap;

/// What a declaration said about a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameInfo {
    pub is_typedef: bool,
    pub is_function: bool,
}

#[derive(Debug, Clone)]
pub struct DeclaredNames {
    names: FxHashMap<String, NameInfo>,
    scopes: Vec<ScopeData>,
}

#[derive(Debug, Clone, Default)]
struct ScopeData {
    // Previous meaning of every name declared in this scope, oldest first
    shadowed: Vec<(String, Option<NameInfo>)>,
}

/// Position in the table to rewind to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamesMark {
    scopes: usize,
    shadowed: usize,
}

impl Default for DeclaredNames {
    fn default() -> Self {
        Self {
            names: FxHashMap::default(),
            scopes: vec![ScopeData::default()],
        }
    }
}

impl DeclaredNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a new scope
    pub fn push_scope(&mut self) {
        self.scopes.push(ScopeData::default());
    }

    /// Exit the current scope, restoring whatever it shadowed
    pub fn pop_scope(&mut self) {
        if self.scopes.len() <= 1 {
            return;
        }
        if let Some(scope) = self.scopes.pop() {
            self.restore(scope.shadowed);
        }
    }

    /// Number of open block scopes (file scope is depth 0).
    pub fn depth(&self) -> usize {
        self.scopes.len() - 1
    }

    pub fn mark(&self) -> NamesMark {
        NamesMark {
            scopes: self.scopes.len(),
            shadowed: self.scopes.last().map_or(0, |scope| scope.shadowed.len()),
        }
    }

    /// Undo every scope change and declaration made since `mark`.
    pub fn rewind(&mut self, mark: NamesMark) {
        while self.scopes.len() > mark.scopes {
            self.pop_scope();
        }
        if self.scopes.len() == mark.scopes {
            let undone = match self.scopes.last_mut() {
                Some(scope) if scope.shadowed.len() > mark.shadowed => {
                    scope.shadowed.split_off(mark.shadowed)
                }
                _ => return,
            };
            self.restore(undone);
        }
    }

    pub fn declare(&mut self, name: &str, info: NameInfo) {
        if name.is_empty() {
            return;
        }
        let previous = self.names.insert(name.to_string(), info);
        if let Some(scope) = self.scopes.last_mut() {
            scope.shadowed.push((name.to_string(), previous));
        }
    }

    pub fn lookup(&self, name: &str) -> Option<NameInfo> {
        self.names.get(name).copied()
    }

    pub fn is_type_name(&self, name: &str) -> bool {
        self.lookup(name).is_some_and(|info| info.is_typedef)
    }

    pub fn is_function(&self, name: &str) -> bool {
        self.lookup(name).is_some_and(|info| info.is_function)
    }

    fn restore(&mut self, shadowed: Vec<(String, Option<NameInfo>)>) {
        for (name, previous) in shadowed.into_iter().rev() {
            match previous {
                Some(info) => {
                    self.names.insert(name, info);
                }
                None => {
                    self.names.remove(&name);
                }
            }
        }
    }
}
