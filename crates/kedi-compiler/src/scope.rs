//! Lexically scoped name → slot bindings used by the renamer.

use std::collections::HashMap;

use kedi_types::plain::Slot;

/// A stack of block scopes. The bottom scope holds a function's parameters
/// and the top-level statements of its body.
#[derive(Debug, Default)]
pub(crate) struct ScopeStack {
    scopes: Vec<HashMap<String, Slot>>,
}

impl ScopeStack {
    /// A stack with one (function-level) scope.
    pub(crate) fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
        }
    }

    pub(crate) fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub(crate) fn pop_scope(&mut self) {
        debug_assert!(self.scopes.len() > 1, "cannot pop the function scope");
        self.scopes.pop();
    }

    /// Bind `name` in the innermost scope.
    ///
    /// Returns `false`, leaving the existing binding in place, if the name is
    /// already bound in that same scope.
    pub(crate) fn define(&mut self, name: &str, slot: Slot) -> bool {
        let Some(scope) = self.scopes.last_mut() else {
            return false;
        };
        if scope.contains_key(name) {
            return false;
        }
        scope.insert(name.to_string(), slot);
        true
    }

    pub(crate) fn defined_in_current_scope(&self, name: &str) -> bool {
        self.scopes.last().is_some_and(|scope| scope.contains_key(name))
    }

    /// Innermost binding of `name`.
    pub(crate) fn lookup(&self, name: &str) -> Option<Slot> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inner_scope_shadows_outer() {
        let mut scopes = ScopeStack::new();
        assert!(scopes.define("x", Slot(0)));
        scopes.push_scope();
        assert!(scopes.define("x", Slot(1)));
        assert_eq!(scopes.lookup("x"), Some(Slot(1)));
        scopes.pop_scope();
        assert_eq!(scopes.lookup("x"), Some(Slot(0)));
    }

    #[test]
    fn test_redefinition_in_same_scope_is_refused() {
        let mut scopes = ScopeStack::new();
        assert!(scopes.define("x", Slot(0)));
        assert!(scopes.defined_in_current_scope("x"));
        assert!(!scopes.define("x", Slot(1)));
        assert_eq!(scopes.lookup("x"), Some(Slot(0)));
        assert_eq!(scopes.lookup("y"), None);
    }
}
