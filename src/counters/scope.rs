//! Counter scoping – the per-name running values and the enter/exit hooks
//! that bracket each element's subtree.
//!
//! A counter name has at most one *current* value (the innermost scope that
//! gave it a value) plus a stack of values pushed by ancestors whose
//! subtrees are still open. Entering an element moves every current value
//! onto its stack; leaving the element discards whatever the subtree set and
//! pops exactly the names that element pushed.

use std::collections::HashMap;

use super::numbering::{format_counter, GlyphStyle};

/// Stable identity of a tree element, assigned by the traversal (arena index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementKey(pub usize);

impl From<usize> for ElementKey {
    fn from(index: usize) -> Self {
        ElementKey(index)
    }
}

// ---------------------------------------------------------------------------
// Counter scope store
// ---------------------------------------------------------------------------

/// Current values and ancestor stacks for every counter name in a document.
#[derive(Debug, Clone, Default)]
pub struct CounterScopeStore {
    current: HashMap<String, i32>,
    ancestors: HashMap<String, Vec<i32>>,
}

impl CounterScopeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current value of `name`. The ancestor stack is untouched.
    pub fn reset(&mut self, name: &str, value: i32) {
        self.current.insert(name.to_string(), value);
    }

    /// Add `delta` to the innermost value of `name`.
    ///
    /// Without a current value the top of the ancestor stack is mutated in
    /// place, so nested elements keep counting on their ancestor's running
    /// value. With neither, the counter is created as if reset to 0.
    pub fn increment(&mut self, name: &str, delta: i32) {
        if let Some(value) = self.current.get_mut(name) {
            *value = value.saturating_add(delta);
            return;
        }
        if let Some(top) = self.ancestors.get_mut(name).and_then(|s| s.last_mut()) {
            *top = top.saturating_add(delta);
            return;
        }
        self.current.insert(name.to_string(), delta);
    }

    /// Overwrite the innermost value of `name` (`counter-set`), creating the
    /// counter when no scope holds it.
    pub fn set(&mut self, name: &str, value: i32) {
        if let Some(current) = self.current.get_mut(name) {
            *current = value;
            return;
        }
        if let Some(top) = self.ancestors.get_mut(name).and_then(|s| s.last_mut()) {
            *top = value;
            return;
        }
        self.current.insert(name.to_string(), value);
    }

    /// Innermost value of `name`; 0 for a counter nobody set.
    pub fn value(&self, name: &str) -> i32 {
        if let Some(&value) = self.current.get(name) {
            return value;
        }
        self.ancestors
            .get(name)
            .and_then(|s| s.last().copied())
            .unwrap_or(0)
    }

    /// All values of `name`, outermost first, ending with the current value
    /// if one is set. `[0]` when the counter has no value anywhere.
    pub fn values(&self, name: &str) -> Vec<i32> {
        let mut values: Vec<i32> = self.ancestors.get(name).cloned().unwrap_or_default();
        if let Some(&value) = self.current.get(name) {
            values.push(value);
        }
        if values.is_empty() {
            values.push(0);
        }
        values
    }

    /// `counter(name, style)`.
    pub fn resolve(&self, name: &str, style: GlyphStyle) -> String {
        format_counter(self.value(name), style)
    }

    /// `counters(name, separator, style)`.
    pub fn resolve_list(&self, name: &str, separator: &str, style: GlyphStyle) -> String {
        join_values(&self.values(name), separator, style)
    }

    /// Drop every ancestor stack. Current values belong to the scope bracket.
    pub fn clear(&mut self) {
        self.ancestors.clear();
    }

    /// The value set in the innermost active scope, if any.
    pub fn current(&self, name: &str) -> Option<i32> {
        self.current.get(name).copied()
    }

    /// Number of ancestor values held for `name`.
    pub fn ancestor_depth(&self, name: &str) -> usize {
        self.ancestors.get(name).map_or(0, Vec::len)
    }

    /// Move every current value onto its ancestor stack; returns the names moved.
    fn push_current(&mut self) -> Vec<String> {
        let mut pushed = Vec::with_capacity(self.current.len());
        for (name, value) in self.current.drain() {
            self.ancestors.entry(name.clone()).or_default().push(value);
            pushed.push(name);
        }
        pushed
    }

    fn clear_current(&mut self) {
        self.current.clear();
    }

    /// Pop the top of `name`'s stack back into its current value.
    fn pop_into_current(&mut self, name: &str) -> bool {
        let Some(stack) = self.ancestors.get_mut(name) else {
            return false;
        };
        let Some(value) = stack.pop() else {
            return false;
        };
        if stack.is_empty() {
            self.ancestors.remove(name);
        }
        self.current.insert(name.to_string(), value);
        true
    }
}

/// Format every value with `style` and join them with `separator`.
pub(crate) fn join_values(values: &[i32], separator: &str, style: GlyphStyle) -> String {
    values
        .iter()
        .map(|&v| format_counter(v, style))
        .collect::<Vec<_>>()
        .join(separator)
}

// ---------------------------------------------------------------------------
// Scope bracket
// ---------------------------------------------------------------------------

/// Records, per open element, which names its enter hook pushed.
#[derive(Debug, Clone, Default)]
pub struct ScopeBracket {
    pushed: HashMap<ElementKey, Vec<String>>,
}

impl ScopeBracket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called before descending into `key`'s children.
    pub fn on_enter(&mut self, key: ElementKey, store: &mut CounterScopeStore) {
        let names = store.push_current();
        log::trace!("enter {key:?}: pushed {names:?}");
        let previous = self.pushed.insert(key, names);
        debug_assert!(previous.is_none(), "element {key:?} entered twice");
    }

    /// Called after `key`'s children have been visited.
    pub fn on_exit(&mut self, key: ElementKey, store: &mut CounterScopeStore) {
        store.clear_current();
        let Some(names) = self.pushed.remove(&key) else {
            log::error!("exit of {key:?} without a matching enter");
            debug_assert!(false, "exit of {key:?} without a matching enter");
            return;
        };
        log::trace!("exit {key:?}: restoring {names:?}");
        for name in &names {
            if !store.pop_into_current(name) {
                log::error!("counter '{name}' pushed by {key:?} is missing from its stack");
                debug_assert!(false, "counter stack underflow for '{name}'");
            }
        }
    }

    /// Number of elements entered but not yet exited.
    pub fn open_scopes(&self) -> usize {
        self.pushed.len()
    }

    /// Forget every open element. Used between documents.
    pub fn clear(&mut self) {
        self.pushed.clear();
    }
}
