//! CSS counters & generated numbering.
//!
//! [`CounterContext`] bundles the state one document conversion needs:
//! the [`CounterScopeStore`], the [`ScopeBracket`] records and the
//! [`TargetRegistry`]. Create one per conversion and pass it down the walk;
//! it is never shared between conversions.
//!
//! Subtree descent goes through [`CounterContext::enter`], whose guard runs
//! the exit hook on drop so an aborted subtree can not leave stale ancestor
//! values behind for its siblings.

pub mod numbering;
pub mod placeholder;
pub mod scope;
pub mod target;

use std::ops::{Deref, DerefMut};

pub use numbering::{alphabet_for, format_counter, GlyphStyle};
pub use placeholder::PageCounterPlaceholder;
pub use scope::{CounterScopeStore, ElementKey, ScopeBracket};
pub use target::TargetRegistry;

/// Counter state for a single document conversion.
#[derive(Debug, Default)]
pub struct CounterContext {
    store: CounterScopeStore,
    bracket: ScopeBracket,
    targets: TargetRegistry,
}

impl CounterContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &CounterScopeStore {
        &self.store
    }

    pub fn targets(&self) -> &TargetRegistry {
        &self.targets
    }

    pub fn reset(&mut self, name: &str, value: i32) {
        self.store.reset(name, value);
    }

    pub fn set(&mut self, name: &str, value: i32) {
        self.store.set(name, value);
    }

    pub fn increment(&mut self, name: &str, delta: i32) {
        self.store.increment(name, delta);
    }

    pub fn resolve(&self, name: &str, style: GlyphStyle) -> String {
        self.store.resolve(name, style)
    }

    pub fn resolve_list(&self, name: &str, separator: &str, style: GlyphStyle) -> String {
        self.store.resolve_list(name, separator, style)
    }

    pub fn resolve_target_counter(
        &mut self,
        id: &str,
        name: &str,
        style: GlyphStyle,
    ) -> Option<String> {
        self.targets.resolve_target_counter(id, name, style)
    }

    pub fn resolve_target_counters(
        &mut self,
        id: &str,
        name: &str,
        separator: &str,
        style: GlyphStyle,
    ) -> Option<String> {
        self.targets
            .resolve_target_counters(id, name, separator, style)
    }

    pub fn on_visit_element_with_id(&mut self, id: &str) {
        self.targets.on_visit_element_with_id(id, &self.store);
    }

    /// Raw enter hook. Prefer [`enter`](Self::enter), which pairs the exit.
    pub fn on_enter(&mut self, key: ElementKey) {
        self.bracket.on_enter(key, &mut self.store);
    }

    /// Raw exit hook, the counterpart of [`on_enter`](Self::on_enter).
    pub fn on_exit(&mut self, key: ElementKey) {
        self.bracket.on_exit(key, &mut self.store);
    }

    /// Enter `key`'s scope; the scope is exited when the guard drops.
    pub fn enter(&mut self, key: ElementKey) -> ScopeGuard<'_> {
        self.on_enter(key);
        ScopeGuard { ctx: self, key }
    }

    /// Run `f` inside `key`'s scope.
    pub fn with_scope<T, E>(
        &mut self,
        key: ElementKey,
        f: impl FnOnce(&mut CounterContext) -> Result<T, E>,
    ) -> Result<T, E> {
        let mut scope = self.enter(key);
        f(&mut *scope)
    }

    pub fn open_scopes(&self) -> usize {
        self.bracket.open_scopes()
    }

    /// Drop all stacks, open scopes and target entries.
    pub fn clear(&mut self) {
        self.store.clear();
        self.bracket.clear();
        self.targets.clear();
    }
}

/// An entered element scope. Dereferences to the [`CounterContext`] so the
/// subtree walk keeps using it; dropping it runs the exit hook.
#[derive(Debug)]
pub struct ScopeGuard<'a> {
    ctx: &'a mut CounterContext,
    key: ElementKey,
}

impl ScopeGuard<'_> {
    pub fn key(&self) -> ElementKey {
        self.key
    }
}

impl Deref for ScopeGuard<'_> {
    type Target = CounterContext;

    fn deref(&self) -> &CounterContext {
        self.ctx
    }
}

impl DerefMut for ScopeGuard<'_> {
    fn deref_mut(&mut self) -> &mut CounterContext {
        self.ctx
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.ctx.on_exit(self.key);
    }
}
