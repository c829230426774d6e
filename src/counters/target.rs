//! Target reference registry – `target-counter()` / `target-counters()`.
//!
//! A reference names an element id and a counter. The first query registers
//! interest and yields nothing; when the walk reaches the element carrying
//! that id, every pending entry for it captures the counter's value at that
//! position. Later queries format the captured raw values in whatever glyph
//! style they ask for.

use std::collections::HashMap;

use super::numbering::{format_counter, GlyphStyle};
use super::scope::{join_values, CounterScopeStore};

#[derive(Debug, Clone, Default)]
struct TargetEntries {
    /// `target-counter` entries by counter name.
    single: HashMap<String, Option<i32>>,
    /// `target-counters` entries by counter name, values outermost first.
    lists: HashMap<String, Option<Vec<i32>>>,
}

impl TargetEntries {
    fn has_pending(&self) -> bool {
        self.single.values().any(Option::is_none) || self.lists.values().any(Option::is_none)
    }
}

/// Per-id, per-counter cache of values captured at the target element.
#[derive(Debug, Clone, Default)]
pub struct TargetRegistry {
    entries: HashMap<String, TargetEntries>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of counter `name` at the element with `id`, formatted with
    /// `style`, or `None` while that element has not been visited.
    pub fn resolve_target_counter(
        &mut self,
        id: &str,
        name: &str,
        style: GlyphStyle,
    ) -> Option<String> {
        let entry = self
            .entries
            .entry(id.to_string())
            .or_default()
            .single
            .entry(name.to_string())
            .or_insert(None);
        entry.map(|value| format_counter(value, style))
    }

    /// Like [`resolve_target_counter`](Self::resolve_target_counter) but for
    /// the whole nested value list, joined with `separator`.
    pub fn resolve_target_counters(
        &mut self,
        id: &str,
        name: &str,
        separator: &str,
        style: GlyphStyle,
    ) -> Option<String> {
        let entry = self
            .entries
            .entry(id.to_string())
            .or_default()
            .lists
            .entry(name.to_string())
            .or_insert(None);
        entry
            .as_deref()
            .map(|values| join_values(values, separator, style))
    }

    /// Capture every pending reference to `id` from the current counter state.
    ///
    /// Entries already resolved are left alone, so a duplicated id keeps the
    /// value captured at its first occurrence.
    pub fn on_visit_element_with_id(&mut self, id: &str, store: &CounterScopeStore) {
        let Some(entries) = self.entries.get_mut(id) else {
            return;
        };
        for (name, slot) in entries.single.iter_mut() {
            if slot.is_none() {
                let value = store.value(name);
                log::trace!("target #{id} captured {name} = {value}");
                *slot = Some(value);
            }
        }
        for (name, slot) in entries.lists.iter_mut() {
            if slot.is_none() {
                let values = store.values(name);
                log::trace!("target #{id} captured {name} = {values:?}");
                *slot = Some(values);
            }
        }
    }

    /// Whether any reference to `id` is still waiting for its element.
    pub fn is_pending(&self, id: &str) -> bool {
        self.entries.get(id).is_some_and(TargetEntries::has_pending)
    }

    /// Ids with at least one unresolved reference, sorted.
    pub fn pending_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .entries
            .iter()
            .filter(|(_, e)| e.has_pending())
            .map(|(id, _)| id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counters::scope::{ElementKey, ScopeBracket};

    #[test]
    fn forward_reference_resolves_on_visit() {
        let mut store = CounterScopeStore::new();
        let mut registry = TargetRegistry::new();

        assert_eq!(
            registry.resolve_target_counter("x", "item", GlyphStyle::Decimal),
            None
        );
        assert!(registry.is_pending("x"));

        store.reset("item", 7);
        registry.on_visit_element_with_id("x", &store);

        assert_eq!(
            registry.resolve_target_counter("x", "item", GlyphStyle::LowerRoman),
            Some("vii".to_string())
        );
        assert_eq!(
            registry.resolve_target_counter("x", "item", GlyphStyle::Decimal),
            Some("7".to_string())
        );
        assert!(!registry.is_pending("x"));
    }

    #[test]
    fn unvisited_target_stays_unresolved() {
        let mut registry = TargetRegistry::new();
        for _ in 0..3 {
            assert_eq!(
                registry.resolve_target_counter("missing", "item", GlyphStyle::Decimal),
                None
            );
        }
        assert_eq!(registry.pending_ids(), vec!["missing"]);
    }

    #[test]
    fn visit_without_interest_is_noop() {
        let mut store = CounterScopeStore::new();
        let mut registry = TargetRegistry::new();
        store.reset("item", 3);
        registry.on_visit_element_with_id("x", &store);
        // Interest registered after the visit: nothing captures it.
        assert_eq!(
            registry.resolve_target_counter("x", "item", GlyphStyle::Decimal),
            None
        );
    }

    #[test]
    fn resolution_happens_once() {
        let mut store = CounterScopeStore::new();
        let mut registry = TargetRegistry::new();
        registry.resolve_target_counter("dup", "item", GlyphStyle::Decimal);
        store.reset("item", 1);
        registry.on_visit_element_with_id("dup", &store);
        store.reset("item", 2);
        registry.on_visit_element_with_id("dup", &store);
        assert_eq!(
            registry.resolve_target_counter("dup", "item", GlyphStyle::Decimal),
            Some("1".to_string())
        );
    }

    #[test]
    fn list_variant_reformats_from_raw_values() {
        let mut store = CounterScopeStore::new();
        let mut bracket = ScopeBracket::new();
        let mut registry = TargetRegistry::new();

        assert_eq!(
            registry.resolve_target_counters("fig", "item", ".", GlyphStyle::Decimal),
            None
        );

        store.reset("item", 2);
        bracket.on_enter(ElementKey(1), &mut store);
        store.reset("item", 3);
        registry.on_visit_element_with_id("fig", &store);
        bracket.on_exit(ElementKey(1), &mut store);

        assert_eq!(
            registry.resolve_target_counters("fig", "item", ".", GlyphStyle::Decimal),
            Some("2.3".to_string())
        );
        assert_eq!(
            registry.resolve_target_counters("fig", "item", "-", GlyphStyle::UpperLatin),
            Some("B-C".to_string())
        );
    }

    #[test]
    fn single_and_list_entries_are_independent() {
        let mut store = CounterScopeStore::new();
        let mut registry = TargetRegistry::new();
        registry.resolve_target_counter("x", "item", GlyphStyle::Decimal);
        store.reset("item", 5);
        registry.on_visit_element_with_id("x", &store);
        assert_eq!(
            registry.resolve_target_counters("x", "item", ".", GlyphStyle::Decimal),
            None
        );
    }
}
