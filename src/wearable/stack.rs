use std::collections::BTreeMap;

use crate::definition::model::WearableCategory;
use crate::wearable::model::Wearable;

/// Hard cap on wearables stacked in one category.
pub const MAX_WEARABLES_PER_CATEGORY: usize = 5;

/// An ordered collection of wearables per category.
///
/// Insertion order is rendering/authority order; the last wearable of a
/// category is "top" and authoritative for parameter and texture lookups.
/// The stack itself is a plain container: cross-category re-synchronization
/// after a composition change is driven by [`crate::Appearance`], which
/// calls driver propagation eagerly inside each mutating call.
#[derive(Clone, Debug, Default)]
pub struct WearableStack {
    slots: BTreeMap<WearableCategory, Vec<Wearable>>,
}

impl WearableStack {
    /// Empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a wearable on top of its category. Returns the wearable back
    /// when the category is already at [`MAX_WEARABLES_PER_CATEGORY`].
    pub fn push(&mut self, wearable: Wearable) -> Result<(), Wearable> {
        let slot = self.slots.entry(wearable.category()).or_default();
        if slot.len() >= MAX_WEARABLES_PER_CATEGORY {
            return Err(wearable);
        }
        slot.push(wearable);
        Ok(())
    }

    /// Pop the top wearable of a category.
    pub fn pop(&mut self, category: WearableCategory) -> Option<Wearable> {
        self.slots.get_mut(&category)?.pop()
    }

    /// Swap two wearables within a category. False when either index is
    /// out of range.
    pub fn swap(&mut self, category: WearableCategory, i: usize, j: usize) -> bool {
        let Some(slot) = self.slots.get_mut(&category) else {
            return false;
        };
        if i >= slot.len() || j >= slot.len() {
            return false;
        }
        slot.swap(i, j);
        true
    }

    /// The authoritative (last-pushed) wearable of a category.
    pub fn top(&self, category: WearableCategory) -> Option<&Wearable> {
        self.slots.get(&category)?.last()
    }

    /// Mutable access to the authoritative wearable of a category.
    pub fn top_mut(&mut self, category: WearableCategory) -> Option<&mut Wearable> {
        self.slots.get_mut(&category)?.last_mut()
    }

    /// The bottom (first-pushed) wearable of a category.
    pub fn bottom(&self, category: WearableCategory) -> Option<&Wearable> {
        self.slots.get(&category)?.first()
    }

    /// Number of wearables in a category.
    pub fn count(&self, category: WearableCategory) -> usize {
        self.slots.get(&category).map_or(0, Vec::len)
    }

    /// Iterate a category's wearables bottom → top.
    pub fn iter(&self, category: WearableCategory) -> impl Iterator<Item = &Wearable> {
        self.slots.get(&category).into_iter().flatten()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/wearable/stack.rs"]
mod tests;
