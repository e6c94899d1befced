//! A list kept sorted by a floating-point priority.
//!
//! Used for both the scheduler's task pool and the compositor's paint list:
//! iteration order is ascending priority, and equal priorities keep their
//! insertion order (oldest first).

use std::cmp::Ordering;

use crate::error::{EngineError, EngineResult};

/// Anything that carries a sort key for a [`PriorityOrderedList`].
pub trait Prioritized {
    fn priority(&self) -> f64;
}

/// Total order over priorities: NaN sorts above every number and all NaNs
/// are equal to each other; `-0.0` sorts below `+0.0`.
pub fn compare_priority(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.total_cmp(&b),
    }
}

#[derive(Debug, Clone)]
pub struct PriorityOrderedList<T> {
    items: Vec<T>,
}

impl<T> Default for PriorityOrderedList<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Prioritized> PriorityOrderedList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `item` before the first element whose priority is strictly
    /// greater. Returns the index it landed on.
    pub fn insert(&mut self, item: T) -> usize {
        let key = item.priority();
        let index = self
            .items
            .partition_point(|e| compare_priority(e.priority(), key) != Ordering::Greater);
        self.items.insert(index, item);
        index
    }

    /// Positional insertion would break the ordering, so it always fails.
    pub fn insert_at(&mut self, index: usize, _item: T) -> EngineResult<()> {
        Err(EngineError::unsupported(format!(
            "priority-ordered lists can't be inserted by index (requested {index})"
        )))
    }
}

impl<T> PriorityOrderedList<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Mutable access to an element. Callers must not change its priority.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    pub fn position(&self, pred: impl FnMut(&T) -> bool) -> Option<usize> {
        self.items.iter().position(pred)
    }

    /// Remove by position.
    pub fn remove(&mut self, index: usize) -> Option<T> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Remove the first element matching `pred`.
    pub fn remove_first(&mut self, pred: impl FnMut(&T) -> bool) -> Option<T> {
        let index = self.position(pred)?;
        Some(self.items.remove(index))
    }

    pub fn retain(&mut self, pred: impl FnMut(&T) -> bool) {
        self.items.retain(pred);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: PartialEq> PriorityOrderedList<T> {
    /// Remove the first element equal to `item`.
    pub fn remove_item(&mut self, item: &T) -> Option<T> {
        self.remove_first(|e| e == item)
    }
}

impl<T: Prioritized> Extend<T> for PriorityOrderedList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.insert(item);
        }
    }
}

impl<T: Prioritized> FromIterator<T> for PriorityOrderedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl<'a, T> IntoIterator for &'a PriorityOrderedList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T> IntoIterator for PriorityOrderedList<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
