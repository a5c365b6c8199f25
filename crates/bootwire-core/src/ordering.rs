//! Default ordering policy for processors.
//!
//! Priority-ordered components always sort first. Within that split,
//! components are ordered by their explicit order value ascending; a
//! missing value counts as [`LOWEST_PRECEDENCE`]. Sorting is stable, so
//! equal keys keep their discovery order.

use std::cmp::Ordering;

use bootwire_protocols::{ComponentDescriptor, OrderingPolicy, Tier};

/// Order value that sorts before every other value.
pub const HIGHEST_PRECEDENCE: i32 = i32::MIN;

/// Order value assumed when a component declares none.
pub const LOWEST_PRECEDENCE: i32 = i32::MAX;

/// The default [`OrderingPolicy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderComparator;

impl OrderComparator {
    pub fn order_value(descriptor: &ComponentDescriptor) -> i32 {
        descriptor.order.unwrap_or(LOWEST_PRECEDENCE)
    }
}

impl OrderingPolicy for OrderComparator {
    fn compare(&self, a: &ComponentDescriptor, b: &ComponentDescriptor) -> Ordering {
        let a_priority = self.classify(a) == Tier::HighestPriority;
        let b_priority = self.classify(b) == Tier::HighestPriority;
        match (a_priority, b_priority) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => Self::order_value(a).cmp(&Self::order_value(b)),
        }
    }
}

/// Stable sort of `items` by the descriptor each one maps to.
pub fn sort_by_policy<T>(
    policy: &dyn OrderingPolicy,
    items: Vec<T>,
    descriptor: impl Fn(&T) -> ComponentDescriptor,
) -> Vec<T> {
    let mut keyed: Vec<(ComponentDescriptor, T)> = items
        .into_iter()
        .map(|item| (descriptor(&item), item))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| policy.compare(a, b));
    keyed.into_iter().map(|(_, item)| item).collect()
}

#[cfg(test)]
#[path = "ordering_tests.rs"]
mod tests;
