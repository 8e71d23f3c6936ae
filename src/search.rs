//! Linear and binary search over slices
//!
//! Binary search expects the slice to be sorted ascending under the same
//! ordering the comparator uses. Nothing checks this: an unsorted slice gives an
//! unspecified (but in-bounds) answer.

use std::cmp::Ordering;

/// Index of the first element equal to `key`, scanning left to right
pub fn linear_search<T: PartialEq>(items: &[T], key: &T) -> Option<usize> {
    linear_search_by(items, |item| item == key)
}

/// Index of the first element matching the predicate
pub fn linear_search_by<T, P>(items: &[T], mut pred: P) -> Option<usize>
where
    P: FnMut(&T) -> bool,
{
    items.iter().position(|item| pred(item))
}

/// Binary search for `key` within the inclusive index range `low..=high`.
///
/// Returns `None` when `low > high`. A `high` past the end of the slice is
/// clamped to the last index.
pub fn binary_search<T: Ord>(items: &[T], key: &T, low: usize, high: usize) -> Option<usize> {
    binary_search_by(items, low, high, |item| item.cmp(key))
}

/// Binary search over the whole slice
pub fn binary_search_all<T: Ord>(items: &[T], key: &T) -> Option<usize> {
    let high = items.len().checked_sub(1)?;
    binary_search(items, key, 0, high)
}

/// Binary search with a comparator returning the ordering of an element relative
/// to the sought key.
pub fn binary_search_by<T, P>(items: &[T], low: usize, high: usize, mut cmp: P) -> Option<usize>
where
    P: FnMut(&T) -> Ordering,
{
    let mut low = low;
    let mut high = high.min(items.len().checked_sub(1)?);

    while low <= high {
        let mid = low + (high - low) / 2;
        match cmp(&items[mid]) {
            Ordering::Equal => return Some(mid),
            Ordering::Less => low = mid + 1,
            // The key is left of `mid`; an exhausted left side ends the search.
            Ordering::Greater => high = mid.checked_sub(1)?,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_first_match() {
        let values = [2, 3, 4, 10, 4];
        assert_eq!(linear_search(&values, &4), Some(2));
        assert_eq!(linear_search(&values, &7), None);
        assert_eq!(linear_search::<i32>(&[], &1), None);
    }

    #[test]
    fn test_linear_unsorted_input() {
        let names = ["delta", "alpha", "charlie"];
        assert_eq!(linear_search_by(&names, |n| n.starts_with('c')), Some(2));
    }

    #[test]
    fn test_binary_examples() {
        let values = [1, 3, 5, 8];
        assert_eq!(binary_search(&values, &8, 0, 3), Some(3));
        assert_eq!(binary_search(&values, &4, 0, 3), None);
        assert_eq!(binary_search(&values, &1, 0, 3), Some(0));
    }

    #[test]
    fn test_binary_low_above_high() {
        let values = [1, 2, 3];
        assert_eq!(binary_search(&values, &2, 2, 1), None);
    }

    #[test]
    fn test_binary_subrange() {
        let values = [1, 3, 5, 8, 13];
        assert_eq!(binary_search(&values, &3, 2, 4), None);
        assert_eq!(binary_search(&values, &13, 2, 4), Some(4));
    }

    #[test]
    fn test_binary_clamps_high() {
        let values = [2, 4, 6];
        assert_eq!(binary_search(&values, &6, 0, 100), Some(2));
        assert_eq!(binary_search_all::<i32>(&[], &6), None);
    }

    #[test]
    fn test_binary_key_below_minimum() {
        let values = [10, 20, 30];
        assert_eq!(binary_search_all(&values, &5), None);
    }
}
