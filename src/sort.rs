//! Whole-slice sorting algorithms
//!
//! Each algorithm sorts in place and comes in two forms: `*_by` takes a
//! comparator, the plain form uses the element's natural order. Comparators
//! must describe a total order.
//!
//! | Algorithm | Stable | Time            | Extra space |
//! |-----------|--------|-----------------|-------------|
//! | bubble    | yes    | O(n) .. O(n^2)  | O(1)        |
//! | insertion | yes    | O(n) .. O(n^2)  | O(1)        |
//! | selection | no     | O(n^2)          | O(1)        |
//! | merge     | yes    | O(n log n)      | O(n)        |
//! | quick     | no     | O(n log n) .. O(n^2) | O(log n) .. O(n) stack |

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Selectable sorting algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Bubble,
    Insertion,
    Selection,
    #[default]
    Merge,
    Quick,
}

impl Algorithm {
    pub const ALL: [Algorithm; 5] = [
        Algorithm::Bubble,
        Algorithm::Insertion,
        Algorithm::Selection,
        Algorithm::Merge,
        Algorithm::Quick,
    ];

    /// Whether equal elements keep their relative order
    pub fn is_stable(&self) -> bool {
        matches!(self, Algorithm::Bubble | Algorithm::Insertion | Algorithm::Merge)
    }

    /// Sort with a comparator
    pub fn sort_by<T, F>(&self, items: &mut [T], compare: F)
    where
        T: Clone,
        F: FnMut(&T, &T) -> Ordering,
    {
        match self {
            Algorithm::Bubble => bubble_sort_by(items, compare),
            Algorithm::Insertion => insertion_sort_by(items, compare),
            Algorithm::Selection => selection_sort_by(items, compare),
            Algorithm::Merge => merge_sort_by(items, compare),
            Algorithm::Quick => quick_sort_by(items, compare),
        }
    }

    /// Sort by natural order
    pub fn sort<T: Ord + Clone>(&self, items: &mut [T]) {
        self.sort_by(items, T::cmp)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Bubble => "bubble",
            Algorithm::Insertion => "insertion",
            Algorithm::Selection => "selection",
            Algorithm::Merge => "merge",
            Algorithm::Quick => "quick",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown algorithm '{}'", s))
    }
}

/// Bubble sort. Stops after the first pass that swaps nothing.
pub fn bubble_sort_by<T, F>(items: &mut [T], mut compare: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    let n = items.len();
    for pass in 0..n.saturating_sub(1) {
        let mut swapped = false;
        // The last `pass` elements are already in place.
        for j in 0..n - pass - 1 {
            if compare(&items[j], &items[j + 1]) == Ordering::Greater {
                items.swap(j, j + 1);
                swapped = true;
            }
        }
        if !swapped {
            break;
        }
    }
}

pub fn bubble_sort<T: Ord>(items: &mut [T]) {
    bubble_sort_by(items, T::cmp)
}

/// Insertion sort. Shifts each element left past strictly greater ones.
pub fn insertion_sort_by<T, F>(items: &mut [T], mut compare: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 && compare(&items[j - 1], &items[j]) == Ordering::Greater {
            items.swap(j - 1, j);
            j -= 1;
        }
    }
}

pub fn insertion_sort<T: Ord>(items: &mut [T]) {
    insertion_sort_by(items, T::cmp)
}

/// Selection sort. Always O(n^2) comparisons; the long-range swap makes it unstable.
pub fn selection_sort_by<T, F>(items: &mut [T], mut compare: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    let n = items.len();
    for i in 0..n.saturating_sub(1) {
        let mut min = i;
        for j in i + 1..n {
            if compare(&items[j], &items[min]) == Ordering::Less {
                min = j;
            }
        }
        if min != i {
            items.swap(i, min);
        }
    }
}

pub fn selection_sort<T: Ord>(items: &mut [T]) {
    selection_sort_by(items, T::cmp)
}

/// Top-down merge sort
pub fn merge_sort_by<T, F>(items: &mut [T], mut compare: F)
where
    T: Clone,
    F: FnMut(&T, &T) -> Ordering,
{
    merge_sort_range(items, &mut compare);
}

pub fn merge_sort<T: Ord + Clone>(items: &mut [T]) {
    merge_sort_by(items, T::cmp)
}

fn merge_sort_range<T, F>(items: &mut [T], compare: &mut F)
where
    T: Clone,
    F: FnMut(&T, &T) -> Ordering,
{
    if items.len() < 2 {
        return;
    }
    let mid = items.len() / 2;
    merge_sort_range(&mut items[..mid], compare);
    merge_sort_range(&mut items[mid..], compare);
    merge(items, mid, compare);
}

/// Merge the sorted runs `items[..mid]` and `items[mid..]`.
fn merge<T, F>(items: &mut [T], mid: usize, compare: &mut F)
where
    T: Clone,
    F: FnMut(&T, &T) -> Ordering,
{
    let left = items[..mid].to_vec();
    let right = items[mid..].to_vec();

    let (mut i, mut j, mut k) = (0, 0, 0);
    while i < left.len() && j < right.len() {
        // Ties take from the left run, which keeps the sort stable.
        if compare(&left[i], &right[j]) != Ordering::Greater {
            items[k] = left[i].clone();
            i += 1;
        } else {
            items[k] = right[j].clone();
            j += 1;
        }
        k += 1;
    }
    for value in left[i..].iter().chain(&right[j..]) {
        items[k] = value.clone();
        k += 1;
    }
}

/// Quick sort with a Lomuto partition around the last element.
///
/// Already sorted or reverse sorted input hits the O(n^2) worst case, with
/// recursion depth proportional to the input length.
pub fn quick_sort_by<T, F>(items: &mut [T], mut compare: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    quick_sort_range(items, &mut compare);
}

pub fn quick_sort<T: Ord>(items: &mut [T]) {
    quick_sort_by(items, T::cmp)
}

fn quick_sort_range<T, F>(items: &mut [T], compare: &mut F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    if items.len() < 2 {
        return;
    }
    let pivot = partition(items, compare);
    let (left, right) = items.split_at_mut(pivot);
    quick_sort_range(left, compare);
    quick_sort_range(&mut right[1..], compare);
}

/// Returns the final index of the pivot.
fn partition<T, F>(items: &mut [T], compare: &mut F) -> usize
where
    F: FnMut(&T, &T) -> Ordering,
{
    let high = items.len() - 1;
    let mut store = 0;
    for j in 0..high {
        if compare(&items[j], &items[high]) == Ordering::Less {
            items.swap(store, j);
            store += 1;
        }
    }
    items.swap(store, high);
    store
}

/// Whether the slice is non-decreasing under the comparator
pub fn is_sorted_by<T, F>(items: &[T], mut compare: F) -> bool
where
    F: FnMut(&T, &T) -> Ordering,
{
    items
        .windows(2)
        .all(|pair| compare(&pair[0], &pair[1]) != Ordering::Greater)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_algorithms_sort_sample() {
        for algorithm in Algorithm::ALL {
            let mut values = vec![64, 25, 12, 22, 11, 25, -3, 0];
            algorithm.sort(&mut values);
            assert_eq!(values, vec![-3, 0, 11, 12, 22, 25, 25, 64], "{}", algorithm);
        }
    }

    #[test]
    fn test_quick_and_merge_small() {
        let mut a = [5, 3, 8, 1];
        let mut b = a;
        quick_sort(&mut a);
        merge_sort(&mut b);
        assert_eq!(a, [1, 3, 5, 8]);
        assert_eq!(b, [1, 3, 5, 8]);
    }

    #[test]
    fn test_empty_and_single() {
        for algorithm in Algorithm::ALL {
            let mut empty: Vec<i32> = vec![];
            algorithm.sort(&mut empty);
            assert!(empty.is_empty());

            let mut one = vec![42];
            algorithm.sort(&mut one);
            assert_eq!(one, vec![42]);
        }
    }

    #[test]
    fn test_descending_comparator() {
        let mut values = vec![1, 4, 2, 3];
        quick_sort_by(&mut values, |a, b| b.cmp(a));
        assert_eq!(values, vec![4, 3, 2, 1]);
    }

    #[test]
    fn test_bubble_early_exit_on_sorted_input() {
        let mut comparisons = 0;
        let mut values: Vec<u32> = (0..100).collect();
        bubble_sort_by(&mut values, |a, b| {
            comparisons += 1;
            a.cmp(b)
        });
        assert_eq!(comparisons, 99);
    }

    #[test]
    fn test_selection_comparisons_ignore_input_order() {
        let count = |mut values: Vec<u32>| {
            let mut comparisons = 0;
            selection_sort_by(&mut values, |a, b| {
                comparisons += 1;
                a.cmp(b)
            });
            comparisons
        };
        let sorted: Vec<u32> = (0..20).collect();
        let reversed: Vec<u32> = (0..20).rev().collect();
        assert_eq!(count(sorted), 190);
        assert_eq!(count(reversed), 190);
    }

    #[test]
    fn test_stable_algorithms_keep_tie_order() {
        let pairs = vec![(2, 'a'), (1, 'b'), (2, 'c'), (1, 'd'), (2, 'e')];
        for algorithm in Algorithm::ALL.into_iter().filter(Algorithm::is_stable) {
            let mut sorted = pairs.clone();
            algorithm.sort_by(&mut sorted, |x, y| x.0.cmp(&y.0));
            assert_eq!(
                sorted,
                vec![(1, 'b'), (1, 'd'), (2, 'a'), (2, 'c'), (2, 'e')],
                "{}",
                algorithm
            );
        }
    }

    #[test]
    fn test_quick_sort_reverse_input() {
        let mut values: Vec<i32> = (0..500).rev().collect();
        quick_sort(&mut values);
        assert!(is_sorted_by(&values, i32::cmp));
    }

    #[test]
    fn test_parse_algorithm() {
        assert_eq!("Quick".parse::<Algorithm>().unwrap(), Algorithm::Quick);
        assert!("heap".parse::<Algorithm>().is_err());
        assert_eq!(Algorithm::default(), Algorithm::Merge);
    }
}
