//! Singly linked ordered container
//!
//! Every node owns the next one through `Option<Box<_>>`, so the chain is
//! forward-only and cannot form cycles. New values always go to the head:
//! iteration therefore yields the most recently inserted value first.

use std::fmt;

use crate::record::Keyed;

type Link<T> = Option<Box<Node<T>>>;

struct Node<T> {
    value: T,
    next: Link<T>,
}

/// Head-insertion singly linked list
pub struct OrderedList<T> {
    head: Link<T>,
    len: usize,
}

impl<T> OrderedList<T> {
    /// Create an empty list
    pub fn new() -> Self {
        Self { head: None, len: 0 }
    }

    /// Number of values in the list
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the list holds no values
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Insert a value at the head. O(1).
    pub fn insert_front(&mut self, value: T) {
        let node = Box::new(Node {
            value,
            next: self.head.take(),
        });
        self.head = Some(node);
        self.len += 1;
    }

    /// Remove and return the head value
    pub fn pop_front(&mut self) -> Option<T> {
        self.head.take().map(|node| {
            let Node { value, next } = *node;
            self.head = next;
            self.len -= 1;
            value
        })
    }

    /// The head value
    pub fn front(&self) -> Option<&T> {
        self.head.as_deref().map(|node| &node.value)
    }

    /// Iterate head to tail
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            next: self.head.as_deref(),
        }
    }

    /// Visit every value head to tail
    pub fn for_each(&self, mut visitor: impl FnMut(&T)) {
        for value in self.iter() {
            visitor(value);
        }
    }

    /// First value matching the predicate
    pub fn find_by(&self, mut pred: impl FnMut(&T) -> bool) -> Option<&T> {
        self.iter().find(|value| pred(value))
    }

    /// First value matching the predicate, mutably
    pub fn find_mut_by(&mut self, mut pred: impl FnMut(&T) -> bool) -> Option<&mut T> {
        let mut cursor = self.head.as_deref_mut();
        while let Some(node) = cursor {
            if pred(&node.value) {
                return Some(&mut node.value);
            }
            cursor = node.next.as_deref_mut();
        }
        None
    }

    /// Unlink and return the first value matching the predicate
    pub fn remove_by(&mut self, mut pred: impl FnMut(&T) -> bool) -> Option<T> {
        let mut cursor = &mut self.head;
        while cursor.as_ref().is_some_and(|node| !pred(&node.value)) {
            cursor = &mut cursor.as_mut()?.next;
        }

        let node = cursor.take()?;
        let Node { value, next } = *node;
        *cursor = next;
        self.len -= 1;
        Some(value)
    }

    /// Unlink every value matching the predicate, returned head to tail
    pub fn remove_all_by(&mut self, mut pred: impl FnMut(&T) -> bool) -> Vec<T> {
        let mut removed = Vec::new();
        let mut cursor = &mut self.head;
        loop {
            if cursor.as_ref().is_some_and(|node| pred(&node.value)) {
                if let Some(node) = cursor.take() {
                    let Node { value, next } = *node;
                    *cursor = next;
                    removed.push(value);
                }
                continue;
            }
            match cursor {
                Some(node) => cursor = &mut node.next,
                None => break,
            }
        }
        self.len -= removed.len();
        removed
    }

    /// Drop every value
    pub fn clear(&mut self) {
        let mut cursor = self.head.take();
        while let Some(mut node) = cursor {
            cursor = node.next.take();
        }
        self.len = 0;
    }
}

impl<T: Keyed> OrderedList<T> {
    /// First value whose key matches. O(n).
    pub fn find(&self, key: &T::Key) -> Option<&T> {
        self.find_by(|value| value.key() == key)
    }

    /// First value whose key matches, mutably
    pub fn find_mut(&mut self, key: &T::Key) -> Option<&mut T> {
        self.find_mut_by(|value| value.key() == key)
    }

    /// Whether any value has this key
    pub fn contains(&self, key: &T::Key) -> bool {
        self.find(key).is_some()
    }

    /// Remove the first value whose key matches; reports whether one was found
    pub fn remove(&mut self, key: &T::Key) -> bool {
        self.remove_by(|value| value.key() == key).is_some()
    }
}

impl<T: Clone> OrderedList<T> {
    /// Copy the values out head to tail. The copy is independent of the list.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}

impl<T> Default for OrderedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

// Iterative so long chains cannot overflow the stack through recursive drops.
impl<T> Drop for OrderedList<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T> FromIterator<T> for OrderedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl<T> Extend<T> for OrderedList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert_front(value);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for OrderedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Borrowing iterator, head to tail
pub struct Iter<'a, T> {
    next: Option<&'a Node<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.next.map(|node| {
            self.next = node.next.as_deref();
            &node.value
        })
    }
}

impl<'a, T> IntoIterator for &'a OrderedList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
