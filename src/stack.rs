//! LIFO stack on top of the ordered list

use crate::list::{Iter, OrderedList};

/// Last-in first-out stack
#[derive(Debug)]
pub struct Stack<T> {
    items: OrderedList<T>,
}

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Stack<T> {
    pub fn new() -> Self {
        Self {
            items: OrderedList::new(),
        }
    }

    pub fn push(&mut self, value: T) {
        self.items.insert_front(value);
    }

    /// Remove the top value; `None` on an empty stack
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    pub fn peek(&self) -> Option<&T> {
        self.items.front()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Top to bottom
    pub fn iter(&self) -> Iter<'_, T> {
        self.items.iter()
    }
}
