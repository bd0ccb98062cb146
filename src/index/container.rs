//! Priority Container - one capability, three extraction orders
//!
//! `PriorityContainer<T>` exposes `insert`, `extract_top` and `peek_top`. The
//! extraction order is picked at construction time:
//!
//! | Kind    | Top element        | Backing store   |
//! |---------|--------------------|-----------------|
//! | `Stack` | most recent insert | `Vec<T>`        |
//! | `Queue` | oldest insert      | `VecDeque<T>`   |
//! | `Heap`  | greatest element   | `BinaryHeap<T>` |
//!
//! Only the heap needs an ordering on `T`. It is captured as a comparator
//! when the heap is built, so stacks and queues accept any element type.
//!
//! Every operation except heap insert/extract is O(1); heap operations are
//! O(log n).

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{vec_deque, BinaryHeap, VecDeque};

/// Extraction order of a `PriorityContainer`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    /// Last in, first out
    Stack,
    /// First in, first out
    Queue,
    /// Greatest element first
    Heap,
}

impl std::fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContainerKind::Stack => write!(f, "stack"),
            ContainerKind::Queue => write!(f, "queue"),
            ContainerKind::Heap => write!(f, "heap"),
        }
    }
}

/// Ordering captured when a heap is built
struct Comparator<T>(fn(&T, &T) -> Ordering);

impl<T> Comparator<T> {
    fn compare(&self, a: &T, b: &T) -> Ordering {
        (self.0)(a, b)
    }
}

impl<T> Clone for Comparator<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Comparator<T> {}

impl<T> std::fmt::Debug for Comparator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Comparator")
    }
}

/// Heap slot ordered by the comparator captured at construction
#[derive(Debug, Clone)]
struct Ranked<T> {
    item: T,
    cmp: Comparator<T>,
}

impl<T> PartialEq for Ranked<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp.compare(&self.item, &other.item) == Ordering::Equal
    }
}

impl<T> Eq for Ranked<T> {}

impl<T> PartialOrd for Ranked<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Ranked<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp.compare(&self.item, &other.item)
    }
}

#[derive(Debug, Clone)]
enum Slots<T> {
    Stack(Vec<T>),
    Queue(VecDeque<T>),
    Heap {
        items: BinaryHeap<Ranked<T>>,
        cmp: Comparator<T>,
    },
}

/// Container whose extraction order is selected by `ContainerKind`
#[derive(Debug, Clone)]
pub struct PriorityContainer<T> {
    slots: Slots<T>,
}

impl<T: Ord> PriorityContainer<T> {
    pub fn new(kind: ContainerKind) -> Self {
        Self::with_capacity(kind, 0)
    }

    pub fn with_capacity(kind: ContainerKind, capacity: usize) -> Self {
        let slots = match kind {
            ContainerKind::Stack => Slots::Stack(Vec::with_capacity(capacity)),
            ContainerKind::Queue => Slots::Queue(VecDeque::with_capacity(capacity)),
            ContainerKind::Heap => Slots::Heap {
                items: BinaryHeap::with_capacity(capacity),
                cmp: Comparator(T::cmp),
            },
        };
        Self { slots }
    }
}

impl<T> PriorityContainer<T> {
    /// First-in, first-out container for element types without an ordering
    pub fn queue_with_capacity(capacity: usize) -> Self {
        Self {
            slots: Slots::Queue(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn insert(&mut self, item: T) {
        match &mut self.slots {
            Slots::Stack(items) => items.push(item),
            Slots::Queue(items) => items.push_back(item),
            Slots::Heap { items, cmp } => items.push(Ranked { item, cmp: *cmp }),
        }
    }

    /// Remove and return the top element
    pub fn extract_top(&mut self) -> Option<T> {
        match &mut self.slots {
            Slots::Stack(items) => items.pop(),
            Slots::Queue(items) => items.pop_front(),
            Slots::Heap { items, .. } => items.pop().map(|ranked| ranked.item),
        }
    }

    /// Return the top element without removing it
    pub fn peek_top(&self) -> Option<&T> {
        match &self.slots {
            Slots::Stack(items) => items.last(),
            Slots::Queue(items) => items.front(),
            Slots::Heap { items, .. } => items.peek().map(|ranked| &ranked.item),
        }
    }

    pub fn len(&self) -> usize {
        match &self.slots {
            Slots::Stack(items) => items.len(),
            Slots::Queue(items) => items.len(),
            Slots::Heap { items, .. } => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate in extraction order without consuming the container
    ///
    /// Stack and queue iteration is free; heap iteration sorts a vector of
    /// references first (O(n log n)).
    pub fn iter(&self) -> Iter<'_, T> {
        match &self.slots {
            Slots::Stack(items) => Iter::Stack(items.iter().rev()),
            Slots::Queue(items) => Iter::Queue(items.iter()),
            Slots::Heap { items, cmp } => {
                let mut sorted: Vec<&T> = items.iter().map(|ranked| &ranked.item).collect();
                sorted.sort_unstable_by(|a, b| cmp.compare(*b, *a));
                Iter::Heap(sorted.into_iter())
            }
        }
    }
}

impl<T> Extend<T> for PriorityContainer<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.insert(item);
        }
    }
}

/// Borrowing iterator over a `PriorityContainer`, in extraction order
pub enum Iter<'a, T> {
    Stack(std::iter::Rev<std::slice::Iter<'a, T>>),
    Queue(vec_deque::Iter<'a, T>),
    Heap(std::vec::IntoIter<&'a T>),
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Iter::Stack(inner) => inner.next(),
            Iter::Queue(inner) => inner.next(),
            Iter::Heap(inner) => inner.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Iter::Stack(inner) => inner.size_hint(),
            Iter::Queue(inner) => inner.size_hint(),
            Iter::Heap(inner) => inner.size_hint(),
        }
    }
}
