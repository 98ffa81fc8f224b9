//! Frontiers of discovered-but-not-yet-expanded search nodes.
//!
//! Both frontiers share the same contract and only differ on which end
//! `remove_next` takes from:
//!
//! - `StackFrontier` returns the most recently added node (depth-first).
//! - `QueueFrontier` returns the least recently added node (breadth-first).

use std::collections::VecDeque;
use std::fmt::Debug;

use clap::ValueEnum;
use derive_more::Display;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::search::SearchTreeIndex;
use crate::space::State;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("Tried removing a node from an empty frontier")]
pub struct EmptyFrontierError;

/// Traversal order used by a search.
#[derive(Copy, Clone, Debug, Default, Display, PartialEq, Eq, Hash, ValueEnum)]
pub enum FrontierPolicy {
    /// Last-in-first-out, explores depth-first.
    #[default]
    #[display("stack")]
    Stack,
    /// First-in-first-out, explores breadth-first and finds shortest paths.
    #[display("queue")]
    Queue,
}

/// A pending search node.
///
/// The node itself lives in the search tree, the frontier only keeps a
/// reference to it next to its state so membership checks don't need the tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FrontierEntry<St: State> {
    pub state: St,
    pub node: SearchTreeIndex,
}

pub trait Frontier<St: State>: Debug {
    /// The traversal order this frontier implements.
    const POLICY: FrontierPolicy;

    fn new() -> Self;

    fn add(&mut self, entry: FrontierEntry<St>);
    fn remove_next(&mut self) -> Result<FrontierEntry<St>, EmptyFrontierError>;
    fn contains_state(&self, s: &St) -> bool;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes currently reserved by the frontier.
    fn capacity_bytes(&self) -> usize;
}

/// Ordered entries plus a per-state count for O(1) membership checks.
#[derive(Debug)]
struct FrontierStorage<St: State> {
    entries: VecDeque<FrontierEntry<St>>,
    counts: FxHashMap<St, u32>,
}

impl<St: State> FrontierStorage<St> {
    fn new() -> Self {
        Self {
            entries: VecDeque::new(),
            counts: FxHashMap::default(),
        }
    }

    fn push(&mut self, entry: FrontierEntry<St>) {
        *self.counts.entry(entry.state).or_insert(0) += 1;
        self.entries.push_back(entry);
    }

    /// Updates membership for an entry that just left `entries`.
    fn forget(&mut self, entry: &FrontierEntry<St>) {
        match self.counts.get_mut(&entry.state) {
            Some(1) => {
                self.counts.remove(&entry.state);
            }
            Some(count) => *count -= 1,
            None => unreachable!("Frontier entry {entry:?} was not being counted"),
        }
    }

    fn contains(&self, s: &St) -> bool {
        self.counts.contains_key(s)
    }

    fn capacity_bytes(&self) -> usize {
        use std::mem::size_of;

        self.entries.capacity() * size_of::<FrontierEntry<St>>()
            + self.counts.capacity() * size_of::<(St, u32)>()
    }
}

/// Last-in-first-out frontier.
#[derive(Debug)]
pub struct StackFrontier<St: State> {
    storage: FrontierStorage<St>,
}

impl<St: State> Frontier<St> for StackFrontier<St> {
    const POLICY: FrontierPolicy = FrontierPolicy::Stack;

    fn new() -> Self {
        Self {
            storage: FrontierStorage::new(),
        }
    }

    #[inline(always)]
    fn add(&mut self, entry: FrontierEntry<St>) {
        self.storage.push(entry);
    }

    fn remove_next(&mut self) -> Result<FrontierEntry<St>, EmptyFrontierError> {
        let entry = self.storage.entries.pop_back().ok_or(EmptyFrontierError)?;
        self.storage.forget(&entry);
        Ok(entry)
    }

    #[inline(always)]
    fn contains_state(&self, s: &St) -> bool {
        self.storage.contains(s)
    }

    #[inline(always)]
    fn len(&self) -> usize {
        self.storage.entries.len()
    }

    fn capacity_bytes(&self) -> usize {
        self.storage.capacity_bytes()
    }
}

/// First-in-first-out frontier.
#[derive(Debug)]
pub struct QueueFrontier<St: State> {
    storage: FrontierStorage<St>,
}

impl<St: State> Frontier<St> for QueueFrontier<St> {
    const POLICY: FrontierPolicy = FrontierPolicy::Queue;

    fn new() -> Self {
        Self {
            storage: FrontierStorage::new(),
        }
    }

    #[inline(always)]
    fn add(&mut self, entry: FrontierEntry<St>) {
        self.storage.push(entry);
    }

    fn remove_next(&mut self) -> Result<FrontierEntry<St>, EmptyFrontierError> {
        let entry = self
            .storage
            .entries
            .pop_front()
            .ok_or(EmptyFrontierError)?;
        self.storage.forget(&entry);
        Ok(entry)
    }

    #[inline(always)]
    fn contains_state(&self, s: &St) -> bool {
        self.storage.contains(s)
    }

    #[inline(always)]
    fn len(&self) -> usize {
        self.storage.entries.len()
    }

    fn capacity_bytes(&self) -> usize {
        self.storage.capacity_bytes()
    }
}
