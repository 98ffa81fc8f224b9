use std::fmt::Debug;
use std::hash::Hash;

use smallvec::SmallVec;

/// Maximum number of moves shown when displaying a `Path`.
const MAX_ACTIONS_DISPLAYED: usize = 20;

pub trait Action: Copy + Clone + Debug + PartialEq + Eq {}
pub trait State: Copy + Clone + Debug + PartialEq + Eq + Hash {}

/// Neighbours of a state, in the order the space generates them.
///
/// Grid spaces have at most 4 of them, so they fit inline.
pub type Neighbours<St, A> = SmallVec<[(St, A); 4]>;

/// A solution to a search problem.
///
/// The start state is kept separately and every step records the action taken
/// and the state it led to, so `steps` runs from the first move after `start`
/// up to the goal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Path<St, A>
where
    St: State,
    A: Action,
{
    pub start: St,
    pub steps: Vec<(A, St)>,
}

impl<St, A> Path<St, A>
where
    St: State,
    A: Action,
{
    #[inline(always)]
    pub fn new_from_start(start: St) -> Self {
        Self {
            start,
            steps: vec![],
        }
    }

    /// Number of edges in the path.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The last state reached.
    pub fn end(&self) -> St {
        match self.steps.last() {
            Some((_a, s)) => *s,
            None => self.start,
        }
    }

    /// Reverses the order of the steps.
    ///
    /// Useful when naturally reconstructing paths from the goal backwards.
    pub fn reverse(&mut self) {
        self.steps.reverse();
    }

    pub fn actions(&self) -> impl Iterator<Item = A> + '_ {
        self.steps.iter().map(|(a, _s)| *a)
    }

    /// States visited after `start`, in order.
    pub fn states(&self) -> impl Iterator<Item = St> + '_ {
        self.steps.iter().map(|(_a, s)| *s)
    }

    /// Whether a state is visited after `start`.
    pub fn contains(&self, state: &St) -> bool {
        self.steps.iter().any(|(_a, s)| s == state)
    }
}

impl<St, A> std::fmt::Display for Path<St, A>
where
    St: State,
    A: Action,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "Path({}, {:?}:{:?}:{:?})",
            self.len(),
            self.start,
            self.actions().take(MAX_ACTIONS_DISPLAYED).collect::<Vec<_>>(),
            self.end()
        )
    }
}

pub trait Space<St, A>: Clone + std::fmt::Debug
where
    St: State,
    A: Action,
{
    /// Applies an action, ignoring walls.
    ///
    /// Returns `None` when the resulting state can't be represented.
    fn apply(&self, s: &St, a: &A) -> Option<St>;

    /// Expands a State
    ///
    /// NOTE: The order is part of the contract, traversal policies break ties
    /// by it.
    fn neighbours(&self, s: &St) -> Neighbours<St, A>;

    /// Verify is a State is valid.
    fn valid(&self, s: &St) -> bool;

    /// Total number of states, passable or not.
    fn size(&self) -> usize;

    /// Checks that every step in the path is a legal move from the previous
    /// state, landing on the recorded state.
    fn valid_path(&self, p: &Path<St, A>) -> bool {
        if !self.valid(&p.start) {
            return false;
        }

        let mut state: St = p.start;
        for (a, s) in &p.steps {
            let legal = self
                .neighbours(&state)
                .iter()
                .any(|(ns, na)| ns == s && na == a);
            if !legal {
                return false;
            }
            match self.apply(&state, a) {
                Some(new_state) if new_state == *s => state = new_state,
                _ => return false,
            }
        }
        true
    }
}
