use crate::space::Action;
use crate::space::Path;
use crate::space::State;

/// A reference to a `SearchTreeNode<St, A>`.
///
/// It's just an index into the `SearchTree` that owns the node, so it's only
/// meaningful for the search that created it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SearchTreeIndex {
    index: usize,
}

impl SearchTreeIndex {
    #[inline(always)]
    fn new(index: usize) -> Self {
        Self { index }
    }
}

#[derive(Clone, Debug)]
pub struct SearchTreeNode<St, A>
where
    St: State,
    A: Action,
{
    /// The node this one was reached from, and how.
    ///
    /// Only the root has no parent.
    pub(crate) parent: Option<(SearchTreeIndex, A)>,
    pub(crate) state: St,
}

impl<St, A> SearchTreeNode<St, A>
where
    St: State,
    A: Action,
{
    pub fn new_root(s: St) -> Self {
        Self {
            parent: None,
            state: s,
        }
    }

    pub fn new_from_parent(s: St, parent: SearchTreeIndex, a: A) -> Self {
        Self {
            parent: Some((parent, a)),
            state: s,
        }
    }

    pub fn state(&self) -> &St {
        &self.state
    }

    pub fn action(&self) -> Option<A> {
        self.parent.map(|(_p, a)| a)
    }
}

/// Arena of search nodes.
///
/// Nodes are never removed, so parent links can't dangle while the tree lives.
/// Parents are always pushed before their children, so following parent links
/// strictly decreases the index and can't cycle.
pub struct SearchTree<St, A>
where
    St: State,
    A: Action,
{
    nodes: Vec<SearchTreeNode<St, A>>,
}

impl<St, A> SearchTree<St, A>
where
    St: State,
    A: Action,
{
    #[inline(always)]
    #[must_use]
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    #[inline(always)]
    pub fn push(&mut self, node: SearchTreeNode<St, A>) -> SearchTreeIndex {
        debug_assert!(
            node.parent
                .is_none_or(|(p, _a)| p.index < self.nodes.len()),
            "Parents must be in the tree before their children"
        );
        let index = SearchTreeIndex::new(self.nodes.len());
        self.nodes.push(node);
        index
    }

    #[inline(always)]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline(always)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Bytes currently reserved for nodes.
    pub fn capacity_bytes(&self) -> usize {
        self.nodes.capacity() * std::mem::size_of::<SearchTreeNode<St, A>>()
    }

    /// Reconstructs the path from the root to the given node.
    #[must_use]
    pub fn path(&self, mut node_index: SearchTreeIndex) -> Path<St, A> {
        #[cfg(feature = "coz_profile")]
        coz::scope!("PathReconstruction");

        let mut steps = Vec::<(A, St)>::new();
        while let Some((parent_index, a)) = self[node_index].parent {
            steps.push((a, *self[node_index].state()));
            debug_assert!(parent_index.index < node_index.index);
            node_index = parent_index;
        }

        // Walked back to the root
        let mut path = Path::<St, A>::new_from_start(*self[node_index].state());
        path.steps = steps;
        path.reverse();
        path
    }
}

impl<St, A> Default for SearchTree<St, A>
where
    St: State,
    A: Action,
{
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl<St, A> std::ops::Index<SearchTreeIndex> for SearchTree<St, A>
where
    St: State,
    A: Action,
{
    type Output = SearchTreeNode<St, A>;

    #[inline(always)]
    fn index(&self, index: SearchTreeIndex) -> &Self::Output {
        &self.nodes[index.index]
    }
}

impl<St, A> std::fmt::Debug for SearchTree<St, A>
where
    St: State,
    A: Action,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "SearchTree{{({} nodes)}}", self.len())
    }
}
