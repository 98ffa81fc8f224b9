//! Uninformed search driven by a `Frontier`.
//!
//! The traversal order is entirely given by the frontier: a `StackFrontier`
//! makes this a depth-first search and a `QueueFrontier` a breadth-first one.

use std::marker::PhantomData;

use log::debug;
use log::info;
use log::trace;
use log::warn;
use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::frontier::EmptyFrontierError;
use crate::frontier::Frontier;
use crate::frontier::FrontierEntry;
use crate::frontier::FrontierPolicy;
use crate::frontier::QueueFrontier;
use crate::frontier::StackFrontier;
use crate::problem::Problem;
use crate::search::SearchTree;
use crate::search::SearchTreeNode;
use crate::space::Action;
use crate::space::Path;
use crate::space::Space;
use crate::space::State;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    /// The frontier ran out before reaching the goal.
    #[error("No solution, the goal is unreachable ({num_expanded} states expanded)")]
    NoSolution { num_expanded: usize },
    /// The search expanded as many states as it was allowed to.
    #[error("Gave up after expanding {limit} states")]
    ExpansionLimitReached { limit: usize },
    #[error(transparent)]
    EmptyFrontier(#[from] EmptyFrontierError),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SearchPhase {
    /// Nothing done yet.
    Init,
    /// The frontier is being expanded.
    Expanding,
    /// The goal was reached, the solution is available.
    Solved,
    /// The search gave up, see `SearchError`.
    Failed,
}

/// What is left of a search once it's over.
#[derive(Clone, Debug)]
pub struct SearchResult<St, A>
where
    St: State,
    A: Action,
{
    pub outcome: Result<Path<St, A>, SearchError>,
    /// Every expanded state that wasn't the goal.
    pub explored: FxHashSet<St>,
    pub num_expanded: usize,
}

impl<St, A> SearchResult<St, A>
where
    St: State,
    A: Action,
{
    pub fn solution(&self) -> Option<&Path<St, A>> {
        self.outcome.as_ref().ok()
    }
}

/// Uninformed search for single-goal Problems.
///
/// Owns all the mutable search state, so each search starts from scratch.
#[derive(Debug)]
pub struct UninformedSearch<P, F, Sp, St, A>
where
    P: Problem<Sp, St, A>,
    F: Frontier<St>,
    Sp: Space<St, A>,
    St: State,
    A: Action,
{
    problem: P,

    /// Discovered states pending expansion.
    frontier: F,
    /// Every node ever created. Frontier entries point into it.
    tree: SearchTree<St, A>,
    /// States that were already expanded.
    ///
    /// These never make it back into the frontier.
    explored: FxHashSet<St>,
    num_expanded: usize,
    expansion_limit: Option<usize>,

    phase: SearchPhase,
    solution: Option<Path<St, A>>,
    failure: Option<SearchError>,

    _phantom_space: PhantomData<Sp>,
}

/// Depth-first search.
pub type DepthFirstSearch<P, Sp, St, A> = UninformedSearch<P, StackFrontier<St>, Sp, St, A>;
/// Breadth-first search.
pub type BreadthFirstSearch<P, Sp, St, A> = UninformedSearch<P, QueueFrontier<St>, Sp, St, A>;

impl<P, F, Sp, St, A> UninformedSearch<P, F, Sp, St, A>
where
    P: Problem<Sp, St, A>,
    F: Frontier<St>,
    Sp: Space<St, A>,
    St: State,
    A: Action,
{
    #[must_use]
    pub fn new(problem: P) -> Self {
        Self {
            problem,
            frontier: F::new(),
            tree: SearchTree::new(),
            explored: FxHashSet::default(),
            num_expanded: 0,
            expansion_limit: None,
            phase: SearchPhase::Init,
            solution: None,
            failure: None,
            _phantom_space: PhantomData,
        }
    }

    /// Caps the number of expansions.
    #[must_use]
    pub fn with_expansion_limit(mut self, limit: usize) -> Self {
        self.expansion_limit = Some(limit);
        self
    }

    /// Runs the search until it's solved or fails.
    ///
    /// The outcome is kept, so calling this again won't search again.
    pub fn solve(&mut self) -> Result<&Path<St, A>, SearchError> {
        if self.phase == SearchPhase::Init {
            self.init();
        }

        while self.phase == SearchPhase::Expanding {
            if let Err(e) = self.expand_next() {
                info!(
                    "{} search failed after {} expansions: {e}",
                    F::POLICY,
                    self.num_expanded
                );
                self.phase = SearchPhase::Failed;
                self.failure = Some(e);
            }
        }

        match (&self.solution, &self.failure) {
            (Some(path), _) => Ok(path),
            (None, Some(e)) => Err(e.clone()),
            (None, None) => unreachable!("Search stopped in phase {:?}", self.phase),
        }
    }

    fn init(&mut self) {
        debug_assert_eq!(self.phase, SearchPhase::Init);
        debug_assert!(self.frontier.is_empty());

        let start = self.problem.start();
        let node = self.tree.push(SearchTreeNode::new_root(start));
        self.frontier.add(FrontierEntry { state: start, node });

        debug!("{} search starting at {start:?}", F::POLICY);
        self.phase = SearchPhase::Expanding;
    }

    /// Expands the next node in the frontier.
    fn expand_next(&mut self) -> Result<(), SearchError> {
        #[cfg(feature = "coz_profile")]
        coz::scope!("NodeExpansion");

        if self.frontier.is_empty() {
            return Err(SearchError::NoSolution {
                num_expanded: self.num_expanded,
            });
        }
        if let Some(limit) = self.expansion_limit {
            if self.num_expanded >= limit {
                return Err(SearchError::ExpansionLimitReached { limit });
            }
        }

        let entry = self.frontier.remove_next()?;
        self.num_expanded += 1;
        trace!("Expanding {:?} (#{})", entry.state, self.num_expanded);

        if self.problem.is_goal(&entry.state) {
            let path = self.tree.path(entry.node);
            info!(
                "{} search found a path of {} steps after {} expansions",
                F::POLICY,
                path.len(),
                self.num_expanded
            );
            self.solution = Some(path);
            self.phase = SearchPhase::Solved;
            return Ok(());
        }

        self.explored.insert(entry.state);
        for (s, a) in self.problem.space().neighbours(&entry.state) {
            if self.frontier.contains_state(&s) || self.explored.contains(&s) {
                continue;
            }
            let node = self
                .tree
                .push(SearchTreeNode::new_from_parent(s, entry.node, a));
            self.frontier.add(FrontierEntry { state: s, node });
        }

        self.verify();
        Ok(())
    }

    #[inline(always)]
    #[cfg(not(feature = "verify"))]
    fn verify(&self) {
        // All good... (hopefully)
    }
    #[cfg(feature = "verify")]
    fn verify(&self) {
        for s in &self.explored {
            assert!(
                !self.frontier.contains_state(s),
                "Explored state {s:?} is back in the frontier"
            );
        }
        assert!(self.explored.len() <= self.num_expanded);
        assert!(self.tree.len() >= self.frontier.len() + self.explored.len());
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }
    pub fn problem(&self) -> &P {
        &self.problem
    }
    pub fn solution(&self) -> Option<&Path<St, A>> {
        self.solution.as_ref()
    }
    pub fn explored(&self) -> &FxHashSet<St> {
        &self.explored
    }
    pub fn num_expanded(&self) -> usize {
        self.num_expanded
    }

    /// Finishes the search, keeping its outcome.
    pub fn into_result(mut self) -> SearchResult<St, A> {
        let outcome = self.solve().cloned();
        SearchResult {
            outcome,
            explored: self.explored,
            num_expanded: self.num_expanded,
        }
    }

    pub fn write_stats<W: std::io::Write>(&self, mut out: W) -> std::io::Result<()> {
        use size::Size;
        use std::mem::size_of;
        use thousands::Separable;

        writeln!(out, "UninformedSearch Stats ({}):", F::POLICY)?;
        writeln!(out, "  - Phase: {:?}", self.phase)?;
        writeln!(
            out,
            "  - |Space|:    {} states",
            self.problem.space().size().separate_with_commas()
        )?;
        writeln!(
            out,
            "  - |Nodes|:    {} ({})",
            self.tree.len().separate_with_commas(),
            Size::from_bytes(self.tree.capacity_bytes())
        )?;
        writeln!(
            out,
            "  - |Frontier|: {} ({})",
            self.frontier.len().separate_with_commas(),
            Size::from_bytes(self.frontier.capacity_bytes())
        )?;
        let s = size_of::<St>();
        let l = self.explored.len();
        writeln!(
            out,
            "  - |Explored|: {} ({})",
            l.separate_with_commas(),
            Size::from_bytes(self.explored.capacity() * s)
        )?;
        writeln!(
            out,
            "  - Expanded nodes: {}",
            self.num_expanded.separate_with_commas()
        )?;

        Ok(())
    }
}

/// Runs a search with a frontier chosen at runtime.
///
/// When given a `stats` sink, the finished search's stats are written to it.
pub fn solve_with_policy<P, Sp, St, A>(
    problem: P,
    policy: FrontierPolicy,
    expansion_limit: Option<usize>,
    stats: Option<&mut dyn std::io::Write>,
) -> SearchResult<St, A>
where
    P: Problem<Sp, St, A>,
    Sp: Space<St, A>,
    St: State,
    A: Action,
{
    fn run<P, F, Sp, St, A>(
        problem: P,
        expansion_limit: Option<usize>,
        stats: Option<&mut dyn std::io::Write>,
    ) -> SearchResult<St, A>
    where
        P: Problem<Sp, St, A>,
        F: Frontier<St>,
        Sp: Space<St, A>,
        St: State,
        A: Action,
    {
        let mut search = UninformedSearch::<P, F, Sp, St, A>::new(problem);
        if let Some(limit) = expansion_limit {
            search = search.with_expansion_limit(limit);
        }

        let outcome = search.solve().cloned();
        if let Some(out) = stats {
            if let Err(e) = search.write_stats(out) {
                warn!("Failed to write search stats: {e}");
            }
        }

        SearchResult {
            outcome,
            explored: search.explored,
            num_expanded: search.num_expanded,
        }
    }

    match policy {
        FrontierPolicy::Stack => {
            run::<P, StackFrontier<St>, Sp, St, A>(problem, expansion_limit, stats)
        }
        FrontierPolicy::Queue => {
            run::<P, QueueFrontier<St>, Sp, St, A>(problem, expansion_limit, stats)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;

    use indoc::indoc;
    use rand_chacha::ChaCha8Rng;
    use rand_chacha::rand_core::SeedableRng;
    use rustc_hash::FxHashMap;

    use crate::problems::maze_2d::Maze2DAction;
    use crate::problems::maze_2d::Maze2DProblem;
    use crate::problems::maze_2d::Maze2DSpace;
    use crate::problems::maze_2d::Maze2DState;

    type Maze2DDepthFirst = DepthFirstSearch<Maze2DProblem, Maze2DSpace, Maze2DState, Maze2DAction>;
    type Maze2DBreadthFirst =
        BreadthFirstSearch<Maze2DProblem, Maze2DSpace, Maze2DState, Maze2DAction>;

    const POLICIES: [FrontierPolicy; 2] = [FrontierPolicy::Stack, FrontierPolicy::Queue];

    fn s(row: u32, col: u32) -> Maze2DState {
        Maze2DState::new(row, col)
    }

    fn parse(maze: &str) -> Maze2DProblem {
        Maze2DProblem::try_from(maze).unwrap()
    }

    /// Distances from `from` to every reachable state.
    fn distances(space: &Maze2DSpace, from: Maze2DState) -> FxHashMap<Maze2DState, usize> {
        let mut dist = FxHashMap::default();
        let mut queue = VecDeque::from([from]);
        dist.insert(from, 0usize);
        while let Some(state) = queue.pop_front() {
            let d = dist[&state];
            for (n, _a) in space.neighbours(&state) {
                if !dist.contains_key(&n) {
                    dist.insert(n, d + 1);
                    queue.push_back(n);
                }
            }
        }
        dist
    }

    #[test]
    fn adjacent_goal() {
        for policy in POLICIES {
            let result = solve_with_policy(parse("AB"), policy, None, None);
            let path = result.solution().unwrap();
            assert_eq!(path.steps, vec![(Maze2DAction::Right, s(0, 1))]);
            assert_eq!(result.explored.len(), 1);
            assert_eq!(result.num_expanded, 2);
        }
    }

    #[test]
    fn one_open_cell_between() {
        for policy in POLICIES {
            let result = solve_with_policy(parse("A B"), policy, None, None);
            let path = result.solution().unwrap();
            assert_eq!(
                path.steps,
                vec![
                    (Maze2DAction::Right, s(0, 1)),
                    (Maze2DAction::Right, s(0, 2)),
                ]
            );
            assert_eq!(path.start, s(0, 0));
            let explored: FxHashSet<_> = [s(0, 0), s(0, 1)].into_iter().collect();
            assert_eq!(result.explored, explored);
        }
    }

    #[test]
    fn unreachable_goal() {
        let maze = indoc! {"
            A   #
              # #
            #####
            B   #
        "};
        let problem = parse(maze);
        let reachable: FxHashSet<_> = distances(problem.space(), problem.start())
            .into_keys()
            .collect();

        for policy in POLICIES {
            let result = solve_with_policy(problem.clone(), policy, None, None);
            assert_eq!(
                result.outcome,
                Err(SearchError::NoSolution { num_expanded: 7 })
            );
            assert_eq!(result.explored, reachable);
            assert!(result.solution().is_none());
        }
    }

    #[test]
    fn walled_in_start() {
        let mut search = Maze2DDepthFirst::new(parse("A#\n##\n B"));
        assert_eq!(
            search.solve(),
            Err(SearchError::NoSolution { num_expanded: 1 })
        );
        assert_eq!(search.phase(), SearchPhase::Failed);
        assert_eq!(search.explored().len(), 1);
    }

    #[test]
    fn phases() {
        let mut search = Maze2DBreadthFirst::new(parse("A  B"));
        assert_eq!(search.phase(), SearchPhase::Init);
        assert!(search.solution().is_none());

        let len = search.solve().unwrap().len();
        assert_eq!(len, 3);
        assert_eq!(search.phase(), SearchPhase::Solved);

        // Solving again is a no-op.
        let expanded = search.num_expanded();
        assert_eq!(search.solve().unwrap().len(), 3);
        assert_eq!(search.num_expanded(), expanded);
    }

    #[test]
    fn expansion_limit() {
        let mut search = Maze2DBreadthFirst::new(parse("A       B")).with_expansion_limit(3);
        assert_eq!(
            search.solve(),
            Err(SearchError::ExpansionLimitReached { limit: 3 })
        );
        assert_eq!(search.num_expanded(), 3);
        assert_eq!(search.phase(), SearchPhase::Failed);

        let result = solve_with_policy(parse("A B"), FrontierPolicy::Stack, Some(3), None);
        assert!(result.solution().is_some());
    }

    #[test]
    fn tie_breaking_follows_neighbour_order() {
        // Both ways around the pillar are equally long. The stack takes the
        // last generated neighbour (right) first, the queue the first (left).
        let maze = indoc! {"
            ##B##
            #   #
            # # #
            # A #
            #####
        "};
        let mut dfs = Maze2DDepthFirst::new(parse(maze));
        let mut bfs = Maze2DBreadthFirst::new(parse(maze));
        dfs.solve().unwrap();
        bfs.solve().unwrap();

        use Maze2DAction::*;
        assert_eq!(
            dfs.solution().unwrap().actions().collect::<Vec<_>>(),
            vec![Right, Up, Up, Left, Up]
        );
        assert_eq!(
            bfs.solution().unwrap().actions().collect::<Vec<_>>(),
            vec![Left, Up, Up, Right, Up]
        );
        assert_eq!(dfs.num_expanded(), 8);
        assert_eq!(bfs.num_expanded(), 9);
        assert_eq!(dfs.explored().len(), 7);
    }

    #[test]
    fn deterministic() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..20 {
            let problem = Maze2DProblem::random(&mut rng, 8, 8, 0.3).unwrap();
            for policy in POLICIES {
                let a = solve_with_policy(problem.clone(), policy, None, None);
                let b = solve_with_policy(problem.clone(), policy, None, None);
                assert_eq!(a.outcome, b.outcome);
                assert_eq!(a.explored, b.explored);
                assert_eq!(a.num_expanded, b.num_expanded);
            }
        }
    }

    #[test]
    fn random_mazes() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut solved = 0;
        for _ in 0..200 {
            let problem = Maze2DProblem::random(&mut rng, 9, 11, 0.3).unwrap();
            let space = problem.space();
            let dist = distances(space, problem.start());
            let open = space.num_open_cells();

            for policy in POLICIES {
                let result = solve_with_policy(problem.clone(), policy, None, None);

                // No state is expanded twice.
                assert!(result.explored.len() <= open);
                assert!(result.num_expanded <= open);

                match &result.outcome {
                    Ok(path) => {
                        assert!(space.valid_path(path));
                        assert_eq!(path.start, problem.start());
                        assert_eq!(path.end(), problem.goal());
                        assert!(!path.is_empty());
                        let (first_action, first) = path.steps[0];
                        assert!(
                            space
                                .neighbours(&problem.start())
                                .contains(&(first, first_action))
                        );
                        // Each expansion but the goal's is explored.
                        assert_eq!(result.explored.len() + 1, result.num_expanded);
                        if policy == FrontierPolicy::Queue {
                            assert_eq!(path.len(), dist[&problem.goal()]);
                        } else {
                            assert!(path.len() >= dist[&problem.goal()]);
                        }
                    }
                    Err(e) => {
                        assert!(!dist.contains_key(&problem.goal()));
                        assert_eq!(
                            *e,
                            SearchError::NoSolution {
                                num_expanded: dist.len()
                            }
                        );
                        let reachable: FxHashSet<_> = dist.keys().copied().collect();
                        assert_eq!(result.explored, reachable);
                    }
                }
            }
            if dist.contains_key(&problem.goal()) {
                solved += 1;
            }
        }
        // Make sure both branches got exercised.
        assert!(solved > 0 && solved < 200);
    }

    #[test]
    fn stats() {
        let mut search = Maze2DBreadthFirst::new(parse("A B"));
        search.solve().unwrap();

        let mut out = Vec::<u8>::new();
        search.write_stats(&mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("UninformedSearch Stats (queue):"));
        assert!(out.contains("Expanded nodes: 3"));
        assert!(out.contains("|Space|:    3 states"));
    }

    #[test]
    fn stats_sink() {
        let mut out = Vec::<u8>::new();
        let result = solve_with_policy(
            parse("A#\n B"),
            FrontierPolicy::Stack,
            None,
            Some(&mut out),
        );
        assert_eq!(result.solution().map(Path::len), Some(2));

        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("UninformedSearch Stats (stack):"));
        assert!(out.contains("Phase: Solved"));
        assert!(out.contains("|Space|:    4 states"));
        assert!(out.contains("Expanded nodes: 3"));

        // No sink, same outcome.
        let quiet = solve_with_policy(parse("A#\n B"), FrontierPolicy::Stack, None, None);
        assert_eq!(quiet.outcome, result.outcome);
    }
}
