//! Per-cell display categories for a solved (or not) maze.
//!
//! The view is what both the text printer and the raster renderer consume, so
//! they always agree on what each cell is.

use derive_more::Display;
use rustc_hash::FxHashSet;

use crate::algorithms::uninformed::SearchResult;
use crate::problem::Problem;
use crate::problems::maze_2d::Maze2DAction;
use crate::problems::maze_2d::Maze2DProblem;
use crate::problems::maze_2d::Maze2DState;
use crate::space::Path;

/// What a cell is shown as.
///
/// When several apply, the earliest variant wins.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    #[display("█")]
    Wall,
    #[display("A")]
    Start,
    #[display("B")]
    Goal,
    #[display("*")]
    SolutionPath,
    #[display(" ")]
    Explored,
    #[display(" ")]
    Empty,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Wall,
        Category::Start,
        Category::Goal,
        Category::SolutionPath,
        Category::Explored,
        Category::Empty,
    ];

    /// Fill colour used by the raster renderer.
    pub const fn rgb(&self) -> [u8; 3] {
        match self {
            Category::Wall => [40, 40, 40],
            Category::Start => [0, 178, 28],
            Category::Goal => [0, 171, 28],
            Category::SolutionPath => [220, 235, 113],
            Category::Explored => [212, 97, 85],
            Category::Empty => [237, 240, 252],
        }
    }
}

/// Which search results make it into the view.
///
/// These never change the search, only how it's shown.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DisplayOptions {
    pub show_solution: bool,
    pub show_explored: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            show_solution: true,
            show_explored: false,
        }
    }
}

/// A height×width table of categories.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassificationView {
    cells: Vec<Vec<Category>>,
}

impl ClassificationView {
    /// `(height, width)`
    pub fn dimensions(&self) -> (usize, usize) {
        (self.cells.len(), self.cells.first().map_or(0, Vec::len))
    }

    pub fn at(&self, state: &Maze2DState) -> Option<Category> {
        self.cells
            .get(state.row as usize)?
            .get(state.col as usize)
            .copied()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Category]> + '_ {
        self.cells.iter().map(Vec::as_slice)
    }

    pub fn count(&self, category: Category) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|&&c| c == category)
            .count()
    }

    /// Classifies straight from a search result.
    pub fn from_result(
        problem: &Maze2DProblem,
        result: &SearchResult<Maze2DState, Maze2DAction>,
        options: DisplayOptions,
    ) -> Self {
        classify(problem, result.solution(), Some(&result.explored), options)
    }
}

/// Text rendering, one glyph per cell.
impl std::fmt::Display for ClassificationView {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for row in self.rows() {
            for category in row {
                write!(f, "{category}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

pub fn classify(
    problem: &Maze2DProblem,
    solution: Option<&Path<Maze2DState, Maze2DAction>>,
    explored: Option<&FxHashSet<Maze2DState>>,
    options: DisplayOptions,
) -> ClassificationView {
    let solution: FxHashSet<Maze2DState> = match solution {
        Some(path) if options.show_solution => path.states().collect(),
        _ => FxHashSet::default(),
    };
    let explored = explored.filter(|_| options.show_explored);

    let (height, width) = problem.space().dimensions();
    let mut cells = vec![vec![Category::Empty; width]; height];
    for (state, _cell) in problem.space().cells() {
        let category = if problem.space().is_wall(&state) {
            Category::Wall
        } else if state == problem.start() {
            Category::Start
        } else if state == problem.goal() {
            Category::Goal
        } else if solution.contains(&state) {
            Category::SolutionPath
        } else if explored.is_some_and(|e| e.contains(&state)) {
            Category::Explored
        } else {
            Category::Empty
        };
        cells[state.row as usize][state.col as usize] = category;
    }

    ClassificationView { cells }
}
