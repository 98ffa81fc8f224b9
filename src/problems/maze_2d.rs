use derive_more::Display;
use log::debug;
use thiserror::Error;

use crate::problem::Problem;
use crate::space::Action;
use crate::space::Neighbours;
use crate::space::Space;
use crate::space::State;

const MAX_ELEMENTS_DISPLAYED: usize = 80;
const RANDOM_STATE_MAX_TRIES: usize = 10_000;

/// Marks the start of the maze. Passable.
pub const START_MARKER: char = 'A';
/// Marks the goal of the maze. Passable.
pub const GOAL_MARKER: char = 'B';
/// Open cell.
pub const OPEN_MARKER: char = ' ';

pub type Coord = u32;

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[display("({row},{col})")]
pub struct Maze2DState {
    pub row: Coord,
    pub col: Coord,
}

impl Maze2DState {
    pub const fn new(row: Coord, col: Coord) -> Self {
        Self { row, col }
    }

    pub fn new_from_usize(row: usize, col: usize) -> Option<Self> {
        Some(Self {
            row: Coord::try_from(row).ok()?,
            col: Coord::try_from(col).ok()?,
        })
    }

    #[inline(always)]
    fn row_index(&self) -> usize {
        self.row as usize
    }
    #[inline(always)]
    fn col_index(&self) -> usize {
        self.col as usize
    }
}
impl State for Maze2DState {}

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash)]
pub enum Maze2DAction {
    #[display("up")]
    Up, // row--
    #[display("down")]
    Down, // row++
    #[display("left")]
    Left, // col--
    #[display("right")]
    Right, // col++
}
impl Action for Maze2DAction {}

impl Maze2DAction {
    /// All moves, in expansion order.
    pub const ALL: [Maze2DAction; 4] = [
        Maze2DAction::Up,
        Maze2DAction::Down,
        Maze2DAction::Left,
        Maze2DAction::Right,
    ];

    /// `(d_row, d_col)` as wrapping offsets.
    #[inline(always)]
    const fn delta(&self) -> (Coord, Coord) {
        const PREV: Coord = Coord::MAX;
        const SAME: Coord = 0;
        const NEXT: Coord = 1;

        match self {
            Maze2DAction::Up => (PREV, SAME),
            Maze2DAction::Down => (NEXT, SAME),
            Maze2DAction::Left => (SAME, PREV),
            Maze2DAction::Right => (SAME, NEXT),
        }
    }
}

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum Maze2DCell {
    #[display(" ")]
    Empty,
    #[display("█")]
    Wall,
}

impl From<char> for Maze2DCell {
    /// Markers and spaces are open, everything else blocks.
    fn from(ch: char) -> Self {
        match ch {
            START_MARKER | GOAL_MARKER | OPEN_MARKER => Maze2DCell::Empty,
            _ => Maze2DCell::Wall,
        }
    }
}

/// A rectangular grid of walls.
#[derive(Clone, PartialEq, Eq)]
pub struct Maze2DSpace {
    map: Vec<Vec<Maze2DCell>>,
    height: usize,
    width: usize,
}

impl Maze2DSpace {
    pub(crate) fn new_empty_with_dimensions(height: usize, width: usize) -> Self {
        Self {
            map: vec![vec![Maze2DCell::Empty; width]; height],
            height,
            width,
        }
    }

    /// `(height, width)`
    pub fn dimensions(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// Whether a cell is a wall. Out of bounds cells are not walls, but they
    /// aren't valid either.
    pub fn is_wall(&self, state: &Maze2DState) -> bool {
        self.valid(state) && self.at(state) == Maze2DCell::Wall
    }

    #[inline(always)]
    fn at(&self, state: &Maze2DState) -> Maze2DCell {
        debug_assert!(self.valid(state));
        self.map[state.row_index()][state.col_index()]
    }

    /// Every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (Maze2DState, Maze2DCell)> + '_ {
        self.map.iter().enumerate().flat_map(|(row, line)| {
            line.iter()
                .enumerate()
                .map(move |(col, cell)| (Maze2DState::new(row as Coord, col as Coord), *cell))
        })
    }

    pub fn num_open_cells(&self) -> usize {
        self.cells()
            .filter(|(_s, cell)| *cell == Maze2DCell::Empty)
            .count()
    }

    pub fn random_state<R: rand::Rng>(&self, r: &mut R) -> Option<Maze2DState> {
        if self.height == 0 || self.width == 0 {
            return None;
        }

        for _tries in 0..RANDOM_STATE_MAX_TRIES {
            let row = r.random_range(0..self.height);
            let col = r.random_range(0..self.width);
            if self.map[row][col] == Maze2DCell::Empty {
                return Maze2DState::new_from_usize(row, col);
            }
        }

        None
    }
}

impl Space<Maze2DState, Maze2DAction> for Maze2DSpace {
    #[inline(always)]
    fn apply(&self, state: &Maze2DState, action: &Maze2DAction) -> Option<Maze2DState> {
        let (d_row, d_col) = action.delta();
        let s = Maze2DState {
            row: state.row.wrapping_add(d_row),
            col: state.col.wrapping_add(d_col),
        };
        self.valid(&s).then_some(s)
    }

    #[inline(always)]
    fn valid(&self, state: &Maze2DState) -> bool {
        state.row_index() < self.height && state.col_index() < self.width
    }

    fn size(&self) -> usize {
        self.height.saturating_mul(self.width)
    }

    /// Gets the open neighbours of a given position, in up, down, left, right
    /// order.
    ///
    /// NOTE: These states can only be used with the current Maze
    fn neighbours(&self, state: &Maze2DState) -> Neighbours<Maze2DState, Maze2DAction> {
        #[cfg(feature = "coz_profile")]
        coz::scope!("StateExpansion");

        let mut v = Neighbours::<Maze2DState, Maze2DAction>::new();
        for action in Maze2DAction::ALL {
            if let Some(s) = self.apply(state, &action) {
                if self.at(&s) != Maze2DCell::Wall {
                    v.push((s, action));
                }
            }
        }
        v
    }
}

impl std::fmt::Display for Maze2DSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "Maze2D({}x{}):", self.height, self.width)?;
        for line in self.map.iter().take(MAX_ELEMENTS_DISPLAYED) {
            for cell in line.iter().take(MAX_ELEMENTS_DISPLAYED) {
                write!(f, "{cell}")?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

impl std::fmt::Debug for Maze2DSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Maze2D{:?}", self.dimensions())
    }
}

/// The maze text doesn't have exactly one start and one goal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MalformedMazeError {
    #[error("Maze must have exactly one start point 'A', found {found}")]
    StartMarkers { found: usize },
    #[error("Maze must have exactly one goal 'B', found {found}")]
    GoalMarkers { found: usize },
}

#[derive(Debug, Error)]
pub enum Maze2DProblemParseError {
    #[error("Malformed maze: {0}")]
    MalformedMaze(#[from] MalformedMazeError),
    #[error("Maze of {height}x{width} cells is too large")]
    TooLarge { height: usize, width: usize },
    #[error("I/O error when loading '{p}': {e}")]
    IOError {
        p: std::path::PathBuf,
        e: std::io::Error,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Maze2DProblem {
    space: Maze2DSpace,
    start: Maze2DState,
    goal: Maze2DState,
}

impl Problem<Maze2DSpace, Maze2DState, Maze2DAction> for Maze2DProblem {
    fn space(&self) -> &Maze2DSpace {
        &self.space
    }
    fn start(&self) -> Maze2DState {
        self.start
    }
    fn goal(&self) -> Maze2DState {
        self.goal
    }
}

impl Maze2DProblem {
    pub fn height(&self) -> usize {
        self.space.height
    }
    pub fn width(&self) -> usize {
        self.space.width
    }

    /// Builds a random maze where each cell is a wall with the given
    /// probability.
    ///
    /// Start and goal are placed on distinct open cells, so the maze is
    /// well-formed but not necessarily solvable. Gives `None` for fewer than
    /// two cells, oversized grids or a probability outside `[0, 1]`.
    pub fn random<R: rand::Rng>(
        r: &mut R,
        height: usize,
        width: usize,
        wall_probability: f64,
    ) -> Option<Maze2DProblem> {
        if !(0.0..=1.0).contains(&wall_probability) {
            return None;
        }
        Maze2DState::new_from_usize(height, width)?;
        if height.checked_mul(width)? < 2 {
            return None;
        }

        let mut space = Maze2DSpace::new_empty_with_dimensions(height, width);
        for line in space.map.iter_mut() {
            for cell in line.iter_mut() {
                if r.random_bool(wall_probability) {
                    *cell = Maze2DCell::Wall;
                }
            }
        }

        let start = space.random_state(r)?;
        for _tries in 0..RANDOM_STATE_MAX_TRIES {
            let goal = space.random_state(r)?;
            if goal != start {
                return Some(Maze2DProblem { space, start, goal });
            }
        }

        None
    }
}

fn count_markers(s: &str, marker: char) -> usize {
    s.chars().filter(|&ch| ch == marker).count()
}

/// Line terminators, besides `\r\n` which counts as a single one.
fn is_line_break(ch: char) -> bool {
    matches!(
        ch,
        '\n' | '\r'
            | '\u{0b}'
            | '\u{0c}'
            | '\u{1c}'..='\u{1e}'
            | '\u{85}'
            | '\u{2028}'
            | '\u{2029}'
    )
}

/// Splits text into rows of characters.
///
/// A trailing terminator doesn't start a new row.
fn split_lines(s: &str) -> Vec<Vec<char>> {
    let mut lines = Vec::new();
    let mut line = Vec::new();
    let mut chars = s.chars().peekable();
    while let Some(ch) = chars.next() {
        if is_line_break(ch) {
            if ch == '\r' {
                chars.next_if_eq(&'\n');
            }
            lines.push(std::mem::take(&mut line));
        } else {
            line.push(ch);
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

impl std::convert::TryFrom<&str> for Maze2DProblem {
    type Error = Maze2DProblemParseError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        // Markers are counted on the raw text, before splitting it.
        let found = count_markers(s, START_MARKER);
        if found != 1 {
            return Err(MalformedMazeError::StartMarkers { found }.into());
        }
        let found = count_markers(s, GOAL_MARKER);
        if found != 1 {
            return Err(MalformedMazeError::GoalMarkers { found }.into());
        }

        let lines = split_lines(s);
        let height = lines.len();
        let width = lines.iter().map(Vec::len).max().unwrap_or(0);
        if Maze2DState::new_from_usize(height, width).is_none() {
            return Err(Maze2DProblemParseError::TooLarge { height, width });
        }

        let mut space = Maze2DSpace::new_empty_with_dimensions(height, width);
        let mut start = None;
        let mut goal = None;
        for (row, line) in lines.iter().enumerate() {
            // Short lines keep their padding open.
            for (col, &ch) in line.iter().enumerate() {
                let state = Maze2DState::new(row as Coord, col as Coord);
                match ch {
                    START_MARKER => start = Some(state),
                    GOAL_MARKER => goal = Some(state),
                    _ => {}
                }
                space.map[row][col] = Maze2DCell::from(ch);
            }
        }

        // Both markers are known to be in the text, and `lines` covers it all.
        let (Some(start), Some(goal)) = (start, goal) else {
            unreachable!("Markers were counted but not found while splitting lines");
        };
        debug!("Parsed {space:?} with start {start} and goal {goal}");

        Ok(Maze2DProblem { space, start, goal })
    }
}

impl std::convert::TryFrom<&std::path::Path> for Maze2DProblem {
    type Error = Maze2DProblemParseError;

    fn try_from(p: &std::path::Path) -> Result<Self, Self::Error> {
        let contents =
            std::fs::read_to_string(p).map_err(|e| Maze2DProblemParseError::IOError {
                p: p.to_path_buf(),
                e,
            })?;
        debug!("Loaded {} bytes from {p:?}", contents.len());

        Maze2DProblem::try_from(contents.as_str())
    }
}

impl std::fmt::Display for Maze2DProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(
            f,
            "Maze2DProblem({}x{}) (s:{}, g:{}):",
            self.space.height, self.space.width, self.start, self.goal
        )?;
        for (state, cell) in self.space.cells() {
            if state.row_index() >= MAX_ELEMENTS_DISPLAYED {
                break;
            }
            if state.col_index() >= MAX_ELEMENTS_DISPLAYED {
                continue;
            }
            if state == self.start {
                write!(f, "{START_MARKER}")?;
            } else if state == self.goal {
                write!(f, "{GOAL_MARKER}")?;
            } else {
                write!(f, "{cell}")?;
            }
            if state.col_index() + 1 == self.space.width.min(MAX_ELEMENTS_DISPLAYED) {
                writeln!(f)?;
            }
        }

        Ok(())
    }
}
