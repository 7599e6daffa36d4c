//! Maze carving, exit selection and grid queries.
//!
//! Grids are always odd × odd. Odd coordinates are rooms, even coordinates are
//! the walls between them; the backtracker opens a room and the wall cell it
//! passes through on the way.
use std::collections::VecDeque;
use std::fmt;

use glam::Vec2;
use rand::Rng;
use rand::seq::SliceRandom;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Cell {
    Wall,
    Open,
    Exit,
}

impl Cell {
    #[inline]
    pub fn is_passable(self) -> bool {
        !matches!(self, Cell::Wall)
    }

    fn symbol(self) -> char {
        match self {
            Cell::Wall => '#',
            Cell::Open => ' ',
            Cell::Exit => 'E',
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellPos {
    pub x: usize,
    pub y: usize,
}

impl CellPos {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Euclidean distance measured in cells.
    pub fn cell_distance(self, other: CellPos) -> f32 {
        let dx = self.x as f32 - other.x as f32;
        let dy = self.y as f32 - other.y as f32;
        (dx * dx + dy * dy).sqrt()
    }

    /// Planar world position of the cell centre (x, z).
    #[inline]
    pub fn to_world(self, cell_size: f32) -> Vec2 {
        Vec2::new(self.x as f32 * cell_size, self.y as f32 * cell_size)
    }
}

impl fmt::Display for CellPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Every level starts here.
pub const START: CellPos = CellPos::new(1, 1);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("maze layout is empty")]
    Empty,
    #[error("unknown cell {ch:?} at ({x}, {y})")]
    UnknownCell { ch: char, x: usize, y: usize },
    #[error("maze dimensions must be odd, got {width}x{height}")]
    EvenDimensions { width: usize, height: usize },
    #[error("maze must contain exactly one exit, found {0}")]
    ExitCount(usize),
    #[error("exit at {0} is not on the outer border")]
    ExitNotOnBorder(CellPos),
    #[error("exit at {0} has no open interior neighbour")]
    ExitUnreachable(CellPos),
    #[error("start cell (1, 1) must be open")]
    StartBlocked,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    exit: CellPos,
}

impl Grid {
    /// Parses a text layout: `#` is a wall, space or `.` is open, `E`/`g` is the exit.
    /// Short rows are padded with walls.
    pub fn parse(text: &str) -> Result<Self, GridError> {
        let rows: Vec<&str> = text.lines().filter(|l| !l.trim_end().is_empty()).collect();
        if rows.is_empty() {
            return Err(GridError::Empty);
        }
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let height = rows.len();
        if width % 2 == 0 || height % 2 == 0 {
            return Err(GridError::EvenDimensions { width, height });
        }

        let mut cells = vec![Cell::Wall; width * height];
        let mut exits = Vec::new();
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let cell = match ch {
                    '#' => Cell::Wall,
                    ' ' | '.' => Cell::Open,
                    'E' | 'g' => {
                        exits.push(CellPos::new(x, y));
                        Cell::Exit
                    }
                    _ => return Err(GridError::UnknownCell { ch, x, y }),
                };
                cells[y * width + x] = cell;
            }
        }
        let exit = match exits.as_slice() {
            [exit] => *exit,
            other => return Err(GridError::ExitCount(other.len())),
        };
        let grid = Self { width, height, cells, exit };
        if grid.is_interior(exit) {
            return Err(GridError::ExitNotOnBorder(exit));
        }
        let opens_inward = [(0, 1), (1, 0), (0, -1), (-1, 0)].into_iter().any(|(dx, dy)| {
            let (Some(x), Some(y)) =
                (exit.x.checked_add_signed(dx), exit.y.checked_add_signed(dy))
            else {
                return false;
            };
            let next = CellPos::new(x, y);
            grid.is_interior(next) && grid.at(next) == Cell::Open
        });
        if !opens_inward {
            return Err(GridError::ExitUnreachable(exit));
        }
        if grid.at(START) != Cell::Open {
            return Err(GridError::StartBlocked);
        }
        Ok(grid)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn exit(&self) -> CellPos {
        self.exit
    }

    /// Out-of-range coordinates read as walls.
    #[inline]
    pub fn cell(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::Wall
        }
    }

    #[inline]
    pub fn at(&self, pos: CellPos) -> Cell {
        self.cell(pos.x, pos.y)
    }

    pub fn count(&self, kind: Cell) -> usize {
        self.cells.iter().filter(|&&c| c == kind).count()
    }

    pub fn is_interior(&self, pos: CellPos) -> bool {
        pos.x > 0 && pos.y > 0 && pos.x + 1 < self.width && pos.y + 1 < self.height
    }

    /// Open cells strictly inside the border, row-major.
    pub fn interior_open_cells(&self) -> impl Iterator<Item = CellPos> + '_ {
        (1..self.height.saturating_sub(1)).flat_map(move |y| {
            (1..self.width.saturating_sub(1))
                .map(move |x| CellPos::new(x, y))
                .filter(move |p| self.at(*p) == Cell::Open)
        })
    }

    pub fn passable_neighbors(&self, pos: CellPos) -> impl Iterator<Item = CellPos> + '_ {
        const DIRS: [(isize, isize); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
        DIRS.into_iter().filter_map(move |(dx, dy)| {
            let nx = pos.x.checked_add_signed(dx)?;
            let ny = pos.y.checked_add_signed(dy)?;
            let next = CellPos::new(nx, ny);
            self.at(next).is_passable().then_some(next)
        })
    }

    /// All passable cells reachable from `from` through 4-neighbour steps.
    pub fn reachable_from(&self, from: CellPos) -> Vec<CellPos> {
        if !self.at(from).is_passable() {
            return Vec::new();
        }
        let mut seen = vec![false; self.cells.len()];
        let mut queue = VecDeque::from([from]);
        let mut out = Vec::new();
        seen[from.y * self.width + from.x] = true;
        while let Some(pos) = queue.pop_front() {
            out.push(pos);
            for next in self.passable_neighbors(pos) {
                let idx = next.y * self.width + next.x;
                if !seen[idx] {
                    seen[idx] = true;
                    queue.push_back(next);
                }
            }
        }
        out
    }

    /// Breadth-first path from `from` to `to`, both ends included.
    pub fn shortest_path(&self, from: CellPos, to: CellPos) -> Option<Vec<CellPos>> {
        if !self.at(from).is_passable() || !self.at(to).is_passable() {
            return None;
        }
        let mut prev: Vec<Option<CellPos>> = vec![None; self.cells.len()];
        let mut queue = VecDeque::from([from]);
        prev[from.y * self.width + from.x] = Some(from);
        while let Some(pos) = queue.pop_front() {
            if pos == to {
                break;
            }
            for next in self.passable_neighbors(pos) {
                let idx = next.y * self.width + next.x;
                if prev[idx].is_none() {
                    prev[idx] = Some(pos);
                    queue.push_back(next);
                }
            }
        }
        prev[to.y * self.width + to.x]?;

        let mut path = vec![to];
        let mut cur = to;
        while cur != from {
            cur = prev[cur.y * self.width + cur.x]?;
            path.push(cur);
        }
        path.reverse();
        Some(path)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            let row: String = (0..self.width).map(|x| self.cell(x, y).symbol()).collect();
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}

/// Bumps a requested dimension to the next odd value, never below 3.
pub fn normalize_dimension(n: usize) -> usize {
    let n = n.max(3);
    if n % 2 == 0 { n + 1 } else { n }
}

/// Carves a square perfect maze.
pub fn generate<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Grid {
    generate_with_dims(size, size, rng)
}

/// Randomized recursive backtracker from (1,1), followed by exit selection.
pub fn generate_with_dims<R: Rng + ?Sized>(width: usize, height: usize, rng: &mut R) -> Grid {
    let width = normalize_dimension(width);
    let height = normalize_dimension(height);
    let idx = |x: usize, y: usize| y * width + x;

    let mut cells = vec![Cell::Wall; width * height];
    cells[idx(START.x, START.y)] = Cell::Open;
    let mut stack = vec![START];

    const STEPS: [(isize, isize); 4] = [(0, -2), (0, 2), (-2, 0), (2, 0)];
    while let Some(&current) = stack.last() {
        let mut dirs = STEPS;
        dirs.shuffle(rng);
        let candidate = dirs.into_iter().find_map(|(dx, dy)| {
            let nx = current.x.checked_add_signed(dx)?;
            let ny = current.y.checked_add_signed(dy)?;
            let inside = nx > 0 && nx < width - 1 && ny > 0 && ny < height - 1;
            (inside && cells[idx(nx, ny)] == Cell::Wall).then_some(CellPos::new(nx, ny))
        });
        match candidate {
            Some(next) => {
                cells[idx(next.x, next.y)] = Cell::Open;
                cells[idx((current.x + next.x) / 2, (current.y + next.y) / 2)] = Cell::Open;
                stack.push(next);
            }
            None => {
                stack.pop();
            }
        }
    }

    let exit = select_exit(&mut cells, width, height);
    info!(width, height, exit = %exit, "generated maze");
    Grid { width, height, cells, exit }
}

/// Scans the last interior row right to left and opens the border below the
/// first open cell; falls back to the rightmost interior column.
fn select_exit(cells: &mut [Cell], width: usize, height: usize) -> CellPos {
    let row = height - 2;
    let found = (1..=width - 2).rev().find(|&x| cells[row * width + x] == Cell::Open);
    let x = match found {
        Some(x) => x,
        None => {
            warn!(width, height, "no open cell on last interior row, using fallback exit");
            width - 2
        }
    };
    let exit = CellPos::new(x, height - 1);
    cells[exit.y * width + exit.x] = Cell::Exit;
    debug!(exit = %exit, "exit selected");
    exit
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn seeded(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    fn adjacent_open_pairs(grid: &Grid) -> usize {
        let mut pairs = 0;
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                if !grid.cell(x, y).is_passable() {
                    continue;
                }
                if grid.cell(x + 1, y).is_passable() {
                    pairs += 1;
                }
                if grid.cell(x, y + 1).is_passable() {
                    pairs += 1;
                }
            }
        }
        pairs
    }

    #[test]
    fn even_sizes_are_bumped_to_odd() {
        assert_eq!(normalize_dimension(10), 11);
        assert_eq!(normalize_dimension(11), 11);
        assert_eq!(normalize_dimension(0), 3);
        let grid = generate_with_dims(8, 12, &mut seeded(1));
        assert_eq!((grid.width(), grid.height()), (9, 13));
    }

    #[test]
    fn smallest_maze_has_exit_below_start() {
        let grid = generate(3, &mut seeded(7));
        assert_eq!(grid.exit(), CellPos::new(1, 2));
        assert_eq!(grid.at(START), Cell::Open);
        assert_eq!(grid.count(Cell::Open), 1);
    }

    #[test]
    fn exit_sits_on_bottom_border_under_open_cell() {
        let grid = generate(21, &mut seeded(3));
        let exit = grid.exit();
        assert_eq!(exit.y, grid.height() - 1);
        assert_eq!(grid.cell(exit.x, exit.y - 1), Cell::Open);
        // Every odd cell of the last interior row is a room, so the scan stops at the far right.
        assert_eq!(exit.x, grid.width() - 2);
    }

    #[test]
    fn same_seed_same_maze() {
        let a = generate(15, &mut seeded(42));
        let b = generate(15, &mut seeded(42));
        assert_eq!(a, b);
    }

    #[test]
    fn parse_roundtrips_display() {
        let layout = "#####\n#   #\n# # #\n#   #\n###E#\n";
        let grid = Grid::parse(layout).unwrap();
        assert_eq!(grid.exit(), CellPos::new(3, 4));
        assert_eq!(grid.to_string(), layout);
    }

    #[test]
    fn parse_rejects_bad_layouts() {
        assert_eq!(Grid::parse(""), Err(GridError::Empty));
        assert_eq!(
            Grid::parse("####\n#  #\n####\n"),
            Err(GridError::EvenDimensions { width: 4, height: 3 })
        );
        assert_eq!(Grid::parse("###\n# #\n###\n"), Err(GridError::ExitCount(0)));
        assert_eq!(
            Grid::parse("###\n#x#\n#E#\n"),
            Err(GridError::UnknownCell { ch: 'x', x: 1, y: 1 })
        );
        assert_eq!(
            Grid::parse("###\n#E#\n# #\n"),
            Err(GridError::ExitNotOnBorder(CellPos::new(1, 1)))
        );
        assert_eq!(
            Grid::parse("#####\n#   #\n#####\n#####\n#E###\n"),
            Err(GridError::ExitUnreachable(CellPos::new(1, 4)))
        );
        assert_eq!(Grid::parse("#####\n## ##\n##E##\n"), Err(GridError::StartBlocked));
        // Exits on any outer edge are fine as long as they open inward.
        assert!(Grid::parse("#####\n#   E\n#####\n").is_ok());
    }

    #[test]
    fn shortest_path_walks_corridors() {
        let grid = Grid::parse("#####\n#   #\n### #\n#   #\n#E###\n").unwrap();
        let path = grid.shortest_path(START, grid.exit()).unwrap();
        assert_eq!(path.first(), Some(&START));
        assert_eq!(path.last(), Some(&CellPos::new(1, 4)));
        assert_eq!(path.len(), 8);
        assert!(grid.shortest_path(START, CellPos::new(0, 0)).is_none());
    }

    proptest! {
        #[test]
        fn generated_mazes_are_perfect(size in 3usize..40, seed in any::<u64>()) {
            let grid = generate(size, &mut seeded(seed));
            prop_assert_eq!(grid.width() % 2, 1);
            prop_assert_eq!(grid.height() % 2, 1);
            prop_assert_eq!(grid.count(Cell::Exit), 1);

            let exit = grid.exit();
            prop_assert_eq!(exit.y, grid.height() - 1);
            prop_assert_eq!(grid.cell(exit.x, exit.y - 1), Cell::Open);

            // Connected: everything passable is reachable from the start.
            let passable = grid.count(Cell::Open) + grid.count(Cell::Exit);
            prop_assert_eq!(grid.reachable_from(START).len(), passable);

            // A connected graph with n - 1 edges is a tree: one simple path between any two cells.
            prop_assert_eq!(adjacent_open_pairs(&grid), passable - 1);

            for y in 0..grid.height() - 1 {
                for x in 0..grid.width() - 1 {
                    let block = [grid.cell(x, y), grid.cell(x + 1, y), grid.cell(x, y + 1), grid.cell(x + 1, y + 1)];
                    prop_assert!(block.iter().any(|c| *c == Cell::Wall));
                }
            }
        }

        #[test]
        fn rooms_only_on_odd_coordinates(size in 3usize..30, seed in any::<u64>()) {
            let grid = generate(size, &mut seeded(seed));
            for pos in grid.interior_open_cells() {
                prop_assert!(pos.x % 2 == 1 || pos.y % 2 == 1);
            }
        }
    }
}
