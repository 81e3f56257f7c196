use anyhow::{bail, Result};
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Wall,
    Path,
}

/// Row-major grid of cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MazeGrid {
    pub cols: usize,
    pub rows: usize,
    cells: Vec<Cell>,
}

/// A 3x3 grid with one straight corridor from entrance to exit.
impl Default for MazeGrid {
    fn default() -> Self {
        let mut grid = Self::filled(3, 3);
        for col in 0..3 {
            grid.open(col, 1);
        }
        grid
    }
}

impl MazeGrid {
    fn filled(cols: usize, rows: usize) -> Self {
        Self { cols, rows, cells: vec![Cell::Wall; cols * rows] }
    }

    /// `Wall` outside the grid.
    pub fn get(&self, col: i64, row: i64) -> Cell {
        if col < 0 || row < 0 || col as usize >= self.cols || row as usize >= self.rows {
            return Cell::Wall;
        }
        self.cells[row as usize * self.cols + col as usize]
    }

    pub fn is_path(&self, col: i64, row: i64) -> bool {
        self.get(col, row) == Cell::Path
    }

    fn open(&mut self, col: usize, row: usize) {
        self.cells[row * self.cols + col] = Cell::Path;
    }

    pub fn entrance(&self) -> (usize, usize) {
        (0, 1)
    }

    pub fn exit(&self) -> (usize, usize) {
        (self.cols - 1, self.rows - 2)
    }
}

/// Carves a maze with a randomized iterative depth-first search from (1, 1).
///
/// Both dimensions must be odd and at least 3. The entrance is opened at
/// `(0, 1)` and the exit at `(cols - 1, rows - 2)`.
pub fn generate<R: Rng>(cols: usize, rows: usize, rng: &mut R) -> Result<MazeGrid> {
    if cols < 3 || rows < 3 || cols % 2 == 0 || rows % 2 == 0 {
        bail!("maze must have odd dimensions of at least 3, got {cols}x{rows}");
    }
    let mut grid = MazeGrid::filled(cols, rows);
    let mut stack = vec![(1usize, 1usize)];
    grid.open(1, 1);

    while let Some(&(x, y)) = stack.last() {
        let neighbours: Vec<(usize, usize)> = [(0i64, -2i64), (2, 0), (0, 2), (-2, 0)]
            .iter()
            .filter_map(|(dx, dy)| {
                let nx = x as i64 + dx;
                let ny = y as i64 + dy;
                let inside = nx > 0 && nx < cols as i64 - 1 && ny > 0 && ny < rows as i64 - 1;
                (inside && !grid.is_path(nx, ny)).then_some((nx as usize, ny as usize))
            })
            .collect();
        if neighbours.is_empty() {
            stack.pop();
            continue;
        }
        let (nx, ny) = neighbours[rng.random_range(0..neighbours.len())];
        grid.open(nx, ny);
        grid.open((x + nx) / 2, (y + ny) / 2);
        stack.push((nx, ny));
    }

    let (ex, ey) = grid.entrance();
    grid.open(ex, ey);
    let (xx, xy) = grid.exit();
    grid.open(xx, xy);
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::VecDeque;

    fn reachable(grid: &MazeGrid) -> Vec<Vec<bool>> {
        let mut seen = vec![vec![false; grid.cols]; grid.rows];
        let (sx, sy) = grid.entrance();
        let mut queue = VecDeque::from([(sx as i64, sy as i64)]);
        seen[sy][sx] = true;
        while let Some((x, y)) = queue.pop_front() {
            for (dx, dy) in [(0, -1), (1, 0), (0, 1), (-1, 0)] {
                let (nx, ny) = (x + dx, y + dy);
                if grid.is_path(nx, ny) && !seen[ny as usize][nx as usize] {
                    seen[ny as usize][nx as usize] = true;
                    queue.push_back((nx, ny));
                }
            }
        }
        seen
    }

    #[test]
    fn every_path_cell_is_reachable_from_the_entrance() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let grid = generate(19, 13, &mut rng).unwrap();
            let seen = reachable(&grid);
            for row in 0..grid.rows {
                for col in 0..grid.cols {
                    if grid.is_path(col as i64, row as i64) {
                        assert!(seen[row][col], "seed {seed}: ({col}, {row}) unreachable");
                    }
                }
            }
            let (ex, ey) = grid.exit();
            assert!(seen[ey][ex]);
        }
    }

    #[test]
    fn border_has_one_entrance_and_one_exit() {
        let mut rng = StdRng::seed_from_u64(4);
        let grid = generate(19, 13, &mut rng).unwrap();
        let mut openings = Vec::new();
        for row in 0..grid.rows {
            for col in 0..grid.cols {
                let border = row == 0 || col == 0 || row == grid.rows - 1 || col == grid.cols - 1;
                if border && grid.is_path(col as i64, row as i64) {
                    openings.push((col, row));
                }
            }
        }
        assert_eq!(openings, vec![(0, 1), (18, 11)]);
    }

    #[test]
    fn smallest_maze_is_a_corridor() {
        let mut rng = StdRng::seed_from_u64(1);
        let grid = generate(3, 3, &mut rng).unwrap();
        assert_eq!(grid, MazeGrid::default());
        assert!(grid.is_path(0, 1) && grid.is_path(1, 1) && grid.is_path(2, 1));
        assert!(!grid.is_path(1, 0));
    }

    #[test]
    fn invalid_sizes_are_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(generate(18, 13, &mut rng).is_err());
        assert!(generate(19, 1, &mut rng).is_err());
        assert!(generate(1, 1, &mut rng).is_err());
    }

    #[test]
    fn outside_is_wall() {
        let mut rng = StdRng::seed_from_u64(1);
        let grid = generate(5, 5, &mut rng).unwrap();
        assert_eq!(grid.get(-1, 0), Cell::Wall);
        assert_eq!(grid.get(5, 2), Cell::Wall);
    }
}
