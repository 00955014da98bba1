/// Per-cell pixel size of the reference window renderer.
pub const CELL_PIXELS: usize = 5;

/// Color code of an empty cell
pub const EMPTY: u16 = 0;

/// Snapshot of a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cell {
    /// 0 = empty, 1..=360 = hue of the grain
    pub color_code: u16,
    /// Rows per tick; only meaningful while occupied
    pub velocity: i32,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        self.color_code == EMPTY
    }
}

/// Sand grid: parallel color/velocity arrays, indexed `[col][row]` with rows
/// growing downward. Storage is column-major so a column is contiguous.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    cols: usize,
    rows: usize,
    color: Vec<u16>,
    velocity: Vec<i32>,
}

impl Grid {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            color: vec![EMPTY; cols * rows],
            velocity: vec![0; cols * rows],
        }
    }

    /// Size a grid to a viewport: `cols = width / cell_size`, `rows = height / cell_size`.
    /// A viewport smaller than one cell yields a zero-sized grid.
    pub fn from_viewport(width: usize, height: usize, cell_size: usize) -> Self {
        let cell_size = cell_size.max(1);
        Self::new(width / cell_size, height / cell_size)
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn within_cols(&self, col: isize) -> bool {
        col >= 0 && (col as usize) < self.cols
    }

    pub fn within_rows(&self, row: isize) -> bool {
        row >= 0 && (row as usize) < self.rows
    }

    pub fn contains(&self, col: isize, row: isize) -> bool {
        self.within_cols(col) && self.within_rows(row)
    }

    #[inline]
    fn index(&self, col: usize, row: usize) -> usize {
        assert!(
            col < self.cols && row < self.rows,
            "cell ({}, {}) outside {}x{} grid",
            col,
            row,
            self.cols,
            self.rows
        );
        col * self.rows + row
    }

    pub fn get(&self, col: usize, row: usize) -> Cell {
        let idx = self.index(col, row);
        Cell {
            color_code: self.color[idx],
            velocity: self.velocity[idx],
        }
    }

    pub fn set(&mut self, col: usize, row: usize, color_code: u16, velocity: i32) {
        let idx = self.index(col, row);
        self.color[idx] = color_code;
        self.velocity[idx] = velocity;
    }

    pub fn color_code(&self, col: usize, row: usize) -> u16 {
        self.color[self.index(col, row)]
    }

    pub fn is_empty(&self, col: usize, row: usize) -> bool {
        self.color_code(col, row) == EMPTY
    }

    /// Empty every cell, keeping the allocation
    pub fn clear(&mut self) {
        self.color.fill(EMPTY);
        self.velocity.fill(0);
    }

    pub fn occupied_count(&self) -> usize {
        self.color.iter().filter(|&&c| c != EMPTY).count()
    }

    /// Occupied cells as `(col, row, cell)`, column by column
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize, Cell)> + '_ {
        let rows = self.rows;
        self.color
            .iter()
            .zip(self.velocity.iter())
            .enumerate()
            .filter(|(_, (c, _))| **c != EMPTY)
            .map(move |(idx, (&color_code, &velocity))| {
                (
                    idx / rows,
                    idx % rows,
                    Cell {
                        color_code,
                        velocity,
                    },
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_viewport_divides_by_cell_size() {
        let grid = Grid::from_viewport(600, 461, CELL_PIXELS);
        assert_eq!(grid.cols(), 120);
        assert_eq!(grid.rows(), 92);
        assert_eq!(grid.occupied_count(), 0);
    }

    #[test]
    fn test_bounds_checks() {
        let grid = Grid::new(4, 3);
        assert!(grid.within_cols(0));
        assert!(grid.within_cols(3));
        assert!(!grid.within_cols(4));
        assert!(!grid.within_cols(-1));
        assert!(grid.within_rows(2));
        assert!(!grid.within_rows(3));
        assert!(!grid.contains(-1, 0));
    }

    #[test]
    fn test_set_and_get() {
        let mut grid = Grid::new(4, 3);
        grid.set(3, 2, 120, 1);
        assert_eq!(
            grid.get(3, 2),
            Cell {
                color_code: 120,
                velocity: 1
            }
        );
        assert!(grid.get(2, 2).is_empty());
        assert_eq!(grid.occupied_count(), 1);

        let occupied: Vec<_> = grid.occupied().collect();
        assert_eq!(occupied.len(), 1);
        assert_eq!((occupied[0].0, occupied[0].1), (3, 2));

        grid.clear();
        assert_eq!(grid.occupied_count(), 0);
    }

    #[test]
    #[should_panic(expected = "outside 4x3 grid")]
    fn test_out_of_bounds_panics() {
        let grid = Grid::new(4, 3);
        grid.get(4, 0);
    }

    #[test]
    fn test_zero_sized_viewport() {
        let grid = Grid::from_viewport(3, 100, CELL_PIXELS);
        assert_eq!(grid.cols(), 0);
        assert!(!grid.within_cols(0));
        assert_eq!(grid.occupied().count(), 0);
    }
}
