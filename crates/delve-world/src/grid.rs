//! Fixed-size 2D cell arrays.

use delve_protocol::{Direction, Position, Tile};

/// What a grid cell holds, independent of who stands on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    /// A treasure worth this many points (always > 0).
    Treasure(u32),
    /// The doorway from the main area into the treasure room.
    RoomEntrance,
}

impl Cell {
    pub fn is_empty(self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn treasure_value(self) -> Option<u32> {
        match self {
            Self::Treasure(value) => Some(value),
            _ => None,
        }
    }
}

impl From<Cell> for Tile {
    fn from(cell: Cell) -> Self {
        match cell {
            Cell::Empty => Tile::Empty,
            Cell::Treasure(value) => Tile::Treasure { value },
            Cell::RoomEntrance => Tile::Entrance,
        }
    }
}

/// A rectangular grid whose dimensions never change after construction.
///
/// Cells are stored row-major in one `Vec`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates a grid of `rows × cols` empty cells.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![Cell::Empty; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    fn index(&self, pos: Position) -> Option<usize> {
        self.contains(pos).then(|| pos.row * self.cols + pos.col)
    }

    /// The cell at `pos`, or `None` outside the grid.
    pub fn get(&self, pos: Position) -> Option<Cell> {
        self.index(pos).map(|i| self.cells[i])
    }

    /// Overwrites the cell at `pos`. Returns the previous cell, or `None`
    /// (and changes nothing) when `pos` is outside the grid.
    pub fn set(&mut self, pos: Position, cell: Cell) -> Option<Cell> {
        let i = self.index(pos)?;
        Some(std::mem::replace(&mut self.cells[i], cell))
    }

    /// Picks up the treasure at `pos`, leaving the cell empty.
    ///
    /// Returns the treasure's value, or `None` if there was no treasure.
    /// A second call on the same cell always returns `None`.
    pub fn take_treasure(&mut self, pos: Position) -> Option<u32> {
        let i = self.index(pos)?;
        let value = self.cells[i].treasure_value()?;
        self.cells[i] = Cell::Empty;
        Some(value)
    }

    /// The neighbour of `pos` one step in `dir`, if it is inside the grid.
    pub fn step(&self, pos: Position, dir: Direction) -> Option<Position> {
        let (dr, dc) = dir.delta();
        let row = pos.row.checked_add_signed(dr)?;
        let col = pos.col.checked_add_signed(dc)?;
        let next = Position::new(row, col);
        self.contains(next).then_some(next)
    }

    /// Iterates over the rows as slices.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[Cell]> {
        // `max(1)` keeps `chunks` happy for a zero-column grid.
        self.cells.chunks(self.cols.max(1))
    }

    /// Every position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| Position::new(row, col)))
    }

    pub fn count_treasures(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| matches!(c, Cell::Treasure(_)))
            .count()
    }

    /// Sum of every treasure still on the grid.
    pub fn treasure_value_sum(&self) -> u32 {
        self.cells.iter().filter_map(|c| c.treasure_value()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(row: usize, col: usize) -> Position {
        Position::new(row, col)
    }

    #[test]
    fn test_new_grid_is_empty() {
        let grid = Grid::new(3, 4);
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.cols(), 4);
        assert!(grid.positions().all(|p| grid.get(p) == Some(Cell::Empty)));
        assert_eq!(grid.positions().count(), 12);
    }

    #[test]
    fn test_get_outside_grid_returns_none() {
        let grid = Grid::new(2, 2);
        assert_eq!(grid.get(pos(2, 0)), None);
        assert_eq!(grid.get(pos(0, 2)), None);
    }

    #[test]
    fn test_set_outside_grid_changes_nothing() {
        let mut grid = Grid::new(2, 2);
        assert_eq!(grid.set(pos(5, 5), Cell::Treasure(3)), None);
        assert_eq!(grid.count_treasures(), 0);
    }

    #[test]
    fn test_take_treasure_is_idempotent() {
        let mut grid = Grid::new(2, 2);
        grid.set(pos(1, 1), Cell::Treasure(6));

        assert_eq!(grid.take_treasure(pos(1, 1)), Some(6));
        assert_eq!(grid.get(pos(1, 1)), Some(Cell::Empty));
        assert_eq!(grid.take_treasure(pos(1, 1)), None);
    }

    #[test]
    fn test_take_treasure_ignores_entrance() {
        let mut grid = Grid::new(2, 2);
        grid.set(pos(0, 0), Cell::RoomEntrance);
        assert_eq!(grid.take_treasure(pos(0, 0)), None);
        assert_eq!(grid.get(pos(0, 0)), Some(Cell::RoomEntrance));
    }

    #[test]
    fn test_step_stops_at_walls() {
        let grid = Grid::new(3, 3);
        assert_eq!(grid.step(pos(0, 0), Direction::Up), None);
        assert_eq!(grid.step(pos(0, 0), Direction::Left), None);
        assert_eq!(grid.step(pos(2, 2), Direction::Down), None);
        assert_eq!(grid.step(pos(2, 2), Direction::Right), None);
        assert_eq!(grid.step(pos(1, 1), Direction::Up), Some(pos(0, 1)));
        assert_eq!(grid.step(pos(1, 1), Direction::Right), Some(pos(1, 2)));
    }

    #[test]
    fn test_iter_rows_yields_row_slices() {
        let mut grid = Grid::new(2, 3);
        grid.set(pos(1, 2), Cell::Treasure(4));
        let rows: Vec<&[Cell]> = grid.iter_rows().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][2], Cell::Treasure(4));
    }

    #[test]
    fn test_treasure_totals() {
        let mut grid = Grid::new(2, 2);
        grid.set(pos(0, 1), Cell::Treasure(2));
        grid.set(pos(1, 0), Cell::Treasure(5));
        assert_eq!(grid.count_treasures(), 2);
        assert_eq!(grid.treasure_value_sum(), 7);
    }

    #[test]
    fn test_cell_into_tile() {
        assert_eq!(Tile::from(Cell::Treasure(3)), Tile::Treasure { value: 3 });
        assert_eq!(Tile::from(Cell::RoomEntrance), Tile::Entrance);
        assert_eq!(Tile::from(Cell::Empty), Tile::Empty);
    }
}
