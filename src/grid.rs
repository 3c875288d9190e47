
use crate::error::{DistanceFieldError, Result};


/// One entry of the grid: the squared distance to the closest known seed
/// and the coordinates of that seed.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Cell {
    pub distance_squared: i64,
    pub closest_seed: (u16, u16),
}

impl Cell {
    /// A cell that has not been reached by any seed yet.
    pub const UNSET: Cell = Cell { distance_squared: i64::MAX, closest_seed: (0, 0) };

    /// A seed cell is its own closest seed.
    #[inline]
    pub fn seed(x: u16, y: u16) -> Self {
        Cell { distance_squared: 0, closest_seed: (x, y) }
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        self.distance_squared != Cell::UNSET.distance_squared
    }
}


/// Lifecycle of a grid. Only `reset` leads back to `Created`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SolveState {
    /// Allocated, every cell unset.
    Created,

    /// At least one seed has been marked.
    Editable,

    /// The pipeline owns the cells.
    Solving,

    /// Read-only until reset.
    Solved,
}


/// A row-major array of cells.
///
/// While transposed, physical row `r` holds the original column `r`,
/// which is only possible for square grids.
#[derive(Clone, PartialEq, Debug)]
pub struct Grid {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
    transposed: bool,
    state: SolveState,
}

impl Grid {

    /// Allocate a grid with all cells unset.
    pub fn new(width: u16, height: u16) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(DistanceFieldError::InvalidArgument {
                width: width as usize, height: height as usize
            });
        }

        Ok(Grid {
            width, height,
            cells: allocate_cells(width as usize * height as usize)?,
            transposed: false,
            state: SolveState::Created,
        })
    }

    #[inline]
    pub fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    pub fn state(&self) -> SolveState {
        self.state
    }

    #[inline]
    pub fn is_transposed(&self) -> bool {
        self.transposed
    }

    pub fn is_square(&self) -> bool {
        self.width == self.height
    }

    /// The physical row-major storage, in the current orientation.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Number of cells at distance zero.
    pub fn seed_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.distance_squared == 0).count()
    }

    /// Return every cell to unset and unlock the grid.
    pub fn reset(&mut self) -> Result<()> {
        if self.state == SolveState::Solving {
            return Err(DistanceFieldError::InvalidState(self.state));
        }

        self.clear();
        Ok(())
    }

    /// Unset every cell and return to `Created`, whatever the current state.
    pub(crate) fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = Cell::UNSET;
        }

        self.transposed = false;
        self.state = SolveState::Created;
    }

    /// Mark a cell as a seed at distance zero.
    /// Seeds can only be added before solving has started.
    pub fn mark_seed(&mut self, x: u16, y: u16) -> Result<()> {
        match self.state {
            SolveState::Solving | SolveState::Solved => {
                return Err(DistanceFieldError::InvalidState(self.state))
            }
            SolveState::Created | SolveState::Editable => {}
        }

        self.check_coordinates(x, y)?;

        let index = self.flatten_index(x, y);
        self.cells[index] = Cell::seed(x, y);
        self.state = SolveState::Editable;
        Ok(())
    }

    /// Look up the cell at the original (untransposed) coordinates.
    pub fn get(&self, x: u16, y: u16) -> Result<Cell> {
        self.check_coordinates(x, y)?;
        Ok(self.cell(x, y))
    }

    /// Swap `cell(x, y)` with `cell(y, x)`.
    /// Applying this twice restores the original contents.
    pub fn transpose(&mut self) -> Result<()> {
        if self.state == SolveState::Solving {
            return Err(DistanceFieldError::InvalidState(self.state));
        }

        if !self.is_square() {
            return Err(DistanceFieldError::Unsupported { width: self.width, height: self.height });
        }

        self.swap_axes();
        Ok(())
    }

    /// In-place transposition without state checks, used between pipeline stages.
    pub(crate) fn swap_axes(&mut self) {
        debug_assert!(self.is_square(), "in-place transposition requires a square grid");

        let size = self.width as usize;
        for row in 0 .. size {
            for column in row + 1 .. size {
                self.cells.swap(row * size + column, column * size + row);
            }
        }

        self.transposed = !self.transposed;
    }

    /// Length of one physical row.
    #[inline]
    pub(crate) fn row_length(&self) -> usize {
        if self.transposed { self.height as usize } else { self.width as usize }
    }

    #[inline]
    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    #[inline]
    pub(crate) fn set_state(&mut self, state: SolveState) {
        self.state = state;
    }

    #[inline(always)]
    pub(crate) fn cell(&self, x: u16, y: u16) -> Cell {
        self.cells[self.flatten_index(x, y)]
    }

    #[inline(always)]
    pub(crate) fn cell_mut(&mut self, x: u16, y: u16) -> &mut Cell {
        let index = self.flatten_index(x, y);
        &mut self.cells[index]
    }

    #[inline]
    pub(crate) fn flatten_index(&self, x: u16, y: u16) -> usize {
        if self.transposed {
            self.height as usize * x as usize + y as usize
        }
        else {
            self.width as usize * y as usize + x as usize
        }
    }

    fn check_coordinates(&self, x: u16, y: u16) -> Result<()> {
        if x < self.width && y < self.height { Ok(()) }
        else {
            Err(DistanceFieldError::OutOfRange { x, y, width: self.width, height: self.height })
        }
    }
}

/// Reserve a buffer of unset cells, reporting allocation failure instead of aborting.
pub(crate) fn allocate_cells(length: usize) -> Result<Vec<Cell>> {
    let mut cells = Vec::new();
    cells.try_reserve_exact(length)
        .map_err(|_| DistanceFieldError::ResourceExhausted { cells: length })?;

    cells.resize(length, Cell::UNSET);
    Ok(cells)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grid_is_unset() {
        let grid = Grid::new(3, 2).unwrap();
        assert_eq!(grid.cells().len(), 6);
        assert!(grid.cells().iter().all(|cell| *cell == Cell::UNSET));
        assert_eq!(grid.state(), SolveState::Created);
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        assert_eq!(
            Grid::new(0, 4),
            Err(DistanceFieldError::InvalidArgument { width: 0, height: 4 })
        );

        assert!(Grid::new(4, 0).is_err());
    }

    #[test]
    fn seeds_point_at_themselves() {
        let mut grid = Grid::new(4, 4).unwrap();
        grid.mark_seed(1, 3).unwrap();

        assert_eq!(grid.get(1, 3).unwrap(), Cell::seed(1, 3));
        assert_eq!(grid.state(), SolveState::Editable);
        assert_eq!(grid.seed_count(), 1);
    }

    #[test]
    fn out_of_range_seed_is_rejected() {
        let mut grid = Grid::new(4, 2).unwrap();

        assert_eq!(
            grid.mark_seed(1, 2),
            Err(DistanceFieldError::OutOfRange { x: 1, y: 2, width: 4, height: 2 })
        );

        assert!(grid.get(4, 0).is_err());
        assert_eq!(grid.state(), SolveState::Created);
    }

    #[test]
    fn solved_grid_rejects_seeds_until_reset() {
        let mut grid = Grid::new(4, 4).unwrap();
        grid.mark_seed(0, 0).unwrap();
        grid.set_state(SolveState::Solved);

        assert_eq!(grid.mark_seed(2, 2), Err(DistanceFieldError::InvalidState(SolveState::Solved)));
        assert_eq!(grid.get(2, 2).unwrap(), Cell::UNSET);

        grid.reset().unwrap();
        assert_eq!(grid.state(), SolveState::Created);
        assert!(grid.mark_seed(2, 2).is_ok());
    }

    #[test]
    fn reset_is_refused_while_solving() {
        let mut grid = Grid::new(2, 2).unwrap();
        grid.set_state(SolveState::Solving);

        assert!(grid.reset().is_err());
        assert!(grid.transpose().is_err());
    }

    #[test]
    fn transposition_keeps_logical_coordinates() {
        let mut grid = Grid::new(3, 3).unwrap();
        grid.mark_seed(2, 0).unwrap();
        grid.transpose().unwrap();

        assert!(grid.is_transposed());
        assert_eq!(grid.cells()[2 * 3], Cell::seed(2, 0));
        assert_eq!(grid.get(2, 0).unwrap(), Cell::seed(2, 0));
    }

    #[test]
    fn rectangular_transposition_is_unsupported() {
        let mut grid = Grid::new(3, 2).unwrap();
        assert_eq!(grid.transpose(), Err(DistanceFieldError::Unsupported { width: 3, height: 2 }));
        assert!(!grid.is_transposed());
    }
}
