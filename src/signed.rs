
//! Signed distances from two unsigned solves:
//! one of the seed region and one of its complement.

use rayon::prelude::*;
use crate::error::Result;
use crate::grid::{Grid, Cell};


/// A grid in which every non-seed cell of `grid` is a seed
/// and every seed of `grid` is unset.
pub fn complement_of(grid: &Grid) -> Result<Grid> {
    let mut complement = Grid::new(grid.width(), grid.height())?;
    if grid.is_transposed() {
        complement.swap_axes();
    }

    for y in 0 .. grid.height() {
        for x in 0 .. grid.width() {
            if grid.cell(x, y).distance_squared != 0 {
                *complement.cell_mut(x, y) = Cell::seed(x, y);
            }
        }
    }

    Ok(complement)
}

/// Merge the solved complement into the solved primary grid.
///
/// Seed cells of the primary grid move below zero by their distance
/// to the closest non-seed cell. Seed cells directly next to a non-seed cell
/// form the boundary of the region and stay at zero.
/// Both grids must share the same orientation.
pub fn combine(primary: &mut Grid, complement: &Grid) {
    debug_assert_eq!(primary.is_transposed(), complement.is_transposed());

    primary.cells_mut().par_iter_mut()
        .zip(complement.cells().par_iter())
        .for_each(|(cell, outside)| {
            if cell.distance_squared == 0 && outside.is_set() && outside.distance_squared > 1 {
                *cell = Cell {
                    distance_squared: -outside.distance_squared,
                    closest_seed: outside.closest_seed,
                };
            }
        });
}
