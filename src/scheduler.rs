
//! Runs the row-solve and transpose stages over a grid.
//! Row solving fans out over bands of rows,
//! every stage waits for the previous one to finish completely.

use std::sync::Arc;
use rayon::prelude::*;
use crate::error::{DistanceFieldError, Result};
use crate::grid::Grid;
use crate::row_solver::RowSolver;


/// Cells handed to one task, balancing per-task overhead against parallelism.
pub const DEFAULT_CELLS_PER_TASK: usize = 256;


/// Configuration for a scheduler.
///
/// Use `SolverConfig::default()` for the default band size on the global
/// rayon pool, or customise individual knobs via the builder methods.
#[derive(Clone, Debug)]
pub struct SolverConfig {
    /// Approximate number of cells solved by one task.
    /// Bands always contain at least one full row.
    pub cells_per_task: usize,

    /// Number of threads of a dedicated pool.
    /// `None` uses the global rayon pool.
    pub thread_count: Option<usize>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            cells_per_task: DEFAULT_CELLS_PER_TASK,
            thread_count: None,
        }
    }
}

impl SolverConfig {
    /// Set the approximate number of cells per task.
    pub fn cells_per_task(mut self, cells: usize) -> Self {
        self.cells_per_task = cells;
        self
    }

    /// Solve on a dedicated pool with this many threads.
    pub fn thread_count(mut self, n: usize) -> Self {
        self.thread_count = Some(n.max(1));
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.cells_per_task == 0 {
            return Err(DistanceFieldError::InvalidConfiguration("cells per task must be positive"));
        }

        Ok(())
    }

    /// Number of rows per band for rows of the given length.
    pub fn rows_per_band(&self, row_length: usize) -> usize {
        (self.cells_per_task / row_length.max(1)).max(1)
    }
}


#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Stage {
    RowSolve,
    Transpose,
}

/// Two horizontal sweeps, each followed by a transposition,
/// propagate seeds along both axes and restore the orientation.
pub const PIPELINE: [Stage; 4] = [Stage::RowSolve, Stage::Transpose, Stage::RowSolve, Stage::Transpose];


/// Fork-join executor for the solver pipeline.
/// Clones share the same pool.
#[derive(Clone, Debug)]
pub struct Scheduler {
    config: SolverConfig,
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Scheduler { config: SolverConfig::default(), pool: None }
    }
}

impl Scheduler {
    pub fn new(config: SolverConfig) -> Result<Self> {
        config.validate()?;

        let pool = match config.thread_count {
            None => None,
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|index| format!("distance-field-{}", index))
                    .build()
                    .map_err(|error| DistanceFieldError::WorkerPool(error.to_string()))?;

                Some(Arc::new(pool))
            }
        };

        Ok(Scheduler { config, pool })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Run the closure inside this scheduler's pool.
    pub(crate) fn install<R: Send>(&self, operation: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(operation),
            None => operation(),
        }
    }

    /// Run the closure on this scheduler's pool without waiting for it.
    pub(crate) fn spawn(&self, operation: impl FnOnce() + Send + 'static) {
        match &self.pool {
            Some(pool) => pool.spawn(operation),
            None => rayon::spawn(operation),
        }
    }

    /// Run all four stages, each one after the previous has completed.
    /// The grid must be square.
    pub(crate) fn run_pipeline(&self, grid: &mut Grid) {
        for &stage in PIPELINE.iter() {
            self.run_stage(grid, stage);
        }
    }

    pub(crate) fn run_stage(&self, grid: &mut Grid, stage: Stage) {
        match stage {
            Stage::RowSolve => {
                let rounds = self.solve_rows(grid);
                let axis = if grid.is_transposed() { "columns" } else { "rows" };
                log::trace!("solving {} finished after at most {} rounds", axis, rounds);
            }

            Stage::Transpose => {
                grid.swap_axes();
                log::trace!("transposed {}x{} grid", grid.width(), grid.height());
            }
        }
    }

    /// Solve every row of the grid, one task per band of rows.
    /// Returns the largest number of relaxation rounds any row needed.
    fn solve_rows(&self, grid: &mut Grid) -> usize {
        let row_length = grid.row_length();
        let rows_per_band = self.config.rows_per_band(row_length);
        let cells = grid.cells_mut();

        self.install(|| {
            cells.par_chunks_mut(rows_per_band * row_length)
                .map(|band| {
                    let mut solver = RowSolver::new(row_length);

                    band.chunks_mut(row_length)
                        .map(|row| solver.solve(row))
                        .max().unwrap_or(0)
                })
                .max().unwrap_or(0)
        })
    }
}
