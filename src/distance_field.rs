
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;
use crossbeam_channel::{Receiver, TryRecvError};
use crate::error::{DistanceFieldError, Result};
use crate::grid::{Grid, Cell, SolveState};
use crate::scheduler::{Scheduler, SolverConfig};
use crate::seed_mask::SeedMask;
use crate::signed;


/// A grid of cells together with the scheduler that solves it.
///
/// Mark seeds, then solve once. Solving locks the grid against
/// further edits until `reset` is called.
#[derive(Clone, Debug)]
pub struct DistanceField {
    grid: Grid,
    scheduler: Scheduler,
    signed: bool,
}

impl DistanceField {

    /// Create an empty field solved on the global rayon pool.
    pub fn new(width: u16, height: u16) -> Result<Self> {
        Self::with_scheduler(width, height, Scheduler::default())
    }

    /// Create an empty field with a custom solver configuration.
    pub fn with_config(width: u16, height: u16, config: SolverConfig) -> Result<Self> {
        Self::with_scheduler(width, height, Scheduler::new(config)?)
    }

    /// Create an empty field that shares the pool of an existing scheduler.
    pub fn with_scheduler(width: u16, height: u16, scheduler: Scheduler) -> Result<Self> {
        Ok(DistanceField { grid: Grid::new(width, height)?, scheduler, signed: false })
    }

    /// Create a field with every inside pixel of the mask marked as a seed.
    pub fn from_mask(mask: &impl SeedMask) -> Result<Self> {
        let mut field = Self::new(mask.width(), mask.height())?;

        for (x, y) in mask.seeds() {
            field.mark_seed(x, y)?;
        }

        Ok(field)
    }

    #[inline]
    pub fn width(&self) -> u16 {
        self.grid.width()
    }

    #[inline]
    pub fn height(&self) -> u16 {
        self.grid.height()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn state(&self) -> SolveState {
        self.grid.state()
    }

    pub fn is_solved(&self) -> bool {
        self.grid.state() == SolveState::Solved
    }

    /// Whether the last solve produced signed distances.
    pub fn is_signed(&self) -> bool {
        self.signed
    }

    pub fn mark_seed(&mut self, x: u16, y: u16) -> Result<()> {
        self.grid.mark_seed(x, y)
    }

    /// Clear all seeds and distances, making the field editable again.
    pub fn reset(&mut self) -> Result<()> {
        self.grid.reset()?;
        self.signed = false;
        Ok(())
    }

    pub fn get(&self, x: u16, y: u16) -> Result<Cell> {
        self.grid.get(x, y)
    }

    /// The squared distance and closest seed coordinates of a cell.
    pub fn get_cell(&self, x: u16, y: u16) -> Result<(i64, u16, u16)> {
        let cell = self.grid.get(x, y)?;
        Ok((cell.distance_squared, cell.closest_seed.0, cell.closest_seed.1))
    }

    /// Solve the field, blocking until all stages have finished.
    /// With `signed`, cells strictly inside the seeded region become negative.
    ///
    /// If a stage panics, the grid is cleared back to `Created`
    /// and `SolveAborted` is returned.
    pub fn solve(&mut self, signed: bool) -> Result<()> {
        let complement = self.begin_solve(signed)?;
        self.guarded(move |field| field.run(complement))
    }

    /// Solve the field on the scheduler's pool without blocking.
    /// The field is handed back by the returned `PendingSolve`.
    pub fn solve_async(mut self, signed: bool) -> std::result::Result<PendingSolve, RejectedSolve> {
        let complement = match self.begin_solve(signed) {
            Ok(complement) => complement,
            Err(error) => return Err(RejectedSolve { field: self, error }),
        };

        let (sender, receiver) = crossbeam_channel::bounded(1);
        let scheduler = self.scheduler.clone();

        scheduler.spawn(move || {
            let result = self.guarded(move |field| field.run(complement)).map(|()| self);

            // the receiver may have been dropped, nobody is waiting then
            let _ = sender.send(result);
        });

        Ok(PendingSolve { receiver, finished: None })
    }

    /// Check every precondition and lock the grid.
    /// Nothing is modified if this fails.
    fn begin_solve(&mut self, signed: bool) -> Result<Option<Grid>> {
        match self.grid.state() {
            SolveState::Solving | SolveState::Solved => {
                return Err(DistanceFieldError::InvalidState(self.grid.state()))
            }
            SolveState::Created | SolveState::Editable => {}
        }

        if !self.grid.is_square() {
            return Err(DistanceFieldError::Unsupported {
                width: self.grid.width(), height: self.grid.height()
            });
        }

        let complement = if signed { Some(signed::complement_of(&self.grid)?) } else { None };

        self.signed = signed;
        self.grid.set_state(SolveState::Solving);
        Ok(complement)
    }

    /// Run the stages of a started solve, recovering the grid if they panic.
    fn guarded(&mut self, stages: impl FnOnce(&mut Self)) -> Result<()> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| stages(self)));

        if outcome.is_err() {
            log::error!("solving {}x{} distance field panicked, clearing the grid", self.width(), self.height());
            self.grid.clear();
            self.signed = false;
            return Err(DistanceFieldError::SolveAborted);
        }

        Ok(())
    }

    fn run(&mut self, complement: Option<Grid>) {
        let start_time = Instant::now();
        let scheduler = &self.scheduler;
        let grid = &mut self.grid;

        log::debug!(
            "solving {}x{} distance field with {} seeds (signed: {})",
            grid.width(), grid.height(), grid.seed_count(), complement.is_some()
        );

        match complement {
            None => scheduler.run_pipeline(grid),

            Some(mut complement) => {
                scheduler.install(|| rayon::join(
                    || scheduler.run_pipeline(grid),
                    || scheduler.run_pipeline(&mut complement),
                ));

                scheduler.install(|| signed::combine(grid, &complement));
            }
        }

        grid.set_state(SolveState::Solved);
        log::debug!("solved distance field in {:?}", start_time.elapsed());
    }
}


/// A solve running in the background.
pub struct PendingSolve {
    receiver: Receiver<Result<DistanceField>>,
    finished: Option<Result<DistanceField>>,
}

impl PendingSolve {

    /// Whether all stages have completed. Never blocks.
    pub fn is_finished(&mut self) -> bool {
        self.poll();
        self.finished.is_some()
    }

    /// Take the outcome of the solve if it is ready.
    /// Returns `None` while the stages are still running.
    pub fn try_finish(&mut self) -> Option<Result<DistanceField>> {
        self.poll();
        self.finished.take()
    }

    /// Block until the solve has completed.
    /// A solve that panicked, or whose worker went away, reports `SolveAborted`.
    pub fn wait(mut self) -> Result<DistanceField> {
        match self.finished.take() {
            Some(result) => result,
            None => self.receiver.recv()
                .unwrap_or(Err(DistanceFieldError::SolveAborted)),
        }
    }

    fn poll(&mut self) {
        if self.finished.is_none() {
            match self.receiver.try_recv() {
                Ok(result) => self.finished = Some(result),
                Err(TryRecvError::Disconnected) => self.finished = Some(Err(DistanceFieldError::SolveAborted)),
                Err(TryRecvError::Empty) => {}
            }
        }
    }
}

impl std::fmt::Debug for PendingSolve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingSolve")
            .field("finished", &self.finished.is_some())
            .finish()
    }
}


/// A background solve that could not be started.
/// Hands back the untouched field.
#[derive(Debug)]
pub struct RejectedSolve {
    pub field: DistanceField,
    pub error: DistanceFieldError,
}

impl std::fmt::Display for RejectedSolve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "solve rejected: {}", self.error)
    }
}

impl std::error::Error for RejectedSolve {}

impl From<RejectedSolve> for DistanceFieldError {
    fn from(rejected: RejectedSolve) -> Self {
        rejected.error
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solve_moves_through_all_states() {
        let mut field = DistanceField::new(4, 4).unwrap();
        assert_eq!(field.state(), SolveState::Created);

        field.mark_seed(1, 1).unwrap();
        assert_eq!(field.state(), SolveState::Editable);

        field.solve(false).unwrap();
        assert!(field.is_solved());
        assert!(!field.is_signed());
    }

    #[test]
    fn solving_twice_is_rejected() {
        let mut field = DistanceField::new(4, 4).unwrap();
        field.mark_seed(1, 1).unwrap();
        field.solve(false).unwrap();

        let before = field.grid().clone();
        assert_eq!(field.solve(true), Err(DistanceFieldError::InvalidState(SolveState::Solved)));
        assert_eq!(field.grid(), &before);
        assert!(!field.is_signed());
    }

    #[test]
    fn rectangular_fields_cannot_be_solved() {
        let mut field = DistanceField::new(6, 4).unwrap();
        field.mark_seed(1, 1).unwrap();

        assert_eq!(field.solve(false), Err(DistanceFieldError::Unsupported { width: 6, height: 4 }));
        assert_eq!(field.state(), SolveState::Editable);
    }

    #[test]
    fn rejected_background_solve_returns_the_field() {
        let mut field = DistanceField::new(3, 3).unwrap();
        field.mark_seed(0, 0).unwrap();
        field.solve(false).unwrap();

        let rejected = field.solve_async(false).unwrap_err();
        assert_eq!(rejected.error, DistanceFieldError::InvalidState(SolveState::Solved));
        assert!(rejected.field.is_solved());
    }

    #[test]
    fn get_cell_flattens_the_cell() {
        let mut field = DistanceField::new(3, 3).unwrap();
        field.mark_seed(2, 1).unwrap();
        field.solve(false).unwrap();

        assert_eq!(field.get_cell(0, 0).unwrap(), (5, 2, 1));
        assert!(field.get_cell(3, 0).is_err());
    }

    #[test]
    fn panicking_stages_leave_a_reusable_grid() {
        let mut field = DistanceField::new(4, 4).unwrap();
        field.mark_seed(1, 2).unwrap();
        let complement = field.begin_solve(true).unwrap();
        assert_eq!(field.state(), SolveState::Solving);

        let result = field.guarded(move |field| {
            field.grid.swap_axes();
            drop(complement);
            panic!("stage failed");
        });

        assert_eq!(result, Err(DistanceFieldError::SolveAborted));
        assert_eq!(field.state(), SolveState::Created);
        assert!(!field.grid().is_transposed());
        assert!(!field.is_signed());

        field.reset().unwrap();
        field.mark_seed(1, 2).unwrap();
        field.solve(false).unwrap();
        assert_eq!(field.get_cell(3, 3).unwrap(), (5, 1, 2));
    }

    #[test]
    fn vanished_worker_reports_an_aborted_solve() {
        let (sender, receiver) = crossbeam_channel::bounded(1);
        drop(sender);

        let mut pending = PendingSolve { receiver: receiver.clone(), finished: None };
        assert!(pending.is_finished());
        assert!(matches!(pending.try_finish(), Some(Err(DistanceFieldError::SolveAborted))));

        let pending = PendingSolve { receiver, finished: None };
        assert_eq!(pending.wait().unwrap_err(), DistanceFieldError::SolveAborted);
    }
}
