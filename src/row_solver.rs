
//! Propagates distances along a single row of cells.
//! Rows never look at each other here, so any number
//! of rows can be solved at the same time.

use crate::grid::Cell;


/// How many recent entries a worklist compares against before accepting an index.
pub const WORKLIST_LOOKBACK: usize = 3;


/// Column indices scheduled for the next relaxation round.
///
/// Duplicates are only suppressed against the last few entries,
/// so an index may occasionally be scheduled twice.
/// Relaxing a cell twice within a round yields the same update both times.
#[derive(Clone, Debug, Default)]
pub struct Worklist {
    indices: Vec<usize>,
}

impl Worklist {
    pub fn with_capacity(capacity: usize) -> Self {
        Worklist { indices: Vec::with_capacity(capacity) }
    }

    /// Schedule an index unless it is one of the most recent entries.
    #[inline]
    pub fn push(&mut self, index: usize) {
        let recently_scheduled = self.indices.iter().rev()
            .take(WORKLIST_LOOKBACK)
            .any(|&scheduled| scheduled == index);

        if !recently_scheduled {
            self.indices.push(index);
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.indices.clear()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.indices
    }
}


#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Side {
    Left,
    Right,
}


/// Solves rows one after another, reusing its worklists
/// and its buffer of pending updates. Each parallel task owns its own solver.
#[derive(Clone, Debug, Default)]
pub struct RowSolver {
    current: Worklist,
    next: Worklist,
    updates: Vec<(usize, Cell, Side)>,
}

impl RowSolver {
    pub fn new(row_length: usize) -> Self {
        RowSolver {
            current: Worklist::with_capacity(row_length),
            next: Worklist::with_capacity(row_length),
            updates: Vec::with_capacity(row_length),
        }
    }

    /// Propagate every set cell of the row to its neighbours
    /// until no cell improves any more.
    ///
    /// In round `k`, a scheduled cell may take over a neighbour's seed
    /// at the neighbour's squared distance plus `beta = 2k - 1`,
    /// since consecutive squares differ by consecutive odd numbers.
    /// All cells of a round read their neighbours as they were when the round began,
    /// so a value that travelled `k` cells has grown by exactly `k²`.
    ///
    /// Returns the number of relaxation rounds performed.
    pub fn solve(&mut self, row: &mut [Cell]) -> usize {
        let RowSolver { current, next, updates } = self;
        current.clear();
        next.clear();

        let length = row.len();

        for column in 0 .. length {
            let cell = row[column];
            if !cell.is_set() {
                continue;
            }

            if column > 0 && row[column - 1].distance_squared > cell.distance_squared {
                current.push(column - 1);
            }

            if column + 1 < length && row[column + 1].distance_squared > cell.distance_squared {
                current.push(column + 1);
            }
        }

        let mut beta = 1;
        let mut rounds = 0;

        while !current.is_empty() {
            rounds += 1;

            updates.clear();
            updates.extend(current.as_slice().iter().filter_map(|&column| {
                relax(row, column, beta).map(|(cell, side)| (column, cell, side))
            }));

            for &(column, cell, side) in updates.iter() {
                row[column] = cell;

                match side {
                    Side::Left if column + 1 < length => next.push(column + 1),
                    Side::Right if column > 0 => next.push(column - 1),
                    _ => {}
                }
            }

            beta += 2;
            std::mem::swap(current, next);
            next.clear();
        }

        rounds
    }
}

/// The improved cell and the side of the neighbour that improved it, if any.
#[inline]
fn relax(row: &[Cell], column: usize, beta: i64) -> Option<(Cell, Side)> {
    let mut best_distance = row[column].distance_squared;
    let mut improvement = None;

    if column > 0 {
        if let Some(candidate) = candidate_through(&row[column - 1], beta) {
            if candidate.distance_squared < best_distance {
                best_distance = candidate.distance_squared;
                improvement = Some((candidate, Side::Left));
            }
        }
    }

    if let Some(right) = row.get(column + 1) {
        if let Some(candidate) = candidate_through(right, beta) {
            if candidate.distance_squared < best_distance {
                improvement = Some((candidate, Side::Right));
            }
        }
    }

    improvement
}

#[inline(always)]
fn candidate_through(neighbour: &Cell, beta: i64) -> Option<Cell> {
    if !neighbour.is_set() {
        return None;
    }

    Some(Cell {
        distance_squared: neighbour.distance_squared + beta,
        closest_seed: neighbour.closest_seed,
    })
}
