//! This crate computes distance fields on a grid of cells,
//! given a set of seed cells. Every cell learns the squared distance
//! to its closest seed, and which seed that is.
//!
//! Distances are propagated along the rows, then the grid is transposed
//! and the rows, now holding the original columns, are swept again.
//! Rows are independent of each other, so each sweep runs in parallel
//! on bands of rows. A signed field is obtained by also solving
//! the complement of the seed region and merging both results.

pub mod error;
pub mod grid;
pub mod row_solver;
pub mod scheduler;
pub mod signed;
pub mod distance_field;
pub mod seed_mask;
pub mod export;

pub mod prelude {
    pub use crate::{
        compute_distance_field,
        compute_signed_distance_field,
    };

    pub use crate::error::{ DistanceFieldError, Result };
    pub use crate::grid::{ Cell, Grid, SolveState };
    pub use crate::scheduler::{ Scheduler, SolverConfig };

    pub use crate::distance_field::{
        DistanceField, PendingSolve, RejectedSolve
    };

    pub use crate::seed_mask::{
        SeedMask, ByteSeedMask
    };

    pub use crate::export::{
        PackedField, ChannelStorage,
        F16ChannelStorage, F32ChannelStorage
    };

    #[cfg(feature = "piston_image")]
    pub use crate::seed_mask::piston_image::LumaSeedMask;
}


use prelude::*;

/// Compute the unsigned distance field of the seeds in the specified mask.
pub fn compute_distance_field(mask: &impl SeedMask) -> Result<DistanceField> {
    let mut field = DistanceField::from_mask(mask)?;
    field.solve(false)?;
    Ok(field)
}

/// Compute the signed distance field of the specified mask,
/// negative inside the seeded region.
pub fn compute_signed_distance_field(mask: &impl SeedMask) -> Result<DistanceField> {
    let mut field = DistanceField::from_mask(mask)?;
    field.solve(true)?;
    Ok(field)
}
