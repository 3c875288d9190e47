
//! Packs a solved field into four channels per cell, ready for a texture:
//! the distance, the closest seed's position, and whether the cell was reached.

use crate::distance_field::DistanceField;
use crate::error::{DistanceFieldError, Result};
use crate::grid::Cell;


/// Channels per texel.
pub const CHANNELS: usize = 4;


/// Needs less storage with sufficient precision, but takes longer
/// because of conversions between f16 and f32.
pub type F16ChannelStorage = Vec<half::f16>;

/// Needs more storage with high precision, without any conversions.
pub type F32ChannelStorage = Vec<f32>;

pub trait ChannelStorage {
    fn new(length: usize) -> Self;

    fn get(&self, index: usize) -> f32;

    fn set(&mut self, index: usize, value: f32);
}


/// The packed texels of a solved field, row-major, `CHANNELS` values per cell.
#[derive(Clone, PartialEq, Debug)]
pub struct PackedField<S: ChannelStorage> {
    pub width: u16,
    pub height: u16,
    pub texels: S,
}

impl<S> PackedField<S> where S: ChannelStorage {

    /// Encode every cell of a solved field.
    pub fn pack(field: &DistanceField) -> Result<Self> {
        if !field.is_solved() {
            return Err(DistanceFieldError::InvalidState(field.state()));
        }

        let width = field.width();
        let height = field.height();
        let mut texels = S::new(width as usize * height as usize * CHANNELS);

        for y in 0 .. height {
            for x in 0 .. width {
                let texel = encode_cell(field.get(x, y)?, width, height);
                let index = (width as usize * y as usize + x as usize) * CHANNELS;

                for (channel, &value) in texel.iter().enumerate() {
                    texels.set(index + channel, value);
                }
            }
        }

        Ok(PackedField { width, height, texels })
    }

    pub fn texel(&self, x: u16, y: u16) -> [f32; CHANNELS] {
        let index = (self.width as usize * y as usize + x as usize) * CHANNELS;
        let mut texel = [0.0; CHANNELS];

        for (channel, value) in texel.iter_mut().enumerate() {
            *value = self.texels.get(index + channel);
        }

        texel
    }

    /// Convert to a floating point RGBA piston image.
    #[cfg(feature = "piston_image")]
    pub fn to_rgba32f_image(&self) -> image::Rgba32FImage {
        image::ImageBuffer::from_fn(self.width as u32, self.height as u32, |x, y| {
            image::Rgba(self.texel(x as u16, y as u16))
        })
    }
}

/// Distance divided by the larger grid dimension, keeping the sign,
/// then the closest seed normalized to `[0, 1]` on each axis,
/// then `1` for cells reached by a seed.
/// Unset cells encode as the maximum distance with no seed.
pub fn encode_cell(cell: Cell, width: u16, height: u16) -> [f32; CHANNELS] {
    if !cell.is_set() {
        return [1.0, 0.0, 0.0, 0.0];
    }

    let magnitude = (cell.distance_squared.unsigned_abs() as f64).sqrt();
    let distance = magnitude.copysign(cell.distance_squared as f64) / width.max(height) as f64;

    [
        distance as f32,
        normalize(cell.closest_seed.0, width),
        normalize(cell.closest_seed.1, height),
        1.0,
    ]
}

#[inline]
fn normalize(coordinate: u16, size: u16) -> f32 {
    if size > 1 { coordinate as f32 / (size - 1) as f32 } else { 0.0 }
}


impl ChannelStorage for F16ChannelStorage {
    fn new(length: usize) -> Self {
        vec![half::f16::ZERO; length]
    }

    #[inline]
    fn get(&self, index: usize) -> f32 {
        self[index].to_f32()
    }

    #[inline]
    fn set(&mut self, index: usize, value: f32) {
        self[index] = half::f16::from_f32(value)
    }
}

impl ChannelStorage for F32ChannelStorage {
    fn new(length: usize) -> Self {
        vec![0.0; length]
    }

    #[inline]
    fn get(&self, index: usize) -> f32 {
        self[index]
    }

    #[inline]
    fn set(&mut self, index: usize, value: f32) {
        self[index] = value
    }
}
