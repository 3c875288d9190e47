
//! Seed regions given as images: every pixel above a brightness threshold is a seed.

use crate::error::{DistanceFieldError, Result};


/// Brightness a pixel must exceed to count as a seed, unless configured otherwise.
pub const DEFAULT_THRESHOLD: u8 = 127;


/// Anything that can tell which of its pixels are seeds.
pub trait SeedMask {
    fn width(&self) -> u16;

    fn height(&self) -> u16;

    fn is_seed(&self, x: u16, y: u16) -> bool;

    /// The coordinates of all seeds, row by row.
    fn seeds(&self) -> impl Iterator<Item = (u16, u16)> + '_ where Self: Sized {
        (0 .. self.height())
            .flat_map(move |y| (0 .. self.width()).map(move |x| (x, y)))
            .filter(move |&(x, y)| self.is_seed(x, y))
    }

    fn seed_count(&self) -> usize where Self: Sized {
        self.seeds().count()
    }
}


/// Row-major bytes, one per pixel.
#[derive(Clone, Copy, Debug)]
pub struct ByteSeedMask<'b> {
    width: u16,
    height: u16,
    bytes: &'b [u8],
    threshold: u8,
}

impl<'b> ByteSeedMask<'b> {

    /// Fails unless there is exactly one byte per pixel.
    pub fn new(width: u16, height: u16, bytes: &'b [u8]) -> Result<Self> {
        let expected = width as usize * height as usize;
        if bytes.len() != expected {
            return Err(DistanceFieldError::MaskLength { expected, actual: bytes.len() });
        }

        Ok(ByteSeedMask { width, height, bytes, threshold: DEFAULT_THRESHOLD })
    }

    /// Only bytes brighter than `threshold` become seeds.
    pub fn with_threshold(self, threshold: u8) -> Self {
        ByteSeedMask { threshold, ..self }
    }
}

impl SeedMask for ByteSeedMask<'_> {
    #[inline]
    fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    fn is_seed(&self, x: u16, y: u16) -> bool {
        self.bytes[self.width as usize * y as usize + x as usize] > self.threshold
    }
}


/// Seed masks backed by grey-scale piston images.
#[cfg(feature = "piston_image")]
pub mod piston_image {
    use image::GrayImage;
    use super::{SeedMask, DEFAULT_THRESHOLD};
    use crate::error::{DistanceFieldError, Result};

    /// The luma channel of a grey-scale image, compared against a threshold.
    #[derive(Clone, Copy, Debug)]
    pub struct LumaSeedMask<'i> {
        image: &'i GrayImage,
        width: u16,
        height: u16,
        threshold: u8,
    }

    impl<'i> LumaSeedMask<'i> {

        /// Fails for images that do not fit a grid.
        pub fn new(image: &'i GrayImage) -> Result<Self> {
            let (width, height) = image.dimensions();
            let too_large = || DistanceFieldError::InvalidArgument {
                width: width as usize, height: height as usize
            };

            Ok(LumaSeedMask {
                image,
                width: u16::try_from(width).map_err(|_| too_large())?,
                height: u16::try_from(height).map_err(|_| too_large())?,
                threshold: DEFAULT_THRESHOLD,
            })
        }

        pub fn with_threshold(self, threshold: u8) -> Self {
            LumaSeedMask { threshold, ..self }
        }
    }

    impl SeedMask for LumaSeedMask<'_> {
        fn width(&self) -> u16 {
            self.width
        }

        fn height(&self) -> u16 {
            self.height
        }

        fn is_seed(&self, x: u16, y: u16) -> bool {
            self.image.get_pixel(x as u32, y as u32).0[0] > self.threshold
        }
    }

}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_are_listed_row_by_row() {
        let bytes = [
            0, 255, 0,
            0, 0, 0,
            128, 0, 200,
        ];

        let mask = ByteSeedMask::new(3, 3, &bytes).unwrap();
        assert_eq!(mask.seeds().collect::<Vec<_>>(), vec![(1, 0), (0, 2), (2, 2)]);
        assert_eq!(mask.seed_count(), 3);
    }

    #[test]
    fn threshold_is_exclusive() {
        let bytes = [0, 127, 128, 255];
        let mask = ByteSeedMask::new(2, 2, &bytes).unwrap();

        assert!(!mask.is_seed(1, 0));
        assert!(mask.is_seed(0, 1));

        let strict = mask.with_threshold(200);
        assert_eq!(strict.seeds().collect::<Vec<_>>(), vec![(1, 1)]);

        assert_eq!(mask.with_threshold(255).seed_count(), 0);
    }

    #[test]
    fn byte_count_must_match_the_size() {
        assert_eq!(
            ByteSeedMask::new(3, 3, &[0; 8]).unwrap_err(),
            DistanceFieldError::MaskLength { expected: 9, actual: 8 }
        );
    }
}
