//! Precomputed twiddle factors
//!
//! A butterfly level that merges two halves of length `h` uses the `h` coefficients
//! `w_k = e^{-2πik/(2h)} = (cos(πk/h), -sin(πk/h))`. Inverse transforms conjugate them on the
//! fly.
//! Real and imaginary parts live in separate cache-line aligned arrays so the kernels can load
//! them straight into vector lanes.
use aligned_vec::{avec, ABox};

use crate::FftFloat;

/// Smallest merged length that reads a table. Shorter levels are hard-coded leaves.
pub(crate) const MIN_TABLE_LEN: usize = 8;

/// The coefficients for one butterfly level.
pub(crate) struct TwiddleTable<T> {
    re: ABox<[T]>,
    im: ABox<[T]>,
}

impl<T: FftFloat> TwiddleTable<T> {
    /// Builds the table for merging two halves of length `half`.
    ///
    /// Every entry is evaluated directly in `f64` and rounded once, so no error accumulates along
    /// the table.
    pub(crate) fn new(half: usize) -> Self {
        let mut re = avec![T::zero(); half];
        let mut im = avec![T::zero(); half];

        let step = -std::f64::consts::PI / half as f64;
        re.iter_mut()
            .zip(im.iter_mut())
            .enumerate()
            .for_each(|(k, (w_re, w_im))| {
                let (sin, cos) = (step * k as f64).sin_cos();
                *w_re = T::cast_f64(cos);
                *w_im = T::cast_f64(sin);
            });

        Self {
            re: re.into_boxed_slice(),
            im: im.into_boxed_slice(),
        }
    }
}

impl<T> TwiddleTable<T> {
    /// Number of coefficients, i.e. the half length of the level.
    pub(crate) fn len(&self) -> usize {
        self.re.len()
    }

    pub(crate) fn re(&self) -> &[T] {
        &self.re
    }

    pub(crate) fn im(&self) -> &[T] {
        &self.im
    }
}

/// One [`TwiddleTable`] per butterfly level of a transform of length `n`, for every merged
/// length from [`MIN_TABLE_LEN`] up to `n`.
pub(crate) struct Twiddles<T> {
    len: usize,
    levels: Vec<TwiddleTable<T>>,
}

impl<T: FftFloat> Twiddles<T> {
    pub(crate) fn new(len: usize) -> Self {
        debug_assert!(len.is_power_of_two());
        let mut levels = Vec::new();
        let mut merged = MIN_TABLE_LEN;
        while merged <= len {
            levels.push(TwiddleTable::new(merged / 2));
            merged <<= 1;
        }
        Self { len, levels }
    }
}

impl<T> Twiddles<T> {
    /// Transform length the tables were built for.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// The table of the level producing blocks of `merged` elements.
    #[inline(always)]
    pub(crate) fn level(&self, merged: usize) -> &TwiddleTable<T> {
        debug_assert!(merged >= MIN_TABLE_LEN && merged <= self.len);
        let index = (merged.trailing_zeros() - MIN_TABLE_LEN.trailing_zeros()) as usize;
        &self.levels[index]
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_1_SQRT_2;

    use utilities::assert_float_closeness;

    use super::*;

    #[test]
    fn level_of_eight() {
        let table = TwiddleTable::<f64>::new(4);
        let expected = [
            (1.0, 0.0),
            (FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
            (0.0, -1.0),
            (-FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
        ];
        assert_eq!(table.len(), 4);
        for (k, (w_re, w_im)) in expected.into_iter().enumerate() {
            assert_float_closeness(table.re()[k], w_re, 1e-15);
            assert_float_closeness(table.im()[k], w_im, 1e-15);
        }
    }

    #[test]
    fn single_precision_matches_double() {
        let single = TwiddleTable::<f32>::new(512);
        let double = TwiddleTable::<f64>::new(512);
        for k in 0..512 {
            assert_float_closeness(single.re()[k] as f64, double.re()[k], 1e-7);
            assert_float_closeness(single.im()[k] as f64, double.im()[k], 1e-7);
        }
    }

    #[test]
    fn storage_is_aligned() {
        let table = TwiddleTable::<f32>::new(64);
        assert_eq!(table.re().as_ptr() as usize % 32, 0);
        assert_eq!(table.im().as_ptr() as usize % 32, 0);
    }

    #[test]
    fn levels_cover_every_table_length() {
        assert!(Twiddles::<f64>::new(4).levels.is_empty());

        let twiddles = Twiddles::<f64>::new(1 << 10);
        assert_eq!(twiddles.levels.len(), 8);
        let mut merged = MIN_TABLE_LEN;
        while merged <= 1 << 10 {
            assert_eq!(twiddles.level(merged).len(), merged / 2);
            merged <<= 1;
        }
    }

    #[test]
    fn unit_magnitude() {
        let table = TwiddleTable::<f64>::new(1 << 12);
        for (w_re, w_im) in table.re().iter().zip(table.im().iter()) {
            assert_float_closeness(w_re.hypot(*w_im), 1.0, 1e-14);
        }
    }
}
