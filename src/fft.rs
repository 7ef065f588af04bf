//! One-dimensional complex transforms: a single sequence, or many columns of a 2D field.
use std::fmt;
use std::sync::Arc;

use num_complex::Complex;

use crate::cpu::KernelTier;
use crate::planner::{Direction, Plan, Planner};
use crate::scramble::{assert_strided_len, bit_reverse_in_place, scramble_rows, scramble_with};
use crate::FftFloat;

/// A transform of one contiguous sequence of fixed power-of-two length.
///
/// Handles are cheap to clone; all handles of one length and precision built by the same
/// [`Planner`] share their twiddle tables.
///
/// Inverse transforms are not normalized.
pub struct Fft<T: FftFloat> {
    plan: Arc<Plan<T>>,
}

impl<T: FftFloat> Clone for Fft<T> {
    fn clone(&self) -> Self {
        Self {
            plan: Arc::clone(&self.plan),
        }
    }
}

impl<T: FftFloat> fmt::Debug for Fft<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fft")
            .field("len", &self.len())
            .field("kernel_tier", &self.kernel_tier())
            .finish()
    }
}

#[allow(clippy::len_without_is_empty)]
impl<T: FftFloat> Fft<T> {
    /// Creates a transform of length `len` from the process-wide planner.
    ///
    /// # Panics
    ///
    /// Panics if `len` is not a power of two in `1..=2^23`.
    pub fn new(len: usize) -> Self {
        Self::with_planner(len, Planner::global())
    }

    /// Creates a transform of length `len` from `planner`.
    ///
    /// # Panics
    ///
    /// Panics if `len` is not a power of two in `1..=2^23`.
    pub fn with_planner(len: usize, planner: &Planner) -> Self {
        Self {
            plan: planner.plan(len),
        }
    }

    pub fn len(&self) -> usize {
        self.plan.len()
    }

    /// The kernel variant this transform runs on.
    pub fn kernel_tier(&self) -> KernelTier {
        self.plan.kernel_tier()
    }

    /// Transforms `input` into `out`.
    ///
    /// # Panics
    ///
    /// Panics if `input.len()` or `out.len()` differs from [`Self::len`].
    pub fn transform(&self, out: &mut [Complex<T>], input: &[Complex<T>], direction: Direction) {
        let n = self.len();
        assert_eq!(input.len(), n, "input length does not match the transform");
        assert_eq!(out.len(), n, "output length does not match the transform");
        scramble_with(out, 1, n, |i| input[i]);
        self.plan.rows(out, direction);
    }

    /// Transforms `data` in place, where `data` is already in bit-reversed order.
    ///
    /// # Panics
    ///
    /// Panics if `data.len()` differs from [`Self::len`].
    pub fn transform_no_scramble(&self, data: &mut [Complex<T>], direction: Direction) {
        self.plan.rows(data, direction);
    }

    /// Transforms `data` in place, in natural order.
    ///
    /// # Panics
    ///
    /// Panics if `data.len()` differs from [`Self::len`].
    pub fn transform_in_place(&self, data: &mut [Complex<T>], direction: Direction) {
        assert_eq!(data.len(), self.len(), "data length does not match the transform");
        bit_reverse_in_place(data);
        self.plan.rows(data, direction);
    }

    /// Forward transform of real samples, producing the full conjugate-symmetric spectrum.
    ///
    /// # Panics
    ///
    /// Panics if `input.len()` or `out.len()` differs from [`Self::len`].
    pub fn transform_real(&self, out: &mut [Complex<T>], input: &[T]) {
        let n = self.len();
        assert_eq!(input.len(), n, "input length does not match the transform");
        assert_eq!(out.len(), n, "output length does not match the transform");
        scramble_with(out, 1, n, |i| Complex::new(input[i], T::zero()));
        self.plan.rows(out, Direction::Forward);
    }

    /// Forward transform of `in1 + i * in2`.
    ///
    /// The two spectra are interleaved in `out`; [`separate_2x_real`](crate::separate_2x_real)
    /// recovers them.
    ///
    /// # Panics
    ///
    /// Panics if any buffer length differs from [`Self::len`].
    pub fn transform_interleave(&self, out: &mut [Complex<T>], in1: &[T], in2: &[T]) {
        let n = self.len();
        assert_eq!(in1.len(), n, "first input length does not match the transform");
        assert_eq!(in2.len(), n, "second input length does not match the transform");
        assert_eq!(out.len(), n, "output length does not match the transform");
        scramble_with(out, 1, n, |i| Complex::new(in1[i], in2[i]));
        self.plan.rows(out, Direction::Forward);
    }
}

/// Transforms of many columns at once, each column `len` elements tall.
///
/// Rows are `stride` elements apart and only the first `cols` elements of each row are touched.
pub struct FftVertical<T: FftFloat> {
    plan: Arc<Plan<T>>,
}

impl<T: FftFloat> Clone for FftVertical<T> {
    fn clone(&self) -> Self {
        Self {
            plan: Arc::clone(&self.plan),
        }
    }
}

impl<T: FftFloat> fmt::Debug for FftVertical<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FftVertical")
            .field("len", &self.len())
            .field("kernel_tier", &self.kernel_tier())
            .finish()
    }
}

#[allow(clippy::len_without_is_empty)]
impl<T: FftFloat> FftVertical<T> {
    /// Creates a column transform for `len` rows from the process-wide planner.
    ///
    /// # Panics
    ///
    /// Panics if `len` is not a power of two in `1..=2^23`.
    pub fn new(len: usize) -> Self {
        Self::with_planner(len, Planner::global())
    }

    /// Creates a column transform for `len` rows from `planner`.
    ///
    /// # Panics
    ///
    /// Panics if `len` is not a power of two in `1..=2^23`.
    pub fn with_planner(len: usize, planner: &Planner) -> Self {
        Self {
            plan: planner.plan(len),
        }
    }

    /// Number of rows, i.e. the length of each column transform.
    pub fn len(&self) -> usize {
        self.plan.len()
    }

    pub fn kernel_tier(&self) -> KernelTier {
        self.plan.kernel_tier()
    }

    /// Transforms the first `cols` columns of `input` into `out`.
    ///
    /// # Panics
    ///
    /// Panics if a stride is smaller than `cols` or a buffer cannot hold [`Self::len`] rows.
    pub fn transform(
        &self,
        out: &mut [Complex<T>],
        out_stride: usize,
        input: &[Complex<T>],
        in_stride: usize,
        cols: usize,
        direction: Direction,
    ) {
        scramble_rows(out, out_stride, input, in_stride, self.len(), cols);
        self.plan.columns(out, out_stride, cols, direction);
    }

    /// Transforms the first `cols` columns of `data` in place; rows are already in bit-reversed
    /// order.
    ///
    /// # Panics
    ///
    /// Panics if `stride` is smaller than `cols` or `data` cannot hold [`Self::len`] rows.
    pub fn transform_no_scramble(
        &self,
        data: &mut [Complex<T>],
        stride: usize,
        cols: usize,
        direction: Direction,
    ) {
        assert_strided_len(data.len(), self.len(), stride, cols);
        self.plan.columns(data, stride, cols, direction);
    }
}
