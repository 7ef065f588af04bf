//! Two-dimensional transforms
//!
//! Rows are permuted into bit-reversed order while each row is transformed, so the field never
//! goes through a separate 2D bit reversal; one column pass then finishes the transform.
use std::fmt;
use std::sync::Arc;

use num_complex::Complex;

use crate::cpu::KernelTier;
use crate::planner::{Direction, Plan, Planner};
use crate::real::separate;
use crate::scramble::{assert_strided_len, scramble_with};
use crate::FftFloat;

/// Complex 2D transform of a `rows x cols` field stored row by row.
///
/// Strides are given in elements between the starts of consecutive rows.
pub struct Fft2d<T: FftFloat> {
    horizontal: Arc<Plan<T>>,
    vertical: Arc<Plan<T>>,
}

impl<T: FftFloat> Clone for Fft2d<T> {
    fn clone(&self) -> Self {
        Self {
            horizontal: Arc::clone(&self.horizontal),
            vertical: Arc::clone(&self.vertical),
        }
    }
}

impl<T: FftFloat> fmt::Debug for Fft2d<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fft2d")
            .field("rows", &self.rows())
            .field("cols", &self.cols())
            .field("kernel_tier", &self.kernel_tier())
            .finish()
    }
}

impl<T: FftFloat> Fft2d<T> {
    /// Creates a transform of `rows x cols` fields from the process-wide planner.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is not a power of two in `1..=2^23`.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::with_planner(rows, cols, Planner::global())
    }

    /// Creates a transform of `rows x cols` fields from `planner`.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is not a power of two in `1..=2^23`.
    pub fn with_planner(rows: usize, cols: usize, planner: &Planner) -> Self {
        Self {
            horizontal: planner.plan(cols),
            vertical: planner.plan(rows),
        }
    }

    pub fn rows(&self) -> usize {
        self.vertical.len()
    }

    pub fn cols(&self) -> usize {
        self.horizontal.len()
    }

    pub fn kernel_tier(&self) -> KernelTier {
        self.horizontal.kernel_tier()
    }

    /// Transforms `input` into `out`. Elements past `cols` in each row are left untouched.
    ///
    /// # Panics
    ///
    /// Panics if a stride is smaller than [`Self::cols`] or a buffer cannot hold [`Self::rows`]
    /// rows.
    pub fn transform(
        &self,
        out: &mut [Complex<T>],
        out_stride: usize,
        input: &[Complex<T>],
        in_stride: usize,
        direction: Direction,
    ) {
        let (rows, cols) = (self.rows(), self.cols());
        assert_strided_len(out.len(), rows, out_stride, cols);
        assert_strided_len(input.len(), rows, in_stride, cols);

        scramble_row_transform(
            &self.horizontal,
            out,
            out_stride,
            rows,
            &|out_row: &mut [Complex<T>], row: usize| {
                let src = &input[row * in_stride..];
                scramble_with(out_row, 1, cols, |i| src[i]);
            },
            direction,
        );
        self.vertical.columns(out, out_stride, cols, direction);
    }
}

/// Places the transform of input row `r` at output row `rev(r)`, rows `out_stride` apart.
///
/// `load` fills a bit-reversed output row from the input row with the given index.
fn scramble_row_transform<T: FftFloat>(
    horizontal: &Plan<T>,
    out: &mut [Complex<T>],
    out_stride: usize,
    rows: usize,
    load: &impl Fn(&mut [Complex<T>], usize),
    direction: Direction,
) {
    scramble_row_recursive(horizontal, out, out_stride, rows, 0, load, direction);
}

fn scramble_row_recursive<T: FftFloat>(
    horizontal: &Plan<T>,
    out: &mut [Complex<T>],
    out_stride: usize,
    rows: usize,
    first_row: usize,
    load: &impl Fn(&mut [Complex<T>], usize),
    direction: Direction,
) {
    if rows == 1 {
        let row = &mut out[..horizontal.len()];
        load(row, first_row);
        horizontal.rows(row, direction);
        return;
    }
    let half = rows / 2;
    scramble_row_recursive(
        horizontal,
        out,
        2 * out_stride,
        half,
        first_row,
        load,
        direction,
    );
    scramble_row_recursive(
        horizontal,
        &mut out[out_stride..],
        2 * out_stride,
        half,
        first_row + half,
        load,
        direction,
    );
}

/// Forward 2D transform of real `rows x cols` fields.
///
/// Input strides are in real elements, output strides in complex elements.
pub struct Fft2dReal<T: FftFloat> {
    horizontal: Arc<Plan<T>>,
    vertical: Arc<Plan<T>>,
}

impl<T: FftFloat> Clone for Fft2dReal<T> {
    fn clone(&self) -> Self {
        Self {
            horizontal: Arc::clone(&self.horizontal),
            vertical: Arc::clone(&self.vertical),
        }
    }
}

impl<T: FftFloat> fmt::Debug for Fft2dReal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fft2dReal")
            .field("rows", &self.rows())
            .field("cols", &self.cols())
            .field("kernel_tier", &self.kernel_tier())
            .finish()
    }
}

impl<T: FftFloat> Fft2dReal<T> {
    /// Creates a transform of `rows x cols` real fields from the process-wide planner.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is not a power of two in `1..=2^23`.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::with_planner(rows, cols, Planner::global())
    }

    /// Creates a transform of `rows x cols` real fields from `planner`.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is not a power of two in `1..=2^23`.
    pub fn with_planner(rows: usize, cols: usize, planner: &Planner) -> Self {
        Self {
            horizontal: planner.plan(cols),
            vertical: planner.plan(rows),
        }
    }

    pub fn rows(&self) -> usize {
        self.vertical.len()
    }

    pub fn cols(&self) -> usize {
        self.horizontal.len()
    }

    pub fn kernel_tier(&self) -> KernelTier {
        self.horizontal.kernel_tier()
    }

    /// Computes the full complex spectrum of the real field `input`.
    ///
    /// Pairs of rows share one complex row transform, and only the first `cols / 2 + 1` columns
    /// go through the column transform; the others follow from
    /// `F[k][j] = conj(F[(rows - k) % rows][cols - j])`.
    ///
    /// # Panics
    ///
    /// Panics if a stride is smaller than [`Self::cols`] or a buffer cannot hold [`Self::rows`]
    /// rows.
    pub fn forward(
        &self,
        out: &mut [Complex<T>],
        out_stride: usize,
        input: &[T],
        in_stride: usize,
    ) {
        let (rows, cols) = (self.rows(), self.cols());
        assert_strided_len(out.len(), rows, out_stride, cols);
        assert_strided_len(input.len(), rows, in_stride, cols);

        self.scramble_row_forward(out, out_stride, input, in_stride, rows);

        let vcols = (cols / 2 + 1).min(cols);
        self.vertical
            .columns(out, out_stride, vcols, Direction::Forward);

        if vcols != cols {
            for i in 0..rows {
                let k = if i == 0 { 0 } else { rows - i };
                for j in (vcols..cols).rev() {
                    out[k * out_stride + j] = out[i * out_stride + cols - j].conj();
                }
            }
        }
    }

    fn scramble_row_forward(
        &self,
        out: &mut [Complex<T>],
        out_stride: usize,
        input: &[T],
        in_stride: usize,
        rows: usize,
    ) {
        let cols = self.cols();
        match rows {
            1 => {
                let row = &mut out[..cols];
                scramble_with(row, 1, cols, |i| Complex::new(input[i], T::zero()));
                self.horizontal.rows(row, Direction::Forward);
            }
            2 => {
                let second = &input[in_stride..];
                let (first_out, second_out) = out.split_at_mut(out_stride);
                let row = &mut first_out[..cols];
                scramble_with(row, 1, cols, |i| Complex::new(input[i], second[i]));
                self.horizontal.rows(row, Direction::Forward);
                separate(row, &mut second_out[..cols]);
            }
            _ => {
                let half = rows / 2;
                self.scramble_row_forward(out, 2 * out_stride, input, in_stride, half);
                self.scramble_row_forward(
                    &mut out[out_stride..],
                    2 * out_stride,
                    &input[half * in_stride..],
                    in_stride,
                    half,
                );
            }
        }
    }

    /// Forward 2D transform of `in1 + i * in2`.
    ///
    /// The result is the complex spectrum of the packed field; the two real spectra are not
    /// separated.
    ///
    /// # Panics
    ///
    /// Panics if a stride is smaller than [`Self::cols`] or a buffer cannot hold [`Self::rows`]
    /// rows.
    pub fn forward_2x(
        &self,
        out: &mut [Complex<T>],
        out_stride: usize,
        in1: &[T],
        in_stride1: usize,
        in2: &[T],
        in_stride2: usize,
    ) {
        let (rows, cols) = (self.rows(), self.cols());
        assert_strided_len(out.len(), rows, out_stride, cols);
        assert_strided_len(in1.len(), rows, in_stride1, cols);
        assert_strided_len(in2.len(), rows, in_stride2, cols);

        scramble_row_transform(
            &self.horizontal,
            out,
            out_stride,
            rows,
            &|out_row: &mut [Complex<T>], row: usize| {
                let src1 = &in1[row * in_stride1..];
                let src2 = &in2[row * in_stride2..];
                scramble_with(out_row, 1, cols, |i| Complex::new(src1[i], src2[i]));
            },
            Direction::Forward,
        );
        self.vertical
            .columns(out, out_stride, cols, Direction::Forward);
    }
}
