//! Power-of-two FFTs for complex and real data, in one and two dimensions.
//!
//! Kernels are compiled for several instruction-set tiers and the widest tier the processor
//! supports is picked at run time. Plans are cached per length and precision and shared between
//! all handles that ask for them.
//!
//! ```
//! use num_complex::Complex;
//! use pow2fft::{Direction, Fft};
//!
//! let fft = Fft::<f64>::new(8);
//! let mut impulse = vec![Complex::new(0.0, 0.0); 8];
//! impulse[0] = Complex::new(1.0, 0.0);
//!
//! let mut spectrum = vec![Complex::new(0.0, 0.0); 8];
//! fft.transform(&mut spectrum, &impulse, Direction::Forward);
//! assert!(spectrum.iter().all(|z| (z.re - 1.0).abs() < 1e-12 && z.im.abs() < 1e-12));
//! ```
use std::fmt::{Debug, Display};

use bytemuck::Pod;
use num_complex::Complex;
use num_traits::Float;

pub use crate::cpu::{Capabilities, KernelTier};
pub use crate::fft::{Fft, FftVertical};
pub use crate::fft2d::{Fft2d, Fft2dReal};
pub use crate::options::Options;
pub use crate::planner::{Direction, Planner, Precision};
pub use crate::real::{separate_2x_real, separate_2x_real_in_place, RealFft};
pub use crate::scramble::{bit_reverse_in_place, scramble, scramble_rows};

pub mod cpu;
mod fft;
mod fft2d;
mod kernels;
pub mod options;
pub mod planner;
mod real;
pub mod scramble;
mod simd;
mod twiddles;

/// Base-2 logarithm of the longest supported transform.
pub const MAX_LOG2_LEN: u32 = 23;

/// Longest supported transform, in elements.
pub const MAX_LEN: usize = 1 << MAX_LOG2_LEN;

/// Scalar types the transforms are implemented for: `f32` and `f64`.
///
/// This trait is sealed.
pub trait FftFloat:
    Float + Pod + Default + Debug + Display + Send + Sync + 'static + sealed::Sealed
{
    const PRECISION: Precision;
}

mod sealed {
    use num_traits::Float;

    use crate::cpu::KernelTier;
    use crate::kernels::Kernel;
    use crate::simd::SimdVector;

    /// Every precision is also the one-lane vector the kernels use for remainders.
    pub trait Sealed: Float + SimdVector<Self> {
        /// Rounds an `f64` to this precision.
        fn cast_f64(value: f64) -> Self;

        /// The kernel of `tier` for this precision.
        fn kernel(tier: KernelTier) -> Kernel<Self>;
    }

    impl Sealed for f64 {
        fn cast_f64(value: f64) -> Self {
            value
        }

        fn kernel(tier: KernelTier) -> Kernel<Self> {
            crate::kernels::kernel_f64(tier)
        }
    }

    impl Sealed for f32 {
        fn cast_f64(value: f64) -> Self {
            value as f32
        }

        fn kernel(tier: KernelTier) -> Kernel<Self> {
            crate::kernels::kernel_f32(tier)
        }
    }
}

impl FftFloat for f64 {
    const PRECISION: Precision = Precision::Double;
}

impl FftFloat for f32 {
    const PRECISION: Precision = Precision::Single;
}

/// Checks a transform length against the supported sizes.
#[track_caller]
pub(crate) fn assert_valid_len(len: usize) {
    assert!(
        len.is_power_of_two(),
        "transform length {len} is not a power of two"
    );
    assert!(
        len <= MAX_LEN,
        "transform length {len} is too large, lengths are at most 2^{MAX_LOG2_LEN}"
    );
}

/// Transforms `data` in place with the process-wide planner.
///
/// The inverse is not normalized: a forward transform followed by an inverse one scales the input
/// by `data.len()`.
///
/// # Panics
///
/// Panics if `data.len()` is not a power of two in `1..=2^23`.
pub fn fft_in_place<T: FftFloat>(data: &mut [Complex<T>], direction: Direction) {
    Fft::<T>::new(data.len()).transform_in_place(data, direction);
}
