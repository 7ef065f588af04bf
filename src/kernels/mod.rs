//! FFT butterfly kernels
//!
//! The row and column engines are written once against [`SimdVector`](crate::simd::SimdVector).
//! This module instantiates them once per [`KernelTier`] and precision, each instantiation
//! compiled for the tier's target features through `multiversion`, and hands out the resulting
//! function pointers as a [`Kernel`].
//!
//! ## Organization
//!
//! - `common`: butterflies and leaves shared by both engines
//! - `row`: single-sequence engine
//! - `column`: strided multi-column engine

use num_complex::Complex;
use wide::{f32x16, f32x4, f32x8, f64x2, f64x4, f64x8};

use crate::cpu::KernelTier;
use crate::simd::Unfused;
use crate::twiddles::Twiddles;
use crate::Direction;

pub(crate) mod column;
pub(crate) mod common;
pub(crate) mod row;

type RowFn<T> = fn(&mut [Complex<T>], &Twiddles<T>);
type ColumnFn<T> = fn(&mut [Complex<T>], usize, usize, usize, &Twiddles<T>);

/// Entry points of one kernel tier for one precision.
pub struct Kernel<T> {
    tier: KernelTier,
    rows: [RowFn<T>; 2],
    columns: [ColumnFn<T>; 2],
}

impl<T> Clone for Kernel<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Kernel<T> {}

impl<T> Kernel<T> {
    pub(crate) fn tier(&self) -> KernelTier {
        self.tier
    }

    /// Transforms a bit-reversed sequence whose length matches `twiddles`.
    #[inline]
    pub(crate) fn rows(
        &self,
        data: &mut [Complex<T>],
        twiddles: &Twiddles<T>,
        direction: Direction,
    ) {
        self.rows[direction.index()](data, twiddles)
    }

    /// Transforms `cols` columns of a field of `twiddles.len()` bit-reversed rows, `stride` apart.
    #[inline]
    pub(crate) fn columns(
        &self,
        data: &mut [Complex<T>],
        stride: usize,
        cols: usize,
        twiddles: &Twiddles<T>,
        direction: Direction,
    ) {
        self.columns[direction.index()](data, twiddles.len(), stride, cols, twiddles)
    }
}

macro_rules! impl_tier {
    ($module:ident, $precision:ty, $vector:ty, $tier:expr, targets($($target:literal),+ $(,)?)) => {
        mod $module {
            use super::*;

            #[multiversion::multiversion(targets($($target),+))]
            fn rows_forward(data: &mut [Complex<$precision>], twiddles: &Twiddles<$precision>) {
                row::transform::<$precision, $vector, false>(data, twiddles)
            }

            #[multiversion::multiversion(targets($($target),+))]
            fn rows_inverse(data: &mut [Complex<$precision>], twiddles: &Twiddles<$precision>) {
                row::transform::<$precision, $vector, true>(data, twiddles)
            }

            #[multiversion::multiversion(targets($($target),+))]
            fn columns_forward(
                data: &mut [Complex<$precision>],
                n: usize,
                stride: usize,
                cols: usize,
                twiddles: &Twiddles<$precision>,
            ) {
                column::transform::<$precision, $vector, false>(data, n, stride, cols, twiddles)
            }

            #[multiversion::multiversion(targets($($target),+))]
            fn columns_inverse(
                data: &mut [Complex<$precision>],
                n: usize,
                stride: usize,
                cols: usize,
                twiddles: &Twiddles<$precision>,
            ) {
                column::transform::<$precision, $vector, true>(data, n, stride, cols, twiddles)
            }

            pub(super) fn kernel() -> Kernel<$precision> {
                Kernel {
                    tier: $tier,
                    rows: [rows_forward, rows_inverse],
                    columns: [columns_forward, columns_inverse],
                }
            }
        }
    };
}

macro_rules! impl_scalar_tier {
    ($module:ident, $precision:ty) => {
        mod $module {
            use super::*;

            fn rows_forward(data: &mut [Complex<$precision>], twiddles: &Twiddles<$precision>) {
                row::transform::<$precision, $precision, false>(data, twiddles)
            }

            fn rows_inverse(data: &mut [Complex<$precision>], twiddles: &Twiddles<$precision>) {
                row::transform::<$precision, $precision, true>(data, twiddles)
            }

            fn columns_forward(
                data: &mut [Complex<$precision>],
                n: usize,
                stride: usize,
                cols: usize,
                twiddles: &Twiddles<$precision>,
            ) {
                column::transform::<$precision, $precision, false>(data, n, stride, cols, twiddles)
            }

            fn columns_inverse(
                data: &mut [Complex<$precision>],
                n: usize,
                stride: usize,
                cols: usize,
                twiddles: &Twiddles<$precision>,
            ) {
                column::transform::<$precision, $precision, true>(data, n, stride, cols, twiddles)
            }

            pub(super) fn kernel() -> Kernel<$precision> {
                Kernel {
                    tier: KernelTier::Scalar,
                    rows: [rows_forward, rows_inverse],
                    columns: [columns_forward, columns_inverse],
                }
            }
        }
    };
}

impl_tier!(
    avx512_f64,
    f64,
    f64x8,
    KernelTier::Avx512,
    targets(
        "x86_64+avx512f+avx512bw+avx512cd+avx512dq+avx512vl",
        "x86+avx512f+avx512bw+avx512cd+avx512dq+avx512vl",
    )
);
impl_tier!(
    avx_fma_f64,
    f64,
    f64x4,
    KernelTier::AvxFma,
    targets("x86_64+avx+fma", "x86+avx+fma")
);
impl_tier!(
    avx_f64,
    f64,
    Unfused<f64x4>,
    KernelTier::Avx,
    targets("x86_64+avx", "x86+avx")
);
impl_tier!(
    sse2_f64,
    f64,
    Unfused<f64x2>,
    KernelTier::Sse2,
    targets("x86_64+sse2", "x86+sse2")
);
impl_tier!(
    neon_f64,
    f64,
    f64x2,
    KernelTier::Neon,
    targets("aarch64+neon")
);
impl_scalar_tier!(scalar_f64, f64);

impl_tier!(
    avx512_f32,
    f32,
    f32x16,
    KernelTier::Avx512,
    targets(
        "x86_64+avx512f+avx512bw+avx512cd+avx512dq+avx512vl",
        "x86+avx512f+avx512bw+avx512cd+avx512dq+avx512vl",
    )
);
impl_tier!(
    avx_fma_f32,
    f32,
    f32x8,
    KernelTier::AvxFma,
    targets("x86_64+avx+fma", "x86+avx+fma")
);
impl_tier!(
    avx_f32,
    f32,
    Unfused<f32x8>,
    KernelTier::Avx,
    targets("x86_64+avx", "x86+avx")
);
impl_tier!(
    sse2_f32,
    f32,
    Unfused<f32x4>,
    KernelTier::Sse2,
    targets("x86_64+sse2", "x86+sse2")
);
impl_tier!(
    neon_f32,
    f32,
    f32x4,
    KernelTier::Neon,
    targets("aarch64+neon")
);
impl_scalar_tier!(scalar_f32, f32);

pub(crate) fn kernel_f64(tier: KernelTier) -> Kernel<f64> {
    match tier {
        KernelTier::Avx512 => avx512_f64::kernel(),
        KernelTier::AvxFma => avx_fma_f64::kernel(),
        KernelTier::Avx => avx_f64::kernel(),
        KernelTier::Sse2 => sse2_f64::kernel(),
        KernelTier::Neon => neon_f64::kernel(),
        KernelTier::Scalar => scalar_f64::kernel(),
    }
}

pub(crate) fn kernel_f32(tier: KernelTier) -> Kernel<f32> {
    match tier {
        KernelTier::Avx512 => avx512_f32::kernel(),
        KernelTier::AvxFma => avx_fma_f32::kernel(),
        KernelTier::Avx => avx_f32::kernel(),
        KernelTier::Sse2 => sse2_f32::kernel(),
        KernelTier::Neon => neon_f32::kernel(),
        KernelTier::Scalar => scalar_f32::kernel(),
    }
}

#[cfg(test)]
mod tests {
    use utilities::{assert_complex_closeness, fft_epsilon_f32, fft_epsilon_f64, gen_random_signal};

    use super::*;
    use crate::scramble::bit_reverse_in_place;

    const ALL_TIERS: [KernelTier; 6] = [
        KernelTier::Scalar,
        KernelTier::Neon,
        KernelTier::Sse2,
        KernelTier::Avx,
        KernelTier::AvxFma,
        KernelTier::Avx512,
    ];

    #[test]
    fn kernels_report_their_tier() {
        for tier in ALL_TIERS {
            assert_eq!(kernel_f64(tier).tier(), tier);
            assert_eq!(kernel_f32(tier).tier(), tier);
        }
    }

    /// Every clone falls back to portable code on processors without the target features, so
    /// each tier can be checked on any machine.
    macro_rules! test_every_tier {
        ($test_name:ident, $precision:ty, $kernel:ident, $epsilon:expr) => {
            #[test]
            fn $test_name() {
                let epsilon = $epsilon;
                let directions = [Direction::Forward, Direction::Inverse];

                for n in [1, 2, 4, 8, 64, 1 << 12] {
                    let twiddles = Twiddles::<$precision>::new(n);
                    let mut signal = gen_random_signal::<$precision>(n);
                    bit_reverse_in_place(&mut signal);

                    for direction in directions {
                        let mut expected = signal.clone();
                        $kernel(KernelTier::Scalar).rows(&mut expected, &twiddles, direction);
                        for tier in ALL_TIERS {
                            let mut data = signal.clone();
                            $kernel(tier).rows(&mut data, &twiddles, direction);
                            assert_complex_closeness(&data, &expected, epsilon(n));
                        }
                    }
                }

                // 37 columns leave a remainder for every vector width
                let (cols, stride) = (37, 40);
                for rows in [1, 2, 4, 8, 64] {
                    let twiddles = Twiddles::<$precision>::new(rows);
                    let field = gen_random_signal::<$precision>((rows - 1) * stride + cols);

                    for direction in directions {
                        let mut expected = field.clone();
                        $kernel(KernelTier::Scalar).columns(
                            &mut expected,
                            stride,
                            cols,
                            &twiddles,
                            direction,
                        );
                        for tier in ALL_TIERS {
                            let mut data = field.clone();
                            $kernel(tier).columns(&mut data, stride, cols, &twiddles, direction);
                            assert_complex_closeness(&data, &expected, 4.0 * epsilon(rows));
                        }
                    }
                }
            }
        };
    }

    test_every_tier!(every_tier_agrees_with_scalar_f64, f64, kernel_f64, fft_epsilon_f64);
    test_every_tier!(
        every_tier_agrees_with_scalar_f32,
        f32,
        kernel_f32,
        |n: usize| fft_epsilon_f32(n) * (n as f32).sqrt()
    );
}
