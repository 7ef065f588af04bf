//! Column ("vertical") butterfly engine
//!
//! Transforms `cols` independent columns of an `n`-row field at once. Rows are `stride` elements
//! apart and already in bit-reversed order. Every butterfly of the single-sequence algorithm
//! becomes an operation between two whole rows, so vectors run along the row and the twiddle of
//! a row pair is a broadcast constant.
use bytemuck::cast_slice_mut;
use num_complex::Complex;

use crate::kernels::common::{butterflies_broadcast, pair_rows, quad_rows};
use crate::simd::SimdVector;
use crate::twiddles::Twiddles;
use crate::FftFloat;

#[inline(always)]
pub(crate) fn transform<T: FftFloat, V: SimdVector<T>, const INVERSE: bool>(
    data: &mut [Complex<T>],
    n: usize,
    stride: usize,
    cols: usize,
    twiddles: &Twiddles<T>,
) {
    debug_assert_eq!(n, twiddles.len());
    match n {
        1 => {}
        2 => {
            let (top, bottom) = data.split_at_mut(stride);
            pair_rows::<T, V>(
                cast_slice_mut(&mut top[..cols]),
                cast_slice_mut(&mut bottom[..cols]),
            );
        }
        _ => {
            for group in (0..n).step_by(4) {
                quad_rows::<T, V, INVERSE>(four_rows(data, group * stride, stride, cols));
            }

            let mut merged = 8;
            while merged <= n {
                let table = twiddles.level(merged);
                let half = merged / 2;
                for block in (0..n).step_by(merged) {
                    for i in 0..half {
                        let top = (block + i) * stride;
                        let (head, tail) = data.split_at_mut(top + half * stride);
                        butterflies_broadcast::<T, V, INVERSE>(
                            cast_slice_mut(&mut head[top..top + cols]),
                            cast_slice_mut(&mut tail[..cols]),
                            table.re()[i],
                            table.im()[i],
                        );
                    }
                }
                merged <<= 1;
            }
        }
    }
}

/// Four consecutive rows starting at `first`, each trimmed to `cols` elements.
#[inline(always)]
fn four_rows<T: FftFloat>(
    data: &mut [Complex<T>],
    first: usize,
    stride: usize,
    cols: usize,
) -> [&mut [T]; 4] {
    let rest = &mut data[first..];
    let (r0, rest) = rest.split_at_mut(stride);
    let (r1, rest) = rest.split_at_mut(stride);
    let (r2, rest) = rest.split_at_mut(stride);
    [
        cast_slice_mut(&mut r0[..cols]),
        cast_slice_mut(&mut r1[..cols]),
        cast_slice_mut(&mut r2[..cols]),
        cast_slice_mut(&mut rest[..cols]),
    ]
}
