//! Single-sequence butterfly engine
//!
//! Works on a bit-reversed buffer. Blocks of [`BLOCK_LEN`] elements are carried through all of
//! their levels while they are hot in cache; the remaining wide levels then sweep the whole
//! buffer. Each level computes, for every block of `2h` elements and `i < h`,
//! `t = odd[i] * w_i`, `even[i] + t`, `even[i] - t` (with `conj(w_i)` for the inverse).
use bytemuck::cast_slice_mut;
use num_complex::Complex;

use crate::kernels::common::{butterflies, leaf, leaf_8};
use crate::simd::SimdVector;
use crate::twiddles::{TwiddleTable, Twiddles};
use crate::FftFloat;

/// Largest hand-written leaf.
const LEAF_LEN: usize = 8;

/// Elements transformed through every level before moving on to the next block.
const BLOCK_LEN: usize = 2048;

#[inline(always)]
pub(crate) fn transform<T: FftFloat, V: SimdVector<T>, const INVERSE: bool>(
    data: &mut [Complex<T>],
    twiddles: &Twiddles<T>,
) {
    let n = data.len();
    debug_assert_eq!(n, twiddles.len());
    if n <= LEAF_LEN {
        leaf::<T, INVERSE>(data);
        return;
    }

    let block = n.min(BLOCK_LEN);
    data.chunks_exact_mut(block).for_each(|chunk| {
        chunk
            .chunks_exact_mut(LEAF_LEN)
            .for_each(|leaf| leaf_8::<T, INVERSE>(leaf));

        let mut merged = 2 * LEAF_LEN;
        while merged <= block {
            combine_level::<T, V, INVERSE>(chunk, merged, twiddles.level(merged));
            merged <<= 1;
        }
    });

    let mut merged = 2 * block;
    while merged <= n {
        combine_level::<T, V, INVERSE>(data, merged, twiddles.level(merged));
        merged <<= 1;
    }
}

#[inline(always)]
fn combine_level<T: FftFloat, V: SimdVector<T>, const INVERSE: bool>(
    data: &mut [Complex<T>],
    merged: usize,
    table: &TwiddleTable<T>,
) {
    let (w_re, w_im) = (table.re(), table.im());
    data.chunks_exact_mut(merged).for_each(|block| {
        let (even, odd) = block.split_at_mut(merged / 2);
        butterflies::<T, V, INVERSE>(cast_slice_mut(even), cast_slice_mut(odd), w_re, w_im);
    });
}
