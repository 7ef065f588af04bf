//! Bit-reversal permutations
//!
//! The butterfly engines expect their input in bit-reversed order. These routines produce that
//! order either while copying out of a caller buffer (`scramble`, `scramble_rows`) or in place.
use crate::assert_valid_len;

/// Copies `input[i]` to `out[rev(i) * stride]`, where `rev` reverses the `log2(input.len())`
/// low bits of `i`.
///
/// # Panics
///
/// Panics if `input.len()` is not a supported power of two, if `stride` is zero, or if `out` is
/// shorter than `(input.len() - 1) * stride + 1`.
pub fn scramble<E: Copy>(out: &mut [E], input: &[E], stride: usize) {
    scramble_with(out, stride, input.len(), |i| input[i]);
}

/// Writes `source(i)` to `out[rev(i) * stride]` for every `i < n`.
///
/// Lets callers convert while permuting, e.g. real samples into complex values.
pub(crate) fn scramble_with<E: Copy>(
    out: &mut [E],
    stride: usize,
    n: usize,
    source: impl Fn(usize) -> E,
) {
    assert_valid_len(n);
    assert!(stride > 0, "stride must be non-zero");
    assert!(
        out.len() > (n - 1) * stride,
        "output holds {} elements, {} needed for {n} values at stride {stride}",
        out.len(),
        (n - 1) * stride + 1
    );
    scramble_recursive(out, stride, n, 0, &source);
}

fn scramble_recursive<E: Copy>(
    out: &mut [E],
    stride: usize,
    n: usize,
    first: usize,
    source: &impl Fn(usize) -> E,
) {
    if n == 1 {
        out[0] = source(first);
        return;
    }
    let half = n / 2;
    // even input indices land in even output slots
    scramble_recursive(out, stride * 2, half, first, source);
    scramble_recursive(&mut out[stride..], stride * 2, half, first + half, source);
}

/// Moves whole rows: input row `r` (of `cols` elements, rows `in_stride` apart) lands at output
/// row `rev(r)` (rows `out_stride` apart).
///
/// # Panics
///
/// Panics if `rows` is not a supported power of two, if either stride is smaller than `cols`, or
/// if a buffer cannot hold `rows` rows.
pub fn scramble_rows<E: Copy>(
    out: &mut [E],
    out_stride: usize,
    input: &[E],
    in_stride: usize,
    rows: usize,
    cols: usize,
) {
    assert_valid_len(rows);
    assert_strided_len(out.len(), rows, out_stride, cols);
    assert_strided_len(input.len(), rows, in_stride, cols);
    scramble_rows_recursive(out, out_stride, input, in_stride, rows, cols);
}

fn scramble_rows_recursive<E: Copy>(
    out: &mut [E],
    out_stride: usize,
    input: &[E],
    in_stride: usize,
    rows: usize,
    cols: usize,
) {
    if rows == 1 {
        out[..cols].copy_from_slice(&input[..cols]);
        return;
    }
    let half = rows / 2;
    scramble_rows_recursive(out, out_stride * 2, input, in_stride, half, cols);
    scramble_rows_recursive(
        &mut out[out_stride..],
        out_stride * 2,
        &input[half * in_stride..],
        in_stride,
        half,
        cols,
    );
}

/// Permutes `data` into bit-reversed order by swapping `i` with `rev(i)`.
///
/// # Panics
///
/// Panics if `data.len()` is not a supported power of two.
pub fn bit_reverse_in_place<E>(data: &mut [E]) {
    let n = data.len();
    assert_valid_len(n);
    if n <= 2 {
        return;
    }
    let shift = usize::BITS - n.trailing_zeros();
    for i in 0..n {
        let j = i.reverse_bits() >> shift;
        if i < j {
            data.swap(i, j);
        }
    }
}

/// Checks that a buffer of `len` elements holds `rows` rows of `cols` elements, `stride` apart.
#[track_caller]
pub(crate) fn assert_strided_len(len: usize, rows: usize, stride: usize, cols: usize) {
    assert!(
        stride >= cols,
        "row stride {stride} is smaller than the row length {cols}"
    );
    assert!(
        rows == 0 || len >= (rows - 1) * stride + cols,
        "buffer holds {len} elements, {} needed for {rows} rows of {cols} at stride {stride}",
        (rows - 1) * stride + cols
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reverse(i: usize, n: usize) -> usize {
        if n == 1 {
            return 0;
        }
        i.reverse_bits() >> (usize::BITS - n.trailing_zeros())
    }

    #[test]
    fn scramble_eight() {
        let input: Vec<usize> = (0..8).collect();
        let mut out = vec![0; 8];
        scramble(&mut out, &input, 1);
        assert_eq!(out, [0, 4, 2, 6, 1, 5, 3, 7]);
    }

    #[test]
    fn scramble_matches_bit_reversal() {
        for log_n in 0..12 {
            let n = 1 << log_n;
            let input: Vec<usize> = (0..n).collect();
            let mut out = vec![usize::MAX; n];
            scramble(&mut out, &input, 1);
            for i in 0..n {
                assert_eq!(out[reverse(i, n)], i);
            }
        }
    }

    #[test]
    fn scramble_strided_leaves_gaps_untouched() {
        let input: Vec<i32> = (0..16).collect();
        let mut out = vec![-1; 16 * 3];
        scramble(&mut out, &input, 3);
        for (k, value) in out.iter().enumerate() {
            if k % 3 == 0 {
                assert_eq!(*value as usize, reverse(k / 3, 16));
            } else {
                assert_eq!(*value, -1);
            }
        }
    }

    #[test]
    fn scramble_then_in_place_is_identity() {
        let input: Vec<u32> = (0..256).collect();
        let mut out = vec![0; 256];
        scramble(&mut out, &input, 1);
        bit_reverse_in_place(&mut out);
        assert_eq!(out, input);
    }

    #[test]
    fn in_place_small_lengths() {
        let mut one = [7];
        bit_reverse_in_place(&mut one);
        assert_eq!(one, [7]);

        let mut two = [1, 2];
        bit_reverse_in_place(&mut two);
        assert_eq!(two, [1, 2]);

        let mut four = [0, 1, 2, 3];
        bit_reverse_in_place(&mut four);
        assert_eq!(four, [0, 2, 1, 3]);
    }

    #[test]
    fn rows_move_as_units() {
        let rows = 8;
        let cols = 3;
        let in_stride = 4;
        let out_stride = 5;
        let input: Vec<i32> = (0..(rows * in_stride) as i32).collect();
        let mut out = vec![-1; rows * out_stride];
        scramble_rows(&mut out, out_stride, &input, in_stride, rows, cols);

        for r in 0..rows {
            let dst = reverse(r, rows) * out_stride;
            assert_eq!(
                out[dst..dst + cols],
                input[r * in_stride..r * in_stride + cols]
            );
            assert!(out[dst + cols..dst + out_stride].iter().all(|&v| v == -1));
        }
    }

    #[test]
    #[should_panic(expected = "power of two")]
    fn rejects_non_power_of_two() {
        let input = [0u8; 6];
        let mut out = [0u8; 6];
        scramble(&mut out, &input, 1);
    }

    #[test]
    #[should_panic(expected = "smaller than the row length")]
    fn rejects_narrow_stride() {
        let input = [0u8; 16];
        let mut out = [0u8; 16];
        scramble_rows(&mut out, 2, &input, 4, 4, 4);
    }
}
