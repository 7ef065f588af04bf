//! Butterflies shared by the row and column engines
//!
//! Buffers are viewed as interleaved `[re, im, re, im, ..]` scalars. Every routine is generic over
//! the vector type so that the vectorized body and the scalar remainder are the same code.
use std::f64::consts::FRAC_1_SQRT_2;

use num_complex::Complex;

use crate::simd::SimdVector;
use crate::FftFloat;

/// Multiplies `(re, im)` by `w`, or by `conj(w)` when `INVERSE`.
#[inline(always)]
pub(crate) fn rotate<T: FftFloat, W: SimdVector<T>, const INVERSE: bool>(
    re: W,
    im: W,
    w_re: W,
    w_im: W,
) -> (W, W) {
    if INVERSE {
        (re.mul_add(w_re, im * w_im), im.mul_sub(w_re, re * w_im))
    } else {
        (re.mul_sub(w_re, im * w_im), re.mul_add(w_im, im * w_re))
    }
}

/// Multiplies `(re, im)` by `-i`, or by `i` when `INVERSE`.
#[inline(always)]
fn quarter_turn<T: FftFloat, W: SimdVector<T>, const INVERSE: bool>(re: W, im: W) -> (W, W) {
    let zero = W::splat(T::zero());
    if INVERSE {
        (zero - im, re)
    } else {
        (im, zero - re)
    }
}

/// `even[i] += t`, `odd[i] = even[i] - t` with `t = odd[i] * w[i]` for every complex `i`.
///
/// `even` and `odd` hold `2 * w_re.len()` scalars each.
#[inline(always)]
pub(crate) fn butterflies<T: FftFloat, V: SimdVector<T>, const INVERSE: bool>(
    even: &mut [T],
    odd: &mut [T],
    w_re: &[T],
    w_im: &[T],
) {
    let half = w_re.len();
    let split = half - half % V::LANES;
    let (even_head, even_tail) = even.split_at_mut(2 * split);
    let (odd_head, odd_tail) = odd.split_at_mut(2 * split);

    butterfly_run::<T, V, INVERSE>(even_head, odd_head, &w_re[..split], &w_im[..split]);
    butterfly_run::<T, T, INVERSE>(even_tail, odd_tail, &w_re[split..], &w_im[split..]);
}

#[inline(always)]
fn butterfly_run<T: FftFloat, W: SimdVector<T>, const INVERSE: bool>(
    even: &mut [T],
    odd: &mut [T],
    w_re: &[T],
    w_im: &[T],
) {
    even.chunks_exact_mut(2 * W::LANES)
        .zip(odd.chunks_exact_mut(2 * W::LANES))
        .zip(w_re.chunks_exact(W::LANES))
        .zip(w_im.chunks_exact(W::LANES))
        .for_each(|(((e, o), wr), wi)| {
            let (e_re, e_im) = W::load_complex(e);
            let (o_re, o_im) = W::load_complex(o);
            let (t_re, t_im) = rotate::<T, W, INVERSE>(o_re, o_im, W::load(wr), W::load(wi));
            W::store_complex(e_re + t_re, e_im + t_im, e);
            W::store_complex(e_re - t_re, e_im - t_im, o);
        });
}

/// Same as [`butterflies`] with a single coefficient shared by every element, as in one row pair
/// of the column engine.
#[inline(always)]
pub(crate) fn butterflies_broadcast<T: FftFloat, V: SimdVector<T>, const INVERSE: bool>(
    even: &mut [T],
    odd: &mut [T],
    w_re: T,
    w_im: T,
) {
    let cols = even.len() / 2;
    let split = 2 * (cols - cols % V::LANES);
    let (even_head, even_tail) = even.split_at_mut(split);
    let (odd_head, odd_tail) = odd.split_at_mut(split);

    broadcast_run::<T, V, INVERSE>(even_head, odd_head, w_re, w_im);
    broadcast_run::<T, T, INVERSE>(even_tail, odd_tail, w_re, w_im);
}

#[inline(always)]
fn broadcast_run<T: FftFloat, W: SimdVector<T>, const INVERSE: bool>(
    even: &mut [T],
    odd: &mut [T],
    w_re: T,
    w_im: T,
) {
    let w_re = W::splat(w_re);
    let w_im = W::splat(w_im);
    even.chunks_exact_mut(2 * W::LANES)
        .zip(odd.chunks_exact_mut(2 * W::LANES))
        .for_each(|(e, o)| {
            let (e_re, e_im) = W::load_complex(e);
            let (o_re, o_im) = W::load_complex(o);
            let (t_re, t_im) = rotate::<T, W, INVERSE>(o_re, o_im, w_re, w_im);
            W::store_complex(e_re + t_re, e_im + t_im, e);
            W::store_complex(e_re - t_re, e_im - t_im, o);
        });
}

/// Two-point butterfly between two rows of interleaved scalars.
#[inline(always)]
pub(crate) fn pair_rows<T: FftFloat, V: SimdVector<T>>(r0: &mut [T], r1: &mut [T]) {
    let split = r0.len() - r0.len() % (2 * V::LANES);
    let (r0_head, r0_tail) = r0.split_at_mut(split);
    let (r1_head, r1_tail) = r1.split_at_mut(split);

    pair_run::<T, V>(r0_head, r1_head);
    pair_run::<T, T>(r0_tail, r1_tail);
}

#[inline(always)]
fn pair_run<T: FftFloat, W: SimdVector<T>>(r0: &mut [T], r1: &mut [T]) {
    r0.chunks_exact_mut(W::LANES)
        .zip(r1.chunks_exact_mut(W::LANES))
        .for_each(|(a, b)| {
            let x0 = W::load(a);
            let x1 = W::load(b);
            (x0 + x1).store(a);
            (x0 - x1).store(b);
        });
}

/// Four-point transform across four rows already in bit-reversed order.
#[inline(always)]
pub(crate) fn quad_rows<T: FftFloat, V: SimdVector<T>, const INVERSE: bool>(
    rows: [&mut [T]; 4],
) {
    let [r0, r1, r2, r3] = rows;
    let split = r0.len() - r0.len() % (2 * V::LANES);
    let (r0_head, r0_tail) = r0.split_at_mut(split);
    let (r1_head, r1_tail) = r1.split_at_mut(split);
    let (r2_head, r2_tail) = r2.split_at_mut(split);
    let (r3_head, r3_tail) = r3.split_at_mut(split);

    quad_run::<T, V, INVERSE>(r0_head, r1_head, r2_head, r3_head);
    quad_run::<T, T, INVERSE>(r0_tail, r1_tail, r2_tail, r3_tail);
}

#[inline(always)]
fn quad_run<T: FftFloat, W: SimdVector<T>, const INVERSE: bool>(
    r0: &mut [T],
    r1: &mut [T],
    r2: &mut [T],
    r3: &mut [T],
) {
    let width = 2 * W::LANES;
    r0.chunks_exact_mut(width)
        .zip(r1.chunks_exact_mut(width))
        .zip(r2.chunks_exact_mut(width))
        .zip(r3.chunks_exact_mut(width))
        .for_each(|(((c0, c1), c2), c3)| {
            let (a_re, a_im) = W::load_complex(c0);
            let (b_re, b_im) = W::load_complex(c1);
            let (c_re, c_im) = W::load_complex(c2);
            let (d_re, d_im) = W::load_complex(c3);

            let (s01_re, s01_im) = (a_re + b_re, a_im + b_im);
            let (d01_re, d01_im) = (a_re - b_re, a_im - b_im);
            let (s23_re, s23_im) = (c_re + d_re, c_im + d_im);
            let (d23_re, d23_im) = quarter_turn::<T, W, INVERSE>(c_re - d_re, c_im - d_im);

            W::store_complex(s01_re + s23_re, s01_im + s23_im, c0);
            W::store_complex(d01_re + d23_re, d01_im + d23_im, c1);
            W::store_complex(s01_re - s23_re, s01_im - s23_im, c2);
            W::store_complex(d01_re - d23_re, d01_im - d23_im, c3);
        });
}

/// Transforms a bit-reversed block of at most eight elements in place.
#[inline(always)]
pub(crate) fn leaf<T: FftFloat, const INVERSE: bool>(data: &mut [Complex<T>]) {
    match data.len() {
        1 => {}
        2 => leaf_2(data),
        4 => leaf_4::<T, INVERSE>(data),
        8 => leaf_8::<T, INVERSE>(data),
        len => unreachable!("no leaf for {len} elements"),
    }
}

#[inline(always)]
fn leaf_2<T: FftFloat>(data: &mut [Complex<T>]) {
    let (a, b) = (data[0], data[1]);
    data[0] = a + b;
    data[1] = a - b;
}

/// `z * -i`, or `z * i` when `INVERSE`.
#[inline(always)]
fn turn<T: FftFloat, const INVERSE: bool>(z: Complex<T>) -> Complex<T> {
    if INVERSE {
        Complex::new(-z.im, z.re)
    } else {
        Complex::new(z.im, -z.re)
    }
}

#[inline(always)]
fn leaf_4<T: FftFloat, const INVERSE: bool>(data: &mut [Complex<T>]) {
    let s01 = data[0] + data[1];
    let d01 = data[0] - data[1];
    let s23 = data[2] + data[3];
    let d23 = turn::<T, INVERSE>(data[2] - data[3]);

    data[0] = s01 + s23;
    data[1] = d01 + d23;
    data[2] = s01 - s23;
    data[3] = d01 - d23;
}

#[inline(always)]
pub(crate) fn leaf_8<T: FftFloat, const INVERSE: bool>(data: &mut [Complex<T>]) {
    let (even, odd) = data.split_at_mut(4);
    leaf_4::<T, INVERSE>(even);
    leaf_4::<T, INVERSE>(odd);

    let c = T::cast_f64(FRAC_1_SQRT_2);
    // odd[k] * e^{-iπk/4}, conjugated for the inverse
    let sign = if INVERSE { -T::one() } else { T::one() };
    let t0 = odd[0];
    let t1 = odd[1] * Complex::new(c, -sign * c);
    let t2 = turn::<T, INVERSE>(odd[2]);
    let t3 = odd[3] * Complex::new(-c, -sign * c);

    for (k, t) in [t0, t1, t2, t3].into_iter().enumerate() {
        let e = even[k];
        even[k] = e + t;
        odd[k] = e - t;
    }
}
