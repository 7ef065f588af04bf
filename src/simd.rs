//! Portable vector abstraction the butterfly kernels are written against
//!
//! One implementation exists per vector width and precision. The scalar types themselves
//! implement the trait with a single lane, so every kernel handles its remainder by running the
//! same code with `T` in place of the vector type.
use std::ops::{Add, Mul, Sub};

use num_traits::Float;
use wide::{f32x16, f32x4, f32x8, f64x2, f64x4, f64x8};

/// Widest vector, in lanes, any implementation uses.
pub(crate) const MAX_LANES: usize = 16;

/// Lane-wise arithmetic on `LANES` values of `T`.
pub trait SimdVector<T: Float>:
    Copy + Add<Output = Self> + Sub<Output = Self> + Mul<Output = Self>
{
    const LANES: usize;

    fn splat(value: T) -> Self;

    /// Loads the first `LANES` values of `src`.
    fn load(src: &[T]) -> Self;

    /// Stores into the first `LANES` values of `dst`.
    fn store(self, dst: &mut [T]);

    /// `self * m + a`, fused where the tier supports it
    fn mul_add(self, m: Self, a: Self) -> Self;

    /// `self * m - a`, fused where the tier supports it
    fn mul_sub(self, m: Self, a: Self) -> Self;

    /// Loads `LANES` interleaved complex values and splits them into real and imaginary lanes.
    #[inline(always)]
    fn load_complex(src: &[T]) -> (Self, Self) {
        let mut re = [T::zero(); MAX_LANES];
        let mut im = [T::zero(); MAX_LANES];
        for (k, pair) in src[..2 * Self::LANES].chunks_exact(2).enumerate() {
            re[k] = pair[0];
            im[k] = pair[1];
        }
        (Self::load(&re), Self::load(&im))
    }

    /// Interleaves real and imaginary lanes back into `LANES` complex values.
    #[inline(always)]
    fn store_complex(re: Self, im: Self, dst: &mut [T]) {
        let mut re_lanes = [T::zero(); MAX_LANES];
        let mut im_lanes = [T::zero(); MAX_LANES];
        re.store(&mut re_lanes);
        im.store(&mut im_lanes);
        for (k, pair) in dst[..2 * Self::LANES].chunks_exact_mut(2).enumerate() {
            pair[0] = re_lanes[k];
            pair[1] = im_lanes[k];
        }
    }
}

macro_rules! impl_scalar_vector {
    ($precision:ty) => {
        impl SimdVector<$precision> for $precision {
            const LANES: usize = 1;

            #[inline(always)]
            fn splat(value: $precision) -> Self {
                value
            }

            #[inline(always)]
            fn load(src: &[$precision]) -> Self {
                src[0]
            }

            #[inline(always)]
            fn store(self, dst: &mut [$precision]) {
                dst[0] = self;
            }

            #[inline(always)]
            fn mul_add(self, m: Self, a: Self) -> Self {
                self * m + a
            }

            #[inline(always)]
            fn mul_sub(self, m: Self, a: Self) -> Self {
                self * m - a
            }

            #[inline(always)]
            fn load_complex(src: &[$precision]) -> (Self, Self) {
                (src[0], src[1])
            }

            #[inline(always)]
            fn store_complex(re: Self, im: Self, dst: &mut [$precision]) {
                dst[0] = re;
                dst[1] = im;
            }
        }
    };
}

impl_scalar_vector!(f64);
impl_scalar_vector!(f32);

macro_rules! impl_wide_vector {
    ($vector:ty, $precision:ty, $lanes:literal) => {
        impl SimdVector<$precision> for $vector {
            const LANES: usize = $lanes;

            #[inline(always)]
            fn splat(value: $precision) -> Self {
                <$vector>::splat(value)
            }

            #[inline(always)]
            fn load(src: &[$precision]) -> Self {
                let mut lanes = [0.0; $lanes];
                lanes.copy_from_slice(&src[..$lanes]);
                <$vector>::new(lanes)
            }

            #[inline(always)]
            fn store(self, dst: &mut [$precision]) {
                dst[..$lanes].copy_from_slice(&self.to_array());
            }

            #[inline(always)]
            fn mul_add(self, m: Self, a: Self) -> Self {
                <$vector>::mul_add(self, m, a)
            }

            #[inline(always)]
            fn mul_sub(self, m: Self, a: Self) -> Self {
                <$vector>::mul_sub(self, m, a)
            }
        }
    };
}

impl_wide_vector!(f64x2, f64, 2);
impl_wide_vector!(f64x4, f64, 4);
impl_wide_vector!(f64x8, f64, 8);
impl_wide_vector!(f32x4, f32, 4);
impl_wide_vector!(f32x8, f32, 8);
impl_wide_vector!(f32x16, f32, 16);

/// A vector whose multiply-add is always a separate multiply and add.
///
/// Used by tiers whose instruction set has no fused multiply-add, so that their rounding
/// matches the hardware they target.
#[derive(Copy, Clone)]
pub(crate) struct Unfused<V>(V);

impl<V: Add<Output = V>> Add for Unfused<V> {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Unfused(self.0 + rhs.0)
    }
}

impl<V: Sub<Output = V>> Sub for Unfused<V> {
    type Output = Self;

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        Unfused(self.0 - rhs.0)
    }
}

impl<V: Mul<Output = V>> Mul for Unfused<V> {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        Unfused(self.0 * rhs.0)
    }
}

impl<T: Float, V: SimdVector<T>> SimdVector<T> for Unfused<V> {
    const LANES: usize = V::LANES;

    #[inline(always)]
    fn splat(value: T) -> Self {
        Unfused(V::splat(value))
    }

    #[inline(always)]
    fn load(src: &[T]) -> Self {
        Unfused(V::load(src))
    }

    #[inline(always)]
    fn store(self, dst: &mut [T]) {
        self.0.store(dst);
    }

    #[inline(always)]
    fn mul_add(self, m: Self, a: Self) -> Self {
        Unfused(self.0 * m.0 + a.0)
    }

    #[inline(always)]
    fn mul_sub(self, m: Self, a: Self) -> Self {
        Unfused(self.0 * m.0 - a.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_complex_lanes<V: SimdVector<f64>>() {
        let src: Vec<f64> = (0..2 * V::LANES).map(|i| i as f64).collect();
        let (re, im) = V::load_complex(&src);

        let mut re_out = vec![0.0; V::LANES];
        let mut im_out = vec![0.0; V::LANES];
        re.store(&mut re_out);
        im.store(&mut im_out);
        for k in 0..V::LANES {
            assert_eq!(re_out[k], (2 * k) as f64);
            assert_eq!(im_out[k], (2 * k + 1) as f64);
        }

        let mut dst = vec![0.0; 2 * V::LANES];
        V::store_complex(re, im, &mut dst);
        assert_eq!(dst, src);
    }

    #[test]
    fn complex_lane_split() {
        check_complex_lanes::<f64>();
        check_complex_lanes::<f64x2>();
        check_complex_lanes::<f64x4>();
        check_complex_lanes::<f64x8>();
        check_complex_lanes::<Unfused<f64x4>>();
    }

    #[test]
    fn multiply_add_variants_agree_on_exact_values() {
        let a = f32x8::splat(3.0);
        let m = f32x8::splat(0.5);
        let c = f32x8::splat(1.0);
        let mut fused = [0.0f32; 8];
        let mut plain = [0.0f32; 8];
        SimdVector::mul_add(a, m, c).store(&mut fused);
        SimdVector::mul_add(Unfused(a), Unfused(m), Unfused(c)).store(&mut plain);
        assert_eq!(fused, [2.5; 8]);
        assert_eq!(plain, [2.5; 8]);

        let mut diff = [0.0f32; 4];
        SimdVector::mul_sub(f32x4::splat(3.0), f32x4::splat(2.0), f32x4::splat(1.0))
            .store(&mut diff);
        assert_eq!(diff, [5.0; 4]);
    }
}
