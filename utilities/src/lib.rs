pub extern crate rustfft;

// export rustfft to pow2fft tests and benches
use rand::{distributions::Uniform, prelude::*};
use rustfft::num_complex::Complex;
use rustfft::num_traits::Float;

/// Asserts that two fp numbers are approximately equal.
///
/// # Panics
///
/// Panics if `actual` and `expected` are too far from each other
#[allow(dead_code)]
#[track_caller]
pub fn assert_float_closeness<T: Float + std::fmt::Display>(actual: T, expected: T, epsilon: T) {
    if (actual - expected).abs() >= epsilon {
        panic!(
            "Assertion failed: {actual} too far from expected value {expected} (with epsilon {epsilon})",
        );
    }
}

/// Asserts that two complex sequences agree element-wise within `epsilon`.
///
/// # Panics
///
/// Panics on a length mismatch or on the first element that is too far off.
#[track_caller]
pub fn assert_complex_closeness<T: Float + std::fmt::Display>(
    actual: &[Complex<T>],
    expected: &[Complex<T>],
    epsilon: T,
) {
    assert_eq!(actual.len(), expected.len(), "sequence lengths differ");
    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        if (a.re - e.re).abs() >= epsilon || (a.im - e.im).abs() >= epsilon {
            panic!(
                "Assertion failed at index {i}: ({}, {}) too far from expected ({}, {}) (with epsilon {epsilon})",
                a.re, a.im, e.re, e.im
            );
        }
    }
}

/// Tolerance used by the round-trip and reference tests, growing with the transform size.
pub fn fft_epsilon_f64(n: usize) -> f64 {
    1e-8 + n as f64 * 1e-12
}

/// Single precision counterpart of [`fft_epsilon_f64`].
pub fn fft_epsilon_f32(n: usize) -> f32 {
    1e-5 + n as f32 * 1e-8
}

/// Generate a random, complex, signal with components in `[-1, 1)`
pub fn gen_random_signal<T>(len: usize) -> Vec<Complex<T>>
where
    T: Float + rand::distributions::uniform::SampleUniform,
{
    let mut rng = StdRng::seed_from_u64(len as u64);

    let uniform_dist = Uniform::new(T::from(-1.0).unwrap(), T::from(1.0).unwrap());
    (0..len)
        .map(|_| Complex::new(uniform_dist.sample(&mut rng), uniform_dist.sample(&mut rng)))
        .collect()
}

/// Generate a random real signal with values in `[-1, 1)`
pub fn gen_random_real_signal<T>(len: usize) -> Vec<T>
where
    T: Float + rand::distributions::uniform::SampleUniform,
{
    let mut rng = StdRng::seed_from_u64(0x5eed ^ len as u64);

    let uniform_dist = Uniform::new(T::from(-1.0).unwrap(), T::from(1.0).unwrap());
    (0..len).map(|_| uniform_dist.sample(&mut rng)).collect()
}

/// Direct O(N^2) evaluation of the DFT, accumulated in `f64`.
///
/// `inverse` flips the sign of the exponent; no scaling is applied.
pub fn naive_dft<T: Float>(input: &[Complex<T>], inverse: bool) -> Vec<Complex<T>> {
    let n = input.len();
    let sign = if inverse { 1.0 } else { -1.0 };
    (0..n)
        .map(|k| {
            let mut acc = Complex::new(0.0f64, 0.0f64);
            for (j, x) in input.iter().enumerate() {
                // reduce the product modulo n to keep the angle small
                let angle = sign * 2.0 * std::f64::consts::PI * ((k * j) % n) as f64 / n as f64;
                let w = Complex::new(angle.cos(), angle.sin());
                acc = acc + Complex::new(x.re.to_f64().unwrap(), x.im.to_f64().unwrap()) * w;
            }
            Complex::new(T::from(acc.re).unwrap(), T::from(acc.im).unwrap())
        })
        .collect()
}

/// Forward or inverse transform computed by rustfft, used as an independent reference.
pub fn rustfft_reference<T>(input: &[Complex<T>], inverse: bool) -> Vec<Complex<T>>
where
    T: rustfft::FftNum + Float,
{
    let mut buffer = input.to_vec();
    let mut planner = rustfft::FftPlanner::new();
    let fft = if inverse {
        planner.plan_fft_inverse(buffer.len())
    } else {
        planner.plan_fft_forward(buffer.len())
    };
    fft.process(&mut buffer);
    buffer
}
