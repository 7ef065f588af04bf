//! Transforms of real-valued input
//!
//! Two tricks turn real data into half as much complex work:
//!
//! - [`RealFft`] packs even samples into the real lane and odd samples into the imaginary lane,
//!   runs an `N/2`-point complex transform `Z`, and recombines
//!   `X[k] = E[k] + e^{-2πik/N} O[k]` with `E[k] = (Z[k] + conj(Z[N/2-k])) / 2` and
//!   `O[k] = (Z[k] - conj(Z[N/2-k])) / 2i`.
//! - [`separate_2x_real`] splits the transform of `x + iy` back into the spectra of `x` and `y`.
use std::fmt;
use std::sync::Arc;

use num_complex::Complex;

use crate::cpu::KernelTier;
use crate::planner::{Direction, Plan, Planner};
use crate::scramble::scramble_with;
use crate::twiddles::TwiddleTable;
use crate::FftFloat;

/// A half-length complex plan plus the recombination coefficients `e^{-2πik/N}`, `k < N/2`.
pub(crate) struct RealPlan<T> {
    len: usize,
    half: Arc<Plan<T>>,
    twiddles: TwiddleTable<T>,
}

impl<T: FftFloat> RealPlan<T> {
    pub(crate) fn new(len: usize, half: Arc<Plan<T>>) -> Self {
        let twiddles = TwiddleTable::new((len / 2).max(1));
        debug_assert_eq!(half.len(), twiddles.len());
        Self { len, half, twiddles }
    }

    pub(crate) fn half_plan(&self) -> &Arc<Plan<T>> {
        &self.half
    }
}

/// Forward transform of one real sequence through a complex transform of half its length.
pub struct RealFft<T: FftFloat> {
    plan: Arc<RealPlan<T>>,
}

impl<T: FftFloat> Clone for RealFft<T> {
    fn clone(&self) -> Self {
        Self {
            plan: Arc::clone(&self.plan),
        }
    }
}

impl<T: FftFloat> fmt::Debug for RealFft<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RealFft")
            .field("len", &self.len())
            .field("kernel_tier", &self.kernel_tier())
            .finish()
    }
}

#[allow(clippy::len_without_is_empty)]
impl<T: FftFloat> RealFft<T> {
    /// Creates a real transform of length `len` from the process-wide planner.
    ///
    /// # Panics
    ///
    /// Panics if `len` is not a power of two in `1..=2^23`.
    pub fn new(len: usize) -> Self {
        Self::with_planner(len, Planner::global())
    }

    /// Creates a real transform of length `len` from `planner`.
    ///
    /// # Panics
    ///
    /// Panics if `len` is not a power of two in `1..=2^23`.
    pub fn with_planner(len: usize, planner: &Planner) -> Self {
        Self {
            plan: planner.real_plan(len),
        }
    }

    pub fn len(&self) -> usize {
        self.plan.len
    }

    pub fn kernel_tier(&self) -> KernelTier {
        self.plan.half_plan().kernel_tier()
    }

    /// Computes the spectrum of the real sequence `input`.
    ///
    /// With `half` set only bins `0..=N/2` are written and the rest of `out` is left untouched;
    /// otherwise all `N` bins are written, the upper ones as `X[N-k] = conj(X[k])`.
    ///
    /// # Panics
    ///
    /// Panics if `input.len()` differs from [`Self::len`] or `out` is shorter than the number of
    /// bins written.
    pub fn forward(&self, out: &mut [Complex<T>], input: &[T], half: bool) {
        let n = self.len();
        assert_eq!(input.len(), n, "input length does not match the transform");
        let bins = if half { n / 2 + 1 } else { n };
        assert!(
            out.len() >= bins,
            "output holds {} bins, {bins} needed",
            out.len()
        );

        if n == 1 {
            out[0] = Complex::new(input[0], T::zero());
            return;
        }

        let m = n / 2;
        scramble_with(&mut out[..m], 1, m, |i| {
            Complex::new(input[2 * i], input[2 * i + 1])
        });
        self.plan.half.rows(&mut out[..m], Direction::Forward);
        recombine(
            &mut out[..bins],
            self.plan.twiddles.re(),
            self.plan.twiddles.im(),
            half,
        );
    }
}

/// Turns the `N/2`-point transform of packed even/odd samples in `data[..N/2]` into the spectrum
/// of the real sequence, in place.
#[multiversion::multiversion(targets(
    "x86_64+avx512f+avx512bw+avx512cd+avx512dq+avx512vl",
    "x86_64+avx2+fma",
    "x86_64+sse4.2",
    "x86+avx2+fma",
    "x86+sse2",
    "aarch64+neon",
))]
fn recombine<T: FftFloat>(data: &mut [Complex<T>], w_re: &[T], w_im: &[T], half: bool) {
    let m = w_re.len();
    let n = 2 * m;
    let one_half = T::cast_f64(0.5);

    let z0 = data[0];
    data[0] = Complex::new(z0.re + z0.im, T::zero());
    data[m] = Complex::new(z0.re - z0.im, T::zero());

    // bins k and m-k read each other, so they are produced together
    for k in 1..=m / 2 {
        let j = m - k;
        let z_k = data[k];
        let z_j = data[j].conj();

        let even = (z_k + z_j) * one_half;
        let diff = z_k - z_j;
        let odd = Complex::new(diff.im, -diff.re) * one_half;

        data[k] = even + Complex::new(w_re[k], w_im[k]) * odd;
        data[j] = even.conj() + Complex::new(w_re[j], w_im[j]) * odd.conj();
    }

    if !half {
        for k in 1..m {
            data[n - k] = data[k].conj();
        }
    }
}

/// Recovers the spectra of `x` and `y` from the spectrum of `x + iy`.
///
/// `out1` receives the spectrum of the real lane, `out2` that of the imaginary lane.
///
/// # Panics
///
/// Panics if the three buffers differ in length.
pub fn separate_2x_real<T: FftFloat>(
    out1: &mut [Complex<T>],
    out2: &mut [Complex<T>],
    input: &[Complex<T>],
) {
    assert_eq!(out1.len(), input.len(), "first output length differs from the input");
    out1.copy_from_slice(input);
    separate_2x_real_in_place(out1, out2);
}

/// Same as [`separate_2x_real`], with the spectrum of `x + iy` read from `data` and the spectrum
/// of `x` written back over it.
///
/// # Panics
///
/// Panics if `data` and `out2` differ in length.
pub fn separate_2x_real_in_place<T: FftFloat>(data: &mut [Complex<T>], out2: &mut [Complex<T>]) {
    assert_eq!(data.len(), out2.len(), "second output length differs from the input");
    if data.is_empty() {
        return;
    }
    separate(data, out2);
}

#[multiversion::multiversion(targets(
    "x86_64+avx512f+avx512bw+avx512cd+avx512dq+avx512vl",
    "x86_64+avx2+fma",
    "x86_64+sse4.2",
    "x86+avx2+fma",
    "x86+sse2",
    "aarch64+neon",
))]
pub(crate) fn separate<T: FftFloat>(data: &mut [Complex<T>], out2: &mut [Complex<T>]) {
    let n = data.len();
    let one_half = T::cast_f64(0.5);

    let z0 = data[0];
    data[0] = Complex::new(z0.re, T::zero());
    out2[0] = Complex::new(z0.im, T::zero());

    for i in 1..=n / 2 {
        let k = n - i;
        let (z_i, z_k) = (data[i], data[k]);
        let x = Complex::new((z_i.re + z_k.re) * one_half, (z_i.im - z_k.im) * one_half);
        let y = Complex::new((z_k.im + z_i.im) * one_half, (z_k.re - z_i.re) * one_half);
        data[i] = x;
        out2[i] = y;
        data[k] = x.conj();
        out2[k] = y.conj();
    }
}

#[cfg(test)]
mod tests {
    use utilities::{
        assert_complex_closeness, fft_epsilon_f32, fft_epsilon_f64, gen_random_real_signal,
        rustfft_reference,
    };

    use super::*;
    use crate::fft::Fft;
    use crate::options::Options;
    use crate::Capabilities;

    fn real_reference<T: FftFloat + utilities::rustfft::FftNum>(input: &[T]) -> Vec<Complex<T>> {
        let complex: Vec<Complex<T>> = input.iter().map(|&x| Complex::new(x, T::zero())).collect();
        rustfft_reference(&complex, false)
    }

    macro_rules! test_real_fft {
        ($test_name:ident, $precision:ty, $epsilon:expr) => {
            #[test]
            fn $test_name() {
                let epsilon = $epsilon;
                let fill = Complex::new(43.0, 21.0);
                for log_n in 0..=14 {
                    let n = 1 << log_n;
                    let fft = RealFft::<$precision>::new(n);
                    let input = gen_random_real_signal::<$precision>(n);
                    let expected = real_reference(&input);

                    for half in [false, true] {
                        let mut out = vec![fill; n + 1];
                        fft.forward(&mut out, &input, half);

                        let bins = if half { n / 2 + 1 } else { n };
                        assert_complex_closeness(&out[..bins], &expected[..bins], epsilon(n));
                        assert!(
                            out[bins..].iter().all(|z| *z == fill),
                            "bins past {bins} were overwritten"
                        );
                    }
                }
            }
        };
    }

    test_real_fft!(real_fft_f64, f64, fft_epsilon_f64);
    test_real_fft!(real_fft_f32, f32, |n: usize| fft_epsilon_f32(n)
        * (n as f32).sqrt());

    #[test]
    fn real_fft_on_every_tier() {
        let n = 1 << 12;
        let input = gen_random_real_signal::<f64>(n);
        let expected = real_reference(&input);
        for capabilities in Capabilities::detected().ladder() {
            let planner = Planner::new(Options::with_capabilities(capabilities));
            let fft = RealFft::<f64>::with_planner(n, &planner);
            let mut out = vec![Complex::new(0.0, 0.0); n];
            fft.forward(&mut out, &input, false);
            assert_complex_closeness(&out, &expected, fft_epsilon_f64(n));
        }
    }

    #[test]
    fn separation_recovers_both_spectra() {
        for n in [1, 2, 8, 1024] {
            let fft = Fft::<f64>::new(n);
            let x = gen_random_real_signal::<f64>(n);
            let y = gen_random_real_signal::<f64>(3 * n)[..n].to_vec();

            let mut packed = vec![Complex::new(0.0, 0.0); n];
            fft.transform_interleave(&mut packed, &x, &y);

            let mut fx = vec![Complex::new(0.0, 0.0); n];
            let mut fy = vec![Complex::new(0.0, 0.0); n];
            separate_2x_real(&mut fx, &mut fy, &packed);
            assert_complex_closeness(&fx, &real_reference(&x), fft_epsilon_f64(n));
            assert_complex_closeness(&fy, &real_reference(&y), fft_epsilon_f64(n));

            let mut fy_in_place = vec![Complex::new(0.0, 0.0); n];
            separate_2x_real_in_place(&mut packed, &mut fy_in_place);
            assert_eq!(packed, fx);
            assert_eq!(fy_in_place, fy);
        }
    }

    #[test]
    #[should_panic(expected = "bins")]
    fn rejects_short_output() {
        let fft = RealFft::<f32>::new(64);
        let input = vec![0.0; 64];
        let mut out = vec![Complex::new(0.0, 0.0); 32];
        fft.forward(&mut out, &input, true);
    }
}
