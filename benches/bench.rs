use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use num_traits::Float;
use pow2fft::{Direction, Fft, Fft2d, RealFft};
use rand::{distributions::Standard, prelude::Distribution, thread_rng, Rng};
use utilities::rustfft::num_complex::Complex;
use utilities::rustfft::FftPlanner;

const LENGTHS: &[usize] = &[
    6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23,
];

fn generate_real_numbers<T: Float>(n: usize) -> Vec<T>
where
    Standard: Distribution<T>,
{
    thread_rng().sample_iter(Standard).take(n).collect()
}

fn generate_complex_numbers<T: Float + Default>(n: usize) -> Vec<Complex<T>>
where
    Standard: Distribution<T>,
{
    let samples: Vec<T> = generate_real_numbers(2 * n);

    let mut signal = vec![Complex::default(); n];

    for (z, rand_chunk) in signal.iter_mut().zip(samples.chunks_exact(2)) {
        z.re = rand_chunk[0];
        z.im = rand_chunk[1];
    }

    signal
}

macro_rules! impl_complex_benchmark {
    ($func_name:ident, $precision:ty, $group_name:literal, $direction:expr) => {
        fn $func_name(c: &mut Criterion) {
            let mut group = c.benchmark_group($group_name);

            for n in LENGTHS.iter() {
                let len = 1 << n;
                group.throughput(Throughput::Elements(len as u64));

                let fft = Fft::<$precision>::new(len);
                let id = format!("pow2fft {}", fft.kernel_tier());

                group.bench_function(BenchmarkId::new(id, len), |b| {
                    b.iter_batched(
                        || generate_complex_numbers::<$precision>(len),
                        |mut signal| {
                            fft.transform_in_place(&mut signal, $direction);
                        },
                        BatchSize::SmallInput,
                    );
                });

                let id = "RustFFT";
                let mut planner = FftPlanner::<$precision>::new();
                let rustfft = match $direction {
                    Direction::Forward => planner.plan_fft_forward(len),
                    Direction::Inverse => planner.plan_fft_inverse(len),
                };

                group.bench_function(BenchmarkId::new(id, len), |b| {
                    b.iter_batched(
                        || generate_complex_numbers::<$precision>(len),
                        |mut signal| {
                            rustfft.process(&mut signal);
                        },
                        BatchSize::SmallInput,
                    );
                });
            }
            group.finish();
        }
    };
}

impl_complex_benchmark!(benchmark_forward_f32, f32, "Forward f32", Direction::Forward);
impl_complex_benchmark!(benchmark_inverse_f32, f32, "Inverse f32", Direction::Inverse);
impl_complex_benchmark!(benchmark_forward_f64, f64, "Forward f64", Direction::Forward);
impl_complex_benchmark!(benchmark_inverse_f64, f64, "Inverse f64", Direction::Inverse);

fn benchmark_real_f64(c: &mut Criterion) {
    let mut group = c.benchmark_group("Real forward f64");

    for n in LENGTHS.iter() {
        let len = 1 << n;
        group.throughput(Throughput::Elements(len as u64));

        let real_fft = RealFft::<f64>::new(len);
        let mut out = vec![Complex::default(); len / 2 + 1];
        group.bench_function(BenchmarkId::new("pow2fft half spectrum", len), |b| {
            b.iter_batched(
                || generate_real_numbers::<f64>(len),
                |input| {
                    real_fft.forward(&mut out, &input, true);
                },
                BatchSize::SmallInput,
            );
        });

        let fft = Fft::<f64>::new(len);
        let mut out = vec![Complex::default(); len];
        group.bench_function(BenchmarkId::new("pow2fft complex lane", len), |b| {
            b.iter_batched(
                || generate_real_numbers::<f64>(len),
                |input| {
                    fft.transform_real(&mut out, &input);
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn benchmark_2d_f32(c: &mut Criterion) {
    let mut group = c.benchmark_group("2D forward f32");

    for n in [5, 6, 7, 8, 9, 10, 11] {
        let side = 1 << n;
        group.throughput(Throughput::Elements((side * side) as u64));

        let fft = Fft2d::<f32>::new(side, side);
        let mut out = vec![Complex::default(); side * side];
        group.bench_function(BenchmarkId::new("pow2fft", side), |b| {
            b.iter_batched(
                || generate_complex_numbers::<f32>(side * side),
                |input| {
                    fft.transform(&mut out, side, &input, side, Direction::Forward);
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_forward_f32,
    benchmark_inverse_f32,
    benchmark_forward_f64,
    benchmark_inverse_f64,
    benchmark_real_f64,
    benchmark_2d_f32
);
criterion_main!(benches);
