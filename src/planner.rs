//! The planner module selects the kernel tier for the running processor and builds, caches and
//! shares the immutable per-size transform plans.
//!
//! A plan owns the twiddle tables for one transform length and precision together with the kernel
//! entry points chosen for it. Plans are handed out as `Arc`s: every handle asking for the same
//! kind, length and precision shares one instance, and the instance is freed once the last handle
//! is dropped.
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock, Mutex, PoisonError, Weak};

use num_complex::Complex;

use crate::cpu::KernelTier;
use crate::kernels::Kernel;
use crate::options::Options;
use crate::real::RealPlan;
use crate::scramble::assert_strided_len;
use crate::twiddles::Twiddles;
use crate::{assert_valid_len, FftFloat};

/// Forward is for running the regular FFT, with `e^{-2πijk/N}` coefficients.
/// Inverse is for running the unnormalized inverse FFT, with `e^{+2πijk/N}` coefficients.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Negative exponent in the twiddle factors
    Forward,
    /// Positive exponent in the twiddle factors; the result is not divided by `N`
    Inverse,
}

impl Direction {
    pub(crate) fn index(self) -> usize {
        match self {
            Direction::Forward => 0,
            Direction::Inverse => 1,
        }
    }
}

/// Scalar type of a plan
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Precision {
    Single,
    Double,
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Precision::Single => "f32",
            Precision::Double => "f64",
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
enum PlanKind {
    Complex,
    Real,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
struct PlanKey {
    kind: PlanKind,
    len: usize,
    precision: Precision,
}

type PlanCache = HashMap<PlanKey, Weak<dyn Any + Send + Sync>>;

/// Twiddle tables of one length plus the kernel that consumes them.
pub(crate) struct Plan<T> {
    kernel: Kernel<T>,
    twiddles: Twiddles<T>,
}

impl<T: FftFloat> Plan<T> {
    fn new(len: usize, kernel: Kernel<T>) -> Self {
        Self {
            kernel,
            twiddles: Twiddles::new(len),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.twiddles.len()
    }

    pub(crate) fn kernel_tier(&self) -> KernelTier {
        self.kernel.tier()
    }

    /// Transforms one bit-reversed sequence of exactly [`Self::len`] elements in place.
    pub(crate) fn rows(&self, data: &mut [Complex<T>], direction: Direction) {
        assert_eq!(
            data.len(),
            self.len(),
            "sequence length does not match the plan"
        );
        self.kernel.rows(data, &self.twiddles, direction);
    }

    /// Transforms `cols` columns of [`Self::len`] bit-reversed rows, `stride` elements apart.
    pub(crate) fn columns(
        &self,
        data: &mut [Complex<T>],
        stride: usize,
        cols: usize,
        direction: Direction,
    ) {
        assert_strided_len(data.len(), self.len(), stride, cols);
        self.kernel
            .columns(data, stride, cols, &self.twiddles, direction);
    }
}

/// Builds and caches plans for one set of [`Options`].
///
/// The transform constructors use [`Planner::global`] unless handed a planner explicitly. Plans
/// from separate planners are never shared, so a planner restricted to fewer features never hands
/// out kernels of a wider tier.
pub struct Planner {
    options: Options,
    tier: KernelTier,
    cache: Mutex<PlanCache>,
}

static GLOBAL: LazyLock<Planner> = LazyLock::new(|| Planner::new(Options::default()));

impl Planner {
    /// Creates a planner, selecting the widest kernel tier `options` allow.
    pub fn new(options: Options) -> Self {
        let tier = options.kernel_tier();
        log::debug!(
            "planner selected {tier} kernels (capabilities: {})",
            options.capabilities()
        );
        Self {
            options,
            tier,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// The process-wide planner, built from `Options::default()` on first use.
    pub fn global() -> &'static Planner {
        &GLOBAL
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The kernel tier of every plan this planner builds.
    pub fn kernel_tier(&self) -> KernelTier {
        self.tier
    }

    /// Number of live plans in the cache.
    pub fn cached_plans(&self) -> usize {
        self.lock_cache()
            .values()
            .filter(|plan| plan.strong_count() > 0)
            .count()
    }

    /// Returns the complex plan for `len`, building it on first request.
    ///
    /// # Panics
    ///
    /// Panics if `len` is not a power of two in `1..=2^23`.
    pub(crate) fn plan<T: FftFloat>(&self, len: usize) -> Arc<Plan<T>> {
        assert_valid_len(len);
        let key = PlanKey {
            kind: PlanKind::Complex,
            len,
            precision: T::PRECISION,
        };
        self.get_or_build(key, || Plan::new(len, T::kernel(self.tier)))
    }

    /// Returns the real-input plan for `len`, building it on first request.
    ///
    /// # Panics
    ///
    /// Panics if `len` is not a power of two in `1..=2^23`.
    pub(crate) fn real_plan<T: FftFloat>(&self, len: usize) -> Arc<RealPlan<T>> {
        assert_valid_len(len);
        // the half-length plan goes through the cache first; the cache lock is not reentrant
        let half = self.plan::<T>((len / 2).max(1));
        let key = PlanKey {
            kind: PlanKind::Real,
            len,
            precision: T::PRECISION,
        };
        self.get_or_build(key, || RealPlan::new(len, half))
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, PlanCache> {
        // plans are immutable, so a panic while the lock was held leaves nothing half-written
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn get_or_build<P: Any + Send + Sync>(
        &self,
        key: PlanKey,
        build: impl FnOnce() -> P,
    ) -> Arc<P> {
        let mut cache = self.lock_cache();

        if let Some(plan) = cache.get(&key).and_then(Weak::upgrade) {
            if let Ok(plan) = plan.downcast::<P>() {
                log::trace!("plan cache hit: {key:?}");
                return plan;
            }
        }

        cache.retain(|_, plan| plan.strong_count() > 0);

        let plan = Arc::new(build());
        let erased: Arc<dyn Any + Send + Sync> = plan.clone();
        cache.insert(key, Arc::downgrade(&erased));
        log::debug!(
            "built {:?} plan: len {}, {}, {} kernels",
            key.kind,
            key.len,
            key.precision,
            self.tier
        );
        plan
    }
}

impl fmt::Debug for Planner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Planner")
            .field("options", &self.options)
            .field("tier", &self.tier)
            .finish_non_exhaustive()
    }
}
