//! CPU capability detection and kernel tier selection
//!
//! The detected [`Capabilities`] are computed once per process and never change afterwards.
//! Planners take a `Capabilities` value explicitly, so tests can hand them a restricted record to
//! force every kernel tier through the same inputs.
use std::fmt;
use std::sync::OnceLock;

/// Vector instruction-set features relevant to kernel selection
///
/// Only `sse2`, `avx`, `fma`, `avx512f` and `neon` decide the [`KernelTier`]. `sse3`, `sse41` and
/// `avx2` are recorded for diagnostics and never change which kernels run.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Capabilities {
    pub sse2: bool,
    /// Diagnostics only
    pub sse3: bool,
    /// Diagnostics only
    pub sse41: bool,
    pub avx: bool,
    /// Diagnostics only
    pub avx2: bool,
    pub fma: bool,
    pub avx512f: bool,
    pub neon: bool,
}

static DETECTED: OnceLock<Capabilities> = OnceLock::new();

impl Capabilities {
    /// A record with every feature disabled. Plans built from it use the scalar kernels.
    pub const fn none() -> Self {
        Self {
            sse2: false,
            sse3: false,
            sse41: false,
            avx: false,
            avx2: false,
            fma: false,
            avx512f: false,
            neon: false,
        }
    }

    /// Returns the capabilities of the running processor, querying the CPU on first use only.
    pub fn detected() -> Self {
        *DETECTED.get_or_init(|| {
            let caps = Self::query();
            log::debug!("detected CPU capabilities: {caps}");
            caps
        })
    }

    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    fn query() -> Self {
        Self {
            sse2: std::arch::is_x86_feature_detected!("sse2"),
            sse3: std::arch::is_x86_feature_detected!("sse3"),
            sse41: std::arch::is_x86_feature_detected!("sse4.1"),
            avx: std::arch::is_x86_feature_detected!("avx"),
            avx2: std::arch::is_x86_feature_detected!("avx2"),
            fma: std::arch::is_x86_feature_detected!("fma"),
            avx512f: std::arch::is_x86_feature_detected!("avx512f"),
            neon: false,
        }
    }

    #[cfg(target_arch = "aarch64")]
    fn query() -> Self {
        Self {
            neon: std::arch::is_aarch64_feature_detected!("neon"),
            ..Self::none()
        }
    }

    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
    fn query() -> Self {
        Self::none()
    }

    /// Features present in both `self` and `other`.
    ///
    /// Restricting the detected record is the only way to obtain a record that is safe to hand
    /// to a planner: a feature the processor lacks can never be switched on this way.
    #[must_use]
    pub fn intersect(self, other: Self) -> Self {
        Self {
            sse2: self.sse2 && other.sse2,
            sse3: self.sse3 && other.sse3,
            sse41: self.sse41 && other.sse41,
            avx: self.avx && other.avx,
            avx2: self.avx2 && other.avx2,
            fma: self.fma && other.fma,
            avx512f: self.avx512f && other.avx512f,
            neon: self.neon && other.neon,
        }
    }

    /// Returns `true` if every feature of `self` is also present in `other`.
    pub fn is_subset_of(self, other: Self) -> bool {
        self.intersect(other) == self
    }

    /// The widest kernel tier this record allows, in fixed priority order.
    pub fn best_tier(self) -> KernelTier {
        if self.avx512f {
            KernelTier::Avx512
        } else if self.avx && self.fma {
            KernelTier::AvxFma
        } else if self.avx {
            KernelTier::Avx
        } else if self.sse2 {
            KernelTier::Sse2
        } else if self.neon {
            KernelTier::Neon
        } else {
            KernelTier::Scalar
        }
    }

    /// Nested feature sets from nothing up to `self`, one per kernel tier `self` can reach.
    ///
    /// Each entry is a subset of `self` and selects a different tier, so on a scalar-only machine
    /// this yields a single record.
    pub fn ladder(self) -> Vec<Self> {
        let steps = [
            Self::none(),
            Self {
                sse2: true,
                ..Self::none()
            },
            Self {
                sse2: true,
                sse3: true,
                sse41: true,
                avx: true,
                ..Self::none()
            },
            Self {
                sse2: true,
                sse3: true,
                sse41: true,
                avx: true,
                avx2: true,
                fma: true,
                ..Self::none()
            },
            Self {
                sse2: true,
                sse3: true,
                sse41: true,
                avx: true,
                avx2: true,
                fma: true,
                avx512f: true,
                neon: false,
            },
            Self {
                neon: true,
                ..Self::none()
            },
        ];

        let mut ladder: Vec<Self> = Vec::with_capacity(steps.len());
        for step in steps {
            let restricted = step.intersect(self);
            let tier = restricted.best_tier();
            if !ladder.iter().any(|caps| caps.best_tier() == tier) {
                ladder.push(restricted);
            }
        }
        ladder
    }
}

impl fmt::Display for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags = [
            ("sse2", self.sse2),
            ("sse3", self.sse3),
            ("sse4.1", self.sse41),
            ("avx", self.avx),
            ("avx2", self.avx2),
            ("fma", self.fma),
            ("avx512f", self.avx512f),
            ("neon", self.neon),
        ];
        let mut any = false;
        for (name, _) in flags.iter().filter(|(_, enabled)| *enabled) {
            if any {
                f.write_str("+")?;
            }
            f.write_str(name)?;
            any = true;
        }
        if !any {
            f.write_str("scalar")?;
        }
        Ok(())
    }
}

/// A kernel variant, named after the instruction set it is compiled for
///
/// Variants differ only in vector width and in whether multiply-add is fused.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KernelTier {
    /// Portable code, one complex element at a time
    Scalar,
    /// 128-bit vectors on aarch64, fused multiply-add
    Neon,
    /// 128-bit vectors
    Sse2,
    /// 256-bit vectors without fused multiply-add
    Avx,
    /// 256-bit vectors with fused multiply-add
    AvxFma,
    /// 512-bit vectors with fused multiply-add
    Avx512,
}

impl KernelTier {
    /// Short lowercase name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            KernelTier::Scalar => "scalar",
            KernelTier::Neon => "neon",
            KernelTier::Sse2 => "sse2",
            KernelTier::Avx => "avx",
            KernelTier::AvxFma => "avx+fma",
            KernelTier::Avx512 => "avx512",
        }
    }
}

impl fmt::Display for KernelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
