use crate::cpu::{Capabilities, KernelTier};

/// Options controlling how a [`Planner`](crate::planner::Planner) picks its kernels.
///
/// Calling the transform constructors without a planner uses the process-wide planner, which
/// is built from `Options::default()`: every feature the processor reports is allowed.
///
/// You only need these options to pin down a specific kernel tier, e.g. to compare variants
/// against each other or to reproduce results on a machine with narrower vectors.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct Options {
    capabilities: Capabilities,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            capabilities: Capabilities::detected(),
        }
    }
}

impl Options {
    /// Restricts kernel selection to the given features.
    ///
    /// Features the running processor does not have are dropped.
    pub fn with_capabilities(capabilities: Capabilities) -> Self {
        Self {
            capabilities: capabilities.intersect(Capabilities::detected()),
        }
    }

    /// Portable scalar kernels only.
    pub fn scalar_only() -> Self {
        Self {
            capabilities: Capabilities::none(),
        }
    }

    /// Features the selected kernels may rely on.
    ///
    /// Always a subset of [`Capabilities::detected`]: the only constructors are
    /// [`Default`], [`Options::with_capabilities`] and [`Options::scalar_only`].
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// The kernel tier plans built with these options will use.
    pub fn kernel_tier(&self) -> KernelTier {
        self.capabilities.best_tier()
    }
}
