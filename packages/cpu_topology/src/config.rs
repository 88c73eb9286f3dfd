use std::num::NonZeroUsize;

/// Configuration consumed once by [`CpuTopology::initialize()`][crate::CpuTopology::initialize].
///
/// The defaults detect everything from the host; the only knob is the operator override
/// for the usable core count.
#[derive(Clone, Debug, Default)]
pub struct TopologyConfig {
    core_count_override: Option<NonZeroUsize>,
}

impl TopologyConfig {
    /// Creates a configuration with every value auto-detected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forces the usable core count to exactly `cores`, overriding every detected value
    /// (hardware, cgroup quota and cpuset alike).
    ///
    /// A value of zero or less means "no override, auto-detect", matching the convention
    /// of the external configuration surface this value typically arrives from.
    #[must_use]
    pub fn with_core_count_override(mut self, cores: i64) -> Self {
        self.core_count_override = usize::try_from(cores).ok().and_then(NonZeroUsize::new);
        self
    }

    pub(crate) fn core_count_override(&self) -> Option<NonZeroUsize> {
        self.core_count_override
    }
}
