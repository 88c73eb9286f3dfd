/// Identifies a specific logical core.
///
/// This matches the numeric identifier used by standard tooling of the operating system.
/// A core ID may exceed the *usable* core count when cores are offline or excluded by a
/// cgroup, so it must not be used to index collections sized by
/// [`usable_core_count()`][crate::CpuTopology::usable_core_count].
pub type CoreId = u32;

/// Identifies a specific NUMA node.
///
/// This matches the numeric identifier used by standard tooling of the operating system.
/// Hosts without NUMA support expose a single synthetic node 0.
pub type NumaNodeId = u32;

/// The cache levels whose geometry this package reports.
///
/// Only the levels relevant for sizing working sets are modeled: the L1 data cache and
/// the unified L2 and L3 caches.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, derive_more::Display)]
#[expect(
    clippy::exhaustive_enums,
    reason = "mirroring the fixed three-level cache model of the platform APIs"
)]
pub enum CacheLevel {
    /// Level 1 data cache.
    #[display("L1d")]
    L1Data,

    /// Level 2 cache.
    #[display("L2")]
    L2,

    /// Level 3 cache.
    #[display("L3")]
    L3,
}

impl CacheLevel {
    /// How many cache levels are modeled.
    pub const COUNT: usize = 3;

    /// All modeled cache levels, innermost first.
    pub const ALL: [Self; Self::COUNT] = [Self::L1Data, Self::L2, Self::L3];

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}
