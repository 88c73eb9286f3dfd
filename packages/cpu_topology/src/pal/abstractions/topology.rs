use std::num::NonZeroUsize;

use crate::{CacheLevel, CoreId, CoreSet, InstructionSet, NumaNodeId};

/// Assumed clock speed when `/proc/cpuinfo` reports none: one million cycles per
/// millisecond, i.e. a 1 GHz core.
pub(crate) const FALLBACK_CYCLES_PER_MS: u64 = 1_000_000;

/// Everything one [`Platform::detect_topology()`][1] pass learned about the host, merged
/// and internally consistent.
///
/// Invariants the PAL implementations uphold:
///
/// * `core_to_node` and `node_core_index` have exactly `max_core_count` entries;
/// * every node referenced by `core_to_node` has an entry in `node_to_cores`;
/// * `node_to_cores` lists each node's cores in ascending ID order and
///   `node_core_index[core]` is that core's position within its node's list;
/// * `cpuset_cores` already excludes cores that were offline at detection time.
///
/// `usable_core_count` here is the *detected* value; the operator override is applied by
/// the snapshot layer and is the one value allowed to exceed `max_core_count`.
///
/// [1]: crate::pal::Platform::detect_topology
#[derive(Clone, Debug)]
pub(crate) struct DetectedTopology {
    pub(crate) usable_core_count: NonZeroUsize,
    pub(crate) max_core_count: NonZeroUsize,
    pub(crate) model_name: String,
    pub(crate) instruction_sets: InstructionSet,
    pub(crate) cycles_per_ms: u64,
    pub(crate) cgroup_quota_active: bool,
    pub(crate) cgroup_cpuset_active: bool,
    pub(crate) core_to_node: Box<[NumaNodeId]>,
    pub(crate) node_to_cores: Box<[Vec<CoreId>]>,
    pub(crate) node_core_index: Box<[usize]>,
    pub(crate) cpuset_cores: CoreSet,
    pub(crate) offline_cores: CoreSet,
    pub(crate) cache_sizes: [u64; CacheLevel::COUNT],
    pub(crate) cache_line_sizes: [u64; CacheLevel::COUNT],
}
