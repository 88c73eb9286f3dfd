use std::thread;

use new_zealand::nz;

use crate::pal::{DetectedTopology, FALLBACK_CYCLES_PER_MS, Platform};
use crate::{CacheLevel, CoreId, CoreSet, InstructionSet};

/// Singleton instance of `BuildTargetPlatform`, used by public API types
/// to hook up to the correct PAL implementation.
#[cfg_attr(
    all(target_os = "linux", not(miri)),
    expect(dead_code, reason = "only the primary platform's singleton is wired up")
)]
pub(crate) static BUILD_TARGET_PLATFORM: BuildTargetPlatform = BuildTargetPlatform::new();

/// Platform used when the build targets an operating system without native topology
/// support (and under Miri, which cannot perform real platform calls).
///
/// Degrades gracefully rather than failing: the core count comes from
/// `available_parallelism()`, every core lands in a single synthetic NUMA node, no
/// instruction sets are reported and all cache geometry is unknown.
#[derive(Debug)]
pub(crate) struct BuildTargetPlatform;

impl BuildTargetPlatform {
    pub(crate) const fn new() -> Self {
        Self
    }
}

impl Platform for BuildTargetPlatform {
    fn detect_topology(&self) -> DetectedTopology {
        let core_count = thread::available_parallelism().unwrap_or(nz!(1));

        let cores = (0..core_count.get()).map(|core| core as CoreId).collect();

        DetectedTopology {
            usable_core_count: core_count,
            max_core_count: core_count,
            model_name: "unknown".to_string(),
            instruction_sets: InstructionSet::empty(),
            cycles_per_ms: FALLBACK_CYCLES_PER_MS,
            cgroup_quota_active: false,
            cgroup_cpuset_active: false,
            core_to_node: vec![0; core_count.get()].into_boxed_slice(),
            node_to_cores: vec![cores].into_boxed_slice(),
            node_core_index: (0..core_count.get()).collect(),
            cpuset_cores: CoreSet::new(),
            offline_cores: CoreSet::new(),
            cache_sizes: [0; CacheLevel::COUNT],
            cache_line_sizes: [0; CacheLevel::COUNT],
        }
    }

    fn current_core_id(&self) -> Option<CoreId> {
        None
    }
}
