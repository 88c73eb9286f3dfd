use std::fmt::Debug;
use std::fs;
use std::path::Path;

use crate::pal::linux::Filesystem;
use crate::{CoreId, NumaNodeId};

/// The virtual filesystem for the real operating system that the build is targeting.
///
/// You would only use different filesystems in PAL unit tests that need to use a mock
/// filesystem. Even then, whenever possible, unit tests should use the real filesystem
/// for maximum realism.
#[derive(Debug, Default)]
pub(crate) struct BuildTargetFilesystem;

impl Filesystem for BuildTargetFilesystem {
    fn get_cpuinfo_contents(&self) -> Option<String> {
        fs::read_to_string("/proc/cpuinfo").ok()
    }

    fn get_offline_cores_contents(&self) -> Option<String> {
        fs::read_to_string("/sys/devices/system/cpu/offline").ok()
    }

    fn container_marker_exists(&self) -> bool {
        Path::new("/.dockerenv").exists()
    }

    fn get_v1_cpu_quota_contents(&self) -> Option<String> {
        fs::read_to_string("/sys/fs/cgroup/cpu/cpu.cfs_quota_us").ok()
    }

    fn get_v1_cpu_period_contents(&self) -> Option<String> {
        fs::read_to_string("/sys/fs/cgroup/cpu/cpu.cfs_period_us").ok()
    }

    fn get_v1_cpuset_cpus_contents(&self) -> Option<String> {
        fs::read_to_string("/sys/fs/cgroup/cpuset/cpuset.cpus").ok()
    }

    fn get_v2_cpu_max_contents(&self) -> Option<String> {
        fs::read_to_string("/sys/fs/cgroup/cpu.max").ok()
    }

    fn get_v2_cpuset_cpus_contents(&self) -> Option<String> {
        fs::read_to_string("/sys/fs/cgroup/cpuset.cpus").ok()
    }

    fn get_numa_node_entries(&self) -> Option<Vec<String>> {
        let entries = fs::read_dir("/sys/devices/system/node").ok()?;

        Some(
            entries
                .filter_map(|entry| {
                    entry
                        .ok()
                        .map(|entry| entry.file_name().to_string_lossy().into_owned())
                })
                .collect(),
        )
    }

    fn cpu_node_link_exists(&self, core: CoreId, node: NumaNodeId) -> bool {
        Path::new(&format!("/sys/devices/system/cpu/cpu{core}/node{node}")).exists()
    }
}
