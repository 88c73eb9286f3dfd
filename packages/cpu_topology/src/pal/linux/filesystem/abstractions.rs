use std::fmt::Debug;

use crate::{CoreId, NumaNodeId};

/// Linux exposes most topology information as a virtual filesystem. This trait abstracts
/// that virtual filesystem to allow it to be mocked.
///
/// The scope of this trait is limited to the virtual filesystem exposed by the OS and
/// the container runtime. All I/O is synchronous and blocking because we expect it to
/// hit a fast path in the OS, given the data is never on a real storage device.
///
/// Every read is optional: a `None` means the file or directory does not exist (or is
/// unreadable), which for each of these sources is a normal condition on some hosts.
#[cfg_attr(test, mockall::automock)]
pub(crate) trait Filesystem: Debug + Send + Sync + 'static {
    /// Contents of `/proc/cpuinfo`.
    ///
    /// A plaintext file with "key    : value" pairs, one block per logical core. Note
    /// that it also lists offline cores.
    fn get_cpuinfo_contents(&self) -> Option<String>;

    /// Contents of `/sys/devices/system/cpu/offline`.
    ///
    /// Compact core-list text naming the cores that are offline right now. Absent on
    /// kernels without per-core online/offline control.
    fn get_offline_cores_contents(&self) -> Option<String>;

    /// Whether the container marker file `/.dockerenv` exists.
    ///
    /// Its presence is the signal that cgroup limits may apply to this process.
    fn container_marker_exists(&self) -> bool;

    /// Contents of `/sys/fs/cgroup/cpu/cpu.cfs_quota_us` (cgroup v1).
    fn get_v1_cpu_quota_contents(&self) -> Option<String>;

    /// Contents of `/sys/fs/cgroup/cpu/cpu.cfs_period_us` (cgroup v1).
    fn get_v1_cpu_period_contents(&self) -> Option<String>;

    /// Contents of `/sys/fs/cgroup/cpuset/cpuset.cpus` (cgroup v1).
    ///
    /// Compact core-list text.
    fn get_v1_cpuset_cpus_contents(&self) -> Option<String>;

    /// Contents of `/sys/fs/cgroup/cpu.max` (cgroup v2).
    ///
    /// Two whitespace-separated fields: quota (microseconds or the literal `max`)
    /// followed by period (microseconds).
    fn get_v2_cpu_max_contents(&self) -> Option<String>;

    /// Contents of `/sys/fs/cgroup/cpuset.cpus` (cgroup v2).
    ///
    /// Compact core-list text.
    fn get_v2_cpuset_cpus_contents(&self) -> Option<String>;

    /// The entry names under `/sys/devices/system/node`, or `None` if the directory
    /// does not exist (the kernel was built without NUMA support).
    fn get_numa_node_entries(&self) -> Option<Vec<String>>;

    /// Whether `/sys/devices/system/cpu/cpu{core}/node{node}` exists, assigning the
    /// core to that NUMA node.
    fn cpu_node_link_exists(&self, core: CoreId, node: NumaNodeId) -> bool;
}
