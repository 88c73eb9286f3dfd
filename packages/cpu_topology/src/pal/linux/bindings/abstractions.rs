use std::fmt::Debug;
use std::io;

use crate::CacheLevel;

/// Bindings for FFI calls into the operating system.
///
/// All PAL FFI calls must go through this trait, enabling them to be mocked.
#[cfg_attr(test, mockall::automock)]
pub(crate) trait Bindings: Debug + Send + Sync + 'static {
    /// `sched_getcpu()`: the core the calling thread is executing on, or a negative
    /// value when the kernel does not support the query.
    fn sched_getcpu(&self) -> i32;

    /// `get_nprocs_conf()`: how many cores the operating system is configured for,
    /// independent of how many are online or available to this process.
    fn configured_processor_count(&self) -> i32;

    /// The filesystem type magic of the cgroup mount point (`statfs("/sys/fs/cgroup")`),
    /// which distinguishes cgroup v1 from v2.
    fn cgroup_filesystem_magic(&self) -> Result<i64, io::Error>;

    /// `sysconf` query for the size in bytes of the given cache level.
    ///
    /// Some hosts report 0 or an error for levels they cannot describe.
    fn cache_size(&self, level: CacheLevel) -> i64;

    /// `sysconf` query for the cache line size in bytes of the given cache level.
    fn cache_line_size(&self, level: CacheLevel) -> i64;
}
