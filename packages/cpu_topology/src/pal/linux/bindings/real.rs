use std::ffi::CStr;
use std::fmt::Debug;
use std::{io, mem};

use crate::CacheLevel;
use crate::pal::linux::Bindings;

/// FFI bindings that target the real operating system that the build is targeting.
///
/// You would only use different bindings in PAL unit tests that need to use mock
/// bindings. Even then, whenever possible, unit tests should use real bindings for
/// maximum realism.
#[derive(Debug, Default)]
pub(crate) struct BuildTargetBindings;

impl Bindings for BuildTargetBindings {
    fn sched_getcpu(&self) -> i32 {
        // SAFETY: No safety requirements.
        unsafe { libc::sched_getcpu() }
    }

    fn configured_processor_count(&self) -> i32 {
        // The `get_nprocs_conf` symbol is a glibc extension declared in
        // `<sys/sysinfo.h>` but not exposed by the pinned `libc` crate version,
        // so we declare the binding locally.
        unsafe extern "C" {
            fn get_nprocs_conf() -> libc::c_int;
        }

        // SAFETY: No safety requirements.
        unsafe { get_nprocs_conf() }
    }

    fn cgroup_filesystem_magic(&self) -> Result<i64, io::Error> {
        const CGROUP_MOUNT_POINT: &CStr = c"/sys/fs/cgroup";

        // SAFETY: All zeroes is a valid statfs buffer for the OS to fill.
        let mut stats: libc::statfs = unsafe { mem::zeroed() };

        // SAFETY: The path is a valid NUL-terminated string and the buffer outlives
        // the call.
        let result = unsafe { libc::statfs(CGROUP_MOUNT_POINT.as_ptr(), &raw mut stats) };

        if result == 0 {
            Ok(stats.f_type as i64)
        } else {
            Err(io::Error::last_os_error())
        }
    }

    fn cache_size(&self, level: CacheLevel) -> i64 {
        let name = match level {
            CacheLevel::L1Data => libc::_SC_LEVEL1_DCACHE_SIZE,
            CacheLevel::L2 => libc::_SC_LEVEL2_CACHE_SIZE,
            CacheLevel::L3 => libc::_SC_LEVEL3_CACHE_SIZE,
        };

        // SAFETY: No safety requirements.
        unsafe { libc::sysconf(name) as i64 }
    }

    fn cache_line_size(&self, level: CacheLevel) -> i64 {
        let name = match level {
            CacheLevel::L1Data => libc::_SC_LEVEL1_DCACHE_LINESIZE,
            CacheLevel::L2 => libc::_SC_LEVEL2_CACHE_LINESIZE,
            CacheLevel::L3 => libc::_SC_LEVEL3_CACHE_LINESIZE,
        };

        // SAFETY: No safety requirements.
        unsafe { libc::sysconf(name) as i64 }
    }
}
