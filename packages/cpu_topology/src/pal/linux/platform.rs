use std::num::NonZeroUsize;

use new_zealand::nz;
use tracing::{info, warn};

use crate::pal::linux::{Bindings, BindingsFacade, Filesystem, FilesystemFacade};
use crate::pal::{DetectedTopology, FALLBACK_CYCLES_PER_MS, Platform};
use crate::{CacheLevel, CoreId, CoreSet, InstructionSet, NumaNodeId};

/// `statfs` filesystem magic of a tmpfs mount, which is what backs the cgroup v1
/// control hierarchy.
const TMPFS_MAGIC: i64 = 0x0102_1994;

/// `statfs` filesystem magic of the unified cgroup v2 hierarchy. Defined in
/// `linux/magic.h` since kernel 4.5.
const CGROUP2_SUPER_MAGIC: i64 = 0x6367_7270;

/// Singleton instance of `BuildTargetPlatform`, used by public API types
/// to hook up to the correct PAL implementation.
pub(crate) static BUILD_TARGET_PLATFORM: BuildTargetPlatform =
    BuildTargetPlatform::new(BindingsFacade::real(), FilesystemFacade::real());

/// The platform that matches the crate's build target.
///
/// You would only use a different platform in unit tests that need to mock the platform.
/// Even then, whenever possible, unit tests should use the real platform for maximum
/// realism.
#[derive(Debug)]
pub(crate) struct BuildTargetPlatform {
    bindings: BindingsFacade,
    fs: FilesystemFacade,
}

impl Platform for BuildTargetPlatform {
    fn detect_topology(&self) -> DetectedTopology {
        // There are two main ways to get topology information on Linux:
        // 1. Use various APIs to get the information as objects.
        // 2. Parse files in the /sys and /proc virtual filesystems.
        //
        // The former requires annoying FFI calls into native libraries that put a klunky
        // extra layer between the operating system and the app (libnuma, libcpuset, ...),
        // so we go with the latter for everything the virtual filesystems cover and keep
        // the FFI surface down to a handful of libc calls.
        //
        // The sources we combine:
        // 1. /proc/cpuinfo gives us the core count, model name, clock speed and
        //    instruction-set flags.
        // 2. /sys/devices/system/cpu/offline gives us the cores that are offline now.
        // 3. The cgroup control files give us container CPU limits, when confined.
        // 4. /sys/devices/system/node and the per-core node symlinks give us the NUMA
        //    relation. The node directory may be missing if the kernel has no NUMA
        //    support.
        let cpuinfo = self.read_cpuinfo();
        let offline_cores = self.detect_offline_cores();

        let limits = self.resolve_cgroup_limits(cpuinfo.core_count.max(1), &offline_cores);

        let usable_core_count = NonZeroUsize::new(limits.usable_core_count).unwrap_or(nz!(1));

        if self.bindings.sched_getcpu() < 0 {
            warn!("kernel does not support sched_getcpu(); core placement queries will report core 0");
        }

        // The hardware maximum is independent of any constraint above.
        let max_core_count = usize::try_from(self.bindings.configured_processor_count())
            .ok()
            .and_then(NonZeroUsize::new)
            .unwrap_or(usable_core_count);

        let numa = self.map_numa_nodes(max_core_count.get());
        let (cache_sizes, cache_line_sizes) = self.read_cache_info();

        DetectedTopology {
            usable_core_count,
            max_core_count,
            model_name: cpuinfo.model_name,
            instruction_sets: cpuinfo.instruction_sets,
            cycles_per_ms: cpuinfo.cycles_per_ms,
            cgroup_quota_active: limits.quota_active,
            cgroup_cpuset_active: limits.cpuset_active,
            core_to_node: numa.core_to_node,
            node_to_cores: numa.node_to_cores,
            node_core_index: numa.node_core_index,
            cpuset_cores: limits.cpuset_cores,
            offline_cores,
            cache_sizes,
            cache_line_sizes,
        }
    }

    fn current_core_id(&self) -> Option<CoreId> {
        // Negative means the kernel cannot say (very old kernels/glibc).
        CoreId::try_from(self.bindings.sched_getcpu()).ok()
    }
}

impl BuildTargetPlatform {
    const fn new(bindings: BindingsFacade, fs: FilesystemFacade) -> Self {
        Self { bindings, fs }
    }

    fn read_cpuinfo(&self) -> CpuInfoSummary {
        let mut summary = CpuInfoSummary {
            core_count: 0,
            model_name: "unknown".to_string(),
            instruction_sets: InstructionSet::empty(),
            cycles_per_ms: FALLBACK_CYCLES_PER_MS,
        };

        let Some(contents) = self.fs.get_cpuinfo_contents() else {
            warn!("failed to read /proc/cpuinfo; assuming a single-core host");
            return summary;
        };

        let mut max_mhz: f32 = 0.0;

        for line in contents.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let (key, value) = (key.trim(), value.trim());

            match key {
                "flags" => {
                    summary.instruction_sets |= InstructionSet::from_feature_text(value);
                }
                "cpu MHz" => {
                    // Every core reports a different speed. We take the max, assuming
                    // that while this process is busy no core stays in a low-power
                    // state.
                    if let Ok(mhz) = value.parse::<f32>() {
                        max_mhz = max_mhz.max(mhz);
                    }
                }
                "processor" => summary.core_count += 1,
                // Multi-socket hosts repeat the model name per core; last one wins.
                "model name" => summary.model_name = value.to_string(),
                _ => {}
            }
        }

        if max_mhz > 0.0 {
            summary.cycles_per_ms = (f64::from(max_mhz) * 1000.0) as u64;
        }

        summary
    }

    fn detect_offline_cores(&self) -> CoreSet {
        // A missing file is normal on kernels without per-core online/offline control.
        let Some(contents) = self.fs.get_offline_cores_contents() else {
            return CoreSet::new();
        };

        corelist::parse(&contents).into_values().into_iter().collect()
    }

    /// Applies container CPU limits to the detected core count, when the process is
    /// confined.
    ///
    /// Every probe in here is best-effort: a missing control file means the cgroup does
    /// not constrain us, never that detection failed.
    fn resolve_cgroup_limits(
        &self,
        detected_core_count: usize,
        offline_cores: &CoreSet,
    ) -> CgroupLimits {
        let unconstrained = CgroupLimits::unconstrained(detected_core_count);

        if !self.fs.container_marker_exists() {
            return unconstrained;
        }

        let magic = match self.bindings.cgroup_filesystem_magic() {
            Ok(magic) => magic,
            Err(error) => {
                warn!("failed to stat the cgroup mount point: {error}");
                return unconstrained;
            }
        };

        let (quota_text, period_text, cpuset_text) = if magic == TMPFS_MAGIC {
            // cgroup v1 keeps the quota and the cpuset in separate controllers.
            let Some(period) = self.fs.get_v1_cpu_period_contents() else {
                return unconstrained;
            };
            let Some(quota) = self.fs.get_v1_cpu_quota_contents() else {
                return unconstrained;
            };
            let Some(cpuset) = self.fs.get_v1_cpuset_cpus_contents() else {
                return unconstrained;
            };

            (quota, period, cpuset)
        } else if magic == CGROUP2_SUPER_MAGIC {
            // cgroup v2 unifies quota and period into the two-field "cpu.max" file.
            let Some(cpu_max) = self.fs.get_v2_cpu_max_contents() else {
                return unconstrained;
            };
            let Some(cpuset) = self.fs.get_v2_cpuset_cpus_contents() else {
                return unconstrained;
            };

            let mut fields = cpu_max.split_whitespace();
            let quota = fields.next().unwrap_or_default().to_string();
            let period = fields.next().unwrap_or_default().to_string();

            (quota, period, cpuset)
        } else {
            return unconstrained;
        };

        let mut limits = unconstrained;

        let mut cfs_num_cores = detected_core_count;
        {
            // A quota of "max" (v2) or -1 (v1) means unlimited; both fail the parse
            // or the positivity check and leave the quota constraint unapplied.
            let quota_us = quota_text.trim().parse::<i64>().unwrap_or(-1);
            let period_us = period_text.trim().parse::<i64>().unwrap_or(-1);

            if quota_us > 0 && period_us > 0 {
                cfs_num_cores = usize::try_from(quota_us / period_us).unwrap_or(0);
                limits.quota_active = true;
            }
        }

        let mut cpuset_num_cores = detected_core_count;
        if !cpuset_text.trim().is_empty() {
            // Offline cores are dropped from the pinned set here; the quota-derived
            // count above is deliberately not revisited.
            limits.cpuset_cores = corelist::parse(&cpuset_text)
                .into_values()
                .into_iter()
                .filter(|core| !offline_cores.contains(*core))
                .collect();
            cpuset_num_cores = limits.cpuset_cores.len();
            limits.cpuset_active = true;
        }

        if cfs_num_cores < detected_core_count || cpuset_num_cores < detected_core_count {
            limits.usable_core_count = cfs_num_cores.min(cpuset_num_cores).max(1);
            info!(
                cfs_num_cores,
                cpuset_num_cores,
                usable_core_count = limits.usable_core_count,
                "applied container CPU limits from cgroup"
            );
        }

        limits
    }

    fn map_numa_nodes(&self, max_core_count: usize) -> NumaTables {
        // The NUMA relation lives in the /sys filesystem, which is part of the Linux
        // ABI; the entries are only present if the kernel was compiled with NUMA
        // support.
        let Some(entries) = self.fs.get_numa_node_entries() else {
            warn!("/sys/devices/system/node is not present; assuming a single NUMA node");
            return Self::single_node_tables(max_core_count);
        };

        // Node subdirectories are named node0, node1, node2, ...
        let found_nodes = entries.iter().filter(|name| name.starts_with("node")).count();
        let node_count = if found_nodes == 0 {
            warn!("found no node entries under /sys/devices/system/node; assuming a single NUMA node");
            1
        } else {
            found_nodes
        };

        // Each core belongs to the node whose subdirectory it carries a symlink to.
        // Probing in ascending node order; a well-formed tree has exactly one match.
        let core_to_node = (0..max_core_count)
            .map(|core| {
                let core = core as CoreId;

                (0..node_count as NumaNodeId)
                    .find(|node| self.fs.cpu_node_link_exists(core, *node))
                    .unwrap_or_else(|| {
                        warn!(core, "could not determine the NUMA node of core; defaulting to node 0");
                        0
                    })
            })
            .collect::<Box<[_]>>();

        Self::build_inverse_tables(core_to_node, node_count)
    }

    fn single_node_tables(max_core_count: usize) -> NumaTables {
        Self::build_inverse_tables(vec![0; max_core_count].into_boxed_slice(), 1)
    }

    fn build_inverse_tables(core_to_node: Box<[NumaNodeId]>, node_count: usize) -> NumaTables {
        let mut node_to_cores = vec![Vec::new(); node_count].into_boxed_slice();
        let mut node_core_index = vec![0_usize; core_to_node.len()].into_boxed_slice();

        for (core, node) in core_to_node.iter().enumerate() {
            let cores_of_node = &mut node_to_cores[*node as usize];
            node_core_index[core] = cores_of_node.len();
            cores_of_node.push(core as CoreId);
        }

        NumaTables {
            core_to_node,
            node_to_cores,
            node_core_index,
        }
    }

    fn read_cache_info(&self) -> ([u64; CacheLevel::COUNT], [u64; CacheLevel::COUNT]) {
        let mut sizes = [0_u64; CacheLevel::COUNT];
        let mut line_sizes = [0_u64; CacheLevel::COUNT];

        for level in CacheLevel::ALL {
            // Errors and zero reports both come out as "unknown" (0) here; callers
            // must tolerate that.
            sizes[level.index()] = u64::try_from(self.bindings.cache_size(level)).unwrap_or(0);
            line_sizes[level.index()] =
                u64::try_from(self.bindings.cache_line_size(level)).unwrap_or(0);
        }

        (sizes, line_sizes)
    }
}

// Aggregate of one pass over /proc/cpuinfo.
#[derive(Debug)]
struct CpuInfoSummary {
    core_count: usize,
    model_name: String,
    instruction_sets: InstructionSet,
    cycles_per_ms: u64,
}

// CPU limits derived from the cgroup control files, if any applied.
#[derive(Debug)]
struct CgroupLimits {
    usable_core_count: usize,
    cpuset_cores: CoreSet,
    quota_active: bool,
    cpuset_active: bool,
}

impl CgroupLimits {
    fn unconstrained(detected_core_count: usize) -> Self {
        Self {
            usable_core_count: detected_core_count,
            cpuset_cores: CoreSet::new(),
            quota_active: false,
            cpuset_active: false,
        }
    }
}

// The NUMA relation tables, indexed by core ID or node ID.
#[derive(Debug)]
struct NumaTables {
    core_to_node: Box<[NumaNodeId]>,
    node_to_cores: Box<[Vec<CoreId>]>,
    node_core_index: Box<[usize]>,
}

#[cfg(test)]
mod tests {
    use std::fmt::Write;
    use std::io;

    use itertools::Itertools;

    use super::*;
    use crate::pal::linux::{MockBindings, MockFilesystem};

    /// Renders a plausible /proc/cpuinfo with one block per core.
    fn cpuinfo_text(cores: &[(CoreId, f64)], model_name: &str, flags: &str) -> String {
        let mut text = String::new();

        for (core, mhz) in cores {
            writeln!(text, "processor\t: {core}").unwrap();
            writeln!(text, "vendor_id\t: GenuineTest").unwrap();
            writeln!(text, "model name\t: {model_name}").unwrap();
            writeln!(text, "cpu MHz\t\t: {mhz:.3}").unwrap();
            writeln!(text, "flags\t\t: {flags}").unwrap();
            writeln!(text).unwrap();
        }

        text
    }

    enum SimulatedCgroup {
        V1 {
            quota: &'static str,
            period: &'static str,
            cpuset: &'static str,
        },
        V2 {
            cpu_max: &'static str,
            cpuset: &'static str,
        },
    }

    /// Configures the mocks to simulate one full host, valid for a single
    /// `detect_topology()` call.
    fn simulate_host(
        fs: &mut MockFilesystem,
        bindings: &mut MockBindings,
        cpuinfo: Option<String>,
        offline: Option<&str>,
        cgroup: Option<SimulatedCgroup>,
        numa_nodes: Option<Vec<Vec<CoreId>>>,
        configured_processor_count: i32,
    ) {
        fs.expect_get_cpuinfo_contents()
            .times(1)
            .return_const(cpuinfo);

        fs.expect_get_offline_cores_contents()
            .times(1)
            .return_const(offline.map(str::to_string));

        match cgroup {
            None => {
                fs.expect_container_marker_exists()
                    .times(1)
                    .return_const(false);
            }
            Some(SimulatedCgroup::V1 {
                quota,
                period,
                cpuset,
            }) => {
                fs.expect_container_marker_exists()
                    .times(1)
                    .return_const(true);
                bindings
                    .expect_cgroup_filesystem_magic()
                    .times(1)
                    .returning(|| Ok(TMPFS_MAGIC));
                fs.expect_get_v1_cpu_period_contents()
                    .times(1)
                    .return_const(Some(period.to_string()));
                fs.expect_get_v1_cpu_quota_contents()
                    .times(1)
                    .return_const(Some(quota.to_string()));
                fs.expect_get_v1_cpuset_cpus_contents()
                    .times(1)
                    .return_const(Some(cpuset.to_string()));
            }
            Some(SimulatedCgroup::V2 { cpu_max, cpuset }) => {
                fs.expect_container_marker_exists()
                    .times(1)
                    .return_const(true);
                bindings
                    .expect_cgroup_filesystem_magic()
                    .times(1)
                    .returning(|| Ok(CGROUP2_SUPER_MAGIC));
                fs.expect_get_v2_cpu_max_contents()
                    .times(1)
                    .return_const(Some(cpu_max.to_string()));
                fs.expect_get_v2_cpuset_cpus_contents()
                    .times(1)
                    .return_const(Some(cpuset.to_string()));
            }
        }

        match numa_nodes {
            None => {
                fs.expect_get_numa_node_entries()
                    .times(1)
                    .return_const(None::<Vec<String>>);
            }
            Some(nodes) => {
                let entries = nodes
                    .iter()
                    .enumerate()
                    .map(|(node, _)| format!("node{node}"))
                    // The directory also holds entries we must not count as nodes.
                    .chain(["possible".to_string(), "online".to_string()])
                    .collect_vec();

                fs.expect_get_numa_node_entries()
                    .times(1)
                    .return_const(Some(entries));

                fs.expect_cpu_node_link_exists().returning(move |core, node| {
                    nodes
                        .get(node as usize)
                        .is_some_and(|cores| cores.contains(&core))
                });
            }
        }

        bindings.expect_sched_getcpu().return_const(0_i32);
        bindings
            .expect_configured_processor_count()
            .times(1)
            .return_const(configured_processor_count);
        bindings.expect_cache_size().return_const(0_i64);
        bindings.expect_cache_line_size().return_const(0_i64);
    }

    fn platform_from(fs: MockFilesystem, bindings: MockBindings) -> BuildTargetPlatform {
        BuildTargetPlatform::new(
            BindingsFacade::from_mock(bindings),
            FilesystemFacade::from_mock(fs),
        )
    }

    #[test]
    fn detect_on_bare_host_smoke_test() {
        let mut fs = MockFilesystem::new();
        let mut bindings = MockBindings::new();

        let cpuinfo = cpuinfo_text(
            &[(0, 2400.0), (1, 2400.0), (2, 2400.0), (3, 2400.0)],
            "Simulated CPU @ 2.40GHz",
            "fpu ssse3 sse4_1 sse4_2 popcnt",
        );

        simulate_host(
            &mut fs,
            &mut bindings,
            Some(cpuinfo),
            None,
            None,
            None,
            4,
        );

        let topology = platform_from(fs, bindings).detect_topology();

        assert_eq!(topology.usable_core_count, nz!(4));
        assert_eq!(topology.max_core_count, nz!(4));
        assert_eq!(topology.model_name, "Simulated CPU @ 2.40GHz");
        assert_eq!(topology.cycles_per_ms, 2_400_000);
        assert_eq!(
            topology.instruction_sets,
            InstructionSet::SSSE3
                | InstructionSet::SSE4_1
                | InstructionSet::SSE4_2
                | InstructionSet::POPCNT
        );

        assert!(!topology.cgroup_quota_active);
        assert!(!topology.cgroup_cpuset_active);
        assert!(topology.cpuset_cores.is_empty());
        assert!(topology.offline_cores.is_empty());

        // Without a NUMA tree, every core lands on the single synthetic node 0.
        assert_eq!(topology.node_to_cores.len(), 1);
        assert!(topology.core_to_node.iter().all(|node| *node == 0));
        assert_eq!(topology.node_to_cores[0], vec![0, 1, 2, 3]);
    }

    #[test]
    fn missing_cpuinfo_degrades_to_single_core_defaults() {
        let mut fs = MockFilesystem::new();
        let mut bindings = MockBindings::new();

        simulate_host(&mut fs, &mut bindings, None, None, None, None, 1);

        let topology = platform_from(fs, bindings).detect_topology();

        assert_eq!(topology.usable_core_count, nz!(1));
        assert_eq!(topology.model_name, "unknown");
        assert_eq!(topology.cycles_per_ms, FALLBACK_CYCLES_PER_MS);
        assert_eq!(topology.instruction_sets, InstructionSet::empty());
    }

    #[test]
    fn model_name_last_one_wins_across_sockets() {
        let mut fs = MockFilesystem::new();
        let bindings = MockBindings::new();

        let mut cpuinfo = cpuinfo_text(&[(0, 2000.0)], "Socket Zero CPU", "fpu");
        cpuinfo.push_str(&cpuinfo_text(&[(1, 3000.0)], "Socket One CPU", "fpu"));

        fs.expect_get_cpuinfo_contents()
            .times(1)
            .return_const(Some(cpuinfo));

        let platform = platform_from(fs, bindings);
        let summary = platform.read_cpuinfo();

        assert_eq!(summary.core_count, 2);
        assert_eq!(summary.model_name, "Socket One CPU");
        // The highest reported speed wins.
        assert_eq!(summary.cycles_per_ms, 3_000_000);
    }

    #[test]
    fn offline_cores_are_detected() {
        let mut fs = MockFilesystem::new();
        let mut bindings = MockBindings::new();

        let cpuinfo = cpuinfo_text(
            &[(0, 2400.0), (1, 2400.0), (2, 2400.0), (3, 2400.0)],
            "Simulated CPU",
            "fpu",
        );

        simulate_host(
            &mut fs,
            &mut bindings,
            Some(cpuinfo),
            Some("2\n"),
            None,
            None,
            4,
        );

        let topology = platform_from(fs, bindings).detect_topology();

        assert_eq!(topology.offline_cores.to_vec(), vec![2]);
        // Offline cores still count toward the detected hardware totals.
        assert_eq!(topology.usable_core_count, nz!(4));
    }

    #[test]
    fn missing_offline_file_means_no_offline_cores() {
        let mut fs = MockFilesystem::new();
        let bindings = MockBindings::new();

        fs.expect_get_offline_cores_contents()
            .times(1)
            .return_const(None::<String>);

        let platform = platform_from(fs, bindings);

        assert!(platform.detect_offline_cores().is_empty());
    }

    #[test]
    fn cgroup_v1_quota_reduces_usable_cores() {
        let mut fs = MockFilesystem::new();
        let mut bindings = MockBindings::new();

        let cpuinfo = cpuinfo_text(
            &[(0, 2400.0), (1, 2400.0), (2, 2400.0), (3, 2400.0)],
            "Simulated CPU",
            "fpu",
        );

        simulate_host(
            &mut fs,
            &mut bindings,
            Some(cpuinfo),
            None,
            Some(SimulatedCgroup::V1 {
                quota: "150000\n",
                period: "100000\n",
                cpuset: "",
            }),
            None,
            4,
        );

        let topology = platform_from(fs, bindings).detect_topology();

        // floor(150000 / 100000) = 1
        assert_eq!(topology.usable_core_count, nz!(1));
        assert!(topology.cgroup_quota_active);
        assert!(!topology.cgroup_cpuset_active);
        // The hardware maximum is unaffected by the quota.
        assert_eq!(topology.max_core_count, nz!(4));
    }

    #[test]
    fn cgroup_v2_quota_reduces_usable_cores() {
        let mut fs = MockFilesystem::new();
        let mut bindings = MockBindings::new();

        let cpuinfo = cpuinfo_text(
            &[(0, 2400.0), (1, 2400.0), (2, 2400.0), (3, 2400.0)],
            "Simulated CPU",
            "fpu",
        );

        simulate_host(
            &mut fs,
            &mut bindings,
            Some(cpuinfo),
            None,
            Some(SimulatedCgroup::V2 {
                cpu_max: "200000 100000\n",
                cpuset: "",
            }),
            None,
            4,
        );

        let topology = platform_from(fs, bindings).detect_topology();

        assert_eq!(topology.usable_core_count, nz!(2));
        assert!(topology.cgroup_quota_active);
        assert!(!topology.cgroup_cpuset_active);
    }

    #[test]
    fn cgroup_v2_unlimited_quota_is_not_a_constraint() {
        let mut fs = MockFilesystem::new();
        let mut bindings = MockBindings::new();

        let cpuinfo = cpuinfo_text(
            &[(0, 2400.0), (1, 2400.0), (2, 2400.0), (3, 2400.0)],
            "Simulated CPU",
            "fpu",
        );

        simulate_host(
            &mut fs,
            &mut bindings,
            Some(cpuinfo),
            None,
            Some(SimulatedCgroup::V2 {
                cpu_max: "max 100000\n",
                cpuset: "",
            }),
            None,
            4,
        );

        let topology = platform_from(fs, bindings).detect_topology();

        assert_eq!(topology.usable_core_count, nz!(4));
        assert!(!topology.cgroup_quota_active);
    }

    #[test]
    fn cgroup_cpuset_excludes_offline_cores() {
        let mut fs = MockFilesystem::new();
        let mut bindings = MockBindings::new();

        let cpuinfo = cpuinfo_text(
            &[(0, 2400.0), (1, 2400.0), (2, 2400.0), (3, 2400.0)],
            "Simulated CPU",
            "fpu",
        );

        simulate_host(
            &mut fs,
            &mut bindings,
            Some(cpuinfo),
            Some("2\n"),
            Some(SimulatedCgroup::V2 {
                cpu_max: "max 100000\n",
                cpuset: "0-3\n",
            }),
            None,
            4,
        );

        let topology = platform_from(fs, bindings).detect_topology();

        assert!(topology.cgroup_cpuset_active);
        assert_eq!(topology.cpuset_cores.to_vec(), vec![0, 1, 3]);
        assert_eq!(topology.usable_core_count, nz!(3));
    }

    #[test]
    fn quota_below_one_core_floors_to_one() {
        let mut fs = MockFilesystem::new();
        let mut bindings = MockBindings::new();

        fs.expect_container_marker_exists().return_const(true);
        bindings
            .expect_cgroup_filesystem_magic()
            .returning(|| Ok(TMPFS_MAGIC));
        fs.expect_get_v1_cpu_period_contents()
            .return_const(Some("100000".to_string()));
        fs.expect_get_v1_cpu_quota_contents()
            .return_const(Some("50000".to_string()));
        fs.expect_get_v1_cpuset_cpus_contents()
            .return_const(Some(String::new()));

        let platform = platform_from(fs, bindings);
        let limits = platform.resolve_cgroup_limits(4, &CoreSet::new());

        assert_eq!(limits.usable_core_count, 1);
        assert!(limits.quota_active);
    }

    #[test]
    fn missing_cgroup_file_aborts_only_the_cgroup_step() {
        let mut fs = MockFilesystem::new();
        let mut bindings = MockBindings::new();

        fs.expect_container_marker_exists().return_const(true);
        bindings
            .expect_cgroup_filesystem_magic()
            .returning(|| Ok(TMPFS_MAGIC));
        fs.expect_get_v1_cpu_period_contents()
            .return_const(Some("100000".to_string()));
        fs.expect_get_v1_cpu_quota_contents()
            .return_const(None::<String>);

        let platform = platform_from(fs, bindings);
        let limits = platform.resolve_cgroup_limits(4, &CoreSet::new());

        assert_eq!(limits.usable_core_count, 4);
        assert!(!limits.quota_active);
        assert!(!limits.cpuset_active);
    }

    #[test]
    fn statfs_failure_aborts_only_the_cgroup_step() {
        let mut fs = MockFilesystem::new();
        let mut bindings = MockBindings::new();

        fs.expect_container_marker_exists().return_const(true);
        bindings
            .expect_cgroup_filesystem_magic()
            .returning(|| Err(io::Error::from_raw_os_error(libc::EACCES)));

        let platform = platform_from(fs, bindings);
        let limits = platform.resolve_cgroup_limits(4, &CoreSet::new());

        assert_eq!(limits.usable_core_count, 4);
    }

    #[test]
    fn unknown_cgroup_magic_is_not_a_constraint() {
        let mut fs = MockFilesystem::new();
        let mut bindings = MockBindings::new();

        fs.expect_container_marker_exists().return_const(true);
        bindings.expect_cgroup_filesystem_magic().returning(|| Ok(0x9fa0));

        let platform = platform_from(fs, bindings);
        let limits = platform.resolve_cgroup_limits(4, &CoreSet::new());

        assert_eq!(limits.usable_core_count, 4);
        assert!(!limits.quota_active);
        assert!(!limits.cpuset_active);
    }

    #[test]
    fn outside_container_no_cgroup_files_are_probed() {
        let mut fs = MockFilesystem::new();
        let bindings = MockBindings::new();

        fs.expect_container_marker_exists().return_const(false);

        let platform = platform_from(fs, bindings);
        let limits = platform.resolve_cgroup_limits(8, &CoreSet::new());

        assert_eq!(limits.usable_core_count, 8);
        assert!(!limits.quota_active);
        assert!(!limits.cpuset_active);
    }

    #[test]
    fn garbage_cpuset_text_counts_zero_usable_cores() {
        let mut fs = MockFilesystem::new();
        let mut bindings = MockBindings::new();

        fs.expect_container_marker_exists().return_const(true);
        bindings
            .expect_cgroup_filesystem_magic()
            .returning(|| Ok(CGROUP2_SUPER_MAGIC));
        fs.expect_get_v2_cpu_max_contents()
            .return_const(Some("max 100000".to_string()));
        fs.expect_get_v2_cpuset_cpus_contents()
            .return_const(Some("not-a-core-list".to_string()));

        let platform = platform_from(fs, bindings);
        let limits = platform.resolve_cgroup_limits(4, &CoreSet::new());

        // The text was non-blank, so the cpuset constraint fires with zero parsed
        // cores; the floor keeps the final count at one.
        assert!(limits.cpuset_active);
        assert!(limits.cpuset_cores.is_empty());
        assert_eq!(limits.usable_core_count, 1);
    }

    #[test]
    fn two_numa_nodes_mapped_by_symlink_probe() {
        let mut fs = MockFilesystem::new();
        let mut bindings = MockBindings::new();

        let cpuinfo = cpuinfo_text(
            &[(0, 2400.0), (1, 2400.0), (2, 2400.0), (3, 2400.0)],
            "Simulated CPU",
            "fpu",
        );

        simulate_host(
            &mut fs,
            &mut bindings,
            Some(cpuinfo),
            None,
            None,
            Some(vec![vec![0, 1], vec![2, 3]]),
            4,
        );

        let topology = platform_from(fs, bindings).detect_topology();

        assert_eq!(topology.node_to_cores.len(), 2);
        assert_eq!(&*topology.core_to_node, &[0, 0, 1, 1]);
        assert_eq!(topology.node_to_cores[0], vec![0, 1]);
        assert_eq!(topology.node_to_cores[1], vec![2, 3]);
        assert_eq!(&*topology.node_core_index, &[0, 1, 0, 1]);
    }

    #[test]
    fn numa_directory_without_node_entries_assumes_single_node() {
        let mut fs = MockFilesystem::new();
        let bindings = MockBindings::new();

        fs.expect_get_numa_node_entries()
            .times(1)
            .return_const(Some(vec!["possible".to_string(), "online".to_string()]));
        fs.expect_cpu_node_link_exists().return_const(false);

        let platform = platform_from(fs, bindings);
        let tables = platform.map_numa_nodes(2);

        assert_eq!(tables.node_to_cores.len(), 1);
        assert_eq!(&*tables.core_to_node, &[0, 0]);
        assert_eq!(tables.node_to_cores[0], vec![0, 1]);
    }

    #[test]
    fn core_without_node_link_defaults_to_node_zero() {
        let mut fs = MockFilesystem::new();
        let bindings = MockBindings::new();

        fs.expect_get_numa_node_entries()
            .times(1)
            .return_const(Some(vec!["node0".to_string(), "node1".to_string()]));
        // Only cores 0 and 1 carry a node symlink (to node 1); cores 2 and 3 are
        // inconsistent and must fall back to node 0.
        fs.expect_cpu_node_link_exists()
            .returning(|core, node| node == 1 && core < 2);

        let platform = platform_from(fs, bindings);
        let tables = platform.map_numa_nodes(4);

        assert_eq!(&*tables.core_to_node, &[1, 1, 0, 0]);
        assert_eq!(tables.node_to_cores[0], vec![2, 3]);
        assert_eq!(tables.node_to_cores[1], vec![0, 1]);
        assert_eq!(&*tables.node_core_index, &[0, 1, 0, 1]);
    }

    #[test]
    fn absent_numa_directory_assumes_single_node() {
        let mut fs = MockFilesystem::new();
        let bindings = MockBindings::new();

        fs.expect_get_numa_node_entries()
            .times(1)
            .return_const(None::<Vec<String>>);

        let platform = platform_from(fs, bindings);
        let tables = platform.map_numa_nodes(3);

        assert_eq!(tables.node_to_cores.len(), 1);
        assert_eq!(&*tables.core_to_node, &[0, 0, 0]);
        assert_eq!(tables.node_to_cores[0], vec![0, 1, 2]);
        assert_eq!(&*tables.node_core_index, &[0, 1, 2]);
    }

    #[test]
    fn cache_info_reports_zero_for_unknown_levels() {
        let fs = MockFilesystem::new();
        let mut bindings = MockBindings::new();

        bindings
            .expect_cache_size()
            .withf(|level| *level == CacheLevel::L1Data)
            .return_const(32_768_i64);
        bindings
            .expect_cache_size()
            .withf(|level| *level == CacheLevel::L2)
            .return_const(524_288_i64);
        bindings
            .expect_cache_size()
            .withf(|level| *level == CacheLevel::L3)
            .return_const(-1_i64);
        bindings
            .expect_cache_line_size()
            .withf(|level| *level == CacheLevel::L1Data)
            .return_const(64_i64);
        bindings
            .expect_cache_line_size()
            .withf(|level| *level == CacheLevel::L2)
            .return_const(64_i64);
        bindings
            .expect_cache_line_size()
            .withf(|level| *level == CacheLevel::L3)
            .return_const(0_i64);

        let platform = platform_from(fs, bindings);
        let (sizes, line_sizes) = platform.read_cache_info();

        assert_eq!(sizes, [32_768, 524_288, 0]);
        assert_eq!(line_sizes, [64, 64, 0]);
    }

    #[test]
    fn current_core_id_passes_through_nonnegative_values() {
        let fs = MockFilesystem::new();
        let mut bindings = MockBindings::new();

        bindings.expect_sched_getcpu().return_const(2_i32);

        let platform = platform_from(fs, bindings);

        assert_eq!(platform.current_core_id(), Some(2));
    }

    #[test]
    fn current_core_id_is_unavailable_on_old_kernels() {
        let fs = MockFilesystem::new();
        let mut bindings = MockBindings::new();

        bindings.expect_sched_getcpu().return_const(-1_i32);

        let platform = platform_from(fs, bindings);

        assert_eq!(platform.current_core_id(), None);
    }
}
