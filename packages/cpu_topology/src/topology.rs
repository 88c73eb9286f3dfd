use std::fmt::{self, Write};
use std::num::NonZeroUsize;
use std::sync::OnceLock;

use itertools::Itertools;
use tracing::warn;

use crate::pal::{DetectedTopology, Platform, PlatformFacade};
use crate::{CacheLevel, CoreId, CoreSet, InstructionSet, NumaNodeId, TopologyConfig};

/// The process-wide topology snapshot, constructed on first initialization.
static CURRENT_TOPOLOGY: OnceLock<CpuTopology> = OnceLock::new();

/// The effective compute topology of the current process.
///
/// This is what the process should *believe* it has, which is not the same as what the
/// hardware has: the usable core count and core-ID set reconcile the raw kernel-reported
/// layout with cores that are currently offline, with container (cgroup) CPU limits and
/// with an optional operator override. NUMA and cache metadata ride along for affinity
/// and sizing decisions.
///
/// The snapshot is computed exactly once, at [`initialize()`][Self::initialize], and is
/// immutable for the process lifetime. All queries are plain reads of immutable data, so
/// any number of threads may query concurrently without synchronization.
///
/// # Example
///
/// ```
/// use cpu_topology::{CpuTopology, TopologyConfig};
///
/// CpuTopology::initialize(&TopologyConfig::default());
///
/// let topology = CpuTopology::current();
/// println!("usable cores: {}", topology.usable_core_count());
/// ```
#[derive(Debug)]
pub struct CpuTopology {
    platform: PlatformFacade,
    usable_core_count: NonZeroUsize,
    max_core_count: NonZeroUsize,
    model_name: String,
    instruction_sets: InstructionSet,
    cycles_per_ms: u64,
    cgroup_quota_active: bool,
    cgroup_cpuset_active: bool,
    core_to_node: Box<[NumaNodeId]>,
    node_to_cores: Box<[Vec<CoreId>]>,
    node_core_index: Box<[usize]>,
    cpuset_cores: CoreSet,
    offline_cores: CoreSet,
    cache_sizes: [u64; CacheLevel::COUNT],
    cache_line_sizes: [u64; CacheLevel::COUNT],
}

impl CpuTopology {
    /// Detects the topology and publishes the process-wide snapshot.
    ///
    /// The first call performs all detection work; any later call is a no-op, regardless
    /// of its configuration. Concurrent first calls are safe: exactly one performs the
    /// detection and every caller observes the same completed snapshot afterwards.
    ///
    /// Callers are expected to treat this as a mandatory startup step, before any other
    /// thread may query the topology.
    pub fn initialize(config: &TopologyConfig) {
        CURRENT_TOPOLOGY.get_or_init(|| Self::detect(PlatformFacade::target(), config));
    }

    /// Returns the process-wide snapshot.
    ///
    /// # Panics
    ///
    /// Panics if [`initialize()`][Self::initialize] has not completed yet. Querying
    /// before initialization is a programming error, not a runtime condition to recover
    /// from, so it fails loudly instead of returning stale or zero data.
    #[must_use]
    pub fn current() -> &'static Self {
        CURRENT_TOPOLOGY
            .get()
            .expect("CpuTopology::initialize() must be called before querying the topology")
    }

    fn detect(platform: PlatformFacade, config: &TopologyConfig) -> Self {
        let detected = platform.detect_topology();

        // The operator override takes precedence over every detected value. It is
        // trusted as-is, so it may even exceed the hardware maximum.
        let usable_core_count = config
            .core_count_override()
            .unwrap_or(detected.usable_core_count);

        let DetectedTopology {
            usable_core_count: _,
            max_core_count,
            model_name,
            instruction_sets,
            cycles_per_ms,
            cgroup_quota_active,
            cgroup_cpuset_active,
            core_to_node,
            node_to_cores,
            node_core_index,
            cpuset_cores,
            offline_cores,
            cache_sizes,
            cache_line_sizes,
        } = detected;

        Self {
            platform,
            usable_core_count,
            max_core_count,
            model_name,
            instruction_sets,
            cycles_per_ms,
            cgroup_quota_active,
            cgroup_cpuset_active,
            core_to_node,
            node_to_cores,
            node_core_index,
            cpuset_cores,
            offline_cores,
            cache_sizes,
            cache_line_sizes,
        }
    }

    /// How many logical cores this process should use.
    ///
    /// This is the reconciled value: hardware-reported core count, reduced by cgroup
    /// quota/cpuset limits, floored at one, or replaced outright by the operator
    /// override.
    #[must_use]
    pub fn usable_core_count(&self) -> NonZeroUsize {
        self.usable_core_count
    }

    /// How many logical cores the operating system is configured for, independent of
    /// any constraint on this process.
    #[must_use]
    pub fn max_core_count(&self) -> NonZeroUsize {
        self.max_core_count
    }

    /// The CPU model name, as reported by the kernel ("unknown" if it reported none).
    #[must_use]
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Estimated clock cycles per millisecond, derived from the highest clock speed any
    /// core reported at startup.
    #[must_use]
    pub fn cycles_per_ms(&self) -> u64 {
        self.cycles_per_ms
    }

    /// Whether the host CPU supports every extension in the given set.
    #[must_use]
    pub fn is_supported(&self, sets: InstructionSet) -> bool {
        self.instruction_sets.contains(sets)
    }

    /// Every instruction-set extension detected on the host CPU.
    #[must_use]
    pub fn instruction_sets(&self) -> InstructionSet {
        self.instruction_sets
    }

    /// Whether a cgroup CPU quota reduced the usable core count.
    #[must_use]
    pub fn is_cgroup_quota_active(&self) -> bool {
        self.cgroup_quota_active
    }

    /// Whether cgroup cpuset pinning was detected.
    #[must_use]
    pub fn is_cgroup_cpuset_active(&self) -> bool {
        self.cgroup_cpuset_active
    }

    /// How many NUMA nodes the host exposes (one synthetic node when it exposes none).
    #[must_use]
    pub fn node_count(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.node_to_cores.len())
            .expect("the snapshot always contains at least one NUMA node")
    }

    /// The NUMA node the given core belongs to.
    ///
    /// # Panics
    ///
    /// Panics if `core` is not below [`max_core_count()`][Self::max_core_count]; passing
    /// an out-of-range core ID is a programming error.
    #[must_use]
    pub fn node_of_core(&self, core: CoreId) -> NumaNodeId {
        self.core_to_node
            .get(core as usize)
            .copied()
            .expect("core ID must be below max_core_count()")
    }

    /// The cores of the given node, in ascending core-ID order.
    ///
    /// # Panics
    ///
    /// Panics if `node` is not below [`node_count()`][Self::node_count]; passing an
    /// out-of-range node ID is a programming error.
    #[must_use]
    pub fn cores_of_node(&self, node: NumaNodeId) -> &[CoreId] {
        self.node_to_cores
            .get(node as usize)
            .map(Vec::as_slice)
            .expect("node ID must be below node_count()")
    }

    /// The position of the given core within its node's core sequence.
    ///
    /// Useful for round-robin placement that should spread evenly within a node.
    ///
    /// # Panics
    ///
    /// Panics if `core` is not below [`max_core_count()`][Self::max_core_count]; passing
    /// an out-of-range core ID is a programming error.
    #[must_use]
    pub fn core_index_within_node(&self, core: CoreId) -> usize {
        self.node_core_index
            .get(core as usize)
            .copied()
            .expect("core ID must be below max_core_count()")
    }

    /// Best-effort identification of the core the calling thread is executing on.
    ///
    /// Reports core 0 when the kernel cannot say. A reported value at or above
    /// [`max_core_count()`][Self::max_core_count] (observed on some virtualized hosts)
    /// is folded into range by modulo, with a diagnostic; it is never an error.
    #[must_use]
    pub fn current_core(&self) -> CoreId {
        let Some(core) = self.platform.current_core_id() else {
            return 0;
        };

        let max_core_count = self.max_core_count.get();

        if core as usize >= max_core_count {
            warn!(
                core,
                max_core_count, "current core reported beyond the known maximum; folding into range"
            );
            (core as usize % max_core_count) as CoreId
        } else {
            core
        }
    }

    /// The IDs of the cores this process should place work on.
    ///
    /// When cgroup cpuset pinning is active this is the pinned set, ascending;
    /// otherwise it is the union of every node's cores, grouped by node and ascending
    /// within each node. In both cases, cores that were offline at initialization are
    /// excluded. The order is deterministic, so reports and placement decisions built
    /// on it are reproducible.
    #[must_use]
    pub fn usable_core_ids(&self) -> Vec<CoreId> {
        let core_ids = if self.cpuset_cores.is_empty() {
            self.node_to_cores.iter().flatten().copied().collect_vec()
        } else {
            self.cpuset_cores.to_vec()
        };

        core_ids
            .into_iter()
            .filter(|core| !self.offline_cores.contains(*core))
            .collect()
    }

    /// The cores named by cgroup cpuset pinning, minus any that were offline; empty
    /// when no pinning is active.
    #[must_use]
    pub fn cpuset_cores(&self) -> &CoreSet {
        &self.cpuset_cores
    }

    /// The cores that were offline at initialization; empty on most hosts.
    #[must_use]
    pub fn offline_cores(&self) -> &CoreSet {
        &self.offline_cores
    }

    /// The size in bytes of the given cache level, or 0 when the host cannot report it.
    #[must_use]
    pub fn cache_size(&self, level: CacheLevel) -> u64 {
        self.cache_sizes[level.index()]
    }

    /// The cache line size in bytes of the given cache level, or 0 when the host cannot
    /// report it.
    #[must_use]
    pub fn cache_line_size(&self, level: CacheLevel) -> u64 {
        self.cache_line_sizes[level.index()]
    }

    /// The names of the extensions this build was compiled assuming but the host CPU
    /// does not offer.
    ///
    /// A non-empty result is worth a startup compatibility warning: the most specialized
    /// code paths in the binary cannot execute on this host.
    #[must_use]
    pub fn unsupported_instruction_sets_for_build(&self) -> Vec<&'static str> {
        InstructionSet::BUILD_ASSUMED
            .difference(self.instruction_sets)
            .names()
            .collect()
    }

    /// A human-readable multi-line summary of the snapshot.
    ///
    /// Intended for logs and operators; the exact format is unspecified and not meant
    /// to be machine-parsed.
    #[must_use]
    pub fn debug_report(&self) -> String {
        let mut report = String::new();

        self.write_report(&mut report)
            .expect("writing the report to a String cannot fail");

        report
    }

    fn write_report(&self, out: &mut impl Write) -> fmt::Result {
        writeln!(out, "CPU info:")?;
        writeln!(out, "  Model: {}", self.model_name)?;
        writeln!(out, "  Cores: {}", self.usable_core_count)?;
        writeln!(out, "  Max possible cores: {}", self.max_core_count)?;

        for level in CacheLevel::ALL {
            writeln!(
                out,
                "  {level} cache: {} bytes (line: {} bytes)",
                self.cache_size(level),
                self.cache_line_size(level)
            )?;
        }

        writeln!(out, "  Supports:")?;
        for name in self.instruction_sets.names() {
            writeln!(out, "    {name}")?;
        }

        writeln!(out, "  NUMA nodes: {}", self.node_count())?;

        write!(out, "  Nodes of cores:")?;
        for (core, node) in self.core_to_node.iter().enumerate() {
            write!(out, " {core}->{node} |")?;
        }
        writeln!(out)?;

        writeln!(
            out,
            "  Cores from cgroup cpuset: {}",
            render_core_set(&self.cpuset_cores)
        )?;
        writeln!(out, "  Offline cores: {}", render_core_set(&self.offline_cores))?;

        Ok(())
    }
}

fn render_core_set(cores: &CoreSet) -> String {
    if cores.is_empty() {
        "none".to_string()
    } else {
        cores.to_string()
    }
}
