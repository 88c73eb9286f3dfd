//! Computes the effective compute topology a process should believe it has: how many
//! logical cores it may use, which core IDs those are, which NUMA node each core belongs
//! to, what the cache hierarchy looks like and which instruction-set extensions the CPU
//! offers.
//!
//! # Why not just count cores?
//!
//! The kernel-reported hardware layout is only one of four sources of truth that have to
//! agree before a scheduler or thread pool can size itself:
//!
//! 1. the raw layout from `/proc/cpuinfo` and the `/sys` NUMA tree,
//! 1. the set of cores that are physically offline at this instant,
//! 1. container confinement - cgroup (v1 or v2) CPU quota/period and cpuset pinning,
//! 1. an operator override that forces a fixed core count.
//!
//! Ignoring any one of them silently over- or under-subscribes CPU resources for the
//! whole process lifetime. This package merges all four into a single immutable
//! snapshot: a usable core count and usable core-ID set, both no larger than hardware
//! reality, with NUMA and cache metadata attached for affinity decisions.
//!
//! # Quick start
//!
//! Initialize once at startup, then query from anywhere:
//!
//! ```
//! use cpu_topology::{CpuTopology, InstructionSet, TopologyConfig};
//!
//! CpuTopology::initialize(&TopologyConfig::default());
//!
//! let topology = CpuTopology::current();
//!
//! println!("usable cores: {}", topology.usable_core_count());
//! println!("core IDs: {:?}", topology.usable_core_ids());
//!
//! if topology.is_supported(InstructionSet::AVX2) {
//!     println!("AVX2 is available");
//! }
//!
//! for name in topology.unsupported_instruction_sets_for_build() {
//!     eprintln!("warning: this build assumes {name}, which this CPU does not offer");
//! }
//! ```
//!
//! Initialization is idempotent and safe against concurrent first calls; every later
//! query is a lock-free read of immutable data. Querying before initialization panics.
//!
//! # What this package does not do
//!
//! Detection only: nothing here pins threads, selects vectorized code paths or
//! re-detects after startup. The snapshot is computed once and treated as immutable for
//! the process lifetime; hot-plugged cores are not observed.

mod config;
mod core_set;
mod instruction_set;
mod primitive_types;
mod topology;

pub use config::*;
pub use core_set::*;
pub use instruction_set::*;
pub use primitive_types::*;
pub use topology::*;

mod pal;
