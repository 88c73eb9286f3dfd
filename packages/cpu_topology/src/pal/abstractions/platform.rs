use std::fmt::Debug;

use crate::CoreId;
use crate::pal::DetectedTopology;

/// One operating system's view of the compute topology.
///
/// Implementations perform every probe exactly once per [`detect_topology()`][1] call;
/// caching and immutability are the concern of the snapshot layer above, not of the PAL.
///
/// [1]: Platform::detect_topology
#[cfg_attr(test, mockall::automock)]
pub(crate) trait Platform: Debug + Send + Sync + 'static {
    /// Reads every topology source the platform offers and merges them into one
    /// consistent set of tables.
    ///
    /// This never fails: missing or malformed sources degrade individual values to
    /// defaults, with a diagnostic where the degradation is surprising.
    fn detect_topology(&self) -> DetectedTopology;

    /// Identifies the core the calling thread is executing on right now, if the
    /// platform can tell.
    ///
    /// The raw value is not range-checked against the detected topology; the snapshot
    /// layer folds stray values into range.
    fn current_core_id(&self) -> Option<CoreId>;
}
