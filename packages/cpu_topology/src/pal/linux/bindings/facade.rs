use std::fmt::Debug;
use std::io;
#[cfg(test)]
use std::sync::Arc;

use crate::CacheLevel;
#[cfg(test)]
use crate::pal::linux::MockBindings;
use crate::pal::linux::{Bindings, BuildTargetBindings};

/// Enum to hide the different bindings implementations behind a single wrapper type.
#[derive(Clone)]
pub(crate) enum BindingsFacade {
    Target(&'static BuildTargetBindings),

    #[cfg(test)]
    Mock(Arc<MockBindings>),
}

impl BindingsFacade {
    pub(crate) const fn real() -> Self {
        Self::Target(&BuildTargetBindings)
    }

    #[cfg(test)]
    pub(crate) fn from_mock(mock: MockBindings) -> Self {
        Self::Mock(Arc::new(mock))
    }
}

impl Bindings for BindingsFacade {
    fn sched_getcpu(&self) -> i32 {
        match self {
            Self::Target(bindings) => bindings.sched_getcpu(),
            #[cfg(test)]
            Self::Mock(mock) => mock.sched_getcpu(),
        }
    }

    fn configured_processor_count(&self) -> i32 {
        match self {
            Self::Target(bindings) => bindings.configured_processor_count(),
            #[cfg(test)]
            Self::Mock(mock) => mock.configured_processor_count(),
        }
    }

    fn cgroup_filesystem_magic(&self) -> Result<i64, io::Error> {
        match self {
            Self::Target(bindings) => bindings.cgroup_filesystem_magic(),
            #[cfg(test)]
            Self::Mock(mock) => mock.cgroup_filesystem_magic(),
        }
    }

    fn cache_size(&self, level: CacheLevel) -> i64 {
        match self {
            Self::Target(bindings) => bindings.cache_size(level),
            #[cfg(test)]
            Self::Mock(mock) => mock.cache_size(level),
        }
    }

    fn cache_line_size(&self, level: CacheLevel) -> i64 {
        match self {
            Self::Target(bindings) => bindings.cache_line_size(level),
            #[cfg(test)]
            Self::Mock(mock) => mock.cache_line_size(level),
        }
    }
}

impl Debug for BindingsFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Target(inner) => inner.fmt(f),
            #[cfg(test)]
            Self::Mock(inner) => inner.fmt(f),
        }
    }
}
