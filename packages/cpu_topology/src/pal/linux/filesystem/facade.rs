use std::fmt::Debug;
#[cfg(test)]
use std::sync::Arc;

#[cfg(test)]
use crate::pal::linux::MockFilesystem;
use crate::pal::linux::{BuildTargetFilesystem, Filesystem};
use crate::{CoreId, NumaNodeId};

/// Enum to hide the different filesystem implementations behind a single wrapper type.
#[derive(Clone)]
pub(crate) enum FilesystemFacade {
    Target(&'static BuildTargetFilesystem),

    #[cfg(test)]
    Mock(Arc<MockFilesystem>),
}

impl FilesystemFacade {
    pub(crate) const fn real() -> Self {
        Self::Target(&BuildTargetFilesystem)
    }

    #[cfg(test)]
    pub(crate) fn from_mock(mock: MockFilesystem) -> Self {
        Self::Mock(Arc::new(mock))
    }
}

impl Filesystem for FilesystemFacade {
    fn get_cpuinfo_contents(&self) -> Option<String> {
        match self {
            Self::Target(filesystem) => filesystem.get_cpuinfo_contents(),
            #[cfg(test)]
            Self::Mock(mock) => mock.get_cpuinfo_contents(),
        }
    }

    fn get_offline_cores_contents(&self) -> Option<String> {
        match self {
            Self::Target(filesystem) => filesystem.get_offline_cores_contents(),
            #[cfg(test)]
            Self::Mock(mock) => mock.get_offline_cores_contents(),
        }
    }

    fn container_marker_exists(&self) -> bool {
        match self {
            Self::Target(filesystem) => filesystem.container_marker_exists(),
            #[cfg(test)]
            Self::Mock(mock) => mock.container_marker_exists(),
        }
    }

    fn get_v1_cpu_quota_contents(&self) -> Option<String> {
        match self {
            Self::Target(filesystem) => filesystem.get_v1_cpu_quota_contents(),
            #[cfg(test)]
            Self::Mock(mock) => mock.get_v1_cpu_quota_contents(),
        }
    }

    fn get_v1_cpu_period_contents(&self) -> Option<String> {
        match self {
            Self::Target(filesystem) => filesystem.get_v1_cpu_period_contents(),
            #[cfg(test)]
            Self::Mock(mock) => mock.get_v1_cpu_period_contents(),
        }
    }

    fn get_v1_cpuset_cpus_contents(&self) -> Option<String> {
        match self {
            Self::Target(filesystem) => filesystem.get_v1_cpuset_cpus_contents(),
            #[cfg(test)]
            Self::Mock(mock) => mock.get_v1_cpuset_cpus_contents(),
        }
    }

    fn get_v2_cpu_max_contents(&self) -> Option<String> {
        match self {
            Self::Target(filesystem) => filesystem.get_v2_cpu_max_contents(),
            #[cfg(test)]
            Self::Mock(mock) => mock.get_v2_cpu_max_contents(),
        }
    }

    fn get_v2_cpuset_cpus_contents(&self) -> Option<String> {
        match self {
            Self::Target(filesystem) => filesystem.get_v2_cpuset_cpus_contents(),
            #[cfg(test)]
            Self::Mock(mock) => mock.get_v2_cpuset_cpus_contents(),
        }
    }

    fn get_numa_node_entries(&self) -> Option<Vec<String>> {
        match self {
            Self::Target(filesystem) => filesystem.get_numa_node_entries(),
            #[cfg(test)]
            Self::Mock(mock) => mock.get_numa_node_entries(),
        }
    }

    fn cpu_node_link_exists(&self, core: CoreId, node: NumaNodeId) -> bool {
        match self {
            Self::Target(filesystem) => filesystem.cpu_node_link_exists(core, node),
            #[cfg(test)]
            Self::Mock(mock) => mock.cpu_node_link_exists(core, node),
        }
    }
}

impl Debug for FilesystemFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Target(inner) => inner.fmt(f),
            #[cfg(test)]
            Self::Mock(inner) => inner.fmt(f),
        }
    }
}
