use std::fmt::Debug;
#[cfg(test)]
use std::sync::Arc;

#[cfg(test)]
use crate::pal::MockPlatform;
use crate::pal::{BUILD_TARGET_PLATFORM, BuildTargetPlatform, DetectedTopology, Platform};

/// Enum to hide the different platform implementations behind a single wrapper type.
#[derive(Clone)]
pub(crate) enum PlatformFacade {
    Target(&'static BuildTargetPlatform),

    #[cfg(test)]
    Mock(Arc<MockPlatform>),
}

impl PlatformFacade {
    pub(crate) fn target() -> Self {
        Self::Target(&BUILD_TARGET_PLATFORM)
    }

    #[cfg(test)]
    pub(crate) fn from_mock(mock: MockPlatform) -> Self {
        Self::Mock(Arc::new(mock))
    }
}

impl Platform for PlatformFacade {
    fn detect_topology(&self) -> DetectedTopology {
        match self {
            Self::Target(platform) => platform.detect_topology(),
            #[cfg(test)]
            Self::Mock(mock) => mock.detect_topology(),
        }
    }

    fn current_core_id(&self) -> Option<crate::CoreId> {
        match self {
            Self::Target(platform) => platform.current_core_id(),
            #[cfg(test)]
            Self::Mock(mock) => mock.current_core_id(),
        }
    }
}

impl Debug for PlatformFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Target(inner) => inner.fmt(f),
            #[cfg(test)]
            Self::Mock(inner) => inner.fmt(f),
        }
    }
}
