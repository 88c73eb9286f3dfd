//! Platform Abstraction Layer (PAL). Private API: everything the public snapshot type
//! knows about the operating system flows through here, so tests can substitute mocks.

mod abstractions;
pub(crate) use abstractions::*;

mod facade;
pub(crate) use facade::*;

#[cfg(all(target_os = "linux", not(miri)))]
mod linux;
#[cfg(all(target_os = "linux", not(miri)))]
pub(crate) use linux::*;

// The fallback module is compiled in test mode on all platforms, under Miri, and as the
// primary implementation on unsupported platforms. However, we only glob-import it when
// it is the primary implementation. On supported platforms in test mode, it must be
// accessed via the explicit path `fallback::` to avoid ambiguity with the
// platform-specific implementation.
#[cfg(any(test, miri, not(target_os = "linux")))]
pub(crate) mod fallback;

#[cfg(any(miri, not(target_os = "linux")))]
pub(crate) use fallback::*;
