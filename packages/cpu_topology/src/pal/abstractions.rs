mod platform;
pub(crate) use platform::*;

mod topology;
pub(crate) use topology::*;
