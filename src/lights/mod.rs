//! Entity-light binding: registry, state resolution, intensity animation and
//! the build/teardown lifecycle that ties them to a loaded model.

mod animator;
mod binding;
mod registry;
mod resolver;

pub use animator::{step, tick, SMOOTHING_FACTOR, SNAP_THRESHOLD, VISIBILITY_THRESHOLD};
pub use binding::{
    BindingOptions, BuildReport, LightBinding, SkipReason, SkippedLight, DEBUG_MARKER_DIAMETER,
    PROXY_DIAMETER,
};
pub use registry::{LightEntry, LightRegistry, Proxy};
pub use resolver::resolve;
