pub mod api;
pub mod defaults;
pub mod errors;
pub mod loader;
pub mod model;

pub use api::{apply_override, validate};
pub use defaults::default_policy;
pub use errors::PolicyError;
pub use loader::{load_policy, load_policy_with_options, LoadOptions};
pub use model::{
    BeaconPolicy, ExclusionRule, FeatureFlags, LazyRenderPolicy, PaintPolicy, PolicySource,
    ScreenPolicy, TimingPolicy,
};

#[cfg(test)]
mod tests;
