//! Bundle layer: build configuration, descriptors, transforms, and the
//! driver that hands work to the external bundler.

mod config;
mod descriptor;
mod driver;
mod plugin;

pub use config::BuildConfig;
pub use descriptor::{BundleDescriptor, TargetEnv, standard_pair};
pub use driver::{BuildOutcome, BundleDriver};
pub use plugin::{AssetCopy, CssTransform, TransformContext, TransformPlugin};
