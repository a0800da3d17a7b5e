pub mod context;
pub mod installer;
pub mod paper;
pub mod purpur;
pub mod spigot;

pub use context::ResolveContext;
pub use installer::{install_release, InstallOutcome, InstalledArtifact, ReleaseResolver, Resolver};
