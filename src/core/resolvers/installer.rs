use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::core::error::SetupResult;
use crate::core::software::Software;

use super::{
    context::ResolveContext, paper::PaperResolver, purpur::PurpurResolver,
    spigot::SpigotResolver,
};

/// An artifact placed under its canonical name in the server directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledArtifact {
    pub software: Software,
    pub game_version: String,
    pub path: PathBuf,
    /// `None` for artifacts built locally.
    pub source_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed(InstalledArtifact),
    Failed { message: String },
}

impl InstallOutcome {
    pub fn artifact(&self) -> Option<&InstalledArtifact> {
        match self {
            InstallOutcome::Installed(artifact) => Some(artifact),
            InstallOutcome::Failed { .. } => None,
        }
    }
}

#[async_trait]
pub trait ReleaseResolver: Send + Sync {
    async fn install(&self, ctx: ResolveContext<'_>) -> SetupResult<InstalledArtifact>;
}

/// One variant per resolution strategy.
pub enum Resolver {
    PaperMc(PaperResolver),
    Purpur(PurpurResolver),
    Spigot(SpigotResolver),
}

impl Resolver {
    pub fn new(software: Software, client: reqwest::Client) -> Self {
        match software {
            Software::Paper | Software::Velocity => {
                Self::PaperMc(PaperResolver::new(software, client))
            }
            Software::Purpur => Self::Purpur(PurpurResolver::new(client)),
            Software::Spigot => Self::Spigot(SpigotResolver::new()),
        }
    }

    pub async fn install(&self, ctx: ResolveContext<'_>) -> SetupResult<InstalledArtifact> {
        match self {
            Resolver::PaperMc(r) => r.install(ctx).await,
            Resolver::Purpur(r) => r.install(ctx).await,
            Resolver::Spigot(r) => r.install(ctx).await,
        }
    }
}

/// Install `software` into `ctx.server_dir`.
///
/// Never fails: any error becomes one `"{software} setup failed: ..."` event.
pub async fn install_release(software: Software, ctx: ResolveContext<'_>) -> InstallOutcome {
    info!(
        "Setting up {} {} in {:?}",
        software, ctx.game_version, ctx.server_dir
    );
    let resolver = Resolver::new(software, ctx.http_client.clone());
    match resolver.install(ctx).await {
        Ok(artifact) => {
            info!("{} ready at {:?}", software, artifact.path);
            InstallOutcome::Installed(artifact)
        }
        Err(err) => {
            let message = format!("{software} setup failed: {err}");
            warn!("{}", message);
            ctx.events.error(message.clone());
            InstallOutcome::Failed { message }
        }
    }
}
