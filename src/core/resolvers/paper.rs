use async_trait::async_trait;
use tracing::info;

use crate::core::downloader::DownloadRequest;
use crate::core::error::SetupResult;
use crate::core::http::get_json;
use crate::core::software::{validate_game_version, ReleaseTarget, Software};
use crate::core::version::manifest::PaperVersionResponse;

use super::{context::ResolveContext, installer::InstalledArtifact, installer::ReleaseResolver};

/// Paper and Velocity: newest build of the requested version from the PaperMC API.
pub struct PaperResolver {
    software: Software,
    client: reqwest::Client,
}

impl PaperResolver {
    pub fn new(software: Software, client: reqwest::Client) -> Self {
        Self { software, client }
    }

    fn project(&self) -> String {
        self.software.name().to_ascii_lowercase()
    }

    pub async fn latest_build(&self, ctx: &ResolveContext<'_>) -> SetupResult<u32> {
        validate_game_version(ctx.game_version)?;
        let url = format!(
            "{}/projects/{}/versions/{}",
            ctx.endpoints.paper_api,
            self.project(),
            ctx.game_version
        );
        let version: PaperVersionResponse = get_json(&self.client, &url).await?;
        Ok(version.latest_build())
    }

    pub async fn resolve(&self, ctx: &ResolveContext<'_>) -> SetupResult<ReleaseTarget> {
        let build = self.latest_build(ctx).await?;
        let project = self.project();
        let version = ctx.game_version;
        let download_url = format!(
            "{}/projects/{project}/versions/{version}/builds/{build}/downloads/{project}-{version}-{build}.jar",
            ctx.endpoints.paper_api
        );
        info!("{} {} resolved to build {}", self.software, version, build);

        Ok(ReleaseTarget {
            software: self.software,
            game_version: version.to_string(),
            download_url,
            artifact_file_name: self.software.artifact_file_name().to_string(),
        })
    }
}

#[async_trait]
impl ReleaseResolver for PaperResolver {
    async fn install(&self, ctx: ResolveContext<'_>) -> SetupResult<InstalledArtifact> {
        let target = self.resolve(&ctx).await?;
        let request = DownloadRequest::new(ctx.server_dir, target.download_url.as_str())
            .with_file_name(target.artifact_file_name.as_str());
        let done = ctx.downloader.fetch(&request, ctx.events).await?;

        Ok(InstalledArtifact {
            software: target.software,
            game_version: target.game_version,
            path: done.path,
            source_url: Some(target.download_url),
        })
    }
}
