use async_trait::async_trait;
use tracing::{debug, info};

use crate::core::downloader::DownloadRequest;
use crate::core::error::SetupResult;
use crate::core::http::check_status;
use crate::core::software::{validate_game_version, ReleaseTarget, Software};

use super::{context::ResolveContext, installer::InstalledArtifact, installer::ReleaseResolver};

/// Purpur publishes a `latest` alias per version, so no build lookup is needed.
pub struct PurpurResolver {
    client: reqwest::Client,
}

impl PurpurResolver {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Confirms the version exists before pointing at its `latest` download.
    pub async fn resolve(&self, ctx: &ResolveContext<'_>) -> SetupResult<ReleaseTarget> {
        validate_game_version(ctx.game_version)?;
        let version_url = format!("{}/purpur/{}", ctx.endpoints.purpur_api, ctx.game_version);
        let response = self.client.get(&version_url).send().await?;
        check_status(response, &version_url)?;
        debug!("Purpur {} exists", ctx.game_version);

        Ok(ReleaseTarget {
            software: Software::Purpur,
            game_version: ctx.game_version.to_string(),
            download_url: format!("{version_url}/latest/download"),
            artifact_file_name: Software::Purpur.artifact_file_name().to_string(),
        })
    }
}

#[async_trait]
impl ReleaseResolver for PurpurResolver {
    async fn install(&self, ctx: ResolveContext<'_>) -> SetupResult<InstalledArtifact> {
        let target = self.resolve(&ctx).await?;
        info!("Downloading Purpur {} from {}", target.game_version, target.download_url);

        let request = DownloadRequest::new(ctx.server_dir, target.download_url.as_str())
            .with_file_name(target.artifact_file_name.as_str());
        let done = ctx.downloader.fetch(&request, ctx.events).await?;

        Ok(InstalledArtifact {
            software: Software::Purpur,
            game_version: target.game_version,
            path: done.path,
            source_url: Some(target.download_url),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::resolvers::context::fixture::Fixture;
    use crate::core::resolvers::{install_release, InstallOutcome};

    #[tokio::test]
    async fn downloads_latest_alias_after_existence_check() {
        let mut server = mockito::Server::new_async().await;
        let exists = server
            .mock("GET", "/purpur-api/v2/purpur/1.21.4")
            .with_status(200)
            .with_body(r#"{"project":"purpur","version":"1.21.4"}"#)
            .create_async()
            .await;
        let jar = server
            .mock("GET", "/purpur-api/v2/purpur/1.21.4/latest/download")
            .with_status(200)
            .with_body("purpur jar")
            .create_async()
            .await;

        let mut fixture = Fixture::new(&server.url());
        let outcome = install_release(Software::Purpur, fixture.context("1.21.4")).await;

        exists.assert_async().await;
        jar.assert_async().await;
        let path = fixture.dir.path().join("server.jar");
        assert_eq!(outcome.artifact().map(|a| a.path.clone()), Some(path.clone()));
        assert_eq!(std::fs::read(path).unwrap(), b"purpur jar");
        assert!(fixture.errors().is_empty());
    }

    #[tokio::test]
    async fn missing_version_stops_before_download() {
        let mut server = mockito::Server::new_async().await;
        let _exists = server
            .mock("GET", "/purpur-api/v2/purpur/0.0.1")
            .with_status(404)
            .create_async()
            .await;
        let jar = server
            .mock("GET", "/purpur-api/v2/purpur/0.0.1/latest/download")
            .expect(0)
            .create_async()
            .await;

        let mut fixture = Fixture::new(&server.url());
        let outcome = install_release(Software::Purpur, fixture.context("0.0.1")).await;

        jar.assert_async().await;
        assert!(matches!(outcome, InstallOutcome::Failed { .. }));
        let errors = fixture.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Purpur setup failed: HTTP error 404"));
    }
}
