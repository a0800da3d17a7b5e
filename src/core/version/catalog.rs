use reqwest::Client;
use tracing::{info, warn};

use crate::core::config::Endpoints;
use crate::core::error::SetupResult;
use crate::core::http::get_json;
use crate::core::software::Software;

use super::manifest::{PaperProjectResponse, PurpurProjectResponse};

/// BuildTools revisions; Spigot publishes no version API.
pub const SPIGOT_VERSIONS: &[&str] = &[
    "1.21.5", "1.21.4", "1.21.3", "1.21.1", "1.20.6", "1.20.4", "1.20.2", "1.20.1", "1.19.4",
    "1.19.3", "1.19.2", "1.19.1", "1.19", "1.18.2", "1.18.1", "1.18", "1.17.1", "1.17", "1.16.5",
    "1.16.4", "1.16.3", "1.16.2", "1.16.1", "1.15.1", "1.15", "1.14.4", "1.14.3", "1.14.2",
    "1.14.1", "1.14", "1.13.2", "1.13.1", "1.13", "1.12.2", "1.12.1", "1.12", "1.11.2", "1.11.1",
    "1.11", "1.10.2", "1.9.4", "1.9.2", "1.9", "1.8.8", "1.8.3", "1.8",
];

/// Lists the game versions each distribution publishes.
#[derive(Debug, Clone)]
pub struct VersionCatalog {
    client: Client,
    endpoints: Endpoints,
}

impl VersionCatalog {
    pub fn new(client: Client, endpoints: Endpoints) -> Self {
        Self { client, endpoints }
    }

    /// Versions in the order the distribution lists them.
    ///
    /// Network and parse failures are logged and yield an empty list; callers
    /// fall back to free-text input.
    pub async fn list_versions(&self, software: Software) -> Vec<String> {
        match self.fetch_versions(software).await {
            Ok(versions) => {
                info!("Loaded {} {} versions", versions.len(), software);
                versions
            }
            Err(err) => {
                warn!("Could not list {} versions: {}", software, err);
                Vec::new()
            }
        }
    }

    async fn fetch_versions(&self, software: Software) -> SetupResult<Vec<String>> {
        match software {
            Software::Spigot => Ok(SPIGOT_VERSIONS.iter().map(|v| v.to_string()).collect()),
            Software::Paper | Software::Velocity => {
                let url = format!(
                    "{}/projects/{}",
                    self.endpoints.paper_api,
                    software.name().to_ascii_lowercase()
                );
                let project: PaperProjectResponse = get_json(&self.client, &url).await?;
                Ok(project.versions)
            }
            Software::Purpur => {
                let url = format!("{}/purpur", self.endpoints.purpur_api);
                let project: PurpurProjectResponse = get_json(&self.client, &url).await?;
                Ok(project.versions)
            }
        }
    }
}
