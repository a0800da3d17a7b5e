// ─── Distribution Manifests ───
// Response bodies of the PaperMC and PurpurMC v2 APIs. Only the fields we use
// are declared; everything else in the payload is ignored.

use serde::Deserialize;

/// `GET /v2/projects/{project}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaperProjectResponse {
    #[serde(default)]
    pub versions: Vec<String>,
}

/// `GET /v2/projects/{project}/versions/{version}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaperVersionResponse {
    #[serde(default)]
    pub builds: Vec<u32>,
}

impl PaperVersionResponse {
    /// Highest build number, or 1 when the version has no builds listed.
    pub fn latest_build(&self) -> u32 {
        self.builds.iter().copied().max().unwrap_or(1)
    }
}

/// `GET /v2/purpur`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PurpurProjectResponse {
    #[serde(default)]
    pub versions: Vec<String>,
}
