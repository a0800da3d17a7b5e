// ─── Pipeline Configuration ───
// Public API locations and download policy. Defaults point at the real
// distribution APIs; environment variables let a test or mirror override them.

use std::time::Duration;

pub const PAPER_API_BASE: &str = "https://api.papermc.io/v2";
pub const PURPUR_API_BASE: &str = "https://api.purpurmc.org/v2";
pub const BUILD_TOOLS_URL: &str =
    "https://hub.spigotmc.org/jenkins/job/BuildTools/lastSuccessfulBuild/artifact/target/BuildTools.jar";

const ENV_PAPER_API: &str = "SERVER_SETUP_PAPER_API";
const ENV_PURPUR_API: &str = "SERVER_SETUP_PURPUR_API";
const ENV_BUILD_TOOLS_URL: &str = "SERVER_SETUP_BUILDTOOLS_URL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// PaperMC v2 API, serves both Paper and Velocity.
    pub paper_api: String,
    pub purpur_api: String,
    pub build_tools_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            paper_api: PAPER_API_BASE.to_string(),
            purpur_api: PURPUR_API_BASE.to_string(),
            build_tools_url: BUILD_TOOLS_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Endpoints for a single mock or mirror host serving every API.
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            paper_api: format!("{base}/v2"),
            purpur_api: format!("{base}/purpur-api/v2"),
            build_tools_url: format!("{base}/BuildTools.jar"),
        }
    }

    fn overlay_env(mut self) -> Self {
        if let Ok(value) = std::env::var(ENV_PAPER_API) {
            self.paper_api = value.trim_end_matches('/').to_string();
        }
        if let Ok(value) = std::env::var(ENV_PURPUR_API) {
            self.purpur_api = value.trim_end_matches('/').to_string();
        }
        if let Ok(value) = std::env::var(ENV_BUILD_TOOLS_URL) {
            self.build_tools_url = value;
        }
        self
    }
}

#[derive(Debug, Clone)]
pub struct SetupConfig {
    pub endpoints: Endpoints,
    /// Total download attempts, including the first one.
    pub max_attempts: u32,
    /// Backoff base between download attempts (`base * 2^n`).
    pub retry_delay: Duration,
    /// Program that must be installed before BuildTools can run.
    pub build_tool_program: String,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            max_attempts: 3,
            retry_delay: Duration::from_millis(500),
            build_tool_program: "git".to_string(),
        }
    }
}

impl SetupConfig {
    pub fn from_env() -> Self {
        Self {
            endpoints: Endpoints::default().overlay_env(),
            ..Self::default()
        }
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_public_apis() {
        let config = SetupConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.endpoints.paper_api, "https://api.papermc.io/v2");
        assert_eq!(config.endpoints.purpur_api, "https://api.purpurmc.org/v2");
        assert!(config.endpoints.build_tools_url.ends_with("/BuildTools.jar"));
        assert_eq!(config.build_tool_program, "git");
    }

    #[test]
    fn with_base_strips_trailing_slash() {
        let endpoints = Endpoints::with_base("http://127.0.0.1:1234/");
        assert_eq!(endpoints.paper_api, "http://127.0.0.1:1234/v2");
        assert_eq!(endpoints.purpur_api, "http://127.0.0.1:1234/purpur-api/v2");
        assert_eq!(endpoints.build_tools_url, "http://127.0.0.1:1234/BuildTools.jar");
    }
}
