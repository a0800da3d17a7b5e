use std::path::Path;
use std::sync::Arc;

use reqwest::Client;

use crate::core::config::SetupConfig;
use crate::core::downloader::Downloader;
use crate::core::error::SetupResult;
use crate::core::events::EventSink;
use crate::core::http::build_http_client;
use crate::core::java::JavaLocator;
use crate::core::resolvers::ResolveContext;
use crate::core::version::VersionCatalog;

/// Long-lived services shared by every command.
///
/// The HTTP client is built once here and handed to each component.
pub struct SetupState {
    pub config: SetupConfig,
    pub http_client: Client,
    pub downloader: Arc<Downloader>,
    pub catalog: VersionCatalog,
    pub java: JavaLocator,
}

impl SetupState {
    pub fn new(config: SetupConfig) -> SetupResult<Self> {
        let http_client = build_http_client()?;
        Ok(Self::with_client(config, http_client, JavaLocator::from_env()))
    }

    pub fn with_client(config: SetupConfig, http_client: Client, java: JavaLocator) -> Self {
        let downloader = Arc::new(Downloader::new(http_client.clone(), &config));
        let catalog = VersionCatalog::new(http_client.clone(), config.endpoints.clone());
        Self {
            config,
            http_client,
            downloader,
            catalog,
            java,
        }
    }

    pub fn resolve_context<'a>(
        &'a self,
        game_version: &'a str,
        server_dir: &'a Path,
        events: &'a EventSink,
    ) -> ResolveContext<'a> {
        ResolveContext {
            game_version,
            server_dir,
            downloader: &self.downloader,
            http_client: &self.http_client,
            endpoints: &self.config.endpoints,
            java: &self.java,
            build_tool_program: &self.config.build_tool_program,
            events,
        }
    }
}
