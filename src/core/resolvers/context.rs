use std::path::Path;

use reqwest::Client;

use crate::core::config::Endpoints;
use crate::core::downloader::Downloader;
use crate::core::events::EventSink;
use crate::core::java::JavaLocator;

/// Everything a resolver needs for one install.
///
/// Borrowed from long-lived services; cheap to copy.
#[derive(Clone, Copy)]
pub struct ResolveContext<'a> {
    pub game_version: &'a str,
    pub server_dir: &'a Path,
    pub downloader: &'a Downloader,
    pub http_client: &'a Client,
    pub endpoints: &'a Endpoints,
    pub java: &'a JavaLocator,
    /// Program probed with `--version` before a source build.
    pub build_tool_program: &'a str,
    pub events: &'a EventSink,
}

#[cfg(test)]
pub(crate) mod fixture {
    use tokio::sync::mpsc::UnboundedReceiver;

    use super::*;
    use crate::core::config::SetupConfig;
    use crate::core::events::SetupEvent;

    /// Owns the services a `ResolveContext` borrows.
    pub(crate) struct Fixture {
        pub dir: tempfile::TempDir,
        pub client: Client,
        pub endpoints: Endpoints,
        pub downloader: Downloader,
        pub java: JavaLocator,
        pub build_tool_program: String,
        pub events: EventSink,
        pub rx: UnboundedReceiver<SetupEvent>,
    }

    impl Fixture {
        pub fn new(base_url: &str) -> Self {
            let client = Client::new();
            let config = SetupConfig::default()
                .with_endpoints(Endpoints::with_base(base_url))
                .with_retry_delay(std::time::Duration::from_millis(1));
            let (events, rx) = EventSink::channel();
            Self {
                dir: tempfile::tempdir().unwrap(),
                downloader: Downloader::new(client.clone(), &config),
                client,
                endpoints: config.endpoints,
                java: JavaLocator::new(Vec::new(), Vec::new()),
                build_tool_program: config.build_tool_program,
                events,
                rx,
            }
        }

        pub fn context<'a>(&'a self, game_version: &'a str) -> ResolveContext<'a> {
            ResolveContext {
                game_version,
                server_dir: self.dir.path(),
                downloader: &self.downloader,
                http_client: &self.client,
                endpoints: &self.endpoints,
                java: &self.java,
                build_tool_program: &self.build_tool_program,
                events: &self.events,
            }
        }

        pub fn errors(&mut self) -> Vec<String> {
            crate::core::events::drain(&mut self.rx)
                .into_iter()
                .filter_map(|event| match event {
                    SetupEvent::Error(message) => Some(message),
                    SetupEvent::Progress(_) => None,
                })
                .collect()
        }
    }
}
