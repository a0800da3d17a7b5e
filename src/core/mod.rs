// ─── Minecraft Server Setup Core ───
// Acquires a server artifact and prepares the directory it runs from.
//
// Architecture:
//   core/
//     config       API endpoints, retry policy
//     downloader/  Atomic, retried, streamed downloads
//     events       Progress/error channel delivered on the caller's thread
//     java/        Java discovery and per-version selection
//     version/     Version catalogs for each distribution
//     resolvers/   Paper, Velocity, Purpur, Spigot (BuildTools)
//     launch/      EULA and launcher scripts
//     state/       Shared services (HTTP client, downloader, locator)

pub mod config;
pub mod downloader;
pub mod error;
pub mod events;
pub mod http;
pub mod java;
pub mod launch;
pub mod process;
pub mod resolvers;
pub mod software;
pub mod state;
pub mod version;
