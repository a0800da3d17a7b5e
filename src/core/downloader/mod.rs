pub mod client;

pub use client::{CompletedDownload, DownloadOutcome, DownloadRequest, Downloader};
