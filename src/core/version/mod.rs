pub mod catalog;
pub mod manifest;

pub use catalog::VersionCatalog;
pub use manifest::{PaperProjectResponse, PaperVersionResponse, PurpurProjectResponse};
