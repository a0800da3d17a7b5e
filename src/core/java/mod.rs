pub mod paths;
pub mod runtime;

pub use runtime::required_java_for_minecraft_version;
pub use runtime::select_runtime;
pub use runtime::JavaInstallation;
pub use runtime::JavaLocator;
