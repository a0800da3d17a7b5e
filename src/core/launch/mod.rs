pub mod script;

pub use script::{accept_eula, write_launch_scripts, LaunchProfile, ScriptKind};
