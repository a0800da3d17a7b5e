use std::str::FromStr;

use crate::core::error::{SetupError, SetupResult};

pub const SERVER_JAR: &str = "server.jar";
pub const PROXY_JAR: &str = "proxy.jar";

/// Supported server distributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Software {
    Paper,
    Spigot,
    Purpur,
    Velocity,
}

impl Software {
    pub const ALL: [Software; 4] = [
        Software::Paper,
        Software::Spigot,
        Software::Purpur,
        Software::Velocity,
    ];

    /// Display name, as offered in the selection menu.
    pub fn name(&self) -> &'static str {
        match self {
            Software::Paper => "Paper",
            Software::Spigot => "Spigot",
            Software::Purpur => "Purpur",
            Software::Velocity => "Velocity",
        }
    }

    pub fn is_proxy(&self) -> bool {
        matches!(self, Software::Velocity)
    }

    /// Canonical artifact name inside the server directory.
    pub fn artifact_file_name(&self) -> &'static str {
        if self.is_proxy() {
            PROXY_JAR
        } else {
            SERVER_JAR
        }
    }
}

impl std::fmt::Display for Software {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Software {
    type Err = SetupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Software::ALL
            .into_iter()
            .find(|software| software.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| SetupError::UnknownSoftware(wanted.to_string()))
    }
}

/// Accepts versions such as `1.20.4`, `1.21-pre1` or `3.4.0-SNAPSHOT`; anything
/// that could alter a URL path or query is rejected.
pub fn validate_game_version(version: &str) -> SetupResult<&str> {
    let valid = !version.is_empty()
        && !version.starts_with('.')
        && version
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '+'));
    if valid {
        Ok(version)
    } else {
        Err(SetupError::InvalidVersion(version.to_string()))
    }
}

/// A concrete artifact to fetch for a distribution and game version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTarget {
    pub software: Software,
    pub game_version: String,
    pub download_url: String,
    pub artifact_file_name: String,
}
