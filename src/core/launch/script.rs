use std::path::{Path, PathBuf};

use tracing::info;

use crate::core::error::{SetupError, SetupResult};
use crate::core::software::Software;

pub const EULA_FILE: &str = "eula.txt";

/// Aikar's G1 flags.
const SERVER_JVM_FLAGS: &[&str] = &[
    "--add-modules=jdk.incubator.vector",
    "-XX:+UseG1GC",
    "-XX:+ParallelRefProcEnabled",
    "-XX:MaxGCPauseMillis=200",
    "-XX:+UnlockExperimentalVMOptions",
    "-XX:+DisableExplicitGC",
    "-XX:+AlwaysPreTouch",
    "-XX:G1HeapWastePercent=5",
    "-XX:G1MixedGCCountTarget=4",
    "-XX:InitiatingHeapOccupancyPercent=15",
    "-XX:G1MixedGCLiveThresholdPercent=90",
    "-XX:G1RSetUpdatingPauseTimePercent=5",
    "-XX:SurvivorRatio=32",
    "-XX:+PerfDisableSharedMem",
    "-XX:MaxTenuringThreshold=1",
    "-Dusing.aikars.flags=https://mcflags.emc.gs",
    "-Daikars.new.flags=true",
    "-XX:G1NewSizePercent=30",
    "-XX:G1MaxNewSizePercent=40",
    "-XX:G1HeapRegionSize=8M",
    "-XX:G1ReservePercent=20",
];

const PROXY_JVM_FLAGS: &[&str] = &[
    "-XX:+UseG1GC",
    "-XX:G1HeapRegionSize=4M",
    "-XX:+UnlockExperimentalVMOptions",
    "-XX:+ParallelRefProcEnabled",
    "-XX:+AlwaysPreTouch",
    "-XX:MaxInlineLevel=15",
];

/// Writes `eula=true` unless the file already exists. Returns whether it wrote.
pub fn accept_eula(dir: &Path) -> SetupResult<bool> {
    std::fs::create_dir_all(dir).map_err(|e| SetupError::io(dir, e))?;
    let eula = dir.join(EULA_FILE);
    if eula.exists() {
        return Ok(false);
    }
    std::fs::write(&eula, "eula=true").map_err(|e| SetupError::io(&eula, e))?;
    info!("Accepted EULA in {:?}", eula);
    Ok(true)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchProfile {
    pub java_path: PathBuf,
    pub memory_gb: u32,
    pub gui: bool,
    pub software: Software,
}

impl LaunchProfile {
    pub fn memory_mb(&self) -> u32 {
        self.memory_gb.saturating_mul(1024)
    }

    /// The single command line every script runs.
    pub fn java_command(&self) -> String {
        let memory = self.memory_mb();
        let flags = if self.software.is_proxy() {
            PROXY_JVM_FLAGS
        } else {
            SERVER_JVM_FLAGS
        };

        let mut parts = vec![
            quote_if_needed(&self.java_path.to_string_lossy()),
            format!("-Xms{memory}M"),
            format!("-Xmx{memory}M"),
        ];
        parts.extend(flags.iter().map(|flag| flag.to_string()));
        parts.push("-jar".to_string());
        parts.push(self.software.artifact_file_name().to_string());
        if !self.gui {
            parts.push("--nogui".to_string());
        }
        parts.join(" ")
    }
}

fn quote_if_needed(raw: &str) -> String {
    if raw.chars().any(char::is_whitespace) {
        format!("\"{raw}\"")
    } else {
        raw.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    Batch,
    Shell,
    BatchAutostart,
    ShellAutostart,
}

impl ScriptKind {
    pub const ALL: [ScriptKind; 4] = [
        ScriptKind::BatchAutostart,
        ScriptKind::ShellAutostart,
        ScriptKind::Batch,
        ScriptKind::Shell,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            ScriptKind::Batch => "start.bat",
            ScriptKind::Shell => "start.sh",
            ScriptKind::BatchAutostart => "start-autostart.bat",
            ScriptKind::ShellAutostart => "start-autostart.sh",
        }
    }

    pub fn render(&self, command: &str) -> String {
        match self {
            ScriptKind::Batch => format!("@echo off\n{command}\npause"),
            ScriptKind::Shell => format!("#!/bin/bash\n{command}"),
            ScriptKind::BatchAutostart => format!(
                "@echo off\n:start\n{command}\necho Server restarting...\n\
                 echo Press CTRL + C to stop.\ngoto :start"
            ),
            ScriptKind::ShellAutostart => format!(
                "#!/bin/bash\nwhile true; do\n    {command}\n    \
                 echo \"Server restarting...\"\n    echo \"Press CTRL + C to stop.\"\ndone"
            ),
        }
    }
}

/// Writes all four launcher scripts into `dir`, replacing existing ones.
pub fn write_launch_scripts(dir: &Path, profile: &LaunchProfile) -> SetupResult<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).map_err(|e| SetupError::io(dir, e))?;
    let command = profile.java_command();

    let mut written = Vec::with_capacity(ScriptKind::ALL.len());
    for kind in ScriptKind::ALL {
        let path = dir.join(kind.file_name());
        std::fs::write(&path, kind.render(&command)).map_err(|e| SetupError::io(&path, e))?;
        mark_executable(&path)?;
        written.push(path);
    }

    info!("Wrote {} launch scripts to {:?}", written.len(), dir);
    Ok(written)
}

#[cfg(unix)]
fn mark_executable(path: &Path) -> SetupResult<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .map_err(|e| SetupError::io(path, e))
}

#[cfg(not(unix))]
fn mark_executable(_path: &Path) -> SetupResult<()> {
    Ok(())
}
