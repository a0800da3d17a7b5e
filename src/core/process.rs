// ─── Process Spawning ───
// Child processes for the build tool and Java probes. The exit code is the
// only success signal.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tracing::{debug, info};

use crate::core::error::{SetupError, SetupResult};

#[derive(Debug, Clone)]
pub struct ProcessSpec {
    program: OsString,
    args: Vec<OsString>,
    working_dir: Option<PathBuf>,
    inherit_io: bool,
}

impl ProcessSpec {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
            working_dir: None,
            inherit_io: false,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.working_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Share the parent's stdin/stdout/stderr so the user sees native output.
    pub fn inherit_io(mut self, inherit: bool) -> Self {
        self.inherit_io = inherit;
        self
    }

    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().to_string()
    }

    /// Spawn, wait, and return the exit code (`-1` when killed by a signal).
    pub async fn status(&self) -> SetupResult<i32> {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        if self.inherit_io {
            cmd.stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit());
        } else {
            cmd.stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null());
        }

        if self.inherit_io {
            info!("Running: {}", format_command_for_logs(self));
        } else {
            debug!("Running: {}", format_command_for_logs(self));
        }

        let status = cmd.status().await.map_err(|source| SetupError::Io {
            path: PathBuf::from(&self.program),
            source,
        })?;
        Ok(status.code().unwrap_or(-1))
    }

    /// Like `status`, but a non-zero exit code is an error.
    pub async fn run(&self) -> SetupResult<()> {
        match self.status().await? {
            0 => Ok(()),
            code => Err(SetupError::Subprocess {
                program: self.program_name(),
                code,
            }),
        }
    }

    /// Whether the program can be started and exits successfully.
    pub async fn succeeds(&self) -> bool {
        matches!(self.status().await, Ok(0))
    }
}

fn format_command_for_logs(command: &ProcessSpec) -> String {
    let mut parts = vec![shell_escape(&command.program.to_string_lossy())];
    parts.extend(command.args.iter().map(|a| shell_escape(&a.to_string_lossy())));
    parts.join(" ")
}

fn shell_escape(raw: &str) -> String {
    if raw.is_empty() {
        return "\"\"".to_string();
    }

    if raw.chars().all(|ch| {
        ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.' | '/' | ':' | '\\' | '=')
    }) {
        return raw.to_string();
    }

    format!("\"{}\"", raw.replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_quotes_spaces() {
        let command = ProcessSpec::new("java")
            .args(["-jar", "BuildTools.jar", "--rev", "1.20.4"])
            .arg("my dir");
        assert_eq!(
            format_command_for_logs(&command),
            "java -jar BuildTools.jar --rev 1.20.4 \"my dir\""
        );
    }

    #[tokio::test]
    async fn missing_program_is_an_io_error() {
        let command = ProcessSpec::new("definitely-not-a-real-program-7f3a").arg("--version");
        assert!(matches!(command.status().await, Err(SetupError::Io { .. })));
        assert!(!command.succeeds().await);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn exit_code_is_reported() {
        let ok = ProcessSpec::new("sh").args(["-c", "exit 0"]);
        assert!(ok.succeeds().await);

        let failing = ProcessSpec::new("sh").args(["-c", "exit 3"]);
        match failing.run().await {
            Err(SetupError::Subprocess { program, code }) => {
                assert_eq!(program, "sh");
                assert_eq!(code, 3);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn runs_in_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        ProcessSpec::new("sh")
            .args(["-c", "echo built > out.txt"])
            .current_dir(dir.path())
            .run()
            .await
            .unwrap();
        assert_eq!(
            std::fs::read_to_string(dir.path().join("out.txt")).unwrap().trim(),
            "built"
        );
    }
}
