use std::path::Path;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::core::downloader::DownloadRequest;
use crate::core::error::{SetupError, SetupResult};
use crate::core::process::ProcessSpec;
use crate::core::software::{validate_game_version, Software};

use super::{context::ResolveContext, installer::InstalledArtifact, installer::ReleaseResolver};

pub const BUILD_TOOLS_JAR: &str = "BuildTools.jar";

/// Spigot is compiled locally with BuildTools.
#[derive(Debug, Default)]
pub struct SpigotResolver;

impl SpigotResolver {
    pub fn new() -> Self {
        Self
    }

    async fn ensure_build_tool(program: &str) -> SetupResult<()> {
        if ProcessSpec::new(program).arg("--version").succeeds().await {
            return Ok(());
        }
        Err(SetupError::ToolMissing(format!(
            "Git (`{program}`) is required to build Spigot but was not found. \
             Please install Git and try again."
        )))
    }

    async fn fetch_build_tools(ctx: &ResolveContext<'_>) -> SetupResult<()> {
        let request = DownloadRequest::new(ctx.server_dir, ctx.endpoints.build_tools_url.as_str())
            .with_file_name(BUILD_TOOLS_JAR);
        let done = ctx.downloader.fetch(&request, ctx.events).await?;
        if !done.path.is_file() {
            return Err(SetupError::Other(format!(
                "{BUILD_TOOLS_JAR} download failed: file not found"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ReleaseResolver for SpigotResolver {
    async fn install(&self, ctx: ResolveContext<'_>) -> SetupResult<InstalledArtifact> {
        validate_game_version(ctx.game_version)?;
        Self::ensure_build_tool(ctx.build_tool_program).await?;
        let java = ctx.java.require_runtime(ctx.game_version).await?;
        Self::fetch_build_tools(&ctx).await?;

        info!(
            "Building Spigot {} with Java {} ({:?})",
            ctx.game_version, java.major, java.path
        );
        ProcessSpec::new(&java.path)
            .args(["-jar", BUILD_TOOLS_JAR, "--rev", ctx.game_version])
            .current_dir(ctx.server_dir)
            .inherit_io(true)
            .run()
            .await
            .map_err(|err| match err {
                SetupError::Subprocess { code, .. } => SetupError::Subprocess {
                    program: "BuildTools".to_string(),
                    code,
                },
                other => other,
            })?;

        let output = ctx.server_dir.join(format!("spigot-{}.jar", ctx.game_version));
        if !output.is_file() {
            clean_directory(ctx.server_dir).await;
            return Err(SetupError::Other(format!(
                "Build failed: spigot-{}.jar was not generated",
                ctx.game_version
            )));
        }

        let final_path = ctx.server_dir.join(Software::Spigot.artifact_file_name());
        match tokio::fs::remove_file(&final_path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(SetupError::io(&final_path, e)),
        }
        // The built jar stays under its versioned name if this fails.
        tokio::fs::rename(&output, &final_path)
            .await
            .map_err(|e| SetupError::Finalization {
                path: final_path.clone(),
                reason: format!("could not rename {output:?}: {e}"),
            })?;

        Ok(InstalledArtifact {
            software: Software::Spigot,
            game_version: ctx.game_version.to_string(),
            path: final_path,
            source_url: None,
        })
    }
}

/// Best-effort removal of everything BuildTools left in `dir`.
async fn clean_directory(dir: &Path) {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Could not list {:?} for cleanup: {}", dir, e);
            return;
        }
    };
    while let Ok(Some(entry)) = entries.next_entry().await {
        let path = entry.path();
        let removed = match entry.file_type().await {
            Ok(kind) if kind.is_dir() => tokio::fs::remove_dir_all(&path).await,
            _ => tokio::fs::remove_file(&path).await,
        };
        if let Err(e) = removed {
            warn!("Could not remove {:?}: {}", path, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::java::JavaLocator;
    use crate::core::resolvers::context::fixture::Fixture;
    use crate::core::resolvers::{install_release, InstallOutcome};

    fn failure(outcome: InstallOutcome) -> String {
        match outcome {
            InstallOutcome::Failed { message } => message,
            InstallOutcome::Installed(artifact) => panic!("unexpected success: {artifact:?}"),
        }
    }

    #[tokio::test]
    async fn missing_build_tool_is_actionable() {
        let mut fixture = Fixture::new("http://127.0.0.1:9");
        fixture.build_tool_program = "server-setup-no-such-tool".to_string();

        let message = failure(install_release(Software::Spigot, fixture.context("1.20.4")).await);

        assert!(message.starts_with("Spigot setup failed: Git"));
        assert!(message.contains("Please install Git"));
        assert_eq!(fixture.errors(), vec![message]);
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        /// A `java` that reports version 17 and otherwise runs `body`
        /// with BuildTools' arguments (`-jar BuildTools.jar --rev <version>`).
        fn fake_jdk(body: &str) -> tempfile::TempDir {
            let root = tempfile::tempdir().unwrap();
            let bin = root.path().join("jdk-17").join("bin");
            std::fs::create_dir_all(&bin).unwrap();
            let exe = bin.join("java");
            std::fs::write(
                &exe,
                format!(
                    "#!/bin/sh\nif [ \"$1\" = \"-version\" ]; then\n  \
                     echo 'openjdk version \"17.0.8\"' >&2\n  exit 0\nfi\n{body}\n"
                ),
            )
            .unwrap();
            std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755)).unwrap();
            root
        }

        async fn build_tools_server() -> (mockito::ServerGuard, mockito::Mock) {
            let mut server = mockito::Server::new_async().await;
            let mock = server
                .mock("GET", "/BuildTools.jar")
                .with_status(200)
                .with_body("build tools")
                .create_async()
                .await;
            (server, mock)
        }

        fn fixture_with(server: &mockito::ServerGuard, jdk: &tempfile::TempDir) -> Fixture {
            let mut fixture = Fixture::new(&server.url());
            fixture.build_tool_program = "true".to_string();
            fixture.java = JavaLocator::new(vec![jdk.path().to_path_buf()], Vec::new());
            fixture
        }

        #[tokio::test]
        async fn builds_and_renames_to_server_jar() {
            let (server, build_tools) = build_tools_server().await;
            let jdk = fake_jdk("touch \"spigot-$4.jar\"");
            let mut fixture = fixture_with(&server, &jdk);
            std::fs::write(fixture.dir.path().join("server.jar"), "old build").unwrap();

            let outcome = install_release(Software::Spigot, fixture.context("1.20.4")).await;

            build_tools.assert_async().await;
            let artifact = outcome.artifact().expect("build should succeed");
            assert_eq!(artifact.path, fixture.dir.path().join("server.jar"));
            assert_eq!(artifact.source_url, None);
            assert_eq!(std::fs::read(&artifact.path).unwrap(), b"");
            assert!(!fixture.dir.path().join("spigot-1.20.4.jar").exists());
            assert!(fixture.dir.path().join(BUILD_TOOLS_JAR).is_file());
            assert!(fixture.errors().is_empty());
        }

        #[tokio::test]
        async fn non_zero_exit_is_reported() {
            let (server, _build_tools) = build_tools_server().await;
            let jdk = fake_jdk("exit 3");
            let mut fixture = fixture_with(&server, &jdk);

            let message =
                failure(install_release(Software::Spigot, fixture.context("1.20.4")).await);

            assert_eq!(
                message,
                "Spigot setup failed: BuildTools failed with exit code 3"
            );
            assert_eq!(fixture.errors().len(), 1);
        }

        #[tokio::test]
        async fn missing_output_cleans_working_directory() {
            let (server, _build_tools) = build_tools_server().await;
            let jdk = fake_jdk("mkdir -p work/decompile && touch work/decompile/x.java");
            let mut fixture = fixture_with(&server, &jdk);

            let message =
                failure(install_release(Software::Spigot, fixture.context("1.20.4")).await);

            assert!(message.contains("spigot-1.20.4.jar was not generated"));
            let leftovers = std::fs::read_dir(fixture.dir.path()).unwrap().count();
            assert_eq!(leftovers, 0);
            assert_eq!(fixture.errors().len(), 1);
        }

        #[tokio::test]
        async fn no_java_names_required_version() {
            let mut server = mockito::Server::new_async().await;
            let build_tools = server
                .mock("GET", "/BuildTools.jar")
                .expect(0)
                .create_async()
                .await;
            let mut fixture = Fixture::new(&server.url());
            fixture.build_tool_program = "true".to_string();

            let message =
                failure(install_release(Software::Spigot, fixture.context("1.21")).await);

            assert!(message.contains("Required Java 21 not found"));
            build_tools.assert_async().await;
            assert_eq!(fixture.errors().len(), 1);
        }
    }
}
