use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::runtime::Runtime;
use tracing::info;

use crate::cli::StartArgs;
use crate::core::error::{SetupError, SetupResult};
use crate::core::events::{run_blocking, SetupObserver};
use crate::core::java::JavaInstallation;
use crate::core::launch::{accept_eula, write_launch_scripts, LaunchProfile};
use crate::core::resolvers::{install_release, InstallOutcome};
use crate::core::software::Software;
use crate::core::state::SetupState;
use crate::progress::ProgressReporter;
use crate::prompt::Prompt;

const DEFAULT_MEMORY_GB: u32 = 4;
const EULA_URL: &str = "https://aka.ms/MinecraftEULA";

// ─── Pipeline entry points ───

pub fn list_versions(runtime: &Runtime, state: &SetupState, software: Software) -> Vec<String> {
    runtime.block_on(state.catalog.list_versions(software))
}

pub fn locate_java(
    runtime: &Runtime,
    state: &SetupState,
    game_version: &str,
) -> SetupResult<JavaInstallation> {
    runtime.block_on(state.java.require_runtime(game_version))
}

/// Installs the artifact on the worker pool; `observer` is called on this thread.
pub fn install_software(
    runtime: &Runtime,
    state: &Arc<SetupState>,
    observer: &mut dyn SetupObserver,
    software: Software,
    game_version: &str,
    server_dir: &Path,
) -> SetupResult<InstallOutcome> {
    let state = Arc::clone(state);
    let game_version = game_version.to_string();
    let server_dir = server_dir.to_path_buf();
    run_blocking(runtime, observer, move |events| async move {
        let ctx = state.resolve_context(&game_version, &server_dir, &events);
        install_release(software, ctx).await
    })
}

/// EULA plus launcher scripts.
pub fn finish_server(server_dir: &Path, profile: &LaunchProfile) -> SetupResult<Vec<PathBuf>> {
    accept_eula(server_dir)?;
    write_launch_scripts(server_dir, profile)
}

// ─── CLI flows ───

pub fn run_versions(runtime: &Runtime, state: &SetupState, software: Software) -> SetupResult<bool> {
    let versions = list_versions(runtime, state, software);
    if versions.is_empty() {
        eprintln!("No {software} versions could be loaded.");
        return Ok(false);
    }
    for version in versions {
        println!("{version}");
    }
    Ok(true)
}

/// Interactive setup. `Ok(false)` means the flow stopped after telling the user why.
pub fn run_start(runtime: &Runtime, state: &Arc<SetupState>, args: StartArgs) -> SetupResult<bool> {
    let prompt = Prompt::new();
    if !prompt.is_interactive() {
        let missing = missing_flags(&args);
        if !missing.is_empty() {
            return Err(SetupError::Other(format!(
                "No interactive terminal; pass {}",
                missing.join(" ")
            )));
        }
    }

    let software = match args.software {
        Some(software) => software,
        None => {
            let names: Vec<String> = Software::ALL.iter().map(|s| s.to_string()).collect();
            prompt.select("Which server software?", &names, "software")?.parse()?
        }
    };
    prompt.chose(software.name())?;

    let game_version = match args.version {
        Some(version) => version,
        None => {
            let versions = list_versions(runtime, state, software);
            if versions.is_empty() {
                prompt.say("Could not load the version list; enter a version manually.")?;
            }
            prompt.select("Which version?", &versions, "version")?
        }
    };
    prompt.chose(&game_version)?;

    let accepted = match args.accept_eula {
        Some(accepted) => accepted,
        None => prompt.confirm(
            &format!("Do you accept the Minecraft EULA? ({EULA_URL})"),
            "accept-eula",
        )?,
    };
    if !accepted {
        prompt.say("You must accept the Minecraft EULA to use this software.")?;
        return Ok(false);
    }
    prompt.chose("Yes")?;

    let raw_path = match args.path {
        Some(path) => path,
        None => PathBuf::from(prompt.input("Where should the server be created?", "path")?),
    };
    let server_dir = absolute_server_dir(&raw_path)?;
    prompt.chose(&server_dir.display().to_string())?;

    let java = match locate_java(runtime, state, &game_version) {
        Ok(java) => java,
        Err(err @ SetupError::JavaNotFound(_)) => {
            prompt.say(&err.to_string())?;
            return Ok(false);
        }
        Err(err) => return Err(err),
    };
    prompt.say(&format!("Using Java {}", java.path.display()))?;

    let mut reporter = ProgressReporter::new();
    let outcome = install_software(
        runtime,
        state,
        &mut reporter,
        software,
        &game_version,
        &server_dir,
    )?;
    reporter.finish();
    let artifact = match outcome {
        InstallOutcome::Installed(artifact) => artifact,
        InstallOutcome::Failed { .. } => return Ok(false),
    };
    info!("Installed {:?}", artifact.path);

    let memory_gb = match args.memory {
        Some(memory) => memory,
        None => parse_memory(
            &prompt.input(
                "How much memory should the server have? (In GB, Default = 4)",
                "memory",
            )?,
        ),
    };
    let gui = match args.gui {
        Some(gui) => gui,
        None => prompt.confirm("Do you want to enable the server gui?", "gui")?,
    };

    let profile = LaunchProfile {
        java_path: java.path,
        memory_gb,
        gui,
        software,
    };
    finish_server(&server_dir, &profile)?;
    prompt.say(&format!(
        "{} {} is ready in {}",
        software,
        game_version,
        server_dir.display()
    ))?;
    Ok(true)
}

/// Flags that must be given when nobody can answer prompts.
fn missing_flags(args: &StartArgs) -> Vec<&'static str> {
    let answered = [
        ("--software", args.software.is_some()),
        ("--version", args.version.is_some()),
        ("--accept-eula", args.accept_eula.is_some()),
        ("--path", args.path.is_some()),
        ("--memory", args.memory.is_some()),
        ("--gui", args.gui.is_some()),
    ];
    answered
        .into_iter()
        .filter(|(_, given)| !given)
        .map(|(flag, _)| flag)
        .collect()
}

/// Blank means the current directory; relative paths are resolved against it.
fn absolute_server_dir(raw: &Path) -> SetupResult<PathBuf> {
    let cwd = std::env::current_dir()?;
    if raw.as_os_str().is_empty() {
        return Ok(cwd);
    }
    if raw.is_absolute() {
        Ok(raw.to_path_buf())
    } else {
        Ok(cwd.join(raw))
    }
}

fn parse_memory(answer: &str) -> u32 {
    answer
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|gb| *gb > 0)
        .unwrap_or(DEFAULT_MEMORY_GB)
}
