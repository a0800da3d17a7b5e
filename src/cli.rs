use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::core::software::Software;

#[derive(Debug, Parser)]
#[command(
    name = "server-setup",
    version,
    about = "A simple tool to setup a Minecraft Server"
)]
pub struct Cli {
    /// Defaults to `start` when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the versions a distribution publishes
    Versions {
        /// Paper, Spigot, Purpur or Velocity
        software: Software,
    },
    /// Setup a Minecraft Server
    Start(StartArgs),
}

#[derive(Debug, Default, Args)]
pub struct StartArgs {
    /// The server software (Paper, Spigot, Purpur, Velocity)
    #[arg(long)]
    pub software: Option<Software>,

    /// The game version
    #[arg(long)]
    pub version: Option<String>,

    /// Accepts the Minecraft EULA
    #[arg(long, action = ArgAction::Set)]
    pub accept_eula: Option<bool>,

    /// Where the server should be created
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Heap size in GB
    #[arg(long)]
    pub memory: Option<u32>,

    /// Enable the server GUI
    #[arg(long, action = ArgAction::Set)]
    pub gui: Option<bool>,
}

impl Cli {
    pub fn into_command(self) -> Command {
        self.command
            .unwrap_or_else(|| Command::Start(StartArgs::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_starts_interactively() {
        let cli = Cli::try_parse_from(["server-setup"]).unwrap();
        let Command::Start(args) = cli.into_command() else {
            panic!("expected start");
        };
        assert!(args.software.is_none());
        assert!(args.accept_eula.is_none());
    }

    #[test]
    fn start_flags_are_parsed() {
        let cli = Cli::try_parse_from([
            "server-setup",
            "start",
            "--software",
            "velocity",
            "--version",
            "3.4.0-SNAPSHOT",
            "--accept-eula",
            "true",
            "--path",
            "servers/proxy",
            "--memory",
            "2",
            "--gui",
            "false",
        ])
        .unwrap();

        let Command::Start(args) = cli.into_command() else {
            panic!("expected start");
        };
        assert_eq!(args.software, Some(Software::Velocity));
        assert_eq!(args.version.as_deref(), Some("3.4.0-SNAPSHOT"));
        assert_eq!(args.accept_eula, Some(true));
        assert_eq!(args.path, Some(PathBuf::from("servers/proxy")));
        assert_eq!(args.memory, Some(2));
        assert_eq!(args.gui, Some(false));
    }

    #[test]
    fn versions_takes_a_distribution() {
        let cli = Cli::try_parse_from(["server-setup", "versions", "PURPUR"]).unwrap();
        assert!(matches!(
            cli.into_command(),
            Command::Versions {
                software: Software::Purpur
            }
        ));
        assert!(Cli::try_parse_from(["server-setup", "versions", "forge"]).is_err());
    }
}
