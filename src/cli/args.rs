//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// stagehand build-and-launch sequencer CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: stagehand.toml)
    #[arg(short = 'C', long, default_value = "stagehand.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build both bundles once, without watching or launching
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Stage, build, watch, and launch the shell runtime
    #[command(visible_alias = "d")]
    Dev {
        #[command(flatten)]
        build_args: BuildArgs,

        /// Reload channel port
        #[arg(short, long)]
        port: Option<u16>,

        /// Enable file watching for auto-rebuild and hot reload
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        watch: Option<bool>,
    },
}

/// Shared build arguments for Build and Dev commands
#[derive(clap::Args, Debug, Clone)]
pub struct BuildArgs {
    /// Clean output directory completely before building
    #[arg(short, long)]
    pub clean: bool,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

#[allow(unused)]
impl Cli {
    pub const fn is_build(&self) -> bool {
        matches!(self.command, Commands::Build { .. })
    }
    pub const fn is_dev(&self) -> bool {
        matches!(self.command, Commands::Dev { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dev_defaults() {
        let cli = Cli::parse_from(["stagehand", "dev"]);
        assert!(cli.is_dev());
        assert_eq!(cli.config, PathBuf::from("stagehand.toml"));

        match cli.command {
            Commands::Dev { port, watch, .. } => {
                assert!(port.is_none());
                assert!(watch.is_none());
            }
            Commands::Build { .. } => panic!("expected dev"),
        }
    }

    #[test]
    fn test_dev_overrides() {
        let cli = Cli::parse_from(["stagehand", "dev", "--port", "5000", "--watch", "false"]);
        match cli.command {
            Commands::Dev { port, watch, .. } => {
                assert_eq!(port, Some(5000));
                assert_eq!(watch, Some(false));
            }
            Commands::Build { .. } => panic!("expected dev"),
        }
    }

    #[test]
    fn test_build_alias() {
        let cli = Cli::parse_from(["stagehand", "b", "--clean"]);
        match cli.command {
            Commands::Build { build_args } => assert!(build_args.clean),
            Commands::Dev { .. } => panic!("expected build"),
        }
    }
}
