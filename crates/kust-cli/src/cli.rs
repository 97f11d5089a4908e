//! CLI argument parsing using clap derive

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// kust - Compose Kubernetes manifests from bases and overlays
#[derive(Parser, Debug)]
#[command(name = "kust")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Print the resources described by a kustomization
    ///
    /// PATH is a directory holding kustomization.yaml (or a remote git
    /// location such as github.com/org/repo//overlays/prod?ref=v1).
    ///
    /// Examples:
    ///   kust build                          # Build the current directory
    ///   kust build overlays/prod -o out.yaml
    ///   kust build -t configs/ overlays/dev # Custom transformer rules
    Build {
        /// Kustomization directory or remote location
        paths: Vec<String>,

        /// Write the result to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Transformer config files, as a directory or comma-separated list
        #[arg(short = 't', long = "transformer-config", env = "KUST_TRANSFORMER_CONFIG")]
        transformer_config: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_build_defaults() {
        let cli = Cli::parse_from(["kust", "build"]);
        assert!(!cli.verbose);
        assert_eq!(
            cli.command,
            Commands::Build {
                paths: vec![],
                output: None,
                transformer_config: None,
            }
        );
    }

    #[test]
    fn parse_build_with_options() {
        let cli = Cli::parse_from([
            "kust",
            "build",
            "overlays/prod",
            "-o",
            "out.yaml",
            "--transformer-config",
            "a.yaml,b.yaml",
            "--verbose",
        ]);
        assert!(cli.verbose);
        assert_eq!(
            cli.command,
            Commands::Build {
                paths: vec!["overlays/prod".to_string()],
                output: Some(PathBuf::from("out.yaml")),
                transformer_config: Some("a.yaml,b.yaml".to_string()),
            }
        );
    }

    #[test]
    fn parse_build_accepts_several_paths() {
        let cli = Cli::parse_from(["kust", "build", "a", "b"]);
        let Commands::Build { paths, .. } = cli.command;
        assert_eq!(paths, vec!["a", "b"]);
    }

    #[test]
    fn missing_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["kust"]).is_err());
    }
}
