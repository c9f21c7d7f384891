//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// File-system routed web engine with hot reload
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: kettle.toml)
    #[arg(short = 'C', long, default_value = "kettle.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Serve the project, hot reloading in development
    #[command(visible_alias = "s")]
    Serve {
        /// Project root (default: directory holding the config file, else cwd)
        #[arg(value_hint = clap::ValueHint::DirPath)]
        root: Option<PathBuf>,

        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<std::net::IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Production mode: no hot reload, exit on any source change
        #[arg(long, env = "KETTLE_PRODUCTION")]
        production: bool,
    },

    /// Print the route table derived from the source tree
    #[command(visible_alias = "r")]
    Routes {
        /// Project root (default: directory holding the config file, else cwd)
        #[arg(value_hint = clap::ValueHint::DirPath)]
        root: Option<PathBuf>,
    },
}

impl Cli {
    /// Project root given on the command line, if any.
    pub fn root(&self) -> Option<&Path> {
        match &self.command {
            Commands::Serve { root, .. } | Commands::Routes { root } => root.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from(["kettle", "serve", "app", "-p", "8080", "--production"]).unwrap();
        assert_eq!(cli.root(), Some(Path::new("app")));
        match cli.command {
            Commands::Serve {
                port, production, ..
            } => {
                assert_eq!(port, Some(8080));
                assert!(production);
            }
            Commands::Routes { .. } => panic!("expected serve"),
        }
    }

    #[test]
    fn test_parse_routes_alias() {
        let cli = Cli::try_parse_from(["kettle", "r", "-v"]).unwrap();
        assert!(matches!(cli.command, Commands::Routes { .. }));
        assert!(cli.verbose);
        assert_eq!(cli.root(), None);
        assert_eq!(cli.config, PathBuf::from("kettle.toml"));
    }
}
