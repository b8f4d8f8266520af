//! CLI entry point for the inventory agent.

pub mod repl;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{AppConfig, Backend};

/// Inventory Agent CLI
#[derive(Parser, Debug)]
#[command(
    name = "inventory-agent",
    version,
    about = "Ask questions about a facility inventory"
)]
pub struct Cli {
    /// Inventory CSV file (overrides INVENTORY_CSV_PATH)
    #[arg(long, global = true)]
    pub inventory: Option<PathBuf>,

    /// Completion backend: openai or local (overrides INVENTORY_BACKEND)
    #[arg(long, global = true)]
    pub backend: Option<Backend>,

    /// Model id for the openai backend (overrides INVENTORY_MODEL)
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Directory export files are written to
    #[arg(long, global = true)]
    pub export_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer a single question
    Ask(AskArgs),
    /// Interactive session (:history, :samples, :quit)
    Chat,
    /// Write the full inventory as CSV
    Export(ExportArgs),
    /// List sample questions
    Samples,
}

/// Arguments for `inventory-agent ask`.
#[derive(Parser, Debug)]
pub struct AskArgs {
    /// The question, words are joined with spaces
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,
}

impl AskArgs {
    pub fn query(&self) -> String {
        self.query.join(" ")
    }
}

/// Arguments for `inventory-agent export`.
#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Output directory (defaults to --export-dir)
    #[arg(long)]
    pub out: Option<PathBuf>,
}

impl Cli {
    /// Parse CLI arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Apply flag overrides on top of an environment-derived config.
    pub fn apply_to(&self, config: &mut AppConfig) {
        if let Some(path) = &self.inventory {
            config.inventory_path = path.clone();
        }
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(dir) = &self.export_dir {
            config.export_dir = dir.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_ask_joins_words() {
        let cli = Cli::try_parse_from(["inventory-agent", "ask", "items", "in", "hallway"]).unwrap();
        match cli.command {
            Commands::Ask(args) => assert_eq!(args.query(), "items in hallway"),
            other => panic!("expected Ask, got {other:?}"),
        }
    }

    #[test]
    fn parse_ask_requires_query() {
        assert!(Cli::try_parse_from(["inventory-agent", "ask"]).is_err());
    }

    #[test]
    fn parse_chat_with_global_flags() {
        let cli = Cli::try_parse_from([
            "inventory-agent",
            "chat",
            "--backend",
            "local",
            "--inventory",
            "stock.csv",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Chat));
        assert_eq!(cli.backend, Some(Backend::Local));
        assert_eq!(cli.inventory, Some(PathBuf::from("stock.csv")));
    }

    #[test]
    fn parse_export_with_out_dir() {
        let cli = Cli::try_parse_from(["inventory-agent", "export", "--out", "/tmp/out"]).unwrap();
        match cli.command {
            Commands::Export(args) => assert_eq!(args.out, Some(PathBuf::from("/tmp/out"))),
            other => panic!("expected Export, got {other:?}"),
        }
    }

    #[test]
    fn parse_rejects_unknown_backend() {
        assert!(Cli::try_parse_from(["inventory-agent", "--backend", "mystery", "samples"]).is_err());
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::try_parse_from(["inventory-agent", "--model", "gpt-4o-mini", "samples"]).unwrap();
        let mut config = AppConfig::default();
        cli.apply_to(&mut config);
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.backend, Backend::OpenAi);
    }
}
