use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ledgerlens_core::PipelineConfig;
use ledgerlens_ingest::ParserRegistry;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ledgerlens", version, about = "Statement format detection and extraction")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a decoded statement text file and print the canonical record as JSON
    Parse {
        /// Path to the statement text file
        file: PathBuf,
    },

    /// Print which custodian parser claims a statement text file
    Detect {
        /// Path to the statement text file
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let registry = ParserRegistry::with_default_parsers(PipelineConfig::default());

    match cli.command {
        Command::Parse { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let stmt = registry.detect_and_parse(&text);
            println!("{}", serde_json::to_string_pretty(&stmt)?);
        }
        Command::Detect { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let stmt = registry.detect_and_parse(&text);
            println!("{}", stmt.custodian);
        }
    }

    Ok(())
}
