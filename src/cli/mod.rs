pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bootcamp")]
#[command(about = "Bootcamp API administration - migrations and seed data")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply pending database migrations")]
    Migrate,

    #[command(about = "Load users, bootcamps and courses from JSON files")]
    Seed {
        #[arg(help = "Directory holding users.json, bootcamps.json and courses.json")]
        dir: PathBuf,
    },

    #[command(about = "Delete every course, bootcamp and user")]
    Purge {
        #[arg(long, help = "Required confirmation flag")]
        yes: bool,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Migrate => commands::migrate::handle(output_format).await,
        Commands::Seed { dir } => commands::seed::handle(dir, output_format).await,
        Commands::Purge { yes } => commands::seed::purge(yes, output_format).await,
    }
}
