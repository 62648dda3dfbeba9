mod commands;
mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{apply, compile, inspect, ApplyArgs, CompileArgs, InspectArgs};
use config::Config;
use tracing_subscriber::EnvFilter;

/// Vellum CLI - apply patches to, compile and inspect design documents
#[derive(Parser, Debug)]
#[command(name = "vellum")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply a patch file to a document as one atomic batch
    Apply(ApplyArgs),

    /// Expand and compile one frame to a render tree
    Compile(CompileArgs),

    /// Summarize a document and report structural problems
    Inspect(InspectArgs),
}

fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("Cannot get current directory")?;
    let config = Config::load(&cwd)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Apply(args) => apply(args, &cwd, &config),
        Command::Compile(args) => compile(args, &cwd, &config),
        Command::Inspect(args) => inspect(args),
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
