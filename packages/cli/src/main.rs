mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    append, export, hydrate, init, resolve, AppendArgs, ExportArgs, HydrateArgs, InitArgs,
    ResolveArgs,
};
use tracing_subscriber::EnvFilter;

/// Cyclenotes CLI - attributed transaction notes
#[derive(Parser, Debug)]
#[command(name = "cyclenotes")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log recovery and export decisions
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default cyclenotes.config.json
    Init(InitArgs),

    /// Resolve a stored payload into canonical JSON
    Resolve(ResolveArgs),

    /// Export a stored note as static HTML
    Export(ExportArgs),

    /// Hydrate poll widgets in exported HTML
    Hydrate(HydrateArgs),

    /// Append an attributed paragraph and save the note
    Append(AppendArgs),
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir.display().to_string(),
        Err(err) => {
            eprintln!("{} Cannot get current directory: {}", "Error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Resolve(args) => resolve(args, &cwd),
        Command::Export(args) => export(args, &cwd),
        Command::Hydrate(args) => hydrate(args, &cwd),
        Command::Append(args) => append(args, &cwd),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
