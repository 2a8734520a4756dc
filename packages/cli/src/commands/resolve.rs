use crate::commands::read_payload;
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use cyclenotes_document::{serialize, serialize_pretty};
use cyclenotes_editor::resolve as resolve_payload;

#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Stored note payload (`-` for stdin)
    pub input: String,

    /// Print only the canonical JSON
    #[arg(short, long)]
    pub quiet: bool,
}

pub fn resolve(args: ResolveArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let raw = read_payload(&args.input, cwd)?;

    let state = resolve_payload(&raw, &config.resolve_options());
    let json = if config.pretty {
        serialize_pretty(&state.document)?
    } else {
        serialize(&state.document)?
    };

    if !args.quiet {
        eprintln!(
            "{} {} ({} blocks)",
            "Resolved".bright_blue().bold(),
            state.source.to_string().bright_white(),
            state.document.len()
        );
    }
    println!("{}", json);

    Ok(())
}
