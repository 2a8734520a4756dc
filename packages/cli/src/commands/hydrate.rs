use crate::commands::{read_payload, resolve_path};
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use cyclenotes_compiler_html::{parse_fragment, print_html, Hydrator, PrintOptions};
use std::fs;

#[derive(Debug, Args)]
pub struct HydrateArgs {
    /// Exported note HTML (`-` for stdin)
    pub input: String,

    /// Voter identity used for rendering and votes
    #[arg(long, default_value = "")]
    pub voter: String,

    /// Toggle a vote, as WIDGET:OPTION_UID
    #[arg(long)]
    pub vote: Vec<String>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub out: Option<String>,
}

pub fn hydrate(args: HydrateArgs, cwd: &str) -> Result<()> {
    let html = read_payload(&args.input, cwd)?;
    let mut nodes = parse_fragment(&html);

    let mut hydrator = Hydrator::with_voter(args.voter.clone());
    let report = hydrator.hydrate(&mut nodes);

    eprintln!(
        "{} {} polls ({} already hydrated)",
        "Hydrated".bright_blue().bold(),
        report.mounted.len(),
        report.skipped
    );
    for failure in &report.failed {
        eprintln!("  {} {}", "✗".red(), failure.to_string().red());
    }

    for vote in &args.vote {
        let (widget_id, option_uid) = parse_vote(vote)?;
        let voted = hydrator.toggle_vote(&mut nodes, widget_id, option_uid, &args.voter)?;
        let verb = if voted { "Voted" } else { "Unvoted" };
        eprintln!("  {} {} {}", "✓".green(), verb, option_uid);
    }

    let output = print_html(&nodes, &PrintOptions::default());
    match &args.out {
        Some(out) => fs::write(resolve_path(out, cwd), output)?,
        None => println!("{}", output),
    }

    Ok(())
}

fn parse_vote(raw: &str) -> Result<(usize, &str)> {
    let (widget, option) = raw
        .split_once(':')
        .ok_or_else(|| anyhow!("Invalid vote '{}'. Use WIDGET:OPTION_UID", raw))?;
    let widget_id = widget
        .parse()
        .map_err(|_| anyhow!("Invalid widget id '{}'", widget))?;
    Ok((widget_id, option))
}
