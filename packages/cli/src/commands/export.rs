use crate::commands::{read_payload, resolve_path};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use cyclenotes_compiler_html::AttributionSummary;
use cyclenotes_editor::{display, DisplayState};
use std::fs;

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Stored note payload (`-` for stdin)
    pub input: String,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub out: Option<String>,

    /// Pretty-print the HTML (overrides config)
    #[arg(long)]
    pub pretty: bool,
}

pub fn export(args: ExportArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let raw = read_payload(&args.input, cwd)?;

    let mut options = config.viewer_options();
    options.export.pretty |= args.pretty;

    match display(&raw, &options) {
        DisplayState::Empty { message } => {
            println!("{}", message.dimmed());
        }
        DisplayState::Static(export) => {
            match &args.out {
                Some(out) => {
                    let out_path = resolve_path(out, cwd);
                    fs::write(&out_path, &export.html)?;
                    eprintln!("  {} {} → {}", "✓".green(), args.input, out_path.display());
                }
                None => println!("{}", export.html),
            }
            print_attributions(&export.attributions_summary);
        }
        DisplayState::Fallback {
            notice,
            document,
            attributions_summary,
            ..
        } => {
            eprintln!("{} {}", "⚠️".yellow(), notice.yellow());
            println!("{}", document.text_content());
            print_attributions(&attributions_summary);
        }
    }

    Ok(())
}

fn print_attributions(summary: &[AttributionSummary]) {
    if summary.is_empty() {
        return;
    }
    eprintln!();
    eprintln!("{}", "Attribution".bright_blue().bold());
    for entry in summary {
        match &entry.at {
            Some(at) => eprintln!("  {} {} {}", entry.key.dimmed(), entry.name, at.dimmed()),
            None => eprintln!("  {} {}", entry.key.dimmed(), entry.name),
        }
    }
}
