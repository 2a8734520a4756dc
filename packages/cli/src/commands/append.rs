use crate::commands::{read_payload, resolve_path};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use cyclenotes_document::{Node, User};
use cyclenotes_editor::{resolve, AttributionTracker, EditSession, Mutation};
use std::fs;

#[derive(Debug, Args)]
pub struct AppendArgs {
    /// Stored note payload; rewritten as canonical JSON
    pub input: String,

    /// Paragraph text to append
    #[arg(short, long)]
    pub text: String,

    /// Editing user's display name
    #[arg(long)]
    pub user_name: String,

    /// Editing user's id
    #[arg(long, default_value = "")]
    pub user_id: String,
}

pub fn append(args: AppendArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let raw = read_payload(&args.input, cwd)?;
    let state = resolve(&raw, &config.resolve_options());

    let mut tracker = AttributionTracker::new(config.tracker_options());
    tracker.set_current_user(User::new(args.user_id.as_str(), args.user_name.as_str()));

    let mut saved = Vec::new();
    let mut session = EditSession::new(state.document, tracker, |json: String| saved.push(json));
    let index = session.document().len();
    session.apply(Mutation::InsertNode {
        parent: None,
        index,
        node: Node::paragraph(vec![Node::text(args.text.as_str())]),
    })?;
    let report = session.save()?;
    drop(session);

    for payload in &saved {
        fs::write(resolve_path(&args.input, cwd), payload)?;
    }

    println!(
        "  {} Saved {} (was {}, {} blocks stamped)",
        "✓".green(),
        args.input,
        state.source,
        report.stamps.stamped.len()
    );
    for failure in &report.stamps.failed {
        eprintln!("  {} {}", "⚠️".yellow(), failure);
    }

    Ok(())
}
