use cyclenotes_compiler_html::ExportOptions;
use cyclenotes_editor::{ResolveOptions, TrackerOptions, ViewerOptions};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "cyclenotes.config.json";

/// Cyclenotes configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Stylesheet linked from exported HTML
    pub stylesheet_href: String,

    /// Base path for hashtag links
    pub tag_base_path: String,

    /// Heading of the template used for unrecoverable HTML
    pub template_heading: String,

    /// Shown when a note has no content
    pub empty_message: String,

    /// Append "Last edited by: NAME" runs when saving
    pub inline_attribution_marker: bool,

    /// Pretty-print exported HTML and resolved JSON
    pub pretty: bool,
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            stylesheet_href: self.stylesheet_href.clone(),
            tag_base_path: self.tag_base_path.clone(),
            pretty: self.pretty,
            ..ExportOptions::default()
        }
    }

    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            template_heading: self.template_heading.clone(),
        }
    }

    pub fn viewer_options(&self) -> ViewerOptions {
        ViewerOptions {
            empty_message: self.empty_message.clone(),
            export: self.export_options(),
            resolve: self.resolve_options(),
        }
    }

    pub fn tracker_options(&self) -> TrackerOptions {
        TrackerOptions {
            inline_marker: self.inline_attribution_marker,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let export = ExportOptions::default();
        let viewer = ViewerOptions::default();
        Self {
            stylesheet_href: export.stylesheet_href,
            tag_base_path: export.tag_base_path,
            template_heading: viewer.resolve.template_heading,
            empty_message: viewer.empty_message,
            inline_attribution_marker: false,
            pretty: false,
        }
    }
}
