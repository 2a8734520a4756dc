//! # Cyclenotes HTML compiler
//!
//! Static export of canonical note JSON and hydration of exported polls.
//!
//! ```text
//! generator ─→ transforms ─→ printer      (export)
//! parse_fragment ─→ Hydrator               (hydration)
//! ```

pub mod dom;
mod error;
pub mod export;
mod generator;
pub mod hydrate;
mod parser;
pub mod poll_view;
mod printer;
pub mod transforms;


pub use dom::{find_all, HtmlElement, HtmlNode};
pub use error::{ExportError, HydrationError};
pub use export::{
    embedded_json_script, export_static, AttributionSummary, ExportFallback, ExportOptions,
    ExportOutcome, StaticExport,
};
pub use generator::generate;
pub use hydrate::{HydrationReport, Hydrator, PollWidget, HYDRATED_FLAG};
pub use parser::{decode_entities, parse_fragment};
pub use printer::{escape_attribute, escape_text, print_html, PrintOptions};
pub use transforms::{Transform, TransformEngine};
