pub mod append;
pub mod export;
pub mod hydrate;
pub mod init;
pub mod resolve;

pub use append::{append, AppendArgs};
pub use export::{export, ExportArgs};
pub use hydrate::{hydrate, HydrateArgs};
pub use init::{init, InitArgs};
pub use resolve::{resolve, ResolveArgs};

use anyhow::{Context, Result};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Read a stored payload; `-` reads stdin
pub(crate) fn read_payload(path: &str, cwd: &str) -> Result<String> {
    if path == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        return Ok(buffer);
    }

    let full_path = resolve_path(path, cwd);
    std::fs::read_to_string(&full_path)
        .with_context(|| format!("Cannot read {}", full_path.display()))
}

pub(crate) fn resolve_path(path: &str, cwd: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        PathBuf::from(cwd).join(path)
    }
}
