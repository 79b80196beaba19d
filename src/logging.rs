use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Sends logs to `<dir>/tasklist.log`; the terminal belongs to the UI.
///
/// `RUST_LOG` overrides the default filter. Returns the log path, or `None`
/// when the file could not be opened, in which case logging stays off.
pub fn init(dir: &Path, verbose: bool) -> Option<PathBuf> {
    fs::create_dir_all(dir).ok()?;
    let path = dir.join("tasklist.log");
    let file = OpenOptions::new().create(true).append(true).open(&path).ok()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("tasklist=debug,info")
        } else {
            EnvFilter::new("tasklist=info,warn")
        }
    });

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .ok()?;

    tracing::info!(path = ?path, "logging initialized");
    Some(path)
}
