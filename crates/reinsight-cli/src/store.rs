//! # Snapshot File I/O
//!
//! Shared read/write helpers for the subcommand handlers. Errors carry
//! the offending path so a failure in a multi-file invocation is
//! attributable.

use std::fs;
use std::path::Path;

use anyhow::Context;
use reinsight_core::Snapshot;
use serde::Serialize;

/// Read and parse a snapshot file.
pub fn read_snapshot(path: &Path) -> anyhow::Result<Snapshot> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading snapshot {}", path.display()))?;
    Snapshot::from_json_str(&raw)
        .with_context(|| format!("parsing snapshot {}", path.display()))
}

/// Write `value` as pretty-printed JSON to `path`, or to stdout when no
/// path is given.
pub fn write_json<T: Serialize>(path: Option<&Path>, value: &T) -> anyhow::Result<()> {
    let mut rendered = serde_json::to_string_pretty(value)?;
    rendered.push('\n');
    match path {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("writing {}", path.display())),
        None => {
            print!("{rendered}");
            Ok(())
        }
    }
}
