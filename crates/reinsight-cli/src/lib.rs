//! # reinsight-cli — Metrics Store Command-Line Interface
//!
//! Thin clap front-end over the domain crates. Three subcommands cover
//! the store's lifecycle:
//!
//! - `merge` — fold a freshly captured snapshot into prior state,
//!   replacing re-captured exchanges by canonical query key
//! - `transform` — turn a snapshot into the `{date → {area → metrics}}`
//!   report
//! - `inspect` — summarize a snapshot's dates, areas, and how many of
//!   its queries classify to known indicators
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from handlers; handlers delegate to
//!   the domain crates and do file I/O only.
//! - Reports and merged snapshots write as pretty-printed JSON, to a
//!   file when `--output` is given and to stdout otherwise.

pub mod inspect;
pub mod merge;
pub mod store;
pub mod transform;
