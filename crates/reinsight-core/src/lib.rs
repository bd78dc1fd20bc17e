//! # reinsight-core — Foundational Types for the Metrics Store
//!
//! This crate is the leaf of the workspace DAG. It defines the
//! captured-exchange snapshot model and the two operations that make
//! re-capture idempotent: content-derived query keys and the incremental
//! batch merge keyed by them.
//!
//! ## Key Design Principles
//!
//! 1. **Verbatim payloads.** A `CapturedExchange` holds its `request` and
//!    `response` as raw `serde_json::Value` trees. Typed `QueryView`s are
//!    derived on demand and never written back, so a merged snapshot
//!    re-serializes byte-compatibly with what the capture session produced —
//!    unknown fields are never dropped.
//!
//! 2. **`QueryKey` newtype.** The only constructor is [`canonicalize()`].
//!    Every join of fresh captures against prior state flows through it,
//!    which makes the key independent of capture order by construction.
//!
//! 3. **Data-shape irregularities are not errors.** Accessors on malformed
//!    exchanges return empty slices or `None`; [`ReinsightError`] is
//!    reserved for the collaborator boundary (file I/O, snapshot syntax,
//!    malformed date keys).
//!
//! ## Crate Policy
//!
//! - No dependencies on other `reinsight-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod error;
pub mod exchange;
pub mod merge;
pub mod temporal;

pub use canonical::{canonicalize, exchange_key, QueryKey};
pub use error::ReinsightError;
pub use exchange::{CapturedExchange, QueryView, Snapshot};
pub use merge::{merge_exchanges, merge_snapshots};
pub use temporal::{month_key, year_key, DateKey, MILLISECOND_EPOCH_FLOOR};
