//! # reinsight-metrics — From Decoded Values to the Report
//!
//! The top of the processing pipeline. [`bundle`] defines the per-area
//! output record and knows which field each indicator slot fills;
//! [`assemble`] folds one area's captured exchanges into a bundle;
//! [`transform`] maps a whole snapshot into the `{dateKey → {areaName →
//! bundle}}` report.
//!
//! ## Key Design Principles
//!
//! 1. **Never fatal.** Exchanges that fail to classify or decode are
//!    skipped, leaving their slots unset. A snapshot always transforms
//!    into a report.
//!
//! 2. **Fixed output schema.** The eight transaction and listing fields
//!    serialize unconditionally, with `null` leaves where no capture
//!    filled them. Series and supply fields appear only when decoded,
//!    so consumers can distinguish "not probed" from "probed, empty".
//!
//! 3. **Last write wins.** When two exchanges fill the same slot the
//!    later one in batch order overwrites, matching the incremental merge
//!    discipline in `reinsight-core`.

pub mod assemble;
pub mod bundle;
pub mod transform;

pub use assemble::assemble;
pub use bundle::{CategoryValues, MetricBundle, RentBreakdown, SalesBreakdown, SeriesValues};
pub use transform::{transform_snapshot, MetricsReport};
