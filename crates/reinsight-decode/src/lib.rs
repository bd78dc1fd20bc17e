//! # reinsight-decode — From Captured Payloads to Labeled Values
//!
//! The backend's results are compact and positional: values sit inside
//! nested arrays, labels live in side dictionaries, and nothing in a
//! response says what indicator it belongs to. This crate supplies the
//! three decoding stages:
//!
//! 1. [`classify`] — match a query's selected field and filter predicates
//!    against an ordered rule table to pick the indicator slot its results
//!    fill.
//! 2. [`decode`] — walk the result's row groups and extract a scalar,
//!    a period-keyed series, or a category map, according to the slot's
//!    row shape.
//! 3. [`dictionary`] — resolve positional indices into human-readable
//!    labels from the hierarchy-label list or a value dictionary.
//!
//! Everything here is pure and infallible by contract: irregular payloads
//! decode to `None`, never to an error.

pub mod classify;
pub mod dictionary;
pub mod shape;

pub use classify::{classify, IndicatorSlot, RentSegment, SalesSegment, ShapeKind};
pub use shape::{decode, DecodedValue};
