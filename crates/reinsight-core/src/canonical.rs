//! # Query-Key Canonicalization — Content-Derived Identity
//!
//! A capture session re-issues the same logical queries on every run, in
//! whatever order the dashboard happens to emit them. To merge a re-capture
//! into prior state the system needs an identity that depends only on what
//! a query *asks for* — its selected output field and its filter
//! predicates — never on capture order, filter ordering, or timestamps.
//!
//! ## Invariant
//!
//! The only constructor for [`QueryKey`] is [`canonicalize()`]. Rendering
//! is `select[0] :: subject=v1|v2 :: …` with filter strings sorted
//! lexicographically and values sorted and de-duplicated within each
//! subject, so two queries asking the same question always collide.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::exchange::{CapturedExchange, QueryView};

/// A content-derived query identity. The join key for incremental merge.
///
/// Construct via [`canonicalize()`]; the inner rendering is stable and
/// safe to persist alongside snapshots.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QueryKey(String);

impl QueryKey {
    /// The rendered key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the canonical key for a query view.
///
/// Returns `None` when the view selects nothing — there is nothing to key
/// on, and such exchanges are excluded from merging rather than guessed at.
///
/// Deterministic and pure: the result is independent of filter insertion
/// order and of value ordering within a subject (the view's `BTreeMap` /
/// `BTreeSet` representation discards both), and equality predicates have
/// already been folded into single-valued membership sets at parse time.
pub fn canonicalize(view: &QueryView) -> Option<QueryKey> {
    let field = view.first_select()?;
    let mut parts: Vec<String> = view
        .filters
        .iter()
        .map(|(subject, values)| {
            let rendered: Vec<&str> = values.iter().map(String::as_str).collect();
            format!("{subject}={}", rendered.join("|"))
        })
        .collect();
    // Subjects iterate in order already, but the key sorts the *rendered*
    // strings: "a=x" and "a b=x" order differently than their subjects do.
    parts.sort();
    Some(QueryKey(format!("{field}::{}", parts.join("::"))))
}

/// Canonical key of an exchange, derived from its primary query.
pub fn exchange_key(exchange: &CapturedExchange) -> Option<QueryKey> {
    canonicalize(&exchange.primary_view()?)
}
