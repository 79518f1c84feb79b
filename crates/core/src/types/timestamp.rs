//! The heterogeneous document timestamp.
//!
//! Timestamps stored in the document database arrive in one of several
//! wire shapes, depending on which client wrote the record:
//!
//! - an RFC 3339 string (also what a native datetime serializes to)
//! - the store's timestamp wrapper: `{"seconds": .., "nanos": ..}`
//! - a numeric epoch in milliseconds, integer or fractional
//! - anything else: an arbitrary string, null, or other JSON garbage
//!
//! [`Timestamp::normalize`] maps every shape to a `DateTime<Utc>` so that
//! comparison and display never operate on the raw wire value. An
//! unparseable value normalizes to the Unix epoch, so such records sort
//! last under descending order. A missing field is handled by
//! [`order_key`], which treats `None` the same way. No wire value fails
//! deserialization: one garbled record must never poison a whole listing.
//!
//! Serde's untagged deserialization tries variants in order, so the
//! catch-all must stay last.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A stored timestamp in any of the shapes found in the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    /// RFC 3339 string, or a native datetime serialized by this crate.
    Rfc3339(DateTime<Utc>),
    /// The store's timestamp wrapper object.
    Wrapper {
        seconds: i64,
        #[serde(default)]
        nanos: u32,
    },
    /// Epoch milliseconds written by clients that store raw numbers.
    EpochMillis(i64),
    /// Epoch milliseconds with a fractional part, as written by clients
    /// that store sub-millisecond floats (and as the wire's double
    /// values decode to).
    EpochFloat(f64),
    /// Anything else. Normalizes to the Unix epoch.
    Unparsed(serde_json::Value),
}

impl Timestamp {
    /// The current instant, in the shape this crate writes.
    #[must_use]
    pub fn now() -> Self {
        Self::Rfc3339(Utc::now())
    }

    /// Collapse any wire shape to a `DateTime<Utc>`.
    ///
    /// Out-of-range wrapper or epoch values also collapse to the Unix
    /// epoch rather than failing, matching the unparseable case.
    /// Fractional milliseconds truncate.
    #[must_use]
    pub fn normalize(&self) -> DateTime<Utc> {
        match self {
            Self::Rfc3339(dt) => *dt,
            Self::Wrapper { seconds, nanos } => Utc
                .timestamp_opt(*seconds, *nanos)
                .single()
                .unwrap_or(DateTime::UNIX_EPOCH),
            Self::EpochMillis(ms) => Utc
                .timestamp_millis_opt(*ms)
                .single()
                .unwrap_or(DateTime::UNIX_EPOCH),
            Self::EpochFloat(ms) => {
                // The cast saturates; anything out of chrono's range
                // collapses to the epoch below.
                #[allow(clippy::cast_possible_truncation)]
                let millis = if ms.is_finite() { *ms as i64 } else { 0 };
                Utc.timestamp_millis_opt(millis)
                    .single()
                    .unwrap_or(DateTime::UNIX_EPOCH)
            }
            Self::Unparsed(_) => DateTime::UNIX_EPOCH,
        }
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::Rfc3339(dt)
    }
}

/// Total order over an optional timestamp field.
///
/// A missing timestamp keys as the Unix epoch, so records without one
/// sort after every record with a present timestamp when ordering
/// newest-first.
#[must_use]
pub fn order_key(ts: Option<&Timestamp>) -> DateTime<Utc> {
    ts.map_or(DateTime::UNIX_EPOCH, Timestamp::normalize)
}
