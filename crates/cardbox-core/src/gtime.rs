//! # Global Timestamps
//!
//! Defines [`GTime`], the structured global-time string stamped onto
//! every card at ingestion. The wire form is
//!
//! ```text
//! <algorithm>|<iso8601-utc>|<region-tag>
//! ```
//!
//! where the ISO field carries microsecond precision with a `Z` suffix
//! (`YYYY-MM-DDTHH:MM:SS.ffffffZ`) and the algorithm field names the
//! digest algorithm of the card the stamp belongs to. Parsers split on
//! the first two `|` only.
//!
//! ## Invariant
//!
//! Timestamps are UTC-only. A local offset would make the ISO field of
//! two stamps for the same instant differ, and with it the lexicographic
//! ordering that stands in for chronological ordering.
//!
//! The region tag is process-wide state, default `"UTC"`, seeded from the
//! `CARDBOX_REGION` environment variable when present.

use std::fmt;
use std::sync::RwLock;

use chrono::{NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::algorithm::HashAlgorithm;
use crate::error::CardError;

/// Canonical ISO format of the middle field, microseconds and `Z` suffix.
const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Environment variable consulted once for the initial region tag.
const REGION_ENV: &str = "CARDBOX_REGION";

static REGION_TAG: Lazy<RwLock<String>> = Lazy::new(|| {
    RwLock::new(std::env::var(REGION_ENV).unwrap_or_else(|_| "UTC".to_owned()))
});

/// The process-wide region tag appended to every stamp.
pub fn region_tag() -> String {
    REGION_TAG
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

/// Replace the process-wide region tag.
///
/// # Errors
///
/// Returns `CardError::InvalidArgument` if the tag is empty or contains
/// the `|` field separator.
pub fn set_region_tag(tag: impl Into<String>) -> Result<(), CardError> {
    let tag = tag.into();
    if tag.is_empty() || tag.contains('|') {
        return Err(CardError::InvalidArgument(format!(
            "region tag must be non-empty and free of '|': {tag:?}"
        )));
    }
    *REGION_TAG
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner()) = tag;
    Ok(())
}

/// The current UTC wall clock in the canonical ISO form.
pub fn now_iso_micros() -> String {
    Utc::now().format(ISO_FORMAT).to_string()
}

/// A validated global-time string.
///
/// The algorithm field is parsed once at construction; the raw wire form
/// is kept verbatim, so `as_str()` round-trips byte-for-byte.
///
/// Two stamps carrying the same algorithm order chronologically by
/// lexicographic comparison of their [`timestamp`](GTime::timestamp)
/// fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GTime {
    raw: String,
    algorithm: HashAlgorithm,
}

impl GTime {
    /// Stamp the current wall clock under `algorithm` with the
    /// process-wide region tag.
    pub fn stamp_now(algorithm: HashAlgorithm) -> GTime {
        let raw = format!("{algorithm}|{}|{}", now_iso_micros(), region_tag());
        GTime { raw, algorithm }
    }

    /// Parse and validate a stored global-time string.
    ///
    /// # Errors
    ///
    /// `CardError::UnknownAlgorithm` for an algorithm name outside the
    /// closed set, `CardError::InvalidArgument` for a malformed shape or
    /// a non-canonical ISO field.
    pub fn parse(s: &str) -> Result<GTime, CardError> {
        let mut fields = s.splitn(3, '|');
        let algorithm_field = fields.next().unwrap_or_default();
        let (timestamp, region) = match (fields.next(), fields.next()) {
            (Some(timestamp), Some(region)) => (timestamp, region),
            _ => {
                return Err(CardError::InvalidArgument(format!(
                    "g_time must have three '|'-separated fields: {s:?}"
                )))
            }
        };
        let algorithm: HashAlgorithm = algorithm_field.parse()?;
        if !is_iso_format(timestamp) {
            return Err(CardError::InvalidArgument(format!(
                "g_time timestamp field is not canonical ISO8601: {timestamp:?}"
            )));
        }
        if region.is_empty() {
            return Err(CardError::InvalidArgument(format!(
                "g_time region field is empty: {s:?}"
            )));
        }
        Ok(GTime {
            raw: s.to_owned(),
            algorithm,
        })
    }

    /// The digest algorithm named by the first field.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// The ISO8601 timestamp field.
    pub fn timestamp(&self) -> &str {
        self.field(1)
    }

    /// The region tag field. May itself contain `|` in stored data;
    /// only the first two separators delimit fields.
    pub fn region(&self) -> &str {
        self.field(2)
    }

    /// The raw wire form.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    fn field(&self, index: usize) -> &str {
        // Construction validated the three-field shape.
        self.raw.splitn(3, '|').nth(index).unwrap_or_default()
    }
}

/// Whether `t` is in the canonical `YYYY-MM-DDTHH:MM:SS.ffffffZ` form.
pub fn is_iso_format(t: &str) -> bool {
    NaiveDateTime::parse_from_str(t, ISO_FORMAT).is_ok() && t.ends_with('Z')
}

/// Whether `name` names a member of the closed algorithm set.
pub fn is_valid_hash_function(name: &str) -> bool {
    name.parse::<HashAlgorithm>().is_ok()
}

impl fmt::Display for GTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl TryFrom<String> for GTime {
    type Error = CardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        GTime::parse(&value)
    }
}

impl From<GTime> for String {
    fn from(value: GTime) -> Self {
        value.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamp_now_round_trips_algorithm() {
        for algorithm in HashAlgorithm::ALL {
            let stamp = GTime::stamp_now(algorithm);
            assert_eq!(stamp.algorithm(), algorithm);
            assert!(is_iso_format(stamp.timestamp()));
            assert!(stamp.as_str().starts_with(&format!("{algorithm}|")));
        }
    }

    #[test]
    fn stamps_are_chronologically_ordered() {
        let first = GTime::stamp_now(HashAlgorithm::Sha256);
        let second = GTime::stamp_now(HashAlgorithm::Sha256);
        assert!(first.timestamp() <= second.timestamp());
    }

    #[test]
    fn parse_recovers_all_three_fields() {
        let stamp = GTime::parse("md5|2023-01-01T12:00:00.000000Z|UTC").unwrap();
        assert_eq!(stamp.algorithm(), HashAlgorithm::Md5);
        assert_eq!(stamp.timestamp(), "2023-01-01T12:00:00.000000Z");
        assert_eq!(stamp.region(), "UTC");
    }

    #[test]
    fn parse_splits_on_first_two_separators_only() {
        // A stored region containing '|' stays part of the region field.
        let stamp = GTime::parse("sha256|2023-01-01T12:00:00.000000Z|Asia|Karachi").unwrap();
        assert_eq!(stamp.region(), "Asia|Karachi");
    }

    #[test]
    fn parse_rejects_malformed_shapes() {
        for bad in [
            "",
            "sha256",
            "sha256|2023-01-01T12:00:00.000000Z",
            "sha256|2023-01-01T12:00:00.000000Z|",
            "sha256|not-a-timestamp|UTC",
            "sha256|2023-01-01 12:00:00|UTC",
        ] {
            assert!(
                matches!(GTime::parse(bad), Err(CardError::InvalidArgument(_))),
                "expected InvalidArgument for {bad:?}"
            );
        }
    }

    #[test]
    fn parse_rejects_unknown_algorithm() {
        let err = GTime::parse("whirlpool|2023-01-01T12:00:00.000000Z|UTC").unwrap_err();
        assert!(matches!(err, CardError::UnknownAlgorithm(_)));
    }

    #[test]
    fn is_iso_format_requires_microseconds_and_z() {
        assert!(is_iso_format("2023-01-01T12:00:00.000000Z"));
        assert!(is_iso_format("1999-12-31T23:59:59.999999Z"));
        assert!(!is_iso_format("2023-01-01T12:00:00Z"));
        assert!(!is_iso_format("2023-01-01T12:00:00.000000+00:00"));
        assert!(!is_iso_format("2023-01-01 12:00:00.000000Z"));
        assert!(!is_iso_format("garbage"));
    }

    #[test]
    fn valid_hash_function_names() {
        for algorithm in HashAlgorithm::ALL {
            assert!(is_valid_hash_function(algorithm.name()));
        }
        assert!(!is_valid_hash_function("blake3"));
        assert!(!is_valid_hash_function(""));
    }

    #[test]
    fn region_tag_is_configurable() {
        assert!(set_region_tag("KHI").is_ok());
        let stamp = GTime::stamp_now(HashAlgorithm::Sha256);
        assert_eq!(stamp.region(), "KHI");
        set_region_tag("UTC").unwrap();
    }

    #[test]
    fn region_tag_rejects_separator_and_empty() {
        assert!(set_region_tag("").is_err());
        assert!(set_region_tag("A|B").is_err());
    }

    #[test]
    fn serde_round_trip_preserves_wire_form() {
        let stamp = GTime::stamp_now(HashAlgorithm::Sha512);
        let json = serde_json::to_string(&stamp).unwrap();
        let back: GTime = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stamp);
    }

    #[test]
    fn serde_rejects_malformed_strings() {
        let parsed: Result<GTime, _> = serde_json::from_str("\"not-a-gtime\"");
        assert!(parsed.is_err());
    }
}
