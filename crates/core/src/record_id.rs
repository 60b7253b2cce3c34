//! Record identifiers and sharded-path derivation.
//!
//! MediBook stores every document under a sharded directory derived from its identifier.
//!
//! To keep path derivation deterministic and consistent across the codebase, MediBook uses a
//! *canonical* identifier representation for storage: **32 lowercase hexadecimal characters**
//! (no hyphens).
//!
//! ## Canonical form
//! - Length: 32
//! - Characters: `0-9` and `a-f` only
//! - Example: `550e8400e29b41d4a716446655440000`
//!
//! This is the same value you would get from `Uuid::new_v4().simple().to_string()`.
//! Canonical form is *required* for externally supplied identifiers (CLI/API inputs); use
//! [`RecordId::parse`] to validate an input string. Non-canonical values (uppercase,
//! hyphenated, wrong length, non-hex) are rejected.
//!
//! ## Sharded directory layout
//! For a canonical id `u`, documents live under `parent_dir/<u[0..2]>/<u[2..4]>/<u>/`,
//! for example `clinic_data/appointments/55/0e/550e8400e29b41d4a716446655440000/`.
//! This scheme prevents very large fan-out in a single directory.

use crate::error::{BookingError, BookingResult};
use std::path::{Path, PathBuf};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// MediBook's canonical record identifier (32 lowercase hex characters, no hyphens).
///
/// Once constructed, the contained identifier is guaranteed to be in canonical form, so
/// sharded path derivation is always well-defined.
///
/// # Construction
/// - [`RecordId::new`] generates a fresh identifier (for new records).
/// - [`RecordId::parse`] validates an externally supplied identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Generates a new identifier in canonical form.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Validates and parses an identifier string that must already be canonical.
    ///
    /// This does **not** normalise other common UUID forms (for example, hyphenated or
    /// uppercase); callers must provide the canonical representation.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidInput`] if `input` is not in canonical form.
    pub fn parse(input: &str) -> BookingResult<Self> {
        if Self::is_canonical(input) {
            // SAFETY: is_canonical guarantees valid hex, so parse_str will succeed
            let uuid = Uuid::parse_str(input).expect("is_canonical guarantees valid UUID");
            return Ok(Self(uuid));
        }
        Err(BookingError::InvalidInput(format!(
            "record id must be 32 lowercase hex characters without hyphens, got: '{}'",
            input
        )))
    }

    /// Returns true if `input` is in canonical form.
    ///
    /// Purely syntactic: exactly 32 bytes, lowercase hex only.
    pub fn is_canonical(input: &str) -> bool {
        input.len() == 32
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }

    /// Returns `parent_dir/<s1>/<s2>/<id>/` where `s1`/`s2` are the first four hex
    /// characters of this identifier.
    pub fn sharded_dir(&self, parent_dir: &Path) -> PathBuf {
        let canonical = self.0.simple().to_string();
        let s1 = &canonical[0..2];
        let s2 = &canonical[2..4];
        parent_dir.join(s1).join(s2).join(&canonical)
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    /// Formats the identifier in canonical form (32 lowercase hex characters, no hyphens).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for RecordId {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordId::parse(s)
    }
}

impl serde::Serialize for RecordId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        RecordId::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_generates_canonical_id() {
        let id = RecordId::new();
        let canonical = id.to_string();

        assert_eq!(canonical.len(), 32);
        assert!(RecordId::is_canonical(&canonical));
    }

    #[test]
    fn test_parse_valid_canonical_id() {
        let canonical = "550e8400e29b41d4a716446655440000";
        let result = RecordId::parse(canonical);

        assert!(result.is_ok());
        assert_eq!(result.unwrap().to_string(), canonical);
    }

    #[test]
    fn test_parse_rejects_hyphenated_id() {
        let hyphenated = "550e8400-e29b-41d4-a716-446655440000";
        let result = RecordId::parse(hyphenated);

        assert!(result.is_err());
        match result {
            Err(BookingError::InvalidInput(msg)) => {
                assert!(msg.contains("32 lowercase hex characters"));
            }
            _ => panic!("Expected InvalidInput error"),
        }
    }

    #[test]
    fn test_parse_rejects_uppercase_id() {
        assert!(RecordId::parse("550E8400E29B41D4A716446655440000").is_err());
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert!(RecordId::parse("550e8400e29b41d4a71644665544000").is_err());
        assert!(RecordId::parse("550e8400e29b41d4a7164466554400000").is_err());
    }

    #[test]
    fn test_parse_rejects_invalid_characters() {
        assert!(RecordId::parse("550e8400e29b41d4a716446655440zzz").is_err());
    }

    #[test]
    fn test_sharded_dir_structure() {
        let id = RecordId::parse("550e8400e29b41d4a716446655440000").unwrap();
        let parent = Path::new("/clinic_data/appointments");
        let sharded = id.sharded_dir(parent);

        assert_eq!(
            sharded,
            PathBuf::from("/clinic_data/appointments/55/0e/550e8400e29b41d4a716446655440000")
        );
    }

    #[test]
    fn test_round_trip_new_to_string_to_parse() {
        let original = RecordId::new();
        let as_string = original.to_string();
        let parsed = RecordId::parse(&as_string).unwrap();

        assert_eq!(original, parsed);
    }

    #[test]
    fn test_serde_round_trip() {
        let id = RecordId::parse("550e8400e29b41d4a716446655440000").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"550e8400e29b41d4a716446655440000\"");

        let parsed: RecordId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_deserialize_rejects_non_canonical() {
        let result: Result<RecordId, _> =
            serde_json::from_str("\"550e8400-e29b-41d4-a716-446655440000\"");
        assert!(result.is_err());
    }
}
