//! Core student record types.
//!
//! This module defines the student record as it is stored in the roster,
//! the draft a user submits to create or update one, and the identifier
//! that names a record independently of its position or natural key.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Immutable identifier assigned to a student when the record is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(Uuid);

impl StudentId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Identifier for the stored record at `position` that has none yet.
    ///
    /// Stable for as long as the stored roster is unchanged; the next write
    /// persists it with the record.
    #[must_use]
    pub fn provisional(position: usize) -> Self {
        Self(Uuid::from_u128(position as u128 + 1))
    }

    /// The identifier held in a stored record's `id` field, if it has a
    /// usable one.
    #[must_use]
    pub fn stored_in(record: &serde_json::Value) -> Option<Self> {
        record
            .get("id")
            .and_then(serde_json::Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok())
            .map(Self)
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for StudentId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| Error::StudentNotFound { id: s.to_string() })
    }
}

/// A student record in the roster.
///
/// Serialized with camelCase keys so rosters written by earlier versions of
/// the register (which had no `id`) remain readable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    /// Stable identifier, generated when the record is first created.
    #[serde(default = "StudentId::generate")]
    pub id: StudentId,

    /// Full name, title-cased.
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,

    /// Roll number. Digits are expected but not enforced.
    #[serde(default, deserialize_with = "lenient_string")]
    pub roll: String,

    /// Grade label such as `"7"`.
    #[serde(default, deserialize_with = "lenient_string")]
    pub student_class: String,

    /// Guardian's name.
    #[serde(default, deserialize_with = "lenient_string")]
    pub guardian: String,

    /// Contact phone number.
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: String,

    /// Free-form notes.
    #[serde(default, deserialize_with = "lenient_string")]
    pub notes: String,
}

impl Student {
    /// Build a record from a validated draft, keeping the given identifier.
    #[must_use]
    pub fn from_draft(id: StudentId, draft: StudentDraft) -> Self {
        Self {
            id,
            name: draft.name,
            roll: draft.roll,
            student_class: draft.student_class,
            guardian: draft.guardian,
            phone: draft.phone,
            notes: draft.notes,
        }
    }

    /// Check whether this record holds the given natural key.
    #[must_use]
    pub fn has_key(&self, roll: &str, student_class: &str) -> bool {
        self.roll == roll && self.student_class == student_class
    }

    /// A draft pre-filled with this record's fields, for editing.
    #[must_use]
    pub fn to_draft(&self) -> StudentDraft {
        StudentDraft {
            name: self.name.clone(),
            roll: self.roll.clone(),
            student_class: self.student_class.clone(),
            guardian: self.guardian.clone(),
            phone: self.phone.clone(),
            notes: self.notes.clone(),
        }
    }
}

/// The fields a user submits when adding or editing a student.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentDraft {
    /// Full name (required).
    pub name: String,
    /// Roll number (required).
    pub roll: String,
    /// Grade label (required).
    pub student_class: String,
    /// Guardian's name.
    pub guardian: String,
    /// Contact phone number.
    pub phone: String,
    /// Free-form notes.
    pub notes: String,
}

impl StudentDraft {
    /// Create a draft with the three required fields set.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        roll: impl Into<String>,
        student_class: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            roll: roll.into(),
            student_class: student_class.into(),
            ..Self::default()
        }
    }

    /// Trim the draft, title-case the name, and check required fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first required field that is
    /// blank after trimming.
    pub fn normalize(self) -> Result<Self> {
        let draft = Self {
            name: normalize_name(&self.name),
            roll: self.roll.trim().to_string(),
            student_class: self.student_class.trim().to_string(),
            guardian: self.guardian.trim().to_string(),
            phone: self.phone.trim().to_string(),
            notes: self.notes.trim().to_string(),
        };

        if draft.name.is_empty() {
            return Err(Error::Validation { field: "name" });
        }
        if draft.roll.is_empty() {
            return Err(Error::Validation { field: "roll" });
        }
        if draft.student_class.is_empty() {
            return Err(Error::Validation { field: "class" });
        }
        Ok(draft)
    }
}

/// Capitalize every whitespace-delimited word of a name.
///
/// The first letter of each word is upper-cased and the rest lower-cased;
/// words are re-joined with single spaces.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.as_str().to_lowercase().chars())
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Read a string field that older data may have stored as a number,
/// boolean, or null.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}
