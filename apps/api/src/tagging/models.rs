use serde::{Deserialize, Serialize};

/// One of the four extracted attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagField {
    Country,
    Degree,
    Major,
    SubMajor,
}

/// Why a candidate value was dropped during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningReason {
    /// The value is not in the closed vocabulary for its field.
    UnknownValue,
    /// A sub-major arrived without a valid major to anchor it.
    OrphanedWithoutMajor,
    /// The sub-major belongs to a different major category.
    HierarchyMismatch,
}

/// A field-level validation problem. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub field: TagField,
    pub reason: WarningReason,
    /// The rejected value as the model produced it.
    pub value: String,
    /// The validated major the sub-major was checked against (hierarchy mismatches only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major: Option<String>,
}

impl Warning {
    pub fn unknown_value(field: TagField, value: String) -> Self {
        Self {
            field,
            reason: WarningReason::UnknownValue,
            value,
            major: None,
        }
    }

    pub fn orphaned_without_major(value: String) -> Self {
        Self {
            field: TagField::SubMajor,
            reason: WarningReason::OrphanedWithoutMajor,
            value,
            major: None,
        }
    }

    pub fn hierarchy_mismatch(major: String, value: String) -> Self {
        Self {
            field: TagField::SubMajor,
            reason: WarningReason::HierarchyMismatch,
            value,
            major: Some(major),
        }
    }
}

/// Unvalidated record decoded from model output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub country: Option<String>,
    pub degree: Option<String>,
    pub major: Option<String>,
    pub sub_major: Option<String>,
}

/// Validated extraction result.
///
/// Serializes to exactly `{"country", "degree", "major", "sub_major"}` in that order,
/// with `null` for absent fields. Only the validator constructs one, so every present
/// value is a dictionary member and `sub_major` always sits under `major`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagRecord {
    pub(super) country: Option<String>,
    pub(super) degree: Option<String>,
    pub(super) major: Option<String>,
    pub(super) sub_major: Option<String>,
}

impl TagRecord {
    /// True when all four tags were recognised.
    pub fn is_complete(&self) -> bool {
        self.country.is_some()
            && self.degree.is_some()
            && self.major.is_some()
            && self.sub_major.is_some()
    }
}

#[cfg(test)]
impl TagRecord {
    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    pub fn degree(&self) -> Option<&str> {
        self.degree.as_deref()
    }

    pub fn major(&self) -> Option<&str> {
        self.major.as_deref()
    }

    pub fn sub_major(&self) -> Option<&str> {
        self.sub_major.as_deref()
    }
}

#[cfg(test)]
impl From<&TagRecord> for CandidateRecord {
    fn from(record: &TagRecord) -> Self {
        Self {
            country: record.country.clone(),
            degree: record.degree.clone(),
            major: record.major.clone(),
            sub_major: record.sub_major.clone(),
        }
    }
}
