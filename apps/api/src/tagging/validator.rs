//! Tag validator: reconciles a candidate record with the dictionary.
//!
//! Validation never fails. Every field that does not pass is cleared and reported as a
//! `Warning`, so callers always get a record. Order matters: country, degree, major,
//! then sub-major against the *validated* major.

use serde::Serialize;
use tracing::debug;

use crate::tagging::dictionary::TagDictionary;
use crate::tagging::models::{CandidateRecord, TagField, TagRecord, Warning};

/// Validated record plus everything that was dropped on the way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    pub record: TagRecord,
    pub warnings: Vec<Warning>,
}

impl ValidationOutcome {
    /// True when every candidate value survived.
    pub fn is_fully_valid(&self) -> bool {
        self.warnings.is_empty()
    }
}

pub fn validate(candidate: CandidateRecord, dictionary: &TagDictionary) -> ValidationOutcome {
    let mut warnings = Vec::new();

    let country = keep_if(candidate.country, TagField::Country, &mut warnings, |c| {
        dictionary.is_valid_country(c)
    });
    let degree = keep_if(candidate.degree, TagField::Degree, &mut warnings, |d| {
        dictionary.is_valid_degree(d)
    });
    let major = keep_if(candidate.major, TagField::Major, &mut warnings, |m| {
        dictionary.is_valid_major(m)
    });

    let sub_major = match (candidate.sub_major, major.as_deref()) {
        (None, _) => None,
        (Some(sub), None) => {
            warnings.push(Warning::orphaned_without_major(sub));
            None
        }
        (Some(sub), Some(m)) if dictionary.is_valid_sub_major(m, &sub) => Some(sub),
        (Some(sub), Some(m)) => {
            debug!(major = m, belongs_to = ?dictionary.parent_of(&sub), "Sub-major under wrong major");
            warnings.push(Warning::hierarchy_mismatch(m.to_string(), sub));
            None
        }
    };

    for warning in &warnings {
        debug!(
            field = ?warning.field,
            reason = ?warning.reason,
            value = %warning.value,
            "Dropped tag value"
        );
    }

    ValidationOutcome {
        record: TagRecord {
            country,
            degree,
            major,
            sub_major,
        },
        warnings,
    }
}

fn keep_if(
    value: Option<String>,
    field: TagField,
    warnings: &mut Vec<Warning>,
    is_valid: impl Fn(&str) -> bool,
) -> Option<String> {
    let value = value?;
    if is_valid(&value) {
        Some(value)
    } else {
        warnings.push(Warning::unknown_value(field, value));
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagging::dictionary::test_support::sample_dictionary;
    use crate::tagging::models::WarningReason;
    use proptest::prelude::*;

    fn candidate(
        country: Option<&str>,
        degree: Option<&str>,
        major: Option<&str>,
        sub_major: Option<&str>,
    ) -> CandidateRecord {
        CandidateRecord {
            country: country.map(String::from),
            degree: degree.map(String::from),
            major: major.map(String::from),
            sub_major: sub_major.map(String::from),
        }
    }

    #[test]
    fn test_fully_valid_candidate_passes_unchanged() {
        let outcome = validate(
            candidate(Some("英国"), Some("硕士"), Some("理工科"), Some("统计学")),
            &sample_dictionary(),
        );
        assert!(outcome.is_fully_valid());
        assert_eq!(outcome.record.country(), Some("英国"));
        assert_eq!(outcome.record.degree(), Some("硕士"));
        assert_eq!(outcome.record.major(), Some("理工科"));
        assert_eq!(outcome.record.sub_major(), Some("统计学"));
        assert!(outcome.record.is_complete());
    }

    #[test]
    fn test_unknown_country_is_cleared_with_warning() {
        let outcome = validate(
            candidate(Some("火星"), None, None, None),
            &sample_dictionary(),
        );
        assert_eq!(outcome.record.country(), None);
        assert_eq!(
            outcome.warnings,
            vec![Warning::unknown_value(TagField::Country, "火星".to_string())]
        );
    }

    #[test]
    fn test_unknown_degree_is_cleared_with_warning() {
        let outcome = validate(
            candidate(Some("英国"), Some("研究生"), None, None),
            &sample_dictionary(),
        );
        assert_eq!(outcome.record.country(), Some("英国"));
        assert_eq!(outcome.record.degree(), None);
        assert_eq!(outcome.warnings[0].field, TagField::Degree);
        assert_eq!(outcome.warnings[0].reason, WarningReason::UnknownValue);
    }

    #[test]
    fn test_orphaned_sub_major_is_cleared() {
        let outcome = validate(
            candidate(None, None, None, Some("统计学")),
            &sample_dictionary(),
        );
        assert_eq!(outcome.record.major(), None);
        assert_eq!(outcome.record.sub_major(), None);
        assert_eq!(
            outcome.warnings,
            vec![Warning::orphaned_without_major("统计学".to_string())]
        );
    }

    #[test]
    fn test_hierarchy_mismatch_keeps_major_and_clears_sub_major() {
        let outcome = validate(
            candidate(None, None, Some("理工科"), Some("金融学")),
            &sample_dictionary(),
        );
        assert_eq!(outcome.record.major(), Some("理工科"));
        assert_eq!(outcome.record.sub_major(), None);
        assert_eq!(
            outcome.warnings,
            vec![Warning::hierarchy_mismatch(
                "理工科".to_string(),
                "金融学".to_string()
            )]
        );
    }

    #[test]
    fn test_rejected_major_never_lets_sub_major_through() {
        // "统计" is not a major, so even a real sub-major must be dropped.
        let outcome = validate(
            candidate(None, None, Some("统计"), Some("统计学")),
            &sample_dictionary(),
        );
        assert_eq!(outcome.record.major(), None);
        assert_eq!(outcome.record.sub_major(), None);
        let reasons: Vec<_> = outcome.warnings.iter().map(|w| w.reason).collect();
        assert_eq!(
            reasons,
            vec![
                WarningReason::UnknownValue,
                WarningReason::OrphanedWithoutMajor
            ]
        );
    }

    #[test]
    fn test_major_alone_is_valid() {
        let outcome = validate(
            candidate(None, None, Some("商科"), None),
            &sample_dictionary(),
        );
        assert!(outcome.is_fully_valid());
        assert_eq!(outcome.record.major(), Some("商科"));
    }

    #[test]
    fn test_warnings_follow_field_order() {
        let outcome = validate(
            candidate(Some("火星"), Some("幼儿园"), Some("玄学"), Some("占星")),
            &sample_dictionary(),
        );
        let fields: Vec<_> = outcome.warnings.iter().map(|w| w.field).collect();
        assert_eq!(
            fields,
            vec![
                TagField::Country,
                TagField::Degree,
                TagField::Major,
                TagField::SubMajor
            ]
        );
        assert_eq!(outcome.record, TagRecord::default());
    }

    #[test]
    fn test_empty_candidate_yields_empty_record() {
        let outcome = validate(CandidateRecord::default(), &sample_dictionary());
        assert!(outcome.is_fully_valid());
        assert_eq!(outcome.record, TagRecord::default());
    }

    // ────────────────────────────────────────────────────────────────────────
    // Properties over adversarial candidates
    // ────────────────────────────────────────────────────────────────────────

    const POOL: &[&str] = &[
        "英国", "美国", "日本", "本科", "硕士", "博士", "理工科", "商科", "艺术", "统计学",
        "计算机", "金融学", "会计学", "艺术设计", "火星", "",
    ];

    fn field() -> impl Strategy<Value = Option<String>> {
        prop_oneof![
            Just(None::<String>),
            proptest::sample::select(POOL.to_vec()).prop_map(|s| Some(s.to_string())),
            "[a-z一-龥]{1,4}".prop_map(Some),
        ]
    }

    fn any_candidate() -> impl Strategy<Value = CandidateRecord> {
        (field(), field(), field(), field()).prop_map(|(country, degree, major, sub_major)| {
            CandidateRecord {
                country,
                degree,
                major,
                sub_major,
            }
        })
    }

    proptest! {
        #[test]
        fn test_present_fields_are_dictionary_members(c in any_candidate()) {
            let dict = sample_dictionary();
            let record = validate(c, &dict).record;
            if let Some(v) = record.country() { prop_assert!(dict.is_valid_country(v)); }
            if let Some(v) = record.degree() { prop_assert!(dict.is_valid_degree(v)); }
            if let Some(v) = record.major() { prop_assert!(dict.is_valid_major(v)); }
        }

        #[test]
        fn test_sub_major_always_sits_under_major(c in any_candidate()) {
            let dict = sample_dictionary();
            let record = validate(c, &dict).record;
            if let Some(sub) = record.sub_major() {
                let major = record.major();
                prop_assert!(major.is_some());
                prop_assert!(dict.is_valid_sub_major(major.unwrap(), sub));
            }
        }

        #[test]
        fn test_validation_is_idempotent(c in any_candidate()) {
            let dict = sample_dictionary();
            let first = validate(c, &dict);
            let second = validate(CandidateRecord::from(&first.record), &dict);
            prop_assert!(second.warnings.is_empty());
            prop_assert_eq!(second.record, first.record);
        }

        #[test]
        fn test_every_dropped_value_is_reported(c in any_candidate()) {
            let dict = sample_dictionary();
            let present = [&c.country, &c.degree, &c.major, &c.sub_major]
                .iter()
                .filter(|v| v.is_some())
                .count();
            let outcome = validate(c, &dict);
            let kept = [
                outcome.record.country(),
                outcome.record.degree(),
                outcome.record.major(),
                outcome.record.sub_major(),
            ]
            .iter()
            .filter(|v| v.is_some())
            .count();
            prop_assert_eq!(kept + outcome.warnings.len(), present);
        }
    }
}
