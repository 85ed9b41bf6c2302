//! Turn-local validators.
//!
//! Pure functions evaluated before any state-advancing transition. None of
//! them touch the session; the controller decides what to do with the
//! outcome.

use thiserror::Error;

use super::settings::{MessageCatalog, Thresholds};
use crate::domain::foundation::text;

/// Description shorter than the configured minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("text too short: {actual} < {min}")]
pub struct TooShort {
    pub min: usize,
    pub actual: usize,
}

/// Accepts a trimmed problem description.
pub fn validate_description(raw: &str, thresholds: &Thresholds) -> Result<String, TooShort> {
    check_len(raw, thresholds.min_description_len)
}

/// Accepts a trimmed free-text location.
pub fn validate_location(raw: &str, thresholds: &Thresholds) -> Result<String, TooShort> {
    check_len(raw, thresholds.min_location_len)
}

fn check_len(raw: &str, min: usize) -> Result<String, TooShort> {
    let actual = text::trimmed_len(raw);
    if actual < min {
        Err(TooShort { min, actual })
    } else {
        Ok(raw.trim().to_string())
    }
}

/// Why a numbered-menu reply was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MenuError {
    #[error("reply is not a number")]
    NotANumber,
    #[error("choice outside 1..={max}")]
    OutOfRange { max: usize },
}

/// Parses a 1-based menu choice against a list of `len` entries and returns
/// the 0-based index.
pub fn parse_menu_choice(raw: &str, len: usize) -> Result<usize, MenuError> {
    let trimmed = raw.trim().trim_end_matches(['.', ')']);
    let choice: i64 = trimmed.parse().map_err(|_| MenuError::NotANumber)?;
    if choice < 1 || choice as u64 > len as u64 {
        return Err(MenuError::OutOfRange { max: len });
    }
    Ok(choice as usize - 1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationReply {
    Affirmative,
    Negative,
    Unrecognized,
}

/// Classifies a confirmation reply, ignoring case, accents and punctuation.
///
/// The whole normalized reply is matched first, then its first word, so
/// "sí, envíalo" is affirmative while "bueno" is not recognised.
pub fn classify_confirmation(raw: &str, messages: &MessageCatalog) -> ConfirmationReply {
    let normalized = text::normalize(raw);
    if normalized.is_empty() {
        return ConfirmationReply::Unrecognized;
    }

    let matches = |candidate: &str, list: &[String]| {
        list.iter().any(|w| text::normalize(w) == candidate)
    };

    for candidate in [normalized.as_str(), first_word(&normalized)] {
        if matches(candidate, &messages.affirmative_words) {
            return ConfirmationReply::Affirmative;
        }
        if matches(candidate, &messages.negative_words) {
            return ConfirmationReply::Negative;
        }
    }
    ConfirmationReply::Unrecognized
}

/// True when the reply asks to skip an optional media slot.
pub fn is_skip(raw: &str, messages: &MessageCatalog) -> bool {
    let normalized = text::normalize(raw);
    !normalized.is_empty()
        && messages
            .skip_words
            .iter()
            .any(|w| text::normalize(w) == normalized)
}

fn first_word(normalized: &str) -> &str {
    normalized.split(' ').next().unwrap_or(normalized)
}

/// Shape of a reply at the identity steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityInput {
    /// Not purely numeric; treated as small talk.
    NotIdentityLike,
    /// Exactly eight digits: a national id, or a student code of that length.
    EightDigits(String),
    /// Any other digit string: a student code.
    StudentCode(String),
}

pub fn parse_identity(raw: &str) -> IdentityInput {
    let digits = raw.trim();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return IdentityInput::NotIdentityLike;
    }
    if digits.len() == 8 {
        IdentityInput::EightDigits(digits.to_string())
    } else {
        IdentityInput::StudentCode(digits.to_string())
    }
}

/// A classifier's pick, before the confidence gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaCandidate {
    /// 0-based index into the area list the classifier was given.
    pub index: usize,
    pub confidence: u8,
    pub rationale: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassificationOutcome {
    Accepted(AreaCandidate),
    Abstained(AbstainReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbstainReason {
    NoCandidate,
    BelowThreshold { confidence: u8 },
    IndexOutOfRange { index: usize },
}

/// Applies the confidence gate. Anything below `threshold` abstains.
pub fn gate_classification(
    candidate: Option<AreaCandidate>,
    area_count: usize,
    threshold: u8,
) -> ClassificationOutcome {
    match candidate {
        None => ClassificationOutcome::Abstained(AbstainReason::NoCandidate),
        Some(c) if c.index >= area_count => {
            ClassificationOutcome::Abstained(AbstainReason::IndexOutOfRange { index: c.index })
        }
        Some(c) if c.confidence < threshold => {
            ClassificationOutcome::Abstained(AbstainReason::BelowThreshold {
                confidence: c.confidence,
            })
        }
        Some(c) => ClassificationOutcome::Accepted(c),
    }
}

/// True for text that already points at an uploaded image.
pub fn is_media_url(raw: &str) -> bool {
    let trimmed = raw.trim();
    let lower = trimmed.to_ascii_lowercase();
    (lower.starts_with("https://") || lower.starts_with("http://"))
        && !trimmed.contains(char::is_whitespace)
        && trimmed.len() > "https://".len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn thresholds() -> Thresholds {
        Thresholds::default()
    }

    mod description {
        use super::*;

        #[test]
        fn single_char_is_too_short() {
            let err = validate_description("a", &thresholds()).unwrap_err();
            assert_eq!(err, TooShort { min: 10, actual: 1 });
        }

        #[test]
        fn padding_does_not_count() {
            assert!(validate_description("   corto    ", &thresholds()).is_err());
            assert_eq!(
                validate_description("  el foco está roto  ", &thresholds()).unwrap(),
                "el foco está roto"
            );
        }

        #[test]
        fn location_uses_its_own_minimum() {
            assert!(validate_location("A1", &thresholds()).is_err());
            assert_eq!(validate_location("A12", &thresholds()).unwrap(), "A12");
        }
    }

    mod menu {
        use super::*;

        #[test]
        fn nine_of_five_is_out_of_range() {
            assert_eq!(parse_menu_choice("9", 5), Err(MenuError::OutOfRange { max: 5 }));
        }

        #[test]
        fn zero_and_negative_are_out_of_range() {
            assert_eq!(parse_menu_choice("0", 5), Err(MenuError::OutOfRange { max: 5 }));
            assert_eq!(parse_menu_choice("-1", 5), Err(MenuError::OutOfRange { max: 5 }));
        }

        #[test]
        fn words_are_not_numbers() {
            assert_eq!(parse_menu_choice("dos", 5), Err(MenuError::NotANumber));
            assert_eq!(parse_menu_choice("", 5), Err(MenuError::NotANumber));
        }

        #[test]
        fn accepts_trailing_punctuation() {
            assert_eq!(parse_menu_choice(" 3. ", 5), Ok(2));
            assert_eq!(parse_menu_choice("1)", 5), Ok(0));
        }
    }

    mod confirmation {
        use super::*;

        #[test]
        fn accented_si_is_affirmative() {
            let m = MessageCatalog::default();
            assert_eq!(classify_confirmation("sí", &m), ConfirmationReply::Affirmative);
            assert_eq!(classify_confirmation("SÍ!", &m), ConfirmationReply::Affirmative);
            assert_eq!(classify_confirmation("si, envíalo", &m), ConfirmationReply::Affirmative);
            assert_eq!(classify_confirmation("De acuerdo", &m), ConfirmationReply::Affirmative);
        }

        #[test]
        fn no_is_negative() {
            let m = MessageCatalog::default();
            assert_eq!(classify_confirmation("no", &m), ConfirmationReply::Negative);
            assert_eq!(classify_confirmation("No, corregir", &m), ConfirmationReply::Negative);
        }

        #[test]
        fn other_replies_are_unrecognized() {
            let m = MessageCatalog::default();
            assert_eq!(classify_confirmation("tal vez", &m), ConfirmationReply::Unrecognized);
            assert_eq!(classify_confirmation("   ", &m), ConfirmationReply::Unrecognized);
        }

        #[test]
        fn skip_words_match_whole_reply() {
            let m = MessageCatalog::default();
            assert!(is_skip("Omitir", &m));
            assert!(is_skip("no tengo", &m));
            assert!(!is_skip("omitir la foto por favor", &m));
        }
    }

    mod identity {
        use super::*;

        #[test]
        fn eight_digits_route_to_staff_first() {
            assert_eq!(
                parse_identity("73788334"),
                IdentityInput::EightDigits("73788334".into())
            );
        }

        #[test]
        fn other_lengths_are_student_codes() {
            assert_eq!(
                parse_identity(" 201422107 "),
                IdentityInput::StudentCode("201422107".into())
            );
        }

        #[test]
        fn mixed_text_is_small_talk() {
            assert_eq!(parse_identity("hola"), IdentityInput::NotIdentityLike);
            assert_eq!(parse_identity("7378 8334"), IdentityInput::NotIdentityLike);
            assert_eq!(parse_identity(""), IdentityInput::NotIdentityLike);
        }
    }

    mod gate {
        use super::*;

        fn candidate(index: usize, confidence: u8) -> Option<AreaCandidate> {
            Some(AreaCandidate {
                index,
                confidence,
                rationale: String::new(),
            })
        }

        #[test]
        fn threshold_is_inclusive() {
            assert!(matches!(
                gate_classification(candidate(0, 70), 3, 70),
                ClassificationOutcome::Accepted(_)
            ));
            assert_eq!(
                gate_classification(candidate(0, 69), 3, 70),
                ClassificationOutcome::Abstained(AbstainReason::BelowThreshold { confidence: 69 })
            );
        }

        #[test]
        fn bad_index_abstains() {
            assert_eq!(
                gate_classification(candidate(3, 99), 3, 70),
                ClassificationOutcome::Abstained(AbstainReason::IndexOutOfRange { index: 3 })
            );
        }
    }

    #[test]
    fn media_urls() {
        assert!(is_media_url("https://cdn.campus.edu/f.jpg"));
        assert!(is_media_url(" http://x.io/a.png "));
        assert!(!is_media_url("https://"));
        assert!(!is_media_url("mira https://x.io/a.png"));
        assert!(!is_media_url("ftp://x.io/a.png"));
    }

    proptest! {
        #[test]
        fn menu_choice_in_range_round_trips(len in 1usize..50, pick in 0usize..50) {
            prop_assume!(pick < len);
            let reply = (pick + 1).to_string();
            prop_assert_eq!(parse_menu_choice(&reply, len), Ok(pick));
        }

        #[test]
        fn menu_choice_above_len_is_rejected(len in 0usize..50, extra in 1usize..100) {
            let reply = (len + extra).to_string();
            prop_assert_eq!(parse_menu_choice(&reply, len), Err(MenuError::OutOfRange { max: len }));
        }

        #[test]
        fn description_accepts_iff_long_enough(s in "\\PC{0,40}") {
            let t = thresholds();
            let ok = validate_description(&s, &t).is_ok();
            prop_assert_eq!(ok, s.trim().chars().count() >= t.min_description_len);
        }

        #[test]
        fn gate_never_accepts_below_threshold(confidence in 0u8..=100, threshold in 0u8..=100) {
            let c = Some(AreaCandidate { index: 0, confidence, rationale: String::new() });
            let accepted = matches!(gate_classification(c, 1, threshold), ClassificationOutcome::Accepted(_));
            prop_assert_eq!(accepted, confidence >= threshold);
        }
    }
}
