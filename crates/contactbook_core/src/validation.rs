//! Field validators for contact and group input.
//!
//! # Responsibility
//! - Check raw user input for contact names, phone numbers and group names.
//! - Return the normalized value that models and registries persist.
//!
//! # Invariants
//! - Validators are pure: same input, same result, no I/O.
//! - Phone normalization is idempotent: validating an already-normalized
//!   number yields the same number.
//! - Lengths are counted in Unicode scalar values, not bytes.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const CONTACT_NAME_MIN_CHARS: usize = 2;
pub const CONTACT_NAME_MAX_CHARS: usize = 100;
pub const GROUP_NAME_MAX_CHARS: usize = 50;

const PHONE_NATIONAL_DIGITS: usize = 10;
const PHONE_FULL_DIGITS: usize = 11;
const PHONE_MOBILE_PREFIX: char = '9';

static CONTACT_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Zа-яА-ЯёЁ\s\-']+$").expect("valid contact name regex")
});
static REPEATED_WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s{2,}").expect("valid whitespace regex"));

/// Input field a validation failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    ContactName,
    Phone,
    GroupName,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ContactName => "name",
            Self::Phone => "phone",
            Self::GroupName => "group_name",
        }
    }
}

/// Why a field value was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Required(Field),
    TooShort { field: Field, min: usize },
    TooLong { field: Field, max: usize },
    InvalidCharacters(Field),
    RepeatedWhitespace(Field),
    /// Digit count outside the accepted 10..=11 range.
    PhoneLength(usize),
    /// Digit count is fine but the prefix is not a mobile number.
    PhonePrefix(String),
}

impl ValidationError {
    pub fn field(&self) -> Field {
        match self {
            Self::Required(field)
            | Self::TooShort { field, .. }
            | Self::TooLong { field, .. }
            | Self::InvalidCharacters(field)
            | Self::RepeatedWhitespace(field) => *field,
            Self::PhoneLength(_) | Self::PhonePrefix(_) => Field::Phone,
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Required(field) => write!(f, "{} is required", field.as_str()),
            Self::TooShort { field, min } => {
                write!(f, "{} must be at least {min} characters long", field.as_str())
            }
            Self::TooLong { field, max } => {
                write!(f, "{} cannot exceed {max} characters", field.as_str())
            }
            Self::InvalidCharacters(field) => {
                write!(f, "{} contains invalid characters", field.as_str())
            }
            Self::RepeatedWhitespace(field) => {
                write!(f, "{} contains repeated whitespace", field.as_str())
            }
            Self::PhoneLength(count) => {
                write!(f, "phone number must have 10 or 11 digits, got {count}")
            }
            Self::PhonePrefix(digits) => write!(
                f,
                "phone number with {} digits has an unsupported prefix",
                digits.len()
            ),
        }
    }
}

impl Error for ValidationError {}

pub type ValidationResult = Result<String, ValidationError>;

/// Validates a contact display name and returns it trimmed.
pub fn validate_contact_name(raw: &str) -> ValidationResult {
    let field = Field::ContactName;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required(field));
    }

    let chars = trimmed.chars().count();
    if chars < CONTACT_NAME_MIN_CHARS {
        return Err(ValidationError::TooShort {
            field,
            min: CONTACT_NAME_MIN_CHARS,
        });
    }
    if chars > CONTACT_NAME_MAX_CHARS {
        return Err(ValidationError::TooLong {
            field,
            max: CONTACT_NAME_MAX_CHARS,
        });
    }
    if !CONTACT_NAME_RE.is_match(trimmed) {
        return Err(ValidationError::InvalidCharacters(field));
    }
    if REPEATED_WHITESPACE_RE.is_match(trimmed) {
        return Err(ValidationError::RepeatedWhitespace(field));
    }

    Ok(trimmed.to_string())
}

/// Validates a phone number and returns it as `+7 (XXX) XXX-XX-XX`.
///
/// Accepted digit shapes after stripping everything that is not `0-9`:
/// - 10 digits starting with `9` (national mobile number without prefix);
/// - 11 digits starting with `7` or `8`, followed by `9`.
pub fn validate_phone_number(raw: &str) -> ValidationResult {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(ValidationError::Required(Field::Phone));
    }

    let full = match digits.len() {
        PHONE_NATIONAL_DIGITS if digits.starts_with(PHONE_MOBILE_PREFIX) => {
            format!("7{digits}")
        }
        PHONE_FULL_DIGITS if is_full_mobile_number(&digits) => digits,
        PHONE_NATIONAL_DIGITS | PHONE_FULL_DIGITS => {
            return Err(ValidationError::PhonePrefix(digits));
        }
        other => return Err(ValidationError::PhoneLength(other)),
    };

    format_phone_number(&full).ok_or(ValidationError::PhoneLength(full.len()))
}

/// Validates a group name and returns it trimmed.
pub fn validate_group_name(raw: &str) -> ValidationResult {
    let field = Field::GroupName;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required(field));
    }
    if trimmed.chars().count() > GROUP_NAME_MAX_CHARS {
        return Err(ValidationError::TooLong {
            field,
            max: GROUP_NAME_MAX_CHARS,
        });
    }
    Ok(trimmed.to_string())
}

/// Formats an 11-digit number as `+7 (XXX) XXX-XX-XX`.
///
/// The leading digit is replaced by the `+7` country code. Returns `None` when
/// `digits` is not exactly 11 ASCII digits.
pub fn format_phone_number(digits: &str) -> Option<String> {
    if digits.len() != PHONE_FULL_DIGITS || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(format!(
        "+7 ({}) {}-{}-{}",
        digits.get(1..4)?,
        digits.get(4..7)?,
        digits.get(7..9)?,
        digits.get(9..11)?
    ))
}

/// Masks a phone number for log output, keeping the last two digits.
pub(crate) fn mask_phone(phone: &str) -> String {
    let digits: Vec<char> = phone.chars().filter(char::is_ascii_digit).collect();
    let tail: String = digits
        .iter()
        .skip(digits.len().saturating_sub(2))
        .collect();
    format!("***{tail}")
}

fn is_full_mobile_number(digits: &str) -> bool {
    let mut chars = digits.chars();
    matches!(chars.next(), Some('7' | '8')) && chars.next() == Some(PHONE_MOBILE_PREFIX)
}
