//! Field-level validation for decoded request bodies.
//!
//! A [`Validator`] collects every failure for a request instead of stopping
//! at the first one, so a single 422 response can report all violations.
//! Checks never error or panic; the caller decides what an invalid result
//! means at the HTTP level (see [`Validator::into_result`]).
//!
//! ```rust
//! use films_api::validation::{self, Validator};
//!
//! let mut v = Validator::default();
//! v.check_field(validation::not_blank(""), "name", "This field must not be blank");
//! v.check_field(validation::min_chars("", 3), "name", "too short");
//! assert!(!v.is_valid());
//! assert_eq!(v.field_errors().get("name").map(String::as_str), Some("This field must not be blank"));
//! ```

use crate::errors::ApiError;
use regex::Regex;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Usernames must start with an ASCII letter.
#[expect(clippy::expect_used, reason = "pattern is a literal")]
pub static USERNAME_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[a-zA-Z]").expect("username pattern compiles"));

/// Key under which non-field errors are serialized.
pub const NON_FIELD_ERRORS_KEY: &str = "non_field_errors";

/// Accumulates validation failures for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validator {
    field_errors: BTreeMap<String, String>,
    non_field_errors: Vec<String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff no field or non-field error was recorded.
    pub fn is_valid(&self) -> bool {
        self.field_errors.is_empty() && self.non_field_errors.is_empty()
    }

    /// Record `message` for `field` unless the field already has one.
    pub fn add_field_error(&mut self, field: &str, message: &str) {
        self.field_errors
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    pub fn add_non_field_error(&mut self, message: &str) {
        self.non_field_errors.push(message.to_string());
    }

    /// Record `message` for `field` when `ok` is false. First failure per field wins.
    pub fn check_field(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.add_field_error(field, message);
        }
    }

    pub fn field_errors(&self) -> &BTreeMap<String, String> {
        &self.field_errors
    }

    pub fn non_field_errors(&self) -> &[String] {
        &self.non_field_errors
    }

    /// `Ok(())` when valid, otherwise an [`ApiError::Validation`] carrying every failure.
    pub fn into_result(self) -> Result<(), ApiError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(ApiError::Validation(self))
        }
    }
}

/// Field errors at the top level, non-field errors (when present) as a list.
impl Serialize for Validator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let extra = usize::from(!self.non_field_errors.is_empty());
        let mut map = serializer.serialize_map(Some(self.field_errors.len() + extra))?;
        for (field, message) in &self.field_errors {
            map.serialize_entry(field, message)?;
        }
        if !self.non_field_errors.is_empty() {
            map.serialize_entry(NON_FIELD_ERRORS_KEY, &self.non_field_errors)?;
        }
        map.end()
    }
}

pub fn not_blank(value: &str) -> bool {
    !value.trim().is_empty()
}

/// At most `n` Unicode code points.
pub fn max_chars(value: &str, n: usize) -> bool {
    value.chars().count() <= n
}

/// At least `n` Unicode code points.
pub fn min_chars(value: &str, n: usize) -> bool {
    value.chars().count() >= n
}

pub fn matches(value: &str, rx: &Regex) -> bool {
    rx.is_match(value)
}

pub fn not_empty<T>(values: &[T]) -> bool {
    !values.is_empty()
}

/// Decimal digits only, and not zero.
pub fn is_positive_integer_literal(value: &str) -> bool {
    !value.is_empty()
        && value.bytes().all(|b| b.is_ascii_digit())
        && value.bytes().any(|b| b != b'0')
}

/// At least one uppercase letter, one lowercase letter, one decimal digit,
/// and one character that is neither a letter nor a decimal digit.
///
/// Digits are ASCII `0-9`; other numeric characters such as `½` count as
/// symbols.
pub fn is_strong_password(value: &str) -> bool {
    let (mut upper, mut lower, mut digit, mut special) = (false, false, false, false);

    for c in value.chars() {
        if c.is_uppercase() {
            upper = true;
        } else if c.is_lowercase() {
            lower = true;
        } else if c.is_ascii_digit() {
            digit = true;
        } else if !c.is_alphabetic() {
            special = true;
        }
    }

    upper && lower && digit && special
}

pub fn permitted_value<T: PartialEq>(value: &T, permitted: &[T]) -> bool {
    permitted.contains(value)
}
