//! Tri-state option values.
//!
//! A connection option can be absent, explicitly cleared with an empty
//! string, or set. Absent options inherit from lower-precedence sources;
//! cleared options stop inheritance and resolve to "no value".

use std::fmt;

use crate::error::ResolveError;

/// Value of one connection option in one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue<T> {
    /// The source did not mention the option.
    Unset,
    /// The source gave an empty value, clearing anything inherited.
    Cleared,
    /// The source gave a value.
    Set(T),
}

impl<T> Default for OptionValue<T> {
    fn default() -> Self {
        Self::Unset
    }
}

impl<T> OptionValue<T> {
    /// Returns true when the source mentioned the option at all.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        !matches!(self, Self::Unset)
    }

    /// Returns true when the source gave a non-empty value.
    #[must_use]
    pub const fn is_set(&self) -> bool {
        matches!(self, Self::Set(_))
    }

    /// Borrows the contained value.
    #[must_use]
    pub const fn as_ref(&self) -> OptionValue<&T> {
        match self {
            Self::Unset => OptionValue::Unset,
            Self::Cleared => OptionValue::Cleared,
            Self::Set(value) => OptionValue::Set(value),
        }
    }

    /// Layers `self` over a lower-precedence value.
    #[must_use]
    pub fn or(self, lower: Self) -> Self {
        match self {
            Self::Unset => lower,
            other => other,
        }
    }

    /// Resolves against an inherited value.
    #[must_use]
    pub fn resolve(self, inherited: Option<T>) -> Option<T> {
        match self {
            Self::Unset => inherited,
            Self::Cleared => None,
            Self::Set(value) => Some(value),
        }
    }

    /// Converts the value, keeping the state.
    pub fn map<U, F>(self, convert: F) -> OptionValue<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Unset => OptionValue::Unset,
            Self::Cleared => OptionValue::Cleared,
            Self::Set(value) => OptionValue::Set(convert(value)),
        }
    }
}

impl OptionValue<String> {
    /// Interprets a raw string option: absent is unset, empty is cleared.
    #[must_use]
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            None => Self::Unset,
            Some(value) if value.is_empty() => Self::Cleared,
            Some(value) => Self::Set(value.to_owned()),
        }
    }
}

impl<T> OptionValue<T> {
    /// Interprets and parses a raw option value.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidValue`] naming `option` when `parse`
    /// rejects a non-empty value.
    pub fn parse<F, E>(option: &'static str, raw: Option<&str>, parse: F) -> Result<Self, ResolveError>
    where
        F: FnOnce(&str) -> Result<T, E>,
        E: fmt::Display,
    {
        match OptionValue::<String>::from_raw(raw) {
            OptionValue::Unset => Ok(Self::Unset),
            OptionValue::Cleared => Ok(Self::Cleared),
            OptionValue::Set(value) => parse(value.trim())
                .map(Self::Set)
                .map_err(|error| ResolveError::invalid_value(option, error.to_string())),
        }
    }
}

impl<T> From<Option<T>> for OptionValue<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Unset, Self::Set)
    }
}

/// Parses the boolean spellings accepted for `verify`.
///
/// # Errors
///
/// Returns a message when the text is not a recognised boolean.
pub fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(format!("'{other}' is not a boolean")),
    }
}

/// Parses a strictly positive integer.
///
/// # Errors
///
/// Returns a message for non-numeric input or zero.
pub fn parse_positive(raw: &str) -> Result<u32, String> {
    match raw.parse::<u32>() {
        Ok(0) => Err(String::from("must be a positive integer")),
        Ok(value) => Ok(value),
        Err(error) => Err(format!("'{raw}' is not a positive integer: {error}")),
    }
}
