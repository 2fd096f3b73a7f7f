//! Serde helpers for loosely typed JSON web service responses.

use serde::Deserialize;

/// A JSON field that holds either one value or an array of values.
///
/// Several services return a bare object when there is exactly one
/// result and an array otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    /// An array of values.
    Many(Vec<T>),
    /// A lone value.
    One(T),
}

impl<T> OneOrMany<T> {
    /// Normalizes to a sequence.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Many(values) => values,
            Self::One(value) => vec![value],
        }
    }
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

/// A number that some responses encode as a JSON string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(f64),
    Text(String),
}

impl NumberOrText {
    /// The numeric value, parsing the text form if needed.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(text) => text.trim().parse().ok(),
        }
    }

    /// The value as a non-negative integer, if it is one.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::float_cmp
    )]
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::Number(n) => {
                (n.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(n)).then(|| *n as u32)
            }
            Self::Text(text) => text.trim().parse().ok(),
        }
    }

    /// The value rendered as text, for identifiers.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn to_text(&self) -> String {
        match self {
            Self::Number(n) if n.fract() == 0.0 => format!("{n:.0}"),
            Self::Number(n) => n.to_string(),
            Self::Text(text) => text.trim().to_string(),
        }
    }
}
