//! Self-describing, string-keyed test options.
//!
//! Every test unit publishes an [`OptionDescriptor`] per option it
//! understands. The runner sets options by name with a raw string value;
//! units turn that string into a typed value with [`parse_value`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use thiserror::Error;

/// Declared type of an option value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OptionType {
    /// `true` / `false`.
    Bool,
    /// One of a fixed set of names.
    Enum {
        /// Accepted names, in display order.
        variants: Vec<String>,
    },
    /// Integer within an inclusive range.
    PositiveInt {
        /// Smallest accepted value.
        min: u32,
        /// Largest accepted value.
        max: u32,
    },
}

impl OptionType {
    /// Integer type accepting `1..=u32::MAX`.
    pub fn positive_int() -> Self {
        Self::PositiveInt {
            min: 1,
            max: u32::MAX,
        }
    }

    /// Enumeration type over the given names.
    pub fn enumeration(variants: &[&str]) -> Self {
        Self::Enum {
            variants: variants.iter().map(|v| v.to_string()).collect(),
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Enum { variants } => f.write_str(&variants.join("|")),
            Self::PositiveInt { min, max } => write!(f, "integer in {}..={}", min, max),
        }
    }
}

/// One entry of a test unit's option schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionDescriptor {
    /// Option name; unique within a schema.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Declared value type.
    #[serde(rename = "type")]
    pub ty: OptionType,
    /// String form of the value currently in effect.
    pub default: String,
}

impl OptionDescriptor {
    /// Create a descriptor.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        ty: OptionType,
        default: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ty,
            default: default.into(),
        }
    }
}

/// A value that can be read from, and rendered to, an option string.
pub trait OptionValue: Sized {
    /// Parse a raw option string, `None` if it is not a valid value.
    fn parse_option(raw: &str) -> Option<Self>;

    /// Render the value the way [`OptionValue::parse_option`] reads it.
    fn render_option(&self) -> String;

    /// Type advertised in option schemas.
    fn option_type() -> OptionType;
}

impl OptionValue for bool {
    fn parse_option(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }

    fn render_option(&self) -> String {
        self.to_string()
    }

    fn option_type() -> OptionType {
        OptionType::Bool
    }
}

impl OptionValue for NonZeroU32 {
    fn parse_option(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }

    fn render_option(&self) -> String {
        self.to_string()
    }

    fn option_type() -> OptionType {
        OptionType::positive_int()
    }
}

/// Parse a value of the expected type from a raw option string.
pub fn parse_value<T: OptionValue>(raw: &str) -> Option<T> {
    T::parse_option(raw)
}

/// Why setting an option failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetOptionError {
    /// No option with this name exists.
    #[error("unknown option: {name}")]
    UnknownOption {
        /// Requested option name.
        name: String,
    },

    /// The option exists but the value could not be parsed.
    #[error("invalid value {value:?} for option {name}: expected {expected}")]
    ParseError {
        /// Option name.
        name: String,
        /// Raw value that was rejected.
        value: String,
        /// Description of the accepted values.
        expected: String,
    },
}

impl SetOptionError {
    /// Unknown option error.
    pub fn unknown(name: impl Into<String>) -> Self {
        Self::UnknownOption { name: name.into() }
    }

    /// Parse error for a value that should have been a `T`.
    pub fn parse<T: OptionValue>(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::ParseError {
            name: name.into(),
            value: value.into(),
            expected: T::option_type().to_string(),
        }
    }

    /// Is this an unknown-option error?
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::UnknownOption { .. })
    }
}
