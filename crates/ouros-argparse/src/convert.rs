//! Type converters and choice sets.
//!
//! A [`ValueType`] is a named, fallible `&str -> Value` function. The engine never
//! inspects what a converter does: it calls it, and on failure reports either the
//! converter's own message or the generic `invalid <name> value: '<token>'` form.

use std::{fmt, ops::Range, sync::Arc};

use crate::value::Value;

/// Failure returned by a converter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// The token is not a valid literal for the converter; reported generically.
    Invalid,
    /// The converter supplies its own message, reported verbatim.
    Message(String),
}

impl ConversionError {
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

/// Ranges with more members than this are shown as `range(start, stop)`.
const LISTED_RANGE_LIMIT: i64 = 64;

type ConvertFn = dyn Fn(&str) -> Result<Value, ConversionError> + Send + Sync;

/// A named converter from a raw token to a [`Value`].
#[derive(Clone)]
pub struct ValueType {
    name: String,
    convert: Arc<ConvertFn>,
}

impl ValueType {
    /// Wraps an arbitrary conversion function.
    ///
    /// `name` is used in generic error messages (`invalid <name> value`) and in the
    /// `%(type)s` help placeholder.
    pub fn custom<F>(name: impl Into<String>, convert: F) -> Self
    where
        F: Fn(&str) -> Result<Value, ConversionError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            convert: Arc::new(convert),
        }
    }

    /// Identity conversion to [`Value::Str`].
    #[must_use]
    pub fn string() -> Self {
        Self::custom("str", |raw| Ok(Value::Str(raw.to_owned())))
    }

    #[must_use]
    pub fn int() -> Self {
        Self::custom("int", |raw| {
            let trimmed = raw.trim();
            let digits = trimmed.replace('_', "");
            if digits.is_empty() || trimmed.starts_with('_') || trimmed.ends_with('_') {
                return Err(ConversionError::Invalid);
            }
            digits.parse::<i64>().map(Value::Int).map_err(|_| ConversionError::Invalid)
        })
    }

    #[must_use]
    pub fn float() -> Self {
        Self::custom("float", |raw| {
            let trimmed = raw.trim();
            match trimmed.to_ascii_lowercase().as_str() {
                "nan" | "+nan" | "-nan" => Ok(Value::Float(f64::NAN)),
                "inf" | "+inf" | "infinity" | "+infinity" => Ok(Value::Float(f64::INFINITY)),
                "-inf" | "-infinity" => Ok(Value::Float(f64::NEG_INFINITY)),
                _ => trimmed
                    .parse::<f64>()
                    .map(Value::Float)
                    .map_err(|_| ConversionError::Invalid),
            }
        })
    }

    /// Accepts `true/false`, `yes/no`, `on/off` and `1/0`, case-insensitively.
    #[must_use]
    pub fn bool() -> Self {
        Self::custom("bool", |raw| match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(Value::Bool(true)),
            "false" | "no" | "off" | "0" => Ok(Value::Bool(false)),
            _ => Err(ConversionError::Invalid),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn convert(&self, raw: &str) -> Result<Value, ConversionError> {
        (self.convert)(raw)
    }
}

impl fmt::Debug for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ValueType").field(&self.name).finish()
    }
}

/// The set of values an argument accepts after conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum Choices {
    Values(Vec<Value>),
    /// Half-open integer range, like Python's `range(start, stop)`.
    Range(Range<i64>),
}

impl Choices {
    pub fn values<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::Values(values.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn contains(&self, value: &Value) -> bool {
        match self {
            Self::Values(values) => values.iter().any(|choice| choice == value),
            Self::Range(range) => value.as_int().is_some_and(|i| range.contains(&i)),
        }
    }

    fn rendered(&self, render: impl Fn(&Value) -> String) -> Vec<String> {
        match self {
            Self::Values(values) => values.iter().map(render).collect(),
            Self::Range(range)
                if range
                    .end
                    .checked_sub(range.start)
                    .is_none_or(|len| len > LISTED_RANGE_LIMIT) =>
            {
                vec![format!("range({}, {})", range.start, range.end)]
            }
            Self::Range(range) => range.clone().map(|i| render(&Value::Int(i))).collect(),
        }
    }

    /// `5, 6, 7` / `'rock', 'paper'` / `range(0, 1000)`, as listed in invalid-choice messages.
    #[must_use]
    pub fn describe(&self) -> String {
        self.rendered(Value::repr).join(", ")
    }

    /// `{rock,paper,scissors}`, the metavar shown when none is configured.
    #[must_use]
    pub fn metavar(&self) -> String {
        format!("{{{}}}", self.rendered(ToString::to_string).join(","))
    }

    /// Plain comma separated listing used by the `%(choices)s` placeholder.
    #[must_use]
    pub fn listing(&self) -> String {
        self.rendered(ToString::to_string).join(", ")
    }
}

impl From<Range<i64>> for Choices {
    fn from(range: Range<i64>) -> Self {
        Self::Range(range)
    }
}

impl<V: Into<Value>> From<Vec<V>> for Choices {
    fn from(values: Vec<V>) -> Self {
        Self::values(values)
    }
}
