//! Typed attribute values that remember their source text.

use std::fmt;
use std::str::FromStr;

/// A declared typed attribute.
///
/// The raw decoded string is kept next to the parsed value and is what
/// gets written back, so `1.0` stays `1.0` and a malformed value survives
/// a rewrite untouched. `value()` is `None` when the raw text did not parse.
#[derive(Debug, Clone, PartialEq)]
pub struct Scalar<T> {
    raw: String,
    value: Option<T>,
}

impl<T> Scalar<T>
where
    T: FromStr + fmt::Display,
{
    /// Parses `raw`; on failure the raw text is kept and the value is `None`.
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let value = raw.trim().parse::<T>().ok();
        Self { raw, value }
    }

    pub fn new(value: T) -> Self {
        Self {
            raw: value.to_string(),
            value: Some(value),
        }
    }

    /// Replaces the value; the raw text is re-rendered from it.
    pub fn set(&mut self, value: T) {
        self.raw = value.to_string();
        self.value = Some(value);
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_valid(&self) -> bool {
        self.value.is_some()
    }
}

impl<T: Copy> Scalar<T> {
    /// Parsed value or the field's documented default.
    pub fn get_or(&self, default: T) -> T {
        self.value.unwrap_or(default)
    }
}

/// Documented default for an optional scalar slot.
pub fn scalar_or<T: Copy>(slot: &Option<Scalar<T>>, default: T) -> T {
    slot.as_ref().map_or(default, |scalar| scalar.get_or(default))
}

/// Boolean as the game files spell it: `true`/`false` in any case, `1`/`0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct XmlBool(pub bool);

impl FromStr for XmlBool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(XmlBool(true)),
            "false" | "0" => Ok(XmlBool(false)),
            other => Err(format!("not a boolean: {other}")),
        }
    }
}

impl fmt::Display for XmlBool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.0 { "true" } else { "false" })
    }
}

impl From<XmlBool> for bool {
    fn from(value: XmlBool) -> Self {
        value.0
    }
}
