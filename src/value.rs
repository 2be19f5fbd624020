use std::borrow::Cow;

use serde::{Serialize, Serializer};

use crate::num::number::{
    parse_color, parse_float, parse_integer, write_color_into, write_float_into,
    write_integer_into,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, u8::MAX)
    }

    pub fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Scalar payload of a leaf node. An absent value is `Option::None` on the
/// node, never a variant here.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Color(Color),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Text as it would appear between quotes in a KeyValues file.
    pub fn to_kv_string(&self) -> Cow<'_, str> {
        let mut out = String::new();
        match self {
            Value::String(value) => return Cow::Borrowed(value.as_str()),
            Value::Integer(value) => write_integer_into(&mut out, *value),
            Value::Float(value) => write_float_into(&mut out, *value),
            Value::Color(color) => write_color_into(&mut out, *color),
        }
        Cow::Owned(out)
    }

    pub fn to_int(&self) -> Option<i64> {
        match self {
            Value::String(value) => parse_integer(value),
            Value::Integer(value) => Some(*value),
            Value::Float(value) if value.is_finite() => Some(value.round() as i64),
            Value::Float(_) | Value::Color(_) => None,
        }
    }

    pub fn to_float(&self) -> Option<f64> {
        match self {
            Value::String(value) => parse_float(value),
            Value::Integer(value) => Some(*value as f64),
            Value::Float(value) => Some(*value),
            Value::Color(_) => None,
        }
    }

    pub fn to_color(&self) -> Option<Color> {
        match self {
            Value::String(value) => parse_color(value),
            Value::Color(color) => Some(*color),
            Value::Integer(_) | Value::Float(_) => None,
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<Color> for Value {
    fn from(value: Color) -> Self {
        Value::Color(value)
    }
}

// Object notation only carries strings, matching the byte transcoder.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_kv_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    fn test_to_kv_string() {
        assert_eq!(Value::from("text").to_kv_string(), "text");
        assert_eq!(Value::Integer(-7).to_kv_string(), "-7");
        assert_eq!(Value::Float(0.25).to_kv_string(), "0.25");
        assert_eq!(Value::Color(Color::rgb(10, 20, 30)).to_kv_string(), "10 20 30");
    }

    #[rstest::rstest]
    fn test_conversions() {
        assert_eq!(Value::from("12").to_int(), Some(12));
        assert_eq!(Value::from("twelve").to_int(), None);
        assert_eq!(Value::Float(2.6).to_int(), Some(3));
        assert_eq!(Value::from("1.5").to_float(), Some(1.5));
        assert_eq!(Value::Integer(3).to_float(), Some(3.0));
        assert_eq!(
            Value::from("255 0 0").to_color(),
            Some(Color::rgb(255, 0, 0))
        );
        assert_eq!(Value::Integer(1).to_color(), None);
        assert_eq!(Value::Integer(1).as_str(), None);
    }

    #[rstest::rstest]
    fn test_serialize_as_string() {
        let json = serde_json::to_string(&Value::Integer(5)).unwrap();
        assert_eq!(json, "\"5\"");
    }
}
