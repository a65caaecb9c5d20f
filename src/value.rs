// src/value.rs - Scalar cell values
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single scalar read from a spreadsheet cell or a persisted record.
///
/// Only the `text1` field of an alarm keeps a `FieldValue` once ingested;
/// every other field is rendered to text through the [`fmt::Display`] impl.
///
/// # Examples
///
/// ```rust
/// use alarm_merge::FieldValue;
///
/// assert_eq!(FieldValue::Int(42).to_string(), "42");
/// assert_eq!(FieldValue::Float(3.0).to_string(), "3");
/// assert_eq!(FieldValue::Float(2.5).to_string(), "2.5");
/// assert_eq!(FieldValue::Bool(true).to_string(), "true");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Explicit null, as left by an empty YAML value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value (64-bit)
    Int(i64),
    /// Floating-point value (64-bit)
    Float(f64),
    /// Text value, kept verbatim
    Text(String),
}

impl FieldValue {
    /// The empty text value used for blank cells.
    pub fn empty() -> Self {
        FieldValue::Text(String::new())
    }

    /// True for text that is empty after trimming.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Interpret the value as an alarm identifier.
    ///
    /// Integral floats are accepted since spreadsheet engines store every
    /// number as a float; text must hold a plain decimal integer.
    pub fn as_identifier(&self) -> Option<i64> {
        match self {
            FieldValue::Int(i) => Some(*i),
            FieldValue::Float(f) => float_to_int(*f),
            FieldValue::Text(s) => s.trim().parse::<i64>().ok(),
            FieldValue::Bool(_) | FieldValue::Null => None,
        }
    }

    /// Build a value from a float, collapsing integral values to [`FieldValue::Int`].
    pub fn from_number(f: f64) -> Self {
        match float_to_int(f) {
            Some(i) => FieldValue::Int(i),
            None => FieldValue::Float(f),
        }
    }
}

fn float_to_int(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is itself out of range
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_parsing() {
        assert_eq!(FieldValue::Int(7).as_identifier(), Some(7));
        assert_eq!(FieldValue::Float(12.0).as_identifier(), Some(12));
        assert_eq!(FieldValue::from(" 42 ").as_identifier(), Some(42));
        assert_eq!(FieldValue::from("-3").as_identifier(), Some(-3));

        assert_eq!(FieldValue::Float(2.5).as_identifier(), None);
        assert_eq!(FieldValue::Float(f64::NAN).as_identifier(), None);
        assert_eq!(FieldValue::from("5.0").as_identifier(), None);
        assert_eq!(FieldValue::from("12a").as_identifier(), None);
        assert_eq!(FieldValue::empty().as_identifier(), None);
        assert_eq!(FieldValue::Bool(true).as_identifier(), None);
    }

    #[test]
    fn test_number_collapsing() {
        assert_eq!(FieldValue::from_number(3.0), FieldValue::Int(3));
        assert_eq!(FieldValue::from_number(-0.5), FieldValue::Float(-0.5));
        assert_eq!(FieldValue::from_number(1e300), FieldValue::Float(1e300));
    }

    #[test]
    fn test_blank_detection() {
        assert!(FieldValue::empty().is_blank());
        assert!(FieldValue::from("   ").is_blank());
        assert!(FieldValue::Null.is_blank());
        assert!(!FieldValue::from("x").is_blank());
        assert!(!FieldValue::Int(0).is_blank());
    }

    #[test]
    fn test_yaml_scalars_keep_their_type() {
        let values = vec![
            FieldValue::Bool(false),
            FieldValue::Int(3),
            FieldValue::Float(1.5),
            FieldValue::from("true"),
            FieldValue::from("3"),
        ];
        let yaml = serde_yaml::to_string(&values).unwrap();
        let back: Vec<FieldValue> = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, values);
    }

    #[test]
    fn test_null_round_trips() {
        let back: Vec<FieldValue> = serde_yaml::from_str("- \n- ~\n- null\n").unwrap();
        assert_eq!(back, vec![FieldValue::Null; 3]);

        let yaml = serde_yaml::to_string(&back).unwrap();
        assert_eq!(serde_yaml::from_str::<Vec<FieldValue>>(&yaml).unwrap(), back);
        assert_eq!(FieldValue::Null.to_string(), "");
        assert_eq!(FieldValue::Null.as_identifier(), None);
    }
}
