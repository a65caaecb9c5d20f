// src/record.rs - Persisted alarm record shape
//
// Field declaration order is the serialized key order; keep it stable.
// Keys the record does not model are carried in `extra` and written back
// after the known ones.

use crate::value::FieldValue;
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Mapping;

/// One alarm as stored in the destination YAML list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmRecord {
    /// Unique identifier, also the sort key when output is ordered by id
    pub alarm_id: i64,

    /// Alarm name
    #[serde(deserialize_with = "scalar_text")]
    pub name: String,

    /// Text group
    pub text: TextGroup,

    /// Configuration group
    pub config: ConfigGroup,

    /// Unmodeled keys found in a persisted record
    #[serde(flatten)]
    pub extra: Mapping,
}

/// Text group of an alarm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextGroup {
    /// Main alarm text
    #[serde(deserialize_with = "scalar_text")]
    pub text: String,

    /// Enabled flag: a boolean when the source said yes/no, otherwise the
    /// original cell value
    pub text1: FieldValue,

    /// Recommended action
    #[serde(deserialize_with = "scalar_text")]
    pub text2: String,

    /// Unmodeled keys
    #[serde(flatten)]
    pub extra: Mapping,
}

/// Configuration group of an alarm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigGroup {
    /// Configuration level
    #[serde(deserialize_with = "scalar_text")]
    pub config: String,

    /// First sub-configuration
    #[serde(deserialize_with = "scalar_text")]
    pub subconfig1: String,

    /// Second sub-configuration
    #[serde(deserialize_with = "scalar_text")]
    pub subconfig2: String,

    /// Unmodeled keys
    #[serde(flatten)]
    pub extra: Mapping,
}

/// Accept any scalar where text is expected; hand-edited files often leave
/// numbers unquoted or values empty.
fn scalar_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    FieldValue::deserialize(deserializer).map(|value| value.to_string())
}

impl AlarmRecord {
    /// Shorthand used by tests and benches.
    pub fn new(alarm_id: i64, name: impl Into<String>) -> Self {
        Self {
            alarm_id,
            name: name.into(),
            text: TextGroup {
                text: String::new(),
                text1: FieldValue::empty(),
                text2: String::new(),
                extra: Mapping::new(),
            },
            config: ConfigGroup {
                config: String::new(),
                subconfig1: String::new(),
                subconfig2: String::new(),
                extra: Mapping::new(),
            },
            extra: Mapping::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_order_is_stable() {
        let mut record = AlarmRecord::new(7, "Pressão alta");
        record.text.text1 = FieldValue::Bool(true);
        record.config.subconfig2 = "z".to_string();
        record.config.config = "a".to_string();

        let yaml = serde_yaml::to_string(&record).unwrap();
        let keys: Vec<&str> = yaml
            .lines()
            .map(|line| line.trim_start().split(':').next().unwrap_or(""))
            .collect();

        assert_eq!(
            keys,
            vec![
                "alarm_id", "name", "text", "text", "text1", "text2", "config", "config",
                "subconfig1", "subconfig2"
            ]
        );
        assert!(yaml.contains("Pressão alta"), "non-ASCII text must stay verbatim");
    }

    #[test]
    fn test_missing_group_is_rejected() {
        let yaml = "alarm_id: 1\nname: x\ntext: {text: a, text1: true, text2: b}\n";
        assert!(serde_yaml::from_str::<AlarmRecord>(yaml).is_err());
    }

    #[test]
    fn test_unmodeled_keys_are_kept() {
        let yaml = "\
alarm_id: 1
name: x
priority: 9
text:
  text: a
  text1: true
  text2: b
  locale: pt-BR
config:
  config: c
  subconfig1: d
  subconfig2: e
";
        let record: AlarmRecord = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(record.extra.get("priority"), Some(&serde_yaml::Value::from(9)));
        assert_eq!(
            record.text.extra.get("locale"),
            Some(&serde_yaml::Value::from("pt-BR"))
        );
        assert!(record.config.extra.is_empty());

        let back: AlarmRecord =
            serde_yaml::from_str(&serde_yaml::to_string(&record).unwrap()).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_scalar_text_fields() {
        let yaml = "\
alarm_id: 3
name: 42
text:
  text: 1.5
  text1:
  text2: true
config:
  config: ~
  subconfig1: 10
  subconfig2: x
";
        let record: AlarmRecord = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(record.name, "42");
        assert_eq!(record.text.text, "1.5");
        assert_eq!(record.text.text1, FieldValue::Null);
        assert_eq!(record.text.text2, "true");
        assert_eq!(record.config.config, "");
        assert_eq!(record.config.subconfig1, "10");
    }

    #[test]
    fn test_nested_text_field_rejects_mapping() {
        let yaml = "\
alarm_id: 3
name: {nested: 1}
text: {text: a, text1: true, text2: b}
config: {config: c, subconfig1: d, subconfig2: e}
";
        assert!(serde_yaml::from_str::<AlarmRecord>(yaml).is_err());
    }
}
