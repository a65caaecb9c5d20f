// src/config.rs - Merge configuration: column layout, tokens, output order

use crate::error::{MergeError, Result};
use crate::transform::BooleanTokens;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

// ============================================================================
// MAIN CONFIGURATION
// ============================================================================

/// Main merge configuration
///
/// Every section is optional in YAML; an empty document yields the
/// positional layout, the `sim`/`não` tokens and append ordering.
///
/// ```yaml
/// layout:
///   mode: named
///   columns:
///     alarm_id: "ID do Alarme"
///     name: "Nome do Alarme"
///     text: "Texto Principal"
///     text1: "Habilitado"
///     text2: "Ação Recomendada"
///     config: "Nível de Configuração"
///     subconfig1: "Sub-Config 1"
///     subconfig2: "Sub-Config 2"
/// tokens:
///   yes: "sim"
///   no: "não"
/// order: sort
/// sheet: "Alarmes"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergeConfig {
    /// How source columns map to alarm fields
    #[serde(default)]
    pub layout: ColumnLayout,

    /// Words recognised as yes/no in the enabled column
    #[serde(default)]
    pub tokens: BooleanTokens,

    /// Final ordering of the merged collection
    #[serde(default)]
    pub order: OutputOrder,

    /// Worksheet to read (None = first sheet)
    #[serde(default)]
    pub sheet: Option<String>,
}

impl MergeConfig {
    /// Load and validate a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate a configuration document
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // an empty file is a valid, all-defaults configuration
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: MergeConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check layout, tokens and sheet name for consistency
    pub fn validate(&self) -> Result<()> {
        self.layout.validate()?;
        self.tokens.validate()?;
        if let Some(sheet) = &self.sheet {
            if sheet.trim().is_empty() {
                return Err(MergeError::Config("sheet name must not be empty".to_string()));
            }
        }
        Ok(())
    }

    /// Header handling implied by the layout
    pub fn header_mode(&self) -> HeaderMode {
        self.layout.header_mode()
    }
}

// ============================================================================
// FIELDS
// ============================================================================

/// The eight logical alarm fields a source column can feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// `alarm_id`
    AlarmId,
    /// `name`
    Name,
    /// `text.text`
    Text,
    /// `text.text1`, the enabled flag
    Text1,
    /// `text.text2`
    Text2,
    /// `config.config`
    Config,
    /// `config.subconfig1`
    Subconfig1,
    /// `config.subconfig2`
    Subconfig2,
}

impl Field {
    /// Every field, in record key order
    pub const ALL: [Field; 8] = [
        Field::AlarmId,
        Field::Name,
        Field::Text,
        Field::Text1,
        Field::Text2,
        Field::Config,
        Field::Subconfig1,
        Field::Subconfig2,
    ];

    /// Key of the field inside its record group
    pub fn key(&self) -> &'static str {
        match self {
            Field::AlarmId => "alarm_id",
            Field::Name => "name",
            Field::Text => "text",
            Field::Text1 => "text1",
            Field::Text2 => "text2",
            Field::Config => "config",
            Field::Subconfig1 => "subconfig1",
            Field::Subconfig2 => "subconfig2",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One column reference per logical field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMap<T> {
    /// [`Field::AlarmId`]
    pub alarm_id: T,
    /// [`Field::Name`]
    pub name: T,
    /// [`Field::Text`]
    pub text: T,
    /// [`Field::Text1`]
    pub text1: T,
    /// [`Field::Text2`]
    pub text2: T,
    /// [`Field::Config`]
    pub config: T,
    /// [`Field::Subconfig1`]
    pub subconfig1: T,
    /// [`Field::Subconfig2`]
    pub subconfig2: T,
}

impl<T> FieldMap<T> {
    /// Column reference for `field`
    pub fn get(&self, field: Field) -> &T {
        match field {
            Field::AlarmId => &self.alarm_id,
            Field::Name => &self.name,
            Field::Text => &self.text,
            Field::Text1 => &self.text1,
            Field::Text2 => &self.text2,
            Field::Config => &self.config,
            Field::Subconfig1 => &self.subconfig1,
            Field::Subconfig2 => &self.subconfig2,
        }
    }

    /// Pairs in [`Field::ALL`] order
    pub fn iter(&self) -> impl Iterator<Item = (Field, &T)> + '_ {
        Field::ALL.into_iter().map(move |field| (field, self.get(field)))
    }
}

// ============================================================================
// COLUMN LAYOUT
// ============================================================================

/// How a source row maps onto alarm fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ColumnLayout {
    /// Zero-based column positions, no header row
    Positional {
        /// Position per field
        columns: FieldMap<usize>,
    },

    /// Header titles looked up in the first row
    Named {
        /// Header title per field
        columns: FieldMap<String>,
    },
}

impl Default for ColumnLayout {
    fn default() -> Self {
        ColumnLayout::Positional {
            columns: FieldMap {
                alarm_id: 0,
                name: 1,
                text: 2,
                text1: 3,
                text2: 4,
                config: 5,
                subconfig1: 6,
                subconfig2: 7,
            },
        }
    }
}

impl ColumnLayout {
    /// The stock header titles of the alarm spreadsheet
    pub fn default_named() -> Self {
        ColumnLayout::Named {
            columns: FieldMap {
                alarm_id: "ID do Alarme".to_string(),
                name: "Nome do Alarme".to_string(),
                text: "Texto Principal".to_string(),
                text1: "Habilitado".to_string(),
                text2: "Ação Recomendada".to_string(),
                config: "Nível de Configuração".to_string(),
                subconfig1: "Sub-Config 1".to_string(),
                subconfig2: "Sub-Config 2".to_string(),
            },
        }
    }

    /// True for header-title layouts
    pub fn is_named(&self) -> bool {
        matches!(self, ColumnLayout::Named { .. })
    }

    /// Header handling this layout needs from the reader
    pub fn header_mode(&self) -> HeaderMode {
        match self {
            ColumnLayout::Positional { .. } => HeaderMode::None,
            ColumnLayout::Named { .. } => HeaderMode::FirstRow,
        }
    }

    /// Two fields may not read the same column, and titles may not be blank.
    pub fn validate(&self) -> Result<()> {
        match self {
            ColumnLayout::Positional { columns } => {
                let mut seen: HashMap<usize, Field> = HashMap::new();
                for (field, &position) in columns.iter() {
                    if let Some(other) = seen.insert(position, field) {
                        return Err(MergeError::Config(format!(
                            "fields '{}' and '{}' both map to column {}",
                            other, field, position
                        )));
                    }
                }
            }
            ColumnLayout::Named { columns } => {
                let mut seen: HashMap<&str, Field> = HashMap::new();
                for (field, title) in columns.iter() {
                    let title = title.trim();
                    if title.is_empty() {
                        return Err(MergeError::Config(format!(
                            "field '{}' has an empty column title",
                            field
                        )));
                    }
                    if let Some(other) = seen.insert(title, field) {
                        return Err(MergeError::Config(format!(
                            "fields '{}' and '{}' both map to column '{}'",
                            other, field, title
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Whether the first source row is data or a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderMode {
    /// Every row is data
    None,
    /// The first non-blank row holds column titles
    FirstRow,
}

// ============================================================================
// OUTPUT ORDER
// ============================================================================

/// Ordering of the collection written back to the destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputOrder {
    /// Existing records first, in file order, then new ones in row order
    #[default]
    Append,

    /// Everything sorted ascending by `alarm_id`
    #[serde(alias = "sort_by_id")]
    Sort,
}

impl FromStr for OutputOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "append" => Ok(OutputOrder::Append),
            "sort" | "sort_by_id" => Ok(OutputOrder::Sort),
            other => Err(format!("unknown order '{}', expected 'append' or 'sort'", other)),
        }
    }
}

impl fmt::Display for OutputOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputOrder::Append => f.write_str("append"),
            OutputOrder::Sort => f.write_str("sort"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = MergeConfig::from_yaml("").unwrap();
        assert_eq!(config, MergeConfig::default());
        assert_eq!(config.header_mode(), HeaderMode::None);
        assert_eq!(config.order, OutputOrder::Append);
    }

    #[test]
    fn test_named_layout_from_yaml() {
        let yaml = r#"
layout:
  mode: named
  columns:
    alarm_id: "ID do Alarme"
    name: "Nome do Alarme"
    text: "Texto Principal"
    text1: "Habilitado"
    text2: "Ação Recomendada"
    config: "Nível de Configuração"
    subconfig1: "Sub-Config 1"
    subconfig2: "Sub-Config 2"
order: sort
"#;
        let config = MergeConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.layout, ColumnLayout::default_named());
        assert_eq!(config.header_mode(), HeaderMode::FirstRow);
        assert_eq!(config.order, OutputOrder::Sort);
        assert_eq!(config.tokens, BooleanTokens::default());
    }

    #[test]
    fn test_duplicate_positions_rejected() {
        let yaml = r#"
layout:
  mode: positional
  columns: { alarm_id: 0, name: 1, text: 2, text1: 3, text2: 4, config: 5, subconfig1: 6, subconfig2: 1 }
"#;
        let err = MergeConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, MergeError::Config(ref msg) if msg.contains("column 1")));
    }

    #[test]
    fn test_blank_title_rejected() {
        let mut layout = ColumnLayout::default_named();
        if let ColumnLayout::Named { columns } = &mut layout {
            columns.text2 = "  ".to_string();
        }
        assert!(matches!(layout.validate(), Err(MergeError::Config(_))));
    }

    #[test]
    fn test_incomplete_layout_rejected() {
        let yaml = "layout:\n  mode: positional\n  columns: { alarm_id: 0 }\n";
        assert!(matches!(MergeConfig::from_yaml(yaml), Err(MergeError::Yaml(_))));
    }

    #[test]
    fn test_order_parsing() {
        assert_eq!("append".parse::<OutputOrder>(), Ok(OutputOrder::Append));
        assert_eq!("SORT".parse::<OutputOrder>(), Ok(OutputOrder::Sort));
        assert!("random".parse::<OutputOrder>().is_err());
    }
}
