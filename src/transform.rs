// src/transform.rs - Yes/no normalization for the enabled flag
use crate::error::{MergeError, Result};
use crate::value::FieldValue;
use serde::{Deserialize, Serialize};

/// The pair of words that map to `true` and `false`.
///
/// Matching trims surrounding whitespace and ignores case (Unicode-aware),
/// so `" NÃO "` matches the default `no` token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BooleanTokens {
    /// Normalized to `true`
    #[serde(default = "default_yes")]
    pub yes: String,

    /// Normalized to `false`
    #[serde(default = "default_no")]
    pub no: String,
}

impl Default for BooleanTokens {
    fn default() -> Self {
        Self {
            yes: default_yes(),
            no: default_no(),
        }
    }
}

fn default_yes() -> String { "sim".to_string() }
fn default_no() -> String { "não".to_string() }

fn fold(s: &str) -> String {
    s.trim().to_lowercase()
}

impl BooleanTokens {
    /// Token pair; not validated until [`BooleanTokens::validate`]
    pub fn new(yes: impl Into<String>, no: impl Into<String>) -> Self {
        Self {
            yes: yes.into(),
            no: no.into(),
        }
    }

    /// Reject token pairs that could never classify a value unambiguously.
    pub fn validate(&self) -> Result<()> {
        let (yes, no) = (fold(&self.yes), fold(&self.no));
        if yes.is_empty() || no.is_empty() {
            return Err(MergeError::Config(
                "boolean tokens must not be empty".to_string(),
            ));
        }
        if yes == no {
            return Err(MergeError::Config(format!(
                "boolean tokens must differ, both are '{}'",
                yes
            )));
        }
        Ok(())
    }

    /// `Some(true)` for the yes token, `Some(false)` for the no token.
    pub fn classify(&self, raw: &str) -> Option<bool> {
        let folded = fold(raw);
        if folded == fold(&self.yes) {
            Some(true)
        } else if folded == fold(&self.no) {
            Some(false)
        } else {
            None
        }
    }
}

/// Normalize a cell to a boolean when it spells one of the tokens.
///
/// Anything else is handed back untouched, keeping its original type.
///
/// # Examples
///
/// ```rust
/// use alarm_merge::{transform_boolean, BooleanTokens, FieldValue};
///
/// let tokens = BooleanTokens::default();
/// assert_eq!(transform_boolean(" SIM ".into(), &tokens), FieldValue::Bool(true));
/// assert_eq!(transform_boolean("talvez".into(), &tokens), FieldValue::from("talvez"));
/// ```
pub fn transform_boolean(value: FieldValue, tokens: &BooleanTokens) -> FieldValue {
    match tokens.classify(&value.to_string()) {
        Some(flag) => FieldValue::Bool(flag),
        None => value,
    }
}
