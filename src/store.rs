// src/store.rs - Persisted alarm collection (YAML list)
use crate::error::{MergeError, Result};
use crate::record::AlarmRecord;
use log::{info, warn};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// How the destination looked when it was loaded.
#[derive(Debug)]
pub enum PersistedState {
    /// No file yet; it will be created on save
    Missing,

    /// File held a (possibly empty) list of alarms
    Loaded,

    /// File held something other than a list and is treated as empty.
    /// Carries the [`MergeError::CorruptPersistedState`] describing it.
    Reset(MergeError),
}

/// The existing collection plus how it was obtained.
#[derive(Debug)]
pub struct Existing {
    /// Records in file order
    pub records: Vec<AlarmRecord>,
    /// How the file looked
    pub state: PersistedState,
}

impl Existing {
    fn empty(state: PersistedState) -> Self {
        Self {
            records: Vec::new(),
            state,
        }
    }
}

/// Load/save of the destination collection.
#[cfg_attr(test, mockall::automock)]
pub trait AlarmStore {
    /// Read the collection at `path`; a missing file is an empty collection.
    fn load(&self, path: &Path) -> Result<Existing>;

    /// Replace the collection at `path` with `records`.
    fn save(&self, path: &Path, records: &[AlarmRecord]) -> Result<()>;
}

/// YAML list codec for alarm collections.
///
/// Output is block style with two-space indentation, keys in record field
/// order, non-ASCII text unescaped.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlStore;

impl YamlStore {
    /// Decode a document into records.
    ///
    /// Empty and null documents are an empty list; anything that is not a
    /// list comes back as [`PersistedState::Reset`]. Bytes that are not
    /// UTF-8 fail with [`MergeError::UndecodablePersistedState`].
    pub fn decode(path: &Path, bytes: &[u8]) -> Result<Existing> {
        let corrupt = |reason: String| MergeError::CorruptPersistedState {
            path: path.to_path_buf(),
            reason,
        };

        // undecodable text may still be a valid list; never reset it
        let text = std::str::from_utf8(bytes).map_err(|e| {
            MergeError::UndecodablePersistedState {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;

        if text.trim().is_empty() {
            return Ok(Existing::empty(PersistedState::Loaded));
        }

        let document: serde_yaml::Value = match serde_yaml::from_str(text) {
            Ok(document) => document,
            Err(e) => return Ok(Existing::empty(PersistedState::Reset(corrupt(e.to_string())))),
        };

        let entries = match document {
            serde_yaml::Value::Null => Vec::new(),
            serde_yaml::Value::Sequence(entries) => entries,
            other => {
                let kind = match other {
                    serde_yaml::Value::Mapping(_) => "a mapping",
                    serde_yaml::Value::Tagged(_) => "a tagged value",
                    _ => "a scalar",
                };
                return Ok(Existing::empty(PersistedState::Reset(corrupt(format!(
                    "top-level content is {}",
                    kind
                )))));
            }
        };

        let records = entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                serde_yaml::from_value::<AlarmRecord>(entry).map_err(|e| {
                    MergeError::InvalidPersistedRecord {
                        path: path.to_path_buf(),
                        index,
                        reason: e.to_string(),
                    }
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Existing {
            records,
            state: PersistedState::Loaded,
        })
    }

    /// Encode records as a block-style YAML list.
    pub fn encode(records: &[AlarmRecord]) -> Result<String> {
        Ok(serde_yaml::to_string(records)?)
    }

    fn staging_path(path: &Path) -> PathBuf {
        let mut name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        path.with_file_name(name)
    }
}

impl AlarmStore for YamlStore {
    fn load(&self, path: &Path) -> Result<Existing> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("Alarm file '{}' not found. A new one will be created.", path.display());
                return Ok(Existing::empty(PersistedState::Missing));
            }
            Err(e) => return Err(e.into()),
        };

        let existing = Self::decode(path, &bytes)?;
        match &existing.state {
            PersistedState::Reset(reason) => {
                warn!("{}. Starting with an empty list.", reason);
            }
            _ => info!(
                "Found {} existing alarms in '{}'",
                existing.records.len(),
                path.display()
            ),
        }
        Ok(existing)
    }

    /// Write through a sibling staging file and rename it into place.
    fn save(&self, path: &Path, records: &[AlarmRecord]) -> Result<()> {
        let yaml = Self::encode(records)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let staging = Self::staging_path(path);
        fs::write(&staging, yaml)?;
        if let Err(e) = fs::rename(&staging, path) {
            let _ = fs::remove_file(&staging);
            return Err(e.into());
        }

        info!(
            "Saved '{}' with a total of {} alarms",
            path.display(),
            records.len()
        );
        Ok(())
    }
}
