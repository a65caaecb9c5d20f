use std::path::PathBuf;
use thiserror::Error;

/// Error type shared by every stage of an alarm merge.
///
/// All variants are raised before the destination file is touched, so an
/// `Err` from [`crate::MergeEngine::run`] always means "nothing was written".
#[derive(Error, Debug)]
pub enum MergeError {
    /// I/O related failure
    #[error("Io error: {0}")]
    Io(#[from] std::io::Error),

    /// Error while parsing or emitting YAML
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Invalid or inconsistent merge configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The tabular source could not be opened or parsed
    #[error("Source {path:?} is unreadable: {reason}")]
    SourceUnreadable {
        /// Source file
        path: PathBuf,
        /// Underlying failure
        reason: String,
    },

    /// One or more configured columns are absent from the source
    #[error("Missing required columns: {}", columns.join(", "))]
    MissingColumns {
        /// Absent titles, or positions as `column N (field)`
        columns: Vec<String>,
    },

    /// A row's identifier cell does not hold an integer
    #[error("Row {row}: alarm identifier '{value}' is not an integer")]
    MalformedIdentifier {
        /// 1-based source row
        row: usize,
        /// Cell content as read
        value: String,
    },

    /// The destination exists but does not hold a list; recovered by starting empty
    #[error("Destination {path:?} does not hold a list of alarms: {reason}")]
    CorruptPersistedState {
        /// Destination file
        path: PathBuf,
        /// What was found instead of a list
        reason: String,
    },

    /// The destination is not UTF-8 text; it is left alone rather than reset
    #[error("Destination {path:?} is not UTF-8 text: {reason}")]
    UndecodablePersistedState {
        /// Destination file
        path: PathBuf,
        /// Decoding failure
        reason: String,
    },

    /// The destination is a list but one of its entries is not an alarm record
    #[error("Entry #{index} of {path:?} is not a valid alarm record: {reason}")]
    InvalidPersistedRecord {
        /// Destination file
        path: PathBuf,
        /// 0-based entry position
        index: usize,
        /// Deserialization failure
        reason: String,
    },

    /// Probing for a free identifier ran past `i64::MAX`
    #[error("No free alarm identifier at or above {requested}")]
    IdentifierSpaceExhausted {
        /// Identifier the candidate asked for
        requested: i64,
    },
}

/// Convenient alias over [`Result`] using [`MergeError`]
pub type Result<T> = std::result::Result<T, MergeError>;

impl MergeError {
    pub(crate) fn unreadable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        MergeError::SourceUnreadable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
