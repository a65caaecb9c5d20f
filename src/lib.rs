//! ALARM-MERGE - Merge spreadsheet alarm lists into a YAML alarm file
//!
//! Reads alarm rows from a workbook (or CSV), normalizes the enabled flag,
//! gives every new alarm an identifier that is free in the destination, and
//! writes the combined list back.
//!
//! Existing alarms are never renumbered or reordered. A new alarm whose
//! `alarm_id` is taken gets the nearest free identifier above it.
//!
//! # Examples
//!
//! ```rust,no_run
//! use alarm_merge::{MergeConfig, MergeEngine, MergeReport};
//! use std::path::Path;
//!
//! let config = MergeConfig::from_file("merge.yaml")?;
//! let engine = MergeEngine::new(config)?;
//!
//! match engine.run(Path::new("alarms.xlsx"), Path::new("alarms.yaml"))? {
//!     MergeReport::NothingToMerge { .. } => println!("nothing to do"),
//!     MergeReport::Merged(summary) => println!("{} alarms written", summary.total),
//! }
//! # Ok::<(), alarm_merge::MergeError>(())
//! ```

#![warn(missing_docs)]

// ============================================================================
// CORE MODULES
// ============================================================================

/// Error taxonomy shared by every stage
pub mod error;

/// Scalar cell values
pub mod value;

/// Persisted alarm record shape
pub mod record;

/// Yes/no normalization
pub mod transform;

/// Merge configuration with YAML support and validation
pub mod config;

/// Spreadsheet and CSV reading, row accessors
pub mod source;

/// Row to alarm conversion
pub mod ingest;

/// Identifier conflict resolution
pub mod merge;

/// YAML alarm file codec
pub mod store;

/// Merge orchestration
pub mod engine;

// ============================================================================
// PUBLIC RE-EXPORTS
// ============================================================================

pub use config::{ColumnLayout, Field, FieldMap, HeaderMode, MergeConfig, OutputOrder};
pub use engine::{MergeEngine, MergeReport, MergeSummary};
pub use error::{MergeError, Result};
pub use merge::{merge, resolve_conflicts, MergeOutcome, Reassignment};
pub use record::{AlarmRecord, ConfigGroup, TextGroup};
pub use source::{FileReader, RowAccessor, TabularReader, Table};
pub use store::{AlarmStore, Existing, PersistedState, YamlStore};
pub use transform::{transform_boolean, BooleanTokens};
pub use value::FieldValue;

// ============================================================================
// VERSION INFORMATION
// ============================================================================

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build information stamped by `build.rs`
pub mod build_info {
    /// Git commit hash, or "unknown" outside a checkout
    pub const GIT_HASH: &str = env!("GIT_HASH");

    /// Build timestamp (RFC 3339)
    pub const BUILD_TIMESTAMP: &str = env!("BUILD_TIMESTAMP");

    /// Version line used by `--version`
    pub const LONG_VERSION: &str = concat!(
        env!("CARGO_PKG_VERSION"),
        " (commit ",
        env!("GIT_HASH"),
        ", built ",
        env!("BUILD_TIMESTAMP"),
        ")"
    );
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Initialize console logging.
///
/// `RUST_LOG` wins when set; otherwise this crate logs at `info`, or `debug`
/// when `verbose` is true. Calling it twice is harmless.
pub fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "alarm_merge=debug"
    } else {
        "alarm_merge=info"
    };

    // Already initialized, ignore error
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .try_init();
}
