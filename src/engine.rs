// src/engine.rs - Merge orchestration
//
// load existing -> read source -> ingest -> resolve conflicts -> order -> save
//
// Every failure happens before `save`, so the destination is either replaced
// once or left exactly as it was.

use crate::config::MergeConfig;
use crate::error::Result;
use crate::ingest::ingest;
use crate::merge::{merge, Reassignment};
use crate::source::{FileReader, TabularReader};
use crate::store::{AlarmStore, PersistedState, YamlStore};
use log::info;
use std::path::Path;

/// What a run did.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeReport {
    /// The source held no alarms; nothing was written
    NothingToMerge {
        /// Records already in the destination
        existing: usize,
    },

    /// Candidates were merged
    Merged(MergeSummary),
}

/// Counts and conflicts of a completed merge.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeSummary {
    /// Records loaded from the destination
    pub existing: usize,
    /// Candidates merged in
    pub added: usize,
    /// Size of the resulting collection
    pub total: usize,
    /// Candidates whose identifier was remapped
    pub reassignments: Vec<Reassignment>,

    /// False on a dry run
    pub written: bool,

    /// The destination held non-list content that was discarded
    pub destination_reset: bool,
}

impl MergeReport {
    /// True when nothing was merged
    pub fn is_noop(&self) -> bool {
        matches!(self, MergeReport::NothingToMerge { .. })
    }
}

/// Runs one merge from a tabular source into a YAML destination.
pub struct MergeEngine<R = FileReader, S = YamlStore> {
    config: MergeConfig,
    reader: R,
    store: S,
    dry_run: bool,
}

impl MergeEngine {
    /// Engine reading files from disk with the configured sheet.
    pub fn new(config: MergeConfig) -> Result<Self> {
        config.validate()?;
        let reader = FileReader::new(config.sheet.clone());
        Ok(Self::with_parts(config, reader, YamlStore))
    }
}

impl<R: TabularReader, S: AlarmStore> MergeEngine<R, S> {
    /// Engine over explicit reader and store implementations.
    pub fn with_parts(config: MergeConfig, reader: R, store: S) -> Self {
        Self {
            config,
            reader,
            store,
            dry_run: false,
        }
    }

    /// Resolve and report without touching the destination.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Merge `source` into `destination`, writing it at most once.
    pub fn run(&self, source: &Path, destination: &Path) -> Result<MergeReport> {
        info!(
            "Updating '{}' with alarms from '{}'",
            destination.display(),
            source.display()
        );

        let existing = self.store.load(destination)?;
        let destination_reset = matches!(existing.state, PersistedState::Reset(_));

        let table = self.reader.read_rows(source, self.config.header_mode())?;
        let candidates = ingest(&table, &self.config.layout, &self.config.tokens)?;

        if candidates.is_empty() {
            info!("No new alarms to add. No changes were made.");
            return Ok(MergeReport::NothingToMerge {
                existing: existing.records.len(),
            });
        }

        let outcome = merge(existing.records, candidates, self.config.order)?;

        if self.dry_run {
            info!(
                "Dry run: {} alarms would be written to '{}'",
                outcome.records.len(),
                destination.display()
            );
        } else {
            self.store.save(destination, &outcome.records)?;
        }

        Ok(MergeReport::Merged(MergeSummary {
            existing: outcome.existing,
            added: outcome.added,
            total: outcome.records.len(),
            reassignments: outcome.reassignments,
            written: !self.dry_run,
            destination_reset,
        }))
    }
}
