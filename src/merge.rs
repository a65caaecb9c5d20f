// src/merge.rs - Identifier conflict resolution and collection merge
use crate::config::OutputOrder;
use crate::error::{MergeError, Result};
use crate::record::AlarmRecord;
use log::warn;
use std::collections::HashSet;

/// A candidate whose requested identifier was taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reassignment {
    /// Name of the remapped alarm
    pub name: String,
    /// Identifier from the source row
    pub requested: i64,
    /// Identifier actually written
    pub assigned: i64,
}

/// Result of merging candidates into an existing collection.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// The collection to persist
    pub records: Vec<AlarmRecord>,

    /// Number of pre-existing records at the head of the append order
    pub existing: usize,

    /// Number of candidates merged in
    pub added: usize,

    /// Every remapped candidate, in processing order
    pub reassignments: Vec<Reassignment>,
}

/// First identifier at or above `requested` that is not in `in_use`.
///
/// A linear upward probe: gaps below `requested` are never reused.
pub fn probe(requested: i64, in_use: &HashSet<i64>) -> Result<i64> {
    let mut candidate = requested;
    while in_use.contains(&candidate) {
        candidate = candidate
            .checked_add(1)
            .ok_or(MergeError::IdentifierSpaceExhausted { requested })?;
    }
    Ok(candidate)
}

/// Give every candidate an identifier unused by `existing` and by the
/// candidates processed before it.
pub fn resolve_conflicts(
    existing: &[AlarmRecord],
    candidates: Vec<AlarmRecord>,
) -> Result<(Vec<AlarmRecord>, Vec<Reassignment>)> {
    let mut in_use: HashSet<i64> = HashSet::with_capacity(existing.len() + candidates.len());
    for record in existing {
        if !in_use.insert(record.alarm_id) {
            warn!(
                "Destination already holds alarm_id {} more than once; existing records are kept as-is",
                record.alarm_id
            );
        }
    }

    let mut reassignments = Vec::new();
    let mut resolved = Vec::with_capacity(candidates.len());

    for mut candidate in candidates {
        let requested = candidate.alarm_id;
        let assigned = probe(requested, &in_use)?;
        if assigned != requested {
            warn!(
                "  - CONFLICT: alarm_id {} is already in use. Assigning the nearest free id above it: {}",
                requested, assigned
            );
            reassignments.push(Reassignment {
                name: candidate.name.clone(),
                requested,
                assigned,
            });
            candidate.alarm_id = assigned;
        }
        in_use.insert(assigned);
        resolved.push(candidate);
    }

    Ok((resolved, reassignments))
}

/// Merge `candidates` into `existing` and order the result.
///
/// Existing records keep their identifiers and relative order; candidates
/// follow them in row order. With [`OutputOrder::Sort`] the whole collection
/// is then stably sorted by `alarm_id`.
pub fn merge(
    existing: Vec<AlarmRecord>,
    candidates: Vec<AlarmRecord>,
    order: OutputOrder,
) -> Result<MergeOutcome> {
    let (resolved, reassignments) = resolve_conflicts(&existing, candidates)?;

    let existing_count = existing.len();
    let added = resolved.len();

    let mut records = existing;
    records.extend(resolved);

    if order == OutputOrder::Sort {
        records.sort_by_key(|record| record.alarm_id);
    }

    Ok(MergeOutcome {
        records,
        existing: existing_count,
        added,
        reassignments,
    })
}
