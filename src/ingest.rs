// src/ingest.rs - Turning source rows into candidate alarms
//
// Ingestion is all-or-nothing: the first malformed row aborts the batch and
// no candidate is returned.

use crate::config::{ColumnLayout, Field};
use crate::error::{MergeError, Result};
use crate::record::{AlarmRecord, ConfigGroup, TextGroup};
use crate::source::{NamedAccessor, PositionalAccessor, Row, RowAccessor, Table};
use crate::transform::{transform_boolean, BooleanTokens};
use crate::value::FieldValue;
use log::info;
use serde_yaml::Mapping;

/// Build the accessor for `layout`, validating it against the table shape.
pub fn accessor_for(layout: &ColumnLayout, table: &Table) -> Result<Box<dyn RowAccessor>> {
    Ok(match layout {
        ColumnLayout::Positional { columns } => {
            Box::new(PositionalAccessor::new(columns.clone(), table)?)
        }
        ColumnLayout::Named { columns } => Box::new(NamedAccessor::new(columns.clone(), table)?),
    })
}

/// Convert every data row of `table` into an [`AlarmRecord`], in row order.
pub fn ingest(table: &Table, layout: &ColumnLayout, tokens: &BooleanTokens) -> Result<Vec<AlarmRecord>> {
    let accessor = accessor_for(layout, table)?;

    let candidates = table
        .rows
        .iter()
        .map(|row| build_record(accessor.as_ref(), row, tokens))
        .collect::<Result<Vec<_>>>()?;

    info!("Found {} alarms in the source to process", candidates.len());
    Ok(candidates)
}

fn build_record(accessor: &dyn RowAccessor, row: &Row, tokens: &BooleanTokens) -> Result<AlarmRecord> {
    let text = |field: Field| -> String {
        accessor
            .cell(row, field)
            .map(ToString::to_string)
            .unwrap_or_default()
    };

    let id_cell = accessor.cell(row, Field::AlarmId);
    let alarm_id = id_cell
        .and_then(FieldValue::as_identifier)
        .ok_or_else(|| MergeError::MalformedIdentifier {
            row: row.line,
            value: id_cell.map(ToString::to_string).unwrap_or_default(),
        })?;

    let text1 = accessor
        .cell(row, Field::Text1)
        .cloned()
        .unwrap_or_else(FieldValue::empty);

    Ok(AlarmRecord {
        alarm_id,
        name: text(Field::Name),
        text: TextGroup {
            text: text(Field::Text),
            text1: transform_boolean(text1, tokens),
            text2: text(Field::Text2),
            extra: Mapping::new(),
        },
        config: ConfigGroup {
            config: text(Field::Config),
            subconfig1: text(Field::Subconfig1),
            subconfig2: text(Field::Subconfig2),
            extra: Mapping::new(),
        },
        extra: Mapping::new(),
    })
}
