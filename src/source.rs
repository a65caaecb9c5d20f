// src/source.rs - Tabular source reading and row access
//
// Workbooks go through calamine, `.csv` through the csv crate. Both produce
// the same `Table`, so ingestion never sees the file format.

use crate::config::{Field, FieldMap, HeaderMode};
use crate::error::{MergeError, Result};
use crate::value::FieldValue;
use calamine::{open_workbook_auto, Data, Reader};
use log::{debug, info};
use std::collections::HashMap;
use std::path::Path;

// ==========================================
// SECTION 1: TABLE MODEL
// ==========================================

/// One data row with the 1-based line it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// 1-based line or sheet row
    pub line: usize,
    /// Cells from column A (or the first CSV field) onward
    pub cells: Vec<FieldValue>,
}

impl Row {
    /// Row at `line`
    pub fn new(line: usize, cells: Vec<FieldValue>) -> Self {
        Self { line, cells }
    }

    /// True when every cell is blank
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(FieldValue::is_blank)
    }
}

/// A fully materialized sheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// Column titles when the source was read with [`HeaderMode::FirstRow`]
    pub header: Option<Vec<String>>,
    /// Non-blank data rows
    pub rows: Vec<Row>,
}

impl Table {
    /// Split raw rows into header and data according to `mode`.
    ///
    /// Blank rows are dropped; a sheet commonly ends with a few.
    pub fn from_rows(raw: Vec<Row>, mode: HeaderMode) -> Self {
        let mut rows = raw.into_iter().filter(|row| {
            let blank = row.is_blank();
            if blank {
                debug!("Skipping blank row {}", row.line);
            }
            !blank
        });

        let header = match mode {
            HeaderMode::None => None,
            HeaderMode::FirstRow => Some(
                rows.next()
                    .map(|row| {
                        row.cells
                            .iter()
                            .map(|cell| cell.to_string().trim_start_matches('\u{feff}').trim().to_string())
                            .collect()
                    })
                    .unwrap_or_default(),
            ),
        };

        Table {
            header,
            rows: rows.collect(),
        }
    }

    /// Widest row (or header) in the table
    pub fn width(&self) -> usize {
        let rows = self.rows.iter().map(|row| row.cells.len()).max().unwrap_or(0);
        let header = self.header.as_ref().map(Vec::len).unwrap_or(0);
        rows.max(header)
    }
}

// ==========================================
// SECTION 2: READERS
// ==========================================

/// Source of tabular rows.
///
/// A missing or unparsable file is [`MergeError::SourceUnreadable`], never an
/// empty table, so callers can tell "nothing to do" from "could not read".
pub trait TabularReader {
    /// Read every row of `path`, splitting off the header per `mode`.
    fn read_rows(&self, path: &Path, mode: HeaderMode) -> Result<Table>;
}

/// Reads workbooks and CSV files from disk, picking the parser by extension.
#[derive(Debug, Clone, Default)]
pub struct FileReader {
    sheet: Option<String>,
}

impl FileReader {
    /// Reader for `sheet`, or the first sheet when `None`
    pub fn new(sheet: Option<String>) -> Self {
        Self { sheet }
    }

    fn is_csv(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false)
    }

    fn read_workbook(&self, path: &Path) -> Result<Vec<Row>> {
        let mut workbook =
            open_workbook_auto(path).map_err(|e| MergeError::unreadable(path, e))?;

        let sheet = match &self.sheet {
            Some(name) => name.clone(),
            None => workbook
                .sheet_names()
                .first()
                .cloned()
                .ok_or_else(|| MergeError::unreadable(path, "workbook has no sheets"))?,
        };

        let range = workbook
            .worksheet_range(&sheet)
            .map_err(|e| MergeError::unreadable(path, format!("sheet '{}': {}", sheet, e)))?;

        // Range coordinates are relative to its first used cell; pad so that
        // column 0 is always column A and line numbers match the sheet.
        let (first_row, first_col) = range.start().unwrap_or((0, 0));
        let rows = range
            .rows()
            .enumerate()
            .map(|(i, cells)| {
                let mut values = vec![FieldValue::empty(); first_col as usize];
                values.extend(cells.iter().map(convert_cell));
                Row::new(first_row as usize + i + 1, values)
            })
            .collect();
        Ok(rows)
    }

    fn read_csv(&self, path: &Path) -> Result<Vec<Row>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .map_err(|e| MergeError::unreadable(path, e))?;

        let mut rows = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record.map_err(|e| MergeError::unreadable(path, e))?;
            let line = record
                .position()
                .map(|pos| pos.line() as usize)
                .unwrap_or(i + 1);
            let cells = record.iter().map(FieldValue::from).collect();
            rows.push(Row::new(line, cells));
        }
        Ok(rows)
    }
}

impl TabularReader for FileReader {
    fn read_rows(&self, path: &Path, mode: HeaderMode) -> Result<Table> {
        if !path.is_file() {
            return Err(MergeError::unreadable(path, "file not found"));
        }

        let raw = if Self::is_csv(path) {
            self.read_csv(path)?
        } else {
            self.read_workbook(path)?
        };

        let table = Table::from_rows(raw, mode);
        info!(
            "Read {} data rows from '{}'",
            table.rows.len(),
            path.display()
        );
        Ok(table)
    }
}

fn convert_cell(cell: &Data) -> FieldValue {
    match cell {
        Data::Empty => FieldValue::empty(),
        Data::Bool(b) => FieldValue::Bool(*b),
        Data::Int(i) => FieldValue::Int(*i),
        Data::Float(f) => FieldValue::from_number(*f),
        Data::String(s) => FieldValue::Text(s.clone()),
        Data::DateTime(dt) => FieldValue::from_number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => FieldValue::Text(s.clone()),
        Data::Error(e) => FieldValue::Text(e.to_string()),
    }
}

// ==========================================
// SECTION 3: ROW ACCESS
// ==========================================

/// Field lookup within a data row, independent of how columns are addressed.
pub trait RowAccessor {
    /// The cell feeding `field`, or `None` when the row is too short.
    fn cell<'r>(&self, row: &'r Row, field: Field) -> Option<&'r FieldValue>;
}

/// Columns addressed by zero-based position.
#[derive(Debug, Clone)]
pub struct PositionalAccessor {
    columns: FieldMap<usize>,
}

impl PositionalAccessor {
    /// Fails with [`MergeError::MissingColumns`] when the table is narrower
    /// than a configured position.
    pub fn new(columns: FieldMap<usize>, table: &Table) -> Result<Self> {
        let width = table.width();
        // an empty table has nothing to validate against
        if !table.rows.is_empty() {
            let missing: Vec<String> = columns
                .iter()
                .filter(|(_, position)| **position >= width)
                .map(|(field, position)| format!("column {} ({})", position, field))
                .collect();
            if !missing.is_empty() {
                return Err(MergeError::MissingColumns { columns: missing });
            }
        }
        Ok(Self { columns })
    }
}

impl RowAccessor for PositionalAccessor {
    fn cell<'r>(&self, row: &'r Row, field: Field) -> Option<&'r FieldValue> {
        row.cells.get(*self.columns.get(field))
    }
}

/// Columns addressed by header title.
#[derive(Debug, Clone)]
pub struct NamedAccessor {
    titles: FieldMap<String>,
    index: HashMap<String, usize>,
}

impl NamedAccessor {
    /// Resolve every title against the header up front.
    ///
    /// All absent titles are reported together, in field order.
    pub fn new(titles: FieldMap<String>, table: &Table) -> Result<Self> {
        let header = table.header.as_deref().unwrap_or(&[]);

        let mut index = HashMap::new();
        for (position, title) in header.iter().enumerate() {
            // first occurrence wins for duplicated headers
            index.entry(title.clone()).or_insert(position);
        }

        let missing: Vec<String> = titles
            .iter()
            .map(|(_, title)| title.trim())
            .filter(|title| !index.contains_key(*title))
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(MergeError::MissingColumns { columns: missing });
        }

        Ok(Self { titles, index })
    }
}

impl RowAccessor for NamedAccessor {
    fn cell<'r>(&self, row: &'r Row, field: Field) -> Option<&'r FieldValue> {
        let title = self.titles.get(field).trim();
        self.index
            .get(title)
            .and_then(|&position| row.cells.get(position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColumnLayout;
    use rust_xlsxwriter::Workbook;
    use std::fs;
    use tempfile::TempDir;

    fn text_row(line: usize, cells: &[&str]) -> Row {
        Row::new(line, cells.iter().map(|&c| FieldValue::from(c)).collect())
    }

    fn named_titles() -> FieldMap<String> {
        match ColumnLayout::default_named() {
            ColumnLayout::Named { columns } => columns,
            ColumnLayout::Positional { .. } => unreachable!(),
        }
    }

    #[test]
    fn test_header_split_and_blank_rows() {
        let raw = vec![
            text_row(1, &["", ""]),
            text_row(2, &[" ID ", "Name"]),
            text_row(3, &["1", "a"]),
            text_row(4, &["", " "]),
            text_row(5, &["2", "b"]),
        ];
        let table = Table::from_rows(raw, HeaderMode::FirstRow);
        assert_eq!(table.header, Some(vec!["ID".to_string(), "Name".to_string()]));
        assert_eq!(table.rows.iter().map(|r| r.line).collect::<Vec<_>>(), vec![3, 5]);
    }

    #[test]
    fn test_missing_file_is_unreadable() {
        let dir = TempDir::new().unwrap();
        let reader = FileReader::default();
        let err = reader
            .read_rows(&dir.path().join("absent.xlsx"), HeaderMode::None)
            .unwrap_err();
        assert!(matches!(err, MergeError::SourceUnreadable { .. }));
    }

    #[test]
    fn test_garbage_workbook_is_unreadable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.xlsx");
        fs::write(&path, b"definitely not a zip archive").unwrap();

        let err = FileReader::default().read_rows(&path, HeaderMode::None).unwrap_err();
        assert!(matches!(err, MergeError::SourceUnreadable { .. }));
    }

    /// Data in B3:D4 of the first sheet, plus a second sheet named "Extra".
    fn write_workbook(path: &Path) {
        let mut workbook = Workbook::new();
        let first = workbook.add_worksheet();
        first.write_number(2, 1, 5.0).unwrap();
        first.write_string(2, 2, "Sim").unwrap();
        first.write_string(2, 3, "Nível baixo").unwrap();
        first.write_number(3, 1, 2.5).unwrap();
        first.write_boolean(3, 2, true).unwrap();

        let second = workbook.add_worksheet();
        second.set_name("Extra").unwrap();
        second.write_string(0, 0, "ID do Alarme").unwrap();
        second.write_number(1, 0, 9.0).unwrap();

        workbook.save(path).unwrap();
    }

    #[test]
    fn test_workbook_offset_range_is_padded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("alarms.xlsx");
        write_workbook(&path);

        let table = FileReader::default().read_rows(&path, HeaderMode::None).unwrap();

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].line, 3);
        assert_eq!(
            table.rows[0].cells,
            vec![
                FieldValue::empty(),
                FieldValue::Int(5),
                FieldValue::from("Sim"),
                FieldValue::from("Nível baixo"),
            ]
        );
        assert_eq!(table.rows[1].line, 4);
        assert_eq!(table.rows[1].cells[1], FieldValue::Float(2.5));
        assert_eq!(table.rows[1].cells[2], FieldValue::Bool(true));
    }

    #[test]
    fn test_workbook_sheet_selection() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("alarms.xlsx");
        write_workbook(&path);

        let table = FileReader::new(Some("Extra".to_string()))
            .read_rows(&path, HeaderMode::FirstRow)
            .unwrap();
        assert_eq!(table.header, Some(vec!["ID do Alarme".to_string()]));
        assert_eq!(table.rows[0].line, 2);
        assert_eq!(table.rows[0].cells, vec![FieldValue::Int(9)]);

        let err = FileReader::new(Some("Ausente".to_string()))
            .read_rows(&path, HeaderMode::None)
            .unwrap_err();
        assert!(matches!(err, MergeError::SourceUnreadable { .. }));
    }

    #[test]
    fn test_csv_rows_keep_line_numbers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("alarms.csv");
        fs::write(&path, "ID,Name\n1,\"multi\nline\"\n2,b\n").unwrap();

        let table = FileReader::default().read_rows(&path, HeaderMode::FirstRow).unwrap();
        assert_eq!(table.header, Some(vec!["ID".to_string(), "Name".to_string()]));
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].line, 2);
        assert_eq!(table.rows[0].cells[1], FieldValue::from("multi\nline"));
        assert_eq!(table.rows[1].line, 4);
    }

    #[test]
    fn test_positional_accessor_checks_width() {
        let table = Table::from_rows(vec![text_row(1, &["1", "a", "b"])], HeaderMode::None);
        let err = PositionalAccessor::new(
            FieldMap {
                alarm_id: 0,
                name: 1,
                text: 2,
                text1: 3,
                text2: 4,
                config: 5,
                subconfig1: 6,
                subconfig2: 7,
            },
            &table,
        )
        .unwrap_err();

        match err {
            MergeError::MissingColumns { columns } => {
                assert_eq!(columns.len(), 5);
                assert_eq!(columns[0], "column 3 (text1)");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_named_accessor_reports_all_missing_titles() {
        let table = Table::from_rows(
            vec![
                text_row(1, &["Nome do Alarme", "Texto Principal", "Habilitado"]),
                text_row(2, &["a", "b", "sim"]),
            ],
            HeaderMode::FirstRow,
        );
        let err = NamedAccessor::new(named_titles(), &table).unwrap_err();
        match err {
            MergeError::MissingColumns { columns } => {
                assert_eq!(columns[0], "ID do Alarme");
                assert_eq!(columns.len(), 5);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_named_accessor_follows_header_order() {
        let header = [
            "Sub-Config 2",
            "Sub-Config 1",
            "Nível de Configuração",
            "Ação Recomendada",
            "Habilitado",
            "Texto Principal",
            "Nome do Alarme",
            "ID do Alarme",
        ];
        let table = Table::from_rows(
            vec![
                text_row(1, &header),
                text_row(2, &["s2", "s1", "c", "t2", "sim", "t", "n", "9"]),
            ],
            HeaderMode::FirstRow,
        );

        let accessor = NamedAccessor::new(named_titles(), &table).unwrap();
        let row = &table.rows[0];
        assert_eq!(accessor.cell(row, Field::AlarmId), Some(&FieldValue::from("9")));
        assert_eq!(accessor.cell(row, Field::Subconfig2), Some(&FieldValue::from("s2")));
    }
}
