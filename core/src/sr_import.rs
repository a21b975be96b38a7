use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use rusqlite::types::Value;

use crate::db::Database;
use crate::models::{ImportSummary, TableImport};
use crate::schema::{FieldKind, Numeric, SourceTable, TABLES};

const DELIMITER: u8 = b'^';

#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    /// Keep spaces inside fields instead of removing every space character.
    pub preserve_spaces: bool,
}

/// Parse `text` as a number of the given kind, falling back to zero.
///
/// Non-finite floats count as parse failures since SQLite stores NaN as NULL.
#[must_use]
pub fn parse_or_default(text: &str, kind: Numeric) -> Value {
    match kind {
        Numeric::Integer => Value::Integer(text.parse().unwrap_or(0)),
        Numeric::Float => Value::Real(
            text.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .unwrap_or(0.0),
        ),
    }
}

fn coerce(text: &str, kind: FieldKind) -> Value {
    match kind {
        FieldKind::Text => Value::Text(text.to_string()),
        FieldKind::Number(numeric) => parse_or_default(text, numeric),
        FieldKind::Reference => text.parse().map_or(Value::Null, Value::Integer),
    }
}

/// Source fields have every space removed unless spaces are preserved, in
/// which case only the ends are trimmed.
fn normalize_field(raw: &str, options: ImportOptions) -> String {
    if options.preserve_spaces {
        raw.trim().to_string()
    } else {
        raw.replace(' ', "")
    }
}

fn parse_record(
    record: &csv::ByteRecord,
    table: &SourceTable,
    options: ImportOptions,
) -> Result<Vec<Value>> {
    if record.len() != table.columns.len() {
        let line = record.position().map_or(0, csv::Position::line);
        bail!(
            "{}: line {line}: expected {} fields, found {}",
            table.source_file,
            table.columns.len(),
            record.len()
        );
    }

    Ok(table
        .columns
        .iter()
        .zip(record.iter())
        .map(|(column, raw)| {
            let text = String::from_utf8_lossy(raw);
            coerce(&normalize_field(&text, options), column.kind)
        })
        .collect())
}

/// Import one caret-delimited source into `table` inside a single transaction.
pub fn import_reader<R: Read>(
    db: &mut Database,
    table: &SourceTable,
    reader: R,
    options: ImportOptions,
) -> Result<TableImport> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(reader);

    let rows = rdr.byte_records().map(|result| {
        let record = result.with_context(|| format!("Failed to read {}", table.source_file))?;
        parse_record(&record, table, options)
    });
    let outcome = db.insert_or_ignore(table, rows)?;

    tracing::info!(
        table = table.name,
        rows_read = outcome.rows_read,
        rows_inserted = outcome.rows_inserted,
        "imported source file"
    );
    Ok(outcome)
}

/// Import all five source files from `dir`, parents before children.
///
/// Each file is committed on its own, so a failure leaves earlier tables
/// populated.
pub fn import_dir(db: &mut Database, dir: &Path, options: ImportOptions) -> Result<ImportSummary> {
    db.create_schema();

    let mut summary = ImportSummary::default();
    for table in TABLES {
        let path = dir.join(table.source_file);
        let file = File::open(&path)
            .with_context(|| format!("Failed to open source file: {}", path.display()))?;
        summary.tables.push(import_reader(db, table, file, options)?);
    }
    Ok(summary)
}

/// Open the database at `db_path` and import `dir` into it.
///
/// When the database cannot be opened the failure is logged and nothing is
/// imported (`Ok(None)`).
pub fn import_into(
    db_path: &Path,
    dir: &Path,
    options: ImportOptions,
) -> Result<Option<ImportSummary>> {
    let mut db = match Database::open(db_path) {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("cannot create the database connection: {e:#}");
            return Ok(None);
        }
    };
    import_dir(&mut db, dir, options).map(Some)
}
