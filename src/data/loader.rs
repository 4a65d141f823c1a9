use std::fs::File;
use std::io::Read;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray, Float64Array, StringArray};
use arrow::datatypes::{DataType, Float64Type};
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::reader::ChunkReader;
use serde_json::Value as JsonValue;

use super::error::LoadError;
use super::model::{Cell, Dataset, PatientRecord, columns};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Source formats understood by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Json,
    Parquet,
}

impl Format {
    /// Pick a format from a file name's extension. Names without an
    /// extension are read as CSV.
    pub fn from_name(name: &str) -> Result<Self, LoadError> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "" | "csv" | "txt" => Ok(Format::Csv),
            "json" => Ok(Format::Json),
            "parquet" | "pq" => Ok(Format::Parquet),
            other => Err(LoadError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Load a patient table from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row followed by one patient per line (primary)
/// * `.json`    – `[{ "Age": 40, "Sex": "M", ... }, ...]`
/// * `.parquet` – one scalar column per attribute
pub fn load_file(path: &Path) -> Result<Dataset, LoadError> {
    let source = path.display().to_string();
    let format = Format::from_name(&source)?;
    let io_err = |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };

    let records = match format {
        Format::Csv => read_csv(File::open(path).map_err(io_err)?)?,
        Format::Json => {
            let text = std::fs::read(path).map_err(io_err)?;
            read_json(&text)?
        }
        Format::Parquet => read_parquet(File::open(path).map_err(io_err)?)?,
    };
    Ok(Dataset::new(records, source))
}

/// Load an uploaded file from memory; `name` selects the format.
pub fn load_bytes(name: &str, bytes: &[u8]) -> Result<Dataset, LoadError> {
    let records = match Format::from_name(name)? {
        Format::Csv => read_csv(bytes)?,
        Format::Json => read_json(bytes)?,
        Format::Parquet => read_parquet(Bytes::copy_from_slice(bytes))?,
    };
    Ok(Dataset::new(records, name))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row naming the columns, one patient per row.
/// Columns may appear in any order; unknown columns are ignored.
fn read_csv<R: Read>(input: R) -> Result<Vec<PatientRecord>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);
    let headers = reader.headers()?.clone();

    check_required(|col| headers.iter().any(|h| h == col))?;

    // column name → position in the header
    let positions: Vec<(&'static str, usize)> = columns::ALL
        .iter()
        .filter_map(|&col| headers.iter().position(|h| h == col).map(|i| (col, i)))
        .collect();

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result?;
        let rec = PatientRecord::from_cells(row_no, |col| {
            positions
                .iter()
                .find(|(name, _)| *name == col)
                .and_then(|&(_, i)| record.get(i))
                .map_or(Cell::Missing, |s| Cell::Text(s.to_string()))
        })?;
        records.push(rec);
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Age": 40, "Sex": "M", "ChestPainType": "ATA", "RestingBP": 140, ... },
///   ...
/// ]
/// ```
fn read_json(bytes: &[u8]) -> Result<Vec<PatientRecord>, LoadError> {
    let root: JsonValue = serde_json::from_slice(bytes)?;
    let rows = root.as_array().ok_or(LoadError::NotAnArray)?;

    if let Some(first) = rows.first() {
        let obj = first.as_object().ok_or(LoadError::NotAnObject { row: 0 })?;
        check_required(|col| obj.contains_key(col))?;
    }

    rows.iter()
        .enumerate()
        .map(|(row_no, row)| {
            let obj = row
                .as_object()
                .ok_or(LoadError::NotAnObject { row: row_no })?;
            PatientRecord::from_cells(row_no, |col| {
                obj.get(col).map_or(Cell::Missing, json_to_cell)
            })
        })
        .collect()
}

fn json_to_cell(val: &JsonValue) -> Cell {
    match val {
        JsonValue::Null => Cell::Missing,
        JsonValue::Number(n) => n.as_f64().map_or(Cell::Missing, Cell::Number),
        JsonValue::String(s) => Cell::Text(s.clone()),
        JsonValue::Bool(b) => Cell::Number(if *b { 1.0 } else { 0.0 }),
        other => Cell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet table with one scalar column per attribute.
///
/// Integer, float and boolean columns are widened to `f64`; everything else
/// is cast to UTF-8 and parsed like CSV text. Works with files written by
/// both **Pandas** (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn read_parquet<R: ChunkReader + 'static>(input: R) -> Result<Vec<PatientRecord>, LoadError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(input)?;
    let schema = builder.schema().clone();
    check_required(|col| schema.index_of(col).is_ok())?;

    let reader = builder.build()?;
    let mut records = Vec::new();

    for batch in reader {
        let batch = batch?;
        let offset = records.len();

        let mut present = Vec::new();
        for &col in &columns::ALL {
            if let Ok(idx) = batch.schema().index_of(col) {
                present.push((col, ColumnValues::from_array(batch.column(idx))?));
            }
        }

        for row in 0..batch.num_rows() {
            let rec = PatientRecord::from_cells(offset + row, |col| {
                present
                    .iter()
                    .find(|(name, _)| *name == col)
                    .map_or(Cell::Missing, |(_, values)| values.cell(row))
            })?;
            records.push(rec);
        }
    }
    Ok(records)
}

// -- Parquet / Arrow helpers --

/// A column normalised to one of the two shapes rows are built from.
enum ColumnValues {
    Numbers(Float64Array),
    Text(StringArray),
}

impl ColumnValues {
    fn from_array(col: &ArrayRef) -> Result<Self, LoadError> {
        let dt = col.data_type();
        if dt.is_numeric() || *dt == DataType::Boolean {
            let cast = arrow::compute::cast(col, &DataType::Float64)?;
            Ok(ColumnValues::Numbers(cast.as_primitive::<Float64Type>().clone()))
        } else {
            let cast = arrow::compute::cast(col, &DataType::Utf8)?;
            Ok(ColumnValues::Text(cast.as_string::<i32>().clone()))
        }
    }

    fn cell(&self, row: usize) -> Cell {
        match self {
            ColumnValues::Numbers(arr) if arr.is_valid(row) => Cell::Number(arr.value(row)),
            ColumnValues::Text(arr) if arr.is_valid(row) => Cell::Text(arr.value(row).to_string()),
            _ => Cell::Missing,
        }
    }
}

fn check_required(mut has_column: impl FnMut(&str) -> bool) -> Result<(), LoadError> {
    match columns::REQUIRED.iter().find(|col| !has_column(col)) {
        Some(&col) => Err(LoadError::MissingColumn(col)),
        None => Ok(()),
    }
}
