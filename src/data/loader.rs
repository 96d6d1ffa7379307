use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::{cast_with_options, CastOptions};
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map, Value as JsonValue};

use super::model::{
    checked_hour, checked_month, checked_year, Dataset, Record, RecordError, Severity, Weekday,
};
use crate::config::ColumnMapping;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a collision table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one collision per line (recommended)
/// * `.json`    – `[{ "year": 2020, "accident_severity": "Yes", ... }, ...]`
/// * `.parquet` – one column per field
///
/// Any malformed row aborts the whole load.
pub fn load_file(path: &Path, columns: &ColumnMapping) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path).context("opening CSV")?;
            load_csv(file, columns)
        }
        "json" => {
            let text = std::fs::read_to_string(path).context("reading JSON file")?;
            load_json(&text, columns)
        }
        "parquet" | "pq" => load_parquet(path, columns),
        other => bail!("Unsupported file extension: .{other}"),
    }?;

    log::debug!("parsed {} rows from {}", dataset.len(), path.display());
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Field access shared by all formats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Year,
    Month,
    Hour,
    Weekday,
    WeatherGroup,
    LightingGroup,
    RoadSurfaceGroup,
    Severity,
    Latitude,
    Longitude,
}

impl Field {
    const ALL: [Field; 10] = [
        Field::Year,
        Field::Month,
        Field::Hour,
        Field::Weekday,
        Field::WeatherGroup,
        Field::LightingGroup,
        Field::RoadSurfaceGroup,
        Field::Severity,
        Field::Latitude,
        Field::Longitude,
    ];

    fn column(self, columns: &ColumnMapping) -> &str {
        match self {
            Field::Year => &columns.year,
            Field::Month => &columns.month,
            Field::Hour => &columns.hour,
            Field::Weekday => &columns.weekday,
            Field::WeatherGroup => &columns.weather_group,
            Field::LightingGroup => &columns.lighting_group,
            Field::RoadSurfaceGroup => &columns.road_surface_group,
            Field::Severity => &columns.severity,
            Field::Latitude => &columns.latitude,
            Field::Longitude => &columns.longitude,
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    fn is_integer(self) -> bool {
        matches!(self, Field::Year | Field::Month | Field::Hour)
    }

    fn is_numeric(self) -> bool {
        self.is_integer() || matches!(self, Field::Latitude | Field::Longitude)
    }
}

/// Typed access to the cells of one source row. `Ok(None)` is a missing cell.
trait CellSource {
    fn int(&self, field: Field) -> Result<Option<i64>>;
    fn float(&self, field: Field) -> Result<Option<f64>>;
    fn text(&self, field: Field) -> Result<Option<String>>;
}

fn read_record(src: &impl CellSource) -> Result<Record> {
    let severity: Severity = src
        .text(Field::Severity)?
        .ok_or(RecordError::MissingSeverity)?
        .parse()?;

    Ok(Record {
        year: src.int(Field::Year)?.map(checked_year).transpose()?,
        month: src.int(Field::Month)?.map(checked_month).transpose()?,
        hour: src.int(Field::Hour)?.map(checked_hour).transpose()?,
        weekday: src
            .text(Field::Weekday)?
            .map(|s| s.parse::<Weekday>())
            .transpose()?,
        weather_group: src.text(Field::WeatherGroup)?,
        lighting_group: src.text(Field::LightingGroup)?,
        road_surface_group: src.text(Field::RoadSurfaceGroup)?,
        severity,
        latitude: src.float(Field::Latitude)?,
        longitude: src.float(Field::Longitude)?,
    })
}

/// Integers may arrive as `2020.0` when the exporter promoted the column to
/// float because of missing values.
fn parse_int(s: &str) -> Result<i64> {
    if let Ok(i) = s.parse::<i64>() {
        return Ok(i);
    }
    match s.parse::<f64>() {
        Ok(f) => whole_number(f).with_context(|| format!("'{s}' is not a whole number")),
        Err(_) => bail!("'{s}' is not an integer"),
    }
}

fn whole_number(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64).then_some(f as i64)
}

/// `NaN` is how float columns usually spell a missing value.
fn parse_float(s: &str) -> Result<Option<f64>> {
    let f: f64 = s
        .parse()
        .with_context(|| format!("'{s}' is not a number"))?;
    Ok((!f.is_nan()).then_some(f))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, empty cells are missing values.
/// Columns not named in the mapping are ignored.
pub fn load_csv<R: Read>(source: R, columns: &ColumnMapping) -> Result<Dataset> {
    let mut reader = csv::Reader::from_reader(source);
    let headers = reader.headers().context("reading CSV headers")?.clone();

    let mut index = [0usize; 10];
    for field in Field::ALL {
        let name = field.column(columns);
        index[field.index()] = headers
            .iter()
            .position(|h| h.trim() == name)
            .with_context(|| format!("CSV missing '{name}' column"))?;
    }

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let row = CsvRow {
            record: &record,
            index: &index,
        };
        records.push(read_record(&row).with_context(|| format!("CSV row {row_no}"))?);
    }

    Ok(Dataset::from_records(records))
}

struct CsvRow<'r> {
    record: &'r csv::StringRecord,
    index: &'r [usize; 10],
}

impl CsvRow<'_> {
    fn cell(&self, field: Field) -> Option<&str> {
        self.record
            .get(self.index[field.index()])
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

impl CellSource for CsvRow<'_> {
    fn int(&self, field: Field) -> Result<Option<i64>> {
        self.cell(field).map(parse_int).transpose()
    }

    fn float(&self, field: Field) -> Result<Option<f64>> {
        Ok(self.cell(field).map(parse_float).transpose()?.flatten())
    }

    fn text(&self, field: Field) -> Result<Option<String>> {
        Ok(self.cell(field).map(str::to_string))
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "year": 2020,
///     "month": 7,
///     "accident_day_of_week": "Friday",
///     "weather_group": "Clear",
///     "accident_severity": "Yes",
///     "latitude": 45.51,
///     "longitude": -73.57
///   },
///   ...
/// ]
/// ```
///
/// Absent keys and `null` are both missing values.
pub fn load_json(text: &str, columns: &ColumnMapping) -> Result<Dataset> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let rows = root.as_array().context("Expected top-level JSON array")?;

    let mut records = Vec::with_capacity(rows.len());
    for (i, rec) in rows.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        let row = JsonRow { obj, columns };
        records.push(read_record(&row).with_context(|| format!("Row {i}"))?);
    }

    Ok(Dataset::from_records(records))
}

struct JsonRow<'r> {
    obj: &'r Map<String, JsonValue>,
    columns: &'r ColumnMapping,
}

impl JsonRow<'_> {
    fn cell(&self, field: Field) -> Option<&JsonValue> {
        self.obj
            .get(field.column(self.columns))
            .filter(|v| !v.is_null())
    }
}

impl CellSource for JsonRow<'_> {
    fn int(&self, field: Field) -> Result<Option<i64>> {
        let name = field.column(self.columns);
        match self.cell(field) {
            None => Ok(None),
            Some(JsonValue::Number(n)) => match n.as_i64() {
                Some(i) => Ok(Some(i)),
                None => n
                    .as_f64()
                    .and_then(whole_number)
                    .map(Some)
                    .with_context(|| format!("'{name}': {n} is not a whole number")),
            },
            Some(JsonValue::String(s)) => parse_int(s.trim()).map(Some),
            Some(other) => bail!("'{name}': expected an integer, got {other}"),
        }
    }

    fn float(&self, field: Field) -> Result<Option<f64>> {
        let name = field.column(self.columns);
        match self.cell(field) {
            None => Ok(None),
            Some(JsonValue::Number(n)) => Ok(n.as_f64()),
            Some(JsonValue::String(s)) => parse_float(s.trim()),
            Some(other) => bail!("'{name}': expected a number, got {other}"),
        }
    }

    fn text(&self, field: Field) -> Result<Option<String>> {
        let name = field.column(self.columns);
        match self.cell(field) {
            None => Ok(None),
            Some(JsonValue::String(s)) if s.trim().is_empty() => Ok(None),
            Some(JsonValue::String(s)) => Ok(Some(s.trim().to_string())),
            Some(JsonValue::Number(n)) => Ok(Some(n.to_string())),
            Some(other) => bail!("'{name}': expected text, got {other}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one column per field.
///
/// Dictionary-encoded columns (Pandas categoricals, Polars enums) are
/// unpacked first. Integer fields may be stored as integers, floats or text,
/// and every cell goes through the same checks as a CSV cell, so a value
/// that fails to load from CSV fails here too.
fn load_parquet(path: &Path, columns: &ColumnMapping) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let mut cast_columns: Vec<ArrayRef> = Vec::with_capacity(Field::ALL.len());
        for field in Field::ALL {
            let name = field.column(columns);
            let idx = schema
                .index_of(name)
                .map_err(|_| anyhow::anyhow!("Parquet file missing '{name}' column"))?;
            let column = normalize_column(batch.column(idx), field)
                .with_context(|| format!("column '{name}'"))?;
            cast_columns.push(column);
        }

        let first_row = records.len();
        for row in 0..batch.num_rows() {
            let cells = ArrowRow {
                columns: &cast_columns,
                row,
            };
            records.push(
                read_record(&cells).with_context(|| format!("Row {}", first_row + row))?,
            );
        }
    }

    Ok(Dataset::from_records(records))
}

/// Bring a column to Int64, Float64 or Utf8. A value that does not convert
/// is an error rather than a null.
fn normalize_column(column: &ArrayRef, field: Field) -> Result<ArrayRef> {
    let column = match column.data_type() {
        DataType::Dictionary(_, values) => strict_cast(column, values)?,
        _ => column.clone(),
    };
    let target = match column.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => DataType::Utf8,
        _ if !field.is_numeric() => DataType::Utf8,
        dt if field.is_integer() && dt.is_integer() => DataType::Int64,
        dt if dt.is_numeric() => DataType::Float64,
        dt => bail!("{dt} is not a numeric type"),
    };
    strict_cast(&column, &target)
}

fn strict_cast(column: &ArrayRef, target: &DataType) -> Result<ArrayRef> {
    let options = CastOptions {
        safe: false,
        ..CastOptions::default()
    };
    cast_with_options(column, target, &options)
        .with_context(|| format!("cannot read {} as {target}", column.data_type()))
}

struct ArrowRow<'b> {
    columns: &'b [ArrayRef],
    row: usize,
}

impl ArrowRow<'_> {
    fn column(&self, field: Field) -> Option<&ArrayRef> {
        let col = &self.columns[field.index()];
        (!col.is_null(self.row)).then_some(col)
    }

    fn string<'c>(&self, col: &'c ArrayRef) -> Result<Option<&'c str>> {
        let arr = col
            .as_string_opt::<i32>()
            .context("expected Utf8 column")?;
        let s = arr.value(self.row).trim();
        Ok((!s.is_empty()).then_some(s))
    }
}

impl CellSource for ArrowRow<'_> {
    fn int(&self, field: Field) -> Result<Option<i64>> {
        let Some(col) = self.column(field) else {
            return Ok(None);
        };
        match col.data_type() {
            DataType::Int64 => {
                let arr = col
                    .as_primitive_opt::<Int64Type>()
                    .context("expected Int64 column")?;
                Ok(Some(arr.value(self.row)))
            }
            DataType::Float64 => {
                let arr = col
                    .as_primitive_opt::<Float64Type>()
                    .context("expected Float64 column")?;
                let v = arr.value(self.row);
                whole_number(v)
                    .map(Some)
                    .with_context(|| format!("'{v}' is not a whole number"))
            }
            _ => self.string(col)?.map(parse_int).transpose(),
        }
    }

    fn float(&self, field: Field) -> Result<Option<f64>> {
        let Some(col) = self.column(field) else {
            return Ok(None);
        };
        match col.data_type() {
            DataType::Float64 => {
                let arr = col
                    .as_primitive_opt::<Float64Type>()
                    .context("expected Float64 column")?;
                let v = arr.value(self.row);
                Ok((!v.is_nan()).then_some(v))
            }
            _ => Ok(self.string(col)?.map(parse_float).transpose()?.flatten()),
        }
    }

    fn text(&self, field: Field) -> Result<Option<String>> {
        let Some(col) = self.column(field) else {
            return Ok(None);
        };
        Ok(self.string(col)?.map(str::to_string))
    }
}
