use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, ArrayRef, Float32Array, Float64Array, Int16Array, Int32Array, Int64Array, Int8Array,
    LargeStringArray, StringArray, UInt16Array, UInt32Array, UInt64Array, UInt8Array,
};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use thiserror::Error;

use super::model::{LaunchDataset, LaunchRecord, Outcome};

pub const COL_FLIGHT_NUMBER: &str = "Flight Number";
pub const COL_LAUNCH_SITE: &str = "Launch Site";
pub const COL_PAYLOAD_MASS: &str = "Payload Mass (kg)";
pub const COL_CLASS: &str = "class";
pub const COL_BOOSTER_CATEGORY: &str = "Booster Version Category";

/// Columns every input file must provide.
pub const REQUIRED_COLUMNS: [&str; 4] = [
    COL_LAUNCH_SITE,
    COL_PAYLOAD_MASS,
    COL_CLASS,
    COL_BOOSTER_CATEGORY,
];

/// Row-level validation failures.
#[derive(Debug, Error, PartialEq)]
pub enum LoadError {
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("missing required column '{0}'")]
    MissingColumn(String),
    #[error("row {row}: payload mass {value} is not a non-negative number")]
    InvalidPayload { row: usize, value: f64 },
    #[error("row {row}: class must be 0 or 1, got {value}")]
    InvalidClass { row: usize, value: f64 },
    #[error("row {row}: column '{column}' is null")]
    NullValue { row: usize, column: String },
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a launch dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with at least the [`REQUIRED_COLUMNS`]
/// * `.json`    – `[{ "Launch Site": "...", "Payload Mass (kg)": 500.0, ... }, ...]`
/// * `.parquet` – flat table with the same column names
pub fn load_file(path: &Path) -> Result<LaunchDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(LoadError::UnsupportedExtension(other.to_string()).into()),
    }
}

/// One row as it appears in the source, before validation.
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "Flight Number", default)]
    flight_number: Option<i64>,
    #[serde(rename = "Launch Site")]
    launch_site: String,
    #[serde(rename = "Payload Mass (kg)")]
    payload_mass_kg: f64,
    /// Read as a float so both `1` and `1.0` parse; anything but 0 or 1 is rejected.
    #[serde(rename = "class")]
    class: f64,
    #[serde(rename = "Booster Version Category")]
    booster_version_category: String,
}

fn validate(raw: RawRecord, row: usize) -> Result<LaunchRecord, LoadError> {
    if !raw.payload_mass_kg.is_finite() || raw.payload_mass_kg < 0.0 {
        return Err(LoadError::InvalidPayload {
            row,
            value: raw.payload_mass_kg,
        });
    }
    let invalid_class = || LoadError::InvalidClass {
        row,
        value: raw.class,
    };
    if raw.class.fract() != 0.0 {
        return Err(invalid_class());
    }
    let outcome = Outcome::try_from(raw.class as i64).map_err(|_| invalid_class())?;

    Ok(LaunchRecord {
        flight_number: raw.flight_number,
        launch_site: raw.launch_site,
        payload_mass_kg: raw.payload_mass_kg,
        outcome,
        booster_version_category: raw.booster_version_category,
    })
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<LaunchDataset> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening CSV {}", path.display()))?;
    read_csv(file)
}

/// Parse CSV launch records.  Columns other than the required ones (and the
/// optional `Flight Number`) are ignored.
pub fn read_csv<R: Read>(input: R) -> Result<LaunchDataset> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader.headers().context("reading CSV headers")?.clone();
    for required in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == required) {
            return Err(LoadError::MissingColumn(required.to_string()).into());
        }
    }

    let mut records = Vec::new();
    for (row_no, result) in reader.deserialize::<RawRecord>().enumerate() {
        let raw = result.with_context(|| format!("CSV row {row_no}"))?;
        records.push(validate(raw, row_no)?);
    }

    Ok(LaunchDataset::from_records(records))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

fn load_json(path: &Path) -> Result<LaunchDataset> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening JSON {}", path.display()))?;
    read_json(std::io::BufReader::new(file))
}

/// Parse records-oriented JSON (the default `df.to_json(orient='records')`).
pub fn read_json<R: Read>(input: R) -> Result<LaunchDataset> {
    let rows: Vec<RawRecord> = serde_json::from_reader(input).context("parsing JSON")?;

    let records = rows
        .into_iter()
        .enumerate()
        .map(|(row, raw)| validate(raw, row))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(LaunchDataset::from_records(records))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat launch columns.
///
/// Payload may be stored as any float or integer type, `class` as an integer
/// or float (Pandas promotes integer columns containing nulls to float).
fn load_parquet(path: &Path) -> Result<LaunchDataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        let site_col = column(&batch, COL_LAUNCH_SITE)?;
        let payload_col = column(&batch, COL_PAYLOAD_MASS)?;
        let class_col = column(&batch, COL_CLASS)?;
        let booster_col = column(&batch, COL_BOOSTER_CATEGORY)?;
        let flight_col = column(&batch, COL_FLIGHT_NUMBER).ok();

        for i in 0..batch.num_rows() {
            let row = records.len();
            let raw = RawRecord {
                flight_number: match flight_col {
                    Some(col) => cell_f64(col, i)?.map(|v| v as i64),
                    None => None,
                },
                launch_site: required(cell_string(site_col, i)?, row, COL_LAUNCH_SITE)?,
                payload_mass_kg: required(cell_f64(payload_col, i)?, row, COL_PAYLOAD_MASS)?,
                class: required(cell_f64(class_col, i)?, row, COL_CLASS)?,
                booster_version_category: required(
                    cell_string(booster_col, i)?,
                    row,
                    COL_BOOSTER_CATEGORY,
                )?,
            };
            records.push(validate(raw, row)?);
        }
    }

    Ok(LaunchDataset::from_records(records))
}

// -- Parquet / Arrow helpers --

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef, LoadError> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| LoadError::MissingColumn(name.to_string()))?;
    Ok(batch.column(idx))
}

fn required<T>(value: Option<T>, row: usize, column: &str) -> Result<T, LoadError> {
    value.ok_or_else(|| LoadError::NullValue {
        row,
        column: column.to_string(),
    })
}

/// Read a numeric cell as `f64`, `None` for null.
fn cell_f64(col: &ArrayRef, row: usize) -> Result<Option<f64>> {
    if col.is_null(row) {
        return Ok(None);
    }
    let any = col.as_any();
    let value = match col.data_type() {
        DataType::Float64 => any.downcast_ref::<Float64Array>().map(|a| a.value(row)),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|a| a.value(row) as f64),
        DataType::Int64 => any.downcast_ref::<Int64Array>().map(|a| a.value(row) as f64),
        DataType::Int32 => any.downcast_ref::<Int32Array>().map(|a| f64::from(a.value(row))),
        DataType::Int16 => any.downcast_ref::<Int16Array>().map(|a| f64::from(a.value(row))),
        DataType::Int8 => any.downcast_ref::<Int8Array>().map(|a| f64::from(a.value(row))),
        DataType::UInt64 => any.downcast_ref::<UInt64Array>().map(|a| a.value(row) as f64),
        DataType::UInt32 => any.downcast_ref::<UInt32Array>().map(|a| f64::from(a.value(row))),
        DataType::UInt16 => any.downcast_ref::<UInt16Array>().map(|a| f64::from(a.value(row))),
        DataType::UInt8 => any.downcast_ref::<UInt8Array>().map(|a| f64::from(a.value(row))),
        other => bail!("expected a numeric column, got {other:?}"),
    };
    value.context("unexpected array layout").map(Some)
}

/// Read a string cell, `None` for null.
fn cell_string(col: &ArrayRef, row: usize) -> Result<Option<String>> {
    if col.is_null(row) {
        return Ok(None);
    }
    let any = col.as_any();
    let value = match col.data_type() {
        DataType::Utf8 => any
            .downcast_ref::<StringArray>()
            .map(|a| a.value(row).to_string()),
        DataType::LargeUtf8 => any
            .downcast_ref::<LargeStringArray>()
            .map(|a| a.value(row).to_string()),
        other => bail!("expected a string column, got {other:?}"),
    };
    value.context("unexpected array layout").map(Some)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use parquet::arrow::ArrowWriter;

    use super::*;

    const SAMPLE_CSV: &str = "\
Flight Number,Launch Site,class,Payload Mass (kg),Booster Version,Booster Version Category
1,CCAFS LC-40,0,0.0,F9 v1.0  B0003,v1.0
2,CCAFS LC-40,1,525.0,F9 v1.0  B0005,v1.0
3,VAFB SLC-4E,1,500.0,F9 v1.1  B1003,v1.1
";

    #[test]
    fn test_read_csv() {
        let ds = read_csv(SAMPLE_CSV.as_bytes()).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.sites, vec!["CCAFS LC-40", "VAFB SLC-4E"]);
        let second = &ds.records[1];
        assert_eq!(second.flight_number, Some(2));
        assert_eq!(second.payload_mass_kg, 525.0);
        assert_eq!(second.outcome, Outcome::Success);
        assert_eq!(second.booster_version_category, "v1.0");
    }

    #[test]
    fn test_read_csv_without_flight_number() {
        let csv = "Launch Site,Payload Mass (kg),class,Booster Version Category\nA,500,1,FT\n";
        let ds = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(ds.records[0].flight_number, None);
        assert_eq!(ds.records[0].payload_mass_kg, 500.0);
    }

    #[test]
    fn test_missing_column_is_reported() {
        let csv = "Launch Site,class,Booster Version Category\nA,1,FT\n";
        let err = read_csv(csv.as_bytes()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<LoadError>(),
            Some(&LoadError::MissingColumn(COL_PAYLOAD_MASS.to_string()))
        );
    }

    #[test]
    fn test_invalid_class_is_rejected() {
        let csv = "Launch Site,Payload Mass (kg),class,Booster Version Category\nA,500,1,FT\nA,600,2,FT\n";
        let err = read_csv(csv.as_bytes()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<LoadError>(),
            Some(&LoadError::InvalidClass { row: 1, value: 2.0 })
        );
    }

    #[test]
    fn test_negative_payload_is_rejected() {
        let csv = "Launch Site,Payload Mass (kg),class,Booster Version Category\nA,-1,1,FT\n";
        let err = read_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::InvalidPayload { row: 0, .. })
        ));
    }

    #[test]
    fn test_malformed_number_fails() {
        let csv = "Launch Site,Payload Mass (kg),class,Booster Version Category\nA,heavy,1,FT\n";
        assert!(read_csv(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_read_json() {
        let json = r#"[
            {"Launch Site": "KSC LC-39A", "Payload Mass (kg)": 2490, "class": 1,
             "Booster Version Category": "FT", "Mission Outcome": "Success"},
            {"Launch Site": "KSC LC-39A", "Payload Mass (kg)": 5600.5, "class": 0,
             "Booster Version Category": "FT", "Flight Number": 31}
        ]"#;
        let ds = read_json(json.as_bytes()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].payload_mass_kg, 2490.0);
        assert_eq!(ds.records[1].flight_number, Some(31));
        assert_eq!(ds.records[1].outcome, Outcome::Failure);
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_file(Path::new("launches.xlsx")).unwrap_err();
        assert_eq!(
            err.downcast_ref::<LoadError>(),
            Some(&LoadError::UnsupportedExtension("xlsx".to_string()))
        );
    }

    #[test]
    fn test_fractional_class_in_csv_is_rejected() {
        let csv = "Launch Site,Payload Mass (kg),class,Booster Version Category\nA,500,1.0,FT\nA,600,0.5,FT\n";
        let err = read_csv(csv.as_bytes()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<LoadError>(),
            Some(&LoadError::InvalidClass { row: 1, value: 0.5 })
        );
    }

    // -- Parquet --

    fn write_parquet(name: &str, columns: Vec<(&str, ArrayRef)>) -> PathBuf {
        let batch = RecordBatch::try_from_iter(columns).unwrap();
        let path = std::env::temp_dir().join(format!(
            "launch-dashboard-{}-{name}.parquet",
            std::process::id()
        ));
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
        path
    }

    fn load_and_remove(path: PathBuf) -> Result<LaunchDataset> {
        let result = load_file(&path);
        std::fs::remove_file(&path).unwrap();
        result
    }

    fn strings(values: &[&str]) -> ArrayRef {
        Arc::new(StringArray::from(values.to_vec()))
    }

    #[test]
    fn test_read_parquet() {
        let path = write_parquet(
            "ok",
            vec![
                (COL_FLIGHT_NUMBER, Arc::new(Int64Array::from(vec![Some(7), None])) as ArrayRef),
                (COL_LAUNCH_SITE, strings(&["CCAFS LC-40", "KSC LC-39A"])),
                (COL_PAYLOAD_MASS, Arc::new(UInt16Array::from(vec![2500, 0])) as ArrayRef),
                (COL_CLASS, Arc::new(Int64Array::from(vec![1, 0])) as ArrayRef),
                (COL_BOOSTER_CATEGORY, strings(&["FT", "B4"])),
            ],
        );
        let ds = load_and_remove(path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.sites, vec!["CCAFS LC-40", "KSC LC-39A"]);
        assert_eq!(ds.records[0].flight_number, Some(7));
        assert_eq!(ds.records[1].flight_number, None);
        assert_eq!(ds.records[0].payload_mass_kg, 2500.0);
        assert_eq!(ds.records[0].outcome, Outcome::Success);
        assert_eq!(ds.records[1].outcome, Outcome::Failure);
        assert_eq!(ds.records[1].booster_version_category, "B4");
    }

    #[test]
    fn test_parquet_float_class_must_be_whole() {
        let whole = write_parquet(
            "whole-class",
            vec![
                (COL_LAUNCH_SITE, strings(&["A", "A"])),
                (COL_PAYLOAD_MASS, Arc::new(Float64Array::from(vec![500.0, 600.0])) as ArrayRef),
                (COL_CLASS, Arc::new(Float64Array::from(vec![1.0, 0.0])) as ArrayRef),
                (COL_BOOSTER_CATEGORY, strings(&["FT", "FT"])),
            ],
        );
        let ds = load_and_remove(whole).unwrap();
        assert_eq!(ds.records[0].outcome, Outcome::Success);
        assert_eq!(ds.records[1].outcome, Outcome::Failure);

        let fractional = write_parquet(
            "fractional-class",
            vec![
                (COL_LAUNCH_SITE, strings(&["A", "A"])),
                (COL_PAYLOAD_MASS, Arc::new(Float64Array::from(vec![500.0, 600.0])) as ArrayRef),
                (COL_CLASS, Arc::new(Float64Array::from(vec![0.7, 1.9])) as ArrayRef),
                (COL_BOOSTER_CATEGORY, strings(&["FT", "FT"])),
            ],
        );
        let err = load_and_remove(fractional).unwrap_err();
        assert_eq!(
            err.downcast_ref::<LoadError>(),
            Some(&LoadError::InvalidClass { row: 0, value: 0.7 })
        );
    }

    #[test]
    fn test_parquet_null_required_cell() {
        let path = write_parquet(
            "null-site",
            vec![
                (
                    COL_LAUNCH_SITE,
                    Arc::new(StringArray::from(vec![Some("A"), None])) as ArrayRef,
                ),
                (COL_PAYLOAD_MASS, Arc::new(Float64Array::from(vec![500.0, 600.0])) as ArrayRef),
                (COL_CLASS, Arc::new(Int64Array::from(vec![1, 0])) as ArrayRef),
                (COL_BOOSTER_CATEGORY, strings(&["FT", "FT"])),
            ],
        );
        let err = load_and_remove(path).unwrap_err();
        assert_eq!(
            err.downcast_ref::<LoadError>(),
            Some(&LoadError::NullValue {
                row: 1,
                column: COL_LAUNCH_SITE.to_string()
            })
        );
    }

    #[test]
    fn test_parquet_missing_column() {
        let path = write_parquet(
            "no-booster",
            vec![
                (COL_LAUNCH_SITE, strings(&["A"])),
                (COL_PAYLOAD_MASS, Arc::new(Float64Array::from(vec![500.0])) as ArrayRef),
                (COL_CLASS, Arc::new(Int64Array::from(vec![1])) as ArrayRef),
            ],
        );
        let err = load_and_remove(path).unwrap_err();
        assert_eq!(
            err.downcast_ref::<LoadError>(),
            Some(&LoadError::MissingColumn(COL_BOOSTER_CATEGORY.to_string()))
        );
    }

    #[test]
    fn test_parquet_non_numeric_payload_names_type() {
        let path = write_parquet(
            "text-payload",
            vec![
                (COL_LAUNCH_SITE, strings(&["A"])),
                (COL_PAYLOAD_MASS, strings(&["heavy"])),
                (COL_CLASS, Arc::new(Int64Array::from(vec![1])) as ArrayRef),
                (COL_BOOSTER_CATEGORY, strings(&["FT"])),
            ],
        );
        let err = load_and_remove(path).unwrap_err();
        assert!(format!("{err:#}").contains("Utf8"));
    }
}
