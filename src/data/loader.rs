use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::{CellValue, Column, Table};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – columnar artifact files written by the analysis pipeline
/// * `.csv`     – comma-separated with a header row, any schema
pub fn load_file(path: &Path) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one observation per record.
/// Column types are inferred over the whole column, so a column of integers
/// with a single decimal value becomes a float column.
fn load_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        for (col_idx, cells) in raw.iter_mut().enumerate() {
            cells.push(record.get(col_idx).unwrap_or("").to_string());
        }
    }

    let columns = headers
        .into_iter()
        .zip(raw)
        .map(|(name, cells)| infer_column(name, &cells))
        .collect();

    Ok(Table::new(columns))
}

/// Cell texts read as missing, matched case-sensitively. Same set as the
/// pandas `read_csv` defaults.
const NA_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_na(cell: &str) -> bool {
    cell.is_empty() || NA_TOKENS.contains(&cell)
}

/// Pick the narrowest type every non-missing cell parses as.
fn infer_column(name: String, cells: &[String]) -> Column {
    let present = || cells.iter().map(|c| c.trim()).filter(|c| !is_na(c));

    let values = if present().all(|c| c.parse::<i64>().is_ok()) {
        parse_cells(cells, |c| c.parse().ok().map(CellValue::Integer))
    } else if present().all(|c| c.parse::<f64>().is_ok()) {
        parse_cells(cells, |c| c.parse().ok().map(CellValue::Float))
    } else if present().all(|c| parse_bool(c).is_some()) {
        parse_cells(cells, |c| parse_bool(c).map(CellValue::Bool))
    } else {
        parse_cells(cells, |c| Some(CellValue::String(c.to_string())))
    };

    Column::new(name, values)
}

fn parse_cells(cells: &[String], parse: impl Fn(&str) -> Option<CellValue>) -> Vec<CellValue> {
    cells
        .iter()
        .map(|c| {
            let c = c.trim();
            if is_na(c) {
                CellValue::Null
            } else {
                parse(c).unwrap_or(CellValue::Null)
            }
        })
        .collect()
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load every record batch of a Parquet file into one [`Table`].
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;

    let mut columns: Vec<Column> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| Column::new(f.name().clone(), Vec::new()))
        .collect();

    let reader = builder.build().context("building parquet reader")?;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        if log::log_enabled!(log::Level::Trace) {
            let head = batch.slice(0, batch.num_rows().min(5));
            if let Ok(text) = arrow::util::pretty::pretty_format_batches(&[head]) {
                log::trace!("{}:\n{text}", path.display());
            }
        }

        for (column, array) in columns.iter_mut().zip(batch.columns()) {
            let values = extract_values(array)
                .with_context(|| format!("reading column '{}'", column.name))?;
            column.values.extend(values);
        }
    }

    Ok(Table::new(columns))
}

// -- Arrow helpers --

/// Convert an Arrow column into cells. Integer and float widths are widened
/// to `i64` / `f64`; dates and anything exotic are rendered to text.
fn extract_values(col: &ArrayRef) -> Result<Vec<CellValue>> {
    let data_type = col.data_type();

    let values: Vec<CellValue> = if data_type.is_integer() {
        let wide = cast(col, &DataType::Int64)?;
        wide.as_primitive::<Int64Type>()
            .iter()
            .map(|v| v.map_or(CellValue::Null, CellValue::Integer))
            .collect()
    } else if data_type.is_floating() {
        let wide = cast(col, &DataType::Float64)?;
        wide.as_primitive::<Float64Type>()
            .iter()
            .map(|v| v.map_or(CellValue::Null, CellValue::Float))
            .collect()
    } else {
        match data_type {
            DataType::Boolean => col
                .as_boolean()
                .iter()
                .map(|v| v.map_or(CellValue::Null, CellValue::Bool))
                .collect(),
            DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => {
                let text = cast(col, &DataType::Utf8)?;
                text.as_string::<i32>()
                    .iter()
                    .map(|v| v.map_or(CellValue::Null, |s| CellValue::String(s.to_string())))
                    .collect()
            }
            DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => {
                format_values(col, CellValue::Date)?
            }
            _ => format_values(col, CellValue::String)?,
        }
    };

    Ok(values)
}

fn format_values(col: &ArrayRef, wrap: fn(String) -> CellValue) -> Result<Vec<CellValue>> {
    let options = FormatOptions::default();
    let formatter = ArrayFormatter::try_new(col.as_ref(), &options)?;
    Ok((0..col.len())
        .map(|row| {
            if col.is_null(row) {
                CellValue::Null
            } else {
                wrap(formatter.value(row).to_string())
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Float32Array, Int32Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    fn write_csv(dir: &Path, body: &str) -> std::path::PathBuf {
        let path = dir.join("meteor_data.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn csv_columns_get_whole_column_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "name,id,mass,fall,year\n\
             Aachen,1,21,Fell,1880\n\
             Aarhus,2,720.5,Fell,\n\
             Abee,6,,Found,1952\n",
        );

        let table = load_file(&path).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.column_names(), ["name", "id", "mass", "fall", "year"]);
        assert_eq!(table.column("id").unwrap().values[2], CellValue::Integer(6));
        assert_eq!(table.column("mass").unwrap().values[0], CellValue::Float(21.0));
        assert_eq!(table.column("mass").unwrap().values[2], CellValue::Null);
        assert_eq!(table.column("year").unwrap().values[1], CellValue::Null);
        assert_eq!(
            table.column("fall").unwrap().values[1],
            CellValue::String("Fell".into())
        );
    }

    #[test]
    fn csv_missing_markers_become_null() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "name,mass,year,fall\n\
             Aachen,21,1880,Fell\n\
             Aarhus,NA,1951,null\n\
             Abee,107000,N/A,Found\n",
        );

        let table = load_file(&path).unwrap();

        assert_eq!(
            table.column("mass").unwrap().values,
            vec![CellValue::Integer(21), CellValue::Null, CellValue::Integer(107000)]
        );
        assert_eq!(
            table.column("year").unwrap().values,
            vec![CellValue::Integer(1880), CellValue::Integer(1951), CellValue::Null]
        );
        assert_eq!(table.column("fall").unwrap().values[1], CellValue::Null);
    }

    #[test]
    fn missing_markers_are_case_sensitive() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "note\nNa\nNA\n");

        let table = load_file(&path).unwrap();
        assert_eq!(
            table.column("note").unwrap().values,
            vec![CellValue::String("Na".into()), CellValue::Null]
        );
    }

    #[test]
    fn csv_booleans_are_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "flag\nTrue\nfalse\n");

        let table = load_file(&path).unwrap();
        assert_eq!(
            table.column("flag").unwrap().values,
            vec![CellValue::Bool(true), CellValue::Bool(false)]
        );
    }

    #[test]
    fn ragged_csv_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "a,b\n1,2\n3\n");
        assert!(load_file(&path).is_err());
    }

    #[test]
    fn parquet_widens_numeric_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clusters.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int32, false),
            Field::new("reclat", DataType::Float32, true),
            Field::new("name", DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int32Array::from(vec![1, 2])),
                Arc::new(Float32Array::from(vec![Some(50.5), None])),
                Arc::new(StringArray::from(vec![Some("Aachen"), None])),
            ],
        )
        .unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(&path).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.column("id").unwrap().values[1], CellValue::Integer(2));
        assert_eq!(table.column("reclat").unwrap().values[0], CellValue::Float(50.5));
        assert_eq!(table.column("reclat").unwrap().values[1], CellValue::Null);
        assert_eq!(
            table.column("name").unwrap().values[0],
            CellValue::String("Aachen".into())
        );
    }

    #[test]
    fn garbage_parquet_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anomaly_scores.parquet");
        std::fs::write(&path, b"not a parquet file").unwrap();
        assert!(load_file(&path).is_err());
    }

    #[test]
    fn unknown_extension_is_rejected() {
        assert!(load_file(Path::new("scores.xlsx")).is_err());
    }
}
