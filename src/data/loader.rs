use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Respondent, ResponseTable};

/// Cell texts read as missing, matching the Pandas `read_csv` defaults.
const NA_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
    "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// How a delimited file is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Field delimiter for CSV files.
    pub delimiter: u8,
    /// First column is a row index written by the exporter; drop it.
    pub index_column: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            index_column: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a questionnaire export from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.tsv` / `.txt` – delimited text with a header row
/// * `.json`    – `[{ "Classe": "4A", "Age": 13, ... }, ...]`
/// * `.parquet` – one column per question
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<ResponseTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" | "txt" => load_csv(path, options)?,
        "tsv" => load_csv(
            path,
            &LoadOptions {
                delimiter: b'\t',
                ..*options
            },
        )?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    log::info!(
        "Loaded {} respondents with {} columns from {}",
        table.len(),
        table.column_names.len(),
        path.display()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Header row with column names, one respondent per line.  Multi-answer
/// questions are stored as a single quoted, comma-joined cell.
fn load_csv(path: &Path, options: &LoadOptions) -> Result<ResponseTable> {
    let reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening CSV {}", path.display()))?;
    read_csv(reader, options)
}

fn read_csv<R: std::io::Read>(mut reader: csv::Reader<R>, options: &LoadOptions) -> Result<ResponseTable> {
    let skip = usize::from(options.index_column);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .skip(skip)
        .map(|h| h.trim().to_string())
        .collect();

    let mut respondents = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let answers: BTreeMap<String, CellValue> = record
            .iter()
            .skip(skip)
            .zip(headers.iter())
            .map(|(value, col_name)| (col_name.clone(), guess_cell_type(value)))
            .collect();

        respondents.push(Respondent { answers });
    }

    Ok(ResponseTable::from_respondents(headers, respondents))
}

fn guess_cell_type(s: &str) -> CellValue {
    if NA_MARKERS.contains(&s.trim()) {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        if f.is_finite() {
            return CellValue::Float(f);
        }
    }
    match s {
        "true" | "True" | "TRUE" => CellValue::Bool(true),
        "false" | "False" | "FALSE" => CellValue::Bool(false),
        _ => CellValue::String(s.to_string()),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`).
fn load_json(path: &Path) -> Result<ResponseTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json_records(&text)
}

fn parse_json_records(text: &str) -> Result<ResponseTable> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut column_names: Vec<String> = Vec::new();
    let mut respondents = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let mut answers = BTreeMap::new();
        for (key, val) in obj {
            if !column_names.contains(key) {
                column_names.push(key.clone());
            }
            answers.insert(key.clone(), json_to_cell(val));
        }

        respondents.push(Respondent { answers });
    }

    Ok(ResponseTable::from_respondents(column_names, respondents))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => guess_cell_type(s),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        // Multi-answer exported as a list: join it back into the delimited form.
        JsonValue::Array(items) => CellValue::String(
            items
                .iter()
                .map(|v| match v {
                    JsonValue::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(", "),
        ),
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per question.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).  A Pandas `__index_level_0__` column is
/// dropped.
fn load_parquet(path: &Path) -> Result<ResponseTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;

    let column_names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .filter(|name| !name.starts_with("__index_level_"))
        .collect();

    let reader = builder.build().context("building parquet reader")?;
    let mut respondents = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let cols: Vec<(usize, &String)> = column_names
            .iter()
            .filter_map(|name| schema.index_of(name).ok().map(|i| (i, name)))
            .collect();

        for row in 0..batch.num_rows() {
            let answers = cols
                .iter()
                .map(|(idx, name)| ((*name).clone(), extract_cell(batch.column(*idx), row)))
                .collect();
            respondents.push(Respondent { answers });
        }
    }

    Ok(ResponseTable::from_respondents(column_names, respondents))
}

/// Extract a single answer from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => guess_cell_type(col.as_string::<i32>().value(row)),
        DataType::LargeUtf8 => guess_cell_type(col.as_string::<i64>().value(row)),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => float_cell(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => float_cell(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        // Dictionaries (pandas `category`), narrow integers, dates, views:
        // read the displayed value and type it like a CSV cell.
        other => match ArrayFormatter::try_new(col.as_ref(), &FormatOptions::default()) {
            Ok(formatter) => guess_cell_type(&formatter.value(row).to_string()),
            Err(e) => {
                log::warn!("Cannot read parquet column of type {other:?}: {e}");
                CellValue::Null
            }
        },
    }
}

/// Pandas stores missing numbers as NaN rather than null.
fn float_cell(v: f64) -> CellValue {
    if v.is_nan() {
        CellValue::Null
    } else {
        CellValue::Float(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_csv_with_index_column() {
        let file = write_temp(
            ".csv",
            ",Type_etab,Departement,Freq_eval\n\
             0,COLLEGE,45,\"Chaque semaine, Chaque mois\"\n\
             1,LYCEE GENERAL,37,\n",
        );
        let options = LoadOptions {
            index_column: true,
            ..LoadOptions::default()
        };
        let table = load_file(file.path(), &options).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.column_names, vec!["Type_etab", "Departement", "Freq_eval"]);
        assert_eq!(
            table.respondents[0].get("Freq_eval"),
            &CellValue::String("Chaque semaine, Chaque mois".into())
        );
        assert_eq!(table.respondents[1].get("Departement"), &CellValue::Integer(37));
        assert!(table.respondents[1].get("Freq_eval").is_null());
    }

    #[test]
    fn test_load_csv_without_index_column() {
        let file = write_temp(".csv", "Classe,Age\n4A,13\n3B,NA\n");
        let table = load_file(file.path(), &LoadOptions::default()).unwrap();
        assert_eq!(table.column_names, vec!["Classe", "Age"]);
        assert!(table.respondents[1].get("Age").is_null());
    }

    #[test]
    fn test_guess_cell_type() {
        assert_eq!(guess_cell_type("12"), CellValue::Integer(12));
        assert_eq!(guess_cell_type("47.9"), CellValue::Float(47.9));
        assert_eq!(guess_cell_type("True"), CellValue::Bool(true));
        assert_eq!(guess_cell_type("nan"), CellValue::Null);
        assert_eq!(guess_cell_type("  "), CellValue::Null);
        assert_eq!(guess_cell_type("Oui"), CellValue::String("Oui".into()));
    }

    #[test]
    fn test_parse_json_records() {
        let table = parse_json_records(
            r#"[{"Classe": "4A", "Age": 13, "Peur": ["Oui", "Parfois"]},
                {"Classe": "3B", "Age": null}]"#,
        )
        .unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.has_column("Peur"));
        assert_eq!(
            table.respondents[0].get("Peur"),
            &CellValue::String("Oui, Parfois".into())
        );
        assert!(table.respondents[1].get("Age").is_null());
        assert!(table.respondents[1].get("Peur").is_null());
    }

    #[test]
    fn test_parquet_dictionary_and_narrow_columns() {
        use arrow::array::{ArrayRef, DictionaryArray, Int8Array};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let classes: DictionaryArray<Int32Type> =
            vec![Some("4A"), None, Some("3B"), Some("4A")].into_iter().collect();
        let ages = Int8Array::from(vec![Some(13), Some(14), None, Some(13)]);
        let batch = RecordBatch::try_from_iter(vec![
            ("Classe", Arc::new(classes) as ArrayRef),
            ("Age", Arc::new(ages) as ArrayRef),
        ])
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), batch.schema(), None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(file.path(), &LoadOptions::default()).unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(table.respondents[0].get("Classe"), &CellValue::String("4A".into()));
        assert!(table.respondents[1].get("Classe").is_null());
        assert_eq!(table.respondents[2].get("Classe"), &CellValue::String("3B".into()));
        assert_eq!(table.respondents[1].get("Age"), &CellValue::Integer(14));
        assert!(table.respondents[2].get("Age").is_null());
        assert_eq!(table.unique_values["Classe"].len(), 2);
    }

    #[test]
    fn test_unsupported_extension() {
        let file = write_temp(".xlsx", "");
        assert!(load_file(file.path(), &LoadOptions::default()).is_err());
    }
}
