use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Array, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::error::PipelineError;
use super::geo::BoundarySet;
use super::model::{Linkages, MergedRecord, MergedTable, Metric, ParticipationRecord};
use super::participation::{read_participation, RawParticipation};
use super::sheet::{CellValue, SheetSource, WorkbookSheets, EMPTY_CELL};

// ---------------------------------------------------------------------------
// Pipeline inputs
// ---------------------------------------------------------------------------

/// Open the per-country emissions workbook.
pub fn load_emissions_workbook(path: &Path) -> Result<WorkbookSheets> {
    let source = WorkbookSheets::open(path)?;
    log::info!(
        "opened {} with {} sheets",
        path.display(),
        source.sheet_names().len()
    );
    Ok(source)
}

/// Read the wide participation CSV.
pub fn load_participation_csv(path: &Path) -> Result<Vec<RawParticipation>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening participation CSV {}", path.display()))?;
    let rows = read_participation(file)
        .with_context(|| format!("reading participation CSV {}", path.display()))?;
    log::info!("read {} participation rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Read country boundaries from a GeoJSON file.
pub fn load_boundaries(path: &Path) -> Result<BoundarySet> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading boundaries {}", path.display()))?;
    BoundarySet::from_geojson(&text)
        .with_context(|| format!("parsing boundaries {}", path.display()))
}

// ---------------------------------------------------------------------------
// Merged table (dashboard input)
// ---------------------------------------------------------------------------

/// Load a merged table written by the exporter.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xls` / `.ods` – first sheet, header row
/// * `.csv`                    – header row
/// * `.parquet`                – one column per field
pub fn load_file(path: &Path) -> Result<MergedTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "xlsx" | "xlsm" | "xls" | "ods" => load_xlsx(path),
        "csv" => load_csv(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(PipelineError::UnsupportedExtension(other.to_string()).into()),
    };
    table.with_context(|| format!("loading merged table {}", path.display()))
}

/// Positions of the merged-table columns within a header row.
struct MergedColumns {
    year: usize,
    country: usize,
    industry: usize,
    linkages: [usize; 6],
    ce: usize,
}

const LINKAGE_METRICS: [Metric; 6] = [
    Metric::Forward,
    Metric::ForwardSimple,
    Metric::ForwardComplex,
    Metric::Backward,
    Metric::BackwardSimple,
    Metric::BackwardComplex,
];

impl MergedColumns {
    fn locate(headers: &[String]) -> Result<Self> {
        let position = |name: &str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| {
                    PipelineError::MissingColumn {
                        source_name: "merged table".into(),
                        column: name.into(),
                    }
                    .into()
                })
        };
        let mut linkages = [0; 6];
        for (slot, metric) in linkages.iter_mut().zip(LINKAGE_METRICS) {
            *slot = position(metric.column())?;
        }
        Ok(Self {
            year: position("year")?,
            country: position("country")?,
            industry: position("industry")?,
            linkages,
            ce: position(Metric::Emissions.column())?,
        })
    }

    /// Build a record from one row. Derived sums are recomputed from the
    /// forward/backward components rather than read back.
    fn record(&self, row: &[CellValue], row_no: usize) -> Result<MergedRecord> {
        let cell = |idx: usize| row.get(idx).unwrap_or(&EMPTY_CELL);
        let number = |idx: usize, column: &str| -> Result<f64> {
            let c = cell(idx);
            if c.is_empty() {
                return Ok(f64::NAN);
            }
            c.as_f64().ok_or_else(|| {
                PipelineError::NotNumeric {
                    source_name: "merged table".into(),
                    row: row_no,
                    column: column.into(),
                    value: c.to_string(),
                }
                .into()
            })
        };

        let year = number(self.year, "year")?;
        if year.is_nan() || year.fract() != 0.0 {
            return Err(PipelineError::NotNumeric {
                source_name: "merged table".into(),
                row: row_no,
                column: "year".into(),
                value: cell(self.year).to_string(),
            }
            .into());
        }
        let mut l = [0.0; 6];
        for ((slot, &idx), metric) in l.iter_mut().zip(&self.linkages).zip(LINKAGE_METRICS) {
            *slot = number(idx, metric.column())?;
        }
        let ce = number(self.ce, "CE")?;

        let participation = ParticipationRecord::new(
            year as i32,
            cell(self.country).to_string().trim().to_string(),
            cell(self.industry).to_string().trim().to_string(),
            Linkages {
                forward: l[0],
                forward_simple: l[1],
                forward_complex: l[2],
                backward: l[3],
                backward_simple: l[4],
                backward_complex: l[5],
            },
        );
        Ok(MergedRecord {
            participation,
            ce: (!ce.is_nan()).then_some(ce),
        })
    }
}

fn table_from_rows(headers: &[String], rows: Vec<Vec<CellValue>>) -> Result<MergedTable> {
    let columns = MergedColumns::locate(headers)?;
    let records = rows
        .iter()
        .enumerate()
        .filter(|(_, r)| r.iter().any(|c| !c.is_empty()))
        .map(|(i, r)| columns.record(r, i))
        .collect::<Result<Vec<_>>>()?;
    let table = MergedTable::from_records(records);
    log::info!(
        "loaded merged table: {} rows, {} countries, {} years",
        table.len(),
        table.countries.len(),
        table.years.len()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// XLSX loader
// ---------------------------------------------------------------------------

fn load_xlsx(path: &Path) -> Result<MergedTable> {
    let mut source = WorkbookSheets::open(path)?;
    let first = source
        .sheet_names()
        .into_iter()
        .next()
        .context("workbook has no sheets")?;
    let grid = source.sheet(&first)?;
    let headers: Vec<String> = grid.headers.iter().map(|h| h.to_string()).collect();
    table_from_rows(&headers, grid.rows)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<MergedTable> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(
            record
                .iter()
                .map(|v| {
                    if v.is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::Text(v.to_string())
                    }
                })
                .collect(),
        );
    }
    table_from_rows(&headers, rows)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

fn load_parquet(path: &Path) -> Result<MergedTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            rows.push(
                (0..batch.num_columns())
                    .map(|c| extract_cell(batch.column(c), row))
                    .collect(),
            );
        }
    }
    table_from_rows(&headers, rows)
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Empty;
    }
    match col.data_type() {
        DataType::Utf8 => match col.as_any().downcast_ref::<StringArray>() {
            Some(s) => CellValue::Text(s.value(row).to_string()),
            None => CellValue::Empty,
        },
        DataType::LargeUtf8 => CellValue::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .map_or(CellValue::Empty, |a| CellValue::Number(a.value(row) as f64)),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .map_or(CellValue::Empty, |a| CellValue::Number(a.value(row) as f64)),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .map_or(CellValue::Empty, |a| CellValue::Number(a.value(row) as f64)),
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .map_or(CellValue::Empty, |a| CellValue::Number(a.value(row))),
        _ => CellValue::Empty,
    }
}
