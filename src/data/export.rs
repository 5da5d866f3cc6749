use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rust_xlsxwriter::Workbook;

use super::error::PipelineError;
use super::model::{MergedTable, Metric, KEY_COLUMNS};

/// Sheet name used for the merged table.
pub const SHEET_NAME: &str = "Sheet1";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Write the merged table to `path`. Dispatch by extension.
///
/// * `.xlsx`    – one sheet, header row, blank cell for null `CE`
/// * `.csv`     – header row, empty field for null `CE`
/// * `.parquet` – `year: Int32`, keys `Utf8`, metrics nullable `Float64`
///
/// The parent directory must exist; an unwritable destination is an error.
pub fn export_file(table: &MergedTable, path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let written = match ext.as_str() {
        "xlsx" => export_xlsx(table, path),
        "csv" => export_csv(table, path),
        "parquet" | "pq" => export_parquet(table, path),
        other => Err(PipelineError::UnsupportedExtension(other.to_string()).into()),
    };
    written.with_context(|| format!("writing merged table to {}", path.display()))?;

    log::info!("exported {} rows to {}", table.len(), path.display());
    Ok(())
}

/// Header row shared by all formats.
pub fn header() -> Vec<&'static str> {
    KEY_COLUMNS
        .iter()
        .copied()
        .chain(Metric::COLUMNS.iter().map(|m| m.column()))
        .collect()
}

// ---------------------------------------------------------------------------
// XLSX
// ---------------------------------------------------------------------------

fn export_xlsx(table: &MergedTable, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, name) in header().into_iter().enumerate() {
        sheet.write_string(0, col as u16, name)?;
    }

    for (i, rec) in table.records.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet.write_number(row, 0, rec.year() as f64)?;
        sheet.write_string(row, 1, rec.country())?;
        sheet.write_string(row, 2, rec.industry())?;
        for (j, metric) in Metric::COLUMNS.iter().enumerate() {
            // NaN and null stay blank.
            if let Some(v) = rec.metric(*metric).filter(|v| v.is_finite()) {
                sheet.write_number(row, (KEY_COLUMNS.len() + j) as u16, v)?;
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

fn export_csv(table: &MergedTable, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(header())?;

    for rec in &table.records {
        let mut fields = vec![
            rec.year().to_string(),
            rec.country().to_string(),
            rec.industry().to_string(),
        ];
        fields.extend(Metric::COLUMNS.iter().map(|m| {
            rec.metric(*m)
                .filter(|v| v.is_finite())
                .map(|v| v.to_string())
                .unwrap_or_default()
        }));
        writer.write_record(&fields)?;
    }
    writer.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

fn export_parquet(table: &MergedTable, path: &Path) -> Result<()> {
    let mut fields = vec![
        Field::new("year", DataType::Int32, false),
        Field::new("country", DataType::Utf8, false),
        Field::new("industry", DataType::Utf8, false),
    ];
    fields.extend(
        Metric::COLUMNS
            .iter()
            .map(|m| Field::new(m.column(), DataType::Float64, true)),
    );
    let schema = Arc::new(Schema::new(fields));

    let records = &table.records;
    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(Int32Array::from_iter_values(records.iter().map(|r| r.year()))),
        Arc::new(StringArray::from_iter_values(records.iter().map(|r| r.country()))),
        Arc::new(StringArray::from_iter_values(records.iter().map(|r| r.industry()))),
    ];
    for metric in Metric::COLUMNS {
        let values: Float64Array = records.iter().map(|r| r.metric(metric)).collect();
        columns.push(Arc::new(values));
    }

    let batch = RecordBatch::try_new(schema.clone(), columns)?;
    let file = std::fs::File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}
