use thiserror::Error;

/// Schema failures raised while reading or reshaping source tables.
///
/// Functions in the data layer return `anyhow::Result`; these values travel
/// inside the `anyhow::Error` and can be recovered with `downcast_ref`.
#[derive(Debug, Error, PartialEq)]
pub enum PipelineError {
    #[error("{source_name}: missing required column '{column}'")]
    MissingColumn { source_name: String, column: String },

    #[error("sheet '{sheet}' has no year columns")]
    NoYearColumns { sheet: String },

    #[error("sheet '{sheet}' has {found} industry rows, expected {expected}")]
    IndustryRows {
        sheet: String,
        found: usize,
        expected: usize,
    },

    #[error("{source_name} row {row}, column '{column}': '{value}' is not a number")]
    NotNumeric {
        source_name: String,
        row: usize,
        column: String,
        value: String,
    },

    #[error("duplicate key (year {year}, country {country}, industry {industry}) in {table}")]
    DuplicateKey {
        table: String,
        year: i32,
        country: String,
        industry: String,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("feature {index}: {reason}")]
    InvalidGeometry { index: usize, reason: String },
}
