use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Reader, Sheets};

// ---------------------------------------------------------------------------
// CellValue – a single spreadsheet cell
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
}

/// Stand-in for cells outside a row.
pub static EMPTY_CELL: CellValue = CellValue::Empty;

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(v) => write!(f, "{v}"),
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl CellValue {
    /// Numeric content; text holding a number counts, blank does not.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) => Some(*v),
            CellValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Read a header cell as a year label: all-digit text (`"2003"`) or an
    /// integral number (`2003.0`).
    pub fn as_year(&self) -> Option<i32> {
        match self {
            CellValue::Text(s) => {
                let s = s.trim();
                if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
                    s.parse().ok()
                } else {
                    None
                }
            }
            CellValue::Number(v) if v.fract() == 0.0 && *v >= 0.0 && *v <= i32::MAX as f64 => {
                Some(*v as i32)
            }
            _ => None,
        }
    }
}

impl From<&Data> for CellValue {
    fn from(d: &Data) -> Self {
        match d {
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Float(f) => CellValue::Number(*f),
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
            Data::Error(_) | Data::Empty => CellValue::Empty,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Number(v)
    }
}

// ---------------------------------------------------------------------------
// SheetGrid – one sheet, header row split off
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetGrid {
    pub name: String,
    pub headers: Vec<CellValue>,
    pub rows: Vec<Vec<CellValue>>,
}

impl SheetGrid {
    /// Split a raw cell grid into header row and body rows.
    pub fn from_cells(name: impl Into<String>, mut cells: Vec<Vec<CellValue>>) -> Self {
        let headers = if cells.is_empty() {
            Vec::new()
        } else {
            cells.remove(0)
        };
        SheetGrid {
            name: name.into(),
            headers,
            rows: cells,
        }
    }

    /// Cell at (`row`, `col`) of the body; out-of-range reads as empty.
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Position of the header matching the earliest entry of `names`; the
    /// order of `names` is the priority order.
    pub fn find_column(&self, names: &[String]) -> Option<usize> {
        names.iter().find_map(|n| {
            self.headers.iter().position(|h| match h {
                CellValue::Text(t) => t.trim() == n,
                _ => false,
            })
        })
    }

    /// Body rows with at least one non-empty cell.
    pub fn non_blank_rows(&self) -> impl Iterator<Item = (usize, &Vec<CellValue>)> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, r)| r.iter().any(|c| !c.is_empty()))
    }
}

// ---------------------------------------------------------------------------
// SheetSource – anything that yields named sheets
// ---------------------------------------------------------------------------

pub trait SheetSource {
    fn sheet_names(&self) -> Vec<String>;

    fn sheet(&mut self, name: &str) -> Result<SheetGrid>;
}

/// Spreadsheet workbook on disk (`.xlsx`, `.xlsm`, `.xls`, `.ods`).
pub struct WorkbookSheets {
    workbook: Sheets<BufReader<File>>,
}

impl WorkbookSheets {
    pub fn open(path: &Path) -> Result<Self> {
        let workbook = open_workbook_auto(path)
            .with_context(|| format!("opening workbook {}", path.display()))?;
        Ok(Self { workbook })
    }
}

impl SheetSource for WorkbookSheets {
    fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names()
    }

    fn sheet(&mut self, name: &str) -> Result<SheetGrid> {
        let range = self
            .workbook
            .worksheet_range(name)
            .with_context(|| format!("reading sheet '{name}'"))?;
        let cells = range
            .rows()
            .map(|row| row.iter().map(CellValue::from).collect())
            .collect();
        Ok(SheetGrid::from_cells(name, cells))
    }
}

/// In-memory sheets, keyed by name, in insertion-independent order.
#[derive(Debug, Clone, Default)]
pub struct MemorySheets {
    sheets: BTreeMap<String, SheetGrid>,
}

impl MemorySheets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, sheet: SheetGrid) {
        self.sheets.insert(sheet.name.clone(), sheet);
    }
}

impl SheetSource for MemorySheets {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.keys().cloned().collect()
    }

    fn sheet(&mut self, name: &str) -> Result<SheetGrid> {
        self.sheets
            .get(name)
            .cloned()
            .with_context(|| format!("no sheet named '{name}'"))
    }
}
