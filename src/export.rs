use std::path::{Path, PathBuf};

use crate::error::{Result, ScopeError};
use crate::record::{Record, Value};

/// One projected column: which field to pull, the header label, and an
/// optional display formatter. Projections are independent of the record
/// shape, so the same collection can be exported with different column
/// sets per view.
#[derive(Clone)]
pub struct Column {
    pub key: String,
    pub label: String,
    pub formatter: Option<fn(&Value) -> String>,
}

impl Column {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            formatter: None,
        }
    }

    pub fn with_formatter(mut self, f: fn(&Value) -> String) -> Self {
        self.formatter = Some(f);
        self
    }

    /// Cell text for one record: formatted if a formatter is set, else the
    /// stringified value. Missing fields come through as empty cells.
    pub fn cell<R: Record>(&self, record: &R) -> String {
        let value = record.field(&self.key);
        match self.formatter {
            Some(f) if !value.is_empty() => f(&value),
            _ => value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    #[cfg(feature = "excel")]
    Excel,
    #[cfg(feature = "pdf")]
    Pdf,
}

impl ExportFormat {
    pub fn parse(s: &str) -> Result<ExportFormat> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            #[cfg(feature = "excel")]
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            #[cfg(feature = "pdf")]
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(ScopeError::Other(format!("unknown export format: {other}"))),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            #[cfg(feature = "excel")]
            ExportFormat::Excel => "xlsx",
            #[cfg(feature = "pdf")]
            ExportFormat::Pdf => "pdf",
        }
    }
}

/// Report-level context printed on titled exports (PDF header, sheet name).
#[derive(Debug, Clone)]
pub struct ReportMeta {
    pub title: String,
    pub company: String,
    pub date_range: String,
}

/// Exactly-once start/complete notifications around an export invocation.
pub trait ExportNotify {
    fn export_started(&mut self) {}
    fn export_completed(&mut self) {}
}

/// No-op notifier for callers that do not care.
pub struct SilentExport;

impl ExportNotify for SilentExport {}

struct CompleteGuard<'a> {
    notify: &'a mut dyn ExportNotify,
}

impl Drop for CompleteGuard<'_> {
    fn drop(&mut self) {
        self.notify.export_completed();
    }
}

/// Serialize one projected collection to the requested format.
pub fn serialize<R: Record>(
    records: &[R],
    columns: &[Column],
    format: ExportFormat,
    meta: &ReportMeta,
) -> Result<Vec<u8>> {
    match format {
        ExportFormat::Csv => to_csv(records, columns),
        #[cfg(feature = "excel")]
        ExportFormat::Excel => to_xlsx(records, columns, meta),
        #[cfg(feature = "pdf")]
        ExportFormat::Pdf => to_pdf(records, columns, meta),
    }
}

/// Serialize and write `<path>`, with start/complete hooks fired exactly
/// once each — completion is released by a drop guard, so it fires even
/// when serialization or the file write errors out.
pub fn run_export<R: Record>(
    records: &[R],
    columns: &[Column],
    format: ExportFormat,
    meta: &ReportMeta,
    path: &Path,
    notify: &mut dyn ExportNotify,
) -> Result<PathBuf> {
    notify.export_started();
    let _guard = CompleteGuard { notify };
    let bytes = serialize(records, columns, format, meta)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    Ok(path.to_path_buf())
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Header row from the projection labels, one row per record. The `csv`
/// writer applies standard quoting: separators, quotes, and line breaks in
/// a cell get the cell quoted and inner quotes doubled.
pub fn to_csv<R: Record>(records: &[R], columns: &[Column]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(columns.iter().map(|c| c.label.as_str()))?;
    for record in records {
        writer.write_record(columns.iter().map(|c| c.cell(record)))?;
    }
    writer
        .into_inner()
        .map_err(|e| ScopeError::Other(format!("csv flush: {e}")))
}

// ---------------------------------------------------------------------------
// Spreadsheet
// ---------------------------------------------------------------------------

/// Same row/column model as CSV, but with typed cells: numeric values are
/// written as numbers (not pre-formatted strings) so downstream sheet math
/// keeps working; text goes through the column formatter.
#[cfg(feature = "excel")]
pub fn to_xlsx<R: Record>(records: &[R], columns: &[Column], meta: &ReportMeta) -> Result<Vec<u8>> {
    use rust_xlsxwriter::{Format, Workbook};

    let xlsx = |e: rust_xlsxwriter::XlsxError| ScopeError::Xlsx(e.to_string());

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    // Sheet names are capped at 31 characters.
    let sheet_name: String = meta.title.chars().take(31).collect();
    sheet.set_name(sheet_name).map_err(xlsx)?;

    let bold = Format::new().set_bold();
    for (c, col) in columns.iter().enumerate() {
        sheet
            .write_string_with_format(0, c as u16, &col.label, &bold)
            .map_err(xlsx)?;
    }
    for (r, record) in records.iter().enumerate() {
        let row = (r + 1) as u32;
        for (c, col) in columns.iter().enumerate() {
            match record.field(&col.key) {
                Value::Number(n) => {
                    sheet.write_number(row, c as u16, n).map_err(xlsx)?;
                }
                Value::Text(_) => {
                    sheet
                        .write_string(row, c as u16, col.cell(record))
                        .map_err(xlsx)?;
                }
                Value::Empty => {}
            }
        }
    }
    workbook.save_to_buffer().map_err(xlsx)
}

// ---------------------------------------------------------------------------
// PDF
// ---------------------------------------------------------------------------

/// Titled tabular page in projection order; numeric columns right-aligned.
#[cfg(feature = "pdf")]
pub fn to_pdf<R: Record>(records: &[R], columns: &[Column], meta: &ReportMeta) -> Result<Vec<u8>> {
    let headers: Vec<String> = columns.iter().map(|c| c.label.clone()).collect();
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| columns.iter().map(|c| c.cell(r)).collect())
        .collect();
    let numeric = numeric_columns(records, columns);
    crate::pdf::render_table(meta, &headers, &rows, &numeric)
}

/// A column renders right-aligned when its first non-empty value is numeric.
#[cfg(feature = "pdf")]
fn numeric_columns<R: Record>(records: &[R], columns: &[Column]) -> Vec<bool> {
    columns
        .iter()
        .map(|col| {
            records
                .iter()
                .map(|r| r.field(&col.key))
                .find(|v| !v.is_empty())
                .map(|v| v.as_number().is_some())
                .unwrap_or(false)
        })
        .collect()
}
