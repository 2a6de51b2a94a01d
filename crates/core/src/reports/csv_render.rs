//! CSV rendering of tabular documents.

use super::error::ReportError;
use super::types::TabularDocument;

/// Renders the header and body rows as RFC 4180 CSV.
///
/// The title is not part of the output.
///
/// # Errors
///
/// Returns `ReportError::Csv` if the writer fails.
pub fn render_csv(document: &TabularDocument) -> Result<Vec<u8>, ReportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&document.headers)?;
    for row in &document.rows {
        writer.write_record(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| ReportError::Csv(e.into_error().into()))
}
