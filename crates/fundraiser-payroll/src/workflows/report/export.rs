use super::assembler::AssembledReport;
use super::format::NumberFormat;
use super::rows::COLUMNS;
use chrono::NaiveDate;
use std::io::Write;
use std::path::Path;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const TITLE_PREFIX: &str = "WoVi_CW_Formatted_";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write formatted ledger: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode formatted ledger: {0}")]
    Csv(#[from] csv::Error),
}

/// Writes the formatted ledger: title line, blank line, header, then every row.
pub fn write_csv<W: Write>(
    mut writer: W,
    report: &AssembledReport,
    format: &NumberFormat,
    generated_on: NaiveDate,
) -> Result<(), ExportError> {
    writer.write_all(UTF8_BOM)?;

    let mut csv = csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(false)
        .from_writer(writer);

    let mut title: [String; 10] = Default::default();
    title[0] = format!("{TITLE_PREFIX}{}", generated_on.format("%Y-%m-%d"));
    csv.write_record(&title)?;
    csv.write_record(std::iter::repeat("").take(COLUMNS.len()))?;
    csv.write_record(COLUMNS)?;

    for row in &report.rows {
        csv.write_record(row.columns(format))?;
    }

    csv.flush()?;
    Ok(())
}

pub fn write_csv_to_path<P: AsRef<Path>>(
    path: P,
    report: &AssembledReport,
    format: &NumberFormat,
    generated_on: NaiveDate,
) -> Result<(), ExportError> {
    let file = std::fs::File::create(path)?;
    write_csv(std::io::BufWriter::new(file), report, format, generated_on)
}
