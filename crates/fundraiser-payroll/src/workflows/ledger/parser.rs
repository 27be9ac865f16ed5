use super::domain::RawLedgerRow;
use super::LedgerImportError;
use csv::StringRecord;
use std::io::Read;

pub(crate) const FUNDRAISER_ID: &str = "Fundraiser ID";
pub(crate) const FUNDRAISER_NAME: &str = "Fundraiser Name";
pub(crate) const CALENDAR_WEEK: &str = "Calendar week";
pub(crate) const BILLING_GROUP: &str = "Billing group";
pub(crate) const REFERENCE_ID: &str = "Public RefID";
pub(crate) const AGE: &str = "Age";
pub(crate) const INTERVAL: &str = "Interval";
pub(crate) const AMOUNT_YEARLY: &str = "Amount Yearly";
pub(crate) const STATUS: &str = "status_agency";

/// The export tool writes a title line and a blank line before the header.
const MAX_PREAMBLE_LINES: usize = 2;

struct ColumnIndex {
    fundraiser_id: usize,
    fundraiser_name: usize,
    week_label: usize,
    billing_group: Option<usize>,
    reference_id: usize,
    age: usize,
    interval: usize,
    yearly_amount: usize,
    status: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Result<Self, LedgerImportError> {
        let find = |name: &'static str| {
            headers
                .iter()
                .position(|header| header.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &'static str| find(name).ok_or(LedgerImportError::MissingColumn(name));

        Ok(Self {
            fundraiser_id: require(FUNDRAISER_ID)?,
            fundraiser_name: require(FUNDRAISER_NAME)?,
            week_label: require(CALENDAR_WEEK)?,
            billing_group: find(BILLING_GROUP),
            reference_id: require(REFERENCE_ID)?,
            age: require(AGE)?,
            interval: require(INTERVAL)?,
            yearly_amount: require(AMOUNT_YEARLY)?,
            status: require(STATUS)?,
        })
    }
}

pub(crate) fn parse_rows<R: Read>(mut reader: R) -> Result<Vec<RawLedgerRow>, LedgerImportError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let text = decode(&bytes);

    let (skipped_lines, body) = strip_preamble(&text)?;

    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let columns = ColumnIndex::from_headers(csv_reader.headers()?)?;
    let mut rows = Vec::new();

    for record in csv_reader.records() {
        let record = record?;
        let line = skipped_lines + record.position().map_or(0, |position| position.line() as usize);
        let cell = |index: usize| {
            record
                .get(index)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        rows.push(RawLedgerRow {
            line,
            fundraiser_id: cell(columns.fundraiser_id),
            fundraiser_name: cell(columns.fundraiser_name),
            week_label: cell(columns.week_label),
            billing_group: columns.billing_group.and_then(cell),
            reference_id: cell(columns.reference_id),
            age: cell(columns.age),
            interval: cell(columns.interval),
            yearly_amount: cell(columns.yearly_amount),
            status: cell(columns.status),
        });
    }

    Ok(rows)
}

/// UTF-8 (BOM stripped) when possible, Latin-1 otherwise.
fn decode(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&byte| byte as char).collect(),
    }
}

/// Returns how many lines precede the header row and the text starting at it.
fn strip_preamble(text: &str) -> Result<(usize, &str), LedgerImportError> {
    let mut offset = 0;
    for skipped in 0..=MAX_PREAMBLE_LINES {
        let rest = &text[offset..];
        let line_end = rest.find('\n').map_or(rest.len(), |index| index + 1);
        if is_header_line(&rest[..line_end]) {
            return Ok((skipped, rest));
        }
        if line_end == 0 {
            break;
        }
        offset += line_end;
    }

    Err(LedgerImportError::MissingColumn(REFERENCE_ID))
}

fn is_header_line(line: &str) -> bool {
    line.split(';')
        .any(|field| field.trim().eq_ignore_ascii_case(REFERENCE_ID))
}

#[cfg(test)]
pub(crate) fn decode_for_tests(bytes: &[u8]) -> String {
    decode(bytes)
}
