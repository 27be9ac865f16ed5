use serde::Serialize;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// Weeks up to this ordinal are labelled `KW<n>`; later ones `<n>/<year>`.
const SHORT_LABEL_MAX_WEEK: u32 = 12;

/// Sortable calendar week derived from an irregular ledger label.
///
/// Identity is the ordinal alone: `KW3` and `3/2025` are the same week.
#[derive(Debug, Clone, Serialize)]
pub struct WeekKey {
    ordinal: u32,
    label: String,
}

impl WeekKey {
    /// Builds the key for a known ordinal. Ordinal 0 is not a week.
    pub fn new(ordinal: u32, year: i32) -> Option<Self> {
        if ordinal == 0 {
            return None;
        }

        let label = if ordinal <= SHORT_LABEL_MAX_WEEK {
            format!("KW{ordinal}")
        } else {
            format!("{ordinal}/{year}")
        };

        Some(Self { ordinal, label })
    }

    /// Reads the first run of digits as the ordinal. A `/yyyy` suffix after
    /// it overrides `fallback_year` for the canonical label.
    pub fn from_label(raw: &str, fallback_year: i32) -> Option<Self> {
        let ordinal = leading_ordinal(raw)?;
        let year = label_year(raw).unwrap_or(fallback_year);
        Self::new(ordinal, year)
    }

    pub fn ordinal(&self) -> u32 {
        self.ordinal
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl PartialEq for WeekKey {
    fn eq(&self, other: &Self) -> bool {
        self.ordinal == other.ordinal
    }
}

impl Eq for WeekKey {}

impl Hash for WeekKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ordinal.hash(state);
    }
}

impl PartialOrd for WeekKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WeekKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ordinal.cmp(&other.ordinal)
    }
}

fn leading_ordinal(raw: &str) -> Option<u32> {
    let start = raw.find(|c: char| c.is_ascii_digit())?;
    let digits: String = raw[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

fn label_year(raw: &str) -> Option<i32> {
    let (_, after) = raw.split_once('/')?;
    let digits: String = after
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    if digits.len() == 4 {
        digits.parse().ok()
    } else {
        None
    }
}
