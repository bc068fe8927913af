//! Data loading for the labeled incident table.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::Context;
use scamscope_core::{ScamLabel, ScamScopeError, TrainingRecord};
use tracing::{debug, info};

pub const SUMMARY_COLUMN: &str = "Summary";
pub const AMOUNT_COLUMN: &str = "Amount Lost";
pub const SCAM_TYPE_COLUMN: &str = "Scam Type";
pub const STATE_COLUMN: &str = "State";
pub const TARGET_COLUMN: &str = "Scam_NonScam";

/// Cell contents treated as missing, in addition to the empty string.
const NA_VALUES: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Normalizes a possibly formatted loss amount.
///
/// Every character that is not an ASCII digit is dropped and the rest is
/// parsed; absent or digit-free input becomes `0`. The result is never
/// negative.
///
/// ```
/// use scamscope_trainer::data::normalize_amount;
///
/// assert_eq!(normalize_amount(Some("$20,000")), 20000.0);
/// assert_eq!(normalize_amount(Some("unknown")), 0.0);
/// assert_eq!(normalize_amount(None), 0.0);
/// ```
pub fn normalize_amount(raw: Option<&str>) -> f64 {
    let digits: String = raw
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_digit)
        .collect();
    digits.parse::<f64>().unwrap_or(0.0)
}

/// The cell as written, unless it is empty or a missing-value marker.
/// Markers match after trimming; kept values are not trimmed.
fn cell(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty() && !NA_VALUES.contains(&v.trim()))
}

fn column_index(headers: &csv::StringRecord, name: &str) -> anyhow::Result<usize> {
    headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
        .ok_or_else(|| {
            ScamScopeError::MissingColumn {
                column: name.to_string(),
            }
            .into()
        })
}

/// Reads labeled incidents from CSV.
///
/// Rows without a summary are skipped here already, so their other cells
/// are never validated.
///
/// # Errors
///
/// Fails on malformed CSV, a missing required column, or an
/// uninterpretable target cell on a row that has a summary.
pub fn read_records<R: Read>(reader: R) -> anyhow::Result<Vec<TrainingRecord>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = reader.headers().context("failed to read CSV header")?.clone();

    let summary_idx = column_index(&headers, SUMMARY_COLUMN)?;
    let amount_idx = column_index(&headers, AMOUNT_COLUMN)?;
    let scam_type_idx = column_index(&headers, SCAM_TYPE_COLUMN)?;
    let state_idx = column_index(&headers, STATE_COLUMN)?;
    let target_idx = column_index(&headers, TARGET_COLUMN)?;

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (i, row) in reader.records().enumerate() {
        let row = row.with_context(|| format!("malformed CSV row {}", i + 1))?;

        let Some(summary) = cell(row.get(summary_idx)) else {
            skipped += 1;
            continue;
        };

        let raw_label = row.get(target_idx).unwrap_or_default();
        let label = ScamLabel::parse(raw_label).ok_or_else(|| ScamScopeError::InvalidLabel {
            row: i + 1,
            value: raw_label.to_string(),
        })?;

        records.push(TrainingRecord {
            summary: Some(summary.to_string()),
            amount_lost: normalize_amount(cell(row.get(amount_idx))),
            scam_type: cell(row.get(scam_type_idx)).map(str::to_string),
            state: cell(row.get(state_idx)).map(str::to_string),
            label,
        });
    }

    debug!(skipped, "rows without a summary dropped");
    info!(records = records.len(), "dataset loaded");
    Ok(records)
}

/// Load the labeled dataset from a CSV file.
pub fn load_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<TrainingRecord>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    read_records(file).with_context(|| format!("failed to load dataset {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Case ID,Summary,Amount Lost,Scam Type,State,Scam_NonScam\n";

    #[test]
    fn test_normalize_amount() {
        assert_eq!(normalize_amount(Some("$20,000")), 20000.0);
        assert_eq!(normalize_amount(Some("RM 1,500")), 1500.0);
        assert_eq!(normalize_amount(Some("20000")), 20000.0);
        assert_eq!(normalize_amount(Some("-350")), 350.0);
        assert_eq!(normalize_amount(Some("abc")), 0.0);
        assert_eq!(normalize_amount(Some("")), 0.0);
        assert_eq!(normalize_amount(None), 0.0);
    }

    #[test]
    fn test_normalize_amount_drops_decimal_point() {
        assert_eq!(normalize_amount(Some("1,234.50")), 123450.0);
    }

    #[test]
    fn test_read_records() {
        let csv = format!(
            "{HEADER}\
             1,Fake investment scheme,\"$20,000\",Investment Scam,Selangor,1\n\
             2,Refund received,,,,0\n\
             3,,500,Phishing,Johor,1\n\
             4,Parcel scam,abc,NaN,Johor,Scam\n"
        );
        let records = read_records(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);

        assert_eq!(records[0].summary.as_deref(), Some("Fake investment scheme"));
        assert_eq!(records[0].amount_lost, 20000.0);
        assert_eq!(records[0].scam_type.as_deref(), Some("Investment Scam"));
        assert_eq!(records[0].state.as_deref(), Some("Selangor"));
        assert_eq!(records[0].label, ScamLabel::Scam);

        assert_eq!(records[1].amount_lost, 0.0);
        assert_eq!(records[1].scam_type, None);
        assert_eq!(records[1].state, None);
        assert_eq!(records[1].label, ScamLabel::NonScam);

        assert_eq!(records[2].amount_lost, 0.0);
        assert_eq!(records[2].scam_type, None);
        assert_eq!(records[2].label, ScamLabel::Scam);
    }

    #[test]
    fn test_cells_keep_surrounding_whitespace() {
        let csv = format!(
            "{HEADER}             1,   ,100,Phishing ,Selangor ,1
             2,Refund received, NaN , n/a ,Johor,0
"
        );
        let records = read_records(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].summary.as_deref(), Some("   "));
        assert_eq!(records[0].scam_type.as_deref(), Some("Phishing "));
        assert_eq!(records[0].state.as_deref(), Some("Selangor "));

        assert_eq!(records[1].amount_lost, 0.0);
        assert_eq!(records[1].scam_type, None);
        assert_eq!(records[1].state.as_deref(), Some("Johor"));
    }

    #[test]
    fn test_missing_column() {
        let csv = "Summary,Amount Lost,Scam Type,Scam_NonScam\nhello,1,x,1\n";
        let err = read_records(csv.as_bytes()).unwrap_err();
        match err.downcast_ref::<ScamScopeError>() {
            Some(ScamScopeError::MissingColumn { column }) => assert_eq!(column, STATE_COLUMN),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_header_with_bom_and_padding() {
        let csv = "\u{feff}Summary , Amount Lost,Scam Type,State,Scam_NonScam\nhello,1,x,y,0\n";
        let records = read_records(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_invalid_label() {
        let csv = format!("{HEADER}1,text,1,x,y,maybe\n");
        let err = read_records(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScamScopeError>(),
            Some(ScamScopeError::InvalidLabel { row: 1, .. })
        ));
    }

    #[test]
    fn test_label_not_checked_on_skipped_rows() {
        let csv = format!("{HEADER}1,,1,x,y,garbage\n2,text,1,x,y,0\n");
        let records = read_records(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
    }
}
