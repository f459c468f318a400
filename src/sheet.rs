use std::collections::BTreeMap;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Raw spreadsheet rows
// ---------------------------------------------------------------------------

/// Every recognized sheet header, in schema order. Values are stored verbatim
/// as text; nothing at this layer assumes a value is numeric or even present.
pub const COLUMNS: &[&str] = &[
    "Count",
    "Date",
    "Client Name",
    "Phone",
    "Email",
    "Address",
    "State",
    "Technician",
    "Status",
    "LP",
    "Parts Sold",
    "Cash",
    "Check/Zelle",
    "CC",
    "CC after fee",
    "Thumbtack",
    "Sales",
    "Company Parts",
    "Tech Parts",
    "Sales tax",
    "CC fee",
    "Total Costs",
    "Tips to Technician",
    "Gross Profit",
    "Payout Rate",
    "Technician Payout",
    "Company Profit",
    "Balance",
    "job comission to other",
    "Warranty",
    "Service Call Fee",
    "Notes",
];

/// The six payment-method columns summed during revenue reconciliation.
pub const PAYMENT_FIELDS: &[&str] = &[
    "Cash",
    "Check/Zelle",
    "CC",
    "CC after fee",
    "Thumbtack",
    "CC fee",
];

/// One row of the jobs sheet: a label-to-text mapping plus the local row id.
/// Absent and blank fields are equivalent as far as consumers are concerned.
#[derive(Debug, Clone, Default)]
pub struct RawJob {
    pub id: i64,
    pub values: BTreeMap<String, String>,
}

impl RawJob {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            self.values.remove(name);
        } else {
            self.values.insert(name.to_string(), value);
        }
    }

    pub fn amount(&self, name: &str) -> f64 {
        coerce_amount(self.field(name))
    }

    pub fn date(&self) -> Option<NaiveDate> {
        parse_sheet_date(self.field("Date"))
    }
}

// ---------------------------------------------------------------------------
// Permissive parsing
// ---------------------------------------------------------------------------

/// Coerce an arbitrary sheet value to a finite amount. Strips everything that
/// is not a digit, `.`, or `-`, then parses; malformed leftovers and blanks
/// come back as 0 rather than an error. `-` survives the strip, so refunds
/// and credits stay negative.
pub fn coerce_amount(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return 0.0;
    }
    cleaned.parse::<f64>().unwrap_or(0.0)
}

/// Split the comma-delimited technician column into trimmed names.
pub fn split_technicians(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}

/// Best-effort date parse for sheet values: ISO (with or without a trailing
/// time), then US m/d/y with two- or four-digit years. Anything else is None.
pub fn parse_sheet_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Some(prefix) = raw.get(..10) {
        if let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
            return Some(date);
        }
    }
    let parts: Vec<&str> = raw.split('/').collect();
    if parts.len() == 3 {
        let m: u32 = parts[0].trim().parse().ok()?;
        let d: u32 = parts[1].trim().parse().ok()?;
        let y: i32 = parts[2].trim().parse().ok()?;
        let y = if y < 100 { y + 2000 } else { y };
        return NaiveDate::from_ymd_opt(y, m, d);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_amount_basic() {
        assert_eq!(coerce_amount("1234.56"), 1234.56);
        assert_eq!(coerce_amount("$1,234.56"), 1234.56);
        assert_eq!(coerce_amount("  $500 "), 500.0);
        assert_eq!(coerce_amount("-42"), -42.0);
        assert_eq!(coerce_amount("($250.00)"), 250.0);
    }

    #[test]
    fn test_coerce_amount_is_total() {
        // Never panics, always finite, garbage goes to zero.
        for input in ["", "abc", "NaN", "-", ".", "--5", "1.2.3", "12-34", "$", "N/A", "TBD"] {
            let out = coerce_amount(input);
            assert!(out.is_finite(), "non-finite for {input:?}");
        }
        assert_eq!(coerce_amount(""), 0.0);
        assert_eq!(coerce_amount("abc"), 0.0);
        assert_eq!(coerce_amount("1.2.3"), 0.0);
        assert_eq!(coerce_amount("--5"), 0.0);
    }

    #[test]
    fn test_coerce_amount_idempotent() {
        for input in ["$1,234.56", "-42", "abc", "", "750", "0.5"] {
            let once = coerce_amount(input);
            let twice = coerce_amount(&once.to_string());
            assert_eq!(once, twice, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_coerce_preserves_negatives() {
        assert_eq!(coerce_amount("-$150.25"), -150.25);
        assert_eq!(coerce_amount("refund: -75"), -75.0);
    }

    #[test]
    fn test_split_technicians() {
        assert_eq!(split_technicians("Dan, Ben"), vec!["Dan", "Ben"]);
        assert_eq!(split_technicians("  Avi  "), vec!["Avi"]);
        assert_eq!(split_technicians("Dan,,Ben,"), vec!["Dan", "Ben"]);
        assert!(split_technicians("").is_empty());
        assert!(split_technicians(" , ,").is_empty());
    }

    #[test]
    fn test_parse_sheet_date() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(parse_sheet_date("2024-03-05"), Some(d));
        assert_eq!(parse_sheet_date("2024-03-05T14:30:00Z"), Some(d));
        assert_eq!(parse_sheet_date("3/5/2024"), Some(d));
        assert_eq!(parse_sheet_date("03/05/24"), Some(d));
        assert_eq!(parse_sheet_date("soon"), None);
        assert_eq!(parse_sheet_date(""), None);
        assert_eq!(parse_sheet_date("13/45/2024"), None);
    }

    #[test]
    fn test_raw_job_fields_default_blank() {
        let mut job = RawJob::new();
        assert_eq!(job.field("Sales"), "");
        assert_eq!(job.amount("Sales"), 0.0);
        job.set("Sales", "$900");
        assert_eq!(job.amount("Sales"), 900.0);
        job.set("Sales", "");
        assert_eq!(job.field("Sales"), "");
    }
}
