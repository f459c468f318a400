use std::path::Path;

use chrono::NaiveDate;
use rusqlite::Connection;
use sha2::{Digest, Sha256};

use crate::error::{CrmError, Result};
use crate::jobs;
use crate::sheet::{parse_sheet_date, RawJob, COLUMNS};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Header names older sheet exports used before the columns were renamed.
const LEGACY_ALIASES: &[(&str, &str)] = &[
    ("Customer", "Client Name"),
    ("Amount", "Sales"),
    ("Tech", "Technician"),
    ("Source", "LP"),
];

fn canonical_header(raw: &str) -> Option<&'static str> {
    let trimmed = raw.trim();
    COLUMNS
        .iter()
        .find(|c| c.eq_ignore_ascii_case(trimmed))
        .copied()
}

fn legacy_header(raw: &str) -> Option<&'static str> {
    let trimmed = raw.trim();
    LEGACY_ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(trimmed))
        .map(|(_, canonical)| *canonical)
        .or_else(|| canonical_header(raw))
}

/// Map a raw header row to canonical column names. Headers that match
/// nothing are collected so the caller can report them.
fn map_headers(raw: &[String], legacy: bool) -> (Vec<Option<&'static str>>, Vec<String>) {
    let mut mapped = Vec::with_capacity(raw.len());
    let mut unknown = Vec::new();
    for header in raw {
        let canonical = if legacy {
            legacy_header(header)
        } else {
            canonical_header(header)
        };
        if canonical.is_none() && !header.trim().is_empty() {
            unknown.push(header.trim().to_string());
        }
        mapped.push(canonical);
    }
    (mapped, unknown)
}

#[cfg(any(feature = "excel", test))]
pub fn excel_serial_to_date(serial: f64) -> String {
    // Day 0 of the serial scheme is 1899-12-30 once the 1900 leap bug is
    // accounted for
    let base = chrono::NaiveDate::from_ymd_opt(1899, 12, 30).unwrap();
    let date = base + chrono::Duration::days(serial as i64);
    date.format("%Y-%m-%d").to_string()
}

fn compute_checksum(file_path: &Path) -> Result<String> {
    let data = std::fs::read(file_path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

fn is_duplicate_row(conn: &Connection, job: &RawJob) -> Result<bool> {
    let mut stmt = conn.prepare_cached(
        r#"SELECT 1 FROM all_jobs WHERE trim("Count") = trim(?1) AND trim("Date") = trim(?2) AND trim("Client Name") = trim(?3)"#,
    )?;
    Ok(stmt.exists(rusqlite::params![
        job.field("Count"),
        job.field("Date"),
        job.field("Client Name")
    ])?)
}

// ---------------------------------------------------------------------------
// Importer kinds, enum dispatch instead of trait objects
// ---------------------------------------------------------------------------

/// One parsed spreadsheet: rows keyed by canonical column name, values kept
/// exactly as the file had them, plus the headers nothing matched.
pub struct ParsedSheet {
    pub rows: Vec<RawJob>,
    pub unknown_headers: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImporterKind {
    JobSheet,
    LegacyJobSheet,
    #[cfg(feature = "excel")]
    Excel,
}

impl ImporterKind {
    pub fn key(&self) -> &'static str {
        match self {
            Self::JobSheet => "sheet",
            Self::LegacyJobSheet => "legacy",
            #[cfg(feature = "excel")]
            Self::Excel => "excel",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::JobSheet => "Job sheet CSV",
            Self::LegacyJobSheet => "Legacy job sheet CSV",
            #[cfg(feature = "excel")]
            Self::Excel => "Excel workbook",
        }
    }

    pub fn detect(&self, file_path: &Path) -> bool {
        match self {
            Self::JobSheet => detect_job_sheet(file_path),
            Self::LegacyJobSheet => detect_legacy_job_sheet(file_path),
            #[cfg(feature = "excel")]
            Self::Excel => detect_excel(file_path),
        }
    }

    pub fn parse(&self, file_path: &Path) -> Result<ParsedSheet> {
        match self {
            Self::JobSheet => parse_csv_sheet(file_path, false),
            Self::LegacyJobSheet => parse_csv_sheet(file_path, true),
            #[cfg(feature = "excel")]
            Self::Excel => parse_excel(file_path),
        }
    }
}

pub const ALL_IMPORTERS: &[ImporterKind] = &[
    ImporterKind::JobSheet,
    ImporterKind::LegacyJobSheet,
    #[cfg(feature = "excel")]
    ImporterKind::Excel,
];

pub fn get_by_key(key: &str) -> Option<ImporterKind> {
    ALL_IMPORTERS.iter().find(|i| i.key() == key).copied()
}

pub fn get_for_file(file_path: &Path) -> Option<ImporterKind> {
    for imp in ALL_IMPORTERS {
        if imp.detect(file_path) {
            return Some(*imp);
        }
    }
    // Undetected CSVs still go through the canonical parser
    let is_csv = file_path
        .extension()
        .map_or(false, |e| e.eq_ignore_ascii_case("csv"));
    is_csv.then_some(ImporterKind::JobSheet)
}

// ---------------------------------------------------------------------------
// import_file
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ImportResult {
    pub imported: usize,
    pub skipped: usize,
    pub duplicate_file: bool,
    pub unknown_headers: Vec<String>,
    pub date_start: Option<String>,
    pub date_end: Option<String>,
}

pub fn import_file(
    conn: &Connection,
    file_path: &Path,
    format_key: Option<&str>,
    force: bool,
) -> Result<ImportResult> {
    let checksum = compute_checksum(file_path)?;
    if !force {
        let mut stmt = conn.prepare("SELECT 1 FROM imports WHERE checksum = ?1")?;
        if stmt.exists([&checksum])? {
            return Ok(ImportResult {
                imported: 0,
                skipped: 0,
                duplicate_file: true,
                unknown_headers: Vec::new(),
                date_start: None,
                date_end: None,
            });
        }
    }

    let importer = if let Some(key) = format_key {
        get_by_key(key).ok_or_else(|| CrmError::UnknownFormat(key.to_string()))?
    } else {
        get_for_file(file_path).ok_or_else(|| {
            let ext = file_path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("file");
            CrmError::UnknownFormat(ext.to_string())
        })?
    };

    let parsed = importer.parse(file_path)?;

    let mut imported = 0usize;
    let mut skipped = 0usize;
    for job in &parsed.rows {
        if is_duplicate_row(conn, job)? {
            skipped += 1;
            continue;
        }
        jobs::insert_row(conn, job)?;
        imported += 1;
    }

    let mut dates: Vec<NaiveDate> = parsed
        .rows
        .iter()
        .filter_map(|job| parse_sheet_date(job.field("Date")))
        .collect();
    dates.sort();
    let date_start = dates.first().map(|d| d.format("%Y-%m-%d").to_string());
    let date_end = dates.last().map(|d| d.format("%Y-%m-%d").to_string());

    conn.execute(
        "INSERT INTO imports (filename, record_count, date_range_start, date_range_end, checksum) VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            file_path.file_name().and_then(|n| n.to_str()).unwrap_or(""),
            parsed.rows.len() as i64,
            date_start,
            date_end,
            checksum,
        ],
    )?;

    Ok(ImportResult {
        imported,
        skipped,
        duplicate_file: false,
        unknown_headers: parsed.unknown_headers,
        date_start,
        date_end,
    })
}

// ---------------------------------------------------------------------------
// Job sheet CSV parser
// ---------------------------------------------------------------------------

fn detect_job_sheet(file_path: &Path) -> bool {
    let Ok(file) = std::fs::File::open(file_path) else {
        return false;
    };
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));
    for result in rdr.records() {
        let Ok(record) = result else { continue };
        let has = |name: &str| record.iter().any(|h| h.trim().eq_ignore_ascii_case(name));
        if has("Count") && has("Client Name") {
            return true;
        }
    }
    false
}

fn detect_legacy_job_sheet(file_path: &Path) -> bool {
    let Ok(file) = std::fs::File::open(file_path) else {
        return false;
    };
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));
    for result in rdr.records() {
        let Ok(record) = result else { continue };
        let has = |name: &str| record.iter().any(|h| h.trim().eq_ignore_ascii_case(name));
        if has("Customer") && (has("Amount") || has("Tech") || has("Source")) {
            return true;
        }
    }
    false
}

fn parse_csv_sheet(file_path: &Path, legacy: bool) -> Result<ParsedSheet> {
    let file = std::fs::File::open(file_path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));
    let mut rows = Vec::new();
    let mut mapped: Vec<Option<&'static str>> = Vec::new();
    let mut unknown = Vec::new();
    let mut found_header = false;

    for result in rdr.records() {
        let Ok(record) = result else { continue };
        if !found_header {
            // The header is the first line naming at least one known column;
            // anything above it is export preamble
            let is_header = record.iter().any(|field| {
                if legacy {
                    legacy_header(field).is_some()
                } else {
                    canonical_header(field).is_some()
                }
            });
            if is_header {
                let headers: Vec<String> = record.iter().map(|f| f.to_string()).collect();
                let (m, u) = map_headers(&headers, legacy);
                mapped = m;
                unknown = u;
                found_header = true;
            }
            continue;
        }
        let mut job = RawJob::new();
        for (i, field) in record.iter().enumerate() {
            let Some(Some(column)) = mapped.get(i) else {
                continue;
            };
            if field.trim().is_empty() {
                continue;
            }
            job.set(*column, field);
        }
        if !job.values.is_empty() {
            rows.push(job);
        }
    }
    Ok(ParsedSheet {
        rows,
        unknown_headers: unknown,
    })
}

// ---------------------------------------------------------------------------
// Excel parser (feature-gated)
// ---------------------------------------------------------------------------

#[cfg(feature = "excel")]
fn detect_excel(file_path: &Path) -> bool {
    file_path
        .extension()
        .map_or(false, |e| e.eq_ignore_ascii_case("xlsx"))
}

#[cfg(feature = "excel")]
fn parse_excel(file_path: &Path) -> Result<ParsedSheet> {
    use calamine::Reader;

    let mut workbook = calamine::open_workbook_auto(file_path)
        .map_err(|e| CrmError::Other(format!("Failed to open XLSX: {e}")))?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| CrmError::Other("Workbook has no sheets".to_string()))?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| CrmError::Other(format!("Failed to read sheet: {e}")))?;

    let mut cells = range.rows();
    let headers: Vec<String> = match cells.next() {
        Some(row) => row.iter().map(|c| c.to_string()).collect(),
        None => {
            return Ok(ParsedSheet {
                rows: Vec::new(),
                unknown_headers: Vec::new(),
            })
        }
    };
    // Workbooks from either era show up, so accept the old aliases too
    let (mapped, unknown) = map_headers(&headers, true);

    let mut rows = Vec::new();
    for row in cells {
        let mut job = RawJob::new();
        for (i, cell) in row.iter().enumerate() {
            let Some(Some(column)) = mapped.get(i) else {
                continue;
            };
            let Some(value) = cell_to_string(column, cell) else {
                continue;
            };
            job.set(*column, value);
        }
        if !job.values.is_empty() {
            rows.push(job);
        }
    }
    Ok(ParsedSheet {
        rows,
        unknown_headers: unknown,
    })
}

#[cfg(feature = "excel")]
fn cell_to_string(column: &str, cell: &calamine::Data) -> Option<String> {
    use calamine::Data;
    match cell {
        Data::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Data::Float(f) => {
            if column == "Date" {
                Some(excel_serial_to_date(*f))
            } else if f.fract() == 0.0 {
                Some(format!("{}", *f as i64))
            } else {
                Some(f.to_string())
            }
        }
        Data::Int(i) => Some(i.to_string()),
        Data::DateTime(dt) => Some(excel_serial_to_date(dt.as_f64())),
        Data::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
