use std::collections::HashMap;

use chrono::{Duration, Local, NaiveDate};
use rusqlite::Connection;

use crate::classify::{self, LeadPlatform, StatusClass};
use crate::error::{CrmError, Result};
use crate::models::PipelineStage;
use crate::sheet::{self, RawJob, COLUMNS, PAYMENT_FIELDS};

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Canonical job shape derived from one sheet row. Built once per fetch and
/// read-only after that.
#[derive(Debug, Clone)]
pub struct NormalizedJob {
    pub id: i64,
    pub count: String,
    pub customer_key: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub status: String,
    pub status_class: StatusClass,
    pub sales_amount: f64,
    pub total_costs: f64,
    pub gross_profit: f64,
    pub technician_payout: f64,
    pub company_profit: f64,
    pub payment_breakdown: Vec<(&'static str, f64)>,
    pub reconciled_revenue: f64,
    pub technician_names: Vec<String>,
    pub lead_platform: LeadPlatform,
    pub date_raw: String,
    pub date: Option<NaiveDate>,
}

pub fn normalize(raw: &RawJob) -> NormalizedJob {
    let payment_breakdown: Vec<(&'static str, f64)> =
        PAYMENT_FIELDS.iter().map(|f| (*f, raw.amount(f))).collect();
    let payments_total: f64 = payment_breakdown.iter().map(|(_, v)| v).sum();
    let sales_amount = raw.amount("Sales");
    // Payments win whenever their sum is nonzero; only an all-blank (or
    // all-zero) breakdown falls back to the Sales column. Never both.
    let reconciled_revenue = if payments_total != 0.0 {
        payments_total
    } else {
        sales_amount
    };

    let customer = raw.field("Client Name").trim();
    let address = raw.field("Address").trim();
    let status = raw.field("Status").trim();

    NormalizedJob {
        id: if raw.id != 0 { raw.id } else { rand::random::<u32>() as i64 },
        count: raw.field("Count").trim().to_string(),
        customer_key: if customer.is_empty() {
            "Unknown Customer".to_string()
        } else {
            customer.to_string()
        },
        address: if address.is_empty() {
            "Unknown Address".to_string()
        } else {
            address.to_string()
        },
        phone: raw.field("Phone").trim().to_string(),
        email: raw.field("Email").trim().to_string(),
        status: status.to_string(),
        status_class: classify::classify_status(status),
        sales_amount,
        total_costs: raw.amount("Total Costs"),
        gross_profit: raw.amount("Gross Profit"),
        technician_payout: raw.amount("Technician Payout"),
        company_profit: raw.amount("Company Profit"),
        payment_breakdown,
        reconciled_revenue,
        technician_names: sheet::split_technicians(raw.field("Technician")),
        lead_platform: LeadPlatform::from_code(raw.field("LP")),
        date_raw: raw.field("Date").to_string(),
        date: raw.date(),
    }
}

/// Fetch-and-normalize pipeline used by every aggregate: one bulk read, soft
/// deletes screened out, then a synchronous normalize pass.
pub fn normalized_jobs(conn: &Connection) -> Result<Vec<NormalizedJob>> {
    Ok(fetch_active_rows(conn)?.iter().map(normalize).collect())
}

// ---------------------------------------------------------------------------
// Row storage
// ---------------------------------------------------------------------------

fn select_sql() -> String {
    let cols: Vec<String> = COLUMNS.iter().map(|c| format!("\"{c}\"")).collect();
    format!("SELECT id, {} FROM all_jobs ORDER BY id", cols.join(", "))
}

pub fn fetch_all_rows(conn: &Connection) -> Result<Vec<RawJob>> {
    let mut stmt = conn.prepare(&select_sql())?;
    let rows = stmt.query_map([], |row| {
        let mut job = RawJob::new();
        job.id = row.get(0)?;
        for (i, col) in COLUMNS.iter().enumerate() {
            let value: Option<String> = row.get(i + 1)?;
            if let Some(value) = value {
                if !value.is_empty() {
                    job.values.insert(col.to_string(), value);
                }
            }
        }
        Ok(job)
    })?;
    let mut jobs = Vec::new();
    for job in rows {
        jobs.push(job?);
    }
    Ok(jobs)
}

pub fn fetch_active_rows(conn: &Connection) -> Result<Vec<RawJob>> {
    Ok(fetch_all_rows(conn)?
        .into_iter()
        .filter(|j| !classify::is_deleted(j.field("Status")))
        .collect())
}

pub fn fetch_deleted_rows(conn: &Connection) -> Result<Vec<RawJob>> {
    Ok(fetch_all_rows(conn)?
        .into_iter()
        .filter(|j| classify::is_deleted(j.field("Status")))
        .collect())
}

pub fn get_job_by_count(conn: &Connection, count: &str) -> Result<RawJob> {
    let count = count.trim();
    fetch_all_rows(conn)?
        .into_iter()
        .find(|j| j.field("Count").trim() == count)
        .ok_or_else(|| CrmError::JobNotFound(count.to_string()))
}

fn next_count(conn: &Connection) -> Result<i64> {
    let max: i64 = conn.query_row(
        r#"SELECT COALESCE(MAX(CAST("Count" AS INTEGER)), 0) FROM all_jobs"#,
        [],
        |row| row.get(0),
    )?;
    Ok(max + 1)
}

/// Insert one raw row exactly as given; columns the row does not carry are
/// stored as NULL.
pub fn insert_row(conn: &Connection, job: &RawJob) -> Result<()> {
    let cols: Vec<String> = COLUMNS.iter().map(|c| format!("\"{c}\"")).collect();
    let placeholders: Vec<String> = (1..=COLUMNS.len()).map(|i| format!("?{i}")).collect();
    let sql = format!(
        "INSERT INTO all_jobs ({}) VALUES ({})",
        cols.join(", "),
        placeholders.join(", ")
    );
    conn.execute(
        &sql,
        rusqlite::params_from_iter(COLUMNS.iter().map(|c| job.values.get(*c))),
    )?;
    Ok(())
}

/// Insert one raw row. Blank Count/Date/Status get their defaults first;
/// returns the count the job ended up under.
pub fn insert_job(conn: &Connection, job: &mut RawJob) -> Result<String> {
    if job.field("Count").trim().is_empty() {
        job.set("Count", next_count(conn)?.to_string());
    }
    if job.field("Date").trim().is_empty() {
        job.set("Date", Local::now().date_naive().format("%Y-%m-%d").to_string());
    }
    if job.field("Status").trim().is_empty() {
        job.set("Status", "New Lead");
    }
    insert_row(conn, job)?;
    Ok(job.field("Count").to_string())
}

/// Set one sheet column on the job with the given count. The column must be a
/// recognized header; a blank value clears the cell.
pub fn update_field(conn: &Connection, count: &str, column: &str, value: &str) -> Result<()> {
    if !COLUMNS.contains(&column) {
        return Err(CrmError::InvalidInput(format!("unknown column: {column}")));
    }
    let sql = format!(r#"UPDATE all_jobs SET "{column}" = ?1 WHERE trim("Count") = ?2"#);
    let value = if value.is_empty() { None } else { Some(value) };
    let changed = conn.execute(&sql, rusqlite::params![value, count.trim()])?;
    if changed == 0 {
        return Err(CrmError::JobNotFound(count.trim().to_string()));
    }
    Ok(())
}

pub fn set_status(conn: &Connection, count: &str, status: &str) -> Result<()> {
    update_field(conn, count, "Status", status)
}

pub fn set_technicians(conn: &Connection, count: &str, technicians: &str) -> Result<()> {
    update_field(conn, count, "Technician", technicians)
}

pub fn soft_delete(conn: &Connection, count: &str) -> Result<()> {
    let job = get_job_by_count(conn, count)?;
    if classify::is_deleted(job.field("Status")) {
        return Err(CrmError::InvalidInput(format!("job {count} is already in the trash")));
    }
    set_status(conn, count, "Deleted")
}

/// Recovered jobs re-enter the pipeline at the first stage.
pub fn restore(conn: &Connection, count: &str) -> Result<()> {
    let job = get_job_by_count(conn, count)?;
    if !classify::is_deleted(job.field("Status")) {
        return Err(CrmError::InvalidInput(format!("job {count} is not in the trash")));
    }
    set_status(conn, count, "New Lead")
}

/// Permanent removal, only allowed for rows already in the trash.
pub fn purge(conn: &Connection, count: &str) -> Result<()> {
    let job = get_job_by_count(conn, count)?;
    if !classify::is_deleted(job.field("Status")) {
        return Err(CrmError::InvalidInput(format!("job {count} is not in the trash")));
    }
    conn.execute(
        r#"DELETE FROM all_jobs WHERE trim("Count") = ?1"#,
        [count.trim()],
    )?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Derived columns
// ---------------------------------------------------------------------------

/// Recompute the financial columns a save is expected to fill in, the same
/// way the office sheet did: gross profit from sales and costs, payout from
/// the first listed technician's rate, balance from the payment breakdown.
pub fn apply_derived_fields(job: &mut RawJob, rates: &HashMap<String, f64>, default_rate: f64) {
    let sales = job.amount("Sales");
    let costs = job.amount("Total Costs");
    let gross = sales - costs;

    let technicians = sheet::split_technicians(job.field("Technician"));
    let rate = technicians
        .first()
        .and_then(|name| rates.get(name).copied())
        .unwrap_or(default_rate);
    let payout = sales * rate;

    let payments: f64 = PAYMENT_FIELDS.iter().map(|f| job.amount(f)).sum();

    job.set("Gross Profit", format!("{gross:.2}"));
    job.set("Payout Rate", format!("{rate:.2}"));
    job.set("Technician Payout", format!("{payout:.2}"));
    job.set("Company Profit", format!("{:.2}", gross - payout));
    job.set("Balance", format!("{:.2}", sales - payments));
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Parsed date descending, rows without a parseable date last, ties in
/// encounter order.
pub fn sort_by_date_desc(jobs: &mut [RawJob]) {
    jobs.sort_by(|a, b| match (a.date(), b.date()) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

/// The dispatch table: everything still open, plus jobs closed within the
/// last `recent_days` so finished work lingers briefly.
pub fn table_jobs(jobs: Vec<RawJob>, today: NaiveDate, recent_days: i64) -> Vec<RawJob> {
    let cutoff = today - Duration::days(recent_days);
    jobs.into_iter()
        .filter(|job| match classify::classify_status(job.field("Status")) {
            StatusClass::Open => true,
            StatusClass::Closed => job.date().map(|d| d >= cutoff).unwrap_or(false),
            StatusClass::Cancelled => false,
        })
        .collect()
}

/// Case-insensitive search over client name, technician, and status.
pub fn search_jobs(jobs: Vec<RawJob>, query: &str) -> Vec<RawJob> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return jobs;
    }
    jobs.into_iter()
        .filter(|job| {
            [job.field("Client Name"), job.field("Technician"), job.field("Status")]
                .iter()
                .any(|v| v.to_lowercase().contains(&query))
        })
        .collect()
}

pub fn filter_by_stage(jobs: Vec<RawJob>, stage: &str) -> Vec<RawJob> {
    jobs.into_iter()
        .filter(|job| job.field("Status").trim().eq_ignore_ascii_case(stage.trim()))
        .collect()
}

/// Open jobs dated today or later, soonest first.
pub fn schedule_jobs(jobs: Vec<RawJob>, today: NaiveDate) -> Vec<(NaiveDate, RawJob)> {
    let mut upcoming: Vec<(NaiveDate, RawJob)> = jobs
        .into_iter()
        .filter(|job| classify::classify_status(job.field("Status")) == StatusClass::Open)
        .filter_map(|job| job.date().map(|d| (d, job)))
        .filter(|(d, _)| *d >= today)
        .collect();
    upcoming.sort_by_key(|(d, _)| *d);
    upcoming
}

/// One kanban column per open stage, jobs matched to configured stages by
/// name; statuses with no configured stage get a synthesized column with the
/// default color so they stay visible.
pub fn board_columns(stages: &[PipelineStage], jobs: Vec<RawJob>) -> Vec<(PipelineStage, Vec<RawJob>)> {
    let mut columns: Vec<(PipelineStage, Vec<RawJob>)> = stages
        .iter()
        .filter(|s| classify::classify_status(&s.name) == StatusClass::Open)
        .cloned()
        .map(|s| (s, Vec::new()))
        .collect();

    for job in jobs {
        if classify::classify_status(job.field("Status")) != StatusClass::Open {
            continue;
        }
        let status = job.field("Status").trim();
        let status = if status.is_empty() { "New Lead" } else { status };
        if let Some((_, bucket)) = columns
            .iter_mut()
            .find(|(stage, _)| stage.name.eq_ignore_ascii_case(status))
        {
            bucket.push(job);
        } else {
            let stage = PipelineStage {
                id: 0,
                name: status.to_string(),
                color: classify::default_stage_color(status).to_string(),
                order_position: classify::default_stage_order(status),
            };
            columns.push((stage, vec![job]));
        }
    }

    columns.sort_by(|(a, _), (b, _)| {
        a.order_position.cmp(&b.order_position).then_with(|| a.name.cmp(&b.name))
    });
    columns
}
