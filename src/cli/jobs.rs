use chrono::Local;
use colored::Colorize;
use comfy_table::{Cell, Table};
use rusqlite::Connection;

use crate::classify::{classify_status, StatusClass};
use crate::db::{get_connection, get_setting_f64, get_setting_i64};
use crate::error::Result;
use crate::fmt::money;
use crate::jobs;
use crate::roster;
use crate::settings::db_path;
use crate::sheet::RawJob;
use crate::stages;

fn status_cell(status: &str) -> Cell {
    let label = if status.trim().is_empty() { "New Lead" } else { status.trim() };
    match classify_status(label) {
        StatusClass::Closed => Cell::new(label.green()),
        StatusClass::Cancelled => Cell::new(label.red()),
        StatusClass::Open => Cell::new(label.yellow()),
    }
}

fn job_table(rows: &[RawJob]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["#", "Date", "Client", "Technician", "Status", "Sales", "Balance"]);
    for job in rows {
        table.add_row(vec![
            Cell::new(job.field("Count")),
            Cell::new(job.field("Date")),
            Cell::new(job.field("Client Name")),
            Cell::new(job.field("Technician")),
            status_cell(job.field("Status")),
            Cell::new(money(job.amount("Sales"))),
            Cell::new(money(job.amount("Balance"))),
        ]);
    }
    table
}

/// `jobs list`. Hides old closed jobs and cancelled jobs unless --all.
pub fn list(stage: Option<&str>, search: Option<&str>, all: bool) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let mut rows = jobs::fetch_active_rows(&conn)?;

    if !all {
        let recent_days = get_setting_i64(&conn, "jobs.recent_closed_days", 7)?;
        rows = jobs::table_jobs(rows, Local::now().date_naive(), recent_days);
    }
    if let Some(stage) = stage {
        rows = jobs::filter_by_stage(rows, stage);
    }
    if let Some(query) = search {
        rows = jobs::search_jobs(rows, query);
    }
    jobs::sort_by_date_desc(&mut rows);

    if rows.is_empty() {
        println!("No jobs found.");
        return Ok(());
    }
    println!("{}", job_table(&rows));
    println!("{} job(s)", rows.len());
    Ok(())
}

/// `jobs show <count>`. Full card for one job, derived figures included.
pub fn show(count: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let raw = jobs::get_job_by_count(&conn, count)?;
    let job = jobs::normalize(&raw);

    println!("{}", format!("Job #{}", job.count).bold());
    println!("  Client:      {}", job.customer_key);
    if !job.phone.is_empty() {
        println!("  Phone:       {}", job.phone);
    }
    if !job.email.is_empty() {
        println!("  Email:       {}", job.email);
    }
    if !job.address.is_empty() {
        println!("  Address:     {}", job.address);
    }
    println!(
        "  Date:        {}",
        if job.date_raw.is_empty() { "(none)" } else { &job.date_raw }
    );
    let status = if job.status.is_empty() { "New Lead".to_string() } else { job.status.clone() };
    let status = match job.status_class {
        StatusClass::Closed => status.green(),
        StatusClass::Cancelled => status.red(),
        StatusClass::Open => status.yellow(),
    };
    println!("  Status:      {status}");
    if !job.technician_names.is_empty() {
        println!("  Technicians: {}", job.technician_names.join(", "));
    }
    println!("  Lead:        {}", job.lead_platform.label());

    println!();
    println!("  Sales:             {}", money(job.sales_amount));
    for (name, amount) in &job.payment_breakdown {
        if *amount != 0.0 {
            println!("    {:<16} {}", format!("{name}:"), money(*amount));
        }
    }
    if job.status_class == StatusClass::Closed {
        println!("  Collected:         {}", money(job.reconciled_revenue));
    }
    println!("  Total Costs:       {}", money(job.total_costs));
    println!("  Gross Profit:      {}", money(job.gross_profit));
    println!("  Technician Payout: {}", money(job.technician_payout));
    println!("  Company Profit:    {}", money(job.company_profit));
    let balance = raw.amount("Balance");
    let balance_str = money(balance);
    println!(
        "  Balance:           {}",
        if balance > 0.0 { balance_str.red() } else { balance_str.normal() }
    );

    let notes = raw.field("Notes");
    if !notes.trim().is_empty() {
        println!();
        println!("  Notes: {}", notes.trim());
    }
    let warranty = raw.field("Warranty");
    if !warranty.trim().is_empty() {
        println!("  Warranty: {}", warranty.trim());
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn add(
    client: &str,
    phone: Option<&str>,
    email: Option<&str>,
    address: Option<&str>,
    date: Option<&str>,
    technician: Option<&str>,
    lp: Option<&str>,
    sales: Option<&str>,
    status: Option<&str>,
    notes: Option<&str>,
) -> Result<()> {
    let conn = get_connection(&db_path())?;

    let mut job = RawJob::new();
    job.set("Client Name", client.trim());
    if let Some(v) = phone {
        job.set("Phone", v);
    }
    if let Some(v) = email {
        job.set("Email", v);
    }
    if let Some(v) = address {
        job.set("Address", v);
    }
    match date {
        Some(v) => job.set("Date", v),
        None => job.set("Date", Local::now().date_naive().format("%Y-%m-%d").to_string()),
    }
    if let Some(v) = technician {
        job.set("Technician", v);
    }
    if let Some(v) = lp {
        job.set("LP", v);
    }
    if let Some(v) = sales {
        job.set("Sales", v);
    }
    if let Some(v) = status {
        job.set("Status", v);
    }
    if let Some(v) = notes {
        job.set("Notes", v);
    }

    let rates = roster::commission_rates(&conn)?;
    let default_rate = get_setting_f64(&conn, "commission.default_rate", 0.30)?;
    jobs::apply_derived_fields(&mut job, &rates, default_rate);

    let count = jobs::insert_job(&conn, &mut job)?;
    println!("Added job {} for {}", format!("#{count}").green().bold(), client.trim());
    Ok(())
}

/// `jobs edit <count> <column> <value>`. Financial columns feed the derived
/// figures, so those get recomputed after the write.
pub fn edit(count: &str, column: &str, value: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    jobs::update_field(&conn, count, column, value)?;
    recompute_derived(&conn, count)?;
    println!("Updated {} on job #{}", column.bold(), count.trim());
    Ok(())
}

/// `jobs status <count> <stage>`. The stage must exist on the pipeline; the
/// stored value uses the stage's canonical capitalization.
pub fn status(count: &str, stage: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let stage = stages::get_stage(&conn, stage)?;
    jobs::set_status(&conn, count, &stage.name)?;
    println!("Job #{} moved to {}", count.trim(), stage.name.bold());
    Ok(())
}

pub fn assign(count: &str, technicians: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    jobs::set_technicians(&conn, count, technicians)?;
    recompute_derived(&conn, count)?;
    println!("Job #{} assigned to {}", count.trim(), technicians.trim().bold());
    Ok(())
}

pub fn delete(count: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    jobs::soft_delete(&conn, count)?;
    println!("Job #{} moved to trash. Restore with `overhead jobs restore {}`.", count.trim(), count.trim());
    Ok(())
}

pub fn restore(count: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    jobs::restore(&conn, count)?;
    println!("Job #{} restored to New Lead", count.trim());
    Ok(())
}

pub fn purge(count: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    jobs::purge(&conn, count)?;
    println!("Job #{} permanently removed", count.trim());
    Ok(())
}

pub fn trash() -> Result<()> {
    let conn = get_connection(&db_path())?;
    let rows = jobs::fetch_deleted_rows(&conn)?;
    if rows.is_empty() {
        println!("Trash is empty.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "Date", "Client", "Technician", "Sales"]);
    for job in &rows {
        table.add_row(vec![
            Cell::new(job.field("Count")),
            Cell::new(job.field("Date")),
            Cell::new(job.field("Client Name")),
            Cell::new(job.field("Technician")),
            Cell::new(money(job.amount("Sales"))),
        ]);
    }
    println!("{table}");
    println!("{} job(s) in trash", rows.len());
    Ok(())
}

/// Recompute the derived columns after an edit that may have touched the
/// inputs (sales, payments, costs, technician).
fn recompute_derived(conn: &Connection, count: &str) -> Result<()> {
    let mut job = jobs::get_job_by_count(conn, count)?;
    let rates = roster::commission_rates(conn)?;
    let default_rate = get_setting_f64(conn, "commission.default_rate", 0.30)?;
    jobs::apply_derived_fields(&mut job, &rates, default_rate);
    for column in ["Gross Profit", "Payout Rate", "Technician Payout", "Company Profit", "Balance"] {
        jobs::update_field(conn, count, column, job.field(column))?;
    }
    Ok(())
}
