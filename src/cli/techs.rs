use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::db::{get_connection, get_setting_f64};
use crate::error::Result;
use crate::fmt::{job_count, money};
use crate::jobs;
use crate::rollup;
use crate::roster;
use crate::settings::db_path;

fn percent(rate: f64) -> String {
    format!("{:.0}%", rate * 100.0)
}

pub fn list(all: bool) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let technicians = roster::list_technicians(&conn, all)?;

    if technicians.is_empty() {
        println!("No technicians on the roster. Add one with `overhead techs add <name>`.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Name", "Email", "Phone", "Commission", "Status"]);
    for tech in &technicians {
        let status = if tech.status == "active" {
            tech.status.green()
        } else {
            tech.status.yellow()
        };
        table.add_row(vec![
            Cell::new(&tech.name),
            Cell::new(tech.email.as_deref().unwrap_or("")),
            Cell::new(tech.phone.as_deref().unwrap_or("")),
            Cell::new(percent(tech.commission_rate)),
            Cell::new(status),
        ]);
    }
    println!("{table}");
    Ok(())
}

/// `techs add`. Commission rate is a fraction (0.5 = 50%); falls back to the
/// configured default when not given.
pub fn add(name: &str, email: Option<&str>, phone: Option<&str>, rate: Option<f64>) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let rate = match rate {
        Some(rate) => rate,
        None => get_setting_f64(&conn, "commission.default_rate", 0.30)?,
    };
    roster::add_technician(&conn, name, email, phone, rate)?;
    println!("Added {} at {} commission", name.trim().bold(), percent(rate));
    Ok(())
}

pub fn rate(name: &str, rate: f64) -> Result<()> {
    let conn = get_connection(&db_path())?;
    roster::set_commission_rate(&conn, name, rate)?;
    println!("{} now earns {} commission", name.trim().bold(), percent(rate));
    Ok(())
}

pub fn contact(name: &str, email: Option<&str>, phone: Option<&str>) -> Result<()> {
    let conn = get_connection(&db_path())?;
    roster::set_contact(&conn, name, email, phone)?;
    println!("Updated contact info for {}", name.trim().bold());
    Ok(())
}

/// `techs stats`. Revenue attribution across the whole sheet, split jobs
/// counted fractionally.
pub fn stats() -> Result<()> {
    let conn = get_connection(&db_path())?;
    let rates = roster::commission_rates(&conn)?;
    let default_rate = get_setting_f64(&conn, "commission.default_rate", 0.30)?;
    let stats = rollup::technician_stats(&jobs::normalized_jobs(&conn)?, &rates, default_rate);

    if stats.is_empty() {
        println!("No technician activity yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Technician", "Jobs", "Active", "Revenue", "Costs", "Profit", "Commission"]);
    for stat in &stats {
        table.add_row(vec![
            Cell::new(&stat.name),
            Cell::new(job_count(stat.total_jobs)),
            Cell::new(stat.active_jobs),
            Cell::new(money(stat.revenue)),
            Cell::new(money(stat.costs)),
            Cell::new(money(stat.profit)),
            Cell::new(money(stat.commission)),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn deactivate(name: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    roster::set_status(&conn, name, "inactive")?;
    println!("{} marked inactive. Past jobs keep their attribution.", name.trim().bold());
    Ok(())
}

pub fn activate(name: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    roster::set_status(&conn, name, "active")?;
    println!("{} marked active", name.trim().bold());
    Ok(())
}

pub fn remove(name: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    roster::remove_technician(&conn, name)?;
    println!("Removed {} from the roster", name.trim().bold());
    Ok(())
}
