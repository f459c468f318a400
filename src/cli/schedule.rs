use chrono::{Duration, Local, NaiveDate};
use colored::Colorize;

use crate::db::get_connection;
use crate::error::Result;
use crate::jobs;
use crate::settings::db_path;

/// `schedule`. Upcoming open jobs grouped by day, soonest first.
pub fn run(days: i64) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let today = Local::now().date_naive();
    let cutoff = today + Duration::days(days.max(1));

    let upcoming: Vec<(NaiveDate, _)> = jobs::schedule_jobs(jobs::fetch_active_rows(&conn)?, today)
        .into_iter()
        .filter(|(date, _)| *date <= cutoff)
        .collect();

    if upcoming.is_empty() {
        println!("Nothing scheduled in the next {days} days.");
        return Ok(());
    }

    let mut current: Option<NaiveDate> = None;
    for (date, job) in &upcoming {
        if current != Some(*date) {
            if current.is_some() {
                println!();
            }
            let label = format!("{} ({})", date.format("%A, %b %-d"), date);
            if *date == today {
                println!("{} {}", label.bold(), "today".green().bold());
            } else {
                println!("{}", label.bold());
            }
            current = Some(*date);
        }
        let tech = job.field("Technician");
        let tech = if tech.trim().is_empty() { "unassigned".to_string() } else { tech.trim().to_string() };
        let status = job.field("Status").trim();
        let status = if status.is_empty() { "New Lead" } else { status };
        println!(
            "  #{:<6} {:<24} {:<20} {}",
            job.field("Count"),
            job.field("Client Name"),
            tech,
            status.yellow()
        );
        let address = job.field("Address");
        if !address.trim().is_empty() {
            println!("          {}", address.trim().dimmed());
        }
    }
    println!();
    println!("{} job(s) over the next {days} days", upcoming.len());
    Ok(())
}
