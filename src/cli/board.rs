use colored::Colorize;

use crate::board::JobBrowser;
use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::money;
use crate::jobs;
use crate::settings::db_path;
use crate::stages;

/// `board`. Kanban view of open jobs, one column per pipeline stage. The
/// default prints a static board; --interactive opens the full-screen browser.
pub fn run(interactive: bool) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let rows = jobs::fetch_active_rows(&conn)?;
    let stages = stages::list_stages(&conn)?;

    if interactive {
        let mut browser = JobBrowser::new(rows, stages);
        browser.run(&conn)?;
        return Ok(());
    }

    let columns = jobs::board_columns(&stages, rows);
    let open_total: usize = columns.iter().map(|(_, jobs)| jobs.len()).sum();
    if open_total == 0 {
        println!("No open jobs on the board.");
        return Ok(());
    }

    for (stage, jobs) in &columns {
        println!(
            "{} {}",
            format!("{} ({})", stage.name, jobs.len()).bold(),
            format!("[{}]", stage.color).dimmed()
        );
        if jobs.is_empty() {
            println!("  (empty)");
        }
        for job in jobs {
            let date = job.field("Date");
            let date = if date.trim().is_empty() { "unscheduled" } else { date.trim() };
            let tech = job.field("Technician");
            let tech = if tech.trim().is_empty() { "unassigned" } else { tech.trim() };
            println!(
                "  #{:<6} {:<24} {:<12} {:<20} {}",
                job.field("Count"),
                job.field("Client Name"),
                date,
                tech,
                money(job.amount("Sales"))
            );
        }
        println!();
    }
    println!("{open_total} open job(s)");
    Ok(())
}
