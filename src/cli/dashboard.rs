use chrono::Local;
use colored::Colorize;

use crate::db::{get_connection, get_setting_f64};
use crate::error::{CrmError, Result};
use crate::fmt::{job_count, money, money_whole};
use crate::jobs;
use crate::reports::{self, Period};
use crate::rollup;
use crate::roster;
use crate::settings::db_path;

const BAR_WIDTH: usize = 30;

fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 {
        return String::new();
    }
    let len = ((value / max) * BAR_WIDTH as f64).round() as usize;
    "█".repeat(len.min(BAR_WIDTH))
}

/// `dashboard`. Headline metrics for the chosen period, plus the trailing
/// twelve-month trend, lead platform breakdown, and technician leaderboard.
pub fn run(period: &str) -> Result<()> {
    let period = Period::parse(period).ok_or_else(|| {
        CrmError::InvalidInput(format!("period must be all, year, month, or week, got {period}"))
    })?;

    let conn = get_connection(&db_path())?;
    let today = Local::now().date_naive();
    let all_jobs = jobs::normalized_jobs(&conn)?;
    let in_period = reports::filter_by_period(all_jobs.clone(), period, today);
    let metrics = reports::dashboard_metrics(&in_period);

    println!("{} {}", "Dashboard".bold(), format!("({})", period.label()).dimmed());
    println!();
    println!("  Revenue (collected): {}", money(metrics.total_revenue).green().bold());
    println!(
        "  Jobs:                {} total, {} active, {} completed, {} cancelled",
        metrics.total_jobs, metrics.active_jobs, metrics.completed_jobs, metrics.cancelled_jobs
    );
    println!("  Average ticket:      {}", money(metrics.average_ticket));
    println!("  Conversion rate:     {:.1}%", metrics.conversion_rate);

    // The trend covers the trailing twelve months whatever the period
    // filter says.
    let trend = reports::monthly_trend(&all_jobs, today);
    if trend.iter().any(|b| b.jobs > 0) {
        println!();
        println!("{}", "Monthly revenue".bold());
        let max = trend.iter().map(|b| b.revenue).fold(0.0, f64::max);
        for bucket in &trend {
            println!(
                "  {:<9} {:>12}  {} {}",
                bucket.label,
                money_whole(bucket.revenue),
                bar(bucket.revenue, max).cyan(),
                format!("{} jobs", bucket.jobs).dimmed()
            );
        }
    }

    let platforms = reports::lead_platform_stats(&in_period);
    if !platforms.is_empty() {
        println!();
        println!("{}", "Lead platforms".bold());
        for stat in &platforms {
            println!(
                "  {:<18} {:>4} jobs  {:>12}",
                stat.platform.label(),
                stat.jobs,
                money_whole(stat.revenue)
            );
        }
    }

    let rates = roster::commission_rates(&conn)?;
    let default_rate = get_setting_f64(&conn, "commission.default_rate", 0.30)?;
    let leaderboard = rollup::technician_stats(&in_period, &rates, default_rate);
    if !leaderboard.is_empty() {
        println!();
        println!("{}", "Technicians".bold());
        for stat in leaderboard.iter().take(5) {
            println!(
                "  {:<18} {:>5} jobs  {:>12} revenue  {:>10} commission",
                stat.name,
                job_count(stat.total_jobs),
                money_whole(stat.revenue),
                money_whole(stat.commission)
            );
        }
    }
    Ok(())
}
