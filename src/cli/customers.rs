use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::db::get_connection;
use crate::error::{CrmError, Result};
use crate::fmt::money;
use crate::jobs;
use crate::rollup;
use crate::settings::db_path;

/// `customers list`. One row per customer, rolled up from the job sheet.
pub fn list() -> Result<()> {
    let conn = get_connection(&db_path())?;
    let customers = rollup::customer_rollup(jobs::normalized_jobs(&conn)?);

    if customers.is_empty() {
        println!("No customers yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Customer", "Phone", "Jobs", "Revenue", "Profit", "Last Job", "Tags"]);
    for customer in &customers {
        table.add_row(vec![
            Cell::new(&customer.name),
            Cell::new(&customer.phone),
            Cell::new(customer.total_jobs),
            Cell::new(money(customer.total_revenue)),
            Cell::new(money(customer.total_profit)),
            Cell::new(
                customer
                    .last_job_date
                    .map(|d| d.to_string())
                    .unwrap_or_default(),
            ),
            Cell::new(customer.tags.join(", ")),
        ]);
    }
    println!("{table}");
    println!("{} customer(s)", customers.len());
    Ok(())
}

/// `customers show <name>`. Case-insensitive lookup, full rollup card with
/// per-location job history.
pub fn show(name: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let customers = rollup::customer_rollup(jobs::normalized_jobs(&conn)?);
    let customer = customers
        .into_iter()
        .find(|c| c.name.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| CrmError::Other(format!("no customer matching '{}'", name.trim())))?;

    println!("{}", customer.name.bold());
    if !customer.phone.is_empty() {
        println!("  Phone: {}", customer.phone);
    }
    if !customer.email.is_empty() {
        println!("  Email: {}", customer.email);
    }
    println!("  Type:  {}", customer.customer_type);
    if !customer.tags.is_empty() {
        println!("  Tags:  {}", customer.tags.join(", ").cyan());
    }

    println!();
    println!(
        "  Jobs:              {} total, {} completed, {} cancelled",
        customer.total_jobs, customer.completed_jobs, customer.cancelled_jobs
    );
    if let (Some(first), Some(last)) = (customer.first_job_date, customer.last_job_date) {
        println!("  History:           {first} to {last}");
    }
    println!("  Revenue:           {}", money(customer.total_revenue));
    println!("  Costs:             {}", money(customer.total_costs));
    println!("  Profit:            {}", money(customer.total_profit));
    println!("  Technician Payout: {}", money(customer.technician_payouts));
    println!("  Company Profit:    {}", money(customer.company_profit));

    for location in &customer.locations {
        println!();
        println!("  {}", location.address.bold());
        for job in &location.jobs {
            let date = job.date.map(|d| d.to_string()).unwrap_or_else(|| "(no date)".to_string());
            let status = if job.status.is_empty() { "New Lead" } else { &job.status };
            println!(
                "    #{:<6} {:<12} {:<18} {}",
                job.count,
                date,
                status,
                money(job.sales_amount)
            );
        }
    }
    Ok(())
}
