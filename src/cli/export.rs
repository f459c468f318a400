use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::money;
use crate::jobs;
use crate::rollup;
use crate::settings::db_path;
use crate::sheet::COLUMNS;

pub fn jobs(path: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let rows = jobs::fetch_active_rows(&conn)?;

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(COLUMNS)?;
    for job in &rows {
        let record: Vec<&str> = COLUMNS.iter().map(|c| job.field(c)).collect();
        writer.write_record(&record)?;
    }
    writer.flush()?;

    println!("Exported {} jobs to {path}", rows.len());
    Ok(())
}

pub fn customers(path: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let customers = rollup::customer_rollup(jobs::normalized_jobs(&conn)?);

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "Customer",
        "Phone",
        "Email",
        "Locations",
        "Total Jobs",
        "Completed",
        "Cancelled",
        "Revenue",
        "Costs",
        "Profit",
        "Technician Payouts",
        "Company Profit",
        "First Job",
        "Last Job",
        "Tags",
    ])?;
    for customer in &customers {
        writer.write_record([
            customer.name.clone(),
            customer.phone.clone(),
            customer.email.clone(),
            customer.locations.len().to_string(),
            customer.total_jobs.to_string(),
            customer.completed_jobs.to_string(),
            customer.cancelled_jobs.to_string(),
            money(customer.total_revenue),
            money(customer.total_costs),
            money(customer.total_profit),
            money(customer.technician_payouts),
            money(customer.company_profit),
            customer.first_job_date.map(|d| d.to_string()).unwrap_or_default(),
            customer.last_job_date.map(|d| d.to_string()).unwrap_or_default(),
            customer.tags.join(", "),
        ])?;
    }
    writer.flush()?;

    println!("Exported {} customers to {path}", customers.len());
    Ok(())
}
