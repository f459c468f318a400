use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::db::get_connection;
use crate::error::Result;
use crate::jobs;
use crate::settings::db_path;
use crate::stages;

pub fn list() -> Result<()> {
    let conn = get_connection(&db_path())?;
    let stages = stages::list_stages(&conn)?;
    let rows = jobs::fetch_active_rows(&conn)?;

    let mut table = Table::new();
    table.set_header(vec!["#", "Stage", "Color", "Jobs"]);
    for (i, stage) in stages.iter().enumerate() {
        let count = rows
            .iter()
            .filter(|job| {
                let status = job.field("Status").trim();
                let status = if status.is_empty() { "New Lead" } else { status };
                status.eq_ignore_ascii_case(&stage.name)
            })
            .count();
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&stage.name),
            Cell::new(&stage.color),
            Cell::new(count),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn add(name: &str, color: Option<&str>) -> Result<()> {
    let conn = get_connection(&db_path())?;
    stages::add_stage(&conn, name, color)?;
    println!("Added stage {}", name.trim().bold());
    Ok(())
}

pub fn rename(name: &str, new_name: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    stages::rename_stage(&conn, name, new_name)?;
    println!("Renamed {} to {}", name.trim(), new_name.trim().bold());
    Ok(())
}

pub fn color(name: &str, color: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    stages::set_color(&conn, name, color)?;
    println!("{} is now {color}", name.trim().bold());
    Ok(())
}

pub fn reorder(name: &str, position: i64) -> Result<()> {
    let conn = get_connection(&db_path())?;
    stages::reorder_stage(&conn, name, position)?;
    let order: Vec<String> = stages::list_stages(&conn)?.into_iter().map(|s| s.name).collect();
    println!("Pipeline order: {}", order.join(" > "));
    Ok(())
}

pub fn remove(name: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    stages::remove_stage(&conn, name)?;
    println!("Removed stage {}", name.trim());
    Ok(())
}
