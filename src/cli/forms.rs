use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::db::get_connection;
use crate::error::Result;
use crate::forms;
use crate::settings::db_path;

pub fn list() -> Result<()> {
    let conn = get_connection(&db_path())?;
    let fields = forms::list_fields(&conn)?;

    let mut table = Table::new();
    table.set_header(vec!["#", "Field", "Label", "Type", "Required", "Options"]);
    for (i, field) in fields.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&field.name),
            Cell::new(&field.label),
            Cell::new(&field.field_type),
            Cell::new(if field.required { "yes" } else { "" }),
            Cell::new(field.options.join(", ")),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn add(
    name: &str,
    label: Option<&str>,
    field_type: &str,
    required: bool,
    options: &[String],
) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let label = label.unwrap_or(name).trim();
    forms::add_field(&conn, name, label, field_type, required, options)?;
    println!("Added {field_type} field {}", name.trim().bold());
    Ok(())
}

pub fn label(name: &str, label: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    forms::set_label(&conn, name, label)?;
    println!("{} is now labeled \"{}\"", name.trim().bold(), label.trim());
    Ok(())
}

pub fn require(name: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    forms::set_required(&conn, name, true)?;
    println!("{} is now required", name.trim().bold());
    Ok(())
}

pub fn unrequire(name: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    forms::set_required(&conn, name, false)?;
    println!("{} is now optional", name.trim().bold());
    Ok(())
}

pub fn options(name: &str, options: &[String]) -> Result<()> {
    let conn = get_connection(&db_path())?;
    forms::set_options(&conn, name, options)?;
    println!("{} options: {}", name.trim().bold(), options.join(", "));
    Ok(())
}

pub fn reorder(name: &str, position: i64) -> Result<()> {
    let conn = get_connection(&db_path())?;
    forms::reorder_field(&conn, name, position)?;
    let order: Vec<String> = forms::list_fields(&conn)?.into_iter().map(|f| f.name).collect();
    println!("Intake form order: {}", order.join(" > "));
    Ok(())
}

pub fn remove(name: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    forms::remove_field(&conn, name)?;
    println!("Removed field {}", name.trim());
    Ok(())
}
