use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::db::{get_connection, set_setting, DEFAULT_SETTINGS};
use crate::error::{CrmError, Result};
use crate::settings::{db_path, load_settings};

pub fn show() -> Result<()> {
    let settings = load_settings();
    println!("{}", "Workstation".bold());
    println!("  User:           {}", if settings.user_name.is_empty() { "(not set)" } else { &settings.user_name });
    println!("  Data directory: {}", settings.data_dir);
    println!("  Database:       {}", db_path().display());

    let conn = get_connection(&db_path())?;
    let mut stmt = conn.prepare("SELECT key, value FROM settings ORDER BY key")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut table = Table::new();
    table.set_header(vec!["Setting", "Value"]);
    for row in rows {
        let (key, value) = row?;
        table.add_row(vec![Cell::new(key), Cell::new(value)]);
    }
    println!();
    println!("{table}");
    Ok(())
}

pub fn set(key: &str, value: &str) -> Result<()> {
    let key = key.trim();
    if !DEFAULT_SETTINGS.iter().any(|(k, _)| *k == key) {
        let known: Vec<&str> = DEFAULT_SETTINGS.iter().map(|(k, _)| *k).collect();
        return Err(CrmError::InvalidInput(format!(
            "unknown setting {key}; known settings: {}",
            known.join(", ")
        )));
    }
    let conn = get_connection(&db_path())?;
    set_setting(&conn, key, value)?;
    println!("{key} = {value}");
    Ok(())
}

/// `settings company`. Shorthand for the company.* keys that show up on
/// exports and the status screen.
pub fn company(
    name: Option<&str>,
    phone: Option<&str>,
    address: Option<&str>,
    email: Option<&str>,
    website: Option<&str>,
) -> Result<()> {
    let updates: Vec<(&str, Option<&str>)> = vec![
        ("company.name", name),
        ("company.phone", phone),
        ("company.address", address),
        ("company.email", email),
        ("company.website", website),
    ];
    if updates.iter().all(|(_, v)| v.is_none()) {
        return Err(CrmError::InvalidInput(
            "nothing to update; pass --name, --phone, --address, --email, or --website".to_string(),
        ));
    }

    let conn = get_connection(&db_path())?;
    for (key, value) in updates {
        if let Some(value) = value {
            set_setting(&conn, key, value.trim())?;
            println!("{key} = {}", value.trim());
        }
    }
    Ok(())
}
