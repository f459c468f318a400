use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::db::get_connection;
use crate::error::Result;
use crate::permissions::{self, RoleStore, SqliteRoleStore, PERMISSIONS};
use crate::settings::db_path;

pub fn list() -> Result<()> {
    let conn = get_connection(&db_path())?;
    let store = SqliteRoleStore::new(&conn);
    let roles = store.list_roles()?;

    let mut table = Table::new();
    table.set_header(vec!["Role", "Description", "Permissions", ""]);
    for role in &roles {
        table.add_row(vec![
            Cell::new(&role.name),
            Cell::new(&role.description),
            Cell::new(role.permissions.len()),
            Cell::new(if role.is_system { "system" } else { "" }),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn show(name: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let store = SqliteRoleStore::new(&conn);
    let role = store.get_role(name)?;

    println!("{}{}", role.name.bold(), if role.is_system { " (system)" } else { "" });
    if !role.description.is_empty() {
        println!("  {}", role.description);
    }
    println!();
    if role.name.eq_ignore_ascii_case("owner") {
        println!("  Owners hold every permission.");
        return Ok(());
    }
    if role.permissions.is_empty() {
        println!("  No permissions granted.");
        return Ok(());
    }
    for (key, label, category) in PERMISSIONS {
        if role.permissions.iter().any(|p| p == key) {
            println!("  {:<24} {label} ({category})", key);
        }
    }
    Ok(())
}

pub fn add(name: &str, description: &str, permissions: &[String]) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let store = SqliteRoleStore::new(&conn);
    store.add_role(name, description, permissions)?;
    println!("Added role {} with {} permission(s)", name.trim().bold(), permissions.len());
    Ok(())
}

pub fn grant(role: &str, permission: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let store = SqliteRoleStore::new(&conn);
    permissions::grant(&store, role, permission)?;
    println!("Granted {} to {}", permission.bold(), role.trim());
    Ok(())
}

pub fn revoke(role: &str, permission: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let store = SqliteRoleStore::new(&conn);
    permissions::revoke(&store, role, permission)?;
    println!("Revoked {} from {}", permission.bold(), role.trim());
    Ok(())
}

pub fn remove(name: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let store = SqliteRoleStore::new(&conn);
    store.remove_role(name)?;
    println!("Removed role {}", name.trim());
    Ok(())
}

/// `roles permissions`. The full catalog, grouped by category.
pub fn permissions_catalog() -> Result<()> {
    let mut current = "";
    for (key, label, category) in PERMISSIONS {
        if *category != current {
            if !current.is_empty() {
                println!();
            }
            println!("{}", category.bold());
            current = category;
        }
        println!("  {:<24} {label}", key);
    }
    Ok(())
}
