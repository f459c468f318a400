use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::db::get_connection;
use crate::error::Result;
use crate::permissions::{
    has_permission, SqliteRoleStore, SqliteUserStore, UserStore, PERMISSIONS,
};
use crate::settings::db_path;

pub fn list() -> Result<()> {
    let conn = get_connection(&db_path())?;
    let store = SqliteUserStore::new(&conn);
    let users = store.list_users()?;

    if users.is_empty() {
        println!("No users yet. Add one with `overhead users add <name> <email>`.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Name", "Email", "Role", "Status"]);
    for user in &users {
        let status = if user.status == "active" { user.status.green() } else { user.status.yellow() };
        table.add_row(vec![
            Cell::new(&user.name),
            Cell::new(&user.email),
            Cell::new(&user.role),
            Cell::new(status),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn add(name: &str, email: &str, role: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let store = SqliteUserStore::new(&conn);
    store.add_user(name, email, role)?;
    println!("Added {} ({}) as {role}", name.trim().bold(), email.trim());
    Ok(())
}

pub fn role(email: &str, role: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let store = SqliteUserStore::new(&conn);
    store.set_role(email, role)?;
    println!("{} is now {role}", email.trim().bold());
    Ok(())
}

/// `users permissions <email>`. Effective permissions through the user's
/// role, owner bypass included.
pub fn permissions(email: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let users = SqliteUserStore::new(&conn);
    let roles = SqliteRoleStore::new(&conn);
    let user = users.get_user(email)?;

    println!("{} ({}, {})", user.name.bold(), user.email, user.role);
    let mut granted = 0;
    for (key, label, _) in PERMISSIONS {
        if has_permission(&roles, &user, key) {
            println!("  {:<24} {label}", key);
            granted += 1;
        }
    }
    if granted == 0 {
        println!("  No permissions granted.");
    }
    Ok(())
}

pub fn deactivate(email: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let store = SqliteUserStore::new(&conn);
    store.set_status(email, "inactive")?;
    println!("{} deactivated", email.trim().bold());
    Ok(())
}

pub fn activate(email: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let store = SqliteUserStore::new(&conn);
    store.set_status(email, "active")?;
    println!("{} activated", email.trim().bold());
    Ok(())
}

pub fn remove(email: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let store = SqliteUserStore::new(&conn);
    store.remove_user(email)?;
    println!("Removed {}", email.trim());
    Ok(())
}
