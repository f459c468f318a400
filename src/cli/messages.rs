use colored::Colorize;
use rusqlite::Connection;

use crate::db::get_connection;
use crate::error::Result;
use crate::messages;
use crate::permissions::{SqliteUserStore, UserStore};
use crate::settings::{db_path, load_settings};

/// A users row matching the sender's name with the owner role upgrades the
/// sender type; everyone else sends from the dispatch seat.
fn sender_type_for(conn: &Connection, name: &str) -> Result<&'static str> {
    let is_owner = SqliteUserStore::new(conn).list_users()?.iter().any(|user| {
        user.name.eq_ignore_ascii_case(name) && user.role.eq_ignore_ascii_case("owner")
    });
    Ok(if is_owner { "owner" } else { "dispatcher" })
}

pub fn send(technician: &str, message: &str, urgent: bool) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let name = load_settings().user_name;
    let sender = if name.trim().is_empty() { "Dispatch".to_string() } else { name };
    let sender_type = sender_type_for(&conn, sender.trim())?;
    messages::send(&conn, &sender, sender_type, technician, message, urgent)?;
    if urgent {
        println!("{} message sent to {}", "Urgent".red().bold(), technician.trim());
    } else {
        println!("Message sent to {}", technician.trim());
    }
    Ok(())
}

/// `messages inbox`. With a technician, the whole conversation; without,
/// a summary of every conversation with unread mail.
pub fn inbox(technician: Option<&str>) -> Result<()> {
    let conn = get_connection(&db_path())?;

    let Some(technician) = technician else {
        let counts = messages::unread_counts(&conn)?;
        if counts.is_empty() {
            println!("No unread messages.");
        } else {
            for (who, count) in &counts {
                println!("  {:<20} {count} unread", who.bold());
            }
            println!();
            println!("Read a conversation with `overhead messages inbox <technician>`.");
        }
        return Ok(());
    };

    let thread = messages::conversation(&conn, technician)?;
    if thread.is_empty() {
        println!("No messages with {} yet.", technician.trim());
        return Ok(());
    }
    for message in &thread {
        let stamp = message.created_at.get(..16).unwrap_or(&message.created_at);
        let sender = if message.sender_type == "technician" {
            message.sender_name.cyan()
        } else {
            message.sender_name.green()
        };
        let flag = if message.message_type == "urgent" { " [URGENT]".red().bold().to_string() } else { String::new() };
        let unread = if message.is_read { "" } else { "*" };
        println!("  {stamp} {unread}{sender}{flag}: {}", message.content);
    }
    Ok(())
}

pub fn unread() -> Result<()> {
    let conn = get_connection(&db_path())?;
    let counts = messages::unread_counts(&conn)?;
    if counts.is_empty() {
        println!("No unread messages.");
        return Ok(());
    }
    let total: i64 = counts.iter().map(|(_, n)| n).sum();
    for (who, count) in &counts {
        println!("  {:<20} {count}", who.bold());
    }
    println!("{total} unread message(s)");
    Ok(())
}

pub fn read(technician: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let marked = messages::mark_read(&conn, technician)?;
    println!("Marked {marked} message(s) read in the {} conversation", technician.trim());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;

    #[test]
    fn test_sender_type_upgrades_for_owner_users() {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        let users = SqliteUserStore::new(&conn);
        users.add_user("Dan Weaver", "dan@example.com", "owner").unwrap();
        users.add_user("Rosa Delgado", "rosa@example.com", "dispatcher").unwrap();

        assert_eq!(sender_type_for(&conn, "dan weaver").unwrap(), "owner");
        assert_eq!(sender_type_for(&conn, "Rosa Delgado").unwrap(), "dispatcher");
        assert_eq!(sender_type_for(&conn, "Nobody Configured").unwrap(), "dispatcher");
    }
}
