use rusqlite::Connection;

use crate::error::{CrmError, Result};
use crate::models::Message;
use crate::roster;

fn row_to_message(row: &rusqlite::Row) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        sender_name: row.get(1)?,
        sender_type: row.get(2)?,
        recipient_name: row.get(3)?,
        content: row.get(4)?,
        message_type: row.get(5)?,
        is_read: row.get(6)?,
        created_at: row.get(7)?,
    })
}

/// Send from the dispatch seat to a rostered technician. Messages land
/// unread on the technician's side of the conversation.
pub fn send(
    conn: &Connection,
    sender_name: &str,
    sender_type: &str,
    technician: &str,
    content: &str,
    urgent: bool,
) -> Result<()> {
    let content = content.trim();
    if content.is_empty() {
        return Err(CrmError::InvalidInput("message content cannot be blank".to_string()));
    }
    let technician = roster::get_technician(conn, technician)?;
    let message_type = if urgent { "urgent" } else { "text" };
    conn.execute(
        "INSERT INTO messages (sender_name, sender_type, recipient_name, content, message_type)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![sender_name, sender_type, technician.name, content, message_type],
    )?;
    Ok(())
}

/// A technician's reply back to dispatch; part of the same conversation.
pub fn reply(conn: &Connection, technician: &str, dispatcher_name: &str, content: &str) -> Result<()> {
    let content = content.trim();
    if content.is_empty() {
        return Err(CrmError::InvalidInput("message content cannot be blank".to_string()));
    }
    let technician = roster::get_technician(conn, technician)?;
    conn.execute(
        "INSERT INTO messages (sender_name, sender_type, recipient_name, content, message_type)
         VALUES (?1, 'technician', ?2, ?3, 'text')",
        rusqlite::params![technician.name, dispatcher_name, content],
    )?;
    Ok(())
}

/// Everything sent to or from one technician, oldest first.
pub fn conversation(conn: &Connection, technician: &str) -> Result<Vec<Message>> {
    let technician = roster::get_technician(conn, technician)?;
    let mut stmt = conn.prepare(
        "SELECT id, sender_name, sender_type, recipient_name, content, message_type, is_read, created_at
         FROM messages
         WHERE recipient_name = ?1 OR (sender_name = ?1 AND sender_type = 'technician')
         ORDER BY created_at, id",
    )?;
    let rows = stmt.query_map([technician.name.as_str()], row_to_message)?;
    let mut messages = Vec::new();
    for message in rows {
        messages.push(message?);
    }
    Ok(messages)
}

/// Unread message count per conversation partner, busiest first.
pub fn unread_counts(conn: &Connection) -> Result<Vec<(String, i64)>> {
    let mut stmt = conn.prepare(
        "SELECT CASE WHEN sender_type = 'technician' THEN sender_name ELSE recipient_name END AS who,
                count(*)
         FROM messages WHERE is_read = 0
         GROUP BY who ORDER BY count(*) DESC, who",
    )?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;
    let mut counts = Vec::new();
    for row in rows {
        counts.push(row?);
    }
    Ok(counts)
}

/// Mark one technician's whole conversation read.
pub fn mark_read(conn: &Connection, technician: &str) -> Result<usize> {
    let technician = roster::get_technician(conn, technician)?;
    let changed = conn.execute(
        "UPDATE messages SET is_read = 1
         WHERE is_read = 0 AND (recipient_name = ?1 OR (sender_name = ?1 AND sender_type = 'technician'))",
        [technician.name.as_str()],
    )?;
    Ok(changed)
}
