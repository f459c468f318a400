use rusqlite::Connection;

use crate::error::{CrmError, Result};
use crate::models::FormField;

pub const FIELD_TYPES: &[&str] = &["text", "number", "date", "select", "textarea", "checkbox"];

fn row_to_field(row: &rusqlite::Row) -> rusqlite::Result<FormField> {
    let options: Option<String> = row.get(5)?;
    Ok(FormField {
        id: row.get(0)?,
        name: row.get(1)?,
        label: row.get(2)?,
        field_type: row.get(3)?,
        required: row.get(4)?,
        options: options
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default(),
        order_position: row.get(6)?,
    })
}

pub fn list_fields(conn: &Connection) -> Result<Vec<FormField>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, label, field_type, required, options, order_position
         FROM form_fields ORDER BY order_position, id",
    )?;
    let rows = stmt.query_map([], row_to_field)?;
    let mut fields = Vec::new();
    for field in rows {
        fields.push(field?);
    }
    Ok(fields)
}

pub fn get_field(conn: &Connection, name: &str) -> Result<FormField> {
    list_fields(conn)?
        .into_iter()
        .find(|f| f.name.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| CrmError::UnknownField(name.trim().to_string()))
}

pub fn add_field(
    conn: &Connection,
    name: &str,
    label: &str,
    field_type: &str,
    required: bool,
    options: &[String],
) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CrmError::InvalidInput("field name cannot be blank".to_string()));
    }
    if !FIELD_TYPES.contains(&field_type) {
        return Err(CrmError::InvalidInput(format!(
            "field type must be one of {}, got {field_type}",
            FIELD_TYPES.join("/")
        )));
    }
    if get_field(conn, name).is_ok() {
        return Err(CrmError::InvalidInput(format!("field already exists: {name}")));
    }
    let options_json = if options.is_empty() && field_type != "select" {
        None
    } else {
        Some(serde_json::to_string(options)?)
    };
    let next: i64 = conn.query_row(
        "SELECT COALESCE(MAX(order_position), 0) + 1 FROM form_fields",
        [],
        |row| row.get(0),
    )?;
    conn.execute(
        "INSERT INTO form_fields (name, label, field_type, required, options, order_position)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![name, label, field_type, required, options_json, next],
    )?;
    Ok(())
}

pub fn set_label(conn: &Connection, name: &str, label: &str) -> Result<()> {
    let field = get_field(conn, name)?;
    conn.execute(
        "UPDATE form_fields SET label = ?1 WHERE id = ?2",
        rusqlite::params![label, field.id],
    )?;
    Ok(())
}

pub fn set_required(conn: &Connection, name: &str, required: bool) -> Result<()> {
    let field = get_field(conn, name)?;
    conn.execute(
        "UPDATE form_fields SET required = ?1 WHERE id = ?2",
        rusqlite::params![required, field.id],
    )?;
    Ok(())
}

pub fn set_options(conn: &Connection, name: &str, options: &[String]) -> Result<()> {
    let field = get_field(conn, name)?;
    if field.field_type != "select" {
        return Err(CrmError::InvalidInput(format!(
            "only select fields take options, {} is {}",
            field.name, field.field_type
        )));
    }
    conn.execute(
        "UPDATE form_fields SET options = ?1 WHERE id = ?2",
        rusqlite::params![serde_json::to_string(options)?, field.id],
    )?;
    Ok(())
}

pub fn reorder_field(conn: &Connection, name: &str, position: i64) -> Result<()> {
    let fields = list_fields(conn)?;
    let from = fields
        .iter()
        .position(|f| f.name.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| CrmError::UnknownField(name.trim().to_string()))?;
    let to = (position.max(1) as usize).min(fields.len()) - 1;

    let mut reordered = fields;
    let field = reordered.remove(from);
    reordered.insert(to, field);
    for (i, field) in reordered.iter().enumerate() {
        conn.execute(
            "UPDATE form_fields SET order_position = ?1 WHERE id = ?2",
            rusqlite::params![(i + 1) as i64, field.id],
        )?;
    }
    Ok(())
}

pub fn remove_field(conn: &Connection, name: &str) -> Result<()> {
    let field = get_field(conn, name)?;
    conn.execute("DELETE FROM form_fields WHERE id = ?1", [field.id])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = db::get_connection(&dir.path().join("test.db")).unwrap();
        db::init_db(&conn).unwrap();
        (dir, conn)
    }

    #[test]
    fn test_seeded_intake_form() {
        let (_dir, conn) = test_db();
        let fields = list_fields(&conn).unwrap();
        assert!(fields.len() >= 10);
        assert_eq!(fields[0].name, "client_name");
        assert!(fields[0].required);
        let lp = get_field(&conn, "lead_platform").unwrap();
        assert_eq!(lp.field_type, "select");
        assert!(lp.options.contains(&"TT".to_string()));
    }

    #[test]
    fn test_add_validates_type_and_dup() {
        let (_dir, conn) = test_db();
        assert!(add_field(&conn, "gate_code", "Gate Code", "password", false, &[]).is_err());
        assert!(add_field(&conn, "client_name", "Again", "text", false, &[]).is_err());
        add_field(&conn, "gate_code", "Gate Code", "text", false, &[]).unwrap();
        let field = get_field(&conn, "gate_code").unwrap();
        assert_eq!(field.order_position, 11);
        assert!(field.options.is_empty());
    }

    #[test]
    fn test_options_only_on_selects() {
        let (_dir, conn) = test_db();
        assert!(set_options(&conn, "phone", &["a".to_string()]).is_err());
        set_options(&conn, "status", &["New Lead".to_string(), "In Progress".to_string()]).unwrap();
        assert_eq!(get_field(&conn, "status").unwrap().options.len(), 2);
    }

    #[test]
    fn test_required_toggle_and_reorder() {
        let (_dir, conn) = test_db();
        set_required(&conn, "email", true).unwrap();
        assert!(get_field(&conn, "email").unwrap().required);
        reorder_field(&conn, "notes", 1).unwrap();
        let fields = list_fields(&conn).unwrap();
        assert_eq!(fields[0].name, "notes");
        let positions: Vec<i64> = fields.iter().map(|f| f.order_position).collect();
        assert_eq!(positions, (1..=fields.len() as i64).collect::<Vec<_>>());
    }

    #[test]
    fn test_remove() {
        let (_dir, conn) = test_db();
        remove_field(&conn, "notes").unwrap();
        assert!(get_field(&conn, "notes").is_err());
        assert!(remove_field(&conn, "notes").is_err());
    }
}
