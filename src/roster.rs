use std::collections::HashMap;

use rusqlite::Connection;

use crate::error::{CrmError, Result};
use crate::models::Technician;

fn row_to_technician(row: &rusqlite::Row) -> rusqlite::Result<Technician> {
    Ok(Technician {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        commission_rate: row.get(4)?,
        status: row.get(5)?,
    })
}

pub fn list_technicians(conn: &Connection, include_inactive: bool) -> Result<Vec<Technician>> {
    let sql = if include_inactive {
        "SELECT id, name, email, phone, commission_rate, status FROM technicians ORDER BY name"
    } else {
        "SELECT id, name, email, phone, commission_rate, status FROM technicians WHERE status = 'active' ORDER BY name"
    };
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], row_to_technician)?;
    let mut technicians = Vec::new();
    for t in rows {
        technicians.push(t?);
    }
    Ok(technicians)
}

pub fn get_technician(conn: &Connection, name: &str) -> Result<Technician> {
    let mut stmt = conn.prepare(
        "SELECT id, name, email, phone, commission_rate, status FROM technicians WHERE name = ?1 COLLATE NOCASE",
    )?;
    let mut rows = stmt.query([name.trim()])?;
    match rows.next()? {
        Some(row) => Ok(row_to_technician(row)?),
        None => Err(CrmError::UnknownTechnician(name.trim().to_string())),
    }
}

fn validate_rate(rate: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&rate) {
        return Err(CrmError::InvalidInput(format!(
            "commission rate must be between 0 and 1, got {rate}"
        )));
    }
    Ok(rate)
}

pub fn add_technician(
    conn: &Connection,
    name: &str,
    email: Option<&str>,
    phone: Option<&str>,
    commission_rate: f64,
) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CrmError::InvalidInput("technician name cannot be blank".to_string()));
    }
    if get_technician(conn, name).is_ok() {
        return Err(CrmError::InvalidInput(format!("technician already exists: {name}")));
    }
    let rate = validate_rate(commission_rate)?;
    conn.execute(
        "INSERT INTO technicians (name, email, phone, commission_rate) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![name, email, phone, rate],
    )?;
    Ok(())
}

pub fn set_commission_rate(conn: &Connection, name: &str, rate: f64) -> Result<()> {
    let technician = get_technician(conn, name)?;
    let rate = validate_rate(rate)?;
    conn.execute(
        "UPDATE technicians SET commission_rate = ?1 WHERE id = ?2",
        rusqlite::params![rate, technician.id],
    )?;
    Ok(())
}

pub fn set_contact(conn: &Connection, name: &str, email: Option<&str>, phone: Option<&str>) -> Result<()> {
    let technician = get_technician(conn, name)?;
    if let Some(email) = email {
        conn.execute(
            "UPDATE technicians SET email = ?1 WHERE id = ?2",
            rusqlite::params![email, technician.id],
        )?;
    }
    if let Some(phone) = phone {
        conn.execute(
            "UPDATE technicians SET phone = ?1 WHERE id = ?2",
            rusqlite::params![phone, technician.id],
        )?;
    }
    Ok(())
}

pub fn set_status(conn: &Connection, name: &str, status: &str) -> Result<()> {
    if status != "active" && status != "inactive" {
        return Err(CrmError::InvalidInput(format!("status must be active or inactive, got {status}")));
    }
    let technician = get_technician(conn, name)?;
    conn.execute(
        "UPDATE technicians SET status = ?1 WHERE id = ?2",
        rusqlite::params![status, technician.id],
    )?;
    Ok(())
}

pub fn remove_technician(conn: &Connection, name: &str) -> Result<()> {
    let technician = get_technician(conn, name)?;
    conn.execute("DELETE FROM technicians WHERE id = ?1", [technician.id])?;
    Ok(())
}

/// Commission rates for every rostered technician, active or not; attribution
/// cares about the rate on record, not roster status.
pub fn commission_rates(conn: &Connection) -> Result<HashMap<String, f64>> {
    let mut stmt = conn.prepare("SELECT name, commission_rate FROM technicians")?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?)))?;
    let mut rates = HashMap::new();
    for row in rows {
        let (name, rate) = row?;
        rates.insert(name, rate);
    }
    Ok(rates)
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
    fn test_add_and_get() {
        let (_dir, conn) = test_db();
        add_technician(&conn, "Dan", Some("dan@example.com"), None, 0.5).unwrap();
        let dan = get_technician(&conn, "dan").unwrap();
        assert_eq!(dan.name, "Dan");
        assert!((dan.commission_rate - 0.5).abs() < f64::EPSILON);
        assert_eq!(dan.status, "active");
    }

    #[test]
    fn test_duplicate_and_blank_names_rejected() {
        let (_dir, conn) = test_db();
        add_technician(&conn, "Dan", None, None, 0.5).unwrap();
        assert!(add_technician(&conn, " dan ", None, None, 0.3).is_err());
        assert!(add_technician(&conn, "   ", None, None, 0.3).is_err());
    }

    #[test]
    fn test_rate_validation() {
        let (_dir, conn) = test_db();
        assert!(add_technician(&conn, "Dan", None, None, 1.5).is_err());
        assert!(add_technician(&conn, "Dan", None, None, -0.1).is_err());
        add_technician(&conn, "Dan", None, None, 0.5).unwrap();
        assert!(set_commission_rate(&conn, "Dan", 2.0).is_err());
        set_commission_rate(&conn, "Dan", 0.35).unwrap();
        assert!((get_technician(&conn, "Dan").unwrap().commission_rate - 0.35).abs() < f64::EPSILON);
    }

    #[test]
    fn test_inactive_filtered_from_default_list() {
        let (_dir, conn) = test_db();
        add_technician(&conn, "Dan", None, None, 0.5).unwrap();
        add_technician(&conn, "Ben", None, None, 0.5).unwrap();
        set_status(&conn, "Ben", "inactive").unwrap();
        assert_eq!(list_technicians(&conn, false).unwrap().len(), 1);
        assert_eq!(list_technicians(&conn, true).unwrap().len(), 2);
        assert!(set_status(&conn, "Dan", "retired").is_err());
    }

    #[test]
    fn test_commission_rates_include_inactive() {
        let (_dir, conn) = test_db();
        add_technician(&conn, "Dan", None, None, 0.5).unwrap();
        add_technician(&conn, "Rookie", None, None, 0.3).unwrap();
        set_status(&conn, "Rookie", "inactive").unwrap();
        let rates = commission_rates(&conn).unwrap();
        assert_eq!(rates.len(), 2);
        assert!((rates["Dan"] - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_remove_unknown() {
        let (_dir, conn) = test_db();
        assert!(remove_technician(&conn, "Ghost").is_err());
    }
}
