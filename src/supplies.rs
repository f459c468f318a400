use rusqlite::Connection;

use crate::error::{CrmError, Result};
use crate::models::Supply;

pub const CATEGORIES: &[&str] = &[
    "Springs",
    "Openers",
    "Hardware",
    "Weather Stripping",
    "Safety",
    "Security",
    "Tools",
    "Other",
];

fn row_to_supply(row: &rusqlite::Row) -> rusqlite::Result<Supply> {
    Ok(Supply {
        id: row.get(0)?,
        name: row.get(1)?,
        category: row.get(2)?,
        part_number: row.get(3)?,
        tech_price: row.get(4)?,
        purchase_price: row.get(5)?,
        markup_percentage: row.get(6)?,
        stock_quantity: row.get(7)?,
        min_stock_level: row.get(8)?,
        supplier: row.get(9)?,
        notes: row.get(10)?,
        is_active: row.get(11)?,
    })
}

const SELECT: &str = "SELECT id, name, category, part_number, tech_price, purchase_price,
    markup_percentage, stock_quantity, min_stock_level, supplier, notes, is_active FROM supplies";

pub fn list_supplies(
    conn: &Connection,
    include_inactive: bool,
    category: Option<&str>,
) -> Result<Vec<Supply>> {
    let mut supplies = Vec::new();
    let sql = format!("{SELECT} ORDER BY category, name");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], row_to_supply)?;
    for supply in rows {
        let supply = supply?;
        if !include_inactive && !supply.is_active {
            continue;
        }
        if let Some(category) = category {
            if !supply.category.eq_ignore_ascii_case(category) {
                continue;
            }
        }
        supplies.push(supply);
    }
    Ok(supplies)
}

pub fn get_supply(conn: &Connection, name: &str) -> Result<Supply> {
    let sql = format!("{SELECT} WHERE name = ?1 COLLATE NOCASE");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([name.trim()])?;
    match rows.next()? {
        Some(row) => Ok(row_to_supply(row)?),
        None => Err(CrmError::UnknownSupply(name.trim().to_string())),
    }
}

fn canonical_category(category: &str) -> Result<&'static str> {
    CATEGORIES
        .iter()
        .find(|c| c.eq_ignore_ascii_case(category.trim()))
        .copied()
        .ok_or_else(|| {
            CrmError::InvalidInput(format!(
                "category must be one of {}, got {}",
                CATEGORIES.join("/"),
                category.trim()
            ))
        })
}

#[allow(clippy::too_many_arguments)]
pub fn add_supply(
    conn: &Connection,
    name: &str,
    category: &str,
    part_number: Option<&str>,
    purchase_price: f64,
    markup_percentage: f64,
    tech_price: Option<f64>,
    stock_quantity: i64,
    min_stock_level: i64,
    supplier: Option<&str>,
) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CrmError::InvalidInput("supply name cannot be blank".to_string()));
    }
    if get_supply(conn, name).is_ok() {
        return Err(CrmError::InvalidInput(format!("supply already exists: {name}")));
    }
    let category = canonical_category(category)?;
    // Tech price defaults to purchase price plus markup.
    let tech_price = tech_price.unwrap_or(purchase_price * (1.0 + markup_percentage / 100.0));
    conn.execute(
        "INSERT INTO supplies (name, category, part_number, tech_price, purchase_price,
            markup_percentage, stock_quantity, min_stock_level, supplier)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        rusqlite::params![
            name,
            category,
            part_number,
            tech_price,
            purchase_price,
            markup_percentage,
            stock_quantity.max(0),
            min_stock_level.max(0),
            supplier
        ],
    )?;
    Ok(())
}

/// Stock movement by a signed delta; stock never goes below zero.
pub fn adjust_stock(conn: &Connection, name: &str, delta: i64) -> Result<i64> {
    let supply = get_supply(conn, name)?;
    let new_quantity = (supply.stock_quantity + delta).max(0);
    conn.execute(
        "UPDATE supplies SET stock_quantity = ?1 WHERE id = ?2",
        rusqlite::params![new_quantity, supply.id],
    )?;
    Ok(new_quantity)
}

pub fn set_prices(conn: &Connection, name: &str, purchase_price: f64, markup_percentage: f64) -> Result<()> {
    let supply = get_supply(conn, name)?;
    let tech_price = purchase_price * (1.0 + markup_percentage / 100.0);
    conn.execute(
        "UPDATE supplies SET purchase_price = ?1, markup_percentage = ?2, tech_price = ?3 WHERE id = ?4",
        rusqlite::params![purchase_price, markup_percentage, tech_price, supply.id],
    )?;
    Ok(())
}

pub fn set_min_stock(conn: &Connection, name: &str, min_stock_level: i64) -> Result<()> {
    let supply = get_supply(conn, name)?;
    conn.execute(
        "UPDATE supplies SET min_stock_level = ?1 WHERE id = ?2",
        rusqlite::params![min_stock_level.max(0), supply.id],
    )?;
    Ok(())
}

pub fn set_active(conn: &Connection, name: &str, is_active: bool) -> Result<()> {
    let supply = get_supply(conn, name)?;
    conn.execute(
        "UPDATE supplies SET is_active = ?1 WHERE id = ?2",
        rusqlite::params![is_active, supply.id],
    )?;
    Ok(())
}

/// Active items at or below their reorder point.
pub fn low_stock(conn: &Connection) -> Result<Vec<Supply>> {
    Ok(list_supplies(conn, false, None)?
        .into_iter()
        .filter(|s| s.stock_quantity <= s.min_stock_level)
        .collect())
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

    fn add_spring(conn: &Connection) {
        add_supply(conn, "Torsion Spring 2x32", "Springs", Some("TS-232"), 45.0, 60.0, None, 12, 4, Some("DoorPro Supply")).unwrap();
    }

    #[test]
    fn test_add_defaults_tech_price_from_markup() {
        let (_dir, conn) = test_db();
        add_spring(&conn);
        let spring = get_supply(&conn, "torsion spring 2x32").unwrap();
        assert!((spring.tech_price - 72.0).abs() < 1e-9);
        assert_eq!(spring.category, "Springs");
        assert_eq!(spring.stock_quantity, 12);
    }

    #[test]
    fn test_category_validation() {
        let (_dir, conn) = test_db();
        assert!(add_supply(&conn, "Widget", "Gadgets", None, 1.0, 0.0, None, 0, 0, None).is_err());
        add_supply(&conn, "Widget", "other", None, 1.0, 0.0, Some(2.5), 0, 0, None).unwrap();
        let widget = get_supply(&conn, "Widget").unwrap();
        assert_eq!(widget.category, "Other");
        assert!((widget.tech_price - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_adjust_stock_floors_at_zero() {
        let (_dir, conn) = test_db();
        add_spring(&conn);
        assert_eq!(adjust_stock(&conn, "Torsion Spring 2x32", -5).unwrap(), 7);
        assert_eq!(adjust_stock(&conn, "Torsion Spring 2x32", -100).unwrap(), 0);
        assert_eq!(adjust_stock(&conn, "Torsion Spring 2x32", 3).unwrap(), 3);
        assert!(adjust_stock(&conn, "Ghost Part", 1).is_err());
    }

    #[test]
    fn test_low_stock_report() {
        let (_dir, conn) = test_db();
        add_spring(&conn);
        add_supply(&conn, "Remote", "Openers", None, 12.0, 50.0, None, 1, 5, None).unwrap();
        add_supply(&conn, "Retired Rail", "Hardware", None, 5.0, 0.0, None, 0, 2, None).unwrap();
        set_active(&conn, "Retired Rail", false).unwrap();

        let low = low_stock(&conn).unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].name, "Remote");
    }

    #[test]
    fn test_list_filters() {
        let (_dir, conn) = test_db();
        add_spring(&conn);
        add_supply(&conn, "Remote", "Openers", None, 12.0, 50.0, None, 1, 5, None).unwrap();
        set_active(&conn, "Remote", false).unwrap();
        assert_eq!(list_supplies(&conn, false, None).unwrap().len(), 1);
        assert_eq!(list_supplies(&conn, true, None).unwrap().len(), 2);
        assert_eq!(list_supplies(&conn, true, Some("openers")).unwrap().len(), 1);
    }

    #[test]
    fn test_set_prices_recomputes_tech_price() {
        let (_dir, conn) = test_db();
        add_spring(&conn);
        set_prices(&conn, "Torsion Spring 2x32", 50.0, 40.0).unwrap();
        let spring = get_supply(&conn, "Torsion Spring 2x32").unwrap();
        assert!((spring.tech_price - 70.0).abs() < 1e-9);
    }
}
