use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::money;
use crate::settings::db_path;
use crate::supplies;

pub fn list(all: bool, category: Option<&str>) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let supplies = supplies::list_supplies(&conn, all, category)?;

    if supplies.is_empty() {
        println!("No supplies on file.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Name", "Category", "Part #", "Purchase", "Tech Price", "Stock", "Min", ""]);
    for supply in &supplies {
        let stock = if supply.stock_quantity <= supply.min_stock_level {
            Cell::new(supply.stock_quantity.to_string().red())
        } else {
            Cell::new(supply.stock_quantity)
        };
        table.add_row(vec![
            Cell::new(&supply.name),
            Cell::new(&supply.category),
            Cell::new(supply.part_number.as_deref().unwrap_or("")),
            Cell::new(money(supply.purchase_price)),
            Cell::new(money(supply.tech_price)),
            stock,
            Cell::new(supply.min_stock_level),
            Cell::new(if supply.is_active { "" } else { "retired" }),
        ]);
    }
    println!("{table}");
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn add(
    name: &str,
    category: &str,
    part_number: Option<&str>,
    purchase_price: f64,
    markup: f64,
    tech_price: Option<f64>,
    stock: i64,
    min_stock: i64,
    supplier: Option<&str>,
) -> Result<()> {
    let conn = get_connection(&db_path())?;
    supplies::add_supply(
        &conn,
        name,
        category,
        part_number,
        purchase_price,
        markup,
        tech_price,
        stock,
        min_stock,
        supplier,
    )?;
    let supply = supplies::get_supply(&conn, name)?;
    println!(
        "Added {} ({}) at {} tech price",
        supply.name.bold(),
        supply.category,
        money(supply.tech_price)
    );
    Ok(())
}

pub fn adjust(name: &str, delta: i64) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let level = supplies::adjust_stock(&conn, name, delta)?;
    let supply = supplies::get_supply(&conn, name)?;
    if level <= supply.min_stock_level {
        println!("{}: stock now {} {}", supply.name.bold(), level, "(below minimum)".red());
    } else {
        println!("{}: stock now {level}", supply.name.bold());
    }
    Ok(())
}

pub fn prices(name: &str, purchase_price: f64, markup: f64) -> Result<()> {
    let conn = get_connection(&db_path())?;
    supplies::set_prices(&conn, name, purchase_price, markup)?;
    let supply = supplies::get_supply(&conn, name)?;
    println!(
        "{}: {} purchase, {:.0}% markup, {} tech price",
        supply.name.bold(),
        money(supply.purchase_price),
        supply.markup_percentage,
        money(supply.tech_price)
    );
    Ok(())
}

pub fn min_stock(name: &str, level: i64) -> Result<()> {
    let conn = get_connection(&db_path())?;
    supplies::set_min_stock(&conn, name, level)?;
    println!("{}: reorder point now {level}", name.trim().bold());
    Ok(())
}

pub fn retire(name: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    supplies::set_active(&conn, name, false)?;
    println!("{} retired from the catalog", name.trim().bold());
    Ok(())
}

pub fn restore(name: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    supplies::set_active(&conn, name, true)?;
    println!("{} back in the catalog", name.trim().bold());
    Ok(())
}

pub fn low() -> Result<()> {
    let conn = get_connection(&db_path())?;
    let supplies = supplies::low_stock(&conn)?;
    if supplies.is_empty() {
        println!("Nothing running low.");
        return Ok(());
    }
    let mut table = Table::new();
    table.set_header(vec!["Name", "Category", "Stock", "Min", "Supplier"]);
    for supply in &supplies {
        table.add_row(vec![
            Cell::new(&supply.name),
            Cell::new(&supply.category),
            Cell::new(supply.stock_quantity.to_string().red()),
            Cell::new(supply.min_stock_level),
            Cell::new(supply.supplier.as_deref().unwrap_or("")),
        ]);
    }
    println!("{table}");
    println!("{} item(s) at or below their reorder point", supplies.len());
    Ok(())
}
