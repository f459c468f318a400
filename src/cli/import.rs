use std::path::PathBuf;

use crate::db::get_connection;
use crate::error::Result;
use crate::importer::import_file;
use crate::settings::db_path;

pub fn run(file: &str, format: Option<&str>, force: bool) -> Result<()> {
    let file_path = PathBuf::from(file);
    let conn = get_connection(&db_path())?;

    let result = import_file(&conn, &file_path, format, force)?;

    if result.duplicate_file {
        println!("This file has already been imported (duplicate checksum). Use --force to import anyway.");
        return Ok(());
    }

    println!("{} imported, {} skipped (duplicates)", result.imported, result.skipped);

    if let (Some(start), Some(end)) = (&result.date_start, &result.date_end) {
        println!("Date range: {start} to {end}");
    }

    if !result.unknown_headers.is_empty() {
        println!("Ignored unknown columns: {}", result.unknown_headers.join(", "));
    }

    Ok(())
}
