use std::path::PathBuf;

use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::settings::{load_settings, save_settings, settings_file_exists, shellexpand_path};

pub fn run(data_dir: Option<String>) -> Result<()> {
    let first_run = !settings_file_exists();
    let mut settings = load_settings();
    let chose_dir = data_dir.is_some();
    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    }

    let data_dir = PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(&data_dir)?;
    std::fs::create_dir_all(data_dir.join("exports"))?;
    std::fs::create_dir_all(data_dir.join("backups"))?;

    let db_path = data_dir.join("overhead.db");
    let conn = get_connection(&db_path)?;
    init_db(&conn)?;

    save_settings(&settings)?;

    println!("Data directory: {}", data_dir.display());
    println!("Database:       {}", db_path.display());
    if first_run && !chose_dir {
        println!("Using the default data directory. Pass --data-dir to choose another.");
    }
    println!();
    println!("Try these next:");
    println!("  overhead demo");
    println!("  overhead jobs list");
    println!("  overhead board");
    println!("  overhead dashboard");
    Ok(())
}
