use crate::db::{get_connection, get_setting, get_setting_i64};
use crate::error::Result;
use crate::fmt::format_bytes;
use crate::settings::load_settings;

pub fn run() -> Result<()> {
    let settings = load_settings();
    let data_dir = std::path::PathBuf::from(&settings.data_dir);
    let db_path = data_dir.join("overhead.db");

    println!("User:       {}", if settings.user_name.is_empty() { "(not set)" } else { &settings.user_name });
    println!("Data dir:   {}", data_dir.display());
    println!("Database:   {}", db_path.display());

    if db_path.exists() {
        let size = std::fs::metadata(&db_path)?.len();
        println!("DB size:    {}", format_bytes(size));

        let conn = get_connection(&db_path)?;

        let company = get_setting(&conn, "company.name")?.unwrap_or_default();
        println!("Company:    {}", if company.is_empty() { "(not set)" } else { &company });

        let jobs: i64 = conn.query_row(
            "SELECT count(*) FROM all_jobs WHERE COALESCE(trim(\"Status\"), '') != 'Deleted'",
            [],
            |r| r.get(0),
        )?;
        let trashed: i64 = conn.query_row(
            "SELECT count(*) FROM all_jobs WHERE trim(\"Status\") = 'Deleted'",
            [],
            |r| r.get(0),
        )?;
        let technicians: i64 = conn.query_row(
            "SELECT count(*) FROM technicians WHERE status = 'active'",
            [],
            |r| r.get(0),
        )?;
        let stages: i64 = conn.query_row("SELECT count(*) FROM pipeline_stages", [], |r| r.get(0))?;
        let users: i64 = conn.query_row("SELECT count(*) FROM users", [], |r| r.get(0))?;
        let unread: i64 = conn.query_row(
            "SELECT count(*) FROM messages WHERE is_read = 0",
            [],
            |r| r.get(0),
        )?;
        let supplies: i64 = conn.query_row(
            "SELECT count(*) FROM supplies WHERE is_active = 1",
            [],
            |r| r.get(0),
        )?;

        println!();
        println!("Jobs:         {jobs}");
        println!("In trash:     {trashed}");
        println!("Technicians:  {technicians}");
        println!("Stages:       {stages}");
        println!("Users:        {users}");
        println!("Unread msgs:  {unread}");
        println!("Supplies:     {supplies}");

        let last_import: Option<(String, String)> = conn
            .query_row(
                "SELECT filename, import_date FROM imports ORDER BY id DESC LIMIT 1",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .ok();
        if let Some((filename, date)) = last_import {
            println!();
            println!("Last import:  {filename} ({date})");
        }

        // Trashed rows past the retention window are safe to purge.
        let retention = get_setting_i64(&conn, "jobs.trash_retention_days", 30)?;
        let stale: i64 = conn.query_row(
            "SELECT count(*) FROM all_jobs WHERE trim(\"Status\") = 'Deleted'
             AND created_at < datetime('now', ?1)",
            [format!("-{retention} days")],
            |r| r.get(0),
        )?;
        if stale > 0 {
            println!();
            println!("{stale} trashed job(s) older than {retention} days. Purge with `overhead jobs purge <count>`.");
        }
    } else {
        println!();
        println!("Database not found. Run `overhead init` to set up.");
    }

    Ok(())
}
