use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;

// The all_jobs table stores the spreadsheet verbatim: every sheet column is a
// TEXT column under its original header, quoted. Numeric cleanup happens on
// read (sheet::coerce_amount), never on write.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS all_jobs (
    id INTEGER PRIMARY KEY,
    "Count" TEXT,
    "Date" TEXT,
    "Client Name" TEXT,
    "Phone" TEXT,
    "Email" TEXT,
    "Address" TEXT,
    "State" TEXT,
    "Technician" TEXT,
    "Status" TEXT,
    "LP" TEXT,
    "Parts Sold" TEXT,
    "Cash" TEXT,
    "Check/Zelle" TEXT,
    "CC" TEXT,
    "CC after fee" TEXT,
    "Thumbtack" TEXT,
    "Sales" TEXT,
    "Company Parts" TEXT,
    "Tech Parts" TEXT,
    "Sales tax" TEXT,
    "CC fee" TEXT,
    "Total Costs" TEXT,
    "Tips to Technician" TEXT,
    "Gross Profit" TEXT,
    "Payout Rate" TEXT,
    "Technician Payout" TEXT,
    "Company Profit" TEXT,
    "Balance" TEXT,
    "job comission to other" TEXT,
    "Warranty" TEXT,
    "Service Call Fee" TEXT,
    "Notes" TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS technicians (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    email TEXT,
    phone TEXT,
    commission_rate REAL NOT NULL DEFAULT 0.3,
    status TEXT NOT NULL DEFAULT 'active',
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS pipeline_stages (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    color TEXT NOT NULL DEFAULT '#6B7280',
    order_position INTEGER NOT NULL DEFAULT 0,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS form_fields (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    label TEXT NOT NULL,
    field_type TEXT NOT NULL DEFAULT 'text',
    required INTEGER NOT NULL DEFAULT 0,
    options TEXT,
    order_position INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS roles (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL DEFAULT '',
    permissions TEXT NOT NULL DEFAULT '[]',
    is_system INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    role TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'active',
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS messages (
    id INTEGER PRIMARY KEY,
    sender_name TEXT NOT NULL,
    sender_type TEXT NOT NULL DEFAULT 'dispatcher',
    recipient_name TEXT NOT NULL,
    content TEXT NOT NULL,
    message_type TEXT NOT NULL DEFAULT 'text',
    is_read INTEGER NOT NULL DEFAULT 0,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS supplies (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    category TEXT NOT NULL DEFAULT 'Other',
    part_number TEXT,
    tech_price REAL NOT NULL DEFAULT 0,
    purchase_price REAL NOT NULL DEFAULT 0,
    markup_percentage REAL NOT NULL DEFAULT 0,
    stock_quantity INTEGER NOT NULL DEFAULT 0,
    min_stock_level INTEGER NOT NULL DEFAULT 0,
    supplier TEXT,
    notes TEXT,
    is_active INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS imports (
    id INTEGER PRIMARY KEY,
    filename TEXT NOT NULL,
    import_date TEXT DEFAULT (datetime('now')),
    record_count INTEGER,
    date_range_start TEXT,
    date_range_end TEXT,
    checksum TEXT
);

CREATE INDEX IF NOT EXISTS idx_all_jobs_count ON all_jobs("Count");
CREATE INDEX IF NOT EXISTS idx_all_jobs_status ON all_jobs("Status");
CREATE INDEX IF NOT EXISTS idx_messages_recipient ON messages(recipient_name);
"#;

// (name, color, order_position)
const DEFAULT_STAGES: &[(&str, &str, i64)] = &[
    ("New Lead", "#3B82F6", 1),
    ("In Progress", "#F59E0B", 2),
    ("Awaiting Parts", "#EF4444", 3),
    ("Pending Payment", "#8B5CF6", 4),
    ("Closed", "#10B981", 5),
    ("Cancelled", "#6B7280", 6),
];

// (name, label, field_type, required, options, order_position)
const DEFAULT_FORM_FIELDS: &[(&str, &str, &str, bool, Option<&str>, i64)] = &[
    ("client_name", "Client Name", "text", true, None, 1),
    ("phone", "Phone", "text", true, None, 2),
    ("email", "Email", "text", false, None, 3),
    ("address", "Address", "textarea", true, None, 4),
    ("technician", "Technician", "select", false, Some("[]"), 5),
    ("lead_platform", "Lead Platform", "select", false,
        Some(r#"["TT","AG","NX","RF","FD","PC","WS","YP","FB","GG","CB","ND","VP","NOI","LGP"]"#), 6),
    ("sales", "Sales Amount", "number", false, None, 7),
    ("status", "Status", "select", true, Some(r#"["New Lead"]"#), 8),
    ("date", "Service Date", "date", true, None, 9),
    ("notes", "Notes", "textarea", false, None, 10),
];

// (key, value)
pub const DEFAULT_SETTINGS: &[(&str, &str)] = &[
    ("commission.default_rate", "0.30"),
    ("jobs.recent_closed_days", "7"),
    ("jobs.trash_retention_days", "30"),
    ("company.name", ""),
    ("company.phone", ""),
    ("company.address", ""),
    ("company.email", ""),
    ("company.website", ""),
];

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;

    let count: i64 = conn.query_row("SELECT count(*) FROM pipeline_stages", [], |row| row.get(0))?;
    if count == 0 {
        for stage in DEFAULT_STAGES {
            conn.execute(
                "INSERT INTO pipeline_stages (name, color, order_position) VALUES (?1, ?2, ?3)",
                rusqlite::params![stage.0, stage.1, stage.2],
            )?;
        }
    }

    let count: i64 = conn.query_row("SELECT count(*) FROM form_fields", [], |row| row.get(0))?;
    if count == 0 {
        for field in DEFAULT_FORM_FIELDS {
            conn.execute(
                "INSERT INTO form_fields (name, label, field_type, required, options, order_position) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![field.0, field.1, field.2, field.3, field.4, field.5],
            )?;
        }
    }

    for (key, value) in DEFAULT_SETTINGS {
        conn.execute(
            "INSERT OR IGNORE INTO settings (key, value) VALUES (?1, ?2)",
            rusqlite::params![key, value],
        )?;
    }

    crate::permissions::seed_default_roles(conn)?;

    Ok(())
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let mut stmt = conn.prepare("SELECT value FROM settings WHERE key = ?1")?;
    let mut rows = stmt.query([key])?;
    match rows.next()? {
        Some(row) => Ok(Some(row.get(0)?)),
        None => Ok(None),
    }
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        rusqlite::params![key, value],
    )?;
    Ok(())
}

/// Numeric setting with a fallback when the key is absent or malformed.
pub fn get_setting_f64(conn: &Connection, key: &str, fallback: f64) -> Result<f64> {
    Ok(get_setting(conn, key)?
        .and_then(|v| v.trim().parse::<f64>().ok())
        .unwrap_or(fallback))
}

pub fn get_setting_i64(conn: &Connection, key: &str, fallback: i64) -> Result<i64> {
    Ok(get_setting(conn, key)?
        .and_then(|v| v.trim().parse::<i64>().ok())
        .unwrap_or(fallback))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    #[test]
    fn test_init_db_creates_tables() {
        let (_dir, conn) = test_db();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        for expected in &[
            "all_jobs", "technicians", "pipeline_stages", "form_fields",
            "settings", "roles", "users", "messages", "supplies", "imports",
        ] {
            assert!(tables.contains(&expected.to_string()), "missing table: {expected}");
        }
    }

    #[test]
    fn test_init_db_is_idempotent() {
        let (_dir, conn) = test_db();
        init_db(&conn).unwrap();
        let stages: i64 = conn.query_row("SELECT count(*) FROM pipeline_stages", [], |r| r.get(0)).unwrap();
        assert_eq!(stages, 6);
    }

    #[test]
    fn test_init_db_seeds_stages_in_order() {
        let (_dir, conn) = test_db();
        let first: String = conn.query_row(
            "SELECT name FROM pipeline_stages ORDER BY order_position LIMIT 1", [], |r| r.get(0),
        ).unwrap();
        assert_eq!(first, "New Lead");
        let color: String = conn.query_row(
            "SELECT color FROM pipeline_stages WHERE name = 'Closed'", [], |r| r.get(0),
        ).unwrap();
        assert_eq!(color, "#10B981");
    }

    #[test]
    fn test_init_db_seeds_form_fields() {
        let (_dir, conn) = test_db();
        let count: i64 = conn.query_row("SELECT count(*) FROM form_fields", [], |r| r.get(0)).unwrap();
        assert!(count >= 10, "expected at least 10 form fields, got {count}");
        let required: bool = conn.query_row(
            "SELECT required FROM form_fields WHERE name = 'client_name'", [], |r| r.get(0),
        ).unwrap();
        assert!(required);
    }

    #[test]
    fn test_settings_get_set() {
        let (_dir, conn) = test_db();
        assert_eq!(get_setting(&conn, "commission.default_rate").unwrap().as_deref(), Some("0.30"));
        set_setting(&conn, "company.name", "Swift Door Co").unwrap();
        set_setting(&conn, "company.name", "Swift Garage Door Co").unwrap();
        assert_eq!(get_setting(&conn, "company.name").unwrap().as_deref(), Some("Swift Garage Door Co"));
        assert_eq!(get_setting(&conn, "no.such.key").unwrap(), None);
    }

    #[test]
    fn test_numeric_settings_fall_back() {
        let (_dir, conn) = test_db();
        assert!((get_setting_f64(&conn, "commission.default_rate", 0.5).unwrap() - 0.30).abs() < 1e-9);
        assert_eq!(get_setting_i64(&conn, "jobs.recent_closed_days", 14).unwrap(), 7);
        set_setting(&conn, "jobs.recent_closed_days", "garbage").unwrap();
        assert_eq!(get_setting_i64(&conn, "jobs.recent_closed_days", 14).unwrap(), 14);
    }

    #[test]
    fn test_all_jobs_accepts_raw_sheet_values() {
        let (_dir, conn) = test_db();
        conn.execute(
            r#"INSERT INTO all_jobs ("Count", "Client Name", "Sales", "Status") VALUES (?1, ?2, ?3, ?4)"#,
            rusqlite::params!["101", "Maria Lopez", "$1,234.56", "Closed"],
        ).unwrap();
        let sales: String = conn.query_row(
            r#"SELECT "Sales" FROM all_jobs WHERE "Count" = '101'"#, [], |r| r.get(0),
        ).unwrap();
        assert_eq!(sales, "$1,234.56");
    }
}
