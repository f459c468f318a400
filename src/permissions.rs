use rusqlite::Connection;

use crate::error::{CrmError, Result};
use crate::models::{Role, User};

// ---------------------------------------------------------------------------
// Permission catalog
// ---------------------------------------------------------------------------

// (key, label, category)
pub const PERMISSIONS: &[(&str, &str, &str)] = &[
    ("dashboard.view", "View dashboard", "Dashboard"),
    ("dashboard.analytics", "View analytics", "Dashboard"),
    ("jobs.view", "View jobs", "Jobs"),
    ("jobs.create", "Create jobs", "Jobs"),
    ("jobs.edit", "Edit jobs", "Jobs"),
    ("jobs.delete", "Delete jobs", "Jobs"),
    ("jobs.assign", "Assign technicians", "Jobs"),
    ("jobs.pricing", "View and edit pricing", "Jobs"),
    ("customers.view", "View customers", "Customers"),
    ("customers.create", "Create customers", "Customers"),
    ("customers.edit", "Edit customers", "Customers"),
    ("customers.delete", "Delete customers", "Customers"),
    ("technicians.view", "View technicians", "Technicians"),
    ("technicians.create", "Add technicians", "Technicians"),
    ("technicians.edit", "Edit technicians", "Technicians"),
    ("technicians.delete", "Remove technicians", "Technicians"),
    ("technicians.commissions", "Manage commission rates", "Technicians"),
    ("pipeline.view", "View pipeline", "Pipeline"),
    ("pipeline.edit", "Move jobs between stages", "Pipeline"),
    ("pipeline.configure", "Configure stages", "Pipeline"),
    ("messages.view", "View messages", "Messages"),
    ("messages.send", "Send messages", "Messages"),
    ("messages.broadcast", "Broadcast to all technicians", "Messages"),
    ("settings.view", "View settings", "Settings"),
    ("settings.company", "Edit company profile", "Settings"),
    ("settings.forms", "Configure form fields", "Settings"),
    ("settings.pipeline", "Configure pipeline defaults", "Settings"),
    ("settings.import", "Import spreadsheets", "Settings"),
    ("settings.permissions", "Manage roles and permissions", "Settings"),
    ("users.view", "View users", "Users"),
    ("users.create", "Create users", "Users"),
    ("users.edit", "Edit users", "Users"),
    ("users.delete", "Remove users", "Users"),
    ("users.permissions", "Change user roles", "Users"),
];

pub fn all_permission_keys() -> Vec<String> {
    PERMISSIONS.iter().map(|(key, _, _)| key.to_string()).collect()
}

pub fn is_known_permission(key: &str) -> bool {
    PERMISSIONS.iter().any(|(k, _, _)| *k == key)
}

fn validate_keys(keys: &[String]) -> Result<()> {
    for key in keys {
        if !is_known_permission(key) {
            return Err(CrmError::UnknownPermission(key.clone()));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Default roles
// ---------------------------------------------------------------------------

fn dispatcher_permissions() -> Vec<String> {
    [
        "dashboard.view",
        "jobs.view",
        "jobs.create",
        "jobs.edit",
        "jobs.assign",
        "customers.view",
        "customers.create",
        "customers.edit",
        "technicians.view",
        "pipeline.view",
        "pipeline.edit",
        "messages.view",
        "messages.send",
        "messages.broadcast",
        "settings.view",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn technician_permissions() -> Vec<String> {
    [
        "dashboard.view",
        "jobs.view",
        "jobs.edit",
        "customers.view",
        "pipeline.view",
        "messages.view",
        "messages.send",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Seed the four stock roles once. They are system rows: editable, never
/// deletable.
pub fn seed_default_roles(conn: &Connection) -> Result<()> {
    let count: i64 = conn.query_row("SELECT count(*) FROM roles", [], |row| row.get(0))?;
    if count > 0 {
        return Ok(());
    }

    let admin: Vec<String> = all_permission_keys()
        .into_iter()
        .filter(|k| k != "settings.permissions" && k != "users.permissions")
        .collect();
    let defaults: Vec<(&str, &str, Vec<String>)> = vec![
        ("owner", "Full access to everything", all_permission_keys()),
        ("admin", "Everything except permission management", admin),
        ("dispatcher", "Day-to-day job and customer workflow", dispatcher_permissions()),
        ("technician", "Own jobs and messaging", technician_permissions()),
    ];
    for (name, description, permissions) in defaults {
        conn.execute(
            "INSERT INTO roles (name, description, permissions, is_system) VALUES (?1, ?2, ?3, 1)",
            rusqlite::params![name, description, serde_json::to_string(&permissions)?],
        )?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Stores
// ---------------------------------------------------------------------------

pub trait RoleStore {
    fn list_roles(&self) -> Result<Vec<Role>>;
    fn get_role(&self, name: &str) -> Result<Role>;
    fn add_role(&self, name: &str, description: &str, permissions: &[String]) -> Result<()>;
    fn set_permissions(&self, name: &str, permissions: &[String]) -> Result<()>;
    fn remove_role(&self, name: &str) -> Result<()>;
}

pub trait UserStore {
    fn list_users(&self) -> Result<Vec<User>>;
    fn get_user(&self, email: &str) -> Result<User>;
    fn add_user(&self, name: &str, email: &str, role: &str) -> Result<()>;
    fn set_role(&self, email: &str, role: &str) -> Result<()>;
    fn set_status(&self, email: &str, status: &str) -> Result<()>;
    fn remove_user(&self, email: &str) -> Result<()>;
}

pub struct SqliteRoleStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteRoleStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

fn row_to_role(row: &rusqlite::Row) -> rusqlite::Result<Role> {
    let permissions: String = row.get(3)?;
    Ok(Role {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        permissions: serde_json::from_str(&permissions).unwrap_or_default(),
        is_system: row.get(4)?,
    })
}

impl RoleStore for SqliteRoleStore<'_> {
    fn list_roles(&self) -> Result<Vec<Role>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description, permissions, is_system FROM roles ORDER BY is_system DESC, name",
        )?;
        let rows = stmt.query_map([], row_to_role)?;
        let mut roles = Vec::new();
        for role in rows {
            roles.push(role?);
        }
        Ok(roles)
    }

    fn get_role(&self, name: &str) -> Result<Role> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description, permissions, is_system FROM roles WHERE name = ?1 COLLATE NOCASE",
        )?;
        let mut rows = stmt.query([name.trim()])?;
        match rows.next()? {
            Some(row) => Ok(row_to_role(row)?),
            None => Err(CrmError::UnknownRole(name.trim().to_string())),
        }
    }

    fn add_role(&self, name: &str, description: &str, permissions: &[String]) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CrmError::InvalidInput("role name cannot be blank".to_string()));
        }
        if self.get_role(name).is_ok() {
            return Err(CrmError::InvalidInput(format!("role already exists: {name}")));
        }
        validate_keys(permissions)?;
        self.conn.execute(
            "INSERT INTO roles (name, description, permissions, is_system) VALUES (?1, ?2, ?3, 0)",
            rusqlite::params![name, description, serde_json::to_string(permissions)?],
        )?;
        Ok(())
    }

    fn set_permissions(&self, name: &str, permissions: &[String]) -> Result<()> {
        let role = self.get_role(name)?;
        validate_keys(permissions)?;
        self.conn.execute(
            "UPDATE roles SET permissions = ?1 WHERE id = ?2",
            rusqlite::params![serde_json::to_string(permissions)?, role.id],
        )?;
        Ok(())
    }

    fn remove_role(&self, name: &str) -> Result<()> {
        let role = self.get_role(name)?;
        if role.is_system {
            return Err(CrmError::SystemRole(role.name));
        }
        self.conn.execute("DELETE FROM roles WHERE id = ?1", [role.id])?;
        Ok(())
    }
}

pub struct SqliteUserStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteUserStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        role: row.get(3)?,
        status: row.get(4)?,
    })
}

impl UserStore for SqliteUserStore<'_> {
    fn list_users(&self) -> Result<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, email, role, status FROM users ORDER BY name")?;
        let rows = stmt.query_map([], row_to_user)?;
        let mut users = Vec::new();
        for user in rows {
            users.push(user?);
        }
        Ok(users)
    }

    fn get_user(&self, email: &str) -> Result<User> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, email, role, status FROM users WHERE email = ?1 COLLATE NOCASE",
        )?;
        let mut rows = stmt.query([email.trim()])?;
        match rows.next()? {
            Some(row) => Ok(row_to_user(row)?),
            None => Err(CrmError::UnknownUser(email.trim().to_string())),
        }
    }

    fn add_user(&self, name: &str, email: &str, role: &str) -> Result<()> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(CrmError::InvalidInput(format!("not an email address: {email}")));
        }
        if self.get_user(email).is_ok() {
            return Err(CrmError::InvalidInput(format!("user already exists: {email}")));
        }
        let role = SqliteRoleStore::new(self.conn).get_role(role)?;
        self.conn.execute(
            "INSERT INTO users (name, email, role) VALUES (?1, ?2, ?3)",
            rusqlite::params![name.trim(), email, role.name],
        )?;
        Ok(())
    }

    fn set_role(&self, email: &str, role: &str) -> Result<()> {
        let user = self.get_user(email)?;
        let role = SqliteRoleStore::new(self.conn).get_role(role)?;
        self.conn.execute(
            "UPDATE users SET role = ?1 WHERE id = ?2",
            rusqlite::params![role.name, user.id],
        )?;
        Ok(())
    }

    fn set_status(&self, email: &str, status: &str) -> Result<()> {
        if status != "active" && status != "inactive" {
            return Err(CrmError::InvalidInput(format!("status must be active or inactive, got {status}")));
        }
        let user = self.get_user(email)?;
        self.conn.execute(
            "UPDATE users SET status = ?1 WHERE id = ?2",
            rusqlite::params![status, user.id],
        )?;
        Ok(())
    }

    fn remove_user(&self, email: &str) -> Result<()> {
        let user = self.get_user(email)?;
        self.conn.execute("DELETE FROM users WHERE id = ?1", [user.id])?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Checks
// ---------------------------------------------------------------------------

/// Owner-role users pass every check, known key or not. Everyone else needs
/// the key in their role's permission set; a user whose role has gone missing
/// has no permissions at all.
pub fn has_permission(roles: &dyn RoleStore, user: &User, key: &str) -> bool {
    if user.role.eq_ignore_ascii_case("owner") {
        return true;
    }
    match roles.get_role(&user.role) {
        Ok(role) => role.permissions.iter().any(|p| p == key),
        Err(_) => false,
    }
}

pub fn grant(roles: &dyn RoleStore, role_name: &str, key: &str) -> Result<()> {
    if !is_known_permission(key) {
        return Err(CrmError::UnknownPermission(key.to_string()));
    }
    let role = roles.get_role(role_name)?;
    let mut permissions = role.permissions;
    if !permissions.iter().any(|p| p == key) {
        permissions.push(key.to_string());
    }
    roles.set_permissions(role_name, &permissions)
}

pub fn revoke(roles: &dyn RoleStore, role_name: &str, key: &str) -> Result<()> {
    let role = roles.get_role(role_name)?;
    let permissions: Vec<String> = role.permissions.into_iter().filter(|p| p != key).collect();
    roles.set_permissions(role_name, &permissions)
}
