use regex::Regex;
use rusqlite::Connection;

use crate::error::{CrmError, Result};
use crate::models::PipelineStage;

fn valid_color(color: &str) -> bool {
    Regex::new(r"^#[0-9a-fA-F]{6}$")
        .map(|re| re.is_match(color))
        .unwrap_or(false)
}

/// All stages, deduplicated by case-insensitive name (highest id wins, the
/// sheet import era left duplicates behind) and sorted by order_position.
pub fn list_stages(conn: &Connection) -> Result<Vec<PipelineStage>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, color, order_position FROM pipeline_stages ORDER BY id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(PipelineStage {
            id: row.get(0)?,
            name: row.get(1)?,
            color: row.get(2)?,
            order_position: row.get(3)?,
        })
    })?;

    let mut deduped: Vec<PipelineStage> = Vec::new();
    for stage in rows {
        let stage = stage?;
        if let Some(existing) = deduped
            .iter_mut()
            .find(|s| s.name.eq_ignore_ascii_case(&stage.name))
        {
            *existing = stage;
        } else {
            deduped.push(stage);
        }
    }
    deduped.sort_by(|a, b| {
        a.order_position.cmp(&b.order_position).then_with(|| a.id.cmp(&b.id))
    });
    Ok(deduped)
}

pub fn get_stage(conn: &Connection, name: &str) -> Result<PipelineStage> {
    list_stages(conn)?
        .into_iter()
        .find(|s| s.name.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| CrmError::UnknownStage(name.trim().to_string()))
}

pub fn add_stage(conn: &Connection, name: &str, color: Option<&str>) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CrmError::InvalidInput("stage name cannot be blank".to_string()));
    }
    if get_stage(conn, name).is_ok() {
        return Err(CrmError::StageExists(name.to_string()));
    }
    let color = color.unwrap_or("#6B7280");
    if !valid_color(color) {
        return Err(CrmError::InvalidInput(format!("color must look like #RRGGBB, got {color}")));
    }
    let next: i64 = conn.query_row(
        "SELECT COALESCE(MAX(order_position), 0) + 1 FROM pipeline_stages",
        [],
        |row| row.get(0),
    )?;
    conn.execute(
        "INSERT INTO pipeline_stages (name, color, order_position) VALUES (?1, ?2, ?3)",
        rusqlite::params![name, color, next],
    )?;
    Ok(())
}

pub fn rename_stage(conn: &Connection, name: &str, new_name: &str) -> Result<()> {
    let stage = get_stage(conn, name)?;
    let new_name = new_name.trim();
    if new_name.is_empty() {
        return Err(CrmError::InvalidInput("stage name cannot be blank".to_string()));
    }
    if !new_name.eq_ignore_ascii_case(&stage.name) && get_stage(conn, new_name).is_ok() {
        return Err(CrmError::StageExists(new_name.to_string()));
    }
    conn.execute(
        "UPDATE pipeline_stages SET name = ?1 WHERE id = ?2",
        rusqlite::params![new_name, stage.id],
    )?;
    Ok(())
}

pub fn set_color(conn: &Connection, name: &str, color: &str) -> Result<()> {
    let stage = get_stage(conn, name)?;
    if !valid_color(color) {
        return Err(CrmError::InvalidInput(format!("color must look like #RRGGBB, got {color}")));
    }
    conn.execute(
        "UPDATE pipeline_stages SET color = ?1 WHERE id = ?2",
        rusqlite::params![color, stage.id],
    )?;
    Ok(())
}

/// Move a stage to a 1-based position and rewrite order_position compactly
/// for every stage.
pub fn reorder_stage(conn: &Connection, name: &str, position: i64) -> Result<()> {
    let stages = list_stages(conn)?;
    let from = stages
        .iter()
        .position(|s| s.name.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| CrmError::UnknownStage(name.trim().to_string()))?;
    let to = (position.max(1) as usize).min(stages.len()) - 1;

    let mut reordered = stages;
    let stage = reordered.remove(from);
    reordered.insert(to, stage);
    for (i, stage) in reordered.iter().enumerate() {
        conn.execute(
            "UPDATE pipeline_stages SET order_position = ?1 WHERE id = ?2",
            rusqlite::params![(i + 1) as i64, stage.id],
        )?;
    }
    Ok(())
}

/// A stage can only go once no live job sits in it.
pub fn remove_stage(conn: &Connection, name: &str) -> Result<()> {
    let stage = get_stage(conn, name)?;
    let in_use: i64 = conn.query_row(
        r#"SELECT count(*) FROM all_jobs WHERE lower(trim("Status")) = lower(?1)"#,
        [stage.name.as_str()],
        |row| row.get(0),
    )?;
    if in_use > 0 {
        return Err(CrmError::StageInUse(format!("{} ({in_use} jobs)", stage.name)));
    }
    conn.execute(
        "DELETE FROM pipeline_stages WHERE name = ?1 COLLATE NOCASE",
        [stage.name.as_str()],
    )?;
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
    fn test_seeded_stages_in_order() {
        let (_dir, conn) = test_db();
        let stages = list_stages(&conn).unwrap();
        let names: Vec<&str> = stages.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["New Lead", "In Progress", "Awaiting Parts", "Pending Payment", "Closed", "Cancelled"]
        );
    }

    #[test]
    fn test_list_dedupes_case_insensitively_keeping_latest() {
        let (_dir, conn) = test_db();
        conn.execute(
            "INSERT INTO pipeline_stages (name, color, order_position) VALUES ('NEW LEAD', '#000000', 1)",
            [],
        )
        .unwrap();
        let stages = list_stages(&conn).unwrap();
        assert_eq!(stages.len(), 6);
        let lead = stages.iter().find(|s| s.name.eq_ignore_ascii_case("new lead")).unwrap();
        assert_eq!(lead.color, "#000000");
    }

    #[test]
    fn test_add_rejects_duplicates_and_bad_colors() {
        let (_dir, conn) = test_db();
        assert!(matches!(add_stage(&conn, "closed", None), Err(CrmError::StageExists(_))));
        assert!(add_stage(&conn, "Follow Up", Some("red")).is_err());
        assert!(add_stage(&conn, "Follow Up", Some("#12345")).is_err());
        add_stage(&conn, "Follow Up", Some("#A1B2C3")).unwrap();
        let follow = get_stage(&conn, "follow up").unwrap();
        assert_eq!(follow.color, "#A1B2C3");
        assert_eq!(follow.order_position, 7);
    }

    #[test]
    fn test_reorder_compacts_positions() {
        let (_dir, conn) = test_db();
        reorder_stage(&conn, "Pending Payment", 1).unwrap();
        let stages = list_stages(&conn).unwrap();
        let names: Vec<&str> = stages.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names[0], "Pending Payment");
        assert_eq!(names[1], "New Lead");
        let positions: Vec<i64> = stages.iter().map(|s| s.order_position).collect();
        assert_eq!(positions, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_remove_guarded_by_jobs() {
        let (_dir, conn) = test_db();
        conn.execute(
            r#"INSERT INTO all_jobs ("Count", "Status") VALUES ('1', 'awaiting parts')"#,
            [],
        )
        .unwrap();
        assert!(matches!(
            remove_stage(&conn, "Awaiting Parts"),
            Err(CrmError::StageInUse(_))
        ));
        remove_stage(&conn, "Pending Payment").unwrap();
        assert_eq!(list_stages(&conn).unwrap().len(), 5);
    }

    #[test]
    fn test_rename_keeps_color_and_blocks_collisions() {
        let (_dir, conn) = test_db();
        rename_stage(&conn, "In Progress", "On Site").unwrap();
        assert_eq!(get_stage(&conn, "On Site").unwrap().color, "#F59E0B");
        assert!(get_stage(&conn, "In Progress").is_err());
        assert!(matches!(
            rename_stage(&conn, "On Site", "Closed"),
            Err(CrmError::StageExists(_))
        ));
    }
}
