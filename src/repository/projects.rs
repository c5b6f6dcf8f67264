use crate::db;
use crate::models::{ProjectDto, ProjectPatch};
use rusqlite::{params, Connection, OptionalExtension};

const SELECT: &str = "SELECT p.id, p.name, p.description, p.user_id, p.created_at,
        (SELECT COUNT(*) FROM tasks t WHERE t.project_id = p.id) AS task_count
     FROM projects p";

fn map_row(row: &rusqlite::Row) -> rusqlite::Result<ProjectDto> {
    Ok(ProjectDto {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        user_id: row.get(3)?,
        created_at: row.get(4)?,
        task_count: row.get(5)?,
    })
}

/// Newest first.
pub fn list_for_user(conn: &Connection, user_id: i64) -> rusqlite::Result<Vec<ProjectDto>> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT} WHERE p.user_id = ?1 ORDER BY p.created_at DESC, p.id DESC"
    ))?;
    let rows = stmt.query_map(params![user_id], map_row)?;
    rows.collect()
}

pub fn find_by_id(
    conn: &Connection,
    id: i64,
    user_id: i64,
) -> rusqlite::Result<Option<ProjectDto>> {
    conn.query_row(
        &format!("{SELECT} WHERE p.id = ?1 AND p.user_id = ?2"),
        params![id, user_id],
        map_row,
    )
    .optional()
}

pub fn create(
    conn: &Connection,
    user_id: i64,
    name: &str,
    description: Option<&str>,
) -> rusqlite::Result<ProjectDto> {
    conn.execute(
        "INSERT INTO projects (name, description, user_id, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![name, description, user_id, db::now()],
    )?;
    let id = conn.last_insert_rowid();
    // re-read so the caller gets the stored row
    Ok(find_by_id(conn, id, user_id)?.expect("row just inserted"))
}

/// Applies the provided fields on top of the stored row; absent fields keep
/// their value, an explicit null clears the description.
pub fn update(
    conn: &Connection,
    id: i64,
    user_id: i64,
    patch: &ProjectPatch,
) -> rusqlite::Result<Option<ProjectDto>> {
    let Some(existing) = find_by_id(conn, id, user_id)? else {
        return Ok(None);
    };

    let name = patch.name.clone().unwrap_or(existing.name);
    let description = match &patch.description {
        Some(value) => value.clone(),
        None => existing.description,
    };

    conn.execute(
        "UPDATE projects SET name = ?1, description = ?2 WHERE id = ?3 AND user_id = ?4",
        params![name, description, id, user_id],
    )?;
    find_by_id(conn, id, user_id)
}

pub fn delete(conn: &Connection, id: i64, user_id: i64) -> rusqlite::Result<bool> {
    let deleted = conn.execute(
        "DELETE FROM projects WHERE id = ?1 AND user_id = ?2",
        params![id, user_id],
    )?;
    Ok(deleted > 0)
}
