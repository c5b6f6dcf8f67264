use crate::db;
use crate::models::{NewTask, ProjectRef, TaskDto, TaskPatch, STATUS_PENDING};
use rusqlite::{params, Connection, OptionalExtension};

/// Hard cap on a single listing, regardless of what the client asks for.
pub const MAX_LIST_LIMIT: i64 = 100;

const SELECT: &str = "SELECT t.id, t.title, t.description, t.status, t.project_id, t.user_id,
        t.created_at, p.id, p.name
     FROM tasks t LEFT JOIN projects p ON p.id = t.project_id";

fn map_row(row: &rusqlite::Row) -> rusqlite::Result<TaskDto> {
    let project = match row.get::<_, Option<i64>>(7)? {
        Some(id) => Some(ProjectRef {
            id,
            name: row.get(8)?,
        }),
        None => None,
    };

    Ok(TaskDto {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status: row.get(3)?,
        project_id: row.get(4)?,
        user_id: row.get(5)?,
        created_at: row.get(6)?,
        project,
    })
}

/// Newest first, clamped to [`MAX_LIST_LIMIT`] rows.
pub fn list_for_user(
    conn: &Connection,
    user_id: i64,
    limit: Option<i64>,
) -> rusqlite::Result<Vec<TaskDto>> {
    let limit = limit.unwrap_or(MAX_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);
    let mut stmt = conn.prepare(&format!(
        "{SELECT} WHERE t.user_id = ?1 ORDER BY t.created_at DESC, t.id DESC LIMIT ?2"
    ))?;
    let rows = stmt.query_map(params![user_id, limit], map_row)?;
    rows.collect()
}

pub fn find_by_id(conn: &Connection, id: i64, user_id: i64) -> rusqlite::Result<Option<TaskDto>> {
    conn.query_row(
        &format!("{SELECT} WHERE t.id = ?1 AND t.user_id = ?2"),
        params![id, user_id],
        map_row,
    )
    .optional()
}

pub fn create(conn: &Connection, user_id: i64, task: &NewTask) -> rusqlite::Result<TaskDto> {
    let status = task.status.as_deref().unwrap_or(STATUS_PENDING);
    conn.execute(
        "INSERT INTO tasks (title, description, status, project_id, user_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            task.title,
            task.description,
            status,
            task.project_id,
            user_id,
            db::now()
        ],
    )?;
    let id = conn.last_insert_rowid();
    Ok(find_by_id(conn, id, user_id)?.expect("row just inserted"))
}

/// Merges the patch over the stored row, then writes every column back in a
/// single statement. Absent fields keep their value; explicit nulls clear
/// the description or detach the project.
pub fn update(
    conn: &Connection,
    id: i64,
    user_id: i64,
    patch: &TaskPatch,
) -> rusqlite::Result<Option<TaskDto>> {
    let Some(existing) = find_by_id(conn, id, user_id)? else {
        return Ok(None);
    };

    let title = patch.title.clone().unwrap_or(existing.title);
    let status = patch.status.clone().unwrap_or(existing.status);
    let description = match &patch.description {
        Some(value) => value.clone(),
        None => existing.description,
    };
    let project_id = match patch.project_id {
        Some(value) => value,
        None => existing.project_id,
    };

    conn.execute(
        "UPDATE tasks SET title = ?1, description = ?2, status = ?3, project_id = ?4
         WHERE id = ?5 AND user_id = ?6",
        params![title, description, status, project_id, id, user_id],
    )?;
    find_by_id(conn, id, user_id)
}

pub fn delete(conn: &Connection, id: i64, user_id: i64) -> rusqlite::Result<bool> {
    let deleted = conn.execute(
        "DELETE FROM tasks WHERE id = ?1 AND user_id = ?2",
        params![id, user_id],
    )?;
    Ok(deleted > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::repository::{projects, users};

    fn new_task(title: &str, project_id: Option<i64>) -> NewTask {
        NewTask {
            title: title.into(),
            description: None,
            status: None,
            project_id,
        }
    }

    #[test]
    fn created_tasks_default_to_pending_and_embed_project() {
        let db = open_in_memory().unwrap();
        let conn = db.lock().unwrap();
        let alice = users::create(&conn, "a@x.com", "hash", "A").unwrap().id;
        let project = projects::create(&conn, alice, "Work", None).unwrap();

        let task = create(&conn, alice, &new_task("Write report", Some(project.id))).unwrap();
        assert_eq!(task.status, "pending");
        assert_eq!(task.project_id, Some(project.id));
        assert_eq!(
            task.project,
            Some(ProjectRef {
                id: project.id,
                name: "Work".into()
            })
        );
    }

    #[test]
    fn list_limit_is_clamped_to_one_hundred() {
        let db = open_in_memory().unwrap();
        let conn = db.lock().unwrap();
        let alice = users::create(&conn, "a@x.com", "hash", "A").unwrap().id;

        for i in 0..120 {
            create(&conn, alice, &new_task(&format!("task {i}"), None)).unwrap();
        }

        assert_eq!(
            list_for_user(&conn, alice, Some(1000)).unwrap().len(),
            100
        );
        assert_eq!(list_for_user(&conn, alice, None).unwrap().len(), 100);
        assert_eq!(list_for_user(&conn, alice, Some(5)).unwrap().len(), 5);
        // nonsense limits fall back into range instead of erroring
        assert_eq!(list_for_user(&conn, alice, Some(-3)).unwrap().len(), 1);
    }

    #[test]
    fn listing_is_newest_first() {
        let db = open_in_memory().unwrap();
        let conn = db.lock().unwrap();
        let alice = users::create(&conn, "a@x.com", "hash", "A").unwrap().id;

        let first = create(&conn, alice, &new_task("first", None)).unwrap();
        let second = create(&conn, alice, &new_task("second", None)).unwrap();

        let listed = list_for_user(&conn, alice, None).unwrap();
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }

    #[test]
    fn cross_user_access_resolves_as_absent() {
        let db = open_in_memory().unwrap();
        let conn = db.lock().unwrap();
        let alice = users::create(&conn, "a@x.com", "hash", "A").unwrap().id;
        let bob = users::create(&conn, "b@x.com", "hash", "B").unwrap().id;

        let task = create(&conn, alice, &new_task("mine", None)).unwrap();

        assert!(find_by_id(&conn, task.id, bob).unwrap().is_none());
        assert!(update(&conn, task.id, bob, &TaskPatch::default())
            .unwrap()
            .is_none());
        assert!(!delete(&conn, task.id, bob).unwrap());
        assert!(list_for_user(&conn, bob, None).unwrap().is_empty());
    }

    #[test]
    fn patch_merges_and_detaches_project() {
        let db = open_in_memory().unwrap();
        let conn = db.lock().unwrap();
        let alice = users::create(&conn, "a@x.com", "hash", "A").unwrap().id;
        let project = projects::create(&conn, alice, "Work", None).unwrap();
        let task = create(&conn, alice, &new_task("Write report", Some(project.id))).unwrap();

        let done = update(
            &conn,
            task.id,
            alice,
            &TaskPatch {
                status: Some("completed".into()),
                ..TaskPatch::default()
            },
        )
        .unwrap()
        .unwrap();
        assert_eq!(done.status, "completed");
        assert_eq!(done.title, "Write report");
        assert_eq!(done.project_id, Some(project.id));

        let detached = update(
            &conn,
            task.id,
            alice,
            &TaskPatch {
                project_id: Some(None),
                ..TaskPatch::default()
            },
        )
        .unwrap()
        .unwrap();
        assert_eq!(detached.project_id, None);
        assert!(detached.project.is_none());
    }

    #[test]
    fn delete_reports_absence_consistently() {
        let db = open_in_memory().unwrap();
        let conn = db.lock().unwrap();
        let alice = users::create(&conn, "a@x.com", "hash", "A").unwrap().id;

        let task = create(&conn, alice, &new_task("ephemeral", None)).unwrap();
        assert!(delete(&conn, task.id, alice).unwrap());
        assert!(!delete(&conn, task.id, alice).unwrap());
        assert!(!delete(&conn, 9999, alice).unwrap());
    }
}
