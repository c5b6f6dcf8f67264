use crate::auth;
use rusqlite::{params, Connection};
use std::sync::Mutex;

/// Single SQLite connection shared across workers behind a mutex. Every
/// statement is a single atomic write scoped by owner id, so last-write-wins
/// is the concurrency model.
pub type DbConnection = Mutex<Connection>;

pub fn init_db(path: &str) -> rusqlite::Result<DbConnection> {
    let conn = Connection::open(path)?;
    create_schema(&conn)?;
    Ok(Mutex::new(conn))
}

/// In-memory database with the full schema, for tests.
pub fn open_in_memory() -> rusqlite::Result<DbConnection> {
    let conn = Connection::open_in_memory()?;
    create_schema(&conn)?;
    Ok(Mutex::new(conn))
}

fn create_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS projects (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT,
            user_id INTEGER NOT NULL REFERENCES users(id),
            created_at TEXT NOT NULL
        );

        -- Deleting a project orphans its tasks to NULL rather than
        -- cascading or blocking.
        CREATE TABLE IF NOT EXISTS tasks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT,
            status TEXT NOT NULL DEFAULT 'pending',
            project_id INTEGER REFERENCES projects(id) ON DELETE SET NULL,
            user_id INTEGER NOT NULL REFERENCES users(id),
            created_at TEXT NOT NULL
        );",
    )
}

pub fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Inserts one demo user, two demo projects and five demo tasks, but only
/// when the users table is still empty. Returns whether anything was written.
pub fn seed_demo(conn: &Connection) -> Result<bool, crate::errors::ApiError> {
    let users: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
    if users > 0 {
        return Ok(false);
    }

    let hash = auth::hash_password("demo1234")?;
    conn.execute(
        "INSERT INTO users (email, password_hash, name, created_at) VALUES (?1, ?2, ?3, ?4)",
        params!["demo@taskflow.dev", hash, "Demo User", now()],
    )?;
    let user_id = conn.last_insert_rowid();

    let mut project_ids = Vec::new();
    for (name, description) in [
        ("Work", Some("Job-related tasks")),
        ("Studies", None),
    ] {
        conn.execute(
            "INSERT INTO projects (name, description, user_id, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![name, description, user_id, now()],
        )?;
        project_ids.push(conn.last_insert_rowid());
    }

    let demo_tasks: [(&str, Option<i64>); 5] = [
        ("Pay the credit card bill", None),
        ("Send the final report", Some(project_ids[0])),
        ("Prepare sprint review", Some(project_ids[0])),
        ("Read chapter 4", Some(project_ids[1])),
        ("Book dentist appointment", None),
    ];
    for (title, project_id) in demo_tasks {
        conn.execute(
            "INSERT INTO tasks (title, status, project_id, user_id, created_at)
             VALUES (?1, 'pending', ?2, ?3, ?4)",
            params![title, project_id, user_id, now()],
        )?;
    }

    Ok(true)
}
