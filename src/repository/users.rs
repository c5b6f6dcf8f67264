use crate::db;
use crate::models::UserRecord;
use rusqlite::{params, Connection, OptionalExtension};

fn map_row(row: &rusqlite::Row) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        name: row.get(3)?,
        created_at: row.get(4)?,
    })
}

pub fn find_by_email(conn: &Connection, email: &str) -> rusqlite::Result<Option<UserRecord>> {
    conn.query_row(
        "SELECT id, email, password_hash, name, created_at FROM users WHERE email = ?1",
        params![email],
        map_row,
    )
    .optional()
}

pub fn create(
    conn: &Connection,
    email: &str,
    password_hash: &str,
    name: &str,
) -> rusqlite::Result<UserRecord> {
    let created_at = db::now();
    conn.execute(
        "INSERT INTO users (email, password_hash, name, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![email, password_hash, name, created_at],
    )?;

    Ok(UserRecord {
        id: conn.last_insert_rowid(),
        email: email.to_string(),
        password_hash: password_hash.to_string(),
        name: name.to_string(),
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    #[test]
    fn find_by_email_distinguishes_present_and_absent() {
        let db = open_in_memory().unwrap();
        let conn = db.lock().unwrap();

        assert!(find_by_email(&conn, "alice@x.com").unwrap().is_none());

        let created = create(&conn, "alice@x.com", "hash", "Alice").unwrap();
        let found = find_by_email(&conn, "alice@x.com").unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.name, "Alice");
        assert_eq!(found.password_hash, "hash");
    }

    #[test]
    fn duplicate_email_violates_unique_constraint() {
        let db = open_in_memory().unwrap();
        let conn = db.lock().unwrap();

        create(&conn, "alice@x.com", "hash", "Alice").unwrap();
        assert!(create(&conn, "alice@x.com", "hash2", "Alice Again").is_err());
    }
}
