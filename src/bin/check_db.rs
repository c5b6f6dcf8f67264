//! Connectivity check: opens the configured database and reports per-entity
//! record counts. Exits non-zero when the store is unreachable.

use dotenv::dotenv;
use std::env;

fn main() {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let db_path = env::var("TASKFLOW_DB").unwrap_or_else(|_| "taskflow.db".to_string());
    let db = match taskflow::db::init_db(&db_path) {
        Ok(db) => db,
        Err(err) => {
            log::error!("cannot open {db_path}: {err}");
            std::process::exit(1);
        }
    };
    let conn = db.lock().expect("database mutex poisoned");

    for table in ["users", "projects", "tasks"] {
        let count: Result<i64, _> =
            conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get(0)
            });
        match count {
            Ok(count) => log::info!("{table}: {count} records"),
            Err(err) => {
                log::error!("failed to count {table}: {err}");
                std::process::exit(1);
            }
        }
    }

    log::info!("database {db_path} is reachable");
}
