//! Seeds the database with demo data: one user (demo@taskflow.dev /
//! demo1234), two projects and five tasks. Skips everything when a user
//! already exists, so it is safe to run repeatedly.

use dotenv::dotenv;
use std::env;

fn main() {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let db_path = env::var("TASKFLOW_DB").unwrap_or_else(|_| "taskflow.db".to_string());
    let db = taskflow::db::init_db(&db_path).expect("failed to open database");
    let conn = db.lock().expect("database mutex poisoned");

    match taskflow::db::seed_demo(&conn) {
        Ok(true) => log::info!("seeded {db_path}: 1 user, 2 projects, 5 tasks"),
        Ok(false) => log::info!("{db_path} already has users, nothing to do"),
        Err(err) => {
            log::error!("seed failed: {err}");
            std::process::exit(1);
        }
    }
}
