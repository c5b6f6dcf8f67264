use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use log::info;

use taskflow::config::Config;
use taskflow::{db, routes};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            // misconfiguration is fatal, never silently degraded
            log::error!("startup configuration error: {err}");
            std::process::exit(1);
        }
    };

    let db = web::Data::new(db::init_db(&config.db_path).expect("failed to open database"));
    let config_data = web::Data::new(config.clone());

    info!("TaskFlow server listening on port {}", config.port);
    info!("allowed origin: {}", config.allowed_origin);

    let port = config.port;
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&config.allowed_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE])
            .supports_credentials();

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(db.clone())
            .app_data(config_data.clone())
            .configure(routes::configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
