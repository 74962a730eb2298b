use actix_cors::Cors;
use actix_files::{Files, NamedFile};
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;

mod ai;
mod config;
mod controllers;
mod db;
mod integrations;
mod models;

use config::Config;
use db::Database;

pub struct AppState {
    pub db: Arc<Database>,
    pub config: Config,
}

/// Directory the static UI is served from
struct PublicDir(PathBuf);

/// SPA fallback handler - serves index.html for client-side routing
async fn spa_fallback(public: web::Data<PublicDir>) -> actix_web::Result<NamedFile> {
    Ok(NamedFile::open(public.0.join("index.html"))?)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    config.log_summary();
    let port = config.port;

    log::info!("Initializing database at {}", config.database_url);
    let db = Database::new(&config.database_url).map_err(|e| {
        log::error!("Failed to initialize database: {}", e);
        std::io::Error::other(format!("database init failed: {}", e))
    })?;
    let db = Arc::new(db);

    let public_dir = PathBuf::from(&config.public_dir);
    let serve_static = public_dir.is_dir();
    if serve_static {
        log::info!("Serving UI from: {}", public_dir.display());
    } else {
        log::warn!(
            "Public directory {} not found - static file serving disabled",
            public_dir.display()
        );
    }

    log::info!("Starting PAL server on port {}", port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        let mut app = App::new()
            .app_data(web::Data::new(AppState {
                db: Arc::clone(&db),
                config: config.clone(),
            }))
            .app_data(web::Data::new(PublicDir(public_dir.clone())))
            .app_data(controllers::json_config())
            .wrap(Logger::default())
            .wrap(cors)
            .configure(controllers::health::config)
            .configure(controllers::memories::config)
            .configure(controllers::events::config)
            .configure(controllers::messages::config)
            .configure(controllers::chat::config)
            .configure(controllers::images::config)
            .configure(controllers::search::config)
            .configure(controllers::calendar::config)
            .configure(controllers::google_auth::config);

        // Registered last so API routes take precedence
        if serve_static {
            app = app.service(
                Files::new("/", public_dir.clone())
                    .index_file("index.html")
                    .use_etag(true)
                    .use_last_modified(true)
                    .default_handler(web::to(spa_fallback)),
            );
        }

        app
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await?;

    log::info!("Server stopped");
    Ok(())
}
