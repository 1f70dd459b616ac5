use actix_cors::Cors;
use actix_web::{middleware::Compress, web, App, HttpServer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use solar_leads::bootstrap::seed_defaults;
use solar_leads::openapi::ApiDoc;
use solar_leads::rate_limit::{InMemoryRateLimiter, RateLimitConfig, RateLimiterFacade};
use solar_leads::repo::pg::PgRepo;
use solar_leads::{config, AppState};

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Environment variables must be set externally (shell, systemd, Docker, etc.)
    // Load .env automatically only in debug builds to reduce manual setup overhead.
    if cfg!(debug_assertions) {
        let _ = dotenv::dotenv();
    }

    validate_env_vars();

    // Structured logging initialisation
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    info!("Bootstrapping solar-leads server");

    // Storage initialisation failure is fatal: the process must not serve
    // traffic without a reachable store.
    let db_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&db_url)
        .await
        .expect("Failed to connect to Postgres");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    let repo = PgRepo::new(pool);
    seed_defaults(&repo).await.expect("Failed to seed defaults");
    info!("Storage ready, defaults seeded");

    let rate_limiter = RateLimiterFacade::new(
        InMemoryRateLimiter::new(true),
        RateLimitConfig::from_env(),
    );

    let openapi = ApiDoc::openapi();
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let server = HttpServer::new(move || {
        let cors = match std::env::var("CORS_ORIGINS") {
            Ok(origins) if origins.trim() == "*" => Cors::permissive(),
            Ok(origins) => {
                let mut c = Cors::default()
                    .allow_any_header()
                    .allowed_methods(["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
                    .supports_credentials()
                    .max_age(3600);
                for origin in origins.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                    c = c.allowed_origin(origin);
                }
                c
            }
            // local dev: React/Vite default ports
            Err(_) => Cors::default()
                .allowed_origin("http://localhost:5173")
                .allowed_origin("http://127.0.0.1:5173")
                .allowed_origin("http://localhost:3000")
                .allowed_origin("http://127.0.0.1:3000")
                .allow_any_header()
                .allowed_methods(["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
                .supports_credentials()
                .max_age(3600),
        };

        App::new()
            .wrap(TracingLogger::default())
            .wrap(Compress::default())
            .wrap(cors)
            .configure(config)
            .service(SwaggerUi::new("/docs").url("/docs/openapi.json", openapi.clone()))
            .app_data(web::Data::new(AppState {
                repo: Arc::new(repo.clone()),
                rate_limiter: rate_limiter.clone(),
            }))
    })
    .bind(&bind_addr)?;

    info!("Listening on http://{bind_addr}");

    server.run().await
}

/// Validate that required environment variables are set
fn validate_env_vars() {
    use std::env;

    let required = vec!["JWT_SECRET", "DATABASE_URL"];

    let mut missing = Vec::new();
    for var in required {
        if env::var(var).is_err() {
            missing.push(var);
        }
    }

    if !missing.is_empty() {
        eprintln!("Missing required environment variables: {:?}", missing);
        eprintln!("Please copy .env.example to .env and configure it");
        std::process::exit(1);
    }

    if let Ok(secret) = env::var("JWT_SECRET") {
        if secret.len() < 32 {
            eprintln!("JWT_SECRET must be at least 32 characters long for security");
            std::process::exit(1);
        }
    }
}
