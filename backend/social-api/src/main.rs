use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use db_pool::{create_pool as create_pg_pool, DbConfig as DbPoolConfig};
use social_api::config::{Config, StoreBackend};
use social_api::db::{InMemoryStore, PgPostStore, PgUserStore};
use social_api::middleware::{security_headers, MetricsMiddleware};
use social_api::routes;
use social_api::security::JwtKeys;
use social_api::uploads::UploadSettings;
use social_api::{AppState, Stores};
use std::io;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn build_stores(config: &Config) -> io::Result<Stores> {
    match config.store.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            let store = Arc::new(InMemoryStore::new());
            Ok(Stores {
                posts: store.clone(),
                users: store,
            })
        }
        StoreBackend::Postgres => {
            let db_config = DbPoolConfig::from_env("social-api")
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
            db_config.log_config();

            let pool = create_pg_pool(db_config).await.map_err(|e| {
                io::Error::new(
                    io::ErrorKind::Other,
                    format!("Failed to create database pool: {e}"),
                )
            })?;

            if config.store.run_migrations {
                sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
                    io::Error::new(io::ErrorKind::Other, format!("Migration failed: {e}"))
                })?;
                tracing::info!("Database migrations applied");
            }

            Ok(Stores {
                posts: Arc::new(PgPostStore::new(pool.clone())),
                users: Arc::new(PgUserStore::new(pool)),
            })
        }
    }
}

/// Social API
///
/// Serves `/auth`, `/users`, `/posts` and `/assets` on port 3001 by default
/// (`PORT`). Storage is PostgreSQL unless `STORE_BACKEND=memory`.
#[actix_web::main]
async fn main() -> io::Result<()> {
    let _ = dotenvy::dotenv();

    // Container healthcheck: `social-api healthcheck`
    {
        let mut args = std::env::args();
        let _bin = args.next();
        if let Some(cmd) = args.next() {
            if cmd == "healthcheck" {
                let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
                let url = format!("http://127.0.0.1:{}/health", port);
                match reqwest::Client::new().get(&url).send().await {
                    Ok(resp) if resp.status().is_success() => return Ok(()),
                    Ok(resp) => {
                        eprintln!("healthcheck HTTP status: {}", resp.status());
                        return Err(io::Error::new(io::ErrorKind::Other, "healthcheck failed"));
                    }
                    Err(e) => {
                        eprintln!("healthcheck HTTP error: {}", e);
                        return Err(io::Error::new(io::ErrorKind::Other, "healthcheck error"));
                    }
                }
            }
        }
    }

    init_tracing();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting social-api v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let stores = build_stores(&config).await?;

    tokio::fs::create_dir_all(&config.uploads.assets_dir).await?;

    let keys = Arc::new(JwtKeys::new(
        &config.auth.jwt_secret,
        config.auth.token_ttl_hours,
    ));
    let max_upload_bytes = config.uploads.max_upload_bytes;
    let state = web::Data::new(AppState::new(
        stores,
        keys.clone(),
        UploadSettings {
            assets_dir: config.uploads.assets_dir.clone(),
            max_upload_bytes,
        },
        config.store.timeout.duration,
    ));

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", bind_address);

    let allowed_origins = config.cors.allowed_origins.clone();
    let server = HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else if !origin.is_empty() {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(state.clone())
            .app_data(web::PayloadConfig::new(max_upload_bytes))
            .wrap(MetricsMiddleware)
            .wrap(security_headers())
            .wrap(cors)
            .wrap(Logger::new("%a \"%r\" %s %b \"%{Referer}i\" \"%{User-Agent}i\" %T"))
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(|cfg| routes::configure(cfg, keys.clone(), max_upload_bytes))
    })
    .bind(&bind_address)?
    .disable_signals()
    .shutdown_timeout(30)
    .run();

    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    let result = tokio::select! {
        joined = server_task => match joined {
            Ok(result) => result,
            Err(e) => Err(io::Error::new(io::ErrorKind::Other, e.to_string())),
        },
        _ = &mut shutdown => {
            tracing::info!("Shutdown signal received");
            server_handle.stop(true).await;
            Ok(())
        }
    };

    tracing::info!("social-api shutting down");
    result
}
