use clap::Parser;
use repodrop::{
    api::{handlers::AppState, routes},
    cli::{Cli, Commands},
    config::Settings,
    db,
    github::GitHubConfig,
    import::Importer,
    Error, Result,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,repodrop=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let settings = Settings::from_env()?;
    settings.validate()?;

    match cli.command {
        Commands::Serve { port, host } => {
            serve(settings, port, host).await?;
        }
        Commands::Migrate => {
            migrate(settings).await?;
        }
        Commands::Import { url, branch } => {
            repodrop::cli::commands::import(settings, &url, branch).await?;
        }
        Commands::Info { url } => {
            repodrop::cli::commands::info(settings, &url).await?;
        }
    }

    Ok(())
}

async fn serve(mut settings: Settings, port: Option<u16>, host: Option<String>) -> Result<()> {
    // Override settings with CLI arguments
    if let Some(port) = port {
        settings.server.port = port;
    }
    if let Some(host) = host {
        settings.server.host = host;
    }

    info!("Starting Repodrop server");
    info!("Database: {}", settings.database.url);
    info!("Server: {}:{}", settings.server.host, settings.server.port);

    // Initialize database with connection pooling configuration
    let pool = db::init_pool_with_config(&settings.database).await?;
    info!(
        "Database connection established (max_connections: {}, min_connections: {})",
        settings.database.max_connections, settings.database.min_connections
    );

    // Run migrations
    db::run_migrations(&pool).await?;
    info!("Database migrations completed");

    // Build the importer and start the rate-limit sweeper
    let github_config = GitHubConfig::from_env();
    if github_config.token.is_some() {
        info!("GitHub token configured, using authenticated rate limits");
    }

    let importer = Importer::new(settings.clone(), github_config, pool.clone())?;
    let _sweeper_handle = importer
        .rate_limiter()
        .start_sweeper(Duration::from_secs(settings.import.rate_sweep_seconds));
    info!(
        "Rate limit sweeper started (interval: {}s)",
        settings.import.rate_sweep_seconds
    );

    // Create application state
    let state = AppState {
        pool,
        importer: Arc::new(importer),
        settings: settings.clone(),
    };

    let app = routes::create_router(state, &settings);

    // Start server
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::Internal(format!("Failed to bind to {addr}: {e}")))?;

    println!("\n========================================");
    println!("Repodrop Server");
    println!("========================================");
    println!("Status: Running");
    println!("Address: http://{addr}");
    println!("Database: Connected");
    println!(
        "Import limits: {} MB repo, {} imports / {}s window",
        settings.import.max_repo_size_mb,
        settings.import.rate_limit_per_window,
        settings.import.rate_window_seconds
    );
    println!("\nAPI Endpoints:");
    println!("  POST /import");
    println!("  GET  /info?url=<repoUrl>");
    println!("  GET  /containers/:name");
    println!("  GET  /health");
    println!("\nPress Ctrl+C to stop");
    println!("========================================\n");

    info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| Error::Internal(format!("Server error: {e}")))?;

    info!("Shutting down...");
    Ok(())
}

async fn migrate(settings: Settings) -> Result<()> {
    info!("Running database migrations");

    let pool = db::init_pool(&settings.database.url).await?;
    db::run_migrations(&pool).await?;

    println!("\u{2713} Database migrations completed successfully");
    Ok(())
}
