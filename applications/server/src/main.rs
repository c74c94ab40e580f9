/// Cadence Server - album and playlist ordering service
use cadence_core::CreateUser;
use cadence_server::{api, config::ServerConfig, state::AppState};
use clap::{Parser, Subcommand};
use std::{net::SocketAddr, path::PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cadence-server")]
#[command(about = "Cadence multi-user music catalog server", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "CADENCE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Apply database migrations and exit
    Migrate,
    /// Create a new user
    AddUser {
        /// Username
        #[arg(short, long)]
        username: String,
    },
    /// List all users
    ListUsers,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "cadence_server=info,cadence_storage=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = ServerConfig::load(cli.config.as_deref())?;
    config.validate()?;

    match cli.command {
        Commands::Serve => serve(config).await?,
        Commands::Migrate => migrate(&config).await?,
        Commands::AddUser { username } => add_user(&config, &username).await?,
        Commands::ListUsers => list_users(&config).await?,
    }

    Ok(())
}

async fn open_database(config: &ServerConfig) -> anyhow::Result<sqlx::SqlitePool> {
    let pool = cadence_storage::create_pool(
        &config.storage.database_url,
        config.storage.max_connections,
    )
    .await?;
    cadence_storage::run_migrations(&pool).await?;
    Ok(pool)
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    tracing::info!("Starting Cadence Server");
    tracing::info!("Host: {}", config.server.host);
    tracing::info!("Port: {}", config.server.port);

    let pool = open_database(&config).await?;
    tracing::info!("Database connected");

    let policy = config.rebalance_policy();
    tracing::info!(
        radius = policy.radius,
        step = policy.step,
        max_attempts = config.ordering.max_attempts,
        "Ordering service ready"
    );

    let app_state = AppState::new(pool.clone(), policy, config.ordering.max_attempts);
    let app = api::router(app_state);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("Server stopped");

    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on Unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}

async fn migrate(config: &ServerConfig) -> anyhow::Result<()> {
    let pool = open_database(config).await?;
    pool.close().await;

    tracing::info!("Migrations applied");
    Ok(())
}

async fn add_user(config: &ServerConfig, username: &str) -> anyhow::Result<()> {
    let pool = open_database(config).await?;

    let user = cadence_storage::users::create(
        &pool,
        CreateUser {
            username: username.to_string(),
        },
    )
    .await?;

    println!("Created user {} ({})", user.username, user.id);

    pool.close().await;
    Ok(())
}

async fn list_users(config: &ServerConfig) -> anyhow::Result<()> {
    let pool = open_database(config).await?;

    let users = cadence_storage::users::get_all(&pool).await?;

    println!("Users:");
    for user in users {
        println!("  {} - {}", user.id, user.username);
    }

    pool.close().await;
    Ok(())
}
