use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use matricula::{api, db};

#[derive(Parser)]
#[command(name = "matricula")]
#[command(about = "Student course-registration API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the Matricula server
    Serve {
        /// Port for HTTP API
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Database file (defaults to the platform data directory)
        #[arg(long)]
        database: Option<PathBuf>,
    },
    /// Load the demo catalog and exit
    Seed {
        /// Database file (defaults to the platform data directory)
        #[arg(long)]
        database: Option<PathBuf>,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "matricula=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn open_database(path: Option<PathBuf>) -> anyhow::Result<db::Database> {
    let db = match path {
        Some(path) => db::Database::open(path)?,
        None => db::Database::open_default()?,
    };
    db.migrate()?;
    Ok(db)
}

async fn serve(port: u16, database: Option<PathBuf>) -> anyhow::Result<()> {
    let db = open_database(database)?;
    db.seed_catalog()?;

    let app = api::create_router(db, api::AuthConfig::from_env());

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("Matricula server listening on http://127.0.0.1:{}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Some(Commands::Serve { port, database }) => serve(port, database).await?,
        Some(Commands::Seed { database }) => {
            let db = open_database(database)?;
            db.seed_catalog()?;
        }
        None => serve(3000, None).await?,
    }

    Ok(())
}
