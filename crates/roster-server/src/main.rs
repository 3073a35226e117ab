//! Roster server
//!
//! HTTP entrypoint wiring logging, configuration, the connection pool and
//! the user router together.

use clap::Parser;
use roster_api::UserAdapter;
use roster_logging::Profile;
use roster_store::users::PgUserStore;
use roster_store::{db, DbConfig};
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "roster")]
#[command(about = "Roster - user record-management service", long_about = None)]
struct Cli {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:8080")]
    bind: String,

    /// Emit JSON logs at info level instead of the development format
    #[arg(long)]
    production: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    roster_logging::init(if cli.production {
        Profile::Production
    } else {
        Profile::Development
    });

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = DbConfig::load()?;
    let pool = db::connect(&config).await?;
    let store = PgUserStore::new(pool, config.schema.clone());
    let app = roster_api::router(Arc::new(UserAdapter::new(store)));

    let listener = tokio::net::TcpListener::bind(&cli.bind).await?;
    tracing::info!(bind = %cli.bind, "roster listening");
    axum::serve(listener, app).await?;
    Ok(())
}
