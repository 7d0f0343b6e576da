use std::net::SocketAddr;
use std::path::PathBuf;

use tracing::info;

use quill_db::Database;
use quill_server::cli::{self, Action};
use quill_server::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quill_server=debug,quill_api=debug,quill_db=info,tower_http=debug".into()),
        )
        .init();

    let matches = cli::new().get_matches();

    let mut config = Config::from_env()?;
    if let Some(path) = matches.get_one::<String>("database") {
        config.database = PathBuf::from(path);
    }

    match cli::dispatch(&matches) {
        Action::InitDb => {
            Database::init(&config.database)?;
            println!("Initialized the database.");
        }
        Action::Serve => {
            let state = quill_server::build_state(&config)?;
            let app = quill_server::build_app(state);

            let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
            info!("Quill listening on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
