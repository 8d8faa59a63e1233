use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

use satrack::{server, SatDb};

#[derive(Parser, Clone, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Address to bind the HTTP server on.
    #[clap(long, default_value = "127.0.0.1:8000")]
    addr: String,

    /// Historical dataset served by GET /setup.
    #[clap(long, default_value = "starlink_historical_data.json")]
    dataset: PathBuf,

    /// Store connection target. The DATABASE_URL environment variable takes
    /// precedence when set.
    #[clap(long, default_value = "sqlite://satrack.db?mode=rwc")]
    database_url: String,
}

#[tokio::main]
async fn main() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info,satrack=info");
    }
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let args = Args::parse();

    let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| args.database_url.clone());
    let addr: SocketAddr = args.addr.parse().expect("Invalid --addr");

    tracing::info!(%addr, dataset = %args.dataset.display(), "starting satrack");

    let db = SatDb::connect(&database_url)
        .await
        .expect("Failed to connect to the store");
    db.ensure_schema()
        .await
        .expect("Failed to initialize the marks schema");

    warp::serve(server::routes(db, args.dataset)).run(addr).await;
}
