use std::net::SocketAddr;

use mimalloc_rust::GlobalMiMalloc;
use tonic::transport::Server;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod client;
pub mod frame;
pub mod health;
pub mod query;
pub mod rpc;
pub mod stream;

#[global_allocator]
static GLOBAL_MIMALLOC: GlobalMiMalloc = GlobalMiMalloc;

#[tokio::main]
async fn main() {
    init_logger();

    let port: u16 = std::env::var("PORT")
        .unwrap_or("3000".to_string())
        .parse()
        .expect("PORT must be a number");
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let graphdb_url = std::env::var("GRAPHDB_URL").expect("GRAPHDB_URL must be set");
    let client = client::HttpGraphClient::new(graphdb_url);

    let service = rpc::DataSource::new(client);
    info!(%addr, "server listening");

    Server::builder()
        .add_service(rpc::DataSourceServiceServer::new(service))
        .serve(addr)
        .await
        .expect("Failed to serve");
}

fn init_logger() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().compact())
        .try_init()
        .expect("Failed to initialize logger");
}
