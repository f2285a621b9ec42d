use std::net::SocketAddr;
use std::sync::Arc;

use rustbazaar::clock::SystemClock;
use rustbazaar::store::memory::{InMemoryOrderStore, InMemoryProductStore};
use rustbazaar::{config, routes, services::seed, AppState};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let settings = config::load();

    let state = AppState {
        settings: settings.clone(),
        orders: Arc::new(InMemoryOrderStore::new()),
        products: Arc::new(InMemoryProductStore::new()),
        clock: Arc::new(SystemClock),
    };

    if settings.seed_demo_data {
        seed::seed_demo_products(&state).await;
    }

    let app = routes::app(state);

    let addr = SocketAddr::from((settings.host.parse::<std::net::IpAddr>().unwrap(), settings.port));
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
