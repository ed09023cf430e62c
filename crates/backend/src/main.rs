pub mod api;
pub mod dashboards;
pub mod routes;
pub mod shared;
pub mod system;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, Method};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use dashboards::d402_ecommerce_sales::service::DashboardSettings;
use dashboards::d402_ecommerce_sales::source::HttpDatasetSource;
use shared::app_state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    system::tracing::initialize()?;

    let config = shared::config::load_config()?;
    tracing::info!(
        "Dataset sources: orders={}, geolocation={}",
        config.sources.orders_url,
        config.sources.geolocation_url
    );

    let source = HttpDatasetSource::new(&config.sources)?;
    let state = AppState::new(Arc::new(source), DashboardSettings::from(&config.dashboard));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    let app = routes::configure_routes(state).layer(cors);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
