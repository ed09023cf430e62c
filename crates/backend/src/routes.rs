use axum::{middleware, routing::get, Router};

use crate::api::handlers;
use crate::shared::app_state::AppState;
use crate::system;

/// Конфигурация всех роутов приложения
pub fn configure_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // DASHBOARDS
        // ========================================
        // D402 E-Commerce Sales Dashboard
        .route(
            "/api/d402/ecommerce_sales",
            get(handlers::d402_ecommerce_sales::get_ecommerce_sales),
        )
        .route(
            "/api/d402/period",
            get(handlers::d402_ecommerce_sales::get_period),
        )
        .layer(middleware::from_fn(
            system::middleware::request_logger::request_logger,
        ))
        .with_state(state)
}
