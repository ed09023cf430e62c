use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use contracts::dashboards::d402_ecommerce_sales::{
    DashboardErrorResponse, EcommerceSalesRequest, EcommerceSalesResponse, PeriodResponse,
};

use crate::dashboards::d402_ecommerce_sales::error::DashboardError;
use crate::dashboards::d402_ecommerce_sales::service;
use crate::shared::app_state::AppState;

type ErrorReply = (StatusCode, Json<DashboardErrorResponse>);

fn error_reply(e: DashboardError) -> ErrorReply {
    if e.is_user_error() {
        tracing::warn!("D402 Dashboard: Rejected request: {}", e);
        (StatusCode::BAD_REQUEST, Json(e.to_response()))
    } else {
        tracing::error!("D402 Dashboard: Failed to build dashboard: {}", e);
        (StatusCode::BAD_GATEWAY, Json(e.to_response()))
    }
}

/// GET /api/d402/ecommerce_sales?date_from=2018-01-01&date_to=2018-01-31
pub async fn get_ecommerce_sales(
    State(state): State<AppState>,
    Query(request): Query<EcommerceSalesRequest>,
) -> Result<Json<EcommerceSalesResponse>, ErrorReply> {
    tracing::info!(
        "D402 Dashboard: Getting e-commerce sales for date_from={:?}, date_to={:?}",
        request.date_from,
        request.date_to
    );

    match service::get_ecommerce_sales(state.source.as_ref(), &state.settings, request).await {
        Ok(response) => {
            tracing::info!(
                "D402 Dashboard: Returning {} cities, {} categories, {} payment types",
                response.city_sales.rows.len(),
                response.category_sales.most.rows.len(),
                response.payment_sales.most.rows.len()
            );
            Ok(Json(response))
        }
        Err(e) => Err(error_reply(e)),
    }
}

/// GET /api/d402/period
pub async fn get_period(State(state): State<AppState>) -> Result<Json<PeriodResponse>, ErrorReply> {
    match service::get_period(state.source.as_ref()).await {
        Ok(period) => {
            tracing::info!(
                "D402 Dashboard: Purchase period {:?}..{:?}",
                period.date_from,
                period.date_to
            );
            Ok(Json(period))
        }
        Err(e) => Err(error_reply(e)),
    }
}
