use std::sync::Arc;

use crate::dashboards::d402_ecommerce_sales::service::DashboardSettings;
use crate::dashboards::d402_ecommerce_sales::source::DatasetSource;

/// Shared, read-only handler state
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn DatasetSource>,
    pub settings: Arc<DashboardSettings>,
}

impl AppState {
    pub fn new(source: Arc<dyn DatasetSource>, settings: DashboardSettings) -> Self {
        Self {
            source,
            settings: Arc::new(settings),
        }
    }
}
