use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Request for the e-commerce sales dashboard
///
/// Both dates are optional. Without dates the dashboard covers the whole
/// dataset; a single date is completed with the dataset bounds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EcommerceSalesRequest {
    /// Start date in format "YYYY-MM-DD" (inclusive)
    pub date_from: Option<String>,
    /// End date in format "YYYY-MM-DD" (inclusive)
    pub date_to: Option<String>,
}

/// Response for the e-commerce sales dashboard
///
/// Sections are listed in the order they are displayed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EcommerceSalesResponse {
    /// Page header
    pub title: String,
    /// Applied date range, None when the full dataset was used
    pub period: Option<AppliedPeriod>,
    pub city_sales: CitySalesSection,
    pub category_sales: RankingSection<CategorySalesRow>,
    pub payment_sales: RankingSection<PaymentSalesRow>,
    /// Footer caption
    pub caption: String,
}

/// Inclusive calendar range the dashboard was computed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedPeriod {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
}

/// Bar chart: city vs. share of customers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitySalesSection {
    pub title: String,
    pub rows: Vec<CitySalesRow>,
}

/// Pair of side-by-side charts: most vs. least
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingSection<T> {
    pub title: String,
    pub most: RankedList<T>,
    pub least: RankedList<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedList<T> {
    pub title: String,
    pub rows: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitySalesRow {
    pub city: String,
    /// Deduplicated customers located in the city
    pub total_sales: u64,
    /// Share of all deduplicated customers, 0..=100
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySalesRow {
    pub category: String,
    /// Order rows in the category
    pub products: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSalesRow {
    pub payment_type: String,
    /// Order rows paid with this type
    pub products: u64,
}

/// Default period for the date inputs (min/max purchase date)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodResponse {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardErrorCode {
    InvalidRange,
    InvalidDate,
    DataUnavailable,
}

/// Error body returned instead of a dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardErrorResponse {
    pub code: DashboardErrorCode,
    pub message: String,
}

impl DashboardErrorResponse {
    pub fn new(code: DashboardErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}
