use chrono::NaiveDate;
use contracts::dashboards::d402_ecommerce_sales::{
    AppliedPeriod, CategorySalesRow, CitySalesSection, EcommerceSalesRequest,
    EcommerceSalesResponse, PaymentSalesRow, PeriodResponse, RankedList, RankingSection,
};

use super::aggregate::{self, KeyCount, Ranking, RankingLimits};
use super::error::DashboardError;
use super::filter::{self, DateRange};
use super::source::{self, DatasetSource, Datasets};
use crate::shared::config::DashboardConfig;

const CITY_SALES_TITLE: &str = "Top 10 Cities by Sales Percentage";
const CATEGORY_SALES_TITLE: &str = "Top Category Sales";
const MOST_SOLD_TITLE: &str = "Most sold products";
const LEAST_SOLD_TITLE: &str = "Least sold products";
const PAYMENT_SALES_TITLE: &str = "Top Payment";
const MOST_USED_PAYMENT_TITLE: &str = "Most used payment types";
const LEAST_USED_PAYMENT_TITLE: &str = "Least used payment types";

/// Fixed presentation settings of the dashboard
#[derive(Debug, Clone)]
pub struct DashboardSettings {
    pub title: String,
    pub caption: String,
    pub limits: RankingLimits,
}

impl From<&DashboardConfig> for DashboardSettings {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            title: config.title.clone(),
            caption: config.caption.clone(),
            limits: RankingLimits {
                top_n: config.top_n,
                view_n: config.view_n,
                least_basis: config.least_sold_basis,
            },
        }
    }
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self::from(&DashboardConfig::default())
    }
}

/// Get the e-commerce sales dashboard
///
/// Loads both tables from the source on every call.
pub async fn get_ecommerce_sales(
    source: &dyn DatasetSource,
    settings: &DashboardSettings,
    request: EcommerceSalesRequest,
) -> Result<EcommerceSalesResponse, DashboardError> {
    let date_from = parse_request_date("date_from", request.date_from.as_deref())?;
    let date_to = parse_request_date("date_to", request.date_to.as_deref())?;

    // Both bounds known: reject before touching the network
    if let (Some(start), Some(end)) = (date_from, date_to) {
        DateRange::new(start, end)?;
    }

    let datasets = source::load_datasets(source).await?;
    let range = DateRange::resolve(date_from, date_to, filter::purchase_period(&datasets.orders))?;

    Ok(build_dashboard(&datasets, range.as_ref(), settings))
}

/// Get the default period for the date inputs
pub async fn get_period(source: &dyn DatasetSource) -> Result<PeriodResponse, DashboardError> {
    let datasets = source::load_datasets(source).await?;
    let period = filter::purchase_period(&datasets.orders);

    Ok(PeriodResponse {
        date_from: period.map(|(min, _)| min),
        date_to: period.map(|(_, max)| max),
    })
}

/// Run the aggregations over loaded data
///
/// Without a range the whole dataset is used. With a range, orders are
/// filtered on purchase date and cities are restricted to the customers of
/// the remaining orders.
pub fn build_dashboard(
    datasets: &Datasets,
    range: Option<&DateRange>,
    settings: &DashboardSettings,
) -> EcommerceSalesResponse {
    let customers = filter::deduplicate_customers(&datasets.geolocations);

    let (orders, customers) = match range {
        Some(range) => {
            let orders = filter::filter_orders_by_purchase(&datasets.orders, range);
            let ids = filter::customer_ids(orders.iter().copied());
            let customers = filter::restrict_to_customers(customers, &ids);
            (orders, customers)
        }
        None => (datasets.orders.iter().collect(), customers),
    };

    tracing::info!(
        "D402: Aggregating {} orders and {} customers (period: {})",
        orders.len(),
        customers.len(),
        range
            .map(|r| format!("{}..{}", r.start(), r.end()))
            .unwrap_or_else(|| "all".to_string())
    );

    let limits = &settings.limits;
    let cities = aggregate::top_cities(customers.iter().copied(), limits.top_n);
    let categories = aggregate::category_ranking(orders.iter().copied(), limits);
    let payments = aggregate::payment_ranking(orders.iter().copied(), limits);

    EcommerceSalesResponse {
        title: settings.title.clone(),
        period: range.map(|r| AppliedPeriod {
            date_from: r.start(),
            date_to: r.end(),
        }),
        city_sales: CitySalesSection {
            title: CITY_SALES_TITLE.to_string(),
            rows: cities,
        },
        category_sales: ranking_section(
            categories,
            [CATEGORY_SALES_TITLE, MOST_SOLD_TITLE, LEAST_SOLD_TITLE],
            |r| CategorySalesRow {
                category: r.key,
                products: r.count,
            },
        ),
        payment_sales: ranking_section(
            payments,
            [
                PAYMENT_SALES_TITLE,
                MOST_USED_PAYMENT_TITLE,
                LEAST_USED_PAYMENT_TITLE,
            ],
            |r| PaymentSalesRow {
                payment_type: r.key,
                products: r.count,
            },
        ),
        caption: settings.caption.clone(),
    }
}

fn ranking_section<T>(
    ranking: Ranking,
    [title, most_title, least_title]: [&str; 3],
    to_row: impl Fn(KeyCount) -> T,
) -> RankingSection<T> {
    RankingSection {
        title: title.to_string(),
        most: RankedList {
            title: most_title.to_string(),
            rows: ranking.most.into_iter().map(&to_row).collect(),
        },
        least: RankedList {
            title: least_title.to_string(),
            rows: ranking.least.into_iter().map(&to_row).collect(),
        },
    }
}

fn parse_request_date(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<NaiveDate>, DashboardError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => NaiveDate::parse_from_str(v, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| DashboardError::InvalidDate {
                field,
                value: v.to_string(),
            }),
    }
}
