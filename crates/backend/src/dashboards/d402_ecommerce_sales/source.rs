use std::cmp::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::error::DashboardError;
use super::records::{GeolocationCsvRow, GeolocationRecord, OrderCsvRow, OrderRecord};
use crate::shared::config::SourcesConfig;

/// Source tables of the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetTable {
    Orders,
    Geolocation,
}

impl DatasetTable {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Orders => "orders",
            Self::Geolocation => "geolocation",
        }
    }

    /// Columns that must be present in the header row.
    /// Each entry lists accepted alternatives.
    fn required_columns(&self) -> &'static [&'static [&'static str]] {
        match self {
            Self::Orders => &[
                &["customer_unique_id"],
                &["product_id"],
                &["payment_type"],
                &["product_category_name_english", "product_category_name"],
                &["order_purchase_timestamp"],
                &["order_approved_at"],
            ],
            Self::Geolocation => &[&["customer_unique_id"], &["geolocation_city"]],
        }
    }
}

/// Провайдер исходных CSV-таблиц
#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// Fetch the raw CSV text of a table
    async fn fetch_table(&self, table: DatasetTable) -> Result<String, DashboardError>;
}

/// Both tables, decoded and ordered
#[derive(Debug, Clone, Default)]
pub struct Datasets {
    /// Sorted ascending by approval time, missing approval last
    pub orders: Vec<OrderRecord>,
    /// Source order, duplicates per customer included
    pub geolocations: Vec<GeolocationRecord>,
}

/// Fetch and decode both tables. Any failure aborts the whole load.
pub async fn load_datasets(source: &dyn DatasetSource) -> Result<Datasets, DashboardError> {
    let orders_csv = source.fetch_table(DatasetTable::Orders).await?;
    let mut orders = decode_orders(&orders_csv)?;
    sort_by_approval(&mut orders);

    let geolocation_csv = source.fetch_table(DatasetTable::Geolocation).await?;
    let geolocations = decode_geolocations(&geolocation_csv)?;

    tracing::info!(
        "D402: Loaded {} order rows and {} geolocation rows",
        orders.len(),
        geolocations.len()
    );

    Ok(Datasets {
        orders,
        geolocations,
    })
}

pub fn decode_orders(csv_text: &str) -> Result<Vec<OrderRecord>, DashboardError> {
    decode_table::<OrderCsvRow, _>(DatasetTable::Orders, csv_text, |row, i| row.into_record(i))
}

pub fn decode_geolocations(csv_text: &str) -> Result<Vec<GeolocationRecord>, DashboardError> {
    decode_table::<GeolocationCsvRow, _>(DatasetTable::Geolocation, csv_text, |row, i| {
        row.into_record(i)
    })
}

fn decode_table<R, T>(
    table: DatasetTable,
    csv_text: &str,
    convert: impl Fn(R, usize) -> T,
) -> Result<Vec<T>, DashboardError>
where
    R: DeserializeOwned,
{
    // Strip UTF-8 BOM if present
    let text = csv_text.trim_start_matches('\u{FEFF}');

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| {
            DashboardError::data_unavailable(table.name(), format!("unreadable header row: {e}"))
        })?
        .clone();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(DashboardError::data_unavailable(table.name(), "no header row"));
    }

    for alternatives in table.required_columns() {
        if !alternatives.iter().any(|c| headers.iter().any(|h| h == *c)) {
            return Err(DashboardError::data_unavailable(
                table.name(),
                format!("missing column {}", alternatives.join(" | ")),
            ));
        }
    }

    let mut rows = Vec::new();
    for (i, result) in reader.deserialize::<R>().enumerate() {
        let row = result.map_err(|e| {
            DashboardError::data_unavailable(table.name(), format!("malformed CSV record: {e}"))
        })?;
        rows.push(convert(row, i));
    }

    Ok(rows)
}

/// Stable ascending sort on approval time, rows without one go last
pub fn sort_by_approval(orders: &mut [OrderRecord]) {
    orders.sort_by(|a, b| match (a.approved_at, b.approved_at) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// HTTP-источник: таблицы читаются по URL при каждом запросе
pub struct HttpDatasetSource {
    client: reqwest::Client,
    orders_url: String,
    geolocation_url: String,
}

impl HttpDatasetSource {
    pub fn new(config: &SourcesConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            orders_url: config.orders_url.clone(),
            geolocation_url: config.geolocation_url.clone(),
        })
    }

    fn url_for(&self, table: DatasetTable) -> &str {
        match table {
            DatasetTable::Orders => &self.orders_url,
            DatasetTable::Geolocation => &self.geolocation_url,
        }
    }
}

#[async_trait]
impl DatasetSource for HttpDatasetSource {
    async fn fetch_table(&self, table: DatasetTable) -> Result<String, DashboardError> {
        let url = self.url_for(table);
        let start = std::time::Instant::now();
        tracing::debug!("D402: GET {} ({})", url, table.name());

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DashboardError::data_unavailable(table.name(), e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(
                "D402: {} dataset request failed with status {}",
                table.name(),
                status
            );
            return Err(DashboardError::data_unavailable(
                table.name(),
                format!("HTTP status {status}"),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| DashboardError::data_unavailable(table.name(), e))?;

        tracing::info!(
            "D402: Fetched {} dataset: {} bytes in {}ms",
            table.name(),
            body.len(),
            start.elapsed().as_millis()
        );

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const ORDERS_CSV: &str = "\u{FEFF}order_id,customer_unique_id,product_id,product_category_name,product_category_name_english,payment_type,order_purchase_timestamp,order_approved_at,price\n\
o1,c1,p1,beleza_saude,health_beauty,credit_card,2018-01-01 10:00:00,2018-01-02 09:00:00,10.5\n\
o2,c2,p2,,,boleto,2018-01-03 10:00:00,,20\n\
o3,c3,p3,esporte_lazer,sports_leisure,voucher,not a date,2018-01-01 08:00:00,30\n";

    #[test]
    fn test_decode_orders_ignores_unknown_columns_and_coerces_dates() {
        let orders = decode_orders(ORDERS_CSV).unwrap();
        assert_eq!(orders.len(), 3);
        assert_eq!(orders[0].product_category.as_deref(), Some("health_beauty"));
        assert_eq!(orders[1].product_category, None);
        assert_eq!(orders[1].approved_at, None);
        assert_eq!(orders[2].purchased_at, None);
        assert_eq!(orders[2].source_row, 2);
    }

    #[test]
    fn test_sort_by_approval_puts_missing_last() {
        let mut orders = decode_orders(ORDERS_CSV).unwrap();
        sort_by_approval(&mut orders);
        let ids: Vec<_> = orders.iter().map(|o| o.order_id.as_deref().unwrap()).collect();
        assert_eq!(ids, vec!["o3", "o1", "o2"]);
        assert_eq!(
            orders[0].approved_at.unwrap().date(),
            NaiveDate::from_ymd_opt(2018, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_decode_rejects_missing_required_column() {
        let err = decode_geolocations("customer_unique_id,geolocation_lat\nc1,-23.5\n").unwrap_err();
        assert!(matches!(err, DashboardError::DataUnavailable { .. }));
        assert!(err.to_string().contains("geolocation_city"));
    }

    #[test]
    fn test_decode_rejects_ragged_rows() {
        let err = decode_geolocations("customer_unique_id,geolocation_city\nc1,sao paulo,extra\n")
            .unwrap_err();
        assert!(matches!(err, DashboardError::DataUnavailable { .. }));
    }

    #[test]
    fn test_decode_rejects_empty_body() {
        let err = decode_orders("").unwrap_err();
        assert!(matches!(err, DashboardError::DataUnavailable { .. }));
    }

    #[test]
    fn test_category_falls_back_to_original_column() {
        let csv = "customer_unique_id,product_id,payment_type,product_category_name,order_purchase_timestamp,order_approved_at\n\
c1,p1,boleto,moveis_decoracao,2018-01-01 10:00:00,2018-01-01 11:00:00\n";
        let orders = decode_orders(csv).unwrap();
        assert_eq!(orders[0].product_category.as_deref(), Some("moveis_decoracao"));
    }
}
