use chrono::NaiveDateTime;
use serde::Deserialize;

/// Payment type marker for orders without a usable payment method
pub const UNDEFINED_PAYMENT_TYPE: &str = "not_defined";

/// One product line of a customer order, joined with its dimensions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderRecord {
    /// Position of the row in the source CSV body (0-based)
    pub source_row: usize,
    pub order_id: Option<String>,
    pub customer_unique_id: Option<String>,
    pub product_id: Option<String>,
    pub product_category: Option<String>,
    pub payment_type: Option<String>,
    pub purchased_at: Option<NaiveDateTime>,
    pub approved_at: Option<NaiveDateTime>,
    pub delivered_carrier_at: Option<NaiveDateTime>,
    pub delivered_customer_at: Option<NaiveDateTime>,
    pub estimated_delivery_at: Option<NaiveDateTime>,
    pub shipping_limit_at: Option<NaiveDateTime>,
}

/// Customer location sample
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeolocationRecord {
    pub source_row: usize,
    pub customer_unique_id: Option<String>,
    pub city: Option<String>,
}

/// Raw CSV row of the orders table. Unknown columns are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct OrderCsvRow {
    order_id: Option<String>,
    customer_unique_id: Option<String>,
    product_id: Option<String>,
    product_category_name_english: Option<String>,
    product_category_name: Option<String>,
    payment_type: Option<String>,
    order_purchase_timestamp: Option<String>,
    order_approved_at: Option<String>,
    order_delivered_carrier_date: Option<String>,
    order_delivered_customer_date: Option<String>,
    order_estimated_delivery_date: Option<String>,
    shipping_limit_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct GeolocationCsvRow {
    customer_unique_id: Option<String>,
    geolocation_city: Option<String>,
}

impl OrderCsvRow {
    pub(crate) fn into_record(self, source_row: usize) -> OrderRecord {
        OrderRecord {
            source_row,
            order_id: non_empty(self.order_id),
            customer_unique_id: non_empty(self.customer_unique_id),
            product_id: non_empty(self.product_id),
            product_category: non_empty(self.product_category_name_english)
                .or_else(|| non_empty(self.product_category_name)),
            payment_type: non_empty(self.payment_type),
            purchased_at: parse_timestamp_opt(self.order_purchase_timestamp),
            approved_at: parse_timestamp_opt(self.order_approved_at),
            delivered_carrier_at: parse_timestamp_opt(self.order_delivered_carrier_date),
            delivered_customer_at: parse_timestamp_opt(self.order_delivered_customer_date),
            estimated_delivery_at: parse_timestamp_opt(self.order_estimated_delivery_date),
            shipping_limit_at: parse_timestamp_opt(self.shipping_limit_date),
        }
    }
}

impl GeolocationCsvRow {
    pub(crate) fn into_record(self, source_row: usize) -> GeolocationRecord {
        GeolocationRecord {
            source_row,
            customer_unique_id: non_empty(self.customer_unique_id),
            city: non_empty(self.geolocation_city),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_timestamp_opt(value: Option<String>) -> Option<NaiveDateTime> {
    value.as_deref().and_then(parse_timestamp)
}

/// Parse a dataset timestamp (supports multiple formats)
///
/// Returns None for anything unparseable, the caller keeps the row.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    // "YYYY-MM-DD HH:MM:SS", optionally with fractional seconds
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive);
    }

    // "YYYY-MM-DDTHH:MM:SS"
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive);
    }

    // RFC3339 with offset, normalized to UTC
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }

    // Date only, widened to midnight
    if let Ok(date) = chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    None
}
