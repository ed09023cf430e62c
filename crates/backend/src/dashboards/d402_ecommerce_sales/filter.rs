use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};

use super::error::DashboardError;
use super::records::{GeolocationRecord, OrderRecord};

/// Inclusive calendar range, validated on construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DashboardError> {
        if start > end {
            return Err(DashboardError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// `[start 00:00:00, end 23:59:59]`, compared on the calendar day
    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        let day = timestamp.date();
        day >= self.start && day <= self.end
    }

    /// Complete a partially specified range with the dataset bounds.
    ///
    /// Returns None when neither bound is given (unfiltered dashboard).
    pub fn resolve(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        dataset_period: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Option<Self>, DashboardError> {
        let (start, end) = match (start, end) {
            (None, None) => return Ok(None),
            (Some(s), Some(e)) => (s, e),
            (Some(s), None) => (s, dataset_period.map(|(_, max)| max).unwrap_or(s)),
            (None, Some(e)) => (dataset_period.map(|(min, _)| min).unwrap_or(e), e),
        };
        Self::new(start, end).map(Some)
    }
}

/// Min and max purchase date, None if no order has a valid purchase time
pub fn purchase_period(orders: &[OrderRecord]) -> Option<(NaiveDate, NaiveDate)> {
    let mut dates = orders.iter().filter_map(|o| o.purchased_at.map(|ts| ts.date()));
    let first = dates.next()?;
    Some(dates.fold((first, first), |(min, max), d| (min.min(d), max.max(d))))
}

/// Orders purchased within the range. A missing purchase time is outside any range.
pub fn filter_orders_by_purchase<'a>(
    orders: &'a [OrderRecord],
    range: &DateRange,
) -> Vec<&'a OrderRecord> {
    orders
        .iter()
        .filter(|o| o.purchased_at.is_some_and(|ts| range.contains(ts)))
        .collect()
}

/// One row per customer, first occurrence wins.
///
/// Rows without a customer id form a single group of their own.
pub fn deduplicate_customers(geolocations: &[GeolocationRecord]) -> Vec<&GeolocationRecord> {
    let mut seen: HashSet<Option<&str>> = HashSet::new();
    geolocations
        .iter()
        .filter(|g| seen.insert(g.customer_unique_id.as_deref()))
        .collect()
}

/// Customer ids referenced by the given orders
pub fn customer_ids<'a>(orders: impl IntoIterator<Item = &'a OrderRecord>) -> HashSet<&'a str> {
    orders
        .into_iter()
        .filter_map(|o| o.customer_unique_id.as_deref())
        .collect()
}

/// Keep geolocation rows whose customer is in `customers`
pub fn restrict_to_customers<'a>(
    geolocations: impl IntoIterator<Item = &'a GeolocationRecord>,
    customers: &HashSet<&str>,
) -> Vec<&'a GeolocationRecord> {
    geolocations
        .into_iter()
        .filter(|g| {
            g.customer_unique_id
                .as_deref()
                .is_some_and(|id| customers.contains(id))
        })
        .collect()
}
