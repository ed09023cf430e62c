use std::cmp::Ordering;
use std::collections::BTreeMap;

use contracts::dashboards::d402_ecommerce_sales::CitySalesRow;
use serde::Deserialize;

use super::records::{GeolocationRecord, OrderRecord, UNDEFINED_PAYMENT_TYPE};

/// Which set the "least" view is taken from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeastSoldBasis {
    /// Bottom of the already truncated top list (historical dashboard output)
    #[default]
    TopSlice,
    /// True bottom of every group
    AllGroups,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingLimits {
    /// Rows kept in a summary table
    pub top_n: usize,
    /// Rows per chart of a most/least pair
    pub view_n: usize,
    pub least_basis: LeastSoldBasis,
}

impl Default for RankingLimits {
    fn default() -> Self {
        Self {
            top_n: 10,
            view_n: 5,
            least_basis: LeastSoldBasis::TopSlice,
        }
    }
}

/// Number of order rows for one key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCount {
    pub key: String,
    pub count: u64,
}

/// Summary table plus the two chart views derived from it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ranking {
    /// Descending, truncated to `top_n`
    pub top: Vec<KeyCount>,
    /// First `view_n` of `top`
    pub most: Vec<KeyCount>,
    /// Ascending, truncated to `view_n`
    pub least: Vec<KeyCount>,
}

// Ties are broken on the key so repeated runs give identical tables.
fn descending(a: &KeyCount, b: &KeyCount) -> Ordering {
    b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key))
}

fn ascending(a: &KeyCount, b: &KeyCount) -> Ordering {
    a.count.cmp(&b.count).then_with(|| a.key.cmp(&b.key))
}

/// Count order rows per key, sorted descending.
///
/// Rows with a missing key or a missing product id are not counted.
pub fn count_orders_by<'a, F>(
    orders: impl IntoIterator<Item = &'a OrderRecord>,
    key_of: F,
) -> Vec<KeyCount>
where
    F: Fn(&'a OrderRecord) -> Option<&'a str>,
{
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for order in orders {
        if order.product_id.is_none() {
            continue;
        }
        if let Some(key) = key_of(order) {
            *counts.entry(key).or_insert(0) += 1;
        }
    }

    let mut rows: Vec<KeyCount> = counts
        .into_iter()
        .map(|(key, count)| KeyCount {
            key: key.to_string(),
            count,
        })
        .collect();
    rows.sort_by(descending);
    rows
}

/// Build the top table and the most/least views from a full descending table
pub fn rank(all: Vec<KeyCount>, limits: &RankingLimits) -> Ranking {
    let top: Vec<KeyCount> = all.iter().take(limits.top_n).cloned().collect();
    let most: Vec<KeyCount> = top.iter().take(limits.view_n).cloned().collect();

    let mut least = match limits.least_basis {
        LeastSoldBasis::TopSlice => top.clone(),
        LeastSoldBasis::AllGroups => all,
    };
    least.sort_by(ascending);
    least.truncate(limits.view_n);

    Ranking { top, most, least }
}

/// Order rows per product category
pub fn category_ranking<'a>(
    orders: impl IntoIterator<Item = &'a OrderRecord>,
    limits: &RankingLimits,
) -> Ranking {
    let all = count_orders_by(orders, |o| o.product_category.as_deref());
    rank(all, limits)
}

/// Order rows per payment type, `not_defined` excluded
pub fn payment_ranking<'a>(
    orders: impl IntoIterator<Item = &'a OrderRecord>,
    limits: &RankingLimits,
) -> Ranking {
    let all = count_orders_by(orders, |o| {
        o.payment_type
            .as_deref()
            .filter(|p| *p != UNDEFINED_PAYMENT_TYPE)
    });
    rank(all, limits)
}

/// Customers per city with their share of the total, untruncated.
///
/// Rows without a city are left out of both the groups and the total.
pub fn city_sales_all<'a>(
    geolocations: impl IntoIterator<Item = &'a GeolocationRecord>,
) -> Vec<CitySalesRow> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for geo in geolocations {
        if let Some(city) = geo.city.as_deref() {
            *counts.entry(city).or_insert(0) += 1;
        }
    }

    let total: u64 = counts.values().sum();
    if total == 0 {
        return Vec::new();
    }

    let mut rows: Vec<(&str, u64)> = counts.into_iter().collect();
    // percentage is monotonic in the count
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    rows.into_iter()
        .map(|(city, count)| CitySalesRow {
            city: city.to_string(),
            total_sales: count,
            percentage: count as f64 / total as f64 * 100.0,
        })
        .collect()
}

/// Top cities by share of customers
pub fn top_cities<'a>(
    geolocations: impl IntoIterator<Item = &'a GeolocationRecord>,
    top_n: usize,
) -> Vec<CitySalesRow> {
    let mut rows = city_sales_all(geolocations);
    rows.truncate(top_n);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(category: &str, payment: &str) -> OrderRecord {
        OrderRecord {
            product_id: Some("p".to_string()),
            product_category: Some(category.to_string()).filter(|c| !c.is_empty()),
            payment_type: Some(payment.to_string()).filter(|p| !p.is_empty()),
            ..Default::default()
        }
    }

    fn geo(customer: &str, city: Option<&str>) -> GeolocationRecord {
        GeolocationRecord {
            source_row: 0,
            customer_unique_id: Some(customer.to_string()),
            city: city.map(str::to_string),
        }
    }

    fn pairs(rows: &[KeyCount]) -> Vec<(&str, u64)> {
        rows.iter().map(|r| (r.key.as_str(), r.count)).collect()
    }

    #[test]
    fn test_category_most_and_least() {
        let orders = vec![
            order("A", "credit_card"),
            order("A", "credit_card"),
            order("B", "credit_card"),
        ];
        let ranking = category_ranking(&orders, &RankingLimits::default());
        assert_eq!(pairs(&ranking.most), vec![("A", 2), ("B", 1)]);
        assert_eq!(pairs(&ranking.least), vec![("B", 1), ("A", 2)]);
    }

    #[test]
    fn test_rows_without_product_or_category_are_not_counted() {
        let mut no_product = order("A", "boleto");
        no_product.product_id = None;
        let orders = vec![order("A", "boleto"), no_product, order("", "boleto")];
        let ranking = category_ranking(&orders, &RankingLimits::default());
        assert_eq!(pairs(&ranking.top), vec![("A", 1)]);
    }

    #[test]
    fn test_ties_break_on_key() {
        let orders = vec![
            order("toys", "voucher"),
            order("bed_bath_table", "voucher"),
            order("auto", "voucher"),
        ];
        let ranking = category_ranking(&orders, &RankingLimits::default());
        assert_eq!(
            pairs(&ranking.top),
            vec![("auto", 1), ("bed_bath_table", 1), ("toys", 1)]
        );
        assert_eq!(pairs(&ranking.least), pairs(&ranking.top));
    }

    fn spread_orders() -> Vec<OrderRecord> {
        // category "cNN" appears NN times, 12 categories in total
        (1..=12u64)
            .flat_map(|n| (0..n).map(move |_| order(&format!("c{n:02}"), "boleto")))
            .collect()
    }

    #[test]
    fn test_least_view_from_top_slice() {
        let ranking = category_ranking(&spread_orders(), &RankingLimits::default());
        assert_eq!(ranking.top.len(), 10);
        assert_eq!(ranking.top[0].key, "c12");
        assert_eq!(ranking.most.len(), 5);
        assert_eq!(
            pairs(&ranking.least),
            vec![("c03", 3), ("c04", 4), ("c05", 5), ("c06", 6), ("c07", 7)]
        );
    }

    #[test]
    fn test_least_view_from_all_groups() {
        let limits = RankingLimits {
            least_basis: LeastSoldBasis::AllGroups,
            ..Default::default()
        };
        let ranking = category_ranking(&spread_orders(), &limits);
        assert_eq!(ranking.top.len(), 10);
        assert_eq!(
            pairs(&ranking.least),
            vec![("c01", 1), ("c02", 2), ("c03", 3), ("c04", 4), ("c05", 5)]
        );
    }

    #[test]
    fn test_payment_excludes_not_defined() {
        let orders = vec![
            order("A", "credit_card"),
            order("A", "not_defined"),
            order("A", "not_defined"),
            order("A", "not_defined"),
            order("B", "boleto"),
            order("B", "credit_card"),
        ];
        let ranking = payment_ranking(&orders, &RankingLimits::default());
        assert_eq!(pairs(&ranking.top), vec![("credit_card", 2), ("boleto", 1)]);
        for view in [&ranking.top, &ranking.most, &ranking.least] {
            assert!(view.iter().all(|r| r.key != UNDEFINED_PAYMENT_TYPE));
        }
    }

    #[test]
    fn test_city_percentages_sum_to_hundred() {
        let cities = [
            "sao paulo", "rio de janeiro", "belo horizonte", "brasilia", "curitiba",
            "campinas", "porto alegre", "salvador", "guarulhos", "niteroi", "santos",
            "recife",
        ];
        let rows: Vec<GeolocationRecord> = cities
            .iter()
            .enumerate()
            .flat_map(|(i, city)| (0..=i).map(move |n| geo(&format!("{city}-{n}"), Some(*city))))
            .chain(std::iter::once(geo("nowhere", None)))
            .collect();

        let all = city_sales_all(&rows);
        assert_eq!(all.len(), cities.len());
        let sum: f64 = all.iter().map(|r| r.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-9);

        let top = top_cities(&rows, 10);
        assert_eq!(top.len(), 10);
        assert_eq!(top[0].city, "recife");
        assert!(top.windows(2).all(|w| w[0].percentage >= w[1].percentage));
    }

    #[test]
    fn test_city_share_values() {
        let rows = vec![
            geo("c1", Some("sao paulo")),
            geo("c2", Some("sao paulo")),
            geo("c3", Some("santos")),
            geo("c4", Some("campinas")),
        ];
        let all = city_sales_all(&rows);
        assert_eq!(all[0].city, "sao paulo");
        assert_eq!(all[0].total_sales, 2);
        assert!((all[0].percentage - 50.0).abs() < 1e-9);
        // equal shares ordered by city name
        assert_eq!(all[1].city, "campinas");
        assert_eq!(all[2].city, "santos");
    }

    #[test]
    fn test_empty_inputs_give_empty_tables() {
        let ranking = category_ranking(&Vec::<OrderRecord>::new(), &RankingLimits::default());
        assert_eq!(ranking, Ranking::default());
        assert!(city_sales_all(&Vec::<GeolocationRecord>::new()).is_empty());
    }
}
