//! Read-only projections over a user's products: the date timeline, spending and
//! category analytics, waste figures, and dashboard counters.
//!
//! Everything here is a pure function of the product slice and an explicit `today`.
//! Nothing is persisted; callers recompute on demand.

use crate::{
    core::status::{self, Status},
    entities::{ReminderType, category, product},
};
use chrono::{Datelike, Months, NaiveDate};
use std::collections::{BTreeMap, HashMap};

/// Fallback bucket for products without a (known) category.
pub const UNCATEGORIZED: &str = "Uncategorized";
/// Color used for the fallback bucket.
pub const UNCATEGORIZED_COLOR: &str = "#8884d8";
/// Horizon of the dashboard's "expiring soon" counters, inclusive.
pub const EXPIRING_SOON_DAYS: i64 = 30;

/// Which dates the timeline shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimelineFilter {
    /// Expiry and warranty dates
    #[default]
    All,
    /// Expiry dates only
    Expiry,
    /// Warranty dates only
    Warranty,
}

impl TimelineFilter {
    const fn admits(self, kind: ReminderType) -> bool {
        matches!(
            (self, kind),
            (Self::All, _)
                | (Self::Expiry, ReminderType::Expiry)
                | (Self::Warranty, ReminderType::Warranty)
        )
    }
}

/// One tracked date on the timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntry {
    /// Product the date belongs to
    pub product_id: i64,
    /// Product name
    pub product_name: String,
    /// The tracked date
    pub date: NaiveDate,
    /// Expiry or warranty
    pub kind: ReminderType,
    /// `date - today` in days
    pub days_remaining: i64,
    /// Urgency bucket
    pub status: Status,
}

/// Lists every tracked date of non-consumed products, soonest first.
#[must_use]
pub fn build_timeline(
    products: &[product::Model],
    today: NaiveDate,
    filter: TimelineFilter,
) -> Vec<TimelineEntry> {
    let mut entries: Vec<TimelineEntry> = products
        .iter()
        .filter(|p| !p.is_consumed)
        .flat_map(|p| {
            [
                (ReminderType::Expiry, p.expiry_date),
                (ReminderType::Warranty, p.warranty_date),
            ]
            .into_iter()
            .filter(|(kind, _)| filter.admits(*kind))
            .filter_map(move |(kind, date)| {
                let date = date?;
                Some(TimelineEntry {
                    product_id: p.id,
                    product_name: p.name.clone(),
                    date,
                    kind,
                    days_remaining: status::days_remaining(date, today),
                    status: status::classify_days(status::days_remaining(date, today)),
                })
            })
        })
        .collect();

    entries.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then(a.product_id.cmp(&b.product_id))
            .then((a.kind == ReminderType::Warranty).cmp(&(b.kind == ReminderType::Warranty)))
    });
    entries
}

/// Trailing analytics window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AnalyticsWindow {
    /// The current month and the five before it
    #[default]
    SixMonths,
    /// The current month and the eleven before it
    TwelveMonths,
}

impl AnalyticsWindow {
    /// Number of monthly buckets.
    #[must_use]
    pub const fn months(self) -> u32 {
        match self {
            Self::SixMonths => 6,
            Self::TwelveMonths => 12,
        }
    }

    /// First day of the oldest month in the window.
    #[must_use]
    pub fn start(self, today: NaiveDate) -> NaiveDate {
        let this_month = first_of_month(today);
        this_month
            .checked_sub_months(Months::new(self.months() - 1))
            .unwrap_or(NaiveDate::MIN)
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Date a product is attributed to: purchase date, else creation date.
#[must_use]
pub fn attribution_date(product: &product::Model) -> NaiveDate {
    product
        .purchase_date
        .unwrap_or_else(|| product.created_at.date_naive())
}

fn in_window<'a>(
    products: &'a [product::Model],
    today: NaiveDate,
    window: AnalyticsWindow,
) -> impl Iterator<Item = &'a product::Model> {
    let start = window.start(today);
    products.iter().filter(move |p| attribution_date(p) >= start)
}

/// Spending in one calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySpending {
    /// First day of the month
    pub month: NaiveDate,
    /// Sum of known prices
    pub amount: f64,
    /// Products attributed to the month
    pub count: u32,
}

/// Spending per month over the window, oldest first, with empty months included.
#[must_use]
pub fn spending_trend(
    products: &[product::Model],
    today: NaiveDate,
    window: AnalyticsWindow,
) -> Vec<MonthlySpending> {
    let start = window.start(today);
    let mut buckets: BTreeMap<NaiveDate, MonthlySpending> = (0..window.months())
        .filter_map(|offset| start.checked_add_months(Months::new(offset)))
        .map(|month| {
            (
                month,
                MonthlySpending {
                    month,
                    amount: 0.0,
                    count: 0,
                },
            )
        })
        .collect();

    for product in in_window(products, today, window) {
        if let Some(bucket) = buckets.get_mut(&first_of_month(attribution_date(product))) {
            bucket.amount += product.price.unwrap_or(0.0);
            bucket.count += 1;
        }
    }
    buckets.into_values().collect()
}

/// Spending attributed to one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySpending {
    /// Category name, or [`UNCATEGORIZED`]
    pub name: String,
    /// Display color
    pub color: String,
    /// Products in the category
    pub count: u32,
    /// Sum of known prices
    pub spending: f64,
}

/// Spending per category over the window, highest spend first.
#[must_use]
pub fn category_breakdown(
    products: &[product::Model],
    categories: &[category::Model],
    today: NaiveDate,
    window: AnalyticsWindow,
) -> Vec<CategorySpending> {
    let by_id: HashMap<i64, &category::Model> = categories.iter().map(|c| (c.id, c)).collect();
    let mut groups: HashMap<String, CategorySpending> = HashMap::new();

    for product in in_window(products, today, window) {
        let category = product.category_id.and_then(|id| by_id.get(&id));
        let name = category.map_or(UNCATEGORIZED, |c| c.name.as_str());
        let entry = groups.entry(name.to_string()).or_insert_with(|| CategorySpending {
            name: name.to_string(),
            color: category
                .and_then(|c| c.color.clone())
                .unwrap_or_else(|| UNCATEGORIZED_COLOR.to_string()),
            count: 0,
            spending: 0.0,
        });
        entry.count += 1;
        entry.spending += product.price.unwrap_or(0.0);
    }

    let mut breakdown: Vec<CategorySpending> = groups.into_values().collect();
    breakdown.sort_by(|a, b| {
        b.spending
            .total_cmp(&a.spending)
            .then_with(|| a.name.cmp(&b.name))
    });
    breakdown
}

/// Waste figures for the window.
#[derive(Debug, Clone, PartialEq)]
pub struct WasteSummary {
    /// Past expiry and never consumed
    pub expired: u32,
    /// Marked consumed
    pub consumed: u32,
    /// Neither consumed nor expired
    pub active: u32,
    /// Products in the window
    pub total: u32,
    /// `expired / total`, zero for an empty window
    pub waste_rate: f64,
}

/// Counts expired, consumed and active products in the window.
#[must_use]
pub fn waste_summary(
    products: &[product::Model],
    today: NaiveDate,
    window: AnalyticsWindow,
) -> WasteSummary {
    let mut summary = WasteSummary {
        expired: 0,
        consumed: 0,
        active: 0,
        total: 0,
        waste_rate: 0.0,
    };
    for product in in_window(products, today, window) {
        summary.total += 1;
        if product.is_consumed {
            summary.consumed += 1;
        } else if product.expiry_date.is_some_and(|d| d < today) {
            summary.expired += 1;
        } else {
            summary.active += 1;
        }
    }
    if summary.total > 0 {
        summary.waste_rate = f64::from(summary.expired) / f64::from(summary.total);
    }
    summary
}

/// Headline counters for the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardStats {
    /// All products, consumed included
    pub total_products: u32,
    /// Expiry within [`EXPIRING_SOON_DAYS`]
    pub expiring_soon: u32,
    /// Warranty ending within [`EXPIRING_SOON_DAYS`]
    pub warranty_expiring: u32,
    /// Past expiry, not consumed
    pub expired: u32,
    /// Product count per category name
    pub per_category: BTreeMap<String, u32>,
}

/// Computes dashboard counters. Consumed products only count toward totals.
#[must_use]
pub fn dashboard_stats(
    products: &[product::Model],
    categories: &[category::Model],
    today: NaiveDate,
) -> DashboardStats {
    let names: HashMap<i64, &str> = categories.iter().map(|c| (c.id, c.name.as_str())).collect();
    let soon = |date: Option<NaiveDate>| {
        date.is_some_and(|d| (0..=EXPIRING_SOON_DAYS).contains(&status::days_remaining(d, today)))
    };

    let mut stats = DashboardStats::default();
    for product in products {
        stats.total_products += 1;
        let name = product
            .category_id
            .and_then(|id| names.get(&id).copied())
            .unwrap_or(UNCATEGORIZED);
        *stats.per_category.entry(name.to_string()).or_default() += 1;

        if product.is_consumed {
            continue;
        }
        if soon(product.expiry_date) {
            stats.expiring_soon += 1;
        }
        if soon(product.warranty_date) {
            stats.warranty_expiring += 1;
        }
        if product.expiry_date.is_some_and(|d| d < today) {
            stats.expired += 1;
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn item(id: i64, name: &str) -> product::Model {
        product::Model {
            id,
            user_id: "alice".to_string(),
            family_id: None,
            name: name.to_string(),
            brand: None,
            category_id: None,
            batch_number: None,
            purchase_date: None,
            expiry_date: None,
            warranty_date: None,
            price: None,
            store_name: None,
            barcode: None,
            notes: None,
            is_consumed: false,
            created_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).single().unwrap_or_default(),
            updated_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).single().unwrap_or_default(),
        }
    }

    fn purchased(id: i64, on: NaiveDate, price: Option<f64>) -> product::Model {
        product::Model {
            purchase_date: Some(on),
            price,
            ..item(id, &format!("p{id}"))
        }
    }

    fn cat(id: i64, name: &str) -> category::Model {
        category::Model {
            id,
            user_id: "alice".to_string(),
            name: name.to_string(),
            icon: None,
            color: Some("#22c55e".to_string()),
            description: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_default(),
        }
    }

    #[test]
    fn test_timeline_sorted_filtered_and_classified() {
        let today = date(2024, 6, 15);
        let milk = product::Model {
            expiry_date: Some(today + Duration::days(2)),
            warranty_date: None,
            ..item(1, "Milk")
        };
        let tv = product::Model {
            expiry_date: None,
            warranty_date: Some(today - Duration::days(1)),
            ..item(2, "TV")
        };
        let eaten = product::Model {
            expiry_date: Some(today),
            is_consumed: true,
            ..item(3, "Bread")
        };
        let products = vec![milk, tv, eaten];

        let all = build_timeline(&products, today, TimelineFilter::All);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].product_name, "TV");
        assert_eq!(all[0].status, Status::Expired { days_past: 1 });
        assert_eq!(all[1].status, Status::Critical);
        assert_eq!(all[1].days_remaining, 2);

        let expiry_only = build_timeline(&products, today, TimelineFilter::Expiry);
        assert_eq!(expiry_only.len(), 1);
        assert_eq!(expiry_only[0].kind, ReminderType::Expiry);
    }

    #[test]
    fn test_same_month_prices_sum_with_nulls_as_zero() {
        let today = date(2024, 6, 20);
        let products = vec![
            purchased(1, date(2024, 4, 3), Some(10.0)),
            purchased(2, date(2024, 4, 17), Some(20.0)),
            purchased(3, date(2024, 4, 30), None),
        ];

        let trend = spending_trend(&products, today, AnalyticsWindow::SixMonths);
        assert_eq!(trend.len(), 6);
        assert_eq!(trend[0].month, date(2024, 1, 1));
        assert_eq!(trend[5].month, date(2024, 6, 1));

        let april = trend
            .iter()
            .find(|m| m.month == date(2024, 4, 1))
            .unwrap();
        assert!((april.amount - 30.0).abs() < f64::EPSILON);
        assert_eq!(april.count, 3);
        assert_eq!(trend.iter().map(|m| m.count).sum::<u32>(), 3);
    }

    #[test]
    fn test_trend_is_dense_across_year_boundary() {
        let today = date(2025, 2, 10);
        let trend = spending_trend(&[], today, AnalyticsWindow::TwelveMonths);
        assert_eq!(trend.len(), 12);
        assert_eq!(trend[0].month, date(2024, 3, 1));
        assert!(trend.iter().all(|m| m.count == 0 && m.amount == 0.0));
    }

    #[test]
    fn test_creation_date_used_without_purchase_date() {
        let today = date(2024, 6, 20);
        let trend = spending_trend(&[item(1, "Soap")], today, AnalyticsWindow::SixMonths);
        assert_eq!(trend[5].count, 1);
    }

    #[test]
    fn test_category_breakdown() {
        let today = date(2024, 6, 20);
        let categories = vec![cat(1, "Food"), cat(2, "Electronics")];
        let products = vec![
            product::Model {
                category_id: Some(1),
                ..purchased(1, date(2024, 6, 1), Some(5.0))
            },
            product::Model {
                category_id: Some(2),
                ..purchased(2, date(2024, 6, 2), Some(300.0))
            },
            product::Model {
                category_id: Some(99),
                ..purchased(3, date(2024, 6, 3), Some(7.5))
            },
            // Outside the window
            product::Model {
                category_id: Some(1),
                ..purchased(4, date(2023, 1, 1), Some(1000.0))
            },
        ];

        let breakdown =
            category_breakdown(&products, &categories, today, AnalyticsWindow::SixMonths);
        let names: Vec<_> = breakdown.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Electronics", UNCATEGORIZED, "Food"]);
        assert_eq!(breakdown[1].color, UNCATEGORIZED_COLOR);
        assert_eq!(breakdown[2].count, 1);
    }

    #[test]
    fn test_expired_product_counts_as_waste() {
        let today = date(2024, 6, 20);
        let products = vec![
            product::Model {
                expiry_date: Some(today - Duration::days(10)),
                ..purchased(1, date(2024, 5, 1), None)
            },
            product::Model {
                is_consumed: true,
                expiry_date: Some(today - Duration::days(3)),
                ..purchased(2, date(2024, 5, 1), None)
            },
            product::Model {
                expiry_date: Some(today),
                ..purchased(3, date(2024, 5, 1), None)
            },
            purchased(4, date(2024, 5, 1), None),
        ];

        let summary = waste_summary(&products, today, AnalyticsWindow::SixMonths);
        assert_eq!(summary.expired, 1);
        assert_eq!(summary.consumed, 1);
        assert_eq!(summary.active, 2);
        assert_eq!(summary.total, 4);
        assert!((summary.waste_rate - 0.25).abs() < f64::EPSILON);
        assert!((0.0..=1.0).contains(&summary.waste_rate));
    }

    #[test]
    fn test_waste_rate_zero_for_empty_window() {
        let summary = waste_summary(&[], date(2024, 6, 20), AnalyticsWindow::TwelveMonths);
        assert_eq!(summary.total, 0);
        assert!(summary.waste_rate.abs() < f64::EPSILON);
    }

    #[test]
    fn test_dashboard_stats() {
        let today = date(2024, 6, 20);
        let categories = vec![cat(1, "Food")];
        let products = vec![
            product::Model {
                category_id: Some(1),
                expiry_date: Some(today + Duration::days(30)),
                ..item(1, "Cheese")
            },
            product::Model {
                expiry_date: Some(today + Duration::days(31)),
                warranty_date: Some(today),
                ..item(2, "Kettle")
            },
            product::Model {
                expiry_date: Some(today - Duration::days(1)),
                ..item(3, "Ham")
            },
            product::Model {
                expiry_date: Some(today + Duration::days(1)),
                is_consumed: true,
                ..item(4, "Juice")
            },
        ];

        let stats = dashboard_stats(&products, &categories, today);
        assert_eq!(stats.total_products, 4);
        assert_eq!(stats.expiring_soon, 1);
        assert_eq!(stats.warranty_expiring, 1);
        assert_eq!(stats.expired, 1);
        assert_eq!(stats.per_category.get("Food"), Some(&1));
        assert_eq!(stats.per_category.get(UNCATEGORIZED), Some(&3));
    }
}
