//! Property-based tests for the revenue analytics helpers.

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use ecommerce_admin_api::services::analytics::{
    bucket_by_day, bucket_by_month, percentage_change, SalePoint,
};

fn cents_strategy() -> impl Strategy<Value = i64> {
    1i64..10_000_000
}

fn sales_strategy() -> impl Strategy<Value = Vec<SalePoint>> {
    prop::collection::vec((0i64..24 * 400, 1i32..50, cents_strategy()), 0..60).prop_map(
        |rows| {
            let origin = Utc.with_ymd_and_hms(2023, 11, 1, 0, 0, 0).unwrap();
            rows.into_iter()
                .map(|(hours, quantity, cents)| SalePoint {
                    sale_date: origin + Duration::hours(hours),
                    total_amount: Decimal::new(cents, 2),
                    quantity,
                })
                .collect()
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn day_buckets_preserve_totals(sales in sales_strategy()) {
        let buckets = bucket_by_day(&sales);

        let revenue: Decimal = sales.iter().map(|s| s.total_amount).sum();
        let bucketed: Decimal = buckets.iter().map(|b| b.revenue).sum();
        prop_assert_eq!(revenue, bucketed);

        let orders: i64 = buckets.iter().map(|b| b.order_count).sum();
        prop_assert_eq!(orders, sales.len() as i64);

        let units: i64 = sales.iter().map(|s| i64::from(s.quantity)).sum();
        prop_assert_eq!(units, buckets.iter().map(|b| b.total_quantity).sum::<i64>());
    }

    #[test]
    fn day_buckets_are_strictly_ascending_and_non_empty(sales in sales_strategy()) {
        let buckets = bucket_by_day(&sales);
        for pair in buckets.windows(2) {
            prop_assert!(pair[0].date < pair[1].date);
        }
        prop_assert!(buckets.iter().all(|b| b.order_count > 0));
    }

    #[test]
    fn month_buckets_preserve_totals_and_order(sales in sales_strategy()) {
        let buckets = bucket_by_month(&sales);

        let revenue: Decimal = sales.iter().map(|s| s.total_amount).sum();
        prop_assert_eq!(revenue, buckets.iter().map(|b| b.revenue).sum::<Decimal>());

        for pair in buckets.windows(2) {
            prop_assert!((pair[0].year, pair[0].month) < (pair[1].year, pair[1].month));
        }
    }

    #[test]
    fn percentage_change_sign_follows_direction(a in cents_strategy(), b in cents_strategy()) {
        let previous = Decimal::new(a, 2);
        let current = Decimal::new(b, 2);
        let change = percentage_change(previous, current);

        if current > previous {
            prop_assert!(change > 0.0);
        } else if current < previous {
            prop_assert!(change < 0.0);
        } else {
            prop_assert_eq!(change, 0.0);
        }
        prop_assert!(change >= -100.0);
    }

    #[test]
    fn zero_baseline_is_100_or_0(b in 0i64..10_000_000) {
        let change = percentage_change(Decimal::ZERO, Decimal::new(b, 2));
        prop_assert_eq!(change, if b > 0 { 100.0 } else { 0.0 });
    }
}
