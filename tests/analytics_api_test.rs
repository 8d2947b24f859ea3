mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use common::{decimal, response_json, ts, TestApp};

#[tokio::test]
async fn daily_revenue_buckets_recent_sales_by_day() {
    let app = TestApp::new().await;
    let product = app
        .seed_stocked_product("Electronics", "Charger", dec!(15), 100)
        .await;

    let now = Utc::now();
    app.seed_sale(product.id, 1, dec!(15), now - Duration::days(2))
        .await;
    app.seed_sale(product.id, 2, dec!(30), now - Duration::days(2))
        .await;
    app.seed_sale(product.id, 1, dec!(15), now - Duration::hours(1))
        .await;
    app.seed_sale(product.id, 4, dec!(60), now - Duration::days(20))
        .await;

    let response = app.get("/api/v1/analytics/revenue/daily?days=7").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let days = body["data"].as_array().expect("daily revenue");

    let total: Decimal = days.iter().map(|d| decimal(&d["revenue"])).sum();
    let orders: i64 = days
        .iter()
        .map(|d| d["order_count"].as_i64().unwrap_or_default())
        .sum();
    assert_eq!(total, dec!(60));
    assert_eq!(orders, 3);

    let dates: Vec<_> = days
        .iter()
        .map(|d| d["date"].as_str().unwrap_or_default().to_string())
        .collect();
    let mut sorted = dates.clone();
    sorted.sort();
    assert_eq!(dates, sorted);
}

#[tokio::test]
async fn daily_revenue_defaults_and_limits() {
    let app = TestApp::new().await;

    let response = app.get("/api/v1/analytics/revenue/daily").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(0));

    let response = app.get("/api/v1/analytics/revenue/daily?days=0").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.get("/api/v1/analytics/revenue/daily?days=3651").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn monthly_revenue_uses_thirty_day_months() {
    let app = TestApp::new().await;
    let product = app
        .seed_stocked_product("Books", "Almanac", dec!(20), 100)
        .await;

    let now = Utc::now();
    app.seed_sale(product.id, 1, dec!(20), now - Duration::days(1))
        .await;
    app.seed_sale(product.id, 2, dec!(40), now - Duration::days(45))
        .await;

    let one = response_json(app.get("/api/v1/analytics/revenue/monthly?months=1").await).await;
    let one_total: Decimal = one["data"]
        .as_array()
        .expect("monthly revenue")
        .iter()
        .map(|m| decimal(&m["revenue"]))
        .sum();
    assert_eq!(one_total, dec!(20));

    let two = response_json(app.get("/api/v1/analytics/revenue/monthly?months=2").await).await;
    let months = two["data"].as_array().expect("monthly revenue");
    let two_total: Decimal = months.iter().map(|m| decimal(&m["revenue"])).sum();
    assert_eq!(two_total, dec!(60));
    for month in months {
        assert!(month["year"].as_i64().is_some());
        let m = month["month"].as_u64().expect("month number");
        assert!((1..=12).contains(&m));
    }

    let response = app.get("/api/v1/analytics/revenue/monthly?months=121").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn revenue_by_category_groups_through_products() {
    let app = TestApp::new().await;
    let electronics = app.seed_category("Electronics").await;
    let books = app.seed_category("Books").await;
    let phone = app.seed_product(electronics.id, "Phone", dec!(300)).await;
    let cable = app.seed_product(electronics.id, "Cable", dec!(10)).await;
    let novel = app.seed_product(books.id, "Novel", dec!(12)).await;
    for product in [&phone, &cable, &novel] {
        app.seed_inventory(product.id, 50, 10).await;
    }

    app.seed_sale(phone.id, 1, dec!(300), ts("2024-05-01T09:00:00Z"))
        .await;
    app.seed_sale(cable.id, 3, dec!(30), ts("2024-05-02T09:00:00Z"))
        .await;
    app.seed_sale(novel.id, 2, dec!(24), ts("2024-05-03T09:00:00Z"))
        .await;
    app.seed_sale(novel.id, 1, dec!(12), ts("2024-06-10T09:00:00Z"))
        .await;

    let body = response_json(app.get("/api/v1/analytics/revenue/by-category").await).await;
    let rows = body["data"].as_array().expect("category revenue");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["category_name"], "Electronics");
    assert_eq!(decimal(&rows[0]["revenue"]), dec!(330));
    assert_eq!(rows[0]["total_quantity"], 4);
    assert_eq!(rows[1]["category_name"], "Books");
    assert_eq!(decimal(&rows[1]["revenue"]), dec!(36));

    let body = response_json(
        app.get("/api/v1/analytics/revenue/by-category?start_date=2024-05-01&end_date=2024-05-31")
            .await,
    )
    .await;
    let rows = body["data"].as_array().expect("category revenue");
    assert_eq!(decimal(&rows[1]["revenue"]), dec!(24));
    assert_eq!(rows[1]["total_quantity"], 2);
}

#[tokio::test]
async fn compare_revenue_reports_percentage_change() {
    let app = TestApp::new().await;
    let product = app
        .seed_stocked_product("Sports", "Skates", dec!(50), 100)
        .await;

    app.seed_sale(product.id, 2, dec!(100), ts("2024-01-10T12:00:00Z"))
        .await;
    app.seed_sale(product.id, 3, dec!(150), ts("2024-02-10T12:00:00Z"))
        .await;

    let response = app
        .get(
            "/api/v1/analytics/revenue/compare\
             ?period1_start=2024-01-01&period1_end=2024-01-31\
             &period2_start=2024-02-01&period2_end=2024-02-29",
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let data = &body["data"];
    assert_eq!(decimal(&data["period1"]["revenue"]), dec!(100));
    assert_eq!(decimal(&data["period2"]["revenue"]), dec!(150));
    assert_eq!(data["percentage_change"].as_f64(), Some(50.0));
}

#[tokio::test]
async fn compare_revenue_with_empty_first_period() {
    let app = TestApp::new().await;
    let product = app
        .seed_stocked_product("Sports", "Skates", dec!(50), 100)
        .await;
    app.seed_sale(product.id, 1, dec!(50), ts("2024-02-10T12:00:00Z"))
        .await;

    let body = response_json(
        app.get(
            "/api/v1/analytics/revenue/compare\
             ?period1_start=2024-01-01&period1_end=2024-01-31\
             &period2_start=2024-02-01&period2_end=2024-02-29",
        )
        .await,
    )
    .await;
    assert_eq!(decimal(&body["data"]["period1"]["revenue"]), Decimal::ZERO);
    assert_eq!(body["data"]["percentage_change"].as_f64(), Some(100.0));

    let body = response_json(
        app.get(
            "/api/v1/analytics/revenue/compare\
             ?period1_start=2023-01-01&period1_end=2023-01-31\
             &period2_start=2023-02-01&period2_end=2023-02-28",
        )
        .await,
    )
    .await;
    assert_eq!(body["data"]["percentage_change"].as_f64(), Some(0.0));
}

#[tokio::test]
async fn compare_revenue_rejects_missing_or_inverted_bounds() {
    let app = TestApp::new().await;

    let response = app
        .get("/api/v1/analytics/revenue/compare?period1_start=2024-01-01")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .get(
            "/api/v1/analytics/revenue/compare\
             ?period1_start=2024-02-01&period1_end=2024-01-01\
             &period2_start=2024-02-01&period2_end=2024-02-29",
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
