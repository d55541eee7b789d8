//! End-to-end tests: a zipped ensemble artifact, loaded through the cache,
//! served through the gateway.

use axum::body::Body;
use chrono::NaiveDate;
use demandcast_core::config::{FormDefaults, ModelConfig};
use demandcast_core::gateway::{GatewayState, router};
use demandcast_core::{
    Currency, CustomerType, DemandLevel, Forecaster, ModelArtifact, ModelCache, SaleInput,
};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;
use zip::write::SimpleFileOptions;

/// Three stumps: country, unit price, guest flag.
const MODEL_JSON: &str = r#"{
  "name": "sales_forecaster_xgb",
  "version": "1.0",
  "base_score": 1.0,
  "features": ["StockCode", "UnitPrice", "Country", "InvoiceYear", "InvoiceMonth",
               "InvoiceDay", "InvoiceDayOfWeek", "InvoiceHour", "InvoiceWeekOfYear",
               "InvoiceQuarter", "IsWeekend", "Recency", "Frequency", "Monetary",
               "ProductTotalQuantity", "ProductAverageUnitPrice", "ProductSalesCount", "IsGuest"],
  "categories": { "Country": ["united kingdom", "france", "germany"] },
  "trees": [
    { "nodes": [
      { "id": 0, "split": { "categorical": { "feature": 2, "categories": ["united kingdom"] } },
        "left": 1, "right": 2, "default_left": false },
      { "id": 1, "leaf": 0.5 },
      { "id": 2, "leaf": -0.2 }
    ] },
    { "nodes": [
      { "id": 0, "split": { "numeric": { "feature": 1, "threshold": 5.0 } }, "left": 1, "right": 2 },
      { "id": 1, "leaf": 0.3 },
      { "id": 2, "leaf": -0.4 }
    ] },
    { "nodes": [
      { "id": 0, "split": { "numeric": { "feature": 17, "threshold": 0.5 } }, "left": 1, "right": 2 },
      { "id": 1, "leaf": 0.7 },
      { "id": 2, "leaf": 0.0 }
    ] }
  ]
}"#;

fn write_archive(workspace: &Path, config: &ModelConfig) {
    let file = std::fs::File::create(workspace.join(&config.archive)).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    zip.start_file("export/sales_forecaster_xgb_v1.0.json", SimpleFileOptions::default())
        .unwrap();
    zip.write_all(MODEL_JSON.as_bytes()).unwrap();
    zip.finish().unwrap();
}

fn zipped_cache(workspace: &Path) -> ModelCache {
    let config = ModelConfig::default();
    write_archive(workspace, &config);
    ModelCache::new(ModelArtifact::from_config(&config, workspace))
}

fn reference_input() -> SaleInput {
    SaleInput {
        product_code: "85123A".into(),
        unit_price: 2.55,
        currency: Currency::Gbp,
        exchange_rate: None,
        country: "united kingdom".into(),
        sale_date: NaiveDate::from_ymd_opt(2011, 12, 1).unwrap(),
        hour: 8,
        customer_type: CustomerType::Registered,
    }
}

#[test]
fn test_zipped_model_is_extracted_and_scored() {
    let dir = TempDir::new().unwrap();
    let cache = zipped_cache(dir.path());
    assert!(!dir.path().join("sales_forecaster_xgb_v1.0.json").exists());

    let model = cache.get_or_load().unwrap();
    assert!(dir.path().join("sales_forecaster_xgb_v1.0.json").exists());
    assert_eq!(model.name(), "sales_forecaster_xgb");
    assert_eq!(model.version(), "1.0");

    let forecast = Forecaster::new(model).forecast(&reference_input()).unwrap();
    assert!((forecast.log_prediction - 2.5).abs() < 1e-12);
    assert!((forecast.quantity - 2.5_f64.exp_m1()).abs() < 1e-9);
    assert_eq!(forecast.demand, DemandLevel::Medium);
}

#[test]
fn test_unknown_country_follows_default_branch() {
    let dir = TempDir::new().unwrap();
    let forecaster = Forecaster::new(zipped_cache(dir.path()).get_or_load().unwrap());

    let known_other = SaleInput {
        country: "france".into(),
        ..reference_input()
    };
    let unseen = SaleInput {
        country: "other".into(),
        ..reference_input()
    };
    let a = forecaster.forecast(&known_other).unwrap();
    let b = forecaster.forecast(&unseen).unwrap();
    assert!((a.log_prediction - 1.8).abs() < 1e-12);
    assert_eq!(a.log_prediction, b.log_prediction);
}

#[test]
fn test_converted_price_changes_branch() {
    let dir = TempDir::new().unwrap();
    let forecaster = Forecaster::new(zipped_cache(dir.path()).get_or_load().unwrap());

    // 3500 PKR at 350 per GBP is 10 GBP, over the 5.0 threshold.
    let input = SaleInput {
        unit_price: 3500.0,
        currency: Currency::Pkr,
        exchange_rate: Some("350".into()),
        customer_type: CustomerType::Guest,
        ..reference_input()
    };
    let forecast = forecaster.forecast(&input).unwrap();
    assert_eq!(forecast.record.unit_price, 10.0);
    assert!((forecast.log_prediction - 1.1).abs() < 1e-12);
    assert_eq!(forecast.demand, DemandLevel::Low);

    // Without a rate the raw 3500 is used as GBP.
    let unconverted = SaleInput {
        exchange_rate: None,
        ..input
    };
    let forecast = forecaster.forecast(&unconverted).unwrap();
    assert_eq!(forecast.record.unit_price, 3500.0);
    assert!(forecast.notice.is_some());
}

#[tokio::test]
async fn test_gateway_serves_zipped_model() {
    let dir = TempDir::new().unwrap();
    let gw = Arc::new(GatewayState::new(zipped_cache(dir.path()), FormDefaults::default()).unwrap());
    assert!(!gw.models().is_loaded());

    let req = axum::http::Request::builder()
        .method("POST")
        .uri("/api/predict")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&reference_input()).unwrap()))
        .unwrap();
    let resp = ServiceExt::<axum::http::Request<Body>>::oneshot(router(Arc::clone(&gw)), req)
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body = axum::body::to_bytes(resp.into_body(), 100_000)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["demand"], "medium");
    assert_eq!(json["record"]["InvoiceWeekOfYear"], 48);
    assert!(gw.models().is_loaded());
}

#[tokio::test]
async fn test_gateway_form_post_with_zipped_model() {
    let dir = TempDir::new().unwrap();
    let gw = Arc::new(GatewayState::new(zipped_cache(dir.path()), FormDefaults::default()).unwrap());

    let body = "product=other&custom_product=90210Z&currency=EUR&unit_price=12&exchange_rate=\
&country=germany&sale_date=2011-12-03&hour=14&customer_type=guest";
    let req = axum::http::Request::builder()
        .method("POST")
        .uri("/predict")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap();
    let resp = ServiceExt::<axum::http::Request<Body>>::oneshot(router(gw), req)
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let html = String::from_utf8(
        axum::body::to_bytes(resp.into_body(), 1_000_000)
            .await
            .unwrap()
            .to_vec(),
    )
    .unwrap();
    assert!(html.contains("No exchange rate entered. Price will be used as GBP."));
    assert!(html.contains("90210Z"));
    assert!(html.contains("🔴 Low Demand"));
}
