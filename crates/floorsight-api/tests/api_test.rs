//! Router tests against an in-memory catalog and a scripted model

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use floorsight_advisor::{AdvisorPipeline, PipelineSettings, PromptTemplates};
use floorsight_api::exchange_log::{ExchangeLog, ExchangeOutcome, ExchangeRecord};
use floorsight_api::{create_router, AppState, SharedModel};
use floorsight_core::imaging;
use floorsight_core::models::{
    Assets, BuildingCatalog, EntityKind, TileDataset, TileIndex, TileRect,
};
use floorsight_llm::ScriptedModel;
use image::{Rgb, RgbImage};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const LAYOUT: &str = r#"{"tiếp_giáp": {}, "bố_cục": {}, "diện_tích": {}}"#;

fn assets() -> Assets {
    let floor_index = TileIndex::new(
        EntityKind::Apartment,
        HashMap::from([("CH07".to_string(), vec!["a".to_string(), "b".to_string()])]),
        HashMap::from([
            ("a".to_string(), TileRect::new(100, 50, 30, 25)),
            ("b".to_string(), TileRect::new(130, 50, 30, 25)),
        ]),
    );
    let raster = RgbImage::from_pixel(400, 300, Rgb([200, 200, 200]));
    let floor = TileDataset::new("S606/floors_1_25", floor_index, Some(raster)).unwrap();

    let mut catalog = BuildingCatalog::new();
    catalog.insert("S606", "floors_1_25", floor);

    let map_index = TileIndex::new(
        EntityKind::Building,
        HashMap::from([("S6.06".to_string(), vec!["m".to_string()])]),
        HashMap::from([("m".to_string(), TileRect::new(0, 0, 120, 80))]),
    );
    let map = RgbImage::from_pixel(500, 500, Rgb([30, 90, 30]));
    let site_map = TileDataset::new("site-map", map_index, Some(map)).unwrap();

    Assets::new(catalog, site_map)
}

fn state(model: Arc<ScriptedModel>) -> AppState {
    let model: SharedModel = model;
    let pipeline = AdvisorPipeline::new(
        model,
        PromptTemplates::default(),
        PipelineSettings::default().with_cooldown(Duration::ZERO),
    );
    AppState::new(Arc::new(assets()), pipeline)
}

fn app(model: Arc<ScriptedModel>) -> Router {
    create_router(Arc::new(state(model)))
}

fn analyze_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn body() -> Value {
    json!({
        "prompt_1": "default",
        "prompt_2": "default",
        "building_code": "S6.06",
        "apartment_number": 7,
        "floor_number": 20,
        "query": "Căn hộ này có view hồ không?"
    })
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = app(Arc::new(ScriptedModel::new()))
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await, json!({"status": "ok", "service": "floorsight-api"}));
}

#[tokio::test]
async fn test_analyze_success() {
    let model = Arc::new(ScriptedModel::new().with_reply(LAYOUT).with_reply("Có, nhìn ra hồ."));
    let response = app(model.clone()).oneshot(analyze_request("/", body())).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = read_json(response).await;
    assert_eq!(json["step1"], LAYOUT);
    assert_eq!(json["step2"], "Có, nhìn ra hồ.");

    let floorplan = imaging::decode(json["floorplan_cropped"].as_str().unwrap()).unwrap();
    assert_eq!(floorplan.dimensions(), (60, 25));
    let map = imaging::decode(json["map_cropped"].as_str().unwrap()).unwrap();
    assert_eq!(map.dimensions(), (120, 80));
    let original = imaging::decode(json["floorplan_original"].as_str().unwrap()).unwrap();
    assert_eq!(original.dimensions(), (400, 300));
    assert!(json["map_original"].is_string());

    assert_eq!(model.call_count(), 2);
}

#[tokio::test]
async fn test_versioned_path_and_default_prompts() {
    let model = Arc::new(ScriptedModel::new().with_reply(LAYOUT).with_reply("ok"));
    let mut payload = body();
    payload.as_object_mut().unwrap().remove("prompt_1");
    payload.as_object_mut().unwrap().remove("prompt_2");

    let response = app(model.clone())
        .oneshot(analyze_request("/api/v1/analyze", payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let calls = model.calls();
    assert!(calls[0].prompt.starts_with(floorsight_advisor::STAGE_ONE_TEMPLATE));
    assert!(calls[1].prompt.starts_with(floorsight_advisor::STAGE_TWO_TEMPLATE));
}

#[tokio::test]
async fn test_stage_one_failure_is_500() {
    let model = Arc::new(ScriptedModel::new().with_failure("quota exceeded"));
    let response = app(model.clone()).oneshot(analyze_request("/", body())).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = read_json(response).await;
    assert_eq!(json["error"], "Remote inference failed at stage 1: quota exceeded");
    assert!(json.get("step1").is_none());
    assert_eq!(model.call_count(), 1);
}

#[tokio::test]
async fn test_unknown_floor_is_500() {
    let model = Arc::new(ScriptedModel::new());
    let mut payload = body();
    payload["floor_number"] = json!(99);

    let response = app(model.clone()).oneshot(analyze_request("/", payload)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = read_json(response).await;
    assert_eq!(json["error"], "No floor range of building S606 covers floor 99");
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let model = Arc::new(ScriptedModel::new());
    let payload = json!({"building_code": "S6.06", "apartment_number": -1});

    let response = app(model.clone()).oneshot(analyze_request("/", payload)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = read_json(response).await;
    assert_eq!(json["error"], "Invalid request body");
    assert!(json["details"].is_string());
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn test_list_buildings() {
    let router = app(Arc::new(ScriptedModel::new()));
    let response = router
        .oneshot(Request::builder().uri("/api/v1/buildings").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = read_json(response).await;
    assert_eq!(
        json,
        json!([{
            "building": "S606",
            "floor_ranges": [{
                "label": "floors_1_25",
                "start": 1,
                "end": 25,
                "has_design": true,
                "apartments": ["CH07"]
            }]
        }])
    );
}

#[tokio::test]
async fn test_exchange_log_records_each_analysis() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("exchanges.jsonl");

    let model = Arc::new(
        ScriptedModel::new()
            .with_reply(LAYOUT)
            .with_reply("ok")
            .with_failure("quota exceeded"),
    );
    let state = state(model).with_exchange_log(ExchangeLog::open(&log_path).await.unwrap());
    let router = create_router(Arc::new(state));

    let first = router.clone().oneshot(analyze_request("/", body())).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let second = router.oneshot(analyze_request("/", body())).await.unwrap();
    assert_eq!(second.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let content = std::fs::read_to_string(&log_path).unwrap();
    let records: Vec<ExchangeRecord> =
        content.lines().map(|line| serde_json::from_str(line).unwrap()).collect();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].outcome, ExchangeOutcome::Ok);
    assert_eq!(records[0].building_code, "S6.06");
    assert_eq!(records[0].step2.as_deref(), Some("ok"));
    assert_eq!(records[1].outcome, ExchangeOutcome::Error);
    assert!(records[1].error.as_deref().unwrap().contains("quota exceeded"));
    assert_ne!(records[0].request_id, records[1].request_id);

    // Images never reach the log
    assert!(!content.contains("floorplan_cropped"));
}
