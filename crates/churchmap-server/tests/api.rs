use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use churchmap_core::{Feature, FeatureCollection, Properties};
use churchmap_server::{router, AppState};
use churchmap_storage::{MemorySource, SharedStore};
use serde_json::{json, Value};
use std::time::Duration;
use tower::ServiceExt;

fn church(title: &str, city: &str, country: &str, kind: &str, lat: f64, lng: f64) -> Feature {
    Feature::new(
        lat,
        lng,
        Properties {
            title: Some(title.into()),
            city: Some(city.into()),
            country: Some(country.into()),
            kind: Some(kind.into()),
            ..Default::default()
        },
    )
}

async fn loaded_app() -> Router {
    let state = AppState::new(SharedStore::new());
    let source = MemorySource::new(vec![
        Some(FeatureCollection::new(vec![
            church("St. Mary", "Rome", "Italy", "Parish", 41.9, 12.5),
            church("Holy Cross", "Rome", "Italy", "Cathedral", 41.89, 12.49),
        ])),
        None,
        Some(FeatureCollection::new(vec![
            church("St. Joseph", "Springfield", "USA", "Parish", 39.8, -89.6),
            church("Our Lady of Fatima", "Fatima", "Portugal", "Shrine", 39.63, -8.67),
        ])),
    ]);
    state.load_from(&source).await;
    router(state)
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let req = match body {
        Some(v) => req.body(Body::from(v.to_string())).unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, value)
}

async fn open_session(app: &Router, width: u32) -> String {
    let (status, body) = call(
        app,
        Method::POST,
        "/v1/sessions",
        Some(json!({
            "viewport_width": width,
            "viewport": {"south": 35.0, "west": -10.0, "north": 60.0, "east": 30.0}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test(start_paused = true)]
async fn health_and_status_after_partial_load() {
    let app = loaded_app().await;
    let (status, body) = call(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("ok"));

    let (status, body) = call(&app, Method::GET, "/v1/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Loaded 4 churches.");
    assert_eq!(body["features"], 4);
    assert_eq!(body["progress"]["percent"], 100);
    assert_eq!(body["report"]["chunks"].as_array().unwrap().len(), 3);
    assert!(body["report"]["chunks"][1]["error"].is_string());
}

#[tokio::test(start_paused = true)]
async fn new_session_renders_viewport_view() {
    let app = loaded_app().await;
    let sid = open_session(&app, 1280).await;
    let (status, view) = call(&app, Method::GET, &format!("/v1/sessions/{sid}/view"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["profile"], "desktop");
    assert_eq!(view["visible"], 3);
    assert_eq!(view["status"], "Showing 3 of 3 filtered churches (4 total)");
    assert_eq!(view["markers"].as_array().unwrap().len(), 3);
    assert_eq!(view["commands"][0]["op"], "replace_markers");

    // commands are drained once
    let (_, again) = call(&app, Method::GET, &format!("/v1/sessions/{sid}/view"), None).await;
    assert!(again["commands"].as_array().unwrap().is_empty());
    assert!(again.get("markers").is_none());
}

#[tokio::test(start_paused = true)]
async fn typed_filter_applies_after_debounce_and_zooms() {
    let app = loaded_app().await;
    let sid = open_session(&app, 1280).await;
    let uri = format!("/v1/sessions/{sid}/filters/city");

    let (status, _) = call(&app, Method::PUT, &uri, Some(json!({"value": "spr"}))).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    tokio::time::sleep(Duration::from_millis(300)).await;
    call(&app, Method::PUT, &uri, Some(json!({"value": "springfield"}))).await;

    tokio::time::sleep(Duration::from_millis(300)).await;
    let (_, view) = call(&app, Method::GET, &format!("/v1/sessions/{sid}/view"), None).await;
    assert_eq!(view["inputs"]["city"], "springfield");
    assert_eq!(view["visible"], 3, "first keystroke was superseded");

    tokio::time::sleep(Duration::from_millis(300)).await;
    let (_, view) = call(&app, Method::GET, &format!("/v1/sessions/{sid}/view"), None).await;
    assert_eq!(view["visible"], 1);
    assert_eq!(view["indicators"]["filter_active"], true);
    let ops: Vec<&str> = view["commands"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c["op"].as_str())
        .collect();
    assert!(ops.contains(&"fit_bounds"));
    assert_eq!(view["rows"][0]["title"], "St. Joseph");
}

#[tokio::test(start_paused = true)]
async fn suggestion_select_applies_immediately_and_reset_restores() {
    let app = loaded_app().await;
    let sid = open_session(&app, 1280).await;

    let (status, list) = call(
        &app,
        Method::GET,
        &format!("/v1/sessions/{sid}/suggest/country?q=it"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!(["All", "Italy"]));

    let (status, summary) = call(
        &app,
        Method::POST,
        &format!("/v1/sessions/{sid}/filters/country/select"),
        Some(json!({"value": "Italy"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["mode"], "filtered");
    assert_eq!(summary["visible"], 2);

    let (_, summary) = call(&app, Method::POST, &format!("/v1/sessions/{sid}/reset"), None).await;
    assert_eq!(summary["mode"], "viewport");
    let (_, view) = call(&app, Method::GET, &format!("/v1/sessions/{sid}/view"), None).await;
    assert_eq!(view["indicators"]["filter_active"], false);
    assert_eq!(view["inputs"]["country"], "");
}

#[tokio::test(start_paused = true)]
async fn select_opens_popup_after_delay() {
    let app = loaded_app().await;
    let sid = open_session(&app, 1280).await;
    call(&app, Method::GET, &format!("/v1/sessions/{sid}/view"), None).await;

    let (status, _) = call(&app, Method::POST, &format!("/v1/sessions/{sid}/select/1"), None).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let (_, view) = call(&app, Method::GET, &format!("/v1/sessions/{sid}/view"), None).await;
    assert_eq!(view["highlighted"], 1);
    assert_eq!(view["commands"][0]["op"], "fly_to");
    assert_eq!(view["commands"][0]["zoom"], 15);

    tokio::time::sleep(Duration::from_millis(1100)).await;
    let (_, view) = call(&app, Method::GET, &format!("/v1/sessions/{sid}/view"), None).await;
    assert_eq!(view["commands"], json!([{"op": "open_popup", "id": 1}]));
}

#[tokio::test(start_paused = true)]
async fn errors_map_to_status_codes() {
    let app = loaded_app().await;
    let sid = open_session(&app, 400).await;

    let (status, body) = call(&app, Method::GET, "/v1/sessions/nope/view", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());

    let (status, _) = call(
        &app,
        Method::PUT,
        &format!("/v1/sessions/{sid}/filters/diocese"),
        Some(json!({"value": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(&app, Method::POST, &format!("/v1/sessions/{sid}/select/99"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(&app, Method::GET, "/v1/features/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, f) = call(&app, Method::GET, "/v1/features/2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(f["properties"]["Title"], "St. Joseph");

    let (status, _) = call(&app, Method::DELETE, &format!("/v1/sessions/{sid}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = call(&app, Method::DELETE, &format!("/v1/sessions/{sid}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test(start_paused = true)]
async fn session_before_load_sees_progress_then_data() {
    let state = AppState::new(SharedStore::new());
    let app = router(state.clone());
    let sid = open_session(&app, 1280).await;
    let (_, status) = call(&app, Method::GET, "/v1/status", None).await;
    assert_eq!(status["loaded"], false);

    state
        .load_from(&MemorySource::new(vec![Some(FeatureCollection::new(vec![church(
            "St. Mary", "Rome", "Italy", "Parish", 41.9, 12.5,
        )]))]))
        .await;
    let (_, view) = call(&app, Method::GET, &format!("/v1/sessions/{sid}/view"), None).await;
    assert_eq!(view["visible"], 1);
    assert_eq!(view["rows"][0]["title"], "St. Mary");
}

#[tokio::test(start_paused = true)]
async fn viewport_move_and_list_search_are_debounced() {
    let app = loaded_app().await;
    let sid = open_session(&app, 1280).await;

    // pan to the US
    let (status, _) = call(
        &app,
        Method::PUT,
        &format!("/v1/sessions/{sid}/viewport"),
        Some(json!({"south": 30.0, "west": -100.0, "north": 45.0, "east": -80.0})),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let (_, view) = call(&app, Method::GET, &format!("/v1/sessions/{sid}/view"), None).await;
    assert_eq!(view["visible"], 3);

    tokio::time::sleep(Duration::from_millis(400)).await;
    let (_, view) = call(&app, Method::GET, &format!("/v1/sessions/{sid}/view"), None).await;
    assert_eq!(view["visible"], 1);
    assert_eq!(view["rows"][0]["title"], "St. Joseph");

    let (status, _) = call(
        &app,
        Method::PUT,
        &format!("/v1/sessions/{sid}/list-search"),
        Some(json!({"query": "cross"})),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    tokio::time::sleep(Duration::from_millis(250)).await;
    let (_, view) = call(&app, Method::GET, &format!("/v1/sessions/{sid}/view"), None).await;
    assert_eq!(view["list_search"], "cross");
    assert_eq!(view["rows"][0]["hidden"], true);

    let (_, zoom) = call(&app, Method::POST, &format!("/v1/sessions/{sid}/zoom-to-filter"), None).await;
    assert_eq!(zoom["zoomed"], true);
}

#[tokio::test(start_paused = true)]
async fn filters_chosen_while_loading_show_progress_then_apply() {
    let state = AppState::new(SharedStore::new());
    let app = router(state.clone());
    let sid = open_session(&app, 1280).await;
    let (_, view) = call(&app, Method::GET, &format!("/v1/sessions/{sid}/view"), None).await;
    assert_eq!(view["status"], "Loading church data...");

    let (status, summary) = call(
        &app,
        Method::POST,
        &format!("/v1/sessions/{sid}/filters/country/select"),
        Some(json!({"value": "Italy"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(summary.is_null());
    let (_, view) = call(&app, Method::GET, &format!("/v1/sessions/{sid}/view"), None).await;
    assert_eq!(view["status"], "Loading church data...");
    assert_eq!(view["inputs"]["country"], "Italy");
    assert!(view["empty_state"].is_null());

    let (_, summary) = call(&app, Method::POST, &format!("/v1/sessions/{sid}/reset"), None).await;
    assert!(summary.is_null());
    call(
        &app,
        Method::POST,
        &format!("/v1/sessions/{sid}/filters/country/select"),
        Some(json!({"value": "Italy"})),
    )
    .await;

    state
        .load_from(&MemorySource::new(vec![Some(FeatureCollection::new(vec![
            church("St. Mary", "Rome", "Italy", "Parish", 41.9, 12.5),
            church("St. Joseph", "Springfield", "USA", "Parish", 39.8, -89.6),
        ]))]))
        .await;
    let (_, view) = call(&app, Method::GET, &format!("/v1/sessions/{sid}/view"), None).await;
    assert_eq!(view["visible"], 1);
    assert_eq!(view["status"], "Showing 1 of 1 filtered churches (2 total)");
    assert_eq!(view["indicators"]["filter_active"], true);
}
