// Integration tests for the view API, actions and push-event intake

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sparrow_fusion::api::create_router;
use tower::ServiceExt;

async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn completed(agent_id: i64, networks: Value) -> Value {
    json!({
        "event": "scan.completed",
        "agent_id": agent_id,
        "scan_id": 10 + agent_id,
        "scan_type": "wifi",
        "response": {"networks": networks}
    })
}

/// POST /api/scan-events then GET /api/wifi shows the ingested networks.
#[tokio::test]
async fn test_push_event_feeds_wifi_listing() {
    let (_stub, dashboard) = common::dashboard().await;
    let app = create_router(dashboard);

    let (status, summary) = send(
        app.clone(),
        "POST",
        "/api/scan-events",
        Some(completed(1, json!([{"macAddr": "AA:BB:CC:00:00:01", "ssid": "corp", "signal": -60}]))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["networks"], 1);

    let (status, page) = send(app, "GET", "/api/wifi", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
    assert_eq!(page["number"], 1);
    assert_eq!(page["items"][0]["address"], "aa:bb:cc:00:00:01");
    assert_eq!(page["items"][0]["location_source"], "agent");
    assert_eq!(page["items"][0]["agent_name"], "sensor-1");
}

/// Two agents hearing the same network yield a centroid in the detail view.
#[tokio::test]
async fn test_detail_reports_centroid_and_samples() {
    let (_stub, dashboard) = common::dashboard().await;
    let app = create_router(dashboard);

    let network = json!([{"macAddr": "aa:01", "signal": -60}]);
    send(app.clone(), "POST", "/api/scan-events", Some(completed(1, network.clone()))).await;
    send(app.clone(), "POST", "/api/scan-events", Some(completed(2, network))).await;

    let (status, detail) = send(app, "GET", "/api/wifi/AA:01", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["location_source"], "centroid");
    assert_eq!(detail["contributors"], 2);
    assert_eq!(detail["lon"], 25.0);
    assert_eq!(detail["samples"].as_array().unwrap().len(), 2);
    assert_eq!(detail["estimate"]["has_position"], true);
}

#[tokio::test]
async fn test_unknown_entity_is_404() {
    let (_stub, dashboard) = common::dashboard().await;
    let app = create_router(dashboard);

    let (status, body) = send(app, "GET", "/api/bluetooth/ff:ff", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("ff:ff"));
}

#[tokio::test]
async fn test_unknown_event_name_rejected() {
    let (_stub, dashboard) = common::dashboard().await;
    let app = create_router(dashboard);

    let (status, _) = send(
        app,
        "POST",
        "/api/scan-events",
        Some(json!({"event": "scan.paused", "agent_id": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// Page numbers past the end are clamped.
#[tokio::test]
async fn test_bluetooth_paging_clamps() {
    let (_stub, dashboard) = common::dashboard().await;
    let app = create_router(dashboard);

    let devices: Vec<Value> = (0..30)
        .map(|i| json!({"mac": format!("dd:{:02}", i)}))
        .collect();
    let event = json!({
        "event": "scan.progress",
        "agent_id": 1,
        "scan_type": "bluetooth",
        "update": {"snapshot": {"devices": devices}}
    });
    send(app.clone(), "POST", "/api/scan-events", Some(event)).await;

    let (_, page) = send(app, "GET", "/api/bluetooth?page=7", None).await;
    assert_eq!(page["number"], 2);
    assert_eq!(page["total_pages"], 2);
    assert_eq!(page["items"].as_array().unwrap().len(), 5);
}

/// Relative paging moves from the current page and stays in range.
#[tokio::test]
async fn test_wifi_relative_paging() {
    let (_stub, dashboard) = common::dashboard().await;
    let app = create_router(dashboard);

    let networks: Vec<Value> = (0..60)
        .map(|i| json!({"macAddr": format!("aa:{:02}", i)}))
        .collect();
    send(app.clone(), "POST", "/api/scan-events", Some(completed(1, json!(networks)))).await;

    let (_, page) = send(app.clone(), "GET", "/api/wifi?delta=1", None).await;
    assert_eq!(page["number"], 2);
    let (_, page) = send(app.clone(), "GET", "/api/wifi?delta=5", None).await;
    assert_eq!(page["number"], 3);
    assert_eq!(page["items"].as_array().unwrap().len(), 10);
    let (_, page) = send(app.clone(), "GET", "/api/wifi", None).await;
    assert_eq!(page["number"], 3);
    let (_, page) = send(app, "GET", "/api/wifi?delta=-9", None).await;
    assert_eq!(page["number"], 1);
}

#[tokio::test]
async fn test_agent_state_and_monitor_views() {
    let (_stub, dashboard) = common::dashboard().await;
    let app = create_router(dashboard);

    let (status, states) = send(app.clone(), "GET", "/api/agents/state", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(states.as_array().unwrap().len(), 2);
    assert_eq!(states[0]["focused"], true);
    assert_eq!(states[0]["scan_state"]["state"], "idle");

    let (status, monitor) = send(app.clone(), "GET", "/api/agents/1/monitor", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(monitor["monitor_map"]["wlan1"], "wlan1mon");
    assert_eq!(monitor["aliases"], json!(["wlan1mon"]));

    let (status, _) = send(app, "GET", "/api/agents/9/monitor", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_monitor_start_rejected_when_mapped() {
    let (_stub, dashboard) = common::dashboard().await;
    let app = create_router(dashboard);

    let (status, body) = send(
        app.clone(),
        "POST",
        "/api/agents/1/monitor/start",
        Some(json!({"interface": "wlan1"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("already in monitor mode"));

    let (status, body) = send(
        app.clone(),
        "POST",
        "/api/agents/1/monitor/start",
        Some(json!({"interface": "wlan0"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["alias"], "wlan0mon");

    let (_, monitor) = send(app, "GET", "/api/agents/1/monitor", None).await;
    assert_eq!(monitor["monitor_map"]["wlan0"], "wlan0mon");
    assert_eq!(monitor["pending_overrides"]["wlan0"], "wlan0mon");
}

#[tokio::test]
async fn test_attack_scan_lifecycle_over_http() {
    let (_stub, dashboard) = common::dashboard().await;
    let app = create_router(dashboard);

    let (status, state) = send(
        app.clone(),
        "POST",
        "/api/agents/1/attack/start",
        Some(json!({"interface": "wlan1mon"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state["state"], "active");
    assert_eq!(state["monitor_alias"], "wlan1mon");

    let (status, _) = send(
        app.clone(),
        "POST",
        "/api/agents/1/monitor/stop",
        Some(json!({"interface": "wlan1"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, state) = send(
        app,
        "POST",
        "/api/agents/1/attack/stop",
        Some(json!({"interface": "wlan1mon"})),
    )
    .await;
    assert_eq!(state["state"], "idle");
}

#[tokio::test]
async fn test_attack_results_missing_is_404() {
    let (_stub, dashboard) = common::dashboard().await;
    let app = create_router(dashboard);

    let (status, _) = send(app, "GET", "/api/agents/1/attack?network_page=2", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_scan_launch_validation() {
    let (stub, dashboard) = common::dashboard().await;
    let app = create_router(dashboard);

    let (status, body) = send(
        app.clone(),
        "POST",
        "/api/scans",
        Some(json!({"agent_id": 1, "scan_type": "wifi", "extras": "not json"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("extras"));
    assert!(stub.launched.lock().unwrap().is_empty());

    let (status, body) = send(
        app.clone(),
        "POST",
        "/api/scans",
        Some(json!({"agent_id": 1, "scan_type": "wifi", "channels": "1,6,11"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kind"], "once");
    assert_eq!(stub.launched.lock().unwrap()[0].channels, Some(vec![1, 6, 11]));

    let (status, _) = send(
        app,
        "POST",
        "/api/scans",
        Some(json!({"agent_id": 77, "scan_type": "wifi"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stop_unknown_continuous_scan_is_404() {
    let (_stub, dashboard) = common::dashboard().await;
    let app = create_router(dashboard);

    let (status, _) = send(
        app,
        "POST",
        "/api/scans/continuous/stop",
        Some(json!({"agent_id": 1, "interface": "wlan0", "scan_type": "wifi"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// Registration answers 201 and the new agent shows up in the state view;
/// deleting it removes it again.
#[tokio::test]
async fn test_register_and_delete_agent_over_http() {
    let (_stub, dashboard) = common::dashboard().await;
    let app = create_router(dashboard);

    let (status, _) = send(
        app.clone(),
        "POST",
        "/api/agents",
        Some(json!({"name": "", "base_url": "http://10.0.0.3:8020"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, agent) = send(
        app.clone(),
        "POST",
        "/api/agents",
        Some(json!({"name": "mast", "base_url": "http://10.0.0.3:8020", "capabilities": ["wifi"]})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(agent["id"], 3);

    let (_, states) = send(app.clone(), "GET", "/api/agents/state", None).await;
    assert_eq!(states.as_array().unwrap().len(), 3);

    let (status, _) = send(app.clone(), "DELETE", "/api/agents/3", None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, states) = send(app.clone(), "GET", "/api/agents/state", None).await;
    assert_eq!(states.as_array().unwrap().len(), 2);

    let (status, _) = send(app, "DELETE", "/api/agents/3", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_attack_tool_routes() {
    let (_stub, dashboard) = common::dashboard().await;
    let app = create_router(dashboard);

    let (status, body) = send(
        app.clone(),
        "POST",
        "/api/agents/1/deauth",
        Some(json!({"interface": "wlan1mon", "apmacaddr": "aa:01", "channel": 6})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ap"], "aa:01");

    let (status, _) = send(
        app.clone(),
        "POST",
        "/api/agents/1/deauth",
        Some(json!({"interface": "", "apmacaddr": "aa:01", "channel": 6})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        app.clone(),
        "POST",
        "/api/agents/1/deauth/stopall",
        Some(json!({"interface": "wlan1mon"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "stopped");

    let (status, body) = send(
        app.clone(),
        "POST",
        "/api/agents/1/capture",
        Some(json!({"interface": "wlan1mon", "apmacaddr": "aa:01", "ssid": "corp", "channel": 6})),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["offline"], true);

    let (status, body) = send(app, "GET", "/api/agents/1/attack/status?interface=wlan1mon", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["offline"], true);
}
