// End-to-end: dashboard over the HTTP controller client against a mock server

use mockito::{Matcher, Server, ServerGuard};
use sparrow_fusion::client::HttpControllerClient;
use sparrow_fusion::config::DashboardConfig;
use sparrow_fusion::dashboard::Dashboard;
use sparrow_fusion::scan_state::ScanState;
use std::sync::Arc;
use std::time::Duration;

const AGENTS: &str = r#"[
    {
        "id": 1,
        "name": "roof",
        "base_url": "http://10.0.0.1:8020",
        "capabilities": ["wifi", "bluetooth", "falcon"],
        "interfaces": {"wlan0": {}, "wlan1": {}},
        "monitor_map": {"wlan1": "wlan1mon"},
        "gps": {"gpspos": {"latitude": "52.0", "longitude": "4.0"}}
    }
]"#;

async fn controller() -> ServerGuard {
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/api/agents")
        .with_status(200)
        .with_body(AGENTS)
        .create_async()
        .await;
    server
        .mock("GET", "/api/agents/1")
        .with_status(200)
        .with_body(
            r#"{"id": 1, "name": "roof", "interfaces": {"wlan0": {}, "wlan1": {}},
                "monitor_map": {"wlan1": "wlan1mon"},
                "gps": {"gpspos": {"latitude": "52.0", "longitude": "4.0"}}}"#,
        )
        .create_async()
        .await;
    server
        .mock("GET", "/api/agents/1/status")
        .with_status(200)
        .with_body(r#"{"interfaces": {"wlan1mon": {"mode": "monitor"}}}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/api/falcon/1/scan/status")
        .match_query(Matcher::UrlEncoded("interface".into(), "wlan1mon".into()))
        .with_status(200)
        .with_body(r#"{"scanstate": "Running"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/api/falcon/1/scan/results")
        .with_status(200)
        .with_body(
            r#"{"networks": [{"macAddr": "AA:00:00:00:00:01", "ssid": "corp", "channel": 6}],
                "clients": [{"macAddr": "cc:00:00:00:00:01", "apMacAddr": "AA:00:00:00:00:01"},
                            {"macAddr": "cc:00:00:00:00:02", "apMacAddr": "aa:00:00:00:00:01"}]}"#,
        )
        .create_async()
        .await;
    server
        .mock("GET", "/api/scans?limit=20")
        .with_status(200)
        .with_body(
            r#"[
                {"id": 5, "agent_id": 1, "scan_type": "wifi", "status": "completed",
                 "created_at": "2026-01-01T00:00:00",
                 "response_payload": {
                    "networks": [{"macAddr": "AA:00:00:00:00:01", "ssid": "corp", "signal": -55,
                                  "lat": 52.1, "lon": 4.1, "gpsvalid": true}],
                    "clients": [{"macAddr": "cc:00:00:00:00:01"}]
                 }},
                {"id": 4, "agent_id": 1, "scan_type": "bluetooth", "status": "completed",
                 "response_payload": {"devices": [{"mac": "dd:00:00:00:00:01", "name": "watch"}]}}
            ]"#,
        )
        .create_async()
        .await;

    server
}

fn dashboard(server: &ServerGuard) -> Arc<Dashboard> {
    let client = HttpControllerClient::new(server.url(), Duration::from_secs(5)).unwrap();
    Arc::new(Dashboard::new(DashboardConfig::default(), Arc::new(client)))
}

/// Agent refresh focuses the only agent and discovers its running scan.
#[tokio::test]
async fn test_focus_discovers_running_attack_scan() {
    let server = controller().await;
    let dashboard = dashboard(&server);

    assert_eq!(dashboard.refresh_agents().await.unwrap(), 1);
    assert_eq!(dashboard.focused(), Some(1));
    assert_eq!(
        dashboard.scan_state(1),
        ScanState::Active {
            monitor_alias: "wlan1mon".to_string()
        }
    );
    assert_eq!(dashboard.polling_agent(), Some(1));

    assert!(dashboard.poll_tick(1).await);
    let view = dashboard.attack_view(1, 1, 1).unwrap();
    assert_eq!(view.networks.total, 1);
    assert_eq!(view.networks.items[0].client_count, 2);
    assert_eq!(view.clients.total, 2);
}

/// Scan history is re-ingested into both domains.
#[tokio::test]
async fn test_scan_history_ingested() {
    let server = controller().await;
    let dashboard = dashboard(&server);
    dashboard.refresh_agents().await.unwrap();

    assert_eq!(dashboard.refresh_scans().await.unwrap(), 2);

    let network = dashboard.wifi().get("aa:00:00:00:00:01").unwrap();
    assert_eq!(network.name, "corp");
    assert_eq!(network.scan_id, Some(5));
    assert_eq!(dashboard.wifi().len(), 2);

    let device = dashboard.bluetooth().get("DD:00:00:00:00:01").unwrap();
    assert_eq!(device.name, "watch");
    assert_eq!(device.agent_name, "roof");

    let summaries: Vec<String> = dashboard
        .recent_scans()
        .into_iter()
        .map(|s| s.summary)
        .collect();
    assert_eq!(summaries, vec!["1 networks", "1 devices"]);

    // Same history again: nothing changes
    let before = dashboard.wifi().list();
    dashboard.refresh_scans().await.unwrap();
    assert_eq!(dashboard.wifi().list(), before);
}
