use super::*;
use crate::TranslationProvider;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use shared::error::ErrorCode;
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
struct BridgeState {
    calls: Arc<Mutex<Vec<(String, Value)>>>,
}

async fn handle_rpc(
    State(state): State<BridgeState>,
    Path(procedure): Path<String>,
    Json(body): Json<Value>,
) -> axum::response::Response {
    state
        .calls
        .lock()
        .await
        .push((procedure.clone(), body.clone()));

    match procedure.as_str() {
        "get_committees" => Json(json!(["ISO/TC 122", "ISO/TC 6"])).into_response(),
        "update_committees" => Json(json!(true)).into_response(),
        "remove_committee" => Json(json!(false)).into_response(),
        "perform_scan" => Json(json!({
            "success": true,
            "message": "Standards scan completed successfully",
            "last_update": "18 October 2026",
            "changes_found": 0,
            "duration": "2 seconds"
        }))
        .into_response(),
        "get_app_status" => Json(json!({
            "last_update": "23 August 2025",
            "language": "nl",
            "scan_interval": 30
        }))
        .into_response(),
        "get_language" => Json(json!("nl")).into_response(),
        "get_translations" => Json(json!({ "app_title": "WPSG Automatiseringstool" })).into_response(),
        "set_language" => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiError::new(ErrorCode::Unavailable, "config locked")),
        )
            .into_response(),
        "add_committee" => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        _ => Json(json!({ "unexpected": true })).into_response(),
    }
}

async fn spawn_bridge() -> Result<(Url, BridgeState)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = BridgeState::default();
    let app = Router::new()
        .route("/api/rpc/:procedure", post(handle_rpc))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((Url::parse(&format!("http://{addr}/api/"))?, state))
}

fn store(url: Url) -> HttpCommitteeStore {
    HttpCommitteeStore::new(url, Duration::from_secs(5)).expect("store")
}

#[test]
fn endpoint_appends_rpc_segment_after_base_path() {
    let with_slash = store(Url::parse("http://bridge.local/api/").expect("url"));
    let without_slash = store(Url::parse("http://bridge.local/api").expect("url"));
    assert_eq!(
        with_slash.endpoint("get_committees").as_str(),
        "http://bridge.local/api/rpc/get_committees"
    );
    assert_eq!(
        without_slash.endpoint("perform_scan").as_str(),
        "http://bridge.local/api/rpc/perform_scan"
    );
}

#[tokio::test]
async fn list_posts_envelope_and_decodes_names() {
    let (url, state) = spawn_bridge().await.expect("spawn bridge");
    let committees = store(url).list(Filter::Iso).await.expect("list");

    assert_eq!(committees, vec!["ISO/TC 122", "ISO/TC 6"]);
    let calls = state.calls.lock().await;
    assert_eq!(calls[0].0, "get_committees");
    assert_eq!(
        calls[0].1,
        json!({ "procedure": "get_committees", "args": { "organization": "ISO" } })
    );
}

#[tokio::test]
async fn update_sends_whole_list() {
    let (url, state) = spawn_bridge().await.expect("spawn bridge");
    let names = vec!["A".to_string(), "B2".to_string(), "C".to_string()];
    assert!(store(url).update(Filter::Cen, &names).await.expect("update"));

    let calls = state.calls.lock().await;
    assert_eq!(calls[0].1["args"]["committees"], json!(["A", "B2", "C"]));
}

#[tokio::test]
async fn refusal_is_ok_false_not_an_error() {
    let (url, _) = spawn_bridge().await.expect("spawn bridge");
    let removed = store(url).remove(Filter::Cen, "missing").await.expect("call");
    assert!(!removed);
}

#[tokio::test]
async fn structured_bridge_errors_keep_api_message() {
    let (url, _) = spawn_bridge().await.expect("spawn bridge");
    let err = store(url)
        .set_language(&LanguageCode::dutch())
        .await
        .expect_err("bridge error");

    let rendered = format!("{err:#}");
    assert!(rendered.contains("set_language"), "{rendered}");
    assert!(rendered.contains("config locked"), "{rendered}");
    assert!(err.downcast_ref::<ApiException>().is_some());
}

#[tokio::test]
async fn unstructured_bridge_errors_include_body() {
    let (url, _) = spawn_bridge().await.expect("spawn bridge");
    let err = store(url)
        .add(Filter::Cen, "New CEN Committee")
        .await
        .expect_err("bridge error");
    assert!(format!("{err:#}").contains("boom"));
}

#[tokio::test]
async fn scan_status_and_translations_decode() {
    let (url, _) = spawn_bridge().await.expect("spawn bridge");
    let store = store(url);

    let report = store.scan().await.expect("scan");
    assert!(report.success);
    assert_eq!(report.last_update.as_deref(), Some("18 October 2026"));

    let status = store.status().await.expect("status");
    assert_eq!(status.language, LanguageCode::dutch());
    assert_eq!(status.version, None);

    let table = store
        .fetch_translations(&LanguageCode::dutch())
        .await
        .expect("translations");
    assert_eq!(table.text("app_title"), "WPSG Automatiseringstool");
    assert_eq!(store.language().await.expect("language"), LanguageCode::dutch());
}

#[tokio::test]
async fn unreachable_bridge_is_an_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let err = store(Url::parse(&format!("http://{addr}/")).expect("url"))
        .list(Filter::Cen)
        .await
        .expect_err("connection refused");
    assert!(format!("{err:#}").contains("get_committees"));
}

#[tokio::test]
async fn malformed_payload_is_an_error() {
    let (url, _) = spawn_bridge().await.expect("spawn bridge");
    let err = store(url).test_connection().await.expect_err("malformed");
    assert!(format!("{err:#}").contains("malformed payload"));
}
