use std::io::Write;
use std::sync::Arc;

use axum::{routing::any_service, Router};
use http_body_util::BodyExt; // for .collect
use hyper::{header, Request, StatusCode};
use serde_json::{json, Value};
use tokio::time::{timeout, Duration};
use tower::ServiceExt; // for .oneshot

use analyze_image_mcp::infra::config::OpenAiConfig;
use analyze_image_mcp::infra::runtime::mcp_transport;

fn post(body: &Value, session_id: Option<&str>) -> Request<axum::body::Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/mcp")
        .header(header::ACCEPT, "application/json, text/event-stream")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(sid) = session_id {
        builder = builder.header("MCP-Session-Id", sid);
    }
    builder
        .body(axum::body::Body::from(body.to_string()))
        .unwrap()
}

async fn rpc_response(res: hyper::Response<axum::body::Body>) -> Value {
    let bytes = timeout(Duration::from_secs(20), res.into_body().collect())
        .await
        .expect("event stream did not complete")
        .unwrap()
        .to_bytes();
    let s = String::from_utf8_lossy(&bytes);
    s.lines()
        .find_map(|line| line.strip_prefix("data: ").map(|d| d.to_string()))
        .and_then(|d| serde_json::from_str::<Value>(&d).ok())
        .expect("Did not find an rpc response in the event stream")
}

#[tokio::test]
async fn initialize_list_and_call_analyze_image_over_streamable_http() {
    let server = httpmock::MockServer::start();
    let completion = server.mock(|when, then| {
        when.method(httpmock::Method::POST)
            .path("/chat/completions")
            .header("authorization", "Bearer sk-test")
            .body_contains("data:image/png;base64,");
        then.status(200).json_body(json!({
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": "{\"extracted_text\":\"hello\",\"prompt_response\":\"ok\"}"
                }
            }]
        }));
    });

    let mut img = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
    img.write_all(b"\x89PNG fake").unwrap();
    let image_path = img.path().to_str().unwrap().to_string();

    let factory = mcp_transport::analyze_factory(OpenAiConfig {
        api_key: Some("sk-test".into()),
        base_url: server.base_url(),
        ..OpenAiConfig::default()
    });
    let session_mgr = Arc::new(mcp_transport::LocalSessionManager::default());
    let app = mcp_transport::make_streamable_http_service(factory, session_mgr);
    let app = Router::new().route_service("/mcp", any_service(app));

    // Initialize
    let init = json!({
        "jsonrpc":"2.0","id":1,"method":"initialize",
        "params":{ "protocolVersion":"2025-03-26","capabilities":{},"clientInfo":{"name":"test","version":"0.1"} }
    });
    let init_res = app.clone().oneshot(post(&init, None)).await.unwrap();
    assert!(init_res.status().is_success());
    let session_id = init_res
        .headers()
        .get("MCP-Session-Id")
        .unwrap()
        .to_str()
        .unwrap()
        .to_owned();
    let init_body = rpc_response(init_res).await;
    assert!(init_body["result"]["capabilities"]["tools"].is_object());

    // notifications/initialized
    let initialized = json!({"jsonrpc":"2.0","method":"notifications/initialized","params":{}});
    let initialized_res = app
        .clone()
        .oneshot(post(&initialized, Some(&session_id)))
        .await
        .unwrap();
    assert_eq!(initialized_res.status(), StatusCode::ACCEPTED);

    // tools/list
    let list = json!({"jsonrpc":"2.0","id":2,"method":"tools/list","params":{}});
    let list_res = timeout(
        Duration::from_secs(20),
        app.clone().oneshot(post(&list, Some(&session_id))),
    )
    .await
    .unwrap()
    .unwrap();
    assert!(list_res.status().is_success());
    let listed = rpc_response(list_res).await;
    let tools = listed["result"]["tools"].as_array().expect("tools array");
    let names: Vec<&str> = tools.iter().filter_map(|t| t["name"].as_str()).collect();
    assert!(names.contains(&"analyze_image"), "got {:?}", names);
    assert!(names.contains(&"analyze_two_images"), "got {:?}", names);
    let analyze = tools.iter().find(|t| t["name"] == "analyze_image").unwrap();
    assert!(analyze["inputSchema"]["properties"]["image_path"]["description"]
        .as_str()
        .unwrap()
        .contains("absolute path"));

    // tools/call
    let call = json!({
        "jsonrpc":"2.0","id":3,"method":"tools/call",
        "params": {"name":"analyze_image","arguments":{"image_path": image_path, "prompt":"read it"}}
    });
    let call_res = timeout(
        Duration::from_secs(20),
        app.clone().oneshot(post(&call, Some(&session_id))),
    )
    .await
    .unwrap()
    .unwrap();
    assert!(call_res.status().is_success());
    let v = rpc_response(call_res).await;
    let structured = &v["result"]["structuredContent"];
    assert_eq!(structured["image_path"], image_path);
    assert_eq!(structured["prompt"], "read it");
    assert_eq!(structured["extracted_text"], "hello");
    assert_eq!(structured["description"], "");
    assert_eq!(structured["prompt_response"], "ok");
    completion.assert();
}
