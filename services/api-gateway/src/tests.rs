use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::path::Path;
use tempfile::TempDir;
use tower::ServiceExt;

use tendersheet_utils::AppConfig;

use crate::{create_app, AppState};

const BOUNDARY: &str = "tendersheet-test-boundary";

fn test_app() -> (TempDir, Router) {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    let mut config = AppConfig::default();
    config.storage.upload_dir = root.join("uploads");
    config.storage.output_dir = root.join("outputs");
    config.storage.illustration_path = None;
    config.storage.bidder_database_path = root.join("bidders.json");
    config.storage.analytics_path = root.join("analytics.json");

    let app = create_app(AppState::from_config(config).unwrap());
    (dir, app)
}

fn tender_workbook(works: usize) -> Vec<u8> {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "NIT No. and Number:").unwrap();
    sheet.write_string(0, 1, "HPPWD/12/2026").unwrap();
    for i in 0..works {
        let row = 2 + i as u32;
        sheet.write_number(row, 0, (i + 1) as f64).unwrap();
        sheet.write_string(row, 1, format!("Name of work {}", i + 1)).unwrap();
    }
    workbook.save_to_buffer().unwrap()
}

fn upload_request(file_name: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

fn generation_body(upload: &Value, percentile: Value) -> Value {
    let works: Vec<Value> = upload["data"]["works"]
        .as_array()
        .unwrap()
        .iter()
        .map(|work| {
            json!({
                "name": work["name"],
                "bidders": [
                    {"name": "Acme Builders", "address": "Mall Road, Shimla", "percentile": percentile},
                    {"name": "", "percentile": "3.5"}
                ]
            })
        })
        .collect();
    json!({ "data": { "nit_info": upload["data"]["nit_info"], "works": works } })
}

#[tokio::test]
async fn health_reports_service() {
    let (_dir, app) = test_app();
    let response = app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "tendersheet-api-gateway");
}

#[tokio::test]
async fn upload_generate_download() {
    let (dir, app) = test_app();

    let (status, upload) = send_json(&app, upload_request("nit sheet.xlsx", &tender_workbook(3))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(upload["success"], true);
    assert_eq!(upload["data"]["nit_info"]["nit_number"], "HPPWD/12/2026");
    assert_eq!(upload["data"]["works"].as_array().unwrap().len(), 3);
    assert_eq!(upload["data"]["filename"], "nit_sheet.xlsx");
    assert!(dir.path().join("uploads/nit_sheet.xlsx").is_file());

    let task_id = upload["task_id"].as_str().unwrap().to_string();
    let (_, progress) = send_json(&app, get(&format!("/progress/{task_id}"))).await;
    assert_eq!(progress["status"], "completed");
    assert_eq!(progress["current_step"], 5);

    let (status, generated) =
        send_json(&app, json_request("POST", "/generate", generation_body(&upload, json!(-2.5)))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(generated["files"].as_array().unwrap().len(), 4);
    assert_eq!(generated["files"][0], "comparison_template.xlsx");
    let zip_file = generated["zip_file"].as_str().unwrap();
    assert_eq!(generated["download_url"], format!("/download/{zip_file}"));

    let response = app
        .clone()
        .oneshot(get(&format!("/download/{zip_file}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/zip");
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.starts_with(b"PK"));

    let (_, analytics) = send_json(&app, get("/analytics")).await;
    assert_eq!(analytics["total_uploads"], 2);
    assert_eq!(analytics["successful_generations"], 2);
    assert_eq!(analytics["file_types"]["xlsx"], 1);
    assert_eq!(analytics["file_types"]["template_generation"], 1);

    // Only explicitly named bidders are stamped.
    let (_, all) = send_json(&app, get("/api/bidders/all")).await;
    let names: Vec<&str> = all["bidders"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|b| b["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Acme Builders"]);

    let (_, metrics) = send(&app, get("/metrics")).await;
    let metrics = String::from_utf8(metrics).unwrap();
    assert!(metrics.contains(r#"tendersheet_uploads_total{outcome="success"} 1"#));
    assert!(metrics.contains(r#"tendersheet_generations_total{outcome="success"} 1"#));
}

#[tokio::test]
async fn upload_rejections() {
    let (_dir, app) = test_app();

    let (status, body) = send_json(&app, upload_request("tender.csv", b"a,b")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Invalid file type. Please upload Excel files only (.xlsx, .xls)"
    );

    let (status, body) = send_json(&app, upload_request("", b"")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No file selected");

    let too_big = vec![0u8; 10 * 1024 * 1024 + 1];
    let (status, body) = send_json(&app, upload_request("big.xlsx", &too_big)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "File too large. Maximum size is 10MB");

    let (status, body) = send_json(&app, upload_request("empty.xlsx", &tender_workbook(0))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "PARSE_ERROR");
    assert_eq!(
        body["error"],
        "Failed to parse input file: No works data found in the file"
    );

    let (_, analytics) = send_json(&app, get("/analytics")).await;
    assert_eq!(analytics["total_uploads"], 4);
    assert_eq!(analytics["errors"], 4);
    assert_eq!(analytics["successful_generations"], 0);
    assert_eq!(analytics["file_types"]["csv"], 1);
    assert_eq!(analytics["file_types"]["unknown"], 1);
    assert_eq!(analytics["file_types"]["xlsx"], 2);

    let (_, metrics) = send(&app, get("/metrics")).await;
    let metrics = String::from_utf8(metrics).unwrap();
    assert!(metrics.contains(r#"tendersheet_uploads_total{outcome="failure"} 4"#));
}

#[tokio::test]
async fn generation_rejections() {
    let (dir, app) = test_app();

    let (status, body) = send_json(&app, json_request("POST", "/generate", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No data provided");

    let (_, upload) = send_json(&app, upload_request("tender.xlsx", &tender_workbook(2))).await;
    let (status, body) =
        send_json(&app, json_request("POST", "/generate", generation_body(&upload, json!(150)))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"].as_str().unwrap();
    assert!(message.starts_with("Invalid percentile for Name of work 1 - Acme Builders: "));

    let mut missing = generation_body(&upload, json!(1));
    missing["data"]["works"][1]["bidders"][1]["percentile"] = Value::Null;
    let (status, body) = send_json(&app, json_request("POST", "/generate", missing)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing percentile for Name of work 2 - Bidder 2");

    let outputs = std::fs::read_dir(dir.path().join("outputs")).unwrap().count();
    assert_eq!(outputs, 0);
}

#[tokio::test]
async fn download_guards() {
    let (dir, app) = test_app();
    std::fs::write(dir.path().join("secret.txt"), "top secret").unwrap();

    let (status, _) = send(&app, get("/download/..%2Fsecret.txt")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send_json(&app, get("/download/nothing.zip")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "File not found");
}

#[tokio::test]
async fn unknown_progress_is_empty() {
    let (_dir, app) = test_app();
    let (status, body) = send_json(&app, get("/progress/parse_00000000")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn bidder_lookup_endpoints() {
    let (dir, app) = test_app();

    for (name, address) in [
        ("Acme Builders", "Mall Road, Shimla"),
        ("Beas Contractors", "Bhuntar, Kullu"),
        ("Acorn Infra", "Sanjauli, Shimla"),
    ] {
        let (status, _) = send_json(
            &app,
            json_request("POST", "/api/bidders/usage", json!({"name": name, "address": address})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
    assert!(Path::new(&dir.path().join("bidders.json")).is_file());

    let (_, search) = send_json(&app, get("/api/bidders/search?q=shimla")).await;
    assert_eq!(search["bidders"].as_array().unwrap().len(), 2);
    assert_eq!(search["bidders"][0]["match_type"], "address");

    let (_, empty) = send_json(&app, get("/api/bidders/search?q=")).await;
    assert_eq!(empty["bidders"], json!([]));

    let (_, suggestions) = send_json(&app, get("/api/bidders/suggestions?q=ac")).await;
    assert_eq!(suggestions["suggestions"], json!(["Acme Builders", "Acorn Infra"]));

    let (_, recent) = send_json(&app, get("/api/bidders/recent?days=7")).await;
    assert_eq!(recent["bidders"].as_array().unwrap().len(), 3);
    assert_eq!(recent["bidders"][0]["days_ago"], 0);

    let (_, popular) = send_json(&app, get("/api/bidders/popular?limit=1")).await;
    assert_eq!(popular["bidders"].as_array().unwrap().len(), 1);

    let (_, stats) = send_json(&app, get("/api/bidders/stats")).await;
    assert_eq!(stats["total_bidders"], 3);
    assert_eq!(stats["top_locations"][0], json!({"location": "Shimla", "count": 2}));

    let (_, kullu) = send_json(&app, get("/api/bidders/location/Kullu")).await;
    assert_eq!(kullu["bidders"][0]["name"], "Beas Contractors");

    let (status, _) = send_json(
        &app,
        json_request("POST", "/api/bidders/usage", json!({"name": "  "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
