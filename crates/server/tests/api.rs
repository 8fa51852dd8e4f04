use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use db::DBService;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use server::{AppState, app};
use services::services::{
    config::Config,
    renderer::{PdfRenderer, RendererError},
    reports::ReportService,
};
use tower::ServiceExt;

const STUB_PDF: &[u8] = b"%PDF-1.4 stub";

/// Deterministic renderer so report flows run without a browser.
struct StubRenderer;

#[async_trait]
impl PdfRenderer for StubRenderer {
    async fn render(&self, _html: &str) -> Result<Vec<u8>, RendererError> {
        Ok(STUB_PDF.to_vec())
    }
}

/// Renderer that always fails, for dependency-error mapping.
struct BrokenRenderer;

#[async_trait]
impl PdfRenderer for BrokenRenderer {
    async fn render(&self, _html: &str) -> Result<Vec<u8>, RendererError> {
        Err(RendererError::MissingOutput)
    }
}

fn test_config() -> Config {
    Config {
        host: "127.0.0.1".into(),
        port: 0,
        database_url: "sqlite::memory:".into(),
        jwt_secret: "test-secret".into(),
        chromium_path: None,
        render_timeout: std::time::Duration::from_secs(5),
    }
}

async fn test_app_with(renderer: Arc<dyn PdfRenderer>) -> Router {
    let db = DBService::new_in_memory().await.unwrap();
    app(AppState {
        db,
        reports: Arc::new(ReportService::new(renderer)),
        config: Arc::new(test_config()),
    })
}

async fn test_app() -> Router {
    test_app_with(Arc::new(StubRenderer)).await
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn register_and_token(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            None,
            &json!({"name": "Ana", "email": "ana@example.com", "password": "segredo123"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    body["data"]["token"].as_str().unwrap().to_string()
}

async fn seed_basics(app: &Router, token: &str) -> (i64, i64) {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/clients",
            Some(token),
            &json!({"name": "Padaria Central", "tax_id": "12345678000199"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let client_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/service-types",
            Some(token),
            &json!({"name": "Alvará", "authority": "Prefeitura"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let service_type_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    (client_id, service_type_id)
}

#[tokio::test]
async fn health_is_public() {
    let app = test_app().await;
    let response = app.oneshot(get_request("/api/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn protected_routes_require_a_bearer_token() {
    let app = test_app().await;
    let response = app
        .clone()
        .oneshot(get_request("/api/clients", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(get_request("/api/clients", Some("not-a-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_login_and_auth_failures() {
    let app = test_app().await;
    let _token = register_and_token(&app).await;

    // Duplicate email.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            None,
            &json!({"name": "Ana", "email": "ana@example.com", "password": "outra"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Wrong password.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            &json!({"email": "ana@example.com", "password": "errada"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Unknown user.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            &json!({"email": "ninguem@example.com", "password": "x"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Working login.
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            &json!({"email": "ana@example.com", "password": "segredo123"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert!(body["data"]["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn task_lifecycle_over_http() {
    let app = test_app().await;
    let token = register_and_token(&app).await;
    let (client_id, service_type_id) = seed_basics(&app, &token).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/tasks",
            Some(&token),
            &json!({
                "client_id": client_id,
                "service_type_id": service_type_id,
                "status": "Coleta_de_Informações",
                "total_value": 1200.5
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let task_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    // Status change through PUT lands in the history.
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/tasks/{task_id}"),
            Some(&token),
            &json!({"status": "Execucao"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/tasks/{task_id}"), Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let detail = body_json(response).await;
    assert_eq!(detail["data"]["status"], json!("Execucao"));
    assert_eq!(detail["data"]["client_name"], json!("Padaria Central"));
    assert_eq!(detail["data"]["history"].as_array().unwrap().len(), 1);

    // Unknown status filter is permissive: empty list, not an error.
    let response = app
        .clone()
        .oneshot(get_request("/api/tasks?status=Arquivado", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let list = body_json(response).await;
    assert!(list["data"].as_array().unwrap().is_empty());

    let response = app
        .oneshot(get_request("/api/tasks/999", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reports_render_through_both_formats() {
    let app = test_app().await;
    let token = register_and_token(&app).await;
    let (client_id, service_type_id) = seed_basics(&app, &token).await;

    for value in [200.0, 300.0] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/tasks",
                Some(&token),
                &json!({
                    "client_id": client_id,
                    "service_type_id": service_type_id,
                    "total_value": value
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    // PDF goes through the renderer seam.
    let response = app
        .clone()
        .oneshot(get_request("/api/reports/tasks", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/pdf"
    );
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("inline"));
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], STUB_PDF);

    // Excel is produced in-process; xlsx bytes are a ZIP container.
    let response = app
        .clone()
        .oneshot(get_request(
            "/api/reports/financial?format=excel&incluirSuportes=true",
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment"));
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[0..2], b"PK");

    // Malformed dates are a validation error, never coerced.
    let response = app
        .clone()
        .oneshot(get_request(
            "/api/reports/tasks?dataInicial=ontem",
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unknown client in the clients report is a 404.
    let response = app
        .oneshot(get_request(
            "/api/reports/clients?clienteId=999&format=excel",
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn renderer_failure_is_a_clean_dependency_error() {
    let app = test_app_with(Arc::new(BrokenRenderer)).await;
    let token = register_and_token(&app).await;

    let response = app
        .oneshot(get_request("/api/reports/financial", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));
}
