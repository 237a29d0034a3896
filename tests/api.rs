//! Testes de ponta a ponta do router: autenticação, sessões, fotos, relatórios e admin.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use chrono::FixedOffset;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use fieldtrack::{
    config::{AppState, Config},
    db,
};

const BOUNDARY: &str = "----fieldtrack-test-boundary";

struct TestApp {
    router: axum::Router,
    _uploads: tempfile::TempDir,
}

/// Helper: app completo sobre SQLite em memória, com usuários de demonstração e um admin.
async fn test_app() -> TestApp {
    let uploads = tempfile::tempdir().unwrap();

    let config = Config {
        database_url: "sqlite::memory:".into(),
        max_connections: 1,
        jwt_secret: "segredo-de-teste".into(),
        jwt_ttl_hours: 1,
        bcrypt_cost: 4,
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        upload_dir: uploads.path().to_path_buf(),
        max_upload_bytes: 1024 * 1024,
        public_base_url: None,
        report_offset: FixedOffset::east_opt(3600).unwrap(),
        fonts_dir: uploads.path().join("fonts"),
        seed_demo_users: true,
        admin_email: Some("root@test.pl".into()),
        admin_password: Some("root1234".into()),
    };

    let pool = db::connect(&config.database_url, 1).await.unwrap();
    db::run_migrations(&pool).await.unwrap();

    let state = AppState::from_parts(config, pool);
    db::seed::seed_demo_users(&state.user_repo, &state.auth_service).await.unwrap();
    db::seed::ensure_admin(&state.user_repo, &state.auth_service, "root@test.pl", "root1234")
        .await
        .unwrap();

    TestApp {
        router: fieldtrack::routes::app(state),
        _uploads: uploads,
    }
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::String(String::from_utf8_lossy(&bytes).into()));
        (status, body)
    }

    async fn call(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .call(Method::POST, "/api/auth/login", None, Some(json!({ "email": email, "password": password })))
            .await;
        assert_eq!(status, StatusCode::OK, "login falhou: {}", body);
        body["token"].as_str().unwrap().to_string()
    }

    async fn upload(&self, token: &str, fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> (StatusCode, Value) {
        let mut body: Vec<u8> = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes(),
            );
        }
        if let Some((filename, content_type, bytes)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/photos")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }
}

fn full_session(client_id: &str) -> Value {
    json!({
        "clientId": client_id,
        "clientName": "Jan Kowalski",
        "startTime": "2024-01-15T07:00:00Z",
        "endTime": "2024-01-15T15:30:00Z",
        "duration": 30600,
        "route": [
            { "lat": 52.2297, "lng": 21.0122, "timestamp": "2024-01-15T07:00:00Z", "accuracy": 10.0 },
            { "lat": 52.2300, "lng": 21.0125, "timestamp": "2024-01-15T07:15:00Z", "accuracy": 10.0 },
            { "lat": 52.2305, "lng": 21.0130, "timestamp": "2024-01-15T07:30:00Z", "accuracy": 10.0 },
            { "lat": 52.2310, "lng": 21.0140, "timestamp": "2024-01-15T07:45:00Z", "accuracy": 10.0 }
        ],
        "notes": "Montaż zakończony"
    })
}

// -- Públicas ------------------------------------------------------------------

#[tokio::test]
async fn health_is_public() {
    let app = test_app().await;
    let (status, body) = app.call(Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn seeded_client_logs_in_and_wrong_password_is_401() {
    let app = test_app().await;
    let token = app.login("klient@test.pl", "test123").await;

    let (status, body) = app.call(Method::GET, "/api/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["clientId"], "client_001");
    assert_eq!(body["user"]["role"], "client");
    assert!(body["user"].get("passwordHash").is_none());

    let (status, body) = app
        .call(Method::POST, "/api/auth/login", None, Some(json!({ "email": "klient@test.pl", "password": "zle" })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let app = test_app().await;
    let (status, _) = app.call(Method::GET, "/api/sessions", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.call(Method::GET, "/api/sessions", Some("nao-e-um-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// -- Sessões -------------------------------------------------------------------

#[tokio::test]
async fn worker_creates_and_client_reads_own_sessions() {
    let app = test_app().await;
    let worker = app.login("admin@test.pl", "admin123").await;
    let client = app.login("klient@test.pl", "test123").await;

    let (status, body) = app
        .call(Method::POST, "/api/sessions", Some(&worker), Some(full_session("client_001")))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let id = body["session"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["session"]["duration"], 30600);
    assert_eq!(body["session"]["route"].as_array().unwrap().len(), 4);

    let (status, body) = app.call(Method::GET, "/api/sessions/client/client_001", Some(&client), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sessions"][0]["id"], id.as_str());

    let (status, _) = app.call(Method::GET, &format!("/api/sessions/{id}"), Some(&client), None).await;
    assert_eq!(status, StatusCode::OK);

    // Outro cliente, outra conta
    let (status, _) = app.call(Method::GET, "/api/sessions/client/client_999", Some(&client), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Cliente não registra sessões
    let (status, _) = app
        .call(Method::POST, "/api/sessions", Some(&client), Some(full_session("client_001")))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn create_rejects_missing_fields_and_bad_duration() {
    let app = test_app().await;
    let worker = app.login("admin@test.pl", "admin123").await;

    let (status, body) = app
        .call(Method::POST, "/api/sessions", Some(&worker), Some(json!({ "clientName": "Jan" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let details = &body["details"];
    assert!(details.get("clientId").is_some() || details.get("client_id").is_some(), "{}", body);
    assert!(details.get("startTime").is_some() || details.get("start_time").is_some(), "{}", body);

    let mut session = full_session("client_001");
    session["duration"] = json!(60);
    let (status, body) = app.call(Method::POST, "/api/sessions", Some(&worker), Some(session)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"].get("duration").is_some());
}

#[tokio::test]
async fn summary_and_report_describe_the_session() {
    let app = test_app().await;
    let worker = app.login("admin@test.pl", "admin123").await;
    let (_, body) = app
        .call(Method::POST, "/api/sessions", Some(&worker), Some(full_session("client_001")))
        .await;
    let id = body["session"]["id"].as_str().unwrap().to_string();

    let (status, body) = app.call(Method::GET, &format!("/api/sessions/{id}/summary"), Some(&worker), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["duration"], "08:30:00");
    assert_eq!(body["summary"]["durationShort"], "8h 30m");
    assert_eq!(body["summary"]["pointCount"], 4);
    let km = body["summary"]["distanceKm"].as_f64().unwrap();
    assert!(km > 0.18 && km < 0.20, "distância: {}", km);

    let (status, body) = app.call(Method::GET, &format!("/api/sessions/{id}/report"), Some(&worker), None).await;
    assert_eq!(status, StatusCode::OK);
    let text = body.as_str().unwrap();
    assert!(text.contains("RELATÓRIO DE TRABALHO"));
    assert!(text.contains("Cliente: Jan Kowalski"));
    assert!(text.contains("Início: 08:00"));
    assert!(text.contains("Nenhuma foto nesta sessão"));

    let (status, body) = app
        .call(Method::GET, &format!("/api/sessions/{id}/report?format=json"), Some(&worker), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["report"]["status"], "Concluída");
    assert_eq!(body["report"]["routePoints"], 4);
}

#[tokio::test]
async fn update_and_delete_sessions() {
    let app = test_app().await;
    let worker = app.login("admin@test.pl", "admin123").await;
    let (_, body) = app
        .call(Method::POST, "/api/sessions", Some(&worker), Some(full_session("client_001")))
        .await;
    let id = body["session"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .call(Method::PUT, &format!("/api/sessions/{id}"), Some(&worker), Some(json!({ "endTime": "2024-01-15T09:00:00Z" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session"]["duration"], 7200);
    assert_eq!(body["session"]["clientName"], "Jan Kowalski");

    let (status, _) = app.call(Method::DELETE, &format!("/api/sessions/{id}"), Some(&worker), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.call(Method::DELETE, &format!("/api/sessions/{id}"), Some(&worker), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.call(Method::GET, &format!("/api/sessions/{id}"), Some(&worker), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn live_session_rejects_points_after_finish() {
    let app = test_app().await;
    let worker = app.login("admin@test.pl", "admin123").await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/sessions/start",
            Some(&worker),
            Some(json!({ "clientId": "client_001", "clientName": "Jan Kowalski", "startTime": "2024-01-15T07:00:00Z" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["session"]["status"], "in_progress");
    let id = body["session"]["id"].as_str().unwrap().to_string();

    let points = json!({ "points": [
        { "lat": 52.2297, "lng": 21.0122, "timestamp": "2024-01-15T07:00:00Z" },
        { "lat": 52.2300, "lng": 21.0125, "timestamp": "2024-01-15T07:15:00Z" }
    ]});
    let (status, body) = app.call(Method::POST, &format!("/api/sessions/{id}/route"), Some(&worker), Some(points)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pointCount"], 2);

    let (status, body) = app
        .call(Method::POST, &format!("/api/sessions/{id}/finish"), Some(&worker), Some(json!({ "endTime": "2024-01-15T15:30:00Z" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session"]["status"], "completed");
    assert_eq!(body["session"]["duration"], 30600);

    let late = json!({ "points": [{ "lat": 52.0, "lng": 21.0, "timestamp": "2024-01-15T16:00:00Z" }] });
    let (status, _) = app.call(Method::POST, &format!("/api/sessions/{id}/route"), Some(&worker), Some(late)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

// -- Fotos ---------------------------------------------------------------------

#[tokio::test]
async fn photo_upload_attaches_and_is_served() {
    let app = test_app().await;
    let worker = app.login("admin@test.pl", "admin123").await;
    let (_, body) = app
        .call(Method::POST, "/api/sessions", Some(&worker), Some(full_session("client_001")))
        .await;
    let session_id = body["session"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .upload(
            &worker,
            &[("sessionId", session_id.as_str()), ("description", "Montaż instalacji"), ("lat", "52.2305"), ("lng", "21.0130")],
            Some(("montaz.jpg", "image/jpeg", &b"\xFF\xD8\xFFfake-jpeg"[..])),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["attachment"]["status"], "attached");
    let url = body["photo"]["url"].as_str().unwrap().to_string();

    let (status, body) = app
        .call(Method::GET, &format!("/api/photos/session/{session_id}"), Some(&worker), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["photos"].as_array().unwrap().len(), 1);

    let (_, body) = app.call(Method::GET, &format!("/api/sessions/{session_id}"), Some(&worker), None).await;
    assert_eq!(body["session"]["photos"][0]["description"], "Montaż instalacji");

    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri(&url).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn photo_for_missing_session_is_saved_with_a_partial_failure() {
    let app = test_app().await;
    let worker = app.login("admin@test.pl", "admin123").await;
    let ghost = uuid::Uuid::new_v4().to_string();

    let (status, body) = app
        .upload(&worker, &[("sessionId", ghost.as_str())], Some(("foto.jpg", "image/jpeg", &b"jpeg"[..])))
        .await;
    assert_eq!(status, StatusCode::MULTI_STATUS);
    assert_eq!(body["attachment"]["status"], "session_not_found");
    assert!(body["warning"].is_string());
    assert!(body["photo"]["sessionId"].is_null());
}

#[tokio::test]
async fn upload_without_file_or_with_non_image_is_rejected() {
    let app = test_app().await;
    let worker = app.login("admin@test.pl", "admin123").await;

    let (status, _) = app.upload(&worker, &[("description", "sem arquivo")], None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .upload(&worker, &[], Some(("notas.txt", "text/plain", &b"texto"[..])))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// -- Admin ---------------------------------------------------------------------

#[tokio::test]
async fn only_admin_manages_accounts() {
    let app = test_app().await;
    let admin = app.login("root@test.pl", "root1234").await;
    let worker = app.login("admin@test.pl", "admin123").await;

    let new_client = json!({ "email": "nowy@test.pl", "password": "haslo123", "name": "Anna Nowak" });

    let (status, _) = app.call(Method::POST, "/api/admin/users", Some(&worker), Some(new_client.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.call(Method::POST, "/api/admin/users", Some(&admin), Some(new_client.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["role"], "client");
    assert!(body["user"]["clientId"].as_str().unwrap().starts_with("client_"));
    let new_id = body["user"]["id"].as_str().unwrap().to_string();

    let (status, _) = app.call(Method::POST, "/api/admin/users", Some(&admin), Some(new_client)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app.call(Method::GET, "/api/clients", Some(&worker), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["clients"].as_array().unwrap().len(), 2);

    let (status, _) = app.call(Method::DELETE, &format!("/api/admin/users/{new_id}"), Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.call(Method::DELETE, &format!("/api/admin/users/{new_id}"), Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
