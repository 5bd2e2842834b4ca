//! End-to-end HTTP tests against the in-memory backend.

use hims_server::config::AdminUserConfig;
use hims_server::{AppConfig, ServerBuilder};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use tokio::task::JoinHandle;

const ADMIN_USER: &str = "root.admin";
const ADMIN_PASSWORD: &str = "correct-horse-battery";

fn test_config() -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.auth.jwt_secret = "integration-test-secret-0123456789abcdef".into();
    cfg.bootstrap.admin_user = Some(AdminUserConfig {
        username: ADMIN_USER.into(),
        password: Some(ADMIN_PASSWORD.into()),
        display_name: "Root".into(),
        email: None,
    });
    cfg
}

async fn start_server() -> (String, tokio::sync::oneshot::Sender<()>, JoinHandle<()>) {
    let server = ServerBuilder::new()
        .with_config(test_config())
        .with_storage(hims_db_memory::create_storage())
        .build()
        .await
        .expect("build server");
    let app = server.into_router();

    let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = rx.await;
            })
            .await;
    });

    (format!("http://{addr}"), tx, handle)
}

async fn login(client: &Client, base: &str, username: &str, password: &str) -> String {
    let resp = client
        .post(format!("{base}/api/auth/login"))
        .json(&json!({"username": username, "password": password}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK, "login as {username}");
    let body: Value = resp.json().await.unwrap();
    body["data"]["token"].as_str().expect("token").to_string()
}

async fn create_staff(client: &Client, base: &str, admin: &str, username: &str, role: &str) -> String {
    let resp = client
        .post(format!("{base}/api/staff"))
        .bearer_auth(admin)
        .json(&json!({
            "username": username,
            "display_name": username,
            "role": role,
            "password": "staff-password-1",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.unwrap();
    body["data"]["id"].as_str().unwrap().to_string()
}

async fn create_bed(client: &Client, base: &str, admin: &str, number: &str) -> String {
    let resp = client
        .post(format!("{base}/api/beds"))
        .bearer_auth(admin)
        .json(&json!({"number": number, "floor": 2, "room": "204", "service": "cardiology"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.unwrap();
    body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_and_readiness() {
    let (base, shutdown, handle) = start_server().await;
    let client = Client::new();

    let resp = client.get(format!("{base}/healthz")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");

    let resp = client.get(format!("{base}/readyz")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ready");
    assert_eq!(body["backend"], "memory");

    let resp = client.get(format!("{base}/")).send().await.unwrap();
    assert!(resp.headers().contains_key("x-request-id"));

    let _ = shutdown.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn authentication_is_required() {
    let (base, shutdown, handle) = start_server().await;
    let client = Client::new();

    let resp = client.get(format!("{base}/api/beds")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key("www-authenticate"));
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "unauthorized");
    assert!(body["timestamp"].is_string());

    let resp = client
        .post(format!("{base}/api/auth/login"))
        .json(&json!({"username": ADMIN_USER, "password": "wrong-password"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let token = login(&client, &base, ADMIN_USER, ADMIN_PASSWORD).await;
    let resp = client
        .get(format!("{base}/api/auth/me"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["username"], ADMIN_USER);
    assert_eq!(body["data"]["role"], "admin");

    let _ = shutdown.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn admission_lifecycle_over_http() {
    let (base, shutdown, handle) = start_server().await;
    let client = Client::new();
    let admin = login(&client, &base, ADMIN_USER, ADMIN_PASSWORD).await;

    let physician_id = create_staff(&client, &base, &admin, "dr.grey", "physician").await;
    create_staff(&client, &base, &admin, "reg.desk", "registrar").await;
    let registrar = login(&client, &base, "reg.desk", "staff-password-1").await;

    let bed_a = create_bed(&client, &base, &admin, "C-204-A").await;
    let bed_b = create_bed(&client, &base, &admin, "C-204-B").await;

    // Register a patient
    let resp = client
        .post(format!("{base}/api/patients"))
        .bearer_auth(&registrar)
        .json(&json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "date_of_birth": "1985-12-10",
            "sex": "female",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Patient registered");
    let patient_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["status"], "ambulatory");

    // Admit into bed A
    let resp = client
        .post(format!("{base}/api/admissions"))
        .bearer_auth(&registrar)
        .json(&json!({
            "patient_id": patient_id,
            "physician_id": physician_id,
            "admission_type": "emergency",
            "reason": "chest pain",
            "entry_diagnosis": "suspected angina",
            "bed_id": bed_a,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.unwrap();
    let admission = &body["data"];
    let admission_id = admission["id"].as_str().unwrap().to_string();
    assert_eq!(admission["status"], "ongoing");
    assert_eq!(admission["bed_id"], bed_a.as_str());
    assert_eq!(admission["admission_number"].as_str().unwrap().len(), 8);

    let resp = client
        .get(format!("{base}/api/beds/{bed_a}"))
        .bearer_auth(&registrar)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["status"], "occupied");

    let resp = client
        .get(format!("{base}/api/patients/{patient_id}"))
        .bearer_auth(&registrar)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["status"], "admitted");

    // Reassigning to the occupied bed conflicts
    let resp = client
        .put(format!("{base}/api/admissions/{admission_id}/bed"))
        .bearer_auth(&registrar)
        .json(&json!({"bed_id": bed_a}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "conflict");

    // Move to bed B
    let resp = client
        .put(format!("{base}/api/admissions/{admission_id}/bed"))
        .bearer_auth(&registrar)
        .json(&json!({"bed_id": bed_b}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["bed_id"], bed_b.as_str());

    let resp = client
        .get(format!("{base}/api/beds?available_only=true"))
        .bearer_auth(&registrar)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let available: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["id"].as_str().unwrap())
        .collect();
    assert_eq!(available, vec![bed_a.as_str()]);

    let resp = client
        .get(format!("{base}/api/admissions"))
        .bearer_auth(&registrar)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // Discharge
    let resp = client
        .post(format!("{base}/api/admissions/{admission_id}/close"))
        .bearer_auth(&registrar)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["status"], "discharged");
    assert!(body["data"]["discharged_at"].is_string());

    let resp = client
        .get(format!("{base}/api/admissions"))
        .bearer_auth(&registrar)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert!(body["data"].as_array().unwrap().is_empty());

    let resp = client
        .get(format!("{base}/api/patients/{patient_id}/admissions"))
        .bearer_auth(&registrar)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let resp = client
        .post(format!("{base}/api/admissions/{admission_id}/close"))
        .bearer_auth(&registrar)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let _ = shutdown.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn roles_are_enforced() {
    let (base, shutdown, handle) = start_server().await;
    let client = Client::new();
    let admin = login(&client, &base, ADMIN_USER, ADMIN_PASSWORD).await;

    create_staff(&client, &base, &admin, "nurse.joy", "nurse").await;
    let nurse = login(&client, &base, "nurse.joy", "staff-password-1").await;

    let resp = client
        .post(format!("{base}/api/beds"))
        .bearer_auth(&nurse)
        .json(&json!({"number": "X-1", "floor": 1, "room": "1", "service": "icu"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "forbidden");

    let resp = client
        .get(format!("{base}/api/staff"))
        .bearer_auth(&nurse)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Admins cannot lock themselves out
    let resp = client
        .get(format!("{base}/api/auth/me"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let admin_id = body["data"]["id"].as_str().unwrap().to_string();
    let resp = client
        .patch(format!("{base}/api/staff/{admin_id}/active"))
        .bearer_auth(&admin)
        .json(&json!({"active": false}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Occupied is not an administrative status
    let bed = create_bed(&client, &base, &admin, "C-300-A").await;
    let resp = client
        .patch(format!("{base}/api/beds/{bed}/status"))
        .bearer_auth(&admin)
        .json(&json!({"status": "occupied"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .patch(format!("{base}/api/beds/{bed}/status"))
        .bearer_auth(&admin)
        .json(&json!({"status": "maintenance"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["status"], "maintenance");

    let _ = shutdown.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn malformed_requests_use_error_envelope() {
    let (base, shutdown, handle) = start_server().await;
    let client = Client::new();
    let admin = login(&client, &base, ADMIN_USER, ADMIN_PASSWORD).await;

    let resp = client
        .get(format!("{base}/api/patients/not-a-uuid"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "bad_request");

    let resp = client
        .get(format!("{base}/api/patients/{}", uuid::Uuid::new_v4()))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = client
        .post(format!("{base}/api/beds"))
        .bearer_auth(&admin)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);

    let _ = shutdown.send(());
    let _ = handle.await;
}
