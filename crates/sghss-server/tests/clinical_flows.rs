//! End-to-end flow tests against a real PostgreSQL database.
//!
//! These exercise the invariants that only hold across the service and
//! storage layers together: the double-booking conflict, the visit-note
//! side effect on appointment status, and the non-idempotent patient
//! reactivation. They run only when `SGHSS_TEST_DATABASE_URL` points at a
//! disposable database; without it the test returns early.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use sghss_auth::{AuthState, TokenService};
use sghss_db::{PgPool, ensure_schema};
use sghss_server::{AppState, build_router};

async fn connect_app() -> Option<Router> {
    let url = std::env::var("SGHSS_TEST_DATABASE_URL").ok()?;
    let pool = PgPool::connect(&url)
        .await
        .expect("test database should be reachable");
    ensure_schema(&pool).await.expect("schema bootstrap");

    let auth = AuthState::new(Arc::new(TokenService::new("test-secret")));
    Some(build_router(AppState { pool, auth }))
}

/// Unique per-run suffix so reruns never trip the username/CPF unique
/// constraints on leftover rows.
fn run_tag() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock after epoch")
        .as_nanos()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("request");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 256 * 1024)
        .await
        .expect("body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

fn post_json(uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    json_request("POST", uri, token, body)
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

fn get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request")
}

#[tokio::test]
async fn test_scheduling_notes_and_reactivation_invariants() {
    let Some(app) = connect_app().await else {
        eprintln!("SGHSS_TEST_DATABASE_URL not set; skipping");
        return;
    };
    let tag = run_tag();

    // A doctor account, registered and logged in through the API.
    let username = format!("dr.teste.{tag}");
    let (status, body) = send(
        &app,
        post_json(
            "/api/register",
            None,
            &json!({
                "username": username,
                "password": "senha123",
                "tipo_usuario": "medico",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let doctor_id = body["user_id"].as_i64().expect("user_id");

    let (status, body) = send(
        &app,
        post_json(
            "/api/login",
            None,
            &json!({ "username": username, "password": "senha123" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let token = body["access_token"].as_str().expect("token").to_string();

    // A patient; the CPF digits come from the run tag.
    let cpf = format!("{:011}", tag % 100_000_000_000);
    let (status, body) = send(
        &app,
        post_json(
            "/api/pacientes",
            Some(&token),
            &json!({ "nome": "Paciente de Fluxo", "cpf": cpf }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let patient_id = body["paciente"]["id"].as_i64().expect("patient id");

    // First booking succeeds; the identical slot for the same doctor is
    // refused with a conflict.
    let slot = json!({
        "paciente_id": patient_id,
        "medico_id": doctor_id,
        "data_consulta": "2031-01-01 10:00",
    });
    let (status, body) = send(&app, post_json("/api/consultas", Some(&token), &slot)).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let appointment_id = body["consulta"]["id"].as_i64().expect("appointment id");
    assert_eq!(body["consulta"]["status"], "agendada");

    let (status, body) = send(&app, post_json("/api/consultas", Some(&token), &slot)).await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert_eq!(
        body["error"],
        "Médico já possui consulta agendada neste horário"
    );

    // Creating the visit note flips the appointment to 'realizada'.
    let (status, body) = send(
        &app,
        post_json(
            &format!("/api/consultas/{appointment_id}/prontuario"),
            Some(&token),
            &json!({ "diagnostico": "Rinite alérgica" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let (status, body) = send(
        &app,
        get(&format!("/api/consultas/{appointment_id}"), &token),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["consulta"]["status"], "realizada");
    assert_eq!(
        body["consulta"]["prontuario"]["diagnostico"],
        "Rinite alérgica"
    );

    // An appointment holds at most one note.
    let (status, body) = send(
        &app,
        post_json(
            &format!("/api/consultas/{appointment_id}/prontuario"),
            Some(&token),
            &json!({ "diagnostico": "outro" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert_eq!(body["error"], "Consulta já possui prontuário");

    // Reactivating an active patient is refused; after a soft delete the
    // same call succeeds.
    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/pacientes/{patient_id}/reativar"),
            Some(&token),
            &json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["error"], "Paciente já está ativo");

    let delete = Request::builder()
        .method("DELETE")
        .uri(format!("/api/pacientes/{patient_id}"))
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request");
    let (status, body) = send(&app, delete).await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/pacientes/{patient_id}/reativar"),
            Some(&token),
            &json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["paciente"]["ativo"], true);
}
