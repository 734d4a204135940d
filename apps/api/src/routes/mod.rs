pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};

use crate::auth::handlers as auth;
use crate::catalog::handlers as catalog;
use crate::errors::AppError;
use crate::intake::handlers as intake;
use crate::notifications::handlers as notifications;
use crate::requests::{client, supervisor, writer};
use crate::state::AppState;
use crate::wallet::handlers as wallet;

/// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

async fn not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD;

    Router::new()
        .route("/health", get(health::health_handler))
        // Catalog
        .route("/api/v1/categories", get(catalog::handle_list_categories))
        .route(
            "/api/v1/categories/subcategories",
            get(catalog::handle_list_subcategories),
        )
        .route(
            "/api/v1/categories/lookup",
            get(catalog::handle_lookup_category),
        )
        .route("/api/v1/categories/:id", get(catalog::handle_get_category))
        // Auth & profile
        .route("/api/v1/auth/register", post(auth::handle_register))
        .route("/api/v1/auth/login", post(auth::handle_login))
        .route("/api/v1/auth/logout", post(auth::handle_logout))
        .route("/api/v1/auth/me", get(auth::handle_me))
        .route(
            "/api/v1/auth/forgot-password",
            post(auth::handle_forgot_password),
        )
        .route(
            "/api/v1/auth/reset-password",
            post(auth::handle_reset_password),
        )
        .route("/api/v1/profile", patch(auth::handle_update_profile))
        .route(
            "/api/v1/profile/password",
            post(auth::handle_change_password),
        )
        // Intake form
        .route("/api/v1/intake/steps", get(intake::handle_list_steps))
        .route(
            "/api/v1/intake/steps/:step/validate",
            post(intake::handle_validate_step),
        )
        // Client
        .route(
            "/api/v1/client/requests",
            get(client::handle_list_requests).post(client::handle_create_request),
        )
        .route(
            "/api/v1/client/requests/:id",
            get(client::handle_get_request),
        )
        .route(
            "/api/v1/client/requests/:id/download",
            post(client::handle_download),
        )
        .route(
            "/api/v1/client/requests/:id/feedback",
            post(client::handle_submit_feedback),
        )
        .route("/api/v1/client/dashboard", get(client::handle_dashboard))
        // Writer
        .route(
            "/api/v1/writer/requests",
            get(writer::handle_list_requests),
        )
        .route(
            "/api/v1/writer/requests/:id",
            get(writer::handle_get_request),
        )
        .route(
            "/api/v1/writer/requests/:id/start",
            post(writer::handle_start),
        )
        .route(
            "/api/v1/writer/requests/:id/upload",
            post(writer::handle_upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/v1/writer/dashboard", get(writer::handle_dashboard))
        .route("/api/v1/writer/wallet", get(wallet::handle_get_wallet))
        .route(
            "/api/v1/writer/wallet/withdrawals",
            post(wallet::handle_withdraw),
        )
        // Supervisor
        .route(
            "/api/v1/supervisor/requests",
            get(supervisor::handle_list_requests),
        )
        .route(
            "/api/v1/supervisor/requests/pending",
            get(supervisor::handle_list_pending),
        )
        .route(
            "/api/v1/supervisor/requests/:id/assign",
            post(supervisor::handle_assign),
        )
        .route(
            "/api/v1/supervisor/writers",
            get(supervisor::handle_list_writers),
        )
        .route(
            "/api/v1/supervisor/feedback",
            get(supervisor::handle_list_feedback),
        )
        .route(
            "/api/v1/supervisor/payouts",
            get(supervisor::handle_list_payouts),
        )
        .route(
            "/api/v1/supervisor/dashboard",
            get(supervisor::handle_dashboard),
        )
        // Notifications
        .route(
            "/api/v1/notifications",
            get(notifications::handle_list_notifications),
        )
        .route(
            "/api/v1/notifications/:id/read",
            post(notifications::handle_mark_read),
        )
        .fallback(not_found)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const BOUNDARY: &str = "resume-market-test-boundary";

    fn app() -> Router {
        build_router(AppState::in_memory(Config::default()))
    }

    async fn read(resp: Response) -> (StatusCode, Value) {
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
        }
        let req = match body {
            Some(b) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        read(app.clone().oneshot(req).await.unwrap()).await
    }

    async fn upload(
        app: &Router,
        uri: &str,
        token: &str,
        content_type: &str,
        file: &[u8],
    ) -> (StatusCode, Value) {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"resume\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(file);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let req = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        read(app.clone().oneshot(req).await.unwrap()).await
    }

    async fn register(app: &Router, name: &str, email: &str, role: &str) -> (String, String) {
        let (status, body) = send(
            app,
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(json!({
                "name": name,
                "email": email,
                "password": "secret123",
                "confirm_password": "secret123",
                "role": role,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        (
            body["token"].as_str().unwrap().to_string(),
            body["user"]["id"].as_str().unwrap().to_string(),
        )
    }

    fn new_request() -> Value {
        json!({
            "category": "IT",
            "subcategory": "qa engineer",
            "form_data": {
                "personal_info": {
                    "full_name": "Asha Rao",
                    "email": "asha@example.com",
                    "phone": "+91 98765 43210"
                },
                "objective": "QA engineer who automates everything",
                "education": [{
                    "institution": "Anna University",
                    "degree": "B.E.",
                    "field_of_study": "Computer Science",
                    "start_date": "2015-07"
                }],
                "skills": [{ "name": "Selenium" }]
            },
            "payment": {
                "method": "card",
                "card_number": "4111 1111 1111 1111",
                "card_name": "Asha Rao",
                "expiry": "12/29",
                "cvv": "123"
            }
        })
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&app(), Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "resume-market");
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let (status, body) = send(&app(), Method::GET, "/api/v1/nope", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_catalog_routes() {
        let app = app();
        let (status, body) = send(&app, Method::GET, "/api/v1/categories", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 10);

        let (status, body) = send(&app, Method::GET, "/api/v1/categories/LEGAL", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["price"], 749);

        let (status, body) = send(
            &app,
            Method::GET,
            "/api/v1/categories/lookup?subcategory=nurse",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "HEALTHCARE");

        let (status, _) = send(&app, Method::GET, "/api/v1/categories/ASTROLOGY", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_intake_step_validation() {
        let app = app();
        let (client, _) = register(&app, "Asha Rao", "asha@example.com", "client").await;

        let (status, steps) = send(&app, Method::GET, "/api/v1/intake/steps", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(steps.as_array().unwrap().len(), 7);
        assert_eq!(steps[0]["previous_step"], "personal_info");

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/intake/steps/0/validate",
            Some(&client),
            Some(json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["valid"], false);
        assert!(body["next_step"].is_null());

        let form = new_request()["form_data"].clone();
        let (_, body) = send(
            &app,
            Method::POST,
            "/api/v1/intake/steps/0/validate",
            Some(&client),
            Some(form),
        )
        .await;
        assert_eq!(body["valid"], true);
        assert_eq!(body["next_step"], "education");

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/intake/steps/9/validate",
            Some(&client),
            Some(json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_role_guards() {
        let app = app();
        let (writer, _) = register(&app, "Ravi Kumar", "ravi@example.com", "writer").await;

        let (status, _) = send(&app, Method::GET, "/api/v1/client/requests", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(
            &app,
            Method::GET,
            "/api/v1/client/requests",
            Some(&writer),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "FORBIDDEN");
    }

    #[tokio::test]
    async fn test_invalid_request_reports_fields() {
        let app = app();
        let (client, _) = register(&app, "Asha Rao", "asha@example.com", "client").await;

        let mut body = new_request();
        body["subcategory"] = json!("Nurse");
        body["form_data"]["personal_info"]["full_name"] = json!("");
        body["payment"]["cvv"] = json!("12");

        let (status, resp) = send(
            &app,
            Method::POST,
            "/api/v1/client/requests",
            Some(&client),
            Some(body),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let fields: Vec<&str> = resp["error"]["fields"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["field"].as_str().unwrap())
            .collect();
        assert!(fields.contains(&"subcategory"));
        assert!(fields.contains(&"personal_info.full_name"));
        assert!(fields.contains(&"payment.cvv"));
    }

    #[tokio::test]
    async fn test_other_clients_requests_are_hidden() {
        let app = app();
        let (alice, _) = register(&app, "Asha Rao", "asha@example.com", "client").await;
        let (bob, _) = register(&app, "Vikram Shah", "vikram@example.com", "client").await;

        let (status, created) = send(
            &app,
            Method::POST,
            "/api/v1/client/requests",
            Some(&alice),
            Some(new_request()),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let uri = format!("/api/v1/client/requests/{}", created["id"].as_str().unwrap());

        let (status, _) = send(&app, Method::GET, &uri, Some(&bob), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, body) = send(&app, Method::GET, &uri, Some(&alice), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["timeline"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_full_request_lifecycle() {
        let app = app();
        let (client, _) = register(&app, "Asha Rao", "asha@example.com", "client").await;
        let (writer, writer_id) = register(&app, "Ravi Kumar", "ravi@example.com", "writer").await;
        let (supervisor, _) =
            register(&app, "Neha Gupta", "neha@example.com", "supervisor").await;

        // Client places and pays for the request.
        let (status, created) = send(
            &app,
            Method::POST,
            "/api/v1/client/requests",
            Some(&client),
            Some(new_request()),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{created}");
        assert_eq!(created["status"], "PENDING_ASSIGNMENT");
        assert_eq!(created["subcategory"], "QA Engineer");
        assert_eq!(created["price"], 599);
        assert_eq!(created["payment_status"], "COMPLETED");
        let id = created["id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &app,
            Method::POST,
            &format!("/api/v1/client/requests/{id}/download"),
            Some(&client),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        // Supervisor assigns it.
        let (_, pending) = send(
            &app,
            Method::GET,
            "/api/v1/supervisor/requests/pending",
            Some(&supervisor),
            None,
        )
        .await;
        assert_eq!(pending.as_array().unwrap().len(), 1);

        let assign_uri = format!("/api/v1/supervisor/requests/{id}/assign");
        let (status, assigned) = send(
            &app,
            Method::POST,
            &assign_uri,
            Some(&supervisor),
            Some(json!({ "writer_id": writer_id })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{assigned}");
        assert_eq!(assigned["status"], "ASSIGNED");
        assert_eq!(assigned["writer_id"], writer_id.as_str());

        let (status, _) = send(
            &app,
            Method::POST,
            &assign_uri,
            Some(&supervisor),
            Some(json!({ "writer_id": writer_id })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        // Writer works on it.
        let (_, listed) = send(
            &app,
            Method::GET,
            "/api/v1/writer/requests?search=asha&status=ALL&category=IT",
            Some(&writer),
            None,
        )
        .await;
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let upload_uri = format!("/api/v1/writer/requests/{id}/upload");
        let (status, _) = upload(&app, &upload_uri, &writer, "application/pdf", b"%PDF-1.4").await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, started) = send(
            &app,
            Method::POST,
            &format!("/api/v1/writer/requests/{id}/start"),
            Some(&writer),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(started["status"], "IN_PROGRESS");

        let (status, _) = upload(&app, &upload_uri, &writer, "image/png", b"\x89PNG").await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let (status, completed) =
            upload(&app, &upload_uri, &writer, "application/pdf", b"%PDF-1.4 resume").await;
        assert_eq!(status, StatusCode::OK, "{completed}");
        assert_eq!(completed["status"], "COMPLETED");
        assert!(completed["completed_resume_url"]
            .as_str()
            .unwrap()
            .starts_with(&format!("memory://resumes/{id}/")));

        let (_, wallet) = send(&app, Method::GET, "/api/v1/writer/wallet", Some(&writer), None).await;
        assert_eq!(wallet["balance"], 0);
        assert_eq!(wallet["pending_balance"], 419);

        // Client downloads, twice.
        let download_uri = format!("/api/v1/client/requests/{id}/download");
        let (status, downloaded) = send(&app, Method::POST, &download_uri, Some(&client), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(downloaded["request"]["status"], "DELIVERED");
        assert_eq!(
            downloaded["download_url"],
            completed["completed_resume_url"]
        );
        let (status, again) = send(&app, Method::POST, &download_uri, Some(&client), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(again["request"]["status"], "DELIVERED");

        let (_, wallet) = send(&app, Method::GET, "/api/v1/writer/wallet", Some(&writer), None).await;
        assert_eq!(wallet["balance"], 419);
        assert_eq!(wallet["pending_balance"], 0);

        // Feedback.
        let feedback_uri = format!("/api/v1/client/requests/{id}/feedback");
        let (status, body) = send(
            &app,
            Method::POST,
            &feedback_uri,
            Some(&client),
            Some(json!({ "rating": 0 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Please select a rating");

        let (status, rated) = send(
            &app,
            Method::POST,
            &feedback_uri,
            Some(&client),
            Some(json!({ "rating": 5, "comment": "Great work" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(rated["feedback"]["rating"], 5);

        let (status, _) = send(
            &app,
            Method::POST,
            &feedback_uri,
            Some(&client),
            Some(json!({ "rating": 4 })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        // Writer withdraws.
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/writer/wallet/withdrawals",
            Some(&writer),
            Some(json!({ "amount": 500 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Insufficient balance");

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/writer/wallet/withdrawals",
            Some(&writer),
            Some(json!({ "amount": 400 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["wallet"]["balance"], 19);
        assert_eq!(body["transaction"]["type"], "WITHDRAWAL");

        // Dashboards and notifications reflect all of it.
        let (_, dashboard) =
            send(&app, Method::GET, "/api/v1/writer/dashboard", Some(&writer), None).await;
        assert_eq!(dashboard["completed"], 1);
        assert_eq!(dashboard["average_rating"], 5.0);
        assert_eq!(dashboard["total_earned"], 419);

        let (_, payouts) = send(
            &app,
            Method::GET,
            "/api/v1/supervisor/payouts",
            Some(&supervisor),
            None,
        )
        .await;
        assert_eq!(payouts["total_withdrawn"], 400);
        assert_eq!(payouts["outstanding_balance"], 19);

        let (_, overview) = send(
            &app,
            Method::GET,
            "/api/v1/supervisor/dashboard",
            Some(&supervisor),
            None,
        )
        .await;
        assert_eq!(overview["revenue"], 599);
        assert_eq!(overview["status_counts"]["DELIVERED"], 1);

        let (_, notes) = send(
            &app,
            Method::GET,
            "/api/v1/notifications",
            Some(&writer),
            None,
        )
        .await;
        let kinds: Vec<&str> = notes["notifications"]
            .as_array()
            .unwrap()
            .iter()
            .map(|n| n["type"].as_str().unwrap())
            .collect();
        assert_eq!(kinds.len(), 4);
        for kind in ["ASSIGNMENT", "DELIVERY", "FEEDBACK", "WITHDRAWAL"] {
            assert!(kinds.contains(&kind), "missing {kind}");
        }
        assert_eq!(notes["unread"], 4);

        let (_, client_notes) = send(
            &app,
            Method::GET,
            "/api/v1/notifications",
            Some(&client),
            None,
        )
        .await;
        let note_id = client_notes["notifications"][0]["id"].as_str().unwrap();
        let (status, _) = send(
            &app,
            Method::POST,
            &format!("/api/v1/notifications/{note_id}/read"),
            Some(&writer),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(
            &app,
            Method::POST,
            &format!("/api/v1/notifications/{note_id}/read"),
            Some(&client),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    async fn post_raw(
        app: &Router,
        uri: &str,
        token: Option<&str>,
        content_type: Option<&str>,
        body: &str,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(Method::POST).uri(uri);
        if let Some(t) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
        }
        if let Some(ct) = content_type {
            builder = builder.header(header::CONTENT_TYPE, ct);
        }
        let req = builder.body(Body::from(body.to_string())).unwrap();
        read(app.clone().oneshot(req).await.unwrap()).await
    }

    #[tokio::test]
    async fn test_supervisor_status_filter_accepts_all() {
        let app = app();
        let (client, _) = register(&app, "Asha Rao", "asha@example.com", "client").await;
        let (supervisor, _) = register(&app, "Leela Das", "leela@example.com", "supervisor").await;
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/client/requests",
            Some(&client),
            Some(new_request()),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        for (query, expected) in [
            ("", 1),
            ("?status=ALL", 1),
            ("?status=", 1),
            ("?status=PENDING_ASSIGNMENT", 1),
            ("?status=DELIVERED", 0),
        ] {
            let uri = format!("/api/v1/supervisor/requests{query}");
            let (status, body) = send(&app, Method::GET, &uri, Some(&supervisor), None).await;
            assert_eq!(status, StatusCode::OK, "{uri}: {body}");
            assert_eq!(body.as_array().unwrap().len(), expected, "{uri}");
        }

        let (status, body) = send(
            &app,
            Method::GET,
            "/api/v1/supervisor/requests?status=LOST",
            Some(&supervisor),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_malformed_input_gets_error_envelope() {
        let app = app();
        let (client, _) = register(&app, "Asha Rao", "asha@example.com", "client").await;

        let (status, body) = post_raw(
            &app,
            "/api/v1/auth/login",
            None,
            Some("application/json"),
            "{\"email\": ",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let feedback_uri = format!("/api/v1/client/requests/{}/feedback", uuid::Uuid::new_v4());
        let (status, body) = send(
            &app,
            Method::POST,
            &feedback_uri,
            Some(&client),
            Some(json!({ "rating": 300 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, body) = post_raw(
            &app,
            "/api/v1/auth/login",
            None,
            None,
            "{}",
        )
        .await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body["error"]["code"], "UNSUPPORTED_MEDIA_TYPE");

        let (status, body) = send(
            &app,
            Method::GET,
            "/api/v1/client/requests/not-a-uuid",
            Some(&client),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}
