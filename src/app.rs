use std::net::SocketAddr;

use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::errors::AppError;
use crate::state::AppState;
use crate::{analysis, auth, health};

async fn not_found() -> AppError {
    AppError::NotFound
}

pub fn build_app(state: AppState) -> anyhow::Result<Router> {
    let origin = HeaderValue::from_str(&state.config.allowed_origin)
        .with_context(|| format!("invalid FRONTEND_URL '{}'", state.config.allowed_origin))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    Ok(Router::new()
        .route("/health", get(health::health))
        .nest(
            "/api",
            Router::new()
                .merge(auth::router())
                .merge(analysis::router()),
        )
        .fallback(not_found)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        ))
}

pub async fn serve(app: Router, addr: SocketAddr) -> anyhow::Result<()> {
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::documents::PDF_MIME;
    use crate::testing::{job_description, multipart_body, sample_score, Harness, Part};

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn analyze(token: &str, job: &str) -> Request<Body> {
        let (content_type, body) = multipart_body(&[
            Part::File {
                name: "resume",
                file_name: "cv.pdf",
                content_type: PDF_MIME,
                bytes: b"%PDF-1.4 stub",
            },
            Part::Text {
                name: "jobDescription",
                value: job,
            },
        ]);
        Request::post("/api/analyze")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn signup_analyze_until_quota_runs_out() {
        let h = Harness::happy();
        let app = build_app(h.state.clone()).unwrap();

        let (status, body) = send(
            &app,
            post_json(
                "/api/auth/signup",
                json!({ "email": "u@x.com", "password": "secret1" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["user"]["creditsRemaining"], 3);
        assert_eq!(body["data"]["user"]["plan"], "FREE");
        assert!(body["data"]["user"].get("passwordHash").is_none());
        let token = body["data"]["token"].as_str().unwrap().to_string();
        let user_id: Uuid = body["data"]["user"]["id"].as_str().unwrap().parse().unwrap();

        let job = job_description(130);
        let (status, body) = send(&app, analyze(&token, &job)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["creditsRemaining"], 2);
        assert_eq!(body["data"]["score"], sample_score().score);
        assert_eq!(body["data"]["missingKeywords"], json!(sample_score().missing_keywords));
        assert_eq!(body["data"]["suggestions"], json!(sample_score().suggestions));

        let records = h.store.analyses();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].user_id, user_id);
        assert_eq!(records[0].score, sample_score().score);
        assert_eq!(records[0].job_description, job);

        h.store.set_credits(user_id, 0);
        let (status, body) = send(&app, analyze(&token, &job)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "QUOTA_EXHAUSTED");
        assert_eq!(h.store.analysis_count(), 1);
    }

    #[tokio::test]
    async fn duplicate_signup_is_rejected() {
        let h = Harness::happy();
        let app = build_app(h.state.clone()).unwrap();
        let creds = json!({ "email": "u@x.com", "password": "secret1" });

        let (status, _) = send(&app, post_json("/api/auth/signup", creds.clone())).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = send(&app, post_json("/api/auth/signup", creds)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "DUPLICATE_EMAIL");
        assert_eq!(h.store.account_count(), 1);
    }

    #[tokio::test]
    async fn login_failures_look_identical() {
        let h = Harness::happy();
        let app = build_app(h.state.clone()).unwrap();
        send(
            &app,
            post_json(
                "/api/auth/signup",
                json!({ "email": "a@x.com", "password": "secret1" }),
            ),
        )
        .await;

        let wrong_password = send(
            &app,
            post_json(
                "/api/auth/login",
                json!({ "email": "a@x.com", "password": "nope-nope" }),
            ),
        )
        .await;
        let unknown_email = send(
            &app,
            post_json(
                "/api/auth/login",
                json!({ "email": "ghost@x.com", "password": "nope-nope" }),
            ),
        )
        .await;

        assert_eq!(wrong_password.0, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_password, unknown_email);
    }

    #[tokio::test]
    async fn login_issues_token() {
        let h = Harness::happy();
        let app = build_app(h.state.clone()).unwrap();
        let creds = json!({ "email": "a@x.com", "password": "secret1" });
        send(&app, post_json("/api/auth/signup", creds.clone())).await;

        let (status, body) = send(&app, post_json("/api/auth/login", creds)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"]["token"].as_str().is_some_and(|t| !t.is_empty()));
        assert_eq!(body["data"]["user"]["email"], "a@x.com");
    }

    #[tokio::test]
    async fn malformed_json_is_a_validation_error() {
        let h = Harness::happy();
        let app = build_app(h.state.clone()).unwrap();
        let req = Request::post("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["errors"][0]["field"], "body");
    }

    #[tokio::test]
    async fn analyze_with_garbage_token_is_unauthenticated() {
        let h = Harness::happy();
        let app = build_app(h.state.clone()).unwrap();

        let (status, body) = send(&app, analyze("not.a.jwt", &job_description(80))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHENTICATED");
        assert_eq!(h.extractor.call_count(), 0);
    }

    #[tokio::test]
    async fn unknown_route_gets_envelope() {
        let h = Harness::happy();
        let app = build_app(h.state.clone()).unwrap();
        let req = Request::get("/api/nope").body(Body::empty()).unwrap();

        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Route not found");
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let h = Harness::happy();
        let app = build_app(h.state.clone()).unwrap();
        let req = Request::get("/health").body(Body::empty()).unwrap();

        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert!(body["timestamp"].as_i64().unwrap() > 0);
        assert!(body["uptime"].is_u64());
    }

    #[tokio::test]
    async fn invalid_origin_fails_startup() {
        let h = Harness::happy();
        let mut state = h.state.clone();
        let mut config = (*state.config).clone();
        config.allowed_origin = "bad\norigin".into();
        state.config = std::sync::Arc::new(config);

        assert!(build_app(state).is_err());
    }
}
