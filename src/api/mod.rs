// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP routing.
//!
//! Each process serves one [`ServiceRole`]:
//!
//! | Role | Routes |
//! |------|--------|
//! | issuer | `POST /login`, `POST /logout` |
//! | gateway | `GET /`, `GET /read-downstream`, `GET /burn` |
//! | downstream | `GET /` |
//!
//! Every role also serves `/healthz`, `/docs` and, when a Prometheus handle
//! is supplied, `/metrics`.

use axum::{
    http::HeaderValue,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::ServiceRole,
    models::{
        BurnResponse, DownstreamResponse, HealthResponse, LoginRequest, MessageResponse,
        TokenResponse,
    },
    state::AppState,
};

pub mod burn;
pub mod health;
pub mod metrics;
pub mod middleware;
pub mod resource;
pub mod session;

/// Build the router for the role in `state.config`.
///
/// Layer order (outermost first): HTTP metrics, request id, trace, CORS,
/// request logging, panic catching.
pub fn router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let role = state.config.role;
    let cors = cors_layer(&state.config.allowed_origins);

    let role_routes: Router<AppState> = match role {
        ServiceRole::Issuer => Router::new()
            .route("/login", post(session::login))
            .route("/logout", post(session::logout)),
        ServiceRole::Gateway => Router::new()
            .route("/", get(resource::greet))
            .route("/read-downstream", get(resource::read_downstream))
            .route("/burn", get(burn::burn_cpu)),
        ServiceRole::Downstream => Router::new().route("/", get(resource::downstream_root)),
    };

    let mut app = role_routes
        .route("/healthz", get(health::healthz))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", openapi_for(role)));

    if let Some(handle) = metrics_handle {
        app = app.merge(metrics::routes(handle));
    }

    app.layer(CatchPanicLayer::custom(middleware::panic_response))
        .layer(from_fn(middleware::log_request))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(from_fn(middleware::http_metrics_middleware))
}

/// Credentialed CORS for the configured origins.
///
/// A `*` entry mirrors the request origin, since a literal wildcard cannot
/// be combined with credentials.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::mirror_request()
    } else {
        let values: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(%origin, "Ignoring unparsable CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(values)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

pub fn openapi_for(role: ServiceRole) -> utoipa::openapi::OpenApi {
    match role {
        ServiceRole::Issuer => IssuerApiDoc::openapi(),
        ServiceRole::Gateway => GatewayApiDoc::openapi(),
        ServiceRole::Downstream => DownstreamApiDoc::openapi(),
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(session::login, session::logout, health::healthz),
    components(schemas(LoginRequest, TokenResponse, MessageResponse, HealthResponse)),
    tags(
        (name = "Session", description = "Login and logout"),
        (name = "Health", description = "Liveness probe")
    )
)]
struct IssuerApiDoc;

#[derive(OpenApi)]
#[openapi(
    paths(resource::greet, resource::read_downstream, burn::burn_cpu, health::healthz),
    components(schemas(MessageResponse, DownstreamResponse, BurnResponse, HealthResponse)),
    tags(
        (name = "Gateway", description = "Token-guarded resources and load generation"),
        (name = "Health", description = "Liveness probe")
    )
)]
struct GatewayApiDoc;

#[derive(OpenApi)]
#[openapi(
    paths(resource::downstream_root, health::healthz),
    components(schemas(MessageResponse, HealthResponse)),
    tags(
        (name = "Downstream", description = "Service called by the gateway"),
        (name = "Health", description = "Liveness probe")
    )
)]
struct DownstreamApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Claims;
    use crate::config::test_config;
    use axum::{
        body::{to_bytes, Body},
        http::{
            header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE},
            Method, Request, StatusCode,
        },
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use url::Url;
    use wiremock::{matchers::method, Mock, MockServer, ResponseTemplate};

    const SECRET: &str = "router-secret";

    fn state(role: ServiceRole) -> AppState {
        AppState::new(test_config(SECRET, role)).unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> Response {
        app.oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn login_request(username: &str, password: &str) -> Request<Body> {
        Request::post("/login")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({"username": username, "password": password}).to_string(),
            ))
            .unwrap()
    }

    #[tokio::test]
    async fn login_returns_token_and_cookie() {
        let state = state(ServiceRole::Issuer);
        let response = send(router(state.clone(), None), login_request("alice", "wonderland")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap().to_string();
        assert!(cookie.starts_with("access_token="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));

        let body = json_body(response).await;
        assert_eq!(body["token_type"], "bearer");
        let token = body["access_token"].as_str().unwrap();
        let claims = state.codec.verify(token).unwrap();
        assert_eq!(claims.subject(), Some("alice"));
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_401() {
        let response = send(router(state(ServiceRole::Issuer), None), login_request("alice", "wrong")).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(SET_COOKIE).is_none());
        let body = json_body(response).await;
        assert_eq!(body["detail"], "Invalid credentials");
    }

    #[tokio::test]
    async fn malformed_login_body_is_rejected() {
        let request = Request::post("/login")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"username": "alice"}"#))
            .unwrap();
        let response = send(router(state(ServiceRole::Issuer), None), request).await;
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn logout_clears_cookie() {
        let request = Request::post("/logout").body(Body::empty()).unwrap();
        let response = send(router(state(ServiceRole::Issuer), None), request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap().to_string();
        assert!(cookie.starts_with("access_token=;"));
        assert!(cookie.contains("Max-Age=0"));
        assert_eq!(json_body(response).await, json!({"message": "Logged out successfully"}));
    }

    #[tokio::test]
    async fn token_from_issuer_is_accepted_by_gateway() {
        let issuer = state(ServiceRole::Issuer);
        let response = send(router(issuer, None), login_request("charlie", "chocolate")).await;
        let token = json_body(response).await["access_token"].as_str().unwrap().to_string();

        let request = Request::get("/")
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let response = send(router(state(ServiceRole::Gateway), None), request).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({"message": "Hello from Kubernetes, charlie!"})
        );
    }

    #[tokio::test]
    async fn greet_accepts_cookie() {
        let state = state(ServiceRole::Gateway);
        let token = state.codec.issue(&Claims::for_subject("alice")).unwrap();
        let request = Request::get("/")
            .header(COOKIE, format!("access_token={token}"))
            .body(Body::empty())
            .unwrap();
        let response = send(router(state, None), request).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn greet_without_token_is_401() {
        let request = Request::get("/").body(Body::empty()).unwrap();
        let response = send(router(state(ServiceRole::Gateway), None), request).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert_eq!(body["detail"], "Missing token");
        assert_eq!(body["error_code"], "missing_token");
    }

    #[tokio::test]
    async fn greet_with_foreign_token_is_401() {
        let other = crate::auth::TokenCodec::new(b"another-secret", jsonwebtoken::Algorithm::HS256);
        let token = other.issue(&Claims::for_subject("alice")).unwrap();
        let request = Request::get("/")
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let response = send(router(state(ServiceRole::Gateway), None), request).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["detail"], "Invalid token");
    }

    #[tokio::test]
    async fn read_downstream_passes_payload_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "hi"})))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = test_config(SECRET, ServiceRole::Gateway);
        config.downstream_url = Url::parse(&server.uri()).unwrap();
        let state = AppState::new(config).unwrap();
        let token = state.codec.issue(&Claims::for_subject("bob")).unwrap();

        let request = Request::get("/read-downstream")
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let response = send(router(state, None), request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["message"], resource::GATEWAY_MESSAGE);
        assert_eq!(body["downstream_response"], json!({"message": "hi"}));
    }

    #[tokio::test]
    async fn read_downstream_without_token_never_calls_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(0)
            .mount(&server)
            .await;

        let mut config = test_config(SECRET, ServiceRole::Gateway);
        config.downstream_url = Url::parse(&server.uri()).unwrap();
        let state = AppState::new(config).unwrap();

        let request = Request::get("/read-downstream").body(Body::empty()).unwrap();
        let response = send(router(state, None), request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unreachable_downstream_is_502() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut config = test_config(SECRET, ServiceRole::Gateway);
        config.downstream_url = Url::parse(&format!("http://{addr}/")).unwrap();
        let state = AppState::new(config).unwrap();
        let token = state.codec.issue(&Claims::for_subject("bob")).unwrap();

        let request = Request::get("/read-downstream")
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let response = send(router(state, None), request).await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = json_body(response).await;
        assert!(body["detail"].as_str().unwrap().starts_with("request error:"));
    }

    #[tokio::test]
    async fn burn_is_unauthenticated() {
        let request = Request::get("/burn?iterations=2").body(Body::empty()).unwrap();
        let response = send(router(state(ServiceRole::Gateway), None), request).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await["digest"],
            "8980813bdabceb8684b3d12bd4cfd1ca3b324240f903ccd9109e0fae91c422e1"
        );
    }

    #[tokio::test]
    async fn burn_accepts_negative_count() {
        let request = Request::get("/burn?iterations=-5").body(Body::empty()).unwrap();
        let response = send(router(state(ServiceRole::Gateway), None), request).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"digest": ""}));
    }

    #[tokio::test]
    async fn burn_rejects_non_integer() {
        let request = Request::get("/burn?iterations=lots").body(Body::empty()).unwrap();
        let response = send(router(state(ServiceRole::Gateway), None), request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn downstream_root_is_public() {
        let request = Request::get("/").body(Body::empty()).unwrap();
        let response = send(router(state(ServiceRole::Downstream), None), request).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["message"], resource::DOWNSTREAM_MESSAGE);
    }

    #[tokio::test]
    async fn roles_only_mount_their_routes() {
        let request = Request::post("/login")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"username":"alice","password":"wonderland"}"#))
            .unwrap();
        let response = send(router(state(ServiceRole::Gateway), None), request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let request = Request::get("/burn").body(Body::empty()).unwrap();
        let response = send(router(state(ServiceRole::Issuer), None), request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn healthz_is_served_by_every_role() {
        for role in [ServiceRole::Issuer, ServiceRole::Gateway, ServiceRole::Downstream] {
            let request = Request::get("/healthz").body(Body::empty()).unwrap();
            let response = send(router(state(role), None), request).await;
            assert_eq!(response.status(), StatusCode::OK, "role {role}");
            assert_eq!(json_body(response).await, json!({"status": "ok"}));
        }
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let request = Request::get("/healthz").body(Body::empty()).unwrap();
        let response = send(router(state(ServiceRole::Gateway), None), request).await;
        assert!(response.headers().contains_key("x-request-id"));

        let request = Request::get("/healthz")
            .header("x-request-id", "abc-123")
            .body(Body::empty())
            .unwrap();
        let response = send(router(state(ServiceRole::Gateway), None), request).await;
        assert_eq!(response.headers()["x-request-id"], "abc-123");
    }

    #[tokio::test]
    async fn cors_allows_configured_origin_with_credentials() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/")
            .header("origin", "http://localhost:8003")
            .header("access-control-request-method", "GET")
            .body(Body::empty())
            .unwrap();
        let response = send(router(state(ServiceRole::Gateway), None), request).await;

        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], "http://localhost:8003");
        assert_eq!(headers["access-control-allow-credentials"], "true");
    }

    #[tokio::test]
    async fn cors_ignores_unknown_origin() {
        let request = Request::get("/healthz")
            .header("origin", "http://evil.example")
            .body(Body::empty())
            .unwrap();
        let response = send(router(state(ServiceRole::Gateway), None), request).await;
        assert!(response.headers().get("access-control-allow-origin").is_none());
    }

    #[tokio::test]
    async fn openapi_document_matches_role() {
        let request = Request::get("/api-doc/openapi.json").body(Body::empty()).unwrap();
        let response = send(router(state(ServiceRole::Issuer), None), request).await;
        assert_eq!(response.status(), StatusCode::OK);

        let doc = json_body(response).await;
        assert!(doc["paths"].get("/login").is_some());
        assert!(doc["paths"].get("/read-downstream").is_none());
    }
}
