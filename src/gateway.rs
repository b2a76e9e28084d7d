//! API gateway: perimeter JWT validation plus a reverse proxy that fans
//! requests out to the four internal services.
//!
//! The filter rewrites validated requests to carry identity as trusted
//! headers (`X-User-Email`, `X-User-Role`); the original `Authorization`
//! header is forwarded untouched so every service can still re-verify the
//! token with its own filter.

use std::sync::Arc;

use axum::{
    body::{self, Body},
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Json, Router,
};
use bytes::Bytes;
use serde_json::json;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::config::GatewayConfig;
use crate::jwt;
use crate::middleware::auth::unauthorized;

/// Proxied bodies are buffered; CV uploads are the largest payload (25 MB cap).
const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<GatewayConfig>,
    pub http: reqwest::Client,
}

pub fn router(state: GatewayState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(AllowHeaders::list([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
        ]))
        .allow_origin(AllowOrigin::any());

    Router::new()
        .fallback(proxy)
        .layer(middleware::from_fn_with_state(state.clone(), jwt_filter))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Perimeter validator. CORS preflights bypass unconditionally, public path
/// prefixes bypass, everything else needs a bearer token that verifies under
/// the shared secret. Verification failures are logged with their concrete
/// cause; the client sees a generic message.
pub async fn jwt_filter(State(state): State<GatewayState>, mut req: Request, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        return next.run(req).await;
    }

    let path = req.uri().path().to_string();
    if state
        .config
        .public_paths
        .iter()
        .any(|p| path.starts_with(p.as_str()))
    {
        return next.run(req).await;
    }

    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let token = match jwt::bearer_token(header_value) {
        Ok(t) => t.to_string(),
        Err(_) => {
            warn!(%path, "missing or malformed Authorization header");
            return unauthorized(&path, "Missing or invalid Authorization header");
        }
    };

    match jwt::verify_token(&token, &state.config.jwt_secret) {
        Ok(claims) => {
            debug!(user = %claims.sub, %path, "JWT validated");
            // The identity headers are trusted downstream; a claim that
            // cannot be carried as a header value is rejected rather than
            // forwarded blank.
            let Ok(email) = HeaderValue::from_str(&claims.sub) else {
                warn!(%path, "subject claim is not a valid header value");
                return unauthorized(&path, "Invalid or expired token");
            };
            let role = match claims.role.as_deref() {
                None => HeaderValue::from_static(""),
                Some(r) => match HeaderValue::from_str(r) {
                    Ok(v) => v,
                    Err(_) => {
                        warn!(%path, "role claim is not a valid header value");
                        return unauthorized(&path, "Invalid or expired token");
                    }
                },
            };
            let headers = req.headers_mut();
            headers.insert("X-User-Email", email);
            headers.insert("X-User-Role", role);
            next.run(req).await
        }
        Err(e) => {
            warn!(%path, error = %e, "JWT validation failed");
            unauthorized(&path, "Invalid or expired token")
        }
    }
}

/// Forward a validated request to the service owning its path prefix,
/// preserving method, query, headers and body.
async fn proxy(State(state): State<GatewayState>, req: Request) -> Response {
    let path = req.uri().path().to_string();
    let Some(upstream) = state.config.upstream_for(&path) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "No route", "status": 404, "path": path })),
        )
            .into_response();
    };

    let query = req
        .uri()
        .query()
        .map(|q| format!("?{q}"))
        .unwrap_or_default();
    let url = format!("{upstream}{path}{query}");

    let (parts, req_body) = req.into_parts();
    let bytes: Bytes = match body::to_bytes(req_body, MAX_BODY_BYTES).await {
        Ok(b) => b,
        Err(_) => {
            return (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(json!({ "error": "Request body too large", "status": 413, "path": path })),
            )
                .into_response()
        }
    };

    let mut headers = parts.headers.clone();
    headers.remove(header::HOST);
    headers.remove(header::CONTENT_LENGTH);

    let upstream_res = match state
        .http
        .request(parts.method, &url)
        .headers(headers)
        .body(bytes)
        .send()
        .await
    {
        Ok(r) => r,
        Err(e) => {
            warn!(%url, error = %e, "upstream call failed");
            return (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": "Upstream service unavailable", "status": 502, "path": path })),
            )
                .into_response();
        }
    };

    let status = upstream_res.status();
    let res_headers = upstream_res.headers().clone();
    let res_body = upstream_res.bytes().await.unwrap_or_default();

    let mut builder = Response::builder().status(status);
    for (name, value) in res_headers.iter() {
        if *name != header::TRANSFER_ENCODING && *name != header::CONNECTION {
            builder = builder.header(name, value);
        }
    }
    builder
        .body(Body::from(res_body))
        .unwrap_or_else(|_| StatusCode::BAD_GATEWAY.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::jwt::issue_token;
    use crate::models::user::Role;

    const SECRET: &str = "gateway-secret";

    fn state() -> GatewayState {
        GatewayState {
            config: Arc::new(GatewayConfig {
                jwt_secret: SECRET.into(),
                host: "0.0.0.0".into(),
                port: 8080,
                public_paths: vec!["/auth".into()],
                auth_service_url: "http://localhost:8081".into(),
                candidate_service_url: "http://localhost:8082".into(),
                offer_service_url: "http://localhost:8083".into(),
                ai_service_url: "http://localhost:8084".into(),
            }),
            http: reqwest::Client::new(),
        }
    }

    /// Filter in front of an echo handler, standing in for the proxy.
    fn app() -> Router {
        async fn echo(req: Request) -> String {
            let h = |name: &str| {
                req.headers()
                    .get(name)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-")
                    .to_string()
            };
            format!("{}|{}", h("X-User-Email"), h("X-User-Role"))
        }
        Router::new()
            .route("/auth/login", get(|| async { "login" }))
            .route("/offers", get(echo))
            .layer(middleware::from_fn_with_state(state(), jwt_filter))
    }

    fn request(method: Method, path: &str, auth_header: Option<&str>) -> axum::http::Request<Body> {
        let mut builder = axum::http::Request::builder().method(method).uri(path);
        if let Some(h) = auth_header {
            builder = builder.header("Authorization", h);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_text(res: Response) -> String {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn options_bypasses_regardless_of_path() {
        let res = app()
            .oneshot(request(Method::OPTIONS, "/offers", None))
            .await
            .unwrap();
        // 405 from the router, not 401 from the filter: the filter let it through.
        assert_ne!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn public_prefix_bypasses_validation() {
        let res = app()
            .oneshot(request(Method::GET, "/auth/login", None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_text(res).await, "login");
    }

    #[tokio::test]
    async fn missing_token_yields_structured_401() {
        let res = app()
            .oneshot(request(Method::GET, "/offers", None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Value = serde_json::from_str(&body_text(res).await).unwrap();
        assert_eq!(body["status"], 401);
        assert_eq!(body["path"], "/offers");
    }

    #[tokio::test]
    async fn wrong_scheme_yields_401() {
        let res = app()
            .oneshot(request(Method::GET, "/offers", Some("Basic xyz")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn valid_token_injects_identity_headers() {
        let token = issue_token("ana@example.com", Role::Candidate, SECRET, 3600).unwrap();
        let res = app()
            .oneshot(request(Method::GET, "/offers", Some(&format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_text(res).await, "ana@example.com|CANDIDATE");
    }

    #[tokio::test]
    async fn unmappable_subject_claim_yields_401() {
        let now = chrono::Utc::now().timestamp() as usize;
        // A subject with a control character cannot become a header value.
        let claims = crate::jwt::Claims {
            sub: "ana\n@example.com".into(),
            role: Some("CANDIDATE".into()),
            iat: now,
            exp: now + 3600,
        };
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        let res = app()
            .oneshot(request(Method::GET, "/offers", Some(&format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Value = serde_json::from_str(&body_text(res).await).unwrap();
        assert_eq!(body["status"], 401);
    }

    #[tokio::test]
    async fn expired_token_yields_401() {
        let now = chrono::Utc::now().timestamp() as usize;
        let claims = crate::jwt::Claims {
            sub: "ana@example.com".into(),
            role: Some("CANDIDATE".into()),
            iat: now - 7200,
            exp: now - 1,
        };
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        let res = app()
            .oneshot(request(Method::GET, "/offers", Some(&format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Value = serde_json::from_str(&body_text(res).await).unwrap();
        assert_eq!(body["error"], "Invalid or expired token");
    }
}
