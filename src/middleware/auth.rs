//! Per-service JWT filter.
//!
//! Every internal service attaches this layer with its own exemption list.
//! A validated request carries a [`Principal`] in its extensions; handlers
//! pull it out through the extractor, so the authenticated identity is scoped
//! to exactly one request and can never leak between concurrent ones.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use tracing::warn;

use crate::jwt::{self, role_authority};
use crate::models::user::Role;

/// An exempt endpoint. The two match semantics are intentionally distinct:
/// internal service-to-service endpoints are exempted exactly, public
/// operation groups by prefix.
#[derive(Debug, Clone)]
pub enum ExemptPath {
    Exact(&'static str),
    Prefix(&'static str),
}

impl ExemptPath {
    fn matches(&self, path: &str) -> bool {
        match self {
            ExemptPath::Exact(p) => path == *p,
            ExemptPath::Prefix(p) => path.starts_with(p),
        }
    }
}

/// Validator configuration: the shared signing secret plus the paths the
/// filter lets through before reading any header.
#[derive(Clone)]
pub struct AuthLayer {
    secret: Arc<str>,
    exempt: Arc<[ExemptPath]>,
}

impl AuthLayer {
    pub fn new(secret: &str, exempt: Vec<ExemptPath>) -> Self {
        Self {
            secret: secret.into(),
            exempt: exempt.into(),
        }
    }

    fn is_exempt(&self, path: &str) -> bool {
        self.exempt.iter().any(|e| e.matches(path))
    }
}

/// The authenticated identity for one request. Built fresh from token claims,
/// never persisted, never shared across requests.
#[derive(Debug, Clone)]
pub struct Principal {
    pub email: String,
    /// The role as one of the known variants; `None` for claims the services
    /// do not recognize.
    pub role: Option<Role>,
    /// The role claim as minted, kept so the authority survives even for
    /// claims outside the known set.
    pub role_claim: Option<String>,
}

impl Principal {
    /// `ROLE_`-prefixed authority derived from the raw role claim, if one was
    /// asserted.
    pub fn authority(&self) -> Option<String> {
        self.role_claim.as_deref().map(role_authority)
    }
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or_else(|| unauthorized(parts.uri.path(), "Missing or invalid Authorization header"))
    }
}

/// Standardized rejection body shared by the gateway and every service filter:
/// `{"error": <msg>, "status": 401, "path": <path>}`.
pub fn unauthorized(path: &str, message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": message, "status": 401, "path": path })),
    )
        .into_response()
}

/// The filter itself. Exempt paths pass through untouched; everything else
/// needs a bearer token that verifies under the shared secret. The concrete
/// verification failure is logged but not echoed to the client.
pub async fn require_auth(State(auth): State<AuthLayer>, mut req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    if auth.is_exempt(&path) {
        return next.run(req).await;
    }

    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let token = match jwt::bearer_token(header_value) {
        Ok(t) => t,
        Err(_) => {
            warn!(%path, "missing or malformed Authorization header");
            return unauthorized(&path, "Missing or invalid Authorization header");
        }
    };

    let claims = match jwt::verify_token(token, &auth.secret) {
        Ok(c) => c,
        Err(e) => {
            warn!(%path, error = %e, "token rejected");
            return unauthorized(&path, "Invalid or expired token");
        }
    };

    let principal = Principal {
        email: claims.sub,
        role: claims.role.as_deref().and_then(|r| r.parse().ok()),
        role_claim: claims.role,
    };
    req.extensions_mut().insert(principal);
    next.run(req).await
}

/// Role gate used inline by handlers (there is no central policy engine).
pub fn require_role(principal: &Principal, role: Role) -> Option<(StatusCode, Json<Value>)> {
    if principal.role == Some(role) {
        None
    } else {
        Some((
            StatusCode::FORBIDDEN,
            Json(json!({ "error": format!("{role} role required") })),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, middleware, routing::get, Router};
    use tower::ServiceExt;

    use crate::jwt::issue_token;

    const SECRET: &str = "filter-secret";

    async fn whoami(principal: Principal) -> String {
        format!(
            "{}:{}",
            principal.email,
            principal.authority().unwrap_or_default()
        )
    }

    fn app() -> Router {
        let auth = AuthLayer::new(
            SECRET,
            vec![
                ExemptPath::Prefix("/auth"),
                ExemptPath::Exact("/candidates/internal"),
            ],
        );
        Router::new()
            .route("/auth/login", get(|| async { "public" }))
            .route("/candidates/internal", get(|| async { "internal" }))
            .route("/candidates/internal/sub", get(|| async { "deep" }))
            .route("/offers", get(whoami))
            .layer(middleware::from_fn_with_state(auth, require_auth))
    }

    fn request(path: &str, auth_header: Option<&str>) -> axum::http::Request<Body> {
        let mut builder = axum::http::Request::builder().uri(path);
        if let Some(h) = auth_header {
            builder = builder.header("Authorization", h);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_json(res: Response) -> Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn body_text(res: Response) -> String {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn exempt_prefix_bypasses_without_header() {
        let res = app().oneshot(request("/auth/login", None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_text(res).await, "public");
    }

    #[tokio::test]
    async fn exempt_exact_does_not_cover_subpaths() {
        let res = app().clone().oneshot(request("/candidates/internal", None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let res = app().oneshot(request("/candidates/internal/sub", None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn missing_header_is_rejected_with_structured_body() {
        let res = app().oneshot(request("/offers", None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(res).await;
        assert_eq!(body["status"], 401);
        assert_eq!(body["path"], "/offers");
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn wrong_scheme_is_rejected() {
        let res = app().oneshot(request("/offers", Some("Basic xyz"))).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn bad_signature_is_rejected() {
        let token = issue_token("eve@example.com", Role::Candidate, "other-secret", 3600).unwrap();
        let res = app()
            .oneshot(request("/offers", Some(&format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn valid_token_establishes_principal() {
        let token = issue_token("ana@example.com", Role::Recruiter, SECRET, 3600).unwrap();
        let res = app()
            .oneshot(request("/offers", Some(&format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_text(res).await, "ana@example.com:ROLE_RECRUITER");
    }

    #[tokio::test]
    async fn concurrent_requests_keep_distinct_principals() {
        let t1 = issue_token("one@example.com", Role::Candidate, SECRET, 3600).unwrap();
        let t2 = issue_token("two@example.com", Role::Recruiter, SECRET, 3600).unwrap();
        let (r1, r2) = tokio::join!(
            app().oneshot(request("/offers", Some(&format!("Bearer {t1}")))),
            app().oneshot(request("/offers", Some(&format!("Bearer {t2}")))),
        );
        assert_eq!(body_text(r1.unwrap()).await, "one@example.com:ROLE_CANDIDATE");
        assert_eq!(body_text(r2.unwrap()).await, "two@example.com:ROLE_RECRUITER");
    }

    #[tokio::test]
    async fn unknown_role_claim_still_carries_an_authority() {
        let auth = AuthLayer::new(SECRET, vec![]);
        let router = Router::new()
            .route("/p", get(whoami))
            .layer(middleware::from_fn_with_state(auth, require_auth));
        // Token minted with a role the services do not know: it maps to no
        // Role variant, but its authority is still normalized from the raw
        // claim.
        let claims = crate::jwt::Claims {
            sub: "odd@example.com".into(),
            role: Some("auditor".into()),
            iat: chrono::Utc::now().timestamp() as usize,
            exp: chrono::Utc::now().timestamp() as usize + 60,
        };
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        let res = router
            .oneshot(request("/p", Some(&format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(body_text(res).await, "odd@example.com:ROLE_AUDITOR");
    }

    #[tokio::test]
    async fn unknown_role_claim_fails_role_gate() {
        let principal = Principal {
            email: "odd@example.com".into(),
            role: None,
            role_claim: Some("auditor".into()),
        };
        assert!(require_role(&principal, Role::Recruiter).is_some());
        assert!(require_role(&principal, Role::Candidate).is_some());
    }
}
