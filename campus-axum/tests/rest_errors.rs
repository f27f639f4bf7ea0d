use std::sync::Arc;

use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderValue, Request};
use axum::routing::{get, post};
use axum::{Json, Router};
use campus_auth::{
    AuthError, AuthenticationService, JwtOptions, SessionClaim, SessionCodec, SigningContext,
    SigningKey,
};
use campus_axum::rest::map_json_rejection;
use campus_axum::{axum, CampusAxumError, CurrentSession, SessionState};
use campus_core::{CampusConfig, CampusError, MemoryStore, Role, StoreError};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

struct TestState {
    auth: AuthenticationService,
}

impl SessionState for TestState {
    fn authentication(&self) -> &AuthenticationService {
        &self.auth
    }
}

fn state() -> Arc<TestState> {
    let codec = SessionCodec::new(
        SigningContext::new(SigningKey::new("primary", "axum-tests").unwrap()),
        JwtOptions::default(),
    );
    let auth = AuthenticationService::builder(codec, Arc::new(MemoryStore::new()))
        .build()
        .unwrap();
    Arc::new(TestState { auth })
}

fn router(state: Arc<TestState>) -> Router<()> {
    let routes = Router::new()
        .route(
            "/echo",
            post(|body: Result<Json<Value>, JsonRejection>| async move {
                let Json(body) = body.map_err(map_json_rejection)?;
                Ok::<_, CampusAxumError>(Json(body))
            }),
        )
        .route(
            "/unprocessable",
            get(|| async {
                Err::<Json<Value>, CampusAxumError>(
                    CampusError::unprocessable("Invalid")
                        .with_errors(json!({"title": ["required"]}))
                        .into(),
                )
            }),
        )
        .route(
            "/boom",
            get(|| async { Err::<Json<Value>, CampusAxumError>(anyhow::anyhow!("db password is hunter2").into()) }),
        )
        .route(
            "/store-timeout",
            get(|| async {
                Err::<Json<Value>, CampusAxumError>(
                    StoreError::Timeout(std::time::Duration::from_millis(5)).into(),
                )
            }),
        )
        .route(
            "/tenant-mismatch",
            get(|| async { Err::<Json<Value>, CampusAxumError>(AuthError::TenantMismatch.into()) }),
        )
        .route(
            "/whoami",
            get(|session: CurrentSession, State(_): State<Arc<TestState>>| async move {
                Json(json!({"id": session.claim().principal_id, "slug": session.tenant().slug}))
            }),
        )
        .with_state(state);

    axum(CampusConfig::new().snapshot())
        .merge(routes)
        .with_http_layers()
        .router
}

async fn json_body(res: axum::response::Response) -> Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get_req(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn malformed_json_is_bad_request_with_request_id() {
    let res = router(state())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/echo")
                .header("content-type", "application/json")
                .body(Body::from("{\"title\":\"x\""))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 400);
    assert!(res.headers().get("x-request-id").is_some());
    let body = json_body(res).await;
    assert_eq!(body["name"], "BadRequest");
    assert_eq!(body["code"], 400);
    assert_eq!(body["className"], "bad-request");
    assert!(body.get("errors").is_some());
}

#[tokio::test]
async fn request_id_is_preserved_when_provided() {
    let provided = HeaderValue::from_static("req-test-123");
    let res = router(state())
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/unprocessable")
                .header("x-request-id", provided.clone())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.headers().get("x-request-id").unwrap(), &provided);
}

#[tokio::test]
async fn structured_errors_keep_status_and_shape() {
    let res = router(state()).oneshot(get_req("/unprocessable")).await.unwrap();
    assert_eq!(res.status().as_u16(), 422);
    let body = json_body(res).await;
    assert_eq!(body["name"], "Unprocessable");
    assert_eq!(body["className"], "unprocessable");
    assert_eq!(body["errors"], json!({"title": ["required"]}));
}

#[tokio::test]
async fn server_errors_never_leak_detail() {
    for uri in ["/boom", "/store-timeout"] {
        let res = router(state()).oneshot(get_req(uri)).await.unwrap();
        assert_eq!(res.status().as_u16(), 500, "{uri}");
        let body = json_body(res).await;
        assert_eq!(body["name"], "GeneralError");
        assert_eq!(body["className"], "general-error");
        assert_eq!(body["message"], "Internal server error");
        assert!(!body.to_string().contains("hunter2"));
    }
}

#[tokio::test]
async fn credential_rejections_are_generic_401s() {
    let res = router(state()).oneshot(get_req("/tenant-mismatch")).await.unwrap();
    assert_eq!(res.status().as_u16(), 401);
    let body = json_body(res).await;
    assert_eq!(body["name"], "NotAuthenticated");
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn session_extractor_reads_cookie_or_bearer() {
    let state = state();
    let claim = SessionClaim {
        principal_id: 12,
        tenant_id: 3,
        role: Role::Student,
        fullname: "Bob".into(),
        department: "Arts".into(),
        slug: "oak-school-3".into(),
        expires_at: unix_now() + 600,
    };
    let token = state.auth.codec().encode(&claim).unwrap();

    let res = router(state.clone())
        .oneshot(
            Request::builder()
                .uri("/whoami")
                .header("cookie", format!("theme=dark; session_token={token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(json_body(res).await, json!({"id": 12, "slug": "oak-school-3"}));

    let res = router(state.clone())
        .oneshot(
            Request::builder()
                .uri("/whoami")
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);

    let res = router(state.clone()).oneshot(get_req("/whoami")).await.unwrap();
    assert_eq!(res.status().as_u16(), 401);
    assert_eq!(json_body(res).await["message"], "Not logged in");

    let res = router(state)
        .oneshot(
            Request::builder()
                .uri("/whoami")
                .header("cookie", "session_token=not.a.token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 401);
    assert_eq!(json_body(res).await["message"], "Invalid or expired session");
}

fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}
