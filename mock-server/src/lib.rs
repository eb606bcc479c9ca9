use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

/// Account id accepted by `app()`.
pub const MOCK_AID: &str = "12345";
/// API key accepted by `app()`.
pub const MOCK_KEY: &str = "test-key";

/// Addresses at this domain verify as undeliverable.
pub const UNDELIVERABLE_DOMAIN: &str = "invalid.test";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Submission {
    pub result: bool,
    pub cid: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AddressResult {
    pub email: String,
    pub status: u8,
    #[serde(rename = "statusName")]
    pub status_name: String,
    pub syntax: bool,
    pub mx: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerificationResult {
    pub cid: u64,
    pub checked: bool,
    pub result: Vec<AddressResult>,
}

#[derive(Clone)]
pub struct AppState {
    aid: String,
    key: String,
    next_cid: Arc<AtomicU64>,
    submissions: Arc<RwLock<HashMap<u64, String>>>,
}

type ApiReply = (StatusCode, Json<Value>);

pub fn app() -> Router {
    app_with_credentials(MOCK_AID, MOCK_KEY)
}

pub fn app_with_credentials(aid: &str, key: &str) -> Router {
    let state = AppState {
        aid: aid.to_string(),
        key: key.to_string(),
        next_cid: Arc::new(AtomicU64::new(1)),
        submissions: Arc::new(RwLock::new(HashMap::new())),
    };
    Router::new()
        .route("/verifyaddr", get(verify_address))
        .route("/getresult", get(get_result))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn api_error(status: StatusCode, detail: &str) -> ApiReply {
    (
        status,
        Json(json!({ "status": status.as_u16(), "detail": detail })),
    )
}

fn authorize(state: &AppState, params: &HashMap<String, String>) -> Result<(), ApiReply> {
    let aid_ok = params.get("aid").is_some_and(|aid| *aid == state.aid);
    let key_ok = params.get("key").is_some_and(|key| *key == state.key);
    if aid_ok && key_ok {
        Ok(())
    } else {
        Err(api_error(StatusCode::UNAUTHORIZED, "Invalid API key"))
    }
}

pub fn classify(email: &str) -> AddressResult {
    let (syntax, domain) = match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => (true, domain),
        _ => (false, ""),
    };
    let mx = syntax && !domain.eq_ignore_ascii_case(UNDELIVERABLE_DOMAIN);
    let (status, status_name) = if mx { (1, "deliverable") } else { (2, "undeliverable") };
    AddressResult {
        email: email.to_string(),
        status,
        status_name: status_name.to_string(),
        syntax,
        mx,
    }
}

async fn verify_address(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiReply {
    if let Err(reply) = authorize(&state, &params) {
        return reply;
    }
    let Some(email) = params.get("email").filter(|e| !e.is_empty()) else {
        return api_error(StatusCode::BAD_REQUEST, "Email is required");
    };
    let cid = state.next_cid.fetch_add(1, Ordering::Relaxed);
    state.submissions.write().await.insert(cid, email.clone());
    tracing::debug!(cid, "accepted submission");
    let body = Submission { result: true, cid };
    (StatusCode::OK, Json(json!(body)))
}

async fn get_result(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiReply {
    if let Err(reply) = authorize(&state, &params) {
        return reply;
    }
    let Some(cid) = params.get("cid").and_then(|c| c.parse::<u64>().ok()) else {
        return api_error(StatusCode::BAD_REQUEST, "cid is required");
    };
    let submissions = state.submissions.read().await;
    match submissions.get(&cid) {
        Some(email) => {
            let body = VerificationResult {
                cid,
                checked: true,
                result: vec![classify(email)],
            };
            (StatusCode::OK, Json(json!(body)))
        }
        None => api_error(StatusCode::NOT_FOUND, "not found"),
    }
}
