//! HTTP boundary.
//!
//! Handlers extract the peer address and headers, post a request to the
//! control loop through the [`ControllerHandle`] and map the reply to a
//! plain-text response. They never hold controller state.
//!
//! | Route         | Headers              | Responses                      |
//! |---------------|----------------------|--------------------------------|
//! | `/api/lock`   | `pass`               | 200 `success`, 403 `fail`      |
//! | `/api/unlock` | `pass`, `autolock`   | 200 `success`, 403 `fail`      |
//! | `/api/state`  |                      | 200 `locked` / `unlocked`      |
//! | `/log`        | Basic `Authorization`| 200 HTML, 401                  |

use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router,
    extract::{ConnectInfo, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use base64::{Engine, engine::general_purpose::STANDARD};
use latchkey_core::{AutoLock, Credential, Intent, IntentOutcome, Origin};
use tracing::{debug, warn};

use crate::{config::AdminCredentials, error::ServerError, runtime::ControllerHandle};

/// Request credential header.
pub const PASS_HEADER: &str = "pass";

/// Auto-lock request header.
pub const AUTOLOCK_HEADER: &str = "autolock";

const LOG_REALM: &str = "Basic realm=\"Login Required\"";
const LOG_PAGE_HEAD: &str = "<html><body style=\"background: #D1D1D1;\"><h1 style=\"text-align: \
                             center;text-shadow: 1px 1px 5px #515151;\">Log File</h1><pre>";
const LOG_PAGE_TAIL: &str = "</pre></body></html>";

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    controller: ControllerHandle,
    admin: Arc<AdminCredentials>,
}

impl AppState {
    /// State over the control loop `controller`, guarding `/log` with `admin`.
    pub fn new(controller: ControllerHandle, admin: AdminCredentials) -> Self {
        Self { controller, admin: Arc::new(admin) }
    }
}

/// Build the router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/lock", get(lock))
        .route("/api/unlock", get(unlock))
        .route("/api/state", get(lock_state))
        .route("/log", get(log_page))
        .with_state(state)
}

async fn lock(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Response {
    let origin = remote_origin(peer, &headers);
    intent_response(state.controller.intent(origin, Intent::Lock).await)
}

async fn unlock(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Response {
    let origin = remote_origin(peer, &headers);
    let auto_lock = AutoLock::from_header(header_str(&headers, AUTOLOCK_HEADER));
    intent_response(state.controller.intent(origin, Intent::Unlock { auto_lock }).await)
}

async fn lock_state(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
) -> Response {
    match state.controller.state(Origin::remote(peer.ip(), None)).await {
        Ok(lock_state) => (StatusCode::OK, lock_state.as_str()).into_response(),
        Err(error) => unavailable(&error),
    }
}

async fn log_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if !basic_auth_matches(headers.get(header::AUTHORIZATION), &state.admin) {
        debug!("log page authentication failed");
        let challenge = [(header::WWW_AUTHENTICATE, LOG_REALM)];
        return (StatusCode::UNAUTHORIZED, challenge).into_response();
    }

    match state.controller.log().await {
        Ok(content) => Html(render_log_page(&content)).into_response(),
        Err(error) => unavailable(&error),
    }
}

fn remote_origin(peer: SocketAddr, headers: &HeaderMap) -> Origin {
    let credential = header_str(headers, PASS_HEADER).map(Credential::from);
    Origin::remote(peer.ip(), credential)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

fn intent_response(result: Result<IntentOutcome, ServerError>) -> Response {
    match result {
        Ok(IntentOutcome::Accepted { .. }) => (StatusCode::OK, "success").into_response(),
        Ok(IntentOutcome::Rejected) => (StatusCode::FORBIDDEN, "fail").into_response(),
        Err(error) => unavailable(&error),
    }
}

fn unavailable(error: &ServerError) -> Response {
    warn!(%error, "request not served");
    (StatusCode::SERVICE_UNAVAILABLE, "unavailable").into_response()
}

/// Check an `Authorization: Basic ...` header against `admin`.
fn basic_auth_matches(value: Option<&HeaderValue>, admin: &AdminCredentials) -> bool {
    let Some(encoded) = value
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Basic "))
    else {
        return false;
    };
    let Ok(decoded) = STANDARD.decode(encoded.trim()) else {
        return false;
    };
    let Ok(decoded) = String::from_utf8(decoded) else {
        return false;
    };
    decoded.split_once(':').is_some_and(|(user, password)| admin.matches(user, password))
}

/// Wrap raw audit content in the log page. Markup in the content is escaped.
fn render_log_page(content: &str) -> String {
    let mut page = String::with_capacity(LOG_PAGE_HEAD.len() + content.len() + 32);
    page.push_str(LOG_PAGE_HEAD);
    for c in content.chars() {
        match c {
            '<' => page.push_str("&lt;"),
            '>' => page.push_str("&gt;"),
            '&' => page.push_str("&amp;"),
            c => page.push(c),
        }
    }
    page.push_str(LOG_PAGE_TAIL);
    page
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> AdminCredentials {
        AdminCredentials { user: "admin".into(), password: "esp8266".into() }
    }

    fn basic(user_pass: &str) -> HeaderValue {
        HeaderValue::from_str(&format!("Basic {}", STANDARD.encode(user_pass))).unwrap()
    }

    #[test]
    fn basic_auth_accepts_exact_match() {
        assert!(basic_auth_matches(Some(&basic("admin:esp8266")), &admin()));
    }

    #[test]
    fn basic_auth_rejects_everything_else() {
        let admin = admin();
        assert!(!basic_auth_matches(None, &admin));
        assert!(!basic_auth_matches(Some(&basic("admin:wrong")), &admin));
        assert!(!basic_auth_matches(Some(&basic("root:esp8266")), &admin));
        assert!(!basic_auth_matches(Some(&basic("admin")), &admin));
        assert!(!basic_auth_matches(Some(&HeaderValue::from_static("Basic !!!")), &admin));
        assert!(!basic_auth_matches(Some(&HeaderValue::from_static("Bearer abc")), &admin));
    }

    #[test]
    fn password_may_contain_colons() {
        let admin = AdminCredentials { user: "admin".into(), password: "a:b".into() };
        assert!(basic_auth_matches(Some(&basic("admin:a:b")), &admin));
    }

    #[test]
    fn log_page_wraps_content() {
        let page = render_log_page("[5] LOCK SUCCESS: LOCAL\n");
        assert_eq!(
            page,
            "<html><body style=\"background: #D1D1D1;\"><h1 style=\"text-align: center;\
             text-shadow: 1px 1px 5px #515151;\">Log File</h1><pre>[5] LOCK SUCCESS: LOCAL\n\
             </pre></body></html>"
        );
    }

    #[test]
    fn log_page_escapes_markup() {
        let page = render_log_page("<script>&");
        assert!(page.contains("<pre>&lt;script&gt;&amp;</pre>"));
    }
}
