//! Sign-in routes and the welcome page

use axum::{
    Router,
    extract::{Query, State},
    http::{
        HeaderMap, StatusCode,
        header::{LOCATION, SET_COOKIE},
    },
    response::{Html, IntoResponse, Response},
    routing::get,
};
use mongodb::bson::{self, Bson, doc};
use serde::Deserialize;

use super::google::GoogleProfile;
use super::session::SessionUser;
use crate::core::auth::AuthContext;
use crate::core::error::{ApiError, ApiResult};
use crate::server::state::AppState;

/// Collection of signed-in accounts
pub const USERS_COLLECTION: &str = "users";

/// Where a failed sign-in lands
const FAILURE_REDIRECT: &str = "/api-docs";

/// `/`, `/login`, `/auth/google/callback` and `/logout`
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(welcome))
        .route("/login", get(login))
        .route("/auth/google/callback", get(google_callback))
        .route("/logout", get(logout))
}

fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(LOCATION, location.to_string())]).into_response()
}

fn found_with_cookie(location: &str, cookie: String) -> Response {
    (
        StatusCode::FOUND,
        [(LOCATION, location.to_string()), (SET_COOKIE, cookie)],
    )
        .into_response()
}

/// `GET /login`: redirect to the Google consent screen
pub async fn login(State(state): State<AppState>) -> ApiResult<Response> {
    let Some(oauth) = state.oauth.as_ref() else {
        return Err(ApiError::ServiceUnavailable {
            message: "Google sign-in is not configured.".to_string(),
        });
    };

    let csrf_state = state
        .sessions
        .issue_state()
        .map_err(|e| ApiError::store("Unexpected error.", e))?;
    let url = oauth
        .authorize_url(&csrf_state)
        .map_err(|e| ApiError::store("Unexpected error.", e.into()))?;

    Ok(found(url.as_str()))
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// `GET /auth/google/callback`
///
/// Any failure redirects to the API docs without a session.
pub async fn google_callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Response {
    match complete_sign_in(&state, params).await {
        Ok(cookie) => found_with_cookie("/", state.sessions.set_cookie_header(&cookie)),
        Err(reason) => {
            tracing::warn!(reason = %reason, "google sign-in failed");
            found(FAILURE_REDIRECT)
        }
    }
}

async fn complete_sign_in(state: &AppState, params: CallbackParams) -> anyhow::Result<String> {
    let oauth = state
        .oauth
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("sign-in is not configured"))?;

    if let Some(error) = params.error {
        anyhow::bail!("provider returned error '{}'", error);
    }
    let csrf_state = params
        .state
        .ok_or_else(|| anyhow::anyhow!("missing state"))?;
    if !state.sessions.take_state(&csrf_state)? {
        anyhow::bail!("unknown or expired state");
    }
    let code = params.code.ok_or_else(|| anyhow::anyhow!("missing code"))?;

    let token = oauth.exchange_code(&code).await?;
    let profile = oauth.fetch_profile(&token.access_token).await?;

    let user = SessionUser::new(profile.sub.clone(), profile.display_name())
        .with_email(profile.email.clone());
    record_login(state, &profile, &user).await?;

    tracing::info!(subject = %user.subject, "user signed in");
    state.sessions.create(user)
}

/// Upsert the `users` document keyed by Google id
async fn record_login(
    state: &AppState,
    profile: &GoogleProfile,
    user: &SessionUser,
) -> anyhow::Result<()> {
    let emails: Vec<Bson> = profile
        .email
        .iter()
        .map(|email| Bson::Document(doc! { "value": email.clone() }))
        .collect();

    state
        .store
        .upsert_by_field(
            USERS_COLLECTION,
            "googleId",
            Bson::String(profile.sub.clone()),
            doc! {
                "fullName": user.display_name.clone(),
                "emails": emails,
                "lastLogin": bson::DateTime::from_millis(user.signed_in_at.timestamp_millis()),
            },
        )
        .await
}

/// `GET /logout`
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(cookie) = state.sessions.read_cookie(&headers) {
        match state.sessions.remove(cookie) {
            Ok(true) => tracing::info!("user signed out"),
            Ok(false) => {}
            Err(e) => tracing::warn!(error = %e, "failed to drop session"),
        }
    }
    found_with_cookie("/", state.sessions.clear_cookie_header())
}

/// `GET /`: landing page with sign-in state
pub async fn welcome(context: AuthContext) -> Html<String> {
    let body = match context.display_name() {
        Some(name) => format!(
            "<h1>Welcome, {}!</h1>\n<p><a href=\"/api-docs\">API documentation</a></p>\n<p><a href=\"/logout\">Log out</a></p>",
            escape_html(name)
        ),
        None => "<h1>Welcome to Nature Notes</h1>\n<p><a href=\"/login\">Log in with Google</a></p>\n<p><a href=\"/api-docs\">API documentation</a></p>"
            .to_string(),
    };

    Html(format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Nature Notes</title></head>\n<body>\n{}\n</body>\n</html>\n",
        body
    ))
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
