//! Login and logout.

use axum::extract::State;
use axum::response::Redirect;
use axum::{Form, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::auth::{verify_password, SESSION_COOKIE};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// `POST /login` - verifies credentials and sets the session cookie.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<(CookieJar, Json<Value>), ApiError> {
    let username = form.username.trim();

    let user = state.db.users().find_by_username(username).await?;

    let user = match user {
        Some(user) if verify_password(&form.password, &user.password_hash) => user,
        _ => {
            warn!(username = %username, "Failed login attempt");
            return Err(ApiError::unauthorized("Invalid username or password"));
        }
    };

    let token = state.sessions.issue(&user)?;
    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .build();

    info!(username = %user.username, role = ?user.role, "User logged in");

    Ok((
        jar.add(cookie),
        Json(json!({ "success": true, "role": user.role })),
    ))
}

/// `GET /logout` - clears the session cookie and sends the user home.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    // Drop the server-side cart for this session, if any.
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Ok(claims) = state.sessions.verify(cookie.value()) {
            state.carts.remove_session(&claims.sid);
        }
    }

    let removal = Cookie::build((SESSION_COOKIE, "")).path("/").build();
    (jar.remove(removal), Redirect::to("/"))
}
