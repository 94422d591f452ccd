//! Signed-cookie sessions
//!
//! Sessions live in process memory and are keyed by a random token. The
//! cookie carries `<token>.<tag>` where the tag is the hex HMAC-SHA256 of the
//! token keyed by the session secret, so a forged or truncated cookie never
//! reaches the session map. Sessions expire [`SESSION_TTL_HOURS`] after
//! sign-in.

use anyhow::{Result, anyhow};
use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::collections::HashMap;
use std::sync::RwLock;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::core::auth::AuthContext;

/// Lifetime of an OAuth `state` value
pub const STATE_TTL_MINUTES: i64 = 10;

/// Lifetime of a session, counted from sign-in
pub const SESSION_TTL_HOURS: i64 = 24;

type HmacSha256 = Hmac<Sha256>;

/// Signed-in user held by a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    /// Google account id
    pub subject: String,
    pub display_name: String,
    pub email: Option<String>,
    pub signed_in_at: DateTime<Utc>,
}

impl SessionUser {
    pub fn new(subject: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            display_name: display_name.into(),
            email: None,
            signed_in_at: Utc::now(),
        }
    }

    pub fn with_email(mut self, email: Option<String>) -> Self {
        self.email = email;
        self
    }

    /// Identity seen by the auth gate
    pub fn to_context(&self) -> AuthContext {
        AuthContext::User {
            subject: self.subject.clone(),
            display_name: self.display_name.clone(),
            email: self.email.clone(),
        }
    }
}

/// In-process session and OAuth state store
pub struct SessionStore {
    secret: String,
    cookie_name: String,
    secure: bool,
    sessions: RwLock<HashMap<String, SessionUser>>,
    states: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl SessionStore {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            secret: config.secret.clone(),
            cookie_name: config.cookie_name.clone(),
            secure: config.secure,
            sessions: RwLock::new(HashMap::new()),
            states: RwLock::new(HashMap::new()),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    fn tag(&self, token: &str) -> Result<Vec<u8>> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| anyhow!("Invalid session secret: {}", e))?;
        mac.update(token.as_bytes());
        Ok(mac.finalize().into_bytes().to_vec())
    }

    /// Cookie value for a token
    pub fn sign(&self, token: &str) -> Result<String> {
        Ok(format!("{}.{}", token, hex::encode(self.tag(token)?)))
    }

    /// Token of a cookie value whose tag matches
    pub fn verify<'a>(&self, value: &'a str) -> Option<&'a str> {
        let (token, tag) = value.rsplit_once('.')?;
        if token.is_empty() {
            return None;
        }
        let given = hex::decode(tag).ok()?;
        let expected = self.tag(token).ok()?;
        bool::from(expected.ct_eq(&given)).then_some(token)
    }

    /// Start a session; returns the signed cookie value
    pub fn create(&self, user: SessionUser) -> Result<String> {
        let token = Uuid::new_v4().simple().to_string();
        let cookie = self.sign(&token)?;
        let now = Utc::now();
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        sessions.retain(|_, existing| !is_expired(existing, now));
        sessions.insert(token, user);
        Ok(cookie)
    }

    /// Live session behind a signed cookie value; an expired one is dropped
    pub fn get(&self, cookie_value: &str) -> Result<Option<SessionUser>> {
        let Some(token) = self.verify(cookie_value) else {
            return Ok(None);
        };
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        match sessions.get(token) {
            Some(user) if is_expired(user, Utc::now()) => {
                sessions.remove(token);
                Ok(None)
            }
            user => Ok(user.cloned()),
        }
    }

    /// End a session; false if there was none
    pub fn remove(&self, cookie_value: &str) -> Result<bool> {
        let Some(token) = self.verify(cookie_value) else {
            return Ok(false);
        };
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        Ok(sessions.remove(token).is_some())
    }

    /// New one-shot CSRF `state` for the OAuth redirect
    pub fn issue_state(&self) -> Result<String> {
        let state = Uuid::new_v4().simple().to_string();
        let now = Utc::now();
        let mut states = self
            .states
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        states.retain(|_, expires| *expires > now);
        states.insert(state.clone(), now + Duration::minutes(STATE_TTL_MINUTES));
        Ok(state)
    }

    /// Consume a `state`; true only once and only before it expires
    pub fn take_state(&self, state: &str) -> Result<bool> {
        let mut states = self
            .states
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        Ok(states
            .remove(state)
            .is_some_and(|expires| expires > Utc::now()))
    }

    /// Raw session cookie from request headers
    pub fn read_cookie<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.cookie_name)
            .map(|(_, value)| value)
    }

    /// `Set-Cookie` value starting a session
    pub fn set_cookie_header(&self, cookie_value: &str) -> String {
        let mut header = format!(
            "{}={}; HttpOnly; SameSite=Lax; Path=/",
            self.cookie_name, cookie_value
        );
        if self.secure {
            header.push_str("; Secure");
        }
        header
    }

    /// `Set-Cookie` value expiring the session cookie
    pub fn clear_cookie_header(&self) -> String {
        let mut header = format!(
            "{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0",
            self.cookie_name
        );
        if self.secure {
            header.push_str("; Secure");
        }
        header
    }
}

fn is_expired(user: &SessionUser, now: DateTime<Utc>) -> bool {
    user.signed_in_at + Duration::hours(SESSION_TTL_HOURS) <= now
}
