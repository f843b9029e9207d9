//! Per-player sessions.
//!
//! The session id travels in a private cookie; the values live in a
//! [`SessionStore`]. The session layer loads the session before a handler runs
//! and writes it back afterwards, so handlers only deal with a [`Session`].

pub mod store;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use uuid::Uuid;

pub use store::{SessionStore, SessionValues};

use crate::{auth::AuthUser, config::Environment, error::ApiError};

/// Name of the private cookie holding the session id
pub const SESSION_COOKIE: &str = "session_id";

/// The running quiz ([`jz_quiz::QuizData`])
pub const QUIZ: &str = "quiz";
pub const FLASH_SUCCESS: &str = "flash_success";
pub const FLASH_ERROR: &str = "flash_error";
/// Field errors of the last rejected form
pub const FORM: &str = "form";

#[derive(Debug, Default)]
struct SessionState {
    values: SessionValues,
    changed: bool,
}

/// Handle to the session of the current request
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    state: Arc<Mutex<SessionState>>,
}

impl Session {
    pub fn new(id: Uuid, values: SessionValues) -> Self {
        Self {
            id,
            state: Arc::new(Mutex::new(SessionState {
                values,
                changed: false,
            })),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read a value; a value that no longer deserializes counts as absent
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.state().values.get(key).cloned()?;
        decode(key, value)
    }

    pub fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<(), serde_json::Error> {
        let value = serde_json::to_value(value)?;
        let mut state = self.state();
        state.values.insert(key.to_string(), value);
        state.changed = true;
        Ok(())
    }

    /// Read and remove a value
    pub fn pop<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = {
            let mut state = self.state();
            let value = state.values.remove(key)?;
            state.changed = true;
            value
        };
        decode(key, value)
    }

    pub fn remove(&self, key: &str) {
        let mut state = self.state();
        if state.values.remove(key).is_some() {
            state.changed = true;
        }
    }

    /// Apply the writes an error response asked for
    pub fn apply(&self, effects: &SessionEffects) {
        let mut state = self.state();
        for key in &effects.remove {
            state.values.remove(*key);
        }
        for (key, value) in &effects.put {
            state.values.insert((*key).to_string(), value.clone());
        }
        state.changed |= !effects.is_empty();
    }

    pub fn is_changed(&self) -> bool {
        self.state().changed
    }

    pub fn values(&self) -> SessionValues {
        self.state().values.clone()
    }
}

fn decode<T: DeserializeOwned>(key: &str, value: Value) -> Option<T> {
    serde_json::from_value(value)
        .inspect_err(|e| tracing::warn!(key, error = %e, "Discarding malformed session value"))
        .ok()
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| ApiError::Internal("session layer is not installed".to_string()))
    }
}

/// Session writes carried by a response and applied by the session layer.
///
/// Error responses are built without access to the request, so they describe
/// the session changes of their recovery here instead.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionEffects {
    remove: Vec<&'static str>,
    put: Vec<(&'static str, Value)>,
}

impl SessionEffects {
    pub fn remove(mut self, key: &'static str) -> Self {
        self.remove.push(key);
        self
    }

    pub fn put(mut self, key: &'static str, value: impl Into<Value>) -> Self {
        self.put.push((key, value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.remove.is_empty() && self.put.is_empty()
    }

    pub fn removes(&self, key: &str) -> bool {
        self.remove.iter().any(|k| *k == key)
    }

    pub fn value(&self, key: &str) -> Option<&Value> {
        self.put.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// Attach the effects to a response
    pub fn attach(self, mut response: Response) -> Response {
        response.extensions_mut().insert(self);
        response
    }
}

/// Per-page session data: flash messages and form errors are consumed on read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub flash_success: Option<String>,
    pub flash_error: Option<String>,
    pub form: Value,
    pub logged_in: bool,
    pub username: Option<String>,
}

impl SessionData {
    pub fn take(session: &Session, user: Option<&AuthUser>) -> Self {
        Self {
            flash_success: session.pop(FLASH_SUCCESS),
            flash_error: session.pop(FLASH_ERROR),
            form: session
                .pop(FORM)
                .unwrap_or_else(|| Value::Object(Map::new())),
            logged_in: user.is_some(),
            username: user.map(|u| u.username.clone()),
        }
    }
}

/// Create the session cookie
///
/// Cookies are secure (HTTPS-only) in production.
pub fn create_session_cookie(id: Uuid, environment: &Environment) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(!environment.is_development())
        .build()
}
