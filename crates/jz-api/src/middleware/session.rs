//! Session layer: loads the session named by the `session_id` cookie before
//! the handler runs and stores it again afterwards.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use uuid::Uuid;

use crate::{
    session::{SESSION_COOKIE, Session, SessionEffects, SessionValues, create_session_cookie},
    state::ApiState,
};

pub async fn session_middleware(
    State(state): State<ApiState>,
    jar: PrivateCookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let known = match jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
    {
        Some(id) => state.sessions.load(id).await.map(|values| (id, values)),
        None => None,
    };

    // Unknown or expired ids are never reused
    let is_new = known.is_none();
    let (id, values) = known.unwrap_or_else(|| (Uuid::new_v4(), SessionValues::new()));

    let session = Session::new(id, values);
    req.extensions_mut().insert(session.clone());

    let response = next.run(req).await;

    if let Some(effects) = response.extensions().get::<SessionEffects>() {
        session.apply(effects);
    }

    if !session.is_changed() {
        return response;
    }

    state.sessions.save(id, session.values()).await;
    tracing::debug!(session_id = %id, is_new, "Session saved");

    if is_new {
        let jar = jar.add(create_session_cookie(id, &state.environment));
        (jar, response).into_response()
    } else {
        response
    }
}
