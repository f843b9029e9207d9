use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

/// `302 Found` redirect, as browsers expect after a form post
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}
