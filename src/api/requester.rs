//! Requester identity extraction
//!
//! Authentication happens upstream; by the time a request reaches this
//! service its identity is carried in the `x-user-id` header.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Json, Response},
};

use super::responses::ErrorResponse;
use crate::state::{AppState, Identity};

pub const USER_ID_HEADER: &str = "x-user-id";

/// Identity of the client making the request
#[derive(Debug, Clone)]
pub struct Requester(pub Identity);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Requester {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let identity = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Identity::parse(value).ok());

        match identity {
            Some(identity) => Ok(Requester(identity)),
            None => Err((
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new(
                    format!("Missing {} header", USER_ID_HEADER),
                    state.clock.now(),
                )),
            )
                .into_response()),
        }
    }
}
