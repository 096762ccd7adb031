use std::sync::Arc;

use axum::extract::FromRequestParts;
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

/// Header consulted when no auth front end has resolved the owner already.
pub const OWNER_HEADER: &str = "x-owner-id";

/// Owner identity for the request. The deployment's auth layer is expected to
/// insert this as a request extension after resolving the session; the header
/// fallback serves trusted-proxy setups and tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurrentOwner(pub Uuid);

impl FromRequestParts<Arc<AppState>> for CurrentOwner {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(owner) = parts.extensions.get::<CurrentOwner>().copied() {
            return Ok(owner);
        }

        let raw = parts
            .headers
            .get(OWNER_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing owner identity"))?;

        let id = Uuid::parse_str(raw)
            .map_err(|_| AppError::unauthorized("Invalid owner identity"))?;

        let owner = CurrentOwner(id);
        parts.extensions.insert(owner);
        Ok(owner)
    }
}

pub type OwnerGuard = CurrentOwner;
