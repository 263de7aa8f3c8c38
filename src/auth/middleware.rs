use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use super::token::TokenVerifier;
use crate::error::AppError;

/// Gate for protected routes. Requests without a valid bearer token are
/// answered with 401 and never reach the handler; on success the decoded
/// [`Claims`](super::Claims) are stored in the request extensions.
pub async fn require_auth(
    State(verifier): State<TokenVerifier>,
    mut request: Request,
    next: Next,
) -> Response {
    match verifier.authenticate(request.headers()) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(err) => {
            warn!("Rejected {} {}: {}", request.method(), request.uri().path(), err);
            AppError::from(err).into_response()
        }
    }
}
