//! Handler extractors for the request context.
//!
//! Neither extractor rejects: a request that bypassed the correlation
//! middleware gets an empty context and the default logger.

use std::convert::Infallible;
use std::ops::Deref;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::context::RequestContext;
use crate::logging::Logger;

impl<S: Send + Sync> FromRequestParts<S> for RequestContext {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .unwrap_or_default())
    }
}

/// The request's logger.
#[derive(Debug, Clone)]
pub struct RequestLog(pub Logger);

impl Deref for RequestLog {
    type Target = Logger;

    fn deref(&self) -> &Logger {
        &self.0
    }
}

impl<S: Send + Sync> FromRequestParts<S> for RequestLog {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let ctx = <RequestContext as FromRequestParts<S>>::from_request_parts(parts, state).await?;
        Ok(RequestLog(ctx.logger()))
    }
}
