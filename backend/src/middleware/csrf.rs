//! Anti-forgery token check for state-changing requests.
//!
//! `GET /csrf` stores a random token in the session. Every POST, PUT, PATCH
//! and DELETE must echo it in the `X-CSRF-Token` header; anything else fails
//! with `invalid_csrf_token` before the handler runs.
//!
//! Must be wrapped inside the session middleware.

use std::task::{Context, Poll};

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::Method;
use actix_web::Error;
use futures_util::future::{LocalBoxFuture, Ready, ready};
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::domain::Error as DomainError;
use crate::inbound::http::session::SessionContext;

/// Request header carrying the anti-forgery token.
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Middleware rejecting unsafe requests without a matching token.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use campus_clubs::middleware::Csrf;
///
/// let app = App::new().wrap(Csrf);
/// ```
#[derive(Clone)]
pub struct Csrf;

impl<S, B> Transform<S, ServiceRequest> for Csrf
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = CsrfMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CsrfMiddleware { service }))
    }
}

/// Service wrapper produced by [`Csrf`].
pub struct CsrfMiddleware<S> {
    service: S,
}

fn is_state_changing(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

fn check_token(req: &ServiceRequest) -> Result<(), DomainError> {
    let expected = SessionContext::from_service_request(req)
        .csrf_token()?
        .ok_or_else(|| DomainError::invalid_csrf_token("request a token from /csrf first"))?;
    let presented = req
        .headers()
        .get(CSRF_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| DomainError::invalid_csrf_token("missing X-CSRF-Token header"))?;
    if bool::from(presented.as_bytes().ct_eq(expected.as_bytes())) {
        Ok(())
    } else {
        Err(DomainError::invalid_csrf_token("anti-forgery token does not match"))
    }
}

impl<S, B> Service<ServiceRequest> for CsrfMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if is_state_changing(req.method()) {
            if let Err(error) = check_token(&req) {
                debug!(method = %req.method(), path = %req.path(), "anti-forgery check failed");
                let res = req.error_response(error).map_into_right_body();
                return Box::pin(async move { Ok(res) });
            }
        }
        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}
