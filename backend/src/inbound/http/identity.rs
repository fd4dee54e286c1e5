//! Request identity resolution.
//!
//! The role gate resolves the [`RequestContext`] once per request and stores
//! it in the request extensions. Handlers receive it through the
//! [`Requester`] extractor, which falls back to resolving the session itself
//! when the gate is not mounted (handler unit tests, for example).

use std::ops::Deref;

use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::debug;

use crate::domain::ports::Accounts;
use crate::domain::{Error, Principal, RequestContext};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Build the request context for the user stored in `session`.
///
/// Sessions naming an account that no longer exists (a club admin removed
/// with their club, say) resolve to an anonymous context.
pub async fn resolve_context(
    accounts: &dyn Accounts,
    session: &SessionContext,
) -> Result<RequestContext, Error> {
    let Some(user_id) = session.user_id()? else {
        return Ok(RequestContext::anonymous());
    };
    match accounts.principal_for(&user_id).await? {
        Some(principal) => Ok(RequestContext::authenticated(principal)),
        None => {
            debug!(user_id = %user_id, "session names an unknown account");
            Ok(RequestContext::anonymous())
        }
    }
}

/// Extractor yielding the caller's [`RequestContext`].
#[derive(Debug, Clone)]
pub struct Requester(pub RequestContext);

impl Requester {
    /// The signed-in principal, if any.
    #[must_use]
    pub fn principal(&self) -> Option<&Principal> {
        self.0.principal()
    }

    /// Unwrap the context.
    #[must_use]
    pub fn into_inner(self) -> RequestContext {
        self.0
    }
}

impl Deref for Requester {
    type Target = RequestContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for Requester {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        if let Some(ctx) = req.extensions().get::<RequestContext>() {
            let ctx = ctx.clone();
            return Box::pin(async move { Ok(Self(ctx)) });
        }
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let session = SessionContext::from_request(req, payload);
        Box::pin(async move {
            let state = state
                .ok_or_else(|| Error::internal("HTTP state is not configured"))?;
            let session = session.await?;
            let ctx = resolve_context(state.accounts.as_ref(), &session).await?;
            Ok(Self(ctx))
        })
    }
}
