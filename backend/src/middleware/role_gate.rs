//! Path-prefix role gate.
//!
//! Resolves the caller's [`RequestContext`] from the session once per
//! request, rejects requests whose path prefix demands another role, and
//! leaves the context in the request extensions for the
//! [`Requester`](crate::inbound::http::identity::Requester) extractor.
//! Ownership checks happen later, once handlers have loaded the target.
//!
//! Must be wrapped inside the session middleware.

use std::rc::Rc;
use std::task::{Context, Poll};

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, HttpMessage, web};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::debug;

use crate::domain::{
    AuthorizationGate, Decision, DenyReason, Error as DomainError, RequestContext, RouteScope,
};
use crate::inbound::http::identity::resolve_context;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Middleware enforcing the role each path prefix requires.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use campus_clubs::middleware::RoleGate;
///
/// let app = App::new().wrap(RoleGate);
/// ```
#[derive(Clone)]
pub struct RoleGate;

impl<S, B> Transform<S, ServiceRequest> for RoleGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RoleGateMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RoleGateMiddleware {
            service: Rc::new(service),
        }))
    }
}

/// Service wrapper produced by [`RoleGate`].
pub struct RoleGateMiddleware<S> {
    service: Rc<S>,
}

fn scope_denied(scope: RouteScope, reason: DenyReason) -> DomainError {
    let area = match scope {
        RouteScope::Public => "this area",
        RouteScope::Student => "the student area",
        RouteScope::ClubAdmin => "club administration",
        RouteScope::UniversityAdmin => "university administration",
    };
    match reason {
        DenyReason::Unauthenticated => DomainError::unauthenticated(format!("sign in to use {area}")),
        DenyReason::WrongRole => {
            DomainError::wrong_role(format!("your role does not give access to {area}"))
        }
        DenyReason::NotOwner => DomainError::not_owner(format!("you cannot manage {area}")),
    }
}

async fn request_context(req: &ServiceRequest) -> Result<RequestContext, DomainError> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .cloned()
        .ok_or_else(|| DomainError::internal("HTTP state is not configured"))?;
    let session = SessionContext::from_service_request(req);
    resolve_context(state.accounts.as_ref(), &session).await
}

impl<S, B> Service<ServiceRequest> for RoleGateMiddleware<S>
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
        let service = Rc::clone(&self.service);
        Box::pin(async move {
            // The router matches the percent-decoded path, so the scope must too.
            let scope = RouteScope::for_path(req.match_info().as_str());
            let ctx = match request_context(&req).await {
                Ok(ctx) => ctx,
                Err(error) => return Ok(req.error_response(error).map_into_right_body()),
            };
            if let Decision::Deny(reason) = AuthorizationGate::authorize_scope(&ctx, scope) {
                debug!(path = %req.match_info().as_str(), ?scope, ?reason, "route scope denied");
                return Ok(req
                    .error_response(scope_denied(scope, reason))
                    .map_into_right_body());
            }
            req.extensions_mut().insert(ctx);
            service.call(req).await.map(ServiceResponse::map_into_left_body)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test};
    use rstest::rstest;
    use serde_json::Value;

    use crate::domain::UserId;
    use crate::inbound::http::identity::Requester;
    use crate::inbound::http::session::USER_ID_KEY;
    use crate::inbound::http::test_utils::{
        TestContext, session_cookie, test_session_middleware,
    };

    async fn whoami(requester: Requester) -> HttpResponse {
        let body = requester
            .principal()
            .map_or_else(|| "anonymous".to_owned(), |p| format!("{:?}", p.role()));
        HttpResponse::Ok().body(body)
    }

    async fn call(
        ctx: &TestContext,
        user: Option<UserId>,
        path: &str,
    ) -> ServiceResponse<EitherBody<actix_web::body::BoxBody>> {
        let app = test::init_service(
            App::new()
                .app_data(ctx.state.clone())
                .wrap(RoleGate)
                .wrap(test_session_middleware())
                .route(
                    "/login-as/{id}",
                    web::get().to(|session: actix_session::Session, id: web::Path<String>| async move {
                        session
                            .insert(USER_ID_KEY, id.into_inner())
                            .expect("store user id");
                        HttpResponse::Ok()
                    }),
                )
                .default_service(web::to(whoami)),
        )
        .await;
        let mut req = test::TestRequest::get().uri(path);
        if let Some(user) = user {
            let login = test::call_service(
                &app,
                test::TestRequest::get()
                    .uri(&format!("/login-as/{user}"))
                    .to_request(),
            )
            .await;
            req = req.cookie(session_cookie(&login));
        }
        test::call_service(&app, req.to_request()).await
    }

    #[rstest]
    #[case("/student/feed")]
    #[case("/me/posts")]
    #[case("/club/applications")]
    #[case("/university/clubs")]
    #[actix_web::test]
    async fn anonymous_callers_get_a_login_prompt(#[case] path: &str) {
        let ctx = TestContext::new();

        let res = call(&ctx, None, path).await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["code"], "unauthenticated");
        assert_eq!(body["details"]["loginUrl"], "/login");
    }

    #[rstest]
    #[case("/")]
    #[case("/explore")]
    #[case("/clubs/anything")]
    #[actix_web::test]
    async fn public_paths_admit_anonymous_callers(#[case] path: &str) {
        let ctx = TestContext::new();

        let res = call(&ctx, None, path).await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(test::read_body(res).await, "anonymous");
    }

    #[rstest]
    #[case("/student/feed", StatusCode::OK)]
    #[case("/me/posts", StatusCode::OK)]
    #[case("/club/applications", StatusCode::FORBIDDEN)]
    #[case("/university/clubs", StatusCode::FORBIDDEN)]
    #[actix_web::test]
    async fn students_only_enter_student_areas(#[case] path: &str, #[case] expected: StatusCode) {
        let ctx = TestContext::new();
        let student = ctx.student("ada@uni.example").await;

        let res = call(&ctx, Some(student), path).await;

        assert_eq!(res.status(), expected);
    }

    #[rstest]
    #[actix_web::test]
    async fn university_admins_reach_university_routes_only() {
        let ctx = TestContext::new();
        let admin = ctx.global_admin().await;

        let allowed = call(&ctx, Some(admin), "/university/clubs").await;
        let denied = call(&ctx, Some(admin), "/student/feed").await;

        assert_eq!(allowed.status(), StatusCode::OK);
        assert_eq!(test::read_body(allowed).await, "UniversityAdmin");
        assert_eq!(denied.status(), StatusCode::FORBIDDEN);
        let body: Value = test::read_body_json(denied).await;
        assert_eq!(body["code"], "wrong_role");
    }

    #[rstest]
    #[actix_web::test]
    async fn unknown_session_users_are_anonymous() {
        let ctx = TestContext::new();

        let res = call(&ctx, Some(UserId::random()), "/student/feed").await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[case("/%73tudent/feed")]
    #[case("/%6De/posts")]
    #[actix_web::test]
    async fn percent_encoded_prefixes_keep_their_scope(#[case] path: &str) {
        let ctx = TestContext::new();
        let admin = ctx.global_admin().await;

        let res = call(&ctx, Some(admin), path).await;

        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["code"], "wrong_role");
    }
}
