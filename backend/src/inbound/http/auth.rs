//! Session establishment handlers.
//!
//! ```text
//! GET  /csrf
//! POST /signup {"email":"ada@uni.example","password":"…","universityId":"…"}
//! POST /login  {"email":"ada@uni.example","password":"…"}
//! POST /logout
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{Error, LoginCredentials, SignupRequest, UniversityId, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, map_credentials_error, parse_id};

/// Login request body for `POST /login`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = Error;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password)
            .map_err(|err| map_credentials_error(&err))
    }
}

/// Student sign-up body for `POST /signup`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupBody {
    /// Login email.
    pub email: String,
    /// Chosen password (at least 8 characters).
    pub password: String,
    /// University the student attends.
    pub university_id: String,
}

/// Anti-forgery token response.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CsrfToken {
    /// Value to send in the `X-CSRF-Token` header.
    pub token: String,
}

/// Issue (or repeat) the session's anti-forgery token.
#[utoipa::path(
    get,
    path = "/csrf",
    responses(
        (status = 200, description = "Token for the X-CSRF-Token header", body = CsrfToken,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "issueCsrfToken",
    security([])
)]
#[get("/csrf")]
pub async fn csrf_token(session: SessionContext) -> ApiResult<HttpResponse> {
    let token = session.issue_csrf_token()?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(CsrfToken { token }))
}

/// Register a student account and sign it in.
#[utoipa::path(
    post,
    path = "/signup",
    request_body = SignupBody,
    responses(
        (status = 201, description = "Account created", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Missing anti-forgery token", body = Error),
        (status = 404, description = "Unknown university", body = Error),
        (status = 409, description = "Email already registered", body = Error)
    ),
    tags = ["auth"],
    operation_id = "signup",
    security([])
)]
#[post("/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SignupBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let university: UniversityId = parse_id(&body.university_id, FieldName::new("universityId"))?;
    let request = SignupRequest::try_from_parts(&body.email, &body.password, university)
        .map_err(|err| map_credentials_error(&err))?;
    let user = state.accounts.sign_up(request).await?;
    session.persist_user(&user.id)?;
    Ok(HttpResponse::Created().json(user))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = User,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 403, description = "Missing anti-forgery token", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<User>> {
    let credentials = LoginCredentials::try_from(payload.into_inner())?;
    let user = state.accounts.authenticate(&credentials).await?;
    session.persist_user(&user.id)?;
    info!(user_id = %user.id, role = ?user.role, "signed in");
    Ok(web::Json(user))
}

/// Drop the session.
#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 204, description = "Signed out"),
        (status = 403, description = "Missing anti-forgery token", body = Error)
    ),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}
