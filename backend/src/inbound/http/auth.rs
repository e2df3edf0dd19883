//! Account HTTP handlers proxying the hosted auth provider.
//!
//! ```text
//! POST /api/v1/auth/login
//! POST /api/v1/auth/register
//! POST /api/v1/auth/logout
//! GET  /api/v1/auth/profile
//! ```
//!
//! A successful login stores the provider's access token in the cookie
//! session. The token is also returned so clients can send it as a bearer
//! header instead.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    AuthSession, AuthUser, LoginCredentials, Profile, Registered, Registration, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::credentials::RequestCaller;
use crate::inbound::http::schemas::{ErrorSchema, ProfileSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, credentials_error, require};

const EMAIL: FieldName = FieldName::new("email");
const PASSWORD: FieldName = FieldName::new("password");

/// Login request body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
    #[schema(example = "correct horse")]
    pub password: Option<String>,
}

/// Registration request body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    /// Display name stored with the account.
    pub username: Option<String>,
}

/// Signed-in account.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionUser {
    #[schema(value_type = String)]
    pub id: UserId,
    pub email: Option<String>,
    pub username: Option<String>,
}

impl From<AuthUser> for SessionUser {
    fn from(value: AuthUser) -> Self {
        Self {
            id: value.id,
            email: value.email,
            username: value.username,
        }
    }
}

/// Session issued by a login or an immediately confirmed registration.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user: SessionUser,
    pub access_token: String,
    /// Token lifetime in seconds.
    pub expires_in: Option<u64>,
}

impl From<AuthSession> for SessionResponse {
    fn from(value: AuthSession) -> Self {
        Self {
            access_token: value.access_token.expose().to_owned(),
            expires_in: value.expires_in,
            user: value.user.into(),
        }
    }
}

/// Outcome of a registration.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user: SessionUser,
    /// Absent when the provider asks the user to confirm their email first.
    pub session: Option<SessionResponse>,
    pub confirmation_required: bool,
}

/// Profile envelope.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    #[schema(value_type = ProfileSchema)]
    pub profile: Profile,
}

fn login_credentials(
    email: Option<String>,
    password: Option<String>,
) -> ApiResult<LoginCredentials> {
    let email = require(email, EMAIL)?;
    let password = require(password, PASSWORD)?;
    LoginCredentials::try_from_parts(&email, &password).map_err(|err| credentials_error(&err))
}

/// Sign in with email and password.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = SessionResponse,
            headers(("set-cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security(())
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<SessionResponse>> {
    let payload = payload.into_inner();
    let credentials = login_credentials(payload.email, payload.password)?;
    let issued = state.accounts.login(&credentials).await?;
    session.persist(&issued)?;
    Ok(web::Json(issued.into()))
}

/// Create an account.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Account already exists", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "register",
    security(())
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let email = require(payload.email, EMAIL)?;
    let password = require(payload.password, PASSWORD)?;
    let registration =
        Registration::try_from_parts(&email, &password, payload.username.as_deref())
            .map_err(|err| credentials_error(&err))?;
    let Registered {
        user,
        session: issued,
    } = state.accounts.register(&registration).await?;
    if let Some(issued) = &issued {
        session.persist(issued)?;
    }
    Ok(HttpResponse::Created().json(RegisterResponse {
        user: user.into(),
        confirmation_required: issued.is_none(),
        session: issued.map(SessionResponse::from),
    }))
}

/// Sign out and forget the session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 204, description = "Signed out"),
        (status = 401, description = "Not signed in", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/auth/logout")]
pub async fn logout(
    state: web::Data<HttpState>,
    caller: RequestCaller,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let token = caller.require_token()?;
    let result = state.accounts.logout(token).await;
    session.clear();
    result?;
    Ok(HttpResponse::NoContent().finish())
}

/// Profile of the signed-in account, created on first request.
#[utoipa::path(
    get,
    path = "/api/v1/auth/profile",
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 401, description = "Not signed in", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "getProfile"
)]
#[get("/auth/profile")]
pub async fn profile(
    state: web::Data<HttpState>,
    caller: RequestCaller,
) -> ApiResult<web::Json<ProfileResponse>> {
    let token = caller.require_token()?;
    let profile = state.accounts.profile(token).await?;
    Ok(web::Json(ProfileResponse { profile }))
}
