//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! The hosted auth provider issues bearer tokens; the cookie session only
//! remembers the token and the signed-in user's id between requests.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;

use crate::domain::{AccessToken, AuthSession, Error, UserId};

pub(crate) const ACCESS_TOKEN_KEY: &str = "access_token";
pub(crate) const USER_ID_KEY: &str = "user_id";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Remember a freshly issued auth session in the cookie.
    pub fn persist(&self, session: &AuthSession) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(ACCESS_TOKEN_KEY, session.access_token.expose())
            .and_then(|()| self.0.insert(USER_ID_KEY, session.user.id.as_str()))
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Bearer token stored by a previous login, if present.
    pub fn access_token(&self) -> Result<Option<AccessToken>, Error> {
        let raw = self
            .0
            .get::<String>(ACCESS_TOKEN_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        Ok(raw.and_then(AccessToken::new))
    }

    /// Signed-in user's id, if present and well formed.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        let id = self
            .0
            .get::<String>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        match id {
            Some(raw) => match UserId::new(raw) {
                Ok(id) => Ok(Some(id)),
                Err(error) => {
                    tracing::warn!("invalid user id in session cookie: {error}");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Drop everything stored in the session.
    pub fn clear(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AuthUser;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};

    fn session_test_app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new().wrap(crate::inbound::http::test_utils::test_session_middleware())
    }

    fn auth_session() -> AuthSession {
        AuthSession {
            access_token: AccessToken::new("token-1").expect("token"),
            expires_in: Some(3600),
            user: AuthUser {
                id: UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("fixture id"),
                email: Some("ada@example.com".into()),
                username: None,
            },
        }
    }

    #[actix_web::test]
    async fn round_trips_token_and_user() {
        let app = test::init_service(
            session_test_app()
                .route(
                    "/set",
                    web::get().to(|session: SessionContext| async move {
                        session.persist(&auth_session())?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                )
                .route(
                    "/get",
                    web::get().to(|session: SessionContext| async move {
                        let token = session
                            .access_token()?
                            .ok_or_else(|| Error::unauthorized("no token"))?;
                        let user = session
                            .user_id()?
                            .ok_or_else(|| Error::unauthorized("no user"))?;
                        Ok::<_, Error>(
                            HttpResponse::Ok().body(format!("{}|{user}", token.expose())),
                        )
                    }),
                ),
        )
        .await;

        let set_res =
            test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;
        assert_eq!(set_res.status(), StatusCode::OK);
        let cookie = set_res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie set");

        let get_res = test::call_service(
            &app,
            test::TestRequest::get().uri("/get").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(get_res.status(), StatusCode::OK);
        let body = test::read_body(get_res).await;
        assert_eq!(body, "token-1|3fa85f64-5717-4562-b3fc-2c963f66afa6");
    }

    #[actix_web::test]
    async fn empty_session_has_no_token() {
        let app = test::init_service(session_test_app().route(
            "/peek",
            web::get().to(|session: SessionContext| async move {
                let present = session.access_token()?.is_some();
                Ok::<_, Error>(HttpResponse::Ok().body(present.to_string()))
            }),
        ))
        .await;

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/peek").to_request()).await;
        assert_eq!(test::read_body(res).await, "false");
    }
}
