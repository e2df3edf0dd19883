//! Caller identity for record store access.
//!
//! A request may present the auth provider's token as
//! `Authorization: Bearer <token>` or rely on the token remembered in the
//! cookie session by `POST /auth/login`. The header wins when both exist.
//! Requests with neither run as the anonymous caller.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;

use crate::domain::{AccessToken, Caller, Error};
use crate::inbound::http::session::SessionContext;

const BEARER_PREFIX: &str = "Bearer ";

/// Extractor yielding the [`Caller`] of the current request.
#[derive(Debug, Clone)]
pub struct RequestCaller(pub Caller);

impl RequestCaller {
    pub fn into_inner(self) -> Caller {
        self.0
    }

    /// The caller's token or `401 Unauthorized`.
    pub fn require_token(&self) -> Result<&AccessToken, Error> {
        self.0
            .access_token()
            .ok_or_else(|| Error::unauthorized("login required"))
    }
}

fn bearer_token(req: &HttpRequest) -> Result<Option<AccessToken>, Error> {
    let Some(value) = req.headers().get(AUTHORIZATION) else {
        return Ok(None);
    };
    let raw = value
        .to_str()
        .map_err(|_| Error::unauthorized("authorization header must be ASCII"))?;
    let token = raw
        .strip_prefix(BEARER_PREFIX)
        .ok_or_else(|| Error::unauthorized("authorization header must use the Bearer scheme"))?;
    AccessToken::new(token)
        .map(Some)
        .ok_or_else(|| Error::unauthorized("bearer token must not be empty"))
}

impl FromRequest for RequestCaller {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let header = bearer_token(req);
        let session = SessionContext::from_request(req, payload);
        Box::pin(async move {
            if let Some(token) = header? {
                return Ok(Self(Caller::with_token(token)));
            }
            let token = session.await?.access_token()?;
            Ok(Self(token.map_or_else(Caller::anonymous, Caller::with_token)))
        })
    }
}
