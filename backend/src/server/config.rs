//! HTTP server configuration object and helpers.

use actix_web::cookie::{Key, SameSite};
use pawprint::inbound::http::state::CacheBounds;
use pawprint::settings::{
    AppSettings, BuildMode, GenerationSettings, HostedSettings, SettingsError,
};
use std::net::SocketAddr;

/// Validated configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) cache_bounds: CacheBounds,
    /// Hosted store and auth provider; `None` serves everything in memory.
    pub(crate) hosted: Option<HostedSettings>,
    /// Image service; `None` disables generation.
    pub(crate) generation: Option<GenerationSettings>,
}

impl ServerConfig {
    /// Validate `settings` for the given build mode.
    ///
    /// # Errors
    ///
    /// Propagates the first [`SettingsError`] raised by the settings
    /// accessors.
    pub fn from_settings(settings: &AppSettings, mode: BuildMode) -> Result<Self, SettingsError> {
        let session = settings.session(mode)?;
        Ok(Self {
            key: session.key,
            cookie_secure: session.cookie_secure,
            same_site: session.same_site,
            bind_addr: settings.bind_addr()?,
            cache_bounds: settings.cache_bounds(),
            hosted: settings.hosted()?,
            generation: settings.generation()?,
        })
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
