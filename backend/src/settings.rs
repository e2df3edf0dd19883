//! Application settings loaded via OrthoConfig.
//!
//! Values come from `PAWPRINT_*` environment variables, an optional
//! configuration file and command-line flags, in increasing precedence.
//! Debug builds tolerate missing session material and fall back to an
//! ephemeral signing key; release builds refuse to start without one.

use std::net::SocketAddr;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use actix_web::cookie::{Key, SameSite};
use ortho_config::OrthoConfig;
use serde::Deserialize;
use tracing::warn;
use url::Url;
use zeroize::{Zeroize, Zeroizing};

use crate::inbound::http::state::CacheBounds;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_CACHE_CAPACITY: usize = 500;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_STORE_TIMEOUT_SECS: u64 = 10;
const SESSION_KEY_DEFAULT_PATH: &str = "/var/run/secrets/session_key";
const SESSION_KEY_MIN_LEN: usize = 64;

/// Build mode for settings validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate defaults and emit warnings.
    Debug,
    /// Release builds require explicit, valid session material.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Errors raised while validating settings.
#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("missing required setting: {name}")]
    Missing { name: &'static str },
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    #[error("same_site=None requires cookie_secure in release builds")]
    InsecureSameSiteNone,
}

/// Raw settings as loaded from the environment, files and flags.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PAWPRINT")]
pub struct AppSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// Base URL of the hosted record store and auth provider.
    pub store_url: Option<String>,
    /// Public key presented on every store request.
    pub anon_key: Option<String>,
    /// Service-role key used for privileged store requests.
    pub service_key: Option<String>,
    /// Auth provider base URL, when it differs from `store_url`.
    pub auth_url: Option<String>,
    /// Store and auth request timeout in seconds.
    pub store_timeout_secs: Option<u64>,
    /// Image generation endpoint.
    pub ai_endpoint: Option<String>,
    /// Image generation API key.
    pub ai_key: Option<String>,
    /// Maximum entries held by each fallback cache.
    pub cache_capacity: Option<usize>,
    /// Fallback cache entry lifetime in seconds.
    pub cache_ttl_secs: Option<u64>,
    /// File holding the cookie signing key.
    pub session_key_file: Option<PathBuf>,
    /// Mark session cookies `Secure`.
    #[ortho_config(default = true)]
    pub cookie_secure: bool,
    /// `Strict`, `Lax` or `None`.
    pub same_site: Option<String>,
    /// Serve every relation from process memory instead of the hosted store.
    #[ortho_config(default = false)]
    pub in_memory: bool,
}

/// Connection details for the hosted store and auth provider.
pub struct HostedSettings {
    pub store_url: Url,
    pub auth_url: Url,
    pub anon_key: Zeroizing<String>,
    pub service_key: Option<Zeroizing<String>>,
    pub timeout: Duration,
}

/// Connection details for the image generation service.
pub struct GenerationSettings {
    pub endpoint: Url,
    pub api_key: Zeroizing<String>,
}

/// Cookie session settings derived from [`AppSettings`].
pub struct SessionSettings {
    /// Signing key for cookie sessions.
    pub key: Key,
    pub cookie_secure: bool,
    pub same_site: SameSite,
}

fn parse_url(name: &'static str, raw: &str) -> Result<Url, SettingsError> {
    Url::parse(raw).map_err(|_| SettingsError::Invalid {
        name,
        value: raw.to_owned(),
        expected: "absolute URL",
    })
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|raw| !raw.trim().is_empty())
}

impl AppSettings {
    /// Socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Invalid`] when the address does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|_| SettingsError::Invalid {
            name: "bind_addr",
            value: raw.to_owned(),
            expected: "host:port",
        })
    }

    /// Capacity and lifetime of the fallback caches. A zero capacity falls
    /// back to the default.
    #[must_use]
    pub fn cache_bounds(&self) -> CacheBounds {
        let capacity = self
            .cache_capacity
            .and_then(NonZeroUsize::new)
            .or_else(|| NonZeroUsize::new(DEFAULT_CACHE_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);
        CacheBounds {
            capacity,
            ttl: Duration::from_secs(self.cache_ttl_secs.unwrap_or(DEFAULT_CACHE_TTL_SECS)),
        }
    }

    /// Hosted store settings, or `None` when running in memory.
    ///
    /// # Errors
    ///
    /// Returns an error when the store is required but `store_url` or
    /// `anon_key` is missing, or a URL does not parse.
    pub fn hosted(&self) -> Result<Option<HostedSettings>, SettingsError> {
        if self.in_memory {
            return Ok(None);
        }
        let store_raw = non_blank(self.store_url.as_ref())
            .ok_or(SettingsError::Missing { name: "store_url" })?;
        let anon_key = non_blank(self.anon_key.as_ref())
            .ok_or(SettingsError::Missing { name: "anon_key" })?;
        let store_url = parse_url("store_url", store_raw)?;
        let auth_url = match non_blank(self.auth_url.as_ref()) {
            Some(raw) => parse_url("auth_url", raw)?,
            None => store_url.clone(),
        };
        let service_key =
            non_blank(self.service_key.as_ref()).map(|key| Zeroizing::new(key.to_owned()));
        if service_key.is_none() {
            warn!("no service key configured; privileged store retries are disabled");
        }
        Ok(Some(HostedSettings {
            store_url,
            auth_url,
            anon_key: Zeroizing::new(anon_key.to_owned()),
            service_key,
            timeout: Duration::from_secs(
                self.store_timeout_secs.unwrap_or(DEFAULT_STORE_TIMEOUT_SECS),
            ),
        }))
    }

    /// Image generation settings, or `None` when generation is disabled.
    ///
    /// # Errors
    ///
    /// Returns an error when the endpoint is set without a key or does not
    /// parse.
    pub fn generation(&self) -> Result<Option<GenerationSettings>, SettingsError> {
        let Some(endpoint) = non_blank(self.ai_endpoint.as_ref()) else {
            return Ok(None);
        };
        let api_key =
            non_blank(self.ai_key.as_ref()).ok_or(SettingsError::Missing { name: "ai_key" })?;
        Ok(Some(GenerationSettings {
            endpoint: parse_url("ai_endpoint", endpoint)?,
            api_key: Zeroizing::new(api_key.to_owned()),
        }))
    }

    /// Cookie session settings for `mode`.
    ///
    /// # Errors
    ///
    /// Release builds fail when the key file is missing or shorter than 64
    /// bytes, when `same_site` is invalid, or when `None` is combined with an
    /// insecure cookie.
    pub fn session(&self, mode: BuildMode) -> Result<SessionSettings, SettingsError> {
        let same_site = self.same_site(mode)?;
        let path = self
            .session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(SESSION_KEY_DEFAULT_PATH));
        Ok(SessionSettings {
            key: session_key(&path, mode)?,
            cookie_secure: self.cookie_secure,
            same_site,
        })
    }

    fn same_site(&self, mode: BuildMode) -> Result<SameSite, SettingsError> {
        let default = if mode.is_debug() {
            SameSite::Lax
        } else {
            SameSite::Strict
        };
        let Some(raw) = self.same_site.as_deref() else {
            return Ok(default);
        };
        match raw.to_ascii_lowercase().as_str() {
            "lax" => Ok(SameSite::Lax),
            "strict" => Ok(SameSite::Strict),
            "none" if self.cookie_secure => Ok(SameSite::None),
            "none" if mode.is_debug() => {
                warn!("same_site=None with insecure cookies; browsers may reject them");
                Ok(SameSite::None)
            }
            "none" => Err(SettingsError::InsecureSameSiteNone),
            _ if mode.is_debug() => {
                warn!(value = %raw, "invalid same_site, using default");
                Ok(default)
            }
            _ => Err(SettingsError::Invalid {
                name: "same_site",
                value: raw.to_owned(),
                expected: "Strict|Lax|None",
            }),
        }
    }
}

fn session_key(path: &Path, mode: BuildMode) -> Result<Key, SettingsError> {
    match std::fs::read(path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            if length < SESSION_KEY_MIN_LEN && !mode.is_debug() {
                bytes.zeroize();
                return Err(SettingsError::KeyTooShort {
                    path: path.to_path_buf(),
                    length,
                    min_len: SESSION_KEY_MIN_LEN,
                });
            }
            let key = Key::derive_from(&bytes);
            bytes.zeroize();
            Ok(key)
        }
        Err(error) if mode.is_debug() => {
            warn!(
                path = %path.display(),
                error = %error,
                "using temporary session key (dev only)"
            );
            Ok(Key::generate())
        }
        Err(source) => Err(SettingsError::KeyRead {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing and validation.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;
    use tempfile::NamedTempFile;

    const VARS: [&str; 8] = [
        "PAWPRINT_BIND_ADDR",
        "PAWPRINT_STORE_URL",
        "PAWPRINT_ANON_KEY",
        "PAWPRINT_SERVICE_KEY",
        "PAWPRINT_IN_MEMORY",
        "PAWPRINT_CACHE_CAPACITY",
        "PAWPRINT_AI_ENDPOINT",
        "PAWPRINT_SAME_SITE",
    ];

    fn load_with(overrides: &[(&str, &str)]) -> AppSettings {
        let vars = VARS.map(|name| {
            let value = overrides
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_owned());
            (name, value)
        });
        let _guard = lock_env(vars);
        AppSettings::load_from_iter([OsString::from("pawprint")]).expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let settings = load_with(&[]);
        assert_eq!(settings.bind_addr().expect("addr").port(), 8080);
        assert!(settings.cookie_secure);
        assert!(!settings.in_memory);
        let bounds = settings.cache_bounds();
        assert_eq!(bounds.capacity.get(), DEFAULT_CACHE_CAPACITY);
        assert_eq!(bounds.ttl, Duration::from_secs(DEFAULT_CACHE_TTL_SECS));
        assert!(settings.generation().expect("generation").is_none());
    }

    #[rstest]
    fn hosted_store_requires_url_and_key() {
        let settings = load_with(&[("PAWPRINT_ANON_KEY", "anon")]);
        assert!(matches!(
            settings.hosted(),
            Err(SettingsError::Missing { name: "store_url" })
        ));
    }

    #[rstest]
    fn hosted_store_reuses_store_url_for_auth() {
        let settings = load_with(&[
            ("PAWPRINT_STORE_URL", "https://db.example.test/"),
            ("PAWPRINT_ANON_KEY", "anon"),
        ]);
        let hosted = settings.hosted().expect("valid").expect("hosted");
        assert_eq!(hosted.auth_url, hosted.store_url);
        assert!(hosted.service_key.is_none());
    }

    #[rstest]
    fn in_memory_mode_skips_store_settings() {
        let settings = load_with(&[("PAWPRINT_IN_MEMORY", "true")]);
        assert!(settings.hosted().expect("valid").is_none());
    }

    #[rstest]
    fn zero_capacity_falls_back_to_default() {
        let settings = load_with(&[("PAWPRINT_CACHE_CAPACITY", "0")]);
        assert_eq!(settings.cache_bounds().capacity.get(), DEFAULT_CACHE_CAPACITY);
    }

    #[rstest]
    fn generation_endpoint_requires_key() {
        let settings =
            load_with(&[("PAWPRINT_AI_ENDPOINT", "https://ai.example.test/v1/images")]);
        assert!(matches!(
            settings.generation(),
            Err(SettingsError::Missing { name: "ai_key" })
        ));
    }

    #[rstest]
    #[case(BuildMode::Debug, true)]
    #[case(BuildMode::Release, false)]
    fn missing_key_file_is_only_tolerated_in_debug(#[case] mode: BuildMode, #[case] ok: bool) {
        let mut settings = load_with(&[]);
        settings.session_key_file = Some(PathBuf::from("/nonexistent/pawprint/session_key"));
        assert_eq!(settings.session(mode).is_ok(), ok);
    }

    #[rstest]
    fn short_key_is_rejected_in_release() {
        let file = NamedTempFile::new().expect("temp file");
        std::fs::write(file.path(), [b'k'; 16]).expect("write key");
        let mut settings = load_with(&[]);
        settings.session_key_file = Some(file.path().to_path_buf());
        assert!(matches!(
            settings.session(BuildMode::Release),
            Err(SettingsError::KeyTooShort { length: 16, .. })
        ));
        assert!(settings.session(BuildMode::Debug).is_ok());
    }

    #[rstest]
    #[case("strict", BuildMode::Release, Some(SameSite::Strict))]
    #[case("None", BuildMode::Release, Some(SameSite::None))]
    #[case("sideways", BuildMode::Debug, Some(SameSite::Lax))]
    #[case("sideways", BuildMode::Release, None)]
    fn same_site_is_validated(
        #[case] raw: &str,
        #[case] mode: BuildMode,
        #[case] expected: Option<SameSite>,
    ) {
        let mut settings = load_with(&[]);
        settings.cookie_secure = true;
        settings.same_site = Some(raw.to_owned());
        assert_eq!(settings.same_site(mode).ok(), expected);
    }
}
