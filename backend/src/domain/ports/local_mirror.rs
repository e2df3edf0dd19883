//! Port for the client-side local mirror.
//!
//! The mirror is a namespaced key-value store of JSON documents holding
//! shadow copies of designs and interactions. Typed access lives in
//! [`crate::domain::MirrorStore`]; adapters only move JSON values.

use serde_json::Value;

use super::define_port_error;

/// Keys of the mirror namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MirrorKey {
    Designs,
    Likes,
    Comments,
    Follows,
    Favorites,
    TransientUserId,
}

impl MirrorKey {
    pub const ALL: [MirrorKey; 6] = [
        MirrorKey::Designs,
        MirrorKey::Likes,
        MirrorKey::Comments,
        MirrorKey::Follows,
        MirrorKey::Favorites,
        MirrorKey::TransientUserId,
    ];

    /// Fully qualified key name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Designs => "pawprint:designs",
            Self::Likes => "pawprint:likes",
            Self::Comments => "pawprint:comments",
            Self::Follows => "pawprint:follows",
            Self::Favorites => "pawprint:favorites",
            Self::TransientUserId => "pawprint:transient-user-id",
        }
    }
}

define_port_error! {
    /// Errors raised by local mirror adapters.
    pub enum LocalMirrorError {
        /// Underlying storage failed.
        Io { message: String } => "local mirror I/O failed: {message}",
        /// Stored data is not valid JSON of the expected shape.
        Corrupt { key: String, message: String } =>
            "local mirror entry {key} is corrupt: {message}",
    }
}

/// JSON key-value persistence for the local mirror.
#[cfg_attr(test, mockall::automock)]
pub trait LocalMirror: Send + Sync {
    /// Stored value for `key`, or `None` when never written.
    fn read(&self, key: MirrorKey) -> Result<Option<Value>, LocalMirrorError>;

    /// Replace the value stored under `key`.
    fn write(&self, key: MirrorKey, value: &Value) -> Result<(), LocalMirrorError>;

    /// Delete `key`. Removing an absent key succeeds.
    fn remove(&self, key: MirrorKey) -> Result<(), LocalMirrorError>;
}
