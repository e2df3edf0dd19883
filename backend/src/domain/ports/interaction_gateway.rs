//! Port used by the interaction controllers to confirm optimistic changes.

use async_trait::async_trait;

use crate::domain::{DesignId, UserId};

use super::define_port_error;

/// Presence state of a toggleable relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToggleState {
    Unset,
    Set,
}

impl ToggleState {
    pub fn from_bool(set: bool) -> Self {
        if set { Self::Set } else { Self::Unset }
    }

    pub fn is_set(self) -> bool {
        matches!(self, Self::Set)
    }

    /// The opposite state.
    pub fn flipped(self) -> Self {
        match self {
            Self::Set => Self::Unset,
            Self::Unset => Self::Set,
        }
    }
}

define_port_error! {
    /// Errors raised while talking to the gallery API.
    pub enum GatewayError {
        /// The backend could not persist the change at all.
        Unavailable { message: String } =>
            "gallery backend unavailable: {message}",
        /// The request did not complete in time.
        Timeout { message: String } =>
            "gallery request timed out: {message}",
        /// The backend refused the change.
        Rejected { status: u16, message: String } =>
            "gallery request rejected with status {status}: {message}",
        /// The response did not have the expected shape.
        Decode { message: String } =>
            "gallery response could not be decoded: {message}",
    }
}

impl GatewayError {
    /// Whether the failure reflects a backend that cannot store the change,
    /// as opposed to a refusal or a slow call.
    pub fn is_persistent(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Remote confirmation of like, favourite and follow changes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InteractionGateway: Send + Sync {
    /// Toggle the like and report the server's resulting state.
    async fn toggle_like(
        &self,
        user_id: &UserId,
        design_id: &DesignId,
    ) -> Result<ToggleState, GatewayError>;

    /// Set the favourite to `desired` and report the resulting state.
    async fn set_favorite(
        &self,
        user_id: &UserId,
        design_id: &DesignId,
        desired: ToggleState,
    ) -> Result<ToggleState, GatewayError>;

    /// Set the follow edge to `desired` and report the resulting state.
    async fn set_follow(
        &self,
        follower_id: &UserId,
        followed_id: &UserId,
        desired: ToggleState,
    ) -> Result<ToggleState, GatewayError>;
}
