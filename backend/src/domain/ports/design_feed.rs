//! Port through which the client gallery reads and saves designs.

use async_trait::async_trait;

use crate::domain::{Design, DesignFilter, NewDesign};

use super::GatewayError;

/// Remote design listing and creation as seen from the client.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DesignFeed: Send + Sync {
    /// Designs matching `filter`, newest first.
    async fn list_designs(&self, filter: &DesignFilter) -> Result<Vec<Design>, GatewayError>;

    /// Persist a new design and return the stored record.
    async fn save_design(&self, design: &NewDesign) -> Result<Design, GatewayError>;
}
