//! Driving port for design use-cases.

use async_trait::async_trait;

use crate::domain::{Caller, Design, DesignFilter, DesignId, DesignPatch, Error, NewDesign, UserId};

/// Design listing and owner mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DesignCatalogue: Send + Sync {
    /// Designs matching `filter`, newest first. Degrades to cached data and
    /// finally to an empty list; never fails.
    async fn list(&self, caller: &Caller, filter: &DesignFilter) -> Vec<Design>;

    /// One design by id.
    async fn get(&self, caller: &Caller, id: &DesignId) -> Result<Design, Error>;

    /// Persist a new design. Storage failures are reported, never masked.
    async fn create(&self, caller: &Caller, design: NewDesign) -> Result<Design, Error>;

    /// Apply an owner's patch.
    async fn update(
        &self,
        caller: &Caller,
        id: &DesignId,
        acting: &UserId,
        patch: DesignPatch,
    ) -> Result<Design, Error>;

    /// Remove a design. Removing an absent design succeeds.
    async fn delete(&self, caller: &Caller, id: &DesignId, acting: &UserId)
    -> Result<(), Error>;
}
