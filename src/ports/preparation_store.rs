//! Preparation Store Port - Persistence for party submissions.

use async_trait::async_trait;

use crate::domain::foundation::PartyRole;
use crate::domain::preparation::{PairingKey, PartySubmission, PreparationPair};

use super::StoreError;

/// Port for saving and loading preparation submissions.
///
/// # Contract
///
/// - Storage is keyed by `(PairingKey, PartyRole)`; `save` is an upsert and
///   the last write wins as a whole, fields are never merged.
/// - `load` returns whatever roles are stored for the key. A missing pairing
///   is an empty pair, not an error.
/// - Because [`PairingKey`] is symmetric, `load` for `(A, B)` and `(B, A)`
///   return the same pair.
#[async_trait]
pub trait PreparationStore: Send + Sync {
    /// Short name used in logs and aggregate errors.
    fn name(&self) -> &str;

    async fn save(
        &self,
        key: &PairingKey,
        role: PartyRole,
        submission: &PartySubmission,
    ) -> Result<(), StoreError>;

    async fn load(&self, key: &PairingKey) -> Result<PreparationPair, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn PreparationStore) {}
}
