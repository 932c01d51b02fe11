//! Policy storage
//!
//! A policy store keeps the rule set and answers the engine's candidate
//! query. Candidate retrieval is a coarse pre-filter: it must return a
//! superset of the policies that fully match a request, filtered by
//! subject, narrowed by resource when the request carries one, and never
//! by action. The engine re-checks every attribute but never widens the
//! candidate set.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;

use crate::error::Result;
use crate::matcher::Matcher;
use crate::policy::{Policy, PolicyDraft};
use crate::request::AccessRequest;

/// Keeper of policies; every operation is asynchronous
///
/// Each store exposes the matcher whose dialect its candidate pre-filter
/// was built for, so pre-filtering and the engine's re-check agree on what
/// a template means.
#[async_trait]
pub trait PolicyStore: Send + Sync {
    /// Matcher matching this store's pattern dialect
    fn matcher(&self) -> &dyn Matcher;

    /// Persist a new policy; the store assigns and returns its id
    async fn add_policy(&self, draft: PolicyDraft) -> Result<Policy>;

    /// Atomically replace the policy with the id carried by `policy`
    ///
    /// Fails with [`crate::WardenError::PolicyNotFound`] when the id does
    /// not exist.
    async fn update_policy(&self, policy: Policy) -> Result<Policy>;

    /// Fetch one policy by id
    ///
    /// Fails with [`crate::WardenError::PolicyNotFound`] when the id does
    /// not exist.
    async fn policy_by_id(&self, id: &str) -> Result<Policy>;

    /// Delete by id; true when a policy was removed
    async fn delete_policy(&self, id: &str) -> Result<bool>;

    /// All stored policies
    async fn all_policies(&self) -> Result<Vec<Policy>>;

    /// Superset of the policies that could match the request
    async fn request_candidates(&self, request: &AccessRequest) -> Result<Vec<Policy>>;
}
