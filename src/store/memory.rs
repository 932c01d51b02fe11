//! In-memory policy store without persistence

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;
use uuid::Uuid;

use super::PolicyStore;
use crate::error::{Result, WardenError};
use crate::matcher::{ExactMatcher, Matcher};
use crate::policy::{Policy, PolicyDraft};
use crate::request::AccessRequest;

/// Mutex-guarded map of active policies
///
/// The lock is held for the duration of a map access only; attribute
/// matching never runs under it. Defaults to exact attribute matching;
/// pass a [`crate::PatternMatcher`] when stored templates carry wildcards.
pub struct MemoryStore {
    policies: Mutex<HashMap<String, Policy>>,
    matcher: Box<dyn Matcher>,
}

impl MemoryStore {
    /// Store with exact attribute matching
    pub fn new() -> Self {
        Self::with_matcher(ExactMatcher)
    }

    /// Store with a custom matcher
    pub fn with_matcher(matcher: impl Matcher + 'static) -> Self {
        MemoryStore {
            policies: Mutex::new(HashMap::new()),
            matcher: Box::new(matcher),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PolicyStore for MemoryStore {
    fn matcher(&self) -> &dyn Matcher {
        self.matcher.as_ref()
    }

    async fn add_policy(&self, draft: PolicyDraft) -> Result<Policy> {
        let policy = Policy::from_draft(Uuid::new_v4().to_string(), draft);
        debug!(id = %policy.id, "storing policy");
        self.policies
            .lock()
            .insert(policy.id.clone(), policy.clone());
        Ok(policy)
    }

    async fn update_policy(&self, policy: Policy) -> Result<Policy> {
        let mut policies = self.policies.lock();
        if !policies.contains_key(&policy.id) {
            return Err(WardenError::PolicyNotFound(policy.id.clone()));
        }
        policies.insert(policy.id.clone(), policy.clone());
        debug!(id = %policy.id, "replaced policy");
        Ok(policy)
    }

    async fn policy_by_id(&self, id: &str) -> Result<Policy> {
        self.policies
            .lock()
            .get(id)
            .cloned()
            .ok_or_else(|| WardenError::PolicyNotFound(id.to_string()))
    }

    async fn delete_policy(&self, id: &str) -> Result<bool> {
        let removed = self.policies.lock().remove(id).is_some();
        debug!(id, removed, "delete policy");
        Ok(removed)
    }

    async fn all_policies(&self) -> Result<Vec<Policy>> {
        Ok(self.policies.lock().values().cloned().collect())
    }

    async fn request_candidates(&self, request: &AccessRequest) -> Result<Vec<Policy>> {
        // Snapshot under the lock, match outside of it.
        let snapshot: Vec<Policy> = self.policies.lock().values().cloned().collect();
        Ok(snapshot
            .into_iter()
            .filter(|policy| self.matcher.matches(&policy.subjects, &request.subject))
            .filter(|policy| {
                request.resource.is_empty()
                    || self.matcher.matches(&policy.resources, &request.resource)
            })
            .collect())
    }
}
