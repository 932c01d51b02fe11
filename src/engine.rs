//! Access decisions with deny-override precedence
//!
//! The engine fetches candidate policies from its store, re-checks action,
//! subject, resource and conditions for each, and folds the matches into a
//! final decision. One matching Deny policy wins over any number of Allow
//! matches, regardless of the order the store returns them in; with no
//! match at all the request is denied by default.

use tracing::debug;

use crate::condition::{Condition, ConditionExpr};
use crate::error::Result;
use crate::policy::{Effect, Policy, PolicyDraft};
use crate::request::{AccessDecision, AccessRequest};
use crate::store::PolicyStore;

/// Decision engine plus pass-through policy administration
///
/// The engine holds no mutable state of its own and is safe to share
/// across threads; every evaluation is independent. Store failures
/// propagate unchanged; an errored check never degrades into a verdict.
pub struct AclEngine<S> {
    store: S,
}

impl<S: PolicyStore> AclEngine<S> {
    /// Engine on top of the given policy store
    pub fn new(store: S) -> Self {
        AclEngine { store }
    }

    /// The underlying policy store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Check whether the request is granted, explicitly denied, or denied
    /// by default
    pub async fn check_access(&self, request: &AccessRequest) -> Result<AccessDecision> {
        let candidates = self.store.request_candidates(request).await?;
        if candidates.is_empty() {
            debug!(subject = %request.subject, "no candidate policies");
            return Ok(AccessDecision::Denied);
        }
        self.decide(request, &candidates)
    }

    fn decide(&self, request: &AccessRequest, candidates: &[Policy]) -> Result<AccessDecision> {
        let matcher = self.store.matcher();
        let mut allowed = false;
        for policy in candidates {
            if !matcher.matches(&policy.actions, &request.action) {
                continue;
            }
            if !matcher.matches(&policy.subjects, &request.subject) {
                continue;
            }
            if !matcher.matches(&policy.resources, &request.resource) {
                continue;
            }
            if !passes_conditions(&policy.conditions, request)? {
                continue;
            }
            if policy.effect == Effect::Deny {
                // Nothing can override an explicit deny; stop scanning.
                debug!(policy = %policy.id, "explicit deny");
                return Ok(AccessDecision::ExplicitlyDenied);
            }
            // An Allow match must keep scanning: a later deny still wins.
            allowed = true;
        }
        Ok(if allowed {
            AccessDecision::Granted
        } else {
            AccessDecision::Denied
        })
    }

    /// Create a policy; the store assigns its id
    pub async fn add_policy(&self, draft: PolicyDraft) -> Result<Policy> {
        self.store.add_policy(draft).await
    }

    /// Replace an existing policy under its id
    pub async fn update_policy(&self, policy: Policy) -> Result<Policy> {
        self.store.update_policy(policy).await
    }

    /// Fetch one policy by id
    pub async fn policy_by_id(&self, id: &str) -> Result<Policy> {
        self.store.policy_by_id(id).await
    }

    /// Delete by id; true when a policy was removed
    pub async fn delete_policy(&self, id: &str) -> Result<bool> {
        self.store.delete_policy(id).await
    }

    /// All stored policies
    pub async fn all_policies(&self) -> Result<Vec<Policy>> {
        self.store.all_policies().await
    }
}

/// Every condition must hold; an empty list is vacuously satisfied
fn passes_conditions(conditions: &[ConditionExpr], request: &AccessRequest) -> Result<bool> {
    for condition in conditions {
        if !condition.fulfills(request)? {
            return Ok(false);
        }
    }
    Ok(true)
}
