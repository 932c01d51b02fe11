//! Policy data model
//!
//! A policy assigns an Allow or Deny effect to combinations of subjects,
//! actions and resources. Each of the three attribute lists holds templates
//! that are either literal values or wildcard patterns; an optional list of
//! conditions additionally gates the policy on the request context.

use serde::{Deserialize, Serialize};

use crate::condition::ConditionExpr;

/// Effect of a policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Allow matching requests
    Allow,
    /// Deny matching requests (takes precedence over Allow)
    Deny,
}

/// Input for creating or replacing a policy: all policy fields minus the id
///
/// The store assigns the id when the draft is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyDraft {
    /// Free-text description
    #[serde(default)]
    pub description: String,

    /// Subject templates this policy applies to
    pub subjects: Vec<String>,

    /// Action templates this policy applies to
    pub actions: Vec<String>,

    /// Resource templates this policy applies to
    pub resources: Vec<String>,

    /// Conditions that must all hold; may be empty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<ConditionExpr>,

    /// Whether matching requests are allowed or denied
    pub effect: Effect,
}

/// A stored access control rule
///
/// The id is assigned by the store on creation and never changes; a policy
/// is mutated only by full replacement under the same id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    /// Unique id, assigned by the store
    pub id: String,
    /// Free-text description
    pub description: String,
    /// Subject templates this policy applies to
    pub subjects: Vec<String>,
    /// Action templates this policy applies to
    pub actions: Vec<String>,
    /// Resource templates this policy applies to
    pub resources: Vec<String>,
    /// Conditions that must all hold; may be empty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<ConditionExpr>,
    /// Whether matching requests are allowed or denied
    pub effect: Effect,
}

impl Policy {
    /// Build a policy from a draft and a store-assigned id
    pub fn from_draft(id: impl Into<String>, draft: PolicyDraft) -> Self {
        Policy {
            id: id.into(),
            description: draft.description,
            subjects: draft.subjects,
            actions: draft.actions,
            resources: draft.resources,
            conditions: draft.conditions,
            effect: draft.effect,
        }
    }

    /// The policy's fields without the id, e.g. as a base for a replacement
    pub fn draft(&self) -> PolicyDraft {
        PolicyDraft {
            description: self.description.clone(),
            subjects: self.subjects.clone(),
            actions: self.actions.clone(),
            resources: self.resources.clone(),
            conditions: self.conditions.clone(),
            effect: self.effect,
        }
    }
}
