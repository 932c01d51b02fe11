//! Access request and decision types

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// An inquiry: may `subject` perform `action` on `resource`?
///
/// The context map carries auxiliary request data for condition evaluation,
/// e.g. the caller's address under `cidr_ip`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessRequest {
    /// Who is asking
    pub subject: String,
    /// What they want to do
    pub action: String,
    /// What they want to do it to
    pub resource: String,
    /// Auxiliary data read by conditions; may be empty
    #[serde(default)]
    pub context: HashMap<String, String>,
}

impl AccessRequest {
    /// Request without context
    pub fn new(
        subject: impl Into<String>,
        action: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        AccessRequest {
            subject: subject.into(),
            action: action.into(),
            resource: resource.into(),
            context: HashMap::new(),
        }
    }

    /// Add one context entry
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

/// Outcome of an access check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// At least one Allow policy matched and no Deny policy did
    Granted,
    /// A matching policy with effect Deny was found
    ExplicitlyDenied,
    /// No policy matched the request
    Denied,
}
