//! Conditions gate a policy on the request context
//!
//! Attribute matching decides who may do what on which resource; a
//! condition additionally inspects the request's context map. Every
//! condition of a policy must hold for the policy to apply; an empty
//! condition list is vacuously satisfied.

mod cidr;
mod string_equals;

pub use cidr::{CidrCondition, CIDR_CONTEXT_KEY};
pub use string_equals::StringEqualsCondition;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::request::AccessRequest;

/// A named predicate over the request context
pub trait Condition {
    /// Context key the condition reads
    fn key(&self) -> &str;

    /// Operand the context value is compared with
    fn value(&self) -> &str;

    /// Whether the request satisfies the condition
    ///
    /// Fails with [`crate::WardenError::MalformedCondition`] when the
    /// operand cannot be interpreted; a missing context entry is an
    /// ordinary `false`.
    fn fulfills(&self, request: &AccessRequest) -> Result<bool>;
}

/// The condition variants a policy can carry
///
/// Tagged for serialization so stores can persist a policy's conditions as
/// one JSON document. New condition types plug in by implementing
/// [`Condition`] and adding an arm here; the decision engine only sees the
/// trait.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ConditionExpr {
    /// Context value equals a fixed string
    StringEquals(StringEqualsCondition),
    /// Context value is an IPv4 address inside a subnet
    CidrMatch(CidrCondition),
}

impl Condition for ConditionExpr {
    fn key(&self) -> &str {
        match self {
            ConditionExpr::StringEquals(condition) => condition.key(),
            ConditionExpr::CidrMatch(condition) => condition.key(),
        }
    }

    fn value(&self) -> &str {
        match self {
            ConditionExpr::StringEquals(condition) => condition.value(),
            ConditionExpr::CidrMatch(condition) => condition.value(),
        }
    }

    fn fulfills(&self, request: &AccessRequest) -> Result<bool> {
        match self {
            ConditionExpr::StringEquals(condition) => condition.fulfills(request),
            ConditionExpr::CidrMatch(condition) => condition.fulfills(request),
        }
    }
}

impl From<StringEqualsCondition> for ConditionExpr {
    fn from(condition: StringEqualsCondition) -> Self {
        ConditionExpr::StringEquals(condition)
    }
}

impl From<CidrCondition> for ConditionExpr {
    fn from(condition: CidrCondition) -> Self {
        ConditionExpr::CidrMatch(condition)
    }
}
