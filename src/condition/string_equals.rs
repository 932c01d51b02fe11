//! Case-sensitive string equality against one context entry

use serde::{Deserialize, Serialize};

use super::Condition;
use crate::error::Result;
use crate::request::AccessRequest;

/// True when `context[key]` exists and equals the operand exactly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringEqualsCondition {
    key: String,
    value: String,
}

impl StringEqualsCondition {
    /// Condition reading `key` from the context and comparing with `value`
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        StringEqualsCondition {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl Condition for StringEqualsCondition {
    fn key(&self) -> &str {
        &self.key
    }

    fn value(&self) -> &str {
        &self.value
    }

    fn fulfills(&self, request: &AccessRequest) -> Result<bool> {
        if self.key.is_empty() {
            return Ok(false);
        }
        Ok(request
            .context
            .get(&self.key)
            .map_or(false, |entry| entry == &self.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_value_fulfills() {
        let condition = StringEqualsCondition::new("department", "finance");
        let request = AccessRequest::new("user:1", "read", "ledger")
            .with_context("department", "finance");

        assert!(condition.fulfills(&request).unwrap());
    }

    #[test]
    fn test_differing_value_fails() {
        let condition = StringEqualsCondition::new("department", "finance");
        let request = AccessRequest::new("user:1", "read", "ledger")
            .with_context("department", "Finance");

        assert!(!condition.fulfills(&request).unwrap());
    }

    #[test]
    fn test_missing_key_fails() {
        let condition = StringEqualsCondition::new("department", "finance");
        let request = AccessRequest::new("user:1", "read", "ledger");

        assert!(!condition.fulfills(&request).unwrap());
    }

    #[test]
    fn test_empty_key_fails() {
        let condition = StringEqualsCondition::new("", "finance");
        let request =
            AccessRequest::new("user:1", "read", "ledger").with_context("", "finance");

        assert!(!condition.fulfills(&request).unwrap());
    }
}
