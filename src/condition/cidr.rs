//! IPv4 subnet membership condition

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use super::Condition;
use crate::error::{Result, WardenError};
use crate::request::AccessRequest;

/// Context key the candidate address is read from
pub const CIDR_CONTEXT_KEY: &str = "cidr_ip";

/// True when the request's `cidr_ip` context entry lies inside a subnet
///
/// The operand is an IPv4 subnet in CIDR notation, e.g. `192.168.0.0/16`.
/// A malformed operand or candidate address is a configuration error and
/// fails the evaluation instead of silently denying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CidrCondition {
    value: String,
}

impl CidrCondition {
    /// Condition checking membership in the given subnet
    pub fn new(value: impl Into<String>) -> Self {
        CidrCondition {
            value: value.into(),
        }
    }
}

impl Condition for CidrCondition {
    fn key(&self) -> &str {
        CIDR_CONTEXT_KEY
    }

    fn value(&self) -> &str {
        &self.value
    }

    fn fulfills(&self, request: &AccessRequest) -> Result<bool> {
        let Some(candidate) = request.context.get(CIDR_CONTEXT_KEY) else {
            return Ok(false);
        };
        let (subnet, mask) = parse_subnet(&self.value)?;
        let candidate: Ipv4Addr = candidate.parse().map_err(|_| {
            WardenError::MalformedCondition(format!(
                "invalid IPv4 address in request context: {candidate}"
            ))
        })?;
        Ok(u32::from(candidate) & mask == u32::from(subnet) & mask)
    }
}

/// Parse `a.b.c.d/len` into the subnet address and its bit mask
fn parse_subnet(cidr: &str) -> Result<(Ipv4Addr, u32)> {
    let malformed =
        || WardenError::MalformedCondition(format!("invalid CIDR subnet: {cidr}"));
    let (addr, len) = cidr.split_once('/').ok_or_else(malformed)?;
    let addr: Ipv4Addr = addr.parse().map_err(|_| malformed())?;
    let len: u32 = len.parse().map_err(|_| malformed())?;
    if len > 32 {
        return Err(malformed());
    }
    let mask = if len == 0 { 0 } else { u32::MAX << (32 - len) };
    Ok((addr, mask))
}
