//! # Warden - Attribute-Based Access Control
//!
//! `warden` is an embeddable authorization library: given an access request
//! (subject, action, resource, context) it decides against a set of stored
//! policies whether the request is granted, explicitly denied, or denied by
//! default.
//!
//! - **Deny-override evaluation**: one matching Deny policy beats any
//!   number of Allow matches, regardless of retrieval order
//! - **Wildcard attribute templates**: SQL LIKE syntax (`%`, `_`, `[...]`)
//!   compiled to regexes and memoized in a bounded LRU cache
//! - **Conditions**: context-based predicates (string equality, IPv4 CIDR
//!   membership), extensible through a trait
//! - **Pluggable stores**: in-memory for tests and small rule sets, SQLite
//!   for durable policies with transactional writes
//!
//! ## Quick Start
//!
//! ```
//! use warden::{AccessDecision, AccessRequest, AclEngine, Effect, MemoryStore, PolicyDraft};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> warden::Result<()> {
//! let engine = AclEngine::new(MemoryStore::new());
//!
//! engine
//!     .add_policy(PolicyDraft {
//!         description: "reporting readers".into(),
//!         subjects: vec!["user:1".into()],
//!         actions: vec!["read".into()],
//!         resources: vec!["report".into()],
//!         conditions: Vec::new(),
//!         effect: Effect::Allow,
//!     })
//!     .await?;
//!
//! let request = AccessRequest::new("user:1", "read", "report");
//! assert_eq!(engine.check_access(&request).await?, AccessDecision::Granted);
//! # Ok(())
//! # }
//! ```
//!
//! ## Evaluation
//!
//! A check runs in one direction: the store pre-filters candidate policies
//! by subject (and resource, when the request names one), the engine
//! re-checks action, subject, resource and conditions for each candidate,
//! and the matches fold into a verdict with deny precedence. An empty
//! candidate set short-circuits to the default deny.

pub mod condition;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod policy;
pub mod request;
pub mod store;

// Re-export commonly used types
pub use condition::{
    CidrCondition, Condition, ConditionExpr, StringEqualsCondition, CIDR_CONTEXT_KEY,
};
pub use engine::AclEngine;
pub use error::{Result, WardenError};
pub use matcher::{
    BoundedCache, ExactMatcher, LikeDialect, Matcher, PatternDialect, PatternMatcher,
    DEFAULT_PATTERN_CACHE_CAPACITY,
};
pub use policy::{Effect, Policy, PolicyDraft};
pub use request::{AccessDecision, AccessRequest};
pub use store::{MemoryStore, PolicyStore, SqliteStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
