//! Policy store contract, exercised against both implementations
//!
//! Every store has to honor the same CRUD semantics and return candidate
//! sets that are supersets of the true matches: filtered by subject and
//! resource, never by action.

use anyhow::Result;
use uuid::Uuid;
use warden::{
    AccessRequest, CidrCondition, Effect, MemoryStore, Policy, PolicyDraft, PolicyStore,
    SqliteStore, StringEqualsCondition, WardenError,
};

fn creation_draft() -> PolicyDraft {
    PolicyDraft {
        description: String::new(),
        subjects: vec!["user:2".to_string(), "user:3".to_string()],
        actions: vec!["read".to_string(), "write".to_string()],
        resources: vec!["qwertz".to_string()],
        conditions: vec![
            StringEqualsCondition::new("testkey", "testvalue").into(),
            CidrCondition::new("192.168.0.1/16").into(),
        ],
        effect: Effect::Allow,
    }
}

fn replacement_draft() -> PolicyDraft {
    PolicyDraft {
        description: String::new(),
        subjects: vec!["user:1".to_string()],
        actions: vec!["read".to_string(), "add_permissions".to_string()],
        resources: vec!["abc".to_string()],
        conditions: Vec::new(),
        effect: Effect::Deny,
    }
}

fn normalized(policy: &Policy) -> Policy {
    let mut policy = policy.clone();
    policy.subjects.sort();
    policy.actions.sort();
    policy.resources.sort();
    policy
}

async fn assert_store_contract<S: PolicyStore>(store: S) -> Result<()> {
    // Creation assigns a parseable unique id and keeps the draft intact.
    let created = store.add_policy(creation_draft()).await?;
    assert!(Uuid::parse_str(&created.id).is_ok());
    assert_eq!(normalized(&created).draft(), {
        let mut draft = creation_draft();
        draft.subjects.sort();
        draft.actions.sort();
        draft.resources.sort();
        draft
    });

    // Read-by-id round-trips, including conditions.
    let fetched = store.policy_by_id(&created.id).await?;
    assert_eq!(normalized(&fetched), normalized(&created));

    // Unknown ids are a not-found error, not an empty result.
    let missing = store.policy_by_id("no-such-policy").await;
    assert!(matches!(missing, Err(WardenError::PolicyNotFound(_))));

    // Update replaces the whole policy under the same id.
    let replacement = Policy::from_draft(created.id.clone(), replacement_draft());
    let updated = store.update_policy(replacement.clone()).await?;
    assert_eq!(normalized(&updated), normalized(&replacement));
    let fetched = store.policy_by_id(&created.id).await?;
    assert_eq!(normalized(&fetched), normalized(&replacement));

    // Updating an unknown id fails without creating anything.
    let orphan = Policy::from_draft("1234", replacement_draft());
    let result = store.update_policy(orphan).await;
    assert!(matches!(result, Err(WardenError::PolicyNotFound(_))));

    // Listing sees every stored policy.
    let second = store.add_policy(creation_draft()).await?;
    assert_eq!(store.all_policies().await?.len(), 2);

    // Delete reports whether something was removed, exactly once.
    assert!(store.delete_policy(&second.id).await?);
    assert!(!store.delete_policy(&second.id).await?);
    assert_eq!(store.all_policies().await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn memory_store_contract() -> Result<()> {
    assert_store_contract(MemoryStore::new()).await
}

#[tokio::test]
async fn sqlite_store_contract() -> Result<()> {
    assert_store_contract(SqliteStore::open_in_memory()?).await
}

async fn assert_candidates_are_superset<S: PolicyStore>(store: S) -> Result<()> {
    for draft in [
        PolicyDraft {
            description: String::new(),
            subjects: vec!["user:2".to_string(), "user:3".to_string()],
            actions: vec!["read".to_string(), "write".to_string()],
            resources: vec!["qwertz".to_string()],
            conditions: Vec::new(),
            effect: Effect::Allow,
        },
        PolicyDraft {
            description: String::new(),
            subjects: vec!["user:1".to_string()],
            actions: vec!["read".to_string()],
            resources: vec!["abc".to_string()],
            conditions: Vec::new(),
            effect: Effect::Allow,
        },
        PolicyDraft {
            description: String::new(),
            subjects: vec!["role:2".to_string(), "user:3".to_string()],
            actions: vec!["write".to_string()],
            resources: vec!["qwertz".to_string()],
            conditions: Vec::new(),
            effect: Effect::Deny,
        },
    ] {
        store.add_policy(draft).await?;
    }

    // Both qwertz policies name user:3; the request's action is deliberately
    // one that only a single policy carries; candidates must not shrink.
    let request = AccessRequest::new("user:3", "read", "qwertz");
    let candidates = store.request_candidates(&request).await?;
    assert_eq!(candidates.len(), 2);

    // Without a resource the pre-filter falls back to subject only.
    let request = AccessRequest::new("user:1", "read", "");
    let candidates = store.request_candidates(&request).await?;
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].subjects, vec!["user:1".to_string()]);

    Ok(())
}

#[tokio::test]
async fn memory_store_candidates_are_superset() -> Result<()> {
    assert_candidates_are_superset(MemoryStore::new()).await
}

#[tokio::test]
async fn sqlite_store_candidates_are_superset() -> Result<()> {
    assert_candidates_are_superset(SqliteStore::open_in_memory()?).await
}

#[tokio::test]
async fn sqlite_keeps_pattern_subjects_in_candidate_sets() -> Result<()> {
    let store = SqliteStore::open_in_memory()?;
    for subjects in [vec!["user:%".to_string()], vec!["role:[0-5]".to_string()]] {
        store
            .add_policy(PolicyDraft {
                description: String::new(),
                subjects,
                actions: vec!["read".to_string()],
                resources: vec!["a".to_string()],
                conditions: Vec::new(),
                effect: Effect::Allow,
            })
            .await?;
    }

    // Character classes cannot be evaluated inside SQLite, so every
    // pattern row must come back for the engine to re-check.
    let request = AccessRequest::new("role:4", "read", "a");
    let candidates = store.request_candidates(&request).await?;
    assert_eq!(candidates.len(), 2);
    Ok(())
}
