//! Durable policy store on SQLite
//!
//! Normalized schema: a policy header table, one attribute table per
//! attribute kind (subject / action / resource) keyed by a SHA-256 content
//! hash of the template, and a join table linking policies to each
//! attribute kind. Conditions are stored as a JSON document on the policy
//! row. All writes for one policy run in a single transaction; a failure
//! mid-sequence rolls the whole policy back.

use std::path::Path;

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::types::ToSql;
use rusqlite::{params, Connection, Statement, Transaction};
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use uuid::Uuid;

use super::PolicyStore;
use crate::error::{Result, WardenError};
use crate::matcher::{LikeDialect, Matcher, PatternDialect, PatternMatcher};
use crate::policy::{Effect, Policy, PolicyDraft};
use crate::request::AccessRequest;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS acl_policy (
    id          TEXT NOT NULL PRIMARY KEY,
    description TEXT NOT NULL,
    effect      INTEGER NOT NULL,
    conditions  TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS acl_subject (
    id          TEXT NOT NULL PRIMARY KEY,
    template    TEXT NOT NULL UNIQUE,
    compiled    TEXT NOT NULL,
    has_pattern INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS acl_action (
    id          TEXT NOT NULL PRIMARY KEY,
    template    TEXT NOT NULL UNIQUE,
    compiled    TEXT NOT NULL,
    has_pattern INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS acl_resource (
    id          TEXT NOT NULL PRIMARY KEY,
    template    TEXT NOT NULL UNIQUE,
    compiled    TEXT NOT NULL,
    has_pattern INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS acl_policy_subject (
    policy  TEXT NOT NULL REFERENCES acl_policy(id) ON DELETE CASCADE,
    subject TEXT NOT NULL REFERENCES acl_subject(id) ON DELETE CASCADE,
    PRIMARY KEY (policy, subject)
);
CREATE TABLE IF NOT EXISTS acl_policy_action (
    policy TEXT NOT NULL REFERENCES acl_policy(id) ON DELETE CASCADE,
    action TEXT NOT NULL REFERENCES acl_action(id) ON DELETE CASCADE,
    PRIMARY KEY (policy, action)
);
CREATE TABLE IF NOT EXISTS acl_policy_resource (
    policy   TEXT NOT NULL REFERENCES acl_policy(id) ON DELETE CASCADE,
    resource TEXT NOT NULL REFERENCES acl_resource(id) ON DELETE CASCADE,
    PRIMARY KEY (policy, resource)
);
CREATE INDEX IF NOT EXISTS acl_subject_template_idx ON acl_subject(template);
CREATE INDEX IF NOT EXISTS acl_resource_template_idx ON acl_resource(template);
";

/// Joined view over a policy and its attribute templates; one row per
/// subject x action x resource combination.
const SELECT_POLICIES: &str = "
SELECT p.id, p.description, p.effect, p.conditions,
       s.template AS subject, a.template AS action, r.template AS resource
FROM acl_policy AS p
LEFT JOIN acl_policy_subject  AS ps ON ps.policy = p.id
LEFT JOIN acl_subject         AS s  ON s.id = ps.subject
LEFT JOIN acl_policy_action   AS pa ON pa.policy = p.id
LEFT JOIN acl_action          AS a  ON a.id = pa.action
LEFT JOIN acl_policy_resource AS pr ON pr.policy = p.id
LEFT JOIN acl_resource        AS r  ON r.id = pr.resource
";

/// Policy store backed by a single SQLite database
///
/// The connection is serialized through one mutex; no lock is held across
/// an await point. The matcher dialect is SQL LIKE, matching the
/// templates the candidate query pre-filters on.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    matcher: PatternMatcher<LikeDialect>,
}

impl SqliteStore {
    /// Open (or create) a store at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Fully in-memory store; the database vanishes on drop
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", true)?;
        conn.execute_batch(SCHEMA)?;
        info!("policy schema ready");
        Ok(SqliteStore {
            conn: Mutex::new(conn),
            matcher: PatternMatcher::new(),
        })
    }
}

#[async_trait]
impl PolicyStore for SqliteStore {
    fn matcher(&self) -> &dyn Matcher {
        &self.matcher
    }

    async fn add_policy(&self, draft: PolicyDraft) -> Result<Policy> {
        let policy = Policy::from_draft(Uuid::new_v4().to_string(), draft);
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        insert_policy(&tx, &policy)?;
        tx.commit()?;
        debug!(id = %policy.id, "policy stored");
        Ok(policy)
    }

    async fn update_policy(&self, policy: Policy) -> Result<Policy> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let removed = tx.execute("DELETE FROM acl_policy WHERE id = ?1", params![policy.id])?;
        if removed == 0 {
            // Dropping the transaction rolls the delete back.
            return Err(WardenError::PolicyNotFound(policy.id));
        }
        insert_policy(&tx, &policy)?;
        tx.commit()?;
        debug!(id = %policy.id, "policy replaced");
        Ok(policy)
    }

    async fn policy_by_id(&self, id: &str) -> Result<Policy> {
        let conn = self.conn.lock();
        let sql = format!("{SELECT_POLICIES} WHERE p.id = ?1");
        let mut stmt = conn.prepare(&sql)?;
        let policies = collect_policies(&mut stmt, &[&id])?;
        policies
            .into_iter()
            .next()
            .ok_or_else(|| WardenError::PolicyNotFound(id.to_string()))
    }

    async fn delete_policy(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let removed = conn.execute("DELETE FROM acl_policy WHERE id = ?1", params![id])?;
        debug!(id, removed, "delete policy");
        Ok(removed > 0)
    }

    async fn all_policies(&self) -> Result<Vec<Policy>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(SELECT_POLICIES)?;
        collect_policies(&mut stmt, &[])
    }

    async fn request_candidates(&self, request: &AccessRequest) -> Result<Vec<Policy>> {
        // SQLite's LIKE cannot evaluate bracketed character classes, so
        // pattern templates are kept wholesale instead of being tested in
        // SQL. The result stays a superset; the engine re-checks every
        // attribute anyway. Action is never part of the pre-filter.
        let conn = self.conn.lock();
        if request.resource.is_empty() {
            let sql =
                format!("{SELECT_POLICIES} WHERE s.has_pattern = 1 OR s.template = ?1");
            let mut stmt = conn.prepare(&sql)?;
            collect_policies(&mut stmt, &[&request.subject])
        } else {
            let sql = format!(
                "{SELECT_POLICIES} WHERE (s.has_pattern = 1 OR s.template = ?1) \
                 AND (r.has_pattern = 1 OR r.template = ?2)"
            );
            let mut stmt = conn.prepare(&sql)?;
            collect_policies(&mut stmt, &[&request.subject, &request.resource])
        }
    }
}

/// Insert a policy row plus its attribute and join rows
fn insert_policy(tx: &Transaction<'_>, policy: &Policy) -> Result<()> {
    let conditions = if policy.conditions.is_empty() {
        String::new()
    } else {
        serde_json::to_string(&policy.conditions)?
    };
    tx.execute(
        "INSERT INTO acl_policy (id, description, effect, conditions) VALUES (?1, ?2, ?3, ?4)",
        params![
            policy.id,
            policy.description,
            effect_to_bit(policy.effect),
            conditions
        ],
    )?;

    let kinds: [(&str, &[String]); 3] = [
        ("subject", &policy.subjects),
        ("action", &policy.actions),
        ("resource", &policy.resources),
    ];
    for (kind, templates) in kinds {
        for template in templates {
            let attr_id = content_hash(template);
            tx.execute(
                &format!(
                    "INSERT OR IGNORE INTO acl_{kind} (id, template, compiled, has_pattern) \
                     VALUES (?1, ?2, ?3, ?4)"
                ),
                params![attr_id, template, template, LikeDialect.is_pattern(template)],
            )?;
            tx.execute(
                &format!(
                    "INSERT OR IGNORE INTO acl_policy_{kind} (policy, {kind}) VALUES (?1, ?2)"
                ),
                params![policy.id, attr_id],
            )?;
        }
    }
    Ok(())
}

/// Fold joined rows back into policies, deduplicating the attribute lists
/// the join fanned out.
fn collect_policies(stmt: &mut Statement<'_>, params: &[&dyn ToSql]) -> Result<Vec<Policy>> {
    let mut policies: Vec<Policy> = Vec::new();
    let mut rows = stmt.query(params)?;
    while let Some(row) = rows.next()? {
        let id: String = row.get(0)?;
        let subject: Option<String> = row.get(4)?;
        let action: Option<String> = row.get(5)?;
        let resource: Option<String> = row.get(6)?;

        if let Some(policy) = policies.iter_mut().find(|policy| policy.id == id) {
            push_unique(&mut policy.subjects, subject);
            push_unique(&mut policy.actions, action);
            push_unique(&mut policy.resources, resource);
        } else {
            let conditions_json: String = row.get(3)?;
            let conditions = if conditions_json.is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&conditions_json)?
            };
            let mut policy = Policy {
                id,
                description: row.get(1)?,
                subjects: Vec::new(),
                actions: Vec::new(),
                resources: Vec::new(),
                conditions,
                effect: bit_to_effect(row.get(2)?),
            };
            push_unique(&mut policy.subjects, subject);
            push_unique(&mut policy.actions, action);
            push_unique(&mut policy.resources, resource);
            policies.push(policy);
        }
    }
    Ok(policies)
}

fn push_unique(list: &mut Vec<String>, value: Option<String>) {
    if let Some(value) = value {
        if !list.contains(&value) {
            list.push(value);
        }
    }
}

fn effect_to_bit(effect: Effect) -> i64 {
    match effect {
        Effect::Allow => 1,
        Effect::Deny => 0,
    }
}

fn bit_to_effect(bit: i64) -> Effect {
    if bit == 1 {
        Effect::Allow
    } else {
        Effect::Deny
    }
}

/// Hex SHA-256 of a template, used as its attribute row id
fn content_hash(template: &str) -> String {
    let digest = Sha256::digest(template.as_bytes());
    digest.iter().map(|byte| format!("{byte:02x}")).collect()
}
