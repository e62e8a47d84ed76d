//! Version ledger — append-only value snapshots, history reads, revert.
//!
//! The ledger records whatever is currently true of the decision, attributed
//! to the given actor and reason. Reverting is not a ledger primitive:
//! `revert_decision` reads the target snapshot and runs it through the normal
//! update path, producing a new version number and a fresh entry. History is
//! never rewound or deleted.

use tandem_core::entities::DecisionVersion;
use tandem_core::errors::DecisionError;
use tandem_core::identity::ActorIdentity;
use tandem_core::responses::DecisionView;

use crate::TandemDb;
use crate::error::StoreError;
use crate::helpers::{parse_datetime, parse_optional_json, parse_value};
use crate::service::DecisionService;
use crate::updates::decision::DecisionUpdateBuilder;

const SELECT_COLS: &str =
    "decision_id, version_number, value, changed_by, changed_at, reason, metadata";

fn row_to_version(row: &libsql::Row) -> Result<DecisionVersion, StoreError> {
    Ok(DecisionVersion {
        decision_id: row.get(0)?,
        version_number: row.get(1)?,
        value: parse_value(&row.get::<String>(2)?)?,
        changed_by: row.get(3)?,
        changed_at: parse_datetime(&row.get::<String>(4)?)?,
        reason: row.get(5)?,
        metadata: parse_optional_json(row.get::<Option<String>>(6)?.as_deref())?,
    })
}

/// Whether a ledger entry already exists for `(decision_id, version_number)`.
pub(crate) async fn version_exists(
    conn: &libsql::Connection,
    decision_id: &str,
    version_number: i64,
) -> Result<bool, StoreError> {
    let mut rows = conn
        .query(
            "SELECT 1 FROM decision_versions WHERE decision_id = ?1 AND version_number = ?2",
            libsql::params![decision_id, version_number],
        )
        .await?;
    Ok(rows.next().await?.is_some())
}

pub(crate) async fn insert_version(
    conn: &libsql::Connection,
    version: &DecisionVersion,
) -> Result<(), StoreError> {
    let value_text =
        serde_json::to_string(&version.value).map_err(|e| StoreError::Other(e.into()))?;
    let metadata_text = version
        .metadata
        .as_ref()
        .map(std::string::ToString::to_string);
    conn.execute(
        &format!(
            "INSERT INTO decision_versions ({SELECT_COLS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
        ),
        libsql::params![
            version.decision_id.as_str(),
            version.version_number,
            value_text.as_str(),
            version.changed_by.as_str(),
            version.changed_at.to_rfc3339(),
            version.reason.as_str(),
            metadata_text.as_deref()
        ],
    )
    .await?;
    Ok(())
}

impl TandemDb {
    /// All ledger entries for a decision, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails.
    pub async fn list_versions(
        &self,
        decision_id: &str,
    ) -> Result<Vec<DecisionVersion>, StoreError> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM decision_versions
                     WHERE decision_id = ?1 ORDER BY version_number DESC"
                ),
                [decision_id],
            )
            .await?;

        let mut versions = Vec::new();
        while let Some(row) = rows.next().await? {
            versions.push(row_to_version(&row)?);
        }
        Ok(versions)
    }

    /// One ledger entry, or `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails.
    pub async fn get_version(
        &self,
        decision_id: &str,
        version_number: i64,
    ) -> Result<Option<DecisionVersion>, StoreError> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM decision_versions
                     WHERE decision_id = ?1 AND version_number = ?2"
                ),
                libsql::params![decision_id, version_number],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_version(&row)?)),
            None => Ok(None),
        }
    }
}

impl DecisionService {
    /// Version history, newest first.
    ///
    /// Zero entries means the decision itself was never created — every
    /// decision gets version 1 at creation — so that reads as `NotFound`.
    ///
    /// # Errors
    ///
    /// `NotFound` when no history exists; `Storage` on database failure.
    pub async fn get_history(
        &self,
        decision_id: &str,
    ) -> Result<Vec<DecisionVersion>, DecisionError> {
        let versions = self.db().list_versions(decision_id).await?;
        if versions.is_empty() {
            return Err(DecisionError::not_found("decision", decision_id));
        }
        Ok(versions)
    }

    /// Replay a historical snapshot as a new version.
    ///
    /// Runs the target value through the normal update path: the lock gate
    /// and optimistic version check apply, `current_version` moves to `N+1`,
    /// and versions `1..N` stay in the ledger untouched.
    ///
    /// # Errors
    ///
    /// `NotFound` when the target version (or decision) is absent; otherwise
    /// the same errors as `update_decision`.
    pub async fn revert_decision(
        &self,
        actor: &ActorIdentity,
        decision_id: &str,
        target_version: i64,
        expected_version: Option<i64>,
    ) -> Result<DecisionView, DecisionError> {
        let snapshot = self
            .db()
            .get_version(decision_id, target_version)
            .await?
            .ok_or_else(|| {
                DecisionError::not_found(
                    "decision version",
                    format!("{decision_id} v{target_version}"),
                )
            })?;

        let mut builder = DecisionUpdateBuilder::new()
            .value(snapshot.value)
            .reason(format!("revert to version {target_version}"));
        if let Some(expected) = expected_version {
            builder = builder.expected_version(expected);
        }
        self.update_decision(actor, decision_id, builder.build())
            .await
    }
}
