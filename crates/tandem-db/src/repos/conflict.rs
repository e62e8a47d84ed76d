//! Conflict repository — detection scan, resolution, and listings.
//!
//! Detection is a post-commit side effect of create/update: the just-mutated
//! decision is compared against its siblings (see `crate::detector`) and a
//! `value_mismatch` conflict is materialized for the first divergence found,
//! unless one is already open — re-detection is suppressed to avoid duplicate
//! noise. Only the mutated decision gets the record, not the sibling.

use chrono::Utc;

use tandem_core::entities::{Decision, DecisionConflict};
use tandem_core::enums::{ConflictStatus, ConflictType, EventKind};
use tandem_core::errors::DecisionError;
use tandem_core::identity::ActorIdentity;
use tandem_core::ids::PREFIX_CONFLICT;

use crate::TandemDb;
use crate::error::StoreError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum, parse_optional_datetime, parse_optional_json};
use crate::service::DecisionService;

const SELECT_COLS: &str = "id, decision_id, conflict_type, description, status, \
     detected_at, resolved_at, resolved_by, resolution, metadata";

/// Upper bound on the sibling candidate pool per scan.
const CANDIDATE_CAP: u32 = 200;

fn row_to_conflict(row: &libsql::Row) -> Result<DecisionConflict, StoreError> {
    Ok(DecisionConflict {
        id: row.get(0)?,
        decision_id: row.get(1)?,
        conflict_type: parse_enum(&row.get::<String>(2)?)?,
        description: row.get(3)?,
        status: parse_enum(&row.get::<String>(4)?)?,
        detected_at: parse_datetime(&row.get::<String>(5)?)?,
        resolved_at: parse_optional_datetime(get_opt_string(row, 6)?.as_deref())?,
        resolved_by: get_opt_string(row, 7)?,
        resolution: get_opt_string(row, 8)?,
        metadata: parse_optional_json(get_opt_string(row, 9)?.as_deref())?,
    })
}

async fn insert_conflict(
    conn: &libsql::Connection,
    conflict: &DecisionConflict,
) -> Result<(), StoreError> {
    let metadata_text = conflict
        .metadata
        .as_ref()
        .map(std::string::ToString::to_string);
    conn.execute(
        &format!(
            "INSERT INTO decision_conflicts ({SELECT_COLS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
        ),
        libsql::params![
            conflict.id.as_str(),
            conflict.decision_id.as_str(),
            conflict.conflict_type.as_str(),
            conflict.description.as_str(),
            conflict.status.as_str(),
            conflict.detected_at.to_rfc3339(),
            conflict.resolved_at.map(|t| t.to_rfc3339()),
            conflict.resolved_by.as_deref(),
            conflict.resolution.as_deref(),
            metadata_text.as_deref()
        ],
    )
    .await?;
    Ok(())
}

impl TandemDb {
    /// All conflicts for a decision, newest detection first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails.
    pub async fn list_conflicts(
        &self,
        decision_id: &str,
        only_open: bool,
    ) -> Result<Vec<DecisionConflict>, StoreError> {
        let filter = if only_open { " AND status = 'open'" } else { "" };
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM decision_conflicts
                     WHERE decision_id = ?1{filter} ORDER BY detected_at DESC"
                ),
                [decision_id],
            )
            .await?;

        let mut conflicts = Vec::new();
        while let Some(row) = rows.next().await? {
            conflicts.push(row_to_conflict(&row)?);
        }
        Ok(conflicts)
    }

    /// The open conflict of the given type, if one exists.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails.
    pub async fn open_conflict(
        &self,
        decision_id: &str,
        conflict_type: ConflictType,
    ) -> Result<Option<DecisionConflict>, StoreError> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM decision_conflicts
                     WHERE decision_id = ?1 AND conflict_type = ?2 AND status = 'open'"
                ),
                libsql::params![decision_id, conflict_type.as_str()],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_conflict(&row)?)),
            None => Ok(None),
        }
    }

    /// One conflict by id, scoped to its decision.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails.
    pub async fn get_conflict(
        &self,
        decision_id: &str,
        conflict_id: &str,
    ) -> Result<Option<DecisionConflict>, StoreError> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM decision_conflicts
                     WHERE decision_id = ?1 AND id = ?2"
                ),
                libsql::params![decision_id, conflict_id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_conflict(&row)?)),
            None => Ok(None),
        }
    }

    /// Number of open conflicts for a decision.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails.
    pub async fn count_open_conflicts(&self, decision_id: &str) -> Result<u64, StoreError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT COUNT(*) FROM decision_conflicts WHERE decision_id = ?1 AND status = 'open'",
                [decision_id],
            )
            .await?;
        let row = rows.next().await?.ok_or(StoreError::NoResult)?;
        Ok(u64::try_from(row.get::<i64>(0)?).unwrap_or_default())
    }
}

impl DecisionService {
    /// Scan the decision's siblings for divergent values and materialize a
    /// conflict record for the first one found.
    ///
    /// Runs after the mutation's transaction commits and is best-effort: any
    /// failure is logged and swallowed, never surfaced to the caller.
    pub(crate) async fn scan_for_conflicts(&self, actor: &ActorIdentity, decision: &Decision) {
        if let Err(err) = self.try_scan(actor, decision).await {
            tracing::warn!(
                decision_id = %decision.id,
                "conflict scan failed: {err}"
            );
        }
    }

    async fn try_scan(
        &self,
        actor: &ActorIdentity,
        decision: &Decision,
    ) -> Result<(), DecisionError> {
        // Suppression: while an open value_mismatch conflict exists, nothing
        // new is recorded for this decision.
        if self
            .db()
            .open_conflict(&decision.id, ConflictType::ValueMismatch)
            .await?
            .is_some()
        {
            return Ok(());
        }

        let candidates = self
            .db()
            .find_chat_candidates(&decision.chat_id, CANDIDATE_CAP)
            .await?;
        if candidates.len() == CANDIDATE_CAP as usize {
            tracing::warn!(
                chat_id = %decision.chat_id,
                cap = CANDIDATE_CAP,
                "sibling candidate pool hit its cap; scan may be incomplete"
            );
        }

        for candidate in candidates {
            if !self.siblings().is_sibling(decision, &candidate) {
                continue;
            }
            if candidate.value == decision.value {
                continue;
            }

            let conflict = DecisionConflict {
                id: self.db().generate_id(PREFIX_CONFLICT).await?,
                decision_id: decision.id.clone(),
                conflict_type: ConflictType::ValueMismatch,
                description: format!(
                    "Decision \"{}\" holds a different value than sibling decision {}",
                    decision.title, candidate.id
                ),
                status: ConflictStatus::Open,
                detected_at: Utc::now(),
                resolved_at: None,
                resolved_by: None,
                resolution: None,
                metadata: Some(serde_json::json!({"sibling_id": candidate.id})),
            };
            insert_conflict(self.db().conn(), &conflict).await?;

            self.emit(
                actor,
                EventKind::DecisionConflictDetected,
                decision,
                serde_json::json!({
                    "conflict_id": conflict.id,
                    "sibling_id": candidate.id,
                    "conflict_type": conflict.conflict_type,
                }),
            );
            break;
        }
        Ok(())
    }

    /// Acknowledge a conflict: stamp resolver identity, time, and note.
    ///
    /// Resolution never touches the decision's value — it is an
    /// acknowledgment, not a merge.
    ///
    /// # Errors
    ///
    /// `NotFound` when the decision or the conflict under it is absent;
    /// `Validation` when the conflict is already resolved; `Storage` on
    /// database failure.
    pub async fn resolve_conflict(
        &self,
        actor: &ActorIdentity,
        decision_id: &str,
        conflict_id: &str,
        resolution_note: &str,
    ) -> Result<DecisionConflict, DecisionError> {
        let decision = self.get_decision(decision_id).await?;
        let conflict = self
            .db()
            .get_conflict(decision_id, conflict_id)
            .await?
            .ok_or_else(|| DecisionError::not_found("conflict", conflict_id))?;

        if conflict.status == ConflictStatus::Resolved {
            return Err(DecisionError::validation(
                "conflict",
                format!("conflict {conflict_id} is already resolved"),
            ));
        }

        let now = Utc::now();
        self.db()
            .conn()
            .execute(
                "UPDATE decision_conflicts
                 SET status = ?1, resolved_at = ?2, resolved_by = ?3, resolution = ?4
                 WHERE id = ?5",
                libsql::params![
                    ConflictStatus::Resolved.as_str(),
                    now.to_rfc3339(),
                    actor.id.as_str(),
                    resolution_note,
                    conflict_id
                ],
            )
            .await
            .map_err(StoreError::from)?;

        let resolved = DecisionConflict {
            status: ConflictStatus::Resolved,
            resolved_at: Some(now),
            resolved_by: Some(actor.id.clone()),
            resolution: Some(resolution_note.to_string()),
            ..conflict
        };

        self.emit(
            actor,
            EventKind::DecisionConflictResolved,
            &decision,
            serde_json::json!({"conflict_id": conflict_id, "resolution": resolution_note}),
        );

        Ok(resolved)
    }

    /// All conflicts for a decision, newest detection first.
    ///
    /// # Errors
    ///
    /// `NotFound` when the decision is absent; `Storage` on database failure.
    pub async fn get_conflicts(
        &self,
        decision_id: &str,
    ) -> Result<Vec<DecisionConflict>, DecisionError> {
        self.get_decision(decision_id).await?;
        Ok(self.db().list_conflicts(decision_id, false).await?)
    }

    /// Open conflicts only, newest detection first.
    ///
    /// # Errors
    ///
    /// `NotFound` when the decision is absent; `Storage` on database failure.
    pub async fn list_open_conflicts(
        &self,
        decision_id: &str,
    ) -> Result<Vec<DecisionConflict>, DecisionError> {
        self.get_decision(decision_id).await?;
        Ok(self.db().list_conflicts(decision_id, true).await?)
    }
}
