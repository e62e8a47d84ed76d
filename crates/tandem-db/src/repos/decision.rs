//! Decision repository — creation, mutation, locking, and listing.

use chrono::Utc;

use tandem_core::entities::{Decision, DecisionVersion};
use tandem_core::enums::{DecisionStatus, EventKind};
use tandem_core::errors::DecisionError;
use tandem_core::identity::ActorIdentity;
use tandem_core::ids::PREFIX_DECISION;
use tandem_core::responses::{DecisionPage, DecisionView};
use tandem_core::value::DecisionValue;

use crate::TandemDb;
use crate::error::StoreError;
use crate::helpers::{get_bool_flag, get_opt_string, parse_datetime, parse_enum, parse_optional_datetime, parse_value};
use crate::repos::version::{insert_version, version_exists};
use crate::service::DecisionService;
use crate::updates::decision::DecisionUpdate;

pub(crate) const SELECT_COLS: &str = "id, chat_id, title, value, status, current_version, \
     is_locked, locked_by, locked_at, created_by, created_at, updated_at";

/// Listing limits: at least 1 row, at most 200 per page.
const LIMIT_MIN: u32 = 1;
const LIMIT_MAX: u32 = 200;

pub(crate) fn row_to_decision(row: &libsql::Row) -> Result<Decision, StoreError> {
    Ok(Decision {
        id: row.get(0)?,
        chat_id: row.get(1)?,
        title: row.get(2)?,
        value: parse_value(&row.get::<String>(3)?)?,
        status: parse_enum(&row.get::<String>(4)?)?,
        current_version: row.get(5)?,
        is_locked: get_bool_flag(row, 6)?,
        locked_by: get_opt_string(row, 7)?,
        locked_at: parse_optional_datetime(get_opt_string(row, 8)?.as_deref())?,
        created_by: row.get(9)?,
        created_at: parse_datetime(&row.get::<String>(10)?)?,
        updated_at: parse_datetime(&row.get::<String>(11)?)?,
    })
}

pub(crate) async fn insert_decision(
    conn: &libsql::Connection,
    decision: &Decision,
) -> Result<(), StoreError> {
    let value_text =
        serde_json::to_string(&decision.value).map_err(|e| StoreError::Other(e.into()))?;
    conn.execute(
        &format!(
            "INSERT INTO decisions ({SELECT_COLS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
        ),
        libsql::params![
            decision.id.as_str(),
            decision.chat_id.as_str(),
            decision.title.as_str(),
            value_text.as_str(),
            decision.status.as_str(),
            decision.current_version,
            i64::from(decision.is_locked),
            decision.locked_by.as_deref(),
            decision.locked_at.map(|t| t.to_rfc3339()),
            decision.created_by.as_str(),
            decision.created_at.to_rfc3339(),
            decision.updated_at.to_rfc3339()
        ],
    )
    .await?;
    Ok(())
}

impl TandemDb {
    /// Fetch one decision, or `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails.
    pub async fn get_decision(&self, id: &str) -> Result<Option<Decision>, StoreError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM decisions WHERE id = ?1"),
                [id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_decision(&row)?)),
            None => Ok(None),
        }
    }

    /// List a chat's decisions ordered by `updated_at` descending, plus the
    /// total count for pagination. `limit` is clamped to [1, 200].
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails.
    pub async fn list_decisions(
        &self,
        chat_id: &str,
        status: Option<DecisionStatus>,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<Decision>, u64), StoreError> {
        let limit = limit.clamp(LIMIT_MIN, LIMIT_MAX);

        let mut conditions = vec!["chat_id = ?1".to_string()];
        let mut params: Vec<libsql::Value> = vec![chat_id.into()];
        if let Some(status) = status {
            params.push(status.as_str().into());
            conditions.push(format!("status = ?{}", params.len()));
        }
        let where_clause = conditions.join(" AND ");

        let mut count_rows = self
            .conn()
            .query(
                &format!("SELECT COUNT(*) FROM decisions WHERE {where_clause}"),
                libsql::params_from_iter(params.clone()),
            )
            .await?;
        let total = count_rows
            .next()
            .await?
            .ok_or(StoreError::NoResult)?
            .get::<i64>(0)?;

        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM decisions WHERE {where_clause}
                     ORDER BY updated_at DESC LIMIT {limit} OFFSET {offset}"
                ),
                libsql::params_from_iter(params),
            )
            .await?;

        let mut decisions = Vec::new();
        while let Some(row) = rows.next().await? {
            decisions.push(row_to_decision(&row)?);
        }
        Ok((decisions, u64::try_from(total).unwrap_or_default()))
    }

    /// Candidate pool for conflict detection: every decision in the chat,
    /// capped. The sibling strategy narrows this set further.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails.
    pub async fn find_chat_candidates(
        &self,
        chat_id: &str,
        cap: u32,
    ) -> Result<Vec<Decision>, StoreError> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM decisions WHERE chat_id = ?1
                     ORDER BY created_at LIMIT {cap}"
                ),
                [chat_id],
            )
            .await?;

        let mut decisions = Vec::new();
        while let Some(row) = rows.next().await? {
            decisions.push(row_to_decision(&row)?);
        }
        Ok(decisions)
    }
}

impl DecisionService {
    /// Create a decision at version 1 and its first ledger entry, atomically.
    ///
    /// Post-commit: scans siblings for conflicts and publishes
    /// `decision_created`. Both are best-effort.
    ///
    /// # Errors
    ///
    /// `Validation` for an empty `chat_id`/`title` or a malformed value
    /// document; `Storage` on database failure.
    pub async fn create_decision(
        &self,
        actor: &ActorIdentity,
        chat_id: &str,
        title: &str,
        value: DecisionValue,
        reason: Option<&str>,
    ) -> Result<DecisionView, DecisionError> {
        if chat_id.trim().is_empty() {
            return Err(DecisionError::validation(
                "chat_id",
                "chat_id must not be empty",
            ));
        }
        if title.trim().is_empty() {
            return Err(DecisionError::validation("title", "title must not be empty"));
        }
        value.validate_new()?;

        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_DECISION).await?;

        let decision = Decision {
            id: id.clone(),
            chat_id: chat_id.to_string(),
            title: title.to_string(),
            value,
            status: DecisionStatus::Open,
            current_version: 1,
            is_locked: false,
            locked_by: None,
            locked_at: None,
            created_by: actor.id.clone(),
            created_at: now,
            updated_at: now,
        };
        let first = DecisionVersion {
            decision_id: id.clone(),
            version_number: 1,
            value: decision.value.clone(),
            changed_by: actor.id.clone(),
            changed_at: now,
            reason: reason.unwrap_or("initial").to_string(),
            metadata: None,
        };

        let tx = self.db().begin().await?;
        insert_decision(&tx, &decision).await?;
        insert_version(&tx, &first).await?;
        tx.commit().await.map_err(StoreError::from)?;

        self.scan_for_conflicts(actor, &decision).await;
        self.emit(
            actor,
            EventKind::DecisionCreated,
            &decision,
            serde_json::json!({"title": decision.title, "version": 1}),
        );

        let open_conflicts = self.db().count_open_conflicts(&decision.id).await?;
        Ok(DecisionView {
            decision,
            open_conflicts,
        })
    }

    /// Fetch one decision.
    ///
    /// # Errors
    ///
    /// `NotFound` when absent; `Storage` on database failure.
    pub async fn get_decision(&self, decision_id: &str) -> Result<Decision, DecisionError> {
        self.db()
            .get_decision(decision_id)
            .await?
            .ok_or_else(|| DecisionError::not_found("decision", decision_id))
    }

    /// Apply a patch to a decision, bumping `current_version` by exactly 1
    /// and appending the new snapshot to the ledger, atomically.
    ///
    /// Sequencing: not-found → lock gate → optimistic version check →
    /// options re-validation → transaction. Post-commit: conflict scan and
    /// `decision_updated` event, both best-effort.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Locked`, `VersionConflict` (carrying expected and actual
    /// version numbers), `Validation`, `DuplicateVersion`, or `Storage`.
    pub async fn update_decision(
        &self,
        actor: &ActorIdentity,
        decision_id: &str,
        update: DecisionUpdate,
    ) -> Result<DecisionView, DecisionError> {
        if update.is_empty() {
            return Err(DecisionError::validation(
                "patch",
                "update must modify at least one field",
            ));
        }

        // Fresh read right before mutating — no stale cached copies.
        let current = self.get_decision(decision_id).await?;
        current.ensure_mutable_by(&actor.id)?;

        if let Some(expected) = update.expected_version {
            if expected != current.current_version {
                return Err(DecisionError::VersionConflict {
                    decision_id: current.id,
                    expected,
                    actual: current.current_version,
                });
            }
        }
        if let Some(ref value) = update.value {
            value.validate_options()?;
        }

        let now = Utc::now();
        let next_version = current.current_version + 1;

        let mut updated = current;
        if let Some(ref title) = update.title {
            updated.title.clone_from(title);
        }
        if let Some(ref value) = update.value {
            updated.value = value.clone();
        }
        updated.current_version = next_version;
        updated.updated_at = now;

        let entry = DecisionVersion {
            decision_id: updated.id.clone(),
            version_number: next_version,
            value: updated.value.clone(),
            changed_by: actor.id.clone(),
            changed_at: now,
            reason: update.reason.clone().unwrap_or_else(|| "update".to_string()),
            metadata: None,
        };

        let tx = self.db().begin().await?;
        if version_exists(&tx, &updated.id, next_version).await? {
            // Dropping the transaction rolls it back.
            return Err(DecisionError::DuplicateVersion {
                decision_id: updated.id,
                version: next_version,
            });
        }

        let mut sets = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();
        let mut idx = 1usize;

        if let Some(ref title) = update.title {
            sets.push(format!("title = ?{idx}"));
            params.push(title.clone().into());
            idx += 1;
        }
        if update.value.is_some() {
            let value_text = serde_json::to_string(&updated.value)
                .map_err(|e| StoreError::Other(e.into()))?;
            sets.push(format!("value = ?{idx}"));
            params.push(value_text.into());
            idx += 1;
        }
        sets.push(format!("current_version = ?{idx}"));
        params.push(next_version.into());
        idx += 1;
        sets.push(format!("updated_at = ?{idx}"));
        params.push(now.to_rfc3339().into());
        idx += 1;

        params.push(updated.id.clone().into());
        let sql = format!("UPDATE decisions SET {} WHERE id = ?{idx}", sets.join(", "));
        tx.execute(&sql, libsql::params_from_iter(params))
            .await
            .map_err(StoreError::from)?;

        insert_version(&tx, &entry).await?;
        tx.commit().await.map_err(StoreError::from)?;

        self.scan_for_conflicts(actor, &updated).await;
        self.emit(
            actor,
            EventKind::DecisionUpdated,
            &updated,
            serde_json::to_value(&update).unwrap_or(serde_json::Value::Null),
        );

        let open_conflicts = self.db().count_open_conflicts(&updated.id).await?;
        Ok(DecisionView {
            decision: updated,
            open_conflicts,
        })
    }

    /// Acquire the advisory lock. Re-acquiring by the current holder succeeds
    /// and refreshes `locked_at`. Locks gate writes only — reads, history,
    /// and conflict listings are never blocked.
    ///
    /// # Errors
    ///
    /// `NotFound`, `AlreadyLocked` (held by a different actor), or `Storage`.
    pub async fn lock_decision(
        &self,
        actor: &ActorIdentity,
        decision_id: &str,
        reason: Option<&str>,
    ) -> Result<Decision, DecisionError> {
        let current = self.get_decision(decision_id).await?;
        current.ensure_lockable_by(&actor.id)?;

        let now = Utc::now();
        self.db()
            .conn()
            .execute(
                "UPDATE decisions SET is_locked = 1, locked_by = ?1, locked_at = ?2, status = ?3
                 WHERE id = ?4",
                libsql::params![
                    actor.id.as_str(),
                    now.to_rfc3339(),
                    DecisionStatus::Locked.as_str(),
                    decision_id
                ],
            )
            .await
            .map_err(StoreError::from)?;

        let locked = Decision {
            status: DecisionStatus::Locked,
            is_locked: true,
            locked_by: Some(actor.id.clone()),
            locked_at: Some(now),
            ..current
        };

        self.emit(
            actor,
            EventKind::DecisionLocked,
            &locked,
            serde_json::json!({"locked_by": actor.id, "reason": reason}),
        );

        Ok(locked)
    }

    /// Release the advisory lock and reopen the decision.
    ///
    /// Deliberately permissive: any authenticated actor may release a lock
    /// they do not hold (availability over strict ownership). Substitute a
    /// holder check here for the strict variant.
    ///
    /// # Errors
    ///
    /// `NotFound` or `Storage`.
    pub async fn unlock_decision(
        &self,
        actor: &ActorIdentity,
        decision_id: &str,
    ) -> Result<Decision, DecisionError> {
        let current = self.get_decision(decision_id).await?;
        let previous_holder = current.lock_holder().map(String::from);

        self.db()
            .conn()
            .execute(
                "UPDATE decisions SET is_locked = 0, locked_by = NULL, locked_at = NULL, status = ?1
                 WHERE id = ?2",
                libsql::params![DecisionStatus::Open.as_str(), decision_id],
            )
            .await
            .map_err(StoreError::from)?;

        let unlocked = Decision {
            status: DecisionStatus::Open,
            is_locked: false,
            locked_by: None,
            locked_at: None,
            ..current
        };

        self.emit(
            actor,
            EventKind::DecisionUnlocked,
            &unlocked,
            serde_json::json!({"unlocked_by": actor.id, "previous_holder": previous_holder}),
        );

        Ok(unlocked)
    }

    /// List a chat's decisions, newest-updated first, with the total count.
    ///
    /// # Errors
    ///
    /// `Storage` on database failure.
    pub async fn list_decisions(
        &self,
        chat_id: &str,
        status: Option<DecisionStatus>,
        limit: u32,
        offset: u32,
    ) -> Result<DecisionPage, DecisionError> {
        let clamped = limit.clamp(LIMIT_MIN, LIMIT_MAX);
        let (decisions, total) = self
            .db()
            .list_decisions(chat_id, status, clamped, offset)
            .await?;
        Ok(DecisionPage {
            decisions,
            total,
            limit: clamped,
            offset,
        })
    }
}
