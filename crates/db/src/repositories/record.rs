use async_trait::async_trait;
use chrono::Utc;
use eyre::{Result, WrapErr};
use sqlx::PgConnection;
use timeline_core::{
    errors::{TimelineError, TimelineResult},
    models::{
        notification::{CancellationPayload, ReminderPayload},
        record::{BookedRecord, BookingRequest, Record, RecordDetails, RecordList, RecordPatch, RecordQuery},
    },
    scheduling::CutoffPolicy,
    store::RecordStore,
};
use uuid::Uuid;

use super::{PgStore, TODAY_UTC, commit};
use crate::models::{DbRecord, DbRecordDetails, DbReminder};

const RECORD_COLUMNS: &str =
    "record_id, org_id, user_id, worker_id, service_id, slot_id, reviewed, is_canceled, cancel_reason, created_at";

const REMINDER_SELECT: &str = r#"
    SELECT u.email AS user_email, sv.name AS service_name, sv.description AS service_description,
           o.name AS org_name, o.address AS org_address,
           s.date, s.session_begin, s.session_end
    FROM records r
    JOIN users u ON u.user_id = r.user_id
    JOIN services sv ON sv.service_id = r.service_id
    JOIN orgs o ON o.org_id = r.org_id
    JOIN slots s ON s.slot_id = r.slot_id
"#;

const DETAILS_SELECT: &str = r#"
    SELECT r.record_id, r.reviewed, r.is_canceled, r.cancel_reason,
           sv.name AS service_name, sv.cost AS service_cost,
           w.first_name AS worker_first_name, w.last_name AS worker_last_name,
           o.name AS org_name,
           u.first_name AS user_first_name, u.last_name AS user_last_name,
           s.date, s.session_begin, s.session_end,
           f.stars, f.feedback, r.created_at
    FROM records r
    JOIN services sv ON sv.service_id = r.service_id
    JOIN workers w ON w.worker_id = r.worker_id
    JOIN orgs o ON o.org_id = r.org_id
    JOIN users u ON u.user_id = r.user_id
    JOIN slots s ON s.slot_id = r.slot_id
    LEFT JOIN feedbacks f ON f.record_id = r.record_id
"#;

/// Whether the user and the org's service can take part in a booking.
pub async fn booking_parties_exist(conn: &mut PgConnection, request: &BookingRequest) -> Result<(bool, bool)> {
    sqlx::query_as::<_, (bool, bool)>(
        r#"
        SELECT
            EXISTS (SELECT 1 FROM users WHERE user_id = $1 AND is_delete = FALSE),
            EXISTS (SELECT 1 FROM services WHERE service_id = $2 AND org_id = $3 AND is_delete = FALSE)
        "#,
    )
    .bind(request.user_id)
    .bind(request.service_id)
    .bind(request.org_id)
    .fetch_one(&mut *conn)
    .await
    .wrap_err("failed to check booking parties")
}

/// Flips a free, future slot of the worker to busy. `None` means nothing was claimed.
///
/// Concurrent claims of one slot serialize on its row lock; the loser re-evaluates
/// `busy = FALSE` after the winner commits and matches nothing.
pub async fn claim_slot(conn: &mut PgConnection, request: &BookingRequest) -> Result<Option<Uuid>> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        UPDATE slots
        SET busy = TRUE
        WHERE slot_id = $1
          AND worker_id = $2
          AND org_id = $3
          AND busy = FALSE
          AND session_begin > now()
        RETURNING slot_id
        "#,
    )
    .bind(request.slot_id)
    .bind(request.worker_id)
    .bind(request.org_id)
    .fetch_optional(&mut *conn)
    .await
    .wrap_err("failed to claim slot")
}

pub async fn slot_exists(conn: &mut PgConnection, request: &BookingRequest) -> Result<bool> {
    sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (SELECT 1 FROM slots WHERE slot_id = $1 AND worker_id = $2 AND org_id = $3)
        "#,
    )
    .bind(request.slot_id)
    .bind(request.worker_id)
    .bind(request.org_id)
    .fetch_one(&mut *conn)
    .await
    .wrap_err("failed to look up slot")
}

pub async fn insert_record(conn: &mut PgConnection, request: &BookingRequest) -> Result<DbRecord> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!(
        "Creating record: id={}, slot_id={}, user_id={}",
        id,
        request.slot_id,
        request.user_id
    );

    sqlx::query_as::<_, DbRecord>(&format!(
        r#"
        INSERT INTO records (record_id, org_id, user_id, worker_id, service_id, slot_id, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {RECORD_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(request.org_id)
    .bind(request.user_id)
    .bind(request.worker_id)
    .bind(request.service_id)
    .bind(request.slot_id)
    .bind(now)
    .fetch_one(&mut *conn)
    .await
    .wrap_err("failed to insert record")
}

pub async fn get_reminder(conn: &mut PgConnection, record_id: Uuid) -> Result<Option<DbReminder>> {
    sqlx::query_as::<_, DbReminder>(&format!("{REMINDER_SELECT} WHERE r.record_id = $1"))
        .bind(record_id)
        .fetch_optional(&mut *conn)
        .await
        .wrap_err("failed to fetch reminder data")
}

/// Active records whose session starts within the next `window_minutes`.
pub async fn get_upcoming_reminders(conn: &mut PgConnection, window_minutes: i32) -> Result<Vec<DbReminder>> {
    sqlx::query_as::<_, DbReminder>(&format!(
        r#"
        {REMINDER_SELECT}
        WHERE r.is_canceled = FALSE
          AND s.session_begin > now()
          AND s.session_begin <= now() + make_interval(mins => $1)
        ORDER BY s.session_begin ASC
        "#
    ))
    .bind(window_minutes)
    .fetch_all(&mut *conn)
    .await
    .wrap_err("failed to fetch upcoming reminders")
}

/// Cancels an active record whose session starts after the cutoff. Returns the slot to free.
pub async fn mark_canceled(
    conn: &mut PgConnection,
    record_id: Uuid,
    reason: &str,
    buffer_minutes: i32,
) -> Result<Option<Uuid>> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        UPDATE records r
        SET is_canceled = TRUE, cancel_reason = $2
        WHERE r.record_id = $1
          AND r.is_canceled = FALSE
          AND EXISTS (
              SELECT 1 FROM slots s
              WHERE s.slot_id = r.slot_id
                AND s.session_begin > now() + make_interval(mins => $3)
          )
        RETURNING r.slot_id
        "#,
    )
    .bind(record_id)
    .bind(reason)
    .bind(buffer_minutes)
    .fetch_optional(&mut *conn)
    .await
    .wrap_err("failed to cancel record")
}

/// Removes a record whose session starts after the cutoff. Returns its slot and whether it was canceled.
pub async fn delete_record_before_cutoff(
    conn: &mut PgConnection,
    record_id: Uuid,
    buffer_minutes: i32,
) -> Result<Option<(Uuid, bool)>> {
    sqlx::query_as::<_, (Uuid, bool)>(
        r#"
        DELETE FROM records r
        WHERE r.record_id = $1
          AND EXISTS (
              SELECT 1 FROM slots s
              WHERE s.slot_id = r.slot_id
                AND s.session_begin > now() + make_interval(mins => $2)
          )
        RETURNING r.slot_id, r.is_canceled
        "#,
    )
    .bind(record_id)
    .bind(buffer_minutes)
    .fetch_optional(&mut *conn)
    .await
    .wrap_err("failed to delete record")
}

pub async fn record_exists(conn: &mut PgConnection, record_id: Uuid) -> Result<bool> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM records WHERE record_id = $1)")
        .bind(record_id)
        .fetch_one(&mut *conn)
        .await
        .wrap_err("failed to look up record")
}

pub async fn release_slot(conn: &mut PgConnection, slot_id: Uuid) -> Result<u64> {
    let result = sqlx::query("UPDATE slots SET busy = FALSE WHERE slot_id = $1 AND busy = TRUE")
        .bind(slot_id)
        .execute(&mut *conn)
        .await
        .wrap_err("failed to release slot")?;

    Ok(result.rows_affected())
}

pub async fn get_record_details(conn: &mut PgConnection, record_id: Uuid) -> Result<Option<DbRecordDetails>> {
    sqlx::query_as::<_, DbRecordDetails>(&format!("{DETAILS_SELECT} WHERE r.record_id = $1"))
        .bind(record_id)
        .fetch_optional(&mut *conn)
        .await
        .wrap_err("failed to fetch record")
}

/// `$3` selects sessions from today on (`true`) or before today (`false`).
fn list_filter() -> String {
    format!(
        r#"
    WHERE ($1::UUID IS NULL OR r.user_id = $1)
      AND ($2::UUID IS NULL OR r.org_id = $2)
      AND (($3 AND s.date >= {TODAY_UTC})
           OR (NOT $3 AND s.date < {TODAY_UTC}))
"#
    )
}

pub async fn get_records(conn: &mut PgConnection, query: &RecordQuery) -> Result<Vec<DbRecordDetails>> {
    let order = if query.fresh { "ASC" } else { "DESC" };
    sqlx::query_as::<_, DbRecordDetails>(&format!(
        "{DETAILS_SELECT} {} ORDER BY s.session_begin {order} LIMIT $4 OFFSET $5",
        list_filter()
    ))
    .bind(query.user_id)
    .bind(query.org_id)
    .bind(query.fresh)
    .bind(query.limit)
    .bind(query.offset)
    .fetch_all(&mut *conn)
    .await
    .wrap_err("failed to fetch records")
}

pub async fn count_records(conn: &mut PgConnection, query: &RecordQuery) -> Result<i64> {
    sqlx::query_scalar::<_, i64>(&format!(
        "SELECT COUNT(*) FROM records r JOIN slots s ON s.slot_id = r.slot_id {}",
        list_filter()
    ))
    .bind(query.user_id)
    .bind(query.org_id)
    .bind(query.fresh)
    .fetch_one(&mut *conn)
    .await
    .wrap_err("failed to count records")
}

pub async fn patch_record(conn: &mut PgConnection, record_id: Uuid, patch: &RecordPatch) -> Result<Option<DbRecord>> {
    sqlx::query_as::<_, DbRecord>(&format!(
        r#"
        UPDATE records
        SET user_id = COALESCE($2, user_id),
            worker_id = COALESCE($3, worker_id),
            service_id = COALESCE($4, service_id)
        WHERE record_id = $1
        RETURNING {RECORD_COLUMNS}
        "#
    ))
    .bind(record_id)
    .bind(patch.user_id)
    .bind(patch.worker_id)
    .bind(patch.service_id)
    .fetch_optional(&mut *conn)
    .await
    .wrap_err("failed to patch record")
}

fn cutoff_minutes(cutoff: CutoffPolicy) -> TimelineResult<i32> {
    i32::try_from(cutoff.buffer_minutes())
        .map_err(|_| TimelineError::Validation(format!("cutoff of {} minutes is too large", cutoff.buffer_minutes())))
}

#[async_trait]
impl RecordStore for PgStore {
    async fn book(&self, request: BookingRequest) -> TimelineResult<BookedRecord> {
        let mut tx = self.begin().await?;

        let (user_exists, service_exists) = booking_parties_exist(&mut tx, &request).await?;
        if !user_exists {
            return Err(TimelineError::NotFound(format!("user {}", request.user_id)));
        }
        if !service_exists {
            return Err(TimelineError::NotFound(format!(
                "service {} in organization {}",
                request.service_id, request.org_id
            )));
        }

        if claim_slot(&mut tx, &request).await?.is_none() {
            if slot_exists(&mut tx, &request).await? {
                return Err(TimelineError::Conflict(format!(
                    "slot {} is already taken or has started",
                    request.slot_id
                )));
            }
            return Err(TimelineError::NotFound(format!(
                "slot {} of worker {}",
                request.slot_id, request.worker_id
            )));
        }

        let record = insert_record(&mut tx, &request).await?;
        let Some(reminder) = get_reminder(&mut tx, record.record_id).await? else {
            return Err(TimelineError::InvariantViolation(format!(
                "record {} has no reminder data",
                record.record_id
            )));
        };

        commit(tx).await?;
        tracing::info!("Slot booked: slot_id={}, record_id={}", request.slot_id, record.record_id);
        Ok(BookedRecord {
            record: record.into(),
            reminder: reminder.into(),
        })
    }

    async fn cancel(&self, record_id: Uuid, reason: String, cutoff: CutoffPolicy) -> TimelineResult<CancellationPayload> {
        let minutes = cutoff_minutes(cutoff)?;
        let mut tx = self.begin().await?;

        let Some(slot_id) = mark_canceled(&mut tx, record_id, &reason, minutes).await? else {
            if record_exists(&mut tx, record_id).await? {
                return Err(TimelineError::Conflict(format!(
                    "record {record_id} is already canceled or past the cancellation cutoff"
                )));
            }
            return Err(TimelineError::NotFound(format!("record {record_id}")));
        };

        // Returning here drops the transaction, so the record stays active.
        if release_slot(&mut tx, slot_id).await? == 0 {
            return Err(TimelineError::InvariantViolation(format!(
                "slot {slot_id} of active record {record_id} was not busy"
            )));
        }

        let Some(session) = get_reminder(&mut tx, record_id).await? else {
            return Err(TimelineError::InvariantViolation(format!(
                "record {record_id} has no reminder data"
            )));
        };

        commit(tx).await?;
        tracing::info!("Record canceled: record_id={}, slot_id={}", record_id, slot_id);
        Ok(CancellationPayload {
            session: session.into(),
            cancel_reason: reason,
        })
    }

    async fn record(&self, record_id: Uuid) -> TimelineResult<RecordDetails> {
        let mut tx = self.begin().await?;
        let row = get_record_details(&mut tx, record_id).await?;
        commit(tx).await?;

        row.map(RecordDetails::from)
            .ok_or_else(|| TimelineError::NotFound(format!("record {record_id}")))
    }

    async fn records(&self, query: RecordQuery) -> TimelineResult<RecordList> {
        let mut tx = self.begin().await?;
        let rows = get_records(&mut tx, &query).await?;
        let found = count_records(&mut tx, &query).await?;
        commit(tx).await?;

        Ok(RecordList {
            list: rows.into_iter().map(RecordDetails::from).collect(),
            found,
        })
    }

    async fn patch_record(&self, record_id: Uuid, patch: RecordPatch) -> TimelineResult<Record> {
        let mut tx = self.begin().await?;
        let Some(row) = patch_record(&mut tx, record_id, &patch).await? else {
            return Err(TimelineError::NotFound(format!("record {record_id}")));
        };
        commit(tx).await?;

        tracing::info!("Record patched: record_id={}", record_id);
        Ok(row.into())
    }

    async fn delete_record(&self, record_id: Uuid, cutoff: CutoffPolicy) -> TimelineResult<()> {
        let minutes = cutoff_minutes(cutoff)?;
        let mut tx = self.begin().await?;

        let Some((slot_id, was_canceled)) = delete_record_before_cutoff(&mut tx, record_id, minutes).await? else {
            if record_exists(&mut tx, record_id).await? {
                return Err(TimelineError::Conflict(format!(
                    "record {record_id} is past the deletion cutoff"
                )));
            }
            return Err(TimelineError::NotFound(format!("record {record_id}")));
        };

        // A canceled record already gave its slot back, possibly to a newer booking.
        if !was_canceled && release_slot(&mut tx, slot_id).await? == 0 {
            return Err(TimelineError::InvariantViolation(format!(
                "slot {slot_id} of active record {record_id} was not busy"
            )));
        }

        commit(tx).await?;
        tracing::info!("Record deleted: record_id={}, slot_id={}", record_id, slot_id);
        Ok(())
    }

    async fn upcoming_reminders(&self, window_minutes: u32) -> TimelineResult<Vec<ReminderPayload>> {
        let window = i32::try_from(window_minutes)
            .map_err(|_| TimelineError::Validation(format!("reminder window of {window_minutes} minutes is too large")))?;
        let mut tx = self.begin().await?;
        let rows = get_upcoming_reminders(&mut tx, window).await?;
        commit(tx).await?;

        Ok(rows.into_iter().map(ReminderPayload::from).collect())
    }
}
