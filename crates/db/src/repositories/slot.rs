use async_trait::async_trait;
use chrono::NaiveDate;
use eyre::{Result, WrapErr};
use sqlx::PgConnection;
use timeline_core::{
    errors::{TimelineError, TimelineResult},
    models::{
        schedule::GenerationSource,
        slot::{GenerationReport, Slot, SlotQuery},
        time::DayWindow,
    },
    scheduling::{SessionPlan, next_cycle_date, plan_sessions},
    store::SlotStore,
};
use uuid::Uuid;

use super::{PgStore, TODAY_UTC, commit};
use crate::models::{DbGenerationSource, DbSlot};

pub async fn current_date(conn: &mut PgConnection) -> Result<NaiveDate> {
    sqlx::query_scalar::<_, NaiveDate>(&format!("SELECT {TODAY_UTC}"))
        .fetch_one(&mut *conn)
        .await
        .wrap_err("failed to read current date")
}

/// Active schedules of active workers, each joined with its weekday's timetable if any.
pub async fn get_generation_sources(conn: &mut PgConnection) -> Result<Vec<DbGenerationSource>> {
    sqlx::query_as::<_, DbGenerationSource>(
        r#"
        SELECT ws.worker_schedule_id, ws.worker_id, ws.org_id, ws.weekday, ws.start, ws.over,
               w.session_duration, t.break_start, t.break_end,
               (t.org_id IS NOT NULL) AS has_timetable
        FROM worker_schedules ws
        JOIN workers w ON w.worker_id = ws.worker_id AND w.is_delete = FALSE
        LEFT JOIN timetables t ON t.org_id = ws.org_id AND t.weekday = ws.weekday
        WHERE ws.is_delete = FALSE
        ORDER BY ws.org_id, ws.worker_id, ws.weekday
        "#,
    )
    .fetch_all(&mut *conn)
    .await
    .wrap_err("failed to fetch generation sources")
}

/// Returns `None` when the worker already has a slot starting at the same instant.
pub async fn insert_slot(
    conn: &mut PgConnection,
    source: &GenerationSource,
    date: NaiveDate,
    session: &SessionPlan,
) -> Result<Option<Uuid>> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO slots (slot_id, worker_schedule_id, worker_id, org_id, date, session_begin, session_end, busy)
        VALUES ($1, $2, $3, $4, $5, $6, $7, FALSE)
        ON CONFLICT (worker_id, session_begin) DO NOTHING
        RETURNING slot_id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(source.worker_schedule_id)
    .bind(source.worker_id)
    .bind(source.org_id)
    .bind(date)
    .bind(session.begin)
    .bind(session.end)
    .fetch_optional(&mut *conn)
    .await
    .wrap_err("failed to insert slot")
}

/// Deletes free slots dated today or earlier that no record points at.
///
/// Canceled records keep referencing their freed slot through the foreign key,
/// so a past slot freed by a cancellation is never swept. Those rows accumulate
/// for as long as the canceled record is kept.
pub async fn delete_expired_slots(conn: &mut PgConnection) -> Result<u64> {
    let result = sqlx::query(&format!(
        r#"
        DELETE FROM slots s
        WHERE s.date <= {TODAY_UTC}
          AND s.busy = FALSE
          AND NOT EXISTS (SELECT 1 FROM records r WHERE r.slot_id = s.slot_id)
        "#
    ))
    .execute(&mut *conn)
    .await
    .wrap_err("failed to delete expired slots")?;

    Ok(result.rows_affected())
}

pub async fn get_slots(conn: &mut PgConnection, query: &SlotQuery) -> Result<Vec<DbSlot>> {
    sqlx::query_as::<_, DbSlot>(&format!(
        r#"
        SELECT slot_id, worker_schedule_id, worker_id, org_id, date, session_begin, session_end, busy
        FROM slots
        WHERE date >= {TODAY_UTC}
          AND ($1::UUID IS NULL OR worker_id = $1)
          AND ($2::UUID IS NULL OR org_id = $2)
        ORDER BY session_begin ASC
        "#
    ))
    .bind(query.worker_id)
    .bind(query.org_id)
    .fetch_all(&mut *conn)
    .await
    .wrap_err("failed to fetch slots")
}

#[async_trait]
impl SlotStore for PgStore {
    async fn generate_slots(&self) -> TimelineResult<GenerationReport> {
        let mut tx = self.begin().await?;
        let today = current_date(&mut tx).await?;
        let rows = get_generation_sources(&mut tx).await?;

        let mut report = GenerationReport {
            target_schedules: rows.len(),
            ..GenerationReport::default()
        };

        for row in rows {
            let source = GenerationSource::try_from(row)?;
            if !source.has_timetable {
                // Dropping the transaction rolls back everything inserted so far.
                return Err(TimelineError::InvariantViolation(format!(
                    "worker schedule {} has no timetable for {} in organization {}",
                    source.worker_schedule_id, source.weekday, source.org_id
                )));
            }
            if source.session_duration == 0 {
                tracing::warn!(
                    "Skipping worker schedule {}: worker {} has no session duration",
                    source.worker_schedule_id,
                    source.worker_id
                );
                report.skipped_schedules += 1;
                continue;
            }

            let date = next_cycle_date(today, source.weekday);
            let break_window = match (source.break_start, source.break_end) {
                (Some(start), Some(end)) => Some(DayWindow { start, end }),
                _ => None,
            };
            let planned = plan_sessions(date, source.start, source.over, source.session_duration, break_window);
            report.skipped_in_break += planned.skipped_in_break;

            for session in &planned.sessions {
                match insert_slot(&mut tx, &source, date, session).await? {
                    Some(_) => report.created += 1,
                    None => report.duplicates += 1,
                }
            }
            tracing::debug!(
                "Planned worker schedule {} on {}: {} sessions",
                source.worker_schedule_id,
                date,
                planned.sessions.len()
            );
        }

        commit(tx).await?;
        Ok(report)
    }

    async fn delete_expired_slots(&self) -> TimelineResult<u64> {
        let mut tx = self.begin().await?;
        let deleted = delete_expired_slots(&mut tx).await?;
        commit(tx).await?;
        Ok(deleted)
    }

    async fn slots(&self, query: SlotQuery) -> TimelineResult<Vec<Slot>> {
        let mut tx = self.begin().await?;
        let rows = get_slots(&mut tx, &query).await?;
        commit(tx).await?;
        Ok(rows.into_iter().map(Slot::from).collect())
    }
}
