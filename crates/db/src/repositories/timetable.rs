use async_trait::async_trait;
use eyre::{Result, WrapErr};
use sqlx::PgConnection;
use timeline_core::{
    errors::{TimelineError, TimelineResult},
    models::{
        time::IsoWeekday,
        timetable::{OpenHours, Timetable},
    },
    scheduling::check_schedule_fits,
    store::TimetableStore,
};
use uuid::Uuid;

use super::{PgStore, commit, schedule};
use crate::models::{DbTimetable, DbWorkerSchedule};

pub async fn org_exists(conn: &mut PgConnection, org_id: Uuid) -> Result<bool> {
    sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (SELECT 1 FROM orgs WHERE org_id = $1 AND is_delete = FALSE)
        "#,
    )
    .bind(org_id)
    .fetch_one(&mut *conn)
    .await
    .wrap_err("failed to look up organization")
}

pub async fn get_timetable(conn: &mut PgConnection, org_id: Uuid) -> Result<Vec<DbTimetable>> {
    sqlx::query_as::<_, DbTimetable>(
        r#"
        SELECT org_id, weekday, open, close, break_start, break_end
        FROM timetables
        WHERE org_id = $1
        ORDER BY weekday ASC
        "#,
    )
    .bind(org_id)
    .fetch_all(&mut *conn)
    .await
    .wrap_err("failed to fetch timetable")
}

/// Locks the weekday row against concurrent edits while a schedule is checked against it.
pub async fn get_timetable_day_for_share(
    conn: &mut PgConnection,
    org_id: Uuid,
    weekday: IsoWeekday,
) -> Result<Option<DbTimetable>> {
    sqlx::query_as::<_, DbTimetable>(
        r#"
        SELECT org_id, weekday, open, close, break_start, break_end
        FROM timetables
        WHERE org_id = $1 AND weekday = $2
        FOR SHARE
        "#,
    )
    .bind(org_id)
    .bind(i16::from(weekday))
    .fetch_optional(&mut *conn)
    .await
    .wrap_err("failed to fetch timetable day")
}

/// Returns `None` when the weekday already has hours.
pub async fn insert_timetable_day(
    conn: &mut PgConnection,
    org_id: Uuid,
    hours: &OpenHours,
) -> Result<Option<DbTimetable>> {
    tracing::debug!("Inserting timetable day: org_id={}, weekday={}", org_id, hours.weekday);

    sqlx::query_as::<_, DbTimetable>(
        r#"
        INSERT INTO timetables (org_id, weekday, open, close, break_start, break_end)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (org_id, weekday) DO NOTHING
        RETURNING org_id, weekday, open, close, break_start, break_end
        "#,
    )
    .bind(org_id)
    .bind(i16::from(hours.weekday))
    .bind(hours.open.to_naive_time())
    .bind(hours.close.to_naive_time())
    .bind(hours.break_start.map(|t| t.to_naive_time()))
    .bind(hours.break_end.map(|t| t.to_naive_time()))
    .fetch_optional(&mut *conn)
    .await
    .wrap_err("failed to insert timetable day")
}

/// Returns `None` when the weekday has no hours yet.
pub async fn update_timetable_day(
    conn: &mut PgConnection,
    org_id: Uuid,
    hours: &OpenHours,
) -> Result<Option<DbTimetable>> {
    tracing::debug!("Updating timetable day: org_id={}, weekday={}", org_id, hours.weekday);

    sqlx::query_as::<_, DbTimetable>(
        r#"
        UPDATE timetables
        SET open = $3, close = $4, break_start = $5, break_end = $6
        WHERE org_id = $1 AND weekday = $2
        RETURNING org_id, weekday, open, close, break_start, break_end
        "#,
    )
    .bind(org_id)
    .bind(i16::from(hours.weekday))
    .bind(hours.open.to_naive_time())
    .bind(hours.close.to_naive_time())
    .bind(hours.break_start.map(|t| t.to_naive_time()))
    .bind(hours.break_end.map(|t| t.to_naive_time()))
    .fetch_optional(&mut *conn)
    .await
    .wrap_err("failed to update timetable day")
}

pub async fn delete_timetable_days(
    conn: &mut PgConnection,
    org_id: Uuid,
    weekday: Option<IsoWeekday>,
) -> Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM timetables
        WHERE org_id = $1 AND ($2::SMALLINT IS NULL OR weekday = $2)
        "#,
    )
    .bind(org_id)
    .bind(weekday.map(i16::from))
    .execute(&mut *conn)
    .await
    .wrap_err("failed to delete timetable")?;

    Ok(result.rows_affected())
}

#[async_trait]
impl TimetableStore for PgStore {
    async fn timetable(&self, org_id: Uuid) -> TimelineResult<Vec<Timetable>> {
        let mut tx = self.begin().await?;
        if !org_exists(&mut tx, org_id).await? {
            return Err(TimelineError::NotFound(format!("organization {org_id}")));
        }
        let rows = get_timetable(&mut tx, org_id).await?;
        commit(tx).await?;

        rows.into_iter().map(Timetable::try_from).collect()
    }

    async fn add_timetable(&self, org_id: Uuid, hours: Vec<OpenHours>) -> TimelineResult<Vec<Timetable>> {
        let mut tx = self.begin().await?;
        if !org_exists(&mut tx, org_id).await? {
            return Err(TimelineError::NotFound(format!("organization {org_id}")));
        }

        let mut added = Vec::with_capacity(hours.len());
        for day in &hours {
            let Some(row) = insert_timetable_day(&mut tx, org_id, day).await? else {
                return Err(TimelineError::Conflict(format!(
                    "timetable for {} already exists",
                    day.weekday
                )));
            };
            added.push(Timetable::try_from(row)?);
        }

        commit(tx).await?;
        tracing::info!("Timetable added: org_id={}, days={}", org_id, added.len());
        Ok(added)
    }

    async fn update_timetable(&self, org_id: Uuid, hours: Vec<OpenHours>) -> TimelineResult<Vec<Timetable>> {
        let mut tx = self.begin().await?;

        let mut updated = Vec::with_capacity(hours.len());
        for day in &hours {
            let Some(row) = update_timetable_day(&mut tx, org_id, day).await? else {
                return Err(TimelineError::NotFound(format!(
                    "timetable for {} of organization {org_id}",
                    day.weekday
                )));
            };
            let timetable = Timetable::try_from(row)?;

            // Narrowed hours must still hold every active schedule of the day.
            let schedules = schedule::active_schedules_for_day(&mut tx, org_id, day.weekday).await?;
            for DbWorkerSchedule { worker_id, start, over, .. } in schedules {
                check_schedule_fits(&timetable, start.into(), over.into()).map_err(|err| match err {
                    TimelineError::Validation(reason) => {
                        TimelineError::Validation(format!("worker {worker_id} no longer fits: {reason}"))
                    }
                    other => other,
                })?;
            }
            updated.push(timetable);
        }

        commit(tx).await?;
        tracing::info!("Timetable updated: org_id={}, days={}", org_id, updated.len());
        Ok(updated)
    }

    async fn delete_timetable(&self, org_id: Uuid, weekday: Option<IsoWeekday>) -> TimelineResult<u64> {
        let mut tx = self.begin().await?;

        let deleted = delete_timetable_days(&mut tx, org_id, weekday).await?;
        if deleted == 0 {
            return Err(TimelineError::NotFound(match weekday {
                Some(day) => format!("timetable for {day} of organization {org_id}"),
                None => format!("timetable of organization {org_id}"),
            }));
        }
        let retired = schedule::soft_delete_schedules(&mut tx, org_id, None, weekday).await?;

        commit(tx).await?;
        tracing::info!(
            "Timetable deleted: org_id={}, days={}, schedules_retired={}",
            org_id,
            deleted,
            retired
        );
        Ok(deleted)
    }
}
