use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use eyre::{Result, WrapErr};
use sqlx::PgConnection;
use timeline_core::{
    errors::{TimelineError, TimelineResult},
    models::{
        schedule::{ScheduleDay, ScheduleQuery, WorkerSchedule, WorkerScheduleRequest, WorkerWeek},
        time::IsoWeekday,
        timetable::Timetable,
    },
    scheduling::check_schedule_fits,
    store::ScheduleStore,
};
use uuid::Uuid;

use super::{PgStore, commit, timetable};
use crate::models::{DbWorker, DbWorkerSchedule};

/// Locks the worker row so concurrent schedule edits for one worker serialize.
pub async fn lock_worker(conn: &mut PgConnection, org_id: Uuid, worker_id: Uuid) -> Result<Option<DbWorker>> {
    sqlx::query_as::<_, DbWorker>(
        r#"
        SELECT worker_id, org_id, session_duration
        FROM workers
        WHERE worker_id = $1 AND org_id = $2 AND is_delete = FALSE
        FOR UPDATE
        "#,
    )
    .bind(worker_id)
    .bind(org_id)
    .fetch_optional(&mut *conn)
    .await
    .wrap_err("failed to lock worker")
}

pub async fn get_workers(conn: &mut PgConnection, org_id: Uuid, worker_id: Option<Uuid>) -> Result<Vec<DbWorker>> {
    sqlx::query_as::<_, DbWorker>(
        r#"
        SELECT worker_id, org_id, session_duration
        FROM workers
        WHERE org_id = $1 AND is_delete = FALSE AND ($2::UUID IS NULL OR worker_id = $2)
        ORDER BY created_at ASC
        "#,
    )
    .bind(org_id)
    .bind(worker_id)
    .fetch_all(&mut *conn)
    .await
    .wrap_err("failed to fetch workers")
}

pub async fn set_session_duration(conn: &mut PgConnection, worker_id: Uuid, minutes: u32) -> Result<()> {
    let minutes = i32::try_from(minutes).wrap_err("session duration out of range")?;
    sqlx::query(
        r#"
        UPDATE workers SET session_duration = $2 WHERE worker_id = $1
        "#,
    )
    .bind(worker_id)
    .bind(minutes)
    .execute(&mut *conn)
    .await
    .wrap_err("failed to update session duration")?;

    Ok(())
}

pub async fn get_active_schedules(conn: &mut PgConnection, query: &ScheduleQuery) -> Result<Vec<DbWorkerSchedule>> {
    sqlx::query_as::<_, DbWorkerSchedule>(
        r#"
        SELECT worker_schedule_id, worker_id, org_id, weekday, start, over, created_at
        FROM worker_schedules
        WHERE org_id = $1
          AND is_delete = FALSE
          AND ($2::UUID IS NULL OR worker_id = $2)
          AND ($3::SMALLINT IS NULL OR weekday = $3)
        ORDER BY worker_id, weekday ASC
        "#,
    )
    .bind(query.org_id)
    .bind(query.worker_id)
    .bind(query.weekday.map(i16::from))
    .fetch_all(&mut *conn)
    .await
    .wrap_err("failed to fetch worker schedules")
}

pub async fn active_schedules_for_day(
    conn: &mut PgConnection,
    org_id: Uuid,
    weekday: IsoWeekday,
) -> Result<Vec<DbWorkerSchedule>> {
    let query = ScheduleQuery {
        org_id,
        worker_id: None,
        weekday: Some(weekday),
    };
    get_active_schedules(conn, &query).await
}

pub async fn active_schedule_exists(
    conn: &mut PgConnection,
    worker_id: Uuid,
    weekday: IsoWeekday,
    excluding: Option<Uuid>,
) -> Result<bool> {
    sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM worker_schedules
            WHERE worker_id = $1
              AND weekday = $2
              AND is_delete = FALSE
              AND ($3::UUID IS NULL OR worker_schedule_id <> $3)
        )
        "#,
    )
    .bind(worker_id)
    .bind(i16::from(weekday))
    .bind(excluding)
    .fetch_one(&mut *conn)
    .await
    .wrap_err("failed to check existing schedule")
}

pub async fn insert_schedule(
    conn: &mut PgConnection,
    worker_id: Uuid,
    org_id: Uuid,
    day: &ScheduleDay,
) -> Result<DbWorkerSchedule> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!(
        "Creating worker schedule: id={}, worker_id={}, weekday={}, {}-{}",
        id,
        worker_id,
        day.weekday,
        day.start,
        day.over
    );

    sqlx::query_as::<_, DbWorkerSchedule>(
        r#"
        INSERT INTO worker_schedules (worker_schedule_id, worker_id, org_id, weekday, start, over, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING worker_schedule_id, worker_id, org_id, weekday, start, over, created_at
        "#,
    )
    .bind(id)
    .bind(worker_id)
    .bind(org_id)
    .bind(i16::from(day.weekday))
    .bind(day.start.to_naive_time())
    .bind(day.over.to_naive_time())
    .bind(now)
    .fetch_one(&mut *conn)
    .await
    .wrap_err("failed to insert worker schedule")
}

pub async fn update_schedule(
    conn: &mut PgConnection,
    worker_schedule_id: Uuid,
    worker_id: Uuid,
    org_id: Uuid,
    day: &ScheduleDay,
) -> Result<Option<DbWorkerSchedule>> {
    sqlx::query_as::<_, DbWorkerSchedule>(
        r#"
        UPDATE worker_schedules
        SET weekday = $4, start = $5, over = $6
        WHERE worker_schedule_id = $1 AND worker_id = $2 AND org_id = $3 AND is_delete = FALSE
        RETURNING worker_schedule_id, worker_id, org_id, weekday, start, over, created_at
        "#,
    )
    .bind(worker_schedule_id)
    .bind(worker_id)
    .bind(org_id)
    .bind(i16::from(day.weekday))
    .bind(day.start.to_naive_time())
    .bind(day.over.to_naive_time())
    .fetch_optional(&mut *conn)
    .await
    .wrap_err("failed to update worker schedule")
}

/// Soft-deletes active schedules of an org, optionally narrowed to a worker and a weekday.
pub async fn soft_delete_schedules(
    conn: &mut PgConnection,
    org_id: Uuid,
    worker_id: Option<Uuid>,
    weekday: Option<IsoWeekday>,
) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE worker_schedules
        SET is_delete = TRUE
        WHERE org_id = $1
          AND is_delete = FALSE
          AND ($2::UUID IS NULL OR worker_id = $2)
          AND ($3::SMALLINT IS NULL OR weekday = $3)
        "#,
    )
    .bind(org_id)
    .bind(worker_id)
    .bind(weekday.map(i16::from))
    .execute(&mut *conn)
    .await
    .wrap_err("failed to soft-delete worker schedules")?;

    Ok(result.rows_affected())
}

pub async fn soft_delete_worker(conn: &mut PgConnection, org_id: Uuid, worker_id: Uuid) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE workers SET is_delete = TRUE
        WHERE worker_id = $1 AND org_id = $2 AND is_delete = FALSE
        "#,
    )
    .bind(worker_id)
    .bind(org_id)
    .execute(&mut *conn)
    .await
    .wrap_err("failed to soft-delete worker")?;

    Ok(result.rows_affected())
}

/// Loads the timetable day a schedule must fit into, and checks the fit.
async fn check_against_timetable(conn: &mut PgConnection, org_id: Uuid, day: &ScheduleDay) -> TimelineResult<()> {
    let Some(row) = timetable::get_timetable_day_for_share(conn, org_id, day.weekday).await? else {
        return Err(TimelineError::NotFound(format!(
            "timetable for {} of organization {org_id}",
            day.weekday
        )));
    };
    check_schedule_fits(&Timetable::try_from(row)?, day.start, day.over)
}

fn worker_not_found(org_id: Uuid, worker_id: Uuid) -> TimelineError {
    TimelineError::NotFound(format!("worker {worker_id} in organization {org_id}"))
}

#[async_trait]
impl ScheduleStore for PgStore {
    async fn worker_schedules(&self, query: ScheduleQuery) -> TimelineResult<Vec<WorkerWeek>> {
        let mut tx = self.begin().await?;
        let workers = get_workers(&mut tx, query.org_id, query.worker_id).await?;
        let rows = get_active_schedules(&mut tx, &query).await?;
        commit(tx).await?;

        let mut by_worker: BTreeMap<Uuid, Vec<WorkerSchedule>> = BTreeMap::new();
        for row in rows {
            by_worker.entry(row.worker_id).or_default().push(WorkerSchedule::try_from(row)?);
        }

        let weeks = workers
            .into_iter()
            .filter_map(|worker| {
                let schedule = by_worker.remove(&worker.worker_id).unwrap_or_default();
                // Without a worker filter, only workers with matching days are listed.
                if schedule.is_empty() && query.worker_id.is_none() {
                    return None;
                }
                Some(WorkerWeek {
                    worker_id: worker.worker_id,
                    org_id: worker.org_id,
                    session_duration: u32::try_from(worker.session_duration).unwrap_or(0),
                    schedule,
                })
            })
            .collect();
        Ok(weeks)
    }

    async fn add_worker_schedule(&self, request: WorkerScheduleRequest) -> TimelineResult<Vec<WorkerSchedule>> {
        let WorkerScheduleRequest { worker_id, org_id, session_duration, schedule } = request;
        let mut tx = self.begin().await?;

        if lock_worker(&mut tx, org_id, worker_id).await?.is_none() {
            return Err(worker_not_found(org_id, worker_id));
        }

        let mut created = Vec::with_capacity(schedule.len());
        for day in &schedule {
            check_against_timetable(&mut tx, org_id, day).await?;
            if active_schedule_exists(&mut tx, worker_id, day.weekday, None).await? {
                return Err(TimelineError::Conflict(format!(
                    "worker {worker_id} already has a schedule for {}",
                    day.weekday
                )));
            }
            let row = insert_schedule(&mut tx, worker_id, org_id, day).await?;
            created.push(WorkerSchedule::try_from(row)?);
        }

        if session_duration > 0 {
            set_session_duration(&mut tx, worker_id, session_duration).await?;
        }

        commit(tx).await?;
        tracing::info!("Worker schedule added: worker_id={}, days={}", worker_id, created.len());
        Ok(created)
    }

    async fn update_worker_schedule(&self, request: WorkerScheduleRequest) -> TimelineResult<Vec<WorkerSchedule>> {
        let WorkerScheduleRequest { worker_id, org_id, session_duration, schedule } = request;
        let mut tx = self.begin().await?;

        if lock_worker(&mut tx, org_id, worker_id).await?.is_none() {
            return Err(worker_not_found(org_id, worker_id));
        }

        let mut updated = Vec::with_capacity(schedule.len());
        for day in &schedule {
            let Some(schedule_id) = day.worker_schedule_id else {
                return Err(TimelineError::Validation(format!(
                    "{}: worker_schedule_id is required to update a schedule",
                    day.weekday
                )));
            };
            check_against_timetable(&mut tx, org_id, day).await?;
            if active_schedule_exists(&mut tx, worker_id, day.weekday, Some(schedule_id)).await? {
                return Err(TimelineError::Conflict(format!(
                    "worker {worker_id} already has a schedule for {}",
                    day.weekday
                )));
            }
            let Some(row) = update_schedule(&mut tx, schedule_id, worker_id, org_id, day).await? else {
                return Err(TimelineError::NotFound(format!("worker schedule {schedule_id}")));
            };
            updated.push(WorkerSchedule::try_from(row)?);
        }

        if session_duration > 0 {
            set_session_duration(&mut tx, worker_id, session_duration).await?;
        }

        commit(tx).await?;
        tracing::info!("Worker schedule updated: worker_id={}, days={}", worker_id, updated.len());
        Ok(updated)
    }

    async fn soft_delete_worker_schedule(
        &self,
        org_id: Uuid,
        worker_id: Uuid,
        weekday: Option<IsoWeekday>,
    ) -> TimelineResult<u64> {
        let mut tx = self.begin().await?;
        let removed = soft_delete_schedules(&mut tx, org_id, Some(worker_id), weekday).await?;
        if removed == 0 {
            return Err(TimelineError::NotFound(format!(
                "active schedule of worker {worker_id} in organization {org_id}"
            )));
        }
        commit(tx).await?;

        tracing::info!("Worker schedule deleted: worker_id={}, days={}", worker_id, removed);
        Ok(removed)
    }

    async fn retire_worker(&self, org_id: Uuid, worker_id: Uuid) -> TimelineResult<()> {
        let mut tx = self.begin().await?;
        if soft_delete_worker(&mut tx, org_id, worker_id).await? == 0 {
            return Err(worker_not_found(org_id, worker_id));
        }
        let removed = soft_delete_schedules(&mut tx, org_id, Some(worker_id), None).await?;
        commit(tx).await?;

        tracing::info!("Worker retired: worker_id={}, schedules_retired={}", worker_id, removed);
        Ok(())
    }
}
