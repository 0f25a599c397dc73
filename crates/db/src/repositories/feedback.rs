use async_trait::async_trait;
use chrono::Utc;
use eyre::{Result, WrapErr};
use sqlx::PgConnection;
use timeline_core::{
    errors::{TimelineError, TimelineResult},
    models::feedback::{Feedback, FeedbackQuery, FeedbackRequest},
    store::FeedbackStore,
};
use uuid::Uuid;

use super::{PgStore, commit};
use crate::models::DbFeedback;

/// State of a record as seen by the feedback rules.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FeedbackGuard {
    pub user_id: Uuid,
    pub is_canceled: bool,
    pub finished: bool,
    pub has_feedback: bool,
}

/// Inserts feedback only for the owner's active record whose session has ended.
///
/// The time guard is part of the insert itself; `None` means one of the
/// conditions did not hold or feedback already exists.
pub async fn insert_feedback_after_session(
    conn: &mut PgConnection,
    request: &FeedbackRequest,
) -> Result<Option<DbFeedback>> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!("Creating feedback: id={}, record_id={}", id, request.record_id);

    sqlx::query_as::<_, DbFeedback>(
        r#"
        INSERT INTO feedbacks (feedback_id, record_id, stars, feedback, created_at)
        SELECT $1, r.record_id, $3, $4, $5
        FROM records r
        JOIN slots s ON s.slot_id = r.slot_id
        WHERE r.record_id = $2
          AND r.user_id = $6
          AND r.is_canceled = FALSE
          AND s.session_end <= now()
        ON CONFLICT (record_id) DO NOTHING
        RETURNING feedback_id, record_id, stars, feedback, created_at
        "#,
    )
    .bind(id)
    .bind(request.record_id)
    .bind(request.stars)
    .bind(&request.text)
    .bind(now)
    .bind(request.user_id)
    .fetch_optional(&mut *conn)
    .await
    .wrap_err("failed to insert feedback")
}

pub async fn get_feedback_guard(conn: &mut PgConnection, record_id: Uuid) -> Result<Option<FeedbackGuard>> {
    sqlx::query_as::<_, FeedbackGuard>(
        r#"
        SELECT r.user_id, r.is_canceled,
               (s.session_end <= now()) AS finished,
               EXISTS (SELECT 1 FROM feedbacks f WHERE f.record_id = r.record_id) AS has_feedback
        FROM records r
        JOIN slots s ON s.slot_id = r.slot_id
        WHERE r.record_id = $1
        "#,
    )
    .bind(record_id)
    .fetch_optional(&mut *conn)
    .await
    .wrap_err("failed to inspect record for feedback")
}

pub async fn set_reviewed(conn: &mut PgConnection, record_id: Uuid, reviewed: bool) -> Result<u64> {
    let result = sqlx::query("UPDATE records SET reviewed = $2 WHERE record_id = $1")
        .bind(record_id)
        .bind(reviewed)
        .execute(&mut *conn)
        .await
        .wrap_err("failed to update reviewed flag")?;

    Ok(result.rows_affected())
}

pub async fn update_feedback(conn: &mut PgConnection, request: &FeedbackRequest) -> Result<Option<DbFeedback>> {
    sqlx::query_as::<_, DbFeedback>(
        r#"
        UPDATE feedbacks f
        SET stars = $3, feedback = $4
        FROM records r
        WHERE f.record_id = $1 AND r.record_id = f.record_id AND r.user_id = $2
        RETURNING f.feedback_id, f.record_id, f.stars, f.feedback, f.created_at
        "#,
    )
    .bind(request.record_id)
    .bind(request.user_id)
    .bind(request.stars)
    .bind(&request.text)
    .fetch_optional(&mut *conn)
    .await
    .wrap_err("failed to update feedback")
}

pub async fn delete_feedback(conn: &mut PgConnection, record_id: Uuid, user_id: Uuid) -> Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM feedbacks f
        USING records r
        WHERE f.record_id = $1 AND r.record_id = f.record_id AND r.user_id = $2
        "#,
    )
    .bind(record_id)
    .bind(user_id)
    .execute(&mut *conn)
    .await
    .wrap_err("failed to delete feedback")?;

    Ok(result.rows_affected())
}

pub async fn get_feedbacks(conn: &mut PgConnection, query: &FeedbackQuery) -> Result<Vec<DbFeedback>> {
    sqlx::query_as::<_, DbFeedback>(
        r#"
        SELECT f.feedback_id, f.record_id, f.stars, f.feedback, f.created_at
        FROM feedbacks f
        JOIN records r ON r.record_id = f.record_id
        WHERE ($1::UUID IS NULL OR f.record_id = $1)
          AND ($2::UUID IS NULL OR r.user_id = $2)
          AND ($3::UUID IS NULL OR r.org_id = $3)
        ORDER BY f.created_at DESC
        "#,
    )
    .bind(query.record_id)
    .bind(query.user_id)
    .bind(query.org_id)
    .fetch_all(&mut *conn)
    .await
    .wrap_err("failed to fetch feedbacks")
}

/// Explains why a guarded feedback write matched nothing.
fn rejection(guard: Option<FeedbackGuard>, record_id: Uuid, user_id: Uuid) -> TimelineError {
    let Some(guard) = guard else {
        return TimelineError::NotFound(format!("record {record_id}"));
    };
    if guard.user_id != user_id {
        return TimelineError::Authorization(format!("record {record_id} belongs to another user"));
    }
    if guard.is_canceled {
        return TimelineError::Conflict(format!("record {record_id} was canceled"));
    }
    if guard.has_feedback {
        return TimelineError::Conflict(format!("record {record_id} is already reviewed"));
    }
    if !guard.finished {
        return TimelineError::Conflict(format!("session of record {record_id} has not finished yet"));
    }
    TimelineError::InvariantViolation(format!("feedback for record {record_id} was rejected without a reason"))
}

/// Explains why an edit of existing feedback matched nothing.
fn missing_feedback(guard: Option<FeedbackGuard>, record_id: Uuid, user_id: Uuid) -> TimelineError {
    match guard {
        Some(guard) if guard.user_id != user_id => {
            TimelineError::Authorization(format!("record {record_id} belongs to another user"))
        }
        Some(_) => TimelineError::NotFound(format!("feedback for record {record_id}")),
        None => TimelineError::NotFound(format!("record {record_id}")),
    }
}

#[async_trait]
impl FeedbackStore for PgStore {
    async fn set_feedback(&self, request: FeedbackRequest) -> TimelineResult<Feedback> {
        let mut tx = self.begin().await?;

        let Some(row) = insert_feedback_after_session(&mut tx, &request).await? else {
            let guard = get_feedback_guard(&mut tx, request.record_id).await?;
            return Err(rejection(guard, request.record_id, request.user_id));
        };
        set_reviewed(&mut tx, request.record_id, true).await?;

        commit(tx).await?;
        tracing::info!("Feedback set: record_id={}, stars={}", request.record_id, request.stars);
        Ok(row.into())
    }

    async fn update_feedback(&self, request: FeedbackRequest) -> TimelineResult<Feedback> {
        let mut tx = self.begin().await?;

        let Some(row) = update_feedback(&mut tx, &request).await? else {
            let guard = get_feedback_guard(&mut tx, request.record_id).await?;
            return Err(missing_feedback(guard, request.record_id, request.user_id));
        };

        commit(tx).await?;
        tracing::info!("Feedback updated: record_id={}", request.record_id);
        Ok(row.into())
    }

    async fn delete_feedback(&self, record_id: Uuid, user_id: Uuid) -> TimelineResult<()> {
        let mut tx = self.begin().await?;

        if delete_feedback(&mut tx, record_id, user_id).await? == 0 {
            let guard = get_feedback_guard(&mut tx, record_id).await?;
            return Err(missing_feedback(guard, record_id, user_id));
        }
        set_reviewed(&mut tx, record_id, false).await?;

        commit(tx).await?;
        tracing::info!("Feedback deleted: record_id={}", record_id);
        Ok(())
    }

    async fn feedbacks(&self, query: FeedbackQuery) -> TimelineResult<Vec<Feedback>> {
        let mut tx = self.begin().await?;
        let rows = get_feedbacks(&mut tx, &query).await?;
        commit(tx).await?;
        Ok(rows.into_iter().map(Feedback::from).collect())
    }
}
