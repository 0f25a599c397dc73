use eyre::Result;
use sqlx::{Executor, Pool, Postgres};
use tracing::info;

/// Creates the booking tables and the minimal owner tables they reference.
///
/// `orgs`, `users`, `workers` and `services` belong to the surrounding
/// platform; they are only created here when missing so that a fresh database
/// can host the booking core on its own.
pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Owner tables
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS orgs (
            org_id UUID PRIMARY KEY,
            name VARCHAR(255) NOT NULL,
            address VARCHAR(255) NOT NULL DEFAULT '',
            is_delete BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            user_id UUID PRIMARY KEY,
            email VARCHAR(255) NOT NULL UNIQUE,
            first_name VARCHAR(255) NOT NULL DEFAULT '',
            last_name VARCHAR(255) NOT NULL DEFAULT '',
            is_delete BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS workers (
            worker_id UUID PRIMARY KEY,
            org_id UUID NOT NULL REFERENCES orgs(org_id),
            first_name VARCHAR(255) NOT NULL DEFAULT '',
            last_name VARCHAR(255) NOT NULL DEFAULT '',
            session_duration INTEGER NOT NULL DEFAULT 0,
            is_delete BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_session_duration CHECK (session_duration >= 0 AND session_duration <= 1440)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS services (
            service_id UUID PRIMARY KEY,
            org_id UUID NOT NULL REFERENCES orgs(org_id),
            name VARCHAR(255) NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            cost DOUBLE PRECISION NULL,
            is_delete BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create timetables table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS timetables (
            org_id UUID NOT NULL REFERENCES orgs(org_id),
            weekday SMALLINT NOT NULL,
            open TIME NOT NULL,
            close TIME NOT NULL,
            break_start TIME NULL,
            break_end TIME NULL,
            PRIMARY KEY (org_id, weekday),
            CONSTRAINT valid_weekday CHECK (weekday BETWEEN 1 AND 7),
            CONSTRAINT valid_hours CHECK (open < close),
            CONSTRAINT valid_break CHECK (
                (break_start IS NULL AND break_end IS NULL)
                OR (break_start < break_end AND break_start >= open AND break_end <= close)
            )
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create worker_schedules table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS worker_schedules (
            worker_schedule_id UUID PRIMARY KEY,
            worker_id UUID NOT NULL REFERENCES workers(worker_id),
            org_id UUID NOT NULL REFERENCES orgs(org_id),
            weekday SMALLINT NOT NULL,
            start TIME NOT NULL,
            over TIME NOT NULL,
            is_delete BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_schedule_weekday CHECK (weekday BETWEEN 1 AND 7),
            CONSTRAINT valid_schedule_range CHECK (start < over)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create slots table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS slots (
            slot_id UUID PRIMARY KEY,
            worker_schedule_id UUID NOT NULL REFERENCES worker_schedules(worker_schedule_id),
            worker_id UUID NOT NULL REFERENCES workers(worker_id),
            org_id UUID NOT NULL REFERENCES orgs(org_id),
            date DATE NOT NULL,
            session_begin TIMESTAMP WITH TIME ZONE NOT NULL,
            session_end TIMESTAMP WITH TIME ZONE NOT NULL,
            busy BOOLEAN NOT NULL DEFAULT FALSE,
            CONSTRAINT unique_worker_session UNIQUE (worker_id, session_begin),
            CONSTRAINT valid_session_range CHECK (session_end > session_begin)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create records table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS records (
            record_id UUID PRIMARY KEY,
            org_id UUID NOT NULL REFERENCES orgs(org_id),
            user_id UUID NOT NULL REFERENCES users(user_id),
            worker_id UUID NOT NULL REFERENCES workers(worker_id),
            service_id UUID NOT NULL REFERENCES services(service_id),
            slot_id UUID NOT NULL REFERENCES slots(slot_id),
            reviewed BOOLEAN NOT NULL DEFAULT FALSE,
            is_canceled BOOLEAN NOT NULL DEFAULT FALSE,
            cancel_reason TEXT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create feedbacks table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS feedbacks (
            feedback_id UUID PRIMARY KEY,
            record_id UUID NOT NULL UNIQUE REFERENCES records(record_id),
            stars SMALLINT NOT NULL,
            feedback TEXT NOT NULL DEFAULT '',
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_stars CHECK (stars BETWEEN 1 AND 5)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes; a plain &str runs through the simple protocol, which allows several statements
    pool.execute(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_worker_schedules_active_day
            ON worker_schedules(worker_id, weekday) WHERE is_delete = FALSE;
        CREATE UNIQUE INDEX IF NOT EXISTS idx_records_active_slot
            ON records(slot_id) WHERE is_canceled = FALSE;
        CREATE INDEX IF NOT EXISTS idx_worker_schedules_org_weekday ON worker_schedules(org_id, weekday);
        CREATE INDEX IF NOT EXISTS idx_slots_date_busy ON slots(date, busy);
        CREATE INDEX IF NOT EXISTS idx_slots_org_id ON slots(org_id);
        CREATE INDEX IF NOT EXISTS idx_records_user_id ON records(user_id);
        CREATE INDEX IF NOT EXISTS idx_records_org_id ON records(org_id);
        "#,
    )
    .await?;

    info!("Database schema initialized successfully.");
    Ok(())
}
