use almanac_core::config::DatabaseConfig;
use almanac_shared::api::ValidNewEvent;
use almanac_shared::date::normalize_date_value;
use almanac_shared::event::{Event, USER_SOURCE};
use anyhow::{Context, anyhow};
use postgres::{NoTls, Row};
use r2d2::Pool;
use r2d2_postgres::PostgresConnectionManager;
use tracing::{debug, info};

use super::{EventStore, sort_events};

type PgPool = Pool<PostgresConnectionManager<NoTls>>;

const CREATE_USER_EVENTS: &str = "
CREATE TABLE IF NOT EXISTS user_events (
    id          BIGSERIAL PRIMARY KEY,
    source      TEXT NOT NULL DEFAULT 'user',
    title       TEXT NOT NULL,
    date        TEXT NOT NULL,
    start_time  TEXT,
    end_time    TEXT,
    location    TEXT,
    tag         TEXT NOT NULL,
    sport       TEXT,
    details     TEXT,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
)";

/// User events in `user_events`; academic rows from an imported table.
pub struct PgStore {
    pool: PgPool,
    academic_select: String,
    academic_category: String,
}

impl PgStore {
    /// Builds the pool and creates `user_events` when missing.
    #[tracing::instrument(skip(cfg), fields(host = %cfg.host, db = %cfg.name))]
    pub fn connect(cfg: &DatabaseConfig) -> anyhow::Result<Self> {
        let table = checked_identifier(&cfg.academic_table)?;

        let mut pg = postgres::Config::new();
        pg.host(&cfg.host)
            .port(cfg.port)
            .user(&cfg.user)
            .dbname(&cfg.name);
        if !cfg.password.is_empty() {
            pg.password(&cfg.password);
        }

        let manager = PostgresConnectionManager::new(pg, NoTls);
        let pool = Pool::builder()
            .max_size(cfg.pool_size)
            .build(manager)
            .with_context(|| {
                format!(
                    "failed to connect to postgres at {}:{}/{}",
                    cfg.host, cfg.port, cfg.name
                )
            })?;

        let mut conn = pool.get()?;
        conn.batch_execute(CREATE_USER_EVENTS)
            .context("failed to create user_events table")?;

        info!(pool_size = cfg.pool_size, "connected to postgres");
        Ok(Self {
            pool,
            academic_select: format!(
                "SELECT title, start_date::text, end_date::text, start_time, end_time, \
                 location, description, all_day_event \
                 FROM {table} WHERE category = $1 ORDER BY start_date, start_time"
            ),
            academic_category: cfg.academic_category.clone(),
        })
    }
}

impl EventStore for PgStore {
    #[tracing::instrument(skip(self))]
    fn list(&self) -> anyhow::Result<Vec<Event>> {
        let mut conn = self.pool.get()?;
        let rows = conn
            .query(
                "SELECT id, title, date, start_time, end_time, location, tag, sport, details \
                 FROM user_events ORDER BY date, id",
                &[],
            )
            .context("failed to list user events")?;
        debug!(count = rows.len(), "loaded user events");
        // start_time is free text, so the time-of-day order is applied here.
        let mut events = rows
            .iter()
            .map(user_event_from_row)
            .collect::<anyhow::Result<Vec<_>>>()?;
        sort_events(&mut events);
        Ok(events)
    }

    #[tracing::instrument(skip(self, event), fields(title = %event.title, date = %event.date))]
    fn create(&self, event: ValidNewEvent) -> anyhow::Result<Event> {
        let mut conn = self.pool.get()?;
        let row = conn
            .query_one(
                "INSERT INTO user_events \
                 (source, title, date, start_time, end_time, location, tag, sport, details) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING id",
                &[
                    &USER_SOURCE,
                    &event.title,
                    &event.date,
                    &event.start,
                    &event.end,
                    &event.location,
                    &event.tag,
                    &event.sport,
                    &event.details,
                ],
            )
            .context("failed to insert user event")?;
        let id: i64 = row.try_get(0)?;
        info!(id, "created user event");
        Ok(event.into_event(id))
    }

    #[tracing::instrument(skip(self))]
    fn delete(&self, id: i64) -> anyhow::Result<bool> {
        let mut conn = self.pool.get()?;
        let removed = conn
            .execute("DELETE FROM user_events WHERE id = $1", &[&id])
            .context("failed to delete user event")?;
        Ok(removed > 0)
    }

    #[tracing::instrument(skip(self), fields(category = %self.academic_category))]
    fn academic_events(&self) -> anyhow::Result<Vec<Event>> {
        let mut conn = self.pool.get()?;
        let rows = conn
            .query(self.academic_select.as_str(), &[&self.academic_category])
            .context("failed to query academic events")?;
        rows.iter()
            .map(|row| academic_event_from_row(row, &self.academic_category))
            .collect()
    }
}

fn user_event_from_row(row: &Row) -> anyhow::Result<Event> {
    Ok(Event {
        id: Some(row.try_get("id")?),
        source: Some(USER_SOURCE.to_string()),
        title: row.try_get("title")?,
        date: row.try_get("date")?,
        start: row.try_get("start_time")?,
        end: row.try_get("end_time")?,
        location: row.try_get("location")?,
        tag: Some(row.try_get("tag")?),
        sport: row.try_get("sport")?,
        details: row.try_get("details")?,
        ..Event::default()
    })
}

fn academic_event_from_row(row: &Row, category: &str) -> anyhow::Result<Event> {
    let date: Option<String> = row.try_get(1)?;
    let end_date: Option<String> = row.try_get(2)?;
    Ok(Event {
        title: row.try_get(0)?,
        date: normalize_date_value(date.as_deref().unwrap_or_default()),
        end_date: end_date.as_deref().map(normalize_date_value),
        start: row.try_get(3)?,
        end: row.try_get(4)?,
        location: row.try_get(5)?,
        description: row.try_get(6)?,
        all_day_event: row.try_get(7)?,
        tag: Some(category.to_string()),
        ..Event::default()
    })
}

/// Table names cannot be bound as parameters, so only plain identifiers
/// are accepted.
fn checked_identifier(name: &str) -> anyhow::Result<&str> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        && !name.starts_with(|c: char| c.is_ascii_digit());
    if valid {
        Ok(name)
    } else {
        Err(anyhow!("invalid academic table name: {name:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_names_are_checked() {
        assert!(checked_identifier("academic_events").is_ok());
        assert!(checked_identifier("import.academic_calendar").is_ok());
        assert!(checked_identifier("events; DROP TABLE x").is_err());
        assert!(checked_identifier("").is_err());
        assert!(checked_identifier("1table").is_err());
    }
}
