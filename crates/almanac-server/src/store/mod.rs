mod file;
mod pg;

use std::sync::Arc;

use almanac_core::config::{Config, StorageBackend};
use almanac_shared::api::ValidNewEvent;
use almanac_shared::date::time_of_day_minutes;
use almanac_shared::event::Event;
use tracing::info;

pub use self::file::FileStore;
pub use self::pg::PgStore;

/// Persistence for user events plus the read-only academic list.
///
/// Methods block; async callers run them on the blocking pool.
pub trait EventStore: Send + Sync {
    /// User events ordered by date, then start time.
    fn list(&self) -> anyhow::Result<Vec<Event>>;

    /// Assigns an id and stores the event.
    fn create(&self, event: ValidNewEvent) -> anyhow::Result<Event>;

    /// Returns false when no event has this id.
    fn delete(&self, id: i64) -> anyhow::Result<bool>;

    fn academic_events(&self) -> anyhow::Result<Vec<Event>>;
}

pub type SharedStore = Arc<dyn EventStore>;

/// Opens the configured backend. Postgres connects here, so call this
/// outside the async runtime.
#[tracing::instrument(skip(cfg), fields(backend = ?cfg.storage.backend))]
pub fn open_store(cfg: &Config) -> anyhow::Result<SharedStore> {
    let store: SharedStore = match cfg.storage.backend {
        StorageBackend::File => Arc::new(FileStore::open(
            &cfg.storage.events_file,
            &cfg.storage.academic_file,
            &cfg.database.academic_category,
        )?),
        StorageBackend::Postgres => Arc::new(PgStore::connect(&cfg.database)?),
    };
    info!("event store ready");
    Ok(store)
}

/// Stable order for listings: date, then start time. Events without a start
/// come first and starts that are not clock times come last, in text order.
pub(crate) fn sort_events(events: &mut [Event]) {
    events.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| start_key(a).cmp(&start_key(b))));
}

fn start_key(event: &Event) -> (u8, u32, &str) {
    match event.start.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => (0, 0, ""),
        Some(start) => match time_of_day_minutes(start) {
            Some(minutes) => (1, minutes, start),
            None => (2, 0, start),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(date: &str, start: Option<&str>, title: &str) -> Event {
        Event {
            date: date.to_string(),
            start: start.map(str::to_string),
            title: title.to_string(),
            ..Event::default()
        }
    }

    #[test]
    fn same_day_starts_sort_by_clock_time() {
        let mut events = vec![
            at("2025-03-01", Some("7:00pm"), "Evening"),
            at("2025-03-01", Some("TBA"), "Unknown"),
            at("2025-03-01", Some("10:30am"), "Late morning"),
            at("2025-02-28", Some("11:00pm"), "Day before"),
            at("2025-03-01", Some("12:15pm"), "Lunch"),
            at("2025-03-01", None, "All day"),
            at("2025-03-01", Some("9:00am"), "Morning"),
            at("2025-03-01", Some("14:00"), "Afternoon"),
        ];
        sort_events(&mut events);
        let titles: Vec<&str> = events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Day before",
                "All day",
                "Morning",
                "Late morning",
                "Lunch",
                "Afternoon",
                "Evening",
                "Unknown",
            ]
        );
    }
}
