use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use almanac_shared::api::ValidNewEvent;
use almanac_shared::date::normalize_date_value;
use almanac_shared::event::Event;
use anyhow::{Context, anyhow};
use chrono::Utc;
use parking_lot::Mutex;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use super::{EventStore, sort_events};

/// User events in one JSON array on disk.
///
/// The mutex serializes read-modify-write cycles within this process only.
#[derive(Debug)]
pub struct FileStore {
    events_path: PathBuf,
    academic_path: PathBuf,
    academic_category: String,
    write_lock: Mutex<()>,
}

impl FileStore {
    #[tracing::instrument(skip_all, fields(events = %events_path.display()))]
    pub fn open(
        events_path: &Path,
        academic_path: &Path,
        academic_category: &str,
    ) -> anyhow::Result<Self> {
        if let Some(dir) = parent_dir(events_path) {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }

        info!(
            events = %events_path.display(),
            academic = %academic_path.display(),
            "opened file event store"
        );

        Ok(Self {
            events_path: events_path.to_path_buf(),
            academic_path: academic_path.to_path_buf(),
            academic_category: academic_category.to_string(),
            write_lock: Mutex::new(()),
        })
    }

    /// A missing, unreadable or unparseable file reads as no events.
    fn read_events(&self) -> Vec<Event> {
        read_json_array(&self.events_path)
    }

    #[tracing::instrument(skip(self, events), fields(count = events.len()))]
    fn write_events(&self, events: &[Event]) -> anyhow::Result<()> {
        let dir = parent_dir(&self.events_path).unwrap_or_else(|| Path::new("."));
        let mut temp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut temp, events)?;
        writeln!(temp)?;
        temp.flush()?;

        temp.persist(&self.events_path).map_err(|err| {
            anyhow!("failed to persist {}: {}", self.events_path.display(), err)
        })?;
        Ok(())
    }
}

impl EventStore for FileStore {
    #[tracing::instrument(skip(self))]
    fn list(&self) -> anyhow::Result<Vec<Event>> {
        let mut events = self.read_events();
        sort_events(&mut events);
        Ok(events)
    }

    #[tracing::instrument(skip(self, event), fields(title = %event.title, date = %event.date))]
    fn create(&self, event: ValidNewEvent) -> anyhow::Result<Event> {
        let _guard = self.write_lock.lock();
        let mut events = self.read_events();

        let id = next_id(&events, Utc::now().timestamp_millis());
        let event = event.into_event(id);
        events.push(event.clone());
        self.write_events(&events)
            .context("failed to save events.json")?;

        info!(id, "created user event");
        Ok(event)
    }

    #[tracing::instrument(skip(self))]
    fn delete(&self, id: i64) -> anyhow::Result<bool> {
        let _guard = self.write_lock.lock();
        let mut events = self.read_events();

        let Some(idx) = events.iter().position(|e| e.id == Some(id)) else {
            debug!(id, "no user event with this id");
            return Ok(false);
        };
        events.remove(idx);
        self.write_events(&events)
            .context("failed to save events.json")?;

        info!(id, "deleted user event");
        Ok(true)
    }

    #[tracing::instrument(skip(self))]
    fn academic_events(&self) -> anyhow::Result<Vec<Event>> {
        let category = self.academic_category.as_str();
        let mut events: Vec<Event> = read_json_array(&self.academic_path)
            .into_iter()
            .filter(|e| e.tag.as_deref().is_none_or(|tag| tag == category))
            .map(|mut e| {
                e.date = normalize_date_value(&e.date);
                e.end_date = e.end_date.as_deref().map(normalize_date_value);
                e.tag = Some(category.to_string());
                e
            })
            .collect();
        sort_events(&mut events);
        Ok(events)
    }
}

/// Ids are creation timestamps in milliseconds, bumped past the largest
/// stored id so two creates in the same millisecond stay distinct.
pub(crate) fn next_id(events: &[Event], now_millis: i64) -> i64 {
    let last = events.iter().filter_map(|e| e.id).max().unwrap_or(0);
    now_millis.max(last + 1)
}

fn read_json_array(path: &Path) -> Vec<Event> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            debug!(file = %path.display(), error = %err, "event file not readable; treating as empty");
            return Vec::new();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(events) => events,
        Err(err) => {
            warn!(file = %path.display(), error = %err, "event file is not a JSON event array; treating as empty");
            Vec::new()
        }
    }
}

fn parent_dir(path: &Path) -> Option<&Path> {
    path.parent().filter(|p| !p.as_os_str().is_empty())
}
