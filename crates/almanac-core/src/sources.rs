use std::time::Duration;

use almanac_shared::aggregate::SourceKind;
use almanac_shared::api::{
  ACADEMIC_EVENTS_PATH,
  EVENTS_PATH
};
use almanac_shared::date::normalize_date_value;
use almanac_shared::event::Event;
use almanac_shared::state::Action;
use almanac_shared::weather::{
  parse_precipitation_csv,
  parse_temperature_csv
};
use anyhow::{
  Context,
  anyhow
};
use tracing::{
  debug,
  info,
  warn
};

use crate::config::SourcesConfig;

/// Result of one source fetch.
#[derive(Debug)]
pub struct SourceOutcome {
  pub kind:   SourceKind,
  pub result: anyhow::Result<Vec<Event>>
}

impl SourceOutcome {
  /// Failures become empty sources; the
  /// rest of the calendar still renders.
  pub fn into_action(self) -> Action {
    match self.result {
      | Ok(events) => {
        Action::SourceLoaded {
          kind: self.kind,
          events
        }
      }
      | Err(err) => Action::SourceFailed {
        kind:  self.kind,
        error: format!("{err:#}")
      }
    }
  }
}

pub fn http_client()
-> anyhow::Result<reqwest::Client> {
  reqwest::Client::builder()
    .timeout(Duration::from_secs(30))
    .build()
    .context(
      "failed building HTTP client for \
       event sources"
    )
}

/// Fetches every configured source
/// concurrently. Each one fails on its
/// own.
#[tracing::instrument(skip_all)]
pub async fn load_all(
  sources: &SourcesConfig,
  client: &reqwest::Client
) -> Vec<SourceOutcome> {
  let api_url = |path: &str| {
    sources.api_base.as_ref().map(|base| {
      format!(
        "{}{path}",
        base.trim_end_matches('/')
      )
    })
  };
  let events_url = api_url(EVENTS_PATH);
  let academic_url =
    api_url(ACADEMIC_EVENTS_PATH);

  let (
    holidays,
    temperature,
    precipitation,
    sports,
    user,
    academic
  ) = tokio::join!(
    load_one(
      client,
      SourceKind::Holidays,
      sources.holidays.as_deref()
    ),
    load_one(
      client,
      SourceKind::WeatherTemperature,
      sources.temperature.as_deref()
    ),
    load_one(
      client,
      SourceKind::WeatherPrecipitation,
      sources.precipitation.as_deref()
    ),
    load_one(
      client,
      SourceKind::Sports,
      sources.sports.as_deref()
    ),
    load_one(
      client,
      SourceKind::User,
      events_url.as_deref()
    ),
    load_one(
      client,
      SourceKind::Academic,
      academic_url.as_deref()
    ),
  );

  let outcomes: Vec<SourceOutcome> = [
    holidays,
    temperature,
    precipitation,
    sports,
    user,
    academic
  ]
  .into_iter()
  .flatten()
  .collect();

  info!(
    loaded = outcomes
      .iter()
      .filter(|o| o.result.is_ok())
      .count(),
    failed = outcomes
      .iter()
      .filter(|o| o.result.is_err())
      .count(),
    "event sources settled"
  );
  outcomes
}

async fn load_one(
  client: &reqwest::Client,
  kind: SourceKind,
  location: Option<&str>
) -> Option<SourceOutcome> {
  let Some(location) = location else {
    debug!(
      source = kind.label(),
      "source not configured; skipping"
    );
    return None;
  };

  let result =
    fetch_and_parse(client, kind, location)
      .await;

  if let Err(err) = &result {
    warn!(
      source = kind.label(),
      %location,
      error = %format!("{err:#}"),
      "event source failed"
    );
  }

  Some(SourceOutcome {
    kind,
    result
  })
}

async fn fetch_and_parse(
  client: &reqwest::Client,
  kind: SourceKind,
  location: &str
) -> anyhow::Result<Vec<Event>> {
  let text =
    fetch_text(client, location).await?;
  parse_source(kind, &text).with_context(
    || format!("failed parsing {location}")
  )
}

pub fn is_remote(location: &str) -> bool {
  let lower = location
    .trim()
    .to_ascii_lowercase();
  lower.starts_with("http://")
    || lower.starts_with("https://")
}

#[tracing::instrument(skip(client))]
pub async fn fetch_text(
  client: &reqwest::Client,
  location: &str
) -> anyhow::Result<String> {
  let location = location.trim();
  if location.is_empty() {
    anyhow::bail!(
      "source location is empty"
    );
  }

  if !is_remote(location) {
    return tokio::fs::read_to_string(
      location
    )
    .await
    .with_context(|| {
      format!("failed to read {location}")
    });
  }

  let response = client
    .get(location)
    .send()
    .await
    .with_context(|| {
      format!(
        "failed requesting {location}"
      )
    })?;
  let status = response.status();
  if !status.is_success() {
    return Err(anyhow!(
      "{location} returned HTTP {status}"
    ));
  }
  response.text().await.with_context(|| {
    format!(
      "failed reading response body \
       from {location}"
    )
  })
}

/// Turns a fetched payload into events
/// for the given source.
pub fn parse_source(
  kind: SourceKind,
  text: &str
) -> anyhow::Result<Vec<Event>> {
  let events = match kind {
    | SourceKind::WeatherTemperature => {
      parse_temperature_csv(text)
    }
    | SourceKind::WeatherPrecipitation => {
      parse_precipitation_csv(text)
    }
    | SourceKind::Academic => {
      let mut events: Vec<Event> =
        serde_json::from_str(text)?;
      for event in &mut events {
        event.date =
          normalize_date_value(&event.date);
        if let Some(end) = &event.end_date {
          event.end_date =
            Some(normalize_date_value(end));
        }
      }
      events
    }
    | SourceKind::Holidays
    | SourceKind::Sports
    | SourceKind::User => {
      serde_json::from_str(text)?
    }
  };
  Ok(events)
}
