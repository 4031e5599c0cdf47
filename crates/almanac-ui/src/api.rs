use almanac_shared::aggregate::SourceKind;
use almanac_shared::api::{
  ACADEMIC_EVENTS_PATH,
  DeleteResponse,
  EVENTS_PATH,
  ErrorBody,
  NewEvent
};
use almanac_shared::event::Event;
use almanac_shared::weather::{
  parse_precipitation_csv,
  parse_temperature_csv
};
use gloo::net::http::{
  Request,
  Response
};
use serde::de::DeserializeOwned;

/// Backend origin, fixed at build time.
pub fn api_base() -> &'static str {
  option_env!("ALMANAC_API_BASE")
    .unwrap_or("http://localhost:3000")
}

/// Where the page fetches each source.
pub fn source_url(
  kind: SourceKind
) -> String {
  match kind {
    | SourceKind::Holidays => {
      "data/holidays.json".to_string()
    }
    | SourceKind::WeatherTemperature => {
      "data/weather_temperature.csv"
        .to_string()
    }
    | SourceKind::WeatherPrecipitation => {
      "data/weather_precipitation.csv"
        .to_string()
    }
    | SourceKind::Sports => {
      "data/sports_events.json".to_string()
    }
    | SourceKind::User => {
      format!("{}{EVENTS_PATH}", api_base())
    }
    | SourceKind::Academic => {
      format!(
        "{}{ACADEMIC_EVENTS_PATH}",
        api_base()
      )
    }
  }
}

pub async fn load_source(
  kind: SourceKind
) -> Result<Vec<Event>, String> {
  let url = source_url(kind);
  let text = get_text(&url).await?;
  match kind {
    | SourceKind::WeatherTemperature => {
      Ok(parse_temperature_csv(&text))
    }
    | SourceKind::WeatherPrecipitation => {
      Ok(parse_precipitation_csv(&text))
    }
    | _ => decode(&url, &text)
  }
}

pub async fn create_event(
  payload: &NewEvent
) -> Result<Event, String> {
  let url =
    format!("{}{EVENTS_PATH}", api_base());
  let response = Request::post(&url)
    .json(payload)
    .map_err(|e| {
      format!("failed to encode event: {e}")
    })?
    .send()
    .await
    .map_err(|e| {
      format!("request to {url} failed: {e}")
    })?;
  let text = checked_text(&url, response).await?;
  decode(&url, &text)
}

pub async fn delete_event(
  id: i64
) -> Result<(), String> {
  let url = format!(
    "{}{EVENTS_PATH}/{id}",
    api_base()
  );
  let response = Request::delete(&url)
    .send()
    .await
    .map_err(|e| {
      format!("request to {url} failed: {e}")
    })?;
  let text = checked_text(&url, response).await?;
  let body: DeleteResponse =
    decode(&url, &text)?;
  if body.success {
    Ok(())
  } else {
    Err(format!("{url} did not delete event {id}"))
  }
}

async fn get_text(
  url: &str
) -> Result<String, String> {
  let response = Request::get(url)
    .send()
    .await
    .map_err(|e| {
      format!("request to {url} failed: {e}")
    })?;
  checked_text(url, response).await
}

/// Body text of a 2xx response; otherwise
/// the server's `{error}` message when it
/// sent one.
async fn checked_text(
  url: &str,
  response: Response
) -> Result<String, String> {
  let status = response.status();
  let text = response.text().await.map_err(
    |e| {
      format!(
        "failed reading body from {url}: \
         {e}"
      )
    }
  )?;
  if response_ok(status) {
    return Ok(text);
  }
  let message =
    serde_json::from_str::<ErrorBody>(&text)
      .map(|body| body.error)
      .unwrap_or(text);
  Err(format!("{url} returned {status}: {message}"))
}

fn response_ok(status: u16) -> bool {
  (200..300).contains(&status)
}

fn decode<T: DeserializeOwned>(
  url: &str,
  text: &str
) -> Result<T, String> {
  serde_json::from_str(text).map_err(|e| {
    format!("invalid JSON from {url}: {e}")
  })
}
