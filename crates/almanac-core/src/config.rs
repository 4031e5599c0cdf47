use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use chrono_tz::Tz;
use serde::{
  Deserialize,
  Serialize
};
use tracing::{
  debug,
  info,
  warn
};

pub const CONFIG_FILE_NAME: &str =
  "almanac.toml";
pub const CONFIG_ENV: &str =
  "ALMANAC_CONFIG";

pub const DEFAULT_ALLOWED_ORIGIN: &str =
  "https://hty1206.github.io";
pub const DEFAULT_SPORTS_ICS_URL: &str = "https://calendar.google.com/calendar/ical/7obkojq4b78kbqg9v0l8s2s6kcg9usfk%40import.calendar.google.com/public/basic.ics";

#[derive(
  Debug, Clone, Default, Serialize,
  Deserialize,
)]
#[serde(default)]
pub struct Config {
  pub server:      ServerConfig,
  pub storage:     StorageConfig,
  pub database:    DatabaseConfig,
  pub sources:     SourcesConfig,
  pub sports:      SportsConfig,
  #[serde(skip)]
  pub loaded_from: Option<PathBuf>
}

#[derive(
  Debug, Clone, Serialize, Deserialize,
)]
#[serde(default)]
pub struct ServerConfig {
  pub bind:           String,
  pub port:           u16,
  pub allowed_origin: String
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      bind:           "0.0.0.0".to_string(),
      port:           3000,
      allowed_origin:
        DEFAULT_ALLOWED_ORIGIN.to_string()
    }
  }
}

#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
  #[default]
  File,
  Postgres
}

#[derive(
  Debug, Clone, Serialize, Deserialize,
)]
#[serde(default)]
pub struct StorageConfig {
  pub backend:       StorageBackend,
  pub events_file:   PathBuf,
  /// Read-only academic rows for the
  /// file backend.
  pub academic_file: PathBuf
}

impl Default for StorageConfig {
  fn default() -> Self {
    Self {
      backend:       StorageBackend::File,
      events_file:   PathBuf::from(
        "events.json"
      ),
      academic_file: PathBuf::from(
        "data/academic_events.json"
      )
    }
  }
}

#[derive(
  Debug, Clone, Serialize, Deserialize,
)]
#[serde(default)]
pub struct DatabaseConfig {
  pub host:              String,
  pub user:              String,
  pub password:          String,
  pub name:              String,
  pub port:              u16,
  pub pool_size:         u32,
  pub academic_table:    String,
  pub academic_category: String
}

impl Default for DatabaseConfig {
  fn default() -> Self {
    Self {
      host:              "localhost"
        .to_string(),
      user:              "postgres"
        .to_string(),
      password:          String::new(),
      name:              "almanac".to_string(),
      port:              5432,
      pool_size:         10,
      academic_table:    "academic_events"
        .to_string(),
      academic_category: "Academic Calendar"
        .to_string()
    }
  }
}

/// Where each event source lives. A value
/// starting with `http://` or `https://` is
/// fetched, anything else is read from
/// disk. Unset sources are skipped.
#[derive(
  Debug, Clone, Serialize, Deserialize,
)]
#[serde(default)]
pub struct SourcesConfig {
  pub holidays:      Option<String>,
  pub temperature:   Option<String>,
  pub precipitation: Option<String>,
  pub sports:        Option<String>,
  /// Base URL of the events backend.
  pub api_base:      Option<String>
}

impl Default for SourcesConfig {
  fn default() -> Self {
    Self {
      holidays:      Some(
        "data/holidays.json".to_string()
      ),
      temperature:   None,
      precipitation: None,
      sports:        Some(
        "data/sports_events.json"
          .to_string()
      ),
      api_base:      None
    }
  }
}

#[derive(
  Debug, Clone, Serialize, Deserialize,
)]
#[serde(default)]
pub struct SportsConfig {
  pub ics_url:  String,
  pub timezone: String,
  pub output:   PathBuf
}

impl Default for SportsConfig {
  fn default() -> Self {
    Self {
      ics_url:  DEFAULT_SPORTS_ICS_URL
        .to_string(),
      timezone: "America/Chicago".to_string(),
      output:   PathBuf::from(
        "data/sports_events.json"
      )
    }
  }
}

impl Config {
  /// Loads the first config file found,
  /// applies environment overrides and
  /// validates the result.
  #[tracing::instrument(skip(
    config_override
  ))]
  pub fn load(
    config_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut cfg = match resolve_config_path(
      config_override
    ) {
      | Some(path) => {
        info!(config = %path.display(), "loading config");
        Self::from_file(&path)?
      }
      | None => {
        warn!(
          "no almanac.toml found; using \
           defaults"
        );
        Self::default()
      }
    };

    cfg.apply_env_overrides(|key| {
      std::env::var(key).ok()
    })?;
    cfg.validate()?;
    Ok(cfg)
  }

  #[tracing::instrument]
  pub fn from_file(
    path: &Path
  ) -> anyhow::Result<Self> {
    let text = fs::read_to_string(path)
      .with_context(|| {
        format!(
          "failed to read {}",
          path.display()
        )
      })?;
    let mut cfg = Self::from_toml(&text)
      .with_context(|| {
        format!(
          "failed to parse {}",
          path.display()
        )
      })?;
    cfg.loaded_from =
      Some(path.to_path_buf());
    Ok(cfg)
  }

  pub fn from_toml(
    text: &str
  ) -> anyhow::Result<Self> {
    toml::from_str(text)
      .map_err(|err| anyhow!("{err}"))
  }

  /// `AWS_DB_*` and `PORT` win over the
  /// file. A database host in the
  /// environment selects the postgres
  /// backend.
  #[tracing::instrument(skip(
    self, lookup
  ))]
  pub fn apply_env_overrides<F>(
    &mut self,
    lookup: F
  ) -> anyhow::Result<()>
  where
    F: Fn(&str) -> Option<String>
  {
    if let Some(host) = lookup("AWS_DB_HOST")
    {
      debug!(%host, "database host from environment");
      self.database.host = host;
      if self.storage.backend
        != StorageBackend::Postgres
      {
        info!(
          "AWS_DB_HOST set; switching \
           storage to postgres"
        );
        self.storage.backend =
          StorageBackend::Postgres;
      }
    }
    if let Some(user) = lookup("AWS_DB_USER")
    {
      self.database.user = user;
    }
    if let Some(password) =
      lookup("AWS_DB_PASSWORD")
    {
      self.database.password = password;
    }
    if let Some(name) = lookup("AWS_DB_NAME")
    {
      self.database.name = name;
    }
    if let Some(port) = lookup("AWS_DB_PORT")
    {
      self.database.port = port
        .trim()
        .parse()
        .with_context(|| {
          format!(
            "invalid AWS_DB_PORT: {port}"
          )
        })?;
    }
    if let Some(port) = lookup("PORT") {
      self.server.port = port
        .trim()
        .parse()
        .with_context(|| {
          format!("invalid PORT: {port}")
        })?;
    }
    Ok(())
  }

  pub fn validate(
    &self
  ) -> anyhow::Result<()> {
    if self.database.pool_size == 0 {
      return Err(anyhow!(
        "database.pool_size must be at \
         least 1"
      ));
    }
    if self
      .database
      .academic_category
      .trim()
      .is_empty()
    {
      return Err(anyhow!(
        "database.academic_category \
         cannot be empty"
      ));
    }
    self.sports_timezone()?;
    Ok(())
  }

  pub fn sports_timezone(
    &self
  ) -> anyhow::Result<Tz> {
    self
      .sports
      .timezone
      .trim()
      .parse::<Tz>()
      .map_err(|err| {
        anyhow!(
          "invalid sports.timezone {}: \
           {err}",
          self.sports.timezone
        )
      })
  }
}

#[tracing::instrument(skip(
  override_path
))]
fn resolve_config_path(
  override_path: Option<&Path>
) -> Option<PathBuf> {
  if let Some(path) = override_path {
    return Some(path.to_path_buf());
  }

  if let Ok(from_env) =
    std::env::var(CONFIG_ENV)
    && !from_env.trim().is_empty()
  {
    return Some(PathBuf::from(from_env));
  }

  let local = PathBuf::from(CONFIG_FILE_NAME);
  if local.exists() {
    return Some(local);
  }

  let candidate = dirs::config_dir()?
    .join("almanac")
    .join(CONFIG_FILE_NAME);
  candidate.exists().then_some(candidate)
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use super::*;

  #[test]
  fn defaults_validate() {
    let cfg = Config::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.server.port, 3000);
    assert_eq!(cfg.database.pool_size, 10);
    assert_eq!(
      cfg.storage.backend,
      StorageBackend::File
    );
  }

  #[test]
  fn partial_toml_keeps_other_defaults() {
    let cfg = Config::from_toml(
      r#"
[server]
port = 8080

[storage]
backend = "postgres"
"#
    )
    .expect("parse");
    assert_eq!(cfg.server.port, 8080);
    assert_eq!(
      cfg.server.allowed_origin,
      DEFAULT_ALLOWED_ORIGIN
    );
    assert_eq!(
      cfg.storage.backend,
      StorageBackend::Postgres
    );
    assert_eq!(
      cfg.sports.timezone,
      "America/Chicago"
    );
  }

  #[test]
  fn env_overrides_database_and_port() {
    let env: HashMap<&str, &str> =
      HashMap::from([
        ("AWS_DB_HOST", "db.internal"),
        ("AWS_DB_PORT", "5433"),
        ("PORT", "4000")
      ]);
    let mut cfg = Config::default();
    cfg
      .apply_env_overrides(|key| {
        env.get(key).map(|v| v.to_string())
      })
      .expect("overrides");
    assert_eq!(cfg.database.host, "db.internal");
    assert_eq!(cfg.database.port, 5433);
    assert_eq!(cfg.server.port, 4000);
    assert_eq!(
      cfg.storage.backend,
      StorageBackend::Postgres
    );
  }

  #[test]
  fn bad_port_is_an_error() {
    let mut cfg = Config::default();
    let err = cfg
      .apply_env_overrides(|key| {
        (key == "PORT")
          .then(|| "eighty".to_string())
      })
      .expect_err("should fail");
    assert!(err.to_string().contains("PORT"));
  }

  #[test]
  fn validation_rejects_zero_pool_and_bad_zone()
  {
    let mut cfg = Config::default();
    cfg.database.pool_size = 0;
    assert!(cfg.validate().is_err());

    let mut cfg = Config::default();
    cfg.sports.timezone = "Mars/Olympus".into();
    assert!(cfg.validate().is_err());
  }
}
