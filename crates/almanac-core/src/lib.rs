pub mod cli;
pub mod config;
pub mod render;
pub mod sources;
pub mod sports;

use std::ffi::OsString;

use almanac_shared::date::YearMonth;
use almanac_shared::grid::GridLayout;
use almanac_shared::state::{
  Action,
  CalendarState
};
use anyhow::Context;
use chrono::Local;
use clap::Parser;
use tracing::{
  debug,
  info
};

use crate::cli::{
  Command,
  GenerateSportsArgs,
  MonthArgs
};
use crate::config::Config;

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let cli = cli::GlobalCli::parse_from(raw_args);

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting almanac CLI"
  );

  let cfg =
    Config::load(cli.config.as_deref())?;
  debug!(config = ?cfg.loaded_from, "configuration ready");

  let runtime =
    tokio::runtime::Builder::new_current_thread()
      .enable_all()
      .build()
      .context(
        "failed to start async runtime"
      )?;

  runtime.block_on(async {
    match cli.command {
      | Command::GenerateSports(args) => {
        generate_sports(&cfg, args).await
      }
      | Command::Month(args) => {
        month(&cfg, args).await
      }
    }
  })?;

  info!("done");
  Ok(())
}

async fn generate_sports(
  cfg: &Config,
  args: GenerateSportsArgs
) -> anyhow::Result<()> {
  let url = args
    .url
    .unwrap_or_else(|| cfg.sports.ics_url.clone());
  let output = args
    .output
    .unwrap_or_else(|| cfg.sports.output.clone());
  let client = sources::http_client()?;

  let count = sports::generate(
    &client,
    &url,
    &output,
    cfg.sports_timezone()?
  )
  .await
  .with_context(|| {
    format!(
      "failed generating sports events \
       from {url}"
    )
  })?;

  println!(
    "Generated {count} sports events -> {}",
    output.display()
  );
  Ok(())
}

async fn month(
  cfg: &Config,
  args: MonthArgs
) -> anyhow::Result<()> {
  let client = sources::http_client()?;
  let today = Local::now().date_naive();
  let mut state = CalendarState::new(today);

  for outcome in
    sources::load_all(&cfg.sources, &client)
      .await
  {
    state.apply(outcome.into_action());
  }

  let view = YearMonth::of(today);
  state.apply(Action::SetYear(
    args.year.unwrap_or(view.year)
  ));
  state.apply(Action::SetMonth(
    args.month.unwrap_or(view.month)
  ));

  if !args.tags.is_empty() {
    state
      .aggregator
      .set_active_tags(args.tags.iter().cloned());
  }
  if let (Some(from), Some(to)) =
    (args.from, args.to)
  {
    state.apply(Action::SetRange {
      start: from,
      end:   to
    });
  }
  if let Some(query) = args.search {
    state.apply(Action::SetSearch(query));
  }
  if args.fixed {
    state.layout = GridLayout::Fixed;
  }

  render::Renderer::for_stdout(args.no_color)
    .print_month(&state.grid())
}
