use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "almanac",
    version,
    about = "Almanac: a month calendar over holidays, weather, sports and your own events"
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Fetch the sports ICS feed and write sports_events.json.
    GenerateSports(GenerateSportsArgs),
    /// Print one month of aggregated events.
    Month(MonthArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct GenerateSportsArgs {
    #[arg(long)]
    pub url: Option<String>,

    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct MonthArgs {
    #[arg(long, value_parser = clap::value_parser!(i32).range(1..=9999))]
    pub year: Option<i32>,

    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,

    /// Only show these tags. Repeatable; all tags when omitted.
    #[arg(long = "tag", action = ArgAction::Append)]
    pub tags: Vec<String>,

    #[arg(long, requires = "to")]
    pub from: Option<String>,

    #[arg(long, requires = "from")]
    pub to: Option<String>,

    #[arg(long)]
    pub search: Option<String>,

    /// Always draw six weeks.
    #[arg(long)]
    pub fixed: bool,

    #[arg(long = "no-color")]
    pub no_color: bool,
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_flags_parse() {
        let cli = GlobalCli::try_parse_from([
            "almanac", "-vv", "month", "--year", "2025", "--month", "3", "--tag", "Holiday",
            "--tag", "Weather", "--from", "2025-03-01", "--to", "2025-03-15",
        ])
        .expect("parse");
        assert_eq!(cli.verbose, 2);
        let Command::Month(args) = cli.command else {
            panic!("expected month command");
        };
        assert_eq!(args.year, Some(2025));
        assert_eq!(args.month, Some(3));
        assert_eq!(args.tags, vec!["Holiday", "Weather"]);
        assert_eq!(args.from.as_deref(), Some("2025-03-01"));
    }

    #[test]
    fn month_out_of_range_is_rejected() {
        assert!(GlobalCli::try_parse_from(["almanac", "month", "--month", "13"]).is_err());
    }

    #[test]
    fn year_outside_four_digits_is_rejected() {
        assert!(GlobalCli::try_parse_from(["almanac", "month", "--year", "2147483647"]).is_err());
        assert!(GlobalCli::try_parse_from(["almanac", "month", "--year", "0"]).is_err());
        assert!(GlobalCli::try_parse_from(["almanac", "month", "--year", "9999"]).is_ok());
    }

    #[test]
    fn range_needs_both_bounds() {
        assert!(GlobalCli::try_parse_from(["almanac", "month", "--from", "2025-03-01"]).is_err());
    }
}
