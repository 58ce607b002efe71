use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use kma_weather::{parse_base_time, WriteMode};

#[derive(Debug, Parser)]
#[command(about = "Log KMA short-term forecasts to the weather table.")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch the 4-hours-ahead forecast and append it to the weather table.
    Log(LogArgs),
    /// Print the forecast grid cell of an address.
    Grid {
        /// Three-level address, e.g. "충청남도 천안시서북구 부성동".
        #[arg(long)]
        address: String,
    },
    /// Print the base time that would be requested.
    BaseTime {
        /// KST wall-clock time as "YYYY-MM-DD HH:MM". Defaults to now.
        #[arg(long, value_parser = parse_wall_clock)]
        at: Option<NaiveDateTime>,
        #[arg(long, env = "KMA_DELAY_MINUTES", default_value_t = 30)]
        delay_minutes: u32,
    },
}

#[derive(Debug, Parser)]
pub struct LogArgs {
    /// Three-level address. Defaults to KMA_STATION.
    #[arg(long)]
    pub address: Option<String>,
    /// Explicit base time as "YYYYMMDD HHMM".
    #[arg(long, value_parser = parse_base_time)]
    pub base_time: Option<NaiveDateTime>,
    #[arg(long, default_value_t = WriteMode::Append)]
    pub mode: WriteMode,
    /// Keep logging every SECS seconds until Ctrl-C.
    #[arg(long, value_name = "SECS", conflicts_with = "base_time")]
    pub every: Option<u64>,
    /// Use the default station's grid cell when the address cannot be resolved.
    #[arg(long)]
    pub fallback_grid: bool,
}

fn parse_wall_clock(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M")
}
