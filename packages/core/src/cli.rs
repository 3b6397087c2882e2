use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};

use crate::config::parse_fire_time;

/// EUR→BRL rate drop notifier CLI arguments
#[derive(Debug, Parser)]
#[command(
    name = "fx-drop-notifier",
    version,
    about = "Emails you when the euro gets cheaper in reais"
)]
pub struct Cli {
    /// Daily check time in UTC (HH:MM), overrides DAILY_FIRE_TIME
    #[arg(long, global = true, value_parser = parse_fire_time)]
    pub fire_time: Option<NaiveTime>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Check once a day until interrupted
    Run,
    /// Check once and exit
    Once,
    /// Print the EUR→BRL rate, today's or for a given day
    Rate {
        /// Historical day to look up (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}
