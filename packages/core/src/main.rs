use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;
use tokio_util::sync::CancellationToken;

use fx_drop_notifier::alerts::SmtpNotifier;
use fx_drop_notifier::cli::{Cli, Command};
use fx_drop_notifier::config::{Config, RunMode};
use fx_drop_notifier::error::AppError;
use fx_drop_notifier::logging::init_logging;
use fx_drop_notifier::monitor::RateMonitor;
use fx_drop_notifier::rates::RateSource;
use fx_drop_notifier::scheduler::{cancel_on, run_daily, run_once, shutdown_signal, Schedule};
use fx_drop_notifier::services::currency_api::CurrencyApiClient;

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_logging();

    let cli = Cli::parse();

    let mut config = Config::from_env()
        .map_err(AppError::Config)
        .unwrap_or_else(|err| {
            tracing::error!("{}", err);
            std::process::exit(1);
        });

    if let Some(fire_time) = cli.fire_time {
        config.schedule.daily_fire_time = fire_time;
    }

    tracing::info!("Service started with config: {:?}", config);

    if let Err(err) = run(cli.command, config).await {
        tracing::error!("{}", err);
        std::process::exit(1);
    }
}

async fn run(command: Option<Command>, config: Config) -> Result<(), AppError> {
    let source = Arc::new(CurrencyApiClient::new(
        config.rate_api.base_url.clone(),
        config.rate_api.api_key.expose().to_string(),
    )?);

    let command = command.unwrap_or(match config.run_mode {
        RunMode::Daily => Command::Run,
        RunMode::Once => Command::Once,
    });

    if let Command::Rate { date } = command {
        let observation = source.fetch_rate(date).await?.normalized();
        println!("{} EUR→BRL {:.2}", observation.date, observation.rate);
        return Ok(());
    }

    let notifier = Arc::new(SmtpNotifier::new(&config.email)?);
    let mut monitor = RateMonitor::new(source, notifier);

    match command {
        Command::Once => {
            // Failures were already logged; single-shot mode still exits normally.
            let _ = run_once(&mut monitor).await;
        }
        _ => {
            let cancel = CancellationToken::new();
            tokio::spawn(cancel_on(shutdown_signal(), cancel.clone()));

            let schedule = Schedule::daily_at(config.schedule.daily_fire_time);
            run_daily(&mut monitor, schedule, cancel).await;
        }
    }

    Ok(())
}
