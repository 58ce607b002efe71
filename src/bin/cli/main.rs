use anyhow::Context;
use clap::Parser;
use cli::{Cli, Command, LogArgs};
use kma_weather::{
    default_cache_dir, now_kst, BaseTimeResolver, ForecastLogger, GridFallback, KmaConfig,
    KmaWeather,
};
use log::info;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let args = Cli::parse();

    match args.cmd {
        Command::Log(log_args) => log(log_args).await,
        Command::Grid { address } => {
            let weather = KmaWeather::new(load_config()?).await?;
            let grid = weather.grid_locator().resolve(&address).await?;
            println!("{}\t{}\t{}", address, grid.x, grid.y);
            Ok(())
        }
        Command::BaseTime { at, delay_minutes } => {
            let resolver = BaseTimeResolver::new(delay_minutes)?;
            let base = resolver.last_base(at.unwrap_or_else(now_kst));
            println!("{}", base.format("%Y%m%d %H%M"));
            Ok(())
        }
    }
}

fn load_config() -> anyhow::Result<KmaConfig> {
    let mut config = KmaConfig::from_env().context("KMA_SERVICE_KEY must be set")?;
    if config.cache_dir.is_none() {
        config.cache_dir = default_cache_dir();
    }
    Ok(config)
}

async fn log(args: LogArgs) -> anyhow::Result<()> {
    let mut config = load_config()?;
    if args.fallback_grid {
        config.grid_fallback = GridFallback::DefaultStation;
    }
    let weather = KmaWeather::new(config).await?;

    let Some(secs) = args.every else {
        let record = weather
            .log_forecast()
            .maybe_address(args.address.as_deref())
            .maybe_base_time(args.base_time)
            .mode(args.mode)
            .call()
            .await?;
        println!("{}", record.to_dataframe()?);
        return Ok(());
    };

    let logger = ForecastLogger::builder()
        .weather(weather)
        .maybe_address(args.address)
        .mode(args.mode)
        .term(Duration::from_secs(secs))
        .build();

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl-C, stopping after the current tick");
            on_signal.cancel();
        }
    });

    let stats = logger.run(cancel).await;
    println!("{} logged, {} failed", stats.succeeded, stats.failed);
    Ok(())
}
