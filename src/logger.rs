//! Periodic forecast logging.

use crate::kma::KmaWeather;
use crate::lake::parquet_sink::WriteMode;
use bon::bon;
use log::{error, info};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Outcome counts of a [`ForecastLogger::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoggerStats {
    pub succeeded: usize,
    pub failed: usize,
}

/// Calls [`KmaWeather::log_forecast`] at a fixed term until cancelled.
pub struct ForecastLogger {
    weather: KmaWeather,
    address: Option<String>,
    mode: WriteMode,
    term: Duration,
}

#[bon]
impl ForecastLogger {
    #[builder]
    pub fn new(
        weather: KmaWeather,
        #[builder(into)] address: Option<String>,
        mode: Option<WriteMode>,
        term: Duration,
    ) -> Self {
        Self {
            weather,
            address,
            mode: mode.unwrap_or_default(),
            term,
        }
    }

    pub fn weather(&self) -> &KmaWeather {
        &self.weather
    }

    /// Logs once immediately and then every term, until `cancel` fires.
    ///
    /// A failed tick is logged and counted; the next tick runs as scheduled.
    /// Cancellation is observed between ticks, so a write in progress is
    /// always completed.
    pub async fn run(&self, cancel: CancellationToken) -> LoggerStats {
        let mut stats = LoggerStats::default();
        let mut interval = tokio::time::interval(self.term);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("Started forecast logging every {:?}", self.term);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {
                    let result = self
                        .weather
                        .log_forecast()
                        .maybe_address(self.address.as_deref())
                        .mode(self.mode)
                        .call()
                        .await;
                    match result {
                        Ok(_) => stats.succeeded += 1,
                        Err(e) => {
                            stats.failed += 1;
                            error!("Forecast logging failed: {}", e);
                        }
                    }
                }
            }
        }
        info!(
            "Stopped forecast logging ({} succeeded, {} failed)",
            stats.succeeded, stats.failed
        );
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GridFallback, KmaConfig};
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const EMPTY_FORECAST: &str =
        r#"{"response":{"header":{"resultCode":"00","resultMsg":"NORMAL SERVICE."},"body":{"items":""}}}"#;

    async fn weather(server: &MockServer, lake: &TempDir) -> KmaWeather {
        KmaWeather::new(KmaConfig {
            forecast_url: format!("{}/ForecastSpaceData", server.uri()),
            grid_url: format!("{}/grid", server.uri()),
            lake_root: lake.path().to_path_buf(),
            grid_fallback: GridFallback::DefaultStation,
            max_attempts: 1,
            ..KmaConfig::new("k")
        })
        .await
        .unwrap()
    }

    fn stop_after(millis: u64) -> CancellationToken {
        let cancel = CancellationToken::new();
        let child = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(millis)).await;
            child.cancel();
        });
        cancel
    }

    #[tokio::test]
    async fn test_logs_until_cancelled() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ForecastSpaceData"))
            .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_FORECAST))
            .mount(&server)
            .await;
        let lake = TempDir::new().unwrap();

        let logger = ForecastLogger::builder()
            .weather(weather(&server, &lake).await)
            .term(Duration::from_millis(50))
            .build();
        let stats = logger.run(stop_after(220)).await;

        assert!(stats.succeeded >= 2, "{stats:?}");
        assert_eq!(stats.failed, 0);
        let table = logger.weather().sink().read().await.unwrap();
        assert_eq!(table.height(), stats.succeeded);
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_the_loop() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ForecastSpaceData"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let lake = TempDir::new().unwrap();

        let logger = ForecastLogger::builder()
            .weather(weather(&server, &lake).await)
            .address("충청남도 천안시서북구 부성동")
            .term(Duration::from_millis(50))
            .build();
        let stats = logger.run(stop_after(220)).await;

        assert_eq!(stats.succeeded, 0);
        assert!(stats.failed >= 2, "{stats:?}");
        assert!(!logger.weather().sink().path().exists());
    }
}
