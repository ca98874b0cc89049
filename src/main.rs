//! Demo server logging every exchange as a request line and a response line.
//!
//! Features:
//! - JSON summaries of both sides of each exchange, bodies truncated unless `--trace`
//! - Excluded path prefixes that bypass capture entirely
//! - Optional color-coded exchange ids

use exchange_log::{ExchangeLogger, TracingSink, cli::Cli, handlers::router};
use std::{net::SocketAddr, process};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing::{Level, error, info};

#[tokio::main]
async fn main() {
    let args: Cli = argh::from_env();

    let level = if args.trace { Level::TRACE } else { Level::DEBUG };
    tracing_subscriber::fmt().with_max_level(level).init();

    let config = match args.config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Invalid configuration: {err}");
            process::exit(2);
        }
    };
    let sink = TracingSink::new(config.logger_name.clone()).with_colored_ids(args.color_ids);
    let logger = match ExchangeLogger::new(config) {
        Ok(logger) => logger.with_sink(sink),
        Err(err) => {
            eprintln!("Invalid configuration: {err}");
            process::exit(2);
        }
    };

    let app = router(&logger)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new());

    if !logger.config().excluded_paths.is_empty() {
        info!("Excluded from the exchange log: {:?}", logger.config().excluded_paths);
    }
    info!("Server running on: http://{}", args.bind);

    let listener = match tokio::net::TcpListener::bind(args.bind).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("Cannot bind {}: {}", args.bind, err);
            process::exit(1);
        }
    };
    if let Err(err) = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    {
        error!("Server error: {}", err);
        process::exit(1);
    }
}
