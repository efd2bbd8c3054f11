use std::io;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
mod model;
mod protocol;
mod services;
mod worker;

use config::WorkerConfig;
use protocol::Dispatcher;
use services::segmenter::RuleSegmenter;

fn init_tracing() {
    // stdout carries the protocol, diagnostics go to stderr.
    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "senter_worker=info".into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(false)
                .with_target(false),
        )
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = WorkerConfig::from_env().context("invalid worker configuration")?;
    let segmenter =
        RuleSegmenter::load(&config.segmenter).context("failed to load sentence segmenter")?;
    let dispatcher = Dispatcher::new(segmenter, config.unknown_methods);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        unknown_methods = ?config.unknown_methods,
        max_line_bytes = config.max_line_bytes,
        "senter worker ready"
    );

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let stdout = io::stdout();
    let mut writer = stdout.lock();

    let summary = worker::serve(&mut reader, &mut writer, &dispatcher, config.max_line_bytes)
        .context("request loop failed")?;

    tracing::info!(
        responses = summary.responses,
        failures = summary.failures,
        skipped = summary.skipped,
        "end of input"
    );

    Ok(())
}
